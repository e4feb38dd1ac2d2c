// vlanman-api: Async Rust client for the plant IP-management REST API

pub mod error;
pub mod rest;
pub mod transport;
pub mod types;

pub use error::Error;
pub use rest::ApiClient;
pub use transport::{TlsMode, TransportConfig};
