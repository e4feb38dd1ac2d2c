// ── Client-side registries ──

mod collection;
mod data_store;
mod registry;

pub use collection::Keyed;
pub use data_store::DataStore;
pub use registry::{FetchOutcome, FetchTicket, Registry};
