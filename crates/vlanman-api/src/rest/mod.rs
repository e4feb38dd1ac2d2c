// REST API client for the IP-management backend.
//
// `client` holds the transport mechanics; every other module adds one
// resource group as inherent methods on `ApiClient`.

pub mod client;

mod assignments;
mod domains;
mod reports;
mod system;
mod vlans;
mod zones;

pub use client::ApiClient;
