// vlanman-core: Registries, subnet calculator and status derivation
// between vlanman-api and its consumers (CLI).

pub mod backend;
pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod derive;
pub mod error;
pub mod filter;
pub mod health;
pub mod model;
pub mod report;
pub mod store;
pub mod subnet;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::{AssignmentScope, Backend, HttpBackend, MemoryBackend, VlanScope};
pub use command::requests::*;
pub use command::{Command, CommandResult};
pub use config::{ControllerConfig, TlsVerification};
pub use controller::Controller;
pub use error::{CoreError, ErrorCategory};
pub use health::HealthState;
pub use store::{DataStore, FetchOutcome};
pub use filter::{AssignmentFilter, VlanFilter, VlanSort};
pub use subnet::{Availability, SubnetPlan, VlanCalculation};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AssignmentView, DeviceStatus, DeviceType, Domain, DomainCode, DomainTree, EntityId,
    HealthStatus, IpAssignment, MacAddress, SecurityType, ValueStream, Vlan, VlanStatus,
    VlanUsage, Zone,
};
