// ── Domain model ──
//
// Canonical representation of everything the IP-management backend
// serves. Consumers (CLI, reports, registries) depend on these types,
// never on the wire structs.

pub mod assignment;
pub mod domain;
pub mod entity_id;
pub mod health;
pub mod vlan;
pub mod zone;

// ── Re-exports ──────────────────────────────────────────────────────

pub use assignment::{AssignmentView, DeviceStatus, DeviceType, IpAssignment};
pub use domain::{Domain, DomainCode, DomainTree, ValueStream};
pub use entity_id::{EntityId, MacAddress};
pub use health::HealthStatus;
pub use vlan::{Vlan, VlanStatus, VlanUsage};
pub use zone::{SecurityType, Zone};
