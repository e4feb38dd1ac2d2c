// ── Command API ──
//
// Every write operation flows through the `Command` enum. The controller
// checks business preconditions, forwards the command to the backend and
// refetches the affected registry.

pub mod requests;

use crate::model::{Domain, EntityId, IpAssignment, ValueStream, Vlan, Zone};

pub use requests::{
    AssignIpRequest, CreateDomainRequest, CreateValueStreamRequest, CreateVlanRequest,
    CreateZoneRequest, UpdateAssignmentRequest, UpdateDomainRequest, UpdateVlanRequest,
};

/// All write operations against the IP-management backend.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Domains ──────────────────────────────────────────────────────
    CreateDomain(CreateDomainRequest),
    UpdateDomain {
        id: EntityId,
        update: UpdateDomainRequest,
    },
    DeleteDomain {
        id: EntityId,
    },

    // ── VLANs ────────────────────────────────────────────────────────
    CreateVlan(CreateVlanRequest),
    UpdateVlan {
        id: EntityId,
        update: UpdateVlanRequest,
    },
    DeleteVlan {
        id: EntityId,
    },

    // ── IP assignments ───────────────────────────────────────────────
    AssignIp(AssignIpRequest),
    UpdateAssignment {
        id: EntityId,
        update: UpdateAssignmentRequest,
    },
    ReleaseIp {
        id: EntityId,
    },

    // ── Value streams and zones ──────────────────────────────────────
    CreateValueStream(CreateValueStreamRequest),
    CreateZone(CreateZoneRequest),
    RecordFirewallCheck {
        zone_id: EntityId,
    },
}

impl Command {
    /// Short verb phrase for logs and confirmations.
    pub fn describe(&self) -> String {
        match self {
            Self::CreateDomain(req) => format!("create domain {}", req.code),
            Self::UpdateDomain { id, .. } => format!("update domain {id}"),
            Self::DeleteDomain { id } => format!("delete domain {id}"),
            Self::CreateVlan(req) => format!("create VLAN {}", req.vlan_id),
            Self::UpdateVlan { id, .. } => format!("update VLAN {id}"),
            Self::DeleteVlan { id } => format!("delete VLAN {id}"),
            Self::AssignIp(req) => format!("assign IP to {}", req.ci_name),
            Self::UpdateAssignment { id, .. } => format!("update assignment {id}"),
            Self::ReleaseIp { id } => format!("release assignment {id}"),
            Self::CreateValueStream(req) => format!("create value stream {}", req.code),
            Self::CreateZone(req) => format!("create zone {}", req.name),
            Self::RecordFirewallCheck { zone_id } => {
                format!("record firewall check for zone {zone_id}")
            }
        }
    }
}

/// Result of a successfully executed command.
#[derive(Debug, Clone)]
pub enum CommandResult {
    Ok,
    Domain(Domain),
    Vlan(Vlan),
    Assignment(IpAssignment),
    ValueStream(ValueStream),
    Zone(Zone),
}
