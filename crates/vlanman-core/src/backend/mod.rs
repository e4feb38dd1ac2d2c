// ── Backend abstraction ──
//
// The data-access capability set the controller depends on. `HttpBackend`
// talks to the REST service; `MemoryBackend` keeps everything in process
// and enforces the same rules, for tests and offline use.

mod http;
mod memory;

use std::future::Future;
use std::net::Ipv4Addr;

use crate::command::{
    AssignIpRequest, CreateDomainRequest, CreateValueStreamRequest, CreateVlanRequest,
    CreateZoneRequest, UpdateAssignmentRequest, UpdateDomainRequest, UpdateVlanRequest,
};
use crate::error::CoreError;
use crate::model::{
    Domain, DomainTree, EntityId, HealthStatus, IpAssignment, ValueStream, Vlan, Zone,
};
use crate::subnet::Availability;

pub use http::HttpBackend;
pub use memory::MemoryBackend;

/// Which VLANs a fetch covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VlanScope {
    All,
    Domain(EntityId),
    Zone(EntityId),
}

impl VlanScope {
    pub fn includes(&self, vlan: &Vlan) -> bool {
        match self {
            Self::All => true,
            Self::Domain(id) => vlan.domain_id.as_ref() == Some(id),
            Self::Zone(id) => vlan.zone_id.as_ref() == Some(id),
        }
    }
}

/// Which IP assignments a fetch covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentScope {
    All,
    Vlan(EntityId),
}

impl AssignmentScope {
    pub fn includes(&self, assignment: &IpAssignment) -> bool {
        match self {
            Self::All => true,
            Self::Vlan(id) => assignment.vlan_id == *id,
        }
    }
}

/// CRUD per resource plus health. Returned records are fully converted
/// model types; usage fields on VLANs reflect what the backend knew.
pub trait Backend: Send + Sync + 'static {
    // ── Domains ──────────────────────────────────────────────────────
    fn list_domains(&self) -> impl Future<Output = Result<Vec<Domain>, CoreError>> + Send;
    fn get_domain(&self, id: &EntityId)
    -> impl Future<Output = Result<DomainTree, CoreError>> + Send;
    fn create_domain(
        &self,
        req: &CreateDomainRequest,
    ) -> impl Future<Output = Result<Domain, CoreError>> + Send;
    fn update_domain(
        &self,
        id: &EntityId,
        req: &UpdateDomainRequest,
    ) -> impl Future<Output = Result<Domain, CoreError>> + Send;
    fn delete_domain(&self, id: &EntityId) -> impl Future<Output = Result<(), CoreError>> + Send;

    // ── Value streams and zones ──────────────────────────────────────
    /// Codes are unique within a domain.
    fn create_value_stream(
        &self,
        req: &CreateValueStreamRequest,
    ) -> impl Future<Output = Result<ValueStream, CoreError>> + Send;
    fn list_zones(
        &self,
        domain: Option<&EntityId>,
    ) -> impl Future<Output = Result<Vec<Zone>, CoreError>> + Send;
    fn create_zone(
        &self,
        req: &CreateZoneRequest,
    ) -> impl Future<Output = Result<Zone, CoreError>> + Send;
    fn record_firewall_check(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<Zone, CoreError>> + Send;

    // ── VLANs ────────────────────────────────────────────────────────
    fn list_vlans(
        &self,
        scope: &VlanScope,
    ) -> impl Future<Output = Result<Vec<Vlan>, CoreError>> + Send;
    fn get_vlan(&self, id: &EntityId) -> impl Future<Output = Result<Vlan, CoreError>> + Send;
    fn create_vlan(
        &self,
        req: &CreateVlanRequest,
    ) -> impl Future<Output = Result<Vlan, CoreError>> + Send;
    fn update_vlan(
        &self,
        id: &EntityId,
        req: &UpdateVlanRequest,
    ) -> impl Future<Output = Result<Vlan, CoreError>> + Send;
    fn delete_vlan(&self, id: &EntityId) -> impl Future<Output = Result<(), CoreError>> + Send;
    fn vlan_availability(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<Availability, CoreError>> + Send;
    /// `CoreError::PoolExhausted` when nothing is left.
    fn next_available_ip(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<Ipv4Addr, CoreError>> + Send;

    // ── IP assignments ───────────────────────────────────────────────
    fn list_assignments(
        &self,
        scope: &AssignmentScope,
    ) -> impl Future<Output = Result<Vec<IpAssignment>, CoreError>> + Send;
    fn get_assignment(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<IpAssignment, CoreError>> + Send;
    /// A request without an address takes the next free one.
    fn create_assignment(
        &self,
        req: &AssignIpRequest,
    ) -> impl Future<Output = Result<IpAssignment, CoreError>> + Send;
    fn update_assignment(
        &self,
        id: &EntityId,
        req: &UpdateAssignmentRequest,
    ) -> impl Future<Output = Result<IpAssignment, CoreError>> + Send;
    /// Releases the address; the record may survive as inactive.
    fn release_assignment(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    // ── System ───────────────────────────────────────────────────────
    fn health(&self) -> impl Future<Output = Result<HealthStatus, CoreError>> + Send;
}
