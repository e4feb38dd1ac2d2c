// ── REST-backed implementation ──

use std::net::Ipv4Addr;

use chrono::Utc;
use tracing::{debug, warn};

use vlanman_api::types::{DomainCreate, DomainUpdate, IpAssignmentUpdate, VlanUpdate};
use vlanman_api::{ApiClient, TransportConfig};

use super::{AssignmentScope, Backend, VlanScope};
use crate::command::{
    AssignIpRequest, CreateDomainRequest, CreateValueStreamRequest, CreateVlanRequest,
    CreateZoneRequest, UpdateAssignmentRequest, UpdateDomainRequest, UpdateVlanRequest,
};
use crate::convert::{self, VlanContext};
use crate::derive;
use crate::error::CoreError;
use crate::model::{
    Domain, DomainTree, EntityId, HealthStatus, IpAssignment, ValueStream, Vlan, Zone,
};
use crate::subnet::{self, Availability, SubnetPlan};

/// `Backend` over the IP-management REST API.
#[derive(Clone)]
pub struct HttpBackend {
    client: ApiClient,
}

impl HttpBackend {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn connect(base_url: &str, transport: &TransportConfig) -> Result<Self, CoreError> {
        Ok(Self::new(ApiClient::new(base_url, transport)?))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

/// Name the entity in 404s instead of echoing the request path.
fn scoped(entity: &'static str, id: &EntityId) -> impl FnOnce(vlanman_api::Error) -> CoreError {
    let id = id.clone();
    move |err| {
        if err.is_not_found() {
            CoreError::not_found(entity, id)
        } else {
            CoreError::from(err)
        }
    }
}

fn convert_vlans(responses: &[vlanman_api::types::VlanResponse], ctx: &VlanContext<'_>) -> Vec<Vlan> {
    let now = Utc::now();
    responses
        .iter()
        .filter_map(|v| match convert::vlan_from_response(v, ctx, now) {
            Ok((vlan, _)) => Some(vlan),
            Err(e) => {
                warn!(vlan_id = v.vlan_id, error = %e, "skipping VLAN");
                None
            }
        })
        .collect()
}

fn convert_assignments(responses: &[vlanman_api::types::IpAssignmentResponse]) -> Vec<IpAssignment> {
    responses
        .iter()
        .filter_map(|a| {
            IpAssignment::try_from(a)
                .inspect_err(|e| warn!(ci_name = %a.ci_name, error = %e, "skipping assignment"))
                .ok()
        })
        .collect()
}

impl Backend for HttpBackend {
    // ── Domains ──────────────────────────────────────────────────────

    async fn list_domains(&self) -> Result<Vec<Domain>, CoreError> {
        let responses = self.client.list_domains(false).await?;
        Ok(responses
            .into_iter()
            .filter_map(|d| {
                let code = d.code.clone();
                Domain::try_from(d)
                    .inspect_err(|e| warn!(%code, error = %e, "skipping domain"))
                    .ok()
            })
            .collect())
    }

    async fn get_domain(&self, id: &EntityId) -> Result<DomainTree, CoreError> {
        let uuid = id.require_uuid("domain_id")?;
        let resp = self
            .client
            .get_domain(&uuid)
            .await
            .map_err(scoped("Domain", id))?;
        convert::domain_tree(resp, Utc::now())
    }

    async fn create_domain(&self, req: &CreateDomainRequest) -> Result<Domain, CoreError> {
        let resp = self.client.create_domain(&DomainCreate::from(req)).await?;
        Domain::try_from(resp)
    }

    async fn update_domain(
        &self,
        id: &EntityId,
        req: &UpdateDomainRequest,
    ) -> Result<Domain, CoreError> {
        let uuid = id.require_uuid("domain_id")?;
        let resp = self
            .client
            .update_domain(&uuid, &DomainUpdate::from(req))
            .await
            .map_err(scoped("Domain", id))?;
        Domain::try_from(resp)
    }

    async fn delete_domain(&self, id: &EntityId) -> Result<(), CoreError> {
        let uuid = id.require_uuid("domain_id")?;
        self.client
            .delete_domain(&uuid)
            .await
            .map_err(scoped("Domain", id))
    }

    // ── Value streams and zones ──────────────────────────────────────

    async fn create_value_stream(
        &self,
        req: &CreateValueStreamRequest,
    ) -> Result<ValueStream, CoreError> {
        let domain_uuid = req.domain_id.require_uuid("domain_id")?;
        let body = convert::value_stream_create(domain_uuid, req);
        let resp = self
            .client
            .create_value_stream(&body)
            .await
            .map_err(scoped("Domain", &req.domain_id))?;
        Ok(convert::value_stream_from(&resp, Some(&req.domain_id)))
    }

    async fn list_zones(&self, domain: Option<&EntityId>) -> Result<Vec<Zone>, CoreError> {
        let uuid = domain.map(|d| d.require_uuid("domain_id")).transpose()?;
        let resp = self.client.network_hierarchy(uuid.as_ref()).await?;
        Ok(convert::flatten_hierarchy(&resp, Utc::now()).zones)
    }

    async fn create_zone(&self, req: &CreateZoneRequest) -> Result<Zone, CoreError> {
        let vs_uuid = req.value_stream_id.require_uuid("value_stream_id")?;
        let body = convert::zone_create(vs_uuid, req);
        let resp = self
            .client
            .create_zone(&body)
            .await
            .map_err(scoped("Value stream", &req.value_stream_id))?;
        // The response carries no domain; the next hierarchy fetch fills it in.
        convert::zone_from_response(&resp, None)
    }

    async fn record_firewall_check(&self, id: &EntityId) -> Result<Zone, CoreError> {
        let uuid = id.require_uuid("zone_id")?;
        let resp = self
            .client
            .record_firewall_check(&uuid)
            .await
            .map_err(scoped("Zone", id))?;
        convert::zone_from_response(&resp, None)
    }

    // ── VLANs ────────────────────────────────────────────────────────

    async fn list_vlans(&self, scope: &VlanScope) -> Result<Vec<Vlan>, CoreError> {
        match scope {
            // The flat VLAN listing carries no domain; the hierarchy does.
            VlanScope::All => {
                let resp = self.client.network_hierarchy(None).await?;
                let flat = convert::flatten_hierarchy(&resp, Utc::now());
                debug!(
                    domains = flat.domains.len(),
                    zones = flat.zones.len(),
                    vlans = flat.vlans.len(),
                    "hierarchy loaded"
                );
                Ok(flat.vlans)
            }
            VlanScope::Domain(id) => Ok(self.get_domain(id).await?.vlans),
            VlanScope::Zone(id) => {
                let uuid = id.require_uuid("zone_id")?;
                let (zone, vlans) =
                    tokio::join!(self.client.get_zone(&uuid), self.client.list_zone_vlans(&uuid));
                let zone = convert::zone_from_response(&zone.map_err(scoped("Zone", id))?, None)?;
                let ctx = VlanContext {
                    domain_id: None,
                    zone: Some(&zone),
                };
                Ok(convert_vlans(&vlans?, &ctx))
            }
        }
    }

    async fn get_vlan(&self, id: &EntityId) -> Result<Vlan, CoreError> {
        let uuid = id.require_uuid("vlan_id")?;
        let resp = self
            .client
            .get_vlan(&uuid)
            .await
            .map_err(scoped("VLAN", id))?;
        let (vlan, _) = convert::vlan_from_response(&resp, &VlanContext::default(), Utc::now())?;
        Ok(vlan)
    }

    async fn create_vlan(&self, req: &CreateVlanRequest) -> Result<Vlan, CoreError> {
        let zone_id = req.zone_id.require_uuid("zone_id")?;
        let vlan_id = subnet::validate_vlan_id(req.vlan_id)?;
        let plan = SubnetPlan::from_strs(&req.subnet, &req.netmask)?;
        let body = convert::vlan_create(
            zone_id,
            vlan_id,
            &plan,
            req.description.clone(),
            req.is_active,
        );
        let resp = self.client.create_vlan(&body).await?;
        let (vlan, _) = convert::vlan_from_response(&resp, &VlanContext::default(), Utc::now())?;
        Ok(vlan)
    }

    async fn update_vlan(&self, id: &EntityId, req: &UpdateVlanRequest) -> Result<Vlan, CoreError> {
        let uuid = id.require_uuid("vlan_id")?;
        let resp = self
            .client
            .update_vlan(&uuid, &VlanUpdate::from(req))
            .await
            .map_err(scoped("VLAN", id))?;
        let (vlan, _) = convert::vlan_from_response(&resp, &VlanContext::default(), Utc::now())?;
        Ok(vlan)
    }

    async fn delete_vlan(&self, id: &EntityId) -> Result<(), CoreError> {
        let uuid = id.require_uuid("vlan_id")?;
        self.client
            .delete_vlan(&uuid)
            .await
            .map_err(scoped("VLAN", id))
    }

    async fn vlan_availability(&self, id: &EntityId) -> Result<Availability, CoreError> {
        let uuid = id.require_uuid("vlan_id")?;
        let resp = self
            .client
            .vlan_availability(&uuid)
            .await
            .map_err(scoped("VLAN", id))?;
        // Utilization is re-derived so every surface rounds the same way.
        Ok(Availability {
            total_ips: resp.total_ips,
            assigned_ips: resp.assigned_ips,
            available_ips: resp.available_ips,
            reserved_ips: resp.reserved_ips,
            utilization: derive::utilization(resp.assigned_ips, resp.total_ips),
        })
    }

    async fn next_available_ip(&self, id: &EntityId) -> Result<Ipv4Addr, CoreError> {
        let uuid = id.require_uuid("vlan_id")?;
        match self.client.next_available_ip(&uuid).await {
            Ok(resp) => Ok(subnet::parse_ipv4(&resp.next_available_ip)?),
            // The service answers 404 once the pool is exhausted.
            Err(e) if e.is_not_found() => Err(CoreError::PoolExhausted {
                vlan: id.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    // ── IP assignments ───────────────────────────────────────────────

    async fn list_assignments(
        &self,
        scope: &AssignmentScope,
    ) -> Result<Vec<IpAssignment>, CoreError> {
        let responses = match scope {
            AssignmentScope::All => self.client.list_ip_assignments().await?,
            AssignmentScope::Vlan(id) => {
                let uuid = id.require_uuid("vlan_id")?;
                self.client
                    .list_vlan_ip_assignments(&uuid)
                    .await
                    .map_err(scoped("VLAN", id))?
            }
        };
        Ok(convert_assignments(&responses))
    }

    async fn get_assignment(&self, id: &EntityId) -> Result<IpAssignment, CoreError> {
        let uuid = id.require_uuid("assignment_id")?;
        let resp = self
            .client
            .get_ip_assignment(&uuid)
            .await
            .map_err(scoped("IP assignment", id))?;
        IpAssignment::try_from(&resp)
    }

    async fn create_assignment(&self, req: &AssignIpRequest) -> Result<IpAssignment, CoreError> {
        let vlan_uuid = req.vlan_id.require_uuid("vlan_id")?;
        let ip = match req.ip_address {
            Some(ip) => ip,
            None => self.next_available_ip(&req.vlan_id).await?,
        };
        debug!(%ip, ci_name = %req.ci_name, "assigning address");
        let body = convert::assignment_create(vlan_uuid, ip, req);
        let resp = self.client.create_ip_assignment(&body).await?;
        IpAssignment::try_from(&resp)
    }

    async fn update_assignment(
        &self,
        id: &EntityId,
        req: &UpdateAssignmentRequest,
    ) -> Result<IpAssignment, CoreError> {
        let uuid = id.require_uuid("assignment_id")?;
        let resp = self
            .client
            .update_ip_assignment(&uuid, &IpAssignmentUpdate::from(req))
            .await
            .map_err(scoped("IP assignment", id))?;
        IpAssignment::try_from(&resp)
    }

    async fn release_assignment(&self, id: &EntityId) -> Result<(), CoreError> {
        let uuid = id.require_uuid("assignment_id")?;
        self.client
            .delete_ip_assignment(&uuid)
            .await
            .map_err(scoped("IP assignment", id))
    }

    // ── System ───────────────────────────────────────────────────────

    async fn health(&self) -> Result<HealthStatus, CoreError> {
        let resp = self.client.health().await?;
        Ok(convert::health_from_response(resp, Utc::now()))
    }
}
