// ── API-to-domain type conversions ──
//
// Bridges raw `vlanman_api` response types into canonical
// `vlanman_core::model` types, and typed requests back into wire bodies.
// Records the backend serves in a shape we cannot represent (unknown
// domain code, unparseable subnet) are skipped with a warning rather than
// failing the whole fetch.

use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use vlanman_api::types::{
    DomainCreate, DomainResponse, DomainUpdate, HealthResponse, HierarchyResponse,
    IpAssignmentCreate, IpAssignmentResponse, IpAssignmentUpdate, ValueStreamCreate,
    ValueStreamResponse, VlanCreate, VlanResponse, VlanUpdate, ZoneCreate, ZoneResponse,
};

use crate::command::{
    CreateDomainRequest, CreateValueStreamRequest, CreateZoneRequest, UpdateAssignmentRequest,
    UpdateDomainRequest, UpdateVlanRequest,
};
use crate::derive;
use crate::error::CoreError;
use crate::model::{
    Domain, DomainCode, DomainTree, EntityId, HealthStatus, IpAssignment, MacAddress,
    SecurityType, ValueStream, Vlan, Zone,
};
use crate::subnet::{Netmask, SubnetPlan, parse_ipv4};

// ── Helpers ────────────────────────────────────────────────────────

/// Parse an optional dotted quad, dropping anything unparseable.
fn parse_opt_ip(raw: Option<&str>) -> Option<Ipv4Addr> {
    raw.and_then(|s| parse_ipv4(s).ok())
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

// ── Domain ─────────────────────────────────────────────────────────

impl TryFrom<DomainResponse> for Domain {
    type Error = CoreError;

    fn try_from(d: DomainResponse) -> Result<Self, Self::Error> {
        let code: DomainCode = d.code.parse().map_err(|_| {
            CoreError::validation("code", format!("'{}' is not one of MFG, LOG, FCM, ENG", d.code))
        })?;
        Ok(Domain {
            id: EntityId::from(d.id),
            code,
            name: non_empty(d.name).unwrap_or_else(|| code.display_name().to_owned()),
            description: d.description,
            value_stream_count: d.value_streams.len(),
            is_active: d.is_active,
            created_at: d.created_at,
            updated_at: d.updated_at,
        })
    }
}

pub(crate) fn value_stream_from(vs: &ValueStreamResponse, domain_id: Option<&EntityId>) -> ValueStream {
    ValueStream {
        id: EntityId::from(vs.id),
        domain_id: vs.domain_id.map(EntityId::from).or_else(|| domain_id.cloned()),
        code: vs.code.clone(),
        name: vs.name.clone().unwrap_or_else(|| vs.code.clone()),
        description: vs.description.clone(),
    }
}

/// Walk `GET /domains/{id}`: domain → value streams → zones → VLANs → IPs.
pub(crate) fn domain_tree(d: DomainResponse, now: DateTime<Utc>) -> Result<DomainTree, CoreError> {
    let domain_id = EntityId::from(d.id);
    let mut flat = FlatTree::default();
    let mut value_streams = Vec::with_capacity(d.value_streams.len());
    for vs in &d.value_streams {
        value_streams.push(value_stream_from(vs, Some(&domain_id)));
        for zone in &vs.zones {
            flat.push_zone(zone, &zone.vlans, Some(&domain_id), now);
        }
    }
    let domain = Domain::try_from(d)?;
    Ok(DomainTree {
        domain,
        value_streams,
        zones: flat.zones,
        vlans: flat.vlans,
        assignments: flat.assignments,
    })
}

// ── Zone ───────────────────────────────────────────────────────────

pub(crate) fn zone_from_response(
    z: &ZoneResponse,
    domain_id: Option<&EntityId>,
) -> Result<Zone, CoreError> {
    let security_type: SecurityType = z.security_type.parse().map_err(|_| {
        CoreError::validation(
            "security_type",
            format!("unknown security type '{}'", z.security_type),
        )
    })?;
    Ok(Zone {
        id: EntityId::from(z.id),
        value_stream_id: z.value_stream_id.map(EntityId::from),
        domain_id: domain_id.cloned(),
        name: z.name.clone(),
        security_type,
        zone_manager: non_empty(z.zone_manager.clone()),
        description: z.description.clone(),
        last_firewall_check: z.last_firewall_check,
        is_active: z.is_active,
        vlan_count: z.vlans.len(),
    })
}

// ── VLAN ───────────────────────────────────────────────────────────

/// What the caller knows about a VLAN's position in the hierarchy, for
/// endpoints that don't embed it.
#[derive(Debug, Default, Clone)]
pub(crate) struct VlanContext<'a> {
    pub domain_id: Option<&'a EntityId>,
    pub zone: Option<&'a Zone>,
}

/// Convert a VLAN and the assignments embedded in it.
///
/// Usage is derived from the embedded assignments; the store recomputes
/// it once the assignment registry holds fresher data.
pub(crate) fn vlan_from_response(
    v: &VlanResponse,
    ctx: &VlanContext<'_>,
    now: DateTime<Utc>,
) -> Result<(Vlan, Vec<IpAssignment>), CoreError> {
    let subnet = parse_ipv4(&v.subnet)?;
    let netmask = Netmask::parse(&v.netmask)?;
    let plan = SubnetPlan::calculate(subnet, netmask, parse_opt_ip(v.gateway.as_deref()))?;

    let embedded_zone = match (ctx.zone, v.zone.as_deref()) {
        (Some(_), _) | (None, None) => None,
        (None, Some(z)) => zone_from_response(z, ctx.domain_id)
            .inspect_err(|e| warn!(vlan_id = v.vlan_id, error = %e, "ignoring embedded zone"))
            .ok(),
    };
    let zone = ctx.zone.or(embedded_zone.as_ref());

    let assignments: Vec<IpAssignment> = v
        .ip_assignments
        .iter()
        .filter_map(|a| {
            IpAssignment::try_from(a)
                .inspect_err(|e| warn!(vlan_id = v.vlan_id, error = %e, "skipping assignment"))
                .ok()
        })
        .collect();
    let refs: Vec<&IpAssignment> = assignments.iter().collect();
    let usage = derive::vlan_usage(plan.total_ips, &refs, now);

    // The computed range is canonical; total_ips is derived from it.
    let stored_range = (
        parse_opt_ip(v.net_start.as_deref()),
        parse_opt_ip(v.net_end.as_deref()),
    );
    if stored_range != (Some(plan.net_start), Some(plan.net_end)) {
        debug!(
            vlan_id = v.vlan_id,
            stored_start = ?stored_range.0,
            stored_end = ?stored_range.1,
            net_start = %plan.net_start,
            net_end = %plan.net_end,
            "stored assignable range differs from the computed one"
        );
    }

    let vlan = Vlan {
        id: EntityId::from(v.id),
        domain_id: v
            .domain_id
            .map(EntityId::from)
            .or_else(|| ctx.domain_id.cloned())
            .or_else(|| zone.and_then(|z| z.domain_id.clone())),
        zone_id: v
            .zone_id
            .map(EntityId::from)
            .or_else(|| zone.map(|z| z.id.clone())),
        vlan_id: v.vlan_id,
        name: format!("VLAN {}", v.vlan_id),
        description: v.description.clone(),
        subnet: plan.network,
        netmask,
        gateway: plan.gateway,
        net_start: plan.net_start,
        net_end: plan.net_end,
        zone_name: zone.map(|z| z.name.clone()),
        zone_manager: zone.and_then(|z| z.zone_manager.clone()),
        security_type: zone.map(|z| z.security_type),
        last_firewall_check: zone.and_then(|z| z.last_firewall_check),
        status: usage.status,
        total_ips: usage.total_ips,
        used_ips: usage.used_ips,
        utilization: usage.utilization,
        is_active: v.is_active,
        created_at: v.created_at,
        updated_at: v.updated_at,
    };
    Ok((vlan, assignments))
}

// ── IP assignment ──────────────────────────────────────────────────

impl TryFrom<&IpAssignmentResponse> for IpAssignment {
    type Error = CoreError;

    fn try_from(a: &IpAssignmentResponse) -> Result<Self, Self::Error> {
        let ip_address = parse_ipv4(&a.ip_address)?;
        let mac_address = a.mac_address.as_deref().filter(|m| !m.trim().is_empty()).and_then(|m| {
            MacAddress::parse(m)
                .inspect_err(|_| warn!(ci_name = %a.ci_name, mac = m, "dropping malformed MAC"))
                .ok()
        });
        Ok(IpAssignment {
            id: EntityId::from(a.id),
            vlan_id: EntityId::from(a.vlan_id),
            ip_address,
            ci_name: a.ci_name.clone(),
            mac_address,
            description: a.description.clone(),
            device_type: a.device_type.as_deref().and_then(|t| t.parse().ok()),
            reported_status: a.status.as_deref().and_then(|s| s.parse().ok()),
            is_active: a.is_active,
            assigned_at: a.assigned_at,
            last_seen: a.last_seen,
            created_at: a.created_at,
            updated_at: a.updated_at,
        })
    }
}

// ── Health ─────────────────────────────────────────────────────────

/// The backend omits `timestamp`; stamp the response when it arrives.
pub(crate) fn health_from_response(h: HealthResponse, now: DateTime<Utc>) -> HealthStatus {
    HealthStatus {
        status: h.status,
        service: h.service,
        version: h.version,
        timestamp: h.timestamp.unwrap_or(now),
    }
}

// ── Hierarchy flattening ───────────────────────────────────────────

/// Zones, VLANs and assignments collected from a nested response.
#[derive(Debug, Default)]
pub(crate) struct FlatTree {
    pub domains: Vec<Domain>,
    pub zones: Vec<Zone>,
    pub vlans: Vec<Vlan>,
    pub assignments: Vec<IpAssignment>,
}

impl FlatTree {
    fn push_zone(
        &mut self,
        z: &ZoneResponse,
        vlans: &[VlanResponse],
        domain_id: Option<&EntityId>,
        now: DateTime<Utc>,
    ) {
        let zone = match zone_from_response(z, domain_id) {
            Ok(mut zone) => {
                zone.vlan_count = vlans.len();
                zone
            }
            Err(e) => {
                warn!(zone = %z.name, error = %e, "skipping zone");
                return;
            }
        };
        let ctx = VlanContext {
            domain_id,
            zone: Some(&zone),
        };
        for v in vlans {
            match vlan_from_response(v, &ctx, now) {
                Ok((vlan, assignments)) => {
                    self.vlans.push(vlan);
                    self.assignments.extend(assignments);
                }
                Err(e) => warn!(vlan_id = v.vlan_id, error = %e, "skipping VLAN"),
            }
        }
        self.zones.push(zone);
    }
}

/// Flatten `GET /reports/network-hierarchy`.
pub(crate) fn flatten_hierarchy(resp: &HierarchyResponse, now: DateTime<Utc>) -> FlatTree {
    let mut flat = FlatTree::default();
    for entry in &resp.hierarchy {
        let domain_id = EntityId::from(entry.domain.id);
        match Domain::try_from(entry.domain.clone()) {
            Ok(mut domain) => {
                domain.value_stream_count = entry.value_streams.len();
                flat.domains.push(domain);
            }
            Err(e) => warn!(domain = %entry.domain.code, error = %e, "skipping domain"),
        }
        for vs in &entry.value_streams {
            for hz in &vs.zones {
                flat.push_zone(&hz.zone, &hz.vlans, Some(&domain_id), now);
            }
        }
    }
    flat
}

// ── Request → wire bodies ──────────────────────────────────────────

impl From<&CreateDomainRequest> for DomainCreate {
    fn from(req: &CreateDomainRequest) -> Self {
        DomainCreate {
            code: req.code.to_string(),
            name: req
                .name
                .clone()
                .unwrap_or_else(|| req.code.display_name().to_owned()),
            description: req.description.clone(),
            is_active: req.is_active,
        }
    }
}

impl From<&UpdateDomainRequest> for DomainUpdate {
    fn from(req: &UpdateDomainRequest) -> Self {
        DomainUpdate {
            name: req.name.clone(),
            description: req.description.clone(),
            is_active: req.is_active,
        }
    }
}

pub(crate) fn value_stream_create(
    domain_id: Uuid,
    req: &CreateValueStreamRequest,
) -> ValueStreamCreate {
    ValueStreamCreate {
        domain_id,
        code: req.code.clone(),
        name: req.name.clone().unwrap_or_else(|| req.code.clone()),
        description: req.description.clone(),
        is_active: req.is_active,
    }
}

pub(crate) fn zone_create(value_stream_id: Uuid, req: &CreateZoneRequest) -> ZoneCreate {
    ZoneCreate {
        value_stream_id,
        name: req.name.clone(),
        security_type: req.security_type.to_string(),
        zone_manager: req.zone_manager.clone(),
        description: req.description.clone(),
        is_active: req.is_active,
    }
}

pub(crate) fn vlan_create(
    zone_id: Uuid,
    vlan_id: u16,
    plan: &SubnetPlan,
    description: Option<String>,
    is_active: bool,
) -> VlanCreate {
    VlanCreate {
        zone_id,
        vlan_id,
        subnet: plan.network.to_string(),
        netmask: plan.netmask.as_addr().to_string(),
        description,
        is_active,
    }
}

impl From<&UpdateVlanRequest> for VlanUpdate {
    fn from(req: &UpdateVlanRequest) -> Self {
        VlanUpdate {
            description: req.description.clone(),
            is_active: req.is_active,
        }
    }
}

pub(crate) fn assignment_create(
    vlan_id: Uuid,
    ip: Ipv4Addr,
    req: &crate::command::AssignIpRequest,
) -> IpAssignmentCreate {
    IpAssignmentCreate {
        vlan_id,
        ip_address: ip.to_string(),
        ci_name: req.ci_name.clone(),
        mac_address: req.mac_address.as_ref().map(ToString::to_string),
        description: req.description.clone(),
        device_type: req.device_type.as_ref().map(ToString::to_string),
        is_active: true,
    }
}

impl From<&UpdateAssignmentRequest> for IpAssignmentUpdate {
    fn from(req: &UpdateAssignmentRequest) -> Self {
        IpAssignmentUpdate {
            mac_address: req.mac_address.as_ref().map(ToString::to_string),
            ci_name: req.ci_name.clone(),
            description: req.description.clone(),
            device_type: req.device_type.as_ref().map(ToString::to_string),
            is_active: req.is_active,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{DeviceStatus, DeviceType, VlanStatus};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        "2025-06-01T12:00:00Z".parse().unwrap()
    }

    fn vlan_json(assignments: serde_json::Value) -> VlanResponse {
        serde_json::from_value(json!({
            "id": "6f1d8c1e-0000-4000-8000-000000000101",
            "vlan_id": 101,
            "zone_id": "6f1d8c1e-0000-4000-8000-0000000000a2",
            "subnet": "10.1.1.0",
            "netmask": "255.255.255.0",
            "default_gateway": "10.1.1.1",
            "net_start": "10.1.1.7",
            "net_end": "10.1.1.254",
            "ip_assignments": assignments,
            "created_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    fn assignment_json(id: u8, ip: &str, name: &str, mac: &str) -> serde_json::Value {
        json!({
            "id": format!("6f1d8c1e-0000-4000-8000-0000000010{id:02}"),
            "vlan_id": "6f1d8c1e-0000-4000-8000-000000000101",
            "ip_address": ip,
            "ci_name": name,
            "mac_address": mac,
            "last_seen": "2025-06-01T11:00:00Z",
            "created_at": "2025-01-01T00:00:00Z"
        })
    }

    #[test]
    fn domain_rejects_unknown_code() {
        let resp: DomainResponse = serde_json::from_value(json!({
            "id": "6f1d8c1e-0000-4000-8000-000000000001",
            "code": "QA",
            "created_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(Domain::try_from(resp).is_err());
    }

    #[test]
    fn domain_name_defaults_to_code_display_name() {
        let resp: DomainResponse = serde_json::from_value(json!({
            "id": "6f1d8c1e-0000-4000-8000-000000000001",
            "code": "fcm",
            "value_streams": [{"id": "6f1d8c1e-0000-4000-8000-000000000011", "code": "BUILDING"}],
            "created_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap();
        let domain = Domain::try_from(resp).unwrap();
        assert_eq!(domain.code, DomainCode::Fcm);
        assert_eq!(domain.name, "Facility Management");
        assert_eq!(domain.value_stream_count, 1);
    }

    #[test]
    fn vlan_usage_is_derived_from_embedded_assignments() {
        let resp = vlan_json(json!([
            assignment_json(1, "10.1.1.10", "PLC-A2-MAIN", "00:1b:21:a2:01:01"),
            assignment_json(2, "10.1.1.11", "HMI-A2-OP1", "00:1B:21:A2:01:02"),
        ]));
        let (vlan, assignments) = vlan_from_response(&resp, &VlanContext::default(), now()).unwrap();
        assert_eq!(vlan.name, "VLAN 101");
        assert_eq!(vlan.total_ips, 248);
        assert_eq!(vlan.used_ips, 2);
        assert_eq!(vlan.utilization, 1);
        assert_eq!(vlan.status, VlanStatus::Active);
        assert_eq!(vlan.gateway, Ipv4Addr::new(10, 1, 1, 1));
        assert_eq!(assignments.len(), 2);
        assert_eq!(
            assignments[0].mac_address.as_ref().unwrap().as_str(),
            "00:1B:21:A2:01:01"
        );
    }

    #[test]
    fn stored_range_is_replaced_by_computed_range() {
        let resp: VlanResponse = serde_json::from_value(json!({
            "id": "6f1d8c1e-0000-4000-8000-000000000120",
            "vlan_id": 120,
            "subnet": "10.0.0.0",
            "netmask": "255.255.255.0",
            "default_gateway": "10.0.0.1",
            "net_start": "10.0.0.7",
            "net_end": "10.0.0.253",
            "created_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap();

        let (vlan, _) = vlan_from_response(&resp, &VlanContext::default(), now()).unwrap();
        assert_eq!(vlan.net_start, Ipv4Addr::new(10, 0, 0, 7));
        assert_eq!(vlan.net_end, Ipv4Addr::new(10, 0, 0, 254));
        let span = u32::from(vlan.net_end) - u32::from(vlan.net_start) + 1;
        assert_eq!(span, vlan.total_ips);
        assert_eq!(vlan.total_ips, 248);
    }

    #[test]
    fn malformed_mac_is_dropped_not_fatal() {
        let resp = vlan_json(json!([assignment_json(
            1,
            "10.2.1.10",
            "WMS-LOG21-SRV",
            "00:1B:21:LOG:01:01"
        )]));
        let (_, assignments) = vlan_from_response(&resp, &VlanContext::default(), now()).unwrap();
        assert!(assignments[0].mac_address.is_none());
    }

    #[test]
    fn assignment_keeps_reported_status_and_type() {
        let mut raw = assignment_json(1, "10.1.1.10", "AGV-001", "");
        raw["status"] = json!("conflict");
        raw["device_type"] = json!("Sensor");
        let resp: IpAssignmentResponse = serde_json::from_value(raw).unwrap();
        let a = IpAssignment::try_from(&resp).unwrap();
        assert_eq!(a.reported_status, Some(DeviceStatus::Conflict));
        assert_eq!(a.device_type, Some(DeviceType::Sensor));
        assert!(a.mac_address.is_none());
    }

    #[test]
    fn hierarchy_flattens_and_carries_zone_fields() {
        let resp: HierarchyResponse = serde_json::from_value(json!({
            "hierarchy": [{
                "domain": {
                    "id": "6f1d8c1e-0000-4000-8000-000000000001",
                    "code": "MFG",
                    "name": "Manufacturing",
                    "created_at": "2025-01-01T00:00:00Z"
                },
                "value_streams": [{
                    "value_stream": {"id": "6f1d8c1e-0000-4000-8000-000000000011", "code": "A2"},
                    "zones": [{
                        "zone": {
                            "id": "6f1d8c1e-0000-4000-8000-0000000000a2",
                            "name": "Manufacturing Zone A2",
                            "security_type": "MFZ_SL4",
                            "zone_manager": "Hans Mueller"
                        },
                        "vlans": [vlan_json(json!([]))]
                    }]
                }]
            }]
        }))
        .unwrap();
        let flat = flatten_hierarchy(&resp, now());
        assert_eq!(flat.domains.len(), 1);
        assert_eq!(flat.zones.len(), 1);
        assert_eq!(flat.zones[0].vlan_count, 1);
        let vlan = &flat.vlans[0];
        assert_eq!(vlan.domain_id, Some(flat.domains[0].id.clone()));
        assert_eq!(vlan.zone_name.as_deref(), Some("Manufacturing Zone A2"));
        assert_eq!(vlan.zone_manager.as_deref(), Some("Hans Mueller"));
        assert_eq!(vlan.security_type, Some(SecurityType::MfzSl4));
        assert_eq!(vlan.status, VlanStatus::Inactive);
    }

    #[test]
    fn creation_bodies_fill_defaults() {
        let domain: Uuid = "6f1d8c1e-0000-4000-8000-000000000011".parse().unwrap();
        let vs = value_stream_create(
            domain,
            &CreateValueStreamRequest {
                domain_id: EntityId::from(domain),
                code: "A7".into(),
                name: None,
                description: None,
                is_active: true,
            },
        );
        assert_eq!(vs.name, "A7");

        let zone = zone_create(
            domain,
            &CreateZoneRequest {
                value_stream_id: EntityId::from(domain),
                name: "A7 Line".into(),
                security_type: SecurityType::LrszSl4,
                zone_manager: None,
                description: None,
                is_active: true,
            },
        );
        assert_eq!(zone.security_type, "LRSZ_SL4");
    }

    #[test]
    fn health_timestamp_defaults_to_now() {
        let h = health_from_response(
            HealthResponse {
                status: "healthy".into(),
                service: "IP Management System".into(),
                version: "1.0.0".into(),
                timestamp: None,
            },
            now(),
        );
        assert_eq!(h.timestamp, now());
        assert!(h.is_healthy());
    }
}
