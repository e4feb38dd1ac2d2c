// ── In-process implementation ──
//
// Holds the whole hierarchy in memory and applies the service's rules:
// unique domain codes and VLAN tags, subnet planning on create, and
// reserved / out-of-range / duplicate address rejection. Released
// assignments stay as inactive records, as on the real service.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{AssignmentScope, Backend, VlanScope};
use crate::command::{
    AssignIpRequest, CreateDomainRequest, CreateValueStreamRequest, CreateVlanRequest,
    CreateZoneRequest, UpdateAssignmentRequest, UpdateDomainRequest, UpdateVlanRequest,
};
use crate::derive;
use crate::error::CoreError;
use crate::model::{
    Domain, DomainCode, DomainTree, EntityId, HealthStatus, IpAssignment, MacAddress,
    SecurityType, ValueStream, Vlan, Zone,
};
use crate::subnet::{self, Availability, SubnetPlan};

const SERVICE_NAME: &str = "IP Management System (in-memory)";

#[derive(Debug, Clone)]
struct StoredVlan {
    id: EntityId,
    zone_id: EntityId,
    vlan_id: u16,
    plan: SubnetPlan,
    description: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct State {
    domains: BTreeMap<EntityId, Domain>,
    value_streams: BTreeMap<EntityId, ValueStream>,
    zones: BTreeMap<EntityId, Zone>,
    vlans: BTreeMap<EntityId, StoredVlan>,
    assignments: BTreeMap<EntityId, IpAssignment>,
}

/// `Backend` kept entirely in process.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: RwLock<State>,
    offline: AtomicBool,
}

impl MemoryBackend {
    /// An empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend pre-loaded with a small plant: four domains, their value
    /// streams and zones, thirteen VLANs and a handful of devices.
    pub fn with_sample_data() -> Self {
        let mut state = State::default();
        seed(&mut state, Utc::now());
        Self {
            state: RwLock::new(state),
            offline: AtomicBool::new(false),
        }
    }

    /// Simulate an outage: every call fails with a connection error until
    /// switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), CoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CoreError::ConnectionFailed {
                url: "memory://".into(),
                reason: "backend is offline".into(),
            });
        }
        Ok(())
    }
}

// ── Read helpers ─────────────────────────────────────────────────────

impl State {
    fn domain_view(&self, domain: &Domain) -> Domain {
        let mut d = domain.clone();
        d.value_stream_count = self
            .value_streams
            .values()
            .filter(|vs| vs.domain_id.as_ref() == Some(&domain.id))
            .count();
        d
    }

    fn zone_view(&self, zone: &Zone) -> Zone {
        let mut z = zone.clone();
        z.vlan_count = self.vlans.values().filter(|v| v.zone_id == zone.id).count();
        z
    }

    fn vlan_assignments(&self, vlan_id: &EntityId) -> Vec<&IpAssignment> {
        self.assignments
            .values()
            .filter(|a| &a.vlan_id == vlan_id)
            .collect()
    }

    fn vlan_view(&self, v: &StoredVlan, now: DateTime<Utc>) -> Vlan {
        let zone = self.zones.get(&v.zone_id);
        let usage = derive::vlan_usage(v.plan.total_ips, &self.vlan_assignments(&v.id), now);
        Vlan {
            id: v.id.clone(),
            domain_id: zone.and_then(|z| z.domain_id.clone()),
            zone_id: Some(v.zone_id.clone()),
            vlan_id: v.vlan_id,
            name: format!("VLAN {}", v.vlan_id),
            description: v.description.clone(),
            subnet: v.plan.network,
            netmask: v.plan.netmask,
            gateway: v.plan.gateway,
            net_start: v.plan.net_start,
            net_end: v.plan.net_end,
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
        }
    }

    fn vlan(&self, id: &EntityId) -> Result<&StoredVlan, CoreError> {
        self.vlans.get(id).ok_or_else(|| CoreError::not_found("VLAN", id))
    }

    fn domain_vlan_count(&self, domain_id: &EntityId) -> usize {
        self.vlans
            .values()
            .filter(|v| {
                self.zones
                    .get(&v.zone_id)
                    .is_some_and(|z| z.domain_id.as_ref() == Some(domain_id))
            })
            .count()
    }

    fn taken_addresses(&self, vlan_id: &EntityId) -> HashSet<Ipv4Addr> {
        self.vlan_assignments(vlan_id)
            .into_iter()
            .filter(|a| a.is_active)
            .map(|a| a.ip_address)
            .collect()
    }

    /// An active record other than `except` already holds `mac`.
    fn mac_holder(&self, mac: &MacAddress, except: Option<&EntityId>) -> Option<&IpAssignment> {
        self.assignments.values().find(|a| {
            a.is_active && a.mac_address.as_ref() == Some(mac) && Some(&a.id) != except
        })
    }
}

fn check_assignable(plan: &SubnetPlan, ip: Ipv4Addr) -> Result<(), CoreError> {
    if !plan.contains(ip) || !plan.in_assignable_range(ip) {
        return Err(CoreError::AddressOutOfRange {
            ip: ip.to_string(),
            start: plan.net_start.to_string(),
            end: plan.net_end.to_string(),
        });
    }
    if subnet::is_reserved(ip) {
        return Err(CoreError::ReservedAddress { ip: ip.to_string() });
    }
    Ok(())
}

impl Backend for MemoryBackend {
    // ── Domains ──────────────────────────────────────────────────────

    async fn list_domains(&self) -> Result<Vec<Domain>, CoreError> {
        self.ensure_online()?;
        let state = self.state.read().await;
        Ok(state.domains.values().map(|d| state.domain_view(d)).collect())
    }

    async fn get_domain(&self, id: &EntityId) -> Result<DomainTree, CoreError> {
        self.ensure_online()?;
        let state = self.state.read().await;
        let domain = state
            .domains
            .get(id)
            .ok_or_else(|| CoreError::not_found("Domain", id))?;
        let now = Utc::now();
        let zones: Vec<Zone> = state
            .zones
            .values()
            .filter(|z| z.domain_id.as_ref() == Some(id))
            .map(|z| state.zone_view(z))
            .collect();
        let zone_ids: HashSet<&EntityId> = zones.iter().map(|z| &z.id).collect();
        let vlans: Vec<Vlan> = state
            .vlans
            .values()
            .filter(|v| zone_ids.contains(&v.zone_id))
            .map(|v| state.vlan_view(v, now))
            .collect();
        let vlan_ids: HashSet<&EntityId> = vlans.iter().map(|v| &v.id).collect();
        let assignments = state
            .assignments
            .values()
            .filter(|a| vlan_ids.contains(&a.vlan_id))
            .cloned()
            .collect();
        Ok(DomainTree {
            domain: state.domain_view(domain),
            value_streams: state
                .value_streams
                .values()
                .filter(|vs| vs.domain_id.as_ref() == Some(id))
                .cloned()
                .collect(),
            zones,
            vlans,
            assignments,
        })
    }

    async fn create_domain(&self, req: &CreateDomainRequest) -> Result<Domain, CoreError> {
        self.ensure_online()?;
        let mut state = self.state.write().await;
        if state.domains.values().any(|d| d.code == req.code) {
            return Err(CoreError::DuplicateDomainCode {
                code: req.code.to_string(),
            });
        }
        let domain = Domain {
            id: EntityId::new_v4(),
            code: req.code,
            name: req
                .name
                .clone()
                .unwrap_or_else(|| req.code.display_name().to_owned()),
            description: req.description.clone(),
            value_stream_count: 0,
            is_active: req.is_active,
            created_at: Utc::now(),
            updated_at: None,
        };
        info!(code = %domain.code, "created domain");
        state.domains.insert(domain.id.clone(), domain.clone());
        Ok(domain)
    }

    async fn update_domain(
        &self,
        id: &EntityId,
        req: &UpdateDomainRequest,
    ) -> Result<Domain, CoreError> {
        self.ensure_online()?;
        let mut state = self.state.write().await;
        let domain = state
            .domains
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found("Domain", id))?;
        if let Some(name) = &req.name {
            domain.name.clone_from(name);
        }
        if let Some(description) = &req.description {
            domain.description = Some(description.clone());
        }
        if let Some(active) = req.is_active {
            domain.is_active = active;
        }
        domain.updated_at = Some(Utc::now());
        let domain = domain.clone();
        Ok(state.domain_view(&domain))
    }

    async fn delete_domain(&self, id: &EntityId) -> Result<(), CoreError> {
        self.ensure_online()?;
        let mut state = self.state.write().await;
        let domain = state
            .domains
            .get(id)
            .ok_or_else(|| CoreError::not_found("Domain", id))?;
        let count = state.domain_vlan_count(id);
        if count > 0 {
            return Err(CoreError::DependentResources {
                entity: format!("domain {}", domain.code),
                dependents: "VLANs".into(),
                count,
            });
        }
        state.domains.remove(id);
        state.value_streams.retain(|_, vs| vs.domain_id.as_ref() != Some(id));
        state.zones.retain(|_, z| z.domain_id.as_ref() != Some(id));
        debug!(%id, "deleted domain");
        Ok(())
    }

    // ── Value streams and zones ──────────────────────────────────────

    async fn create_value_stream(
        &self,
        req: &CreateValueStreamRequest,
    ) -> Result<ValueStream, CoreError> {
        self.ensure_online()?;
        let mut state = self.state.write().await;
        let domain = state
            .domains
            .get(&req.domain_id)
            .ok_or_else(|| CoreError::not_found("Domain", &req.domain_id))?;
        let code = req.code.trim();
        if state.value_streams.values().any(|vs| {
            vs.domain_id.as_ref() == Some(&req.domain_id) && vs.code.eq_ignore_ascii_case(code)
        }) {
            return Err(CoreError::DuplicateValueStreamCode {
                code: code.to_owned(),
                domain: domain.code.to_string(),
            });
        }
        let value_stream = ValueStream {
            id: EntityId::new_v4(),
            domain_id: Some(req.domain_id.clone()),
            code: code.to_owned(),
            name: req.name.clone().unwrap_or_else(|| code.to_owned()),
            description: req.description.clone(),
        };
        info!(code = %value_stream.code, domain = %domain.code, "created value stream");
        state
            .value_streams
            .insert(value_stream.id.clone(), value_stream.clone());
        Ok(value_stream)
    }

    async fn list_zones(&self, domain: Option<&EntityId>) -> Result<Vec<Zone>, CoreError> {
        self.ensure_online()?;
        let state = self.state.read().await;
        Ok(state
            .zones
            .values()
            .filter(|z| domain.is_none_or(|d| z.domain_id.as_ref() == Some(d)))
            .map(|z| state.zone_view(z))
            .collect())
    }

    async fn create_zone(&self, req: &CreateZoneRequest) -> Result<Zone, CoreError> {
        self.ensure_online()?;
        let mut state = self.state.write().await;
        let value_stream = state
            .value_streams
            .get(&req.value_stream_id)
            .ok_or_else(|| CoreError::not_found("Value stream", &req.value_stream_id))?;
        let zone = Zone {
            id: EntityId::new_v4(),
            value_stream_id: Some(value_stream.id.clone()),
            domain_id: value_stream.domain_id.clone(),
            name: req.name.trim().to_owned(),
            security_type: req.security_type,
            zone_manager: req.zone_manager.clone(),
            description: req.description.clone(),
            last_firewall_check: None,
            is_active: req.is_active,
            vlan_count: 0,
        };
        info!(zone = %zone.name, security_type = %zone.security_type, "created zone");
        state.zones.insert(zone.id.clone(), zone.clone());
        Ok(zone)
    }

    async fn record_firewall_check(&self, id: &EntityId) -> Result<Zone, CoreError> {
        self.ensure_online()?;
        let mut state = self.state.write().await;
        let zone = state
            .zones
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found("Zone", id))?;
        zone.last_firewall_check = Some(Utc::now());
        info!(zone = %zone.name, "recorded firewall check");
        let zone = zone.clone();
        Ok(state.zone_view(&zone))
    }

    // ── VLANs ────────────────────────────────────────────────────────

    async fn list_vlans(&self, scope: &VlanScope) -> Result<Vec<Vlan>, CoreError> {
        self.ensure_online()?;
        let state = self.state.read().await;
        let now = Utc::now();
        Ok(state
            .vlans
            .values()
            .map(|v| state.vlan_view(v, now))
            .filter(|v| scope.includes(v))
            .collect())
    }

    async fn get_vlan(&self, id: &EntityId) -> Result<Vlan, CoreError> {
        self.ensure_online()?;
        let state = self.state.read().await;
        let v = state.vlan(id)?;
        Ok(state.vlan_view(v, Utc::now()))
    }

    async fn create_vlan(&self, req: &CreateVlanRequest) -> Result<Vlan, CoreError> {
        self.ensure_online()?;
        let vlan_id = subnet::validate_vlan_id(req.vlan_id)?;
        let plan = SubnetPlan::from_strs(&req.subnet, &req.netmask)?;

        let mut state = self.state.write().await;
        if !state.zones.contains_key(&req.zone_id) {
            return Err(CoreError::not_found("Zone", &req.zone_id));
        }
        if state.vlans.values().any(|v| v.vlan_id == vlan_id) {
            return Err(CoreError::DuplicateVlanId { vlan_id });
        }
        let stored = StoredVlan {
            id: EntityId::new_v4(),
            zone_id: req.zone_id.clone(),
            vlan_id,
            plan,
            description: req.description.clone(),
            is_active: req.is_active,
            created_at: Utc::now(),
            updated_at: None,
        };
        info!(vlan_id, network = %stored.plan.cidr(), "created VLAN");
        let view = state.vlan_view(&stored, Utc::now());
        state.vlans.insert(stored.id.clone(), stored);
        Ok(view)
    }

    async fn update_vlan(&self, id: &EntityId, req: &UpdateVlanRequest) -> Result<Vlan, CoreError> {
        self.ensure_online()?;
        let mut state = self.state.write().await;
        let vlan = state
            .vlans
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found("VLAN", id))?;
        if let Some(description) = &req.description {
            vlan.description = Some(description.clone());
        }
        if let Some(active) = req.is_active {
            vlan.is_active = active;
        }
        vlan.updated_at = Some(Utc::now());
        let vlan = vlan.clone();
        Ok(state.vlan_view(&vlan, Utc::now()))
    }

    async fn delete_vlan(&self, id: &EntityId) -> Result<(), CoreError> {
        self.ensure_online()?;
        let mut state = self.state.write().await;
        let tag = state.vlan(id)?.vlan_id;
        let live = state.taken_addresses(id).len();
        if live > 0 {
            return Err(CoreError::DependentResources {
                entity: format!("VLAN {tag}"),
                dependents: "IP assignments".into(),
                count: live,
            });
        }
        state.vlans.remove(id);
        state.assignments.retain(|_, a| &a.vlan_id != id);
        debug!(vlan_id = tag, "deleted VLAN");
        Ok(())
    }

    async fn vlan_availability(&self, id: &EntityId) -> Result<Availability, CoreError> {
        self.ensure_online()?;
        let state = self.state.read().await;
        let vlan = state.vlan(id)?;
        let assigned = u32::try_from(state.taken_addresses(id).len()).unwrap_or(u32::MAX);
        Ok(vlan.plan.availability(assigned))
    }

    async fn next_available_ip(&self, id: &EntityId) -> Result<Ipv4Addr, CoreError> {
        self.ensure_online()?;
        let state = self.state.read().await;
        let vlan = state.vlan(id)?;
        subnet::next_available(&vlan.plan, &state.taken_addresses(id)).ok_or_else(|| {
            CoreError::PoolExhausted {
                vlan: vlan.vlan_id.to_string(),
            }
        })
    }

    // ── IP assignments ───────────────────────────────────────────────

    async fn list_assignments(
        &self,
        scope: &AssignmentScope,
    ) -> Result<Vec<IpAssignment>, CoreError> {
        self.ensure_online()?;
        let state = self.state.read().await;
        if let AssignmentScope::Vlan(id) = scope {
            state.vlan(id)?;
        }
        Ok(state
            .assignments
            .values()
            .filter(|a| scope.includes(a))
            .cloned()
            .collect())
    }

    async fn get_assignment(&self, id: &EntityId) -> Result<IpAssignment, CoreError> {
        self.ensure_online()?;
        let state = self.state.read().await;
        state
            .assignments
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("IP assignment", id))
    }

    async fn create_assignment(&self, req: &AssignIpRequest) -> Result<IpAssignment, CoreError> {
        self.ensure_online()?;
        if req.ci_name.trim().is_empty() {
            return Err(CoreError::validation("ci_name", "must not be empty"));
        }
        let mut state = self.state.write().await;
        let vlan = state.vlan(&req.vlan_id)?;
        let taken = state.taken_addresses(&req.vlan_id);
        let ip = match req.ip_address {
            Some(ip) => ip,
            None => subnet::next_available(&vlan.plan, &taken).ok_or_else(|| {
                CoreError::PoolExhausted {
                    vlan: vlan.vlan_id.to_string(),
                }
            })?,
        };
        check_assignable(&vlan.plan, ip)?;
        if taken.contains(&ip) {
            let holder = state
                .vlan_assignments(&req.vlan_id)
                .into_iter()
                .find(|a| a.is_active && a.ip_address == ip)
                .map_or_else(String::new, |a| a.ci_name.clone());
            return Err(CoreError::DuplicateAddress {
                ip: ip.to_string(),
                ci_name: holder,
            });
        }
        if let Some(mac) = &req.mac_address {
            if let Some(holder) = state.mac_holder(mac, None) {
                return Err(CoreError::DuplicateMac {
                    mac: mac.to_string(),
                    ci_name: holder.ci_name.clone(),
                });
            }
        }

        let now = Utc::now();
        let assignment = IpAssignment {
            id: EntityId::new_v4(),
            vlan_id: req.vlan_id.clone(),
            ip_address: ip,
            ci_name: req.ci_name.trim().to_owned(),
            mac_address: req.mac_address.clone(),
            description: req.description.clone(),
            device_type: req.device_type,
            reported_status: None,
            is_active: true,
            assigned_at: Some(now),
            last_seen: Some(now),
            created_at: now,
            updated_at: None,
        };
        info!(%ip, ci_name = %assignment.ci_name, "assigned address");
        state
            .assignments
            .insert(assignment.id.clone(), assignment.clone());
        Ok(assignment)
    }

    async fn update_assignment(
        &self,
        id: &EntityId,
        req: &UpdateAssignmentRequest,
    ) -> Result<IpAssignment, CoreError> {
        self.ensure_online()?;
        let mut state = self.state.write().await;
        let current = state
            .assignments
            .get(id)
            .ok_or_else(|| CoreError::not_found("IP assignment", id))?;
        if current.is_reserved() {
            return Err(CoreError::ReservedAddress {
                ip: current.ip_address.to_string(),
            });
        }
        if let Some(mac) = &req.mac_address {
            if let Some(holder) = state.mac_holder(mac, Some(id)) {
                return Err(CoreError::DuplicateMac {
                    mac: mac.to_string(),
                    ci_name: holder.ci_name.clone(),
                });
            }
        }
        let Some(assignment) = state.assignments.get_mut(id) else {
            return Err(CoreError::not_found("IP assignment", id));
        };
        if let Some(name) = &req.ci_name {
            assignment.ci_name.clone_from(name);
        }
        if let Some(mac) = &req.mac_address {
            assignment.mac_address = Some(mac.clone());
        }
        if let Some(description) = &req.description {
            assignment.description = Some(description.clone());
        }
        if let Some(device_type) = req.device_type {
            assignment.device_type = Some(device_type);
        }
        if let Some(active) = req.is_active {
            assignment.is_active = active;
        }
        assignment.updated_at = Some(Utc::now());
        Ok(assignment.clone())
    }

    async fn release_assignment(&self, id: &EntityId) -> Result<(), CoreError> {
        self.ensure_online()?;
        let mut state = self.state.write().await;
        let assignment = state
            .assignments
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found("IP assignment", id))?;
        if assignment.is_reserved() {
            return Err(CoreError::ReservedAddress {
                ip: assignment.ip_address.to_string(),
            });
        }
        assignment.is_active = false;
        assignment.updated_at = Some(Utc::now());
        info!(ip = %assignment.ip_address, ci_name = %assignment.ci_name, "released address");
        Ok(())
    }

    // ── System ───────────────────────────────────────────────────────

    async fn health(&self) -> Result<HealthStatus, CoreError> {
        self.ensure_online()?;
        Ok(HealthStatus {
            status: "healthy".into(),
            service: SERVICE_NAME.into(),
            version: env!("CARGO_PKG_VERSION").into(),
            timestamp: Utc::now(),
        })
    }
}

// ── Sample plant ─────────────────────────────────────────────────────

struct SeedZone {
    key: &'static str,
    domain: DomainCode,
    value_stream: &'static str,
    name: &'static str,
    security_type: SecurityType,
    manager: &'static str,
    /// Days since the last firewall review; `None` = never reviewed.
    checked_days_ago: Option<i64>,
}

#[rustfmt::skip]
const SEED_ZONES: &[SeedZone] = &[
    SeedZone { key: "a2", domain: DomainCode::Mfg, value_stream: "A2", name: "Manufacturing Zone A2", security_type: SecurityType::MfzSl4, manager: "Hans Mueller", checked_days_ago: Some(12) },
    SeedZone { key: "a4", domain: DomainCode::Mfg, value_stream: "A4", name: "Manufacturing Zone A4", security_type: SecurityType::MfzSl4, manager: "Anna Schmidt", checked_days_ago: Some(45) },
    SeedZone { key: "a6", domain: DomainCode::Mfg, value_stream: "A6", name: "Manufacturing Zone A6", security_type: SecurityType::MfzSl4, manager: "Klaus Weber", checked_days_ago: Some(3) },
    SeedZone { key: "a10", domain: DomainCode::Mfg, value_stream: "A10", name: "Manufacturing Zone A10", security_type: SecurityType::MfzSl4, manager: "Maria Fischer", checked_days_ago: None },
    SeedZone { key: "mco", domain: DomainCode::Mfg, value_stream: "MCO", name: "Manufacturing Control Zone", security_type: SecurityType::Sl3, manager: "Thomas Bauer", checked_days_ago: Some(20) },
    SeedZone { key: "log21", domain: DomainCode::Log, value_stream: "LOG21", name: "Logistics Zone 21", security_type: SecurityType::LogSl4, manager: "Stefan Wagner", checked_days_ago: Some(8) },
    SeedZone { key: "analyzer", domain: DomainCode::Fcm, value_stream: "ANALYZER", name: "Analyzer Zone", security_type: SecurityType::FmzSl4, manager: "Petra Hoffmann", checked_days_ago: Some(31) },
    SeedZone { key: "camera", domain: DomainCode::Fcm, value_stream: "CAMERA", name: "Security Camera Zone", security_type: SecurityType::FmzSl4, manager: "Michael Schulz", checked_days_ago: Some(2) },
    SeedZone { key: "building", domain: DomainCode::Fcm, value_stream: "BUILDING", name: "Building Systems Zone", security_type: SecurityType::FmzSl4, manager: "Sabine Koch", checked_days_ago: None },
    SeedZone { key: "testbench", domain: DomainCode::Eng, value_stream: "TESTBENCH", name: "Test Bench Zone", security_type: SecurityType::EngSl4, manager: "Robert Richter", checked_days_ago: Some(15) },
    SeedZone { key: "mes", domain: DomainCode::Mfg, value_stream: "MCO", name: "Nexeed MES Zone", security_type: SecurityType::LrszSl4, manager: "Thomas Bauer", checked_days_ago: Some(5) },
    SeedZone { key: "sql", domain: DomainCode::Mfg, value_stream: "MCO", name: "SQL Database Zone", security_type: SecurityType::LrszSl4, manager: "Thomas Bauer", checked_days_ago: Some(5) },
    SeedZone { key: "docker", domain: DomainCode::Mfg, value_stream: "MCO", name: "Docker Container Zone", security_type: SecurityType::LrszSl4, manager: "Thomas Bauer", checked_days_ago: Some(60) },
];

/// (tag, zone key, subnet, prefix, description)
const SEED_VLANS: &[(u16, &str, &str, u8, &str)] = &[
    (101, "a2", "10.1.1.0", 24, "Production line A2 controllers"),
    (102, "a4", "10.1.2.0", 24, "Production line A4 controllers"),
    (103, "a6", "10.1.3.0", 24, "Production line A6 controllers"),
    (104, "a10", "10.1.4.0", 24, "Production line A10 controllers"),
    (110, "mco", "10.1.10.0", 24, "Manufacturing control network"),
    (201, "log21", "10.2.1.0", 24, "Warehouse and AGV network"),
    (301, "analyzer", "10.3.1.0", 25, "Quality analyzers"),
    (302, "camera", "10.3.2.0", 24, "Security cameras"),
    (303, "building", "10.3.3.0", 24, "Building automation"),
    (401, "testbench", "10.4.1.0", 24, "Test benches"),
    (501, "mes", "10.5.1.0", 26, "Nexeed MES servers"),
    (502, "sql", "10.5.2.0", 27, "SQL database cluster"),
    (503, "docker", "10.5.3.0", 26, "Docker hosts"),
];

/// (VLAN tag, CI name, address, MAC, hours since last seen)
const SEED_DEVICES: &[(u16, &str, &str, &str, i64)] = &[
    (101, "PLC-A2-MAIN", "10.1.1.10", "00:1B:21:A2:01:01", 1),
    (101, "HMI-A2-OP1", "10.1.1.11", "00:1B:21:A2:01:02", 2),
    (101, "ROBOT-A2-R1", "10.1.1.12", "00:1B:21:A2:01:03", 1),
    (101, "GATEWAY-A2-UPLINK", "10.1.1.254", "00:1B:21:A2:01:FE", 1),
    (102, "PLC-A4-MAIN", "10.1.2.10", "00:1B:21:A4:01:01", 3),
    (102, "HMI-A4-OP1", "10.1.2.11", "00:1B:21:A4:01:02", 5),
    (201, "WMS-LOG21-SRV", "10.2.1.10", "00:1B:21:21:01:01", 1),
    (201, "AGV-LOG21-001", "10.2.1.11", "00:1B:21:21:01:02", 50),
    (301, "ANALYZER-QC-001", "10.3.1.10", "00:1B:21:3A:01:01", 4),
    (302, "CAMERA-SEC-001", "10.3.2.10", "00:1B:21:3C:01:01", 1),
    (302, "CAMERA-SEC-002", "10.3.2.11", "00:1B:21:3C:01:02", 30),
    (401, "TESTBENCH-TB001", "10.4.1.10", "00:1B:21:4E:01:01", 6),
    (501, "NEXEED-MES-SRV", "10.5.1.10", "00:1B:21:5A:01:01", 1),
    (502, "SQL-DB-PRIMARY", "10.5.2.10", "00:1B:21:5B:01:01", 1),
    (503, "DOCKER-HOST-001", "10.5.3.10", "00:1B:21:5C:01:01", 2),
];

fn seed(state: &mut State, now: DateTime<Utc>) {
    let created = now - TimeDelta::days(180);
    let domain_ids: HashMap<DomainCode, EntityId> = [
        DomainCode::Mfg,
        DomainCode::Log,
        DomainCode::Fcm,
        DomainCode::Eng,
    ]
    .into_iter()
    .map(|code| {
        let id = EntityId::from(format!("dom-{}", code.to_string().to_lowercase()));
        state.domains.insert(
            id.clone(),
            Domain {
                id: id.clone(),
                code,
                name: code.display_name().into(),
                description: Some(format!("{} domain", code.display_name())),
                value_stream_count: 0,
                is_active: true,
                created_at: created,
                updated_at: None,
            },
        );
        (code, id)
    })
    .collect();

    let mut zone_ids: BTreeMap<&str, EntityId> = BTreeMap::new();
    for z in SEED_ZONES {
        let Some(domain_id) = domain_ids.get(&z.domain) else {
            continue;
        };
        let vs_id = EntityId::from(format!("vs-{}", z.value_stream.to_lowercase()));
        state
            .value_streams
            .entry(vs_id.clone())
            .or_insert_with(|| ValueStream {
                id: vs_id.clone(),
                domain_id: Some(domain_id.clone()),
                code: z.value_stream.into(),
                name: format!("Value stream {}", z.value_stream),
                description: None,
            });
        let id = EntityId::from(format!("zone-{}", z.key));
        state.zones.insert(
            id.clone(),
            Zone {
                id: id.clone(),
                value_stream_id: Some(vs_id),
                domain_id: Some(domain_id.clone()),
                name: z.name.into(),
                security_type: z.security_type,
                zone_manager: Some(z.manager.into()),
                description: None,
                last_firewall_check: z.checked_days_ago.map(|d| now - TimeDelta::days(d)),
                is_active: true,
                vlan_count: 0,
            },
        );
        zone_ids.insert(z.key, id);
    }

    let mut vlan_ids: BTreeMap<u16, EntityId> = BTreeMap::new();
    for &(tag, zone_key, network, prefix, description) in SEED_VLANS {
        let (Some(zone_id), Ok(plan)) = (
            zone_ids.get(zone_key),
            SubnetPlan::from_strs(network, &prefix.to_string()),
        ) else {
            continue;
        };
        let id = EntityId::from(format!("vlan-{tag}"));
        state.vlans.insert(
            id.clone(),
            StoredVlan {
                id: id.clone(),
                zone_id: zone_id.clone(),
                vlan_id: tag,
                plan,
                description: Some(description.into()),
                is_active: true,
                created_at: created,
                updated_at: None,
            },
        );
        vlan_ids.insert(tag, id);
    }

    for &(tag, ci_name, ip, mac, seen_hours_ago) in SEED_DEVICES {
        let (Some(vlan_id), Ok(ip_address)) = (vlan_ids.get(&tag), subnet::parse_ipv4(ip)) else {
            continue;
        };
        let id = EntityId::from(format!("ip-{}", ci_name.to_lowercase()));
        state.assignments.insert(
            id.clone(),
            IpAssignment {
                id,
                vlan_id: vlan_id.clone(),
                ip_address,
                ci_name: ci_name.into(),
                mac_address: MacAddress::parse(mac).ok(),
                description: None,
                device_type: None,
                reported_status: None,
                is_active: true,
                assigned_at: Some(created),
                last_seen: Some(now - TimeDelta::hours(seen_hours_ago)),
                created_at: created,
                updated_at: None,
            },
        );
    }
}
