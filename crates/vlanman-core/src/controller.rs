// ── Controller facade ──
//
// Owns a backend and the DataStore. Fetches go through the registries'
// ticket bookkeeping so only the newest request writes; commands check
// business preconditions against freshly fetched data, call the backend
// and refetch whatever they touched.

use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::{AssignmentScope, Backend, HttpBackend, VlanScope};
use crate::command::{
    AssignIpRequest, Command, CommandResult, CreateValueStreamRequest, CreateVlanRequest,
    CreateZoneRequest,
};
use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::health::HealthState;
use crate::model::{DomainTree, EntityId, IpAssignment, MacAddress, ValueStream, Vlan};
use crate::report::{self, ComplianceReport, DomainSummary};
use crate::store::{DataStore, FetchOutcome};
use crate::subnet::{self, Availability, SubnetPlan};

/// Longest value-stream code the service stores.
const MAX_VALUE_STREAM_CODE: usize = 20;

/// Longest value-stream or zone name the service stores.
const MAX_NAME: usize = 100;

/// The main entry point for consumers.
///
/// Cheaply cloneable; clones share the backend, the store and the
/// background tasks.
pub struct Controller<B: Backend> {
    inner: Arc<ControllerInner<B>>,
}

impl<B: Backend> Clone for Controller<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ControllerInner<B> {
    config: ControllerConfig,
    backend: B,
    store: Arc<DataStore>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller<HttpBackend> {
    /// Build a controller over the REST API described by `config`.
    pub fn connect(config: ControllerConfig) -> Result<Self, CoreError> {
        let backend = HttpBackend::connect(&config.api_url, &config.transport())?;
        Ok(Self::new(config, backend))
    }
}

impl<B: Backend> Controller<B> {
    pub fn new(config: ControllerConfig, backend: B) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                config,
                backend,
                store: Arc::new(DataStore::new()),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    // ── Fetches ──────────────────────────────────────────────────────

    pub async fn fetch_domains(&self) -> Result<FetchOutcome, CoreError> {
        let registry = &self.inner.store.domains;
        let ticket = registry.begin();
        let result = self.inner.backend.list_domains().await;
        let outcome = registry.complete(ticket, result, |items, domains| {
            items.replace_all(domains);
        })?;
        self.inner.store.mark_refreshed(Utc::now());
        Ok(outcome)
    }

    /// Load one domain with everything below it and make it the selected
    /// domain. When domains are switched quickly only the last selection's
    /// data lands in the store.
    pub async fn fetch_domain(&self, id: &EntityId) -> Result<FetchOutcome, CoreError> {
        let store = &self.inner.store;
        store.set_selected_domain(Some(id.clone()));
        let ticket = store.vlans.begin();
        let result = self.inner.backend.get_domain(id).await;
        let outcome = store.vlans.complete(ticket, result, |vlans, tree: DomainTree| {
            let vlan_ids: HashSet<EntityId> = tree.vlans.iter().map(|v| v.id.clone()).collect();
            store.domains.items.upsert(tree.domain);
            store
                .zones
                .items
                .replace_where(|z| z.domain_id.as_ref() == Some(id), tree.zones);
            vlans.replace_where(|v| v.domain_id.as_ref() == Some(id), tree.vlans);
            store
                .assignments
                .items
                .replace_where(|a| vlan_ids.contains(&a.vlan_id), tree.assignments);
        })?;
        if outcome == FetchOutcome::Applied {
            debug!(domain = %id, vlans = store.domain_vlans(id).len(), "domain loaded");
            store.mark_refreshed(Utc::now());
        }
        Ok(outcome)
    }

    /// Change the selected domain; `None` clears the selection.
    pub async fn select_domain(&self, id: Option<&EntityId>) -> Result<FetchOutcome, CoreError> {
        match id {
            Some(id) => self.fetch_domain(id).await,
            None => {
                self.inner.store.set_selected_domain(None);
                Ok(FetchOutcome::Applied)
            }
        }
    }

    pub async fn fetch_zones(&self, domain: Option<&EntityId>) -> Result<FetchOutcome, CoreError> {
        let registry = &self.inner.store.zones;
        let ticket = registry.begin();
        let result = self.inner.backend.list_zones(domain).await;
        registry.complete(ticket, result, |items, zones| match domain {
            Some(d) => items.replace_where(|z| z.domain_id.as_ref() == Some(d), zones),
            None => items.replace_all(zones),
        })
    }

    pub async fn fetch_vlans(&self, scope: &VlanScope) -> Result<FetchOutcome, CoreError> {
        let registry = &self.inner.store.vlans;
        let ticket = registry.begin();
        let result = self.inner.backend.list_vlans(scope).await;
        let outcome = registry.complete(ticket, result, |items, vlans| {
            items.replace_where(|v| scope.includes(v), vlans);
        })?;
        self.inner.store.mark_refreshed(Utc::now());
        Ok(outcome)
    }

    pub async fn fetch_assignments(
        &self,
        scope: &AssignmentScope,
    ) -> Result<FetchOutcome, CoreError> {
        let registry = &self.inner.store.assignments;
        let ticket = registry.begin();
        let result = self.inner.backend.list_assignments(scope).await;
        registry.complete(ticket, result, |items, assignments| {
            items.replace_where(|a| scope.includes(a), assignments);
        })
    }

    /// Load every registry concurrently. The first failure is returned;
    /// the other registries still apply what they received.
    pub async fn refresh_all(&self) -> Result<(), CoreError> {
        let (domains, zones, vlans, assignments) = tokio::join!(
            self.fetch_domains(),
            self.fetch_zones(None),
            self.fetch_vlans(&VlanScope::All),
            self.fetch_assignments(&AssignmentScope::All),
        );
        domains?;
        zones?;
        vlans?;
        assignments?;
        Ok(())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Run one write operation: preconditions, backend call, refetch.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        let description = cmd.describe();
        debug!(command = %description, "executing");
        let result = self.route(cmd).await;
        match &result {
            Ok(_) => info!(command = %description, "command succeeded"),
            Err(e) => warn!(command = %description, error = %e, "command failed"),
        }
        result
    }

    async fn route(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        let store = &self.inner.store;
        let backend = &self.inner.backend;

        match cmd {
            // ── Domains ──────────────────────────────────────────────
            Command::CreateDomain(req) => {
                self.fetch_domains().await?;
                if store.domains.snapshot().iter().any(|d| d.code == req.code) {
                    return Err(CoreError::DuplicateDomainCode {
                        code: req.code.to_string(),
                    });
                }
                let domain = backend
                    .create_domain(&req)
                    .await
                    .inspect_err(|e| store.domains.record_error(e))?;
                self.fetch_domains().await?;
                Ok(CommandResult::Domain(domain))
            }

            Command::UpdateDomain { id, update } => {
                let domain = backend
                    .update_domain(&id, &update)
                    .await
                    .inspect_err(|e| store.domains.record_error(e))?;
                self.fetch_domains().await?;
                Ok(CommandResult::Domain(domain))
            }

            Command::DeleteDomain { id } => {
                self.fetch_vlans(&VlanScope::Domain(id.clone())).await?;
                let count = store.domain_vlans(&id).len();
                if count > 0 {
                    let entity = store
                        .domains
                        .get(&id)
                        .map_or_else(|| id.to_string(), |d| d.code.to_string());
                    return Err(CoreError::DependentResources {
                        entity: format!("domain {entity}"),
                        dependents: "VLANs".into(),
                        count,
                    });
                }
                backend
                    .delete_domain(&id)
                    .await
                    .inspect_err(|e| store.domains.record_error(e))?;
                if store.selected_domain_id().as_ref() == Some(&id) {
                    store.set_selected_domain(None);
                }
                store
                    .zones
                    .items
                    .replace_where(|z| z.domain_id.as_ref() == Some(&id), Vec::new());
                self.fetch_domains().await?;
                Ok(CommandResult::Ok)
            }

            // ── VLANs ────────────────────────────────────────────────
            Command::CreateVlan(req) => {
                self.check_new_vlan(&req).await?;
                let vlan = backend
                    .create_vlan(&req)
                    .await
                    .inspect_err(|e| store.vlans.record_error(e))?;
                self.fetch_vlans(&VlanScope::All).await?;
                Ok(CommandResult::Vlan(vlan))
            }

            Command::UpdateVlan { id, update } => {
                let vlan = backend
                    .update_vlan(&id, &update)
                    .await
                    .inspect_err(|e| store.vlans.record_error(e))?;
                self.fetch_vlans(&VlanScope::All).await?;
                Ok(CommandResult::Vlan(vlan))
            }

            Command::DeleteVlan { id } => {
                self.fetch_assignments(&AssignmentScope::Vlan(id.clone()))
                    .await?;
                let live = store
                    .vlan_assignments(&id)
                    .iter()
                    .filter(|a| a.is_active)
                    .count();
                if live > 0 {
                    let entity = store
                        .vlans
                        .get(&id)
                        .map_or_else(|| id.to_string(), |v| v.vlan_id.to_string());
                    return Err(CoreError::DependentResources {
                        entity: format!("VLAN {entity}"),
                        dependents: "IP assignments".into(),
                        count: live,
                    });
                }
                backend
                    .delete_vlan(&id)
                    .await
                    .inspect_err(|e| store.vlans.record_error(e))?;
                store
                    .assignments
                    .items
                    .replace_where(|a| a.vlan_id == id, Vec::new());
                self.fetch_vlans(&VlanScope::All).await?;
                Ok(CommandResult::Ok)
            }

            // ── IP assignments ───────────────────────────────────────
            Command::AssignIp(req) => {
                let req = self.check_new_assignment(req).await?;
                let assignment = backend
                    .create_assignment(&req)
                    .await
                    .inspect_err(|e| store.assignments.record_error(e))?;
                self.fetch_assignments(&AssignmentScope::Vlan(req.vlan_id.clone()))
                    .await?;
                Ok(CommandResult::Assignment(assignment))
            }

            Command::UpdateAssignment { id, update } => {
                let current = self.mutable_assignment(&id).await?;
                if let Some(mac) = &update.mac_address {
                    self.check_mac_unused(mac, Some(&id))?;
                }
                let assignment = backend
                    .update_assignment(&id, &update)
                    .await
                    .inspect_err(|e| store.assignments.record_error(e))?;
                self.fetch_assignments(&AssignmentScope::Vlan(current.vlan_id))
                    .await?;
                Ok(CommandResult::Assignment(assignment))
            }

            Command::ReleaseIp { id } => {
                let current = self.mutable_assignment(&id).await?;
                backend
                    .release_assignment(&id)
                    .await
                    .inspect_err(|e| store.assignments.record_error(e))?;
                self.fetch_assignments(&AssignmentScope::Vlan(current.vlan_id))
                    .await?;
                Ok(CommandResult::Ok)
            }

            // ── Value streams and zones ──────────────────────────────
            Command::CreateValueStream(req) => {
                let req = check_new_value_stream(req)?;
                let value_stream = backend
                    .create_value_stream(&req)
                    .await
                    .inspect_err(|e| store.domains.record_error(e))?;
                self.fetch_domains().await?;
                Ok(CommandResult::ValueStream(value_stream))
            }

            Command::CreateZone(req) => {
                let req = check_new_zone(req)?;
                let zone = backend
                    .create_zone(&req)
                    .await
                    .inspect_err(|e| store.zones.record_error(e))?;
                self.fetch_zones(None).await?;
                // The refetched record knows its domain.
                let zone = store.zones.get(&zone.id).map_or(zone, |z| (*z).clone());
                Ok(CommandResult::Zone(zone))
            }

            Command::RecordFirewallCheck { zone_id } => {
                let zone = backend
                    .record_firewall_check(&zone_id)
                    .await
                    .inspect_err(|e| store.zones.record_error(e))?;
                store.zones.items.upsert(zone.clone());
                self.fetch_vlans(&VlanScope::Zone(zone_id)).await?;
                Ok(CommandResult::Zone(zone))
            }
        }
    }

    // ── Preconditions ────────────────────────────────────────────────

    async fn check_new_vlan(&self, req: &CreateVlanRequest) -> Result<(), CoreError> {
        let vlan_id = subnet::validate_vlan_id(req.vlan_id)?;
        SubnetPlan::from_strs(&req.subnet, &req.netmask)?;
        self.fetch_vlans(&VlanScope::All).await?;
        if self
            .inner
            .store
            .vlans
            .snapshot()
            .iter()
            .any(|v| v.vlan_id == vlan_id)
        {
            return Err(CoreError::DuplicateVlanId { vlan_id });
        }
        Ok(())
    }

    /// Validate an assignment against the VLAN's current state and pin the
    /// address it will get.
    async fn check_new_assignment(
        &self,
        mut req: AssignIpRequest,
    ) -> Result<AssignIpRequest, CoreError> {
        let ci_name = req.ci_name.trim();
        if ci_name.is_empty() {
            return Err(CoreError::validation("ci_name", "must not be empty"));
        }
        req.ci_name = ci_name.to_owned();

        let store = &self.inner.store;
        // Checked locally only; a bare backend record lacks the flattened
        // zone and domain fields the registry holds.
        let vlan = self.inner.backend.get_vlan(&req.vlan_id).await?;
        self.fetch_assignments(&AssignmentScope::Vlan(req.vlan_id.clone()))
            .await?;

        let ip = match req.ip_address {
            Some(ip) => ip,
            None => self.suggest_ip(&req.vlan_id).await?,
        };
        check_assignable(&vlan, ip)?;
        if let Some(holder) = store
            .vlan_assignments(&req.vlan_id)
            .iter()
            .find(|a| a.is_active && a.ip_address == ip)
        {
            return Err(CoreError::DuplicateAddress {
                ip: ip.to_string(),
                ci_name: holder.ci_name.clone(),
            });
        }
        if let Some(mac) = &req.mac_address {
            self.check_mac_unused(mac, None)?;
        }
        req.ip_address = Some(ip);
        Ok(req)
    }

    /// Fetch an assignment that is about to change; reserved addresses are
    /// never modified.
    async fn mutable_assignment(&self, id: &EntityId) -> Result<IpAssignment, CoreError> {
        let current = self.inner.backend.get_assignment(id).await?;
        if current.is_reserved() {
            return Err(CoreError::ReservedAddress {
                ip: current.ip_address.to_string(),
            });
        }
        Ok(current)
    }

    /// Against the loaded registry; the backend has the final word.
    fn check_mac_unused(&self, mac: &MacAddress, except: Option<&EntityId>) -> Result<(), CoreError> {
        let snapshot = self.inner.store.assignments.snapshot();
        let holder = snapshot.iter().find(|a| {
            a.is_active && a.mac_address.as_ref() == Some(mac) && Some(&a.id) != except
        });
        match holder {
            Some(a) => Err(CoreError::DuplicateMac {
                mac: mac.to_string(),
                ci_name: a.ci_name.clone(),
            }),
            None => Ok(()),
        }
    }

    // ── Address pool ─────────────────────────────────────────────────

    pub async fn suggest_ip(&self, vlan_id: &EntityId) -> Result<Ipv4Addr, CoreError> {
        self.inner.backend.next_available_ip(vlan_id).await
    }

    pub async fn availability(&self, vlan_id: &EntityId) -> Result<Availability, CoreError> {
        self.inner.backend.vlan_availability(vlan_id).await
    }

    /// Value streams of one domain, straight from the backend.
    pub async fn value_streams(&self, domain_id: &EntityId) -> Result<Vec<ValueStream>, CoreError> {
        Ok(self.inner.backend.get_domain(domain_id).await?.value_streams)
    }

    // ── Reports ──────────────────────────────────────────────────────

    /// Firewall-review compliance over the loaded zones.
    pub fn compliance_report(&self) -> ComplianceReport {
        let zones = self.inner.store.zones.snapshot();
        report::compliance(&zones, self.inner.config.compliance_check_days, Utc::now())
    }

    /// Loaded VLANs with fresh usage, most utilized first.
    pub fn utilization_report(&self) -> Vec<Vlan> {
        report::utilization(&self.inner.store, Utc::now())
    }

    pub fn domain_summaries(&self) -> Vec<DomainSummary> {
        report::domain_summaries(&self.inner.store, Utc::now())
    }

    // ── Health ───────────────────────────────────────────────────────

    /// Ask the backend once and publish the result. Never fails: an
    /// unreachable backend is a state, not an error.
    pub async fn check_health(&self) -> HealthState {
        let store = &self.inner.store;
        let previous = store.health();
        let state = match self.inner.backend.health().await {
            Ok(status) => HealthState::from_status(status),
            Err(e) => HealthState::Unreachable {
                error: e.to_string(),
                at: Utc::now(),
            },
        };
        if previous.label() != state.label() {
            match &state {
                HealthState::Unreachable { error, .. } => {
                    warn!(error = %error, "backend unreachable");
                }
                other => info!(state = other.label(), "backend health changed"),
            }
        }
        store.set_health(state.clone());
        state
    }

    /// Check health every `period` until [`shutdown`](Self::shutdown).
    /// The first check runs immediately.
    pub async fn spawn_health_poller(&self, period: Duration) {
        let ctrl = self.clone();
        let cancel = self.inner.cancel.clone();
        let handle = tokio::spawn(health_task(ctrl, period, cancel));
        self.inner.task_handles.lock().await.push(handle);
    }

    /// Cancel background tasks and wait for them to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("controller shut down");
    }
}

// ── Background tasks ─────────────────────────────────────────────────

async fn health_task<B: Backend>(
    controller: Controller<B>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                controller.check_health().await;
            }
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn check_name(field: &str, raw: &str, max: usize) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::validation(field, "must not be empty"));
    }
    if trimmed.chars().count() > max {
        return Err(CoreError::validation(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(trimmed.to_owned())
}

fn check_new_value_stream(
    mut req: CreateValueStreamRequest,
) -> Result<CreateValueStreamRequest, CoreError> {
    req.code = check_name("code", &req.code, MAX_VALUE_STREAM_CODE)?;
    req.name = req
        .name
        .as_deref()
        .map(|name| check_name("name", name, MAX_NAME))
        .transpose()?;
    Ok(req)
}

fn check_new_zone(mut req: CreateZoneRequest) -> Result<CreateZoneRequest, CoreError> {
    req.name = check_name("name", &req.name, MAX_NAME)?;
    req.zone_manager = req
        .zone_manager
        .filter(|m| !m.trim().is_empty())
        .map(|m| m.trim().to_owned());
    Ok(req)
}

fn check_assignable(vlan: &Vlan, ip: Ipv4Addr) -> Result<(), CoreError> {
    if !vlan.contains(ip) || !vlan.in_assignable_range(ip) {
        return Err(CoreError::AddressOutOfRange {
            ip: ip.to_string(),
            start: vlan.net_start.to_string(),
            end: vlan.net_end.to_string(),
        });
    }
    if subnet::is_reserved(ip) {
        return Err(CoreError::ReservedAddress { ip: ip.to_string() });
    }
    Ok(())
}
