// ── Central reactive data store ──
//
// One registry per resource plus the selection, health and refresh
// metadata front ends render from. Derived views (device status, VLAN
// usage) are computed here on read through `derive`, never stored.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::registry::Registry;
use crate::derive;
use crate::health::HealthState;
use crate::model::{
    AssignmentView, Domain, EntityId, IpAssignment, Vlan, VlanUsage, Zone,
};
use crate::filter::{AssignmentFilter, VlanFilter, VlanSort, sort_vlans};

pub struct DataStore {
    pub(crate) domains: Registry<Domain>,
    pub(crate) zones: Registry<Zone>,
    pub(crate) vlans: Registry<Vlan>,
    pub(crate) assignments: Registry<IpAssignment>,
    pub(crate) selected_domain: watch::Sender<Option<EntityId>>,
    pub(crate) health: watch::Sender<HealthState>,
    pub(crate) last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl DataStore {
    pub fn new() -> Self {
        let (selected_domain, _) = watch::channel(None);
        let (health, _) = watch::channel(HealthState::Unknown);
        let (last_refresh, _) = watch::channel(None);

        Self {
            domains: Registry::new("domains"),
            zones: Registry::new("zones"),
            vlans: Registry::new("vlans"),
            assignments: Registry::new("ip_assignments"),
            selected_domain,
            health,
            last_refresh,
        }
    }

    // ── Registries ───────────────────────────────────────────────────

    pub fn domains(&self) -> &Registry<Domain> {
        &self.domains
    }

    pub fn zones(&self) -> &Registry<Zone> {
        &self.zones
    }

    pub fn vlans(&self) -> &Registry<Vlan> {
        &self.vlans
    }

    pub fn assignments(&self) -> &Registry<IpAssignment> {
        &self.assignments
    }

    // ── Selection ────────────────────────────────────────────────────

    pub fn selected_domain(&self) -> Option<Arc<Domain>> {
        let id = self.selected_domain.borrow().clone()?;
        self.domains.get(&id)
    }

    pub fn selected_domain_id(&self) -> Option<EntityId> {
        self.selected_domain.borrow().clone()
    }

    pub(crate) fn set_selected_domain(&self, id: Option<EntityId>) {
        self.selected_domain.send_replace(id);
    }

    // ── Health & metadata ────────────────────────────────────────────

    pub fn health(&self) -> HealthState {
        self.health.borrow().clone()
    }

    pub fn watch_health(&self) -> watch::Receiver<HealthState> {
        self.health.subscribe()
    }

    pub(crate) fn set_health(&self, state: HealthState) {
        self.health.send_replace(state);
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    pub(crate) fn mark_refreshed(&self, at: DateTime<Utc>) {
        self.last_refresh.send_replace(Some(at));
    }

    // ── Derived views ────────────────────────────────────────────────

    /// Assignments of one VLAN, in address order.
    pub fn vlan_assignments(&self, vlan_id: &EntityId) -> Vec<Arc<IpAssignment>> {
        self.assignments
            .snapshot()
            .iter()
            .filter(|a| &a.vlan_id == vlan_id)
            .cloned()
            .collect()
    }

    /// Every assignment with its derived status and resolved device type.
    /// Siblings for conflict detection are the other records of the same
    /// VLAN.
    pub fn assignment_views(&self, now: DateTime<Utc>) -> Vec<AssignmentView> {
        let snapshot = self.assignments.snapshot();
        let mut by_vlan: HashMap<&EntityId, Vec<&IpAssignment>> = HashMap::new();
        for a in snapshot.iter() {
            by_vlan.entry(&a.vlan_id).or_default().push(a);
        }
        snapshot
            .iter()
            .map(|a| {
                let siblings = by_vlan.get(&a.vlan_id).map_or(&[][..], Vec::as_slice);
                view(a, siblings, now)
            })
            .collect()
    }

    pub fn filtered_assignments(
        &self,
        filter: &AssignmentFilter,
        now: DateTime<Utc>,
    ) -> Vec<AssignmentView> {
        self.assignment_views(now)
            .into_iter()
            .filter(|v| filter.matches(v))
            .collect()
    }

    /// Usage of `vlan` recomputed from the assignment registry. Falls back
    /// to the counts the VLAN was fetched with when none of its
    /// assignments are loaded.
    pub fn vlan_usage(&self, vlan: &Vlan, now: DateTime<Utc>) -> VlanUsage {
        let assignments = self.vlan_assignments(&vlan.id);
        if assignments.is_empty() {
            return vlan.usage();
        }
        let refs: Vec<&IpAssignment> = assignments.iter().map(AsRef::as_ref).collect();
        derive::vlan_usage(vlan.total_ips, &refs, now)
    }

    /// VLAN snapshot with usage refreshed from loaded assignments.
    pub fn vlans_with_usage(&self, now: DateTime<Utc>) -> Vec<Vlan> {
        self.vlans
            .snapshot()
            .iter()
            .map(|v| {
                let mut vlan = Vlan::clone(v);
                vlan.apply_usage(self.vlan_usage(v, now));
                vlan
            })
            .collect()
    }

    pub fn filtered_vlans(&self, filter: &VlanFilter, sort: VlanSort, now: DateTime<Utc>) -> Vec<Vlan> {
        let mut vlans: Vec<Vlan> = self
            .vlans_with_usage(now)
            .into_iter()
            .filter(|v| filter.matches(v))
            .collect();
        sort_vlans(&mut vlans, sort);
        vlans
    }

    /// VLANs owned by the given domain.
    pub fn domain_vlans(&self, domain_id: &EntityId) -> Vec<Arc<Vlan>> {
        self.vlans
            .snapshot()
            .iter()
            .filter(|v| v.domain_id.as_ref() == Some(domain_id))
            .cloned()
            .collect()
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

fn view(a: &Arc<IpAssignment>, siblings: &[&IpAssignment], now: DateTime<Utc>) -> AssignmentView {
    AssignmentView {
        assignment: Arc::clone(a),
        status: derive::device_status(a, siblings.iter().copied(), now),
        resolved_type: derive::resolve_device_type(a),
        is_reserved: a.is_reserved(),
    }
}
