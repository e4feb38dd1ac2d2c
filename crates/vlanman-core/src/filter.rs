// ── Filter and sort predicates for registry snapshots ──
//
// Applied by front ends to snapshots without re-querying the backend.

use std::cmp::Reverse;

use strum::{Display, EnumString};

use crate::model::{
    AssignmentView, DeviceStatus, DeviceType, EntityId, SecurityType, Vlan, VlanStatus,
};

/// Conjunctive VLAN filter. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct VlanFilter {
    pub domain_id: Option<EntityId>,
    pub zone_id: Option<EntityId>,
    pub status: Option<VlanStatus>,
    pub security_type: Option<SecurityType>,
    /// Case-insensitive substring over tag, name, subnet, zone and description.
    pub search: Option<String>,
}

impl VlanFilter {
    pub fn matches(&self, vlan: &Vlan) -> bool {
        if self.domain_id.as_ref().is_some_and(|d| vlan.domain_id.as_ref() != Some(d)) {
            return false;
        }
        if self.zone_id.as_ref().is_some_and(|z| vlan.zone_id.as_ref() != Some(z)) {
            return false;
        }
        if self.status.is_some_and(|s| vlan.status != s) {
            return false;
        }
        if self.security_type.is_some_and(|t| vlan.security_type != Some(t)) {
            return false;
        }
        match self.search.as_deref().map(str::to_lowercase) {
            Some(needle) if !needle.is_empty() => {
                let haystack = [
                    vlan.vlan_id.to_string(),
                    vlan.name.clone(),
                    vlan.cidr(),
                    vlan.zone_name.clone().unwrap_or_default(),
                    vlan.description.clone().unwrap_or_default(),
                ];
                haystack.iter().any(|h| h.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }
}

/// Conjunctive filter over derived assignment views.
#[derive(Debug, Clone, Default)]
pub struct AssignmentFilter {
    pub vlan_id: Option<EntityId>,
    pub status: Option<DeviceStatus>,
    pub device_type: Option<DeviceType>,
    /// Case-insensitive substring over CI name, IP, MAC and description.
    pub search: Option<String>,
    /// Also match released (inactive) records.
    pub include_released: bool,
}

impl AssignmentFilter {
    pub fn matches(&self, view: &AssignmentView) -> bool {
        let a = &view.assignment;
        if !self.include_released && !a.is_active {
            return false;
        }
        if self.vlan_id.as_ref().is_some_and(|v| a.vlan_id != *v) {
            return false;
        }
        if self.status.is_some_and(|s| view.status != s) {
            return false;
        }
        if self.device_type.is_some_and(|t| view.resolved_type != t) {
            return false;
        }
        match self.search.as_deref().map(str::to_lowercase) {
            Some(needle) if !needle.is_empty() => {
                a.ci_name.to_lowercase().contains(&needle)
                    || a.ip_address.to_string().contains(&needle)
                    || a
                        .mac_address
                        .as_ref()
                        .is_some_and(|m| m.as_str().to_lowercase().contains(&needle))
                    || a
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }
}

/// Sort keys offered for VLAN listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum VlanSort {
    #[default]
    VlanId,
    Subnet,
    Zone,
    /// Highest utilization first.
    Utilization,
    /// Most severe first: error, warning, active, inactive.
    Status,
}

fn status_rank(status: VlanStatus) -> u8 {
    match status {
        VlanStatus::Error => 0,
        VlanStatus::Warning => 1,
        VlanStatus::Active => 2,
        VlanStatus::Inactive => 3,
    }
}

/// Stable sort; ties keep tag order.
pub fn sort_vlans<V: AsRef<Vlan>>(vlans: &mut [V], by: VlanSort) {
    vlans.sort_by_key(|v| v.as_ref().vlan_id);
    match by {
        VlanSort::VlanId => {}
        VlanSort::Subnet => vlans.sort_by_key(|v| v.as_ref().subnet),
        VlanSort::Zone => vlans.sort_by(|a, b| a.as_ref().zone_name.cmp(&b.as_ref().zone_name)),
        VlanSort::Utilization => vlans.sort_by_key(|v| Reverse(v.as_ref().utilization)),
        VlanSort::Status => vlans.sort_by_key(|v| status_rank(v.as_ref().status)),
    }
}
