// ── Reports ──
//
// Audit views computed from the loaded registries: firewall-review
// compliance per security type, VLAN utilization and per-domain totals.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::derive;
use crate::model::{DomainCode, EntityId, SecurityType, Vlan, VlanStatus, Zone};
use crate::store::DataStore;
use crate::filter::{VlanSort, sort_vlans};

// ── Compliance ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ZoneCheck {
    pub zone_id: EntityId,
    pub zone_name: String,
    pub zone_manager: Option<String>,
    pub last_check: Option<DateTime<Utc>>,
    pub days_since_check: Option<i64>,
    pub overdue: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityGroup {
    pub security_type: SecurityType,
    pub description: &'static str,
    pub zones: Vec<ZoneCheck>,
}

impl SecurityGroup {
    pub fn overdue(&self) -> usize {
        self.zones.iter().filter(|z| z.overdue).count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceReport {
    pub generated_at: DateTime<Utc>,
    pub check_days: u32,
    /// One group per security type, empty ones included.
    pub groups: Vec<SecurityGroup>,
    pub total_zones: usize,
    pub overdue_checks: usize,
}

/// Never reviewed, or reviewed more than `check_days` whole days ago.
pub fn is_overdue(last_check: Option<DateTime<Utc>>, check_days: u32, now: DateTime<Utc>) -> bool {
    last_check.is_none_or(|at| (now - at).num_days() > i64::from(check_days))
}

pub fn compliance(zones: &[Arc<Zone>], check_days: u32, now: DateTime<Utc>) -> ComplianceReport {
    let groups: Vec<SecurityGroup> = SecurityType::iter()
        .map(|security_type| SecurityGroup {
            security_type,
            description: security_type.description(),
            zones: zones
                .iter()
                .filter(|z| z.security_type == security_type)
                .map(|z| ZoneCheck {
                    zone_id: z.id.clone(),
                    zone_name: z.name.clone(),
                    zone_manager: z.zone_manager.clone(),
                    last_check: z.last_firewall_check,
                    days_since_check: z.last_firewall_check.map(|at| (now - at).num_days()),
                    overdue: is_overdue(z.last_firewall_check, check_days, now),
                })
                .collect(),
        })
        .collect();

    ComplianceReport {
        generated_at: now,
        check_days,
        total_zones: groups.iter().map(|g| g.zones.len()).sum(),
        overdue_checks: groups.iter().map(SecurityGroup::overdue).sum(),
        groups,
    }
}

// ── Utilization ──────────────────────────────────────────────────────

/// Every loaded VLAN with usage recomputed, highest utilization first.
pub fn utilization(store: &DataStore, now: DateTime<Utc>) -> Vec<Vlan> {
    let mut vlans = store.vlans_with_usage(now);
    sort_vlans(&mut vlans, VlanSort::Utilization);
    vlans
}

// ── Domain summary ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct DomainSummary {
    pub domain_id: EntityId,
    pub code: DomainCode,
    pub name: String,
    pub vlan_count: usize,
    pub used_ips: u32,
    pub total_ips: u32,
    pub utilization: u32,
    /// VLANs currently in warning or error.
    pub vlans_needing_attention: usize,
}

pub fn domain_summaries(store: &DataStore, now: DateTime<Utc>) -> Vec<DomainSummary> {
    let vlans = store.vlans_with_usage(now);
    store
        .domains()
        .snapshot()
        .iter()
        .map(|d| {
            let owned: Vec<&Vlan> = vlans
                .iter()
                .filter(|v| v.domain_id.as_ref() == Some(&d.id))
                .collect();
            let used_ips = owned.iter().fold(0u32, |acc, v| acc.saturating_add(v.used_ips));
            let total_ips = owned.iter().fold(0u32, |acc, v| acc.saturating_add(v.total_ips));
            DomainSummary {
                domain_id: d.id.clone(),
                code: d.code,
                name: d.name.clone(),
                vlan_count: owned.len(),
                used_ips,
                total_ips,
                utilization: derive::utilization(used_ips, total_ips),
                vlans_needing_attention: owned
                    .iter()
                    .filter(|v| matches!(v.status, VlanStatus::Warning | VlanStatus::Error))
                    .count(),
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        "2025-06-01T12:00:00Z".parse().unwrap()
    }

    fn zone(name: &str, security_type: SecurityType, checked_days_ago: Option<i64>) -> Arc<Zone> {
        Arc::new(Zone {
            id: EntityId::from(format!("zone-{name}")),
            value_stream_id: None,
            domain_id: None,
            name: name.into(),
            security_type,
            zone_manager: None,
            description: None,
            last_firewall_check: checked_days_ago.map(|d| now() - TimeDelta::days(d)),
            is_active: true,
            vlan_count: 0,
        })
    }

    #[test]
    fn thirty_days_is_not_yet_overdue() {
        let at = now() - TimeDelta::days(30);
        assert!(!is_overdue(Some(at), 30, now()));
        assert!(is_overdue(Some(at - TimeDelta::days(1)), 30, now()));
        assert!(is_overdue(None, 30, now()));
    }

    #[test]
    fn compliance_groups_every_security_type() {
        let zones = [
            zone("A2", SecurityType::MfzSl4, Some(12)),
            zone("A4", SecurityType::MfzSl4, Some(45)),
            zone("A10", SecurityType::MfzSl4, None),
            zone("LOG21", SecurityType::LogSl4, Some(8)),
        ];
        let report = compliance(&zones, 30, now());
        assert_eq!(report.groups.len(), 7);
        assert_eq!(report.total_zones, 4);
        assert_eq!(report.overdue_checks, 2);

        let mfz = report
            .groups
            .iter()
            .find(|g| g.security_type == SecurityType::MfzSl4)
            .unwrap();
        assert_eq!(mfz.zones.len(), 3);
        assert_eq!(mfz.overdue(), 2);
        assert_eq!(mfz.zones[0].days_since_check, Some(12));

        let rsz = report
            .groups
            .iter()
            .find(|g| g.security_type == SecurityType::RszSl4)
            .unwrap();
        assert!(rsz.zones.is_empty());
    }

    fn big_vlan(id: &str, domain: &EntityId, total_ips: u32) -> Vlan {
        Vlan {
            id: EntityId::from(id),
            domain_id: Some(domain.clone()),
            zone_id: None,
            vlan_id: 900,
            name: id.into(),
            description: None,
            subnet: "10.0.0.0".parse().unwrap(),
            netmask: crate::subnet::Netmask::from_prefix(16).unwrap(),
            gateway: "10.0.0.1".parse().unwrap(),
            net_start: "10.0.0.7".parse().unwrap(),
            net_end: "10.0.255.254".parse().unwrap(),
            zone_name: None,
            zone_manager: None,
            security_type: None,
            last_firewall_check: None,
            status: VlanStatus::Inactive,
            total_ips,
            used_ips: 0,
            utilization: 0,
            is_active: true,
            created_at: now(),
            updated_at: None,
        }
    }

    #[test]
    fn domain_totals_saturate_instead_of_overflowing() {
        let store = DataStore::new();
        let domain_id = EntityId::from("dom-mfg");
        store.domains.items.replace_all(vec![crate::model::Domain {
            id: domain_id.clone(),
            code: DomainCode::Mfg,
            name: "Manufacturing".into(),
            description: None,
            value_stream_count: 0,
            is_active: true,
            created_at: now(),
            updated_at: None,
        }]);
        store.vlans.items.replace_all(vec![
            big_vlan("vlan-a", &domain_id, u32::MAX - 10),
            big_vlan("vlan-b", &domain_id, 65_528),
        ]);

        let summaries = domain_summaries(&store, now());
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].vlan_count, 2);
        assert_eq!(summaries[0].total_ips, u32::MAX);
        assert_eq!(summaries[0].used_ips, 0);
    }

    #[test]
    fn stricter_window_flags_more_zones() {
        let zones = [zone("A2", SecurityType::MfzSl4, Some(12))];
        assert_eq!(compliance(&zones, 30, now()).overdue_checks, 0);
        assert_eq!(compliance(&zones, 7, now()).overdue_checks, 1);
    }
}
