// ── VLAN domain types ──

use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{Display, EnumString};

use super::entity_id::EntityId;
use super::zone::SecurityType;
use crate::subnet::{Netmask, SubnetError, SubnetPlan};

/// Derived VLAN health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum VlanStatus {
    Active,
    Inactive,
    Warning,
    Error,
}

/// Address usage of one VLAN, recomputed from its assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VlanUsage {
    pub used_ips: u32,
    pub total_ips: u32,
    pub utilization: u32,
    pub status: VlanStatus,
}

/// A VLAN with the Domain → ValueStream → Zone chain flattened onto it.
#[derive(Debug, Clone, Serialize)]
pub struct Vlan {
    pub id: EntityId,
    pub domain_id: Option<EntityId>,
    pub zone_id: Option<EntityId>,
    /// 802.1Q tag, 1-4094.
    pub vlan_id: u16,
    pub name: String,
    pub description: Option<String>,
    pub subnet: Ipv4Addr,
    pub netmask: Netmask,
    pub gateway: Ipv4Addr,
    pub net_start: Ipv4Addr,
    pub net_end: Ipv4Addr,
    pub zone_name: Option<String>,
    pub zone_manager: Option<String>,
    pub security_type: Option<SecurityType>,
    pub last_firewall_check: Option<DateTime<Utc>>,
    pub status: VlanStatus,
    pub total_ips: u32,
    pub used_ips: u32,
    pub utilization: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Vlan {
    /// `10.1.1.0/24`
    pub fn cidr(&self) -> String {
        format!("{}/{}", self.subnet, self.netmask.prefix())
    }

    /// Recompute the subnet plan, keeping this VLAN's gateway.
    pub fn plan(&self) -> Result<SubnetPlan, SubnetError> {
        SubnetPlan::calculate(self.subnet, self.netmask, Some(self.gateway))
    }

    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        self.netmask.net(self.subnet).contains(&ip)
    }

    /// Inside `[net_start, net_end]` as stored on the record.
    pub fn in_assignable_range(&self, ip: Ipv4Addr) -> bool {
        (self.net_start..=self.net_end).contains(&ip)
    }

    pub fn apply_usage(&mut self, usage: VlanUsage) {
        self.used_ips = usage.used_ips;
        self.total_ips = usage.total_ips;
        self.utilization = usage.utilization;
        self.status = usage.status;
    }

    pub fn usage(&self) -> VlanUsage {
        VlanUsage {
            used_ips: self.used_ips,
            total_ips: self.total_ips,
            utilization: self.utilization,
            status: self.status,
        }
    }
}

impl AsRef<Vlan> for Vlan {
    fn as_ref(&self) -> &Vlan {
        self
    }
}
