// ── IP assignment (device) types ──

use std::net::Ipv4Addr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::entity_id::{EntityId, MacAddress};
use crate::subnet;

/// Device catalog shown in the assignment form.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum DeviceType {
    #[serde(rename = "PLC")]
    #[strum(serialize = "PLC")]
    Plc,
    #[serde(rename = "HMI")]
    #[strum(serialize = "HMI")]
    Hmi,
    #[serde(rename = "Robot Controller")]
    #[strum(serialize = "Robot Controller", serialize = "robot")]
    RobotController,
    #[serde(rename = "Vision System")]
    #[strum(serialize = "Vision System", serialize = "camera")]
    VisionSystem,
    Sensor,
    Gateway,
    Switch,
    Server,
    Analyzer,
    #[serde(rename = "Test Equipment")]
    #[strum(serialize = "Test Equipment", serialize = "testbench")]
    TestEquipment,
    #[serde(rename = "Unknown Device")]
    #[strum(serialize = "Unknown Device", serialize = "unknown")]
    Unknown,
}

/// Derived per-device status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DeviceStatus {
    Active,
    Inactive,
    Reserved,
    Conflict,
}

/// A device-to-IP binding inside one VLAN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpAssignment {
    pub id: EntityId,
    pub vlan_id: EntityId,
    pub ip_address: Ipv4Addr,
    /// Configuration-item name of the device.
    pub ci_name: String,
    pub mac_address: Option<MacAddress>,
    pub description: Option<String>,
    /// Explicitly chosen type; `None` means infer from `ci_name`.
    pub device_type: Option<DeviceType>,
    /// Status as the backend last reported it, if any.
    pub reported_status: Option<DeviceStatus>,
    pub is_active: bool,
    pub assigned_at: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl IpAssignment {
    pub fn is_reserved(&self) -> bool {
        subnet::is_reserved(self.ip_address)
    }

    /// Best evidence of when the device was last alive.
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_seen
            .or(self.updated_at)
            .unwrap_or(self.created_at)
    }
}

/// An assignment with its derived fields, as every list and detail view
/// shows it.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentView {
    #[serde(flatten)]
    pub assignment: Arc<IpAssignment>,
    pub status: DeviceStatus,
    #[serde(rename = "resolved_device_type")]
    pub resolved_type: DeviceType,
    pub is_reserved: bool,
}
