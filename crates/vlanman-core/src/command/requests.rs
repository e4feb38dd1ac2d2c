// ── Typed request structs for Command payloads ──

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::model::{DeviceType, DomainCode, EntityId, MacAddress, SecurityType};

// ── Domain ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDomainRequest {
    pub code: DomainCode,
    /// Defaults to the code's display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDomainRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

// ── Value stream / zone ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateValueStreamRequest {
    pub domain_id: EntityId,
    /// Unique within the domain, at most 20 characters.
    pub code: String,
    /// Defaults to the code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateZoneRequest {
    pub value_stream_id: EntityId,
    pub name: String,
    pub security_type: SecurityType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_manager: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_active: bool,
}

// ── VLAN ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVlanRequest {
    pub zone_id: EntityId,
    /// Checked against 1-4094 before anything is sent.
    pub vlan_id: u32,
    pub subnet: String,
    /// Dotted quad, `/24` or `24`.
    pub netmask: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateVlanRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

// ── IP assignment ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignIpRequest {
    pub vlan_id: EntityId,
    /// `None` picks the next free address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<Ipv4Addr>,
    pub ci_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<MacAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<DeviceType>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAssignmentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<MacAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<DeviceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpdateAssignmentRequest {
    pub fn is_empty(&self) -> bool {
        self.ci_name.is_none()
            && self.mac_address.is_none()
            && self.description.is_none()
            && self.device_type.is_none()
            && self.is_active.is_none()
    }
}
