// Wire types for the IP-management REST API.
//
// Field names mirror the backend's snake_case JSON. Everything the backend
// may omit is `Option` or `#[serde(default)]` so older servers still parse.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Domains ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainResponse {
    pub id: Uuid,
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub value_streams: Vec<ValueStreamResponse>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainCreate {
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

// ── Value streams ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueStreamResponse {
    pub id: Uuid,
    #[serde(default)]
    pub domain_id: Option<Uuid>,
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub zones: Vec<ZoneResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueStreamCreate {
    pub domain_id: Uuid,
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_active: bool,
}

// ── Zones ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneResponse {
    pub id: Uuid,
    #[serde(default)]
    pub value_stream_id: Option<Uuid>,
    pub name: String,
    pub security_type: String,
    #[serde(default)]
    pub zone_manager: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub last_firewall_check: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub vlans: Vec<VlanResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneCreate {
    pub value_stream_id: Uuid,
    pub name: String,
    pub security_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_manager: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_active: bool,
}

// ── VLANs ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlanResponse {
    pub id: Uuid,
    pub vlan_id: u16,
    #[serde(default)]
    pub zone_id: Option<Uuid>,
    #[serde(default)]
    pub description: Option<String>,
    pub subnet: String,
    pub netmask: String,
    #[serde(alias = "default_gateway", default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub net_start: Option<String>,
    #[serde(default)]
    pub net_end: Option<String>,
    /// Owning zone, embedded by list endpoints. Boxed to break the
    /// zone → vlans → zone type recursion.
    #[serde(default)]
    pub zone: Option<Box<ZoneResponse>>,
    /// Owning domain, when the backend flattens the hierarchy for us.
    #[serde(default)]
    pub domain_id: Option<Uuid>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub ip_assignments: Vec<IpAssignmentResponse>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlanCreate {
    pub zone_id: Uuid,
    pub vlan_id: u16,
    pub subnet: String,
    pub netmask: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VlanUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Result of `GET /vlans/{id}/availability`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub vlan_id: Uuid,
    pub total_ips: u32,
    pub assigned_ips: u32,
    pub available_ips: u32,
    pub reserved_ips: u32,
    pub utilization_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextIpResponse {
    pub next_available_ip: String,
}

// ── IP assignments ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpAssignmentResponse {
    pub id: Uuid,
    pub vlan_id: Uuid,
    pub ip_address: String,
    pub ci_name: String,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_reserved: Option<bool>,
    /// Status as last reported by the backend (e.g. `"conflict"`).
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpAssignmentCreate {
    pub vlan_id: Uuid,
    pub ip_address: String,
    pub ci_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IpAssignmentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

// ── Reports ──────────────────────────────────────────────────────────

/// `GET /reports/network-hierarchy`: one entry per domain, each level
/// wrapped in its own object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyResponse {
    #[serde(default)]
    pub hierarchy: Vec<HierarchyDomain>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyDomain {
    pub domain: DomainResponse,
    #[serde(default)]
    pub value_streams: Vec<HierarchyValueStream>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyValueStream {
    pub value_stream: ValueStreamResponse,
    #[serde(default)]
    pub zones: Vec<HierarchyZone>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyZone {
    pub zone: ZoneResponse,
    #[serde(default)]
    pub vlans: Vec<VlanResponse>,
}

// ── System ───────────────────────────────────────────────────────────

/// `GET /health` at the service root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// FastAPI-style error bodies: `{"detail": "..."}` for `HTTPException`,
/// `{"error", "message", "type"}` for the global handlers.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

fn default_true() -> bool {
    true
}
