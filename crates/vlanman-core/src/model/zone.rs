// ── Security zones ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::entity_id::EntityId;

/// Security classification governing firewall and segmentation policy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum SecurityType {
    Sl3,
    MfzSl4,
    LogSl4,
    FmzSl4,
    EngSl4,
    LrszSl4,
    RszSl4,
}

impl SecurityType {
    pub fn description(self) -> &'static str {
        match self {
            Self::Sl3 => "Security level 3",
            Self::MfzSl4 => "Manufacturing zone, level 4",
            Self::LogSl4 => "Logistics zone, level 4",
            Self::FmzSl4 => "Facility zone, level 4",
            Self::EngSl4 => "Engineering zone, level 4",
            Self::LrszSl4 => "Local restricted zone, level 4",
            Self::RszSl4 => "Restricted zone, level 4",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: EntityId,
    pub value_stream_id: Option<EntityId>,
    /// Owning domain, when known from the hierarchy.
    pub domain_id: Option<EntityId>,
    pub name: String,
    pub security_type: SecurityType,
    pub zone_manager: Option<String>,
    pub description: Option<String>,
    pub last_firewall_check: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub vlan_count: usize,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn security_type_wire_names() {
        assert_eq!(SecurityType::MfzSl4.to_string(), "MFZ_SL4");
        assert_eq!(SecurityType::Sl3.to_string(), "SL3");
        assert_eq!("lrsz_sl4".parse::<SecurityType>().unwrap(), SecurityType::LrszSl4);
        let json = serde_json::to_string(&SecurityType::RszSl4).unwrap();
        assert_eq!(json, "\"RSZ_SL4\"");
    }
}
