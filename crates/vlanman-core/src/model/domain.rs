// ── Domain and hierarchy types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::assignment::IpAssignment;
use super::entity_id::EntityId;
use super::vlan::Vlan;
use super::zone::Zone;

/// The four business domains a plant network is organised under.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum DomainCode {
    Mfg,
    Log,
    Fcm,
    Eng,
}

impl DomainCode {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Mfg => "Manufacturing",
            Self::Log => "Logistics",
            Self::Fcm => "Facility Management",
            Self::Eng => "Engineering",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domain {
    pub id: EntityId,
    pub code: DomainCode,
    pub name: String,
    pub description: Option<String>,
    pub value_stream_count: usize,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Product line or area inside a domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueStream {
    pub id: EntityId,
    pub domain_id: Option<EntityId>,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

/// A domain with everything below it, flattened level by level.
#[derive(Debug, Clone, Serialize)]
pub struct DomainTree {
    pub domain: Domain,
    pub value_streams: Vec<ValueStream>,
    pub zones: Vec<Zone>,
    pub vlans: Vec<Vlan>,
    pub assignments: Vec<IpAssignment>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn domain_codes_parse_case_insensitively() {
        assert_eq!("mfg".parse::<DomainCode>().unwrap(), DomainCode::Mfg);
        assert_eq!("ENG".parse::<DomainCode>().unwrap(), DomainCode::Eng);
        assert!("QA".parse::<DomainCode>().is_err());
    }

    #[test]
    fn exactly_four_codes() {
        let codes: Vec<String> = DomainCode::iter().map(|c| c.to_string()).collect();
        assert_eq!(codes, ["MFG", "LOG", "FCM", "ENG"]);
    }
}
