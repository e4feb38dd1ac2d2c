// ── Core identity types ──
//
// EntityId identifies every record the backend hands out; MacAddress is
// the validated hardware address carried by IP assignments.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

// ── EntityId ────────────────────────────────────────────────────────

/// Canonical identifier for a domain, VLAN, zone or assignment.
///
/// The backend issues UUIDs; anything else (hand-written fixtures, older
/// exports) is kept verbatim as an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Uuid(Uuid),
    Opaque(String),
}

impl EntityId {
    pub fn new_v4() -> Self {
        Self::Uuid(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            Self::Uuid(u) => Some(u),
            Self::Opaque(_) => None,
        }
    }

    /// The UUID the REST API expects, or a validation error naming `what`.
    pub fn require_uuid(&self, what: &str) -> Result<Uuid, CoreError> {
        self.as_uuid().copied().ok_or_else(|| CoreError::Validation {
            field: what.to_owned(),
            message: format!("'{self}' is not a UUID"),
        })
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Opaque(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<Uuid> for EntityId {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        match Uuid::parse_str(&s) {
            Ok(u) => Self::Uuid(u),
            Err(_) => Self::Opaque(s),
        }
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

// ── MacAddress ──────────────────────────────────────────────────────

/// MAC address, normalized to upper-case colon form (`AA:BB:CC:DD:EE:FF`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress(String);

impl MacAddress {
    /// Parse any common notation: `:`, `-` or `.` separated, or bare hex.
    /// Exactly twelve hex digits are required.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let invalid = || CoreError::Validation {
            field: "mac_address".into(),
            message: format!("'{raw}' is not a 6-byte MAC address"),
        };

        let trimmed = raw.trim();
        let separators = [':', '-', '.'];
        let used: Vec<char> = trimmed.chars().filter(|c| separators.contains(c)).collect();
        if used.windows(2).any(|w| w[0] != w[1]) {
            return Err(invalid());
        }

        let hex: String = trimmed.chars().filter(|c| !separators.contains(c)).collect();
        if hex.len() != 12 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        // Separated forms must group evenly: 6x2 (`:`/`-`) or 3x4 (`.`).
        if !used.is_empty() {
            let groups: Vec<&str> = trimmed.split(separators).collect();
            let even = (groups.len() == 6 && groups.iter().all(|g| g.len() == 2))
                || (groups.len() == 3 && groups.iter().all(|g| g.len() == 4));
            if !even {
                return Err(invalid());
            }
        }

        let upper = hex.to_ascii_uppercase();
        let pairs: Vec<&str> = (0..6).filter_map(|i| upper.get(i * 2..i * 2 + 2)).collect();
        Ok(Self(pairs.join(":")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MacAddress {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MacAddress {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.0
    }
}
