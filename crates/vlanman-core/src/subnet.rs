// ── Subnet / IP range calculator ──
//
// Pure functions turning (subnet, mask) into the assignable range of a
// VLAN. Plant addressing reserves the network identifier, six management
// addresses after it, and the broadcast address, so a block of N
// addresses yields N - 8 assignable hosts starting at network + 7.

use std::collections::HashSet;
use std::fmt;
use std::net::Ipv4Addr;

use ipnet::Ipv4Net;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::derive;

/// Low addresses (network identifier + management) skipped before `net_start`.
const LOW_RESERVED: u32 = 7;

/// Addresses lost to reservation in every block: network id, six
/// management addresses, broadcast.
const RESERVED_PER_BLOCK: u32 = 8;

/// Largest prefix that still leaves room for one assignable address.
const MAX_PREFIX: u8 = 28;

/// Shortest prefix a VLAN may carry. Anything wider is not a plant segment.
pub const MIN_PREFIX: u8 = 16;

/// Prefix lengths offered when creating a VLAN.
pub const OFFERED_PREFIXES: [u8; 4] = [21, 22, 23, 24];

/// Calculator failures. None of them attempt partial recovery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubnetError {
    #[error("'{input}' is not a dotted-quad IPv4 address")]
    MalformedAddress { input: String },

    #[error("'{input}' is not a valid subnet mask")]
    InvalidNetmask { input: String },

    #[error("/{prefix} is too small: at least {needed} host addresses are required")]
    InsufficientSpace { prefix: u8, needed: u32 },

    #[error("/{prefix} is too large for a VLAN: the shortest allowed prefix is /{min}")]
    BlockTooLarge { prefix: u8, min: u8 },

    #[error("VLAN ID {id} is outside 1-4094")]
    InvalidVlanId { id: u32 },
}

// ── Parsing ──────────────────────────────────────────────────────────

/// Parse a strict dotted quad: exactly four non-empty decimal segments,
/// each 0-255.
pub fn parse_ipv4(input: &str) -> Result<Ipv4Addr, SubnetError> {
    let malformed = || SubnetError::MalformedAddress {
        input: input.to_owned(),
    };

    let trimmed = input.trim();
    let mut octets = [0u8; 4];
    let mut count = 0;
    for segment in trimmed.split('.') {
        if count == 4 || segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let value: u8 = segment.parse().map_err(|_| malformed())?;
        octets[count] = value;
        count += 1;
    }
    if count != 4 {
        return Err(malformed());
    }
    Ok(Ipv4Addr::from(octets))
}

/// A contiguous subnet mask, stored as its prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Netmask {
    prefix: u8,
}

impl Netmask {
    /// Accepts `255.255.255.0`, `/24` or `24`.
    pub fn parse(input: &str) -> Result<Self, SubnetError> {
        let invalid = || SubnetError::InvalidNetmask {
            input: input.to_owned(),
        };

        let trimmed = input.trim();
        let bare = trimmed.strip_prefix('/').unwrap_or(trimmed);
        if !bare.is_empty() && bare.bytes().all(|b| b.is_ascii_digit()) {
            let prefix: u8 = bare.parse().map_err(|_| invalid())?;
            return Self::from_prefix(prefix).ok_or_else(invalid);
        }

        let mask = parse_ipv4(trimmed).map_err(|_| invalid())?;
        // Non-contiguous masks have no prefix length.
        let prefix = ipnet::ipv4_mask_to_prefix(mask).map_err(|_| invalid())?;
        Ok(Self { prefix })
    }

    pub fn from_prefix(prefix: u8) -> Option<Self> {
        Ipv4Net::new(Ipv4Addr::UNSPECIFIED, prefix)
            .ok()
            .map(|_| Self { prefix })
    }

    pub fn prefix(self) -> u8 {
        self.prefix
    }

    /// The block of this size that holds `addr`, host bits cleared.
    pub fn net(self, addr: Ipv4Addr) -> Ipv4Net {
        Ipv4Net::new(addr, self.prefix)
            .map_or_else(|_| Ipv4Net::from(addr), |net| net.trunc())
    }

    pub fn as_addr(self) -> Ipv4Addr {
        self.net(Ipv4Addr::UNSPECIFIED).netmask()
    }
}

impl fmt::Display for Netmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_addr())
    }
}

impl Serialize for Netmask {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ── Reservation rules ────────────────────────────────────────────────

/// Per-address reservation check used everywhere an individual IP is
/// judged. Looks only at the last octet, which is exact for /24 blocks
/// and an approximation for /21-/23.
pub fn is_reserved(ip: Ipv4Addr) -> bool {
    let last = ip.octets()[3];
    last <= 6 || last >= 254
}

/// Addresses in `net`, saturating at `u32::MAX` for /0.
fn block_size(net: Ipv4Net) -> u32 {
    u32::from(net.hostmask()).saturating_add(1)
}

/// Usable hosts before plant reservation (block minus network and broadcast).
pub fn usable_hosts(prefix: u8) -> u32 {
    Netmask::from_prefix(prefix).map_or(0, |m| {
        block_size(m.net(Ipv4Addr::UNSPECIFIED)).saturating_sub(2)
    })
}

/// 802.1Q tags 0 and 4095 are reserved by the standard.
pub fn validate_vlan_id(id: u32) -> Result<u16, SubnetError> {
    u16::try_from(id)
        .ok()
        .filter(|v| (1..=4094).contains(v))
        .ok_or(SubnetError::InvalidVlanId { id })
}

// ── Subnet plan ──────────────────────────────────────────────────────

/// A reserved span inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservedRange {
    pub start: Ipv4Addr,
    pub end: Ipv4Addr,
    pub description: &'static str,
}

/// Everything derived from a (subnet, mask) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubnetPlan {
    pub network: Ipv4Addr,
    pub netmask: Netmask,
    pub broadcast: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub net_start: Ipv4Addr,
    pub net_end: Ipv4Addr,
    /// Assignable addresses: block size minus the eight reserved ones.
    pub total_ips: u32,
    pub reserved_ranges: Vec<ReservedRange>,
}

/// Address accounting for a VLAN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub total_ips: u32,
    pub assigned_ips: u32,
    pub available_ips: u32,
    pub reserved_ips: u32,
    pub utilization: u32,
}

impl SubnetPlan {
    /// Host bits of `subnet` are cleared, so `10.0.0.77/24` plans `10.0.0.0/24`.
    pub fn calculate(
        subnet: Ipv4Addr,
        netmask: Netmask,
        gateway: Option<Ipv4Addr>,
    ) -> Result<Self, SubnetError> {
        if netmask.prefix() > MAX_PREFIX {
            return Err(SubnetError::InsufficientSpace {
                prefix: netmask.prefix(),
                needed: RESERVED_PER_BLOCK + 1,
            });
        }
        if netmask.prefix() < MIN_PREFIX {
            return Err(SubnetError::BlockTooLarge {
                prefix: netmask.prefix(),
                min: MIN_PREFIX,
            });
        }

        let net = netmask.net(subnet);
        let network = u32::from(net.network());
        let broadcast = u32::from(net.broadcast());

        let plan = Self {
            network: net.network(),
            netmask,
            broadcast: net.broadcast(),
            gateway: gateway.unwrap_or(Ipv4Addr::from(network + 1)),
            net_start: Ipv4Addr::from(network + LOW_RESERVED),
            net_end: Ipv4Addr::from(broadcast - 1),
            total_ips: block_size(net) - RESERVED_PER_BLOCK,
            reserved_ranges: vec![
                ReservedRange {
                    start: net.network(),
                    end: net.network(),
                    description: "Network identifier",
                },
                ReservedRange {
                    start: Ipv4Addr::from(network + 1),
                    end: Ipv4Addr::from(network + LOW_RESERVED - 1),
                    description: "Router / management",
                },
                ReservedRange {
                    start: net.broadcast(),
                    end: net.broadcast(),
                    description: "Broadcast",
                },
            ],
        };
        Ok(plan)
    }

    /// Parse both inputs and plan with the default gateway.
    pub fn from_strs(subnet: &str, netmask: &str) -> Result<Self, SubnetError> {
        Self::calculate(parse_ipv4(subnet)?, Netmask::parse(netmask)?, None)
    }

    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        self.netmask.net(self.network).contains(&ip)
    }

    /// Inside `[net_start, net_end]`.
    pub fn in_assignable_range(&self, ip: Ipv4Addr) -> bool {
        (self.net_start..=self.net_end).contains(&ip)
    }

    /// CIDR notation, e.g. `10.1.1.0/24`.
    pub fn cidr(&self) -> String {
        format!("{}/{}", self.network, self.netmask.prefix())
    }

    pub fn availability(&self, assigned: u32) -> Availability {
        Availability {
            total_ips: self.total_ips,
            assigned_ips: assigned,
            available_ips: self.total_ips.saturating_sub(assigned),
            reserved_ips: RESERVED_PER_BLOCK,
            utilization: derive::utilization(assigned, self.total_ips),
        }
    }
}

/// First address in `[net_start, net_end]` that is neither reserved nor
/// in `taken`.
pub fn next_available(plan: &SubnetPlan, taken: &HashSet<Ipv4Addr>) -> Option<Ipv4Addr> {
    (u32::from(plan.net_start)..=u32::from(plan.net_end))
        .map(Ipv4Addr::from)
        .find(|ip| !is_reserved(*ip) && !taken.contains(ip))
}

// ── VLAN preview ─────────────────────────────────────────────────────

/// Result of planning a VLAN before it exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VlanCalculation {
    pub vlan_id: u16,
    pub cidr: String,
    #[serde(flatten)]
    pub plan: SubnetPlan,
    /// Addresses the last-octet rule would still refuse inside the range.
    pub reserved_in_range: u32,
}

/// Validate a VLAN tag and plan its subnet.
pub fn plan_vlan(vlan_id: u32, subnet: &str, netmask: &str) -> Result<VlanCalculation, SubnetError> {
    let vlan_id = validate_vlan_id(vlan_id)?;
    let plan = SubnetPlan::from_strs(subnet, netmask)?;
    let reserved = (u32::from(plan.net_start)..=u32::from(plan.net_end))
        .map(Ipv4Addr::from)
        .filter(|ip| is_reserved(*ip))
        .count();
    let reserved_in_range = u32::try_from(reserved).unwrap_or(u32::MAX);
    Ok(VlanCalculation {
        vlan_id,
        cidr: plan.cidr(),
        plan,
        reserved_in_range,
    })
}
