//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use vlanman_core::{
    AssignmentScope, Backend, Controller, Domain, DomainCode, IpAssignment, MacAddress, Vlan,
    VlanScope, Zone,
};

use crate::error::CliError;

/// Resolve a domain by ID or code (`MFG`, `log`, ...).
pub async fn resolve_domain<B: Backend>(
    controller: &Controller<B>,
    identifier: &str,
) -> Result<Arc<Domain>, CliError> {
    controller.fetch_domains().await?;
    let code = DomainCode::from_str(identifier).ok();
    controller
        .store()
        .domains()
        .snapshot()
        .iter()
        .find(|d| d.id.to_string() == identifier || Some(d.code) == code)
        .cloned()
        .ok_or_else(|| CliError::not_found("domain", identifier))
}

/// Resolve a VLAN by record ID or 802.1Q tag.
pub async fn resolve_vlan<B: Backend>(
    controller: &Controller<B>,
    identifier: &str,
) -> Result<Arc<Vlan>, CliError> {
    controller.fetch_vlans(&VlanScope::All).await?;
    find_vlan(controller, identifier)
}

/// Like [`resolve_vlan`], against what is already loaded.
pub fn find_vlan<B: Backend>(
    controller: &Controller<B>,
    identifier: &str,
) -> Result<Arc<Vlan>, CliError> {
    let tag = identifier.parse::<u16>().ok();
    controller
        .store()
        .vlans()
        .snapshot()
        .iter()
        .find(|v| v.id.to_string() == identifier || Some(v.vlan_id) == tag)
        .cloned()
        .ok_or_else(|| CliError::not_found("VLAN", identifier))
}

/// Resolve a zone by ID or case-insensitive name.
pub async fn resolve_zone<B: Backend>(
    controller: &Controller<B>,
    identifier: &str,
) -> Result<Arc<Zone>, CliError> {
    controller.fetch_zones(None).await?;
    controller
        .store()
        .zones()
        .snapshot()
        .iter()
        .find(|z| z.id.to_string() == identifier || z.name.eq_ignore_ascii_case(identifier))
        .cloned()
        .ok_or_else(|| CliError::not_found("zone", identifier))
}

/// Resolve an assignment by ID or IP address. A live record wins over
/// released ones holding the same address.
pub async fn resolve_assignment<B: Backend>(
    controller: &Controller<B>,
    identifier: &str,
) -> Result<Arc<IpAssignment>, CliError> {
    controller.fetch_assignments(&AssignmentScope::All).await?;
    let ip = identifier.parse::<Ipv4Addr>().ok();
    let snapshot = controller.store().assignments().snapshot();
    let mut matches: Vec<&Arc<IpAssignment>> = snapshot
        .iter()
        .filter(|a| a.id.to_string() == identifier || Some(a.ip_address) == ip)
        .collect();
    matches.sort_by_key(|a| !a.is_active);
    matches
        .into_iter()
        .next()
        .cloned()
        .ok_or_else(|| CliError::not_found("IP assignment", identifier))
}

/// Parse a strum-backed enum flag, naming the flag on failure.
pub fn parse_flag<T: FromStr>(field: &str, raw: &str) -> Result<T, CliError> {
    T::from_str(raw).map_err(|_| CliError::validation(field, format!("unknown value '{raw}'")))
}

pub fn parse_mac(raw: Option<&str>) -> Result<Option<MacAddress>, CliError> {
    raw.map(MacAddress::parse)
        .transpose()
        .map_err(CliError::from)
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(action: &str, message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

pub fn format_time(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}
