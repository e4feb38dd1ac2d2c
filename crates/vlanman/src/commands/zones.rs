//! Value stream and security zone handlers.

use std::sync::Arc;

use tabled::Tabled;

use vlanman_core::{
    Backend, Command as CoreCommand, CommandResult, Controller, CreateValueStreamRequest,
    CreateZoneRequest, EntityId, SecurityType, ValueStream, Zone,
};

use crate::cli::{GlobalOpts, ZonesArgs, ZonesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Security")]
    security: String,
    #[tabled(rename = "Manager")]
    manager: String,
    #[tabled(rename = "VLANs")]
    vlans: usize,
    #[tabled(rename = "Last Check")]
    last_check: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&Arc<Zone>> for ZoneRow {
    fn from(z: &Arc<Zone>) -> Self {
        Self {
            name: z.name.clone(),
            security: z.security_type.to_string(),
            manager: output::or_dash(z.zone_manager.as_ref()),
            vlans: z.vlan_count,
            last_check: util::format_time(z.last_firewall_check),
            id: z.id.to_string(),
        }
    }
}

#[derive(Tabled)]
struct ValueStreamRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&ValueStream> for ValueStreamRow {
    fn from(vs: &ValueStream) -> Self {
        Self {
            code: vs.code.clone(),
            name: vs.name.clone(),
            description: output::or_dash(vs.description.as_ref()),
            id: vs.id.to_string(),
        }
    }
}

/// Pick a value stream by ID or case-insensitive code.
fn find_value_stream<'a>(streams: &'a [ValueStream], identifier: &str) -> Option<&'a ValueStream> {
    streams
        .iter()
        .find(|vs| vs.id.to_string() == identifier || vs.code.eq_ignore_ascii_case(identifier))
}

async fn resolve_value_stream<B: Backend>(
    controller: &Controller<B>,
    domain_id: &EntityId,
    identifier: &str,
) -> Result<ValueStream, CliError> {
    let streams = controller.value_streams(domain_id).await?;
    find_value_stream(&streams, identifier)
        .cloned()
        .ok_or_else(|| CliError::not_found("value stream", identifier))
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle<B: Backend>(
    controller: &Controller<B>,
    args: ZonesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ZonesCommand::List { domain } => {
            let domain_id = match domain {
                Some(d) => Some(util::resolve_domain(controller, &d).await?.id.clone()),
                None => None,
            };
            controller.fetch_zones(domain_id.as_ref()).await?;
            let snap: Vec<Arc<Zone>> = controller
                .store()
                .zones()
                .snapshot()
                .iter()
                .filter(|z| domain_id.is_none() || z.domain_id == domain_id)
                .cloned()
                .collect();
            let out = output::render_list(
                global.format(),
                &snap,
                |z| ZoneRow::from(z),
                |z| z.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ZonesCommand::Streams { domain } => {
            let found = util::resolve_domain(controller, &domain).await?;
            let streams = controller.value_streams(&found.id).await?;
            let out = output::render_list(
                global.format(),
                &streams,
                |vs| ValueStreamRow::from(vs),
                |vs| vs.code.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ZonesCommand::AddStream {
            domain,
            code,
            name,
            description,
            inactive,
        } => {
            let found = util::resolve_domain(controller, &domain).await?;
            let result = controller
                .execute(CoreCommand::CreateValueStream(CreateValueStreamRequest {
                    domain_id: found.id.clone(),
                    code,
                    name,
                    description,
                    is_active: !inactive,
                }))
                .await?;
            if let CommandResult::ValueStream(vs) = result {
                output::notice(
                    &format!("Value stream {} added to {} ({})", vs.code, found.code, vs.id),
                    global.quiet,
                );
            }
            Ok(())
        }

        ZonesCommand::Create {
            domain,
            value_stream,
            name,
            security_type,
            manager,
            description,
            inactive,
        } => {
            let security_type: SecurityType = util::parse_flag("security-type", &security_type)?;
            let found = util::resolve_domain(controller, &domain).await?;
            let vs = resolve_value_stream(controller, &found.id, &value_stream).await?;
            let result = controller
                .execute(CoreCommand::CreateZone(CreateZoneRequest {
                    value_stream_id: vs.id,
                    name,
                    security_type,
                    zone_manager: manager,
                    description,
                    is_active: !inactive,
                }))
                .await?;
            if let CommandResult::Zone(z) = result {
                output::notice(
                    &format!("Zone {} created in {}/{} ({})", z.name, found.code, vs.code, z.id),
                    global.quiet,
                );
            }
            Ok(())
        }
    }
}
