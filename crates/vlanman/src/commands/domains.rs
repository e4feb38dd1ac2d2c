//! Domain command handlers.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tabled::Tabled;

use vlanman_core::{
    Backend, Command as CoreCommand, CommandResult, Controller, CreateDomainRequest, Domain,
    DomainCode, UpdateDomainRequest, Vlan, VlanFilter, VlanSort, Zone,
};

use crate::cli::{DomainsArgs, DomainsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DomainRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Value Streams")]
    value_streams: usize,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&Arc<Domain>> for DomainRow {
    fn from(d: &Arc<Domain>) -> Self {
        Self {
            code: d.code.to_string(),
            name: d.name.clone(),
            value_streams: d.value_stream_count,
            active: if d.is_active { "yes" } else { "no" }.into(),
            id: d.id.to_string(),
        }
    }
}

/// A domain with the zones and VLANs below it.
#[derive(Serialize)]
struct DomainDetail {
    #[serde(flatten)]
    domain: Arc<Domain>,
    zones: Vec<Arc<Zone>>,
    vlans: Vec<Vlan>,
}

fn detail(d: &DomainDetail) -> String {
    let mut lines = vec![
        format!("ID:          {}", d.domain.id),
        format!("Code:        {}", d.domain.code),
        format!("Name:        {}", d.domain.name),
        format!("Description: {}", output::or_dash(d.domain.description.as_ref())),
        format!("Active:      {}", d.domain.is_active),
        format!("Created:     {}", util::format_time(Some(d.domain.created_at))),
        format!("Zones:       {}", d.zones.len()),
    ];
    for z in &d.zones {
        lines.push(format!("  {:<28} {}", z.name, z.security_type));
    }
    lines.push(format!("VLANs:       {}", d.vlans.len()));
    for v in &d.vlans {
        lines.push(format!(
            "  {:<6} {:<18} {:>3}%  {}",
            v.vlan_id,
            v.cidr(),
            v.utilization,
            v.status
        ));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle<B: Backend>(
    controller: &Controller<B>,
    args: DomainsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DomainsCommand::List => {
            controller.fetch_domains().await?;
            let snap = controller.store().domains().snapshot();
            let out = output::render_list(
                global.format(),
                &snap,
                |d| DomainRow::from(d),
                |d| d.code.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DomainsCommand::Get { domain } => {
            let found = util::resolve_domain(controller, &domain).await?;
            controller.fetch_domain(&found.id).await?;

            let store = controller.store();
            let zones = store
                .zones()
                .snapshot()
                .iter()
                .filter(|z| z.domain_id.as_ref() == Some(&found.id))
                .cloned()
                .collect();
            let filter = VlanFilter {
                domain_id: Some(found.id.clone()),
                ..VlanFilter::default()
            };
            let detail_view = DomainDetail {
                domain: store.domains().get(&found.id).unwrap_or(found),
                zones,
                vlans: store.filtered_vlans(&filter, VlanSort::VlanId, Utc::now()),
            };
            let out = output::render_single(global.format(), &detail_view, detail, |d| {
                d.domain.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DomainsCommand::Create {
            code,
            name,
            description,
            inactive,
        } => {
            let code: DomainCode = util::parse_flag("code", &code)?;
            let result = controller
                .execute(CoreCommand::CreateDomain(CreateDomainRequest {
                    code,
                    name,
                    description,
                    is_active: !inactive,
                }))
                .await?;
            if let CommandResult::Domain(d) = result {
                output::notice(&format!("Domain {} created ({})", d.code, d.id), global.quiet);
            }
            Ok(())
        }

        DomainsCommand::Update {
            domain,
            name,
            description,
            active,
        } => {
            if name.is_none() && description.is_none() && active.is_none() {
                return Err(CliError::validation(
                    "update",
                    "nothing to change; pass --name, --description or --active",
                ));
            }
            let found = util::resolve_domain(controller, &domain).await?;
            controller
                .execute(CoreCommand::UpdateDomain {
                    id: found.id.clone(),
                    update: UpdateDomainRequest {
                        name,
                        description,
                        is_active: active,
                    },
                })
                .await?;
            output::notice(&format!("Domain {} updated", found.code), global.quiet);
            Ok(())
        }

        DomainsCommand::Delete { domain } => {
            let found = util::resolve_domain(controller, &domain).await?;
            if !util::confirm(
                "domains delete",
                &format!("Delete domain {} ({})?", found.code, found.name),
                global.yes,
            )? {
                return Ok(());
            }
            controller
                .execute(CoreCommand::DeleteDomain {
                    id: found.id.clone(),
                })
                .await?;
            output::notice(&format!("Domain {} deleted", found.code), global.quiet);
            Ok(())
        }
    }
}
