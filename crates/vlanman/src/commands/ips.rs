//! IP assignment command handlers.

use std::collections::HashMap;

use chrono::Utc;
use tabled::Tabled;

use vlanman_config::Config;
use vlanman_core::{
    AssignIpRequest, AssignmentFilter, AssignmentScope, AssignmentView, Backend,
    Command as CoreCommand, CommandResult, Controller, DeviceStatus, DeviceType, EntityId,
    UpdateAssignmentRequest, VlanScope,
};

use crate::cli::{GlobalOpts, IpListArgs, IpsArgs, IpsCommand, OutputFormat};
use crate::error::CliError;
use crate::output::{self, Painter};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AssignmentRow {
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "CI Name")]
    ci_name: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Type")]
    device_type: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "VLAN")]
    vlan: String,
    #[tabled(rename = "Last Seen")]
    last_seen: String,
}

impl AssignmentRow {
    fn new(view: &AssignmentView, tags: &HashMap<EntityId, u16>, painter: Painter) -> Self {
        let a = &view.assignment;
        Self {
            ip: a.ip_address.to_string(),
            ci_name: a.ci_name.clone(),
            mac: output::or_dash(a.mac_address.as_ref()),
            device_type: view.resolved_type.to_string(),
            status: painter.device_status(view.status),
            vlan: output::or_dash(tags.get(&a.vlan_id)),
            last_seen: util::format_time(a.last_seen),
        }
    }
}

fn detail(view: &AssignmentView) -> String {
    let a = &view.assignment;
    [
        format!("ID:          {}", a.id),
        format!("IP:          {}", a.ip_address),
        format!("CI name:     {}", a.ci_name),
        format!("MAC:         {}", output::or_dash(a.mac_address.as_ref())),
        format!("Type:        {}", view.resolved_type),
        format!("Status:      {}", view.status),
        format!("Reserved:    {}", view.is_reserved),
        format!("Description: {}", output::or_dash(a.description.as_ref())),
        format!("VLAN record: {}", a.vlan_id),
        format!("Assigned:    {}", util::format_time(a.assigned_at)),
        format!("Last seen:   {}", util::format_time(a.last_seen)),
        format!("Active:      {}", a.is_active),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle<B: Backend>(
    controller: &Controller<B>,
    args: IpsArgs,
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<(), CliError> {
    let painter = Painter::new(global.color_mode(), cfg.utilization_warning_pct);

    match args.command {
        IpsCommand::List(list) => {
            let views = list_assignments(controller, &list).await?;
            let tags = vlan_tags(controller);
            let out = output::render_list(
                global.format(),
                &views,
                |v| AssignmentRow::new(v, &tags, painter),
                |v| v.assignment.ip_address.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        IpsCommand::Get { assignment } => {
            let found = util::resolve_assignment(controller, &assignment).await?;
            let view = controller
                .store()
                .assignment_views(Utc::now())
                .into_iter()
                .find(|v| v.assignment.id == found.id)
                .ok_or_else(|| CliError::not_found("IP assignment", &assignment))?;
            let out = output::render_single(global.format(), &view, detail, |v| {
                v.assignment.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        IpsCommand::Assign {
            vlan,
            ip,
            ci_name,
            mac,
            description,
            device_type,
        } => {
            let vlan = util::resolve_vlan(controller, &vlan).await?;
            let request = AssignIpRequest {
                vlan_id: vlan.id.clone(),
                ip_address: ip,
                ci_name,
                mac_address: util::parse_mac(mac.as_deref())?,
                description,
                device_type: parse_type(device_type.as_deref())?,
            };
            let result = controller.execute(CoreCommand::AssignIp(request)).await?;
            if let CommandResult::Assignment(a) = result {
                output::notice(
                    &format!("Assigned {} to {} in VLAN {}", a.ip_address, a.ci_name, vlan.vlan_id),
                    global.quiet,
                );
                if global.format() == OutputFormat::Plain {
                    output::print_output(&a.ip_address.to_string(), global.quiet);
                }
            }
            Ok(())
        }

        IpsCommand::Update {
            assignment,
            ci_name,
            mac,
            description,
            device_type,
        } => {
            let update = UpdateAssignmentRequest {
                ci_name,
                mac_address: util::parse_mac(mac.as_deref())?,
                description,
                device_type: parse_type(device_type.as_deref())?,
                is_active: None,
            };
            if update.is_empty() {
                return Err(CliError::validation(
                    "update",
                    "nothing to change; pass --ci-name, --mac, --description or --type",
                ));
            }
            let found = util::resolve_assignment(controller, &assignment).await?;
            controller
                .execute(CoreCommand::UpdateAssignment {
                    id: found.id.clone(),
                    update,
                })
                .await?;
            output::notice(&format!("Assignment {} updated", found.ip_address), global.quiet);
            Ok(())
        }

        IpsCommand::Release { assignment } => {
            let found = util::resolve_assignment(controller, &assignment).await?;
            if !util::confirm(
                "ips release",
                &format!("Release {} from {}?", found.ip_address, found.ci_name),
                global.yes,
            )? {
                return Ok(());
            }
            controller
                .execute(CoreCommand::ReleaseIp {
                    id: found.id.clone(),
                })
                .await?;
            output::notice(&format!("Released {}", found.ip_address), global.quiet);
            Ok(())
        }
    }
}

fn parse_type(raw: Option<&str>) -> Result<Option<DeviceType>, CliError> {
    raw.map(|t| util::parse_flag::<DeviceType>("type", t))
        .transpose()
}

fn vlan_tags<B: Backend>(controller: &Controller<B>) -> HashMap<EntityId, u16> {
    controller
        .store()
        .vlans()
        .snapshot()
        .iter()
        .map(|v| (v.id.clone(), v.vlan_id))
        .collect()
}

async fn list_assignments<B: Backend>(
    controller: &Controller<B>,
    args: &IpListArgs,
) -> Result<Vec<AssignmentView>, CliError> {
    let status = args
        .status
        .as_deref()
        .map(|s| util::parse_flag::<DeviceStatus>("status", s))
        .transpose()?;
    let device_type = parse_type(args.device_type.as_deref())?;

    let (vlans, assignments) = tokio::join!(
        controller.fetch_vlans(&VlanScope::All),
        controller.fetch_assignments(&AssignmentScope::All),
    );
    vlans?;
    assignments?;

    let vlan_id = match &args.vlan {
        Some(v) => Some(util::find_vlan(controller, v)?.id.clone()),
        None => None,
    };
    let filter = AssignmentFilter {
        vlan_id,
        status,
        device_type,
        search: args.search.clone(),
        include_released: args.include_released,
    };
    let mut views = controller
        .store()
        .filtered_assignments(&filter, Utc::now());
    views.sort_by_key(|v| v.assignment.ip_address);
    Ok(views)
}
