//! VLAN command handlers, including the offline subnet preview.

use chrono::Utc;
use tabled::Tabled;

use vlanman_config::Config;
use vlanman_core::subnet::plan_vlan;
use vlanman_core::{
    AssignmentScope, Availability, Backend, Command as CoreCommand, CommandResult, Controller,
    CoreError, CreateVlanRequest, SecurityType, UpdateVlanRequest, Vlan, VlanCalculation,
    VlanFilter, VlanSort, VlanStatus,
};

use crate::cli::{GlobalOpts, PreviewArgs, VlanListArgs, VlansArgs, VlansCommand};
use crate::error::CliError;
use crate::output::{self, Painter};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct VlanRow {
    #[tabled(rename = "VLAN")]
    tag: u16,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Subnet")]
    subnet: String,
    #[tabled(rename = "Gateway")]
    gateway: String,
    #[tabled(rename = "Assignable")]
    range: String,
    #[tabled(rename = "Used")]
    usage: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Security")]
    security: String,
}

impl VlanRow {
    fn new(v: &Vlan, painter: Painter) -> Self {
        Self {
            tag: v.vlan_id,
            zone: v.zone_name.clone().unwrap_or_default(),
            subnet: v.cidr(),
            gateway: v.gateway.to_string(),
            range: format!("{} - {}", v.net_start, v.net_end),
            usage: painter.usage(v.used_ips, v.total_ips, v.utilization),
            status: painter.vlan_status(v.status),
            security: output::or_dash(v.security_type),
        }
    }
}

fn detail(v: &Vlan) -> String {
    let mut lines = vec![
        format!("ID:           {}", v.id),
        format!("VLAN:         {} ({})", v.vlan_id, v.name),
        format!("Subnet:       {}", v.cidr()),
        format!("Netmask:      {}", v.netmask.as_addr()),
        format!("Gateway:      {}", v.gateway),
        format!("Assignable:   {} - {}", v.net_start, v.net_end),
        format!(
            "Usage:        {}/{} ({}%)",
            v.used_ips, v.total_ips, v.utilization
        ),
        format!("Status:       {}", v.status),
        format!("Zone:         {}", output::or_dash(v.zone_name.as_ref())),
        format!("Zone manager: {}", output::or_dash(v.zone_manager.as_ref())),
        format!("Security:     {}", output::or_dash(v.security_type)),
        format!("FW check:     {}", util::format_time(v.last_firewall_check)),
        format!("Description:  {}", output::or_dash(v.description.as_ref())),
        format!("Active:       {}", v.is_active),
    ];
    if let Ok(plan) = v.plan() {
        lines.push("Reserved:".into());
        for r in &plan.reserved_ranges {
            lines.push(format!("  {:<15} - {:<15} {}", r.start, r.end, r.description));
        }
    }
    lines.join("\n")
}

fn preview_detail(c: &VlanCalculation) -> String {
    let mut lines = vec![
        format!("VLAN:        {}", c.vlan_id),
        format!("Network:     {}", c.cidr),
        format!("Netmask:     {}", c.plan.netmask.as_addr()),
        format!("Gateway:     {}", c.plan.gateway),
        format!("Broadcast:   {}", c.plan.broadcast),
        format!("Assignable:  {} - {}", c.plan.net_start, c.plan.net_end),
        format!("Total IPs:   {}", c.plan.total_ips),
    ];
    if c.reserved_in_range > 0 {
        lines.push(format!(
            "             {} of them end in .0-.6 or .254/.255 and stay reserved",
            c.reserved_in_range
        ));
    }
    lines.push("Reserved:".into());
    for r in &c.plan.reserved_ranges {
        lines.push(format!("  {:<15} - {:<15} {}", r.start, r.end, r.description));
    }
    lines.join("\n")
}

fn availability_detail(a: &Availability) -> String {
    [
        format!("Total:       {}", a.total_ips),
        format!("Assigned:    {}", a.assigned_ips),
        format!("Available:   {}", a.available_ips),
        format!("Reserved:    {}", a.reserved_ips),
        format!("Utilization: {}%", a.utilization),
    ]
    .join("\n")
}

// ── Preview (no backend) ────────────────────────────────────────────

pub fn preview(args: &PreviewArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let calc = plan_vlan(args.vlan_id, &args.subnet, &args.netmask).map_err(CoreError::from)?;
    let out = output::render_single(global.format(), &calc, preview_detail, |c| {
        c.cidr.clone()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle<B: Backend>(
    controller: &Controller<B>,
    args: VlansArgs,
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<(), CliError> {
    let painter = Painter::new(global.color_mode(), cfg.utilization_warning_pct);

    match args.command {
        VlansCommand::List(list) => {
            let vlans = list_vlans(controller, &list).await?;
            let out = output::render_list(
                global.format(),
                &vlans,
                |v| VlanRow::new(v, painter),
                |v| v.vlan_id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VlansCommand::Get { vlan } => {
            let found = util::resolve_vlan(controller, &vlan).await?;
            controller
                .fetch_assignments(&AssignmentScope::Vlan(found.id.clone()))
                .await?;
            let mut v = (*found).clone();
            v.apply_usage(controller.store().vlan_usage(&v, Utc::now()));
            let out = output::render_single(global.format(), &v, detail, |v| v.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VlansCommand::Create {
            zone,
            vlan_id,
            subnet,
            netmask,
            description,
            inactive,
        } => {
            let zone = util::resolve_zone(controller, &zone).await?;
            let result = controller
                .execute(CoreCommand::CreateVlan(CreateVlanRequest {
                    zone_id: zone.id.clone(),
                    vlan_id,
                    subnet,
                    netmask,
                    description,
                    is_active: !inactive,
                }))
                .await?;
            if let CommandResult::Vlan(v) = result {
                output::notice(
                    &format!(
                        "VLAN {} created in {}: {} (assignable {} - {})",
                        v.vlan_id,
                        zone.name,
                        v.cidr(),
                        v.net_start,
                        v.net_end
                    ),
                    global.quiet,
                );
            }
            Ok(())
        }

        VlansCommand::Update {
            vlan,
            description,
            active,
        } => {
            if description.is_none() && active.is_none() {
                return Err(CliError::validation(
                    "update",
                    "nothing to change; pass --description or --active",
                ));
            }
            let found = util::resolve_vlan(controller, &vlan).await?;
            controller
                .execute(CoreCommand::UpdateVlan {
                    id: found.id.clone(),
                    update: UpdateVlanRequest {
                        description,
                        is_active: active,
                    },
                })
                .await?;
            output::notice(&format!("VLAN {} updated", found.vlan_id), global.quiet);
            Ok(())
        }

        VlansCommand::Delete { vlan } => {
            let found = util::resolve_vlan(controller, &vlan).await?;
            if !util::confirm(
                "vlans delete",
                &format!("Delete VLAN {} ({})?", found.vlan_id, found.cidr()),
                global.yes,
            )? {
                return Ok(());
            }
            controller
                .execute(CoreCommand::DeleteVlan {
                    id: found.id.clone(),
                })
                .await?;
            output::notice(&format!("VLAN {} deleted", found.vlan_id), global.quiet);
            Ok(())
        }

        VlansCommand::Preview(preview_args) => preview(&preview_args, global),

        VlansCommand::Availability { vlan } => {
            let found = util::resolve_vlan(controller, &vlan).await?;
            let availability = controller.availability(&found.id).await?;
            let out = output::render_single(
                global.format(),
                &availability,
                availability_detail,
                |a| a.available_ips.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VlansCommand::NextIp { vlan } => {
            let found = util::resolve_vlan(controller, &vlan).await?;
            let ip = controller.suggest_ip(&found.id).await?;
            let out =
                output::render_single(global.format(), &ip, ToString::to_string, ToString::to_string)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

/// Load everything, then filter and sort locally.
async fn list_vlans<B: Backend>(
    controller: &Controller<B>,
    args: &VlanListArgs,
) -> Result<Vec<Vlan>, CliError> {
    let sort: VlanSort = util::parse_flag("sort", &args.sort)?;
    let status = args
        .status
        .as_deref()
        .map(|s| util::parse_flag::<VlanStatus>("status", s))
        .transpose()?;
    let security_type = args
        .security_type
        .as_deref()
        .map(|s| util::parse_flag::<SecurityType>("security-type", s))
        .transpose()?;

    let domain_id = match &args.domain {
        Some(d) => Some(util::resolve_domain(controller, d).await?.id.clone()),
        None => None,
    };
    let zone_id = match &args.zone {
        Some(z) => Some(util::resolve_zone(controller, z).await?.id.clone()),
        None => None,
    };

    controller.refresh_all().await?;
    let filter = VlanFilter {
        domain_id,
        zone_id,
        status,
        security_type,
        search: args.search.clone(),
    };
    Ok(controller
        .store()
        .filtered_vlans(&filter, sort, Utc::now()))
}
