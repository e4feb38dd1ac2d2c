//! Audit reports: firewall-review compliance, utilization, domain totals.

use chrono::Utc;
use tabled::Tabled;

use vlanman_config::Config;
use vlanman_core::report::{self, ComplianceReport, DomainSummary};
use vlanman_core::{Backend, Command as CoreCommand, Controller, Vlan};

use crate::cli::{GlobalOpts, OutputFormat, ReportsArgs, ReportsCommand};
use crate::error::CliError;
use crate::output::{self, Painter};

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ComplianceRow {
    #[tabled(rename = "Security")]
    security: String,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Manager")]
    manager: String,
    #[tabled(rename = "Last Check")]
    last_check: String,
    #[tabled(rename = "Days")]
    days: String,
    #[tabled(rename = "Review")]
    review: String,
}

#[derive(Tabled)]
struct UtilizationRow {
    #[tabled(rename = "VLAN")]
    tag: u16,
    #[tabled(rename = "Subnet")]
    subnet: String,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Used")]
    usage: String,
    #[tabled(rename = "Status")]
    status: String,
}

#[derive(Tabled)]
struct DomainSummaryRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "VLANs")]
    vlans: usize,
    #[tabled(rename = "Used")]
    usage: String,
    #[tabled(rename = "Attention")]
    attention: usize,
}

fn compliance_rows(report: &ComplianceReport, painter: Painter) -> Vec<ComplianceRow> {
    report
        .groups
        .iter()
        .flat_map(|g| {
            g.zones.iter().map(move |z| ComplianceRow {
                security: g.security_type.to_string(),
                zone: z.zone_name.clone(),
                manager: output::or_dash(z.zone_manager.as_ref()),
                last_check: util::format_time(z.last_check),
                days: output::or_dash(z.days_since_check),
                review: painter.flag(z.overdue),
            })
        })
        .collect()
}

fn compliance_plain(report: &ComplianceReport) -> String {
    report
        .groups
        .iter()
        .flat_map(|g| g.zones.iter())
        .map(|z| z.zone_name.clone())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle<B: Backend>(
    controller: &Controller<B>,
    args: ReportsArgs,
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<(), CliError> {
    let painter = Painter::new(global.color_mode(), cfg.utilization_warning_pct);

    match args.command {
        ReportsCommand::Compliance {
            check_days,
            overdue,
        } => {
            let days = check_days.unwrap_or(controller.config().compliance_check_days);
            if days == 0 {
                return Err(CliError::validation("check-days", "must be at least 1"));
            }
            controller.fetch_zones(None).await?;
            let zones = controller.store().zones().snapshot();
            let mut report = report::compliance(&zones, days, Utc::now());
            // Totals keep counting every zone
            if overdue {
                for group in &mut report.groups {
                    group.zones.retain(|z| z.overdue);
                }
            }

            let out = match global.format() {
                OutputFormat::Table => {
                    let header = format!(
                        "Plant {} ({}), review interval {} days",
                        cfg.plant_code, cfg.organization, report.check_days
                    );
                    let table = output::render_table(&compliance_rows(&report, painter));
                    let summary = format!(
                        "{} of {} zones overdue",
                        report.overdue_checks, report.total_zones
                    );
                    format!("{header}\n{table}\n{summary}")
                }
                OutputFormat::Plain => compliance_plain(&report),
                other => output::render_single(other, &report, |_| String::new(), |_| String::new())?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReportsCommand::Utilization { top } => {
            controller.refresh_all().await?;
            let mut vlans = controller.utilization_report();
            if let Some(n) = top {
                vlans.truncate(n);
            }
            let out = output::render_list(
                global.format(),
                &vlans,
                |v: &Vlan| UtilizationRow {
                    tag: v.vlan_id,
                    subnet: v.cidr(),
                    zone: v.zone_name.clone().unwrap_or_default(),
                    usage: painter.usage(v.used_ips, v.total_ips, v.utilization),
                    status: painter.vlan_status(v.status),
                },
                |v| v.vlan_id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReportsCommand::Domains => {
            controller.refresh_all().await?;
            let summaries = controller.domain_summaries();
            let out = output::render_list(
                global.format(),
                &summaries,
                |s: &DomainSummary| DomainSummaryRow {
                    code: s.code.to_string(),
                    name: s.name.clone(),
                    vlans: s.vlan_count,
                    usage: painter.usage(s.used_ips, s.total_ips, s.utilization),
                    attention: s.vlans_needing_attention,
                },
                |s| s.code.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReportsCommand::RecordCheck { zone } => {
            let found = util::resolve_zone(controller, &zone).await?;
            controller
                .execute(CoreCommand::RecordFirewallCheck {
                    zone_id: found.id.clone(),
                })
                .await?;
            output::notice(
                &format!("Firewall review recorded for {}", found.name),
                global.quiet,
            );
            Ok(())
        }
    }
}
