//! Clap derive structures for the `vlanman` CLI.
//!
//! Defines the command tree, global flags, and shared types. Only clap and
//! clap_complete may be used here: the build script compiles this file on
//! its own to render man pages.

use std::net::Ipv4Addr;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// vlanman -- VLAN segmentation and IP address management for plant networks
#[derive(Debug, Parser)]
#[command(
    name = "vlanman",
    version,
    about = "Manage plant VLANs and IP assignments from the command line",
    long_about = "Plan VLAN subnets, assign and release device addresses, and audit\n\
        firewall-review compliance against the IP-management REST API.\n\n\
        Use --offline to explore a seeded in-memory plant without a backend.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "VLANMAN_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides config and profile)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "VLANMAN_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Work against a seeded in-memory plant instead of the API
    #[arg(long, env = "VLANMAN_OFFLINE", global = true)]
    pub offline: bool,
}

impl GlobalOpts {
    pub fn format(&self) -> OutputFormat {
        self.output.unwrap_or_default()
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color.unwrap_or_default()
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    #[default]
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage organizational domains (MFG, LOG, FCM, ENG)
    #[command(alias = "dom")]
    Domains(DomainsArgs),

    /// Manage value streams and security zones
    #[command(alias = "zone", alias = "z")]
    Zones(ZonesArgs),

    /// Manage VLANs and plan subnets
    #[command(alias = "vlan", alias = "v")]
    Vlans(VlansArgs),

    /// Manage device IP assignments
    #[command(alias = "ip")]
    Ips(IpsArgs),

    /// Compliance and utilization reports
    #[command(alias = "report")]
    Reports(ReportsArgs),

    /// Check backend health
    Health,

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DOMAINS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DomainsArgs {
    #[command(subcommand)]
    pub command: DomainsCommand,
}

#[derive(Debug, Subcommand)]
pub enum DomainsCommand {
    /// List domains
    #[command(alias = "ls")]
    List,

    /// Show a domain with its zones and VLANs
    Get {
        /// Domain ID or code (e.g. MFG)
        domain: String,
    },

    /// Create a domain
    Create {
        /// Domain code: MFG, LOG, FCM or ENG
        #[arg(long)]
        code: String,

        /// Display name (defaults to the code's name)
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Create the domain inactive
        #[arg(long)]
        inactive: bool,
    },

    /// Update a domain
    Update {
        /// Domain ID or code
        domain: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Set the active flag
        #[arg(long)]
        active: Option<bool>,
    },

    /// Delete a domain (only when it owns no VLANs)
    Delete {
        /// Domain ID or code
        domain: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ZONES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ZonesArgs {
    #[command(subcommand)]
    pub command: ZonesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ZonesCommand {
    /// List security zones
    #[command(alias = "ls")]
    List {
        /// Only zones of this domain (ID or code)
        #[arg(long)]
        domain: Option<String>,
    },

    /// List a domain's value streams
    Streams {
        /// Domain ID or code
        domain: String,
    },

    /// Add a value stream to a domain
    AddStream {
        /// Domain ID or code
        #[arg(long)]
        domain: String,

        /// Short code, unique within the domain (e.g. A12)
        #[arg(long)]
        code: String,

        /// Display name (defaults to the code)
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Create the value stream inactive
        #[arg(long)]
        inactive: bool,
    },

    /// Create a security zone under a value stream
    Create {
        /// Domain ID or code
        #[arg(long)]
        domain: String,

        /// Value stream ID or code
        #[arg(long)]
        value_stream: String,

        #[arg(long)]
        name: String,

        /// SL3, MFZ_SL4, LOG_SL4, FMZ_SL4, ENG_SL4, LRSZ_SL4 or RSZ_SL4
        #[arg(long)]
        security_type: String,

        /// Person responsible for the zone's firewall reviews
        #[arg(long)]
        manager: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Create the zone inactive
        #[arg(long)]
        inactive: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  VLANS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct VlansArgs {
    #[command(subcommand)]
    pub command: VlansCommand,
}

#[derive(Debug, Subcommand)]
pub enum VlansCommand {
    /// List VLANs with usage and status
    #[command(alias = "ls")]
    List(VlanListArgs),

    /// Show VLAN details
    Get {
        /// VLAN record ID or 802.1Q tag
        vlan: String,
    },

    /// Create a VLAN in a security zone
    Create {
        /// Zone ID or name
        #[arg(long)]
        zone: String,

        /// 802.1Q tag (1-4094)
        #[arg(long)]
        vlan_id: u32,

        /// Network address, e.g. 10.1.1.0
        #[arg(long)]
        subnet: String,

        /// Dotted mask, /24 or 24
        #[arg(long)]
        netmask: String,

        #[arg(long)]
        description: Option<String>,

        /// Create the VLAN inactive
        #[arg(long)]
        inactive: bool,
    },

    /// Update a VLAN
    Update {
        /// VLAN record ID or tag
        vlan: String,

        #[arg(long)]
        description: Option<String>,

        /// Set the active flag
        #[arg(long)]
        active: Option<bool>,
    },

    /// Delete a VLAN (only when no live assignments remain)
    Delete {
        /// VLAN record ID or tag
        vlan: String,
    },

    /// Plan a VLAN subnet locally, without a backend
    Preview(PreviewArgs),

    /// Show address accounting for a VLAN
    Availability {
        /// VLAN record ID or tag
        vlan: String,
    },

    /// Suggest the next free address in a VLAN
    NextIp {
        /// VLAN record ID or tag
        vlan: String,
    },
}

#[derive(Debug, Args)]
pub struct VlanListArgs {
    /// Only VLANs of this domain (ID or code)
    #[arg(long, short = 'd')]
    pub domain: Option<String>,

    /// Only VLANs of this zone (ID or name)
    #[arg(long, short = 'z')]
    pub zone: Option<String>,

    /// Only this status: active, inactive, warning, error
    #[arg(long)]
    pub status: Option<String>,

    /// Only this security type, e.g. MFZ_SL4
    #[arg(long)]
    pub security_type: Option<String>,

    /// Substring over tag, name, subnet, zone and description
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Sort key: vlan-id, subnet, zone, utilization, status
    #[arg(long, default_value = "vlan-id")]
    pub sort: String,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// 802.1Q tag (1-4094)
    #[arg(long)]
    pub vlan_id: u32,

    /// Network address, e.g. 10.1.1.0
    #[arg(long)]
    pub subnet: String,

    /// Dotted mask, /24 or 24
    #[arg(long)]
    pub netmask: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  IP ASSIGNMENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct IpsArgs {
    #[command(subcommand)]
    pub command: IpsCommand,
}

#[derive(Debug, Subcommand)]
pub enum IpsCommand {
    /// List IP assignments with derived status
    #[command(alias = "ls")]
    List(IpListArgs),

    /// Show an assignment
    Get {
        /// Assignment ID or IP address
        assignment: String,
    },

    /// Assign an address to a device
    Assign {
        /// VLAN record ID or tag
        #[arg(long)]
        vlan: String,

        /// Address to assign (default: next free)
        #[arg(long)]
        ip: Option<Ipv4Addr>,

        /// Configuration-item name, e.g. PLC-A2-MAIN
        #[arg(long)]
        ci_name: String,

        #[arg(long)]
        mac: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Device type, e.g. PLC, HMI, robot, camera
        #[arg(long = "type")]
        device_type: Option<String>,
    },

    /// Update an assignment
    Update {
        /// Assignment ID or IP address
        assignment: String,

        #[arg(long)]
        ci_name: Option<String>,

        #[arg(long)]
        mac: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long = "type")]
        device_type: Option<String>,
    },

    /// Release an assignment
    Release {
        /// Assignment ID or IP address
        assignment: String,
    },
}

#[derive(Debug, Args)]
pub struct IpListArgs {
    /// Only this VLAN (record ID or tag)
    #[arg(long)]
    pub vlan: Option<String>,

    /// Only this derived status: active, inactive, reserved, conflict
    #[arg(long)]
    pub status: Option<String>,

    /// Only this device type
    #[arg(long = "type")]
    pub device_type: Option<String>,

    /// Substring over CI name, IP, MAC and description
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Include released assignments
    #[arg(long)]
    pub include_released: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  REPORTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ReportsArgs {
    #[command(subcommand)]
    pub command: ReportsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ReportsCommand {
    /// Firewall-review compliance per security type
    Compliance {
        /// Days before a review is overdue (overrides config)
        #[arg(long)]
        check_days: Option<u32>,

        /// Only list overdue zones
        #[arg(long)]
        overdue: bool,
    },

    /// VLANs ordered by utilization
    Utilization {
        /// Show only the first N VLANs
        #[arg(long, short = 'n')]
        top: Option<usize>,
    },

    /// Per-domain VLAN and address totals
    Domains,

    /// Record a completed firewall review for a zone
    RecordCheck {
        /// Zone ID or name
        zone: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG / COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create the config file with guided setup
    Init,

    /// Display the resolved configuration
    Show,

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
