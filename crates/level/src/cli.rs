//! Clap derive structures for the `level` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use level_api::KeyValuePair;
use level_core::{AlertStatus, IncludeFlags, ListOptions};
use level_webhook::EventType;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// level -- query and automate the Level RMM platform
#[derive(Debug, Parser)]
#[command(
    name = "level",
    version,
    about = "Work with Level alerts, devices, groups, and automations",
    long_about = "A CLI for the Level device-management API.\n\n\
        Lists and fetches alerts, devices, and groups with cursor pagination,\n\
        triggers automation webhooks, and receives signed Level webhooks.",
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
    /// Config profile to use
    #[arg(long, short = 'p', env = "LEVEL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, env = "LEVEL_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Level API key
    #[arg(long, env = "LEVEL_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "LEVEL_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Envelope key holding the records (probes common keys when unset)
    #[arg(long, global = true)]
    pub response_property: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "LEVEL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List and inspect alerts
    #[command(alias = "al")]
    Alerts(AlertsArgs),

    /// List, inspect, and search devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// List and inspect groups
    #[command(alias = "g")]
    Groups(GroupsArgs),

    /// Trigger automations
    #[command(alias = "auto")]
    Automations(AutomationsArgs),

    /// Receive and sign Level webhooks
    Webhook(WebhookArgs),

    /// Run a batch of operations from a JSON file
    Run(RunArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

/// Shared pagination and free-form query arguments for list commands.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Max results (1-100)
    #[arg(long, short = 'l', default_value = "50")]
    pub limit: u32,

    /// Fetch all pages automatically
    #[arg(long, short = 'a')]
    pub all: bool,

    /// Start after this record id
    #[arg(long)]
    pub starting_after: Option<String>,

    /// End before this record id
    #[arg(long)]
    pub ending_before: Option<String>,

    /// Extra query parameter (repeatable), e.g. --query os=windows
    #[arg(long = "query", value_name = "KEY=VALUE")]
    pub query: Vec<KeyValuePair>,
}

impl From<ListArgs> for ListOptions {
    fn from(args: ListArgs) -> Self {
        Self {
            return_all: args.all,
            limit: args.limit,
            starting_after: args.starting_after,
            ending_before: args.ending_before,
            extra_query: args.query,
        }
    }
}

/// Optional device detail sections.
#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct IncludeArgs {
    /// Include CPU details
    #[arg(long)]
    pub include_cpus: bool,

    /// Include disk details
    #[arg(long)]
    pub include_disks: bool,

    /// Include memory details
    #[arg(long)]
    pub include_memory: bool,

    /// Include network interfaces
    #[arg(long)]
    pub include_network_interfaces: bool,

    /// Include operating system details
    #[arg(long)]
    pub include_operating_system: bool,
}

impl From<IncludeArgs> for IncludeFlags {
    fn from(args: IncludeArgs) -> Self {
        Self {
            include_cpus: args.include_cpus,
            include_disks: args.include_disks,
            include_memory: args.include_memory,
            include_network_interfaces: args.include_network_interfaces,
            include_operating_system: args.include_operating_system,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ALERTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AlertsArgs {
    #[command(subcommand)]
    pub command: AlertsCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Active,
    Resolved,
    All,
}

impl From<StatusArg> for AlertStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Active => Self::Active,
            StatusArg::Resolved => Self::Resolved,
            StatusArg::All => Self::All,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum AlertsCommand {
    /// List alerts
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        list: ListArgs,

        /// Only alerts for this device (id or Level device URL)
        #[arg(long)]
        device: Option<String>,

        /// Alert status filter
        #[arg(long, default_value = "active")]
        status: StatusArg,
    },

    /// Get alert details
    Get {
        /// Alert ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        list: ListArgs,

        /// Only devices directly in this group
        #[arg(long)]
        group_id: Option<String>,

        /// Only devices anywhere under this group
        #[arg(long)]
        ancestor_group_id: Option<String>,

        #[command(flatten)]
        include: IncludeArgs,
    },

    /// Get device details
    Get {
        /// Device ID or Level device URL
        device: String,

        #[command(flatten)]
        include: IncludeArgs,

        /// Extra query parameter (repeatable)
        #[arg(long = "query", value_name = "KEY=VALUE")]
        query: Vec<KeyValuePair>,
    },

    /// Find devices by hostname substring
    Search {
        /// Case-insensitive hostname fragment
        filter: String,

        /// Continue a previous search from this token
        #[arg(long)]
        token: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  GROUPS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct GroupsArgs {
    #[command(subcommand)]
    pub command: GroupsCommand,
}

#[derive(Debug, Subcommand)]
pub enum GroupsCommand {
    /// List groups
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        list: ListArgs,

        /// Only children of this group
        #[arg(long)]
        parent_id: Option<String>,
    },

    /// Get group details
    Get {
        /// Group ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AUTOMATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AutomationsArgs {
    #[command(subcommand)]
    pub command: AutomationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AutomationsCommand {
    /// Fire an automation's webhook trigger
    Trigger {
        /// Token from the automation's webhook URL
        token: String,

        /// Raw JSON object to send as the body
        #[arg(long, conflicts_with_all = ["json_file", "device", "param"])]
        json: Option<String>,

        /// Read the JSON body from a file
        #[arg(long, value_name = "PATH", conflicts_with_all = ["device", "param"])]
        json_file: Option<PathBuf>,

        /// Target device id or URL (repeatable)
        #[arg(long)]
        device: Vec<String>,

        /// Custom parameter (repeatable), e.g. --param reason=patching
        #[arg(long, value_name = "KEY=VALUE")]
        param: Vec<KeyValuePair>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WEBHOOK
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WebhookArgs {
    #[command(subcommand)]
    pub command: WebhookCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EventArg {
    AlertActive,
    AlertResolved,
    DeviceCreated,
    DeviceUpdated,
    DeviceDeleted,
    GroupCreated,
    GroupUpdated,
    GroupDeleted,
}

impl From<EventArg> for EventType {
    fn from(arg: EventArg) -> Self {
        match arg {
            EventArg::AlertActive => Self::AlertActive,
            EventArg::AlertResolved => Self::AlertResolved,
            EventArg::DeviceCreated => Self::DeviceCreated,
            EventArg::DeviceUpdated => Self::DeviceUpdated,
            EventArg::DeviceDeleted => Self::DeviceDeleted,
            EventArg::GroupCreated => Self::GroupCreated,
            EventArg::GroupUpdated => Self::GroupUpdated,
            EventArg::GroupDeleted => Self::GroupDeleted,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum WebhookCommand {
    /// Run the webhook receiver, printing each accepted event as a JSON line
    Serve {
        /// Address to listen on (overrides config)
        #[arg(long)]
        listen: Option<SocketAddr>,

        /// Forward only these event types (repeatable; default all)
        #[arg(long = "event", value_name = "TYPE")]
        events: Vec<EventArg>,

        /// Emit the raw body as {"rawBody": ...} instead of the parsed event
        #[arg(long)]
        raw: bool,

        /// Shared webhook secret (overrides profile)
        #[arg(long, env = "LEVEL_WEBHOOK_SECRET", hide_env_values = true)]
        secret: Option<String>,

        /// JSON body returned to Level for every accepted delivery
        #[arg(long, value_name = "JSON")]
        ack: Option<String>,

        /// Stop after this many deliveries
        #[arg(long)]
        max_events: Option<usize>,
    },

    /// Compute the x-level-signature header for a body
    Sign {
        /// Shared webhook secret
        #[arg(long, env = "LEVEL_WEBHOOK_SECRET", hide_env_values = true)]
        secret: String,

        /// Body to sign
        #[arg(long, conflicts_with = "file")]
        body: Option<String>,

        /// Read the body from a file
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RUN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RunArgs {
    /// JSON file holding one operation object or an array of them ("-" for stdin)
    #[arg(value_name = "PATH")]
    pub file: PathBuf,

    /// Record failures as {"error": ...} items instead of stopping
    #[arg(long)]
    pub continue_on_fail: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or update a profile
    Init {
        /// Profile name
        #[arg(long, default_value = "default")]
        name: String,

        /// API base URL
        #[arg(long)]
        base_url: Option<String>,

        /// Environment variable holding the API key
        #[arg(long)]
        api_key_env: Option<String>,

        /// Store the API key given with --api-key in the system keyring
        #[arg(long)]
        keyring: bool,

        /// Save the API key given with --api-key in plaintext
        #[arg(long, conflicts_with = "keyring")]
        plaintext: bool,

        /// Environment variable holding the webhook secret
        #[arg(long)]
        webhook_secret_env: Option<String>,
    },

    /// Display current resolved configuration
    Show,

    /// List configured profiles
    Profiles,

    /// Set a profile value
    Set {
        /// Key: base_url, api_key, api_key_env, webhook_secret,
        /// webhook_secret_env, ca_cert, timeout
        key: String,
        /// Value
        value: String,
    },

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Check the API key against Level
    Test,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }
}
