//! Clap derive structures for the `fhsync` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fhsync -- mobile backend client from the command line
#[derive(Debug, Parser)]
#[command(
    name = "fhsync",
    version,
    about = "Bootstrap a mobile backend client, log in, and call cloud endpoints",
    long_about = "Host application for the fhsync client.\n\n\
        Reads the application manifest (fhconfig.toml), keeps a stable device\n\
        identifier and session token on disk, and issues authenticated calls\n\
        against the configured backend host.",
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
    /// Path to the application manifest
    #[arg(long, short = 'm', env = "FH_MANIFEST", global = true)]
    pub manifest: Option<PathBuf>,

    /// Directory for the device id and session token store
    #[arg(long, env = "FH_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Backend host (overrides the manifest)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Output format
    #[arg(long, short = 'o', env = "FH_OUTPUT", default_value = "text", global = true)]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides the manifest)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    Text,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Initialize the client and report the session it resolved
    Init(InitArgs),

    /// Log in against a backend auth policy
    #[command(alias = "login")]
    Auth(AuthArgs),

    /// Call a cloud endpoint with the current session
    #[command(alias = "act")]
    Cloud(CloudArgs),

    /// Print the persistent device identifier
    Device,

    /// Forget the stored session token
    Logout,

    /// Manage the application manifest
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── init ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Backend host to use instead of the manifest host
    pub uri: Option<String>,

    /// Wait up to SECONDS for a network connection before reporting
    #[arg(long, value_name = "SECONDS")]
    pub wait: Option<u64>,
}

// ── auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AuthArgs {
    /// Auth policy id (e.g. FEEDHENRY, OAUTH2, MBAAS)
    pub policy: String,

    /// Username for policies that take credentials
    #[arg(long, short = 'u')]
    pub user: Option<String>,

    /// Password (prompted when --user is given without it)
    #[arg(long, env = "FH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

// ── cloud ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CloudArgs {
    /// Backend path, e.g. /hello
    pub path: String,

    /// HTTP method
    #[arg(long, short = 'X', default_value = "POST")]
    pub method: String,

    /// Extra header as NAME:VALUE (repeatable)
    #[arg(long = "header", short = 'H', value_name = "NAME:VALUE")]
    pub headers: Vec<String>,

    /// JSON object body
    #[arg(long, short = 'd', value_name = "JSON")]
    pub data: Option<String>,
}

// ── config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create the manifest with guided setup
    Init,

    /// Display the resolved manifest
    Show,

    /// Print the manifest path
    Path,
}

// ── completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
