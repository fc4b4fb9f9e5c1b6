//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// relcache - release manifest cache
///
/// Keeps a local copy of per-project, per-channel package manifests and
/// optionally mirrors the artifacts they reference.
#[derive(Parser, Debug)]
#[command(name = "relcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(long, global = true, env = "RELCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cache root directory (overrides cache.root)
    #[arg(long, global = true, env = "RELCACHE_CACHE_ROOT")]
    pub cache_root: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch manifests from upstream and refresh the cache
    Update(UpdateArgs),

    /// Print the cached manifest for a project and channel
    Show(QueryArgs),

    /// Print the generation timestamp of a cached manifest
    LastModified(QueryArgs),

    /// Show which pairs are cached
    Status(StatusArgs),

    /// Create the cache directory layout
    Init,

    /// Show or initialize configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

/// Arguments for the update command
#[derive(Parser, Debug)]
pub struct UpdateArgs {
    /// Restrict to these projects (repeatable, default: all)
    #[arg(short, long = "project")]
    pub projects: Vec<String>,

    /// Restrict to these channels (repeatable, default: all)
    #[arg(short, long = "channel")]
    pub channels: Vec<String>,

    /// Mirror package artifacts and use the unified backend
    #[arg(long)]
    pub mirror: bool,

    /// Directory receiving mirrored artifacts (overrides cache.packages_root)
    #[arg(long)]
    pub packages_root: Option<PathBuf>,
}

/// A single (project, channel) pair
#[derive(Parser, Debug)]
pub struct QueryArgs {
    /// Project name
    pub project: String,

    /// Channel name (current, stable)
    pub channel: String,
}

/// Arguments for the status command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Output format for listings
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
