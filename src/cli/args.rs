//! CLI argument definitions using clap derive

use crate::goal::Goal;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// goalpost - Script or Module?
///
/// Resolves which grammar each source file parses under, remembering
/// decisions in a fingerprinted on-disk cache.
#[derive(Parser, Debug)]
#[command(name = "goalpost")]
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
    #[arg(short, long, global = true, env = "GOALPOST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Goal cache directory
    #[arg(long, global = true, env = "GOALPOST_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the parse goal of source files
    Resolve(ResolveArgs),

    /// Manage the goal cache
    Cache(CacheArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the resolve command
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Source files to resolve
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Declare the goal instead of detecting it (no fallback)
    #[arg(short, long, value_parser = parse_goal)]
    pub goal: Option<Goal>,

    /// Attempt order for undeclared files (comma-separated, primary first)
    #[arg(long, value_delimiter = ',', value_parser = parse_goal)]
    pub order: Vec<Goal>,

    /// Skip the goal cache for this run
    #[arg(long)]
    pub no_cache: bool,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List cached goal records
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Remove the record for a source file
    Remove {
        /// Source file whose record to remove
        path: PathBuf,
    },

    /// Remove all records
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the cache directory
    Path,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

fn parse_goal(s: &str) -> Result<Goal, String> {
    s.parse::<Goal>().map_err(|e| e.to_string())
}
