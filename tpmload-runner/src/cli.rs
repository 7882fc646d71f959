//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's
//! derive macros. It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// tpmload -- TPM REST API load scenario runner.
///
/// Use `tpmload <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "tpmload", version, about, long_about = None)]
pub struct Cli {
    /// Path to the tpmload.toml configuration file.
    #[arg(short, long, default_value = "tpmload.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format for reports.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute the load scenario.
    Run(RunArgs),

    /// List the scenario endpoint catalog.
    Endpoints(EndpointsArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- run ----

/// Execute the load scenario against the configured target.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override the number of concurrent virtual users.
    #[arg(long)]
    pub vus: Option<u32>,

    /// Override iterations per virtual user (0 = unbounded).
    #[arg(long)]
    pub iterations: Option<u64>,

    /// Override the wall-clock duration cap in seconds (0 = no cap).
    #[arg(long)]
    pub duration: Option<u64>,

    /// Override the pause between iterations in seconds.
    #[arg(long)]
    pub pause: Option<u64>,
}

// ---- endpoints ----

/// List the endpoint catalog in declared order.
#[derive(Args, Debug)]
pub struct EndpointsArgs {
    /// Include disabled endpoints.
    #[arg(long)]
    pub all: bool,
}

// ---- config ----

/// Manage tpmload configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, target, load, metrics, scenario).
        #[arg(long)]
        section: Option<String>,
    },
}
