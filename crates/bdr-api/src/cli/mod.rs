//! CLI command definitions for the `bdr` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod route;
pub mod rules;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use bdr_infra::config::DEFAULT_CONFIG_FILE;

/// Classify HubSpot webhook events and run BDR workflows.
#[derive(Parser)]
#[command(name = "bdr", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, env = "BDR_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Write logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the webhook server.
    Serve {
        /// Port to listen on (overrides `server.port`).
        #[arg(long)]
        port: Option<u16>,

        /// Host to bind to (overrides `server.host`).
        #[arg(long)]
        host: Option<String>,

        /// Log workflows instead of running them.
        #[arg(long)]
        dry_run: bool,
    },

    /// Show how a saved HubSpot delivery would be routed, without running anything.
    Route {
        /// JSON file holding one delivery body (an event object or an array).
        file: PathBuf,
    },

    /// Print the active routing rule table.
    Rules,
}
