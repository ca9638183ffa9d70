//! CLI command definitions and dispatch for the `alerthub` binary.
//!
//! Uses clap derive macros for argument parsing. Resource commands follow a
//! noun-verb pattern (e.g., `alerthub report list`, `alerthub user create`).

pub mod alerts;
pub mod report;
pub mod stats;
pub mod user;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Community safety reporting service: REST API and operator tools.
#[derive(Parser)]
#[command(name = "alerthub", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans via OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default log filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 if matches!(self.command, Commands::Serve { .. }) => "info",
            0 => "warn",
            1 => "info,alerthub=debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (default from config: 4000).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (default from config: 0.0.0.0).
        #[arg(long)]
        host: Option<String>,
    },

    /// Manage user accounts.
    User {
        #[command(subcommand)]
        action: user::UserCommand,
    },

    /// Inspect and update reports.
    Report {
        #[command(subcommand)]
        action: report::ReportCommand,
    },

    /// Neighborhood and monthly report statistics.
    Stats {
        /// Only count reports in this category.
        #[arg(long)]
        category: Option<String>,

        /// Only count reports with this status.
        #[arg(long)]
        status: Option<String>,
    },

    /// Community incident alerts.
    Alerts {
        #[command(subcommand)]
        action: alerts::AlertsCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Colored label for a report status.
pub(crate) fn status_cell(status: &alerthub_types::report::ReportStatus) -> comfy_table::Cell {
    use alerthub_types::report::ReportStatus;
    use comfy_table::{Cell, Color};

    match status {
        ReportStatus::Submitted => Cell::new("● submitted").fg(Color::Cyan),
        ReportStatus::InProgress => Cell::new("◐ in_progress").fg(Color::Yellow),
        ReportStatus::Resolved => Cell::new("✓ resolved").fg(Color::Green),
        ReportStatus::Closed => Cell::new("○ closed").fg(Color::DarkGrey),
    }
}
