//! CLI parse: clap types for the autopilot binary. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Content autopilot - find and fill missing chapter notes and MCQs
#[derive(Parser)]
#[command(name = "autopilot")]
#[command(about = "Scan the chapter catalog for content gaps and fill them with generated content")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one scan-and-fill pass
    Run {
        /// Run even when autopilot is disabled in config
        #[arg(long)]
        force: bool,
        /// Maximum gaps generated at the same time
        #[arg(long, default_value = "5")]
        concurrency: usize,
        /// Provider API key; repeat to rotate across several keys
        #[arg(long = "provider-key")]
        provider_keys: Vec<String>,
    },
    /// Report the gaps a run would fill, without generating anything
    Scan {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Run on a fixed interval until interrupted
    Daemon {
        /// Seconds between runs
        #[arg(long, default_value = "300")]
        interval_secs: u64,
        /// Maximum gaps generated at the same time
        #[arg(long, default_value = "5")]
        concurrency: usize,
        /// Provider API key; repeat to rotate across several keys
        #[arg(long = "provider-key")]
        provider_keys: Vec<String>,
    },
    /// Show recent automated fills from the interaction log
    History {
        /// Number of entries to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Print the stored record for a content key as JSON
    Show {
        /// Content key, e.g. chapter_content_CBSE_10_Physics_ch1
        content_key: String,
    },
}

impl Commands {
    /// Stable command name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Run { .. } => "run",
            Commands::Scan { .. } => "scan",
            Commands::Daemon { .. } => "daemon",
            Commands::History { .. } => "history",
            Commands::Show { .. } => "show",
        }
    }
}
