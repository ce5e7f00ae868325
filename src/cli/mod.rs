//! CLI definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// RepoMind CLI - semantic code indexing for repositories
#[derive(Parser, Debug)]
#[command(name = "repomind", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (default: repomind.config.yaml)
    #[arg(long, global = true, env = "REPOMIND_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output as JSON (for agent integration)
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration and embedding server reachability
    Doctor,

    /// Print version information
    Version,
}

impl Cli {
    /// Effective config file path (flag/env, else the conventional name).
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from("repomind.config.yaml"))
    }
}
