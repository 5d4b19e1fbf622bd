use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dhv")]
#[command(about = "DHV - A delta-hedged options liquidity vault")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the vault and keeper with the given configuration
    Run {
        /// Path to the configuration file
        #[arg(short, long, default_value = "dhv.yaml")]
        config: PathBuf,

        /// Override the log format from the config (pretty, json, compact)
        #[arg(long)]
        log_format: Option<String>,

        /// Override the metrics port from the config
        #[arg(long)]
        metrics_port: Option<u16>,
    },

    /// Validate configuration without starting the vault
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "dhv.yaml")]
        config: PathBuf,
    },

    /// Initialize a new configuration file with all defaults
    Init {
        /// Output path for the new configuration file
        #[arg(short, long, default_value = "dhv.yaml")]
        output: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
