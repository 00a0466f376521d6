//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// urlx - URL shortener with batched log shipping
#[derive(Parser, Debug)]
#[command(name = "urlx")]
#[command(version)]
#[command(about = "A URL shortener that ships its logs to Grafana Loki", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Print a sample configuration, or write it to a file
    GenerateConfig {
        /// Output file; prints to stdout when omitted
        #[arg(long, short = 'o')]
        output: Option<String>,
    },
}

impl Cli {
    pub fn command(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Serve)
    }
}
