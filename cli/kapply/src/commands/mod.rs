//! CLI commands.

mod config;
mod graph;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::logging::{self, LogFormat};
use crate::output::OutputFormat;

/// kapply - order pending changes with change groups and change rules.
#[derive(Debug, Parser)]
#[command(name = "kapply")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format (text or json).
    #[arg(long, global = true, default_value = "text")]
    format: String,

    /// Log filter directive, e.g. `debug` or `kapply_diffgraph=trace`.
    #[arg(long, global = true, env = "KAPPLY_LOG", default_value = "warn")]
    log_level: String,

    /// Log line format (text or json). Logs are written to stderr.
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build the change graph for a change list and print it.
    Graph(graph::GraphCommand),

    /// Inspect and validate config files.
    Config(config::ConfigCommand),

    /// Show CLI version.
    Version,
}

impl Cli {
    /// Run the CLI command.
    pub fn run(self) -> Result<()> {
        logging::init(&self.log_level, LogFormat::parse(&self.log_format));

        let ctx = CommandContext {
            format: OutputFormat::parse(&self.format),
        };

        match self.command {
            Commands::Graph(cmd) => cmd.run(ctx),
            Commands::Config(cmd) => cmd.run(ctx),
            Commands::Version => {
                println!("kapply {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

/// Shared command context.
pub struct CommandContext {
    pub format: OutputFormat,
}
