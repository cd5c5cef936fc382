//! kapply - orders pending changes using change groups and change rules.
//!
//! Offline tool: reads a change list and config files, builds the change
//! graph, and prints the resulting wait order or the cycle that prevents it.

use anyhow::Result;
use clap::Parser;

mod changes;
mod commands;
mod error;
mod logging;
mod output;

use commands::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = cli.run() {
        error::print_error(&e);
        std::process::exit(1);
    }

    Ok(())
}
