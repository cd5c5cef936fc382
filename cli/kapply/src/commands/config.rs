//! Config commands.
//!
//! These commands operate purely on local config files (offline).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use kapply_config::{default_config_yaml, ConfigDocument, ConfigError, DEFAULT_CONFIG_VERSION};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_json, print_output, print_success, OutputFormat};

use super::CommandContext;

/// Config commands.
#[derive(Debug, Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Debug, Subcommand)]
enum ConfigSubcommand {
    /// Print the embedded default config.
    Default,

    /// Validate config files (offline).
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Config files to validate.
    #[arg(required = true, value_name = "PATH")]
    files: Vec<PathBuf>,
}

/// Per-file validation summary.
#[derive(Debug, Serialize, Tabled)]
struct ConfigFileSummary {
    #[tabled(rename = "FILE")]
    file: String,
    #[tabled(rename = "DOCUMENTS")]
    documents: usize,
    #[tabled(rename = "GROUPS")]
    groups: usize,
    #[tabled(rename = "RULES")]
    rules: usize,
}

impl ConfigCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            ConfigSubcommand::Default => print_default(ctx),
            ConfigSubcommand::Validate(args) => validate_files(ctx, args),
        }
    }
}

fn print_default(ctx: CommandContext) -> Result<()> {
    match ctx.format {
        OutputFormat::Json => {
            let docs = ConfigDocument::from_yaml_str(default_config_yaml())
                .context("embedded default config is invalid")?;
            print_json(&serde_json::json!({
                "version": DEFAULT_CONFIG_VERSION,
                "documents": docs,
            }));
        }
        OutputFormat::Text => {
            println!("# kapply default config, version {DEFAULT_CONFIG_VERSION}");
            print!("{}", default_config_yaml());
        }
    }
    Ok(())
}

fn validate_files(ctx: CommandContext, args: ValidateArgs) -> Result<()> {
    let summaries = args
        .files
        .iter()
        .map(|path| summarize(path))
        .collect::<Result<Vec<_>, _>>()?;

    print_output(&summaries, ctx.format);
    if ctx.format == OutputFormat::Text {
        print_success(&format!("{} config file(s) are valid", summaries.len()));
    }
    Ok(())
}

fn summarize(path: &Path) -> Result<ConfigFileSummary, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let docs = ConfigDocument::from_yaml_str(&contents).map_err(|err| ConfigError::File {
        path: path.to_path_buf(),
        source: Box::new(err),
    })?;

    Ok(ConfigFileSummary {
        file: path.display().to_string(),
        documents: docs.len(),
        groups: docs.iter().map(|d| d.additional_change_groups.len()).sum(),
        rules: docs.iter().map(|d| d.additional_change_rules.len()).sum(),
    })
}
