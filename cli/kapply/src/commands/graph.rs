//! Graph command.
//!
//! Builds the change graph for a change list. Works purely on local files.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use kapply_config::Conf;
use kapply_diffgraph::{ChangeGraph, PendingChange};

use crate::changes::load_changes;
use crate::output::{print_info, print_json, OutputFormat};

use super::CommandContext;

/// Build and print the change graph.
#[derive(Debug, Args)]
pub struct GraphCommand {
    /// Change list file (YAML or JSON).
    #[arg(long, value_name = "PATH")]
    changes: PathBuf,

    /// Config file with change groups and rules. May be repeated; files are
    /// merged in order after the embedded defaults.
    #[arg(long = "config", short = 'c', value_name = "PATH")]
    configs: Vec<PathBuf>,

    /// Do not merge the embedded default config.
    #[arg(long)]
    no_defaults: bool,

    /// Print the graph before cycles are resolved.
    #[arg(long)]
    unresolved: bool,
}

impl GraphCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let conf = Conf::load(&self.configs, !self.no_defaults)?;
        let changes = load_changes(&self.changes)?;

        tracing::debug!(
            changes = changes.len(),
            groups = conf.additional_change_groups().len(),
            rules = conf.additional_change_rules().len(),
            "building change graph"
        );

        let graph = build_graph(changes, &conf, self.unresolved)?;
        print_graph(&graph, ctx.format);
        Ok(())
    }
}

fn build_graph(
    changes: Vec<PendingChange>,
    conf: &Conf,
    unresolved: bool,
) -> Result<ChangeGraph<PendingChange>> {
    let groups = conf.additional_change_groups();
    let rules = conf.additional_change_rules();

    let graph = if unresolved {
        ChangeGraph::new_unresolved(changes, groups, rules)?
    } else {
        ChangeGraph::new(changes, groups, rules)?
    };
    Ok(graph)
}

fn print_graph(graph: &ChangeGraph<PendingChange>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&graph.to_summary()),
        OutputFormat::Text => {
            if graph.is_empty() {
                print_info("No changes.");
            } else {
                print!("{graph}");
            }
        }
    }
}
