//! Diagnostic rendering.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::actual_change::{ActualChange, ChangeOp};
use crate::change::ChangeId;
use crate::graph::ChangeGraph;

/// JSON friendly view of one top-level change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    pub op: ChangeOp,
    pub description: String,
    /// Descriptions of the changes this one waits for, in edge order.
    pub waiting_for: Vec<String>,
}

impl<C: ActualChange> ChangeGraph<C> {
    /// Render the graph as an indented tree.
    ///
    /// Each change is printed as `(op) description`, followed by the changes
    /// it waits for one level deeper. A change that is already among its own
    /// ancestors is followed by a `cycle found` line instead of its edges;
    /// this only happens on graphs built with
    /// [`ChangeGraph::new_unresolved`].
    pub fn print_str(&self) -> String {
        self.to_string()
    }

    /// One summary per top-level change.
    pub fn to_summary(&self) -> Vec<ChangeSummary> {
        self.all()
            .into_iter()
            .map(|change| ChangeSummary {
                op: change.op(),
                description: change.description(),
                waiting_for: self
                    .waiting_for(change)
                    .map(|dep| dep.description())
                    .collect(),
            })
            .collect()
    }

    /// Depth-first rendering on an explicit stack of sibling lists.
    fn write_tree(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![Siblings {
            owner: None,
            ids: self.top_level.clone(),
            next: 0,
        }];
        let mut ancestors = HashSet::new();

        loop {
            let indent = stack.len().saturating_sub(1) * 2;
            let Some(level) = stack.last_mut() else {
                return Ok(());
            };

            let Some(&id) = level.ids.get(level.next) else {
                if let Some(owner) = level.owner {
                    ancestors.remove(&owner);
                }
                stack.pop();
                continue;
            };
            level.next += 1;

            let change = &self.changes[id.index()];
            writeln!(f, "{:indent$}({}) {}", "", change.op(), change.description())?;

            if ancestors.insert(id) {
                stack.push(Siblings {
                    owner: Some(id),
                    ids: change.waiting_for().collect(),
                    next: 0,
                });
            } else {
                writeln!(f, "{:indent$}cycle found", "")?;
            }
        }
    }
}

/// Changes printed at one depth, below `owner`.
struct Siblings {
    owner: Option<ChangeId>,
    ids: Vec<ChangeId>,
    next: usize,
}

impl<C: ActualChange> fmt::Display for ChangeGraph<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f)
    }
}
