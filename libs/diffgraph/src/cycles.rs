//! Cycle resolution.
//!
//! Every change is used as a root of a depth-first walk over its wait edges.
//! Reaching a change that is already on the current path means the last
//! edge closed a cycle: a mandatory edge makes the walk fail, an optional
//! edge is pruned. A failure below an optional edge prunes that edge too, so
//! only mandatory chains can surface as errors.

use std::collections::HashSet;

use crate::actual_change::ActualChange;
use crate::change::ChangeId;
use crate::error::DiffGraphError;
use crate::graph::ChangeGraph;

/// Result of following a single wait edge.
#[derive(Debug)]
enum EdgeOutcome {
    /// Keep the edge.
    Continue,
    /// Replace the edge with the pruned marker.
    Pruned,
    /// Abort the walk of the edge's source.
    Fatal(DiffGraphError),
}

/// What to do with the next edge of the change on top of the stack.
enum Step {
    /// The edge is settled without leaving the current change.
    Settled(EdgeOutcome),
    /// Walk into `target` before settling the edge.
    Descend { target: ChangeId, required: bool },
}

/// A change on the current path together with the edge being followed.
struct Frame {
    node: ChangeId,
    /// Index into `waiting_for` of the edge being followed.
    next_edge: usize,
    /// Whether the edge leading to this change is mandatory.
    entered_required: bool,
}

/// Traversal state for one root.
#[derive(Default)]
struct Walk {
    stack: Vec<Frame>,
    /// Changes on the current path, root included.
    visited: HashSet<ChangeId>,
    /// `[description]` of each change on the current path.
    path: Vec<String>,
}

impl Walk {
    fn push(&mut self, node: ChangeId, entered_required: bool, bracketed: String) {
        self.stack.push(Frame {
            node,
            next_edge: 0,
            entered_required,
        });
        self.visited.insert(node);
        self.path.push(bracketed);
    }

    fn pop(&mut self) -> Option<Frame> {
        let frame = self.stack.pop()?;
        self.visited.remove(&frame.node);
        self.path.pop();
        Some(frame)
    }
}

impl<C: ActualChange> ChangeGraph<C> {
    /// Prune optional edges until the graph is acyclic.
    ///
    /// A change is marked resolved once all of its edges were kept or
    /// pruned. Everything reachable from a resolved change is resolved and
    /// acyclic, so later walks can stop there without changing which edges
    /// get pruned.
    pub(crate) fn resolve_cycles(&mut self) -> Result<(), DiffGraphError> {
        let mut resolved = HashSet::new();

        for index in 0..self.changes.len() {
            let root = ChangeId::new(index);
            if !resolved.contains(&root) {
                self.walk_from(root, &mut resolved)?;
            }
        }

        Ok(())
    }

    /// Depth-first walk from `root` on an explicit stack, so path length is
    /// bounded by memory rather than by the thread's stack.
    fn walk_from(
        &mut self,
        root: ChangeId,
        resolved: &mut HashSet<ChangeId>,
    ) -> Result<(), DiffGraphError> {
        let mut walk = Walk::default();
        walk.push(root, false, self.bracketed(root));

        while let Some(frame) = walk.stack.last() {
            let (from, edge) = (frame.node, frame.next_edge);

            if edge == self.changes[from.index()].waiting_for.len() {
                walk.pop();
                resolved.insert(from);
                self.settle(&mut walk, EdgeOutcome::Continue)?;
                continue;
            }

            match self.next_step(from, edge, &walk, resolved) {
                Step::Settled(outcome) => self.settle(&mut walk, outcome)?,
                Step::Descend { target, required } => {
                    walk.push(target, required, self.bracketed(target));
                }
            }
        }

        Ok(())
    }

    fn next_step(
        &self,
        from: ChangeId,
        edge: usize,
        walk: &Walk,
        resolved: &HashSet<ChangeId>,
    ) -> Step {
        let source = &self.changes[from.index()];
        let Some(target) = source.waiting_for[edge] else {
            return Step::Settled(EdgeOutcome::Continue);
        };
        let required = source.required_waiting_for.contains(&target);

        if walk.visited.contains(&target) {
            if required {
                return Step::Settled(EdgeOutcome::Fatal(self.cycle_error(walk, target)));
            }
            self.log_pruned(from, target, "edge closes a cycle");
            return Step::Settled(EdgeOutcome::Pruned);
        }

        if resolved.contains(&target) {
            return Step::Settled(EdgeOutcome::Continue);
        }

        Step::Descend { target, required }
    }

    /// Apply `outcome` to the current edge of the change on top of the stack.
    ///
    /// A fatal outcome fails that change: it is popped and the failure moves
    /// to the edge its parent followed into it. The first optional edge on
    /// the way up is pruned and the walk resumes there; reaching the root
    /// returns the error.
    fn settle(&mut self, walk: &mut Walk, mut outcome: EdgeOutcome) -> Result<(), DiffGraphError> {
        loop {
            let Some(frame) = walk.stack.last_mut() else {
                return match outcome {
                    EdgeOutcome::Fatal(err) => Err(err),
                    EdgeOutcome::Continue | EdgeOutcome::Pruned => Ok(()),
                };
            };

            match outcome {
                EdgeOutcome::Continue => {
                    frame.next_edge += 1;
                    return Ok(());
                }
                EdgeOutcome::Pruned => {
                    self.changes[frame.node.index()].waiting_for[frame.next_edge] = None;
                    frame.next_edge += 1;
                    return Ok(());
                }
                EdgeOutcome::Fatal(err) => {
                    let Some(failed) = walk.pop() else {
                        return Err(err);
                    };
                    let Some(parent) = walk.stack.last() else {
                        return Err(err);
                    };

                    outcome = if failed.entered_required {
                        EdgeOutcome::Fatal(err)
                    } else {
                        let reason = "edge leads to a mandatory cycle";
                        self.log_pruned(parent.node, failed.node, reason);
                        EdgeOutcome::Pruned
                    };
                }
            }
        }
    }

    fn cycle_error(&self, walk: &Walk, repeated: ChangeId) -> DiffGraphError {
        let mut path = walk.path.join(" -> ");
        path.push_str(" -> ");
        path.push_str(&self.bracketed(repeated));

        DiffGraphError::Cycle {
            path,
            repeated: self.changes[repeated.index()].description(),
        }
    }

    fn bracketed(&self, id: ChangeId) -> String {
        format!("[{}]", self.changes[id.index()].description())
    }

    fn log_pruned(&self, from: ChangeId, target: ChangeId, reason: &str) {
        tracing::debug!(
            change = %self.changes[from.index()].description(),
            waiting_for = %self.changes[target.index()].description(),
            reason,
            "pruned optional wait edge"
        );
    }
}
