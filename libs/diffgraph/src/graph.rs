//! Change graph construction and queries.

use std::sync::Arc;

use kapply_config::{AdditionalChangeGroup, AdditionalChangeRule, Conf};

use crate::actual_change::ActualChange;
use crate::change::{Change, ChangeId, RuleSet};
use crate::change_group::ChangeGroup;
use crate::change_rule::{ChangeRule, ChangeRuleOrder};
use crate::error::DiffGraphError;

/// Graph of pending changes and the wait edges between them.
///
/// The graph owns every change it was built from. Edges are ids into the
/// same arena, so one change can be waited for by many others. Top-level
/// membership is tracked separately from the arena: removing a change from
/// the top level keeps it reachable through the edges that point at it.
#[derive(Debug)]
pub struct ChangeGraph<C> {
    pub(crate) changes: Vec<Change<C>>,
    pub(crate) top_level: Vec<ChangeId>,
}

impl<C: ActualChange> ChangeGraph<C> {
    /// Build an acyclic change graph.
    ///
    /// Fails if any applicable rule cannot be resolved, or if a cycle cannot
    /// be broken without dropping an edge that came from a mandatory rule.
    pub fn new(
        changes: impl IntoIterator<Item = C>,
        groups: &[AdditionalChangeGroup],
        rules: &[AdditionalChangeRule],
    ) -> Result<Self, DiffGraphError> {
        Self::new_unresolved(changes, groups, rules)?.resolve()
    }

    /// Build an acyclic change graph using the groups and rules of `conf`.
    pub fn from_conf(
        changes: impl IntoIterator<Item = C>,
        conf: &Conf,
    ) -> Result<Self, DiffGraphError> {
        Self::new(
            changes,
            conf.additional_change_groups(),
            conf.additional_change_rules(),
        )
    }

    /// Build the graph without resolving cycles.
    ///
    /// The result may contain cycles. It is meant for diagnostics, e.g.
    /// printing the raw edges when [`ChangeGraph::new`] reports a cycle.
    pub fn new_unresolved(
        changes: impl IntoIterator<Item = C>,
        groups: &[AdditionalChangeGroup],
        rules: &[AdditionalChangeRule],
    ) -> Result<Self, DiffGraphError> {
        let rule_set = Arc::new(RuleSet {
            groups: groups.to_vec(),
            rules: rules.to_vec(),
        });

        let changes: Vec<Change<C>> = changes
            .into_iter()
            .enumerate()
            .map(|(index, change)| {
                Change::new(ChangeId::new(index), change, Arc::clone(&rule_set))
            })
            .collect();

        // Membership is fixed for the lifetime of the build; resolve it once.
        let memberships = changes
            .iter()
            .map(Change::groups)
            .collect::<Result<Vec<_>, _>>()?;

        let mut graph = Self {
            top_level: changes.iter().map(Change::id).collect(),
            changes,
        };

        for index in 0..graph.changes.len() {
            let id = ChangeId::new(index);
            let rules = graph.changes[index].applicable_rules()?;

            for rule in &rules {
                let matched = graph.matching_changes(&memberships, rule, id);
                let required = !rule.ignore_if_cyclical;

                match rule.order {
                    ChangeRuleOrder::After => {
                        for other in matched {
                            graph.changes[index].add_waiting_for(other, required);
                        }
                    }
                    ChangeRuleOrder::Before => {
                        for other in matched {
                            graph.changes[other.index()].add_waiting_for(id, required);
                        }
                    }
                }
            }
        }

        graph.prune_and_dedup();

        tracing::trace!(
            changes = graph.changes.len(),
            edges = graph.edge_count(),
            "built change graph edges"
        );

        Ok(graph)
    }

    /// Break cycles, pruning optional edges only.
    pub fn resolve(mut self) -> Result<Self, DiffGraphError> {
        self.resolve_cycles()?;
        self.prune_and_dedup();

        tracing::debug!(
            changes = self.changes.len(),
            edges = self.edge_count(),
            "resolved change graph"
        );

        Ok(self)
    }

    /// Every other change in the rule's target group whose op matches the
    /// rule's target action.
    fn matching_changes(
        &self,
        memberships: &[Vec<ChangeGroup>],
        rule: &ChangeRule,
        except: ChangeId,
    ) -> Vec<ChangeId> {
        self.changes
            .iter()
            .zip(memberships)
            .filter(|(change, groups)| {
                change.id() != except
                    && rule.target_action.applies_to(change.op())
                    && groups.contains(&rule.target_group)
            })
            .map(|(change, _)| change.id())
            .collect()
    }

    pub(crate) fn prune_and_dedup(&mut self) {
        for change in &mut self.changes {
            change.prune_and_dedup();
        }
    }
}

impl<C> ChangeGraph<C> {
    /// Every top-level change, in input order.
    pub fn all(&self) -> Vec<&Change<C>> {
        self.all_matching(|_| true)
    }

    /// Top-level changes satisfying the predicate.
    ///
    /// Only the top level is filtered; every change in the graph is present
    /// there unless it was removed with [`ChangeGraph::remove_matching`].
    pub fn all_matching(&self, matches: impl Fn(&Change<C>) -> bool) -> Vec<&Change<C>> {
        self.top_level
            .iter()
            .map(|id| &self.changes[id.index()])
            .filter(|change| matches(*change))
            .collect()
    }

    /// Remove matching changes from the top level.
    ///
    /// Removed changes stay in the graph as targets of other changes' wait
    /// edges; they are only no longer treated as independent roots.
    pub fn remove_matching(&mut self, matches: impl Fn(&Change<C>) -> bool) {
        let changes = &self.changes;
        self.top_level.retain(|id| !matches(&changes[id.index()]));
    }

    /// Look up any change of the graph, including removed ones.
    pub fn get(&self, id: ChangeId) -> Option<&Change<C>> {
        self.changes.get(id.index())
    }

    /// Changes that `change` waits for.
    pub fn waiting_for<'a>(
        &'a self,
        change: &'a Change<C>,
    ) -> impl Iterator<Item = &'a Change<C>> + 'a {
        change
            .waiting_for
            .iter()
            .flatten()
            .map(move |id| &self.changes[id.index()])
    }

    /// Number of top-level changes.
    pub fn len(&self) -> usize {
        self.top_level.len()
    }

    pub fn is_empty(&self) -> bool {
        self.top_level.is_empty()
    }

    /// Number of wait edges across the whole graph.
    pub fn edge_count(&self) -> usize {
        self.changes
            .iter()
            .map(|change| change.waiting_for.iter().flatten().count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use kapply_resources::{Resource, ResourceMatcher, ResourceMatchers};

    use super::*;
    use crate::actual_change::{ChangeOp, PendingChange};

    fn change(op: ChangeOp, kind: &str, name: &str) -> PendingChange {
        PendingChange::new(op, Resource::new("v1", kind, "default", name))
    }

    fn group(name: &str, kind: &str) -> AdditionalChangeGroup {
        AdditionalChangeGroup {
            name: name.to_string(),
            resource_matchers: ResourceMatchers::new(vec![ResourceMatcher::kind(kind)]),
        }
    }

    fn rule(rule: &str, kind: &str, ignore_if_cyclical: bool) -> AdditionalChangeRule {
        AdditionalChangeRule {
            rules: vec![rule.to_string()],
            ignore_if_cyclical,
            resource_matchers: ResourceMatchers::new(vec![ResourceMatcher::kind(kind)]),
        }
    }

    #[test]
    fn test_empty_graph() {
        let graph = ChangeGraph::<PendingChange>::new(Vec::new(), &[], &[]).unwrap();
        assert!(graph.is_empty());
        assert!(graph.all().is_empty());
    }

    #[test]
    fn test_after_rule_adds_edge() {
        let graph = ChangeGraph::new(
            vec![
                change(ChangeOp::Create, "Pod", "web"),
                change(ChangeOp::Create, "ConfigMap", "settings"),
            ],
            &[group("app/config", "ConfigMap")],
            &[rule("upsert after upserting app/config", "Pod", false)],
        )
        .unwrap();

        let all = graph.all();
        assert_eq!(all[0].waiting_for().collect::<Vec<_>>(), vec![all[1].id()]);
        assert!(all[0].is_required(all[1].id()));
        assert_eq!(all[1].waiting_for().count(), 0);
    }

    #[test]
    fn test_target_action_filters_matches() {
        let graph = ChangeGraph::new(
            vec![
                change(ChangeOp::Create, "Pod", "web"),
                change(ChangeOp::Delete, "ConfigMap", "old"),
                change(ChangeOp::Noop, "ConfigMap", "same"),
                change(ChangeOp::Update, "ConfigMap", "settings"),
            ],
            &[group("app/config", "ConfigMap")],
            &[rule("upsert after upserting app/config", "Pod", false)],
        )
        .unwrap();

        let pod = graph.all()[0];
        assert_eq!(pod.waiting_for().collect::<Vec<_>>(), vec![ChangeId::new(3)]);
    }

    #[test]
    fn test_rule_does_not_match_its_own_change() {
        let graph = ChangeGraph::new(
            vec![change(ChangeOp::Create, "Pod", "a"), change(ChangeOp::Create, "Pod", "b")],
            &[group("app/pods", "Pod")],
            &[rule("upsert after upserting app/pods", "Pod", true)],
        )
        .unwrap();

        // a waits for b, b waits for a: the second edge closes a soft cycle.
        let a = graph.all()[0];
        let b = graph.all()[1];
        assert!(!a.is_waiting_for(a.id()));
        assert!(!b.is_waiting_for(b.id()));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_invalid_rule_aborts_construction() {
        let result = ChangeGraph::new(
            vec![change(ChangeOp::Create, "Pod", "web")],
            &[],
            &[rule("upsert after", "Pod", false)],
        );
        assert!(matches!(result, Err(DiffGraphError::InvalidRule { .. })));
    }

    #[test]
    fn test_invalid_annotation_group_aborts_construction() {
        let bad = PendingChange::new(
            ChangeOp::Create,
            Resource::new("v1", "Pod", "default", "web")
                .with_annotation("kapply.dev/change-group", "bad group"),
        );
        let result = ChangeGraph::new(vec![bad], &[], &[]);
        assert!(matches!(result, Err(DiffGraphError::InvalidGroup { .. })));
    }

    #[test]
    fn test_remove_matching_keeps_edges() {
        let mut graph = ChangeGraph::new(
            vec![
                change(ChangeOp::Create, "Pod", "web"),
                change(ChangeOp::Create, "ConfigMap", "settings"),
            ],
            &[group("app/config", "ConfigMap")],
            &[rule("upsert after upserting app/config", "Pod", false)],
        )
        .unwrap();

        graph.remove_matching(|c| c.change().resource.kind() == "ConfigMap");

        let all = graph.all();
        assert_eq!(all.len(), 1);
        let deps: Vec<_> = graph.waiting_for(all[0]).collect();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].change().resource.name(), "settings");
        assert!(graph.get(deps[0].id()).is_some());
    }
}
