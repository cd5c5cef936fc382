//! Change nodes.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use kapply_config::{AdditionalChangeGroup, AdditionalChangeRule};

use crate::actual_change::{ActualChange, ChangeOp};
use crate::change_group::{groups_for_resource, is_annotation_key, ChangeGroup};
use crate::change_rule::{ChangeRule, CHANGE_RULE_ANNOTATION};
use crate::error::DiffGraphError;

/// Stable index of a change inside its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChangeId(usize);

impl ChangeId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the change in the graph's input order.
    pub const fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ChangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Config shared by every node of one graph.
#[derive(Debug, Default)]
pub(crate) struct RuleSet {
    pub(crate) groups: Vec<AdditionalChangeGroup>,
    pub(crate) rules: Vec<AdditionalChangeRule>,
}

/// One pending change plus the wait edges computed for it.
///
/// `waiting_for` holds `None` for edges pruned while cycles are resolved;
/// a finished graph never exposes them. `required_waiting_for` is always a
/// subset of the targets in `waiting_for`.
pub struct Change<C> {
    id: ChangeId,
    change: C,
    rule_set: Arc<RuleSet>,
    pub(crate) waiting_for: Vec<Option<ChangeId>>,
    pub(crate) required_waiting_for: BTreeSet<ChangeId>,
}

impl<C: ActualChange> Change<C> {
    pub(crate) fn new(id: ChangeId, change: C, rule_set: Arc<RuleSet>) -> Self {
        Self {
            id,
            change,
            rule_set,
            waiting_for: Vec::new(),
            required_waiting_for: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> ChangeId {
        self.id
    }

    /// The wrapped change.
    pub fn change(&self) -> &C {
        &self.change
    }

    pub fn op(&self) -> ChangeOp {
        self.change.op()
    }

    pub fn description(&self) -> String {
        self.change.description()
    }

    /// Changes that must be applied before this one.
    pub fn waiting_for(&self) -> impl Iterator<Item = ChangeId> + '_ {
        self.waiting_for.iter().flatten().copied()
    }

    /// Returns true if this change waits for `other`.
    pub fn is_waiting_for(&self, other: ChangeId) -> bool {
        self.waiting_for().any(|id| id == other)
    }

    /// Returns true if the wait edge to `other` exists and came from a
    /// mandatory rule.
    pub fn is_required(&self, other: ChangeId) -> bool {
        self.required_waiting_for.contains(&other) && self.is_waiting_for(other)
    }

    /// Targets of the mandatory wait edges.
    pub fn required_waiting_for(&self) -> impl Iterator<Item = ChangeId> + '_ {
        self.required_waiting_for.iter().copied()
    }

    /// Groups this change belongs to.
    pub fn groups(&self) -> Result<Vec<ChangeGroup>, DiffGraphError> {
        groups_for_resource(self.change.resource(), &self.rule_set.groups).map_err(|source| {
            DiffGraphError::InvalidGroup {
                resource: self.description(),
                source,
            }
        })
    }

    /// Rules that apply to this change, given its op.
    ///
    /// Annotation rules come first, then config rules in config order.
    /// Every candidate rule is parsed, so a malformed rule fails even when
    /// its action does not apply to this change.
    pub fn applicable_rules(&self) -> Result<Vec<ChangeRule>, DiffGraphError> {
        let res = self.change.resource();
        let mut rules = Vec::new();

        for (key, value) in res.annotations() {
            if is_annotation_key(key, CHANGE_RULE_ANNOTATION) {
                rules.push(self.parse_rule(value, false)?);
            }
        }

        for additional in &self.rule_set.rules {
            if !additional.resource_matchers.matches(res) {
                continue;
            }
            for rule_str in &additional.rules {
                rules.push(self.parse_rule(rule_str, additional.ignore_if_cyclical)?);
            }
        }

        let op = self.op();
        rules.retain(|rule| rule.action.applies_to(op));
        Ok(rules)
    }

    fn parse_rule(
        &self,
        rule_str: &str,
        ignore_if_cyclical: bool,
    ) -> Result<ChangeRule, DiffGraphError> {
        ChangeRule::from_rule_str(rule_str)
            .map(|rule| rule.with_ignore_if_cyclical(ignore_if_cyclical))
            .map_err(|source| DiffGraphError::InvalidRule {
                resource: self.description(),
                rule: rule_str.to_string(),
                source,
            })
    }

    pub(crate) fn add_waiting_for(&mut self, other: ChangeId, required: bool) {
        self.waiting_for.push(Some(other));
        if required {
            self.required_waiting_for.insert(other);
        }
    }

    /// Drop nil markers and duplicate targets, keeping first occurrences.
    pub(crate) fn prune_and_dedup(&mut self) {
        let mut seen = BTreeSet::new();
        self.waiting_for
            .retain(|entry| matches!(entry, Some(id) if seen.insert(*id)));
    }
}

impl<C: fmt::Debug> fmt::Debug for Change<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Change")
            .field("id", &self.id)
            .field("change", &self.change)
            .field("waiting_for", &self.waiting_for)
            .field("required_waiting_for", &self.required_waiting_for)
            .finish()
    }
}
