//! Error types for change graph construction.

use thiserror::Error;

/// Errors that can occur when parsing change rules or group names.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChangeRuleError {
    /// The rule string does not have the four expected parts.
    #[error("expected format '<action> <order> <target-action> <group>', got {count} part(s)")]
    WrongFormat { count: usize },

    /// Unknown rule action.
    #[error("unknown action '{0}' (expected 'upsert' or 'delete')")]
    UnknownAction(String),

    /// Unknown rule order.
    #[error("unknown order '{0}' (expected 'after' or 'before')")]
    UnknownOrder(String),

    /// Unknown target action.
    #[error("unknown target action '{0}' (expected 'upserting' or 'deleting')")]
    UnknownTargetAction(String),

    /// The change group name is not usable.
    #[error("invalid change group name '{name}': {reason}")]
    InvalidGroupName { name: String, reason: &'static str },
}

/// Errors that abort change graph construction.
///
/// No partial graph is ever returned alongside one of these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiffGraphError {
    /// A change rule attached to a resource could not be resolved.
    #[error("invalid change rule '{rule}' for {resource}: {source}")]
    InvalidRule {
        resource: String,
        rule: String,
        #[source]
        source: ChangeRuleError,
    },

    /// A change group declared on a resource could not be resolved.
    #[error("invalid change group for {resource}: {source}")]
    InvalidGroup {
        resource: String,
        #[source]
        source: ChangeRuleError,
    },

    /// A chain of mandatory wait edges returns to a change already on the path.
    #[error("Detected cycle while ordering changes: {path} (found repeated: {repeated})")]
    Cycle { path: String, repeated: String },
}

impl DiffGraphError {
    /// Returns true if this error is a mandatory cycle.
    pub fn is_cycle(&self) -> bool {
        matches!(self, DiffGraphError::Cycle { .. })
    }
}
