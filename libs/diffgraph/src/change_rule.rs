//! Change rules.
//!
//! A rule string has four whitespace separated parts:
//!
//! ```text
//! <action> <order> <target-action> <group>
//! upsert   after   upserting       change-groups.kapply.dev/storage
//! ```
//!
//! The rule applies to a change whose op matches `action` and relates it to
//! every other change in `group` whose op matches `target-action`.

use std::fmt;
use std::str::FromStr;

use crate::actual_change::ChangeOp;
use crate::change_group::ChangeGroup;
use crate::error::ChangeRuleError;

/// Annotation declaring a change rule on a resource.
///
/// Further rules may be declared with suffixed keys such as
/// `kapply.dev/change-rule.db`. Annotation rules are always mandatory.
pub const CHANGE_RULE_ANNOTATION: &str = "kapply.dev/change-rule";

/// Which changes a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeRuleAction {
    Upsert,
    Delete,
}

impl ChangeRuleAction {
    /// Returns true if a change with this op is subject to the rule.
    pub fn applies_to(&self, op: ChangeOp) -> bool {
        match self {
            ChangeRuleAction::Upsert => op.is_upsert(),
            ChangeRuleAction::Delete => op.is_delete(),
        }
    }
}

/// Direction of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeRuleOrder {
    /// The change waits for the target group.
    After,
    /// The target group waits for the change.
    Before,
}

/// Which changes of the target group are related.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeRuleTargetAction {
    Upserting,
    Deleting,
}

impl ChangeRuleTargetAction {
    /// Returns true if a target change with this op is related by the rule.
    pub fn applies_to(&self, op: ChangeOp) -> bool {
        match self {
            ChangeRuleTargetAction::Upserting => op.is_upsert(),
            ChangeRuleTargetAction::Deleting => op.is_delete(),
        }
    }
}

/// A resolved ordering directive attached to a single change.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChangeRule {
    pub action: ChangeRuleAction,
    pub order: ChangeRuleOrder,
    pub target_action: ChangeRuleTargetAction,
    pub target_group: ChangeGroup,
    /// Soft hint: the resulting edges may be dropped to break a cycle.
    pub ignore_if_cyclical: bool,
}

impl ChangeRule {
    /// Parse a rule string. The result is mandatory; callers flip
    /// `ignore_if_cyclical` for soft rules.
    pub fn from_rule_str(s: &str) -> Result<Self, ChangeRuleError> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        let [action, order, target_action, group] = parts.as_slice() else {
            return Err(ChangeRuleError::WrongFormat { count: parts.len() });
        };

        let action = match *action {
            "upsert" => ChangeRuleAction::Upsert,
            "delete" => ChangeRuleAction::Delete,
            other => return Err(ChangeRuleError::UnknownAction(other.to_string())),
        };

        let order = match *order {
            "after" => ChangeRuleOrder::After,
            "before" => ChangeRuleOrder::Before,
            other => return Err(ChangeRuleError::UnknownOrder(other.to_string())),
        };

        let target_action = match *target_action {
            "upserting" => ChangeRuleTargetAction::Upserting,
            "deleting" => ChangeRuleTargetAction::Deleting,
            other => return Err(ChangeRuleError::UnknownTargetAction(other.to_string())),
        };

        Ok(Self {
            action,
            order,
            target_action,
            target_group: ChangeGroup::new(group)?,
            ignore_if_cyclical: false,
        })
    }

    /// Mark the rule as a soft hint.
    #[must_use]
    pub fn with_ignore_if_cyclical(mut self, ignore: bool) -> Self {
        self.ignore_if_cyclical = ignore;
        self
    }
}

impl FromStr for ChangeRule {
    type Err = ChangeRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_rule_str(s)
    }
}

impl fmt::Display for ChangeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self.action {
            ChangeRuleAction::Upsert => "upsert",
            ChangeRuleAction::Delete => "delete",
        };
        let order = match self.order {
            ChangeRuleOrder::After => "after",
            ChangeRuleOrder::Before => "before",
        };
        let target_action = match self.target_action {
            ChangeRuleTargetAction::Upserting => "upserting",
            ChangeRuleTargetAction::Deleting => "deleting",
        };
        write!(f, "{} {} {} {}", action, order, target_action, self.target_group)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_parse_rule() {
        let rule =
            ChangeRule::from_rule_str("upsert after upserting change-groups.kapply.dev/storage")
                .unwrap();
        assert_eq!(rule.action, ChangeRuleAction::Upsert);
        assert_eq!(rule.order, ChangeRuleOrder::After);
        assert_eq!(rule.target_action, ChangeRuleTargetAction::Upserting);
        assert_eq!(rule.target_group.name(), "change-groups.kapply.dev/storage");
        assert!(!rule.ignore_if_cyclical);
    }

    #[test]
    fn test_parse_tolerates_extra_whitespace() {
        let rule: ChangeRule = "  delete   before deleting  app/db ".parse().unwrap();
        assert_eq!(rule.to_string(), "delete before deleting app/db");
    }

    #[rstest]
    #[case("upsert after upserting", ChangeRuleError::WrongFormat { count: 3 })]
    #[case("upsert after upserting a b", ChangeRuleError::WrongFormat { count: 5 })]
    #[case("create after upserting app/db", ChangeRuleError::UnknownAction("create".into()))]
    #[case("upsert during upserting app/db", ChangeRuleError::UnknownOrder("during".into()))]
    #[case("upsert after creating app/db", ChangeRuleError::UnknownTargetAction("creating".into()))]
    fn test_parse_errors(#[case] input: &str, #[case] expected: ChangeRuleError) {
        assert_eq!(ChangeRule::from_rule_str(input).unwrap_err(), expected);
    }

    #[test]
    fn test_parse_invalid_group() {
        let err = ChangeRule::from_rule_str("upsert after upserting app:db").unwrap_err();
        assert!(matches!(err, ChangeRuleError::InvalidGroupName { .. }));
    }

    #[rstest]
    #[case(ChangeOp::Create, true, false)]
    #[case(ChangeOp::Update, true, false)]
    #[case(ChangeOp::Delete, false, true)]
    #[case(ChangeOp::Noop, false, false)]
    fn test_action_applies_to(#[case] op: ChangeOp, #[case] upsert: bool, #[case] delete: bool) {
        assert_eq!(ChangeRuleAction::Upsert.applies_to(op), upsert);
        assert_eq!(ChangeRuleAction::Delete.applies_to(op), delete);
        assert_eq!(ChangeRuleTargetAction::Upserting.applies_to(op), upsert);
        assert_eq!(ChangeRuleTargetAction::Deleting.applies_to(op), delete);
    }
}
