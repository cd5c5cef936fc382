//! Change groups.
//!
//! A change belongs to every group whose config matchers select its
//! resource, plus every group named in its change-group annotations.

use std::fmt;

use kapply_config::AdditionalChangeGroup;
use kapply_resources::Resource;

use crate::error::ChangeRuleError;

/// Annotation declaring change group membership.
///
/// Further groups may be declared with suffixed keys such as
/// `kapply.dev/change-group.db`.
pub const CHANGE_GROUP_ANNOTATION: &str = "kapply.dev/change-group";

const MAX_GROUP_NAME_LEN: usize = 316;

/// Name of a logical group of changes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChangeGroup(String);

impl ChangeGroup {
    /// Parse and validate a group name.
    pub fn new(name: &str) -> Result<Self, ChangeRuleError> {
        let invalid = |reason: &'static str| ChangeRuleError::InvalidGroupName {
            name: name.to_string(),
            reason,
        };

        if name.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if name.len() > MAX_GROUP_NAME_LEN {
            return Err(invalid("is too long"));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'))
        {
            return Err(invalid(
                "may only contain alphanumerics and '-', '_', '.', '/'",
            ));
        }

        Ok(Self(name.to_string()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChangeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns true for `prefix` itself and for `prefix.<suffix>` keys.
pub(crate) fn is_annotation_key(key: &str, prefix: &str) -> bool {
    match key.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with('.') && rest.len() > 1,
        None => false,
    }
}

/// Resolve every group the resource belongs to.
///
/// Annotation groups come first (in key order), followed by config groups in
/// config order. Duplicates are dropped.
pub(crate) fn groups_for_resource(
    res: &Resource,
    additional_groups: &[AdditionalChangeGroup],
) -> Result<Vec<ChangeGroup>, ChangeRuleError> {
    let mut groups: Vec<ChangeGroup> = Vec::new();

    for (key, value) in res.annotations() {
        if is_annotation_key(key, CHANGE_GROUP_ANNOTATION) {
            let group = ChangeGroup::new(value.trim())?;
            if !groups.contains(&group) {
                groups.push(group);
            }
        }
    }

    for additional in additional_groups {
        if additional.resource_matchers.matches(res) {
            let group = ChangeGroup::new(&additional.name)?;
            if !groups.contains(&group) {
                groups.push(group);
            }
        }
    }

    Ok(groups)
}
