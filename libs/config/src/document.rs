//! Config document model.

use kapply_resources::ResourceMatchers;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// apiVersion accepted for config documents.
pub const CONFIG_API_VERSION: &str = "kapply.dev/v1alpha1";

/// kind identifying config documents in a YAML stream.
pub const CONFIG_KIND: &str = "Config";

/// A named logical group of resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalChangeGroup {
    pub name: String,
    #[serde(default)]
    pub resource_matchers: ResourceMatchers,
}

/// Ordering directives applied to every resource selected by the matchers.
///
/// Each entry of `rules` is a rule string such as
/// `upsert after upserting change-groups.kapply.dev/storage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalChangeRule {
    pub rules: Vec<String>,
    /// Marks the rules as soft hints that may be dropped to break a cycle.
    #[serde(default)]
    pub ignore_if_cyclical: bool,
    #[serde(default)]
    pub resource_matchers: ResourceMatchers,
}

/// A single `kind: Config` document.
///
/// Keys for other rule kinds (rebase, diff mask, ownership labels, ...) are
/// accepted and ignored; they belong to other subsystems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub additional_change_groups: Vec<AdditionalChangeGroup>,
    #[serde(default)]
    pub additional_change_rules: Vec<AdditionalChangeRule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentHeader {
    #[serde(default)]
    kind: String,
}

impl ConfigDocument {
    /// Parse every `kind: Config` document out of a multi-document YAML stream.
    ///
    /// Documents of other kinds (for example the application resources that
    /// share a file with the config) are skipped.
    pub fn from_yaml_str(contents: &str) -> Result<Vec<Self>, ConfigError> {
        let mut docs = Vec::new();
        if contents.trim().is_empty() {
            return Ok(docs);
        }

        for de in serde_yaml::Deserializer::from_str(contents) {
            let value = serde_yaml::Value::deserialize(de)?;
            if value.is_null() {
                continue;
            }

            let header: DocumentHeader = serde_yaml::from_value(value.clone())?;
            if header.kind != CONFIG_KIND {
                tracing::trace!(kind = %header.kind, "skipping non-config document");
                continue;
            }

            let doc: ConfigDocument = serde_yaml::from_value(value)?;
            doc.validate()?;
            docs.push(doc);
        }

        Ok(docs)
    }

    /// Check the document for structural problems.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_version != CONFIG_API_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                expected: CONFIG_API_VERSION,
                actual: self.api_version.clone(),
            });
        }

        for (index, group) in self.additional_change_groups.iter().enumerate() {
            if group.name.trim().is_empty() {
                return Err(ConfigError::EmptyGroupName { index });
            }
        }

        for (index, rule) in self.additional_change_rules.iter().enumerate() {
            if rule.rules.is_empty() {
                return Err(ConfigError::EmptyRules { index });
            }
        }

        Ok(())
    }
}
