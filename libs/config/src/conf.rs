//! Resolved configuration.

use std::path::Path;

use crate::defaults::default_config_yaml;
use crate::document::{AdditionalChangeGroup, AdditionalChangeRule, ConfigDocument};
use crate::error::ConfigError;

/// Merged view over one or more config documents.
///
/// Precedence: documents are applied in order, defaults first. Change rules
/// are concatenated. A change group whose name was already declared extends
/// the earlier group's matchers instead of adding a second group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conf {
    groups: Vec<AdditionalChangeGroup>,
    rules: Vec<AdditionalChangeRule>,
}

impl Conf {
    /// Merge documents in order.
    pub fn from_documents(docs: impl IntoIterator<Item = ConfigDocument>) -> Self {
        let mut conf = Self::default();
        for doc in docs {
            conf.merge(doc);
        }
        conf
    }

    /// The embedded defaults only.
    pub fn defaults() -> Result<Self, ConfigError> {
        Ok(Self::from_documents(ConfigDocument::from_yaml_str(
            default_config_yaml(),
        )?))
    }

    /// The embedded defaults followed by the given user documents.
    pub fn with_defaults(
        user_docs: impl IntoIterator<Item = ConfigDocument>,
    ) -> Result<Self, ConfigError> {
        let mut conf = Self::defaults()?;
        for doc in user_docs {
            conf.merge(doc);
        }
        Ok(conf)
    }

    /// Load config files on top of the embedded defaults.
    pub fn load_with_defaults<P: AsRef<Path>>(paths: &[P]) -> Result<Self, ConfigError> {
        Self::load(paths, true)
    }

    /// Load config files, optionally on top of the embedded defaults.
    pub fn load<P: AsRef<Path>>(paths: &[P], include_defaults: bool) -> Result<Self, ConfigError> {
        let mut conf = if include_defaults {
            Self::defaults()?
        } else {
            Self::default()
        };

        for path in paths {
            let path = path.as_ref();
            let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let docs =
                ConfigDocument::from_yaml_str(&contents).map_err(|err| ConfigError::File {
                    path: path.to_path_buf(),
                    source: Box::new(err),
                })?;

            tracing::debug!(path = %path.display(), documents = docs.len(), "loaded config file");
            for doc in docs {
                conf.merge(doc);
            }
        }

        Ok(conf)
    }

    /// Apply a single document on top of this config.
    pub fn merge(&mut self, doc: ConfigDocument) {
        tracing::debug!(
            groups = doc.additional_change_groups.len(),
            rules = doc.additional_change_rules.len(),
            "merging config document"
        );

        for group in doc.additional_change_groups {
            match self.groups.iter_mut().find(|g| g.name == group.name) {
                Some(existing) => existing.resource_matchers.extend(group.resource_matchers),
                None => self.groups.push(group),
            }
        }
        self.rules.extend(doc.additional_change_rules);
    }

    pub fn additional_change_groups(&self) -> &[AdditionalChangeGroup] {
        &self.groups
    }

    pub fn additional_change_rules(&self) -> &[AdditionalChangeRule] {
        &self.rules
    }
}
