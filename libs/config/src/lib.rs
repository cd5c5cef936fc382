//! # kapply-config
//!
//! Declarative configuration consumed by the change graph builder.
//!
//! A config document names change groups (sets of resources selected by
//! matchers) and change rules (ordering directives between groups):
//!
//! ```yaml
//! apiVersion: kapply.dev/v1alpha1
//! kind: Config
//!
//! additionalChangeGroups:
//! - name: change-groups.kapply.dev/storage
//!   resourceMatchers:
//!   - apiVersionKindMatcher: {apiVersion: v1, kind: PersistentVolumeClaim}
//!
//! additionalChangeRules:
//! - rules:
//!   - "upsert after upserting change-groups.kapply.dev/storage"
//!   ignoreIfCyclical: true
//!   resourceMatchers:
//!   - apiVersionKindMatcher: {apiVersion: v1, kind: Pod}
//! ```
//!
//! The embedded default configuration is always merged first; user supplied
//! documents are appended after it.

mod conf;
mod defaults;
mod document;
mod error;

pub use conf::Conf;
pub use defaults::{default_config_yaml, DEFAULT_CONFIG_VERSION};
pub use document::{
    AdditionalChangeGroup, AdditionalChangeRule, ConfigDocument, CONFIG_API_VERSION, CONFIG_KIND,
};
pub use error::ConfigError;
