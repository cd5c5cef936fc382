//! Cluster resource identity.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ResourceError;

/// A cluster resource targeted by a change.
///
/// Only identity and metadata are kept; the body of the object is the
/// concern of the differ and the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawResource", into = "RawResource")]
pub struct Resource {
    api_version: String,
    kind: String,
    namespace: Option<String>,
    name: String,
    annotations: BTreeMap<String, String>,
    labels: BTreeMap<String, String>,
}

impl Resource {
    /// Create a resource from its identity.
    ///
    /// An empty namespace means the resource is cluster scoped.
    pub fn new(
        api_version: impl Into<String>,
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let namespace = namespace.into();
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
            namespace: (!namespace.is_empty()).then_some(namespace),
            name: name.into(),
            annotations: BTreeMap::new(),
            labels: BTreeMap::new(),
        }
    }

    /// Add an annotation.
    #[must_use]
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Add a label.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Parse a single resource from a YAML (or JSON) document.
    ///
    /// Syntax errors are reported as [`ResourceError::Parse`], empty
    /// identity fields as [`ResourceError::MissingField`].
    pub fn from_yaml_str(contents: &str) -> Result<Self, ResourceError> {
        let raw: RawResource = serde_yaml::from_str(contents)?;
        Self::try_from(raw)
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// The API group, i.e. the part of `apiVersion` before the slash.
    ///
    /// Resources in the core group (`v1`) return an empty string.
    pub fn api_group(&self) -> &str {
        match self.api_version.split_once('/') {
            Some((group, _)) => group,
            None => "",
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Namespace, or an empty string for cluster scoped resources.
    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or("")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_cluster_scoped(&self) -> bool {
        self.namespace.is_none()
    }

    pub fn annotations(&self) -> &BTreeMap<String, String> {
        &self.annotations
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    /// Human readable description used in graph output and errors.
    ///
    /// Format: `deployment/app (apps/v1) namespace: default` or
    /// `storageclass/fast (storage.k8s.io/v1) cluster`.
    pub fn description(&self) -> String {
        let mut result = format!(
            "{}/{} ({})",
            self.kind.to_lowercase(),
            self.name,
            self.api_version
        );
        match &self.namespace {
            Some(ns) => {
                result.push_str(" namespace: ");
                result.push_str(ns);
            }
            None => result.push_str(" cluster"),
        }
        result
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

// =============================================================================
// Wire shape
// =============================================================================

/// Kubernetes object shape used for (de)serialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResource {
    #[serde(default)]
    api_version: String,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    metadata: RawMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    annotations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    labels: BTreeMap<String, String>,
}

impl TryFrom<RawResource> for Resource {
    type Error = ResourceError;

    fn try_from(raw: RawResource) -> Result<Self, Self::Error> {
        if raw.api_version.is_empty() {
            return Err(ResourceError::MissingField("apiVersion"));
        }
        if raw.kind.is_empty() {
            return Err(ResourceError::MissingField("kind"));
        }
        if raw.metadata.name.is_empty() {
            return Err(ResourceError::MissingField("metadata.name"));
        }

        Ok(Self {
            api_version: raw.api_version,
            kind: raw.kind,
            namespace: raw.metadata.namespace.filter(|ns| !ns.is_empty()),
            name: raw.metadata.name,
            annotations: raw.metadata.annotations,
            labels: raw.metadata.labels,
        })
    }
}

impl From<Resource> for RawResource {
    fn from(res: Resource) -> Self {
        Self {
            api_version: res.api_version,
            kind: res.kind,
            metadata: RawMetadata {
                name: res.name,
                namespace: res.namespace,
                annotations: res.annotations,
                labels: res.labels,
            },
        }
    }
}
