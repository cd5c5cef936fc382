//! Resource matchers.
//!
//! Matchers select resources for change groups and change rules. They are
//! evaluated repeatedly while a change graph is built, so matching is pure
//! and deterministic.

use serde::{Deserialize, Serialize};

use crate::error::ResourceError;
use crate::resource::Resource;

/// A single resource matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMatcher", into = "RawMatcher")]
pub enum ResourceMatcher {
    /// Matches every resource.
    All,

    /// Matches on `apiVersion` and `kind`; an empty field matches any value.
    ApiVersionKind(ApiVersionKindMatcher),

    /// Matches on kind, namespace and name; an empty field matches any value.
    KindNamespaceName(KindNamespaceNameMatcher),

    /// Matches when any nested matcher matches.
    Any(Vec<ResourceMatcher>),

    /// Matches when the nested matcher does not.
    Not(Box<ResourceMatcher>),
}

impl ResourceMatcher {
    /// Matcher for an exact `apiVersion` and `kind`.
    pub fn api_version_kind(api_version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::ApiVersionKind(ApiVersionKindMatcher {
            api_version: api_version.into(),
            kind: kind.into(),
        })
    }

    /// Matcher for a kind in any API version.
    pub fn kind(kind: impl Into<String>) -> Self {
        Self::api_version_kind("", kind)
    }

    /// Returns true if the resource satisfies this matcher.
    pub fn matches(&self, res: &Resource) -> bool {
        match self {
            ResourceMatcher::All => true,
            ResourceMatcher::ApiVersionKind(m) => m.matches(res),
            ResourceMatcher::KindNamespaceName(m) => m.matches(res),
            ResourceMatcher::Any(matchers) => matchers.iter().any(|m| m.matches(res)),
            ResourceMatcher::Not(m) => !m.matches(res),
        }
    }
}

/// Fields of an `apiVersionKindMatcher`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVersionKindMatcher {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

impl ApiVersionKindMatcher {
    fn matches(&self, res: &Resource) -> bool {
        field_matches(&self.api_version, res.api_version()) && field_matches(&self.kind, res.kind())
    }
}

/// Fields of a `kindNamespaceNameMatcher`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindNamespaceNameMatcher {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl KindNamespaceNameMatcher {
    fn matches(&self, res: &Resource) -> bool {
        field_matches(&self.kind, res.kind())
            && field_matches(&self.namespace, res.namespace())
            && field_matches(&self.name, res.name())
    }
}

fn field_matches(expected: &str, actual: &str) -> bool {
    expected.is_empty() || expected == actual
}

/// An ordered list of matchers; a resource matches when any entry matches.
///
/// An empty list matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceMatchers(Vec<ResourceMatcher>);

impl ResourceMatchers {
    pub fn new(matchers: Vec<ResourceMatcher>) -> Self {
        Self(matchers)
    }

    /// Returns true if any matcher selects the resource.
    pub fn matches(&self, res: &Resource) -> bool {
        self.0.iter().any(|m| m.matches(res))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceMatcher> {
        self.0.iter()
    }

    /// Append the matchers of `other`.
    pub fn extend(&mut self, other: ResourceMatchers) {
        self.0.extend(other.0);
    }
}

impl From<Vec<ResourceMatcher>> for ResourceMatchers {
    fn from(matchers: Vec<ResourceMatcher>) -> Self {
        Self(matchers)
    }
}

impl FromIterator<ResourceMatcher> for ResourceMatchers {
    fn from_iter<I: IntoIterator<Item = ResourceMatcher>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// =============================================================================
// Wire shape
// =============================================================================

/// Single-key map form used in config documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawMatcher {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    all_resource_matcher: Option<EmptyMatcher>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_version_kind_matcher: Option<ApiVersionKindMatcher>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind_namespace_name_matcher: Option<KindNamespaceNameMatcher>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    any_resource_matcher: Option<AnyMatcher>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    not_resource_matcher: Option<NotMatcher>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct EmptyMatcher {}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AnyMatcher {
    #[serde(default)]
    matchers: Vec<ResourceMatcher>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NotMatcher {
    matcher: Box<ResourceMatcher>,
}

impl TryFrom<RawMatcher> for ResourceMatcher {
    type Error = ResourceError;

    fn try_from(raw: RawMatcher) -> Result<Self, Self::Error> {
        let mut found = Vec::new();

        if raw.all_resource_matcher.is_some() {
            found.push(ResourceMatcher::All);
        }
        if let Some(m) = raw.api_version_kind_matcher {
            found.push(ResourceMatcher::ApiVersionKind(m));
        }
        if let Some(m) = raw.kind_namespace_name_matcher {
            found.push(ResourceMatcher::KindNamespaceName(m));
        }
        if let Some(m) = raw.any_resource_matcher {
            found.push(ResourceMatcher::Any(m.matchers));
        }
        if let Some(m) = raw.not_resource_matcher {
            found.push(ResourceMatcher::Not(m.matcher));
        }

        if found.len() != 1 {
            return Err(ResourceError::InvalidMatcher {
                message: format!("expected exactly one matcher kind, found {}", found.len()),
            });
        }
        Ok(found.remove(0))
    }
}

impl From<ResourceMatcher> for RawMatcher {
    fn from(matcher: ResourceMatcher) -> Self {
        let mut raw = RawMatcher::default();
        match matcher {
            ResourceMatcher::All => raw.all_resource_matcher = Some(EmptyMatcher {}),
            ResourceMatcher::ApiVersionKind(m) => raw.api_version_kind_matcher = Some(m),
            ResourceMatcher::KindNamespaceName(m) => raw.kind_namespace_name_matcher = Some(m),
            ResourceMatcher::Any(matchers) => {
                raw.any_resource_matcher = Some(AnyMatcher { matchers });
            }
            ResourceMatcher::Not(matcher) => {
                raw.not_resource_matcher = Some(NotMatcher { matcher });
            }
        }
        raw
    }
}
