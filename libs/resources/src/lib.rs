//! # kapply-resources
//!
//! Resource identity and resource matching for kapply.
//!
//! ## Design Principles
//!
//! - A resource is identified by `apiVersion`, `kind`, namespace and name
//! - Descriptions are stable and human readable; they appear in graph output
//!   and in cycle errors, so operators can grep for them
//! - Matchers are plain configuration data; matching is a pure predicate
//!
//! ## Matchers
//!
//! Matchers are declared in config documents using a single-key map:
//!
//! ```yaml
//! resourceMatchers:
//! - allResourceMatcher: {}
//! - apiVersionKindMatcher: {apiVersion: apps/v1, kind: Deployment}
//! - kindNamespaceNameMatcher: {kind: Secret, namespace: default, name: creds}
//! - anyResourceMatcher:
//!     matchers:
//!     - apiVersionKindMatcher: {kind: Job}
//! - notResourceMatcher:
//!     matcher:
//!       apiVersionKindMatcher: {kind: Namespace}
//! ```

mod error;
mod matcher;
mod resource;

pub use error::ResourceError;
pub use matcher::*;
pub use resource::Resource;
