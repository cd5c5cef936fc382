//! Error types for resource parsing and matcher validation.

use thiserror::Error;

/// Errors that can occur when reading resources or matchers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// A required resource field is missing or empty.
    #[error("resource is missing required field '{0}'")]
    MissingField(&'static str),

    /// The resource document could not be parsed.
    #[error("invalid resource document: {0}")]
    Parse(String),

    /// A matcher entry declares zero or several matcher kinds.
    #[error("invalid resource matcher: {message}")]
    InvalidMatcher { message: String },
}

impl ResourceError {
    /// Returns true if this error indicates a missing field.
    pub fn is_missing_field(&self) -> bool {
        matches!(self, ResourceError::MissingField(_))
    }
}

impl From<serde_yaml::Error> for ResourceError {
    fn from(err: serde_yaml::Error) -> Self {
        ResourceError::Parse(err.to_string())
    }
}
