//! Pending changes consumed by the graph builder.

use std::fmt;

use kapply_resources::Resource;
use serde::{Deserialize, Serialize};

/// Operation a pending change performs against its resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOp {
    Create,
    Update,
    Delete,
    Noop,
}

impl ChangeOp {
    /// Returns true for operations that create or update the resource.
    pub fn is_upsert(&self) -> bool {
        matches!(self, ChangeOp::Create | ChangeOp::Update)
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, ChangeOp::Delete)
    }
}

impl fmt::Display for ChangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeOp::Create => write!(f, "create"),
            ChangeOp::Update => write!(f, "update"),
            ChangeOp::Delete => write!(f, "delete"),
            ChangeOp::Noop => write!(f, "noop"),
        }
    }
}

/// A change computed by the differ, ready to be ordered.
///
/// Implementations must be immutable: the graph builder may query a change
/// many times and expects identical answers.
pub trait ActualChange {
    fn op(&self) -> ChangeOp;

    fn resource(&self) -> &Resource;

    /// Human readable description, used in graph output and cycle errors.
    fn description(&self) -> String {
        self.resource().description()
    }
}

/// Plain change record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingChange {
    pub op: ChangeOp,
    pub resource: Resource,
}

impl PendingChange {
    pub fn new(op: ChangeOp, resource: Resource) -> Self {
        Self { op, resource }
    }
}

impl ActualChange for PendingChange {
    fn op(&self) -> ChangeOp {
        self.op
    }

    fn resource(&self) -> &Resource {
        &self.resource
    }
}

impl<T: ActualChange + ?Sized> ActualChange for Box<T> {
    fn op(&self) -> ChangeOp {
        (**self).op()
    }

    fn resource(&self) -> &Resource {
        (**self).resource()
    }

    fn description(&self) -> String {
        (**self).description()
    }
}
