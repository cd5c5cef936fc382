//! # kapply-diffgraph
//!
//! Orders pending changes by turning declarative change rules into a graph
//! of "waits for" edges.
//!
//! ## Overview
//!
//! Every change belongs to zero or more change groups, declared either by
//! config ([`kapply_config::AdditionalChangeGroup`]) or by the
//! `kapply.dev/change-group` annotation. Change rules relate a change to the
//! members of a group:
//!
//! ```text
//! upsert after upserting change-groups.kapply.dev/storage
//! delete before deleting app/db
//! ```
//!
//! Rules declared with `ignoreIfCyclical: true` produce optional edges. All
//! other rules, including every annotation rule, produce mandatory edges.
//!
//! ## Cycles
//!
//! [`ChangeGraph::new`] always returns an acyclic graph. Optional edges that
//! close a cycle are pruned; a cycle made of mandatory edges fails with
//! [`DiffGraphError::Cycle`], naming every change on the path:
//!
//! ```text
//! Detected cycle while ordering changes: [pod/a (v1) cluster] -> [secret/b (v1) cluster] -> [pod/a (v1) cluster] (found repeated: pod/a (v1) cluster)
//! ```
//!
//! ## Example
//!
//! ```
//! use kapply_config::Conf;
//! use kapply_diffgraph::{ChangeGraph, ChangeOp, PendingChange};
//! use kapply_resources::Resource;
//!
//! let changes = vec![
//!     PendingChange::new(ChangeOp::Create, Resource::new("v1", "Pod", "default", "web")),
//!     PendingChange::new(
//!         ChangeOp::Create,
//!         Resource::new("v1", "PersistentVolumeClaim", "default", "data"),
//!     ),
//! ];
//!
//! let graph = ChangeGraph::from_conf(changes, &Conf::defaults().unwrap()).unwrap();
//! let pod = graph.all()[0];
//! assert_eq!(pod.waiting_for().count(), 1);
//! ```

mod actual_change;
mod change;
mod change_group;
mod change_rule;
mod cycles;
mod error;
mod graph;
mod print;

pub use actual_change::{ActualChange, ChangeOp, PendingChange};
pub use change::{Change, ChangeId};
pub use change_group::{ChangeGroup, CHANGE_GROUP_ANNOTATION};
pub use change_rule::{
    ChangeRule, ChangeRuleAction, ChangeRuleOrder, ChangeRuleTargetAction, CHANGE_RULE_ANNOTATION,
};
pub use error::{ChangeRuleError, DiffGraphError};
pub use graph::ChangeGraph;
pub use print::ChangeSummary;
