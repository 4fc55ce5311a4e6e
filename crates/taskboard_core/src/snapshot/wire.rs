//! Snapshot wire schema.
//!
//! Field names follow the stored document (`dueDate`, `isCompleted`), so
//! snapshots written by earlier builds stay readable.

use crate::model::task::Priority;
use serde::{Deserialize, Serialize};

/// Current snapshot document version.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Documents without a `version` field predate versioning and match v1.
fn legacy_version() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct SnapshotDocument {
    #[serde(default = "legacy_version")]
    pub version: u32,
    pub projects: Vec<ProjectRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ProjectRecord {
    pub id: String,
    pub name: String,
    pub todos: Vec<TaskRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TaskRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    /// Browser builds wrote an invalid date as `null`.
    pub due_date: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
}
