//! Entity identity for tasks and projects.
//!
//! # Responsibility
//! - Generate collision-resistant string ids for newly created entities.
//! - Carry caller-supplied ids verbatim through rehydration.
//!
//! # Invariants
//! - An `EntityId` is never empty.
//! - Ids are compared by exact text; no normalization is applied.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable string identifier shared by tasks and projects.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct EntityId(String);

/// Identifier of a task.
pub type TaskId = EntityId;
/// Identifier of a project.
pub type ProjectId = EntityId;

impl EntityId {
    /// Generates a fresh id from a random v4 UUID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps a caller-provided id.
    ///
    /// Blank input falls back to a generated id, so the non-empty invariant
    /// holds for every constructed value.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            return Self::generate();
        }
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<EntityId> for String {
    fn from(value: EntityId) -> Self {
        value.0
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
