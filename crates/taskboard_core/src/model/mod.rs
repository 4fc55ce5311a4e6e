//! Domain model for projects, tasks and the session registry.
//!
//! # Responsibility
//! - Define the in-memory object graph mutated by UI collaborators.
//! - Keep ownership strict: registry owns projects, projects own tasks.
//!
//! # Invariants
//! - Every task and project carries a stable `EntityId`.
//! - Moves transfer ownership of the same task value; nothing is copied.

pub mod id;
pub mod project;
pub mod registry;
pub mod task;
