//! Storage contracts and implementations.
//!
//! # Responsibility
//! - Define the named-slot storage contract used by the snapshot codec.
//! - Isolate SQLite details from domain and codec code.

pub mod slot_repo;
