//! Core domain logic for Taskboard.
//! Projects, tasks, the session registry and its snapshot persistence.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;
pub mod snapshot;

pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::id::{EntityId, ProjectId, TaskId};
pub use model::project::Project;
pub use model::registry::{Registry, RegistryError};
pub use model::task::{
    parse_due_date, DueDate, FieldValue, Priority, Task, TaskEdit, TaskError, TaskField,
};
pub use repo::slot_repo::{MemorySlotStore, SlotStore, SqliteSlotStore, StoreError, StoreResult};
pub use seed::{load_or_seed, seed_sample_projects};
pub use service::board_session::{
    BoardSession, NewTaskRequest, SessionContext, SessionError, SessionResult,
};
pub use snapshot::{
    decode, encode, load, save, SnapshotCodec, SnapshotError, SnapshotResult,
    SNAPSHOT_FORMAT_VERSION, SNAPSHOT_SLOT_KEY,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
