//! Registry snapshot codec.
//!
//! # Responsibility
//! - Serialize a whole registry into one JSON document in a named slot.
//! - Rebuild a fully typed registry (projects, tasks, ids) from that slot.
//!
//! # Invariants
//! - The codec only uses the public registry/project/task surface.
//! - `save` fully overwrites the slot; there is no partial write.
//! - Unparsable or structurally invalid documents surface as
//!   `SnapshotError::Malformed`, never as a panic.
//! - An absent slot loads as an empty registry.

mod wire;

pub use wire::SNAPSHOT_FORMAT_VERSION;

use crate::model::id::EntityId;
use crate::model::registry::{Registry, RegistryError};
use crate::model::task::{DueDate, Task};
use crate::repo::slot_repo::{SlotStore, StoreError};
use log::{error, info};
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use wire::{ProjectRecord, SnapshotDocument, TaskRecord};

/// Fixed slot holding the application snapshot.
pub const SNAPSHOT_SLOT_KEY: &str = "appData";

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Snapshot save/load errors.
#[derive(Debug)]
pub enum SnapshotError {
    /// Stored text is not a valid snapshot document.
    Malformed(String),
    /// Document was written by a newer format version.
    UnsupportedVersion { found: u32, supported: u32 },
    /// Registry could not be rendered as JSON.
    Encode(String),
    /// Underlying slot storage failed.
    Store(StoreError),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(message) => write!(f, "malformed snapshot: {message}"),
            Self::UnsupportedVersion { found, supported } => write!(
                f,
                "snapshot version {found} is newer than supported {supported}"
            ),
            Self::Encode(message) => write!(f, "snapshot encoding failed: {message}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for SnapshotError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl SnapshotError {
    /// Stable short code for log lines and UI envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "snapshot_malformed",
            Self::UnsupportedVersion { .. } => "snapshot_unsupported_version",
            Self::Encode(_) => "snapshot_encode_failed",
            Self::Store(_) => "snapshot_store_failed",
        }
    }
}

/// Renders a registry as snapshot JSON text.
pub fn encode(registry: &Registry) -> SnapshotResult<String> {
    let document = SnapshotDocument {
        version: SNAPSHOT_FORMAT_VERSION,
        projects: registry
            .projects()
            .iter()
            .map(|project| ProjectRecord {
                id: project.id().to_string(),
                name: project.name.clone(),
                todos: project.todos().iter().map(task_record).collect(),
            })
            .collect(),
    };
    serde_json::to_string(&document).map_err(|err| SnapshotError::Encode(err.to_string()))
}

/// Rebuilds a registry from snapshot JSON text.
///
/// # Errors
/// - `Malformed` when the text is not JSON, misses required fields, or
///   repeats a project id.
/// - `UnsupportedVersion` when the document is newer than this build.
///
/// A `null` or missing `dueDate` loads as the Unix epoch.
pub fn decode(text: &str) -> SnapshotResult<Registry> {
    let document: SnapshotDocument =
        serde_json::from_str(text).map_err(|err| SnapshotError::Malformed(err.to_string()))?;
    if document.version > SNAPSHOT_FORMAT_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            found: document.version,
            supported: SNAPSHOT_FORMAT_VERSION,
        });
    }

    let mut registry = Registry::new();
    for record in document.projects {
        let project = registry
            .add_project_with_id(EntityId::new(record.id), record.name)
            .map_err(|RegistryError::DuplicateProjectId(id)| {
                SnapshotError::Malformed(format!("duplicate project id `{id}`"))
            })?;
        for task in record.todos {
            let due_date = match task.due_date {
                Some(text) => DueDate::Text(text),
                None => DueDate::At(DateTime::<Utc>::default()),
            };
            project.add_todo(
                Task::with_id(
                    EntityId::new(task.id),
                    task.title,
                    task.description,
                    task.priority,
                    due_date,
                )
                .completed(task.is_completed),
            );
        }
    }
    Ok(registry)
}

fn task_record(task: &Task) -> TaskRecord {
    TaskRecord {
        id: task.id().to_string(),
        title: task.title.clone(),
        description: task.description.clone(),
        priority: task.priority.clone(),
        due_date: Some(task.due_date.to_iso_string()),
        is_completed: task.is_completed,
    }
}

/// Saves and loads registry snapshots through a slot store.
pub struct SnapshotCodec<S: SlotStore> {
    store: S,
    slot_key: String,
}

impl<S: SlotStore> SnapshotCodec<S> {
    /// Creates a codec bound to the default `appData` slot.
    pub fn new(store: S) -> Self {
        Self::with_slot_key(store, SNAPSHOT_SLOT_KEY)
    }

    pub fn with_slot_key(store: S, slot_key: impl Into<String>) -> Self {
        Self {
            store,
            slot_key: slot_key.into(),
        }
    }

    pub fn slot_key(&self) -> &str {
        &self.slot_key
    }

    /// Overwrites the slot with the full registry.
    pub fn save(&self, registry: &Registry) -> SnapshotResult<()> {
        let started_at = Instant::now();
        let text = encode(registry)?;
        if let Err(err) = self.store.write_slot(&self.slot_key, &text) {
            error!(
                "event=snapshot_save module=snapshot status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
        info!(
            "event=snapshot_save module=snapshot status=ok projects={} tasks={} bytes={} duration_ms={}",
            registry.len(),
            registry.task_count(),
            text.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Reads the slot and rebuilds the registry.
    ///
    /// An absent slot yields an empty registry.
    pub fn load(&self) -> SnapshotResult<Registry> {
        let started_at = Instant::now();
        let Some(text) = self.store.read_slot(&self.slot_key)? else {
            info!("event=snapshot_load module=snapshot status=ok source=empty");
            return Ok(Registry::new());
        };

        match decode(&text) {
            Ok(registry) => {
                info!(
                    "event=snapshot_load module=snapshot status=ok source=slot projects={} tasks={} duration_ms={}",
                    registry.len(),
                    registry.task_count(),
                    started_at.elapsed().as_millis()
                );
                Ok(registry)
            }
            Err(err) => {
                error!(
                    "event=snapshot_load module=snapshot status=error error_code={} duration_ms={}",
                    err.code(),
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    /// Deletes the stored snapshot.
    pub fn clear(&self) -> SnapshotResult<()> {
        self.store.clear_slot(&self.slot_key)?;
        Ok(())
    }
}

/// Saves `registry` into the default slot of `store`.
pub fn save(registry: &Registry, store: &impl SlotStore) -> SnapshotResult<()> {
    SnapshotCodec::new(store).save(registry)
}

/// Loads the registry from the default slot of `store`.
pub fn load(store: &impl SlotStore) -> SnapshotResult<Registry> {
    SnapshotCodec::new(store).load()
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, SnapshotError, SNAPSHOT_FORMAT_VERSION};
    use crate::model::registry::Registry;
    use crate::model::task::{DueDate, Priority, Task};

    #[test]
    fn encode_writes_versioned_document() {
        let mut registry = Registry::new();
        registry.add_project_with_id("p1", "Work").unwrap();

        let json: serde_json::Value = serde_json::from_str(&encode(&registry).unwrap()).unwrap();
        assert_eq!(json["version"], SNAPSHOT_FORMAT_VERSION);
        assert_eq!(json["projects"][0]["id"], "p1");
        assert_eq!(json["projects"][0]["todos"], serde_json::json!([]));
    }

    #[test]
    fn decode_accepts_unversioned_legacy_document() {
        let registry = decode(
            r#"{"projects":[{"id":"1717","name":"Den Life","todos":[
                {"id":"t1","title":"Sharpen claws","description":"tree",
                 "priority":3,"dueDate":"2025-01-02T00:00:00.000Z"}]}]}"#,
        )
        .unwrap();

        let task = &registry.projects()[0].todos()[0];
        assert_eq!(task.priority, Priority::Rank(3));
        assert!(!task.is_completed);
        assert!(matches!(task.due_date, DueDate::At(_)));
    }

    #[test]
    fn decode_reads_null_due_date_as_epoch() {
        let registry = decode(
            r#"{"projects":[{"id":"p1","name":"Work","todos":[
                {"id":"t1","title":"a","description":"","priority":"low","dueDate":null},
                {"id":"t2","title":"b","description":"","priority":"low",
                 "dueDate":"2025-01-02T00:00:00.000Z"}]}]}"#,
        )
        .unwrap();

        let todos = registry.projects()[0].todos();
        assert_eq!(todos.len(), 2);
        assert_eq!(todos[0].due_date.to_iso_string(), "1970-01-01T00:00:00.000Z");
        assert_eq!(todos[1].due_date.to_iso_string(), "2025-01-02T00:00:00.000Z");

        let json: serde_json::Value = serde_json::from_str(&encode(&registry).unwrap()).unwrap();
        assert_eq!(
            json["projects"][0]["todos"][0]["dueDate"],
            "1970-01-01T00:00:00.000Z"
        );
    }

    #[test]
    fn decode_rejects_missing_fields() {
        let err = decode(r#"{"projects":[{"id":"p1","todos":[]}]}"#).unwrap_err();
        assert!(matches!(err, SnapshotError::Malformed(_)), "{err}");
    }

    #[test]
    fn decode_rejects_duplicate_project_ids() {
        let err = decode(
            r#"{"projects":[{"id":"p","name":"a","todos":[]},{"id":"p","name":"b","todos":[]}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate project id"));
    }

    #[test]
    fn decode_rejects_newer_versions() {
        let err = decode(r#"{"version":2,"projects":[]}"#).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::UnsupportedVersion {
                found: 2,
                supported: 1
            }
        ));
    }

    #[test]
    fn textual_due_date_set_by_edit_survives_and_is_coerced_on_load() {
        let mut registry = Registry::new();
        let project = registry.add_project("Work");
        let mut task = Task::new("a", "", "low", "2025-01-01");
        task.edit("dueDate", "2026-03-04").unwrap();
        assert_eq!(task.due_date, DueDate::Text("2026-03-04".to_string()));
        project.add_todo(task);

        let reloaded = decode(&encode(&registry).unwrap()).unwrap();
        let due = &reloaded.projects()[0].todos()[0].due_date;
        assert_eq!(due.to_iso_string(), "2026-03-04T00:00:00.000Z");
    }
}
