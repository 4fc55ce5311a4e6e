//! UI session service over one registry.
//!
//! # Responsibility
//! - Hold the registry, the UI selection (`SessionContext`) and the snapshot
//!   codec for one running session.
//! - Expose command-level operations that mutate the registry and then save.
//!
//! # Invariants
//! - Selection lives in `SessionContext`, never in process-wide state.
//! - Every successful mutating command is followed by a full snapshot save.
//! - Removing the active project clears the whole selection; removing or
//!   moving away the active task clears the active task.
//! - When a save fails the in-memory change is kept and the error returned.
//! - A session opened over an unreadable snapshot never writes the slot until
//!   the caller calls `acknowledge_recovery`.

use crate::model::id::{ProjectId, TaskId};
use crate::model::project::Project;
use crate::model::registry::Registry;
use crate::model::task::{FieldValue, Task, TaskError};
use crate::repo::slot_repo::SlotStore;
use crate::seed::{load_or_seed, seed_sample_projects};
use crate::snapshot::{SnapshotCodec, SnapshotError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// UI selection state for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub active_project_id: Option<ProjectId>,
    pub active_task_id: Option<TaskId>,
}

impl SessionContext {
    /// Selects a project and drops any task selection.
    pub fn select_project(&mut self, id: ProjectId) {
        self.active_project_id = Some(id);
        self.active_task_id = None;
    }

    pub fn select_task(&mut self, project_id: ProjectId, task_id: TaskId) {
        self.active_project_id = Some(project_id);
        self.active_task_id = Some(task_id);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Input for creating a task from a UI form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskRequest {
    pub title: String,
    pub description: String,
    pub priority: String,
    /// Due date text; coerced to a date when it parses.
    pub due_date: String,
}

/// Errors from session commands.
#[derive(Debug)]
pub enum SessionError {
    ProjectNotFound(ProjectId),
    TaskNotFound(TaskId),
    /// Command needs a selected project but none is active.
    NoActiveProject,
    InvalidField(TaskError),
    Snapshot(SnapshotError),
    /// Saving would overwrite a stored snapshot that failed to load.
    RecoveryPending,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::NoActiveProject => write!(f, "no active project selected"),
            Self::InvalidField(err) => write!(f, "{err}"),
            Self::Snapshot(err) => write!(f, "{err}"),
            Self::RecoveryPending => write!(
                f,
                "stored board could not be loaded; refusing to overwrite it before recovery is acknowledged"
            ),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidField(err) => Some(err),
            Self::Snapshot(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskError> for SessionError {
    fn from(value: TaskError) -> Self {
        Self::InvalidField(value)
    }
}

impl From<SnapshotError> for SessionError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value)
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// One running board: registry + selection + persistence.
pub struct BoardSession<S: SlotStore> {
    codec: SnapshotCodec<S>,
    registry: Registry,
    context: SessionContext,
    recovered_from: Option<SnapshotError>,
}

impl<S: SlotStore> BoardSession<S> {
    /// Starts a session from the stored snapshot.
    ///
    /// # Errors
    /// - `SessionError::Snapshot` when the stored snapshot cannot be loaded.
    pub fn open(codec: SnapshotCodec<S>) -> SessionResult<Self> {
        let registry = codec.load()?;
        Ok(Self::with_registry(codec, registry))
    }

    /// Starts a session, seeding sample projects when nothing is stored.
    ///
    /// Load errors are returned as is; nothing is seeded over them.
    pub fn open_seeded(codec: SnapshotCodec<S>) -> SessionResult<Self> {
        let registry = load_or_seed(&codec)?;
        Ok(Self::with_registry(codec, registry))
    }

    /// Starts a session even when the stored snapshot is unreadable.
    ///
    /// On a load error the session starts empty and keeps the error in
    /// `recovered_from`; saves are refused until `acknowledge_recovery`.
    pub fn open_recovering(codec: SnapshotCodec<S>) -> Self {
        match codec.load() {
            Ok(registry) => Self::with_registry(codec, registry),
            Err(err) => {
                warn!(
                    "event=session_recover module=session status=fallback error_code={} error={}",
                    err.code(),
                    err
                );
                let mut session = Self::with_registry(codec, Registry::new());
                session.recovered_from = Some(err);
                session
            }
        }
    }

    pub fn with_registry(codec: SnapshotCodec<S>, registry: Registry) -> Self {
        let mut context = SessionContext::default();
        if let Some(first) = registry.projects().first() {
            context.select_project(first.id().clone());
        }
        Self {
            codec,
            registry,
            context,
            recovered_from: None,
        }
    }

    /// Load error this session started from, until acknowledged.
    pub fn recovered_from(&self) -> Option<&SnapshotError> {
        self.recovered_from.as_ref()
    }

    /// Accepts that the unreadable stored snapshot will be overwritten by the
    /// next save. Returns the load error that was pending, if any.
    pub fn acknowledge_recovery(&mut self) -> Option<SnapshotError> {
        let pending = self.recovered_from.take();
        if let Some(err) = pending.as_ref() {
            info!(
                "event=session_recover_ack module=session status=ok error_code={}",
                err.code()
            );
        }
        pending
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Currently selected project, if it still exists.
    pub fn active_project(&self) -> Option<&Project> {
        self.context
            .active_project_id
            .as_ref()
            .and_then(|id| self.registry.find_project(id))
    }

    /// Currently selected task, if it still exists.
    pub fn active_task(&self) -> Option<&Task> {
        let task_id = self.context.active_task_id.as_ref()?;
        self.active_project()?.find_todo(task_id)
    }

    pub fn select_project(&mut self, id: &ProjectId) -> SessionResult<&Project> {
        if self.registry.find_project(id).is_none() {
            return Err(SessionError::ProjectNotFound(id.clone()));
        }
        self.context.select_project(id.clone());
        self.registry
            .find_project(id)
            .ok_or_else(|| SessionError::ProjectNotFound(id.clone()))
    }

    /// Selects a task and its owning project.
    pub fn select_task(&mut self, task_id: &TaskId) -> SessionResult<&Task> {
        let owner_id = self.owner_id(task_id)?;
        self.context.select_task(owner_id.clone(), task_id.clone());
        self.registry
            .find_project(&owner_id)
            .and_then(|project| project.find_todo(task_id))
            .ok_or_else(|| SessionError::TaskNotFound(task_id.clone()))
    }

    /// Adds a project, selects it and saves.
    pub fn create_project(&mut self, name: &str) -> SessionResult<ProjectId> {
        let id = self.registry.add_project(name.trim()).id().clone();
        self.context.select_project(id.clone());
        info!("event=project_create module=session status=ok");
        self.persist()?;
        Ok(id)
    }

    pub fn rename_project(&mut self, id: &ProjectId, name: &str) -> SessionResult<()> {
        let project = self
            .registry
            .find_project_mut(id)
            .ok_or_else(|| SessionError::ProjectNotFound(id.clone()))?;
        project.name = name.trim().to_string();
        self.persist()
    }

    /// Deletes a project with all of its tasks and saves.
    ///
    /// Confirmation is the caller's job. Returns the number of tasks discarded.
    pub fn delete_project(&mut self, id: &ProjectId) -> SessionResult<usize> {
        let removed = self
            .registry
            .remove_project(id)
            .ok_or_else(|| SessionError::ProjectNotFound(id.clone()))?;
        if self.context.active_project_id.as_ref() == Some(id) {
            self.context.clear();
        }
        info!(
            "event=project_delete module=session status=ok cascaded_tasks={}",
            removed.len()
        );
        self.persist()?;
        Ok(removed.len())
    }

    /// Adds a task to `project_id` (or the active project) and saves.
    pub fn add_task(
        &mut self,
        project_id: Option<&ProjectId>,
        request: NewTaskRequest,
    ) -> SessionResult<TaskId> {
        let project_id = match project_id {
            Some(id) => id.clone(),
            None => self
                .context
                .active_project_id
                .clone()
                .ok_or(SessionError::NoActiveProject)?,
        };
        let project = self
            .registry
            .find_project_mut(&project_id)
            .ok_or_else(|| SessionError::ProjectNotFound(project_id.clone()))?;

        let task = Task::new(
            request.title.trim(),
            request.description,
            request.priority,
            request.due_date,
        );
        let task_id = task.id().clone();
        project.add_todo(task);
        info!("event=task_create module=session status=ok");
        self.persist()?;
        Ok(task_id)
    }

    /// Edits one field of a task by wire name and saves.
    pub fn edit_task(
        &mut self,
        task_id: &TaskId,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> SessionResult<()> {
        self.task_mut(task_id)?.edit(field, value)?;
        self.persist()
    }

    /// Flips completion and saves; returns the new state.
    pub fn toggle_task(&mut self, task_id: &TaskId) -> SessionResult<bool> {
        let task = self.task_mut(task_id)?;
        task.toggle_complete();
        let is_completed = task.is_completed;
        self.persist()?;
        Ok(is_completed)
    }

    pub fn delete_task(&mut self, task_id: &TaskId) -> SessionResult<()> {
        let owner_id = self.owner_id(task_id)?;
        if let Some(project) = self.registry.find_project_mut(&owner_id) {
            project.remove_todo(task_id);
        }
        if self.context.active_task_id.as_ref() == Some(task_id) {
            self.context.active_task_id = None;
        }
        self.persist()
    }

    /// Moves a task from its current project to `to` and saves.
    ///
    /// Returns `false` (and skips the save) when the registry treated the
    /// move as a no-op, e.g. the task already lives in `to`.
    pub fn move_task(&mut self, task_id: &TaskId, to: &ProjectId) -> SessionResult<bool> {
        let from = self.owner_id(task_id)?;
        if self.registry.find_project(to).is_none() {
            return Err(SessionError::ProjectNotFound(to.clone()));
        }
        if !self.registry.move_todo(task_id, &from, to) {
            return Ok(false);
        }
        if self.context.active_task_id.as_ref() == Some(task_id) {
            self.context.active_task_id = None;
        }
        self.persist()?;
        Ok(true)
    }

    /// Seeds sample projects into an empty board and saves.
    ///
    /// Returns `false` without saving when the board already has projects.
    pub fn seed_if_empty(&mut self) -> SessionResult<bool> {
        if !self.registry.is_empty() {
            return Ok(false);
        }
        seed_sample_projects(&mut self.registry);
        if let Some(first) = self.registry.projects().first() {
            self.context.select_project(first.id().clone());
        }
        self.persist()?;
        Ok(true)
    }

    /// Saves the registry as it is now.
    ///
    /// # Errors
    /// - `SessionError::RecoveryPending` while an unreadable snapshot has not
    ///   been acknowledged; the slot is left as is.
    pub fn persist(&self) -> SessionResult<()> {
        if let Some(err) = self.recovered_from.as_ref() {
            warn!(
                "event=session_persist module=session status=blocked error_code={}",
                err.code()
            );
            return Err(SessionError::RecoveryPending);
        }
        self.codec.save(&self.registry).map_err(|err| {
            warn!(
                "event=session_persist module=session status=error error_code={}",
                err.code()
            );
            SessionError::from(err)
        })
    }

    fn owner_id(&self, task_id: &TaskId) -> SessionResult<ProjectId> {
        self.registry
            .owner_of(task_id)
            .map(|project| project.id().clone())
            .ok_or_else(|| SessionError::TaskNotFound(task_id.clone()))
    }

    fn task_mut(&mut self, task_id: &TaskId) -> SessionResult<&mut Task> {
        let owner_id = self.owner_id(task_id)?;
        self.registry
            .find_project_mut(&owner_id)
            .and_then(|project| project.find_todo_mut(task_id))
            .ok_or_else(|| SessionError::TaskNotFound(task_id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::{BoardSession, NewTaskRequest, SessionContext, SessionError};
    use crate::model::id::EntityId;
    use crate::repo::slot_repo::{MemorySlotStore, SlotStore};
    use crate::snapshot::{load, SnapshotCodec, SnapshotError, SNAPSHOT_SLOT_KEY};

    const UNREADABLE: &str = r#"{"projects":[{"id":"p1","name":"Mine"}]}"#;

    fn request(title: &str) -> NewTaskRequest {
        NewTaskRequest {
            title: title.to_string(),
            description: "desc".to_string(),
            priority: "high".to_string(),
            due_date: "2025-06-01".to_string(),
        }
    }

    #[test]
    fn context_select_project_drops_task() {
        let mut context = SessionContext::default();
        context.select_task(EntityId::new("p"), EntityId::new("t"));
        context.select_project(EntityId::new("q"));
        assert_eq!(context.active_project_id, Some(EntityId::new("q")));
        assert_eq!(context.active_task_id, None);
    }

    #[test]
    fn commands_persist_after_each_mutation() {
        let store = MemorySlotStore::new();
        let mut session = BoardSession::open(SnapshotCodec::new(&store)).unwrap();

        let project_id = session.create_project("  Work ").unwrap();
        let task_id = session.add_task(None, request("Send report")).unwrap();
        assert!(session.toggle_task(&task_id).unwrap());

        let stored = load(&store).unwrap();
        let project = stored.find_project(&project_id).unwrap();
        assert_eq!(project.name, "Work");
        assert!(project.find_todo(&task_id).unwrap().is_completed);
    }

    #[test]
    fn add_task_without_selection_fails() {
        let mut session = BoardSession::open(SnapshotCodec::new(MemorySlotStore::new())).unwrap();
        let err = session.add_task(None, request("x")).unwrap_err();
        assert!(matches!(err, SessionError::NoActiveProject));
    }

    #[test]
    fn deleting_active_project_clears_selection() {
        let mut session = BoardSession::open(SnapshotCodec::new(MemorySlotStore::new())).unwrap();
        let project_id = session.create_project("Work").unwrap();
        let task_id = session.add_task(None, request("a")).unwrap();
        session.select_task(&task_id).unwrap();

        assert_eq!(session.delete_project(&project_id).unwrap(), 1);
        assert_eq!(session.context(), &SessionContext::default());
        assert!(session.active_project().is_none());
    }

    #[test]
    fn move_task_follows_owner_and_clears_active_task() {
        let mut session = BoardSession::open(SnapshotCodec::new(MemorySlotStore::new())).unwrap();
        let work = session.create_project("Work").unwrap();
        let task_id = session.add_task(Some(&work), request("a")).unwrap();
        let home = session.create_project("Home").unwrap();
        session.select_task(&task_id).unwrap();

        assert!(session.move_task(&task_id, &home).unwrap());
        assert_eq!(session.registry().owner_of(&task_id).unwrap().id(), &home);
        assert_eq!(session.context().active_task_id, None);
        assert!(!session.move_task(&task_id, &home).unwrap());
    }

    #[test]
    fn edit_task_surfaces_invalid_field() {
        let mut session = BoardSession::open(SnapshotCodec::new(MemorySlotStore::new())).unwrap();
        session.create_project("Work").unwrap();
        let task_id = session.add_task(None, request("a")).unwrap();

        let err = session.edit_task(&task_id, "bogus", "x").unwrap_err();
        assert!(matches!(err, SessionError::InvalidField(_)));
        session.edit_task(&task_id, "title", "b").unwrap();
        assert_eq!(session.select_task(&task_id).unwrap().title, "b");
    }

    #[test]
    fn seed_if_empty_only_seeds_once() {
        let store = MemorySlotStore::new();
        let mut session = BoardSession::open(SnapshotCodec::new(&store)).unwrap();

        assert!(session.seed_if_empty().unwrap());
        assert!(!session.seed_if_empty().unwrap());
        assert_eq!(load(&store).unwrap().len(), 2);
        assert_eq!(session.active_project().unwrap().name, "Forest Duties");
    }

    #[test]
    fn open_selects_first_stored_project() {
        let store = MemorySlotStore::new();
        let first = {
            let mut session = BoardSession::open(SnapshotCodec::new(&store)).unwrap();
            let first = session.create_project("First").unwrap();
            session.create_project("Second").unwrap();
            first
        };

        let session = BoardSession::open(SnapshotCodec::new(&store)).unwrap();
        assert_eq!(session.active_project().unwrap().id(), &first);
    }

    #[test]
    fn open_reports_unreadable_snapshot() {
        let store = MemorySlotStore::new();
        store.write_slot(SNAPSHOT_SLOT_KEY, UNREADABLE).unwrap();

        let err = BoardSession::open(SnapshotCodec::new(&store)).err().unwrap();
        assert!(matches!(err, SessionError::Snapshot(SnapshotError::Malformed(_))));
        let err = BoardSession::open_seeded(SnapshotCodec::new(&store))
            .err()
            .unwrap();
        assert!(matches!(err, SessionError::Snapshot(SnapshotError::Malformed(_))));
        assert_eq!(
            store.read_slot(SNAPSHOT_SLOT_KEY).unwrap().as_deref(),
            Some(UNREADABLE)
        );
    }

    #[test]
    fn recovering_session_keeps_unreadable_slot_until_acknowledged() {
        let store = MemorySlotStore::new();
        store.write_slot(SNAPSHOT_SLOT_KEY, UNREADABLE).unwrap();

        let mut session = BoardSession::open_recovering(SnapshotCodec::new(&store));
        assert!(session.registry().is_empty());
        assert!(session.recovered_from().is_some());

        let err = session.create_project("New").unwrap_err();
        assert!(matches!(err, SessionError::RecoveryPending));
        assert_eq!(session.registry().len(), 1);
        assert_eq!(
            store.read_slot(SNAPSHOT_SLOT_KEY).unwrap().as_deref(),
            Some(UNREADABLE)
        );

        let discarded = session.acknowledge_recovery().unwrap();
        assert_eq!(discarded.code(), "snapshot_malformed");
        assert!(session.recovered_from().is_none());
        session.persist().unwrap();
        assert_eq!(load(&store).unwrap().projects()[0].name, "New");
    }

    #[test]
    fn recovering_session_over_readable_slot_saves_normally() {
        let store = MemorySlotStore::new();
        let mut session = BoardSession::open_recovering(SnapshotCodec::new(&store));
        assert!(session.acknowledge_recovery().is_none());
        session.create_project("Work").unwrap();
        assert_eq!(load(&store).unwrap().len(), 1);
    }
}
