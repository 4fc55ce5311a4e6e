//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose board commands and read models to Dart via FRB.
//! - Own the single process-wide `BoardSession` behind a mutex.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every mutation runs while holding the board lock, one at a time.
//! - Storage location is fixed by the first board access.
//! - An unreadable stored board is reported on every call and never
//!   overwritten unless `board_discard_unreadable` is called.

use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use taskboard_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    BoardSession, EntityId, NewTaskRequest, Project, SessionError, SnapshotCodec,
    SqliteSlotStore, Task,
};

const BOARD_DB_FILE_NAME: &str = "taskboard_board.sqlite3";
static BOARD_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static BOARD: Mutex<Option<BoardSession<SqliteSlotStore>>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error`, case-insensitive.
/// - `log_dir`: absolute directory for rolling logs.
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Pins the board database path.
///
/// # FFI contract
/// - Must run before the first board call to take effect.
/// - Repeating the same path is accepted; a different path is rejected.
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_storage(db_path: String) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = BOARD_DB_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "storage already configured at `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// Read model for one task row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: String,
    /// ISO-8601 when the due date is a point in time, raw text otherwise.
    pub due_date: String,
    /// `title (priority) – due M/D/YYYY`
    pub summary: String,
    pub is_completed: bool,
}

/// Read model for one project with its tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectView {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    pub tasks: Vec<TaskView>,
}

/// Generic command response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardActionResponse {
    /// Whether the command succeeded.
    pub ok: bool,
    /// Id of the created or affected entity, when there is one.
    pub entity_id: Option<String>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl BoardActionResponse {
    fn success(message: impl Into<String>, entity_id: Option<String>) -> Self {
        Self {
            ok: true,
            entity_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            entity_id: None,
            message: message.into(),
        }
    }
}

/// Lists every project in display order.
///
/// # FFI contract
/// - Sync call, DB-backed on first access (loads or seeds the board).
/// - Returns an empty list when storage cannot be opened.
#[flutter_rust_bridge::frb(sync)]
pub fn board_projects() -> Vec<ProjectView> {
    with_board(|session| {
        let active = session.context().active_project_id.clone();
        Ok(session
            .registry()
            .projects()
            .iter()
            .map(|project| to_project_view(project, active.as_ref()))
            .collect())
    })
    .unwrap_or_else(|err| {
        warn!("event=ffi_board_projects module=ffi status=error error={err}");
        Vec::new()
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_select_project(project_id: String) -> BoardActionResponse {
    respond("board_select_project", |session| {
        let id = session.select_project(&EntityId::new(project_id))?.id().to_string();
        Ok(("Project selected.", Some(id)))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_create_project(name: String) -> BoardActionResponse {
    respond("board_create_project", |session| {
        let id = session.create_project(&name)?;
        Ok(("Project created.", Some(id.to_string())))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_rename_project(project_id: String, name: String) -> BoardActionResponse {
    respond("board_rename_project", |session| {
        let id = EntityId::new(project_id);
        session.rename_project(&id, &name)?;
        Ok(("Project renamed.", Some(id.to_string())))
    })
}

/// Deletes a project together with its tasks.
///
/// # FFI contract
/// - The UI must confirm with the user before calling; deletion is final.
#[flutter_rust_bridge::frb(sync)]
pub fn board_delete_project(project_id: String) -> BoardActionResponse {
    respond("board_delete_project", |session| {
        let id = EntityId::new(project_id);
        session.delete_project(&id)?;
        Ok(("Project deleted.", Some(id.to_string())))
    })
}

/// Adds a task to `project_id`, or to the active project when `None`.
#[flutter_rust_bridge::frb(sync)]
pub fn board_add_task(
    project_id: Option<String>,
    title: String,
    description: String,
    priority: String,
    due_date: String,
) -> BoardActionResponse {
    respond("board_add_task", |session| {
        let project_id = project_id.map(EntityId::new);
        let request = NewTaskRequest {
            title,
            description,
            priority,
            due_date,
        };
        let id = session.add_task(project_id.as_ref(), request)?;
        Ok(("Task created.", Some(id.to_string())))
    })
}

/// Edits one task field (`title|description|priority|dueDate`).
#[flutter_rust_bridge::frb(sync)]
pub fn board_edit_task(task_id: String, field: String, value: String) -> BoardActionResponse {
    respond("board_edit_task", |session| {
        let id = EntityId::new(task_id);
        session.edit_task(&id, &field, value)?;
        Ok(("Task updated.", Some(id.to_string())))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_toggle_task(task_id: String) -> BoardActionResponse {
    respond("board_toggle_task", |session| {
        let id = EntityId::new(task_id);
        let message = if session.toggle_task(&id)? {
            "Task completed."
        } else {
            "Task reopened."
        };
        Ok((message, Some(id.to_string())))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_delete_task(task_id: String) -> BoardActionResponse {
    respond("board_delete_task", |session| {
        let id = EntityId::new(task_id);
        session.delete_task(&id)?;
        Ok(("Task deleted.", Some(id.to_string())))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_move_task(task_id: String, to_project_id: String) -> BoardActionResponse {
    respond("board_move_task", |session| {
        let id = EntityId::new(task_id);
        let message = if session.move_task(&id, &EntityId::new(to_project_id))? {
            "Task moved."
        } else {
            "Task already in that project."
        };
        Ok((message, Some(id.to_string())))
    })
}

/// Replaces an unreadable stored board with the sample board.
///
/// # FFI contract
/// - The UI must confirm with the user first; the unreadable snapshot is lost.
/// - A readable board is left as is.
#[flutter_rust_bridge::frb(sync)]
pub fn board_discard_unreadable() -> BoardActionResponse {
    let mut guard = lock_board();
    if guard.is_some() {
        return BoardActionResponse::success("Board already loaded; nothing discarded.", None);
    }
    match discard_unreadable_session(&resolve_board_db_path()) {
        Ok((session, discarded)) => {
            *guard = Some(session);
            let message = match discarded {
                Some(err) => {
                    info!("event=ffi_board_discard module=ffi status=ok");
                    format!("Discarded unreadable board: {err}")
                }
                None => "Stored board is readable; nothing discarded.".to_string(),
            };
            BoardActionResponse::success(message, None)
        }
        Err(err) => {
            BoardActionResponse::failure(format!("board_discard_unreadable failed: {err}"))
        }
    }
}

fn respond(
    operation: &str,
    f: impl FnOnce(
        &mut BoardSession<SqliteSlotStore>,
    ) -> Result<(&'static str, Option<String>), SessionError>,
) -> BoardActionResponse {
    match with_board(|session| f(session).map_err(|err| err.to_string())) {
        Ok((message, entity_id)) => BoardActionResponse::success(message, entity_id),
        Err(err) => BoardActionResponse::failure(format!("{operation} failed: {err}")),
    }
}

fn with_board<T>(
    f: impl FnOnce(&mut BoardSession<SqliteSlotStore>) -> Result<T, String>,
) -> Result<T, String> {
    let mut guard = lock_board();
    if guard.is_none() {
        *guard = Some(open_board_session(&resolve_board_db_path())?);
    }
    match guard.as_mut() {
        Some(session) => f(session),
        None => Err("board session unavailable".to_string()),
    }
}

fn lock_board() -> MutexGuard<'static, Option<BoardSession<SqliteSlotStore>>> {
    BOARD.lock().unwrap_or_else(PoisonError::into_inner)
}

fn open_board_store(db_path: &Path) -> Result<SqliteSlotStore, String> {
    SqliteSlotStore::open(db_path).map_err(|err| format!("board DB open failed: {err}"))
}

/// Opens the stored board; a failed load is returned, not replaced.
fn open_board_session(db_path: &Path) -> Result<BoardSession<SqliteSlotStore>, String> {
    let codec = SnapshotCodec::new(open_board_store(db_path)?);
    BoardSession::open_seeded(codec).map_err(|err| {
        warn!("event=ffi_board_open module=ffi status=error error={err}");
        format!("board load failed: {err}")
    })
}

fn discard_unreadable_session(
    db_path: &Path,
) -> Result<(BoardSession<SqliteSlotStore>, Option<String>), String> {
    let codec = SnapshotCodec::new(open_board_store(db_path)?);
    let mut session = BoardSession::open_recovering(codec);
    let discarded = session.acknowledge_recovery().map(|err| err.to_string());
    session.seed_if_empty().map_err(|err| err.to_string())?;
    Ok((session, discarded))
}

fn resolve_board_db_path() -> PathBuf {
    BOARD_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("TASKBOARD_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(BOARD_DB_FILE_NAME)
        })
        .clone()
}

fn to_project_view(project: &Project, active: Option<&EntityId>) -> ProjectView {
    ProjectView {
        id: project.id().to_string(),
        name: project.name.clone(),
        is_active: active == Some(project.id()),
        tasks: project.todos().iter().map(to_task_view).collect(),
    }
}

fn to_task_view(task: &Task) -> TaskView {
    TaskView {
        id: task.id().to_string(),
        title: task.title.clone(),
        description: task.description.clone(),
        priority: task.priority.to_string(),
        due_date: task.due_date.to_iso_string(),
        summary: task.describe(),
        is_completed: task.is_completed,
    }
}
