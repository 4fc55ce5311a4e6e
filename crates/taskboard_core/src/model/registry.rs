//! Application registry: the top-level collection of projects.
//!
//! # Responsibility
//! - Own all projects of a session in display order.
//! - Provide project lookup/removal and cross-project task moves.
//!
//! # Invariants
//! - No two projects share an id.
//! - Removing a project discards all of its tasks.
//! - A moved task leaves its origin before it is appended to its destination,
//!   so it is owned by exactly one project at every observable point.
//! - Misses on `remove_project` and `move_todo` are silent no-ops.

use crate::model::id::{EntityId, ProjectId, TaskId};
use crate::model::project::Project;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Registry-level errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A project with the supplied id is already registered.
    DuplicateProjectId(ProjectId),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateProjectId(id) => write!(f, "project id already registered: {id}"),
        }
    }
}

impl Error for RegistryError {}

/// Ordered collection of all projects in one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    projects: Vec<Project>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Projects in display order.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Total number of tasks across all projects.
    pub fn task_count(&self) -> usize {
        self.projects.iter().map(Project::len).sum()
    }

    /// Creates a project with a generated id and appends it.
    pub fn add_project(&mut self, name: impl Into<String>) -> &mut Project {
        self.push(Project::with_id(EntityId::generate(), name))
    }

    /// Creates a project with a caller-provided id and appends it.
    ///
    /// # Errors
    /// - `RegistryError::DuplicateProjectId` when the id is already present.
    pub fn add_project_with_id(
        &mut self,
        id: impl Into<ProjectId>,
        name: impl Into<String>,
    ) -> Result<&mut Project, RegistryError> {
        let id = id.into();
        if self.find_project(&id).is_some() {
            return Err(RegistryError::DuplicateProjectId(id));
        }
        Ok(self.push(Project::with_id(id, name)))
    }

    /// Removes a project together with all of its tasks.
    ///
    /// Returns the removed project, or `None` when no project matched.
    pub fn remove_project(&mut self, id: &ProjectId) -> Option<Project> {
        let index = self.position(id)?;
        let removed = self.projects.remove(index);
        debug!(
            "event=project_remove module=registry status=ok cascaded_tasks={}",
            removed.len()
        );
        Some(removed)
    }

    pub fn find_project(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|project| project.id() == id)
    }

    pub fn find_project_mut(&mut self, id: &ProjectId) -> Option<&mut Project> {
        self.projects.iter_mut().find(|project| project.id() == id)
    }

    /// Finds the project currently owning `task_id`.
    pub fn owner_of(&self, task_id: &TaskId) -> Option<&Project> {
        self.projects
            .iter()
            .find(|project| project.contains_todo(task_id))
    }

    /// Transfers a task from one project to another.
    ///
    /// Returns `true` when the task moved. Returns `false` without touching
    /// any project when either project is missing, the task is not in
    /// `from`, or `from == to`.
    pub fn move_todo(&mut self, task_id: &TaskId, from: &ProjectId, to: &ProjectId) -> bool {
        if from == to {
            return false;
        }
        let (Some(from_index), Some(to_index)) = (self.position(from), self.position(to)) else {
            debug!("event=task_move module=registry status=skipped reason=project_not_found");
            return false;
        };
        let Some(task) = self.projects[from_index].take_todo(task_id) else {
            debug!("event=task_move module=registry status=skipped reason=task_not_found");
            return false;
        };

        self.projects[to_index].add_todo(task);
        debug!("event=task_move module=registry status=ok");
        true
    }

    fn push(&mut self, project: Project) -> &mut Project {
        self.projects.push(project);
        let last = self.projects.len() - 1;
        &mut self.projects[last]
    }

    fn position(&self, id: &ProjectId) -> Option<usize> {
        self.projects.iter().position(|project| project.id() == id)
    }
}
