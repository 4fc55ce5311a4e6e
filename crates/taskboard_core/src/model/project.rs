//! Project domain model.
//!
//! # Responsibility
//! - Own an ordered list of tasks and expose id-based lookup/removal.
//!
//! # Invariants
//! - `todos` keeps insertion order; removals preserve the relative order of
//!   the remaining tasks.
//! - Lookups and removals match by task id only.

use crate::model::id::{EntityId, ProjectId, TaskId};
use crate::model::task::Task;

/// Named, ordered collection of tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    id: ProjectId,
    pub name: String,
    todos: Vec<Task>,
}

impl Project {
    /// Creates an empty project with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(EntityId::generate(), name)
    }

    /// Creates an empty project with a caller-provided id.
    pub fn with_id(id: impl Into<ProjectId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            todos: Vec::new(),
        }
    }

    pub fn id(&self) -> &ProjectId {
        &self.id
    }

    /// Tasks in display order.
    pub fn todos(&self) -> &[Task] {
        &self.todos
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    /// Appends a task at the end.
    ///
    /// No duplicate-id check is applied; callers own that concern.
    pub fn add_todo(&mut self, task: Task) {
        self.todos.push(task);
    }

    /// Removes every task whose id matches and returns how many were removed.
    ///
    /// An unknown id leaves the list unchanged.
    pub fn remove_todo(&mut self, id: &TaskId) -> usize {
        let before = self.todos.len();
        self.todos.retain(|task| task.id() != id);
        before - self.todos.len()
    }

    /// Removes and returns the first task whose id matches.
    pub fn take_todo(&mut self, id: &TaskId) -> Option<Task> {
        let index = self.position(id)?;
        Some(self.todos.remove(index))
    }

    pub fn find_todo(&self, id: &TaskId) -> Option<&Task> {
        self.todos.iter().find(|task| task.id() == id)
    }

    pub fn find_todo_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.todos.iter_mut().find(|task| task.id() == id)
    }

    pub fn contains_todo(&self, id: &TaskId) -> bool {
        self.position(id).is_some()
    }

    /// Number of tasks with `is_completed == true`.
    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|task| task.is_completed).count()
    }

    fn position(&self, id: &TaskId) -> Option<usize> {
        self.todos.iter().position(|task| task.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::Project;
    use crate::model::id::EntityId;
    use crate::model::task::Task;

    #[test]
    fn take_todo_removes_only_first_match() {
        let mut project = Project::new("dupes");
        let first = Task::with_id("same", "a", "", "low", "2025-01-01");
        let second = Task::with_id("same", "b", "", "low", "2025-01-01");
        project.add_todo(first);
        project.add_todo(second);

        let taken = project.take_todo(&EntityId::new("same")).unwrap();
        assert_eq!(taken.title, "a");
        assert_eq!(project.len(), 1);
        assert_eq!(project.todos()[0].title, "b");
    }

    #[test]
    fn remove_todo_drops_every_duplicate() {
        let mut project = Project::new("dupes");
        project.add_todo(Task::with_id("same", "a", "", "low", "2025-01-01"));
        project.add_todo(Task::with_id("keep", "k", "", "low", "2025-01-01"));
        project.add_todo(Task::with_id("same", "b", "", "low", "2025-01-01"));

        assert_eq!(project.remove_todo(&EntityId::new("same")), 2);
        assert_eq!(project.len(), 1);
        assert_eq!(project.todos()[0].title, "k");
    }

    #[test]
    fn completed_count_tracks_toggles() {
        let mut project = Project::new("p");
        let task = Task::new("a", "", "low", "2025-01-01");
        let id = task.id().clone();
        project.add_todo(task);
        assert_eq!(project.completed_count(), 0);

        project.find_todo_mut(&id).unwrap().toggle_complete();
        assert_eq!(project.completed_count(), 1);
    }
}
