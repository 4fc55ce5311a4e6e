use std::collections::HashSet;
use taskboard_core::{EntityId, Project, Registry, Task};

fn todo(title: &str) -> Task {
    Task::new(title, "", "low", "2025-01-01T00:00:00Z")
}

#[test]
fn new_project_is_empty_with_generated_id() {
    let first = Project::new("House Chores");
    let second = Project::new("House Chores");

    assert_eq!(first.name, "House Chores");
    assert!(first.is_empty());
    assert_ne!(first.id(), second.id());
}

#[test]
fn project_with_id_uses_supplied_id() {
    let project = Project::with_id("my-custom-id-123", "Work");
    assert_eq!(project.id().as_str(), "my-custom-id-123");
}

#[test]
fn add_todo_preserves_insertion_order() {
    let mut project = Project::new("House Chores");
    let titles = ["Clean kitchen", "Do laundry", "Take out trash"];
    for title in titles {
        project.add_todo(todo(title));
    }

    let stored = project
        .todos()
        .iter()
        .map(|task| task.title.as_str())
        .collect::<Vec<_>>();
    assert_eq!(stored, titles);
}

#[test]
fn find_todo_matches_by_id() {
    let mut project = Project::new("House Chores");
    let cook = todo("Cook dinner");
    let clean = todo("Clean table");
    let clean_id = clean.id().clone();
    project.add_todo(cook);
    project.add_todo(clean);

    assert_eq!(project.find_todo(&clean_id).unwrap().title, "Clean table");
    assert!(project.find_todo(&EntityId::new("Clean table")).is_none());
}

#[test]
fn remove_todo_keeps_remaining_order_and_ignores_unknown_ids() {
    let mut project = Project::new("Morning Routine");
    let brush = todo("Brush teeth");
    let coffee = todo("Make coffee");
    let walk = todo("Walk dog");
    let (brush_id, coffee_id, walk_id) =
        (brush.id().clone(), coffee.id().clone(), walk.id().clone());
    project.add_todo(brush);
    project.add_todo(coffee);
    project.add_todo(walk);

    assert_eq!(project.remove_todo(&coffee_id), 1);
    let ids = project.todos().iter().map(|t| t.id().clone()).collect::<Vec<_>>();
    assert_eq!(ids, vec![brush_id.clone(), walk_id.clone()]);

    assert_eq!(project.remove_todo(todo("Fake").id()), 0);
    let ids_after = project.todos().iter().map(|t| t.id().clone()).collect::<Vec<_>>();
    assert_eq!(ids_after, vec![brush_id, walk_id]);
}

#[test]
fn add_project_returns_findable_projects() {
    let mut registry = Registry::new();
    let mut ids = Vec::new();
    for name in ["Work", "Personal", "Shopping", "Garden"] {
        ids.push(registry.add_project(name).id().clone());
    }

    assert_eq!(registry.len(), 4);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 4);
    for (index, id) in ids.iter().enumerate() {
        let found = registry.find_project(id).unwrap();
        assert_eq!(found.id(), id);
        assert_eq!(found.name, registry.projects()[index].name);
    }
}

#[test]
fn remove_project_cascades_and_ignores_unknown_ids() {
    let mut registry = Registry::new();
    let work = registry.add_project("Work");
    work.add_todo(todo("a"));
    work.add_todo(todo("b"));
    let work_id = work.id().clone();
    registry.add_project("Personal");

    assert!(registry.remove_project(&EntityId::new("missing")).is_none());
    assert_eq!(registry.len(), 2);

    let removed = registry.remove_project(&work_id).unwrap();
    assert_eq!(removed.len(), 2);
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.task_count(), 0);
    assert!(registry.find_project(&work_id).is_none());
}

#[test]
fn move_todo_transfers_the_same_task() {
    let mut registry = Registry::new();
    let work_id = registry.add_project("Work").id().clone();
    let task = Task::new("Send report", "Monthly report", "high", "2025-06-01");
    let task_id = task.id().clone();
    let original = task.clone();
    registry.find_project_mut(&work_id).unwrap().add_todo(task);
    let personal_id = registry.add_project("Personal").id().clone();

    assert!(registry.move_todo(&task_id, &work_id, &personal_id));

    let work = registry.find_project(&work_id).unwrap();
    let personal = registry.find_project(&personal_id).unwrap();
    assert_eq!(work.len(), 0);
    assert_eq!(personal.len(), 1);
    assert_eq!(personal.todos()[0].id(), &task_id);
    assert_eq!(personal.todos()[0], original);
}

#[test]
fn move_todo_with_missing_project_or_task_changes_nothing() {
    let mut registry = Registry::new();
    let work = registry.add_project("Work");
    let task = todo("a");
    let task_id = task.id().clone();
    work.add_todo(task);
    let work_id = work.id().clone();
    let personal_id = registry.add_project("Personal").id().clone();
    let missing = EntityId::new("missing");

    assert!(!registry.move_todo(&task_id, &missing, &personal_id));
    assert!(!registry.move_todo(&task_id, &work_id, &missing));
    assert!(!registry.move_todo(&missing, &work_id, &personal_id));
    assert!(!registry.move_todo(&task_id, &personal_id, &work_id));

    assert_eq!(registry.find_project(&work_id).unwrap().len(), 1);
    assert_eq!(registry.find_project(&personal_id).unwrap().len(), 0);
}

#[test]
fn tasks_edited_through_find_stay_in_place() {
    let mut registry = Registry::new();
    let project = registry.add_project("Work");
    let task = todo("draft");
    let task_id = task.id().clone();
    project.add_todo(task);
    let project_id = project.id().clone();

    registry
        .find_project_mut(&project_id)
        .and_then(|project| project.find_todo_mut(&task_id))
        .unwrap()
        .edit("title", "final")
        .unwrap();

    let project = registry.find_project(&project_id).unwrap();
    assert_eq!(project.find_todo(&task_id).unwrap().title, "final");
}
