//! Sample content for first launch.

use crate::model::registry::Registry;
use crate::model::task::Task;
use crate::repo::slot_repo::SlotStore;
use crate::snapshot::{SnapshotCodec, SnapshotResult};
use log::info;

/// Adds the two sample projects and their five tasks.
///
/// The registry is extended, not replaced; callers decide when seeding applies.
pub fn seed_sample_projects(registry: &mut Registry) {
    let duties = registry.add_project("Forest Duties");
    duties.add_todo(Task::new(
        "Mark territory",
        "Check borders and refresh scent markers",
        "high",
        "2025-06-01T00:00:00Z",
    ));
    duties.add_todo(Task::new(
        "Scout fishing spots",
        "Find best salmon runs for season",
        "low",
        "2025-06-01T00:00:00Z",
    ));

    let den = registry.add_project("Den Life");
    den.add_todo(Task::new(
        "Organize den",
        "Arrange moss and leaves for comfort",
        "medium",
        "2025-01-01T00:00:00Z",
    ));
    den.add_todo(Task::new(
        "Forage for berries",
        "Stock up before hibernation",
        "high",
        "2025-01-03T00:00:00Z",
    ));
    den.add_todo(Task::new(
        "Sharpen claws",
        "Find good tree for scratching",
        "low",
        "2025-01-02T00:00:00Z",
    ));
}

/// Loads the stored registry and seeds sample projects when it is empty.
///
/// Load failures are returned without seeding, so an unreadable snapshot is
/// never replaced by sample content. The seeded registry is not saved until
/// the caller saves it.
pub fn load_or_seed<S: SlotStore>(codec: &SnapshotCodec<S>) -> SnapshotResult<Registry> {
    let mut registry = codec.load()?;
    if registry.is_empty() {
        seed_sample_projects(&mut registry);
        info!(
            "event=seed_apply module=seed status=ok projects={} tasks={}",
            registry.len(),
            registry.task_count()
        );
    }
    Ok(registry)
}
