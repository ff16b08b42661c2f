//! Status derivation for content items and archival for projects.
//!
//! Content updates run in two steps: `apply_script_rule` handles the one
//! field edit that touches a different field (a non-blank script completes
//! the Write Script task), then `derive_status` recomputes the status from
//! the task checklist. `reconcile` ties both together and decides whether a
//! manual status survives the edit.

use chrono::NaiveDate;
use tracing::info;

use crate::model::{ContentItem, ContentStatus, Project, StatusMode, TaskLabel};

/// Status implied by the task checklist alone.
pub fn derive_status(item: &ContentItem) -> ContentStatus {
    let done = item.completed_tasks();
    if !item.tasks.is_empty() && done == item.tasks.len() {
        ContentStatus::Uploaded
    } else if done > 0 {
        ContentStatus::Pending
    } else {
        ContentStatus::Planned
    }
}

/// Marks Write Script complete when the script has content. Returns true if
/// the task changed.
pub fn apply_script_rule(item: &mut ContentItem) -> bool {
    if !item.has_script() {
        return false;
    }
    match item
        .tasks
        .iter_mut()
        .find(|t| t.label == TaskLabel::WriteScript && !t.is_completed)
    {
        Some(task) => {
            task.is_completed = true;
            true
        }
        None => false,
    }
}

fn completion(item: &ContentItem) -> Vec<bool> {
    item.tasks.iter().map(|t| t.is_completed).collect()
}

/// Settles `current` after it replaced `previous`.
///
/// A change in task completion (including one made by the script rule)
/// clears a manual status. Derivation then runs unless the status is still
/// manual.
pub fn reconcile(previous: &ContentItem, current: &mut ContentItem) {
    apply_script_rule(current);

    if completion(previous) != completion(current) {
        current.status_mode = StatusMode::Derived;
    }

    if current.status_mode == StatusMode::Derived {
        current.status = derive_status(current);
    }
}

/// Marks stored items whose status disagrees with their checklist as
/// manual. Documents written before the mode was recorded carry explicit
/// statuses (such as Scheduled) under the default derived mode; without this
/// the next unrelated edit would re-derive them away. Returns how many
/// items changed.
pub fn adopt_stored_statuses(items: &mut [ContentItem]) -> usize {
    let mut adopted = 0;
    for item in items.iter_mut() {
        if item.status_mode == StatusMode::Derived && item.status != derive_status(item) {
            item.status_mode = StatusMode::Manual;
            adopted += 1;
        }
    }
    adopted
}

/// Flips `is_finished` once the project's end date is strictly before
/// `today`. Returns true if the project was archived by this call.
pub fn archive_if_ended(project: &mut Project, today: NaiveDate) -> bool {
    if project.is_finished || project.end_date >= today {
        return false;
    }
    project.is_finished = true;
    info!(project = %project.id, name = %project.name, end = %project.end_date, "project archived");
    true
}

/// Applies `archive_if_ended` to every project. Returns how many changed.
pub fn sweep(projects: &mut [Project], today: NaiveDate) -> usize {
    let mut archived = 0;
    for project in projects.iter_mut() {
        if archive_if_ended(project, today) {
            archived += 1;
        }
    }
    archived
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar;
    use crate::model::Platform;
    use uuid::Uuid;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn item() -> ContentItem {
        calendar::generate(date("2024-01-01"), date("2024-01-01"), 1, Uuid::new_v4())
            .pop()
            .unwrap()
    }

    fn project(end: &str) -> Project {
        Project {
            id: Uuid::new_v4(),
            name: "Ramp".to_string(),
            platform: Platform::TikTok,
            start_date: date("2024-01-01"),
            end_date: date(end),
            videos_per_day: 1,
            is_finished: false,
            references: vec![],
            future_topics: vec![],
        }
    }

    #[test]
    fn derive_follows_completed_count() {
        let mut it = item();
        assert_eq!(derive_status(&it), ContentStatus::Planned);

        it.tasks[0].is_completed = true;
        assert_eq!(derive_status(&it), ContentStatus::Pending);

        it.tasks.iter_mut().for_each(|t| t.is_completed = true);
        assert_eq!(derive_status(&it), ContentStatus::Uploaded);
    }

    #[test]
    fn script_rule_completes_write_script_only_for_non_blank() {
        let mut it = item();
        it.script = "  \n\t".to_string();
        assert!(!apply_script_rule(&mut it));
        assert_eq!(it.completed_tasks(), 0);

        it.script = "Hello".to_string();
        assert!(apply_script_rule(&mut it));
        assert!(it.task(TaskLabel::WriteScript).unwrap().is_completed);
        assert!(!apply_script_rule(&mut it));
    }

    #[test]
    fn reconcile_script_edit_moves_to_pending() {
        let before = item();
        let mut after = before.clone();
        after.script = "Hello".to_string();

        reconcile(&before, &mut after);
        assert!(after.task(TaskLabel::WriteScript).unwrap().is_completed);
        assert_eq!(after.status, ContentStatus::Pending);
    }

    #[test]
    fn manual_status_survives_edits_that_leave_tasks_alone() {
        let before = item();
        let mut scheduled = before.clone();
        scheduled.status = ContentStatus::Scheduled;
        scheduled.status_mode = StatusMode::Manual;
        reconcile(&before, &mut scheduled);
        assert_eq!(scheduled.status, ContentStatus::Scheduled);

        let mut retitled = scheduled.clone();
        retitled.title = "Hook test".to_string();
        reconcile(&scheduled, &mut retitled);
        assert_eq!(retitled.status, ContentStatus::Scheduled);
        assert_eq!(retitled.status_mode, StatusMode::Manual);
    }

    #[test]
    fn task_toggle_clears_manual_status() {
        let mut scheduled = item();
        scheduled.status = ContentStatus::Scheduled;
        scheduled.status_mode = StatusMode::Manual;

        let mut toggled = scheduled.clone();
        toggled.tasks[2].is_completed = true;
        reconcile(&scheduled, &mut toggled);
        assert_eq!(toggled.status_mode, StatusMode::Derived);
        assert_eq!(toggled.status, ContentStatus::Pending);
    }

    #[test]
    fn archival_is_strict_monotonic_and_idempotent() {
        let today = date("2024-02-01");
        let mut projects = vec![project("2024-01-31"), project("2024-02-01"), project("2024-03-01")];

        assert_eq!(sweep(&mut projects, today), 1);
        let once = projects.clone();
        assert_eq!(sweep(&mut projects, today), 0);
        assert_eq!(projects, once);

        assert!(projects[0].is_finished);
        assert!(!projects[1].is_finished);

        // A later end date never un-finishes a project.
        projects[0].end_date = date("2030-01-01");
        assert_eq!(sweep(&mut projects, today), 0);
        assert!(projects[0].is_finished);
    }

    #[test]
    fn stored_status_that_disagrees_with_tasks_becomes_manual() {
        let mut scheduled = item();
        scheduled.status = ContentStatus::Scheduled;
        let mut pending = item();
        pending.tasks[0].is_completed = true;
        pending.status = ContentStatus::Pending;
        let mut items = vec![scheduled, pending];

        assert_eq!(adopt_stored_statuses(&mut items), 1);
        assert_eq!(items[0].status_mode, StatusMode::Manual);
        assert_eq!(items[1].status_mode, StatusMode::Derived);
        assert_eq!(adopt_stored_statuses(&mut items), 0);
    }
}
