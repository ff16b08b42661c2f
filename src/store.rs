use chrono::{NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::calendar;
use crate::database::{encode, load_state, LoadOutcome, Persistence, StorageResult};
use crate::model::{
    AppState, ContentItem, ContentStatus, NewProject, Project, Reference, StatusMode, Topic,
};
use crate::status;

/// Owns the application state and writes it through `persistence` after
/// every mutation that changed something.
///
/// Each mutation is applied to a copy of the state. The copy replaces the
/// live state only once the write succeeded, so a failed save leaves the
/// store exactly as it was.
///
/// Operations that reference an unknown project or content item are no-ops:
/// they return `Ok(false)` (or `Ok(None)`) and nothing is written.
pub struct Store<P: Persistence> {
    state: AppState,
    persistence: P,
    archived_on_load: usize,
}

impl<P: Persistence> Store<P> {
    pub fn new(state: AppState, persistence: P) -> Self {
        Store {
            state,
            persistence,
            archived_on_load: 0,
        }
    }

    /// Loads the saved state and runs the archival sweep against `today`.
    pub fn load(mut persistence: P, today: NaiveDate) -> StorageResult<(Self, LoadOutcome)> {
        let (state, outcome) = load_state(&mut persistence)?;
        let mut store = Store::new(state, persistence);
        store.archived_on_load = store.run_archival_sweep(today)?;
        Ok((store, outcome))
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Projects archived by the sweep that ran inside `load`.
    pub fn archived_on_load(&self) -> usize {
        self.archived_on_load
    }

    /// Runs `edit` on a copy of the state. When it reports a change the copy
    /// is saved and then installed.
    fn apply<T>(
        &mut self,
        edit: impl FnOnce(&mut AppState) -> Option<T>,
    ) -> StorageResult<Option<T>> {
        let mut next = self.state.clone();
        let Some(result) = edit(&mut next) else {
            return Ok(None);
        };
        let blob = encode(&next)?;
        self.persistence.save_raw(&blob)?;
        self.state = next;
        Ok(Some(result))
    }

    /// Builds the project, generates its backlog and makes it active. Input
    /// is trusted; validation belongs to the form layer.
    pub fn create_project(&mut self, draft: NewProject) -> StorageResult<Project> {
        let project = Project {
            id: Uuid::new_v4(),
            name: draft.name,
            platform: draft.platform,
            start_date: draft.start_date,
            end_date: draft.end_date,
            videos_per_day: draft.videos_per_day,
            is_finished: false,
            references: vec![],
            future_topics: vec![],
        };
        let items = calendar::generate(
            project.start_date,
            project.end_date,
            project.videos_per_day,
            project.id,
        );
        let count = items.len();

        self.apply(|state| {
            state.projects.push(project.clone());
            state.content_items.extend(items);
            state.active_project_id = Some(project.id);
            Some(())
        })?;
        info!(
            project = %project.id,
            name = %project.name,
            items = count,
            "project created"
        );
        Ok(project)
    }

    /// Replaces the item with the same id, then settles its tasks and status.
    pub fn update_content_item(&mut self, item: ContentItem) -> StorageResult<bool> {
        let id = item.id;
        let updated = self.apply(|state| {
            let slot = state.content_items.iter_mut().find(|i| i.id == item.id)?;
            let previous = std::mem::replace(slot, item);
            status::reconcile(&previous, slot);
            Some(())
        })?;
        if updated.is_none() {
            debug!(item = %id, "update for unknown content item ignored");
        }
        Ok(updated.is_some())
    }

    fn edit_item(&mut self, id: Uuid, edit: impl FnOnce(&mut ContentItem)) -> StorageResult<bool> {
        let Some(mut item) = self.state.content_item(id).cloned() else {
            debug!(item = %id, "edit for unknown content item ignored");
            return Ok(false);
        };
        edit(&mut item);
        self.update_content_item(item)
    }

    pub fn toggle_task(&mut self, item_id: Uuid, task_id: &str) -> StorageResult<bool> {
        self.edit_item(item_id, |item| {
            if let Some(task) = item.tasks.iter_mut().find(|t| t.id == task_id) {
                task.is_completed = !task.is_completed;
            }
        })
    }

    pub fn set_title(&mut self, item_id: Uuid, title: String) -> StorageResult<bool> {
        self.edit_item(item_id, |item| item.title = title)
    }

    pub fn set_script(&mut self, item_id: Uuid, script: String) -> StorageResult<bool> {
        self.edit_item(item_id, |item| item.script = script)
    }

    /// Blank input clears the URL.
    pub fn set_video_url(&mut self, item_id: Uuid, url: String) -> StorageResult<bool> {
        let url = url.trim().to_string();
        self.edit_item(item_id, |item| {
            item.video_url = if url.is_empty() { None } else { Some(url) };
        })
    }

    /// Explicit status action. The status sticks until task completion
    /// changes; marking Uploaded stamps the upload date if it is unset.
    pub fn set_content_status(
        &mut self,
        item_id: Uuid,
        status: ContentStatus,
        today: NaiveDate,
    ) -> StorageResult<bool> {
        self.edit_item(item_id, |item| {
            item.status = status;
            item.status_mode = StatusMode::Manual;
            if status == ContentStatus::Uploaded && item.upload_date.is_none() {
                item.upload_date = Some(today);
            }
        })
    }

    fn edit_project(&mut self, id: Uuid, edit: impl FnOnce(&mut Project) -> bool) -> StorageResult<bool> {
        if self.state.project(id).is_none() {
            debug!(project = %id, "edit for unknown project ignored");
            return Ok(false);
        }
        let changed = self.apply(|state| {
            let project = state.projects.iter_mut().find(|p| p.id == id)?;
            edit(project).then_some(())
        })?;
        Ok(changed.is_some())
    }

    /// Appends a topic; blank text is dropped. Returns the new topic id.
    pub fn add_topic(&mut self, project_id: Uuid, text: &str) -> StorageResult<Option<Uuid>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let topic = Topic {
            id: Uuid::new_v4(),
            text: text.to_string(),
            date_added: Utc::now(),
        };
        let id = topic.id;
        let added = self.edit_project(project_id, |p| {
            p.future_topics.push(topic);
            true
        })?;
        Ok(added.then_some(id))
    }

    pub fn remove_topic(&mut self, project_id: Uuid, topic_id: Uuid) -> StorageResult<bool> {
        self.edit_project(project_id, |p| {
            let before = p.future_topics.len();
            p.future_topics.retain(|t| t.id != topic_id);
            p.future_topics.len() != before
        })
    }

    pub fn add_reference(
        &mut self,
        project_id: Uuid,
        title: &str,
        url: &str,
    ) -> StorageResult<Option<Uuid>> {
        let url = url.trim();
        if url.is_empty() {
            return Ok(None);
        }
        let title = match title.trim() {
            "" => url,
            t => t,
        };
        let reference = Reference {
            id: Uuid::new_v4(),
            title: title.to_string(),
            url: url.to_string(),
        };
        let id = reference.id;
        let added = self.edit_project(project_id, |p| {
            p.references.push(reference);
            true
        })?;
        Ok(added.then_some(id))
    }

    pub fn remove_reference(&mut self, project_id: Uuid, reference_id: Uuid) -> StorageResult<bool> {
        self.edit_project(project_id, |p| {
            let before = p.references.len();
            p.references.retain(|r| r.id != reference_id);
            p.references.len() != before
        })
    }

    /// Callers pass known ids; the id is not checked.
    pub fn set_active_project(&mut self, project_id: Uuid) -> StorageResult<()> {
        self.apply(|state| {
            if state.active_project_id == Some(project_id) {
                return None;
            }
            state.active_project_id = Some(project_id);
            Some(())
        })?;
        Ok(())
    }

    /// Archives every project whose end date has passed. Writes only when a
    /// project changed.
    pub fn run_archival_sweep(&mut self, today: NaiveDate) -> StorageResult<usize> {
        let archived = self.apply(|state| match status::sweep(&mut state.projects, today) {
            0 => None,
            n => Some(n),
        })?;
        Ok(archived.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStorage;
    use crate::model::{Platform, TaskLabel};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn draft(start: &str, end: &str, per_day: u32) -> NewProject {
        NewProject {
            name: "January Sprint".to_string(),
            platform: Platform::YouTubeShorts,
            start_date: date(start),
            end_date: date(end),
            videos_per_day: per_day,
        }
    }

    fn store_with_project() -> (Store<MemoryStorage>, Project) {
        let mut store = Store::new(AppState::default(), MemoryStorage::default());
        let project = store.create_project(draft("2024-01-01", "2024-01-03", 2)).unwrap();
        (store, project)
    }

    #[test]
    fn create_project_generates_backlog_and_activates() {
        let (store, project) = store_with_project();
        let state = store.state();

        assert_eq!(state.active_project_id, Some(project.id));
        assert!(!project.is_finished);
        assert!(project.references.is_empty() && project.future_topics.is_empty());
        assert_eq!(state.content_items.len(), 6);
        assert!(state
            .content_items
            .iter()
            .all(|i| i.status == ContentStatus::Planned && i.project_id == project.id));
        assert_eq!(store.persistence().saves, 1);
        assert_eq!(store.persistence().saved_state().as_ref(), Some(state));
    }

    #[test]
    fn reversed_range_creates_project_without_items() {
        let mut store = Store::new(AppState::default(), MemoryStorage::default());
        store.create_project(draft("2024-01-05", "2024-01-01", 1)).unwrap();
        assert_eq!(store.state().projects.len(), 1);
        assert!(store.state().content_items.is_empty());
    }

    #[test]
    fn update_unknown_item_is_silent_noop() {
        let (mut store, _) = store_with_project();
        let mut stray = store.state().content_items[0].clone();
        stray.id = Uuid::new_v4();
        stray.title = "ghost".to_string();

        assert!(!store.update_content_item(stray).unwrap());
        assert_eq!(store.persistence().saves, 1);
        assert!(store.state().content_items.iter().all(|i| i.title != "ghost"));
    }

    #[test]
    fn toggling_tasks_walks_status_through_lifecycle() {
        let (mut store, _) = store_with_project();
        let id = store.state().content_items[0].id;
        let status = |s: &Store<MemoryStorage>| s.state().content_item(id).unwrap().status;

        store.toggle_task(id, "t1").unwrap();
        assert_eq!(status(&store), ContentStatus::Pending);
        for task in ["t2", "t3", "t4"] {
            store.toggle_task(id, task).unwrap();
        }
        assert_eq!(status(&store), ContentStatus::Uploaded);
        for task in ["t1", "t2", "t3", "t4"] {
            store.toggle_task(id, task).unwrap();
        }
        assert_eq!(status(&store), ContentStatus::Planned);
    }

    #[test]
    fn script_edit_completes_write_script() {
        let (mut store, _) = store_with_project();
        let id = store.state().content_items[0].id;

        store.set_script(id, "Hello".to_string()).unwrap();
        let item = store.state().content_item(id).unwrap();
        assert!(item.task(TaskLabel::WriteScript).unwrap().is_completed);
        assert_eq!(item.status, ContentStatus::Pending);
    }

    #[test]
    fn scheduled_survives_title_edit_but_not_task_toggle() {
        let (mut store, _) = store_with_project();
        let id = store.state().content_items[0].id;
        let today = date("2024-01-01");

        store.set_content_status(id, ContentStatus::Scheduled, today).unwrap();
        store.set_title(id, "Cold open".to_string()).unwrap();
        store.set_video_url(id, "https://example.com/v".to_string()).unwrap();
        let item = store.state().content_item(id).unwrap();
        assert_eq!(item.status, ContentStatus::Scheduled);
        assert_eq!(item.title, "Cold open");

        store.toggle_task(id, "t2").unwrap();
        let item = store.state().content_item(id).unwrap();
        assert_eq!(item.status, ContentStatus::Pending);
        assert_eq!(item.status_mode, StatusMode::Derived);
    }

    #[test]
    fn manual_upload_stamps_upload_date_once() {
        let (mut store, _) = store_with_project();
        let id = store.state().content_items[0].id;

        store
            .set_content_status(id, ContentStatus::Uploaded, date("2024-01-02"))
            .unwrap();
        store
            .set_content_status(id, ContentStatus::Uploaded, date("2024-01-09"))
            .unwrap();
        let item = store.state().content_item(id).unwrap();
        assert_eq!(item.status, ContentStatus::Uploaded);
        assert_eq!(item.upload_date, Some(date("2024-01-02")));
    }

    #[test]
    fn blank_video_url_clears_it() {
        let (mut store, _) = store_with_project();
        let id = store.state().content_items[0].id;
        store.set_video_url(id, " https://x.test ".to_string()).unwrap();
        assert_eq!(
            store.state().content_item(id).unwrap().video_url.as_deref(),
            Some("https://x.test")
        );
        store.set_video_url(id, "   ".to_string()).unwrap();
        assert_eq!(store.state().content_item(id).unwrap().video_url, None);
    }

    #[test]
    fn topics_add_remove_and_ignore_unknown_project() {
        let (mut store, project) = store_with_project();

        let id = store.add_topic(project.id, "  Behind the scenes  ").unwrap().unwrap();
        assert_eq!(store.add_topic(project.id, "   ").unwrap(), None);
        assert_eq!(store.add_topic(Uuid::new_v4(), "lost").unwrap(), None);

        let topics = &store.state().project(project.id).unwrap().future_topics;
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].text, "Behind the scenes");

        assert!(!store.remove_topic(project.id, Uuid::new_v4()).unwrap());
        assert!(store.remove_topic(project.id, id).unwrap());
        assert!(store.state().project(project.id).unwrap().future_topics.is_empty());
    }

    #[test]
    fn references_default_title_to_url() {
        let (mut store, project) = store_with_project();
        let id = store
            .add_reference(project.id, "", "https://example.com/inspo")
            .unwrap()
            .unwrap();
        let refs = &store.state().project(project.id).unwrap().references;
        assert_eq!(refs[0].title, "https://example.com/inspo");

        assert_eq!(store.add_reference(project.id, "t", " ").unwrap(), None);
        assert!(store.remove_reference(project.id, id).unwrap());
    }

    #[test]
    fn archival_sweep_is_idempotent_and_only_writes_on_change() {
        let (mut store, project) = store_with_project();
        let saves = store.persistence().saves;

        assert_eq!(store.run_archival_sweep(date("2024-01-03")).unwrap(), 0);
        assert_eq!(store.persistence().saves, saves);

        assert_eq!(store.run_archival_sweep(date("2024-01-04")).unwrap(), 1);
        let once = store.state().clone();
        assert_eq!(store.run_archival_sweep(date("2024-01-04")).unwrap(), 0);
        assert_eq!(store.state(), &once);
        assert!(store.state().project(project.id).unwrap().is_finished);
        assert_eq!(store.persistence().saves, saves + 1);
    }

    #[test]
    fn load_sweeps_expired_projects() {
        let (store, project) = store_with_project();
        let persistence = store.persistence().clone();

        let (reloaded, outcome) = Store::load(persistence, date("2024-02-01")).unwrap();
        assert_eq!(outcome, LoadOutcome::Restored);
        assert!(reloaded.state().project(project.id).unwrap().is_finished);
        assert!(reloaded.persistence().saved_state().unwrap().projects[0].is_finished);
    }

    #[test]
    fn set_active_project_switches() {
        let (mut store, first) = store_with_project();
        let second = store.create_project(draft("2024-02-01", "2024-02-02", 1)).unwrap();
        assert_eq!(store.state().active_project_id, Some(second.id));
        store.set_active_project(first.id).unwrap();
        assert_eq!(store.state().active_project_id, Some(first.id));
    }

    #[test]
    fn stored_scheduled_status_survives_title_edit_after_load() {
        let (store, _) = store_with_project();
        let id = store.state().content_items[0].id;
        let mut json: serde_json::Value =
            serde_json::from_str(store.persistence().blob.as_deref().unwrap()).unwrap();
        for item in json["contentItems"].as_array_mut().unwrap() {
            item.as_object_mut().unwrap().remove("statusMode");
        }
        json["contentItems"][0]["status"] = "Scheduled".into();

        let persistence = MemoryStorage::with_blob(json.to_string());
        let (mut store, _) = Store::load(persistence, date("2024-01-01")).unwrap();
        store.set_title(id, "Teaser".to_string()).unwrap();

        let item = store.state().content_item(id).unwrap();
        assert_eq!(item.title, "Teaser");
        assert_eq!(item.status, ContentStatus::Scheduled);

        store.toggle_task(id, "t1").unwrap();
        assert_eq!(store.state().content_item(id).unwrap().status, ContentStatus::Pending);
    }

    #[test]
    fn failed_save_leaves_state_untouched() {
        let (store, project) = store_with_project();
        let id = store.state().content_items[0].id;
        let mut persistence = store.persistence().clone();
        persistence.fail_saves = true;
        let mut store = Store::new(store.state().clone(), persistence);
        let before = store.state().clone();

        assert!(store.toggle_task(id, "t1").is_err());
        assert!(store.add_topic(project.id, "Bloopers").is_err());
        assert!(store.create_project(draft("2024-03-01", "2024-03-02", 1)).is_err());
        assert!(store.run_archival_sweep(date("2024-02-01")).is_err());
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn load_reports_projects_archived_by_its_sweep() {
        let (mut store, _) = store_with_project();
        store.create_project(draft("2024-03-01", "2024-03-31", 1)).unwrap();
        let persistence = store.persistence().clone();

        let (reloaded, _) = Store::load(persistence.clone(), date("2024-02-01")).unwrap();
        assert_eq!(reloaded.archived_on_load(), 1);

        let (again, _) = Store::load(reloaded.persistence().clone(), date("2024-02-01")).unwrap();
        assert_eq!(again.archived_on_load(), 0);
        assert_eq!(Store::new(AppState::default(), persistence).archived_on_load(), 0);
    }
}
