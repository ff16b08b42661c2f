mod common;

use common::{date, new_project};
use content_tui::model::{StatusMode, TaskLabel};
use content_tui::{AppState, ContentStatus, MemoryStorage, Store};

fn store() -> Store<MemoryStorage> {
    Store::new(AppState::default(), MemoryStorage::default())
}

#[test]
fn three_day_project_with_two_videos_a_day() {
    let mut store = store();
    let project = store
        .create_project(new_project("Scenario", "2024-01-01", "2024-01-03", 2))
        .unwrap();

    let items = store.state().items_for(project.id);
    assert_eq!(items.len(), 6);
    for day in 1..=3 {
        assert_eq!(items.iter().filter(|i| i.day_index == day).count(), 2);
    }
    assert!(items.iter().all(|i| i.status == ContentStatus::Planned));
    let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(
        titles,
        ["Video #1", "Video #2", "Video #3", "Video #4", "Video #5", "Video #6"]
    );
}

#[test]
fn every_mutation_is_written_through() {
    let mut store = store();
    let project = store
        .create_project(new_project("Writes", "2024-01-01", "2024-01-02", 1))
        .unwrap();
    let item = store.state().items_for(project.id)[0].id;

    store.toggle_task(item, "t1").unwrap();
    store.set_title(item, "Teaser".to_string()).unwrap();
    let topic = store.add_topic(project.id, "Q&A").unwrap().unwrap();
    store.remove_topic(project.id, topic).unwrap();

    assert_eq!(store.persistence().saves, 5);
    assert_eq!(store.persistence().saved_state().as_ref(), Some(store.state()));
}

#[test]
fn item_produced_from_script_to_upload() {
    let mut store = store();
    let project = store
        .create_project(new_project("Pipeline", "2024-01-01", "2024-01-01", 1))
        .unwrap();
    let id = store.state().items_for(project.id)[0].id;
    let status = |s: &Store<MemoryStorage>| s.state().content_item(id).unwrap().status;

    store.set_script(id, "Hello".to_string()).unwrap();
    assert_eq!(status(&store), ContentStatus::Pending);

    store
        .set_content_status(id, ContentStatus::Scheduled, date("2024-01-01"))
        .unwrap();
    assert_eq!(status(&store), ContentStatus::Scheduled);

    // Recording changes task completion, so the schedule gives way to the checklist.
    store.toggle_task(id, "t2").unwrap();
    assert_eq!(status(&store), ContentStatus::Pending);

    store.toggle_task(id, "t3").unwrap();
    store.toggle_task(id, "t4").unwrap();
    let item = store.state().content_item(id).unwrap();
    assert_eq!(item.status, ContentStatus::Uploaded);
    assert_eq!(item.status_mode, StatusMode::Derived);
    assert!(item.task(TaskLabel::WriteScript).unwrap().is_completed);
}

#[test]
fn archival_never_reverts() {
    let mut store = store();
    let project = store
        .create_project(new_project("Old", "2023-12-01", "2023-12-31", 1))
        .unwrap();
    assert_eq!(store.run_archival_sweep(date("2024-01-01")).unwrap(), 1);

    let item = store.state().items_for(project.id)[0].id;
    store.toggle_task(item, "t1").unwrap();
    store.add_topic(project.id, "Still collecting ideas").unwrap();
    store.set_active_project(project.id).unwrap();
    store.run_archival_sweep(date("2023-12-15")).unwrap();

    assert!(store.state().project(project.id).unwrap().is_finished);
}
