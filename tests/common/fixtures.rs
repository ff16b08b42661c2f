use chrono::NaiveDate;
use content_tui::{NewProject, Platform, SqliteStorage, Store};

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

pub fn new_project(name: &str, start: &str, end: &str, per_day: u32) -> NewProject {
    NewProject {
        name: name.to_string(),
        platform: Platform::YouTubeShorts,
        start_date: date(start),
        end_date: date(end),
        videos_per_day: per_day,
    }
}

/// Opens a store backed by a sqlite file in a fresh temp directory.
/// The directory must be kept alive for the duration of the test.
pub fn open_store(today: &str) -> (Store<SqliteStorage>, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
    let store = reopen_store(&dir, today);
    (store, dir)
}

pub fn reopen_store(dir: &tempfile::TempDir, today: &str) -> Store<SqliteStorage> {
    let storage = SqliteStorage::open(dir.path()).expect("Failed to open storage");
    let (store, _) = Store::load(storage, date(today)).expect("Failed to load store");
    store
}
