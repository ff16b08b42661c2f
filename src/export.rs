use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use tracing::info;

use crate::database::{encode, StorageResult};
use crate::model::AppState;

pub fn backup_file_name(today: NaiveDate) -> String {
    format!("content_backup_{}.json", today.format("%Y-%m-%d"))
}

/// Writes the whole state to `dir/content_backup_<date>.json`, in the same
/// format as the persisted document. Returns the written path.
pub fn export_state(state: &AppState, dir: &Path, today: NaiveDate) -> StorageResult<PathBuf> {
    if !dir.is_dir() {
        fs::create_dir_all(dir)?;
    }
    let path = dir.join(backup_file_name(today));
    fs::write(&path, encode(state)?)?;
    info!(path = %path.display(), projects = state.projects.len(), "state exported");
    Ok(path)
}
