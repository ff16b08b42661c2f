pub mod app;
pub mod calendar;
pub mod config;
pub mod database;
pub mod export;
pub mod model;
pub mod status;
pub mod store;
pub mod ui;
pub mod views;

pub use database::{LoadOutcome, MemoryStorage, Persistence, SqliteStorage, StorageError};
pub use model::{AppState, ContentItem, ContentStatus, NewProject, Platform, Project};
pub use store::Store;
