use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "YouTube Shorts")]
    YouTubeShorts,
    #[serde(rename = "Instagram Reels")]
    InstagramReels,
    #[serde(rename = "TikTok")]
    TikTok,
}

impl Platform {
    pub const ALL: [Platform; 3] = [
        Platform::YouTubeShorts,
        Platform::InstagramReels,
        Platform::TikTok,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Platform::YouTubeShorts => "YouTube Shorts",
            Platform::InstagramReels => "Instagram Reels",
            Platform::TikTok => "TikTok",
        }
    }

    pub fn next(&self) -> Platform {
        match self {
            Platform::YouTubeShorts => Platform::InstagramReels,
            Platform::InstagramReels => Platform::TikTok,
            Platform::TikTok => Platform::YouTubeShorts,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Platform {
    type Err = ValidationError;

    /// Accepts the display label or a loose spelling ("youtube", "reels", "tiktok").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "youtubeshorts" | "youtube" | "shorts" => Ok(Platform::YouTubeShorts),
            "instagramreels" | "instagram" | "reels" => Ok(Platform::InstagramReels),
            "tiktok" => Ok(Platform::TikTok),
            _ => Err(ValidationError::UnknownPlatform(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentStatus {
    Planned,
    Pending,
    Scheduled,
    Uploaded,
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ContentStatus::Planned => "Planned",
            ContentStatus::Pending => "Pending",
            ContentStatus::Scheduled => "Scheduled",
            ContentStatus::Uploaded => "Uploaded",
        };
        f.write_str(label)
    }
}

/// Where the current `status` of a content item came from.
///
/// `Manual` marks a status set by an explicit status action; derivation from
/// tasks is skipped until task completion changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusMode {
    #[default]
    Derived,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskLabel {
    #[serde(rename = "Write Script")]
    WriteScript,
    #[serde(rename = "Record Video")]
    RecordVideo,
    #[serde(rename = "Edit Video")]
    EditVideo,
    #[serde(rename = "Upload Video")]
    UploadVideo,
}

impl TaskLabel {
    pub const ALL: [TaskLabel; 4] = [
        TaskLabel::WriteScript,
        TaskLabel::RecordVideo,
        TaskLabel::EditVideo,
        TaskLabel::UploadVideo,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TaskLabel::WriteScript => "Write Script",
            TaskLabel::RecordVideo => "Record Video",
            TaskLabel::EditVideo => "Edit Video",
            TaskLabel::UploadVideo => "Upload Video",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub label: TaskLabel,
    pub is_completed: bool,
}

impl Task {
    /// The fixed checklist every content item starts with, all incomplete.
    pub fn default_checklist() -> Vec<Task> {
        TaskLabel::ALL
            .iter()
            .enumerate()
            .map(|(i, label)| Task {
                id: format!("t{}", i + 1),
                label: *label,
                is_completed: false,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub id: Uuid,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: Uuid,
    pub text: String,
    pub date_added: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub platform: Platform,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub videos_per_day: u32,
    pub is_finished: bool,
    pub references: Vec<Reference>,
    pub future_topics: Vec<Topic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: Uuid,
    pub project_id: Uuid,
    pub day_index: u32,
    pub date: NaiveDate,
    pub title: String,
    pub script: String,
    pub tasks: Vec<Task>,
    pub status: ContentStatus,
    #[serde(default)]
    pub status_mode: StatusMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<NaiveDate>,
}

impl ContentItem {
    pub fn task(&self, label: TaskLabel) -> Option<&Task> {
        self.tasks.iter().find(|t| t.label == label)
    }

    pub fn completed_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_completed).count()
    }

    pub fn has_script(&self) -> bool {
        !self.script.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub projects: Vec<Project>,
    pub content_items: Vec<ContentItem>,
    pub active_project_id: Option<Uuid>,
}

impl AppState {
    pub fn project(&self, id: Uuid) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn active_project(&self) -> Option<&Project> {
        self.active_project_id.and_then(|id| self.project(id))
    }

    pub fn content_item(&self, id: Uuid) -> Option<&ContentItem> {
        self.content_items.iter().find(|i| i.id == id)
    }

    pub fn items_for(&self, project_id: Uuid) -> Vec<&ContentItem> {
        self.content_items
            .iter()
            .filter(|i| i.project_id == project_id)
            .collect()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("project name must not be blank")]
    BlankName,
    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("videos per day must be between 1 and {max}, got {got}")]
    VideosPerDayOutOfRange { got: u32, max: u32 },
    #[error("unknown platform: {0}")]
    UnknownPlatform(String),
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// Input for project creation, as collected by the form layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub platform: Platform,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub videos_per_day: u32,
}

pub const MAX_VIDEOS_PER_DAY: u32 = 5;

/// Upper bound for the configured default project length.
pub const MAX_DEFAULT_PROJECT_DAYS: u32 = 3650;

impl NewProject {
    /// Form defaults: starts today and runs `days` more days. The end date
    /// saturates at the last representable date.
    pub fn with_defaults(today: NaiveDate, days: u32, videos_per_day: u32) -> Self {
        NewProject {
            name: String::new(),
            platform: Platform::YouTubeShorts,
            start_date: today,
            end_date: today
                .checked_add_days(Days::new(days as u64))
                .unwrap_or(NaiveDate::MAX),
            videos_per_day,
        }
    }

    /// Form-layer checks. The store itself trusts its input.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankName);
        }
        if self.end_date < self.start_date {
            return Err(ValidationError::EndBeforeStart {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if self.videos_per_day == 0 || self.videos_per_day > MAX_VIDEOS_PER_DAY {
            return Err(ValidationError::VideosPerDayOutOfRange {
                got: self.videos_per_day,
                max: MAX_VIDEOS_PER_DAY,
            });
        }
        Ok(())
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}
