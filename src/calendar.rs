use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::model::{ContentItem, ContentStatus, StatusMode, Task};

/// Inclusive number of days between `start` and `end`. Zero when `end` is
/// before `start`.
pub fn day_count(start: NaiveDate, end: NaiveDate) -> u32 {
    let diff = (end - start).num_days();
    if diff < 0 {
        0
    } else {
        (diff + 1) as u32
    }
}

/// Builds the content backlog for a project: `videos_per_day` items for every
/// day of the inclusive range, titled `Video #n` with `n` running across the
/// whole project.
pub fn generate(
    start: NaiveDate,
    end: NaiveDate,
    videos_per_day: u32,
    project_id: Uuid,
) -> Vec<ContentItem> {
    let days = day_count(start, end);
    let mut items = Vec::with_capacity(days as usize * videos_per_day as usize);

    for day_index in 1..=days {
        let date = start + Duration::days((day_index - 1) as i64);
        for _ in 0..videos_per_day {
            items.push(ContentItem {
                id: Uuid::new_v4(),
                project_id,
                day_index,
                date,
                title: format!("Video #{}", items.len() + 1),
                script: String::new(),
                tasks: Task::default_checklist(),
                status: ContentStatus::Planned,
                status_mode: StatusMode::Derived,
                video_url: None,
                upload_date: None,
            });
        }
    }

    items
}
