//! Read models computed from the state for the dashboard and planner screens.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::model::{AppState, ContentItem, ContentStatus, Project};

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectStats<'a> {
    pub total: usize,
    pub completed: usize,
    /// Rounded percentage of uploaded items, 0 for an empty project.
    pub progress: u32,
    pub todays_content: Vec<&'a ContentItem>,
    /// Past items that are neither uploaded nor scheduled.
    pub missed: usize,
}

pub fn project_stats<'a>(items: &[&'a ContentItem], today: NaiveDate) -> ProjectStats<'a> {
    let total = items.len();
    let completed = items
        .iter()
        .filter(|i| i.status == ContentStatus::Uploaded)
        .count();
    let progress = if total > 0 {
        ((completed as f64 / total as f64) * 100.0).round() as u32
    } else {
        0
    };
    let todays_content = items.iter().copied().filter(|i| i.date == today).collect();
    let missed = items
        .iter()
        .filter(|i| {
            i.date < today
                && i.status != ContentStatus::Uploaded
                && i.status != ContentStatus::Scheduled
        })
        .count();

    ProjectStats {
        total,
        completed,
        progress,
        todays_content,
        missed,
    }
}

/// Items across every project that are not uploaded yet.
pub fn pending_uploads(state: &AppState) -> usize {
    state
        .content_items
        .iter()
        .filter(|i| i.status != ContentStatus::Uploaded)
        .count()
}

pub struct DayGroup<'a> {
    pub day_index: u32,
    pub date: NaiveDate,
    pub items: Vec<&'a ContentItem>,
}

/// Groups a project's items by day index, ascending.
pub fn group_by_day<'a>(items: &[&'a ContentItem]) -> Vec<DayGroup<'a>> {
    let mut groups: BTreeMap<u32, DayGroup<'a>> = BTreeMap::new();
    for &item in items {
        groups
            .entry(item.day_index)
            .or_insert_with(|| DayGroup {
                day_index: item.day_index,
                date: item.date,
                items: vec![],
            })
            .items
            .push(item);
    }
    groups.into_values().collect()
}

/// Splits projects into (active, archived), keeping their order.
pub fn partition_projects(projects: &[Project]) -> (Vec<&Project>, Vec<&Project>) {
    projects.iter().partition(|p| !p.is_finished)
}
