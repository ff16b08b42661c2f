use std::{cmp::min, path::PathBuf};

use chrono::NaiveDate;
use crossterm::event::KeyCode;
use ratatui::widgets::ListState;
use tracing::warn;
use uuid::Uuid;

use crate::config::Config;
use crate::database::{Persistence, StorageResult};
use crate::export;
use crate::model::{parse_date, ContentItem, ContentStatus, NewProject, Project, MAX_VIDEOS_PER_DAY};
use crate::store::Store;
use crate::views;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InputField {
    ProjectName,
    StartDate,
    EndDate,
    ItemTitle,
    Script,
    VideoUrl,
    Topic,
    ReferenceTitle,
    ReferenceUrl,
}

impl InputField {
    pub fn title(&self) -> &'static str {
        match self {
            InputField::ProjectName => "Project name",
            InputField::StartDate => "Start date (YYYY-MM-DD)",
            InputField::EndDate => "End date (YYYY-MM-DD)",
            InputField::ItemTitle => "Video title",
            InputField::Script => "Script",
            InputField::VideoUrl => "Video URL",
            InputField::Topic => "New topic",
            InputField::ReferenceTitle => "Reference title",
            InputField::ReferenceUrl => "Reference URL",
        }
    }

    fn return_screen(&self) -> Screen {
        match self {
            InputField::ProjectName | InputField::StartDate | InputField::EndDate => {
                Screen::CreateProject
            }
            InputField::ItemTitle | InputField::Script | InputField::VideoUrl => Screen::Editor,
            InputField::Topic | InputField::ReferenceTitle | InputField::ReferenceUrl => {
                Screen::Main
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Planner,
    Topics,
    References,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Dashboard, Tab::Planner, Tab::Topics, Tab::References];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Planner => "Content Planner",
            Tab::Topics => "Future Topics",
            Tab::References => "References",
        }
    }

    fn next(&self) -> Tab {
        match self {
            Tab::Dashboard => Tab::Planner,
            Tab::Planner => Tab::Topics,
            Tab::Topics => Tab::References,
            Tab::References => Tab::Dashboard,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Screen {
    Main,
    Editor,
    CreateProject,
    Input(InputField),
}

pub struct App<P: Persistence> {
    pub store: Store<P>,
    pub screen: Screen,
    pub tab: Tab,
    pub input: String,
    pub draft: NewProject,
    pub reference_title: String,
    pub projects_state: ListState,
    pub entries_state: ListState,
    pub selecting_list: bool,
    pub selected_item: Option<Uuid>,
    pub message: Option<String>,
    export_dir: PathBuf,
    default_project_days: u32,
    default_videos_per_day: u32,
}

impl<P: Persistence> App<P> {
    pub fn new(store: Store<P>, config: &Config, today: NaiveDate) -> Self {
        let mut app = App {
            store,
            screen: Screen::Main,
            tab: Tab::Dashboard,
            input: String::new(),
            draft: NewProject::with_defaults(
                today,
                config.default_project_days,
                config.default_videos_per_day,
            ),
            reference_title: String::new(),
            projects_state: ListState::default(),
            entries_state: ListState::default(),
            selecting_list: true,
            selected_item: None,
            message: None,
            export_dir: config.export_dir(),
            default_project_days: config.default_project_days,
            default_videos_per_day: config.default_videos_per_day,
        };
        app.sync_project_selection();
        app
    }

    /// Active projects first, then archived ones.
    pub fn project_order(&self) -> Vec<&Project> {
        let (active, archived) = views::partition_projects(&self.store.state().projects);
        active.into_iter().chain(archived).collect()
    }

    pub fn active_project(&self) -> Option<&Project> {
        self.store.state().active_project()
    }

    pub fn active_items(&self) -> Vec<&ContentItem> {
        match self.store.state().active_project_id {
            Some(id) => self.store.state().items_for(id),
            None => vec![],
        }
    }

    pub fn selected_content(&self) -> Option<&ContentItem> {
        self.selected_item
            .and_then(|id| self.store.state().content_item(id))
    }

    /// Content item ids listed in the right pane for the current tab.
    pub fn listed_items(&self, today: NaiveDate) -> Vec<Uuid> {
        let items = self.active_items();
        match self.tab {
            Tab::Dashboard => views::project_stats(&items, today)
                .todays_content
                .iter()
                .map(|i| i.id)
                .collect(),
            Tab::Planner => views::group_by_day(&items)
                .iter()
                .flat_map(|g| g.items.iter().map(|i| i.id))
                .collect(),
            Tab::Topics | Tab::References => vec![],
        }
    }

    fn entries_len(&self, today: NaiveDate) -> usize {
        match self.tab {
            Tab::Dashboard | Tab::Planner => self.listed_items(today).len(),
            Tab::Topics => self.active_project().map_or(0, |p| p.future_topics.len()),
            Tab::References => self.active_project().map_or(0, |p| p.references.len()),
        }
    }

    fn sync_project_selection(&mut self) {
        let active = self.store.state().active_project_id;
        let index = active.and_then(|id| self.project_order().iter().position(|p| p.id == id));
        self.projects_state.select(index);
    }

    /// Handles one key press. Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyCode, today: NaiveDate) -> StorageResult<bool> {
        match self.screen {
            Screen::Main => return self.handle_main(key, today),
            Screen::Editor => self.handle_editor(key, today)?,
            Screen::CreateProject => self.handle_create(key)?,
            Screen::Input(field) => self.handle_input(key, field)?,
        }
        Ok(false)
    }

    fn handle_main(&mut self, key: KeyCode, today: NaiveDate) -> StorageResult<bool> {
        match key {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('N') => {
                self.draft = NewProject::with_defaults(
                    today,
                    self.default_project_days,
                    self.default_videos_per_day,
                );
                self.message = None;
                self.screen = Screen::CreateProject;
            }
            KeyCode::Tab => {
                self.tab = self.tab.next();
                self.entries_state.select(None);
                if !self.selecting_list && self.entries_len(today) > 0 {
                    self.entries_state.select(Some(0));
                }
            }
            KeyCode::Char('x') => self.export(today),
            KeyCode::Char('j') => self.move_selection(true, today),
            KeyCode::Char('k') => self.move_selection(false, today),
            KeyCode::Char('h') => {
                if !self.selecting_list {
                    self.selecting_list = true;
                    self.entries_state.select(None);
                }
            }
            KeyCode::Char('l') | KeyCode::Enter | KeyCode::Char(' ') => match self.selecting_list {
                true => {
                    let chosen = self
                        .projects_state
                        .selected()
                        .and_then(|i| self.project_order().get(i).map(|p| p.id));
                    if let Some(id) = chosen {
                        self.store.set_active_project(id)?;
                        self.sync_project_selection();
                        self.selected_item = None;
                        self.selecting_list = false;
                        if self.entries_len(today) > 0 {
                            self.entries_state.select(Some(0));
                        }
                    }
                }
                false => self.open_entry(today),
            },
            KeyCode::Char('a') => match self.tab {
                Tab::Topics if self.active_project().is_some() => {
                    self.begin_input(InputField::Topic, String::new())
                }
                Tab::References if self.active_project().is_some() => {
                    self.begin_input(InputField::ReferenceTitle, String::new())
                }
                _ => {}
            },
            KeyCode::Char('D') => {
                if !self.selecting_list {
                    self.delete_entry()?;
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn open_entry(&mut self, today: NaiveDate) {
        if !matches!(self.tab, Tab::Dashboard | Tab::Planner) {
            return;
        }
        let listed = self.listed_items(today);
        if let Some(id) = self.entries_state.selected().and_then(|i| listed.get(i)) {
            self.selected_item = Some(*id);
            self.screen = Screen::Editor;
        }
    }

    fn delete_entry(&mut self) -> StorageResult<()> {
        let Some(project) = self.active_project() else {
            return Ok(());
        };
        let project_id = project.id;
        let Some(index) = self.entries_state.selected() else {
            return Ok(());
        };
        match self.tab {
            Tab::Topics => {
                if let Some(topic) = project.future_topics.get(index) {
                    let topic_id = topic.id;
                    self.store.remove_topic(project_id, topic_id)?;
                }
            }
            Tab::References => {
                if let Some(reference) = project.references.get(index) {
                    let reference_id = reference.id;
                    self.store.remove_reference(project_id, reference_id)?;
                }
            }
            Tab::Dashboard | Tab::Planner => return Ok(()),
        }
        let len = match self.tab {
            Tab::Topics => self.active_project().map_or(0, |p| p.future_topics.len()),
            _ => self.active_project().map_or(0, |p| p.references.len()),
        };
        self.entries_state
            .select(if len == 0 { None } else { Some(min(index, len - 1)) });
        Ok(())
    }

    fn handle_editor(&mut self, key: KeyCode, today: NaiveDate) -> StorageResult<()> {
        let Some(item) = self.selected_content() else {
            self.screen = Screen::Main;
            return Ok(());
        };
        let id = item.id;
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.screen = Screen::Main,
            KeyCode::Char(c @ '1'..='4') => {
                let task_id = item
                    .tasks
                    .get((c as u8 - b'1') as usize)
                    .map(|t| t.id.clone());
                if let Some(task_id) = task_id {
                    self.store.toggle_task(id, &task_id)?;
                }
            }
            KeyCode::Char('t') => {
                let title = item.title.clone();
                self.begin_input(InputField::ItemTitle, title);
            }
            KeyCode::Char('e') => {
                let script = item.script.clone();
                self.begin_input(InputField::Script, script);
            }
            KeyCode::Char('u') => {
                let url = item.video_url.clone().unwrap_or_default();
                self.begin_input(InputField::VideoUrl, url);
            }
            KeyCode::Char('s') => {
                self.store
                    .set_content_status(id, ContentStatus::Scheduled, today)?;
            }
            KeyCode::Char('U') => {
                self.store
                    .set_content_status(id, ContentStatus::Uploaded, today)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_create(&mut self, key: KeyCode) -> StorageResult<()> {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.message = None;
                self.screen = Screen::Main;
            }
            KeyCode::Char('n') => {
                let name = self.draft.name.clone();
                self.begin_input(InputField::ProjectName, name);
            }
            KeyCode::Char('p') => self.draft.platform = self.draft.platform.next(),
            KeyCode::Char('s') => {
                let start = self.draft.start_date.to_string();
                self.begin_input(InputField::StartDate, start);
            }
            KeyCode::Char('e') => {
                let end = self.draft.end_date.to_string();
                self.begin_input(InputField::EndDate, end);
            }
            KeyCode::Char('+') => {
                self.draft.videos_per_day = min(self.draft.videos_per_day + 1, MAX_VIDEOS_PER_DAY)
            }
            KeyCode::Char('-') => {
                self.draft.videos_per_day = self.draft.videos_per_day.saturating_sub(1).max(1)
            }
            KeyCode::Enter => match self.draft.validate() {
                Ok(()) => {
                    let project = self.store.create_project(self.draft.clone())?;
                    self.message = Some(format!("Created \"{}\"", project.name));
                    self.tab = Tab::Dashboard;
                    self.selected_item = None;
                    self.sync_project_selection();
                    self.screen = Screen::Main;
                }
                Err(e) => self.message = Some(e.to_string()),
            },
            _ => {}
        }
        Ok(())
    }

    fn begin_input(&mut self, field: InputField, initial: String) {
        self.input = initial;
        self.screen = Screen::Input(field);
    }

    fn handle_input(&mut self, key: KeyCode, field: InputField) -> StorageResult<()> {
        match key {
            KeyCode::Char(c) => self.input.push(c),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Esc => {
                self.input.clear();
                self.screen = field.return_screen();
            }
            KeyCode::Enter => {
                let value = std::mem::take(&mut self.input);
                self.screen = field.return_screen();
                self.commit_input(field, value)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn commit_input(&mut self, field: InputField, value: String) -> StorageResult<()> {
        let item_id = self.selected_item;
        let project_id = self.store.state().active_project_id;
        match field {
            InputField::ProjectName => self.draft.name = value,
            InputField::StartDate | InputField::EndDate => match parse_date(&value) {
                Ok(date) if field == InputField::StartDate => self.draft.start_date = date,
                Ok(date) => self.draft.end_date = date,
                Err(e) => self.message = Some(e.to_string()),
            },
            InputField::ItemTitle => {
                if let Some(id) = item_id {
                    self.store.set_title(id, value)?;
                }
            }
            InputField::Script => {
                if let Some(id) = item_id {
                    self.store.set_script(id, value)?;
                }
            }
            InputField::VideoUrl => {
                if let Some(id) = item_id {
                    self.store.set_video_url(id, value)?;
                }
            }
            InputField::Topic => {
                if let Some(id) = project_id {
                    self.store.add_topic(id, &value)?;
                }
            }
            InputField::ReferenceTitle => {
                self.reference_title = value;
                self.begin_input(InputField::ReferenceUrl, String::new());
            }
            InputField::ReferenceUrl => {
                let title = std::mem::take(&mut self.reference_title);
                if let Some(id) = project_id {
                    self.store.add_reference(id, &title, &value)?;
                }
            }
        }
        Ok(())
    }

    fn move_selection(&mut self, forward: bool, today: NaiveDate) {
        if self.selecting_list {
            let len = self.project_order().len();
            step(&mut self.projects_state, len, forward);
        } else {
            let len = self.entries_len(today);
            step(&mut self.entries_state, len, forward);
        }
    }

    fn export(&mut self, today: NaiveDate) {
        self.message = Some(
            match export::export_state(self.store.state(), &self.export_dir, today) {
                Ok(path) => format!("Backup written to {}", path.display()),
                Err(e) => {
                    warn!(error = %e, "export failed");
                    format!("Export failed: {}", e)
                }
            },
        );
    }

    /// Periodic archival check; keeps the project selection pointing at the
    /// same project after it moves to the archive.
    pub fn tick(&mut self, today: NaiveDate) -> StorageResult<()> {
        if self.store.run_archival_sweep(today)? > 0 {
            self.sync_project_selection();
        }
        Ok(())
    }
}

/// Moves the selection one row, clamped to `0..len`. An empty selection
/// lands on the first row.
fn step(state: &mut ListState, len: usize, forward: bool) {
    let next = match (state.selected(), len) {
        (_, 0) => None,
        (None, _) => Some(0),
        (Some(i), _) if forward => Some(min(i + 1, len - 1)),
        (Some(i), _) => Some(min(i, len).saturating_sub(1)),
    };
    state.select(next);
}
