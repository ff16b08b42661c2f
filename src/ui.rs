use chrono::NaiveDate;
use ratatui::{
    backend::Backend,
    layout::Rect,
    prelude::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Screen, Tab};
use crate::database::Persistence;
use crate::model::{ContentItem, ContentStatus, Project};
use crate::views;

pub fn status_color(status: ContentStatus) -> Color {
    match status {
        ContentStatus::Uploaded => Color::Green,
        ContentStatus::Scheduled => Color::Cyan,
        ContentStatus::Pending => Color::Yellow,
        ContentStatus::Planned => Color::Gray,
    }
}

pub fn draw<B: Backend, P: Persistence>(frame: &mut Frame<B>, app: &mut App<P>, today: NaiveDate) {
    match app.screen {
        Screen::Main => draw_main(frame, app, today),
        Screen::Editor => draw_editor(frame, app),
        Screen::CreateProject => draw_create_project(frame, app),
        Screen::Input(field) => draw_input(frame, field.title(), &app.input),
    }
}

fn draw_main<B: Backend, P: Persistence>(frame: &mut Frame<B>, app: &mut App<P>, today: NaiveDate) {
    let size = frame.size();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(1), Constraint::Min(5), Constraint::Length(1)].as_ref())
        .split(size);

    let pending = views::pending_uploads(app.store.state());
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Content Planner", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("  {}  ", today.format("%A, %B %-d, %Y"))),
            Span::styled(
                format!("{} Pending Uploads", pending),
                Style::default().fg(Color::LightRed),
            ),
        ])),
        rows[0],
    );

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Min(2)].as_ref())
        .split(rows[1]);

    draw_projects(frame, app, columns[0]);

    let project = app.active_project().cloned();
    match project {
        None => frame.render_widget(
            Paragraph::new(vec![
                Line::from("Welcome"),
                Line::from(""),
                Line::from("Plan, script and track your short-form videos."),
                Line::from("(N) Create a new project".green().italic()),
            ])
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
            columns[1],
        ),
        Some(project) => match app.tab {
            Tab::Dashboard => draw_dashboard(frame, app, &project, today, columns[1]),
            Tab::Planner => draw_planner(frame, app, columns[1]),
            Tab::Topics => draw_topics(frame, app, &project, columns[1]),
            Tab::References => draw_references(frame, app, &project, columns[1]),
        },
    }

    let footer = match &app.message {
        Some(message) => Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Yellow),
        )),
        None => Line::from(
            "(N) new project  (Tab) switch view  (h/l) focus  (j/k) move  (a) add  (D) delete  (x) backup  (q) quit"
                .dark_gray(),
        ),
    };
    frame.render_widget(Paragraph::new(footer), rows[2]);
}

fn draw_projects<B: Backend, P: Persistence>(frame: &mut Frame<B>, app: &mut App<P>, area: Rect) {
    let active_id = app.store.state().active_project_id;
    let items: Vec<_> = app
        .project_order()
        .iter()
        .map(|project| {
            let marker = if Some(project.id) == active_id { "* " } else { "  " };
            let style = if project.is_finished {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            let archived = if project.is_finished { " (archived)" } else { "" };
            ListItem::new(format!(
                "{}{} - {}{}",
                marker, project.name, project.platform, archived
            ))
            .style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().title("Projects").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().add_modifier(Modifier::ITALIC))
        .highlight_symbol(">>");

    frame.render_stateful_widget(list, area, &mut app.projects_state);
}

fn tab_title(tab: Tab) -> String {
    Tab::ALL
        .iter()
        .map(|t| {
            if *t == tab {
                format!("[{}]", t.title())
            } else {
                t.title().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn item_line(item: &ContentItem) -> ListItem<'static> {
    let scripted = if item.has_script() { " [scripted]" } else { "" };
    ListItem::new(format!(
        "{:<10} {} ({}/{} tasks){}",
        item.status.to_string(),
        item.title,
        item.completed_tasks(),
        item.tasks.len(),
        scripted
    ))
    .style(Style::default().fg(status_color(item.status)))
}

fn draw_dashboard<B: Backend, P: Persistence>(
    frame: &mut Frame<B>,
    app: &mut App<P>,
    project: &Project,
    today: NaiveDate,
    area: Rect,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(3)].as_ref())
        .split(area);

    let items = app.active_items();
    let stats = views::project_stats(&items, today);

    frame.render_widget(
        Gauge::default()
            .block(
                Block::default()
                    .title(format!("{} | {}", tab_title(app.tab), project.name))
                    .borders(Borders::ALL),
            )
            .gauge_style(Style::default().fg(Color::Blue))
            .percent(stats.progress.min(100) as u16)
            .label(format!("{}% complete", stats.progress)),
        chunks[0],
    );

    let mut summary = vec![
        Span::raw(format!(
            "{}/{} uploaded  {} - {}  {} per day",
            stats.completed, stats.total, project.start_date, project.end_date, project.videos_per_day
        )),
    ];
    if stats.missed > 0 {
        summary.push(Span::styled(
            format!("  {} missed", stats.missed),
            Style::default().fg(Color::Red),
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(summary)).block(Block::default().borders(Borders::ALL)),
        chunks[1],
    );

    let list_items: Vec<_> = stats.todays_content.iter().map(|i| item_line(i)).collect();
    let title = if list_items.is_empty() {
        "Today's Plan (nothing scheduled today)"
    } else {
        "Today's Plan"
    };
    let list = List::new(list_items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::ITALIC))
        .highlight_symbol(">>");
    frame.render_stateful_widget(list, chunks[2], &mut app.entries_state);
}

fn draw_planner<B: Backend, P: Persistence>(frame: &mut Frame<B>, app: &mut App<P>, area: Rect) {
    let items = app.active_items();
    let list_items: Vec<_> = views::group_by_day(&items)
        .iter()
        .flat_map(|group| {
            let label = format!("Day {} {}", group.day_index, group.date.format("%b %-d"));
            group.items.iter().map(move |item| {
                ListItem::new(format!(
                    "{:<14} {:<10} {} ({}/{})",
                    label,
                    item.status.to_string(),
                    item.title,
                    item.completed_tasks(),
                    item.tasks.len()
                ))
                .style(Style::default().fg(status_color(item.status)))
            })
        })
        .collect();

    let list = List::new(list_items)
        .block(Block::default().title(tab_title(app.tab)).borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::ITALIC))
        .highlight_symbol(">>");
    frame.render_stateful_widget(list, area, &mut app.entries_state);
}

fn draw_topics<B: Backend, P: Persistence>(
    frame: &mut Frame<B>,
    app: &mut App<P>,
    project: &Project,
    area: Rect,
) {
    let items: Vec<_> = project
        .future_topics
        .iter()
        .map(|topic| {
            ListItem::new(format!(
                "{}  (added {})",
                topic.text,
                topic.date_added.format("%Y-%m-%d")
            ))
        })
        .collect();
    let title = if items.is_empty() {
        format!("{} | no topics yet, (a) to add one", tab_title(app.tab))
    } else {
        tab_title(app.tab)
    };
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::ITALIC))
        .highlight_symbol(">>");
    frame.render_stateful_widget(list, area, &mut app.entries_state);
}

fn draw_references<B: Backend, P: Persistence>(
    frame: &mut Frame<B>,
    app: &mut App<P>,
    project: &Project,
    area: Rect,
) {
    let items: Vec<_> = project
        .references
        .iter()
        .map(|r| ListItem::new(format!("{}  <{}>", r.title, r.url)))
        .collect();
    let list = List::new(items)
        .block(Block::default().title(tab_title(app.tab)).borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::ITALIC))
        .highlight_symbol(">>");
    frame.render_stateful_widget(list, area, &mut app.entries_state);
}

fn draw_editor<B: Backend, P: Persistence>(frame: &mut Frame<B>, app: &App<P>) {
    let Some(item) = app.selected_content() else {
        return;
    };
    let size = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(6),
                Constraint::Min(4),
                Constraint::Length(3),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(size);

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(item.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("  Day {}  {}  ", item.day_index, item.date)),
            Span::styled(
                item.status.to_string(),
                Style::default().fg(status_color(item.status)),
            ),
        ]))
        .block(
            Block::default()
                .title("Video")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        ),
        chunks[0],
    );

    let tasks: Vec<_> = item
        .tasks
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let line = format!(
                "({}) {} {}",
                i + 1,
                match task.is_completed {
                    true => "[x]",
                    false => "[ ]",
                },
                task.label.label()
            );
            match task.is_completed {
                true => Line::from(Span::styled(line, Style::default().fg(Color::Green))),
                false => Line::from(line),
            }
        })
        .collect();
    frame.render_widget(
        Paragraph::new(tasks).block(
            Block::default()
                .title("Checklist")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        ),
        chunks[1],
    );

    frame.render_widget(
        Paragraph::new(item.script.clone())
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title("Script")
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded),
            ),
        chunks[2],
    );

    let upload = match (&item.video_url, item.upload_date) {
        (Some(url), Some(date)) => format!("{} (uploaded {})", url, date),
        (Some(url), None) => url.clone(),
        (None, Some(date)) => format!("uploaded {}", date),
        (None, None) => String::new(),
    };
    frame.render_widget(
        Paragraph::new(upload).block(
            Block::default()
                .title("Video URL")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        ),
        chunks[3],
    );

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw("(1-4) toggle task  (t) title  (e) script  (u) url  "),
            "(s) mark scheduled  ".cyan(),
            "(U) mark uploaded  ".green(),
            "(q) back".red(),
        ]))
        .alignment(Alignment::Center),
        chunks[4],
    );
}

fn draw_create_project<B: Backend, P: Persistence>(frame: &mut Frame<B>, app: &App<P>) {
    let size = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(2),
                Constraint::Length(8),
                Constraint::Length(8),
                Constraint::Min(1),
            ]
            .as_ref(),
        )
        .split(size);

    let draft = &app.draft;
    let days = crate::calendar::day_count(draft.start_date, draft.end_date);

    let text = vec![
        Line::from("(n) Input name"),
        Line::from("(p) Next platform"),
        Line::from("(s) Input start date   (e) Input end date"),
        Line::from("(+/-) Videos per day"),
        Line::from("(Enter) Create project".green().italic()),
        Line::from("(q) Cancel".red()),
    ];

    frame.render_widget(
        Paragraph::new("New project")
            .style(Style::default())
            .alignment(Alignment::Center),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(text)
            .style(Style::default())
            .alignment(Alignment::Center),
        chunks[1],
    );

    let fields = vec![
        Line::from(format!("Name:           {}", draft.name)),
        Line::from(format!("Platform:       {}", draft.platform)),
        Line::from(format!("Start date:     {}", draft.start_date)),
        Line::from(format!("End date:       {}", draft.end_date)),
        Line::from(format!("Videos per day: {}", draft.videos_per_day)),
        Line::from(format!(
            "Total:          {} videos over {} days",
            days as u64 * draft.videos_per_day as u64,
            days
        )),
    ];
    frame.render_widget(
        Paragraph::new(fields).block(
            Block::default()
                .title("Project")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        ),
        chunks[2],
    );

    if let Some(message) = &app.message {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                message.clone(),
                Style::default().fg(Color::Red),
            )))
            .alignment(Alignment::Center),
            chunks[3],
        );
    }
}

fn draw_input<B: Backend>(frame: &mut Frame<B>, title: &str, input: &str) {
    let size = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Min(0),
            ]
            .as_ref(),
        )
        .split(size);

    frame.render_widget(
        Paragraph::new(title.to_string())
            .style(Style::default())
            .alignment(Alignment::Center),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(input.to_string())
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(title.to_string())
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded),
            )
            .style(Style::default())
            .alignment(Alignment::Center),
        chunks[1],
    );
}
