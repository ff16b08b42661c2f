use std::{
    error::Error,
    fs::OpenOptions,
    io::{self, Stdout},
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use content_tui::{
    app::App,
    config::{default_data_dir, Config, CONFIG_FILE_NAME},
    export, ui, views, LoadOutcome, NewProject, Platform, SqliteStorage, Store,
};

#[derive(Parser)]
#[command(name = "content-tui")]
#[command(about = "Plan, script and track short-form video projects")]
struct Cli {
    /// Directory holding the database, log and config
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Config file (defaults to <DATA_DIR>/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List projects with their progress
    List,
    /// Create a project and generate its content calendar
    New {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "YouTube Shorts")]
        platform: Platform,
        /// First day, YYYY-MM-DD
        #[arg(long)]
        start: NaiveDate,
        /// Last day (inclusive), YYYY-MM-DD
        #[arg(long)]
        end: NaiveDate,
        #[arg(long, default_value_t = 1)]
        per_day: u32,
    },
    /// Write a dated JSON backup of all data
    Export {
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Archive projects whose end date has passed
    Sweep,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let base_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => default_data_dir()?,
    };
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| base_dir.join(CONFIG_FILE_NAME));
    let config = Config::load(&config_path)?;
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => config.data_dir()?,
    };

    init_tracing(&data_dir, &config.log_level)?;

    let today = Local::now().date_naive();
    let (mut store, outcome) = Store::load(SqliteStorage::open(&data_dir)?, today)?;
    if let LoadOutcome::Recovered { reason } = &outcome {
        eprintln!("Warning: saved data was unreadable ({}), starting empty", reason);
    }

    match cli.command {
        None => {
            let mut app = App::new(store, &config, today);
            if matches!(outcome, LoadOutcome::Recovered { .. }) {
                app.message =
                    Some("Saved data was unreadable; started empty (old data kept aside)".to_string());
            }
            let tick_rate = Duration::from_millis(config.tick_rate_ms);
            in_alternate_screen(|terminal| run(terminal, &mut app, tick_rate))?;
        }
        Some(Command::List) => list_projects(&store, today),
        Some(Command::New {
            name,
            platform,
            start,
            end,
            per_day,
        }) => {
            let draft = NewProject {
                name,
                platform,
                start_date: start,
                end_date: end,
                videos_per_day: per_day,
            };
            draft.validate()?;
            let project = store.create_project(draft)?;
            let items = store.state().items_for(project.id).len();
            println!("Created \"{}\" with {} videos ({})", project.name, items, project.id);
        }
        Some(Command::Export { out }) => {
            let dir = out.unwrap_or_else(|| config.export_dir());
            let path = export::export_state(store.state(), &dir, today)?;
            println!("Backup written to {}", path.display());
        }
        Some(Command::Sweep) => {
            let archived = store.archived_on_load() + store.run_archival_sweep(today)?;
            let finished = store.state().projects.iter().filter(|p| p.is_finished).count();
            println!("{} archived now, {} archived in total", archived, finished);
        }
    }

    Ok(())
}

fn init_tracing(data_dir: &Path, level: &str) -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all(data_dir)?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("content-tui.log"))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn list_projects(store: &Store<SqliteStorage>, today: NaiveDate) {
    let state = store.state();
    let (active, archived) = views::partition_projects(&state.projects);
    for (heading, projects) in [("Active", active), ("Archive", archived)] {
        if projects.is_empty() {
            continue;
        }
        println!("{}:", heading);
        for project in projects {
            let items = state.items_for(project.id);
            let stats = views::project_stats(&items, today);
            println!(
                "  {} [{}] {} - {}  {}/{} uploaded ({}%){}",
                project.name,
                project.platform,
                project.start_date,
                project.end_date,
                stats.completed,
                stats.total,
                stats.progress,
                if stats.missed > 0 {
                    format!(", {} missed", stats.missed)
                } else {
                    String::new()
                }
            );
        }
    }
    println!("{} pending uploads", views::pending_uploads(state));
}

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Runs `body` with the terminal in raw mode on the alternate screen. The
/// terminal is restored even when `body` fails.
fn in_alternate_screen(
    body: impl FnOnce(&mut Tui) -> Result<(), Box<dyn Error>>,
) -> Result<(), Box<dyn Error>> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let outcome = body(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    outcome
}

fn run(
    terminal: &mut Tui,
    app: &mut App<SqliteStorage>,
    tick_rate: Duration,
) -> Result<(), Box<dyn Error>> {
    info!("tui started");
    loop {
        let today = Local::now().date_naive();
        if let Err(e) = app.tick(today) {
            error!(error = %e, "archival sweep failed");
            app.message = Some(format!("Save failed: {}", e));
        }

        terminal.draw(|frame| ui::draw(frame, app, today))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match app.handle_key(key.code, today) {
                    Ok(true) => break,
                    Ok(false) => {}
                    Err(e) => {
                        error!(error = %e, "saving state failed");
                        app.message = Some(format!("Save failed: {}", e));
                    }
                }
            }
        }
    }
    Ok(())
}
