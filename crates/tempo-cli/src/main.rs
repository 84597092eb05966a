use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};

use tempo_core::alerts::AlertClassifier;
use tempo_core::domain::{AlertLevel, AlertStatus, Workspace};
use tempo_core::ports::{Clock, SystemClock};
use tempo_core::timeline::{
    AxisTick, PercentBar, TimelineAxis, TimelineBar, TimelineProjector, ViewMode, Zoom,
};
use tempo_core::{AlertFilter, DashboardSummarizer, EngineConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Timeline & alert derivation over a workspace snapshot", long_about = None)]
struct Cli {
    /// Workspace JSON file ({ projects, tasks, alerts })
    #[arg(long, value_name = "FILE")]
    workspace: PathBuf,

    /// Engine config JSON file; defaults apply to anything omitted
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Reference time (RFC 3339); defaults to the system clock
    #[arg(long, value_parser = parse_now)]
    now: Option<DateTime<Utc>>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan for alerts, then print the dashboard snapshot
    Dashboard,
    /// Print Gantt bars, board percentages and axis ticks
    Timeline {
        #[arg(long, default_value_t = 1.0)]
        zoom: f64,
        #[arg(long, value_enum, default_value_t = View::Week)]
        view: View,
    },
    /// Scan for alerts and print what changed
    ///
    /// Example: tempo --workspace ws.json scan --write
    Scan {
        /// Write the updated alerts back into the workspace file
        #[arg(long)]
        write: bool,
    },
    /// List alerts after a scan, newest first
    Alerts {
        #[arg(long, value_enum)]
        level: Option<Level>,
        #[arg(long, value_enum)]
        status: Option<Status>,
        #[arg(long)]
        search: Option<String>,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum View {
    Day,
    Week,
    Month,
}

impl From<View> for ViewMode {
    fn from(view: View) -> Self {
        match view {
            View::Day => ViewMode::Day,
            View::Week => ViewMode::Week,
            View::Month => ViewMode::Month,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Level {
    Low,
    Medium,
    High,
    Critical,
}

impl From<Level> for AlertLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Low => AlertLevel::Low,
            Level::Medium => AlertLevel::Medium,
            Level::High => AlertLevel::High,
            Level::Critical => AlertLevel::Critical,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Status {
    Active,
    Resolved,
    Dismissed,
}

impl From<Status> for AlertStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Active => AlertStatus::Active,
            Status::Resolved => AlertStatus::Resolved,
            Status::Dismissed => AlertStatus::Dismissed,
        }
    }
}

#[derive(Serialize)]
struct TimelineView {
    zoom: String,
    bars: Vec<TimelineBar>,
    board: Vec<PercentBar>,
    ticks: Vec<AxisTick>,
}

fn parse_now(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|err| format!("expected RFC 3339 time: {err}"))
}

fn load_workspace(path: &Path) -> Result<Workspace, Box<dyn Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| format!("{}: {}", path.display(), err))?;
    Ok(Workspace::from_json_str(&content)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let now = cli.now.unwrap_or_else(|| SystemClock.now());
    let mut workspace = load_workspace(&cli.workspace)?;
    log::debug!(
        "loaded {} projects, {} tasks, {} alerts",
        workspace.projects.len(),
        workspace.tasks.len(),
        workspace.alerts.len()
    );

    let classifier = AlertClassifier::with_thresholds(config.thresholds);

    match cli.command {
        Command::Dashboard => {
            classifier.scan_workspace(&mut workspace, now)?;
            let snapshot = DashboardSummarizer::new(&config).summarize(&workspace, now)?;
            print_json(&snapshot)
        }
        Command::Timeline { zoom, view } => {
            let zoom = Zoom::new(zoom)?;
            let projector = TimelineProjector::new(&config.timeline);
            let window_days = config.timeline.window_days;

            let mut bars = projector.project_all(&workspace.projects, zoom, now)?;
            bars.extend(projector.project_all(&workspace.tasks, zoom, now)?);
            let board = workspace
                .tasks
                .iter()
                .map(|task| projector.project_percent(task, window_days, now))
                .collect::<Result<Vec<_>, _>>()?;
            let ticks = TimelineAxis::new(projector.unit_per_day()).ticks(
                now,
                window_days,
                view.into(),
                zoom,
            )?;

            print_json(&TimelineView {
                zoom: zoom.percent_label(),
                bars,
                board,
                ticks,
            })
        }
        Command::Scan { write } => {
            let report = classifier.scan_workspace(&mut workspace, now)?;
            if write {
                std::fs::write(&cli.workspace, serde_json::to_string_pretty(&workspace)?)?;
                log::info!(
                    "wrote {} alerts to {}",
                    workspace.alerts.len(),
                    cli.workspace.display()
                );
            }
            print_json(&report)
        }
        Command::Alerts {
            level,
            status,
            search,
        } => {
            classifier.scan_workspace(&mut workspace, now)?;
            let filter = AlertFilter {
                level: level.map(Into::into),
                status: status.map(Into::into),
                search,
            };
            print_json(&filter.apply(&workspace.alerts))
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
