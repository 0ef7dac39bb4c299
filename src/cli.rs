use std::{io, path::PathBuf};

use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use itertools::Itertools;
use ratatui::prelude::Line;
use serde::Serialize;
use thiserror::Error;

use crate::{
    app::{self, UiOptions},
    calendar::{ContributionsGrid, day_of_week, format_date, today_utc},
    domain::{ProcessedActivities, ProcessedActivity, level_for_aggregate, process},
    storage,
    view::{self, CellSource, GlyphMode, Timeline},
};

#[derive(Parser, Debug)]
#[command(name = "tessera")]
#[command(about = "Contribution grids for your daily activities", long_about = None)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to the activities JSON file")]
    pub data: Option<PathBuf>,

    #[arg(
        long,
        short,
        global = true,
        value_enum,
        default_value = "12m",
        help = "Timeline to display"
    )]
    pub timeline: Timeline,

    #[arg(long, global = true, help = "Hide the level legend")]
    pub no_legend: bool,

    #[arg(long, global = true, value_enum, help = "Glyph set for grid cells")]
    pub glyphs: Option<GlyphMode>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(about = "List all activities with statistics")]
    List,

    #[command(about = "Show detailed statistics for an activity")]
    Stats {
        #[arg(help = "Activity key")]
        key: String,
    },

    #[command(about = "Print grids without entering the interactive view")]
    Grid {
        #[arg(help = "Activity key; all activities when omitted")]
        key: Option<String>,
    },

    #[command(about = "Export per-day levels for the current timeline")]
    Export {
        #[arg(long, value_enum, help = "Export format")]
        format: ExportFormat,

        #[arg(long, short, help = "Output path")]
        out: Option<PathBuf>,
    },

    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(help = "Shell type (bash, zsh, fish)")]
        shell: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("activity '{0}' does not exist")]
    UnknownActivity(String),
    #[error("unsupported shell: {0}. Use bash, zsh, or fish.")]
    UnsupportedShell(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("refusing to overwrite the activities file {0}")]
    OutputIsDataFile(PathBuf),
    #[error("could not finish CSV output: {0}")]
    CsvFlush(String),
}

/// Everything a command needs, loaded once.
pub struct Snapshot {
    pub data_path: PathBuf,
    pub today: NaiveDate,
    pub activities: ProcessedActivities,
    pub grid: ContributionsGrid,
}

impl Snapshot {
    pub fn load(data: Option<PathBuf>, timeline: Timeline, today: NaiveDate) -> Self {
        let data_path = storage::resolve_data_path(data);
        let raw = storage::load_activities_or_default(&data_path);
        Self::from_parts(data_path, process(&raw), timeline, today)
    }

    pub fn from_parts(
        data_path: PathBuf,
        activities: ProcessedActivities,
        timeline: Timeline,
        today: NaiveDate,
    ) -> Self {
        Self {
            data_path,
            today,
            activities,
            grid: timeline.grid(today),
        }
    }

    pub fn rebuild_grid(&mut self, timeline: Timeline) {
        self.grid = timeline.grid(self.today);
    }

    fn activity(&self, key: &str) -> Result<&ProcessedActivity, CliError> {
        self.activities
            .get(key)
            .ok_or_else(|| CliError::UnknownActivity(key.to_string()))
    }
}

pub fn list_activities(snapshot: &Snapshot) -> String {
    if snapshot.activities.is_empty() {
        return format!(
            "No activities found. Please check {}",
            snapshot.data_path.display()
        );
    }

    let mut out = String::from("Your Activities:\n================\n");
    for (i, (key, activity)) in snapshot.activities.iter().enumerate() {
        let stats = activity.stats(snapshot.today);
        out.push_str(&format!(
            "\n[{}] {} ({})\n",
            i + 1,
            activity.name,
            activity.color.as_deref().unwrap_or("default")
        ));
        out.push_str(&format!("    Key: {}\n", key));
        out.push_str(&format!("    Total entries: {}\n", stats.total_entries));
        out.push_str(&format!("    Unique days: {}\n", stats.unique_days));
        out.push_str(&format!("    Target per day: {}\n", stats.target_per_day));
        out.push_str(&format!("    Current streak: {} days\n", stats.current_streak));
    }
    out.push_str(&format!("\nTotal activities: {}", snapshot.activities.len()));
    out
}

pub fn activity_stats(snapshot: &Snapshot, key: &str) -> Result<String, CliError> {
    let activity = snapshot.activity(key)?;
    let stats = activity.stats(snapshot.today);

    let title = format!("Statistics for '{}'", activity.name);
    let mut lines = vec![
        title.clone(),
        "=".repeat(title.chars().count()),
        format!("Key: {}", key),
        format!("Color: {}", activity.color.as_deref().unwrap_or("default")),
        format!("Target per day: {}", stats.target_per_day),
        format!("Total entries: {}", stats.total_entries),
        format!("Unique days tracked: {}", stats.unique_days),
        format!("Current streak: {} days", stats.current_streak),
    ];

    if let Some(rate) = stats.completion_rate {
        lines.push(format!(
            "Completion rate: {:.1}% ({}/{} expected entries)",
            rate,
            stats.total_entries,
            stats.unique_days * stats.target_per_day as usize
        ));
    }

    let over = activity.over_target_days();
    if !over.is_empty() {
        lines.push(format!(
            "Days over target: {}",
            over.iter()
                .map(|(date, count)| format!("{} ({})", date, count))
                .join(", ")
        ));
    }

    Ok(lines.join("\n"))
}

pub fn render_grids(
    snapshot: &Snapshot,
    key: Option<&str>,
    glyph_mode: GlyphMode,
    show_legend: bool,
) -> Result<String, CliError> {
    if snapshot.activities.is_empty() {
        return Ok(format!(
            "No activities found. Please check {}",
            snapshot.data_path.display()
        ));
    }

    let glyphs = glyph_mode.glyphs();
    let grid = &snapshot.grid;
    let mut lines = Vec::new();

    match key {
        Some(key) => {
            let activity = snapshot.activity(key)?;
            lines.push(view::activity_title_line(None, activity));
            lines.push(view::month_header_line(grid));
            lines.extend(view::grid_lines(grid, CellSource::Single(activity), glyphs, None));
        }
        None => {
            let all = snapshot.activities.all();
            lines.push(Line::from("All activities"));
            lines.push(view::month_header_line(grid));
            lines.extend(view::grid_lines(grid, CellSource::Aggregate(&all), glyphs, None));

            for (i, (_, activity)) in snapshot.activities.iter().enumerate() {
                lines.push(Line::from(""));
                lines.push(view::activity_title_line(Some(i + 1), activity));
                lines.extend(view::grid_lines(
                    grid,
                    CellSource::Single(activity),
                    glyphs,
                    None,
                ));
            }
        }
    }

    if show_legend {
        lines.push(Line::from(""));
        lines.push(view::legend_line(glyphs));
    }

    Ok(view::plain_text(&lines))
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityLevel {
    pub key: String,
    pub level: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayExport {
    pub date: String,
    pub week: usize,
    pub weekday: usize,
    pub levels: Vec<ActivityLevel>,
    pub aggregate: u8,
}

pub fn export_rows(snapshot: &Snapshot) -> Vec<DayExport> {
    let all = snapshot.activities.all();

    snapshot
        .grid
        .columns()
        .iter()
        .enumerate()
        .flat_map(|(week, column)| column.iter().flatten().map(move |date| (week, *date)))
        .map(|(week, date)| {
            let key = format_date(date);
            DayExport {
                levels: snapshot
                    .activities
                    .iter()
                    .map(|(activity_key, activity)| ActivityLevel {
                        key: activity_key.to_string(),
                        level: CellSource::Single(activity).level(&key),
                    })
                    .collect(),
                aggregate: level_for_aggregate(&key, &all),
                week,
                weekday: day_of_week(date),
                date: key,
            }
        })
        .collect()
}

pub fn export_csv(snapshot: &Snapshot, rows: &[DayExport]) -> Result<String, CliError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["date".to_string(), "week".to_string(), "weekday".to_string()];
    header.extend(snapshot.activities.keys().map(|key| format!("level_{}", key)));
    header.push("aggregate".to_string());
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.date.clone(), row.week.to_string(), row.weekday.to_string()];
        record.extend(row.levels.iter().map(|l| l.level.to_string()));
        record.push(row.aggregate.to_string());
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CliError::CsvFlush(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn export_data(
    snapshot: &Snapshot,
    format: ExportFormat,
    out_path: Option<PathBuf>,
) -> Result<(), CliError> {
    if let Some(path) = &out_path
        && path == &snapshot.data_path
    {
        return Err(CliError::OutputIsDataFile(path.clone()));
    }

    let rows = export_rows(snapshot);
    let content = match format {
        ExportFormat::Json => serde_json::to_string_pretty(&rows)?,
        ExportFormat::Csv => export_csv(snapshot, &rows)?,
    };

    if let Some(path) = out_path {
        storage::write_text_file(&path, &content)?;
        println!("Exported {} days to {}", rows.len(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

pub fn print_completions(shell: &str) -> Result<(), CliError> {
    use clap_complete::Shell;
    let shell = match shell {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        _ => return Err(CliError::UnsupportedShell(shell.to_string())),
    };
    clap_complete::generate(shell, &mut Cli::command(), "tessera", &mut io::stdout());
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    let today = today_utc();
    let glyph_mode = GlyphMode::resolve(cli.glyphs);
    let show_legend = !cli.no_legend;

    let Some(command) = cli.command else {
        let snapshot = Snapshot::load(cli.data, cli.timeline, today);
        app::run_ui(
            snapshot,
            UiOptions {
                timeline: cli.timeline,
                show_legend,
                glyph_mode,
            },
        )?;
        return Ok(());
    };

    match command {
        Command::Completions { shell } => print_completions(&shell),
        Command::List => {
            let snapshot = Snapshot::load(cli.data, cli.timeline, today);
            println!("{}", list_activities(&snapshot));
            Ok(())
        }
        Command::Stats { key } => {
            let snapshot = Snapshot::load(cli.data, cli.timeline, today);
            println!("{}", activity_stats(&snapshot, &key)?);
            Ok(())
        }
        Command::Grid { key } => {
            let snapshot = Snapshot::load(cli.data, cli.timeline, today);
            let text = render_grids(&snapshot, key.as_deref(), glyph_mode, show_legend)?;
            println!("{}", text);
            Ok(())
        }
        Command::Export { format, out } => {
            let snapshot = Snapshot::load(cli.data, cli.timeline, today);
            export_data(&snapshot, format, out)
        }
    }
}

pub fn run_cli() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
