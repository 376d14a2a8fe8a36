use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Args;
use dayplan_core::{
    build_plan, build_time_windows, merge_busy_intervals, CalendarEvent, CapacityContext, CapacityProjector, Config,
    DateRange, Dependency, DependencyTarget, PlanInput, PlannerConfig, PlannerTask, TaskRow, TaskScorer,
};

use super::{print_json, read_json, resolve_now};

#[derive(Args)]
pub struct ScoreArgs {
    /// JSON array of task rows
    #[arg(long)]
    tasks: PathBuf,
    /// Scoring instant (RFC 3339); defaults to now
    #[arg(long)]
    now: Option<String>,
}

#[derive(Args)]
pub struct CapacityArgs {
    #[arg(long)]
    tasks: PathBuf,
    #[arg(long)]
    events: PathBuf,
    /// Local date to project (YYYY-MM-DD)
    #[arg(long)]
    date: NaiveDate,
    /// Pinned task ids, comma separated
    #[arg(long = "top3", value_delimiter = ',')]
    top_three: Vec<String>,
}

#[derive(Args)]
pub struct PlanArgs {
    #[arg(long)]
    tasks: PathBuf,
    #[arg(long)]
    events: PathBuf,
    /// JSON array of dependency edges
    #[arg(long)]
    deps: Option<PathBuf>,
    /// JSON array of commitment targets
    #[arg(long)]
    targets: Option<PathBuf>,
    /// Pinned task ids, comma separated
    #[arg(long = "top3", value_delimiter = ',')]
    top_three: Option<Vec<String>>,
    #[arg(long)]
    now: Option<String>,
}

fn read_tasks(path: &Path) -> Result<Vec<PlannerTask>, Box<dyn std::error::Error>> {
    let rows: Vec<TaskRow> = read_json(path)?;
    Ok(rows.into_iter().map(TaskRow::into_task).collect())
}

pub fn score(args: ScoreArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let tasks = read_tasks(&args.tasks)?;
    let now = resolve_now(args.now.as_deref())?;
    let scorer = TaskScorer::new(now, PlannerConfig::from(config.exceptions));
    print_json(&scorer.score_all(&tasks))
}

pub fn capacity(args: CapacityArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let tasks = read_tasks(&args.tasks)?;
    let events: Vec<CalendarEvent> = read_json(&args.events)?;

    let windows = build_time_windows(&DateRange::single(args.date), &config.workday)?;
    let merged = merge_busy_intervals(&events, &windows.days);

    let result = CapacityProjector::project(
        &CapacityContext::new(config.capacity, &tasks, &windows.days[0])
            .with_top_three(&args.top_three)
            .with_meeting_minutes(merged.stats.busy_minutes),
    );
    print_json(&result)
}

pub fn plan(args: PlanArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = PlanInput::new(
        resolve_now(args.now.as_deref())?,
        read_tasks(&args.tasks)?,
        read_json(&args.events)?,
    );
    if let Some(path) = &args.deps {
        input.dependencies = read_json::<Vec<Dependency>>(path)?;
    }
    if let Some(path) = &args.targets {
        input.dependency_targets = read_json::<Vec<DependencyTarget>>(path)?;
    }
    input.top_three = args.top_three;

    print_json(&build_plan(&input, config))
}
