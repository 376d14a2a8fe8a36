use std::path::PathBuf;

use clap::Args;
use dayplan_core::{
    build_time_windows, compute_content_hash, diff_snapshots, merge_busy_intervals, parse_fingerprint, CalendarEvent,
    Config, DateRange, SnapshotDelta, SnapshotFingerprint,
};
use serde::Serialize;

use super::{print_json, read_json};

#[derive(Args)]
pub struct WindowsArgs {
    /// First local date (YYYY-MM-DD)
    #[arg(long)]
    start: String,
    /// Last local date, inclusive
    #[arg(long)]
    end: String,
}

#[derive(Args)]
pub struct BusyArgs {
    /// JSON array of calendar events
    #[arg(long)]
    events: PathBuf,
    #[arg(long)]
    start: String,
    #[arg(long)]
    end: String,
}

#[derive(Args)]
pub struct DiffArgs {
    /// JSON array of current calendar events
    #[arg(long)]
    current: PathBuf,
    /// Stored fingerprint payload; missing or unreadable means no prior state
    #[arg(long)]
    previous: Option<PathBuf>,
}

#[derive(Args)]
pub struct HashArgs {
    /// JSON array of calendar events
    #[arg(long)]
    events: PathBuf,
}

#[derive(Serialize)]
struct DiffOutput {
    delta: SnapshotDelta,
    /// Store this as the next `--previous`
    fingerprint: SnapshotFingerprint,
}

pub fn windows(args: WindowsArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let windows = build_time_windows(&DateRange::new(args.start, args.end), &config.workday)?;
    print_json(&windows)
}

pub fn busy(args: BusyArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let windows = build_time_windows(&DateRange::new(args.start, args.end), &config.workday)?;
    let events: Vec<CalendarEvent> = read_json(&args.events)?;
    print_json(&merge_busy_intervals(&events, &windows.days))
}

pub fn diff(args: DiffArgs) -> Result<(), Box<dyn std::error::Error>> {
    let events: Vec<CalendarEvent> = read_json(&args.current)?;
    let previous = args.previous.and_then(|path| match std::fs::read_to_string(&path) {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "previous snapshot not readable, treating as absent");
            None
        }
    });

    let current = SnapshotFingerprint::from_events(&events);
    let delta = diff_snapshots(&parse_fingerprint(previous.as_deref()), &current);
    print_json(&DiffOutput {
        delta,
        fingerprint: current,
    })
}

pub fn hash(args: HashArgs) -> Result<(), Box<dyn std::error::Error>> {
    let events: Vec<CalendarEvent> = read_json(&args.events)?;
    let hashed: Vec<CalendarEvent> = events
        .into_iter()
        .map(|event| {
            let hash = compute_content_hash(&event);
            event.with_content_hash(hash)
        })
        .collect();
    print_json(&hashed)
}
