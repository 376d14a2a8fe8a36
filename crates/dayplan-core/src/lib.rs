//! # Dayplan Core Library
//!
//! This library provides the deterministic planning core of a personal
//! work planner. It is a pure transform layer: callers hand in calendar
//! events, task rows and configuration, and get back day windows, busy
//! blocks, change deltas, task scores and capacity projections. Nothing here
//! touches the filesystem, the network or a database.
//!
//! ## Architecture
//!
//! - **Calendar**: Work windows for a local date range, busy-interval merging
//!   and snapshot fingerprint diffing
//! - **Planner**: Additive task scoring, exception classification, dependency
//!   resolution and daily capacity projection
//! - **Task**: Planner task model and boundary parsing of loosely typed rows
//! - **Config**: TOML-based configuration threaded into the algorithms
//!
//! ## Key Components
//!
//! - [`build_time_windows`]: Local dates to UTC work windows
//! - [`merge_busy_intervals`]: Events to merged busy blocks and statistics
//! - [`diff_snapshots`]: Added/removed/changed events between two fingerprints
//! - [`TaskScorer`]: Score breakdown and exception flag per task
//! - [`CapacityProjector`]: Available vs. required minutes with a RAG status
//! - [`build_plan`]: Ranked plan for today and tomorrow

pub mod calendar;
pub mod config;
pub mod error;
pub mod planner;
pub mod task;

pub use calendar::{
    build_time_windows, compute_content_hash, diff_snapshots, merge_busy_intervals, parse_fingerprint, BusyBlock,
    BusyMerge, BusyStats, CalendarEvent, DateRange, DayBusy, DayWindow, SnapshotDelta, SnapshotFingerprint,
    TimeWindows,
};
pub use config::{Config, WorkdayConfig};
pub use error::{ConfigError, CoreError, RangeProblem, ValidationError};
pub use planner::{
    build_plan, CapacityConfig, CapacityContext, CapacityProjector, CapacityResult, DailyPlan, Dependency,
    DependencyIndex, DependencyKind, DependencyTarget, ExceptionsConfig, PlanInput, PlannerConfig, Rag,
    ScoreAdjustments, ScoreBreakdown, ScoredTask, TaskScorer,
};
pub use task::{PlannerTask, TaskRow, TaskStatus};
