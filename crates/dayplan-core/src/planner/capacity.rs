//! Daily capacity projection.
//!
//! Reconciles the minutes a day can offer with the minutes its focus tasks
//! need:
//!
//! ```text
//! available = work - lunch - overhead - buffer - meetings
//! required  = Σ estimated_minutes of focus candidates not Done
//! overage   = required - available
//! ```
//!
//! | Overage | RAG |
//! |---------|-----|
//! | ≤ 0 | Green |
//! | 1..=60 | Yellow |
//! | > 60 | Red |

use serde::{Deserialize, Serialize};

use crate::calendar::DayWindow;
use crate::task::PlannerTask;

/// Constants of the capacity model, in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityConfig {
    #[serde(default = "default_work_minutes")]
    pub work_minutes: i64,
    #[serde(default = "default_lunch_minutes")]
    pub lunch_minutes: i64,
    #[serde(default = "default_daily_overhead_minutes")]
    pub daily_overhead_minutes: i64,
    #[serde(default = "default_max_buffer_minutes")]
    pub max_buffer_minutes: i64,
    /// Switching buffer per focus task beyond the first
    #[serde(default = "default_buffer_per_task")]
    pub buffer_per_task: i64,
}

fn default_work_minutes() -> i64 {
    510
}
fn default_lunch_minutes() -> i64 {
    30
}
fn default_daily_overhead_minutes() -> i64 {
    90
}
fn default_max_buffer_minutes() -> i64 {
    60
}
fn default_buffer_per_task() -> i64 {
    10
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            lunch_minutes: default_lunch_minutes(),
            daily_overhead_minutes: default_daily_overhead_minutes(),
            max_buffer_minutes: default_max_buffer_minutes(),
            buffer_per_task: default_buffer_per_task(),
        }
    }
}

/// Capacity health indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rag {
    Green,
    Yellow,
    Red,
}

impl Rag {
    /// Largest overage, in minutes, still reported as Yellow
    pub const YELLOW_LIMIT: i64 = 60;

    pub fn from_overage(overage: i64) -> Self {
        if overage <= 0 {
            Rag::Green
        } else if overage <= Self::YELLOW_LIMIT {
            Rag::Yellow
        } else {
            Rag::Red
        }
    }
}

/// Minutes behind `available_minutes`, kept for display and audit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityBreakdown {
    pub work_minutes: i64,
    pub lunch_minutes: i64,
    pub overhead_minutes: i64,
    pub buffer_minutes: i64,
    pub meeting_minutes: i64,
    pub focus_task_count: usize,
}

/// Result of a capacity projection. Field names are part of the public API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityResult {
    pub available_minutes: i64,
    pub required_minutes: i64,
    pub overage_minutes: i64,
    pub rag: Rag,
    pub breakdown: CapacityBreakdown,
}

/// Inputs of one projection.
#[derive(Debug, Clone)]
pub struct CapacityContext<'a> {
    pub config: CapacityConfig,
    pub tasks: &'a [PlannerTask],
    /// The day being projected; "due today" means due within its local bounds
    pub day: &'a DayWindow,
    /// Ids the caller pinned as the day's top three
    pub top_three: &'a [String],
    /// Busy minutes from calendar events on this day
    pub meeting_minutes: i64,
}

impl<'a> CapacityContext<'a> {
    pub fn new(config: CapacityConfig, tasks: &'a [PlannerTask], day: &'a DayWindow) -> Self {
        Self {
            config,
            tasks,
            day,
            top_three: &[],
            meeting_minutes: 0,
        }
    }

    pub fn with_top_three(mut self, ids: &'a [String]) -> Self {
        self.top_three = ids;
        self
    }

    pub fn with_meeting_minutes(mut self, minutes: i64) -> Self {
        self.meeting_minutes = minutes;
        self
    }

    fn is_candidate(&self, task: &PlannerTask) -> bool {
        self.top_three.iter().any(|id| *id == task.id)
            || task.due_at.is_some_and(|due| self.day.contains_in_day(due))
    }
}

/// Capacity projection engine.
pub struct CapacityProjector;

impl CapacityProjector {
    pub fn project(ctx: &CapacityContext) -> CapacityResult {
        let cfg = &ctx.config;
        let focus_task_count = Self::focus_task_count(ctx);
        let buffer_minutes = Self::buffer_minutes(cfg, focus_task_count);

        let available_minutes = cfg.work_minutes
            - cfg.lunch_minutes
            - cfg.daily_overhead_minutes
            - buffer_minutes
            - ctx.meeting_minutes;
        let required_minutes = Self::required_minutes(ctx);
        let overage_minutes = required_minutes - available_minutes;

        tracing::debug!(
            date = %ctx.day.date_local,
            available_minutes,
            required_minutes,
            focus_task_count,
            "projected capacity"
        );

        CapacityResult {
            available_minutes,
            required_minutes,
            overage_minutes,
            rag: Rag::from_overage(overage_minutes),
            breakdown: CapacityBreakdown {
                work_minutes: cfg.work_minutes,
                lunch_minutes: cfg.lunch_minutes,
                overhead_minutes: cfg.daily_overhead_minutes,
                buffer_minutes,
                meeting_minutes: ctx.meeting_minutes,
                focus_task_count,
            },
        }
    }

    /// Planned or in-progress tasks that are pinned or due on the day
    fn focus_task_count(ctx: &CapacityContext) -> usize {
        ctx.tasks
            .iter()
            .filter(|t| t.status.is_active() && ctx.is_candidate(t))
            .count()
    }

    fn buffer_minutes(cfg: &CapacityConfig, focus_task_count: usize) -> i64 {
        let extra_tasks = (focus_task_count as i64 - 1).max(0);
        cfg.max_buffer_minutes.min(cfg.buffer_per_task * extra_tasks)
    }

    /// Estimates of pinned or due-today tasks that are not Done
    fn required_minutes(ctx: &CapacityContext) -> i64 {
        ctx.tasks
            .iter()
            .filter(|t| !t.status.is_done() && ctx.is_candidate(t))
            .map(|t| i64::from(t.estimated_minutes.unwrap_or(0)))
            .sum()
    }
}
