//! Ranked action plan for today and tomorrow.
//!
//! Composes the calendar and planner pieces for one planning cycle:
//! 1. Build work windows for today and tomorrow in the workday timezone
//! 2. Merge each day's events into busy blocks
//! 3. Resolve dependencies; open dependencies score the task as blocked
//! 4. Score every task against the same `now` and rank them
//! 5. Project capacity for each day from its busy minutes

use std::borrow::Cow;
use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::capacity::{CapacityContext, CapacityProjector, CapacityResult};
use super::dependency::{is_blocked_by_dependency, Dependency, DependencyIndex, DependencyTarget, ResolvedDependency};
use super::exceptions::PlannerConfig;
use super::scoring::{ScoreAdjustments, ScoreBreakdown, TaskScorer};
use crate::calendar::{merge_busy_intervals, BusyBlock, CalendarEvent, DayBusy, DayWindow};
use crate::config::Config;
use crate::task::{PlannerTask, TaskStatus};

/// How many ranked tasks become the default top three
const TOP_COUNT: usize = 3;

/// Everything one planning cycle reads.
#[derive(Debug, Clone, Default)]
pub struct PlanInput {
    pub now: DateTime<Utc>,
    pub tasks: Vec<PlannerTask>,
    pub events: Vec<CalendarEvent>,
    pub dependencies: Vec<Dependency>,
    /// Targets beyond `tasks`, e.g. commitments
    pub dependency_targets: Vec<DependencyTarget>,
    /// Caller-pinned top three; derived from the ranking when absent
    pub top_three: Option<Vec<String>>,
    /// Per-task score adjustments keyed by task id
    pub adjustments: HashMap<String, ScoreAdjustments>,
}

impl PlanInput {
    pub fn new(now: DateTime<Utc>, tasks: Vec<PlannerTask>, events: Vec<CalendarEvent>) -> Self {
        Self {
            now,
            tasks,
            events,
            ..Self::default()
        }
    }
}

/// One entry of the ranked list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedTask {
    /// 1-based position
    pub rank: usize,
    pub task_id: String,
    pub title: String,
    pub status: TaskStatus,
    pub is_exception: bool,
    pub blocked_by_dependency: bool,
    pub dependencies: Vec<ResolvedDependency>,
    pub score: ScoreBreakdown,
}

/// Occupancy and capacity of one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    pub date: NaiveDate,
    pub window: DayWindow,
    pub busy: DayBusy,
    pub blocks: Vec<BusyBlock>,
    pub capacity: CapacityResult,
}

/// Plan for today and tomorrow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPlan {
    pub generated_at: DateTime<Utc>,
    pub top_three: Vec<String>,
    pub ranked: Vec<RankedTask>,
    pub today: DayPlan,
    pub tomorrow: DayPlan,
}

/// Build the ranked plan. Done tasks are left out of the ranking.
pub fn build_plan(input: &PlanInput, config: &Config) -> DailyPlan {
    let planner = PlannerConfig::from(config.exceptions);
    let scorer = TaskScorer::new(input.now, planner);
    let ranked = rank_tasks(input, &scorer);

    let top_three = match &input.top_three {
        Some(pinned) => pinned.clone(),
        None => ranked.iter().take(TOP_COUNT).map(|r| r.task_id.clone()).collect(),
    };

    let today = input.now.with_timezone(&config.workday.timezone).date_naive();
    let tomorrow = today.succ_opt().unwrap_or(today);

    let plan_day = |date: NaiveDate| {
        let window = DayWindow::for_date(date, &config.workday);
        let merged = merge_busy_intervals(&input.events, std::slice::from_ref(&window));
        let busy = merged.days.first().copied().unwrap_or(DayBusy {
            date_local: date,
            busy_minutes: 0,
            block_count: 0,
            largest_focus_block_minutes: window.duration_minutes(),
        });
        let capacity = CapacityProjector::project(
            &CapacityContext::new(config.capacity, &input.tasks, &window)
                .with_top_three(&top_three)
                .with_meeting_minutes(busy.busy_minutes),
        );

        DayPlan {
            date,
            window,
            busy,
            blocks: merged.blocks,
            capacity,
        }
    };

    let today_plan = plan_day(today);
    let tomorrow_plan = plan_day(tomorrow);

    tracing::debug!(
        ranked = ranked.len(),
        today = %today,
        today_rag = ?today_plan.capacity.rag,
        "built daily plan"
    );

    DailyPlan {
        generated_at: input.now,
        top_three,
        ranked,
        today: today_plan,
        tomorrow: tomorrow_plan,
    }
}

/// Exceptions first, then final score descending, then id ascending
fn rank_tasks(input: &PlanInput, scorer: &TaskScorer) -> Vec<RankedTask> {
    let index = DependencyIndex::new(input.dependency_targets.iter().cloned()).with_tasks(&input.tasks);
    let mut resolved = index.resolve_all(&input.dependencies);
    let defaults = ScoreAdjustments::default();

    let mut ranked: Vec<RankedTask> = input
        .tasks
        .iter()
        .filter(|task| !task.status.is_done())
        .map(|task| {
            let dependencies = resolved.remove(&task.id).unwrap_or_default();
            let blocked_by_dependency = is_blocked_by_dependency(&dependencies);

            let effective: Cow<'_, PlannerTask> = if blocked_by_dependency && !task.blocked {
                Cow::Owned(task.clone().blocked())
            } else {
                Cow::Borrowed(task)
            };
            let adjustments = input.adjustments.get(&task.id).unwrap_or(&defaults);
            let scored = scorer.score(&effective, adjustments);

            RankedTask {
                rank: 0,
                task_id: task.id.clone(),
                title: task.title.clone(),
                status: task.status,
                is_exception: scored.is_exception,
                blocked_by_dependency,
                dependencies,
                score: scored.score,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.is_exception
            .cmp(&a.is_exception)
            .then_with(|| b.score.final_score.total_cmp(&a.score.final_score))
            .then_with(|| a.task_id.cmp(&b.task_id))
    });

    for (position, entry) in ranked.iter_mut().enumerate() {
        entry.rank = position + 1;
    }

    ranked
}
