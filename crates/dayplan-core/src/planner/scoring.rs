//! Task priority scoring and exception classification.
//!
//! The score is an additive blend evaluated against a single `now`:
//!
//! ```text
//! preMultiplierScore = priorityBlend + urgencyBoost + stakeholderBoost
//!                    + statusAdjust + stalenessBoost + fitBonus
//! finalScore         = max(0, preMultiplierScore * implementation * directive)
//! ```
//!
//! | Term | Rule |
//! |------|------|
//! | priorityBlend | stored priority clamped to 0-100, times 0.15 |
//! | urgencyBoost | due within 24h +30, 48h +20, 7d +8 |
//! | statusAdjust | blocked -25, waiting -15; blocked with due follow-up +25 +10 |
//! | stalenessBoost | +5 when not updated for more than 5 days |
//!
//! Urgency is added before the multipliers are applied, never scaled by them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::exceptions::PlannerConfig;
use crate::task::PlannerTask;

pub const PRIORITY_BLEND_WEIGHT: f64 = 0.15;
pub const BLOCKED_PENALTY: f64 = -25.0;
pub const WAITING_PENALTY: f64 = -15.0;
pub const FOLLOW_UP_READY_BOOST: f64 = 10.0;
pub const STALENESS_BOOST: f64 = 5.0;
pub const STALE_AFTER_DAYS: i64 = 5;

/// Caller-supplied inputs layered on top of the task's own fields
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoreAdjustments {
    /// Replaces the computed urgency boost when set
    pub urgency_boost: Option<f64>,
    pub stakeholder_boost: f64,
    pub fit_bonus: f64,
    pub implementation_multiplier: f64,
    pub directive_multiplier: f64,
}

impl Default for ScoreAdjustments {
    fn default() -> Self {
        Self {
            urgency_boost: None,
            stakeholder_boost: 0.0,
            fit_bonus: 0.0,
            implementation_multiplier: 1.0,
            directive_multiplier: 1.0,
        }
    }
}

/// Every term of a task's score. Field names are part of the public API.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub priority_blend: f64,
    pub urgency_boost: f64,
    pub stakeholder_boost: f64,
    pub status_adjust: f64,
    pub staleness_boost: f64,
    pub fit_bonus: f64,
    pub follow_up_due: bool,
    pub implementation_multiplier: f64,
    pub directive_multiplier: f64,
    pub pre_multiplier_score: f64,
    pub final_score: f64,
}

/// Score plus exception flag for one task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredTask {
    pub task_id: String,
    pub is_exception: bool,
    pub score: ScoreBreakdown,
}

/// Stored priority clamped to 0-100; absent or non-finite is 0
fn clamped_priority(task: &PlannerTask) -> f64 {
    task.priority_score
        .filter(|p| p.is_finite())
        .unwrap_or(0.0)
        .clamp(0.0, 100.0)
}

/// Weighted stored priority (0-15)
pub fn calculate_priority_blend(task: &PlannerTask) -> f64 {
    clamped_priority(task) * PRIORITY_BLEND_WEIGHT
}

/// Whether a follow-up is set and has arrived
pub fn is_follow_up_due(task: &PlannerTask, now: DateTime<Utc>) -> bool {
    task.follow_up_at.is_some_and(|at| at <= now)
}

/// Penalties for blocked and waiting tasks, and the follow-up recovery.
///
/// A blocked task whose follow-up is due gets its penalty back plus a
/// readiness boost, so blocked + due follow-up nets +10.
pub fn calculate_status_adjust(task: &PlannerTask, now: DateTime<Utc>) -> f64 {
    let mut adjust = 0.0;

    if task.blocked {
        adjust += BLOCKED_PENALTY;
    }
    if task.is_waiting() {
        adjust += WAITING_PENALTY;
    }
    if task.blocked && is_follow_up_due(task, now) {
        adjust += -BLOCKED_PENALTY + FOLLOW_UP_READY_BOOST;
    }

    adjust
}

fn is_due_within(task: &PlannerTask, now: DateTime<Utc>, window: Duration) -> bool {
    // Overdue counts as within any window
    task.due_at.is_some_and(|due| due - now <= window)
}

/// Boost for approaching due dates
pub fn calculate_urgency_boost(task: &PlannerTask, now: DateTime<Utc>) -> f64 {
    if is_due_within(task, now, Duration::hours(24)) {
        30.0
    } else if is_due_within(task, now, Duration::hours(48)) {
        20.0
    } else if is_due_within(task, now, Duration::days(7)) {
        8.0
    } else {
        0.0
    }
}

/// Boost for tasks nobody has touched for a while
pub fn calculate_staleness_boost(task: &PlannerTask, now: DateTime<Utc>) -> f64 {
    match task.updated_at {
        Some(updated) if now - updated > Duration::days(STALE_AFTER_DAYS) => STALENESS_BOOST,
        _ => 0.0,
    }
}

/// Whether the task must surface regardless of its score
pub fn is_exception_task(task: &PlannerTask, now: DateTime<Utc>, config: &PlannerConfig) -> bool {
    if is_due_within(task, now, Duration::hours(24)) {
        return true;
    }
    if task.blocked && is_follow_up_due(task, now) {
        return true;
    }

    let exceptions = config.exceptions.normalized();
    exceptions.include_critical && clamped_priority(task) >= exceptions.critical_threshold
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Compute every score term for `task` at `now`
pub fn score_task(task: &PlannerTask, now: DateTime<Utc>, adjustments: &ScoreAdjustments) -> ScoreBreakdown {
    let priority_blend = calculate_priority_blend(task);
    let urgency_boost = adjustments
        .urgency_boost
        .filter(|u| u.is_finite())
        .unwrap_or_else(|| calculate_urgency_boost(task, now));
    let stakeholder_boost = finite_or(adjustments.stakeholder_boost, 0.0);
    let status_adjust = calculate_status_adjust(task, now);
    let staleness_boost = calculate_staleness_boost(task, now);
    let fit_bonus = finite_or(adjustments.fit_bonus, 0.0);
    let implementation_multiplier = finite_or(adjustments.implementation_multiplier, 1.0);
    let directive_multiplier = finite_or(adjustments.directive_multiplier, 1.0);

    let pre_multiplier_score =
        priority_blend + urgency_boost + stakeholder_boost + status_adjust + staleness_boost + fit_bonus;
    let final_score = (pre_multiplier_score * implementation_multiplier * directive_multiplier).max(0.0);

    ScoreBreakdown {
        priority_blend,
        urgency_boost,
        stakeholder_boost,
        status_adjust,
        staleness_boost,
        fit_bonus,
        follow_up_due: is_follow_up_due(task, now),
        implementation_multiplier,
        directive_multiplier,
        pre_multiplier_score,
        final_score,
    }
}

/// Scores a batch of tasks against one shared `now`.
pub struct TaskScorer {
    now: DateTime<Utc>,
    config: PlannerConfig,
}

impl TaskScorer {
    pub fn new(now: DateTime<Utc>, config: PlannerConfig) -> Self {
        Self { now, config }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Score one task with caller adjustments
    pub fn score(&self, task: &PlannerTask, adjustments: &ScoreAdjustments) -> ScoredTask {
        ScoredTask {
            task_id: task.id.clone(),
            is_exception: is_exception_task(task, self.now, &self.config),
            score: score_task(task, self.now, adjustments),
        }
    }

    /// Score every task with default adjustments, preserving input order
    pub fn score_all(&self, tasks: &[PlannerTask]) -> Vec<ScoredTask> {
        let defaults = ScoreAdjustments::default();
        tasks.iter().map(|t| self.score(t, &defaults)).collect()
    }
}
