//! Task scoring, capacity and planning.

mod capacity;
mod dependency;
mod exceptions;
mod plan;
mod scoring;

pub use capacity::{CapacityBreakdown, CapacityConfig, CapacityContext, CapacityProjector, CapacityResult, Rag};
pub use dependency::{
    is_blocked_by_dependency, Dependency, DependencyIndex, DependencyKind, DependencyTarget, ResolvedDependency,
    UNKNOWN_TARGET_TITLE,
};
pub use exceptions::{
    ExceptionsConfig, PlannerConfig, CRITICAL_THRESHOLD_KEY, DEFAULT_CRITICAL_THRESHOLD, INCLUDE_CRITICAL_KEY,
};
pub use plan::{build_plan, DailyPlan, DayPlan, PlanInput, RankedTask};
pub use scoring::{
    calculate_priority_blend, calculate_staleness_boost, calculate_status_adjust, calculate_urgency_boost,
    is_exception_task, is_follow_up_due, score_task, ScoreAdjustments, ScoreBreakdown, ScoredTask, TaskScorer,
    BLOCKED_PENALTY, FOLLOW_UP_READY_BOOST, PRIORITY_BLEND_WEIGHT, STALENESS_BOOST, STALE_AFTER_DAYS,
    WAITING_PENALTY,
};
