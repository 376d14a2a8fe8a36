//! Dependency resolution between tasks and commitments.
//!
//! A dependency is resolved only when its target is Done. A target missing
//! from the index resolves to an "unknown" placeholder that stays
//! unresolved, so deleting a target never unblocks its dependents.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::task::{PlannerTask, TaskStatus};

/// Title reported for a dependency whose target cannot be found
pub const UNKNOWN_TARGET_TITLE: &str = "unknown";

/// What a dependency points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Task,
    Commitment,
}

/// Edge from a dependent task to its target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub task_id: String,
    pub kind: DependencyKind,
    pub target_id: String,
}

/// Title and status of a dependency target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyTarget {
    pub kind: DependencyKind,
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: TaskStatus,
}

/// A dependency with its target looked up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedDependency {
    pub kind: DependencyKind,
    pub target_id: String,
    pub title: String,
    pub status: TaskStatus,
    pub resolved: bool,
}

/// Lookup table of dependency targets, prefetched by the caller.
#[derive(Debug, Clone, Default)]
pub struct DependencyIndex {
    targets: HashMap<(DependencyKind, String), DependencyTarget>,
}

impl DependencyIndex {
    pub fn new(targets: impl IntoIterator<Item = DependencyTarget>) -> Self {
        let mut index = Self::default();
        for target in targets {
            index.insert(target);
        }
        index
    }

    /// Index every task as a task-kind target
    pub fn with_tasks(mut self, tasks: &[PlannerTask]) -> Self {
        for task in tasks {
            self.insert(DependencyTarget {
                kind: DependencyKind::Task,
                id: task.id.clone(),
                title: task.title.clone(),
                status: task.status,
            });
        }
        self
    }

    pub fn insert(&mut self, target: DependencyTarget) {
        self.targets.insert((target.kind, target.id.clone()), target);
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Look up one dependency's target
    pub fn resolve(&self, dependency: &Dependency) -> ResolvedDependency {
        match self.targets.get(&(dependency.kind, dependency.target_id.clone())) {
            Some(target) => ResolvedDependency {
                kind: dependency.kind,
                target_id: dependency.target_id.clone(),
                title: target.title.clone(),
                status: target.status,
                resolved: target.status.is_done(),
            },
            None => {
                tracing::debug!(
                    task = %dependency.task_id,
                    target = %dependency.target_id,
                    "dependency target not found, treating as unresolved"
                );
                ResolvedDependency {
                    kind: dependency.kind,
                    target_id: dependency.target_id.clone(),
                    title: UNKNOWN_TARGET_TITLE.to_string(),
                    status: TaskStatus::Unknown,
                    resolved: false,
                }
            }
        }
    }

    /// Resolve a batch of edges, grouped by dependent task id
    pub fn resolve_all(&self, dependencies: &[Dependency]) -> BTreeMap<String, Vec<ResolvedDependency>> {
        let mut grouped: BTreeMap<String, Vec<ResolvedDependency>> = BTreeMap::new();
        for dependency in dependencies {
            grouped
                .entry(dependency.task_id.clone())
                .or_default()
                .push(self.resolve(dependency));
        }
        grouped
    }
}

/// Whether any dependency is still open
pub fn is_blocked_by_dependency(resolved: &[ResolvedDependency]) -> bool {
    resolved.iter().any(|d| !d.resolved)
}
