//! Task types consumed by the planner.
//!
//! [`TaskRow`] mirrors the loosely typed rows a store hands over: numbers may
//! arrive as strings, flags as `0`/`1`, timestamps in several shapes or as
//! garbage. [`TaskRow::into_task`] resolves every field once, at the boundary,
//! into a [`PlannerTask`] whose fields are either a valid value or `None`.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Workflow status of a task or commitment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[default]
    Planned,
    InProgress,
    /// Waiting on someone else
    Waiting,
    Blocked,
    /// Terminal state
    Done,
    /// Status text this planner does not know
    Unknown,
}

impl TaskStatus {
    /// Lenient parse: case, spaces, `-` and `_` are ignored
    pub fn parse(text: &str) -> Self {
        let key: String = text
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "planned" | "todo" | "notstarted" => TaskStatus::Planned,
            "inprogress" | "active" | "doing" => TaskStatus::InProgress,
            "waiting" => TaskStatus::Waiting,
            "blocked" => TaskStatus::Blocked,
            "done" | "completed" | "complete" => TaskStatus::Done,
            _ => TaskStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Planned => "Planned",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Waiting => "Waiting",
            TaskStatus::Blocked => "Blocked",
            TaskStatus::Done => "Done",
            TaskStatus::Unknown => "unknown",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }

    /// Planned or in progress
    pub fn is_active(&self) -> bool {
        matches!(self, TaskStatus::Planned | TaskStatus::InProgress)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(TaskStatus::parse(&text))
    }
}

/// Task fields read by scoring, capacity and ranking. Never mutated there.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerTask {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: TaskStatus,
    /// Stored priority, nominally 0-100
    #[serde(default)]
    pub priority_score: Option<f64>,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub follow_up_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default)]
    pub waiting: bool,
    #[serde(default)]
    pub waiting_on: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_minutes: Option<u32>,
}

impl PlannerTask {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority_score = Some(priority);
        self
    }

    pub fn with_due(mut self, due_at: DateTime<Utc>) -> Self {
        self.due_at = Some(due_at);
        self
    }

    pub fn with_follow_up(mut self, follow_up_at: DateTime<Utc>) -> Self {
        self.follow_up_at = Some(follow_up_at);
        self
    }

    pub fn with_estimate(mut self, minutes: u32) -> Self {
        self.estimated_minutes = Some(minutes);
        self
    }

    pub fn blocked(mut self) -> Self {
        self.blocked = true;
        self
    }

    pub fn waiting(mut self) -> Self {
        self.waiting = true;
        self
    }

    /// Waiting flag, waiting status, or a non-blank `waiting_on`
    pub fn is_waiting(&self) -> bool {
        self.waiting
            || self.status == TaskStatus::Waiting
            || self
                .waiting_on
                .as_deref()
                .is_some_and(|who| !who.trim().is_empty())
    }
}

/// A task as stored, before boundary parsing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskRow {
    pub id: String,
    pub title: Option<String>,
    pub status: Option<String>,
    pub priority_score: Option<Value>,
    pub due_at: Option<Value>,
    pub follow_up_at: Option<Value>,
    pub blocked: Option<Value>,
    pub waiting: Option<Value>,
    pub waiting_on: Option<String>,
    pub updated_at: Option<Value>,
    pub estimated_minutes: Option<Value>,
}

impl TaskRow {
    /// Resolve every field; anything unreadable becomes absent.
    pub fn into_task(self) -> PlannerTask {
        let id = self.id;
        let instant = |field: &str, value: Option<Value>| {
            let parsed = value.as_ref().and_then(parse_instant_value);
            if parsed.is_none() && value.as_ref().is_some_and(|v| !v.is_null()) {
                tracing::debug!(task = %id, field, "unreadable timestamp treated as absent");
            }
            parsed
        };

        let due_at = instant("dueAt", self.due_at);
        let follow_up_at = instant("followUpAt", self.follow_up_at);
        let updated_at = instant("updatedAt", self.updated_at);

        PlannerTask {
            title: self.title.unwrap_or_default(),
            status: self.status.as_deref().map(TaskStatus::parse).unwrap_or_default(),
            priority_score: self.priority_score.as_ref().and_then(parse_number_value),
            due_at,
            follow_up_at,
            blocked: self.blocked.as_ref().and_then(parse_flag_value).unwrap_or(false),
            waiting: self.waiting.as_ref().and_then(parse_flag_value).unwrap_or(false),
            waiting_on: self.waiting_on,
            updated_at,
            estimated_minutes: self
                .estimated_minutes
                .as_ref()
                .and_then(parse_number_value)
                .map(|m| m.clamp(0.0, f64::from(u32::MAX)).round() as u32),
            id,
        }
    }
}

/// Parse a boolean flag: `true/1/yes/y/on` or `false/0/no/n/off`, any case
pub fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "on" => Some(true),
        "false" | "0" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a finite number
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse an instant: RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` (UTC) or a
/// bare `YYYY-MM-DD` (UTC midnight)
pub fn parse_instant(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_instant_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => parse_instant(text),
        // Epoch milliseconds
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

fn parse_number_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(text) => parse_number(text),
        _ => None,
    }
}

fn parse_flag_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        Value::String(text) => parse_flag(text),
        _ => None,
    }
}
