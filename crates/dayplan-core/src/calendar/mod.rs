//! Calendar occupancy and change detection.
//!
//! This module provides:
//! - Work-window construction for a local date range
//! - Merging of overlapping events into busy blocks with capacity statistics
//! - Content fingerprints of a calendar range and the delta between two of them

mod merge;
mod snapshot;
mod window;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use merge::{merge_busy_intervals, BusyBlock, BusyMerge, BusyStats, DayBusy};
pub use snapshot::{
    compute_content_hash, diff_snapshots, parse_fingerprint, FingerprintEntry,
    SnapshotDelta, SnapshotFingerprint,
};
pub use window::{build_time_windows, DateRange, DayWindow, TimeWindows};

/// A calendar event as delivered by ingestion. Read-only to the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(default)]
    pub source_id: String,
    pub external_event_id: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    #[serde(default)]
    pub title: String,
    /// Display names, in the order the source lists them
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(default)]
    pub body_preview: Option<String>,
    #[serde(default)]
    pub is_all_day: bool,
    #[serde(default)]
    pub content_hash: String,
}

impl CalendarEvent {
    /// Create a timed event with no attendees or body
    pub fn new(
        external_event_id: impl Into<String>,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> Self {
        Self {
            source_id: String::new(),
            external_event_id: external_event_id.into(),
            start_at,
            end_at,
            title: String::new(),
            attendees: Vec::new(),
            body_preview: None,
            is_all_day: false,
            content_hash: String::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn all_day(mut self) -> Self {
        self.is_all_day = true;
        self
    }

    pub fn with_content_hash(mut self, hash: impl Into<String>) -> Self {
        self.content_hash = hash.into();
        self
    }

    /// Whether the event overlaps `[start, end)` by a positive amount
    pub fn intersects(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.end_at > start && self.start_at < end
    }
}
