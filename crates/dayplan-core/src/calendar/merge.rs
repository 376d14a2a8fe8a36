//! Busy-interval merging within work windows.
//!
//! Events are clipped to each [`DayWindow`], sorted by `(start, end)` and
//! folded into maximal busy blocks. Touching blocks are merged, so two
//! blocks in the output are always separated by a positive free gap.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::window::DayWindow;
use super::CalendarEvent;

/// A maximal merged interval of calendar occupancy inside one work window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusyBlock {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl BusyBlock {
    pub fn new(start_at: DateTime<Utc>, end_at: DateTime<Utc>) -> Self {
        Self { start_at, end_at }
    }

    /// Get duration in minutes
    pub fn duration_minutes(&self) -> i64 {
        (self.end_at - self.start_at).num_minutes()
    }

    fn duration_seconds(&self) -> i64 {
        (self.end_at - self.start_at).num_seconds()
    }
}

/// Aggregate occupancy statistics over a set of work windows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusyStats {
    pub busy_minutes: i64,
    pub block_count: usize,
    pub largest_focus_block_minutes: i64,
}

/// Occupancy statistics of a single local day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBusy {
    pub date_local: NaiveDate,
    pub busy_minutes: i64,
    pub block_count: usize,
    pub largest_focus_block_minutes: i64,
}

/// Output of [`merge_busy_intervals`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusyMerge {
    /// Busy blocks of every window, in window order
    pub blocks: Vec<BusyBlock>,
    pub stats: BusyStats,
    pub days: Vec<DayBusy>,
}

impl BusyMerge {
    /// Statistics for one local date, if it was among the windows
    pub fn day(&self, date: NaiveDate) -> Option<&DayBusy> {
        self.days.iter().find(|d| d.date_local == date)
    }
}

/// Merge `events` into busy blocks clipped to each of `windows`.
///
/// Output is independent of the order of `events`. An empty event list
/// yields zeroed [`BusyStats`]; events that all miss the windows leave the
/// windows free.
pub fn merge_busy_intervals(events: &[CalendarEvent], windows: &[DayWindow]) -> BusyMerge {
    let mut blocks = Vec::new();
    let mut days = Vec::with_capacity(windows.len());
    let mut busy_seconds = 0i64;
    let mut largest_focus = 0i64;

    for window in windows {
        let day_blocks = merge_window(events, window);
        let day_seconds: i64 = day_blocks.iter().map(BusyBlock::duration_seconds).sum();
        let day_largest = largest_free_gap(&day_blocks, window);

        busy_seconds += day_seconds;
        largest_focus = largest_focus.max(day_largest);
        days.push(DayBusy {
            date_local: window.date_local,
            busy_minutes: day_seconds / 60,
            block_count: day_blocks.len(),
            largest_focus_block_minutes: day_largest,
        });
        blocks.extend(day_blocks);
    }

    let stats = if events.is_empty() || windows.is_empty() {
        BusyStats::default()
    } else {
        BusyStats {
            busy_minutes: busy_seconds / 60,
            block_count: blocks.len(),
            largest_focus_block_minutes: largest_focus,
        }
    };

    tracing::debug!(
        events = events.len(),
        windows = windows.len(),
        blocks = stats.block_count,
        busy_minutes = stats.busy_minutes,
        "merged busy intervals"
    );

    BusyMerge { blocks, stats, days }
}

fn merge_window(events: &[CalendarEvent], window: &DayWindow) -> Vec<BusyBlock> {
    let (window_start, window_end) = (window.work_start_utc, window.work_end_utc);
    let mut intervals: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::new();

    for event in events.iter().filter(|e| e.intersects(window_start, window_end)) {
        // All-day events occupy the whole window and hide anything inside it
        if event.is_all_day {
            return vec![BusyBlock::new(window_start, window_end)];
        }

        let start = event.start_at.max(window_start);
        let end = event.end_at.min(window_end);
        if end > start {
            intervals.push((start, end));
        }
    }

    // Identical starts order by ascending end
    intervals.sort_unstable();

    let mut merged: Vec<BusyBlock> = Vec::with_capacity(intervals.len());
    for (start, end) in intervals {
        match merged.last_mut() {
            Some(current) if start <= current.end_at => {
                if end > current.end_at {
                    current.end_at = end;
                }
            }
            _ => merged.push(BusyBlock::new(start, end)),
        }
    }

    merged
}

/// Longest free stretch between window edges and sorted blocks, in minutes
fn largest_free_gap(blocks: &[BusyBlock], window: &DayWindow) -> i64 {
    let mut cursor = window.work_start_utc;
    let mut largest = 0i64;

    for block in blocks {
        largest = largest.max((block.start_at - cursor).num_minutes());
        cursor = block.end_at;
    }

    largest.max((window.work_end_utc - cursor).num_minutes())
}
