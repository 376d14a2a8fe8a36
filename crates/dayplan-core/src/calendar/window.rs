//! Work-window construction for a local calendar date range.
//!
//! Converts a `{startDate, endDate}` pair of local dates plus the workday
//! configuration into UTC range bounds and one [`DayWindow`] per date.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::config::WorkdayConfig;
use crate::error::{RangeProblem, ValidationError};

/// Requested range of local calendar dates, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

impl DateRange {
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }

    /// Single-day range
    pub fn single(date: NaiveDate) -> Self {
        let text = date.format("%Y-%m-%d").to_string();
        Self::new(text.clone(), text)
    }
}

/// Work window of one local calendar day, expressed in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayWindow {
    pub date_local: NaiveDate,
    pub work_start_utc: DateTime<Utc>,
    pub work_end_utc: DateTime<Utc>,
    /// Local midnight of `date_local`
    pub day_start_utc: DateTime<Utc>,
    /// Local midnight of the following date
    pub day_end_utc: DateTime<Utc>,
}

impl DayWindow {
    /// Build the window for one local date.
    ///
    /// A `work_end` that is not after `work_start` places the end of the
    /// window on the following calendar day.
    pub fn for_date(date: NaiveDate, workday: &WorkdayConfig) -> Self {
        let tz = workday.timezone;
        let end_date = if workday.work_end > workday.work_start {
            date
        } else {
            next_day(date)
        };

        let local_start = date.and_time(workday.work_start);
        let local_end = end_date.and_time(workday.work_end);
        let work_start_utc = local_to_utc(tz, local_start);
        let mut work_end_utc = local_to_utc(tz, local_end);

        // A start pushed past a DST gap can overtake the end; keep the
        // nominal length instead.
        if work_end_utc <= work_start_utc {
            work_end_utc = work_start_utc + (local_end - local_start);
        }

        Self {
            date_local: date,
            work_start_utc,
            work_end_utc,
            day_start_utc: local_to_utc(tz, date.and_time(NaiveTime::MIN)),
            day_end_utc: local_to_utc(tz, next_day(date).and_time(NaiveTime::MIN)),
        }
    }

    /// Length of the work window in minutes
    pub fn duration_minutes(&self) -> i64 {
        (self.work_end_utc - self.work_start_utc).num_minutes()
    }

    /// Whether `instant` falls on this local calendar day
    pub fn contains_in_day(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.day_start_utc && instant < self.day_end_utc
    }
}

/// UTC bounds of a whole range plus its per-day windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindows {
    pub utc_range_start: DateTime<Utc>,
    pub utc_range_end_exclusive: DateTime<Utc>,
    pub days: Vec<DayWindow>,
}

/// Build the UTC range and one work window per local date in `range`.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidRange`] when either date does not parse
/// as `YYYY-MM-DD` or when the end precedes the start.
pub fn build_time_windows(
    range: &DateRange,
    workday: &WorkdayConfig,
) -> Result<TimeWindows, ValidationError> {
    let invalid = |problem| ValidationError::invalid_range(&range.start_date, &range.end_date, problem);

    let start = parse_local_date(&range.start_date).ok_or_else(|| invalid(RangeProblem::UnparsableStart))?;
    let end = parse_local_date(&range.end_date).ok_or_else(|| invalid(RangeProblem::UnparsableEnd))?;

    if end < start {
        return Err(invalid(RangeProblem::EndBeforeStart));
    }

    let day_count = (end - start).num_days() + 1;

    let days: Vec<DayWindow> = start
        .iter_days()
        .take(day_count as usize)
        .map(|date| DayWindow::for_date(date, workday))
        .collect();

    // Both ends exist: the range holds at least one day.
    let utc_range_start = days[0].work_start_utc;
    let utc_range_end_exclusive = days[days.len() - 1].work_end_utc;

    tracing::debug!(
        start = %range.start_date,
        end = %range.end_date,
        days = days.len(),
        "built work windows"
    );

    Ok(TimeWindows {
        utc_range_start,
        utc_range_end_exclusive,
        days,
    })
}

fn parse_local_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}

/// Resolve a local wall-clock time to UTC.
///
/// Ambiguous times (DST fall-back) take the earlier instant. Times inside a
/// DST gap are moved forward by the usual one-hour jump.
pub(crate) fn local_to_utc(tz: Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive)),
    }
}
