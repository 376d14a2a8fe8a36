//! Integration tests for calendar occupancy and change detection.
//!
//! These tests run the full path from a requested date range through
//! window construction, busy merging and snapshot diffing.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use proptest::prelude::*;

use dayplan_core::calendar::FingerprintEntry;
use dayplan_core::{
    build_time_windows, compute_content_hash, diff_snapshots, merge_busy_intervals, parse_fingerprint, CalendarEvent,
    DateRange, DayWindow, SnapshotFingerprint, WorkdayConfig,
};

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 6, 0, 0).unwrap()
}

fn two_days() -> Vec<DayWindow> {
    build_time_windows(&DateRange::new("2026-10-19", "2026-10-20"), &WorkdayConfig::default())
        .unwrap()
        .days
}

/// Events between 06:00 on the 19th and the early hours of the 21st
fn arb_events() -> impl Strategy<Value = Vec<CalendarEvent>> {
    let event = (0i64..2700, 0i64..300, prop::bool::weighted(0.05));
    prop::collection::vec(event, 0..24).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (offset, length, all_day))| {
                let start = base() + Duration::minutes(offset);
                let event = CalendarEvent::new(format!("evt-{i}"), start, start + Duration::minutes(length));
                if all_day {
                    event.all_day()
                } else {
                    event
                }
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_merge_is_order_independent(
        (events, shuffled) in arb_events().prop_flat_map(|events| {
            let shuffled = Just(events.clone()).prop_shuffle();
            (Just(events), shuffled)
        })
    ) {
        let windows = two_days();
        prop_assert_eq!(
            merge_busy_intervals(&events, &windows),
            merge_busy_intervals(&shuffled, &windows)
        );
    }

    #[test]
    fn prop_blocks_are_maximal(events in arb_events()) {
        let windows = two_days();
        let merged = merge_busy_intervals(&events, &windows);

        for block in &merged.blocks {
            prop_assert!(block.start_at < block.end_at);
            prop_assert!(windows
                .iter()
                .any(|w| block.start_at >= w.work_start_utc && block.end_at <= w.work_end_utc));
        }
        for pair in merged.blocks.windows(2) {
            // Sorted with a strictly positive gap: touching blocks would have merged
            prop_assert!(pair[0].end_at < pair[1].start_at);
        }

        let summed: i64 = merged.blocks.iter().map(|b| b.duration_minutes()).sum();
        prop_assert_eq!(merged.stats.busy_minutes, summed);
        prop_assert_eq!(merged.stats.block_count, merged.blocks.len());
    }

    #[test]
    fn prop_every_event_is_covered(events in arb_events()) {
        let windows = two_days();
        let merged = merge_busy_intervals(&events, &windows);

        for window in &windows {
            for event in events.iter().filter(|e| e.intersects(window.work_start_utc, window.work_end_utc)) {
                let start = event.start_at.max(window.work_start_utc);
                let end = event.end_at.min(window.work_end_utc);
                if end <= start {
                    continue;
                }
                prop_assert!(merged
                    .blocks
                    .iter()
                    .any(|b| b.start_at <= start && end <= b.end_at));
            }
        }
    }
}

#[test]
fn test_range_to_busy_stats() {
    let workday = WorkdayConfig {
        timezone: chrono_tz::Europe::Berlin,
        work_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        work_end: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
    };
    let windows = build_time_windows(&DateRange::new("2026-10-19", "2026-10-19"), &workday).unwrap();

    // Berlin is UTC+2 in October: the window is 06:00-14:00 UTC
    assert_eq!(windows.utc_range_start, Utc.with_ymd_and_hms(2026, 10, 19, 6, 0, 0).unwrap());
    assert_eq!(windows.utc_range_end_exclusive, Utc.with_ymd_and_hms(2026, 10, 19, 14, 0, 0).unwrap());

    let at = |h, m| Utc.with_ymd_and_hms(2026, 10, 19, h, m, 0).unwrap();
    let events = vec![
        CalendarEvent::new("early", at(5, 0), at(7, 0)),
        CalendarEvent::new("standup", at(9, 0), at(9, 30)),
        CalendarEvent::new("review", at(9, 30), at(10, 0)),
        CalendarEvent::new("late", at(13, 30), at(15, 0)),
    ];

    let merged = merge_busy_intervals(&events, &windows.days);
    assert_eq!(merged.blocks.len(), 3);
    assert_eq!(merged.stats.busy_minutes, 60 + 60 + 30);
    assert_eq!(merged.stats.block_count, 3);
    // 10:00-13:30
    assert_eq!(merged.stats.largest_focus_block_minutes, 210);
}

#[test]
fn test_snapshot_cycle() {
    let at = |h| Utc.with_ymd_and_hms(2026, 10, 19, h, 0, 0).unwrap();
    let hashed = |event: CalendarEvent| {
        let hash = compute_content_hash(&event);
        event.with_content_hash(hash)
    };

    let first = vec![
        hashed(CalendarEvent::new("a", at(9), at(10)).with_title("Standup")),
        hashed(CalendarEvent::new("b", at(11), at(12)).with_title("1:1")),
    ];

    // First sync: nothing stored yet
    let stored = SnapshotFingerprint::from_events(&first).to_payload().unwrap();
    let initial = diff_snapshots(&parse_fingerprint(None), &SnapshotFingerprint::from_events(&first));
    assert_eq!(initial.added, vec!["a", "b"]);

    // Second sync: "a" renamed, "b" deleted, "c" created
    let second = vec![
        hashed(CalendarEvent::new("c", at(14), at(15)).with_title("Planning")),
        hashed(CalendarEvent::new("a", at(9), at(10)).with_title("Daily standup")),
    ];
    let delta = diff_snapshots(&parse_fingerprint(Some(&stored)), &SnapshotFingerprint::from_events(&second));

    assert_eq!(delta.added, vec!["c"]);
    assert_eq!(delta.removed, vec!["b"]);
    assert_eq!(delta.changed, vec!["a"]);
    assert_eq!(delta.total(), 3);
}

#[test]
fn test_corrupt_store_reads_as_first_sync() {
    let current = SnapshotFingerprint::build(vec![FingerprintEntry {
        external_event_id: "x".to_string(),
        start_at: base(),
        end_at: base() + Duration::hours(1),
        content_hash: "h".to_string(),
    }]);

    for payload in ["{not json", "", "   ", "{\"externalEventId\":1}"] {
        let delta = diff_snapshots(&parse_fingerprint(Some(payload)), &current);
        assert_eq!(delta.added, vec!["x"], "payload {payload:?}");
        assert!(delta.removed.is_empty());
    }

    assert!(diff_snapshots(&current, &current).is_empty());
}
