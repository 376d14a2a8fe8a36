//! Calendar range fingerprints and change detection.
//!
//! A fingerprint is the list of `(externalEventId, startAt, endAt,
//! contentHash)` entries of a range, sorted and de-duplicated by id. Two
//! fingerprints are compared with a merge-join to produce a [`SnapshotDelta`].

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::CalendarEvent;

/// Identity and content summary of one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FingerprintEntry {
    pub external_event_id: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub content_hash: String,
}

impl FingerprintEntry {
    fn differs_from(&self, other: &FingerprintEntry) -> bool {
        self.content_hash != other.content_hash
            || self.start_at != other.start_at
            || self.end_at != other.end_at
    }
}

impl From<&CalendarEvent> for FingerprintEntry {
    fn from(event: &CalendarEvent) -> Self {
        Self {
            external_event_id: event.external_event_id.clone(),
            start_at: event.start_at,
            end_at: event.end_at,
            content_hash: event.content_hash.clone(),
        }
    }
}

/// Fingerprint of a calendar range, sorted by `externalEventId` with unique ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SnapshotFingerprint {
    entries: Vec<FingerprintEntry>,
}

impl SnapshotFingerprint {
    /// Build from entries in any order. A repeated id keeps its last entry.
    pub fn build(entries: impl IntoIterator<Item = FingerprintEntry>) -> Self {
        let mut by_id: BTreeMap<String, FingerprintEntry> = BTreeMap::new();
        let mut duplicates = 0usize;

        for entry in entries {
            if by_id.insert(entry.external_event_id.clone(), entry).is_some() {
                duplicates += 1;
            }
        }

        if duplicates > 0 {
            tracing::warn!(duplicates, "duplicate external event ids in snapshot, last occurrence kept");
        }

        Self {
            entries: by_id.into_values().collect(),
        }
    }

    pub fn from_events(events: &[CalendarEvent]) -> Self {
        Self::build(events.iter().map(FingerprintEntry::from))
    }

    pub fn entries(&self) -> &[FingerprintEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize for storage by the caller
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }
}

impl<'de> Deserialize<'de> for SnapshotFingerprint {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<FingerprintEntry>::deserialize(deserializer)?;
        Ok(Self::build(entries))
    }
}

/// Read a stored fingerprint. Absent, blank or malformed payloads are an
/// empty fingerprint.
pub fn parse_fingerprint(payload: Option<&str>) -> SnapshotFingerprint {
    let Some(text) = payload.map(str::trim).filter(|t| !t.is_empty()) else {
        return SnapshotFingerprint::default();
    };

    match serde_json::from_str::<SnapshotFingerprint>(text) {
        Ok(fingerprint) => fingerprint,
        Err(err) => {
            tracing::warn!(error = %err, "unreadable previous snapshot, treating as empty");
            SnapshotFingerprint::default()
        }
    }
}

/// Event ids that appeared, disappeared or changed between two snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDelta {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub changed: Vec<String>,
}

impl SnapshotDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// Number of ids across all three lists
    pub fn total(&self) -> usize {
        self.added.len() + self.removed.len() + self.changed.len()
    }
}

/// Compare `previous` with `current`. Each output list is sorted by id.
pub fn diff_snapshots(previous: &SnapshotFingerprint, current: &SnapshotFingerprint) -> SnapshotDelta {
    let mut delta = SnapshotDelta::default();
    let mut prev = previous.entries.iter().peekable();
    let mut curr = current.entries.iter().peekable();

    loop {
        match (prev.peek(), curr.peek()) {
            (Some(p), Some(c)) => match p.external_event_id.cmp(&c.external_event_id) {
                Ordering::Less => {
                    delta.removed.push(p.external_event_id.clone());
                    prev.next();
                }
                Ordering::Greater => {
                    delta.added.push(c.external_event_id.clone());
                    curr.next();
                }
                Ordering::Equal => {
                    if p.differs_from(c) {
                        delta.changed.push(c.external_event_id.clone());
                    }
                    prev.next();
                    curr.next();
                }
            },
            (Some(p), None) => {
                delta.removed.push(p.external_event_id.clone());
                prev.next();
            }
            (None, Some(c)) => {
                delta.added.push(c.external_event_id.clone());
                curr.next();
            }
            (None, None) => break,
        }
    }

    tracing::debug!(
        added = delta.added.len(),
        removed = delta.removed.len(),
        changed = delta.changed.len(),
        "diffed calendar snapshots"
    );

    delta
}

/// Hex SHA-256 of an event's content, independent of its ids.
///
/// Covers title, attendees in order, body preview, the all-day flag and
/// both instants.
pub fn compute_content_hash(event: &CalendarEvent) -> String {
    const SEP: &[u8] = b"\x1f";

    let mut hasher = Sha256::new();
    hasher.update(event.title.as_bytes());
    hasher.update(SEP);
    for attendee in &event.attendees {
        hasher.update(attendee.as_bytes());
        hasher.update(b"\x1e");
    }
    hasher.update(SEP);
    if let Some(body) = &event.body_preview {
        hasher.update(body.as_bytes());
    }
    hasher.update(SEP);
    hasher.update(if event.is_all_day { b"1" } else { b"0" });
    hasher.update(SEP);
    hasher.update(event.start_at.to_rfc3339_opts(SecondsFormat::Secs, true).as_bytes());
    hasher.update(SEP);
    hasher.update(event.end_at.to_rfc3339_opts(SecondsFormat::Secs, true).as_bytes());
    hasher.update(b"dayplan-content-v1");
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, hour, 0, 0).unwrap()
    }

    fn entry(id: &str, start: u32, end: u32, hash: &str) -> FingerprintEntry {
        FingerprintEntry {
            external_event_id: id.to_string(),
            start_at: at(start),
            end_at: at(end),
            content_hash: hash.to_string(),
        }
    }

    #[test]
    fn test_build_sorts_and_keeps_last_duplicate() {
        let fp = SnapshotFingerprint::build(vec![
            entry("b", 9, 10, "h1"),
            entry("a", 11, 12, "h2"),
            entry("b", 13, 14, "h3"),
        ]);

        let ids: Vec<_> = fp.entries().iter().map(|e| e.external_event_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(fp.entries()[1].content_hash, "h3");
    }

    #[test]
    fn test_diff_against_self_is_empty() {
        let fp = SnapshotFingerprint::build(vec![entry("a", 9, 10, "x"), entry("b", 10, 11, "y")]);
        assert!(diff_snapshots(&fp, &fp).is_empty());
    }

    #[test]
    fn test_diff_against_empty_marks_everything_added() {
        let fp = SnapshotFingerprint::build(vec![entry("b", 9, 10, "x"), entry("a", 10, 11, "y")]);
        let delta = diff_snapshots(&parse_fingerprint(None), &fp);
        assert_eq!(delta.added, vec!["a", "b"]);
        assert!(delta.removed.is_empty());
        assert!(delta.changed.is_empty());
    }

    #[test]
    fn test_diff_classifies_changes() {
        let previous = SnapshotFingerprint::build(vec![
            entry("keep", 9, 10, "k"),
            entry("gone", 10, 11, "g"),
            entry("moved", 11, 12, "m"),
            entry("edited", 12, 13, "e1"),
        ]);
        let current = SnapshotFingerprint::build(vec![
            entry("edited", 12, 13, "e2"),
            entry("moved", 14, 15, "m"),
            entry("keep", 9, 10, "k"),
            entry("new", 15, 16, "n"),
        ]);

        let delta = diff_snapshots(&previous, &current);
        assert_eq!(delta.added, vec!["new"]);
        assert_eq!(delta.removed, vec!["gone"]);
        assert_eq!(delta.changed, vec!["edited", "moved"]);
        assert_eq!(delta.total(), 4);
    }

    #[test]
    fn test_malformed_payload_is_empty() {
        assert!(parse_fingerprint(Some("{not json")).is_empty());
        assert!(parse_fingerprint(Some("   ")).is_empty());
        assert!(parse_fingerprint(Some(r#"[{"externalEventId": 3}]"#)).is_empty());
    }

    #[test]
    fn test_payload_round_trip_restores_order() {
        let fp = SnapshotFingerprint::build(vec![entry("z", 9, 10, "1"), entry("m", 9, 10, "2")]);
        let payload = fp.to_payload().unwrap();
        assert_eq!(parse_fingerprint(Some(&payload)), fp);

        let unsorted = r#"[
            {"externalEventId":"z","startAt":"2026-10-19T09:00:00Z","endAt":"2026-10-19T10:00:00Z","contentHash":"1"},
            {"externalEventId":"m","startAt":"2026-10-19T09:00:00Z","endAt":"2026-10-19T10:00:00Z","contentHash":"2"}
        ]"#;
        assert_eq!(parse_fingerprint(Some(unsorted)), fp);
    }

    #[test]
    fn test_content_hash_ignores_ids_but_tracks_content() {
        let base = CalendarEvent::new("evt-1", at(9), at(10)).with_title("Planning");
        let mut other_id = base.clone();
        other_id.external_event_id = "evt-2".to_string();
        other_id.source_id = "work".to_string();
        let retitled = base.clone().with_title("Planning v2");

        let hash = compute_content_hash(&base);
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, compute_content_hash(&other_id));
        assert_ne!(hash, compute_content_hash(&retitled));
    }
}
