//! Time-windowed history and trend classification

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{PatternKind, PatternRecord, PreviousMessage};

pub const DEFAULT_HISTORY_DAYS: u32 = 7;

/// Recent/preceding ratio above this is `Up`
const TREND_UP_RATIO: f64 = 1.3;
/// Recent/preceding ratio below this is `Down`
const TREND_DOWN_RATIO: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Stable => "stable",
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Up => "↑",
            Trend::Down => "↓",
            Trend::Stable => "→",
        }
    }
}

/// Compare two adjacent windows. No preceding data means no trend.
pub fn classify_trend(recent: usize, preceding: usize) -> Trend {
    if preceding == 0 {
        return Trend::Stable;
    }
    let ratio = recent as f64 / preceding as f64;
    if ratio > TREND_UP_RATIO {
        Trend::Up
    } else if ratio < TREND_DOWN_RATIO {
        Trend::Down
    } else {
        Trend::Stable
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub date: DateTime<Utc>,
    pub pattern: PatternKind,
    pub message: String,
    pub message_id: Option<String>,
    pub previous_messages: Option<Vec<PreviousMessage>>,
    pub context: Option<String>,
}

impl From<&PatternRecord> for HistoryEntry {
    fn from(record: &PatternRecord) -> Self {
        Self {
            date: record.timestamp,
            pattern: record.kind,
            message: record.message.clone(),
            message_id: record.message_id.clone(),
            previous_messages: record.previous_messages.clone(),
            context: record.context.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub count: usize,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryResult {
    pub summary: HistorySummary,
    /// Most recent first
    pub entries: Vec<HistoryEntry>,
}

/// Start of a window of `days` ending at `now`, clamped to the earliest
/// representable instant
pub(crate) fn window_start(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    Duration::try_days(i64::from(days))
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn matches_kind(record: &PatternRecord, kind: Option<PatternKind>) -> bool {
    kind.map_or(true, |k| record.kind == k)
}

/// Records of `kind` (any if `None`) timestamped in `[now - days, now]`, store order
pub(crate) fn in_window<'a>(
    records: &'a [PatternRecord],
    kind: Option<PatternKind>,
    days: u32,
    now: DateTime<Utc>,
) -> impl Iterator<Item = &'a PatternRecord> {
    let start = window_start(now, days);
    records
        .iter()
        .filter(move |r| matches_kind(r, kind) && r.timestamp >= start && r.timestamp <= now)
}

/// History over `[now - days, now]` with trend against the window before it
pub fn compute_history(
    records: &[PatternRecord],
    kind: Option<PatternKind>,
    days: u32,
    now: DateTime<Utc>,
) -> HistoryResult {
    let mut recent: Vec<&PatternRecord> = in_window(records, kind, days, now).collect();
    // sort_by is stable: equal timestamps stay in insertion order
    recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let start = window_start(now, days);
    let preceding_start = window_start(start, days);
    let preceding = records
        .iter()
        .filter(|r| matches_kind(r, kind) && r.timestamp >= preceding_start && r.timestamp < start)
        .count();

    HistoryResult {
        summary: HistorySummary {
            count: recent.len(),
            trend: classify_trend(recent.len(), preceding),
        },
        entries: recent.into_iter().map(HistoryEntry::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::NewPattern;

    fn at(kind: PatternKind, message: &str, ts: DateTime<Utc>) -> PatternRecord {
        PatternRecord::build(NewPattern::new(kind, message), ts, None)
    }

    fn seeded(now: DateTime<Utc>, recent: usize, preceding: usize) -> Vec<PatternRecord> {
        let mut records = Vec::new();
        for i in 0..preceding {
            records.push(at(PatternKind::Delegation, &format!("old {}", i), now - Duration::days(10)));
        }
        for i in 0..recent {
            records.push(at(PatternKind::Delegation, &format!("new {}", i), now - Duration::days(2)));
        }
        records
    }

    #[test]
    fn test_trend_thresholds() {
        assert_eq!(classify_trend(13, 10), Trend::Stable);
        assert_eq!(classify_trend(14, 10), Trend::Up);
        assert_eq!(classify_trend(6, 10), Trend::Down);
        assert_eq!(classify_trend(7, 10), Trend::Stable);
        assert_eq!(classify_trend(0, 10), Trend::Down);
    }

    #[test]
    fn test_trend_stable_without_preceding_data() {
        assert_eq!(classify_trend(0, 0), Trend::Stable);
        assert_eq!(classify_trend(50, 0), Trend::Stable);
    }

    #[test]
    fn test_history_trend_from_windows() {
        let now = Utc::now();
        assert_eq!(compute_history(&seeded(now, 14, 10), None, 7, now).summary.trend, Trend::Up);
        assert_eq!(compute_history(&seeded(now, 13, 10), None, 7, now).summary.trend, Trend::Stable);
        assert_eq!(compute_history(&seeded(now, 6, 10), None, 7, now).summary.trend, Trend::Down);
        assert_eq!(compute_history(&seeded(now, 3, 0), None, 7, now).summary.trend, Trend::Stable);
    }

    #[test]
    fn test_window_excludes_old_and_future_records() {
        let now = Utc::now();
        let records = vec![
            at(PatternKind::Clarity, "too old", now - Duration::days(8)),
            at(PatternKind::Clarity, "inside", now - Duration::days(6)),
            at(PatternKind::Clarity, "future", now + Duration::hours(1)),
        ];
        let history = compute_history(&records, None, 7, now);
        assert_eq!(history.summary.count, 1);
        assert_eq!(history.entries[0].message, "inside");
    }

    #[test]
    fn test_entries_most_recent_first_with_stable_ties() {
        let now = Utc::now();
        let tie = now - Duration::hours(3);
        let records = vec![
            at(PatternKind::Delegation, "oldest", now - Duration::days(1)),
            at(PatternKind::Delegation, "tie first", tie),
            at(PatternKind::Delegation, "newest", now - Duration::minutes(5)),
            at(PatternKind::Delegation, "tie second", tie),
        ];

        let history = compute_history(&records, None, 7, now);
        let messages: Vec<&str> = history.entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["newest", "tie first", "tie second", "oldest"]);
        assert!(history.entries.windows(2).all(|w| w[0].date >= w[1].date));
    }

    #[test]
    fn test_kind_filter_applies_to_both_windows() {
        let now = Utc::now();
        let mut records = seeded(now, 2, 2);
        for i in 0..5 {
            records.push(at(PatternKind::Vocabulary, &format!("v{}", i), now - Duration::days(1)));
        }

        let delegation = compute_history(&records, Some(PatternKind::Delegation), 7, now);
        assert_eq!(delegation.summary.count, 2);
        assert_eq!(delegation.summary.trend, Trend::Stable);
        assert!(delegation.entries.iter().all(|e| e.pattern == PatternKind::Delegation));

        let all = compute_history(&records, None, 7, now);
        assert_eq!(all.summary.count, 7);
        assert_eq!(all.summary.trend, Trend::Up);
    }

    #[test]
    fn test_window_beyond_calendar_range_clamps() {
        let now = Utc::now();
        let records = seeded(now, 2, 3);

        for days in [100_000_000, u32::MAX] {
            let history = compute_history(&records, None, days, now);
            assert_eq!(history.summary.count, 5);
            assert_eq!(history.summary.trend, Trend::Stable);
        }
        assert_eq!(window_start(now, u32::MAX), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_summary_serializes_lowercase_trend() {
        let summary = HistorySummary {
            count: 2,
            trend: Trend::Up,
        };
        assert_eq!(
            serde_json::to_value(&summary).unwrap(),
            serde_json::json!({"count": 2, "trend": "up"})
        );
    }
}
