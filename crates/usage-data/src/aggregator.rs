//! Usage aggregation over lifetime, period, and daily windows.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use usage_core::models::{DailyActivity, EffectiveRange, MeetingRecord, UsageSnapshot};
use usage_core::time_utils::utc_day_key;

/// Days covered by the trailing activity window when no explicit range is
/// chosen. The activity chart always shows "last 7 days" in that case,
/// independent of the billing-cycle anchor.
pub const ACTIVITY_WINDOW_DAYS: i64 = 7;

/// Maximum number of day buckets surfaced to the chart.
pub const ACTIVITY_MAX_BUCKETS: usize = 7;

// ── DayBucket ─────────────────────────────────────────────────────────────────

/// Seconds and meeting count accumulated for one calendar day.
#[derive(Debug, Clone, Copy, Default)]
struct DayBucket {
    meetings: u32,
    seconds: u64,
}

impl DayBucket {
    fn add(&mut self, record: &MeetingRecord) {
        self.meetings += 1;
        self.seconds += record.duration_seconds;
    }
}

// ── UsageAggregator ───────────────────────────────────────────────────────────

/// Stateless helper that derives a [`UsageSnapshot`] from meeting records.
pub struct UsageAggregator;

impl UsageAggregator {
    /// Compute lifetime totals, period totals, average duration, and the
    /// daily activity series for one invocation.
    ///
    /// Lifetime totals cover every record regardless of `range`. Period
    /// totals cover records whose timestamp the range contains (inclusive on
    /// both ends). Minutes are rounded half-up exactly once, on each summed
    /// seconds figure, never per record.
    ///
    /// The activity series buckets on the UTC calendar day. An explicit
    /// range buckets the period records; otherwise the source is the
    /// trailing [`ACTIVITY_WINDOW_DAYS`]-day window ending at `now`. The
    /// newest [`ACTIVITY_MAX_BUCKETS`] buckets are kept and presented oldest
    /// first.
    pub fn aggregate(
        records: &[MeetingRecord],
        range: &EffectiveRange,
        now: DateTime<Utc>,
    ) -> UsageSnapshot {
        let total_meetings = records.len() as u32;
        let total_seconds: u64 = records.iter().map(|r| r.duration_seconds).sum();

        let period: Vec<&MeetingRecord> = records
            .iter()
            .filter(|r| range.contains(r.created_at))
            .collect();
        let period_seconds: u64 = period.iter().map(|r| r.duration_seconds).sum();
        let period_meetings = period.len() as u32;

        let average_duration_minutes = if period.is_empty() {
            0
        } else {
            round_to_minutes(period_seconds as f64 / period.len() as f64)
        };

        let daily_activity = if range.explicit {
            bucket_by_day(period.iter().copied())
        } else {
            let window_start = now - Duration::days(ACTIVITY_WINDOW_DAYS);
            bucket_by_day(records.iter().filter(|r| r.created_at >= window_start))
        };

        UsageSnapshot {
            total_meetings,
            total_minutes: round_to_minutes(total_seconds as f64),
            period_meetings,
            period_minutes: round_to_minutes(period_seconds as f64),
            average_duration_minutes,
            daily_activity,
        }
    }
}

// ── Private helpers ───────────────────────────────────────────────────────────

/// Half-up rounding of a seconds figure to whole minutes.
fn round_to_minutes(seconds: f64) -> u64 {
    (seconds / 60.0).round() as u64
}

/// Group records by UTC calendar day, keep the newest
/// [`ACTIVITY_MAX_BUCKETS`] days, and return them oldest first.
fn bucket_by_day<'a>(records: impl Iterator<Item = &'a MeetingRecord>) -> Vec<DailyActivity> {
    // BTreeMap keys sort ascending, so the newest days sit at the tail.
    let mut buckets: BTreeMap<String, DayBucket> = BTreeMap::new();
    for record in records {
        buckets
            .entry(utc_day_key(record.created_at))
            .or_default()
            .add(record);
    }

    let mut days: Vec<DailyActivity> = buckets
        .into_iter()
        .map(|(date, bucket)| DailyActivity {
            date,
            meetings: bucket.meetings,
            minutes: round_to_minutes(bucket.seconds as f64),
        })
        .collect();

    let cut = days.len().saturating_sub(ACTIVITY_MAX_BUCKETS);
    days.split_off(cut)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
