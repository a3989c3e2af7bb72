use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::plans::PlanType;

/// A single recorded meeting, as read from the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingRecord {
    /// UTC timestamp when the meeting was recorded.
    pub created_at: DateTime<Utc>,
    /// Recorded length in seconds. Rows with no stored duration count as zero.
    #[serde(default)]
    pub duration_seconds: u64,
}

/// The subscription's current metering window. Invariant: `start <= end`.
///
/// Supplied by the billing backend; never derived from calendar months except
/// as a fallback when no cycle is known.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BillingCycle {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A user-chosen date filter from a date-only picker. Either side may be
/// absent; callers validate `start <= end` before handing the range over.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Whether the user supplied at least one side of the range.
    pub fn is_set(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }
}

/// The day-aligned instant window actually used to filter records.
///
/// A `None` side is unbounded. `explicit` records whether the window came
/// from a user-chosen range (affects labeling and activity-chart windowing)
/// rather than the billing-cycle default.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EffectiveRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub explicit: bool,
}

impl EffectiveRange {
    /// Inclusive containment check on both ends.
    ///
    /// An inverted window (`from > to`) contains nothing.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| ts >= from) && self.to.map_or(true, |to| ts <= to)
    }
}

/// One calendar day of activity for the dashboard chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivity {
    /// UTC calendar day key, `"%Y-%m-%d"`.
    pub date: String,
    /// Number of meetings recorded that day.
    pub meetings: u32,
    /// Total minutes recorded that day (rounded once on the day's sum).
    pub minutes: u64,
}

/// Derived usage statistics for one invocation of the pipeline.
///
/// Recomputed on every call; never mutated in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Lifetime meeting count, regardless of range.
    pub total_meetings: u32,
    /// Lifetime minutes, rounded once on the summed seconds.
    pub total_minutes: u64,
    /// Meetings whose timestamp falls inside the effective range.
    pub period_meetings: u32,
    /// Minutes inside the effective range, rounded once on the sum.
    pub period_minutes: u64,
    /// Mean meeting length in minutes over the period; zero when empty.
    pub average_duration_minutes: u64,
    /// Up to seven day buckets, oldest first.
    pub daily_activity: Vec<DailyActivity>,
}

/// Subscription state as maintained by the billing backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub plan_type: PlanType,
    /// Minutes included per cycle; `None` denotes unmetered.
    #[serde(default)]
    pub minutes_quota: Option<u32>,
    /// Authoritative minutes counter, owned and updated by the billing
    /// backend. Never recomputed from meeting records here; the backend may
    /// apply proration or credits this layer knows nothing about.
    #[serde(default)]
    pub minutes_used_this_month: f64,
    #[serde(default)]
    pub billing_cycle_start: Option<DateTime<Utc>>,
    pub billing_cycle_end: DateTime<Utc>,
    pub is_active: bool,
}

impl Subscription {
    /// The current metering window, when the backend supplied its start.
    pub fn billing_cycle(&self) -> Option<BillingCycle> {
        self.billing_cycle_start.map(|start| BillingCycle {
            start,
            end: self.billing_cycle_end,
        })
    }
}

/// Quota classification driving the dashboard warning banners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaStatus {
    /// Unlimited plan, or a metered plan with no quota on record.
    Unmetered,
    Normal,
    NearLimit,
    Reached,
}

impl QuotaStatus {
    /// Whether this status should surface a warning to the user.
    pub fn is_warning(&self) -> bool {
        matches!(self, QuotaStatus::NearLimit | QuotaStatus::Reached)
    }
}

/// The quota evaluator's verdict for one subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaAssessment {
    pub status: QuotaStatus,
    /// Whole minutes left in the cycle; `None` on unmetered plans.
    pub minutes_remaining: Option<u64>,
    /// Raw used/quota percentage; zero (and meaningless) when unmetered.
    pub usage_percentage: f64,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
