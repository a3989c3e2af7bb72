//! Top-level report pipeline.
//!
//! Orchestrates range resolution, aggregation, and quota classification,
//! returning a [`UsageReport`] ready for the presentation layer. Every
//! invocation is an independent, idempotent computation over the inputs it
//! is handed; nothing is cached or mutated between calls.

use chrono::{DateTime, Utc};

use usage_core::models::{
    DateRange, EffectiveRange, MeetingRecord, QuotaAssessment, Subscription, UsageSnapshot,
};
use usage_core::quota::QuotaEvaluator;

use crate::aggregator::UsageAggregator;
use crate::range::RangeResolver;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the report.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ReportMetadata {
    /// ISO-8601 timestamp when this report was generated.
    pub generated_at: String,
    /// Number of meeting records processed.
    pub records_processed: usize,
}

/// The complete output of [`build_report`].
#[derive(Debug, Clone)]
pub struct UsageReport {
    /// Usage statistics over the lifetime / period / daily frames.
    pub snapshot: UsageSnapshot,
    /// Quota classification from the subscription's own counter.
    pub quota: QuotaAssessment,
    /// The resolved window, kept for "this cycle" vs "selected period"
    /// labeling.
    pub range: EffectiveRange,
    /// Metadata about this report run.
    pub metadata: ReportMetadata,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full reporting pipeline.
///
/// 1. Resolve the effective window from the subscription's billing cycle and
///    the optional user range.
/// 2. Aggregate the meeting records into a [`UsageSnapshot`].
/// 3. Classify the quota state from the subscription row alone: the
///    `minutes_used_this_month` counter is the backend's ground truth and is
///    never reconstructed from the records aggregated in step 2.
///
/// `now` is injected so callers (and tests) control the clock.
pub fn build_report(
    records: &[MeetingRecord],
    subscription: &Subscription,
    user_range: &DateRange,
    now: DateTime<Utc>,
) -> UsageReport {
    let cycle = subscription.billing_cycle();
    let range = RangeResolver::resolve(cycle.as_ref(), user_range, now);

    let snapshot = UsageAggregator::aggregate(records, &range, now);

    let quota = QuotaEvaluator::evaluate(subscription);

    let metadata = ReportMetadata {
        generated_at: now.to_rfc3339(),
        records_processed: records.len(),
    };

    UsageReport {
        snapshot,
        quota,
        range,
        metadata,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
