use chrono::{DateTime, Utc};

use crate::models::{QuotaAssessment, QuotaStatus, Subscription};
use crate::plans::PlanType;

// ── Policy constants ──────────────────────────────────────────────────────────

/// Usage percentage at which a metered plan reads as "near limit".
pub const NEAR_LIMIT_PERCENT: f64 = 80.0;

/// Usage percentage at which a metered plan reads as "reached" even when the
/// raw counter sits fractionally below the quota (absorbs rounding near-misses
/// from the backend's accounting).
pub const QUOTA_REACHED_PERCENT: f64 = 99.0;

// ── QuotaEvaluator ────────────────────────────────────────────────────────────

/// Stateless quota classification over a subscription row.
///
/// Consumes only the backend-maintained `minutes_used_this_month` counter;
/// meeting records never enter this path.
pub struct QuotaEvaluator;

impl QuotaEvaluator {
    /// Classify the subscription's quota state.
    ///
    /// * Unlimited plans are [`QuotaStatus::Unmetered`] with no remaining
    ///   figure and a zero percentage.
    /// * A starter plan with no quota on record is also treated as unmetered
    ///   rather than showing a false warning.
    /// * Otherwise: `Reached` when `used >= quota` or the percentage is at
    ///   least [`QUOTA_REACHED_PERCENT`]; `NearLimit` from
    ///   [`NEAR_LIMIT_PERCENT`]; `Normal` below that.
    pub fn evaluate(subscription: &Subscription) -> QuotaAssessment {
        let quota = match (subscription.plan_type, subscription.minutes_quota) {
            (PlanType::Unlimited, _) => None,
            (PlanType::Starter, Some(q)) if q > 0 => Some(q),
            (PlanType::Starter, _) => None,
        };

        let Some(quota) = quota else {
            return QuotaAssessment {
                status: QuotaStatus::Unmetered,
                minutes_remaining: None,
                usage_percentage: 0.0,
            };
        };

        let used = subscription.minutes_used_this_month.max(0.0);
        let usage_percentage = used / f64::from(quota) * 100.0;

        let status = if used >= f64::from(quota) || usage_percentage >= QUOTA_REACHED_PERCENT {
            QuotaStatus::Reached
        } else if usage_percentage >= NEAR_LIMIT_PERCENT {
            QuotaStatus::NearLimit
        } else {
            QuotaStatus::Normal
        };

        // Truncate: a fractional counter never inflates the remainder.
        let minutes_remaining = (f64::from(quota) - used).max(0.0) as u64;

        QuotaAssessment {
            status,
            minutes_remaining: Some(minutes_remaining),
            usage_percentage,
        }
    }

    /// Whole days until the cycle renews, floored at zero once the cycle end
    /// has passed.
    pub fn days_until_renewal(subscription: &Subscription, now: DateTime<Utc>) -> i64 {
        (subscription.billing_cycle_end - now).num_days().max(0)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
