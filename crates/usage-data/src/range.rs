//! Resolution of the effective reporting window.
//!
//! A user-chosen date range wins when present; otherwise the window is
//! anchored to the active billing cycle, never to the calendar month (a
//! subscription activated mid-month must not show a partial first week as
//! "the month").

use chrono::{DateTime, Utc};

use usage_core::models::{BillingCycle, DateRange, EffectiveRange};
use usage_core::time_utils::{end_of_day, first_of_month, start_of_day};

/// Stateless resolver from `(billing cycle, user range)` to the day-aligned
/// window used for filtering.
pub struct RangeResolver;

impl RangeResolver {
    /// Resolve the window to filter records by.
    ///
    /// * When either side of `user_range` is present the range is *explicit*:
    ///   the start day is aligned to midnight and the end day to
    ///   23:59:59.999, and a missing side stays unbounded.
    /// * Otherwise the window is `[cycle.start, now]`. With no known cycle,
    ///   the first day of the current calendar month stands in.
    ///
    /// Pure function of its inputs; `now` is injected so callers can pin
    /// time in tests.
    pub fn resolve(
        cycle: Option<&BillingCycle>,
        user_range: &DateRange,
        now: DateTime<Utc>,
    ) -> EffectiveRange {
        if user_range.is_set() {
            return EffectiveRange {
                from: user_range.start.map(start_of_day),
                to: user_range.end.map(end_of_day),
                explicit: true,
            };
        }

        let from = cycle
            .map(|c| c.start)
            .unwrap_or_else(|| first_of_month(now));
        EffectiveRange {
            from: Some(from),
            to: Some(now),
            explicit: false,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
