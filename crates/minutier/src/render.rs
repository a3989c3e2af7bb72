//! Plain-text rendering of a usage report.
//!
//! Mirrors the dashboard layout: subscription card first, then the stat
//! tiles, then the recent-activity list. Pure string building so the output
//! is testable without capturing stdout.

use chrono::{DateTime, Utc};

use usage_core::formatting::{
    day_label, format_minutes, format_quota_line, period_label, progress_percentage,
};
use usage_core::models::{QuotaStatus, Subscription};
use usage_core::plans::Plans;
use usage_core::quota::QuotaEvaluator;
use usage_data::report::UsageReport;

/// Render the full report as a multi-line string.
pub fn render_report(
    report: &UsageReport,
    subscription: &Subscription,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();

    render_subscription_card(&mut out, report, subscription, now);
    out.push('\n');
    render_stat_tiles(&mut out, report);
    out.push('\n');
    render_activity(&mut out, report, now);

    out
}

// ── Sections ──────────────────────────────────────────────────────────────────

fn render_subscription_card(
    out: &mut String,
    report: &UsageReport,
    subscription: &Subscription,
    now: DateTime<Utc>,
) {
    let plan = Plans::get_plan(subscription.plan_type);
    let status_word = if subscription.is_active {
        "active"
    } else {
        "inactive"
    };
    out.push_str(&format!(
        "Plan: {} ({:.0} EUR/month) - {}\n",
        plan.display_name, plan.monthly_price_eur, status_word
    ));

    match subscription.minutes_quota {
        Some(quota) if report.quota.status != QuotaStatus::Unmetered => {
            let used = subscription.minutes_used_this_month;
            out.push_str(&format!(
                "  {}  [{:.1}%]\n",
                format_quota_line(used, quota),
                progress_percentage(used, quota)
            ));
        }
        _ => {
            out.push_str(&format!(
                "  Unlimited meetings - {:.0} minutes used this cycle\n",
                subscription.minutes_used_this_month
            ));
        }
    }

    match report.quota.status {
        QuotaStatus::Reached => out.push_str("  ! Quota reached\n"),
        QuotaStatus::NearLimit => {
            let remaining = report.quota.minutes_remaining.unwrap_or(0);
            out.push_str(&format!(
                "  ! Quota almost reached - {} minutes remaining\n",
                remaining
            ));
        }
        QuotaStatus::Normal | QuotaStatus::Unmetered => {}
    }

    let days = QuotaEvaluator::days_until_renewal(subscription, now);
    out.push_str(&format!("  Renews in {} day{}\n", days, plural(days)));
}

fn render_stat_tiles(out: &mut String, report: &UsageReport) {
    let snapshot = &report.snapshot;
    out.push_str(&format!("{}\n", period_label(report.range.explicit)));
    out.push_str(&format!(
        "  Meetings:          {} (lifetime {})\n",
        snapshot.period_meetings, snapshot.total_meetings
    ));
    out.push_str(&format!(
        "  Minutes:           {} (lifetime {})\n",
        format_minutes(snapshot.period_minutes),
        format_minutes(snapshot.total_minutes)
    ));
    out.push_str(&format!(
        "  Average duration:  {}\n",
        format_minutes(snapshot.average_duration_minutes)
    ));
}

fn render_activity(out: &mut String, report: &UsageReport, now: DateTime<Utc>) {
    out.push_str("Recent activity\n");
    if report.snapshot.daily_activity.is_empty() {
        out.push_str("  No recent activity\n");
        return;
    }

    let today = now.date_naive();
    for day in &report.snapshot.daily_activity {
        out.push_str(&format!(
            "  {:<12} {} meeting{}, {}\n",
            day_label(&day.date, today),
            day.meetings,
            plural(i64::from(day.meetings)),
            format_minutes(day.minutes)
        ));
    }
}

fn plural(count: i64) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
