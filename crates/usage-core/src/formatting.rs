use chrono::NaiveDate;

/// Format a minutes total as a human-readable duration.
///
/// * `< 60` minutes → `"45m"`
/// * `≥ 60` minutes, no remainder → `"3h"`
/// * `≥ 60` minutes, with remainder → `"3h 45m"`
///
/// # Examples
///
/// ```
/// use usage_core::formatting::format_minutes;
///
/// assert_eq!(format_minutes(45),  "45m");
/// assert_eq!(format_minutes(60),  "1h");
/// assert_eq!(format_minutes(225), "3h 45m");
/// assert_eq!(format_minutes(0),   "0m");
/// ```
pub fn format_minutes(minutes: u64) -> String {
    if minutes < 60 {
        format!("{}m", minutes)
    } else {
        let hours = minutes / 60;
        let mins = minutes % 60;
        if mins == 0 {
            format!("{}h", hours)
        } else {
            format!("{}h {}m", hours, mins)
        }
    }
}

/// Render the subscription card's usage line, e.g. `"480 / 600 min"`.
///
/// The used counter is shown with one decimal only when it is fractional.
pub fn format_quota_line(used: f64, quota: u32) -> String {
    if used.fract() == 0.0 {
        format!("{:.0} / {} min", used, quota)
    } else {
        format!("{:.1} / {} min", used, quota)
    }
}

/// Progress-bar fill percentage for the quota card, clamped to `[0, 100]`.
///
/// Returns `0.0` when the quota is zero.
pub fn progress_percentage(used: f64, quota: u32) -> f64 {
    if quota == 0 {
        return 0.0;
    }
    (used.max(0.0) / f64::from(quota) * 100.0).min(100.0)
}

/// Relative label for a day bucket in the activity list.
///
/// `"Today"`, `"Yesterday"`, or a short date like `"Tue  5 Mar"`. Keys that
/// do not parse as `%Y-%m-%d` are returned unchanged.
pub fn day_label(date_key: &str, today: NaiveDate) -> String {
    let Ok(date) = NaiveDate::parse_from_str(date_key, "%Y-%m-%d") else {
        return date_key.to_string();
    };
    if date == today {
        "Today".to_string()
    } else if date.succ_opt() == Some(today) {
        "Yesterday".to_string()
    } else {
        date.format("%a %e %b").to_string()
    }
}

/// Heading for the period stat tile.
pub fn period_label(explicit: bool) -> &'static str {
    if explicit {
        "Selected period"
    } else {
        "Current cycle"
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
