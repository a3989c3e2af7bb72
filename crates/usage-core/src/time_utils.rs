use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::warn;

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Timezone-aware timestamp parsing for meeting exports.
///
/// Exports written by the web app carry RFC 3339 timestamps; older CSV-era
/// exports carry naive datetimes, which are interpreted in the handler's
/// default zone.
pub struct TimezoneHandler {
    default_tz: Tz,
}

impl TimezoneHandler {
    /// Create a handler with the given IANA timezone name as the default.
    ///
    /// If `tz_name` is not a recognised IANA timezone, falls back to UTC
    /// and logs a warning.
    pub fn new(tz_name: &str) -> Self {
        let tz = tz_name.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "TimezoneHandler: unrecognised timezone \"{}\", falling back to UTC",
                tz_name
            );
            Tz::UTC
        });
        Self { default_tz: tz }
    }

    /// Parse an ISO 8601 / RFC 3339 timestamp string into a UTC [`DateTime`].
    ///
    /// Handles the common `Z`-suffix form and any fixed UTC offset.
    /// Returns `None` for empty strings or unrecognised formats.
    pub fn parse_timestamp(&self, s: &str) -> Option<DateTime<Utc>> {
        if s.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }

        // Naive datetime without timezone – interpret as `default_tz`.
        const FMTS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
        ];
        for fmt in FMTS {
            if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
                use chrono::TimeZone as _;
                if let chrono::LocalResult::Single(dt) = self.default_tz.from_local_datetime(&naive)
                {
                    return Some(dt.with_timezone(&Utc));
                }
            }
        }

        warn!("TimezoneHandler: could not parse timestamp \"{}\"", s);
        None
    }

    /// Validate that `tz_name` is a recognised IANA timezone identifier.
    pub fn validate_timezone(tz_name: &str) -> bool {
        tz_name.parse::<Tz>().is_ok()
    }

    /// Expose the configured default timezone.
    pub fn default_tz(&self) -> Tz {
        self.default_tz
    }
}

impl Default for TimezoneHandler {
    fn default() -> Self {
        Self::new(&get_system_timezone())
    }
}

// ── Day alignment (UTC frame) ─────────────────────────────────────────────────

/// Midnight (00:00:00.000) of `date`, as a UTC instant.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .expect("midnight is a valid wall-clock time")
        .and_utc()
}

/// Last representable instant (23:59:59.999) of `date`, as a UTC instant.
///
/// Date-only pickers behave inclusively this way regardless of time-of-day
/// in the source timestamps.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .expect("23:59:59.999 is a valid wall-clock time")
        .and_utc()
}

/// Midnight of the first day of `now`'s calendar month (UTC).
///
/// Used only as the fallback window anchor when no billing cycle is known.
pub fn first_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    let first = NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .expect("every month has a first day");
    start_of_day(first)
}

/// The UTC calendar-day bucket key for a timestamp, `"%Y-%m-%d"`.
pub fn utc_day_key(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // ── parse_timestamp ───────────────────────────────────────────────────────

    #[test]
    fn test_parse_timestamp_z_suffix() {
        let handler = TimezoneHandler::new("UTC");
        let dt = handler.parse_timestamp("2024-03-01T10:30:00Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_fixed_offset() {
        let handler = TimezoneHandler::new("UTC");
        let dt = handler
            .parse_timestamp("2024-03-01T12:30:00+02:00")
            .unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_fractional_seconds() {
        let handler = TimezoneHandler::new("UTC");
        let dt = handler
            .parse_timestamp("2024-03-01T10:30:00.250Z")
            .unwrap();
        assert_eq!(dt.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_parse_timestamp_naive_uses_default_tz() {
        let handler = TimezoneHandler::new("Europe/Paris");
        // March 1st, Paris is UTC+1.
        let dt = handler.parse_timestamp("2024-03-01T10:30:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_naive_space_separator() {
        let handler = TimezoneHandler::new("UTC");
        let dt = handler.parse_timestamp("2024-03-01 10:30:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_empty_and_garbage() {
        let handler = TimezoneHandler::new("UTC");
        assert!(handler.parse_timestamp("").is_none());
        assert!(handler.parse_timestamp("yesterday at noon").is_none());
    }

    #[test]
    fn test_invalid_timezone_falls_back_to_utc() {
        let handler = TimezoneHandler::new("Mars/Olympus_Mons");
        assert_eq!(handler.default_tz(), Tz::UTC);
    }

    #[test]
    fn test_validate_timezone() {
        assert!(TimezoneHandler::validate_timezone("Europe/Paris"));
        assert!(TimezoneHandler::validate_timezone("UTC"));
        assert!(!TimezoneHandler::validate_timezone("Not/AZone"));
    }

    // ── day alignment ─────────────────────────────────────────────────────────

    #[test]
    fn test_start_of_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(
            start_of_day(date),
            Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_end_of_day_is_last_millisecond() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let end = end_of_day(date);
        assert_eq!(end.format("%H:%M:%S%.3f").to_string(), "23:59:59.999");
        assert!(end < start_of_day(NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()));
    }

    #[test]
    fn test_first_of_month() {
        let now = Utc.with_ymd_and_hms(2024, 3, 17, 15, 42, 0).unwrap();
        assert_eq!(
            first_of_month(now),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_first_of_month_already_first() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(first_of_month(now), now);
    }

    // ── utc_day_key ───────────────────────────────────────────────────────────

    #[test]
    fn test_utc_day_key_uses_utc_date_component() {
        // 23:30 UTC stays on the same UTC day, whatever the local zone was.
        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 23, 30, 0).unwrap();
        assert_eq!(utc_day_key(ts), "2024-03-05");
    }

    #[test]
    fn test_utc_day_key_midnight_boundary() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 6, 0, 0, 0).unwrap();
        assert_eq!(utc_day_key(ts), "2024-03-06");
    }
}
