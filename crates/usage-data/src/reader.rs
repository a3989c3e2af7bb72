//! Meeting-export discovery and loading.
//!
//! Reads meeting rows exported by the web app (JSONL files with one row per
//! line, or plain JSON array files) and converts them into
//! [`MeetingRecord`]s for the aggregation pipeline. The subscription row is
//! read from a single JSON document.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use usage_core::error::{Result, UsageError};
use usage_core::models::{MeetingRecord, Subscription};
use usage_core::time_utils::TimezoneHandler;

// ── Wire shape ────────────────────────────────────────────────────────────────

/// One exported meeting row, exactly as the storage layer writes it.
///
/// Kept separate from [`MeetingRecord`] so tolerance rules live at the read
/// boundary: absent or null durations become zero, rows without a timestamp
/// are dropped.
#[derive(Debug, Deserialize)]
struct MeetingRow {
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    created_at: Option<String>,
}

impl MeetingRow {
    fn into_record(self, tz: &TimezoneHandler) -> Option<MeetingRecord> {
        let raw_ts = self.created_at?;
        let created_at = tz.parse_timestamp(&raw_ts)?;
        let duration_seconds = self.duration.map(|d| d.max(0.0) as u64).unwrap_or(0);
        Some(MeetingRecord {
            created_at,
            duration_seconds,
        })
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.json` / `.jsonl` export files recursively under `data_path`,
/// sorted by path.
pub fn find_export_files(data_path: &Path) -> Vec<PathBuf> {
    if !data_path.exists() {
        warn!("Data path does not exist: {}", data_path.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "jsonl" || ext == "json")
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Load every meeting record under `data_path` (default `~/.minutier/meetings`).
///
/// Malformed files, lines, and rows are skipped with a warning; a missing or
/// empty directory yields an empty list. The merged records are sorted by
/// `created_at`, since sources arrive in arbitrary order.
pub fn load_meeting_records(data_path: Option<&Path>, tz: &TimezoneHandler) -> Vec<MeetingRecord> {
    let path = resolve_data_path(data_path);
    let export_files = find_export_files(&path);
    if export_files.is_empty() {
        warn!("No export files found in {}", path.display());
        return Vec::new();
    }

    let mut records: Vec<MeetingRecord> = Vec::new();
    for file_path in &export_files {
        records.extend(read_single_file(file_path, tz));
    }

    records.sort_by_key(|r| r.created_at);

    debug!(
        "Loaded {} meeting records from {} files",
        records.len(),
        export_files.len()
    );

    records
}

/// Read the subscription row from a JSON document at `path`.
///
/// Unlike meeting loading this is not tolerant: without a subscription there
/// is no quota to classify, so errors propagate.
pub fn load_subscription(path: &Path) -> Result<Subscription> {
    let content = std::fs::read_to_string(path).map_err(|source| UsageError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let subscription = serde_json::from_str(&content)?;
    Ok(subscription)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Resolve the data path: use `data_path` when given, otherwise fall back to
/// `~/.minutier/meetings`.
fn resolve_data_path(data_path: Option<&Path>) -> PathBuf {
    if let Some(p) = data_path {
        return p.to_path_buf();
    }
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".minutier").join("meetings")
}

/// Read one export file. JSONL files are parsed line by line; `.json` files
/// are parsed as a single array of rows.
fn read_single_file(file_path: &Path, tz: &TimezoneHandler) -> Vec<MeetingRecord> {
    let is_jsonl = file_path
        .extension()
        .map(|ext| ext == "jsonl")
        .unwrap_or(false);

    if is_jsonl {
        read_jsonl_file(file_path, tz)
    } else {
        read_json_array_file(file_path, tz)
    }
}

fn read_jsonl_file(file_path: &Path, tz: &TimezoneHandler) -> Vec<MeetingRecord> {
    let file = match std::fs::File::open(file_path) {
        Ok(f) => f,
        Err(e) => {
            warn!("Failed to read file {}: {}", file_path.display(), e);
            return Vec::new();
        }
    };

    let reader = std::io::BufReader::new(file);
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for line_result in reader.lines() {
        let line = match line_result {
            Ok(l) => l,
            Err(_) => continue,
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str::<MeetingRow>(trimmed) {
            Ok(row) => match row.into_record(tz) {
                Some(record) => records.push(record),
                None => skipped += 1,
            },
            Err(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(
            "Skipped {} unusable rows in {}",
            skipped,
            file_path.display()
        );
    }

    records
}

fn read_json_array_file(file_path: &Path, tz: &TimezoneHandler) -> Vec<MeetingRecord> {
    let content = match std::fs::read_to_string(file_path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read file {}: {}", file_path.display(), e);
            return Vec::new();
        }
    };

    let rows: Vec<MeetingRow> = match serde_json::from_str(&content) {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Failed to parse {}: {}", file_path.display(), e);
            return Vec::new();
        }
    };

    rows.into_iter()
        .filter_map(|row| row.into_record(tz))
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn utc_handler() -> TimezoneHandler {
        TimezoneHandler::new("UTC")
    }

    fn write_file(dir: &Path, name: &str, content: &str) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        write!(file, "{}", content).unwrap();
    }

    // ── find_export_files ─────────────────────────────────────────────────────

    #[test]
    fn test_find_export_files_filters_extensions() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.jsonl", "");
        write_file(dir.path(), "b.json", "[]");
        write_file(dir.path(), "notes.txt", "nope");

        let files = find_export_files(dir.path());
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_find_export_files_recurses_and_sorts() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("2024")).unwrap();
        write_file(&dir.path().join("2024"), "march.jsonl", "");
        write_file(dir.path(), "april.jsonl", "");

        let files = find_export_files(dir.path());
        assert_eq!(files.len(), 2);
        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
    }

    #[test]
    fn test_find_export_files_missing_dir() {
        let files = find_export_files(Path::new("/definitely/not/here"));
        assert!(files.is_empty());
    }

    // ── load_meeting_records ──────────────────────────────────────────────────

    #[test]
    fn test_load_jsonl_rows() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "meetings.jsonl",
            "{\"duration\": 1800, \"created_at\": \"2024-03-01T10:00:00Z\"}\n\
             {\"duration\": 600, \"created_at\": \"2024-03-02T10:00:00Z\"}\n",
        );

        let records = load_meeting_records(Some(dir.path()), &utc_handler());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].duration_seconds, 1800);
    }

    #[test]
    fn test_load_json_array_file() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "meetings.json",
            r#"[
                {"duration": 300, "created_at": "2024-03-01T10:00:00Z"},
                {"duration": 900, "created_at": "2024-03-01T11:00:00Z"}
            ]"#,
        );

        let records = load_meeting_records(Some(dir.path()), &utc_handler());
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_load_skips_bad_lines_keeps_good_ones() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "meetings.jsonl",
            "not json at all\n\
             {\"duration\": 600, \"created_at\": \"2024-03-02T10:00:00Z\"}\n\
             \n\
             {\"created_at\": \"bogus timestamp\", \"duration\": 60}\n",
        );

        let records = load_meeting_records(Some(dir.path()), &utc_handler());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].duration_seconds, 600);
    }

    #[test]
    fn test_load_null_and_missing_duration_become_zero() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "meetings.jsonl",
            "{\"duration\": null, \"created_at\": \"2024-03-01T10:00:00Z\"}\n\
             {\"created_at\": \"2024-03-02T10:00:00Z\"}\n",
        );

        let records = load_meeting_records(Some(dir.path()), &utc_handler());
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.duration_seconds == 0));
    }

    #[test]
    fn test_load_drops_rows_without_timestamp() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "meetings.jsonl", "{\"duration\": 600}\n");

        let records = load_meeting_records(Some(dir.path()), &utc_handler());
        assert!(records.is_empty());
    }

    #[test]
    fn test_load_merges_and_sorts_across_files() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "b.jsonl",
            "{\"duration\": 60, \"created_at\": \"2024-03-05T10:00:00Z\"}\n",
        );
        write_file(
            dir.path(),
            "a.jsonl",
            "{\"duration\": 60, \"created_at\": \"2024-03-09T10:00:00Z\"}\n",
        );

        let records = load_meeting_records(Some(dir.path()), &utc_handler());
        assert_eq!(records.len(), 2);
        assert!(records[0].created_at < records[1].created_at);
    }

    #[test]
    fn test_load_empty_directory() {
        let dir = TempDir::new().unwrap();
        let records = load_meeting_records(Some(dir.path()), &utc_handler());
        assert!(records.is_empty());
    }

    // ── load_subscription ─────────────────────────────────────────────────────

    #[test]
    fn test_load_subscription_ok() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "subscription.json",
            r#"{
                "plan_type": "starter",
                "minutes_quota": 600,
                "minutes_used_this_month": 480,
                "billing_cycle_start": "2024-03-12T00:00:00Z",
                "billing_cycle_end": "2024-04-12T00:00:00Z",
                "is_active": true
            }"#,
        );

        let sub = load_subscription(&dir.path().join("subscription.json")).unwrap();
        assert_eq!(sub.minutes_quota, Some(600));
    }

    #[test]
    fn test_load_subscription_missing_file_keeps_path() {
        let err = load_subscription(Path::new("/no/such/subscription.json")).unwrap_err();
        assert!(matches!(err, UsageError::FileRead { .. }));
        assert!(err.to_string().contains("/no/such/subscription.json"));
    }

    #[test]
    fn test_load_subscription_invalid_json() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "subscription.json", "{broken");

        let err = load_subscription(&dir.path().join("subscription.json")).unwrap_err();
        assert!(matches!(err, UsageError::JsonParse(_)));
    }
}
