mod bootstrap;
mod render;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;

use usage_core::models::DateRange;
use usage_core::time_utils::{get_system_timezone, TimezoneHandler};
use usage_data::reader::{load_meeting_records, load_subscription};
use usage_data::report::build_report;

/// Usage analytics and quota monitoring for meeting subscriptions
#[derive(Parser, Debug)]
#[command(
    name = "minutier",
    about = "Usage analytics and quota monitoring for meeting subscriptions",
    version
)]
struct Cli {
    /// Directory holding meeting export files (.json / .jsonl)
    #[arg(long)]
    data_path: Option<PathBuf>,

    /// Path to the subscription JSON document
    #[arg(long)]
    subscription: Option<PathBuf>,

    /// Start of an explicit date filter (YYYY-MM-DD, inclusive)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// End of an explicit date filter (YYYY-MM-DD, inclusive)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Timezone for naive export timestamps (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    timezone: String,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    bootstrap::setup_logging(&cli.log_level)?;

    tracing::debug!("minutier v{} starting", env!("CARGO_PKG_VERSION"));

    // Inverted ranges are rejected here, at the edge; the pipeline below
    // assumes its inputs were validated.
    if let (Some(from), Some(to)) = (cli.from, cli.to) {
        if from > to {
            bail!("--from ({from}) must not be after --to ({to})");
        }
    }

    let tz_name = if cli.timezone == "auto" {
        get_system_timezone()
    } else {
        cli.timezone.clone()
    };
    let tz = TimezoneHandler::new(&tz_name);

    let records = load_meeting_records(cli.data_path.as_deref(), &tz);
    let subscription_path = resolve_subscription_path(cli.subscription);
    let subscription = load_subscription(&subscription_path)
        .with_context(|| format!("loading subscription from {}", subscription_path.display()))?;

    let user_range = DateRange {
        start: cli.from,
        end: cli.to,
    };

    let now = Utc::now();
    let report = build_report(&records, &subscription, &user_range, now);

    print!("{}", render::render_report(&report, &subscription, now));

    Ok(())
}

/// Default subscription location: `~/.minutier/subscription.json`.
fn resolve_subscription_path(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(p) = explicit {
        return p;
    }
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".minutier").join("subscription.json")
}
