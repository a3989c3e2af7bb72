use crate::error::{Result, UsageError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Available subscription plan types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    /// Metered entry plan with a monthly minutes quota.
    Starter,
    /// Flat-rate plan with no minutes quota.
    Unlimited,
}

impl FromStr for PlanType {
    type Err = UsageError;

    /// Case-insensitive construction from a string slice.
    ///
    /// Accepts `"starter"` and `"unlimited"` (case-insensitive).
    /// Returns [`UsageError::InvalidPlan`] for unrecognised strings.
    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "starter" => Ok(PlanType::Starter),
            "unlimited" => Ok(PlanType::Unlimited),
            other => Err(UsageError::InvalidPlan(other.to_string())),
        }
    }
}

impl PlanType {
    /// The canonical lowercase string identifier for this plan.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Starter => "starter",
            PlanType::Unlimited => "unlimited",
        }
    }
}

/// Immutable configuration record for a single subscription plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanConfig {
    /// Canonical lowercase name that matches [`PlanType::as_str`].
    pub name: String,
    /// Minutes included per billing cycle; `None` means unmetered.
    pub minutes_quota: Option<u32>,
    /// Monthly price in euros.
    pub monthly_price_eur: f64,
    /// Human-readable plan name for display purposes.
    pub display_name: String,
}

impl PlanConfig {
    /// Compact quota string for display (e.g. `"600 min"`, `"unlimited"`).
    pub fn formatted_quota(&self) -> String {
        match self.minutes_quota {
            Some(q) => format!("{} min", q),
            None => "unlimited".to_string(),
        }
    }
}

// ── Shared constants ──────────────────────────────────────────────────────────

/// Quota backstop applied when a metered plan row carries no quota value.
pub const DEFAULT_MINUTES_QUOTA: u32 = 600;

// ── Plan data ─────────────────────────────────────────────────────────────────

fn plan_configs() -> HashMap<PlanType, PlanConfig> {
    let mut map = HashMap::new();
    map.insert(
        PlanType::Starter,
        PlanConfig {
            name: "starter".to_string(),
            minutes_quota: Some(600),
            monthly_price_eur: 29.0,
            display_name: "Starter".to_string(),
        },
    );
    map.insert(
        PlanType::Unlimited,
        PlanConfig {
            name: "unlimited".to_string(),
            minutes_quota: None,
            monthly_price_eur: 39.0,
            display_name: "Unlimited".to_string(),
        },
    );
    map
}

/// Registry of all plan configurations with static helper methods.
pub struct Plans;

impl Plans {
    /// The quota backstop for metered plans with no stored quota.
    pub const DEFAULT_MINUTES_QUOTA: u32 = DEFAULT_MINUTES_QUOTA;

    /// Return all plan configurations keyed by [`PlanType`].
    pub fn all_plans() -> HashMap<PlanType, PlanConfig> {
        plan_configs()
    }

    /// Return the configuration for a specific [`PlanType`].
    pub fn get_plan(plan_type: PlanType) -> PlanConfig {
        plan_configs()
            .remove(&plan_type)
            .expect("all PlanType variants are present in plan_configs")
    }

    /// Return the configuration for a plan identified by its string name.
    ///
    /// Returns `None` if the name is not recognised.
    pub fn get_plan_by_name(name: &str) -> Option<PlanConfig> {
        let pt = name.parse::<PlanType>().ok()?;
        Some(Self::get_plan(pt))
    }

    /// Minutes quota for the given plan type; `None` for unmetered plans.
    pub fn minutes_quota(plan_type: PlanType) -> Option<u32> {
        Self::get_plan(plan_type).minutes_quota
    }

    /// Returns `true` if `plan` is a recognised plan name.
    pub fn is_valid_plan(plan: &str) -> bool {
        Self::get_plan_by_name(plan).is_some()
    }
}
