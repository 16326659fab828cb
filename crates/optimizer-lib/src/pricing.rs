//! Tiered lifecycle cost model for backup storage
//!
//! Computes what a resource's snapshot-based backups cost today (daily
//! snapshots kept 30 days at the standard rate) against a tiered
//! hot/warm/cold retention schedule matched to the resource's criticality.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::classify::CriticalityLevel;

/// Resource kind a price applies to (the two kinds price differently)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    Ebs,
    Rds,
}

/// Per-GB-month storage rates for the three lifecycle tiers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitPrices {
    pub standard: f64,
    pub infrequent_access: f64,
    pub archive: f64,
}

impl UnitPrices {
    /// Built-in EBS snapshot rates used when no external pricing is supplied
    pub const fn ebs_defaults() -> Self {
        Self {
            standard: 0.05,
            infrequent_access: 0.0125,
            archive: 0.004,
        }
    }

    /// Built-in RDS snapshot rates used when no external pricing is supplied
    pub const fn rds_defaults() -> Self {
        Self {
            standard: 0.095,
            infrequent_access: 0.024,
            archive: 0.008,
        }
    }
}

/// Externally sourced unit prices, possibly covering only some kinds.
///
/// Resolution falls back to the built-in defaults for a kind with no
/// external price; the fallback is logged so degraded pricing accuracy is
/// never silent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceBook {
    #[serde(default)]
    pub ebs: Option<UnitPrices>,
    #[serde(default)]
    pub rds: Option<UnitPrices>,
}

impl PriceBook {
    pub fn resolve(&self, kind: ResourceKind) -> UnitPrices {
        let (external, defaults, label) = match kind {
            ResourceKind::Ebs => (self.ebs, UnitPrices::ebs_defaults(), "ebs"),
            ResourceKind::Rds => (self.rds, UnitPrices::rds_defaults(), "rds"),
        };
        match external {
            Some(prices) => prices,
            None => {
                warn!(
                    kind = label,
                    standard_rate = defaults.standard,
                    "no external unit prices available, using built-in defaults"
                );
                defaults
            }
        }
    }
}

/// Cost verdict for one resource's backups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Monthly cost of the current daily-snapshot-for-30-days scheme
    pub current_cost: f64,
    /// Monthly cost under the tiered retention schedule
    pub optimized_cost: f64,
    pub retention_policy: &'static str,
    pub frequency: &'static str,
    pub lifecycle_transition: &'static str,
}

impl CostEstimate {
    pub fn savings(&self) -> f64 {
        self.current_cost - self.optimized_cost
    }

    /// Only strictly positive savings are surfaced upstream; negative or
    /// zero savings rows are dropped, never reported as regressions.
    pub fn reportable(&self) -> bool {
        self.savings() > 0.0
    }
}

/// Estimate the current and optimized backup cost for one resource.
///
/// The current-cost baseline assumes one snapshot per day retained for 30
/// days at the standard rate, identical for every criticality tier. The
/// optimized schedule varies by tier:
/// - Critical: 4x daily hot for 7 days, infrequent access for 23 days,
///   archive for 52 weekly points
/// - Important: daily hot for 7 days, infrequent access for 12 weekly points
/// - Standard: daily hot for 7 days only
pub fn estimate_backup_cost(
    size_gb: f64,
    kind: ResourceKind,
    criticality: CriticalityLevel,
    prices: &UnitPrices,
) -> CostEstimate {
    let _ = kind; // rates are already kind-specific; kept for call-site clarity
    let current_cost = size_gb * prices.standard * 30.0;

    let (optimized_cost, retention_policy, frequency, lifecycle_transition) = match criticality {
        CriticalityLevel::Critical => (
            size_gb * prices.standard * 7.0 * 4.0
                + size_gb * prices.infrequent_access * 23.0
                + size_gb * prices.archive * 52.0,
            "7d hot, 30d warm, 365d cold",
            "4x daily",
            "Standard→IA(30d)→Glacier(90d)",
        ),
        CriticalityLevel::Important => (
            size_gb * prices.standard * 7.0 + size_gb * prices.infrequent_access * 12.0,
            "7d hot, 90d warm",
            "Daily",
            "Standard→IA(7d)→Glacier(30d)",
        ),
        CriticalityLevel::Standard => (
            size_gb * prices.standard * 7.0,
            "7d hot only",
            "Daily",
            "Standard→IA(7d)",
        ),
    };

    CostEstimate {
        current_cost,
        optimized_cost,
        retention_policy,
        frequency,
        lifecycle_transition,
    }
}
