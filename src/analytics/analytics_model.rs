use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::bars::DailyBar;
use crate::constants::{DEFAULT_FRESHNESS_HOURS, DEFAULT_HORIZON_DAYS, DEFAULT_RISK_SOURCE_DAYS};
use crate::indicators::TechnicalSnapshot;
use crate::momentum::MomentumSnapshot;
use crate::performance::{PortfolioSnapshot, PriceAlert};
use crate::risk::{AssetVolatilitySnapshot, RiskSnapshot};

/// Horizon configuration for the derived views.
///
/// Every view method takes an explicit reference time; nothing in the
/// engine reads the wall clock, so identical inputs always produce
/// identical output.
#[derive(Debug, Clone)]
pub struct AnalyticsOptions {
    /// Retention horizon for technical indicator snapshots.
    pub technical_horizon: Duration,
    /// Retention horizon for momentum snapshots.
    pub momentum_horizon: Duration,
    /// Retention horizon for risk and asset volatility rows.
    pub risk_horizon: Duration,
    /// How far back raw observations feed the risk pipeline.
    pub risk_source_horizon: Duration,
    /// Maximum age of a price used for portfolio valuation.
    pub freshness_window: Duration,
}

impl Default for AnalyticsOptions {
    fn default() -> Self {
        Self {
            technical_horizon: Duration::days(DEFAULT_HORIZON_DAYS),
            momentum_horizon: Duration::days(DEFAULT_HORIZON_DAYS),
            risk_horizon: Duration::days(DEFAULT_HORIZON_DAYS),
            risk_source_horizon: Duration::days(DEFAULT_RISK_SOURCE_DAYS),
            freshness_window: Duration::hours(DEFAULT_FRESHNESS_HOURS),
        }
    }
}

/// Which derived view to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewKind {
    DailyBars,
    TechnicalIndicators,
    PriceMomentum,
    RiskAnalysis,
    AssetVolatility,
    PortfolioPerformance,
    PriceAlerts,
}

/// One isolated per-record or per-asset failure, returned alongside
/// whatever did compute. `scope` is the coin id or category involved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeIssue {
    pub scope: String,
    pub message: String,
}

/// Computed records plus the issues isolated while producing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport<T> {
    pub records: Vec<T>,
    pub issues: Vec<ComputeIssue>,
}

impl<T> AnalyticsReport<T> {
    pub fn new(records: Vec<T>, issues: Vec<ComputeIssue>) -> Self {
        Self { records, issues }
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Typed result of the generic `compute_view` contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "report", rename_all = "camelCase")]
pub enum ComputedView {
    DailyBars(AnalyticsReport<DailyBar>),
    TechnicalIndicators(AnalyticsReport<TechnicalSnapshot>),
    PriceMomentum(AnalyticsReport<MomentumSnapshot>),
    RiskAnalysis(AnalyticsReport<RiskSnapshot>),
    AssetVolatility(AnalyticsReport<AssetVolatilitySnapshot>),
    PortfolioPerformance(AnalyticsReport<PortfolioSnapshot>),
    PriceAlerts(AnalyticsReport<PriceAlert>),
}
