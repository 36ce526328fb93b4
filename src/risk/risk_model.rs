use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Volatility bucket for a category/date row. An undefined volatility
/// falls through to low risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskCategory {
    LowRisk,
    MediumRisk,
    HighRisk,
}

/// Risk statistics for one (category, date) pair.
///
/// `max_drawdown_to_date` is a running minimum of the average return
/// from the start of the retained horizon, not a peak-to-trough equity
/// drawdown. Downstream consumers depend on this definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskSnapshot {
    pub category: String,
    pub date: NaiveDate,
    pub total_value: Decimal,
    pub avg_daily_return: Option<Decimal>,
    pub daily_volatility: Option<Decimal>,
    pub sharpe_ratio: Option<Decimal>,
    pub num_assets: usize,
    pub risk_category: RiskCategory,
    pub max_7d_return: Option<Decimal>,
    pub min_7d_return: Option<Decimal>,
    pub value_at_risk_95: Option<Decimal>,
    pub max_drawdown_to_date: Option<Decimal>,
}

/// Per-asset daily range volatility derived from the bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetVolatilitySnapshot {
    pub coin_id: String,
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub daily_volatility: Option<Decimal>,
    pub daily_return: Option<Decimal>,
    pub weekly_avg_volatility: Option<Decimal>,
}
