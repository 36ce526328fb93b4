use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Discrete trend label from comparing the current price with its 7-
/// and 30-position lags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    StrongUptrend,
    Uptrend,
    Sideways,
    Downtrend,
    StrongDowntrend,
}

/// Lagged percentage returns for one retained observation.
///
/// A momentum value is exactly zero (not null) when the series is
/// shorter than its lag or the lagged price was zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentumSnapshot {
    pub coin_id: String,
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
    pub momentum_1d: Decimal,
    pub momentum_7d: Decimal,
    pub momentum_30d: Decimal,
    pub trend_direction: TrendDirection,
}
