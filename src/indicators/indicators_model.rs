use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of the fast moving average relative to the slow one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendSignal {
    Bullish,
    Bearish,
    Neutral,
}

/// Technical indicator values for one retained observation.
///
/// `sma_fast`/`sma_slow` are simple trailing-window averages; the
/// windows truncate at the series start instead of failing, and RSI is
/// undefined (`None`) until deltas exist or while no losses occurred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalSnapshot {
    pub coin_id: String,
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
    pub sma_fast: Decimal,
    pub sma_slow: Decimal,
    pub trend_signal: TrendSignal,
    pub rsi: Option<Decimal>,
}
