use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{ALERT_CHANGE_THRESHOLD, HIGH_VOLATILITY_CHANGE};

/// Category-level valuation against the latest fresh prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub category: String,
    pub total_value: Decimal,
    pub percentage_of_portfolio: Decimal,
    pub num_coins: usize,
    pub weighted_avg_24h_change: Decimal,
}

/// Alert classification for a holding's 24h move. The wire labels match
/// the historical view output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertType {
    #[serde(rename = "High Volatility")]
    HighVolatility,
    #[serde(rename = "Significant Rise")]
    SignificantRise,
    #[serde(rename = "Significant Drop")]
    SignificantDrop,
    #[serde(rename = "Normal")]
    Normal,
}

impl AlertType {
    /// Buckets a 24h percentage change. The high-volatility check wins
    /// over the directional ones.
    pub fn classify(change: Decimal) -> Self {
        if change.abs() > HIGH_VOLATILITY_CHANGE {
            AlertType::HighVolatility
        } else if change > ALERT_CHANGE_THRESHOLD {
            AlertType::SignificantRise
        } else if change < -ALERT_CHANGE_THRESHOLD {
            AlertType::SignificantDrop
        } else {
            AlertType::Normal
        }
    }
}

/// A holding whose 24h move crossed the alert threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAlert {
    pub coin_id: String,
    pub symbol: String,
    pub name: String,
    pub current_price: Decimal,
    pub price_change_24h_pct: Decimal,
    pub alert_type: AlertType,
}
