use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// A raw price observation from the ingestion layer.
///
/// Observations are append-only and arrive several times per day per
/// asset; timestamps are not guaranteed to be strictly increasing across
/// ingestion batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceObservation {
    pub coin_id: String,
    pub timestamp: DateTime<Utc>,
    pub price_usd: Decimal,
    pub market_cap_usd: Decimal,
    pub volume_24h_usd: Decimal,
    pub price_change_24h_pct: Option<Decimal>,
}

impl PriceObservation {
    /// 24h change with the ingestion fallback of zero.
    pub fn change_24h(&self) -> Decimal {
        self.price_change_24h_pct.unwrap_or(Decimal::ZERO)
    }

    /// Checks the record against the ingestion contract. A zero price is
    /// tolerated (ratio math guards for it); a negative one is not.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.coin_id.trim().is_empty() {
            return Err(ValidationError::MissingField("coin_id".to_string()));
        }
        if self.price_usd.is_sign_negative() {
            return Err(ValidationError::InvalidInput(format!(
                "observation for '{}' at {} has a negative price ({})",
                self.coin_id, self.timestamp, self.price_usd
            )));
        }
        Ok(())
    }
}
