use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::market_data_model::PriceObservation;
use crate::errors::Result;

/// Read-only access to the append-only price observation history.
///
/// `since` narrows the fetch; the engine still applies its own horizon
/// filters, so a provider may return more than asked for.
#[async_trait]
pub trait PriceHistoryProviderTrait: Send + Sync {
    /// Observation history for one asset.
    async fn get_price_history(
        &self,
        coin_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PriceObservation>>;

    /// Observation history across all assets.
    async fn get_all_price_history(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PriceObservation>>;
}
