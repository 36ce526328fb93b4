use chrono::{DateTime, NaiveDate, Utc};

use crate::errors::SeriesError;
use crate::market_data::PriceObservation;

/// Time-ordered observation sequence for a single asset.
///
/// Ordering is ascending by timestamp with insertion order preserved
/// between equal timestamps, so positional lag lookups and window math
/// are deterministic across recomputations.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    coin_id: String,
    observations: Vec<PriceObservation>,
}

impl PriceSeries {
    /// Builds the ordered series for `coin_id` from a raw observation
    /// batch in ingestion order. Observations for other assets are
    /// ignored; an empty result is `SeriesError::Empty`.
    pub fn from_observations(
        coin_id: &str,
        mut observations: Vec<PriceObservation>,
    ) -> std::result::Result<Self, SeriesError> {
        observations.retain(|observation| observation.coin_id == coin_id);
        if observations.is_empty() {
            return Err(SeriesError::Empty(coin_id.to_string()));
        }
        // Stable sort keeps ingestion order between equal timestamps.
        observations.sort_by_key(|observation| observation.timestamp);
        Ok(Self {
            coin_id: coin_id.to_string(),
            observations,
        })
    }

    pub fn coin_id(&self) -> &str {
        &self.coin_id
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Positional access, used for fixed-lag lookbacks.
    pub fn get(&self, index: usize) -> Option<&PriceObservation> {
        self.observations.get(index)
    }

    pub fn observations(&self) -> &[PriceObservation] {
        &self.observations
    }

    /// Most recent observation. The series is never empty by construction.
    pub fn latest(&self) -> &PriceObservation {
        &self.observations[self.observations.len() - 1]
    }

    /// Nearest observation at or before `instant`, latest-timestamp wins
    /// (last inserted between equal timestamps).
    pub fn latest_on_or_before(&self, instant: DateTime<Utc>) -> Option<&PriceObservation> {
        let index = self
            .observations
            .partition_point(|observation| observation.timestamp <= instant);
        if index == 0 {
            None
        } else {
            Some(&self.observations[index - 1])
        }
    }

    /// The day's observations in order; empty when the day has none.
    pub fn observations_on(&self, date: NaiveDate) -> &[PriceObservation] {
        let start = self
            .observations
            .partition_point(|observation| observation.timestamp.date_naive() < date);
        let end = self
            .observations
            .partition_point(|observation| observation.timestamp.date_naive() <= date);
        &self.observations[start..end]
    }
}
