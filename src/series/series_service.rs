use std::collections::HashMap;

use log::debug;

use super::series_model::PriceSeries;
use crate::market_data::PriceObservation;

/// An observation rejected while indexing, reported alongside the
/// series that did build.
#[derive(Debug, Clone)]
pub struct RejectedObservation {
    pub coin_id: String,
    pub message: String,
}

/// Per-asset ordered series built from a raw observation batch.
#[derive(Debug, Default)]
pub struct SeriesSet {
    pub series: HashMap<String, PriceSeries>,
    pub rejected: Vec<RejectedObservation>,
}

impl SeriesSet {
    pub fn get(&self, coin_id: &str) -> Option<&PriceSeries> {
        self.series.get(coin_id)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SeriesService;

impl SeriesService {
    pub fn new() -> Self {
        Self
    }

    /// Partitions a raw (possibly unordered) observation batch into one
    /// ordered series per asset. Malformed observations are rejected
    /// individually; the rest of the batch still indexes.
    pub fn index_observations(&self, observations: Vec<PriceObservation>) -> SeriesSet {
        let mut grouped: HashMap<String, Vec<PriceObservation>> = HashMap::new();
        let mut rejected = Vec::new();

        for observation in observations {
            if let Err(e) = observation.validate() {
                rejected.push(RejectedObservation {
                    coin_id: observation.coin_id.clone(),
                    message: e.to_string(),
                });
                continue;
            }
            grouped
                .entry(observation.coin_id.clone())
                .or_default()
                .push(observation);
        }

        let mut series = HashMap::with_capacity(grouped.len());
        for (coin_id, batch) in grouped {
            // Groups are non-empty by construction, so this cannot fail.
            if let Ok(ordered) = PriceSeries::from_observations(&coin_id, batch) {
                series.insert(coin_id, ordered);
            }
        }

        debug!(
            "Indexed {} asset series ({} observations rejected)",
            series.len(),
            rejected.len()
        );

        SeriesSet { series, rejected }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn observation(coin_id: &str, hour: u32, price: Decimal) -> PriceObservation {
        PriceObservation {
            coin_id: coin_id.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap(),
            price_usd: price,
            market_cap_usd: Decimal::ZERO,
            volume_24h_usd: Decimal::ZERO,
            price_change_24h_pct: None,
        }
    }

    #[test]
    fn test_partitions_by_asset() {
        let set = SeriesService::new().index_observations(vec![
            observation("bitcoin", 2, dec!(2)),
            observation("ethereum", 1, dec!(10)),
            observation("bitcoin", 1, dec!(1)),
        ]);

        assert_eq!(set.len(), 2);
        assert_eq!(set.get("bitcoin").unwrap().len(), 2);
        assert_eq!(
            set.get("bitcoin").unwrap().observations()[0].price_usd,
            dec!(1)
        );
        assert!(set.rejected.is_empty());
    }

    #[test]
    fn test_rejects_malformed_without_aborting_batch() {
        let set = SeriesService::new().index_observations(vec![
            observation("bitcoin", 1, dec!(1)),
            observation("", 2, dec!(2)),
            observation("bitcoin", 3, dec!(-3)),
        ]);

        assert_eq!(set.len(), 1);
        assert_eq!(set.get("bitcoin").unwrap().len(), 1);
        assert_eq!(set.rejected.len(), 2);
    }

    #[test]
    fn test_missing_asset_is_absent() {
        let set = SeriesService::new().index_observations(vec![]);
        assert!(set.is_empty());
        assert!(set.get("bitcoin").is_none());
    }
}
