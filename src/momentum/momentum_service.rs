use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::momentum_model::{MomentumSnapshot, TrendDirection};
use crate::constants::{MOMENTUM_LAG_1D, MOMENTUM_LAG_30D, MOMENTUM_LAG_7D};
use crate::market_data::PriceObservation;
use crate::series::PriceSeries;

#[derive(Debug, Clone, Default)]
pub struct MomentumService;

impl MomentumService {
    pub fn new() -> Self {
        Self
    }

    /// Computes lagged momentum and a trend label for observations at or
    /// after `cutoff`. Lags are positions in the observation sequence,
    /// not calendar days.
    pub fn momentum_snapshots(
        &self,
        series: &PriceSeries,
        cutoff: DateTime<Utc>,
    ) -> Vec<MomentumSnapshot> {
        let observations = series.observations();
        let mut snapshots = Vec::new();

        for (index, observation) in observations.iter().enumerate() {
            if observation.timestamp < cutoff {
                continue;
            }
            let price = observation.price_usd;

            // The trend comparison clamps its lag to the series start so
            // a short rising series still classifies as trending, while
            // the momentum values keep their exact-lag zero fallback.
            let price_7d_ago = observations[index.saturating_sub(MOMENTUM_LAG_7D)].price_usd;
            let price_30d_ago = observations[index.saturating_sub(MOMENTUM_LAG_30D)].price_usd;

            snapshots.push(MomentumSnapshot {
                coin_id: series.coin_id().to_string(),
                timestamp: observation.timestamp,
                price,
                momentum_1d: Self::momentum_at(observations, index, MOMENTUM_LAG_1D),
                momentum_7d: Self::momentum_at(observations, index, MOMENTUM_LAG_7D),
                momentum_30d: Self::momentum_at(observations, index, MOMENTUM_LAG_30D),
                trend_direction: Self::classify_trend(price, price_7d_ago, price_30d_ago),
            });
        }

        snapshots
    }

    /// Percentage change versus the observation `lag` positions back;
    /// zero when the series is shorter than the lag or the past price
    /// was zero.
    fn momentum_at(observations: &[PriceObservation], index: usize, lag: usize) -> Decimal {
        if index < lag {
            return Decimal::ZERO;
        }
        let past = observations[index - lag].price_usd;
        if past.is_zero() {
            return Decimal::ZERO;
        }
        let current = observations[index].price_usd;
        (current - past) / past * dec!(100)
    }

    fn classify_trend(
        price: Decimal,
        price_7d_ago: Decimal,
        price_30d_ago: Decimal,
    ) -> TrendDirection {
        if price > price_7d_ago && price_7d_ago > price_30d_ago {
            TrendDirection::StrongUptrend
        } else if price < price_7d_ago && price_7d_ago < price_30d_ago {
            TrendDirection::StrongDowntrend
        } else if price > price_7d_ago {
            TrendDirection::Uptrend
        } else if price < price_7d_ago {
            TrendDirection::Downtrend
        } else {
            TrendDirection::Sideways
        }
    }
}
