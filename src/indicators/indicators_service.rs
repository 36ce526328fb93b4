use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::indicators_model::{TechnicalSnapshot, TrendSignal};
use crate::constants::{FAST_MA_WINDOW, RSI_WINDOW, SLOW_MA_WINDOW};
use crate::series::PriceSeries;

#[derive(Debug, Clone)]
pub struct IndicatorsService {
    fast_window: usize,
    slow_window: usize,
    rsi_window: usize,
}

impl Default for IndicatorsService {
    fn default() -> Self {
        Self {
            fast_window: FAST_MA_WINDOW,
            slow_window: SLOW_MA_WINDOW,
            rsi_window: RSI_WINDOW,
        }
    }
}

impl IndicatorsService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_windows(fast_window: usize, slow_window: usize, rsi_window: usize) -> Self {
        Self {
            fast_window,
            slow_window,
            rsi_window,
        }
    }

    /// Computes indicator snapshots over the full series, emitting only
    /// observations at or after `cutoff`. The rolling windows look back
    /// across the cutoff, so retention never changes the math.
    pub fn technical_snapshots(
        &self,
        series: &PriceSeries,
        cutoff: DateTime<Utc>,
    ) -> Vec<TechnicalSnapshot> {
        let observations = series.observations();
        let prices: Vec<Decimal> = observations.iter().map(|o| o.price_usd).collect();

        // Deltas between consecutive observations; the delta for
        // observation i lives at index i - 1, and the first observation
        // has none.
        let mut gains = Vec::with_capacity(prices.len().saturating_sub(1));
        let mut losses = Vec::with_capacity(prices.len().saturating_sub(1));
        for pair in prices.windows(2) {
            let delta = pair[1] - pair[0];
            if delta > Decimal::ZERO {
                gains.push(delta);
                losses.push(Decimal::ZERO);
            } else {
                gains.push(Decimal::ZERO);
                losses.push(delta.abs());
            }
        }

        let mut snapshots = Vec::new();
        for (index, observation) in observations.iter().enumerate() {
            if observation.timestamp < cutoff {
                continue;
            }

            let sma_fast = Self::trailing_mean(&prices, index, self.fast_window);
            let sma_slow = Self::trailing_mean(&prices, index, self.slow_window);
            let trend_signal = if sma_fast > sma_slow {
                TrendSignal::Bullish
            } else if sma_fast < sma_slow {
                TrendSignal::Bearish
            } else {
                TrendSignal::Neutral
            };

            snapshots.push(TechnicalSnapshot {
                coin_id: series.coin_id().to_string(),
                timestamp: observation.timestamp,
                price: observation.price_usd,
                sma_fast,
                sma_slow,
                trend_signal,
                rsi: self.rsi_at(&gains, &losses, index),
            });
        }

        snapshots
    }

    /// Mean of the trailing `window` values ending at `index`; the
    /// window truncates at the series start rather than failing.
    fn trailing_mean(values: &[Decimal], index: usize, window: usize) -> Decimal {
        let start = (index + 1).saturating_sub(window);
        let slice = &values[start..=index];
        let sum: Decimal = slice.iter().sum();
        sum / Decimal::from(slice.len())
    }

    /// RSI at observation `index` from the trailing delta window.
    /// Undefined while no deltas exist or no losses occurred in the
    /// window (the ratio would divide by zero).
    fn rsi_at(&self, gains: &[Decimal], losses: &[Decimal], index: usize) -> Option<Decimal> {
        if index == 0 {
            return None;
        }
        // Deltas for observations (index - window + 1)..=index, clipped
        // to the series start.
        let end = index;
        let start = end.saturating_sub(self.rsi_window);
        let count = Decimal::from(end - start);
        let avg_up: Decimal = gains[start..end].iter().sum::<Decimal>() / count;
        let avg_down: Decimal = losses[start..end].iter().sum::<Decimal>() / count;

        if avg_down.is_zero() {
            return None;
        }
        let rs = avg_up / avg_down;
        Some(dec!(100) - dec!(100) / (Decimal::ONE + rs))
    }
}
