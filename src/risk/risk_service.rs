use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use log::debug;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use super::risk_model::{AssetVolatilitySnapshot, RiskCategory, RiskSnapshot};
use crate::bars::DailyBar;
use crate::constants::{
    HIGH_RISK_VOLATILITY, MEDIUM_RISK_VOLATILITY, VAR_95_FACTOR, WEEKLY_WINDOW,
};
use crate::holdings::Holding;
use crate::series::PriceSeries;

/// Working totals for one (category, date) pair.
#[derive(Default)]
struct CategoryDayAccum {
    total_value: Decimal,
    returns: Vec<Decimal>,
    assets: HashSet<String>,
}

#[derive(Debug, Clone)]
pub struct RiskService {
    weekly_window: usize,
}

impl Default for RiskService {
    fn default() -> Self {
        Self {
            weekly_window: WEEKLY_WINDOW,
        }
    }
}

impl RiskService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Category risk rows: observation returns pooled per (category,
    /// date), volatility and derived metrics on top, rolling extremes
    /// and the drawdown proxy per category over ascending dates.
    ///
    /// The statistics run over the whole provided series (the source
    /// horizon); `output_cutoff` only restricts which rows are emitted.
    /// Output is ordered date descending, then total value descending.
    pub fn category_risk(
        &self,
        holdings: &[Holding],
        series_set: &HashMap<String, PriceSeries>,
        output_cutoff: NaiveDate,
    ) -> Vec<RiskSnapshot> {
        let mut accumulated: BTreeMap<(String, NaiveDate), CategoryDayAccum> = BTreeMap::new();

        for holding in holdings {
            let category = holding.category_label().to_string();
            let series = match series_set.get(&holding.coin_id) {
                Some(series) => series,
                None => {
                    debug!(
                        "No observations for holding '{}'; skipping in risk analysis",
                        holding.coin_id
                    );
                    continue;
                }
            };

            let observations = series.observations();
            let mut day_close: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();

            for (index, observation) in observations.iter().enumerate() {
                let date = observation.timestamp.date_naive();
                day_close.insert(date, observation.price_usd);

                let entry = accumulated
                    .entry((category.clone(), date))
                    .or_default();
                entry.assets.insert(holding.coin_id.clone());

                if index > 0 {
                    let previous = observations[index - 1].price_usd;
                    if !previous.is_zero() {
                        entry
                            .returns
                            .push((observation.price_usd - previous) / previous * dec!(100));
                    }
                }
            }

            // Each holding contributes amount x that day's close once.
            for (date, close) in day_close {
                if let Some(entry) = accumulated.get_mut(&(category.clone(), date)) {
                    entry.total_value += holding.amount * close;
                }
            }
        }

        let mut rows = Vec::with_capacity(accumulated.len());
        let mut current_category: Option<String> = None;
        let mut recent_avgs: Vec<Option<Decimal>> = Vec::new();
        let mut running_min: Option<Decimal> = None;

        for ((category, date), accum) in accumulated {
            if current_category.as_deref() != Some(category.as_str()) {
                current_category = Some(category.clone());
                recent_avgs.clear();
                running_min = None;
            }

            let avg_daily_return = Self::mean(&accum.returns);
            let daily_volatility = Self::population_stddev(&accum.returns);

            recent_avgs.push(avg_daily_return);
            if let Some(value) = avg_daily_return {
                running_min = Some(match running_min {
                    Some(minimum) => minimum.min(value),
                    None => value,
                });
            }

            let window_start = recent_avgs.len().saturating_sub(self.weekly_window);
            let window = &recent_avgs[window_start..];
            let max_7d_return = window.iter().filter_map(|v| *v).max();
            let min_7d_return = window.iter().filter_map(|v| *v).min();

            let sharpe_ratio = match (avg_daily_return, daily_volatility) {
                (Some(avg), Some(volatility)) if !volatility.is_zero() => Some(avg / volatility),
                _ => None,
            };
            let value_at_risk_95 = match (avg_daily_return, daily_volatility) {
                (Some(avg), Some(volatility)) => Some(avg - VAR_95_FACTOR * volatility),
                _ => None,
            };

            rows.push(RiskSnapshot {
                category,
                date,
                total_value: accum.total_value,
                avg_daily_return,
                daily_volatility,
                sharpe_ratio,
                num_assets: accum.assets.len(),
                risk_category: Self::bucket(daily_volatility),
                max_7d_return,
                min_7d_return,
                value_at_risk_95,
                max_drawdown_to_date: running_min,
            });
        }

        rows.retain(|row| row.date >= output_cutoff);
        rows.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.total_value.cmp(&a.total_value))
                .then_with(|| a.category.cmp(&b.category))
        });
        rows
    }

    /// Per-asset range volatility from the daily bars (given newest
    /// first, as the bar aggregator emits them). Output keeps that
    /// ordering; the rolling weekly average runs over ascending dates.
    pub fn asset_volatility(
        &self,
        bars: &[DailyBar],
        output_cutoff: NaiveDate,
    ) -> Vec<AssetVolatilitySnapshot> {
        let mut rolling: Vec<Option<Decimal>> = Vec::with_capacity(bars.len());
        let mut snapshots = Vec::with_capacity(bars.len());

        for bar in bars.iter().rev() {
            let daily_volatility = if bar.low.is_zero() {
                None
            } else {
                Some((bar.high - bar.low) / bar.low * dec!(100))
            };
            let daily_return = if bar.open.is_zero() {
                None
            } else {
                Some((bar.close - bar.open) / bar.open * dec!(100))
            };

            rolling.push(daily_volatility);
            let window_start = rolling.len().saturating_sub(self.weekly_window);
            let window: Vec<Decimal> = rolling[window_start..].iter().filter_map(|v| *v).collect();

            snapshots.push(AssetVolatilitySnapshot {
                coin_id: bar.coin_id.clone(),
                date: bar.date,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                daily_volatility,
                daily_return,
                weekly_avg_volatility: Self::mean(&window),
            });
        }

        snapshots.retain(|snapshot| snapshot.date >= output_cutoff);
        snapshots.reverse();
        snapshots
    }

    fn bucket(volatility: Option<Decimal>) -> RiskCategory {
        match volatility {
            Some(value) if value > HIGH_RISK_VOLATILITY => RiskCategory::HighRisk,
            Some(value) if value > MEDIUM_RISK_VOLATILITY => RiskCategory::MediumRisk,
            _ => RiskCategory::LowRisk,
        }
    }

    fn mean(values: &[Decimal]) -> Option<Decimal> {
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<Decimal>() / Decimal::from(values.len()))
    }

    fn population_stddev(values: &[Decimal]) -> Option<Decimal> {
        let mean = Self::mean(values)?;
        let count = Decimal::from(values.len());
        let sum_squared_diff: Decimal = values
            .iter()
            .map(|&value| {
                let diff = value - mean;
                diff * diff
            })
            .sum();
        (sum_squared_diff / count).sqrt()
    }
}
