use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::performance_model::{AlertType, PortfolioSnapshot, PriceAlert};
use crate::constants::ALERT_CHANGE_THRESHOLD;
use crate::holdings::Holding;
use crate::series::PriceSeries;

/// Working totals for one category.
#[derive(Default)]
struct CategoryAccum {
    total_value: Decimal,
    weighted_change_sum: Decimal,
    num_coins: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PerformanceService;

impl PerformanceService {
    pub fn new() -> Self {
        Self
    }

    /// Values each holding against its latest observation within the
    /// freshness window and aggregates by category. Holdings without a
    /// fresh price are skipped and reported back as `(coin_id, reason)`
    /// pairs so the caller can surface them without failing the view.
    pub fn portfolio_performance(
        &self,
        holdings: &[Holding],
        series_set: &HashMap<String, PriceSeries>,
        as_of: DateTime<Utc>,
        freshness_window: Duration,
    ) -> (Vec<PortfolioSnapshot>, Vec<(String, String)>) {
        let freshness_cutoff = as_of - freshness_window;
        let mut categories: BTreeMap<String, CategoryAccum> = BTreeMap::new();
        let mut skipped: Vec<(String, String)> = Vec::new();

        for holding in holdings {
            let latest = series_set
                .get(&holding.coin_id)
                .and_then(|series| series.latest_on_or_before(as_of));

            let latest = match latest {
                Some(observation) if observation.timestamp >= freshness_cutoff => observation,
                _ => {
                    skipped.push((
                        holding.coin_id.clone(),
                        format!(
                            "no price observation within {}h of reference time",
                            freshness_window.num_hours()
                        ),
                    ));
                    continue;
                }
            };

            let position_value = holding.amount * latest.price_usd;
            let change = latest.change_24h();

            let entry = categories
                .entry(holding.category_label().to_string())
                .or_default();
            entry.total_value += position_value;
            entry.weighted_change_sum += position_value * change;
            entry.num_coins += 1;
        }

        // The portfolio total includes every category, even ones that
        // fall out of the output below.
        let portfolio_total: Decimal = categories.values().map(|c| c.total_value).sum();

        let mut snapshots: Vec<PortfolioSnapshot> = categories
            .into_iter()
            .filter(|(_, accum)| accum.total_value > Decimal::ZERO)
            .map(|(category, accum)| PortfolioSnapshot {
                category,
                total_value: accum.total_value,
                percentage_of_portfolio: if portfolio_total.is_zero() {
                    Decimal::ZERO
                } else {
                    accum.total_value / portfolio_total * dec!(100)
                },
                num_coins: accum.num_coins,
                weighted_avg_24h_change: accum.weighted_change_sum / accum.total_value,
            })
            .collect();

        snapshots.sort_by(|a, b| {
            b.total_value
                .cmp(&a.total_value)
                .then_with(|| a.category.cmp(&b.category))
        });

        debug!(
            "Portfolio performance: {} categories, {} holdings skipped",
            snapshots.len(),
            skipped.len()
        );

        (snapshots, skipped)
    }

    /// Holdings whose latest observed 24h change crossed the alert
    /// threshold. Unlike the performance view, this looks at the
    /// unconditionally-latest observation per holding.
    pub fn price_alerts(
        &self,
        holdings: &[Holding],
        series_set: &HashMap<String, PriceSeries>,
    ) -> Vec<PriceAlert> {
        let mut alerts = Vec::new();

        for holding in holdings {
            let series = match series_set.get(&holding.coin_id) {
                Some(series) => series,
                None => {
                    debug!(
                        "No observations for holding '{}'; skipping in alerts",
                        holding.coin_id
                    );
                    continue;
                }
            };

            let latest = series.latest();
            let change = latest.change_24h();
            if change.abs() <= ALERT_CHANGE_THRESHOLD {
                continue;
            }

            alerts.push(PriceAlert {
                coin_id: holding.coin_id.clone(),
                symbol: holding.symbol.clone(),
                name: holding.name.clone(),
                current_price: latest.price_usd,
                price_change_24h_pct: change,
                alert_type: AlertType::classify(change),
            });
        }

        alerts.sort_by(|a, b| a.coin_id.cmp(&b.coin_id));
        alerts
    }
}
