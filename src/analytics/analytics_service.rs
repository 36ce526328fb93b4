use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::future::join_all;
use log::{debug, warn};

use super::analytics_model::{
    AnalyticsOptions, AnalyticsReport, ComputeIssue, ComputedView, ViewKind,
};
use crate::bars::{BarsService, DailyBar};
use crate::errors::{CalculatorError, Result, ValidationError};
use crate::holdings::{Holding, HoldingsProviderTrait};
use crate::indicators::{IndicatorsService, TechnicalSnapshot};
use crate::market_data::PriceHistoryProviderTrait;
use crate::momentum::{MomentumService, MomentumSnapshot};
use crate::performance::{PerformanceService, PortfolioSnapshot, PriceAlert};
use crate::risk::{AssetVolatilitySnapshot, RiskService, RiskSnapshot};
use crate::series::{PriceSeries, SeriesService, SeriesSet};

/// Request/response contract of the computation engine: each view is a
/// pure function of (holdings snapshot, observation history, reference
/// time, options), returned together with the per-record issues that
/// were isolated along the way.
#[async_trait]
pub trait AnalyticsServiceTrait: Send + Sync {
    async fn daily_bars(&self, as_of: DateTime<Utc>) -> Result<AnalyticsReport<DailyBar>>;
    async fn technical_indicators(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<AnalyticsReport<TechnicalSnapshot>>;
    async fn price_momentum(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<AnalyticsReport<MomentumSnapshot>>;
    async fn risk_analysis(&self, as_of: DateTime<Utc>) -> Result<AnalyticsReport<RiskSnapshot>>;
    async fn asset_volatility(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<AnalyticsReport<AssetVolatilitySnapshot>>;
    async fn portfolio_performance(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<AnalyticsReport<PortfolioSnapshot>>;
    async fn price_alerts(&self, as_of: DateTime<Utc>) -> Result<AnalyticsReport<PriceAlert>>;
    async fn compute_view(&self, kind: ViewKind, as_of: DateTime<Utc>) -> Result<ComputedView>;
}

pub struct AnalyticsService {
    holdings_provider: Arc<dyn HoldingsProviderTrait>,
    price_provider: Arc<dyn PriceHistoryProviderTrait>,
    options: AnalyticsOptions,
    series_service: SeriesService,
    bars_service: BarsService,
    indicators_service: IndicatorsService,
    momentum_service: MomentumService,
    risk_service: RiskService,
    performance_service: PerformanceService,
}

impl AnalyticsService {
    pub fn new(
        holdings_provider: Arc<dyn HoldingsProviderTrait>,
        price_provider: Arc<dyn PriceHistoryProviderTrait>,
    ) -> Self {
        Self::with_options(holdings_provider, price_provider, AnalyticsOptions::default())
    }

    pub fn with_options(
        holdings_provider: Arc<dyn HoldingsProviderTrait>,
        price_provider: Arc<dyn PriceHistoryProviderTrait>,
        options: AnalyticsOptions,
    ) -> Self {
        Self {
            holdings_provider,
            price_provider,
            options,
            series_service: SeriesService::new(),
            bars_service: BarsService::new(),
            indicators_service: IndicatorsService::new(),
            momentum_service: MomentumService::new(),
            risk_service: RiskService::new(),
            performance_service: PerformanceService::new(),
        }
    }

    /// Ordered observation series for a single asset, straight from the
    /// provider. `SeriesError::Empty` signals "no data"; callers emit an
    /// empty result for the asset rather than failing.
    pub async fn asset_series(
        &self,
        coin_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<PriceSeries> {
        if coin_id.trim().is_empty() {
            return Err(ValidationError::MissingField("coin_id".to_string()).into());
        }
        let observations = self
            .price_provider
            .get_price_history(coin_id, since)
            .await?;
        Ok(PriceSeries::from_observations(coin_id, observations)?)
    }

    /// Fetches the holdings snapshot, rejecting malformed records
    /// individually instead of failing the batch.
    async fn load_holdings(&self) -> Result<(Vec<Holding>, Vec<ComputeIssue>)> {
        let mut valid = Vec::new();
        let mut issues = Vec::new();

        for holding in self.holdings_provider.get_holdings().await? {
            match holding.validate() {
                Ok(()) => valid.push(holding),
                Err(e) => {
                    warn!("Rejected holding '{}': {}", holding.coin_id, e);
                    issues.push(ComputeIssue {
                        scope: holding.coin_id.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok((valid, issues))
    }

    /// Fetches and indexes the observation history, converting rejected
    /// observations into issues.
    async fn load_series(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<(SeriesSet, Vec<ComputeIssue>)> {
        let observations = self.price_provider.get_all_price_history(since).await?;
        let set = self.series_service.index_observations(observations);
        let issues = set
            .rejected
            .iter()
            .map(|rejected| ComputeIssue {
                scope: rejected.coin_id.clone(),
                message: rejected.message.clone(),
            })
            .collect();
        Ok((set, issues))
    }

    /// Restricts a series set to assets currently held.
    fn held_series(set: SeriesSet, holdings: &[Holding]) -> HashMap<String, PriceSeries> {
        let held: HashSet<&str> = holdings.iter().map(|h| h.coin_id.as_str()).collect();
        set.series
            .into_iter()
            .filter(|(coin_id, _)| held.contains(coin_id.as_str()))
            .collect()
    }

    /// Runs `compute` for every asset on the blocking pool, collecting
    /// results concurrently. A failed task becomes an issue for its
    /// asset; the rest of the fan-out still completes. Results come
    /// back sorted by coin id so output ordering is deterministic.
    async fn fan_out_per_asset<T, F>(
        series_by_asset: HashMap<String, PriceSeries>,
        compute: F,
        issues: &mut Vec<ComputeIssue>,
    ) -> Vec<(String, Vec<T>)>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(&PriceSeries) -> Vec<T> + Send + Sync + Clone + 'static,
    {
        let collected: Arc<DashMap<String, Vec<T>>> = Arc::new(DashMap::new());
        let mut tasks = Vec::with_capacity(series_by_asset.len());

        for (coin_id, series) in series_by_asset {
            let compute = compute.clone();
            let collected = Arc::clone(&collected);
            tasks.push(async move {
                let key = coin_id.clone();
                let outcome = tokio::task::spawn_blocking(move || {
                    let records = compute(&series);
                    collected.insert(key, records);
                })
                .await;
                (coin_id, outcome)
            });
        }

        for (coin_id, outcome) in join_all(tasks).await {
            if let Err(e) = outcome {
                warn!("Analytics task for '{}' failed: {}", coin_id, e);
                let error = CalculatorError::Calculation(format!("computation task failed: {e}"));
                issues.push(ComputeIssue {
                    scope: coin_id,
                    message: error.to_string(),
                });
            }
        }

        let collected = Arc::try_unwrap(collected).unwrap_or_else(|shared| shared.as_ref().clone());
        let mut results: Vec<(String, Vec<T>)> = collected.into_iter().collect();
        results.sort_by(|a, b| a.0.cmp(&b.0));
        results
    }
}

#[async_trait]
impl AnalyticsServiceTrait for AnalyticsService {
    /// Daily OHLCV bars for every observed asset, newest date first.
    async fn daily_bars(&self, _as_of: DateTime<Utc>) -> Result<AnalyticsReport<DailyBar>> {
        let (set, mut issues) = self.load_series(None).await?;

        let bars_service = self.bars_service.clone();
        let per_asset = Self::fan_out_per_asset(
            set.series,
            move |series| bars_service.daily_bars(series),
            &mut issues,
        )
        .await;

        let mut records: Vec<DailyBar> = per_asset.into_iter().flat_map(|(_, bars)| bars).collect();
        records.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.coin_id.cmp(&b.coin_id)));

        debug!("Computed {} daily bars", records.len());
        Ok(AnalyticsReport::new(records, issues))
    }

    /// Indicator snapshots for held assets within the technical horizon.
    async fn technical_indicators(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<AnalyticsReport<TechnicalSnapshot>> {
        let (holdings, mut issues) = self.load_holdings().await?;
        let (set, series_issues) = self.load_series(None).await?;
        issues.extend(series_issues);

        let cutoff = as_of - self.options.technical_horizon;
        let indicators_service = self.indicators_service.clone();
        let per_asset = Self::fan_out_per_asset(
            Self::held_series(set, &holdings),
            move |series| indicators_service.technical_snapshots(series, cutoff),
            &mut issues,
        )
        .await;

        let mut records: Vec<TechnicalSnapshot> = per_asset
            .into_iter()
            .flat_map(|(_, snapshots)| snapshots)
            .collect();
        records.sort_by(|a, b| {
            a.coin_id
                .cmp(&b.coin_id)
                .then_with(|| a.timestamp.cmp(&b.timestamp))
        });

        Ok(AnalyticsReport::new(records, issues))
    }

    /// Momentum snapshots for held assets, newest first. The source
    /// fetch reaches one day past the horizon so the positional lags
    /// match what a fresh horizon-bounded history would contain.
    async fn price_momentum(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<AnalyticsReport<MomentumSnapshot>> {
        let (holdings, mut issues) = self.load_holdings().await?;
        let since = as_of - self.options.momentum_horizon - chrono::Duration::days(1);
        let (set, series_issues) = self.load_series(Some(since)).await?;
        issues.extend(series_issues);

        let cutoff = as_of - self.options.momentum_horizon;
        let momentum_service = self.momentum_service.clone();
        let per_asset = Self::fan_out_per_asset(
            Self::held_series(set, &holdings),
            move |series| momentum_service.momentum_snapshots(series, cutoff),
            &mut issues,
        )
        .await;

        let mut records: Vec<MomentumSnapshot> = per_asset
            .into_iter()
            .flat_map(|(_, snapshots)| snapshots)
            .collect();
        records.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.coin_id.cmp(&b.coin_id))
        });

        Ok(AnalyticsReport::new(records, issues))
    }

    /// Category risk rows from the trailing source horizon of raw
    /// observations, merged sequentially after the per-asset walks.
    async fn risk_analysis(&self, as_of: DateTime<Utc>) -> Result<AnalyticsReport<RiskSnapshot>> {
        let (holdings, mut issues) = self.load_holdings().await?;
        let since = as_of - self.options.risk_source_horizon;
        let (set, series_issues) = self.load_series(Some(since)).await?;
        issues.extend(series_issues);

        let series_by_asset = Self::held_series(set, &holdings);
        let output_cutoff = (as_of - self.options.risk_horizon).date_naive();
        let risk_service = self.risk_service.clone();
        let records = tokio::task::spawn_blocking(move || {
            risk_service.category_risk(&holdings, &series_by_asset, output_cutoff)
        })
        .await
        .map_err(|e| CalculatorError::Calculation(format!("computation task failed: {e}")))?;

        Ok(AnalyticsReport::new(records, issues))
    }

    /// Per-asset range volatility rows derived from the daily bars.
    async fn asset_volatility(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<AnalyticsReport<AssetVolatilitySnapshot>> {
        let (holdings, mut issues) = self.load_holdings().await?;
        let (set, series_issues) = self.load_series(None).await?;
        issues.extend(series_issues);

        let output_cutoff = (as_of - self.options.risk_horizon).date_naive();
        let bars_service = self.bars_service.clone();
        let risk_service = self.risk_service.clone();
        let per_asset = Self::fan_out_per_asset(
            Self::held_series(set, &holdings),
            move |series| {
                let bars = bars_service.daily_bars(series);
                risk_service.asset_volatility(&bars, output_cutoff)
            },
            &mut issues,
        )
        .await;

        let mut records: Vec<AssetVolatilitySnapshot> = per_asset
            .into_iter()
            .flat_map(|(_, snapshots)| snapshots)
            .collect();
        records.sort_by(|a, b| a.coin_id.cmp(&b.coin_id).then_with(|| b.date.cmp(&a.date)));

        Ok(AnalyticsReport::new(records, issues))
    }

    /// Category valuation against the latest fresh prices.
    async fn portfolio_performance(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<AnalyticsReport<PortfolioSnapshot>> {
        let (holdings, mut issues) = self.load_holdings().await?;
        let since = as_of - self.options.freshness_window;
        let (set, series_issues) = self.load_series(Some(since)).await?;
        issues.extend(series_issues);

        let (records, skipped) = self.performance_service.portfolio_performance(
            &holdings,
            &set.series,
            as_of,
            self.options.freshness_window,
        );
        issues.extend(
            skipped
                .into_iter()
                .map(|(scope, message)| ComputeIssue { scope, message }),
        );

        Ok(AnalyticsReport::new(records, issues))
    }

    /// Holdings whose latest 24h change crossed the alert threshold.
    async fn price_alerts(&self, _as_of: DateTime<Utc>) -> Result<AnalyticsReport<PriceAlert>> {
        let (holdings, mut issues) = self.load_holdings().await?;
        let (set, series_issues) = self.load_series(None).await?;
        issues.extend(series_issues);

        let records = self
            .performance_service
            .price_alerts(&holdings, &set.series);

        Ok(AnalyticsReport::new(records, issues))
    }

    async fn compute_view(&self, kind: ViewKind, as_of: DateTime<Utc>) -> Result<ComputedView> {
        match kind {
            ViewKind::DailyBars => Ok(ComputedView::DailyBars(self.daily_bars(as_of).await?)),
            ViewKind::TechnicalIndicators => Ok(ComputedView::TechnicalIndicators(
                self.technical_indicators(as_of).await?,
            )),
            ViewKind::PriceMomentum => {
                Ok(ComputedView::PriceMomentum(self.price_momentum(as_of).await?))
            }
            ViewKind::RiskAnalysis => {
                Ok(ComputedView::RiskAnalysis(self.risk_analysis(as_of).await?))
            }
            ViewKind::AssetVolatility => Ok(ComputedView::AssetVolatility(
                self.asset_volatility(as_of).await?,
            )),
            ViewKind::PortfolioPerformance => Ok(ComputedView::PortfolioPerformance(
                self.portfolio_performance(as_of).await?,
            )),
            ViewKind::PriceAlerts => {
                Ok(ComputedView::PriceAlerts(self.price_alerts(as_of).await?))
            }
        }
    }
}
