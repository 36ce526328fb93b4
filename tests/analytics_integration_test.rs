use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use coinfolio_core::analytics::{AnalyticsService, AnalyticsServiceTrait, ComputedView, ViewKind};
use coinfolio_core::errors::{Error, Result, SeriesError};
use coinfolio_core::holdings::{Holding, HoldingsProviderTrait};
use coinfolio_core::market_data::{PriceHistoryProviderTrait, PriceObservation};
use coinfolio_core::momentum::TrendDirection;
use coinfolio_core::performance::AlertType;
use coinfolio_core::risk::RiskCategory;

// --- In-memory providers ---

struct InMemoryHoldings {
    holdings: Vec<Holding>,
}

#[async_trait]
impl HoldingsProviderTrait for InMemoryHoldings {
    async fn get_holdings(&self) -> Result<Vec<Holding>> {
        Ok(self.holdings.clone())
    }
}

struct InMemoryPrices {
    observations: Vec<PriceObservation>,
}

#[async_trait]
impl PriceHistoryProviderTrait for InMemoryPrices {
    async fn get_price_history(
        &self,
        coin_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PriceObservation>> {
        Ok(self
            .observations
            .iter()
            .filter(|o| o.coin_id == coin_id && since.map_or(true, |s| o.timestamp >= s))
            .cloned()
            .collect())
    }

    async fn get_all_price_history(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PriceObservation>> {
        Ok(self
            .observations
            .iter()
            .filter(|o| since.map_or(true, |s| o.timestamp >= s))
            .cloned()
            .collect())
    }
}

// --- Fixtures ---

fn holding(coin_id: &str, amount: Decimal, category: Option<&str>) -> Holding {
    Holding {
        coin_id: coin_id.to_string(),
        symbol: coin_id.to_uppercase(),
        name: coin_id.to_string(),
        amount,
        category: category.map(|c| c.to_string()),
    }
}

fn observation(
    coin_id: &str,
    timestamp: DateTime<Utc>,
    price: Decimal,
    change: Option<Decimal>,
) -> PriceObservation {
    PriceObservation {
        coin_id: coin_id.to_string(),
        timestamp,
        price_usd: price,
        market_cap_usd: Decimal::ZERO,
        volume_24h_usd: dec!(1000),
        price_change_24h_pct: change,
    }
}

fn ts(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

fn service(holdings: Vec<Holding>, observations: Vec<PriceObservation>) -> AnalyticsService {
    AnalyticsService::new(
        Arc::new(InMemoryHoldings { holdings }),
        Arc::new(InMemoryPrices { observations }),
    )
}

// --- Scenarios ---

#[tokio::test]
async fn two_point_series_momentum_scenario() {
    // One BTC held, prices 100 then 110 a day apart: momentum_1d at the
    // newer observation is exactly 10%, the longer lags fall back to
    // zero, and the trend still classifies as an uptrend.
    let engine = service(
        vec![holding("bitcoin", dec!(1), Some("L1"))],
        vec![
            observation("bitcoin", ts(1, 0), dec!(100), None),
            observation("bitcoin", ts(2, 0), dec!(110), None),
        ],
    );

    let report = engine.price_momentum(ts(2, 1)).await.unwrap();
    assert!(report.is_clean());
    assert_eq!(report.records.len(), 2);

    // Newest first.
    let latest = &report.records[0];
    assert_eq!(latest.timestamp, ts(2, 0));
    assert_eq!(latest.momentum_1d, dec!(10));
    assert_eq!(latest.momentum_7d, Decimal::ZERO);
    assert_eq!(latest.momentum_30d, Decimal::ZERO);
    assert_eq!(latest.trend_direction, TrendDirection::Uptrend);
}

#[tokio::test]
async fn intraday_returns_risk_scenario() {
    // Same-day returns 0%, +4%, -2%: population stddev ~= 2.494 and
    // Sharpe ~= 0.267 for the single category row.
    let engine = service(
        vec![holding("bitcoin", dec!(1), Some("L1"))],
        vec![
            observation("bitcoin", ts(1, 0), dec!(100), None),
            observation("bitcoin", ts(1, 6), dec!(100), None),
            observation("bitcoin", ts(1, 12), dec!(104), None),
            observation("bitcoin", ts(1, 18), dec!(101.92), None),
        ],
    );

    let report = engine.risk_analysis(ts(1, 23)).await.unwrap();
    assert_eq!(report.records.len(), 1);

    let row = &report.records[0];
    assert_eq!(row.category, "L1");
    assert_eq!(row.num_assets, 1);
    assert_eq!(row.risk_category, RiskCategory::MediumRisk);

    let volatility = row.daily_volatility.unwrap();
    let sharpe = row.sharpe_ratio.unwrap();
    assert!((volatility - dec!(2.4944)).abs() < dec!(0.001));
    assert!((sharpe - dec!(0.2673)).abs() < dec!(0.001));
}

#[tokio::test]
async fn portfolio_percentages_sum_to_hundred() {
    let engine = service(
        vec![
            holding("bitcoin", dec!(1), Some("L1")),
            holding("ethereum", dec!(10), Some("L1")),
            holding("dogecoin", dec!(1000), Some("Meme")),
        ],
        vec![
            observation("bitcoin", ts(2, 0), dec!(100), Some(dec!(3))),
            observation("ethereum", ts(2, 0), dec!(10), Some(dec!(3))),
            observation("dogecoin", ts(2, 0), dec!(0.1), Some(dec!(-2))),
        ],
    );

    let report = engine.portfolio_performance(ts(2, 12)).await.unwrap();
    assert!(report.is_clean());

    let sum: Decimal = report
        .records
        .iter()
        .map(|s| s.percentage_of_portfolio)
        .sum();
    assert!((sum - dec!(100)).abs() < dec!(0.0001));

    // Equal 24h changes collapse the weighted average to the same value.
    let l1 = report.records.iter().find(|s| s.category == "L1").unwrap();
    assert_eq!(l1.weighted_avg_24h_change, dec!(3));
}

#[tokio::test]
async fn malformed_and_stale_records_become_issues() {
    let engine = service(
        vec![
            holding("bitcoin", dec!(1), Some("L1")),
            // Negative amount: rejected at validation.
            holding("badcoin", dec!(-1), Some("L1")),
            // No observation inside the freshness window.
            holding("stalecoin", dec!(5), Some("L1")),
        ],
        vec![
            observation("bitcoin", ts(5, 0), dec!(100), Some(dec!(1))),
            observation("stalecoin", ts(1, 0), dec!(10), Some(dec!(1))),
        ],
    );

    let report = engine.portfolio_performance(ts(5, 12)).await.unwrap();

    // The valid holding still computed.
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].total_value, dec!(100));

    let scopes: Vec<&str> = report.issues.iter().map(|i| i.scope.as_str()).collect();
    assert!(scopes.contains(&"badcoin"));
    assert!(scopes.contains(&"stalecoin"));
}

#[tokio::test]
async fn malformed_observations_are_isolated() {
    let engine = service(
        vec![holding("bitcoin", dec!(1), None)],
        vec![
            observation("bitcoin", ts(1, 0), dec!(100), None),
            observation("bitcoin", ts(1, 12), dec!(-5), None),
            observation("bitcoin", ts(2, 0), dec!(110), None),
        ],
    );

    let report = engine.daily_bars(ts(2, 12)).await.unwrap();

    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].scope, "bitcoin");
    // The valid observations still fold into two bars.
    assert_eq!(report.records.len(), 2);
}

#[tokio::test]
async fn daily_bars_cover_unheld_assets() {
    let engine = service(
        vec![holding("bitcoin", dec!(1), None)],
        vec![
            observation("bitcoin", ts(1, 0), dec!(100), None),
            observation("unheld", ts(1, 0), dec!(5), None),
        ],
    );

    let report = engine.daily_bars(ts(1, 12)).await.unwrap();
    let coins: Vec<&str> = report.records.iter().map(|b| b.coin_id.as_str()).collect();
    assert!(coins.contains(&"bitcoin"));
    assert!(coins.contains(&"unheld"));
}

#[tokio::test]
async fn technical_indicators_on_rising_series() {
    let observations: Vec<PriceObservation> = (0..20)
        .map(|i| {
            observation(
                "bitcoin",
                ts(1, 0) + chrono::Duration::hours(i),
                Decimal::from(100 + i),
                None,
            )
        })
        .collect();
    let engine = service(vec![holding("bitcoin", dec!(1), None)], observations);

    let report = engine.technical_indicators(ts(2, 0)).await.unwrap();
    assert_eq!(report.records.len(), 20);

    // A series that only rose has undefined RSI throughout, and the
    // fast average pulls ahead of the slow one once the windows differ.
    assert!(report.records.iter().all(|s| s.rsi.is_none()));
    let last = report.records.last().unwrap();
    assert!(last.sma_fast > last.sma_slow);
}

#[tokio::test]
async fn alerts_classify_latest_moves() {
    let engine = service(
        vec![
            holding("bitcoin", dec!(1), None),
            holding("ethereum", dec!(1), None),
            holding("dogecoin", dec!(1), None),
        ],
        vec![
            observation("bitcoin", ts(1, 0), dec!(100), Some(dec!(11))),
            observation("ethereum", ts(1, 0), dec!(10), Some(dec!(6))),
            observation("dogecoin", ts(1, 0), dec!(0.1), Some(dec!(2))),
        ],
    );

    let report = engine.price_alerts(ts(1, 12)).await.unwrap();
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[0].alert_type, AlertType::HighVolatility);
    assert_eq!(report.records[1].alert_type, AlertType::SignificantRise);
}

#[tokio::test]
async fn recomputation_is_idempotent() {
    let holdings = vec![
        holding("bitcoin", dec!(2), Some("L1")),
        holding("dogecoin", dec!(500), Some("Meme")),
    ];
    let observations = vec![
        observation("bitcoin", ts(1, 0), dec!(100), Some(dec!(1))),
        observation("bitcoin", ts(1, 12), dec!(104), Some(dec!(2))),
        observation("bitcoin", ts(2, 0), dec!(102), Some(dec!(-1))),
        observation("dogecoin", ts(1, 6), dec!(0.1), Some(dec!(8))),
        observation("dogecoin", ts(2, 3), dec!(0.12), Some(dec!(20))),
    ];
    let engine = service(holdings, observations);

    let first = engine.risk_analysis(ts(2, 12)).await.unwrap();
    let second = engine.risk_analysis(ts(2, 12)).await.unwrap();
    assert_eq!(first, second);

    let first = engine.portfolio_performance(ts(2, 12)).await.unwrap();
    let second = engine.portfolio_performance(ts(2, 12)).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn empty_series_is_no_data_not_a_crash() {
    let engine = service(
        vec![holding("bitcoin", dec!(1), None)],
        vec![observation("bitcoin", ts(1, 0), dec!(100), None)],
    );

    let series = engine.asset_series("bitcoin", None).await.unwrap();
    assert_eq!(series.len(), 1);

    let err = engine.asset_series("unknown", None).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Series(SeriesError::Empty(coin_id)) if coin_id == "unknown"
    ));
}

struct FailingPrices;

#[async_trait]
impl PriceHistoryProviderTrait for FailingPrices {
    async fn get_price_history(
        &self,
        _coin_id: &str,
        _since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PriceObservation>> {
        Err(Error::Provider("backing store unavailable".to_string()))
    }

    async fn get_all_price_history(
        &self,
        _since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PriceObservation>> {
        Err(Error::Provider("backing store unavailable".to_string()))
    }
}

#[tokio::test]
async fn provider_failure_aborts_only_the_requested_view() {
    let engine = AnalyticsService::new(
        Arc::new(InMemoryHoldings {
            holdings: vec![holding("bitcoin", dec!(1), None)],
        }),
        Arc::new(FailingPrices),
    );

    let err = engine.daily_bars(ts(1, 0)).await.unwrap_err();
    assert!(matches!(err, Error::Provider(_)));
}

#[tokio::test]
async fn compute_view_dispatches_by_kind() {
    let engine = service(
        vec![holding("bitcoin", dec!(1), Some("L1"))],
        vec![
            observation("bitcoin", ts(1, 0), dec!(100), Some(dec!(1))),
            observation("bitcoin", ts(2, 0), dec!(110), Some(dec!(10))),
        ],
    );

    match engine.compute_view(ViewKind::DailyBars, ts(2, 12)).await.unwrap() {
        ComputedView::DailyBars(report) => assert_eq!(report.records.len(), 2),
        other => panic!("unexpected view: {other:?}"),
    }

    match engine
        .compute_view(ViewKind::PortfolioPerformance, ts(2, 12))
        .await
        .unwrap()
    {
        ComputedView::PortfolioPerformance(report) => {
            assert_eq!(report.records.len(), 1);
            assert_eq!(report.records[0].total_value, dec!(110));
        }
        other => panic!("unexpected view: {other:?}"),
    }
}
