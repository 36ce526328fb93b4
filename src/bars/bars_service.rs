use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::bars_model::DailyBar;
use crate::market_data::PriceObservation;
use crate::series::PriceSeries;

#[derive(Debug, Clone, Default)]
pub struct BarsService;

impl BarsService {
    pub fn new() -> Self {
        Self
    }

    /// Folds one asset's ordered series into daily OHLCV bars, newest
    /// date first. Days with no observations are simply absent.
    pub fn daily_bars(&self, series: &PriceSeries) -> Vec<DailyBar> {
        let observations = series.observations();
        let mut bars = Vec::new();

        let mut start = 0;
        while start < observations.len() {
            let date = observations[start].timestamp.date_naive();
            let mut end = start + 1;
            while end < observations.len() && observations[end].timestamp.date_naive() == date {
                end += 1;
            }
            bars.push(Self::fold_day(
                series.coin_id(),
                date,
                &observations[start..end],
            ));
            start = end;
        }

        bars.reverse();
        bars
    }

    fn fold_day(coin_id: &str, date: NaiveDate, day: &[PriceObservation]) -> DailyBar {
        let mut high = day[0].price_usd;
        let mut low = day[0].price_usd;
        let mut price_sum = Decimal::ZERO;
        let mut volume_sum = Decimal::ZERO;

        for observation in day {
            high = high.max(observation.price_usd);
            low = low.min(observation.price_usd);
            price_sum += observation.price_usd;
            volume_sum += observation.volume_24h_usd;
        }

        let count = Decimal::from(day.len());
        DailyBar {
            coin_id: coin_id.to_string(),
            date,
            open: day[0].price_usd,
            high,
            low,
            close: day[day.len() - 1].price_usd,
            avg_price: price_sum / count,
            avg_volume: volume_sum / count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn observation(day: u32, hour: u32, price: Decimal, volume: Decimal) -> PriceObservation {
        PriceObservation {
            coin_id: "bitcoin".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap(),
            price_usd: price,
            market_cap_usd: Decimal::ZERO,
            volume_24h_usd: volume,
            price_change_24h_pct: None,
        }
    }

    fn series(observations: Vec<PriceObservation>) -> PriceSeries {
        PriceSeries::from_observations("bitcoin", observations).unwrap()
    }

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_open_close_extrema_and_averages() {
        let bars = BarsService::new().daily_bars(&series(vec![
            observation(1, 0, dec!(100), dec!(10)),
            observation(1, 8, dec!(130), dec!(20)),
            observation(1, 16, dec!(90), dec!(30)),
            observation(1, 23, dec!(110), dec!(40)),
        ]));

        assert_eq!(bars.len(), 1);
        let bar = &bars[0];
        assert_eq!(bar.open, dec!(100));
        assert_eq!(bar.close, dec!(110));
        assert_eq!(bar.high, dec!(130));
        assert_eq!(bar.low, dec!(90));
        assert_eq!(bar.avg_price, dec!(107.5));
        assert_eq!(bar.avg_volume, dec!(25));
    }

    #[test]
    fn test_single_observation_day_collapses() {
        let bars = BarsService::new().daily_bars(&series(vec![observation(
            1,
            12,
            dec!(42),
            dec!(7),
        )]));

        let bar = &bars[0];
        assert_eq!(bar.open, dec!(42));
        assert_eq!(bar.close, dec!(42));
        assert_eq!(bar.high, dec!(42));
        assert_eq!(bar.low, dec!(42));
    }

    #[test]
    fn test_newest_date_first_and_gaps_absent() {
        let bars = BarsService::new().daily_bars(&series(vec![
            observation(1, 0, dec!(1), dec!(1)),
            // 2024-03-02 has no observations and gets no bar.
            observation(3, 0, dec!(3), dec!(1)),
        ]));

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, ts(3, 0).date_naive());
        assert_eq!(bars[1].date, ts(1, 0).date_naive());
    }

    #[test]
    fn test_bar_invariants_hold() {
        let bars = BarsService::new().daily_bars(&series(vec![
            observation(1, 0, dec!(105), dec!(5)),
            observation(1, 6, dec!(95), dec!(5)),
            observation(1, 12, dec!(120), dec!(5)),
            observation(2, 0, dec!(80), dec!(5)),
            observation(2, 12, dec!(85), dec!(5)),
        ]));

        for bar in &bars {
            assert!(bar.high >= bar.low);
            assert!(bar.low <= bar.open && bar.open <= bar.high);
            assert!(bar.low <= bar.close && bar.close <= bar.high);
            assert!(bar.low <= bar.avg_price && bar.avg_price <= bar.high);
        }
    }
}
