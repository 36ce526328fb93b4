use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fallback category for holdings without one
pub const DEFAULT_CATEGORY: &str = "Other";

/// Trailing observation window for the fast moving average
pub const FAST_MA_WINDOW: usize = 14;

/// Trailing observation window for the slow moving average
pub const SLOW_MA_WINDOW: usize = 30;

/// Trailing delta window for the relative strength index
pub const RSI_WINDOW: usize = 14;

/// Positional lags for momentum lookbacks
pub const MOMENTUM_LAG_1D: usize = 1;
pub const MOMENTUM_LAG_7D: usize = 7;
pub const MOMENTUM_LAG_30D: usize = 30;

/// Rolling row window for weekly return extremes and volatility averages
pub const WEEKLY_WINDOW: usize = 7;

/// Daily volatility (percent) above which a category is high risk
pub const HIGH_RISK_VOLATILITY: Decimal = dec!(5);

/// Daily volatility (percent) above which a category is medium risk
pub const MEDIUM_RISK_VOLATILITY: Decimal = dec!(2);

/// One-sided z-score for parametric 95% value at risk
pub const VAR_95_FACTOR: Decimal = dec!(1.645);

/// Absolute 24h change (percent) that surfaces a price alert
pub const ALERT_CHANGE_THRESHOLD: Decimal = dec!(5);

/// Absolute 24h change (percent) classified as high volatility
pub const HIGH_VOLATILITY_CHANGE: Decimal = dec!(10);

/// Default retention horizon for derived views, in days
pub const DEFAULT_HORIZON_DAYS: i64 = 30;

/// Default source horizon for the risk pipeline, in days
pub const DEFAULT_RISK_SOURCE_DAYS: i64 = 31;

/// Default freshness window for portfolio valuation, in hours
pub const DEFAULT_FRESHNESS_HOURS: i64 = 24;
