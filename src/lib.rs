pub mod analytics;
pub mod bars;
pub mod constants;
pub mod errors;
pub mod holdings;
pub mod indicators;
pub mod market_data;
pub mod momentum;
pub mod performance;
pub mod risk;
pub mod series;

pub use analytics::*;
pub use errors::{Error, Result};
