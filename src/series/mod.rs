pub mod series_model;
pub mod series_service;

pub use series_model::*;
pub use series_service::*;
