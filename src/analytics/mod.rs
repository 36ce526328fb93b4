pub mod analytics_model;
pub mod analytics_service;

pub use analytics_model::*;
pub use analytics_service::*;
