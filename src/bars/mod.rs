pub mod bars_model;
pub mod bars_service;

pub use bars_model::*;
pub use bars_service::*;
