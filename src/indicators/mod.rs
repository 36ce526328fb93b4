pub mod indicators_model;
pub mod indicators_service;

pub use indicators_model::*;
pub use indicators_service::*;
