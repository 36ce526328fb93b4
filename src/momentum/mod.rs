pub mod momentum_model;
pub mod momentum_service;

pub use momentum_model::*;
pub use momentum_service::*;
