//! Currency domain models.

mod currencies_model;

pub use currencies_model::*;
