//! Transaction domain models.

mod transactions_model;

pub use transactions_model::*;
