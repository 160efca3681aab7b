//! Category domain models.

mod categories_model;

pub use categories_model::*;
