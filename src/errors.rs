//! Core error types for the valuation engine.
//!
//! This module defines the crate-wide error type. Domain-specific errors
//! (FX, ledger validation) are defined next to their domains and converted
//! into this type via `From`.

use thiserror::Error;

use crate::accounts::AccountId;
use crate::currencies::CurrencyId;
use crate::fx::FxError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the valuation engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Fx error: {0}")]
    Fx(#[from] FxError),

    #[error("Unknown currency id: {0}")]
    UnknownCurrency(CurrencyId),

    #[error("Unknown account id: {0}")]
    UnknownAccount(AccountId),

    #[error("Input validation failed: {0}")]
    Validation(String),
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
