use thiserror::Error;

#[derive(Error, Debug)]
pub enum FxError {
    /// A currency pair has no observations at all. Callers must surface
    /// this as an "unpriced currency" condition instead of defaulting to 1.
    #[error("Exchange rate not found for {0}")]
    RateNotFound(String),

    #[error("Invalid exchange rate: {0}")]
    InvalidRate(String),
}
