//! Moneta Core - temporal ledger valuation engine.
//!
//! Reconstructs, for any group of accounts and any instant in time, the
//! quantity of each currency held, its market value in a reference currency
//! via interpolated exchange rates, and a book-value baseline separating
//! principal from gains - then turns the bucketed series into stacked chart
//! geometry. Persistence, transport and UI are the surrounding
//! application's concern; this crate is a pure function of the collections
//! it is given.

pub mod accounts;
pub mod categories;
pub mod charting;
pub mod constants;
pub mod currencies;
pub mod errors;
pub mod fx;
pub mod timeline;
pub mod transactions;
pub mod valuation;

// Re-export the main surfaces
pub use charting::{ChartLayout, ChartLayoutOptions, StackOffset};
pub use fx::{ExchangeRateIndex, ExchangeRateObservation, FxError, RatePoint};
pub use timeline::{Density, Segmentation};
pub use valuation::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
