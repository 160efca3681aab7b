//! Ledger valuation module - replay engine, grouping, and the bucketed
//! balance-history aggregator.

mod balances;
mod cashflow;
mod grouping;
mod replay;
mod valuation_model;
mod valuation_service;

pub use balances::account_balances;
pub use cashflow::CashflowRequest;
pub use grouping::{GroupBy, GroupResolver};
pub use replay::{GroupState, LedgerReplay};
pub use valuation_model::*;
pub use valuation_service::Ledger;
