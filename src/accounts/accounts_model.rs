use serde::{Deserialize, Serialize};

use crate::currencies::CurrencyId;

pub type AccountId = i64;

/// A balance held by an account at the ledger epoch, before any recorded
/// transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialBalance {
    pub currency_id: CurrencyId,
    /// Integer minor units of the balance currency.
    pub value: i64,
}

/// Domain model representing an account in the system.
///
/// Only accounts with `is_mine` participate in net-worth and valuation;
/// counterparty accounts (employers, shops) exist so transfers always have
/// two endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub is_mine: bool,
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    pub financial_institution: Option<String>,
    #[serde(default)]
    pub initial_balances: Vec<InitialBalance>,
}
