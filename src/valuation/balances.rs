use std::collections::HashMap;

use super::valuation_service::Ledger;
use crate::accounts::{Account, AccountId};
use crate::currencies::CurrencyId;
use crate::transactions::Transaction;

/// Current balance of every account per currency, in integer minor units:
/// initial balances plus every transaction leg, owned and counterparty
/// accounts alike.
pub fn account_balances(
    accounts: &[Account],
    transactions: &[Transaction],
) -> HashMap<AccountId, HashMap<CurrencyId, i64>> {
    let mut balances: HashMap<AccountId, HashMap<CurrencyId, i64>> = HashMap::new();

    for account in accounts {
        let entry = balances.entry(account.id).or_default();
        for balance in &account.initial_balances {
            *entry.entry(balance.currency_id).or_insert(0) += balance.value;
        }
    }

    for tx in transactions {
        if let Some(sender_id) = tx.sender_account_id {
            *balances
                .entry(sender_id)
                .or_default()
                .entry(tx.currency_id)
                .or_insert(0) -= tx.amount;
        }
        if let Some(receiver_id) = tx.receiver_account_id {
            *balances
                .entry(receiver_id)
                .or_default()
                .entry(tx.receiver_currency_id)
                .or_insert(0) += tx.receiver_amount;
        }
    }

    balances
}

impl Ledger {
    /// See [`account_balances`].
    pub fn account_balances(&self) -> HashMap<AccountId, HashMap<CurrencyId, i64>> {
        account_balances(self.accounts(), self.transactions())
    }
}
