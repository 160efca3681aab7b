use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::accounts::{Account, AccountId};
use crate::constants::{OTHER_GROUP_LABEL, TOTAL_GROUP_LABEL, UNKNOWN_GROUP_LABEL};
use crate::currencies::{Currency, CurrencyId};
use crate::transactions::Transaction;

/// How balances are aggregated into chart series.
///
/// A closed set instead of caller-supplied closures, so every resolver
/// below is an exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupBy {
    /// Everything in a single "Total" series.
    None,
    /// One series per account.
    Account,
    /// One series per account type (cash, savings, brokerage...).
    AccountType,
    /// One series per financial institution.
    Institution,
    /// One series per currency held.
    Currency,
    /// One series per currency risk tag.
    CurrencyRisk,
    /// One series per currency type tag.
    CurrencyType,
}

impl GroupBy {
    /// Account-keyed groupings label a transaction leg by its account;
    /// currency-keyed ones by the currency the leg moves.
    fn is_account_keyed(&self) -> bool {
        matches!(
            self,
            GroupBy::None | GroupBy::Account | GroupBy::AccountType | GroupBy::Institution
        )
    }
}

/// Maps transaction legs and initial balances to group labels for one
/// grouping mode.
pub struct GroupResolver<'a> {
    group_by: GroupBy,
    accounts: HashMap<AccountId, &'a Account>,
    currencies: HashMap<CurrencyId, &'a Currency>,
}

impl<'a> GroupResolver<'a> {
    pub fn new(group_by: GroupBy, accounts: &'a [Account], currencies: &'a [Currency]) -> Self {
        GroupResolver {
            group_by,
            accounts: accounts.iter().map(|a| (a.id, a)).collect(),
            currencies: currencies.iter().map(|c| (c.id, c)).collect(),
        }
    }

    fn account(&self, id: AccountId) -> Option<&Account> {
        let account = self.accounts.get(&id).copied();
        if account.is_none() {
            warn!("Transaction references unknown account {}", id);
        }
        account
    }

    fn currency(&self, id: CurrencyId) -> Option<&Currency> {
        let currency = self.currencies.get(&id).copied();
        if currency.is_none() {
            warn!("Transaction references unknown currency {}", id);
        }
        currency
    }

    fn non_empty_or_unknown(tag: &str) -> String {
        if tag.is_empty() {
            UNKNOWN_GROUP_LABEL.to_string()
        } else {
            tag.to_string()
        }
    }

    fn label_for_currency(&self, id: CurrencyId) -> String {
        let Some(currency) = self.currency(id) else {
            return UNKNOWN_GROUP_LABEL.to_string();
        };
        match self.group_by {
            GroupBy::CurrencyRisk => Self::non_empty_or_unknown(&currency.risk),
            GroupBy::CurrencyType => Self::non_empty_or_unknown(&currency.currency_type),
            _ => currency.name.clone(),
        }
    }

    /// Label for one leg of a transaction: the account holding the leg and
    /// the currency it moves.
    pub fn group_for_leg(&self, account_id: AccountId, currency_id: CurrencyId) -> String {
        match self.group_by {
            GroupBy::None => TOTAL_GROUP_LABEL.to_string(),
            GroupBy::Account => self
                .account(account_id)
                .map(|a| a.name.clone())
                .unwrap_or_else(|| OTHER_GROUP_LABEL.to_string()),
            GroupBy::AccountType => self
                .account(account_id)
                .and_then(|a| a.account_type.clone())
                .unwrap_or_else(|| OTHER_GROUP_LABEL.to_string()),
            GroupBy::Institution => self
                .account(account_id)
                .and_then(|a| a.financial_institution.clone())
                .unwrap_or_else(|| OTHER_GROUP_LABEL.to_string()),
            GroupBy::Currency | GroupBy::CurrencyRisk | GroupBy::CurrencyType => {
                self.label_for_currency(currency_id)
            }
        }
    }

    /// Label of the group a financial-income receipt is attributed to: the
    /// holding that produced the yield. Currency-keyed groupings can name
    /// it explicitly on the transaction; otherwise it is the receiving leg.
    pub fn financial_income_group(&self, tx: &Transaction, receiver_id: AccountId) -> String {
        if self.group_by.is_account_keyed() {
            self.group_for_leg(receiver_id, tx.receiver_currency_id)
        } else {
            self.label_for_currency(
                tx.financial_income_currency_id
                    .unwrap_or(tx.receiver_currency_id),
            )
        }
    }
}
