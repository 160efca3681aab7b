use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::accounts::AccountId;
use crate::categories::CategoryId;
use crate::currencies::CurrencyId;
use crate::timeline::Dated;

pub type TransactionId = i64;

/// Structural kind of a transaction, derived from which endpoints it has
/// and its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// No sender: money entering the ledger from outside.
    Income,
    /// No receiver: money leaving the ledger.
    Expense,
    /// Both endpoints present: money moving between accounts.
    Transfer,
    /// Categorized as investment yield; reallocates value instead of
    /// contributing principal.
    FinancialIncome,
}

/// Domain model representing a monetary transfer.
///
/// The two legs may use different currencies; in that case the pair
/// (`amount`, `receiver_amount`) implies an exchange-rate observation.
/// Both amounts are non-negative integer minor units of their respective
/// currencies. Transactions are immutable once loaded into the engine;
/// edits are modeled as whole-collection replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub owner: String,
    pub amount: i64,
    pub currency_id: CurrencyId,
    pub date: NaiveDate,
    pub sender_account_id: Option<AccountId>,
    pub receiver_account_id: Option<AccountId>,
    pub receiver_currency_id: CurrencyId,
    pub receiver_amount: i64,
    pub category_id: Option<CategoryId>,
    pub financial_income_currency_id: Option<CurrencyId>,
    pub note: Option<String>,
}

impl Transaction {
    /// True when the two legs are denominated in different currencies.
    pub fn is_cross_currency(&self) -> bool {
        self.currency_id != self.receiver_currency_id
    }

    /// Classifies the transaction given the id of the financial-income
    /// category, when one exists in the category set.
    pub fn kind(&self, financial_income_category: Option<CategoryId>) -> TransactionKind {
        if self.category_id.is_some() && self.category_id == financial_income_category {
            return TransactionKind::FinancialIncome;
        }
        match (self.sender_account_id, self.receiver_account_id) {
            (Some(_), Some(_)) => TransactionKind::Transfer,
            (Some(_), None) => TransactionKind::Expense,
            (None, _) => TransactionKind::Income,
        }
    }
}

impl Dated for Transaction {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer(sender: Option<AccountId>, receiver: Option<AccountId>) -> Transaction {
        Transaction {
            id: 1,
            owner: "me@example.com".to_string(),
            amount: 100,
            currency_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            sender_account_id: sender,
            receiver_account_id: receiver,
            receiver_currency_id: 1,
            receiver_amount: 100,
            category_id: None,
            financial_income_currency_id: None,
            note: None,
        }
    }

    #[test]
    fn test_kind_from_endpoints() {
        assert_eq!(transfer(None, Some(2)).kind(None), TransactionKind::Income);
        assert_eq!(transfer(Some(1), None).kind(None), TransactionKind::Expense);
        assert_eq!(
            transfer(Some(1), Some(2)).kind(None),
            TransactionKind::Transfer
        );
    }

    #[test]
    fn test_financial_income_category_wins() {
        let mut tx = transfer(Some(1), Some(2));
        tx.category_id = Some(9);
        assert_eq!(tx.kind(Some(9)), TransactionKind::FinancialIncome);
        assert_eq!(tx.kind(Some(8)), TransactionKind::Transfer);
    }
}
