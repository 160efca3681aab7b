use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

use super::grouping::GroupResolver;
use crate::accounts::{Account, AccountId};
use crate::categories::CategoryId;
use crate::currencies::CurrencyId;
use crate::fx::{ExchangeRateIndex, FxError};
use crate::transactions::{Transaction, TransactionKind};

/// Running state of one group: the quantity of each currency it holds and
/// the principal contributed to it so far.
#[derive(Debug, Clone, Default)]
pub struct GroupState {
    /// Cumulative principal in the reference currency. Internal transfers
    /// within the group and financial-income receipts do not move it.
    pub book_value: Decimal,
    /// Signed quantity held per currency, in integer minor units.
    pub assets: HashMap<CurrencyId, i64>,
}

impl GroupState {
    fn credit(&mut self, currency: CurrencyId, amount: i64) {
        *self.assets.entry(currency).or_insert(0) += amount;
    }

    fn debit(&mut self, currency: CurrencyId, amount: i64) {
        *self.assets.entry(currency).or_insert(0) -= amount;
    }

    /// Sums the held quantities into a single reference-currency value at
    /// the rates of `date`. Zero quantities are skipped, so a currency the
    /// group has fully exited never demands a rate.
    pub fn market_value(
        &self,
        rates: &ExchangeRateIndex,
        reference: CurrencyId,
        date: NaiveDate,
    ) -> Result<Decimal, FxError> {
        let mut total = Decimal::ZERO;
        for (&currency, &quantity) in &self.assets {
            if quantity == 0 {
                continue;
            }
            if currency == reference {
                total += Decimal::from(quantity);
            } else {
                total += Decimal::from(quantity) * rates.rate_on(currency, reference, date)?;
            }
        }
        Ok(total)
    }
}

/// Replays transactions forward in time, maintaining per-group asset maps
/// and book values.
///
/// Only legs belonging to accounts in `scope` (the caller's filtered "mine"
/// accounts) move state. The sweep drives this in two phases: `apply_seed`
/// for history before the visible range, then `rebaseline` once at the
/// boundary, then `apply` per visible bucket.
pub struct LedgerReplay<'a> {
    resolver: GroupResolver<'a>,
    scope: HashSet<AccountId>,
    rates: &'a ExchangeRateIndex,
    reference: CurrencyId,
    financial_income_category: Option<CategoryId>,
    groups: HashMap<String, GroupState>,
}

impl<'a> LedgerReplay<'a> {
    /// Seeds group states from the initial balances of the in-scope
    /// accounts.
    pub fn new(
        resolver: GroupResolver<'a>,
        scope_accounts: &[&'a Account],
        rates: &'a ExchangeRateIndex,
        reference: CurrencyId,
        financial_income_category: Option<CategoryId>,
    ) -> Self {
        let mut groups: HashMap<String, GroupState> = HashMap::new();
        for account in scope_accounts {
            for balance in &account.initial_balances {
                let label = resolver.group_for_leg(account.id, balance.currency_id);
                groups
                    .entry(label)
                    .or_default()
                    .credit(balance.currency_id, balance.value);
            }
        }

        LedgerReplay {
            resolver,
            scope: scope_accounts.iter().map(|a| a.id).collect(),
            rates,
            reference,
            financial_income_category,
            groups,
        }
    }

    pub fn groups(&self) -> &HashMap<String, GroupState> {
        &self.groups
    }

    /// Applies a pre-range transaction: asset quantities move, book values
    /// do not (they are rebaselined at the seed boundary).
    pub fn apply_seed(&mut self, tx: &Transaction) {
        if let Some(receiver_id) = tx.receiver_account_id {
            if self.scope.contains(&receiver_id) {
                let label = self.resolver.group_for_leg(receiver_id, tx.receiver_currency_id);
                self.groups
                    .entry(label)
                    .or_default()
                    .credit(tx.receiver_currency_id, tx.receiver_amount);
            }
        }
        if let Some(sender_id) = tx.sender_account_id {
            if self.scope.contains(&sender_id) {
                let label = self.resolver.group_for_leg(sender_id, tx.currency_id);
                self.groups
                    .entry(label)
                    .or_default()
                    .debit(tx.currency_id, tx.amount);
            }
        }
    }

    /// Resets every group's book value to its market value on `date`.
    /// Gains reported by a chart are therefore gains within the requested
    /// range, not all-time gains.
    pub fn rebaseline(&mut self, date: NaiveDate) -> Result<(), FxError> {
        let rates = self.rates;
        let reference = self.reference;
        for state in self.groups.values_mut() {
            state.book_value = state.market_value(rates, reference, date)?;
        }
        Ok(())
    }

    /// Applies a visible-range transaction: asset quantities move, and the
    /// book value moves when the transaction brings principal in or out of
    /// the group.
    ///
    /// Excluded from book-value movement: transfers whose two legs resolve
    /// to the same group (a reallocation, not new principal), and
    /// financial-income receipts (yield produced by a holding, booked
    /// against that holding's group instead).
    pub fn apply(&mut self, tx: &Transaction, bucket_date: NaiveDate) -> Result<(), FxError> {
        let is_financial_income =
            tx.kind(self.financial_income_category) == TransactionKind::FinancialIncome;

        if let Some(receiver_id) = tx.receiver_account_id {
            if self.scope.contains(&receiver_id) {
                let label = self.resolver.group_for_leg(receiver_id, tx.receiver_currency_id);
                let same_group_transfer = tx.sender_account_id.is_some_and(|sender_id| {
                    self.scope.contains(&sender_id)
                        && self.resolver.group_for_leg(sender_id, tx.currency_id) == label
                });

                let book_delta = if same_group_transfer {
                    Decimal::ZERO
                } else {
                    self.inflow_book_delta(tx, bucket_date)?
                };

                let state = self.groups.entry(label).or_default();
                state.credit(tx.receiver_currency_id, tx.receiver_amount);

                if !same_group_transfer {
                    state.book_value += book_delta;
                    if is_financial_income {
                        // The yield came out of the holding that produced
                        // it; net book value across groups is unchanged.
                        let source = self.resolver.financial_income_group(tx, receiver_id);
                        self.groups.entry(source).or_default().book_value -= book_delta;
                    }
                }
            }
        }

        if let Some(sender_id) = tx.sender_account_id {
            if self.scope.contains(&sender_id) {
                let label = self.resolver.group_for_leg(sender_id, tx.currency_id);
                let same_group_transfer = tx.receiver_account_id.is_some_and(|receiver_id| {
                    self.scope.contains(&receiver_id)
                        && self
                            .resolver
                            .group_for_leg(receiver_id, tx.receiver_currency_id)
                            == label
                });

                let book_delta = if same_group_transfer || is_financial_income {
                    Decimal::ZERO
                } else {
                    self.outflow_book_delta(tx, bucket_date)?
                };

                let state = self.groups.entry(label).or_default();
                state.debit(tx.currency_id, tx.amount);
                state.book_value -= book_delta;
            }
        }

        Ok(())
    }

    /// Reference-currency size of an inflow. When either leg is already in
    /// the reference currency its amount is used directly; interpolation
    /// (and its rounding) is only paid for genuinely foreign pairs.
    fn inflow_book_delta(&self, tx: &Transaction, bucket_date: NaiveDate) -> Result<Decimal, FxError> {
        if tx.receiver_currency_id == self.reference {
            Ok(Decimal::from(tx.receiver_amount))
        } else if tx.currency_id == self.reference {
            Ok(Decimal::from(tx.amount))
        } else {
            let rate = self
                .rates
                .rate_on(tx.receiver_currency_id, self.reference, bucket_date)?;
            Ok(Decimal::from(tx.receiver_amount) * rate)
        }
    }

    /// Reference-currency size of an outflow, measured on the sending leg.
    fn outflow_book_delta(&self, tx: &Transaction, bucket_date: NaiveDate) -> Result<Decimal, FxError> {
        if tx.receiver_currency_id == self.reference {
            Ok(Decimal::from(tx.receiver_amount))
        } else if tx.currency_id == self.reference {
            Ok(Decimal::from(tx.amount))
        } else {
            let rate = self.rates.rate_on(tx.currency_id, self.reference, bucket_date)?;
            Ok(Decimal::from(tx.amount) * rate)
        }
    }
}
