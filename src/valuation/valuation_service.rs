use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};

use super::grouping::GroupResolver;
use super::replay::LedgerReplay;
use super::valuation_model::{
    BalanceHistory, BalanceHistoryRequest, GroupPoint, Polarity, ValuationBucket,
};
use crate::accounts::{Account, AccountId};
use crate::categories::{Category, CategoryId};
use crate::currencies::{Currency, CurrencyId};
use crate::errors::{Error, Result};
use crate::fx::{ExchangeRateIndex, ExchangeRateObservation, RatePoint};
use crate::timeline::{Density, Segmentation, SweepSection};
use crate::transactions::Transaction;

/// An immutable snapshot of the ledger with its derived indexes.
///
/// Constructed once per change to the source collections; every query on it
/// is a pure function, so results can be memoized by snapshot identity and
/// stale results simply discarded. Construction establishes the one global
/// ordering invariant: transactions sorted ascending by date.
pub struct Ledger {
    accounts: Vec<Account>,
    currencies: Vec<Currency>,
    categories: Vec<Category>,
    /// Sorted ascending by date; the only order any sweep ever sees.
    transactions: Vec<Transaction>,
    rates: ExchangeRateIndex,
    financial_income_category: Option<CategoryId>,
}

impl Ledger {
    pub fn new(
        accounts: Vec<Account>,
        currencies: Vec<Currency>,
        categories: Vec<Category>,
        mut transactions: Vec<Transaction>,
        observations: Vec<ExchangeRateObservation>,
    ) -> Self {
        transactions.sort_by_key(|tx| tx.date);
        let rates = ExchangeRateIndex::build(&observations, &transactions);
        let financial_income_category = categories
            .iter()
            .find(|c| c.is_financial_income())
            .map(|c| c.id);

        debug!(
            "Ledger snapshot: {} accounts, {} currencies, {} transactions",
            accounts.len(),
            currencies.len(),
            transactions.len()
        );

        Ledger {
            accounts,
            currencies,
            categories,
            transactions,
            rates,
            financial_income_category,
        }
    }

    /// The point-in-time rate lookup, usable on its own by any component
    /// that needs a converted balance.
    pub fn rates(&self) -> &ExchangeRateIndex {
        &self.rates
    }

    /// The date-sorted transaction list.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub(crate) fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub(crate) fn financial_income_category(&self) -> Option<CategoryId> {
        self.financial_income_category
    }

    fn currency(&self, id: CurrencyId) -> Result<&Currency> {
        self.currencies
            .iter()
            .find(|c| c.id == id)
            .ok_or(Error::UnknownCurrency(id))
    }

    /// The owned accounts a request operates on. Unknown filter ids are an
    /// error; a filter that matches no owned account falls back to all of
    /// them so a chart never silently goes blank.
    pub(crate) fn scoped_accounts(
        &self,
        filter_accounts: Option<&[AccountId]>,
    ) -> Result<Vec<&Account>> {
        let mine: Vec<&Account> = self.accounts.iter().filter(|a| a.is_mine).collect();

        let Some(filter) = filter_accounts else {
            return Ok(mine);
        };

        for id in filter {
            if !self.accounts.iter().any(|a| a.id == *id) {
                return Err(Error::UnknownAccount(*id));
            }
        }

        let filtered: Vec<&Account> = mine
            .iter()
            .copied()
            .filter(|a| filter.contains(&a.id))
            .collect();
        if filtered.is_empty() {
            Ok(mine)
        } else {
            Ok(filtered)
        }
    }

    /// Computes the bucketed `{market value, book value}` series for every
    /// group over the requested range.
    ///
    /// The sweep visits each transaction exactly once: the seed section
    /// shapes the starting state, then each visible bucket applies its own
    /// transactions and is valued at its boundary date.
    pub fn balance_history(&self, request: &BalanceHistoryRequest) -> Result<BalanceHistory> {
        let reference = self.currency(request.reference_currency)?.id;
        let scope_accounts = self.scoped_accounts(request.filter_accounts.as_deref())?;

        debug!(
            "Balance history {} -> {} over {} accounts, grouped {:?}",
            request.from,
            request.to,
            scope_accounts.len(),
            request.group_by
        );

        let resolver = GroupResolver::new(request.group_by, &self.accounts, &self.currencies);
        let mut replay = LedgerReplay::new(
            resolver,
            &scope_accounts,
            &self.rates,
            reference,
            self.financial_income_category,
        );

        let segmentation = Segmentation::select(request.from, request.to, request.density);
        let mut buckets: Vec<ValuationBucket> = Vec::with_capacity(segmentation.bucket_count);
        let mut groups: BTreeSet<String> = BTreeSet::new();

        for segment in segmentation.sweep(request.to, &self.transactions) {
            match segment.section {
                SweepSection::Seed => {
                    for tx in segment.items {
                        replay.apply_seed(tx);
                    }
                    replay.rebaseline(segment.up_to)?;
                }
                SweepSection::Visible => {
                    for tx in segment.items {
                        replay.apply(tx, segment.up_to)?;
                    }

                    let mut values: HashMap<String, GroupPoint> = HashMap::new();
                    let mut total_book = Decimal::ZERO;

                    for (label, state) in replay.groups() {
                        let market = state.market_value(&self.rates, reference, segment.up_to)?;
                        if market.is_zero() {
                            continue;
                        }
                        let is_asset = market > Decimal::ZERO;
                        if is_asset != (request.polarity == Polarity::Assets) {
                            continue;
                        }
                        let sign = match request.polarity {
                            Polarity::Assets => Decimal::ONE,
                            Polarity::Liabilities => Decimal::NEGATIVE_ONE,
                        };

                        total_book += state.book_value * sign;
                        values.insert(
                            label.clone(),
                            GroupPoint {
                                amount: market * sign,
                                baseline: state.book_value * sign,
                            },
                        );
                        groups.insert(label.clone());
                    }

                    buckets.push(ValuationBucket {
                        date: segment.up_to,
                        values,
                        baseline: total_book,
                    });
                }
            }
        }

        Ok(BalanceHistory {
            buckets,
            groups: groups.into_iter().collect(),
            label_every_nth: segmentation.label_every_nth,
        })
    }

    /// Samples the interpolated rate of a currency pair at every bucket
    /// boundary of the range.
    pub fn rate_history(
        &self,
        from_currency: CurrencyId,
        to_currency: CurrencyId,
        from: NaiveDate,
        to: NaiveDate,
        density: Density,
    ) -> Result<Vec<RatePoint>> {
        self.currency(from_currency)?;
        self.currency(to_currency)?;

        let segmentation = Segmentation::select(from, to, density);
        segmentation
            .bucket_dates(to)
            .into_iter()
            .map(|date| {
                let rate = self.rates.rate_on(from_currency, to_currency, date)?;
                Ok(RatePoint { date, rate })
            })
            .collect()
    }
}
