use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::fx_errors::FxError;
use super::fx_model::ExchangeRateObservation;
use crate::currencies::CurrencyId;
use crate::transactions::Transaction;

/// One data point in a pair's rate history. Kept sorted ascending by date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatePoint {
    pub date: NaiveDate,
    pub rate: Decimal,
}

/// Point-in-time exchange-rate lookup over sparse observations.
///
/// The index holds, per ordered currency pair, a chronologically sorted list
/// of observations: the explicit ones supplied by the user plus one implied
/// by every transaction whose two legs use different currencies. Queries
/// between observations interpolate linearly by elapsed time; queries outside
/// the observed range are held flat at the nearest observation.
pub struct ExchangeRateIndex {
    rates: HashMap<(CurrencyId, CurrencyId), Vec<RatePoint>>,
}

impl ExchangeRateIndex {
    /// Builds the index from explicit observations and the transaction set.
    ///
    /// Sortedness per pair is (re-)established here; callers rebuild the
    /// index whenever either input collection changes. Insertion order is
    /// preserved for same-date points (stable sort), so explicit
    /// observations take precedence over transaction-implied ones.
    pub fn build(observations: &[ExchangeRateObservation], transactions: &[Transaction]) -> Self {
        let mut rates: HashMap<(CurrencyId, CurrencyId), Vec<RatePoint>> = HashMap::new();

        let mut insert = |from: CurrencyId, to: CurrencyId, date: NaiveDate, rate: Decimal| {
            rates
                .entry((from, to))
                .or_default()
                .push(RatePoint { date, rate });
        };

        for obs in observations {
            if obs.from_currency_id == obs.to_currency_id {
                continue;
            }
            if obs.rate <= Decimal::ZERO {
                warn!(
                    "Ignoring non-positive rate observation {}->{} on {}",
                    obs.from_currency_id, obs.to_currency_id, obs.date
                );
                continue;
            }
            insert(obs.from_currency_id, obs.to_currency_id, obs.date, obs.rate);
            insert(
                obs.to_currency_id,
                obs.from_currency_id,
                obs.date,
                Decimal::ONE / obs.rate,
            );
        }

        for tx in transactions {
            if !tx.is_cross_currency() {
                continue;
            }
            if tx.amount == 0 || tx.receiver_amount == 0 {
                warn!(
                    "Transaction {} converts between currencies with a zero leg; no rate implied",
                    tx.id
                );
                continue;
            }
            let forward = Decimal::from(tx.receiver_amount) / Decimal::from(tx.amount);
            insert(tx.currency_id, tx.receiver_currency_id, tx.date, forward);
            insert(
                tx.receiver_currency_id,
                tx.currency_id,
                tx.date,
                Decimal::from(tx.amount) / Decimal::from(tx.receiver_amount),
            );
        }

        for history in rates.values_mut() {
            history.sort_by_key(|p| p.date);
        }

        ExchangeRateIndex { rates }
    }

    /// True when at least one observation exists for the pair (or the pair
    /// is trivial).
    pub fn has_pair(&self, from: CurrencyId, to: CurrencyId) -> bool {
        from == to
            || self
                .rates
                .get(&(from, to))
                .is_some_and(|history| !history.is_empty())
    }

    /// Returns the rate from `from` to `to` on `date`.
    ///
    /// Picks the latest observation strictly before `date` (`before`) and
    /// its successor (`after`), then blends them linearly by elapsed days.
    /// At either end of the history the rate is the boundary observation;
    /// the blend ratio is clamped so the result never leaves the
    /// [before.rate, after.rate] envelope.
    pub fn rate_on(&self, from: CurrencyId, to: CurrencyId, date: NaiveDate) -> Result<Decimal, FxError> {
        if from == to {
            return Ok(Decimal::ONE);
        }

        let history = self
            .rates
            .get(&(from, to))
            .filter(|history| !history.is_empty())
            .ok_or_else(|| FxError::RateNotFound(format!("{}->{} on {}", from, to, date)))?;

        let before_index = history
            .partition_point(|p| p.date < date)
            .saturating_sub(1);
        let after_index = (before_index + 1).min(history.len() - 1);

        let before = history[before_index];
        let after = history[after_index];

        if before_index == after_index || before.date == after.date {
            return Ok(before.rate);
        }

        let span = (after.date - before.date).num_days();
        let elapsed = (date - before.date).num_days().clamp(0, span);
        let ratio = Decimal::from(elapsed) / Decimal::from(span);

        Ok(after.rate * ratio + before.rate * (Decimal::ONE - ratio))
    }

    /// Converts an amount between currencies using the rate on `date`.
    pub fn convert(
        &self,
        amount: Decimal,
        from: CurrencyId,
        to: CurrencyId,
        date: NaiveDate,
    ) -> Result<Decimal, FxError> {
        if from == to {
            return Ok(amount);
        }
        let rate = self.rate_on(from, to, date)?;
        Ok(amount * rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn obs(from: CurrencyId, to: CurrencyId, rate: Decimal, y: i32, m: u32, d: u32) -> ExchangeRateObservation {
        ExchangeRateObservation {
            from_currency_id: from,
            to_currency_id: to,
            date: date(y, m, d),
            rate,
        }
    }

    fn cross_currency_tx(amount: i64, receiver_amount: i64, y: i32, m: u32, d: u32) -> Transaction {
        Transaction {
            id: 1,
            owner: "me@example.com".to_string(),
            amount,
            currency_id: 1,
            date: date(y, m, d),
            sender_account_id: Some(10),
            receiver_account_id: Some(11),
            receiver_currency_id: 2,
            receiver_amount,
            category_id: None,
            financial_income_currency_id: None,
            note: None,
        }
    }

    #[test]
    fn test_identity_pair_needs_no_observations() {
        let index = ExchangeRateIndex::build(&[], &[]);
        assert_eq!(index.rate_on(3, 3, date(2024, 1, 1)).unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_missing_pair_is_an_error() {
        let index = ExchangeRateIndex::build(&[], &[]);
        let err = index.rate_on(1, 2, date(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, FxError::RateNotFound(_)));
    }

    #[test]
    fn test_single_observation_holds_everywhere() {
        let index = ExchangeRateIndex::build(&[obs(1, 2, dec!(1.5), 2024, 6, 15)], &[]);

        for day in [date(2020, 1, 1), date(2024, 6, 15), date(2030, 12, 31)] {
            assert_eq!(index.rate_on(1, 2, day).unwrap(), dec!(1.5));
        }
    }

    #[test]
    fn test_linear_interpolation_between_observations() {
        let index = ExchangeRateIndex::build(
            &[
                obs(1, 2, dec!(1.0), 2024, 1, 1),
                obs(1, 2, dec!(2.0), 2024, 1, 11),
            ],
            &[],
        );

        // 4 of 10 days elapsed
        assert_eq!(index.rate_on(1, 2, date(2024, 1, 5)).unwrap(), dec!(1.4));
        // endpoints
        assert_eq!(index.rate_on(1, 2, date(2024, 1, 11)).unwrap(), dec!(2.0));
    }

    #[test]
    fn test_interpolation_stays_within_envelope() {
        let index = ExchangeRateIndex::build(
            &[
                obs(1, 2, dec!(1.0), 2024, 1, 1),
                obs(1, 2, dec!(2.0), 2024, 1, 11),
            ],
            &[],
        );

        let mut day = date(2024, 1, 1);
        while day <= date(2024, 1, 11) {
            let rate = index.rate_on(1, 2, day).unwrap();
            assert!(rate >= dec!(1.0) && rate <= dec!(2.0));
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_no_extrapolation_outside_observed_range() {
        let index = ExchangeRateIndex::build(
            &[
                obs(1, 2, dec!(1.0), 2024, 1, 10),
                obs(1, 2, dec!(2.0), 2024, 1, 20),
            ],
            &[],
        );

        assert_eq!(index.rate_on(1, 2, date(2023, 12, 1)).unwrap(), dec!(1.0));
        assert_eq!(index.rate_on(1, 2, date(2024, 3, 1)).unwrap(), dec!(2.0));
    }

    #[test]
    fn test_reciprocal_pair_is_derived() {
        let index = ExchangeRateIndex::build(&[obs(1, 2, dec!(4), 2024, 1, 1)], &[]);
        assert_eq!(index.rate_on(2, 1, date(2024, 1, 1)).unwrap(), dec!(0.25));
    }

    #[test]
    fn test_transactions_imply_observations() {
        // 200 minor units of currency 1 bought 100 of currency 2
        let index = ExchangeRateIndex::build(&[], &[cross_currency_tx(200, 100, 2024, 2, 1)]);

        assert_eq!(index.rate_on(1, 2, date(2024, 2, 1)).unwrap(), dec!(0.5));
        assert_eq!(index.rate_on(2, 1, date(2024, 2, 1)).unwrap(), dec!(2));
        assert!(index.has_pair(1, 2));
    }

    #[test]
    fn test_zero_leg_transactions_imply_nothing() {
        let index = ExchangeRateIndex::build(&[], &[cross_currency_tx(0, 100, 2024, 2, 1)]);
        assert!(!index.has_pair(1, 2));
    }

    #[test]
    fn test_convert_applies_rate() {
        let index = ExchangeRateIndex::build(&[obs(1, 2, dec!(1.5), 2024, 1, 1)], &[]);
        assert_eq!(
            index.convert(dec!(100), 1, 2, date(2024, 1, 1)).unwrap(),
            dec!(150)
        );
        assert_eq!(
            index.convert(dec!(100), 5, 5, date(2024, 1, 1)).unwrap(),
            dec!(100)
        );
    }
}
