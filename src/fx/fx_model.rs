use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::currencies::CurrencyId;

/// A user-entered exchange-rate data point: one unit of `from_currency_id`
/// was worth `rate` units of `to_currency_id` on `date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateObservation {
    pub from_currency_id: CurrencyId,
    pub to_currency_id: CurrencyId,
    pub date: NaiveDate,
    pub rate: Decimal,
}
