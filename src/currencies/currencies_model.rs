use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{Error, Result};

pub type CurrencyId = i64;

/// Domain model representing a currency.
///
/// Amounts in this currency are expressed as integer minor units;
/// `decimal_points` is the scale between minor units and display units.
/// `risk` and `currency_type` are free-form classification tags used purely
/// for grouping (empty string when untagged).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub id: CurrencyId,
    pub name: String,
    pub symbol: String,
    pub risk: String,
    #[serde(rename = "type")]
    pub currency_type: String,
    pub decimal_points: u32,
}

impl Currency {
    /// Formats a raw minor-unit value with the currency symbol.
    /// Negative values are parenthesized, accounting-style.
    pub fn format_full(&self, raw_value: i64) -> String {
        let formatted = format!("{} {}", self.format_amount(raw_value), self.symbol);
        if raw_value < 0 {
            format!("({})", formatted)
        } else {
            formatted
        }
    }

    /// Formats the magnitude of a raw minor-unit value as a display amount
    /// with exactly `decimal_points` fraction digits.
    pub fn format_amount(&self, raw_value: i64) -> String {
        let scaled = Decimal::new(raw_value.abs(), self.decimal_points);
        format!(
            "{:.prec$}",
            scaled,
            prec = self.decimal_points as usize
        )
    }

    /// Parses a display amount into integer minor units, rounding to the
    /// currency's scale.
    pub fn parse_amount(&self, input: &str) -> Result<i64> {
        let value = Decimal::from_str(input.trim())
            .map_err(|e| Error::Validation(format!("Invalid amount '{}': {}", input, e)))?;
        let scaled = value * Decimal::from(10i64.pow(self.decimal_points));
        scaled
            .round()
            .to_i64()
            .ok_or_else(|| Error::Validation(format!("Amount '{}' out of range", input)))
    }
}
