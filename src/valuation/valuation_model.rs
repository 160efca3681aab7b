use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::grouping::GroupBy;
use crate::accounts::AccountId;
use crate::currencies::CurrencyId;
use crate::timeline::Density;

/// Whether a chart shows what is owned or what is owed. A group appears in
/// a bucket only when the sign of its market value matches; liability mode
/// negates emitted values so debt charts grow upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Polarity {
    Assets,
    Liabilities,
}

/// Which book-value baseline a chart overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BaselineMode {
    None,
    /// One dashed baseline per group, stacked onto the bands below it.
    PerGroup,
    /// A single baseline for the whole stack.
    Global,
}

/// One group's value at one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPoint {
    /// Market value in the reference currency (minor units).
    pub amount: Decimal,
    /// Book value in the reference currency (minor units).
    pub baseline: Decimal,
}

/// One time-sampled point of a bucketed series: per-group values plus the
/// stack-wide book value. Immutable once emitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationBucket {
    pub date: NaiveDate,
    pub values: HashMap<String, GroupPoint>,
    /// Sum of the book values of every group present in this bucket.
    pub baseline: Decimal,
}

/// A bucketed balance series, oldest bucket first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceHistory {
    pub buckets: Vec<ValuationBucket>,
    /// Every group that appeared in at least one bucket, sorted by label.
    pub groups: Vec<String>,
    /// Axis labels are drawn on every nth bucket, counted from the newest.
    pub label_every_nth: usize,
}

impl BalanceHistory {
    /// The smallest value the series touches, for cropped-absolute charts
    /// that emphasize relative movement. Only meaningful when a single
    /// group is charted; with several groups the floor stays at zero.
    /// Baselines count when they are displayed.
    pub fn min_observed_value(&self, baseline_mode: BaselineMode) -> Decimal {
        if self.groups.len() != 1 {
            return Decimal::ZERO;
        }
        let label = &self.groups[0];

        let mut min = Decimal::MAX;
        for bucket in &self.buckets {
            let Some(point) = bucket.values.get(label) else {
                continue;
            };
            min = min.min(point.amount);
            match baseline_mode {
                BaselineMode::PerGroup => min = min.min(point.baseline),
                BaselineMode::Global => min = min.min(bucket.baseline),
                BaselineMode::None => {}
            }
        }

        if min == Decimal::MAX {
            Decimal::ZERO
        } else {
            min
        }
    }
}

/// Parameters of a bucketed balance-history computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceHistoryRequest {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub density: Density,
    pub group_by: GroupBy,
    /// Restricts the ledger to these accounts. An empty intersection with
    /// the owned accounts falls back to all of them.
    pub filter_accounts: Option<Vec<AccountId>>,
    pub polarity: Polarity,
    pub reference_currency: CurrencyId,
}

/// One point of the cumulative net-cashflow series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashflowPoint {
    pub date: NaiveDate,
    /// Net amount received minus spent since the start of the range, in
    /// reference-currency minor units.
    pub cumulative: Decimal,
}

/// Cumulative net in/out flow of the owned accounts over a range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashflowHistory {
    pub points: Vec<CashflowPoint>,
    pub label_every_nth: usize,
}
