use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::valuation_model::{CashflowHistory, CashflowPoint};
use super::valuation_service::Ledger;
use crate::accounts::AccountId;
use crate::currencies::CurrencyId;
use crate::errors::Result;
use crate::timeline::{Density, Segmentation, SweepSection};

/// Parameters of a cumulative net-cashflow computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashflowRequest {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub density: Density,
    pub reference_currency: CurrencyId,
    /// When false, financial-income receipts are left out so the series
    /// shows earned-versus-spent money only.
    pub include_financial_income: bool,
}

impl Ledger {
    /// Cumulative net flow in and out of the owned accounts per bucket.
    ///
    /// Each leg is converted to the reference currency at the rate of the
    /// transaction's own date (not the bucket boundary), so a flow is
    /// valued as of when it happened. Uncategorized transactions are
    /// skipped, as are transactions whose category is unknown.
    pub fn net_cashflow_history(&self, request: &CashflowRequest) -> Result<CashflowHistory> {
        let known_categories: HashSet<_> = self.categories().iter().map(|c| c.id).collect();
        let mine: HashSet<AccountId> = self
            .accounts()
            .iter()
            .filter(|a| a.is_mine)
            .map(|a| a.id)
            .collect();

        let segmentation = Segmentation::select(request.from, request.to, request.density);
        let mut points: Vec<CashflowPoint> = Vec::with_capacity(segmentation.bucket_count);
        let mut cumulative = Decimal::ZERO;

        for segment in segmentation.sweep(request.to, self.transactions()) {
            if segment.section == SweepSection::Seed {
                continue;
            }

            for tx in segment.items {
                let Some(category_id) = tx.category_id else {
                    continue;
                };
                if !known_categories.contains(&category_id) {
                    continue;
                }
                if !request.include_financial_income
                    && Some(category_id) == self.financial_income_category()
                {
                    continue;
                }

                if tx.sender_account_id.is_some_and(|id| mine.contains(&id)) {
                    cumulative -= self.rates().convert(
                        Decimal::from(tx.amount),
                        tx.currency_id,
                        request.reference_currency,
                        tx.date,
                    )?;
                }
                if tx.receiver_account_id.is_some_and(|id| mine.contains(&id)) {
                    cumulative += self.rates().convert(
                        Decimal::from(tx.receiver_amount),
                        tx.receiver_currency_id,
                        request.reference_currency,
                        tx.date,
                    )?;
                }
            }

            points.push(CashflowPoint {
                date: segment.up_to,
                cumulative,
            });
        }

        Ok(CashflowHistory {
            points,
            label_every_nth: segmentation.label_every_nth,
        })
    }
}
