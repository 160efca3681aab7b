use serde::{Deserialize, Serialize};

use crate::constants::FINANCIAL_INCOME_CATEGORY;

pub type CategoryId = i64;

/// Domain model representing a transaction category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Category {
    pub fn is_financial_income(&self) -> bool {
        self.name == FINANCIAL_INCOME_CATEGORY
    }
}
