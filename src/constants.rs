/// Group label used when no grouping is requested
pub const TOTAL_GROUP_LABEL: &str = "Total";

/// Fallback group label for accounts without a type or institution
pub const OTHER_GROUP_LABEL: &str = "Other";

/// Fallback group label for currencies without a risk or type tag
pub const UNKNOWN_GROUP_LABEL: &str = "Unknown";

/// Name of the category that marks investment yield (dividends, interest).
/// Transactions in this category reallocate value instead of adding principal.
pub const FINANCIAL_INCOME_CATEGORY: &str = "Financial income";
