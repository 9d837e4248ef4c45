//! Ledger aggregation and financial statements.
//!
//! Read-side queries over the posting set: account balances and movements,
//! the general ledger summary, dashboard figures, and the classified profit
//! and loss and balance sheet listings.

pub mod aggregation;
pub mod service;
pub mod types;

#[cfg(test)]
mod aggregation_props;

pub use service::{DEFAULT_TOP_ACCOUNTS_LIMIT, DEFAULT_TREND_MONTHS, LedgerAggregationEngine};
pub use types::{
    AccountLedger, AccountLedgerLine, AccountSummary, ClassifiedAmount, ClassifiedListing,
    DateRange, FinancialSummary, GeneralLedgerRow, MonthlyTrend, Period,
};
