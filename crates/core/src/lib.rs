//! Core business logic for Folio.
//!
//! This crate holds the accounting and timesheet rules with no web or
//! database dependencies. Persistence is reached through the async ports in
//! [`store`]; `folio-db` implements them over PostgreSQL and
//! [`store::InMemoryStore`] implements them in memory.
//!
//! # Modules
//!
//! - `ledger` - Vouchers, posting validation and numbering
//! - `reports` - Balances, general ledger and financial statements
//! - `timesheet` - Weekly timesheets and the approval workflow
//! - `store` - Persistence ports and the in-memory adapter

pub mod ledger;
pub mod reports;
pub mod store;
pub mod timesheet;

#[cfg(test)]
mod test_support;
