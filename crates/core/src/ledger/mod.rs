//! Double-entry voucher ledger.
//!
//! This module implements the voucher side of the bookkeeping core:
//! - Account-number classification into report buckets
//! - Posting validation (balance law, minimum legs, reference data)
//! - Sequential voucher numbering per tenant and year
//! - The voucher service for create, replace and summary queries

pub mod account_type;
pub mod error;
pub mod numbering;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;
#[cfg(test)]
mod validation_props;

pub use account_type::AccountType;
pub use error::LedgerError;
pub use numbering::VoucherNumberAllocator;
pub use service::VoucherLedgerService;
pub use types::{
    Account, CreateVoucherCommand, NewPosting, NewVoucher, Posting, PostingCommand,
    PostingSummary, UpdateVoucherCommand, VatCode, Voucher, VoucherHeader, VoucherSearch,
    VoucherSummary, VoucherWithPostings,
};
pub use validation::PostingValidator;
