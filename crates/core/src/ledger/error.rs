//! Ledger error types for validation and lookup errors.
//!
//! Covers posting validation, voucher lookup, number allocation and the
//! date-range checks of the reporting queries.

use chrono::NaiveDate;
use folio_shared::AppError;
use folio_shared::types::VoucherId;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Fewer than two postings carry a non-zero amount.
    #[error("A voucher needs at least 2 postings with a non-zero amount")]
    InsufficientPostings,

    /// The account number does not exist in the tenant's chart.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// The VAT code does not exist for the tenant.
    #[error("Invalid VAT code: {0}")]
    InvalidVatCode(String),

    /// The currency is not a three-letter ISO code.
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),

    /// Amount with more decimal places than the ledger stores.
    #[error("Amount {0} has more than 2 decimal places")]
    InvalidAmountPrecision(Decimal),

    /// Postings do not sum to zero.
    #[error("Postings are not balanced. Total: {0}")]
    PostingsNotBalanced(Decimal),

    /// Report range with start after end.
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange {
        /// Range start.
        start: NaiveDate,
        /// Range end.
        end: NaiveDate,
    },

    // ========== Lookup Errors ==========
    /// Voucher absent or owned by another tenant.
    #[error("Voucher not found: {0}")]
    VoucherNotFound(VoucherId),

    // ========== Concurrency Errors ==========
    /// Number allocation kept colliding with concurrent writers.
    #[error("Could not allocate a voucher number for {year} after {attempts} attempts")]
    VoucherNumberExhausted {
        /// Year being allocated in.
        year: i32,
        /// Attempts made.
        attempts: u32,
    },

    // ========== Database Errors ==========
    /// Store error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientPostings => "INSUFFICIENT_POSTINGS",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::InvalidVatCode(_) => "INVALID_VAT_CODE",
            Self::InvalidCurrency(_) => "INVALID_CURRENCY",
            Self::InvalidAmountPrecision(_) => "INVALID_AMOUNT_PRECISION",
            Self::PostingsNotBalanced(_) => "POSTINGS_NOT_BALANCED",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::VoucherNotFound(_) => "VOUCHER_NOT_FOUND",
            Self::VoucherNumberExhausted { .. } => "VOUCHER_NUMBER_EXHAUSTED",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::InsufficientPostings
            | Self::AccountNotFound(_)
            | Self::InvalidVatCode(_)
            | Self::InvalidCurrency(_)
            | Self::InvalidAmountPrecision(_)
            | Self::PostingsNotBalanced(_)
            | Self::InvalidDateRange { .. } => 400,

            // 404 Not Found
            Self::VoucherNotFound(_) => 404,

            // 409 Conflict - concurrency errors
            Self::VoucherNumberExhausted { .. } => 409,

            // 500 Internal Server Error
            Self::Database(_) => 500,
        }
    }

    /// Returns true if the caller supplied invalid input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        self.http_status_code() == 400
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err.http_status_code() {
            400 => Self::Validation(err.to_string()),
            404 => Self::NotFound(err.to_string()),
            409 => Self::Conflict(err.to_string()),
            _ => Self::Database(err.to_string()),
        }
    }
}
