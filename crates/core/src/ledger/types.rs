//! Ledger domain types for vouchers and postings.
//!
//! Vouchers group postings; postings carry signed amounts against an
//! account number. A debit is a positive amount and a credit a negative one,
//! so a balanced voucher sums to exactly zero.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use folio_shared::types::{CurrencyCode, PostingId, TenantId, VoucherId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum length of an account number.
pub const MAX_ACCOUNT_NUMBER_LEN: usize = 10;

/// A dated accounting document owning a set of postings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    /// Internal id.
    pub id: VoucherId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Sequential number within (tenant, year of `date`).
    pub number: i32,
    /// Voucher date.
    pub date: NaiveDate,
    /// Optional free text.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Voucher {
    /// The year the voucher number is scoped to.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Display identity, `"{number}-{year}"`.
    #[must_use]
    pub fn display_number(&self) -> String {
        format!("{}-{}", self.number, self.year())
    }
}

/// A single signed line against one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Internal id.
    pub id: PostingId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Owning voucher.
    pub voucher_id: Option<VoucherId>,
    /// Account number (up to 10 chars).
    pub account_number: String,
    /// Signed amount, 2 decimals, never zero.
    pub amount: Decimal,
    /// Currency of `amount`.
    pub currency: CurrencyCode,
    /// Foreign-currency source amount.
    pub original_amount: Option<Decimal>,
    /// Currency of `original_amount`.
    pub original_currency: Option<CurrencyCode>,
    /// VAT code, if any.
    pub vat_code: Option<String>,
    /// Posting date.
    pub posting_date: NaiveDate,
    /// Optional free text.
    pub description: Option<String>,
    /// Ordering within the originating command.
    pub row_number: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A voucher together with its postings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherWithPostings {
    /// The voucher.
    pub voucher: Voucher,
    /// Its postings in row order.
    pub postings: Vec<Posting>,
}

/// Account reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account number.
    pub account_number: String,
    /// Display name.
    pub account_name: String,
}

/// VAT code reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatCode {
    /// Code as referenced by postings.
    pub code: String,
    /// Rate in percent.
    pub rate: Decimal,
    /// Display text.
    pub description: Option<String>,
}

/// Input for a single posting in a voucher command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingCommand {
    /// Account to post to.
    pub account_number: String,
    /// Signed amount; zero amounts are dropped before persistence.
    pub amount: Decimal,
    /// ISO 4217 code; the configured default currency when absent.
    pub currency: Option<String>,
    /// Foreign-currency source amount.
    pub original_amount: Option<Decimal>,
    /// Currency of `original_amount`.
    pub original_currency: Option<String>,
    /// VAT code, if any.
    pub vat_code: Option<String>,
    /// Posting date.
    pub posting_date: NaiveDate,
    /// Optional free text.
    pub description: Option<String>,
    /// Ordering within the command.
    pub row_number: i32,
}

impl PostingCommand {
    /// Creates a command in the default currency with no VAT code.
    #[must_use]
    pub fn new(account_number: impl Into<String>, amount: Decimal, posting_date: NaiveDate) -> Self {
        Self {
            account_number: account_number.into(),
            amount,
            currency: None,
            original_amount: None,
            original_currency: None,
            vat_code: None,
            posting_date,
            description: None,
            row_number: 0,
        }
    }

    /// Sets the VAT code.
    #[must_use]
    pub fn with_vat_code(mut self, vat_code: impl Into<String>) -> Self {
        self.vat_code = Some(vat_code.into());
        self
    }

    /// Sets the currency.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Sets the row number.
    #[must_use]
    pub fn with_row_number(mut self, row_number: i32) -> Self {
        self.row_number = row_number;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Input for voucher creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateVoucherCommand {
    /// Voucher date; its year scopes the number.
    pub date: NaiveDate,
    /// Optional free text.
    pub description: Option<String>,
    /// Postings; may be empty for a scratch voucher.
    pub postings: Vec<PostingCommand>,
}

/// Input for a full voucher replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateVoucherCommand {
    /// Voucher to replace.
    pub id: VoucherId,
    /// New date.
    pub date: NaiveDate,
    /// New description.
    pub description: Option<String>,
    /// New posting set, replacing the old one entirely.
    pub postings: Vec<PostingCommand>,
}

/// A validated posting ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPosting {
    /// Account number.
    pub account_number: String,
    /// Non-zero amount with at most 2 decimals.
    pub amount: Decimal,
    /// Currency.
    pub currency: CurrencyCode,
    /// Foreign-currency source amount.
    pub original_amount: Option<Decimal>,
    /// Currency of `original_amount`.
    pub original_currency: Option<CurrencyCode>,
    /// VAT code.
    pub vat_code: Option<String>,
    /// Posting date.
    pub posting_date: NaiveDate,
    /// Optional free text.
    pub description: Option<String>,
    /// Ordering within the command.
    pub row_number: i32,
}

/// A voucher header ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVoucher {
    /// Allocated number.
    pub number: i32,
    /// Voucher date.
    pub date: NaiveDate,
    /// Optional free text.
    pub description: Option<String>,
}

/// Header returned by create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherHeader {
    /// Internal id.
    pub id: VoucherId,
    /// Display number, `"{number}-{year}"`.
    pub number: String,
    /// Voucher date.
    pub date: NaiveDate,
    /// Optional free text.
    pub description: Option<String>,
}

impl From<&Voucher> for VoucherHeader {
    fn from(voucher: &Voucher) -> Self {
        Self {
            id: voucher.id,
            number: voucher.display_number(),
            date: voucher.date,
            description: voucher.description.clone(),
        }
    }
}

/// A posting line in a voucher summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingSummary {
    /// Posting id.
    pub id: PostingId,
    /// Posting date.
    pub date: NaiveDate,
    /// Optional free text.
    pub description: Option<String>,
    /// Account number.
    pub account_number: String,
    /// Account name, `None` when the account is not in the directory.
    pub account_name: Option<String>,
    /// VAT code.
    pub vat_code: Option<String>,
    /// Signed amount.
    pub amount: Decimal,
}

/// A voucher with its postings resolved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherSummary {
    /// Internal id.
    pub id: VoucherId,
    /// Display number.
    pub number: String,
    /// Voucher date.
    pub date: NaiveDate,
    /// Optional free text.
    pub description: Option<String>,
    /// Posting lines.
    pub postings: Vec<PostingSummary>,
}

/// Free-text voucher search with optional inclusive date bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherSearch {
    /// Matches voucher description, posting description or account number.
    pub search: Option<String>,
    /// Earliest voucher date.
    pub date_from: Option<NaiveDate>,
    /// Latest voucher date.
    pub date_to: Option<NaiveDate>,
}

impl VoucherSearch {
    /// Returns the trimmed, lower-cased search term, or `None` if blank.
    #[must_use]
    pub fn normalized_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voucher(number: i32, date: NaiveDate) -> Voucher {
        Voucher {
            id: VoucherId::new(1),
            tenant_id: TenantId::new(1),
            number,
            date,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_number() {
        let v = voucher(7, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
        assert_eq!(v.year(), 2025);
        assert_eq!(v.display_number(), "7-2025");
        assert_eq!(VoucherHeader::from(&v).number, "7-2025");
    }

    #[test]
    fn test_search_term_normalization() {
        let search = VoucherSearch {
            search: Some("  Rent ".to_string()),
            ..Default::default()
        };
        assert_eq!(search.normalized_term().as_deref(), Some("rent"));

        let blank = VoucherSearch {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.normalized_term(), None);
    }
}
