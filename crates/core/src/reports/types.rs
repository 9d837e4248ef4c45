//! Report data types.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Days, Months, NaiveDate};
use folio_shared::types::{PostingId, VoucherId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::{AccountType, LedgerError};

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day in the range.
    pub start: NaiveDate,
    /// Last day in the range.
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting `start > end`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if the bounds are reversed.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, LedgerError> {
        let range = Self { start, end };
        range.ensure_ordered()?;
        Ok(range)
    }

    /// The calendar month containing `date`.
    #[must_use]
    pub fn month_of(date: NaiveDate) -> Self {
        let start = first_of_month(date);
        Self {
            start,
            end: last_of_month(start),
        }
    }

    /// The month containing `today`.
    #[must_use]
    pub fn current_month(today: NaiveDate) -> Self {
        Self::month_of(today)
    }

    /// The whole month before the one containing `today`.
    #[must_use]
    pub fn previous_month(today: NaiveDate) -> Self {
        Self::month_of(months_back(first_of_month(today), 1))
    }

    /// January 1st through December 31st of `today`'s year.
    #[must_use]
    pub fn current_year(today: NaiveDate) -> Self {
        let year = today.year();
        Self {
            start: NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(today),
            end: NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(today),
        }
    }

    /// First day of the previous month through `today`.
    #[must_use]
    pub fn last_month(today: NaiveDate) -> Self {
        Self {
            start: Self::previous_month(today).start,
            end: today,
        }
    }

    /// Resolves a reporting period relative to `today`.
    #[must_use]
    pub fn for_period(period: Period, today: NaiveDate) -> Self {
        match period {
            Period::CurrentMonth => Self::current_month(today),
            Period::PreviousMonth => Self::previous_month(today),
            Period::CurrentYear => Self::current_year(today),
        }
    }

    /// Returns true if `date` lies within the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Fails with `InvalidDateRange` if `start > end`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if the bounds are reversed.
    pub fn ensure_ordered(&self) -> Result<(), LedgerError> {
        if self.start > self.end {
            return Err(LedgerError::InvalidDateRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

/// First day of `date`'s month.
#[must_use]
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// Last day of `date`'s month.
#[must_use]
pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    first_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// `date` moved back by `months`, clamped to the calendar minimum.
#[must_use]
pub fn months_back(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

/// Named reporting period for the financial summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    /// The current calendar month.
    #[default]
    CurrentMonth,
    /// The previous calendar month.
    PreviousMonth,
    /// The current calendar year.
    CurrentYear,
}

impl Period {
    /// Returns the string representation of the period.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CurrentMonth => "current_month",
            Self::PreviousMonth => "previous_month",
            Self::CurrentYear => "current_year",
        }
    }

    /// Parses a period; anything unrecognised means the current month.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "previous_month" => Self::PreviousMonth,
            "current_year" => Self::CurrentYear,
            _ => Self::CurrentMonth,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dashboard financial summary for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialSummary {
    /// Sum of revenue postings.
    pub revenue: Decimal,
    /// Sum of expense postings.
    pub expenses: Decimal,
    /// Revenue minus expenses.
    pub net_income: Decimal,
    /// Sum of asset postings.
    pub assets: Decimal,
    /// Sum of liability postings.
    pub liabilities: Decimal,
    /// Assets minus liabilities.
    pub equity: Decimal,
    /// The period summarised.
    pub period: Period,
    /// Period start.
    pub start_date: NaiveDate,
    /// Period end.
    pub end_date: NaiveDate,
}

/// Revenue and expense totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    /// Upper-case English month name, e.g. `MARCH`.
    pub month: String,
    /// Calendar year.
    pub year: i32,
    /// Sum of revenue postings.
    pub revenue: Decimal,
    /// Sum of expense postings.
    pub expenses: Decimal,
    /// Revenue minus expenses.
    pub net_income: Decimal,
}

/// Summed amount for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    /// Account number.
    pub account_number: String,
    /// Account name from the chart.
    pub account_name: String,
    /// Summed amount.
    pub amount: Decimal,
}

/// One account line of the general ledger summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralLedgerRow {
    /// Account number.
    pub account_number: String,
    /// Account name, if the account is in the chart.
    pub account_name: Option<String>,
    /// Sum of postings before the range.
    pub opening_balance: Decimal,
    /// Sum of postings within the range.
    pub period_movement: Decimal,
    /// Opening balance plus movement.
    pub closing_balance: Decimal,
    /// Number of postings within the range.
    pub transaction_count: u64,
}

/// A posting in an account ledger, with the balance after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLedgerLine {
    /// Posting ID.
    pub posting_id: PostingId,
    /// Owning voucher.
    pub voucher_id: Option<VoucherId>,
    /// Posting date.
    pub date: NaiveDate,
    /// Posting description.
    pub description: Option<String>,
    /// VAT code.
    pub vat_code: Option<String>,
    /// Posting amount.
    pub amount: Decimal,
    /// Balance including this posting.
    pub running_balance: Decimal,
}

/// Posting history of one account over a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLedger {
    /// Account number.
    pub account_number: String,
    /// Account name, if the account is in the chart.
    pub account_name: Option<String>,
    /// Range covered.
    pub range: DateRange,
    /// Balance before the range.
    pub opening_balance: Decimal,
    /// Postings within the range, ordered by date then id.
    pub lines: Vec<AccountLedgerLine>,
    /// Balance at the end of the range.
    pub closing_balance: Decimal,
}

/// Summed amount of one account, tagged with its type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedAmount {
    /// Account type.
    pub account_type: AccountType,
    /// Account number.
    pub account_number: String,
    /// Account name, if the account is in the chart.
    pub account_name: Option<String>,
    /// Summed amount within the range.
    pub amount: Decimal,
}

/// Profit and loss or balance sheet listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedListing {
    /// Range covered.
    pub range: DateRange,
    /// Accounts ordered by type then account number.
    pub accounts: Vec<ClassifiedAmount>,
    /// Totals per type; every type the listing covers is present.
    pub totals: BTreeMap<AccountType, Decimal>,
}

impl ClassifiedListing {
    /// Total for one type, zero if the listing does not cover it.
    #[must_use]
    pub fn total(&self, account_type: AccountType) -> Decimal {
        self.totals
            .get(&account_type)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}
