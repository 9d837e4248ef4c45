//! Double-entry validation for voucher postings.

use folio_shared::types::{AMOUNT_SCALE, CurrencyCode, exceeds_scale};
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{MAX_ACCOUNT_NUMBER_LEN, NewPosting, PostingCommand};

/// Minimum number of postings with a non-zero amount.
pub const MIN_NON_ZERO_POSTINGS: usize = 2;

/// Posting validator.
///
/// Contains no I/O: reference-data checks go through the lookups passed in,
/// which the voucher service backs with the tenant's account and VAT tables.
pub struct PostingValidator;

impl PostingValidator {
    /// Validate a candidate posting set.
    ///
    /// Rules, in order:
    /// 1. At least two postings carry a non-zero amount
    /// 2. Every posting (zero or not) references an existing account
    /// 3. Every VAT code present exists
    /// 4. The amounts sum to exactly zero
    ///
    /// Amounts are counted and summed exactly as given.
    ///
    /// # Errors
    ///
    /// Returns the first rule violation as a `LedgerError`.
    pub fn validate<A, V>(
        postings: &[PostingCommand],
        account_exists: A,
        vat_code_exists: V,
    ) -> Result<(), LedgerError>
    where
        A: Fn(&str) -> bool,
        V: Fn(&str) -> bool,
    {
        // 1. Minimum non-zero legs
        let non_zero = postings.iter().filter(|p| !p.amount.is_zero()).count();
        if non_zero < MIN_NON_ZERO_POSTINGS {
            return Err(LedgerError::InsufficientPostings);
        }

        // 2-3. Reference data
        for posting in postings {
            if posting.account_number.len() > MAX_ACCOUNT_NUMBER_LEN
                || !account_exists(&posting.account_number)
            {
                return Err(LedgerError::AccountNotFound(posting.account_number.clone()));
            }
            if let Some(code) = posting.vat_code.as_deref()
                && !vat_code_exists(code)
            {
                return Err(LedgerError::InvalidVatCode(code.to_string()));
            }
        }

        // 4. Balance law
        let total: Decimal = postings.iter().map(|p| p.amount).sum();
        if !total.is_zero() {
            return Err(LedgerError::PostingsNotBalanced(total));
        }

        Ok(())
    }

    /// Validate and resolve postings into persistable form.
    ///
    /// Runs [`Self::validate`], then checks that amounts fit the stored
    /// precision, parses currencies (falling back to `default_currency`) and
    /// drops zero-amount postings.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if validation fails, an amount has more than
    /// two decimals, or a currency is malformed.
    pub fn validate_and_resolve<A, V>(
        postings: &[PostingCommand],
        default_currency: &CurrencyCode,
        account_exists: A,
        vat_code_exists: V,
    ) -> Result<Vec<NewPosting>, LedgerError>
    where
        A: Fn(&str) -> bool,
        V: Fn(&str) -> bool,
    {
        Self::validate(postings, account_exists, vat_code_exists)?;

        let mut resolved = Vec::with_capacity(postings.len());
        for posting in postings {
            let currency = match posting.currency.as_deref() {
                Some(code) => parse_currency(code)?,
                None => default_currency.clone(),
            };
            let original_currency = posting
                .original_currency
                .as_deref()
                .map(parse_currency)
                .transpose()?;

            for amount in std::iter::once(posting.amount).chain(posting.original_amount) {
                if exceeds_scale(amount, AMOUNT_SCALE) {
                    return Err(LedgerError::InvalidAmountPrecision(amount));
                }
            }
            if posting.amount.is_zero() {
                continue;
            }

            resolved.push(NewPosting {
                account_number: posting.account_number.clone(),
                amount: posting.amount,
                currency,
                original_amount: posting.original_amount,
                original_currency,
                vat_code: posting.vat_code.clone(),
                posting_date: posting.posting_date,
                description: posting.description.clone(),
                row_number: posting.row_number,
            });
        }

        Ok(resolved)
    }
}

fn parse_currency(code: &str) -> Result<CurrencyCode, LedgerError> {
    code.parse()
        .map_err(|_| LedgerError::InvalidCurrency(code.to_string()))
}
