//! Sequential voucher numbering per (tenant, year).
//!
//! Allocation reads the current maximum and adds one. Under concurrent
//! creation two writers can read the same maximum; the store's unique
//! constraint on (tenant, year, number) rejects the loser with
//! [`StoreError::Conflict`](crate::store::StoreError::Conflict), and the
//! voucher service allocates again.

use folio_shared::types::TenantId;

use super::error::LedgerError;
use crate::store::VoucherStore;

/// First number of every (tenant, year).
pub const FIRST_VOUCHER_NUMBER: i32 = 1;

/// Voucher number allocator.
pub struct VoucherNumberAllocator;

impl VoucherNumberAllocator {
    /// The number following `max_existing`, or 1 if the year is empty.
    ///
    /// # Errors
    ///
    /// Returns `VoucherNumberExhausted` if the year's numbers are used up.
    pub fn after(max_existing: Option<i32>, year: i32) -> Result<i32, LedgerError> {
        match max_existing {
            None => Ok(FIRST_VOUCHER_NUMBER),
            Some(max) => max
                .checked_add(1)
                .ok_or(LedgerError::VoucherNumberExhausted { year, attempts: 1 }),
        }
    }

    /// Computes the next number for (tenant, year) from the store.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if the store fails or numbers are exhausted.
    pub async fn next_number<S>(store: &S, tenant: TenantId, year: i32) -> Result<i32, LedgerError>
    where
        S: VoucherStore + ?Sized,
    {
        let max = store.max_voucher_number(tenant, year).await?;
        Self::after(max, year)
    }
}
