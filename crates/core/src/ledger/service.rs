//! Voucher ledger service.
//!
//! Orchestrates voucher creation and full replacement: validates postings
//! against the tenant's reference data, allocates numbers and persists the
//! voucher together with its non-zero postings in one store call.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use folio_shared::config::LedgerConfig;
use folio_shared::types::{PageRequest, PageResponse, TenantId, VoucherId};
use tracing::{debug, info, warn};

use super::error::LedgerError;
use super::numbering::VoucherNumberAllocator;
use super::types::{
    CreateVoucherCommand, MAX_ACCOUNT_NUMBER_LEN, NewPosting, NewVoucher, PostingCommand,
    PostingSummary, UpdateVoucherCommand, Voucher, VoucherHeader, VoucherSearch, VoucherSummary,
    VoucherWithPostings,
};
use super::validation::PostingValidator;
use crate::store::{
    AccountDirectory, StoreError, StoreResult, VatCodeDirectory, VoucherChanges, VoucherStore,
};

/// Voucher lifecycle service.
pub struct VoucherLedgerService<S> {
    store: Arc<S>,
    config: LedgerConfig,
}

impl<S> VoucherLedgerService<S>
where
    S: AccountDirectory + VatCodeDirectory + VoucherStore,
{
    /// Creates a new service over `store`.
    pub fn new(store: Arc<S>, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    /// Create a voucher.
    ///
    /// Postings are validated when present; zero-amount postings are dropped.
    /// The number is the next free one in the tenant's year of `date`.
    ///
    /// # Errors
    ///
    /// Returns a validation error, `VoucherNumberExhausted`, or `Database`.
    pub async fn create_voucher(
        &self,
        tenant: TenantId,
        command: CreateVoucherCommand,
    ) -> Result<VoucherHeader, LedgerError> {
        let postings = self.resolve_postings(tenant, &command.postings).await?;
        let year = command.date.year();
        let posting_count = postings.len();

        let voucher = self
            .with_allocated_number(tenant, year, None, |number| {
                let store = Arc::clone(&self.store);
                let header = NewVoucher {
                    number,
                    date: command.date,
                    description: command.description.clone(),
                };
                let postings = postings.clone();
                async move { store.insert_voucher(tenant, header, postings).await }
            })
            .await?;

        info!(
            tenant_id = %tenant,
            voucher = %voucher.display_number(),
            postings = posting_count,
            "Voucher created"
        );
        Ok(VoucherHeader::from(&voucher))
    }

    /// Return the tenant's voucher without postings, creating one dated today
    /// if none exists.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if the store fails.
    pub async fn find_or_create_empty_voucher(
        &self,
        tenant: TenantId,
    ) -> Result<VoucherHeader, LedgerError> {
        self.find_or_create_empty_voucher_on(tenant, Utc::now().date_naive())
            .await
    }

    /// [`Self::find_or_create_empty_voucher`] with an explicit creation date.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if the store fails.
    pub async fn find_or_create_empty_voucher_on(
        &self,
        tenant: TenantId,
        today: NaiveDate,
    ) -> Result<VoucherHeader, LedgerError> {
        if let Some(voucher) = self.store.find_empty_voucher(tenant).await? {
            debug!(tenant_id = %tenant, voucher = %voucher.display_number(), "Reusing empty voucher");
            return Ok(VoucherHeader::from(&voucher));
        }

        self.create_voucher(
            tenant,
            CreateVoucherCommand {
                date: today,
                description: None,
                postings: Vec::new(),
            },
        )
        .await
    }

    /// Replace a voucher's date, description and entire posting set.
    ///
    /// Moving the voucher into another year re-numbers it in that year.
    ///
    /// # Errors
    ///
    /// Returns `VoucherNotFound` if the voucher is absent or belongs to
    /// another tenant, otherwise as [`Self::create_voucher`].
    pub async fn update_voucher_with_postings(
        &self,
        tenant: TenantId,
        command: UpdateVoucherCommand,
    ) -> Result<VoucherHeader, LedgerError> {
        let existing = self
            .store
            .find_voucher(tenant, command.id)
            .await?
            .ok_or(LedgerError::VoucherNotFound(command.id))?;

        let postings = self.resolve_postings(tenant, &command.postings).await?;
        let target_year = command.date.year();
        let replaced = existing.postings.len();

        let voucher = if target_year == existing.voucher.year() {
            let changes = VoucherChanges {
                date: command.date,
                description: command.description.clone(),
                number: None,
            };
            self.store
                .replace_voucher(tenant, command.id, changes, postings)
                .await
                .map_err(|e| not_found_as_voucher(e, command.id))?
        } else {
            self.with_allocated_number(tenant, target_year, Some(command.id), |number| {
                let store = Arc::clone(&self.store);
                let changes = VoucherChanges {
                    date: command.date,
                    description: command.description.clone(),
                    number: Some(number),
                };
                let postings = postings.clone();
                let id = command.id;
                async move { store.replace_voucher(tenant, id, changes, postings).await }
            })
            .await?
        };

        info!(
            tenant_id = %tenant,
            voucher = %voucher.display_number(),
            replaced_postings = replaced,
            "Voucher updated"
        );
        Ok(VoucherHeader::from(&voucher))
    }

    /// Load a voucher with its postings.
    ///
    /// # Errors
    ///
    /// Returns `VoucherNotFound` if absent or owned by another tenant.
    pub async fn find_voucher(
        &self,
        tenant: TenantId,
        id: VoucherId,
    ) -> Result<VoucherWithPostings, LedgerError> {
        self.store
            .find_voucher(tenant, id)
            .await?
            .ok_or(LedgerError::VoucherNotFound(id))
    }

    /// Summaries of vouchers with at least one posting dated in `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `start > end`, or `Database`.
    pub async fn find_voucher_summaries_by_date_range(
        &self,
        tenant: TenantId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<VoucherSummary>, LedgerError> {
        if start > end {
            return Err(LedgerError::InvalidDateRange { start, end });
        }
        let vouchers = self
            .store
            .vouchers_with_postings_in_range(tenant, start, end)
            .await?;
        let names = self.account_names(tenant).await?;
        Ok(vouchers
            .iter()
            .filter(|v| !v.postings.is_empty())
            .map(|v| summarize(v, &names))
            .collect())
    }

    /// Paged free-text voucher search.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if both bounds are set and reversed, or `Database`.
    pub async fn search_vouchers(
        &self,
        tenant: TenantId,
        search: &VoucherSearch,
        page: PageRequest,
    ) -> Result<PageResponse<VoucherSummary>, LedgerError> {
        if let (Some(start), Some(end)) = (search.date_from, search.date_to)
            && start > end
        {
            return Err(LedgerError::InvalidDateRange { start, end });
        }
        let (vouchers, total) = self.store.search_vouchers(tenant, search, page).await?;
        let names = self.account_names(tenant).await?;
        let data = vouchers.iter().map(|v| summarize(v, &names)).collect();
        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    async fn resolve_postings(
        &self,
        tenant: TenantId,
        postings: &[PostingCommand],
    ) -> Result<Vec<NewPosting>, LedgerError> {
        if postings.is_empty() {
            return Ok(Vec::new());
        }

        let mut known_accounts = HashSet::new();
        let mut known_vat_codes = HashSet::new();
        for posting in postings {
            let account = posting.account_number.as_str();
            if account.len() <= MAX_ACCOUNT_NUMBER_LEN
                && !known_accounts.contains(account)
                && self
                    .store
                    .find_account_by_number(tenant, account)
                    .await?
                    .is_some()
            {
                known_accounts.insert(account.to_string());
            }
            if let Some(code) = posting.vat_code.as_deref()
                && !known_vat_codes.contains(code)
                && self.store.vat_code_exists(tenant, code).await?
            {
                known_vat_codes.insert(code.to_string());
            }
        }

        PostingValidator::validate_and_resolve(
            postings,
            &self.config.default_currency,
            |account| known_accounts.contains(account),
            |code| known_vat_codes.contains(code),
        )
        .inspect_err(|e| debug!(tenant_id = %tenant, error = %e, "Posting validation failed"))
    }

    /// Runs `write` with freshly allocated numbers until it stops conflicting.
    /// `target` names the voucher being rewritten, if any.
    async fn with_allocated_number<F, Fut>(
        &self,
        tenant: TenantId,
        year: i32,
        target: Option<VoucherId>,
        mut write: F,
    ) -> Result<Voucher, LedgerError>
    where
        F: FnMut(i32) -> Fut,
        Fut: Future<Output = StoreResult<Voucher>>,
    {
        let attempts = self.config.voucher_number_retries.saturating_add(1);
        for attempt in 1..=attempts {
            let number = VoucherNumberAllocator::next_number(self.store.as_ref(), tenant, year).await?;
            match write(number).await {
                Ok(voucher) => return Ok(voucher),
                Err(StoreError::Conflict(detail)) => {
                    warn!(
                        tenant_id = %tenant,
                        year,
                        number,
                        attempt,
                        detail = %detail,
                        "Voucher number taken, allocating again"
                    );
                }
                Err(e) => {
                    return Err(match target {
                        Some(id) => not_found_as_voucher(e, id),
                        None => e.into(),
                    });
                }
            }
        }
        Err(LedgerError::VoucherNumberExhausted { year, attempts })
    }

    async fn account_names(&self, tenant: TenantId) -> Result<HashMap<String, String>, LedgerError> {
        Ok(self
            .store
            .list_accounts(tenant)
            .await?
            .into_iter()
            .map(|a| (a.account_number, a.account_name))
            .collect())
    }
}

fn not_found_as_voucher(err: StoreError, id: VoucherId) -> LedgerError {
    match err {
        StoreError::NotFound(_) => LedgerError::VoucherNotFound(id),
        other => other.into(),
    }
}

fn summarize(voucher: &VoucherWithPostings, names: &HashMap<String, String>) -> VoucherSummary {
    VoucherSummary {
        id: voucher.voucher.id,
        number: voucher.voucher.display_number(),
        date: voucher.voucher.date,
        description: voucher.voucher.description.clone(),
        postings: voucher
            .postings
            .iter()
            .map(|p| PostingSummary {
                id: p.id,
                date: p.posting_date,
                description: p.description.clone(),
                account_number: p.account_number.clone(),
                account_name: names.get(&p.account_number).cloned(),
                vat_code: p.vat_code.clone(),
                amount: p.amount,
            })
            .collect(),
    }
}
