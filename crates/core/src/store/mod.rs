//! Persistence ports consumed by the core services.
//!
//! Every method takes the tenant explicitly; adapters must scope every query
//! and every uniqueness constraint to it. Methods that write more than one
//! row are atomic: either all of their writes commit or none do.
//!
//! Two adapters exist: [`InMemoryStore`] here and `SeaStore` in `folio-db`.

pub mod error;
pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use folio_shared::types::{
    ActivityId, PageRequest, ProjectId, TenantId, TimesheetEntryId, UserId, VoucherId,
};

use crate::ledger::types::{
    Account, NewPosting, NewVoucher, Posting, Voucher, VoucherSearch, VoucherWithPostings,
};
use crate::timesheet::types::{
    Activity, Project, StatusTransition, TimesheetChangeset, TimesheetEntry, TimesheetFilter,
};

pub use error::StoreError;
pub use memory::InMemoryStore;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Header changes applied by [`VoucherStore::replace_voucher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherChanges {
    /// New date.
    pub date: NaiveDate,
    /// New description.
    pub description: Option<String>,
    /// New number, when the voucher moves to another year.
    pub number: Option<i32>,
}

/// Posting query filter. Dates are inclusive; `None` means unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingFilter {
    /// Restrict to one account.
    pub account_number: Option<String>,
    /// Earliest posting date.
    pub date_from: Option<NaiveDate>,
    /// Latest posting date.
    pub date_to: Option<NaiveDate>,
    /// Exclusive upper bound on the posting date.
    pub date_before: Option<NaiveDate>,
}

impl PostingFilter {
    /// All postings of the tenant.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Postings of one account.
    #[must_use]
    pub fn account(account_number: impl Into<String>) -> Self {
        Self {
            account_number: Some(account_number.into()),
            ..Self::default()
        }
    }

    /// Bounds the posting date to an inclusive range.
    #[must_use]
    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.date_from = Some(from);
        self.date_to = Some(to);
        self
    }

    /// Keeps postings dated strictly before `cutoff`.
    #[must_use]
    pub fn before(mut self, cutoff: NaiveDate) -> Self {
        self.date_before = Some(cutoff);
        self
    }

    /// Returns true if a posting passes the filter.
    #[must_use]
    pub fn matches(&self, posting: &Posting) -> bool {
        self.account_number
            .as_deref()
            .is_none_or(|a| a == posting.account_number)
            && self.date_from.is_none_or(|d| posting.posting_date >= d)
            && self.date_to.is_none_or(|d| posting.posting_date <= d)
            && self.date_before.is_none_or(|d| posting.posting_date < d)
    }
}

/// Chart of accounts lookup.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Finds an account by number.
    async fn find_account_by_number(
        &self,
        tenant: TenantId,
        account_number: &str,
    ) -> StoreResult<Option<Account>>;

    /// Lists all accounts ordered by number.
    async fn list_accounts(&self, tenant: TenantId) -> StoreResult<Vec<Account>>;
}

/// VAT code lookup.
#[async_trait]
pub trait VatCodeDirectory: Send + Sync {
    /// Returns true if the code exists for the tenant.
    async fn vat_code_exists(&self, tenant: TenantId, code: &str) -> StoreResult<bool>;
}

/// Voucher persistence.
#[async_trait]
pub trait VoucherStore: Send + Sync {
    /// Highest voucher number used in (tenant, year).
    async fn max_voucher_number(&self, tenant: TenantId, year: i32) -> StoreResult<Option<i32>>;

    /// Inserts a voucher and its postings atomically.
    ///
    /// Returns [`StoreError::Conflict`] if (tenant, year, number) is taken.
    async fn insert_voucher(
        &self,
        tenant: TenantId,
        voucher: NewVoucher,
        postings: Vec<NewPosting>,
    ) -> StoreResult<Voucher>;

    /// Loads a voucher with its postings.
    async fn find_voucher(
        &self,
        tenant: TenantId,
        id: VoucherId,
    ) -> StoreResult<Option<VoucherWithPostings>>;

    /// Finds a voucher of the tenant with no postings, lowest id first.
    async fn find_empty_voucher(&self, tenant: TenantId) -> StoreResult<Option<Voucher>>;

    /// Deletes all postings of a voucher, inserts `postings` and applies
    /// `changes`, atomically.
    ///
    /// Returns [`StoreError::Conflict`] if a new number is taken.
    async fn replace_voucher(
        &self,
        tenant: TenantId,
        id: VoucherId,
        changes: VoucherChanges,
        postings: Vec<NewPosting>,
    ) -> StoreResult<Voucher>;

    /// Vouchers having at least one posting dated within `[from, to]`, each
    /// with all of its postings, ordered by date then number.
    async fn vouchers_with_postings_in_range(
        &self,
        tenant: TenantId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<VoucherWithPostings>>;

    /// Paged voucher search ordered by date desc, number desc.
    /// Returns the page and the total match count.
    async fn search_vouchers(
        &self,
        tenant: TenantId,
        search: &VoucherSearch,
        page: PageRequest,
    ) -> StoreResult<(Vec<VoucherWithPostings>, u64)>;
}

/// Read access to postings for reporting.
#[async_trait]
pub trait PostingStore: Send + Sync {
    /// Postings matching `filter`, ordered by (posting date, id).
    async fn find_postings(
        &self,
        tenant: TenantId,
        filter: &PostingFilter,
    ) -> StoreResult<Vec<Posting>>;
}

/// Timesheet entry persistence.
#[async_trait]
pub trait TimesheetStore: Send + Sync {
    /// Entries of one user within `[from, to]`, ordered by date.
    async fn entries_for_user(
        &self,
        tenant: TenantId,
        user: UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<TimesheetEntry>>;

    /// Entries with the given ids, tenant-scoped; unknown ids are skipped.
    async fn entries_by_ids(
        &self,
        tenant: TenantId,
        ids: &[TimesheetEntryId],
    ) -> StoreResult<Vec<TimesheetEntry>>;

    /// Entries matching `filter`, ordered by date desc then user id.
    async fn find_entries(
        &self,
        tenant: TenantId,
        filter: &TimesheetFilter,
    ) -> StoreResult<Vec<TimesheetEntry>>;

    /// Applies inserts, updates and deletes atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Locked`] if an update or delete targets an
    /// approved entry, checked under the same write as the change.
    async fn apply_changes(
        &self,
        tenant: TenantId,
        changes: TimesheetChangeset,
    ) -> StoreResult<()>;

    /// Moves entries whose current status is in `transition.from` to
    /// `transition.to`. Returns the number of entries changed.
    async fn transition_status(
        &self,
        tenant: TenantId,
        transition: StatusTransition,
    ) -> StoreResult<u64>;

    /// Deletes entries, tenant-scoped. Returns the number deleted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Locked`] and deletes nothing if any entry is
    /// approved.
    async fn delete_entries(&self, tenant: TenantId, ids: &[TimesheetEntryId])
    -> StoreResult<u64>;

    /// Users with at least one entry, ordered by id.
    async fn distinct_users(&self, tenant: TenantId) -> StoreResult<Vec<UserId>>;
}

/// Project and activity reference data.
#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    /// Active projects ordered by name.
    async fn active_projects(&self, tenant: TenantId) -> StoreResult<Vec<Project>>;

    /// Active activities that are global or belong to `project`, ordered by name.
    async fn active_activities(
        &self,
        tenant: TenantId,
        project: Option<ProjectId>,
    ) -> StoreResult<Vec<Activity>>;

    /// Finds a project by id.
    async fn find_project(&self, tenant: TenantId, id: ProjectId) -> StoreResult<Option<Project>>;

    /// Finds an activity by id.
    async fn find_activity(
        &self,
        tenant: TenantId,
        id: ActivityId,
    ) -> StoreResult<Option<Activity>>;
}
