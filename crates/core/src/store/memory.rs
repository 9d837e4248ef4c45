//! In-memory store adapter.
//!
//! Holds every table behind one `tokio::sync::RwLock`, so each write method
//! is trivially atomic. Enforces the same uniqueness rules as the SQL schema:
//! (tenant, year, number) for vouchers and (tenant, user, project, activity,
//! date) for timesheet entries.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use folio_shared::types::{
    ActivityId, PageRequest, PostingId, ProjectId, TenantId, TimesheetEntryId, UserId, VoucherId,
};
use tokio::sync::RwLock;

use super::{
    AccountDirectory, PostingFilter, PostingStore, ProjectDirectory, StoreError, StoreResult,
    TimesheetStore, VatCodeDirectory, VoucherChanges, VoucherStore,
};
use crate::ledger::types::{
    Account, NewPosting, NewVoucher, Posting, VatCode, Voucher, VoucherSearch, VoucherWithPostings,
};
use crate::timesheet::types::{
    Activity, NewTimesheetEntry, Project, StatusTransition, TimesheetChangeset, TimesheetEntry,
    TimesheetFilter, TimesheetStatus,
};

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    accounts: BTreeMap<(TenantId, String), Account>,
    vat_codes: BTreeMap<(TenantId, String), VatCode>,
    vouchers: BTreeMap<VoucherId, Voucher>,
    postings: BTreeMap<PostingId, Posting>,
    projects: BTreeMap<ProjectId, Project>,
    activities: BTreeMap<ActivityId, Activity>,
    entries: BTreeMap<TimesheetEntryId, TimesheetEntry>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn number_taken(&self, tenant: TenantId, year: i32, number: i32, except: Option<VoucherId>) -> bool {
        self.vouchers.values().any(|v| {
            v.tenant_id == tenant && v.year() == year && v.number == number && Some(v.id) != except
        })
    }

    fn postings_of(&self, voucher: VoucherId) -> Vec<Posting> {
        let mut postings: Vec<Posting> = self
            .postings
            .values()
            .filter(|p| p.voucher_id == Some(voucher))
            .cloned()
            .collect();
        postings.sort_by_key(|p| (p.row_number, p.id));
        postings
    }

    fn with_postings(&self, voucher: &Voucher) -> VoucherWithPostings {
        VoucherWithPostings {
            voucher: voucher.clone(),
            postings: self.postings_of(voucher.id),
        }
    }

    fn insert_postings(&mut self, tenant: TenantId, voucher: VoucherId, postings: Vec<NewPosting>) {
        let now = Utc::now();
        for p in postings {
            let id = PostingId::new(self.next_id());
            self.postings.insert(
                id,
                Posting {
                    id,
                    tenant_id: tenant,
                    voucher_id: Some(voucher),
                    account_number: p.account_number,
                    amount: p.amount,
                    currency: p.currency,
                    original_amount: p.original_amount,
                    original_currency: p.original_currency,
                    vat_code: p.vat_code,
                    posting_date: p.posting_date,
                    description: p.description,
                    row_number: p.row_number,
                    created_at: now,
                },
            );
        }
    }

    fn voucher_matches(&self, voucher: &Voucher, search: &VoucherSearch, term: Option<&str>) -> bool {
        if search.date_from.is_some_and(|d| voucher.date < d)
            || search.date_to.is_some_and(|d| voucher.date > d)
        {
            return false;
        }
        let Some(term) = term else {
            return true;
        };
        let contains = |s: Option<&str>| s.is_some_and(|s| s.to_lowercase().contains(term));
        contains(voucher.description.as_deref())
            || self.postings.values().any(|p| {
                p.voucher_id == Some(voucher.id)
                    && (contains(p.description.as_deref())
                        || p.account_number.to_lowercase().contains(term))
            })
    }

    fn entry_key_taken(&self, tenant: TenantId, entry: &NewTimesheetEntry) -> bool {
        self.entries.values().any(|e| {
            e.tenant_id == tenant
                && e.user_id == entry.user_id
                && e.project_id == Some(entry.project_id)
                && e.activity_id == Some(entry.activity_id)
                && e.entry_date == entry.entry_date
        })
    }

    fn ensure_not_approved(
        &self,
        tenant: TenantId,
        mut ids: impl Iterator<Item = TimesheetEntryId>,
    ) -> StoreResult<()> {
        match ids.find(|id| {
            self.entries
                .get(id)
                .is_some_and(|e| e.tenant_id == tenant && e.status == TimesheetStatus::Approved)
        }) {
            Some(id) => Err(StoreError::Locked(format!("timesheet entry {id} is approved"))),
            None => Ok(()),
        }
    }

    fn entry_matches(&self, entry: &TimesheetEntry, filter: &TimesheetFilter) -> bool {
        if entry.entry_date < filter.date_from
            || entry.entry_date > filter.date_to
            || filter.user_id.is_some_and(|u| entry.user_id != u)
            || filter.project_id.is_some_and(|p| entry.project_id != Some(p))
            || filter.status.is_some_and(|s| entry.status != s)
        {
            return false;
        }
        let Some(term) = filter.search.as_deref() else {
            return true;
        };
        let contains = |s: Option<&str>| s.is_some_and(|s| s.to_lowercase().contains(term));
        contains(entry.notes.as_deref())
            || contains(entry.description.as_deref())
            || contains(
                entry
                    .project_id
                    .and_then(|id| self.projects.get(&id))
                    .map(|p| p.name.as_str()),
            )
            || contains(
                entry
                    .activity_id
                    .and_then(|id| self.activities.get(&id))
                    .map(|a| a.name.as_str()),
            )
    }
}

/// Thread-safe in-memory implementation of every store port.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account to the tenant's chart.
    pub async fn add_account(&self, tenant: TenantId, number: &str, name: &str) {
        self.tables.write().await.accounts.insert(
            (tenant, number.to_string()),
            Account {
                account_number: number.to_string(),
                account_name: name.to_string(),
            },
        );
    }

    /// Adds a VAT code for the tenant.
    pub async fn add_vat_code(&self, tenant: TenantId, vat_code: VatCode) {
        self.tables
            .write()
            .await
            .vat_codes
            .insert((tenant, vat_code.code.clone()), vat_code);
    }

    /// Adds an active project.
    pub async fn add_project(&self, tenant: TenantId, name: &str) -> Project {
        let mut tables = self.tables.write().await;
        let project = Project {
            id: ProjectId::new(tables.next_id()),
            tenant_id: tenant,
            name: name.to_string(),
            description: None,
            color: None,
            is_active: true,
        };
        tables.projects.insert(project.id, project.clone());
        project
    }

    /// Adds an active activity, global when `project` is `None`.
    pub async fn add_activity(
        &self,
        tenant: TenantId,
        project: Option<ProjectId>,
        name: &str,
    ) -> Activity {
        let mut tables = self.tables.write().await;
        let activity = Activity {
            id: ActivityId::new(tables.next_id()),
            tenant_id: tenant,
            project_id: project,
            name: name.to_string(),
            description: None,
            is_billable: true,
            hourly_rate: None,
            is_active: true,
        };
        tables.activities.insert(activity.id, activity.clone());
        activity
    }

    /// Number of stored postings across all tenants.
    pub async fn posting_count(&self) -> usize {
        self.tables.read().await.postings.len()
    }
}

#[async_trait]
impl AccountDirectory for InMemoryStore {
    async fn find_account_by_number(
        &self,
        tenant: TenantId,
        account_number: &str,
    ) -> StoreResult<Option<Account>> {
        Ok(self
            .tables
            .read()
            .await
            .accounts
            .get(&(tenant, account_number.to_string()))
            .cloned())
    }

    async fn list_accounts(&self, tenant: TenantId) -> StoreResult<Vec<Account>> {
        Ok(self
            .tables
            .read()
            .await
            .accounts
            .iter()
            .filter(|((t, _), _)| *t == tenant)
            .map(|(_, a)| a.clone())
            .collect())
    }
}

#[async_trait]
impl VatCodeDirectory for InMemoryStore {
    async fn vat_code_exists(&self, tenant: TenantId, code: &str) -> StoreResult<bool> {
        Ok(self
            .tables
            .read()
            .await
            .vat_codes
            .contains_key(&(tenant, code.to_string())))
    }
}

#[async_trait]
impl VoucherStore for InMemoryStore {
    async fn max_voucher_number(&self, tenant: TenantId, year: i32) -> StoreResult<Option<i32>> {
        Ok(self
            .tables
            .read()
            .await
            .vouchers
            .values()
            .filter(|v| v.tenant_id == tenant && v.year() == year)
            .map(|v| v.number)
            .max())
    }

    async fn insert_voucher(
        &self,
        tenant: TenantId,
        voucher: NewVoucher,
        postings: Vec<NewPosting>,
    ) -> StoreResult<Voucher> {
        let mut tables = self.tables.write().await;
        if tables.number_taken(tenant, voucher.date.year(), voucher.number, None) {
            return Err(StoreError::Conflict(format!(
                "voucher number {}-{} already exists",
                voucher.number,
                voucher.date.year()
            )));
        }

        let now = Utc::now();
        let created = Voucher {
            id: VoucherId::new(tables.next_id()),
            tenant_id: tenant,
            number: voucher.number,
            date: voucher.date,
            description: voucher.description,
            created_at: now,
            updated_at: now,
        };
        tables.vouchers.insert(created.id, created.clone());
        tables.insert_postings(tenant, created.id, postings);
        Ok(created)
    }

    async fn find_voucher(
        &self,
        tenant: TenantId,
        id: VoucherId,
    ) -> StoreResult<Option<VoucherWithPostings>> {
        let tables = self.tables.read().await;
        Ok(tables
            .vouchers
            .get(&id)
            .filter(|v| v.tenant_id == tenant)
            .map(|v| tables.with_postings(v)))
    }

    async fn find_empty_voucher(&self, tenant: TenantId) -> StoreResult<Option<Voucher>> {
        let tables = self.tables.read().await;
        Ok(tables
            .vouchers
            .values()
            .find(|v| {
                v.tenant_id == tenant && !tables.postings.values().any(|p| p.voucher_id == Some(v.id))
            })
            .cloned())
    }

    async fn replace_voucher(
        &self,
        tenant: TenantId,
        id: VoucherId,
        changes: VoucherChanges,
        postings: Vec<NewPosting>,
    ) -> StoreResult<Voucher> {
        let mut tables = self.tables.write().await;
        let current = tables
            .vouchers
            .get(&id)
            .filter(|v| v.tenant_id == tenant)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("voucher {id}")))?;

        let number = changes.number.unwrap_or(current.number);
        if tables.number_taken(tenant, changes.date.year(), number, Some(id)) {
            return Err(StoreError::Conflict(format!(
                "voucher number {number}-{} already exists",
                changes.date.year()
            )));
        }

        tables.postings.retain(|_, p| p.voucher_id != Some(id));
        tables.insert_postings(tenant, id, postings);

        let updated = Voucher {
            number,
            date: changes.date,
            description: changes.description,
            updated_at: Utc::now(),
            ..current
        };
        tables.vouchers.insert(id, updated.clone());
        Ok(updated)
    }

    async fn vouchers_with_postings_in_range(
        &self,
        tenant: TenantId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<VoucherWithPostings>> {
        let tables = self.tables.read().await;
        let in_range: HashSet<VoucherId> = tables
            .postings
            .values()
            .filter(|p| p.tenant_id == tenant && p.posting_date >= from && p.posting_date <= to)
            .filter_map(|p| p.voucher_id)
            .collect();

        let mut vouchers: Vec<&Voucher> = tables
            .vouchers
            .values()
            .filter(|v| in_range.contains(&v.id))
            .collect();
        vouchers.sort_by_key(|v| (v.date, v.number, v.id));
        Ok(vouchers.into_iter().map(|v| tables.with_postings(v)).collect())
    }

    async fn search_vouchers(
        &self,
        tenant: TenantId,
        search: &VoucherSearch,
        page: PageRequest,
    ) -> StoreResult<(Vec<VoucherWithPostings>, u64)> {
        let tables = self.tables.read().await;
        let term = search.normalized_term();
        let mut matches: Vec<&Voucher> = tables
            .vouchers
            .values()
            .filter(|v| v.tenant_id == tenant && tables.voucher_matches(v, search, term.as_deref()))
            .collect();
        matches.sort_by(|a, b| (b.date, b.number, b.id).cmp(&(a.date, a.number, a.id)));

        let total = matches.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        let items = matches
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|v| tables.with_postings(v))
            .collect();
        Ok((items, total))
    }
}

#[async_trait]
impl PostingStore for InMemoryStore {
    async fn find_postings(
        &self,
        tenant: TenantId,
        filter: &PostingFilter,
    ) -> StoreResult<Vec<Posting>> {
        let mut postings: Vec<Posting> = self
            .tables
            .read()
            .await
            .postings
            .values()
            .filter(|p| p.tenant_id == tenant && filter.matches(p))
            .cloned()
            .collect();
        postings.sort_by_key(|p| (p.posting_date, p.id));
        Ok(postings)
    }
}

#[async_trait]
impl TimesheetStore for InMemoryStore {
    async fn entries_for_user(
        &self,
        tenant: TenantId,
        user: UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<TimesheetEntry>> {
        let mut entries: Vec<TimesheetEntry> = self
            .tables
            .read()
            .await
            .entries
            .values()
            .filter(|e| {
                e.tenant_id == tenant && e.user_id == user && e.entry_date >= from && e.entry_date <= to
            })
            .cloned()
            .collect();
        entries.sort_by_key(|e| (e.entry_date, e.id));
        Ok(entries)
    }

    async fn entries_by_ids(
        &self,
        tenant: TenantId,
        ids: &[TimesheetEntryId],
    ) -> StoreResult<Vec<TimesheetEntry>> {
        let tables = self.tables.read().await;
        let wanted: HashSet<&TimesheetEntryId> = ids.iter().collect();
        Ok(tables
            .entries
            .values()
            .filter(|e| e.tenant_id == tenant && wanted.contains(&e.id))
            .cloned()
            .collect())
    }

    async fn find_entries(
        &self,
        tenant: TenantId,
        filter: &TimesheetFilter,
    ) -> StoreResult<Vec<TimesheetEntry>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<TimesheetEntry> = tables
            .entries
            .values()
            .filter(|e| e.tenant_id == tenant && tables.entry_matches(e, filter))
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            b.entry_date
                .cmp(&a.entry_date)
                .then(a.user_id.cmp(&b.user_id))
                .then(a.id.cmp(&b.id))
        });
        Ok(entries)
    }

    async fn apply_changes(
        &self,
        tenant: TenantId,
        changes: TimesheetChangeset,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write().await;

        tables.ensure_not_approved(
            tenant,
            changes.updates.iter().map(|u| u.id).chain(changes.deletes.iter().copied()),
        )?;
        for update in &changes.updates {
            if !tables
                .entries
                .get(&update.id)
                .is_some_and(|e| e.tenant_id == tenant)
            {
                return Err(StoreError::NotFound(format!("timesheet entry {}", update.id)));
            }
        }

        // Validate inserts against the table as it will look after the deletes.
        let mut staged = Tables {
            entries: tables
                .entries
                .iter()
                .filter(|(id, _)| !changes.deletes.contains(id))
                .map(|(id, e)| (*id, e.clone()))
                .collect(),
            ..Tables::default()
        };
        for insert in &changes.inserts {
            if staged.entry_key_taken(tenant, insert) {
                return Err(StoreError::Conflict(format!(
                    "timesheet entry for project {} activity {} on {} already exists",
                    insert.project_id, insert.activity_id, insert.entry_date
                )));
            }
            let placeholder = TimesheetEntryId::new(-staged.next_id());
            staged.entries.insert(placeholder, materialize(tenant, placeholder, insert));
        }

        let now = Utc::now();
        tables
            .entries
            .retain(|id, e| !(e.tenant_id == tenant && changes.deletes.contains(id)));
        for update in changes.updates {
            if let Some(entry) = tables.entries.get_mut(&update.id) {
                entry.hours = update.hours;
                entry.notes = update.notes;
                entry.status = TimesheetStatus::Draft;
                entry.updated_at = now;
            }
        }
        for insert in changes.inserts {
            let id = TimesheetEntryId::new(tables.next_id());
            tables.entries.insert(id, materialize(tenant, id, &insert));
        }
        Ok(())
    }

    async fn transition_status(
        &self,
        tenant: TenantId,
        transition: StatusTransition,
    ) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let mut changed = 0;
        for id in &transition.ids {
            let Some(entry) = tables.entries.get_mut(id) else {
                continue;
            };
            if entry.tenant_id != tenant || !transition.from.contains(&entry.status) {
                continue;
            }
            entry.status = transition.to;
            entry.updated_at = transition.at;
            match transition.to {
                TimesheetStatus::Submitted => entry.submitted_at = Some(transition.at),
                TimesheetStatus::Approved => {
                    entry.approved_at = Some(transition.at);
                    entry.approved_by = Some(transition.actor);
                }
                TimesheetStatus::Rejected => entry.approved_by = Some(transition.actor),
                TimesheetStatus::Draft => {}
            }
            changed += 1;
        }
        Ok(changed)
    }

    async fn delete_entries(
        &self,
        tenant: TenantId,
        ids: &[TimesheetEntryId],
    ) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        tables.ensure_not_approved(tenant, ids.iter().copied())?;
        let before = tables.entries.len();
        tables
            .entries
            .retain(|id, e| !(e.tenant_id == tenant && ids.contains(id)));
        Ok((before - tables.entries.len()) as u64)
    }

    async fn distinct_users(&self, tenant: TenantId) -> StoreResult<Vec<UserId>> {
        let tables = self.tables.read().await;
        let mut users: Vec<UserId> = tables
            .entries
            .values()
            .filter(|e| e.tenant_id == tenant)
            .map(|e| e.user_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        users.sort();
        Ok(users)
    }
}

fn materialize(tenant: TenantId, id: TimesheetEntryId, entry: &NewTimesheetEntry) -> TimesheetEntry {
    let now = Utc::now();
    TimesheetEntry {
        id,
        tenant_id: tenant,
        user_id: entry.user_id,
        project_id: Some(entry.project_id),
        activity_id: Some(entry.activity_id),
        entry_date: entry.entry_date,
        hours: entry.hours,
        description: None,
        notes: entry.notes.clone(),
        status: TimesheetStatus::Draft,
        submitted_at: None,
        approved_at: None,
        approved_by: None,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl ProjectDirectory for InMemoryStore {
    async fn active_projects(&self, tenant: TenantId) -> StoreResult<Vec<Project>> {
        let mut projects: Vec<Project> = self
            .tables
            .read()
            .await
            .projects
            .values()
            .filter(|p| p.tenant_id == tenant && p.is_active)
            .cloned()
            .collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }

    async fn active_activities(
        &self,
        tenant: TenantId,
        project: Option<ProjectId>,
    ) -> StoreResult<Vec<Activity>> {
        let mut activities: Vec<Activity> = self
            .tables
            .read()
            .await
            .activities
            .values()
            .filter(|a| {
                a.tenant_id == tenant
                    && a.is_active
                    && (a.project_id.is_none() || a.project_id == project)
            })
            .cloned()
            .collect();
        activities.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(activities)
    }

    async fn find_project(&self, tenant: TenantId, id: ProjectId) -> StoreResult<Option<Project>> {
        Ok(self
            .tables
            .read()
            .await
            .projects
            .get(&id)
            .filter(|p| p.tenant_id == tenant)
            .cloned())
    }

    async fn find_activity(
        &self,
        tenant: TenantId,
        id: ActivityId,
    ) -> StoreResult<Option<Activity>> {
        Ok(self
            .tables
            .read()
            .await
            .activities
            .get(&id)
            .filter(|a| a.tenant_id == tenant)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_shared::types::CurrencyCode;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn posting(account: &str, amount: rust_decimal::Decimal, on: NaiveDate) -> NewPosting {
        NewPosting {
            account_number: account.to_string(),
            amount,
            currency: "NOK".parse::<CurrencyCode>().unwrap(),
            original_amount: None,
            original_currency: None,
            vat_code: None,
            posting_date: on,
            description: None,
            row_number: 0,
        }
    }

    #[tokio::test]
    async fn test_voucher_number_unique_per_tenant_and_year() {
        let store = InMemoryStore::new();
        let t1 = TenantId::new(1);
        let t2 = TenantId::new(2);
        let header = |d| NewVoucher {
            number: 1,
            date: d,
            description: None,
        };

        store.insert_voucher(t1, header(date(2025, 1, 1)), vec![]).await.unwrap();
        // Other tenant and other year may reuse the number.
        store.insert_voucher(t2, header(date(2025, 1, 1)), vec![]).await.unwrap();
        store.insert_voucher(t1, header(date(2026, 1, 1)), vec![]).await.unwrap();

        let err = store
            .insert_voucher(t1, header(date(2025, 6, 1)), vec![])
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.max_voucher_number(t1, 2025).await.unwrap(), Some(1));
        assert_eq!(store.max_voucher_number(t1, 2024).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_replace_voucher_swaps_posting_set() {
        let store = InMemoryStore::new();
        let t = TenantId::new(1);
        let d = date(2025, 2, 1);
        let voucher = store
            .insert_voucher(
                t,
                NewVoucher { number: 1, date: d, description: None },
                vec![posting("1500", dec!(100), d), posting("3000", dec!(-100), d)],
            )
            .await
            .unwrap();

        store
            .replace_voucher(
                t,
                voucher.id,
                VoucherChanges { date: d, description: Some("fixed".into()), number: None },
                vec![posting("1920", dec!(50), d), posting("3000", dec!(-50), d)],
            )
            .await
            .unwrap();

        let loaded = store.find_voucher(t, voucher.id).await.unwrap().unwrap();
        assert_eq!(loaded.voucher.description.as_deref(), Some("fixed"));
        assert_eq!(loaded.postings.len(), 2);
        assert!(loaded.postings.iter().any(|p| p.account_number == "1920"));
        assert_eq!(store.posting_count().await, 2);
        assert!(store.find_voucher(TenantId::new(2), voucher.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_apply_changes_rejects_duplicate_key() {
        let store = InMemoryStore::new();
        let t = TenantId::new(1);
        let entry = NewTimesheetEntry {
            user_id: UserId::new(9),
            project_id: ProjectId::new(1),
            activity_id: ActivityId::new(2),
            entry_date: date(2025, 1, 6),
            hours: dec!(8),
            notes: None,
        };
        let changes = TimesheetChangeset {
            inserts: vec![entry.clone(), entry],
            ..Default::default()
        };
        let err = store.apply_changes(t, changes).await.unwrap_err();
        assert!(err.is_conflict());
        assert!(store.distinct_users(t).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_approval_between_plan_and_write_blocks_the_write() {
        use crate::timesheet::types::TimesheetEntryUpdate;

        let store = InMemoryStore::new();
        let t = TenantId::new(1);
        let user = UserId::new(9);
        let monday = NewTimesheetEntry {
            user_id: user,
            project_id: ProjectId::new(1),
            activity_id: ActivityId::new(2),
            entry_date: date(2025, 1, 6),
            hours: dec!(8),
            notes: None,
        };
        let tuesday = NewTimesheetEntry {
            entry_date: date(2025, 1, 7),
            ..monday.clone()
        };
        store
            .apply_changes(
                t,
                TimesheetChangeset {
                    inserts: vec![monday, tuesday],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let ids: Vec<_> = store
            .entries_for_user(t, user, date(2025, 1, 6), date(2025, 1, 12))
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();

        // Planned while still draft.
        let edit = TimesheetChangeset {
            updates: vec![TimesheetEntryUpdate {
                id: ids[0],
                hours: dec!(9),
                notes: None,
            }],
            deletes: vec![ids[1]],
            ..Default::default()
        };

        for (from, to) in [
            (TimesheetStatus::Draft, TimesheetStatus::Submitted),
            (TimesheetStatus::Submitted, TimesheetStatus::Approved),
        ] {
            let moved = store
                .transition_status(
                    t,
                    StatusTransition {
                        ids: ids.clone(),
                        from: vec![from],
                        to,
                        actor: UserId::new(1),
                        at: Utc::now(),
                    },
                )
                .await
                .unwrap();
            assert_eq!(moved, 2);
        }

        let err = store.apply_changes(t, edit).await.unwrap_err();
        assert!(matches!(err, StoreError::Locked(_)));
        let err = store.delete_entries(t, &ids[1..]).await.unwrap_err();
        assert!(matches!(err, StoreError::Locked(_)));

        let entries = store.entries_by_ids(t, &ids).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.status == TimesheetStatus::Approved));
        assert!(entries.iter().all(|e| e.hours == dec!(8)));
    }
}
