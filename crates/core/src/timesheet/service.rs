//! Timesheet workflow service.
//!
//! Owns the entry state machine: weekly save and submit for the owning user,
//! bulk approve and reject for approvers, and the read models built on top.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use folio_shared::types::{
    ActivityId, ProjectId, RequestContext, TenantId, TimesheetEntryId, UserId,
};
use tracing::{debug, info, warn};

use super::error::TimesheetError;
use super::reconcile::{ensure_unlocked, plan_save, validate_rows};
use super::types::{
    Activity, MonthlyReport, MonthlyReportFilter, Project, StatusTransition, TimeReportEntry,
    TimesheetEntry, TimesheetFilter, TimesheetRow, TimesheetStatus, WeeklyTimesheet,
};
use super::view::{Labels, build_monthly_report, build_time_report, build_week};
use super::week;
use crate::reports::types::{first_of_month, last_of_month};
use crate::store::{ProjectDirectory, StoreError, TimesheetStore};

/// Timesheet entry and approval service.
pub struct TimesheetWorkflow<S> {
    store: Arc<S>,
}

impl<S> TimesheetWorkflow<S>
where
    S: TimesheetStore + ProjectDirectory,
{
    /// Creates a new workflow over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The requesting user's grid for the week containing `date`.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the store fails.
    pub async fn weekly_timesheet(
        &self,
        ctx: &RequestContext,
        date: NaiveDate,
    ) -> Result<WeeklyTimesheet, TimesheetError> {
        let monday = week::week_start(date);
        let entries = self.week_entries(ctx, monday).await?;
        Ok(build_week(monday, &entries))
    }

    /// Replaces the requesting user's week with `rows`.
    ///
    /// Nothing is written unless every check passes. Returns the rebuilt week.
    ///
    /// # Errors
    ///
    /// Returns `ApprovedTimesheetModification` if any entry of the week is
    /// approved, a row validation or reference error, or `Database`.
    pub async fn save_weekly_timesheet(
        &self,
        ctx: &RequestContext,
        date: NaiveDate,
        rows: &[TimesheetRow],
    ) -> Result<WeeklyTimesheet, TimesheetError> {
        let monday = week::week_start(date);
        let existing = self.week_entries(ctx, monday).await?;

        if let Err(err) = ensure_unlocked(&existing) {
            warn!(
                tenant_id = %ctx.tenant_id,
                user_id = %ctx.user_id,
                week_start = %monday,
                "Rejected save of approved week"
            );
            return Err(err);
        }
        let pairs = validate_rows(rows)?;
        self.check_references(ctx.tenant_id, &pairs).await?;

        let changes = plan_save(ctx.user_id, monday, rows, &existing);
        debug!(
            tenant_id = %ctx.tenant_id,
            user_id = %ctx.user_id,
            week_start = %monday,
            inserts = changes.inserts.len(),
            updates = changes.updates.len(),
            deletes = changes.deletes.len(),
            "Reconciled week"
        );
        if !changes.is_empty() {
            if let Err(err) = self.store.apply_changes(ctx.tenant_id, changes).await {
                if matches!(err, StoreError::Locked(_)) {
                    warn!(
                        tenant_id = %ctx.tenant_id,
                        user_id = %ctx.user_id,
                        week_start = %monday,
                        "Week was approved while saving"
                    );
                }
                return Err(err.into());
            }
        }

        info!(
            tenant_id = %ctx.tenant_id,
            user_id = %ctx.user_id,
            week_start = %monday,
            rows = rows.len(),
            "Timesheet saved"
        );
        let entries = self.week_entries(ctx, monday).await?;
        Ok(build_week(monday, &entries))
    }

    /// Submits the requesting user's week containing `date`.
    ///
    /// Returns `false` when the week has no entries.
    ///
    /// # Errors
    ///
    /// Returns `ApprovedTimesheetModification` if any entry is already
    /// submitted or approved, or `Database`.
    pub async fn submit_timesheet(
        &self,
        ctx: &RequestContext,
        date: NaiveDate,
    ) -> Result<bool, TimesheetError> {
        let monday = week::week_start(date);
        let entries = self.week_entries(ctx, monday).await?;
        if entries.is_empty() {
            return Ok(false);
        }
        if let Some(entry) = entries.iter().find(|e| e.status.blocks_submit()) {
            warn!(
                tenant_id = %ctx.tenant_id,
                user_id = %ctx.user_id,
                week_start = %monday,
                status = %entry.status,
                "Rejected resubmission"
            );
            return Err(TimesheetError::ApprovedTimesheetModification(format!(
                "week of {monday} is already {}",
                entry.status.as_str().to_lowercase()
            )));
        }

        let changed = self
            .store
            .transition_status(
                ctx.tenant_id,
                StatusTransition {
                    ids: entries.iter().map(|e| e.id).collect(),
                    from: vec![TimesheetStatus::Draft, TimesheetStatus::Rejected],
                    to: TimesheetStatus::Submitted,
                    actor: ctx.user_id,
                    at: Utc::now(),
                },
            )
            .await?;
        info!(
            tenant_id = %ctx.tenant_id,
            user_id = %ctx.user_id,
            week_start = %monday,
            entries = changed,
            "Timesheet submitted"
        );
        Ok(true)
    }

    /// Approves every submitted entry in the month of `month` matching the
    /// filters. Returns the number approved.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the store fails.
    pub async fn approve(
        &self,
        ctx: &RequestContext,
        month: NaiveDate,
        employee: Option<UserId>,
        project: Option<ProjectId>,
    ) -> Result<u64, TimesheetError> {
        let count = self
            .transition_month(ctx, month, employee, project, TimesheetStatus::Approved)
            .await?;
        info!(
            tenant_id = %ctx.tenant_id,
            approver = %ctx.user_id,
            month = %first_of_month(month),
            entries = count,
            "Timesheets approved"
        );
        Ok(count)
    }

    /// Rejects every submitted entry in the month of `month` matching the
    /// filters. Returns the number rejected.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the store fails.
    pub async fn reject(
        &self,
        ctx: &RequestContext,
        month: NaiveDate,
        employee: Option<UserId>,
        project: Option<ProjectId>,
    ) -> Result<u64, TimesheetError> {
        let count = self
            .transition_month(ctx, month, employee, project, TimesheetStatus::Rejected)
            .await?;
        info!(
            tenant_id = %ctx.tenant_id,
            approver = %ctx.user_id,
            month = %first_of_month(month),
            entries = count,
            "Timesheets rejected"
        );
        Ok(count)
    }

    /// Deletes entries of the requesting user, all or nothing.
    ///
    /// Returns `false` without deleting anything when an id is unknown or
    /// belongs to someone else.
    ///
    /// # Errors
    ///
    /// Returns `ApprovedTimesheetModification` if one of the user's entries is
    /// approved, or `Database`.
    pub async fn delete_entries(
        &self,
        ctx: &RequestContext,
        ids: &[TimesheetEntryId],
    ) -> Result<bool, TimesheetError> {
        let ids: Vec<TimesheetEntryId> = ids
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if ids.is_empty() {
            return Ok(true);
        }

        let found = self.store.entries_by_ids(ctx.tenant_id, &ids).await?;
        let owned: Vec<&TimesheetEntry> =
            found.iter().filter(|e| e.user_id == ctx.user_id).collect();
        if let Some(locked) = owned.iter().find(|e| e.status.is_approved()) {
            warn!(
                tenant_id = %ctx.tenant_id,
                user_id = %ctx.user_id,
                entry = %locked.id,
                "Rejected delete of approved entry"
            );
            return Err(TimesheetError::ApprovedTimesheetModification(format!(
                "entry {} is approved",
                locked.id
            )));
        }
        if owned.len() != ids.len() {
            warn!(
                tenant_id = %ctx.tenant_id,
                user_id = %ctx.user_id,
                requested = ids.len(),
                owned = owned.len(),
                "Rejected delete batch"
            );
            return Ok(false);
        }

        let deleted = match self.store.delete_entries(ctx.tenant_id, &ids).await {
            Ok(deleted) => deleted,
            Err(err) => {
                if matches!(err, StoreError::Locked(_)) {
                    warn!(
                        tenant_id = %ctx.tenant_id,
                        user_id = %ctx.user_id,
                        "Entries were approved while deleting"
                    );
                }
                return Err(err.into());
            }
        };
        info!(
            tenant_id = %ctx.tenant_id,
            user_id = %ctx.user_id,
            entries = deleted,
            "Timesheet entries deleted"
        );
        Ok(true)
    }

    /// Aggregated report of the tenant's entries in one month.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the store fails.
    pub async fn monthly_report(
        &self,
        tenant: TenantId,
        filter: &MonthlyReportFilter,
    ) -> Result<MonthlyReport, TimesheetError> {
        let query = TimesheetFilter {
            user_id: filter.employee_id,
            project_id: filter.project_id,
            status: filter.status,
            search: filter
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_lowercase),
            ..TimesheetFilter::between(first_of_month(filter.month), last_of_month(filter.month))
        };
        let entries = self.store.find_entries(tenant, &query).await?;
        let labels = self.labels(tenant, &entries).await?;
        debug!(tenant_id = %tenant, entries = entries.len(), "Built monthly report");
        Ok(build_monthly_report(filter.month, &entries, &labels))
    }

    /// Worked-hours lines of the requesting user's week containing `date`.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the store fails.
    pub async fn time_report_entries(
        &self,
        ctx: &RequestContext,
        date: NaiveDate,
    ) -> Result<Vec<TimeReportEntry>, TimesheetError> {
        let entries = self.week_entries(ctx, week::week_start(date)).await?;
        let labels = self.labels(ctx.tenant_id, &entries).await?;
        Ok(build_time_report(&entries, &labels))
    }

    /// Active projects ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the store fails.
    pub async fn active_projects(&self, tenant: TenantId) -> Result<Vec<Project>, TimesheetError> {
        Ok(self.store.active_projects(tenant).await?)
    }

    /// Active activities usable on `project`: global ones plus those of the project.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the store fails.
    pub async fn active_activities(
        &self,
        tenant: TenantId,
        project: Option<ProjectId>,
    ) -> Result<Vec<Activity>, TimesheetError> {
        Ok(self.store.active_activities(tenant, project).await?)
    }

    /// Users with at least one entry.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the store fails.
    pub async fn active_employees(&self, tenant: TenantId) -> Result<Vec<UserId>, TimesheetError> {
        Ok(self.store.distinct_users(tenant).await?)
    }

    async fn week_entries(
        &self,
        ctx: &RequestContext,
        monday: NaiveDate,
    ) -> Result<Vec<TimesheetEntry>, TimesheetError> {
        Ok(self
            .store
            .entries_for_user(ctx.tenant_id, ctx.user_id, monday, week::week_end(monday))
            .await?)
    }

    async fn transition_month(
        &self,
        ctx: &RequestContext,
        month: NaiveDate,
        employee: Option<UserId>,
        project: Option<ProjectId>,
        to: TimesheetStatus,
    ) -> Result<u64, TimesheetError> {
        let filter = TimesheetFilter {
            user_id: employee,
            project_id: project,
            status: Some(TimesheetStatus::Submitted),
            ..TimesheetFilter::between(first_of_month(month), last_of_month(month))
        };
        let entries = self.store.find_entries(ctx.tenant_id, &filter).await?;
        if entries.is_empty() {
            return Ok(0);
        }

        Ok(self
            .store
            .transition_status(
                ctx.tenant_id,
                StatusTransition {
                    ids: entries.iter().map(|e| e.id).collect(),
                    from: vec![TimesheetStatus::Submitted],
                    to,
                    actor: ctx.user_id,
                    at: Utc::now(),
                },
            )
            .await?)
    }

    async fn check_references(
        &self,
        tenant: TenantId,
        pairs: &[(ProjectId, ActivityId)],
    ) -> Result<(), TimesheetError> {
        for &(project_id, activity_id) in pairs {
            if self.store.find_project(tenant, project_id).await?.is_none() {
                return Err(TimesheetError::ProjectNotFound(project_id));
            }
            let activity = self
                .store
                .find_activity(tenant, activity_id)
                .await?
                .ok_or(TimesheetError::ActivityNotFound(activity_id))?;
            if !activity.applies_to(project_id) {
                return Err(TimesheetError::ActivityNotInProject {
                    activity: activity_id,
                    project: project_id,
                });
            }
        }
        Ok(())
    }

    async fn labels(
        &self,
        tenant: TenantId,
        entries: &[TimesheetEntry],
    ) -> Result<Labels, TimesheetError> {
        let mut labels = Labels::default();
        let projects: BTreeSet<ProjectId> = entries.iter().filter_map(|e| e.project_id).collect();
        for id in projects {
            if let Some(project) = self.store.find_project(tenant, id).await? {
                labels.projects.insert(id, project.name);
            }
        }
        let activities: BTreeSet<ActivityId> = entries.iter().filter_map(|e| e.activity_id).collect();
        for id in activities {
            if let Some(activity) = self.store.find_activity(tenant, id).await? {
                labels.activities.insert(id, activity.name);
            }
        }
        Ok(labels)
    }
}
