//! Timesheet entries, projects and activities.

use async_trait::async_trait;
use chrono::NaiveDate;
use folio_core::store::{ProjectDirectory, StoreError, StoreResult, TimesheetStore};
use folio_core::timesheet::types::{StatusTransition, TimesheetChangeset, TimesheetFilter};
use folio_core::timesheet::{Activity, Project, TimesheetEntry, TimesheetStatus as DomainStatus};
use folio_shared::types::{ActivityId, ProjectId, TenantId, TimesheetEntryId, UserId};
use sea_orm::sea_query::{Expr, Func, Query};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};

use super::{SeaStore, convert, store_err};
use crate::entities::sea_orm_active_enums::TimesheetStatus;
use crate::entities::{activities, projects, timesheet_entries};

fn raw_ids(ids: &[TimesheetEntryId]) -> Vec<i64> {
    ids.iter().map(|id| id.into_inner()).collect()
}

/// Fails with [`StoreError::Locked`] if any of `ids` is approved.
async fn ensure_not_approved<C: ConnectionTrait>(
    conn: &C,
    tenant: TenantId,
    ids: Vec<i64>,
) -> StoreResult<()> {
    let approved = timesheet_entries::Entity::find()
        .filter(timesheet_entries::Column::TenantId.eq(tenant.into_inner()))
        .filter(timesheet_entries::Column::Id.is_in(ids))
        .filter(timesheet_entries::Column::Status.eq(TimesheetStatus::Approved))
        .one(conn)
        .await
        .map_err(store_err)?;
    match approved {
        Some(entry) => Err(StoreError::Locked(format!("timesheet entry {} is approved", entry.id))),
        None => Ok(()),
    }
}

/// Matches `term` (already lower-cased) against notes, description and the
/// names of the entry's project and activity.
fn search_condition(tenant: TenantId, term: &str) -> Condition {
    let pattern = format!("%{term}%");
    let lower = |column: timesheet_entries::Column| {
        Expr::expr(Func::lower(Expr::col((timesheet_entries::Entity, column)))).like(pattern.as_str())
    };
    let projects_named = Query::select()
        .column(projects::Column::Id)
        .from(projects::Entity)
        .and_where(projects::Column::TenantId.eq(tenant.into_inner()))
        .and_where(Expr::expr(Func::lower(Expr::col(projects::Column::Name))).like(pattern.as_str()))
        .to_owned();
    let activities_named = Query::select()
        .column(activities::Column::Id)
        .from(activities::Entity)
        .and_where(activities::Column::TenantId.eq(tenant.into_inner()))
        .and_where(
            Expr::expr(Func::lower(Expr::col(activities::Column::Name))).like(pattern.as_str()),
        )
        .to_owned();

    Condition::any()
        .add(lower(timesheet_entries::Column::Notes))
        .add(lower(timesheet_entries::Column::Description))
        .add(timesheet_entries::Column::ProjectId.in_subquery(projects_named))
        .add(timesheet_entries::Column::ActivityId.in_subquery(activities_named))
}

#[async_trait]
impl TimesheetStore for SeaStore {
    async fn entries_for_user(
        &self,
        tenant: TenantId,
        user: UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<TimesheetEntry>> {
        let entries = timesheet_entries::Entity::find()
            .filter(timesheet_entries::Column::TenantId.eq(tenant.into_inner()))
            .filter(timesheet_entries::Column::UserId.eq(user.into_inner()))
            .filter(timesheet_entries::Column::EntryDate.between(from, to))
            .order_by_asc(timesheet_entries::Column::EntryDate)
            .order_by_asc(timesheet_entries::Column::Id)
            .all(&self.db)
            .await
            .map_err(store_err)?;
        Ok(entries.into_iter().map(convert::entry).collect())
    }

    async fn entries_by_ids(
        &self,
        tenant: TenantId,
        ids: &[TimesheetEntryId],
    ) -> StoreResult<Vec<TimesheetEntry>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let entries = timesheet_entries::Entity::find()
            .filter(timesheet_entries::Column::TenantId.eq(tenant.into_inner()))
            .filter(timesheet_entries::Column::Id.is_in(raw_ids(ids)))
            .all(&self.db)
            .await
            .map_err(store_err)?;
        Ok(entries.into_iter().map(convert::entry).collect())
    }

    async fn find_entries(
        &self,
        tenant: TenantId,
        filter: &TimesheetFilter,
    ) -> StoreResult<Vec<TimesheetEntry>> {
        let mut query = timesheet_entries::Entity::find()
            .filter(timesheet_entries::Column::TenantId.eq(tenant.into_inner()))
            .filter(timesheet_entries::Column::EntryDate.between(filter.date_from, filter.date_to));
        if let Some(user) = filter.user_id {
            query = query.filter(timesheet_entries::Column::UserId.eq(user.into_inner()));
        }
        if let Some(project) = filter.project_id {
            query = query.filter(timesheet_entries::Column::ProjectId.eq(project.into_inner()));
        }
        if let Some(status) = filter.status {
            query = query.filter(timesheet_entries::Column::Status.eq(TimesheetStatus::from(status)));
        }
        if let Some(term) = filter.search.as_deref() {
            query = query.filter(search_condition(tenant, term));
        }

        let entries = query
            .order_by_desc(timesheet_entries::Column::EntryDate)
            .order_by_asc(timesheet_entries::Column::UserId)
            .order_by_asc(timesheet_entries::Column::Id)
            .all(&self.db)
            .await
            .map_err(store_err)?;
        Ok(entries.into_iter().map(convert::entry).collect())
    }

    async fn apply_changes(
        &self,
        tenant: TenantId,
        changes: TimesheetChangeset,
    ) -> StoreResult<()> {
        let txn = self.db.begin().await.map_err(store_err)?;
        let now = convert::now();

        // Approved rows are excluded by every statement, so an approval that
        // commits after planning leaves them untouched and the txn rolls back.
        if !changes.deletes.is_empty() {
            let result = timesheet_entries::Entity::delete_many()
                .filter(timesheet_entries::Column::TenantId.eq(tenant.into_inner()))
                .filter(timesheet_entries::Column::Id.is_in(raw_ids(&changes.deletes)))
                .filter(timesheet_entries::Column::Status.ne(TimesheetStatus::Approved))
                .exec(&txn)
                .await
                .map_err(store_err)?;
            if result.rows_affected < changes.deletes.len() as u64 {
                ensure_not_approved(&txn, tenant, raw_ids(&changes.deletes)).await?;
            }
        }

        for update in changes.updates {
            let result = timesheet_entries::Entity::update_many()
                .set(timesheet_entries::ActiveModel {
                    hours: Set(update.hours),
                    notes: Set(update.notes),
                    status: Set(TimesheetStatus::Draft),
                    updated_at: Set(now),
                    ..Default::default()
                })
                .filter(timesheet_entries::Column::TenantId.eq(tenant.into_inner()))
                .filter(timesheet_entries::Column::Id.eq(update.id.into_inner()))
                .filter(timesheet_entries::Column::Status.ne(TimesheetStatus::Approved))
                .exec(&txn)
                .await
                .map_err(store_err)?;
            if result.rows_affected == 0 {
                ensure_not_approved(&txn, tenant, vec![update.id.into_inner()]).await?;
                return Err(StoreError::NotFound(format!("timesheet entry {}", update.id)));
            }
        }

        if !changes.inserts.is_empty() {
            let rows = changes.inserts.into_iter().map(|entry| timesheet_entries::ActiveModel {
                tenant_id: Set(tenant.into_inner()),
                user_id: Set(entry.user_id.into_inner()),
                project_id: Set(Some(entry.project_id.into_inner())),
                activity_id: Set(Some(entry.activity_id.into_inner())),
                entry_date: Set(entry.entry_date),
                hours: Set(entry.hours),
                notes: Set(entry.notes),
                status: Set(TimesheetStatus::Draft),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            });
            timesheet_entries::Entity::insert_many(rows)
                .exec(&txn)
                .await
                .map_err(store_err)?;
        }

        txn.commit().await.map_err(store_err)
    }

    async fn transition_status(
        &self,
        tenant: TenantId,
        transition: StatusTransition,
    ) -> StoreResult<u64> {
        if transition.ids.is_empty() || transition.from.is_empty() {
            return Ok(0);
        }
        let at = transition.at.fixed_offset();
        let mut changes = timesheet_entries::ActiveModel {
            status: Set(transition.to.into()),
            updated_at: Set(at),
            ..Default::default()
        };
        match transition.to {
            DomainStatus::Submitted => changes.submitted_at = Set(Some(at)),
            DomainStatus::Approved => {
                changes.approved_at = Set(Some(at));
                changes.approved_by = Set(Some(transition.actor.into_inner()));
            }
            DomainStatus::Rejected => changes.approved_by = Set(Some(transition.actor.into_inner())),
            DomainStatus::Draft => {}
        }

        let from: Vec<TimesheetStatus> = transition.from.iter().copied().map(Into::into).collect();
        let result = timesheet_entries::Entity::update_many()
            .set(changes)
            .filter(timesheet_entries::Column::TenantId.eq(tenant.into_inner()))
            .filter(timesheet_entries::Column::Id.is_in(raw_ids(&transition.ids)))
            .filter(timesheet_entries::Column::Status.is_in(from))
            .exec(&self.db)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected)
    }

    async fn delete_entries(
        &self,
        tenant: TenantId,
        ids: &[TimesheetEntryId],
    ) -> StoreResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let txn = self.db.begin().await.map_err(store_err)?;
        let result = timesheet_entries::Entity::delete_many()
            .filter(timesheet_entries::Column::TenantId.eq(tenant.into_inner()))
            .filter(timesheet_entries::Column::Id.is_in(raw_ids(ids)))
            .filter(timesheet_entries::Column::Status.ne(TimesheetStatus::Approved))
            .exec(&txn)
            .await
            .map_err(store_err)?;
        if result.rows_affected < ids.len() as u64 {
            ensure_not_approved(&txn, tenant, raw_ids(ids)).await?;
        }
        txn.commit().await.map_err(store_err)?;
        Ok(result.rows_affected)
    }

    async fn distinct_users(&self, tenant: TenantId) -> StoreResult<Vec<UserId>> {
        let users: Vec<i64> = timesheet_entries::Entity::find()
            .select_only()
            .column(timesheet_entries::Column::UserId)
            .distinct()
            .filter(timesheet_entries::Column::TenantId.eq(tenant.into_inner()))
            .order_by_asc(timesheet_entries::Column::UserId)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(store_err)?;
        Ok(users.into_iter().map(UserId::new).collect())
    }
}

#[async_trait]
impl ProjectDirectory for SeaStore {
    async fn active_projects(&self, tenant: TenantId) -> StoreResult<Vec<Project>> {
        let projects = projects::Entity::find()
            .filter(projects::Column::TenantId.eq(tenant.into_inner()))
            .filter(projects::Column::IsActive.eq(true))
            .order_by_asc(projects::Column::Name)
            .all(&self.db)
            .await
            .map_err(store_err)?;
        Ok(projects.into_iter().map(convert::project).collect())
    }

    async fn active_activities(
        &self,
        tenant: TenantId,
        project: Option<ProjectId>,
    ) -> StoreResult<Vec<Activity>> {
        let mut scope = Condition::any().add(activities::Column::ProjectId.is_null());
        if let Some(project) = project {
            scope = scope.add(activities::Column::ProjectId.eq(project.into_inner()));
        }
        let activities = activities::Entity::find()
            .filter(activities::Column::TenantId.eq(tenant.into_inner()))
            .filter(activities::Column::IsActive.eq(true))
            .filter(scope)
            .order_by_asc(activities::Column::Name)
            .all(&self.db)
            .await
            .map_err(store_err)?;
        Ok(activities.into_iter().map(convert::activity).collect())
    }

    async fn find_project(&self, tenant: TenantId, id: ProjectId) -> StoreResult<Option<Project>> {
        let project = projects::Entity::find_by_id(id.into_inner())
            .filter(projects::Column::TenantId.eq(tenant.into_inner()))
            .one(&self.db)
            .await
            .map_err(store_err)?;
        Ok(project.map(convert::project))
    }

    async fn find_activity(
        &self,
        tenant: TenantId,
        id: ActivityId,
    ) -> StoreResult<Option<Activity>> {
        let activity = activities::Entity::find_by_id(id.into_inner())
            .filter(activities::Column::TenantId.eq(tenant.into_inner()))
            .one(&self.db)
            .await
            .map_err(store_err)?;
        Ok(activity.map(convert::activity))
    }
}
