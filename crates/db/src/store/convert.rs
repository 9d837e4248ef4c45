//! Row to domain conversions.

use chrono::{DateTime, Utc};
use folio_core::ledger::{Account, Posting, Voucher};
use folio_core::store::StoreError;
use folio_core::timesheet::{Activity, Project, TimesheetEntry};
use folio_shared::types::{
    ActivityId, CurrencyCode, PostingId, ProjectId, TenantId, TimesheetEntryId, UserId, VoucherId,
};
use sea_orm::prelude::DateTimeWithTimeZone;

use crate::entities::{
    accounts, activities, postings, projects, timesheet_entries, vouchers,
};

pub(crate) fn now() -> DateTimeWithTimeZone {
    Utc::now().fixed_offset()
}

fn utc(at: DateTimeWithTimeZone) -> DateTime<Utc> {
    at.with_timezone(&Utc)
}

fn currency(code: &str) -> Result<CurrencyCode, StoreError> {
    code.parse().map_err(StoreError::Database)
}

pub(crate) fn account(model: accounts::Model) -> Account {
    Account {
        account_number: model.account_number,
        account_name: model.account_name,
    }
}

pub(crate) fn voucher(model: vouchers::Model) -> Voucher {
    Voucher {
        id: VoucherId::new(model.id),
        tenant_id: TenantId::new(model.tenant_id),
        number: model.number,
        date: model.voucher_date,
        description: model.description,
        created_at: utc(model.created_at),
        updated_at: utc(model.updated_at),
    }
}

pub(crate) fn posting(model: postings::Model) -> Result<Posting, StoreError> {
    Ok(Posting {
        id: PostingId::new(model.id),
        tenant_id: TenantId::new(model.tenant_id),
        voucher_id: model.voucher_id.map(VoucherId::new),
        account_number: model.account_number,
        amount: model.amount,
        currency: currency(&model.currency)?,
        original_amount: model.original_amount,
        original_currency: model
            .original_currency
            .as_deref()
            .map(currency)
            .transpose()?,
        vat_code: model.vat_code,
        posting_date: model.posting_date,
        description: model.description,
        row_number: model.row_number,
        created_at: utc(model.created_at),
    })
}

pub(crate) fn project(model: projects::Model) -> Project {
    Project {
        id: ProjectId::new(model.id),
        tenant_id: TenantId::new(model.tenant_id),
        name: model.name,
        description: model.description,
        color: model.color,
        is_active: model.is_active,
    }
}

pub(crate) fn activity(model: activities::Model) -> Activity {
    Activity {
        id: ActivityId::new(model.id),
        tenant_id: TenantId::new(model.tenant_id),
        project_id: model.project_id.map(ProjectId::new),
        name: model.name,
        description: model.description,
        is_billable: model.is_billable,
        hourly_rate: model.hourly_rate,
        is_active: model.is_active,
    }
}

pub(crate) fn entry(model: timesheet_entries::Model) -> TimesheetEntry {
    TimesheetEntry {
        id: TimesheetEntryId::new(model.id),
        tenant_id: TenantId::new(model.tenant_id),
        user_id: UserId::new(model.user_id),
        project_id: model.project_id.map(ProjectId::new),
        activity_id: model.activity_id.map(ActivityId::new),
        entry_date: model.entry_date,
        hours: model.hours,
        description: model.description,
        notes: model.notes,
        status: model.status.into(),
        submitted_at: model.submitted_at.map(utc),
        approved_at: model.approved_at.map(utc),
        approved_by: model.approved_by.map(UserId::new),
        created_at: utc(model.created_at),
        updated_at: utc(model.updated_at),
    }
}
