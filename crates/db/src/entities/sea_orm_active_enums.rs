//! Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use folio_core::timesheet::TimesheetStatus as DomainStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "timesheet_status")]
pub enum TimesheetStatus {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "SUBMITTED")]
    Submitted,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

impl From<DomainStatus> for TimesheetStatus {
    fn from(status: DomainStatus) -> Self {
        match status {
            DomainStatus::Draft => Self::Draft,
            DomainStatus::Submitted => Self::Submitted,
            DomainStatus::Approved => Self::Approved,
            DomainStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<TimesheetStatus> for DomainStatus {
    fn from(status: TimesheetStatus) -> Self {
        match status {
            TimesheetStatus::Draft => Self::Draft,
            TimesheetStatus::Submitted => Self::Submitted,
            TimesheetStatus::Approved => Self::Approved,
            TimesheetStatus::Rejected => Self::Rejected,
        }
    }
}
