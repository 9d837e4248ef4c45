//! Weekly timesheets and the approval workflow.
//!
//! Entries move DRAFT → SUBMITTED → APPROVED or REJECTED. An approved entry
//! locks its week against save, submit and delete.

pub mod error;
pub mod reconcile;
pub mod service;
pub mod types;
pub mod view;
pub mod week;

#[cfg(test)]
mod reconcile_props;

pub use error::TimesheetError;
pub use service::TimesheetWorkflow;
pub use types::{
    Activity, ApprovalStatus, MonthlyReport, MonthlyReportEntry, MonthlyReportFilter, Project,
    TimeReportEntry, TimesheetEntry, TimesheetRow, TimesheetStatus, WeeklyTimesheet,
};
