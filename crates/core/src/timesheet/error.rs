//! Timesheet error types.

use folio_shared::AppError;
use folio_shared::types::{ActivityId, ProjectId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur during timesheet operations.
#[derive(Debug, Error)]
pub enum TimesheetError {
    /// Attempted change to a week or entry that is locked.
    #[error("Cannot modify timesheet: {0}")]
    ApprovedTimesheetModification(String),

    /// A row is missing its project or activity.
    #[error("Project and activity must be selected for every row (row {row})")]
    MissingProjectOrActivitySelection {
        /// Offending row id.
        row: usize,
    },

    /// Hours outside `0..=24`.
    #[error("Hours must be between 0 and 24, got {0}")]
    HoursOutOfRange(Decimal),

    /// Hours with more than two decimal places.
    #[error("Hours must have at most 2 decimal places, got {0}")]
    HoursPrecision(Decimal),

    /// Two rows share a (project, activity) pair.
    #[error("Duplicate row for project {project} and activity {activity}")]
    DuplicateProjectActivityRow {
        /// Project of the duplicated pair.
        project: ProjectId,
        /// Activity of the duplicated pair.
        activity: ActivityId,
    },

    /// Project absent or owned by another tenant.
    #[error("Project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// Activity absent or owned by another tenant.
    #[error("Activity not found: {0}")]
    ActivityNotFound(ActivityId),

    /// Activity restricted to a different project.
    #[error("Activity {activity} cannot be booked on project {project}")]
    ActivityNotInProject {
        /// Activity selected.
        activity: ActivityId,
        /// Project selected.
        project: ProjectId,
    },

    /// Store error.
    #[error("Database error: {0}")]
    Database(String),
}

impl TimesheetError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ApprovedTimesheetModification(_) => "APPROVED_TIMESHEET_MODIFICATION",
            Self::MissingProjectOrActivitySelection { .. } => "MISSING_PROJECT_OR_ACTIVITY",
            Self::HoursOutOfRange(_) => "HOURS_OUT_OF_RANGE",
            Self::HoursPrecision(_) => "HOURS_PRECISION",
            Self::DuplicateProjectActivityRow { .. } => "DUPLICATE_PROJECT_ACTIVITY_ROW",
            Self::ProjectNotFound(_) => "PROJECT_NOT_FOUND",
            Self::ActivityNotFound(_) => "ACTIVITY_NOT_FOUND",
            Self::ActivityNotInProject { .. } => "ACTIVITY_NOT_IN_PROJECT",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::ApprovedTimesheetModification(_) => 409,
            Self::MissingProjectOrActivitySelection { .. }
            | Self::HoursOutOfRange(_)
            | Self::HoursPrecision(_)
            | Self::DuplicateProjectActivityRow { .. }
            | Self::ProjectNotFound(_)
            | Self::ActivityNotFound(_)
            | Self::ActivityNotInProject { .. } => 400,
            Self::Database(_) => 500,
        }
    }
}

impl From<StoreError> for TimesheetError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Locked(detail) => Self::ApprovedTimesheetModification(detail),
            other => Self::Database(other.to_string()),
        }
    }
}

impl From<TimesheetError> for AppError {
    fn from(err: TimesheetError) -> Self {
        match err.http_status_code() {
            400 => Self::Validation(err.to_string()),
            409 => Self::Conflict(err.to_string()),
            _ => Self::Database(err.to_string()),
        }
    }
}
