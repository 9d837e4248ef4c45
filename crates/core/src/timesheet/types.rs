//! Timesheet domain types.

use chrono::{DateTime, NaiveDate, Utc};
use folio_shared::types::{ActivityId, ProjectId, TenantId, TimesheetEntryId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Days in a timesheet week.
pub const DAYS_IN_WEEK: usize = 7;

/// Short day keys, Monday first.
pub const DAY_NAMES: [&str; DAYS_IN_WEEK] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

/// Upper bound for hours on one entry.
pub const MAX_HOURS_PER_DAY: Decimal = Decimal::from_parts(24, 0, 0, false, 0);

/// Decimal places kept for hours.
pub const HOURS_SCALE: u32 = 2;

/// Timesheet entry status.
///
/// Valid transitions:
/// - Draft → Submitted (submit)
/// - Submitted → Approved (approve)
/// - Submitted → Rejected (reject)
/// - Rejected → Draft (save) or Rejected → Submitted (submit)
/// - Submitted → Draft (save)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimesheetStatus {
    /// Being edited.
    Draft,
    /// Waiting for approval.
    Submitted,
    /// Locked.
    Approved,
    /// Sent back by an approver.
    Rejected,
}

impl TimesheetStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Submitted => "SUBMITTED",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Parses a status from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "DRAFT" => Some(Self::Draft),
            "SUBMITTED" => Some(Self::Submitted),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true if the entry is locked.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }

    /// Returns true if the week can no longer be submitted.
    #[must_use]
    pub fn blocks_submit(&self) -> bool {
        matches!(self, Self::Submitted | Self::Approved)
    }
}

impl fmt::Display for TimesheetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (user, project, activity, date) record of worked hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimesheetEntry {
    /// Internal id.
    pub id: TimesheetEntryId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Owning user.
    pub user_id: UserId,
    /// Project worked on.
    pub project_id: Option<ProjectId>,
    /// Activity performed.
    pub activity_id: Option<ActivityId>,
    /// Day worked.
    pub entry_date: NaiveDate,
    /// Hours worked, 0 to 24.
    pub hours: Decimal,
    /// Task description.
    pub description: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Approval status.
    pub status: TimesheetStatus,
    /// When the entry was last submitted.
    pub submitted_at: Option<DateTime<Utc>>,
    /// When the entry was approved.
    pub approved_at: Option<DateTime<Utc>>,
    /// Who approved (or rejected) the entry.
    pub approved_by: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Tenant-scoped project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Internal id.
    pub id: ProjectId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Hex colour for the UI.
    pub color: Option<String>,
    /// Inactive projects are hidden from pickers.
    pub is_active: bool,
}

/// Activity, either global (no project) or project-specific.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Internal id.
    pub id: ActivityId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Project the activity is restricted to.
    pub project_id: Option<ProjectId>,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Billable flag.
    pub is_billable: bool,
    /// Optional hourly rate.
    pub hourly_rate: Option<Decimal>,
    /// Inactive activities are hidden from pickers.
    pub is_active: bool,
}

impl Activity {
    /// Returns true if the activity may be booked on `project`.
    #[must_use]
    pub fn applies_to(&self, project: ProjectId) -> bool {
        self.project_id.is_none_or(|p| p == project)
    }
}

/// One row of the weekly grid: a (project, activity) pair with a value per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimesheetRow {
    /// Position in the grid.
    pub row_id: usize,
    /// Selected project.
    pub project_id: Option<ProjectId>,
    /// Selected activity.
    pub activity_id: Option<ActivityId>,
    /// Hours per day, Monday first.
    pub hours: [Decimal; DAYS_IN_WEEK],
    /// Notes per day, Monday first.
    pub comments: [Option<String>; DAYS_IN_WEEK],
    /// Backing entry per day, Monday first.
    #[serde(default)]
    pub entry_ids: [Option<TimesheetEntryId>; DAYS_IN_WEEK],
}

impl TimesheetRow {
    /// Creates a row with no project, activity or hours.
    #[must_use]
    pub fn empty(row_id: usize) -> Self {
        Self {
            row_id,
            project_id: None,
            activity_id: None,
            hours: [Decimal::ZERO; DAYS_IN_WEEK],
            comments: Default::default(),
            entry_ids: [None; DAYS_IN_WEEK],
        }
    }

    /// Creates a row for a (project, activity) pair.
    #[must_use]
    pub fn new(row_id: usize, project_id: ProjectId, activity_id: ActivityId) -> Self {
        Self {
            project_id: Some(project_id),
            activity_id: Some(activity_id),
            ..Self::empty(row_id)
        }
    }

    /// Sets the hours for the given day index (0 = Monday).
    #[must_use]
    pub fn with_hours(mut self, day: usize, hours: Decimal) -> Self {
        if let Some(slot) = self.hours.get_mut(day) {
            *slot = hours;
        }
        self
    }

    /// Sets the note for the given day index (0 = Monday).
    #[must_use]
    pub fn with_comment(mut self, day: usize, comment: impl Into<String>) -> Self {
        if let Some(slot) = self.comments.get_mut(day) {
            *slot = Some(comment.into());
        }
        self
    }

    /// Sum of the row's hours.
    #[must_use]
    pub fn total_hours(&self) -> Decimal {
        self.hours.iter().copied().sum()
    }
}

/// Approval state of a week, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    /// At least one entry approved.
    Approved,
    /// At least one entry rejected, none approved.
    Rejected,
    /// Submitted entries waiting for approval.
    Pending,
}

impl ApprovalStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Pending => "PENDING",
        }
    }
}

/// Reconstructed weekly grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyTimesheet {
    /// Monday of the week.
    pub week_start: NaiveDate,
    /// Sunday of the week.
    pub week_end: NaiveDate,
    /// ISO week number.
    pub week_number: u32,
    /// ISO week-based year.
    pub year: i32,
    /// Grid rows; one empty row when the week has no entries.
    pub rows: Vec<TimesheetRow>,
    /// Hours per day across all rows, Monday first.
    pub day_totals: [Decimal; DAYS_IN_WEEK],
    /// Sum of all hours.
    pub grand_total: Decimal,
    /// True if any entry left DRAFT.
    pub is_submitted: bool,
    /// Display approval state.
    pub approval_status: Option<ApprovalStatus>,
    /// Latest submission time.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Latest approval time.
    pub approved_at: Option<DateTime<Utc>>,
    /// Approver of the latest approval.
    pub approved_by: Option<UserId>,
}

/// Filters for the monthly report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReportFilter {
    /// Any day in the month to report on.
    pub month: NaiveDate,
    /// Restrict to one project.
    pub project_id: Option<ProjectId>,
    /// Restrict to one employee.
    pub employee_id: Option<UserId>,
    /// Case-insensitive match on notes, description, project or activity name.
    pub search: Option<String>,
    /// Restrict to one status.
    pub status: Option<TimesheetStatus>,
}

impl MonthlyReportFilter {
    /// Creates an unfiltered report request for the month containing `month`.
    #[must_use]
    pub fn for_month(month: NaiveDate) -> Self {
        Self {
            month,
            project_id: None,
            employee_id: None,
            search: None,
            status: None,
        }
    }
}

/// One line of the monthly report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReportEntry {
    /// Entry id.
    pub entry_id: TimesheetEntryId,
    /// Day worked.
    pub date: NaiveDate,
    /// Employee.
    pub user_id: UserId,
    /// Hours worked.
    pub hours: Decimal,
    /// Project name, `"No Project"` when unset.
    pub project_name: String,
    /// `"{activity} - {description}"`, falling back to `"No Task"`.
    pub task: String,
    /// Notes.
    pub notes: Option<String>,
    /// Status.
    pub status: TimesheetStatus,
}

/// Aggregated monthly report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReport {
    /// Month name, e.g. `"January"`.
    pub month: String,
    /// Calendar year.
    pub year: i32,
    /// Report lines, newest first.
    pub entries: Vec<MonthlyReportEntry>,
    /// Sum of hours.
    pub total_hours: Decimal,
    /// Number of entries.
    pub total_entries: usize,
    /// Number of approved entries.
    pub approved_entries: usize,
    /// `total_entries - approved_entries`.
    pub pending_approvals: usize,
}

/// One line of a weekly time report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeReportEntry {
    /// Day worked.
    pub date: NaiveDate,
    /// Hours worked.
    pub hours: Decimal,
    /// Project name.
    pub project_name: String,
    /// Activity name.
    pub activity_name: String,
    /// Task description.
    pub task: String,
    /// Notes, empty when unset.
    pub notes: String,
}

/// A new entry produced by save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTimesheetEntry {
    /// Owning user.
    pub user_id: UserId,
    /// Project.
    pub project_id: ProjectId,
    /// Activity.
    pub activity_id: ActivityId,
    /// Day worked.
    pub entry_date: NaiveDate,
    /// Hours.
    pub hours: Decimal,
    /// Notes.
    pub notes: Option<String>,
}

/// A change to an existing entry produced by save. Status always resets to DRAFT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimesheetEntryUpdate {
    /// Entry to change.
    pub id: TimesheetEntryId,
    /// New hours.
    pub hours: Decimal,
    /// New notes.
    pub notes: Option<String>,
}

/// Writes a save applies in one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimesheetChangeset {
    /// Entries to insert.
    pub inserts: Vec<NewTimesheetEntry>,
    /// Entries to update.
    pub updates: Vec<TimesheetEntryUpdate>,
    /// Entries to delete.
    pub deletes: Vec<TimesheetEntryId>,
}

impl TimesheetChangeset {
    /// Returns true if nothing would be written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }
}

/// A conditional bulk status transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTransition {
    /// Candidate entries.
    pub ids: Vec<TimesheetEntryId>,
    /// Only entries currently in one of these statuses change.
    pub from: Vec<TimesheetStatus>,
    /// Target status.
    pub to: TimesheetStatus,
    /// User performing the transition.
    pub actor: UserId,
    /// Transition time.
    pub at: DateTime<Utc>,
}

/// Store-side filter for timesheet queries. Dates are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimesheetFilter {
    /// First day.
    pub date_from: NaiveDate,
    /// Last day.
    pub date_to: NaiveDate,
    /// Restrict to one user.
    pub user_id: Option<UserId>,
    /// Restrict to one project.
    pub project_id: Option<ProjectId>,
    /// Restrict to one status.
    pub status: Option<TimesheetStatus>,
    /// Lower-cased search term.
    pub search: Option<String>,
}

impl TimesheetFilter {
    /// Creates a filter for a date range with no other restriction.
    #[must_use]
    pub fn between(date_from: NaiveDate, date_to: NaiveDate) -> Self {
        Self {
            date_from,
            date_to,
            user_id: None,
            project_id: None,
            status: None,
            search: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            TimesheetStatus::Draft,
            TimesheetStatus::Submitted,
            TimesheetStatus::Approved,
            TimesheetStatus::Rejected,
        ] {
            assert_eq!(TimesheetStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TimesheetStatus::parse("submitted"), Some(TimesheetStatus::Submitted));
        assert_eq!(TimesheetStatus::parse("IN_PROGRESS"), None);
    }

    #[test]
    fn test_status_rules() {
        assert!(TimesheetStatus::Approved.is_approved());
        assert!(TimesheetStatus::Submitted.blocks_submit());
        assert!(TimesheetStatus::Approved.blocks_submit());
        assert!(!TimesheetStatus::Rejected.blocks_submit());
        assert!(!TimesheetStatus::Draft.blocks_submit());
    }

    #[test]
    fn test_row_builders() {
        let row = TimesheetRow::new(0, ProjectId::new(1), ActivityId::new(2))
            .with_hours(0, dec!(7.5))
            .with_hours(4, dec!(4))
            .with_hours(9, dec!(100))
            .with_comment(0, "standup");
        assert_eq!(row.total_hours(), dec!(11.5));
        assert_eq!(row.comments[0].as_deref(), Some("standup"));
        assert!(row.entry_ids.iter().all(Option::is_none));
    }

    #[test]
    fn test_activity_scope() {
        let mut activity = Activity {
            id: ActivityId::new(1),
            tenant_id: TenantId::new(1),
            project_id: None,
            name: "Development".into(),
            description: None,
            is_billable: true,
            hourly_rate: None,
            is_active: true,
        };
        assert!(activity.applies_to(ProjectId::new(5)));
        activity.project_id = Some(ProjectId::new(3));
        assert!(activity.applies_to(ProjectId::new(3)));
        assert!(!activity.applies_to(ProjectId::new(5)));
    }
}
