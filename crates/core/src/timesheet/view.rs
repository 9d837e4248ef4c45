//! Read models: the weekly grid, the monthly report and time reports.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use folio_shared::types::{ActivityId, ProjectId};
use rust_decimal::Decimal;

use super::types::{
    ApprovalStatus, DAYS_IN_WEEK, MonthlyReport, MonthlyReportEntry, TimeReportEntry,
    TimesheetEntry, TimesheetRow, TimesheetStatus, WeeklyTimesheet,
};
use super::week;

/// Builds the weekly grid for the week starting `monday` from its entries.
///
/// Entries are grouped into one row per (project, activity), rows ordered by
/// the earliest creation time in each group. A week with no entries gets a
/// single empty row.
#[must_use]
pub fn build_week(monday: NaiveDate, entries: &[TimesheetEntry]) -> WeeklyTimesheet {
    let mut groups: Vec<((Option<ProjectId>, Option<ActivityId>), Vec<&TimesheetEntry>)> = Vec::new();
    for entry in entries {
        let key = (entry.project_id, entry.activity_id);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(entry),
            None => groups.push((key, vec![entry])),
        }
    }
    groups.sort_by_key(|(_, members)| {
        members
            .iter()
            .map(|e| (e.created_at, e.id))
            .min()
    });

    let days = week::days(monday);
    let mut rows: Vec<TimesheetRow> = groups
        .into_iter()
        .enumerate()
        .map(|(row_id, ((project_id, activity_id), members))| {
            let mut row = TimesheetRow {
                project_id,
                activity_id,
                ..TimesheetRow::empty(row_id)
            };
            for (day, date) in days.iter().enumerate() {
                if let Some(entry) = members.iter().find(|e| e.entry_date == *date) {
                    row.hours[day] = entry.hours;
                    row.comments[day].clone_from(&entry.notes);
                    row.entry_ids[day] = Some(entry.id);
                }
            }
            row
        })
        .collect();
    if rows.is_empty() {
        rows.push(TimesheetRow::empty(0));
    }

    let mut day_totals = [Decimal::ZERO; DAYS_IN_WEEK];
    for row in &rows {
        for (total, hours) in day_totals.iter_mut().zip(row.hours) {
            *total += hours;
        }
    }
    let iso = monday.iso_week();
    let latest_approval = entries
        .iter()
        .filter(|e| e.status == TimesheetStatus::Approved)
        .max_by_key(|e| e.approved_at);

    WeeklyTimesheet {
        week_start: monday,
        week_end: week::week_end(monday),
        week_number: iso.week(),
        year: iso.year(),
        rows,
        grand_total: day_totals.iter().copied().sum(),
        day_totals,
        is_submitted: entries.iter().any(|e| e.status != TimesheetStatus::Draft),
        approval_status: approval_status(entries),
        submitted_at: entries.iter().filter_map(|e| e.submitted_at).max(),
        approved_at: latest_approval.and_then(|e| e.approved_at),
        approved_by: latest_approval.and_then(|e| e.approved_by),
    }
}

/// Display status of a week: approved beats rejected beats submitted.
#[must_use]
pub fn approval_status(entries: &[TimesheetEntry]) -> Option<ApprovalStatus> {
    let has = |status| entries.iter().any(|e| e.status == status);
    if has(TimesheetStatus::Approved) {
        Some(ApprovalStatus::Approved)
    } else if has(TimesheetStatus::Rejected) {
        Some(ApprovalStatus::Rejected)
    } else if has(TimesheetStatus::Submitted) {
        Some(ApprovalStatus::Pending)
    } else {
        None
    }
}

/// `"{activity} - {description}"`, or whichever part is present.
#[must_use]
pub fn task_description(activity: Option<&str>, description: Option<&str>) -> Option<String> {
    match (activity, description) {
        (Some(activity), Some(description)) => Some(format!("{activity} - {description}")),
        (Some(activity), None) => Some(activity.to_string()),
        (None, Some(description)) => Some(description.to_string()),
        (None, None) => None,
    }
}

/// Names used to label entries in reports.
#[derive(Debug, Default)]
pub struct Labels {
    /// Project names by id.
    pub projects: HashMap<ProjectId, String>,
    /// Activity names by id.
    pub activities: HashMap<ActivityId, String>,
}

impl Labels {
    fn project(&self, id: Option<ProjectId>) -> Option<&str> {
        id.and_then(|id| self.projects.get(&id)).map(String::as_str)
    }

    fn activity(&self, id: Option<ActivityId>) -> Option<&str> {
        id.and_then(|id| self.activities.get(&id)).map(String::as_str)
    }
}

/// Aggregates entries (already filtered and ordered) into the monthly report.
#[must_use]
pub fn build_monthly_report(month: NaiveDate, entries: &[TimesheetEntry], labels: &Labels) -> MonthlyReport {
    let lines: Vec<MonthlyReportEntry> = entries
        .iter()
        .map(|e| MonthlyReportEntry {
            entry_id: e.id,
            date: e.entry_date,
            user_id: e.user_id,
            hours: e.hours,
            project_name: labels.project(e.project_id).unwrap_or("No Project").to_string(),
            task: task_description(labels.activity(e.activity_id), e.description.as_deref())
                .unwrap_or_else(|| "No Task".to_string()),
            notes: e.notes.clone(),
            status: e.status,
        })
        .collect();
    let approved_entries = entries.iter().filter(|e| e.status.is_approved()).count();

    MonthlyReport {
        month: month.format("%B").to_string(),
        year: month.year(),
        total_hours: entries.iter().map(|e| e.hours).sum(),
        total_entries: lines.len(),
        approved_entries,
        pending_approvals: lines.len() - approved_entries,
        entries: lines,
    }
}

/// Time report lines for entries with hours, ordered by date.
#[must_use]
pub fn build_time_report(entries: &[TimesheetEntry], labels: &Labels) -> Vec<TimeReportEntry> {
    let mut lines: Vec<TimeReportEntry> = entries
        .iter()
        .filter(|e| e.hours > Decimal::ZERO)
        .map(|e| {
            let activity = labels.activity(e.activity_id);
            TimeReportEntry {
                date: e.entry_date,
                hours: e.hours,
                project_name: labels
                    .project(e.project_id)
                    .unwrap_or("Unknown Project")
                    .to_string(),
                activity_name: activity.unwrap_or("Unknown Activity").to_string(),
                task: task_description(activity, e.description.as_deref())
                    .unwrap_or_else(|| "No Task".to_string()),
                notes: e.notes.clone().unwrap_or_default(),
            }
        })
        .collect();
    lines.sort_by_key(|l| l.date);
    lines
}
