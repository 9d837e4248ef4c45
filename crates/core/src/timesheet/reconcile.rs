//! Weekly save: row validation and the reconciliation plan.
//!
//! A save replaces the user's week. Each (project, activity, day) cell of the
//! submitted grid is matched against the existing entry with the same key:
//! matched entries are updated when anything differs, unmatched cells become
//! new entries, and existing entries with no cell are deleted.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use folio_shared::types::{ActivityId, ProjectId, UserId, exceeds_scale};
use rust_decimal::Decimal;

use super::error::TimesheetError;
use super::types::{
    HOURS_SCALE, MAX_HOURS_PER_DAY, NewTimesheetEntry, TimesheetChangeset, TimesheetEntry, TimesheetEntryUpdate,
    TimesheetRow, TimesheetStatus,
};
use super::week;

type CellKey = (Option<ProjectId>, Option<ActivityId>, NaiveDate);

/// Rejects the save if any existing entry of the week is approved.
///
/// # Errors
///
/// Returns `ApprovedTimesheetModification` naming the locked entry.
pub fn ensure_unlocked(existing: &[TimesheetEntry]) -> Result<(), TimesheetError> {
    match existing.iter().find(|e| e.status.is_approved()) {
        Some(entry) => Err(TimesheetError::ApprovedTimesheetModification(format!(
            "entry {} on {} is approved",
            entry.id, entry.entry_date
        ))),
        None => Ok(()),
    }
}

/// Validates submitted rows and returns their (project, activity) pairs.
///
/// Checks, each across all rows before the next: project and activity are
/// selected, hours lie in `0..=24` with at most two decimals, and no pair
/// repeats.
///
/// # Errors
///
/// Returns the first violation found.
pub fn validate_rows(rows: &[TimesheetRow]) -> Result<Vec<(ProjectId, ActivityId)>, TimesheetError> {
    let pairs = rows
        .iter()
        .map(|row| match (row.project_id, row.activity_id) {
            (Some(project), Some(activity)) => Ok((project, activity)),
            _ => Err(TimesheetError::MissingProjectOrActivitySelection { row: row.row_id }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(hours) = rows
        .iter()
        .flat_map(|row| row.hours.iter())
        .find(|h| **h < Decimal::ZERO || **h > MAX_HOURS_PER_DAY)
    {
        return Err(TimesheetError::HoursOutOfRange(*hours));
    }
    if let Some(hours) = rows
        .iter()
        .flat_map(|row| row.hours.iter())
        .find(|h| exceeds_scale(**h, HOURS_SCALE))
    {
        return Err(TimesheetError::HoursPrecision(*hours));
    }

    let mut seen = HashSet::with_capacity(pairs.len());
    for &(project, activity) in &pairs {
        if !seen.insert((project, activity)) {
            return Err(TimesheetError::DuplicateProjectActivityRow { project, activity });
        }
    }

    Ok(pairs)
}

/// Computes the writes that turn `existing` into the submitted grid.
///
/// `rows` must already have passed [`validate_rows`].
#[must_use]
pub fn plan_save(
    user: UserId,
    monday: NaiveDate,
    rows: &[TimesheetRow],
    existing: &[TimesheetEntry],
) -> TimesheetChangeset {
    let mut changes = TimesheetChangeset::default();
    let mut by_key: HashMap<CellKey, &TimesheetEntry> = HashMap::with_capacity(existing.len());
    for entry in existing {
        let key = (entry.project_id, entry.activity_id, entry.entry_date);
        if by_key.contains_key(&key) {
            // Only one entry per key survives a save.
            changes.deletes.push(entry.id);
        } else {
            by_key.insert(key, entry);
        }
    }

    let mut visited: HashSet<CellKey> = HashSet::new();
    for row in rows {
        let (Some(project_id), Some(activity_id)) = (row.project_id, row.activity_id) else {
            continue;
        };
        for (day, date) in week::days(monday).into_iter().enumerate() {
            let key = (Some(project_id), Some(activity_id), date);
            visited.insert(key);
            let hours = row.hours[day];
            let notes = row.comments[day].clone();

            match by_key.get(&key) {
                Some(entry) => {
                    if needs_update(entry, hours, notes.as_deref()) {
                        changes.updates.push(TimesheetEntryUpdate {
                            id: entry.id,
                            hours,
                            notes,
                        });
                    }
                }
                None => changes.inserts.push(NewTimesheetEntry {
                    user_id: user,
                    project_id,
                    activity_id,
                    entry_date: date,
                    hours,
                    notes,
                }),
            }
        }
    }

    changes.deletes.extend(
        by_key
            .iter()
            .filter(|(key, _)| !visited.contains(*key))
            .map(|(_, entry)| entry.id),
    );
    changes.deletes.sort_unstable();
    changes
}

fn needs_update(entry: &TimesheetEntry, hours: Decimal, notes: Option<&str>) -> bool {
    entry.hours != hours || entry.notes.as_deref() != notes || entry.status != TimesheetStatus::Draft
}
