//! Property-based tests for weekly save reconciliation.

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use folio_shared::types::{ActivityId, ProjectId, TenantId, TimesheetEntryId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::reconcile::{plan_save, validate_rows};
use super::types::{DAYS_IN_WEEK, TimesheetChangeset, TimesheetEntry, TimesheetRow, TimesheetStatus};
use super::week;

const USER: UserId = UserId::new(7);

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
}

/// Hours in quarter-hour steps from 0 to 24.
fn hours() -> impl Strategy<Value = Decimal> {
    (0i64..=96).prop_map(|quarters| Decimal::new(quarters * 25, 2))
}

/// Rows with distinct (project, activity) pairs drawn from a small grid.
fn rows() -> impl Strategy<Value = Vec<TimesheetRow>> {
    prop::collection::vec(
        ((1i64..4, 1i64..4), prop::array::uniform7(hours())),
        0..6,
    )
    .prop_map(|cells| {
        let mut seen = HashSet::new();
        cells
            .into_iter()
            .filter(|(pair, _)| seen.insert(*pair))
            .enumerate()
            .map(|(id, ((project, activity), hours))| TimesheetRow {
                hours,
                ..TimesheetRow::new(id, ProjectId::new(project), ActivityId::new(activity))
            })
            .collect()
    })
}

/// Applies a plan to an entry list the way a store would.
fn apply(existing: &[TimesheetEntry], plan: &TimesheetChangeset) -> Vec<TimesheetEntry> {
    let now = Utc::now();
    let mut next_id = existing.iter().map(|e| e.id.into_inner()).max().unwrap_or(0);
    let mut entries: Vec<TimesheetEntry> = existing
        .iter()
        .filter(|e| !plan.deletes.contains(&e.id))
        .cloned()
        .collect();
    for update in &plan.updates {
        let entry = entries.iter_mut().find(|e| e.id == update.id).unwrap();
        entry.hours = update.hours;
        entry.notes.clone_from(&update.notes);
        entry.status = TimesheetStatus::Draft;
    }
    for insert in &plan.inserts {
        next_id += 1;
        entries.push(TimesheetEntry {
            id: TimesheetEntryId::new(next_id),
            tenant_id: TenantId::new(1),
            user_id: insert.user_id,
            project_id: Some(insert.project_id),
            activity_id: Some(insert.activity_id),
            entry_date: insert.entry_date,
            hours: insert.hours,
            description: None,
            notes: insert.notes.clone(),
            status: TimesheetStatus::Draft,
            submitted_at: None,
            approved_at: None,
            approved_by: None,
            created_at: now,
            updated_at: now,
        });
    }
    entries
}

proptest! {
    #[test]
    fn prop_generated_rows_are_valid(rows in rows()) {
        let pairs = validate_rows(&rows).unwrap();
        prop_assert_eq!(pairs.len(), rows.len());
    }

    #[test]
    fn prop_saved_week_matches_grid(first in rows(), second in rows()) {
        let initial = apply(&[], &plan_save(USER, monday(), &first, &[]));
        let plan = plan_save(USER, monday(), &second, &initial);
        let saved = apply(&initial, &plan);

        prop_assert_eq!(saved.len(), second.len() * DAYS_IN_WEEK);
        for row in &second {
            for (day, date) in week::days(monday()).into_iter().enumerate() {
                let cell: Vec<&TimesheetEntry> = saved
                    .iter()
                    .filter(|e| {
                        e.project_id == row.project_id
                            && e.activity_id == row.activity_id
                            && e.entry_date == date
                    })
                    .collect();
                prop_assert_eq!(cell.len(), 1);
                prop_assert_eq!(cell[0].hours, row.hours[day]);
            }
        }
    }

    #[test]
    fn prop_resave_is_noop(rows in rows()) {
        let saved = apply(&[], &plan_save(USER, monday(), &rows, &[]));
        prop_assert!(plan_save(USER, monday(), &rows, &saved).is_empty());
    }

    #[test]
    fn prop_deletes_only_existing_entries(first in rows(), second in rows()) {
        let initial = apply(&[], &plan_save(USER, monday(), &first, &[]));
        let plan = plan_save(USER, monday(), &second, &initial);
        let known: HashSet<TimesheetEntryId> = initial.iter().map(|e| e.id).collect();
        prop_assert!(plan.deletes.iter().all(|id| known.contains(id)));
        prop_assert!(plan.updates.iter().all(|u| known.contains(&u.id)));
    }
}
