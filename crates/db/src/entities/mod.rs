//! `SeaORM` entity definitions.

pub mod accounts;
pub mod activities;
pub mod postings;
pub mod projects;
pub mod sea_orm_active_enums;
pub mod timesheet_entries;
pub mod vat_codes;
pub mod vouchers;
