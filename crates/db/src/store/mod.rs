//! `SeaORM` implementation of the core store ports.
//!
//! Every query filters on `tenant_id`. Multi-row writes run in one
//! `DatabaseTransaction`; uniqueness violations surface as
//! [`StoreError::Conflict`] so the core can retry.

mod convert;
mod ledger;
mod reference;
mod timesheet;

use folio_core::store::StoreError;
use sea_orm::{DatabaseConnection, DbErr, SqlErr};

/// Store adapter over a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct SeaStore {
    db: DatabaseConnection,
}

impl SeaStore {
    /// Creates a store over an open connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Maps a driver error onto the port error type.
pub(crate) fn store_err(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => StoreError::Conflict(detail),
        _ => StoreError::Database(err.to_string()),
    }
}
