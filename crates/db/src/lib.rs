//! PostgreSQL persistence for Folio.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - [`SeaStore`], implementing every `folio_core::store` port
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod store;

pub use store::SeaStore;

use folio_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool sized from `config`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);
    Database::connect(options).await
}
