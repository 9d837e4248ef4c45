//! Schema migration runner for Folio.
//!
//! Reads `DATABASE_URL` (a `.env` file is honoured) and accepts the standard
//! sea-orm-migration subcommands:
//!   migrator up       apply pending migrations
//!   migrator down     roll back the last migration
//!   migrator status   list applied and pending migrations
//!   migrator fresh    drop everything and migrate from scratch

use folio_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // The CLI installs its own subscriber.
    cli::run_cli(Migrator).await;
}
