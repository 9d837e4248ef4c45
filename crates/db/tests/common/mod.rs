//! Shared setup for database integration tests.
//!
//! Tests run against `DATABASE_URL` and return early when it is unset. Each
//! test works in its own fresh tenant so runs never see each other's rows.

#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{NaiveDate, Utc};
use folio_core::ledger::VatCode;
use folio_db::SeaStore;
use folio_db::migration::{Migrator, MigratorTrait};
use folio_shared::types::TenantId;
use rust_decimal_macros::dec;
use sea_orm::Database;
use tokio::sync::OnceCell;

static MIGRATED: OnceCell<()> = OnceCell::const_new();
static NEXT_TENANT: AtomicI64 = AtomicI64::new(0);

/// Connects and migrates, or returns `None` when no database is configured.
pub async fn store() -> Option<SeaStore> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping");
        return None;
    };
    MIGRATED
        .get_or_init(|| async {
            let db = Database::connect(&url).await.expect("Failed to connect to database");
            Migrator::up(&db, None).await.expect("Failed to run migrations");
        })
        .await;
    let db = Database::connect(&url).await.expect("Failed to connect to database");
    Some(SeaStore::new(db))
}

/// A tenant id no other test or earlier run has used.
pub fn fresh_tenant() -> TenantId {
    let seq = NEXT_TENANT.fetch_add(1, Ordering::Relaxed) % 1000;
    TenantId::new(Utc::now().timestamp_micros() * 1000 + seq)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Loads a small chart of accounts and one VAT code.
pub async fn seed_chart(store: &SeaStore, tenant: TenantId) {
    for (number, name) in [
        ("1500", "Accounts receivable"),
        ("1920", "Bank deposits"),
        ("2000", "Share capital"),
        ("2700", "Output VAT"),
        ("3000", "Sales revenue"),
        ("6300", "Rent"),
    ] {
        store.add_account(tenant, number, name).await.unwrap();
    }
    store
        .add_vat_code(
            tenant,
            VatCode {
                code: "25".into(),
                rate: dec!(25),
                description: Some("Standard rate".into()),
            },
        )
        .await
        .unwrap();
}
