//! Demo data seeder for Folio development and testing.
//!
//! Migrates the database, then loads a chart of accounts, VAT codes,
//! projects and activities for the demo tenant together with a few vouchers
//! and a draft timesheet week. Running it twice leaves existing data alone.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::Context;
use chrono::{Datelike, NaiveDate, Utc};
use folio_core::ledger::{CreateVoucherCommand, PostingCommand, VatCode, VoucherLedgerService};
use folio_core::store::{ProjectDirectory, VoucherStore};
use folio_core::timesheet::{TimesheetRow, TimesheetWorkflow};
use folio_db::SeaStore;
use folio_db::migration::{Migrator, MigratorTrait};
use folio_shared::AppConfig;
use folio_shared::config::LedgerConfig;
use folio_shared::types::{RequestContext, TenantId, UserId};
use rust_decimal_macros::dec;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Tenant that owns all demo data.
const DEMO_TENANT: TenantId = TenantId::new(1);
/// Employee whose timesheet is seeded.
const DEMO_USER: UserId = UserId::new(1);

const ACCOUNTS: [(&str, &str); 10] = [
    ("1500", "Accounts receivable"),
    ("1920", "Bank deposits"),
    ("2000", "Share capital"),
    ("2400", "Accounts payable"),
    ("2700", "Output VAT"),
    ("2710", "Input VAT"),
    ("3000", "Sales revenue"),
    ("4000", "Purchases"),
    ("6300", "Rent"),
    ("6800", "Office supplies"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = folio_db::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    Migrator::up(&db, None).await.context("Failed to run migrations")?;
    info!("Database migrated");

    let store = Arc::new(SeaStore::new(db));
    seed_chart(&store).await?;
    seed_vouchers(&store, &config.ledger).await?;
    seed_timesheet(&store).await?;

    info!(tenant_id = %DEMO_TENANT, "Seeding complete");
    Ok(())
}

/// Accounts and VAT codes. Both writes are idempotent.
async fn seed_chart(store: &SeaStore) -> anyhow::Result<()> {
    for (number, name) in ACCOUNTS {
        store.add_account(DEMO_TENANT, number, name).await?;
    }
    for (code, rate, description) in [
        ("0", dec!(0), "No VAT"),
        ("3", dec!(25), "Output VAT, standard rate"),
        ("31", dec!(15), "Output VAT, food"),
        ("1", dec!(25), "Input VAT, standard rate"),
    ] {
        store
            .add_vat_code(
                DEMO_TENANT,
                VatCode {
                    code: code.to_string(),
                    rate,
                    description: Some(description.to_string()),
                },
            )
            .await?;
    }
    info!(accounts = ACCOUNTS.len(), "Seeded chart of accounts");
    Ok(())
}

async fn seed_vouchers(
    store: &Arc<SeaStore>,
    ledger: &LedgerConfig,
) -> anyhow::Result<()> {
    let year = Utc::now().year();
    if store.max_voucher_number(DEMO_TENANT, year).await?.is_some() {
        info!(year, "Vouchers already present, skipping");
        return Ok(());
    }

    let service = VoucherLedgerService::new(Arc::clone(store), ledger.clone());
    let day = |m, d| NaiveDate::from_ymd_opt(year, m, d).context("invalid demo date");

    let capital = day(1, 2)?;
    service
        .create_voucher(
            DEMO_TENANT,
            CreateVoucherCommand {
                date: capital,
                description: Some("Share capital deposit".into()),
                postings: vec![
                    PostingCommand::new("1920", dec!(30000), capital),
                    PostingCommand::new("2000", dec!(-30000), capital),
                ],
            },
        )
        .await?;

    let invoice = day(1, 15)?;
    service
        .create_voucher(
            DEMO_TENANT,
            CreateVoucherCommand {
                date: invoice,
                description: Some("Invoice 1001".into()),
                postings: vec![
                    PostingCommand::new("1500", dec!(12500), invoice).with_row_number(1),
                    PostingCommand::new("3000", dec!(-10000), invoice)
                        .with_row_number(2)
                        .with_vat_code("3")
                        .with_description("Consulting, January"),
                    PostingCommand::new("2700", dec!(-2500), invoice).with_row_number(3),
                ],
            },
        )
        .await?;

    let rent = day(2, 1)?;
    service
        .create_voucher(
            DEMO_TENANT,
            CreateVoucherCommand {
                date: rent,
                description: Some("Office rent February".into()),
                postings: vec![
                    PostingCommand::new("6300", dec!(8000), rent),
                    PostingCommand::new("1920", dec!(-8000), rent),
                ],
            },
        )
        .await?;

    info!(year, vouchers = 3, "Seeded vouchers");
    Ok(())
}

/// Projects, activities and one draft week for the demo employee.
async fn seed_timesheet(store: &Arc<SeaStore>) -> anyhow::Result<()> {
    if !store.active_projects(DEMO_TENANT).await?.is_empty() {
        info!("Projects already present, skipping timesheet data");
        return Ok(());
    }

    let internal = store.add_project(DEMO_TENANT, "Internal").await?;
    let website = store.add_project(DEMO_TENANT, "Website relaunch").await?;
    let development = store.add_activity(DEMO_TENANT, None, "Development").await?;
    let meetings = store.add_activity(DEMO_TENANT, None, "Meetings").await?;
    let design = store
        .add_activity(DEMO_TENANT, Some(website.id), "Design")
        .await?;

    let workflow = TimesheetWorkflow::new(Arc::clone(store));
    let ctx = RequestContext::new(DEMO_TENANT, DEMO_USER);
    let rows = vec![
        TimesheetRow::new(0, website.id, design.id)
            .with_hours(0, dec!(6))
            .with_hours(1, dec!(7.5))
            .with_comment(0, "Landing page mockups"),
        TimesheetRow::new(1, website.id, development.id)
            .with_hours(2, dec!(8))
            .with_hours(3, dec!(8)),
        TimesheetRow::new(2, internal.id, meetings.id)
            .with_hours(0, dec!(1.5))
            .with_hours(4, dec!(2)),
    ];
    let week = workflow
        .save_weekly_timesheet(&ctx, Utc::now().date_naive(), &rows)
        .await?;

    info!(
        week_start = %week.week_start,
        hours = %week.grand_total,
        "Seeded draft timesheet week"
    );
    Ok(())
}
