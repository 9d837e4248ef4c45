//! Integration tests for the voucher and posting ports over PostgreSQL.

mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use folio_core::ledger::{
    CreateVoucherCommand, LedgerError, NewPosting, NewVoucher, PostingCommand, UpdateVoucherCommand,
    VoucherLedgerService, VoucherSearch,
};
use folio_core::reports::{DateRange, LedgerAggregationEngine};
use folio_core::store::{PostingFilter, PostingStore, StoreError, VoucherStore};
use folio_db::SeaStore;
use folio_db::entities::vouchers;
use folio_shared::config::LedgerConfig;
use folio_shared::types::{CurrencyCode, PageRequest, TenantId};
use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;

use common::{date, fresh_tenant, seed_chart, store};

fn new_posting(account: &str, amount: Decimal) -> NewPosting {
    NewPosting {
        account_number: account.to_string(),
        amount,
        currency: "NOK".parse::<CurrencyCode>().unwrap(),
        original_amount: None,
        original_currency: None,
        vat_code: None,
        posting_date: date(2025, 5, 2),
        description: None,
        row_number: 0,
    }
}

fn sale(on: NaiveDate, amount: Decimal, description: &str) -> CreateVoucherCommand {
    CreateVoucherCommand {
        date: on,
        description: Some(description.to_string()),
        postings: vec![
            PostingCommand::new("1500", amount, on).with_row_number(1),
            PostingCommand::new("3000", -amount, on)
                .with_row_number(2)
                .with_description("Consulting hours"),
        ],
    }
}

fn ledger(store: &Arc<SeaStore>, retries: u32) -> VoucherLedgerService<SeaStore> {
    VoucherLedgerService::new(
        Arc::clone(store),
        LedgerConfig {
            voucher_number_retries: retries,
            ..LedgerConfig::default()
        },
    )
}

async fn seeded() -> Option<(Arc<SeaStore>, TenantId)> {
    let store = store().await?;
    let tenant = fresh_tenant();
    seed_chart(&store, tenant).await;
    Some((Arc::new(store), tenant))
}

#[tokio::test]
async fn test_insert_and_find_voucher() {
    let Some((store, tenant)) = seeded().await else {
        return;
    };

    let voucher = store
        .insert_voucher(
            tenant,
            NewVoucher {
                number: 1,
                date: date(2025, 5, 2),
                description: Some("Invoice 1001".into()),
            },
            vec![new_posting("1500", dec!(100)), new_posting("3000", dec!(-100))],
        )
        .await
        .unwrap();
    assert_eq!(voucher.display_number(), "1-2025");
    assert_eq!(store.max_voucher_number(tenant, 2025).await.unwrap(), Some(1));
    assert_eq!(store.max_voucher_number(tenant, 2024).await.unwrap(), None);

    let found = store.find_voucher(tenant, voucher.id).await.unwrap().unwrap();
    assert_eq!(found.postings.len(), 2);
    assert_eq!(found.postings[0].amount, dec!(100));
    assert!(store.find_voucher(fresh_tenant(), voucher.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_number_is_conflict_and_rolls_back() {
    let Some((store, tenant)) = seeded().await else {
        return;
    };
    let header = || NewVoucher {
        number: 7,
        date: date(2025, 5, 2),
        description: None,
    };

    store
        .insert_voucher(tenant, header(), vec![new_posting("1500", dec!(1)), new_posting("3000", dec!(-1))])
        .await
        .unwrap();
    let err = store
        .insert_voucher(tenant, header(), vec![new_posting("1500", dec!(5)), new_posting("3000", dec!(-5))])
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    let postings = store.find_postings(tenant, &PostingFilter::all()).await.unwrap();
    assert_eq!(postings.len(), 2);

    // Same number in another year or tenant is fine.
    let other_year = NewVoucher {
        date: date(2026, 1, 2),
        ..header()
    };
    store.insert_voucher(tenant, other_year, Vec::new()).await.unwrap();
    let other_tenant = fresh_tenant();
    store.insert_voucher(other_tenant, header(), Vec::new()).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creation_allocates_distinct_numbers() {
    let Some((store, tenant)) = seeded().await else {
        return;
    };
    let service = Arc::new(ledger(&store, 20));

    let tasks = (0..5).map(|i| {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service
                .create_voucher(tenant, sale(date(2025, 3, 1), Decimal::from(i + 1), "Concurrent"))
                .await
        })
    });
    let mut numbers: Vec<String> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap().number)
        .collect();
    numbers.sort();
    assert_eq!(numbers, ["1-2025", "2-2025", "3-2025", "4-2025", "5-2025"]);
}

#[tokio::test]
async fn test_update_replaces_postings_and_renumbers_across_years() {
    let Some((store, tenant)) = seeded().await else {
        return;
    };
    let service = ledger(&store, 5);
    let first = service
        .create_voucher(tenant, sale(date(2025, 12, 30), dec!(400), "December sale"))
        .await
        .unwrap();
    assert_eq!(first.number, "1-2025");

    let moved = service
        .update_voucher_with_postings(
            tenant,
            UpdateVoucherCommand {
                id: first.id,
                date: date(2026, 1, 2),
                description: Some("Moved to January".into()),
                postings: vec![
                    PostingCommand::new("1920", dec!(250), date(2026, 1, 2)),
                    PostingCommand::new("3000", dec!(-200), date(2026, 1, 2)),
                    PostingCommand::new("2700", dec!(-50), date(2026, 1, 2)).with_vat_code("25"),
                ],
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.id, first.id);
    assert_eq!(moved.number, "1-2026");

    let stored = store.find_voucher(tenant, first.id).await.unwrap().unwrap();
    assert_eq!(stored.postings.len(), 3);
    assert!(stored.postings.iter().all(|p| p.posting_date == date(2026, 1, 2)));
    assert_eq!(store.max_voucher_number(tenant, 2025).await.unwrap(), None);
}

#[tokio::test]
async fn test_empty_voucher_reused() {
    let Some((store, tenant)) = seeded().await else {
        return;
    };
    let service = ledger(&store, 5);
    let empty = service
        .find_or_create_empty_voucher_on(tenant, date(2025, 6, 1))
        .await
        .unwrap();
    let again = service
        .find_or_create_empty_voucher_on(tenant, date(2025, 6, 2))
        .await
        .unwrap();
    assert_eq!(empty.id, again.id);
    assert_eq!(store.find_empty_voucher(tenant).await.unwrap().map(|v| v.id), Some(empty.id));
}

#[tokio::test]
async fn test_search_and_summaries() {
    let Some((store, tenant)) = seeded().await else {
        return;
    };
    let service = ledger(&store, 5);
    for day in 1..=3 {
        service
            .create_voucher(tenant, sale(date(2025, 2, day), dec!(100), "Retainer"))
            .await
            .unwrap();
    }
    service
        .create_voucher(
            tenant,
            CreateVoucherCommand {
                date: date(2025, 2, 10),
                description: Some("Office rent".into()),
                postings: vec![
                    PostingCommand::new("6300", dec!(900), date(2025, 2, 10)),
                    PostingCommand::new("1920", dec!(-900), date(2025, 2, 10)),
                ],
            },
        )
        .await
        .unwrap();

    let page = service
        .search_vouchers(
            tenant,
            &VoucherSearch {
                search: Some("RETAINER".into()),
                ..VoucherSearch::default()
            },
            PageRequest::new(1, 2),
        )
        .await
        .unwrap();
    assert_eq!(page.meta.total, 3);
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].number, "3-2025");

    let by_account = service
        .search_vouchers(
            tenant,
            &VoucherSearch {
                search: Some("6300".into()),
                ..VoucherSearch::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_account.meta.total, 1);

    let by_posting_text = service
        .search_vouchers(
            tenant,
            &VoucherSearch {
                search: Some("consulting".into()),
                date_from: Some(date(2025, 2, 2)),
                date_to: None,
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_posting_text.meta.total, 2);

    let summaries = service
        .find_voucher_summaries_by_date_range(tenant, date(2025, 2, 2), date(2025, 2, 10))
        .await
        .unwrap();
    assert_eq!(summaries.len(), 3);
    assert_eq!(summaries[2].postings[0].account_name.as_deref(), Some("Rent"));
}

#[tokio::test]
async fn test_aggregation_over_postgres() {
    let Some((store, tenant)) = seeded().await else {
        return;
    };
    let service = ledger(&store, 5);
    service
        .create_voucher(tenant, sale(date(2025, 1, 20), dec!(1000), "January"))
        .await
        .unwrap();
    service
        .create_voucher(tenant, sale(date(2025, 2, 20), dec!(500.01), "February"))
        .await
        .unwrap();

    let engine = LedgerAggregationEngine::new(Arc::clone(&store));
    let before = engine
        .account_balance_before(tenant, "1500", date(2025, 2, 1))
        .await
        .unwrap();
    assert_eq!(before, dec!(1000));

    let february = DateRange::month_of(date(2025, 2, 14));
    assert_eq!(engine.account_movement(tenant, "1500", february).await.unwrap(), dec!(500.01));

    let rows = engine
        .general_ledger_summary(tenant, february, Some("1500"))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].opening_balance, dec!(1000));
    assert_eq!(rows[0].closing_balance, dec!(1500.01));

    let nothing = engine
        .account_movement(tenant, "6300", february)
        .await
        .unwrap();
    assert_eq!(nothing, Decimal::ZERO);
}

#[tokio::test]
async fn test_voucher_with_postings_cannot_be_deleted() {
    let Some((store, tenant)) = seeded().await else {
        return;
    };
    let header = ledger(&store, 5)
        .create_voucher(tenant, sale(date(2025, 8, 4), dec!(250), "Kept"))
        .await
        .unwrap();

    let result = vouchers::Entity::delete_by_id(header.id.into_inner())
        .exec(store.connection())
        .await;
    assert!(result.is_err());

    let found = store.find_voucher(tenant, header.id).await.unwrap().unwrap();
    assert_eq!(found.postings.len(), 2);
}

#[tokio::test]
async fn test_sub_cent_amount_is_rejected_before_insert() {
    let Some((store, tenant)) = seeded().await else {
        return;
    };
    let err = ledger(&store, 5)
        .create_voucher(tenant, sale(date(2025, 8, 5), dec!(500.005), "Sub-cent"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidAmountPrecision(a) if a == dec!(500.005)));

    let postings = store.find_postings(tenant, &PostingFilter::all()).await.unwrap();
    assert!(postings.is_empty());
}
