//! Property-based tests for VoucherLedgerService.
//!
//! - Voucher numbers run 1, 2, 3, ... per year in creation order
//! - Only non-zero postings are persisted, and they sum to zero

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use tokio::runtime::Runtime;

use super::service::VoucherLedgerService;
use super::types::{CreateVoucherCommand, PostingCommand};
use crate::test_support::{TENANT, ledger_config, seeded_store};

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn voucher_date() -> impl Strategy<Value = NaiveDate> {
    (2024i32..=2026, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn cents() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|c| Decimal::new(c, 2))
}

/// A debit leg per amount against 1500, one credit against 3000, and `zeros`
/// zero-amount legs against 2400.
fn sale(on: NaiveDate, amounts: &[Decimal], zeros: usize) -> CreateVoucherCommand {
    let total: Decimal = amounts.iter().copied().sum();
    let mut postings: Vec<PostingCommand> = amounts
        .iter()
        .map(|amount| PostingCommand::new("1500", *amount, on))
        .collect();
    postings.push(PostingCommand::new("3000", -total, on));
    postings.extend((0..zeros).map(|_| PostingCommand::new("2400", Decimal::ZERO, on)));
    CreateVoucherCommand {
        date: on,
        description: None,
        postings,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_numbers_are_sequential_per_year(dates in prop::collection::vec(voucher_date(), 1..20)) {
        let rt = runtime();
        let numbers = rt.block_on(async {
            let store = seeded_store().await;
            let service = VoucherLedgerService::new(Arc::clone(&store), ledger_config());
            let mut numbers = Vec::new();
            for on in &dates {
                let header = service
                    .create_voucher(TENANT, sale(*on, &[Decimal::ONE_HUNDRED], 0))
                    .await
                    .unwrap();
                numbers.push(header.number);
            }
            numbers
        });

        let mut seen: HashMap<i32, u32> = HashMap::new();
        for (on, number) in dates.iter().zip(&numbers) {
            let next = seen.entry(on.year()).or_insert(0);
            *next += 1;
            prop_assert_eq!(number, &format!("{}-{}", next, on.year()));
        }
    }

    #[test]
    fn prop_only_non_zero_postings_persisted(
        amounts in prop::collection::vec(cents(), 1..6),
        zeros in 0usize..4,
    ) {
        let rt = runtime();
        let (persisted, stored_total) = rt.block_on(async {
            let store = seeded_store().await;
            let service = VoucherLedgerService::new(Arc::clone(&store), ledger_config());
            let on = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();
            let header = service
                .create_voucher(TENANT, sale(on, &amounts, zeros))
                .await
                .unwrap();
            let voucher = service.find_voucher(TENANT, header.id).await.unwrap();
            let total: Decimal = voucher.postings.iter().map(|p| p.amount).sum();
            prop_assert!(voucher.postings.iter().all(|p| !p.amount.is_zero()));
            Ok((voucher.postings.len(), total))
        })?;

        prop_assert_eq!(persisted, amounts.len() + 1);
        prop_assert_eq!(stored_total, Decimal::ZERO);
    }
}
