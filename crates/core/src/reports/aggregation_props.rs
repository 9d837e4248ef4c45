//! Property-based tests for posting aggregation.

use chrono::{NaiveDate, Utc};
use folio_shared::types::{PostingId, TenantId, VoucherId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::aggregation::{balance_before, general_ledger, movement_in, type_total, type_totals};
use super::types::DateRange;
use crate::ledger::{AccountType, Posting};

const ACCOUNTS: [&str; 7] = ["1500", "1920", "2000", "2400", "3000", "6300", "8050"];

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn postings() -> impl Strategy<Value = Vec<Posting>> {
    prop::collection::vec(
        (
            prop::sample::select(&ACCOUNTS[..]),
            (-1_000_000i64..1_000_000i64).prop_filter("non-zero", |c| *c != 0),
            0u64..365,
        ),
        0..40,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (account, cents, day))| {
                let id = i64::try_from(i).unwrap() + 1;
                Posting {
                    id: PostingId::new(id),
                    tenant_id: TenantId::new(1),
                    voucher_id: Some(VoucherId::new(id)),
                    account_number: account.to_string(),
                    amount: Decimal::new(cents, 2),
                    currency: "NOK".parse().unwrap(),
                    original_amount: None,
                    original_currency: None,
                    vat_code: None,
                    posting_date: base() + chrono::Days::new(day),
                    description: None,
                    row_number: 1,
                    created_at: Utc::now(),
                }
            })
            .collect()
    })
}

fn range() -> impl Strategy<Value = DateRange> {
    (0u64..365, 0u64..120).prop_map(|(start, len)| {
        let start = base() + chrono::Days::new(start);
        DateRange {
            start,
            end: start + chrono::Days::new(len),
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Opening balance plus movement equals everything posted up to the range end.
    #[test]
    fn prop_opening_plus_movement_is_closing(postings in postings(), range in range()) {
        for account in ACCOUNTS {
            let closing: Decimal = postings
                .iter()
                .filter(|p| p.account_number == account && p.posting_date <= range.end)
                .map(|p| p.amount)
                .sum();
            let opening = balance_before(&postings, account, range.start);
            let movement = movement_in(&postings, account, &range);
            prop_assert_eq!(opening + movement, closing);
        }
    }

    /// The general ledger agrees with the per-account queries and never
    /// reports an idle account.
    #[test]
    fn prop_general_ledger_matches_account_queries(postings in postings(), range in range()) {
        for row in general_ledger(&postings, &range, None) {
            prop_assert!(!row.opening_balance.is_zero() || !row.period_movement.is_zero());
            prop_assert_eq!(
                row.opening_balance,
                balance_before(&postings, &row.account_number, range.start)
            );
            prop_assert_eq!(
                row.period_movement,
                movement_in(&postings, &row.account_number, &range)
            );
        }
    }

    /// Reportable type totals plus the unclassified remainder add up to the
    /// sum of all postings in range.
    #[test]
    fn prop_type_totals_partition_range(postings in postings(), range in range()) {
        let totals = type_totals(&postings, &range);
        let classified: Decimal = totals.values().copied().sum();
        let other = type_total(&postings, AccountType::Other, &range);
        let all: Decimal = postings
            .iter()
            .filter(|p| range.contains(p.posting_date))
            .map(|p| p.amount)
            .sum();
        prop_assert_eq!(classified + other, all);
    }
}
