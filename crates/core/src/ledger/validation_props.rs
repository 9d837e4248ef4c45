//! Property-based tests for posting validation.

use chrono::NaiveDate;
use folio_shared::types::CurrencyCode;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::PostingCommand;
use super::validation::PostingValidator;

const ACCOUNTS: [&str; 5] = ["1500", "1920", "2400", "3000", "6300"];

/// Non-zero amounts from 0.01 to 1,000,000.00, either sign.
fn non_zero_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64, any::<bool>())
        .prop_map(|(cents, negative)| Decimal::new(if negative { -cents } else { cents }, 2))
}

fn account() -> impl Strategy<Value = &'static str> {
    prop::sample::select(&ACCOUNTS[..])
}

fn posting(account: &str, amount: Decimal) -> PostingCommand {
    let on = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    PostingCommand::new(account, amount, on)
}

/// Postings whose amounts sum to zero: `legs` free amounts plus a balancing leg,
/// interleaved with `zeros` zero-amount postings.
fn balanced_set() -> impl Strategy<Value = Vec<PostingCommand>> {
    (
        prop::collection::vec((account(), non_zero_amount()), 1..8),
        account(),
        0usize..3,
    )
        .prop_filter_map("balancing leg must be non-zero", |(legs, last, zeros)| {
            let total: Decimal = legs.iter().map(|(_, a)| *a).sum();
            if total.is_zero() {
                return None;
            }
            let mut postings: Vec<PostingCommand> =
                legs.iter().map(|(acct, amount)| posting(acct, *amount)).collect();
            postings.push(posting(last, -total));
            for i in 0..zeros {
                postings.insert(i % postings.len(), posting("2400", Decimal::ZERO));
            }
            Some(postings)
        })
}

fn known(account: &str) -> bool {
    ACCOUNTS.contains(&account)
}

fn no_vat(_: &str) -> bool {
    false
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any zero-sum set with at least two non-zero legs is accepted.
    #[test]
    fn prop_balanced_sets_accepted(postings in balanced_set()) {
        prop_assert!(PostingValidator::validate(&postings, known, no_vat).is_ok());
    }

    /// Resolution keeps exactly the non-zero postings, in order.
    #[test]
    fn prop_resolve_keeps_non_zero_postings(postings in balanced_set()) {
        let nok: CurrencyCode = "NOK".parse().map_err(|_| TestCaseError::fail("currency"))?;
        let resolved = PostingValidator::validate_and_resolve(&postings, &nok, known, no_vat)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        let expected: Vec<Decimal> = postings
            .iter()
            .map(|p| p.amount)
            .filter(|a| !a.is_zero())
            .collect();
        let actual: Vec<Decimal> = resolved.iter().map(|p| p.amount).collect();
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(resolved.iter().map(|p| p.amount).sum::<Decimal>(), Decimal::ZERO);
    }

    /// A single non-zero leg is rejected no matter how many zero legs accompany it.
    #[test]
    fn prop_single_leg_rejected(amount in non_zero_amount(), zeros in 0usize..5) {
        let mut postings = vec![posting("1500", amount)];
        postings.extend((0..zeros).map(|_| posting("3000", Decimal::ZERO)));
        prop_assert!(matches!(
            PostingValidator::validate(&postings, known, no_vat),
            Err(LedgerError::InsufficientPostings)
        ));
    }

    /// Skewing one leg of a balanced set is reported with the exact imbalance.
    #[test]
    fn prop_unbalanced_reports_total(
        postings in balanced_set(),
        skew in non_zero_amount(),
    ) {
        let mut postings = postings;
        let Some(first) = postings.iter_mut().find(|p| !p.amount.is_zero()) else {
            return Err(TestCaseError::reject("no non-zero leg"));
        };
        first.amount += skew;
        prop_assume!(!first.amount.is_zero());

        match PostingValidator::validate(&postings, known, no_vat) {
            Err(LedgerError::PostingsNotBalanced(total)) => prop_assert_eq!(total, skew),
            Err(LedgerError::InsufficientPostings) => {
                let non_zero = postings.iter().filter(|p| !p.amount.is_zero()).count();
                prop_assert!(non_zero < 2);
            }
            other => prop_assert!(false, "unexpected result: {:?}", other),
        }
    }
}
