//! Pure aggregation over posting sets.
//!
//! Every function takes the tenant's postings already loaded and sums with
//! exact decimals. Sums over an empty selection are zero.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::types::{AccountLedgerLine, ClassifiedAmount, DateRange, GeneralLedgerRow};
use crate::ledger::{AccountType, Posting};

/// Sum of one account's postings dated strictly before `cutoff`.
#[must_use]
pub fn balance_before(postings: &[Posting], account_number: &str, cutoff: NaiveDate) -> Decimal {
    postings
        .iter()
        .filter(|p| p.account_number == account_number && p.posting_date < cutoff)
        .map(|p| p.amount)
        .sum()
}

/// Sum of one account's postings within `range`.
#[must_use]
pub fn movement_in(postings: &[Posting], account_number: &str, range: &DateRange) -> Decimal {
    postings
        .iter()
        .filter(|p| p.account_number == account_number && range.contains(p.posting_date))
        .map(|p| p.amount)
        .sum()
}

/// Sum of postings within `range` whose account classifies as `account_type`.
#[must_use]
pub fn type_total(postings: &[Posting], account_type: AccountType, range: &DateRange) -> Decimal {
    postings
        .iter()
        .filter(|p| range.contains(p.posting_date))
        .filter(|p| AccountType::classify(&p.account_number) == account_type)
        .map(|p| p.amount)
        .sum()
}

/// Totals for every reportable type within `range`, zero where nothing posted.
#[must_use]
pub fn type_totals(postings: &[Posting], range: &DateRange) -> BTreeMap<AccountType, Decimal> {
    let mut totals: BTreeMap<AccountType, Decimal> = AccountType::REPORTABLE
        .iter()
        .map(|t| (*t, Decimal::ZERO))
        .collect();
    for posting in postings.iter().filter(|p| range.contains(p.posting_date)) {
        if let Some(total) = totals.get_mut(&AccountType::classify(&posting.account_number)) {
            *total += posting.amount;
        }
    }
    totals
}

/// Per-account sums of `account_type` within `range`, largest absolute
/// amount first, at most `limit` accounts.
#[must_use]
pub fn top_accounts(
    postings: &[Posting],
    account_type: AccountType,
    range: &DateRange,
    limit: usize,
) -> Vec<(String, Decimal)> {
    let mut sums: BTreeMap<&str, Decimal> = BTreeMap::new();
    for posting in postings.iter().filter(|p| {
        range.contains(p.posting_date) && AccountType::classify(&p.account_number) == account_type
    }) {
        *sums.entry(posting.account_number.as_str()).or_default() += posting.amount;
    }

    let mut ranked: Vec<(String, Decimal)> = sums
        .into_iter()
        .map(|(account, amount)| (account.to_string(), amount))
        .collect();
    // Stable sort keeps account-number order among equal amounts.
    ranked.sort_by(|a, b| b.1.abs().cmp(&a.1.abs()));
    ranked.truncate(limit);
    ranked
}

/// General ledger summary: opening balance, movement and count per account.
///
/// Accounts whose opening balance and movement are both zero are left out.
/// Rows are ordered by account number; names are left for the caller.
#[must_use]
pub fn general_ledger(
    postings: &[Posting],
    range: &DateRange,
    account_number: Option<&str>,
) -> Vec<GeneralLedgerRow> {
    let mut rows: BTreeMap<&str, GeneralLedgerRow> = BTreeMap::new();
    for posting in postings {
        if account_number.is_some_and(|a| a != posting.account_number) || posting.posting_date > range.end {
            continue;
        }
        let row = rows
            .entry(posting.account_number.as_str())
            .or_insert_with(|| GeneralLedgerRow {
                account_number: posting.account_number.clone(),
                account_name: None,
                opening_balance: Decimal::ZERO,
                period_movement: Decimal::ZERO,
                closing_balance: Decimal::ZERO,
                transaction_count: 0,
            });
        if posting.posting_date < range.start {
            row.opening_balance += posting.amount;
        } else {
            row.period_movement += posting.amount;
            row.transaction_count += 1;
        }
    }

    rows.into_values()
        .filter(|r| !r.opening_balance.is_zero() || !r.period_movement.is_zero())
        .map(|mut r| {
            r.closing_balance = r.opening_balance + r.period_movement;
            r
        })
        .collect()
}

/// Ledger lines for `postings` (one account, already in date/id order) with
/// a running balance starting at `opening_balance`.
#[must_use]
pub fn ledger_lines(postings: &[Posting], opening_balance: Decimal) -> Vec<AccountLedgerLine> {
    let mut balance = opening_balance;
    postings
        .iter()
        .map(|p| {
            balance += p.amount;
            AccountLedgerLine {
                posting_id: p.id,
                voucher_id: p.voucher_id,
                date: p.posting_date,
                description: p.description.clone(),
                vat_code: p.vat_code.clone(),
                amount: p.amount,
                running_balance: balance,
            }
        })
        .collect()
}

/// Per-account sums within `range` for accounts whose type passes `include`,
/// ordered by (type, account number).
#[must_use]
pub fn classified<F>(postings: &[Posting], range: &DateRange, include: F) -> Vec<ClassifiedAmount>
where
    F: Fn(AccountType) -> bool,
{
    let mut sums: BTreeMap<(AccountType, &str), Decimal> = BTreeMap::new();
    for posting in postings.iter().filter(|p| range.contains(p.posting_date)) {
        let account_type = AccountType::classify(&posting.account_number);
        if include(account_type) {
            *sums
                .entry((account_type, posting.account_number.as_str()))
                .or_default() += posting.amount;
        }
    }
    sums.into_iter()
        .map(|((account_type, account), amount)| ClassifiedAmount {
            account_type,
            account_number: account.to_string(),
            account_name: None,
            amount,
        })
        .collect()
}

/// Sorted, de-duplicated account numbers used by `postings`.
#[must_use]
pub fn distinct_accounts(postings: &[Posting]) -> Vec<String> {
    let mut accounts: Vec<String> = postings.iter().map(|p| p.account_number.clone()).collect();
    accounts.sort_unstable();
    accounts.dedup();
    accounts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use folio_shared::types::{PostingId, TenantId, VoucherId};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn posting(id: i64, account: &str, amount: Decimal, on: NaiveDate) -> Posting {
        Posting {
            id: PostingId::new(id),
            tenant_id: TenantId::new(1),
            voucher_id: Some(VoucherId::new(id)),
            account_number: account.into(),
            amount,
            currency: "NOK".parse().unwrap(),
            original_amount: None,
            original_currency: None,
            vat_code: None,
            posting_date: on,
            description: None,
            row_number: 1,
            created_at: Utc::now(),
        }
    }

    fn q1() -> DateRange {
        DateRange {
            start: date(2025, 1, 1),
            end: date(2025, 3, 31),
        }
    }

    fn fixture() -> Vec<Posting> {
        vec![
            posting(1, "1920", dec!(1000), date(2024, 12, 15)),
            posting(2, "2000", dec!(-1000), date(2024, 12, 15)),
            posting(3, "1500", dec!(250), date(2025, 1, 10)),
            posting(4, "3000", dec!(-200), date(2025, 1, 10)),
            posting(5, "2700", dec!(-50), date(2025, 1, 10)),
            posting(6, "6300", dec!(80), date(2025, 2, 1)),
            posting(7, "1920", dec!(-80), date(2025, 2, 1)),
            posting(8, "3000", dec!(-40), date(2025, 4, 2)),
            posting(9, "1500", dec!(40), date(2025, 4, 2)),
            posting(10, "9100", dec!(5), date(2025, 2, 2)),
        ]
    }

    #[test]
    fn test_balance_before_is_exclusive() {
        let postings = fixture();
        assert_eq!(balance_before(&postings, "1920", date(2025, 2, 1)), dec!(1000));
        assert_eq!(balance_before(&postings, "1920", date(2025, 2, 2)), dec!(920));
        assert_eq!(balance_before(&postings, "4000", date(2025, 2, 2)), Decimal::ZERO);
    }

    #[test]
    fn test_movement_is_inclusive() {
        let postings = fixture();
        let feb_first = DateRange {
            start: date(2025, 2, 1),
            end: date(2025, 2, 1),
        };
        assert_eq!(movement_in(&postings, "1920", &feb_first), dec!(-80));
        assert_eq!(movement_in(&postings, "3000", &q1()), dec!(-200));
    }

    #[test]
    fn test_type_totals_cover_every_reportable_type() {
        let totals = type_totals(&fixture(), &q1());
        assert_eq!(totals[&AccountType::Asset], dec!(170));
        assert_eq!(totals[&AccountType::Liability], dec!(-50));
        assert_eq!(totals[&AccountType::Equity], Decimal::ZERO);
        assert_eq!(totals[&AccountType::Revenue], dec!(-200));
        assert_eq!(totals[&AccountType::Expense], dec!(80));
        assert!(!totals.contains_key(&AccountType::Other));
        assert_eq!(type_total(&fixture(), AccountType::Other, &q1()), dec!(5));
    }

    #[test]
    fn test_general_ledger_suppresses_idle_accounts() {
        let mut postings = fixture();
        // Nets to zero before the range and nothing inside it.
        postings.push(posting(11, "2400", dec!(30), date(2024, 11, 1)));
        postings.push(posting(12, "2400", dec!(-30), date(2024, 11, 2)));

        let rows = general_ledger(&postings, &q1(), None);
        let accounts: Vec<&str> = rows.iter().map(|r| r.account_number.as_str()).collect();
        assert_eq!(accounts, ["1500", "1920", "2000", "2700", "3000", "6300", "9100"]);

        let bank = &rows[1];
        assert_eq!(bank.opening_balance, dec!(1000));
        assert_eq!(bank.period_movement, dec!(-80));
        assert_eq!(bank.closing_balance, dec!(920));
        assert_eq!(bank.transaction_count, 1);

        let equity = &rows[2];
        assert_eq!(equity.transaction_count, 0);
        assert_eq!(equity.closing_balance, dec!(-1000));
    }

    #[test]
    fn test_general_ledger_for_one_account() {
        let rows = general_ledger(&fixture(), &q1(), Some("3000"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].period_movement, dec!(-200));
    }

    #[test]
    fn test_top_accounts_by_absolute_amount() {
        let postings = vec![
            posting(1, "3000", dec!(-500), date(2025, 1, 5)),
            posting(2, "3100", dec!(-900), date(2025, 1, 6)),
            posting(3, "3200", dec!(-100), date(2025, 1, 7)),
            posting(4, "3000", dec!(-50), date(2025, 1, 8)),
        ];
        let top = top_accounts(&postings, AccountType::Revenue, &q1(), 2);
        assert_eq!(
            top,
            vec![("3100".to_string(), dec!(-900)), ("3000".to_string(), dec!(-550))]
        );
    }

    #[test]
    fn test_ledger_lines_running_balance() {
        let postings = vec![
            posting(3, "1500", dec!(100), date(2025, 1, 1)),
            posting(4, "1500", dec!(-30), date(2025, 1, 2)),
        ];
        let lines = ledger_lines(&postings, dec!(20));
        assert_eq!(lines[0].running_balance, dec!(120));
        assert_eq!(lines[1].running_balance, dec!(90));
    }

    #[test]
    fn test_classified_groups_by_type_then_account() {
        let listing = classified(&fixture(), &q1(), |t| t.is_balance_sheet());
        let keys: Vec<(AccountType, &str)> = listing
            .iter()
            .map(|c| (c.account_type, c.account_number.as_str()))
            .collect();
        assert_eq!(
            keys,
            [
                (AccountType::Asset, "1500"),
                (AccountType::Asset, "1920"),
                (AccountType::Liability, "2700"),
            ]
        );
    }

    #[test]
    fn test_distinct_accounts_sorted() {
        let accounts = distinct_accounts(&fixture());
        assert_eq!(
            accounts,
            ["1500", "1920", "2000", "2700", "3000", "6300", "9100"]
        );
    }
}
