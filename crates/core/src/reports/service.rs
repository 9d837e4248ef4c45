//! Read-side ledger queries.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use folio_shared::types::TenantId;
use rust_decimal::Decimal;
use tracing::debug;

use super::aggregation;
use super::types::{
    AccountLedger, AccountSummary, ClassifiedListing, DateRange, FinancialSummary,
    GeneralLedgerRow, MonthlyTrend, Period, first_of_month, months_back,
};
use crate::ledger::{AccountType, LedgerError, Posting};
use crate::store::{AccountDirectory, PostingFilter, PostingStore};

/// Months covered by [`LedgerAggregationEngine::monthly_trends`] by default.
pub const DEFAULT_TREND_MONTHS: u32 = 6;

/// Accounts returned by [`LedgerAggregationEngine::top_accounts`] by default.
pub const DEFAULT_TOP_ACCOUNTS_LIMIT: usize = 5;

/// Balance, movement and statement queries over a tenant's postings.
///
/// The store only filters; all sums are computed here with exact decimals.
pub struct LedgerAggregationEngine<S> {
    store: Arc<S>,
}

impl<S> LedgerAggregationEngine<S>
where
    S: PostingStore + AccountDirectory,
{
    /// Creates an engine over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Sum of an account's postings strictly before `cutoff`.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the store fails.
    pub async fn account_balance_before(
        &self,
        tenant: TenantId,
        account_number: &str,
        cutoff: NaiveDate,
    ) -> Result<Decimal, LedgerError> {
        let postings = self
            .store
            .find_postings(tenant, &PostingFilter::account(account_number).before(cutoff))
            .await?;
        Ok(aggregation::balance_before(&postings, account_number, cutoff))
    }

    /// Sum of an account's postings within `range`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` or `Database`.
    pub async fn account_movement(
        &self,
        tenant: TenantId,
        account_number: &str,
        range: DateRange,
    ) -> Result<Decimal, LedgerError> {
        let postings = self.postings_in(tenant, Some(account_number), range).await?;
        Ok(aggregation::movement_in(&postings, account_number, &range))
    }

    /// Opening balance, movement and posting count per account, optionally
    /// restricted to one account. Idle accounts are left out.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` or `Database`.
    pub async fn general_ledger_summary(
        &self,
        tenant: TenantId,
        range: DateRange,
        account_number: Option<&str>,
    ) -> Result<Vec<GeneralLedgerRow>, LedgerError> {
        range.ensure_ordered()?;
        let mut filter = PostingFilter::all();
        filter.account_number = account_number.map(ToString::to_string);
        filter.date_to = Some(range.end);
        let postings = self.store.find_postings(tenant, &filter).await?;

        let names = self.account_names(tenant).await?;
        let rows: Vec<GeneralLedgerRow> = aggregation::general_ledger(&postings, &range, account_number)
            .into_iter()
            .map(|mut row| {
                row.account_name = names.get(&row.account_number).cloned();
                row
            })
            .collect();
        debug!(tenant_id = %tenant, accounts = rows.len(), "General ledger summary built");
        Ok(rows)
    }

    /// Sum of all postings in `range` whose account classifies as `account_type`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` or `Database`.
    pub async fn account_type_total(
        &self,
        tenant: TenantId,
        account_type: AccountType,
        range: DateRange,
    ) -> Result<Decimal, LedgerError> {
        let postings = self.postings_in(tenant, None, range).await?;
        Ok(aggregation::type_total(&postings, account_type, &range))
    }

    /// Revenue, expenses, assets and liabilities for `period` relative to `today`.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the store fails.
    pub async fn financial_summary(
        &self,
        tenant: TenantId,
        period: Period,
        today: NaiveDate,
    ) -> Result<FinancialSummary, LedgerError> {
        let range = DateRange::for_period(period, today);
        let postings = self.postings_in(tenant, None, range).await?;
        let totals = aggregation::type_totals(&postings, &range);
        let total = |t: AccountType| totals.get(&t).copied().unwrap_or(Decimal::ZERO);

        let revenue = total(AccountType::Revenue);
        let expenses = total(AccountType::Expense);
        let assets = total(AccountType::Asset);
        let liabilities = total(AccountType::Liability);
        Ok(FinancialSummary {
            revenue,
            expenses,
            net_income: revenue - expenses,
            assets,
            liabilities,
            equity: assets - liabilities,
            period,
            start_date: range.start,
            end_date: range.end,
        })
    }

    /// Revenue and expenses for the last `months` calendar months up to and
    /// including `today`'s, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the store fails.
    pub async fn monthly_trends(
        &self,
        tenant: TenantId,
        months: u32,
        today: NaiveDate,
    ) -> Result<Vec<MonthlyTrend>, LedgerError> {
        if months == 0 {
            return Ok(Vec::new());
        }
        let current = first_of_month(today);
        let span = DateRange {
            start: months_back(current, months - 1),
            end: DateRange::month_of(current).end,
        };
        let postings = self.postings_in(tenant, None, span).await?;

        Ok((0..months)
            .rev()
            .map(|offset| {
                let month = DateRange::month_of(months_back(current, offset));
                let revenue = aggregation::type_total(&postings, AccountType::Revenue, &month);
                let expenses = aggregation::type_total(&postings, AccountType::Expense, &month);
                MonthlyTrend {
                    month: month.start.format("%B").to_string().to_uppercase(),
                    year: month.start.year(),
                    revenue,
                    expenses,
                    net_income: revenue - expenses,
                }
            })
            .collect())
    }

    /// The `limit` accounts of `account_type` with the largest absolute sum
    /// in `range`. Accounts missing from the chart are dropped.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` or `Database`.
    pub async fn top_accounts(
        &self,
        tenant: TenantId,
        account_type: AccountType,
        range: DateRange,
        limit: usize,
    ) -> Result<Vec<AccountSummary>, LedgerError> {
        let postings = self.postings_in(tenant, None, range).await?;
        let names = self.account_names(tenant).await?;
        Ok(aggregation::top_accounts(&postings, account_type, &range, limit)
            .into_iter()
            .filter_map(|(account_number, amount)| {
                names.get(&account_number).map(|name| AccountSummary {
                    account_name: name.clone(),
                    account_number,
                    amount,
                })
            })
            .collect())
    }

    /// An account's postings in `range`, each with the balance after it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` or `Database`.
    pub async fn account_ledger(
        &self,
        tenant: TenantId,
        account_number: &str,
        range: DateRange,
    ) -> Result<AccountLedger, LedgerError> {
        range.ensure_ordered()?;
        let opening_balance = self
            .account_balance_before(tenant, account_number, range.start)
            .await?;
        let postings = self.postings_in(tenant, Some(account_number), range).await?;
        let lines = aggregation::ledger_lines(&postings, opening_balance);
        let closing_balance = lines
            .last()
            .map_or(opening_balance, |line| line.running_balance);
        let account_name = self
            .store
            .find_account_by_number(tenant, account_number)
            .await?
            .map(|a| a.account_name);

        Ok(AccountLedger {
            account_number: account_number.to_string(),
            account_name,
            range,
            opening_balance,
            lines,
            closing_balance,
        })
    }

    /// Sorted account numbers the tenant has posted to.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the store fails.
    pub async fn distinct_account_numbers(&self, tenant: TenantId) -> Result<Vec<String>, LedgerError> {
        let postings = self.store.find_postings(tenant, &PostingFilter::all()).await?;
        Ok(aggregation::distinct_accounts(&postings))
    }

    /// Revenue and expense accounts with their sums in `range`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` or `Database`.
    pub async fn profit_and_loss(
        &self,
        tenant: TenantId,
        range: DateRange,
    ) -> Result<ClassifiedListing, LedgerError> {
        self.listing(tenant, range, AccountType::is_profit_and_loss).await
    }

    /// Asset, liability and equity accounts with their sums in `range`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` or `Database`.
    pub async fn balance_sheet(
        &self,
        tenant: TenantId,
        range: DateRange,
    ) -> Result<ClassifiedListing, LedgerError> {
        self.listing(tenant, range, AccountType::is_balance_sheet).await
    }

    async fn listing(
        &self,
        tenant: TenantId,
        range: DateRange,
        include: fn(&AccountType) -> bool,
    ) -> Result<ClassifiedListing, LedgerError> {
        let postings = self.postings_in(tenant, None, range).await?;
        let names = self.account_names(tenant).await?;
        let accounts: Vec<_> = aggregation::classified(&postings, &range, |t| include(&t))
            .into_iter()
            .map(|mut c| {
                c.account_name = names.get(&c.account_number).cloned();
                c
            })
            .collect();

        let mut totals: BTreeMap<AccountType, Decimal> = AccountType::REPORTABLE
            .into_iter()
            .filter(include)
            .map(|t| (t, Decimal::ZERO))
            .collect();
        for account in &accounts {
            *totals.entry(account.account_type).or_default() += account.amount;
        }

        Ok(ClassifiedListing {
            range,
            accounts,
            totals,
        })
    }

    async fn postings_in(
        &self,
        tenant: TenantId,
        account_number: Option<&str>,
        range: DateRange,
    ) -> Result<Vec<Posting>, LedgerError> {
        range.ensure_ordered()?;
        let filter = match account_number {
            Some(account) => PostingFilter::account(account),
            None => PostingFilter::all(),
        };
        Ok(self
            .store
            .find_postings(tenant, &filter.between(range.start, range.end))
            .await?)
    }

    async fn account_names(&self, tenant: TenantId) -> Result<HashMap<String, String>, LedgerError> {
        Ok(self
            .store
            .list_accounts(tenant)
            .await?
            .into_iter()
            .map(|a| (a.account_number, a.account_name))
            .collect())
    }
}
