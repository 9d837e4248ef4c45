//! Chart of accounts, VAT codes, vouchers and postings.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use folio_core::ledger::{
    Account, NewPosting, NewVoucher, Posting, Voucher, VoucherSearch, VoucherWithPostings,
};
use folio_core::store::{
    AccountDirectory, PostingFilter, PostingStore, StoreError, StoreResult, VatCodeDirectory,
    VoucherChanges, VoucherStore,
};
use folio_shared::types::{PageRequest, TenantId, VoucherId};
use sea_orm::sea_query::{Expr, Func, IntoColumnRef, Query, SelectStatement, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::debug;

use super::{SeaStore, convert, store_err};
use crate::entities::{accounts, postings, vat_codes, vouchers};

impl SeaStore {
    async fn attach_postings(
        &self,
        vouchers: Vec<vouchers::Model>,
    ) -> StoreResult<Vec<VoucherWithPostings>> {
        if vouchers.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = vouchers.iter().map(|v| v.id).collect();
        let rows = postings::Entity::find()
            .filter(postings::Column::VoucherId.is_in(ids))
            .order_by_asc(postings::Column::RowNumber)
            .order_by_asc(postings::Column::Id)
            .all(&self.db)
            .await
            .map_err(store_err)?;

        let mut by_voucher: HashMap<i64, Vec<Posting>> = HashMap::new();
        for row in rows {
            if let Some(voucher_id) = row.voucher_id {
                by_voucher
                    .entry(voucher_id)
                    .or_default()
                    .push(convert::posting(row)?);
            }
        }

        Ok(vouchers
            .into_iter()
            .map(|model| {
                let postings = by_voucher.remove(&model.id).unwrap_or_default();
                VoucherWithPostings {
                    voucher: convert::voucher(model),
                    postings,
                }
            })
            .collect())
    }
}

async fn insert_postings<C: ConnectionTrait>(
    conn: &C,
    tenant: TenantId,
    voucher_id: i64,
    postings: Vec<NewPosting>,
) -> StoreResult<()> {
    if postings.is_empty() {
        return Ok(());
    }
    let now = convert::now();
    let rows = postings.into_iter().map(|p| postings::ActiveModel {
        tenant_id: Set(tenant.into_inner()),
        voucher_id: Set(Some(voucher_id)),
        account_number: Set(p.account_number),
        amount: Set(p.amount),
        currency: Set(p.currency.to_string()),
        original_amount: Set(p.original_amount),
        original_currency: Set(p.original_currency.map(String::from)),
        vat_code: Set(p.vat_code),
        posting_date: Set(p.posting_date),
        description: Set(p.description),
        row_number: Set(p.row_number),
        created_at: Set(now),
        ..Default::default()
    });
    postings::Entity::insert_many(rows)
        .exec(conn)
        .await
        .map_err(store_err)?;
    Ok(())
}

/// Case-insensitive `LIKE` on a column.
fn lower_like(column: impl IntoColumnRef, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(pattern)
}

/// Ids of the tenant's vouchers having a posting that satisfies `condition`.
fn voucher_ids_with_postings(tenant: TenantId, condition: Condition) -> SelectStatement {
    Query::select()
        .column(postings::Column::VoucherId)
        .from(postings::Entity)
        .and_where(postings::Column::TenantId.eq(tenant.into_inner()))
        .and_where(postings::Column::VoucherId.is_not_null())
        .cond_where(condition)
        .to_owned()
}

#[async_trait]
impl AccountDirectory for SeaStore {
    async fn find_account_by_number(
        &self,
        tenant: TenantId,
        account_number: &str,
    ) -> StoreResult<Option<Account>> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::TenantId.eq(tenant.into_inner()))
            .filter(accounts::Column::AccountNumber.eq(account_number))
            .one(&self.db)
            .await
            .map_err(store_err)?;
        Ok(account.map(convert::account))
    }

    async fn list_accounts(&self, tenant: TenantId) -> StoreResult<Vec<Account>> {
        let accounts = accounts::Entity::find()
            .filter(accounts::Column::TenantId.eq(tenant.into_inner()))
            .order_by_asc(accounts::Column::AccountNumber)
            .all(&self.db)
            .await
            .map_err(store_err)?;
        Ok(accounts.into_iter().map(convert::account).collect())
    }
}

#[async_trait]
impl VatCodeDirectory for SeaStore {
    async fn vat_code_exists(&self, tenant: TenantId, code: &str) -> StoreResult<bool> {
        let count = vat_codes::Entity::find()
            .filter(vat_codes::Column::TenantId.eq(tenant.into_inner()))
            .filter(vat_codes::Column::Code.eq(code))
            .count(&self.db)
            .await
            .map_err(store_err)?;
        Ok(count > 0)
    }
}

#[async_trait]
impl VoucherStore for SeaStore {
    async fn max_voucher_number(&self, tenant: TenantId, year: i32) -> StoreResult<Option<i32>> {
        let max: Option<Option<i32>> = vouchers::Entity::find()
            .select_only()
            .column_as(vouchers::Column::Number.max(), "max_number")
            .filter(vouchers::Column::TenantId.eq(tenant.into_inner()))
            .filter(vouchers::Column::Year.eq(year))
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(store_err)?;
        Ok(max.flatten())
    }

    async fn insert_voucher(
        &self,
        tenant: TenantId,
        voucher: NewVoucher,
        postings: Vec<NewPosting>,
    ) -> StoreResult<Voucher> {
        let txn = self.db.begin().await.map_err(store_err)?;
        let now = convert::now();

        let model = vouchers::ActiveModel {
            tenant_id: Set(tenant.into_inner()),
            year: Set(voucher.date.year()),
            number: Set(voucher.number),
            voucher_date: Set(voucher.date),
            description: Set(voucher.description),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(store_err)?;
        insert_postings(&txn, tenant, model.id, postings).await?;

        txn.commit().await.map_err(store_err)?;
        Ok(convert::voucher(model))
    }

    async fn find_voucher(
        &self,
        tenant: TenantId,
        id: VoucherId,
    ) -> StoreResult<Option<VoucherWithPostings>> {
        let voucher = vouchers::Entity::find_by_id(id.into_inner())
            .filter(vouchers::Column::TenantId.eq(tenant.into_inner()))
            .one(&self.db)
            .await
            .map_err(store_err)?;
        match voucher {
            Some(model) => Ok(self.attach_postings(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_empty_voucher(&self, tenant: TenantId) -> StoreResult<Option<Voucher>> {
        let used = voucher_ids_with_postings(tenant, Condition::all());
        let voucher = vouchers::Entity::find()
            .filter(vouchers::Column::TenantId.eq(tenant.into_inner()))
            .filter(vouchers::Column::Id.not_in_subquery(used))
            .order_by_asc(vouchers::Column::Id)
            .one(&self.db)
            .await
            .map_err(store_err)?;
        Ok(voucher.map(convert::voucher))
    }

    async fn replace_voucher(
        &self,
        tenant: TenantId,
        id: VoucherId,
        changes: VoucherChanges,
        postings: Vec<NewPosting>,
    ) -> StoreResult<Voucher> {
        let txn = self.db.begin().await.map_err(store_err)?;

        let existing = vouchers::Entity::find_by_id(id.into_inner())
            .filter(vouchers::Column::TenantId.eq(tenant.into_inner()))
            .one(&txn)
            .await
            .map_err(store_err)?
            .ok_or_else(|| StoreError::NotFound(format!("voucher {id}")))?;

        let mut active: vouchers::ActiveModel = existing.into();
        active.voucher_date = Set(changes.date);
        active.year = Set(changes.date.year());
        if let Some(number) = changes.number {
            active.number = Set(number);
        }
        active.description = Set(changes.description);
        active.updated_at = Set(convert::now());
        let model = active.update(&txn).await.map_err(store_err)?;

        let removed = postings::Entity::delete_many()
            .filter(postings::Column::TenantId.eq(tenant.into_inner()))
            .filter(postings::Column::VoucherId.eq(id.into_inner()))
            .exec(&txn)
            .await
            .map_err(store_err)?;
        insert_postings(&txn, tenant, model.id, postings).await?;

        txn.commit().await.map_err(store_err)?;
        debug!(
            tenant_id = %tenant,
            voucher_id = %id,
            removed = removed.rows_affected,
            "Replaced voucher postings"
        );
        Ok(convert::voucher(model))
    }

    async fn vouchers_with_postings_in_range(
        &self,
        tenant: TenantId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<VoucherWithPostings>> {
        let in_range = voucher_ids_with_postings(
            tenant,
            Condition::all().add(postings::Column::PostingDate.between(from, to)),
        );
        let vouchers = vouchers::Entity::find()
            .filter(vouchers::Column::TenantId.eq(tenant.into_inner()))
            .filter(vouchers::Column::Id.in_subquery(in_range))
            .order_by_asc(vouchers::Column::VoucherDate)
            .order_by_asc(vouchers::Column::Number)
            .order_by_asc(vouchers::Column::Id)
            .all(&self.db)
            .await
            .map_err(store_err)?;
        self.attach_postings(vouchers).await
    }

    async fn search_vouchers(
        &self,
        tenant: TenantId,
        search: &VoucherSearch,
        page: PageRequest,
    ) -> StoreResult<(Vec<VoucherWithPostings>, u64)> {
        let mut query =
            vouchers::Entity::find().filter(vouchers::Column::TenantId.eq(tenant.into_inner()));
        if let Some(from) = search.date_from {
            query = query.filter(vouchers::Column::VoucherDate.gte(from));
        }
        if let Some(to) = search.date_to {
            query = query.filter(vouchers::Column::VoucherDate.lte(to));
        }
        if let Some(term) = search.normalized_term() {
            let pattern = format!("%{term}%");
            let matching = voucher_ids_with_postings(
                tenant,
                Condition::any()
                    .add(lower_like((postings::Entity, postings::Column::Description), &pattern))
                    .add(lower_like((postings::Entity, postings::Column::AccountNumber), &pattern)),
            );
            query = query.filter(
                Condition::any()
                    .add(lower_like((vouchers::Entity, vouchers::Column::Description), &pattern))
                    .add(vouchers::Column::Id.in_subquery(matching)),
            );
        }

        let total = query.clone().count(&self.db).await.map_err(store_err)?;
        let vouchers = query
            .order_by_desc(vouchers::Column::VoucherDate)
            .order_by_desc(vouchers::Column::Number)
            .order_by_desc(vouchers::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(store_err)?;
        Ok((self.attach_postings(vouchers).await?, total))
    }
}

#[async_trait]
impl PostingStore for SeaStore {
    async fn find_postings(
        &self,
        tenant: TenantId,
        filter: &PostingFilter,
    ) -> StoreResult<Vec<Posting>> {
        let mut query =
            postings::Entity::find().filter(postings::Column::TenantId.eq(tenant.into_inner()));
        if let Some(account) = filter.account_number.as_deref() {
            query = query.filter(postings::Column::AccountNumber.eq(account));
        }
        if let Some(from) = filter.date_from {
            query = query.filter(postings::Column::PostingDate.gte(from));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(postings::Column::PostingDate.lte(to));
        }
        if let Some(cutoff) = filter.date_before {
            query = query.filter(postings::Column::PostingDate.lt(cutoff));
        }

        query
            .order_by_asc(postings::Column::PostingDate)
            .order_by_asc(postings::Column::Id)
            .all(&self.db)
            .await
            .map_err(store_err)?
            .into_iter()
            .map(convert::posting)
            .collect()
    }
}
