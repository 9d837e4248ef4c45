//! Reference data writes used by the seeder and integration tests.
//!
//! Master-data maintenance lives outside this crate; these helpers exist to
//! load a chart of accounts, VAT codes, projects and activities.

use folio_core::ledger::VatCode;
use folio_core::store::StoreResult;
use folio_core::timesheet::{Activity, Project};
use folio_shared::types::{ProjectId, TenantId};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use super::{SeaStore, convert, store_err};
use crate::entities::{accounts, activities, projects, vat_codes};

impl SeaStore {
    /// Adds an account to the tenant's chart, renaming it if it exists.
    pub async fn add_account(&self, tenant: TenantId, number: &str, name: &str) -> StoreResult<()> {
        accounts::Entity::insert(accounts::ActiveModel {
            tenant_id: Set(tenant.into_inner()),
            account_number: Set(number.to_string()),
            account_name: Set(name.to_string()),
            created_at: Set(convert::now()),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::columns([accounts::Column::TenantId, accounts::Column::AccountNumber])
                .update_column(accounts::Column::AccountName)
                .to_owned(),
        )
        .exec(&self.db)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    /// Adds a VAT code for the tenant; an existing code is left unchanged.
    pub async fn add_vat_code(&self, tenant: TenantId, vat_code: VatCode) -> StoreResult<()> {
        vat_codes::Entity::insert(vat_codes::ActiveModel {
            tenant_id: Set(tenant.into_inner()),
            code: Set(vat_code.code),
            rate: Set(vat_code.rate),
            description: Set(vat_code.description),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::columns([vat_codes::Column::TenantId, vat_codes::Column::Code])
                .do_nothing()
                .to_owned(),
        )
        .do_nothing()
        .exec(&self.db)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    /// Adds an active project.
    pub async fn add_project(&self, tenant: TenantId, name: &str) -> StoreResult<Project> {
        let model = projects::ActiveModel {
            tenant_id: Set(tenant.into_inner()),
            name: Set(name.to_string()),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(store_err)?;
        Ok(convert::project(model))
    }

    /// Adds an active, billable activity; global when `project` is `None`.
    pub async fn add_activity(
        &self,
        tenant: TenantId,
        project: Option<ProjectId>,
        name: &str,
    ) -> StoreResult<Activity> {
        let model = activities::ActiveModel {
            tenant_id: Set(tenant.into_inner()),
            project_id: Set(project.map(ProjectId::into_inner)),
            name: Set(name.to_string()),
            is_billable: Set(true),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(store_err)?;
        Ok(convert::activity(model))
    }
}
