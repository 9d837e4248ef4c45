//! Fixtures shared by the service tests.

use std::sync::Arc;

use chrono::NaiveDate;
use folio_shared::config::LedgerConfig;
use folio_shared::types::TenantId;
use rust_decimal_macros::dec;

use crate::ledger::types::VatCode;
use crate::store::InMemoryStore;

pub const TENANT: TenantId = TenantId::new(1);
pub const OTHER_TENANT: TenantId = TenantId::new(2);

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn ledger_config() -> LedgerConfig {
    LedgerConfig::default()
}

/// Store seeded with a small chart of accounts and VAT codes for both tenants.
pub async fn seeded_store() -> Arc<InMemoryStore> {
    let store = InMemoryStore::new();
    for tenant in [TENANT, OTHER_TENANT] {
        for (number, name) in [
            ("1500", "Accounts receivable"),
            ("1920", "Bank deposits"),
            ("2000", "Share capital"),
            ("2400", "Accounts payable"),
            ("2700", "Output VAT"),
            ("3000", "Sales revenue"),
            ("4000", "Purchases"),
            ("6300", "Rent"),
            ("8050", "Interest income"),
        ] {
            store.add_account(tenant, number, name).await;
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
            .await;
    }
    Arc::new(store)
}
