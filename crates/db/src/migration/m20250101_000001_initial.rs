//! Initial schema: chart of accounts, vouchers and postings, projects,
//! activities and timesheet entries.
//!
//! Every table carries `tenant_id` and every uniqueness constraint includes it.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // Reference data
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(VAT_CODES_SQL).await?;

        // Ledger
        db.execute_unprepared(VOUCHERS_SQL).await?;
        db.execute_unprepared(POSTINGS_SQL).await?;

        // Timesheets
        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(PROJECTS_SQL).await?;
        db.execute_unprepared(ACTIVITIES_SQL).await?;
        db.execute_unprepared(TIMESHEET_ENTRIES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id BIGSERIAL PRIMARY KEY,
    tenant_id BIGINT NOT NULL,
    account_number VARCHAR(10) NOT NULL,
    account_name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (tenant_id, account_number)
);
";

const VAT_CODES_SQL: &str = r"
CREATE TABLE vat_codes (
    id BIGSERIAL PRIMARY KEY,
    tenant_id BIGINT NOT NULL,
    code VARCHAR(10) NOT NULL,
    rate NUMERIC(5, 2) NOT NULL DEFAULT 0,
    description VARCHAR(255),
    UNIQUE (tenant_id, code)
);
";

const VOUCHERS_SQL: &str = r"
CREATE TABLE vouchers (
    id BIGSERIAL PRIMARY KEY,
    tenant_id BIGINT NOT NULL,
    year INTEGER NOT NULL,
    number INTEGER NOT NULL CHECK (number > 0),
    voucher_date DATE NOT NULL,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_vouchers_tenant_year_number UNIQUE (tenant_id, year, number),
    CHECK (year = EXTRACT(YEAR FROM voucher_date)::INTEGER)
);

CREATE INDEX idx_vouchers_tenant_date ON vouchers(tenant_id, voucher_date DESC, number DESC);
";

const POSTINGS_SQL: &str = r"
CREATE TABLE postings (
    id BIGSERIAL PRIMARY KEY,
    tenant_id BIGINT NOT NULL,
    voucher_id BIGINT REFERENCES vouchers(id) ON DELETE RESTRICT,
    account_number VARCHAR(10) NOT NULL,
    amount NUMERIC(19, 2) NOT NULL CHECK (amount <> 0),
    currency CHAR(3) NOT NULL,
    original_amount NUMERIC(19, 2),
    original_currency CHAR(3),
    vat_code VARCHAR(10),
    posting_date DATE NOT NULL,
    description TEXT,
    row_number INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    FOREIGN KEY (tenant_id, account_number) REFERENCES accounts(tenant_id, account_number)
);

CREATE INDEX idx_postings_voucher ON postings(voucher_id);
CREATE INDEX idx_postings_tenant_account_date ON postings(tenant_id, account_number, posting_date);
CREATE INDEX idx_postings_tenant_date ON postings(tenant_id, posting_date);
";

const ENUMS_SQL: &str = r"
CREATE TYPE timesheet_status AS ENUM ('DRAFT', 'SUBMITTED', 'APPROVED', 'REJECTED');
";

const PROJECTS_SQL: &str = r"
CREATE TABLE projects (
    id BIGSERIAL PRIMARY KEY,
    tenant_id BIGINT NOT NULL,
    name VARCHAR(255) NOT NULL,
    description TEXT,
    color VARCHAR(7),
    is_active BOOLEAN NOT NULL DEFAULT true
);

CREATE INDEX idx_projects_tenant ON projects(tenant_id) WHERE is_active;
";

const ACTIVITIES_SQL: &str = r"
CREATE TABLE activities (
    id BIGSERIAL PRIMARY KEY,
    tenant_id BIGINT NOT NULL,
    project_id BIGINT REFERENCES projects(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    description TEXT,
    is_billable BOOLEAN NOT NULL DEFAULT true,
    hourly_rate NUMERIC(19, 2),
    is_active BOOLEAN NOT NULL DEFAULT true
);

CREATE INDEX idx_activities_tenant_project ON activities(tenant_id, project_id);
";

const TIMESHEET_ENTRIES_SQL: &str = r"
CREATE TABLE timesheet_entries (
    id BIGSERIAL PRIMARY KEY,
    tenant_id BIGINT NOT NULL,
    user_id BIGINT NOT NULL,
    project_id BIGINT REFERENCES projects(id),
    activity_id BIGINT REFERENCES activities(id),
    entry_date DATE NOT NULL,
    hours NUMERIC(4, 2) NOT NULL DEFAULT 0 CHECK (hours >= 0 AND hours <= 24),
    description TEXT,
    notes TEXT,
    status timesheet_status NOT NULL DEFAULT 'DRAFT',
    submitted_at TIMESTAMPTZ,
    approved_at TIMESTAMPTZ,
    approved_by BIGINT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_timesheet_entries_cell UNIQUE (tenant_id, user_id, project_id, activity_id, entry_date)
);

CREATE INDEX idx_timesheet_tenant_user_date ON timesheet_entries(tenant_id, user_id, entry_date);
CREATE INDEX idx_timesheet_tenant_date_status ON timesheet_entries(tenant_id, entry_date, status);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS timesheet_entries CASCADE;
DROP TABLE IF EXISTS activities CASCADE;
DROP TABLE IF EXISTS projects CASCADE;
DROP TYPE IF EXISTS timesheet_status;
DROP TABLE IF EXISTS postings CASCADE;
DROP TABLE IF EXISTS vouchers CASCADE;
DROP TABLE IF EXISTS vat_codes CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
";
