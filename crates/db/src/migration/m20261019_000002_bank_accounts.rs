//! Donation bank accounts.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(BANK_ACCOUNTS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS bank_accounts CASCADE; DROP TYPE IF EXISTS bank_account_status;",
        )
        .await?;
        Ok(())
    }
}

const BANK_ACCOUNTS_SQL: &str = r"
CREATE TYPE bank_account_status AS ENUM ('active', 'inactive');

CREATE TABLE bank_accounts (
    id UUID PRIMARY KEY,
    bank_name VARCHAR(255) NOT NULL,
    account_number VARCHAR(100) NOT NULL,
    account_holder VARCHAR(255) NOT NULL,
    qr_code_url TEXT,
    status bank_account_status NOT NULL DEFAULT 'active',
    note TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_bank_accounts_bank_account ON bank_accounts(bank_name, account_number);
CREATE INDEX idx_bank_accounts_status ON bank_accounts(status);
";
