//! Funds and the finance transaction ledger.
//!
//! Creates the users projection, funds, and finance_transactions with the
//! balance and amount checks the ledger relies on.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(LEDGER_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            r"
DROP TABLE IF EXISTS finance_transactions CASCADE;
DROP TABLE IF EXISTS funds CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP TYPE IF EXISTS finance_transaction_status;
DROP TYPE IF EXISTS finance_transaction_type;
",
        )
        .await?;
        Ok(())
    }
}

const LEDGER_SQL: &str = r"
CREATE TYPE finance_transaction_type AS ENUM ('income', 'expense');
CREATE TYPE finance_transaction_status AS ENUM ('pending', 'completed', 'rejected');

-- Identity projection used to populate ledger entries
CREATE TABLE users (
    id UUID PRIMARY KEY,
    username VARCHAR(100) NOT NULL UNIQUE,
    email VARCHAR(255),
    full_name VARCHAR(255),
    avatar TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE funds (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    balance NUMERIC(20, 2) NOT NULL DEFAULT 0,
    opening_balance NUMERIC(20, 2) NOT NULL DEFAULT 0,
    currency VARCHAR(3) NOT NULL DEFAULT 'VND',
    account_num VARCHAR(100),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_funds_balance_non_negative CHECK (balance >= 0)
);

CREATE INDEX idx_funds_name ON funds(name);
CREATE INDEX idx_funds_account_num ON funds(account_num) WHERE account_num IS NOT NULL;

CREATE TABLE finance_transactions (
    id UUID PRIMARY KEY,
    fund_id UUID NOT NULL REFERENCES funds(id) ON DELETE RESTRICT,
    user_id UUID NOT NULL,
    type finance_transaction_type NOT NULL,
    amount NUMERIC(20, 2) NOT NULL,
    description TEXT NOT NULL,
    status finance_transaction_status NOT NULL DEFAULT 'pending',
    invoice_url TEXT,
    invoice_code VARCHAR(100),
    ref_model VARCHAR(100),
    ref_id UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_finance_transactions_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_finance_transactions_ref_pair CHECK ((ref_model IS NULL) = (ref_id IS NULL))
);

CREATE INDEX idx_finance_transactions_fund ON finance_transactions(fund_id, created_at DESC);
CREATE INDEX idx_finance_transactions_user ON finance_transactions(user_id, created_at DESC);
CREATE INDEX idx_finance_transactions_type_status ON finance_transactions(type, status);
CREATE INDEX idx_finance_transactions_ref ON finance_transactions(ref_model, ref_id)
    WHERE ref_model IS NOT NULL;
";
