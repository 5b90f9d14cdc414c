//! Initial schema: users, accounts and the transaction log.
//!
//! Foreign keys carry no cascade action; account deletion removes dependent
//! transactions explicitly. Timestamps are always written by the application.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        for statement in UP {
            db.execute_unprepared(statement).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        for statement in DOWN {
            db.execute_unprepared(statement).await?;
        }
        Ok(())
    }
}

const UP: &[&str] = &[
    r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    username VARCHAR(64) NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
)",
    r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL REFERENCES users(id),
    name VARCHAR(255) NOT NULL,
    balance_minor BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT chk_accounts_name_not_blank CHECK (length(trim(name)) > 0)
)",
    r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL REFERENCES users(id),
    kind VARCHAR(16) NOT NULL,
    description TEXT NOT NULL,
    amount_minor BIGINT NOT NULL,
    transaction_date DATE NOT NULL,
    completed BOOLEAN NOT NULL,
    account_id UUID REFERENCES accounts(id),
    source_account_id UUID REFERENCES accounts(id),
    destination_account_id UUID REFERENCES accounts(id),
    created_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT chk_transactions_amount_positive CHECK (amount_minor > 0),
    CONSTRAINT chk_transactions_kind CHECK (kind IN ('income', 'expense', 'transfer')),
    CONSTRAINT chk_transactions_accounts CHECK (
        (kind IN ('income', 'expense')
            AND account_id IS NOT NULL
            AND source_account_id IS NULL
            AND destination_account_id IS NULL)
        OR (kind = 'transfer'
            AND account_id IS NULL
            AND source_account_id IS NOT NULL
            AND destination_account_id IS NOT NULL
            AND source_account_id <> destination_account_id)
    )
)",
    "CREATE INDEX idx_accounts_owner ON accounts(owner_id, created_at)",
    "CREATE INDEX idx_transactions_owner ON transactions(owner_id, kind, transaction_date)",
    "CREATE INDEX idx_transactions_account ON transactions(account_id)",
    "CREATE INDEX idx_transactions_source ON transactions(source_account_id)",
    "CREATE INDEX idx_transactions_destination ON transactions(destination_account_id)",
];

const DOWN: &[&str] = &[
    "DROP TABLE IF EXISTS transactions",
    "DROP TABLE IF EXISTS accounts",
    "DROP TABLE IF EXISTS users",
];
