//! Shared fixtures for database integration tests.
//!
//! Every test gets its own in-memory SQLite database with the migrations
//! applied. The pool holds a single connection, so the database lives as
//! long as the pool.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tally_core::ledger::{EntryInput, LedgerService};
use tally_db::migration::{Migrator, MigratorTrait};
use tally_db::{SeaLedgerStore, UserRepository};
use tally_shared::types::{Money, UserId};
use uuid::Uuid;

pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub async fn create_user(db: &DatabaseConnection, prefix: &str) -> UserId {
    let username = format!("{prefix}-{}", Uuid::new_v4());
    let user = UserRepository::new(db.clone())
        .create(&username, "$argon2id$test_hash")
        .await
        .expect("Failed to create user");
    UserId::from_uuid(user.id)
}

pub fn ledger(db: &DatabaseConnection) -> LedgerService<SeaLedgerStore> {
    LedgerService::new(Arc::new(SeaLedgerStore::new(db.clone())))
}

pub fn money(amount: Decimal) -> Money {
    Money::new(amount)
}

pub fn entry(description: &str, amount: Decimal) -> EntryInput {
    entry_on(description, amount, NaiveDate::from_ymd_opt(2026, 4, 1).unwrap())
}

pub fn entry_on(description: &str, amount: Decimal, date: NaiveDate) -> EntryInput {
    EntryInput {
        description: description.to_string(),
        amount: money(amount),
        date,
        completed: true,
    }
}
