//! Demo data seeder for local development.
//!
//! Creates a `demo` user with a few accounts and transactions. Every
//! transaction goes through the ledger service, so seeded balances obey the
//! same rules as API writes. Running it twice is a no-op.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_core::auth::hash_password;
use tally_core::ledger::{EntryInput, LedgerService};
use tally_db::{AccountRepository, SeaLedgerStore, UserRepository};
use tally_shared::AppConfig;
use tally_shared::types::{Money, UserId};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEMO_USERNAME: &str = "demo";
const DEMO_PASSWORD: &str = "demo-password";

fn entry(description: &str, amount: Decimal, days_ago: i64) -> EntryInput {
    EntryInput {
        description: description.to_string(),
        amount: Money::new(amount),
        date: (Utc::now() - Duration::days(days_ago)).date_naive(),
        completed: days_ago > 0,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tally=info,seeder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = tally_db::connect_with(&config.database)
        .await
        .context("Failed to connect to database")?;

    let users = UserRepository::new(db.clone());
    if users.username_exists(DEMO_USERNAME).await? {
        info!(username = DEMO_USERNAME, "Demo user already exists, skipping");
        return Ok(());
    }

    let hash = hash_password(DEMO_PASSWORD)?;
    let user = users.create(DEMO_USERNAME, &hash).await?;
    let owner = UserId::from_uuid(user.id);
    info!(user_id = %owner, username = DEMO_USERNAME, "Created demo user");

    let accounts = AccountRepository::new(db.clone());
    let wallet = accounts.create(owner, "Wallet", Money::new(dec!(40))).await?;
    let checking = accounts
        .create(owner, "Checking", Money::new(dec!(1250)))
        .await?;
    let savings = accounts.create(owner, "Savings", Money::ZERO).await?;

    let ledger = LedgerService::new(Arc::new(SeaLedgerStore::new(db)));
    ledger
        .create_income(owner, checking.id, entry("Salary", dec!(3200), 20))
        .await?;
    ledger
        .create_expense(owner, checking.id, entry("Rent", dec!(1100), 18))
        .await?;
    ledger
        .create_expense(owner, wallet.id, entry("Groceries", dec!(62.35), 5))
        .await?;
    ledger
        .create_transfer(
            owner,
            checking.id,
            savings.id,
            entry("Monthly savings", dec!(500), 3),
        )
        .await?;
    ledger
        .create_transfer(owner, checking.id, wallet.id, entry("Cash", dec!(100), 0))
        .await?;

    for account in accounts.list(owner).await? {
        info!(account = %account.name, balance = %account.balance, "Seeded account");
    }
    info!("Seeding complete");
    Ok(())
}
