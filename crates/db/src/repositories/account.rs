//! Account store.
//!
//! Owner-scoped account management. Balances change only through
//! [`adjust_balance`], which is reachable from a ledger unit of work and
//! nowhere else.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tally_core::ledger::{Account, LedgerError, validate_account_name};
use tally_shared::AppError;
use tally_shared::types::{AccountId, Money, UserId};
use tracing::info;

use crate::entities::{accounts, transactions};

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account does not exist for this owner.
    #[error("Account not found: {0}")]
    NotFound(AccountId),

    /// Name is empty or whitespace.
    #[error("Account name must not be blank")]
    InvalidName,

    /// Balance has more than two fractional digits or is out of range.
    #[error("Balance {0} cannot be represented in minor units")]
    UnrepresentableBalance(Decimal),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::NotFound(_) => Self::NotFound(err.to_string()),
            AccountError::InvalidName | AccountError::UnrepresentableBalance(_) => {
                Self::Validation(err.to_string())
            }
            AccountError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Converts a stored row into the domain account.
pub(crate) fn to_domain(model: accounts::Model) -> Account {
    Account {
        id: AccountId::from_uuid(model.id),
        owner: UserId::from_uuid(model.owner_id),
        name: model.name,
        balance: Money::from_minor_units(model.balance_minor),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

/// Account repository for owner-scoped CRUD.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists an owner's accounts, oldest first.
    pub async fn list(&self, owner: UserId) -> Result<Vec<Account>, AccountError> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::OwnerId.eq(owner.into_inner()))
            .order_by_asc(accounts::Column::CreatedAt)
            .order_by_asc(accounts::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(to_domain).collect())
    }

    /// Fetches one of an owner's accounts.
    pub async fn get(&self, id: AccountId, owner: UserId) -> Result<Account, AccountError> {
        accounts::Entity::find_by_id(id.into_inner())
            .filter(accounts::Column::OwnerId.eq(owner.into_inner()))
            .one(&self.db)
            .await?
            .map(to_domain)
            .ok_or(AccountError::NotFound(id))
    }

    /// Opens an account with an initial balance.
    pub async fn create(
        &self,
        owner: UserId,
        name: &str,
        initial_balance: Money,
    ) -> Result<Account, AccountError> {
        let name = validate_account_name(name).map_err(|_| AccountError::InvalidName)?;
        let balance_minor = initial_balance
            .to_minor_units()
            .ok_or(AccountError::UnrepresentableBalance(initial_balance.amount()))?;

        let now = Utc::now().into();
        let model = accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            owner_id: Set(owner.into_inner()),
            name: Set(name),
            balance_minor: Set(balance_minor),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        let account = to_domain(model);
        info!(
            owner_id = %owner,
            account_id = %account.id,
            balance = %account.balance,
            "Account created"
        );
        Ok(account)
    }

    /// Renames one of an owner's accounts.
    pub async fn rename(
        &self,
        id: AccountId,
        owner: UserId,
        name: &str,
    ) -> Result<Account, AccountError> {
        let name = validate_account_name(name).map_err(|_| AccountError::InvalidName)?;

        let existing = accounts::Entity::find_by_id(id.into_inner())
            .filter(accounts::Column::OwnerId.eq(owner.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(AccountError::NotFound(id))?;

        let mut active: accounts::ActiveModel = existing.into();
        active.name = Set(name);
        active.updated_at = Set(Utc::now().into());
        let model = active.update(&self.db).await?;

        Ok(to_domain(model))
    }

    /// Deletes an account together with every transaction referencing it.
    ///
    /// Dependent transactions are removed without reversing their effects on
    /// other accounts. Returns the number of removed transactions.
    pub async fn delete(&self, id: AccountId, owner: UserId) -> Result<u64, AccountError> {
        let txn = self.db.begin().await?;

        let exists = accounts::Entity::find_by_id(id.into_inner())
            .filter(accounts::Column::OwnerId.eq(owner.into_inner()))
            .lock_exclusive()
            .one(&txn)
            .await?
            .is_some();
        if !exists {
            return Err(AccountError::NotFound(id));
        }

        let uuid = id.into_inner();
        let removed = transactions::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(transactions::Column::AccountId.eq(uuid))
                    .add(transactions::Column::SourceAccountId.eq(uuid))
                    .add(transactions::Column::DestinationAccountId.eq(uuid)),
            )
            .exec(&txn)
            .await?
            .rows_affected;

        accounts::Entity::delete_by_id(uuid).exec(&txn).await?;
        txn.commit().await?;

        info!(
            owner_id = %owner,
            account_id = %id,
            removed_transactions = removed,
            "Account deleted"
        );
        Ok(removed)
    }
}

/// Resolves an owner's account and locks the row for the enclosing transaction.
pub(crate) async fn find_for_update<C: ConnectionTrait>(
    conn: &C,
    id: AccountId,
    owner: UserId,
) -> Result<Option<Account>, DbErr> {
    Ok(accounts::Entity::find_by_id(id.into_inner())
        .filter(accounts::Column::OwnerId.eq(owner.into_inner()))
        .lock_exclusive()
        .one(conn)
        .await?
        .map(to_domain))
}

/// Adds `delta` to a stored balance in a single `UPDATE`.
pub(crate) async fn adjust_balance<C: ConnectionTrait>(
    conn: &C,
    id: AccountId,
    delta: Money,
) -> Result<(), LedgerError> {
    let delta_minor = delta
        .to_minor_units()
        .ok_or(LedgerError::ExcessPrecision(delta.amount()))?;
    let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();

    let result = accounts::Entity::update_many()
        .col_expr(
            accounts::Column::BalanceMinor,
            Expr::col(accounts::Column::BalanceMinor).add(delta_minor),
        )
        .col_expr(accounts::Column::UpdatedAt, Expr::value(now))
        .filter(accounts::Column::Id.eq(id.into_inner()))
        .exec(conn)
        .await
        .map_err(super::storage_error)?;

    if result.rows_affected != 1 {
        return Err(LedgerError::InvariantViolation(format!(
            "balance adjustment of account {id} affected {} rows",
            result.rows_affected
        )));
    }
    Ok(())
}
