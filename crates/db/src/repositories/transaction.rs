//! Transaction log.
//!
//! Reads are public and owner-scoped. Appends and removals are crate-private
//! and only run inside a ledger unit of work, next to the matching balance
//! adjustments.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};
use tally_core::ledger::{self, LedgerError, Transaction, TransactionDetail, TransactionDraft};
use tally_shared::types::{AccountId, Money, TransactionId, UserId};

use super::storage_error;
use crate::entities::{sea_orm_active_enums::TransactionKind, transactions};

/// Converts a stored row into the domain transaction.
///
/// Rows whose account columns disagree with their kind are reported as an
/// invariant violation.
pub(crate) fn to_domain(model: transactions::Model) -> Result<Transaction, LedgerError> {
    let detail = match (
        model.kind,
        model.account_id,
        model.source_account_id,
        model.destination_account_id,
    ) {
        (TransactionKind::Income, Some(account), None, None) => TransactionDetail::Income {
            account: AccountId::from_uuid(account),
        },
        (TransactionKind::Expense, Some(account), None, None) => TransactionDetail::Expense {
            account: AccountId::from_uuid(account),
        },
        (TransactionKind::Transfer, None, Some(source), Some(destination)) => {
            TransactionDetail::Transfer {
                source: AccountId::from_uuid(source),
                destination: AccountId::from_uuid(destination),
            }
        }
        (kind, ..) => {
            return Err(LedgerError::InvariantViolation(format!(
                "transaction {} has account columns that do not match kind {kind:?}",
                model.id
            )));
        }
    };

    Ok(Transaction {
        id: TransactionId::from_uuid(model.id),
        owner: UserId::from_uuid(model.owner_id),
        description: model.description,
        amount: Money::from_minor_units(model.amount_minor),
        date: model.transaction_date,
        completed: model.completed,
        detail,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

fn scoped(owner: UserId, kind: Option<ledger::TransactionKind>) -> Select<transactions::Entity> {
    let query =
        transactions::Entity::find().filter(transactions::Column::OwnerId.eq(owner.into_inner()));
    match kind {
        Some(kind) => query.filter(transactions::Column::Kind.eq(TransactionKind::from(kind))),
        None => query,
    }
}

/// Owner-scoped reads of the transaction log.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists an owner's transactions, newest booking date first.
    ///
    /// `kind: None` lists every kind.
    pub async fn list(
        &self,
        owner: UserId,
        kind: Option<ledger::TransactionKind>,
    ) -> Result<Vec<Transaction>, LedgerError> {
        scoped(owner, kind)
            .order_by_desc(transactions::Column::TransactionDate)
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .all(&self.db)
            .await
            .map_err(storage_error)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    /// Fetches one of an owner's transactions, optionally restricted to a kind.
    pub async fn get(
        &self,
        id: TransactionId,
        owner: UserId,
        kind: Option<ledger::TransactionKind>,
    ) -> Result<Option<Transaction>, LedgerError> {
        find(&self.db, id, owner, kind).await
    }
}

/// Reads one of an owner's transactions without locking it.
pub(crate) async fn find<C: ConnectionTrait>(
    conn: &C,
    id: TransactionId,
    owner: UserId,
    kind: Option<ledger::TransactionKind>,
) -> Result<Option<Transaction>, LedgerError> {
    scoped(owner, kind)
        .filter(transactions::Column::Id.eq(id.into_inner()))
        .one(conn)
        .await
        .map_err(storage_error)?
        .map(to_domain)
        .transpose()
}

/// Writes a new log entry.
pub(crate) async fn append<C: ConnectionTrait>(
    conn: &C,
    owner: UserId,
    draft: &TransactionDraft,
) -> Result<Transaction, LedgerError> {
    let amount_minor = draft
        .amount
        .to_minor_units()
        .ok_or(LedgerError::ExcessPrecision(draft.amount.amount()))?;

    let (account_id, source_account_id, destination_account_id) = match draft.detail {
        TransactionDetail::Income { account } | TransactionDetail::Expense { account } => {
            (Some(account.into_inner()), None, None)
        }
        TransactionDetail::Transfer {
            source,
            destination,
        } => (None, Some(source.into_inner()), Some(destination.into_inner())),
    };

    let model = transactions::ActiveModel {
        id: Set(TransactionId::new().into_inner()),
        owner_id: Set(owner.into_inner()),
        kind: Set(draft.detail.kind().into()),
        description: Set(draft.description.clone()),
        amount_minor: Set(amount_minor),
        transaction_date: Set(draft.date),
        completed: Set(draft.completed),
        account_id: Set(account_id),
        source_account_id: Set(source_account_id),
        destination_account_id: Set(destination_account_id),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await
    .map_err(storage_error)?;

    to_domain(model)
}

/// Resolves an owner's log entry and locks the row for the enclosing transaction.
pub(crate) async fn find_for_update<C: ConnectionTrait>(
    conn: &C,
    id: TransactionId,
    owner: UserId,
    kind: Option<ledger::TransactionKind>,
) -> Result<Option<Transaction>, LedgerError> {
    scoped(owner, kind)
        .filter(transactions::Column::Id.eq(id.into_inner()))
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(storage_error)?
        .map(to_domain)
        .transpose()
}

/// Removes a log entry.
pub(crate) async fn remove<C: ConnectionTrait>(
    conn: &C,
    id: TransactionId,
) -> Result<(), LedgerError> {
    let result = transactions::Entity::delete_by_id(id.into_inner())
        .exec(conn)
        .await
        .map_err(storage_error)?;

    if result.rows_affected != 1 {
        return Err(LedgerError::InvariantViolation(format!(
            "removing transaction {id} affected {} rows",
            result.rows_affected
        )));
    }
    Ok(())
}
