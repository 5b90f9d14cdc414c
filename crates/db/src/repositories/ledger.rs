//! SeaORM implementation of the ledger storage traits.
//!
//! A [`SeaLedgerUnit`] wraps one database transaction. Account and
//! transaction rows are read with `FOR UPDATE` on PostgreSQL; SQLite
//! serializes writers on its own.

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tally_core::ledger::{
    Account, LedgerError, LedgerReader, LedgerStore, LedgerUnit, Transaction, TransactionDraft,
    TransactionKind,
};
use tally_shared::types::{AccountId, Money, TransactionId, UserId};

use super::storage_error;
use super::{account, transaction};
use crate::repositories::TransactionRepository;

/// Ledger store backed by a database connection pool.
#[derive(Debug, Clone)]
pub struct SeaLedgerStore {
    db: DatabaseConnection,
    reader: TransactionRepository,
}

impl SeaLedgerStore {
    /// Creates a new store.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        let reader = TransactionRepository::new(db.clone());
        Self { db, reader }
    }
}

/// One database transaction running ledger writes.
///
/// Dropping it without [`LedgerUnit::commit`] rolls the transaction back.
pub struct SeaLedgerUnit {
    txn: DatabaseTransaction,
}

impl LedgerStore for SeaLedgerStore {
    type Unit = SeaLedgerUnit;

    async fn begin(&self) -> Result<SeaLedgerUnit, LedgerError> {
        let txn = self.db.begin().await.map_err(storage_error)?;
        Ok(SeaLedgerUnit { txn })
    }
}

impl LedgerUnit for SeaLedgerUnit {
    async fn find_account(
        &mut self,
        id: AccountId,
        owner: UserId,
    ) -> Result<Option<Account>, LedgerError> {
        account::find_for_update(&self.txn, id, owner)
            .await
            .map_err(storage_error)
    }

    async fn adjust_balance(&mut self, id: AccountId, delta: Money) -> Result<(), LedgerError> {
        account::adjust_balance(&self.txn, id, delta).await
    }

    async fn append(
        &mut self,
        owner: UserId,
        draft: &TransactionDraft,
    ) -> Result<Transaction, LedgerError> {
        transaction::append(&self.txn, owner, draft).await
    }

    async fn peek_transaction(
        &mut self,
        id: TransactionId,
        owner: UserId,
        kind: Option<TransactionKind>,
    ) -> Result<Option<Transaction>, LedgerError> {
        transaction::find(&self.txn, id, owner, kind).await
    }

    async fn find_transaction(
        &mut self,
        id: TransactionId,
        owner: UserId,
        kind: Option<TransactionKind>,
    ) -> Result<Option<Transaction>, LedgerError> {
        transaction::find_for_update(&self.txn, id, owner, kind).await
    }

    async fn remove(&mut self, id: TransactionId) -> Result<(), LedgerError> {
        transaction::remove(&self.txn, id).await
    }

    async fn commit(self) -> Result<(), LedgerError> {
        self.txn.commit().await.map_err(storage_error)
    }
}

impl LedgerReader for SeaLedgerStore {
    async fn list_transactions(
        &self,
        owner: UserId,
        kind: Option<TransactionKind>,
    ) -> Result<Vec<Transaction>, LedgerError> {
        self.reader.list(owner, kind).await
    }

    async fn get_transaction(
        &self,
        id: TransactionId,
        owner: UserId,
        kind: Option<TransactionKind>,
    ) -> Result<Option<Transaction>, LedgerError> {
        self.reader.get(id, owner, kind).await
    }
}
