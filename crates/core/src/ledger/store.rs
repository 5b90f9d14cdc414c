//! Storage seams of the ledger.
//!
//! These traits are implemented by the db crate (SeaORM) and by in-memory
//! stores in tests. A [`LedgerUnit`] is one atomic unit of work: either
//! [`LedgerUnit::commit`] succeeds and every write becomes visible together,
//! or the unit is dropped and none of them do.

use std::future::Future;

use tally_shared::types::{AccountId, Money, TransactionId, UserId};

use super::error::LedgerError;
use super::types::{Account, Transaction, TransactionDraft, TransactionKind};

/// Opens units of work.
pub trait LedgerStore: Send + Sync {
    /// Unit of work type.
    type Unit: LedgerUnit;

    /// Starts a new unit of work.
    fn begin(&self) -> impl Future<Output = Result<Self::Unit, LedgerError>> + Send;
}

/// One atomic group of ledger writes.
///
/// Dropping a unit without calling [`LedgerUnit::commit`] rolls it back.
pub trait LedgerUnit: Send {
    /// Resolves an account for `owner` and locks it until the unit ends.
    fn find_account(
        &mut self,
        id: AccountId,
        owner: UserId,
    ) -> impl Future<Output = Result<Option<Account>, LedgerError>> + Send;

    /// Adds `delta` to an account balance.
    ///
    /// Must fail with [`LedgerError::InvariantViolation`] when the account
    /// does not exist.
    fn adjust_balance(
        &mut self,
        id: AccountId,
        delta: Money,
    ) -> impl Future<Output = Result<(), LedgerError>> + Send;

    /// Writes a new log entry and assigns its id.
    fn append(
        &mut self,
        owner: UserId,
        draft: &TransactionDraft,
    ) -> impl Future<Output = Result<Transaction, LedgerError>> + Send;

    /// Reads a log entry for `owner` without locking it.
    ///
    /// With `kind` set, entries of other kinds are not found.
    fn peek_transaction(
        &mut self,
        id: TransactionId,
        owner: UserId,
        kind: Option<TransactionKind>,
    ) -> impl Future<Output = Result<Option<Transaction>, LedgerError>> + Send;

    /// Resolves a log entry for `owner` and locks it until the unit ends.
    ///
    /// Callers lock the entry's accounts first. With `kind` set, entries of
    /// other kinds are not found.
    fn find_transaction(
        &mut self,
        id: TransactionId,
        owner: UserId,
        kind: Option<TransactionKind>,
    ) -> impl Future<Output = Result<Option<Transaction>, LedgerError>> + Send;

    /// Removes a log entry.
    fn remove(&mut self, id: TransactionId) -> impl Future<Output = Result<(), LedgerError>> + Send;

    /// Makes every write of this unit visible.
    fn commit(self) -> impl Future<Output = Result<(), LedgerError>> + Send;
}

/// Owner-scoped reads of the transaction log.
pub trait LedgerReader: Send + Sync {
    /// Lists an owner's transactions, newest date first. `None` lists all kinds.
    fn list_transactions(
        &self,
        owner: UserId,
        kind: Option<TransactionKind>,
    ) -> impl Future<Output = Result<Vec<Transaction>, LedgerError>> + Send;

    /// Fetches one of an owner's transactions.
    fn get_transaction(
        &self,
        id: TransactionId,
        owner: UserId,
        kind: Option<TransactionKind>,
    ) -> impl Future<Output = Result<Option<Transaction>, LedgerError>> + Send;
}
