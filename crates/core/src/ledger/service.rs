//! Ledger service: the only place a log write is paired with balance changes.
//!
//! Every writing operation runs as one unit of work:
//! 1. Validate the draft (before any storage access)
//! 2. Resolve and lock every involved account for the owner, in id order
//! 3. Check that every resulting balance stays representable in minor units
//! 4. Write or remove the log entry
//! 5. Apply the legs (or their negation)
//! 6. Commit
//!
//! Any failure drops the unit, which rolls back steps 2-5. Deletion reads
//! the log entry unlocked, locks its accounts, then locks the entry, so every
//! writer takes account locks before log locks.

use std::sync::Arc;

use tally_shared::types::{AccountId, TransactionId, UserId};
use tracing::{debug, error, info, warn};

use super::effect::{Direction, Leg, legs};
use super::error::LedgerError;
use super::store::{LedgerReader, LedgerStore, LedgerUnit};
use super::types::{
    Account, EntryInput, Transaction, TransactionDetail, TransactionDraft, TransactionKind,
};
use super::validation::validate_draft;

/// Orchestrates income, expense and transfer operations over a store.
pub struct LedgerService<S> {
    store: Arc<S>,
}

impl<S> Clone for LedgerService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> LedgerService<S>
where
    S: LedgerStore + LedgerReader,
{
    /// Creates a new ledger service.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    // ========== Generic entry points ==========

    /// Records a transaction of any kind and applies its effects.
    pub async fn create(
        &self,
        owner: UserId,
        draft: TransactionDraft,
    ) -> Result<Transaction, LedgerError> {
        validate_draft(&draft)?;

        let kind = draft.detail.kind();
        let transaction = self
            .create_in_unit(owner, &draft)
            .await
            .inspect_err(|e| log_failure("create", kind, e))?;

        info!(
            owner_id = %owner,
            transaction_id = %transaction.id,
            kind = %kind,
            amount = %transaction.amount,
            "Transaction created"
        );
        Ok(transaction)
    }

    /// Removes a transaction of the given kind and reverses its effects.
    ///
    /// Returns the removed transaction.
    pub async fn delete(
        &self,
        owner: UserId,
        kind: TransactionKind,
        id: TransactionId,
    ) -> Result<Transaction, LedgerError> {
        let transaction = self
            .delete_in_unit(owner, kind, id)
            .await
            .inspect_err(|e| log_failure("delete", kind, e))?;

        info!(
            owner_id = %owner,
            transaction_id = %id,
            kind = %kind,
            amount = %transaction.amount,
            "Transaction deleted"
        );
        Ok(transaction)
    }

    async fn create_in_unit(
        &self,
        owner: UserId,
        draft: &TransactionDraft,
    ) -> Result<Transaction, LedgerError> {
        let mut unit = self.store.begin().await?;

        let mut locked = Vec::new();
        for account in draft.detail.accounts() {
            let Some(found) = unit.find_account(account, owner).await? else {
                debug!(owner_id = %owner, account_id = %account, "Account not resolved");
                return Err(LedgerError::AccountNotFound(account));
            };
            locked.push(found);
        }

        let changes = legs(&draft.detail, draft.amount, Direction::Apply);
        ensure_in_range(&locked, &changes)?;

        let transaction = unit.append(owner, draft).await?;
        apply_legs(&mut unit, changes).await?;
        unit.commit().await?;

        Ok(transaction)
    }

    async fn delete_in_unit(
        &self,
        owner: UserId,
        kind: TransactionKind,
        id: TransactionId,
    ) -> Result<Transaction, LedgerError> {
        let mut unit = self.store.begin().await?;

        let seen = unit
            .peek_transaction(id, owner, Some(kind))
            .await?
            .ok_or(LedgerError::TransactionNotFound(id))?;

        let mut locked = Vec::new();
        let mut missing = None;
        for account in seen.detail.accounts() {
            match unit.find_account(account, owner).await? {
                Some(found) => locked.push(found),
                None => missing = Some(account),
            }
        }

        // Gone here means a concurrent delete (or account removal) won.
        let transaction = unit
            .find_transaction(id, owner, Some(kind))
            .await?
            .ok_or(LedgerError::TransactionNotFound(id))?;
        if let Some(account) = missing {
            return Err(LedgerError::InvariantViolation(format!(
                "transaction {id} references account {account} outside its owner"
            )));
        }

        let changes = legs(&transaction.detail, transaction.amount, Direction::Reverse);
        ensure_in_range(&locked, &changes)?;

        apply_legs(&mut unit, changes).await?;
        unit.remove(id).await?;
        unit.commit().await?;

        Ok(transaction)
    }

    async fn retrieve(
        &self,
        owner: UserId,
        kind: Option<TransactionKind>,
        id: TransactionId,
    ) -> Result<Transaction, LedgerError> {
        self.store
            .get_transaction(id, owner, kind)
            .await?
            .ok_or(LedgerError::TransactionNotFound(id))
    }

    // ========== Incomes ==========

    /// Records an income credited to `account`.
    pub async fn create_income(
        &self,
        owner: UserId,
        account: AccountId,
        entry: EntryInput,
    ) -> Result<Transaction, LedgerError> {
        let detail = TransactionDetail::Income { account };
        self.create(owner, TransactionDraft::new(entry, detail)).await
    }

    /// Deletes an income and debits its account back.
    pub async fn delete_income(
        &self,
        owner: UserId,
        id: TransactionId,
    ) -> Result<Transaction, LedgerError> {
        self.delete(owner, TransactionKind::Income, id).await
    }

    /// Fetches one income.
    pub async fn retrieve_income(
        &self,
        owner: UserId,
        id: TransactionId,
    ) -> Result<Transaction, LedgerError> {
        self.retrieve(owner, Some(TransactionKind::Income), id).await
    }

    /// Lists all incomes of an owner.
    pub async fn retrieve_all_incomes(
        &self,
        owner: UserId,
    ) -> Result<Vec<Transaction>, LedgerError> {
        self.store
            .list_transactions(owner, Some(TransactionKind::Income))
            .await
    }

    // ========== Expenses ==========

    /// Records an expense debited from `account`.
    pub async fn create_expense(
        &self,
        owner: UserId,
        account: AccountId,
        entry: EntryInput,
    ) -> Result<Transaction, LedgerError> {
        let detail = TransactionDetail::Expense { account };
        self.create(owner, TransactionDraft::new(entry, detail)).await
    }

    /// Deletes an expense and credits its account back.
    pub async fn delete_expense(
        &self,
        owner: UserId,
        id: TransactionId,
    ) -> Result<Transaction, LedgerError> {
        self.delete(owner, TransactionKind::Expense, id).await
    }

    /// Fetches one expense.
    pub async fn retrieve_expense(
        &self,
        owner: UserId,
        id: TransactionId,
    ) -> Result<Transaction, LedgerError> {
        self.retrieve(owner, Some(TransactionKind::Expense), id).await
    }

    /// Lists all expenses of an owner.
    pub async fn retrieve_all_expenses(
        &self,
        owner: UserId,
    ) -> Result<Vec<Transaction>, LedgerError> {
        self.store
            .list_transactions(owner, Some(TransactionKind::Expense))
            .await
    }

    // ========== Transfers ==========

    /// Moves money from `source` to `destination`.
    pub async fn create_transfer(
        &self,
        owner: UserId,
        source: AccountId,
        destination: AccountId,
        entry: EntryInput,
    ) -> Result<Transaction, LedgerError> {
        let detail = TransactionDetail::Transfer {
            source,
            destination,
        };
        self.create(owner, TransactionDraft::new(entry, detail)).await
    }

    /// Deletes a transfer and moves the money back.
    pub async fn delete_transfer(
        &self,
        owner: UserId,
        id: TransactionId,
    ) -> Result<Transaction, LedgerError> {
        self.delete(owner, TransactionKind::Transfer, id).await
    }

    /// Fetches one transfer.
    pub async fn retrieve_transfer(
        &self,
        owner: UserId,
        id: TransactionId,
    ) -> Result<Transaction, LedgerError> {
        self.retrieve(owner, Some(TransactionKind::Transfer), id).await
    }

    /// Lists all transfers of an owner.
    pub async fn retrieve_all_transfers(
        &self,
        owner: UserId,
    ) -> Result<Vec<Transaction>, LedgerError> {
        self.store
            .list_transactions(owner, Some(TransactionKind::Transfer))
            .await
    }

    // ========== Any kind ==========

    /// Fetches one transaction regardless of kind.
    pub async fn retrieve_transaction(
        &self,
        owner: UserId,
        id: TransactionId,
    ) -> Result<Transaction, LedgerError> {
        self.retrieve(owner, None, id).await
    }

    /// Lists every transaction of an owner.
    pub async fn retrieve_all_transactions(
        &self,
        owner: UserId,
    ) -> Result<Vec<Transaction>, LedgerError> {
        self.store.list_transactions(owner, None).await
    }
}

/// Rejects legs that would move a locked balance outside the minor-unit range.
fn ensure_in_range(locked: &[Account], legs: &[Leg]) -> Result<(), LedgerError> {
    for leg in legs {
        let account = locked
            .iter()
            .find(|account| account.id == leg.account)
            .ok_or_else(|| {
                LedgerError::InvariantViolation(format!("leg for unlocked account {}", leg.account))
            })?;
        if account.balance.checked_add(leg.delta).is_none() {
            return Err(LedgerError::BalanceOutOfRange(leg.account));
        }
    }
    Ok(())
}

async fn apply_legs<U: LedgerUnit>(unit: &mut U, legs: Vec<Leg>) -> Result<(), LedgerError> {
    for leg in legs {
        unit.adjust_balance(leg.account, leg.delta).await?;
    }
    Ok(())
}

fn log_failure(operation: &str, kind: TransactionKind, err: &LedgerError) {
    if err.is_fatal() {
        error!(
            operation,
            kind = %kind,
            error = %err,
            "Ledger invariant violated, unit rolled back"
        );
    } else if err.is_validation() {
        debug!(operation, kind = %kind, error = %err, "Ledger operation rejected");
    } else if let LedgerError::Storage(_) = err {
        warn!(
            operation,
            kind = %kind,
            error = %err,
            "Ledger storage failed, unit rolled back"
        );
    } else {
        debug!(operation, kind = %kind, error = %err, "Ledger operation refused");
    }
}
