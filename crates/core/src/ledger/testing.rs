//! In-memory ledger store for tests, with fault injection.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tally_shared::types::{AccountId, Money, TransactionId, UserId};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::error::LedgerError;
use super::store::{LedgerReader, LedgerStore, LedgerUnit};
use super::types::{Account, Transaction, TransactionDraft, TransactionKind};

/// Failures a [`MemoryStore`] injects into its units.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Faults {
    /// Fail `adjust_balance` once this many adjustments succeeded in a unit.
    pub fail_adjust_after: Option<usize>,
    /// Remove the target account right before adjusting it.
    pub drop_account_on_adjust: bool,
    /// Fail `commit`.
    pub fail_commit: bool,
    /// Remove a transaction between its unlocked read and its lock, as a
    /// concurrent delete would.
    pub vanish_before_lock: bool,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    accounts: BTreeMap<AccountId, Account>,
    transactions: Vec<Transaction>,
}

/// Units hold the whole state lock, so they run one at a time.
#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    faults: Arc<Mutex<Faults>>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_faults(faults: Faults) -> Self {
        Self {
            state: Arc::default(),
            faults: Arc::new(Mutex::new(faults)),
        }
    }

    pub(crate) async fn set_faults(&self, faults: Faults) {
        *self.faults.lock().await = faults;
    }

    pub(crate) async fn seed_account(
        &self,
        owner: UserId,
        name: &str,
        opening: Money,
    ) -> AccountId {
        let now = Utc::now();
        let account = Account {
            id: AccountId::new(),
            owner,
            name: name.to_string(),
            balance: opening,
            created_at: now,
            updated_at: now,
        };
        let id = account.id;
        self.state.lock().await.accounts.insert(id, account);
        id
    }

    pub(crate) async fn balance(&self, id: AccountId) -> Money {
        self.state
            .lock()
            .await
            .accounts
            .get(&id)
            .map_or(Money::ZERO, |account| account.balance)
    }

    pub(crate) async fn log(&self) -> Vec<Transaction> {
        self.state.lock().await.transactions.clone()
    }
}

pub(crate) struct MemoryUnit {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    faults: Faults,
    adjusted: usize,
}

impl LedgerStore for MemoryStore {
    type Unit = MemoryUnit;

    async fn begin(&self) -> Result<MemoryUnit, LedgerError> {
        let faults = *self.faults.lock().await;
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(MemoryUnit {
            guard,
            working,
            faults,
            adjusted: 0,
        })
    }
}

impl LedgerUnit for MemoryUnit {
    async fn find_account(
        &mut self,
        id: AccountId,
        owner: UserId,
    ) -> Result<Option<Account>, LedgerError> {
        Ok(self
            .working
            .accounts
            .get(&id)
            .filter(|account| account.owner == owner)
            .cloned())
    }

    async fn adjust_balance(&mut self, id: AccountId, delta: Money) -> Result<(), LedgerError> {
        if self.faults.fail_adjust_after == Some(self.adjusted) {
            return Err(LedgerError::Storage("injected adjust failure".to_string()));
        }
        if self.faults.drop_account_on_adjust {
            self.working.accounts.remove(&id);
        }
        let account = self.working.accounts.get_mut(&id).ok_or_else(|| {
            LedgerError::InvariantViolation(format!("balance adjustment hit missing account {id}"))
        })?;
        account.balance += delta;
        account.updated_at = Utc::now();
        self.adjusted += 1;
        Ok(())
    }

    async fn append(
        &mut self,
        owner: UserId,
        draft: &TransactionDraft,
    ) -> Result<Transaction, LedgerError> {
        let transaction = Transaction {
            id: TransactionId::new(),
            owner,
            description: draft.description.clone(),
            amount: draft.amount,
            date: draft.date,
            completed: draft.completed,
            detail: draft.detail,
            created_at: Utc::now(),
        };
        self.working.transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn peek_transaction(
        &mut self,
        id: TransactionId,
        owner: UserId,
        kind: Option<TransactionKind>,
    ) -> Result<Option<Transaction>, LedgerError> {
        Ok(find(&self.working.transactions, id, owner, kind))
    }

    async fn find_transaction(
        &mut self,
        id: TransactionId,
        owner: UserId,
        kind: Option<TransactionKind>,
    ) -> Result<Option<Transaction>, LedgerError> {
        if self.faults.vanish_before_lock {
            self.working.transactions.retain(|t| t.id != id);
        }
        Ok(find(&self.working.transactions, id, owner, kind))
    }

    async fn remove(&mut self, id: TransactionId) -> Result<(), LedgerError> {
        let position = self
            .working
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| LedgerError::InvariantViolation(format!("missing transaction {id}")))?;
        self.working.transactions.remove(position);
        Ok(())
    }

    async fn commit(mut self) -> Result<(), LedgerError> {
        if self.faults.fail_commit {
            return Err(LedgerError::Storage("injected commit failure".to_string()));
        }
        *self.guard = std::mem::take(&mut self.working);
        Ok(())
    }
}

impl LedgerReader for MemoryStore {
    async fn list_transactions(
        &self,
        owner: UserId,
        kind: Option<TransactionKind>,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let state = self.state.lock().await;
        Ok(state
            .transactions
            .iter()
            .filter(|t| t.owner == owner && kind.is_none_or(|k| t.kind() == k))
            .cloned()
            .collect())
    }

    async fn get_transaction(
        &self,
        id: TransactionId,
        owner: UserId,
        kind: Option<TransactionKind>,
    ) -> Result<Option<Transaction>, LedgerError> {
        let state = self.state.lock().await;
        Ok(find(&state.transactions, id, owner, kind))
    }
}

fn find(
    log: &[Transaction],
    id: TransactionId,
    owner: UserId,
    kind: Option<TransactionKind>,
) -> Option<Transaction> {
    log.iter()
        .find(|t| t.id == id && t.owner == owner && kind.is_none_or(|k| t.kind() == k))
        .cloned()
}
