//! Domain types for accounts and transactions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, Money, TransactionId, UserId};

/// An owner-scoped monetary account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Owning user.
    pub owner: UserId,
    /// Display name, never blank.
    pub name: String,
    /// Opening balance plus every committed effect.
    pub balance: Money,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last rename or balance change.
    pub updated_at: DateTime<Utc>,
}

/// Discriminator of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money entering an account.
    Income,
    /// Money leaving an account.
    Expense,
    /// Money moving between two accounts of the same owner.
    Transfer,
}

impl TransactionKind {
    /// Lowercase name used in storage and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The accounts a transaction touches, by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionDetail {
    /// Credits `account`.
    Income {
        /// Credited account.
        account: AccountId,
    },
    /// Debits `account`.
    Expense {
        /// Debited account.
        account: AccountId,
    },
    /// Debits `source` and credits `destination`.
    Transfer {
        /// Debited account.
        source: AccountId,
        /// Credited account.
        destination: AccountId,
    },
}

impl TransactionDetail {
    /// Returns the kind discriminator.
    #[must_use]
    pub const fn kind(&self) -> TransactionKind {
        match self {
            Self::Income { .. } => TransactionKind::Income,
            Self::Expense { .. } => TransactionKind::Expense,
            Self::Transfer { .. } => TransactionKind::Transfer,
        }
    }

    /// Distinct accounts referenced, in ascending id order.
    ///
    /// This is the order in which a unit of work resolves and locks them.
    #[must_use]
    pub fn accounts(&self) -> Vec<AccountId> {
        let mut ids = match *self {
            Self::Income { account } | Self::Expense { account } => vec![account],
            Self::Transfer {
                source,
                destination,
            } => vec![source, destination],
        };
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// The fields every kind shares, as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInput {
    /// Free-text description, never blank.
    pub description: String,
    /// Strictly positive amount.
    pub amount: Money,
    /// Booking date.
    pub date: NaiveDate,
    /// Whether the transaction already happened (as opposed to planned).
    pub completed: bool,
}

/// A transaction that has not been written yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    /// Free-text description.
    pub description: String,
    /// Strictly positive amount.
    pub amount: Money,
    /// Booking date.
    pub date: NaiveDate,
    /// Completed flag.
    pub completed: bool,
    /// Kind and accounts.
    pub detail: TransactionDetail,
}

impl TransactionDraft {
    /// Combines the shared fields with a kind-specific detail.
    #[must_use]
    pub fn new(entry: EntryInput, detail: TransactionDetail) -> Self {
        Self {
            description: entry.description,
            amount: entry.amount,
            date: entry.date,
            completed: entry.completed,
            detail,
        }
    }
}

/// A committed transaction as recorded in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Transaction ID.
    pub id: TransactionId,
    /// Owning user.
    pub owner: UserId,
    /// Free-text description.
    pub description: String,
    /// Strictly positive amount; the sign of each effect comes from `detail`.
    pub amount: Money,
    /// Booking date.
    pub date: NaiveDate,
    /// Completed flag.
    pub completed: bool,
    /// Kind and accounts.
    pub detail: TransactionDetail,
    /// When the log entry was written.
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Returns the kind discriminator.
    #[must_use]
    pub const fn kind(&self) -> TransactionKind {
        self.detail.kind()
    }
}
