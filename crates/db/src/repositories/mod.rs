//! Repository layer for database operations.

pub mod account;
pub mod ledger;
pub mod transaction;
pub mod user;

pub use account::{AccountError, AccountRepository};
pub use ledger::{SeaLedgerStore, SeaLedgerUnit};
pub use transaction::TransactionRepository;
pub use user::{UserError, UserRepository};

use sea_orm::DbErr;
use tally_core::ledger::LedgerError;

/// Wraps a database error for the ledger.
pub(crate) fn storage_error(err: DbErr) -> LedgerError {
    LedgerError::Storage(err.to_string())
}
