//! Ledger consistency core.
//!
//! This module implements:
//! - Domain types for accounts and income/expense/transfer transactions
//! - The balance effect of each kind (`effect::legs`)
//! - Business rule validation
//! - Storage traits for units of work and owner-scoped reads
//! - The ledger service pairing log writes with balance changes

pub mod effect;
pub mod error;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;
#[cfg(test)]
mod testing;

pub use effect::{Direction, Leg, expected_balance, legs};
pub use error::LedgerError;
pub use service::LedgerService;
pub use store::{LedgerReader, LedgerStore, LedgerUnit};
pub use types::{
    Account, EntryInput, Transaction, TransactionDetail, TransactionDraft, TransactionKind,
};
pub use validation::{validate_account_name, validate_amount, validate_draft};
