//! Ledger error types.
//!
//! Validation errors are raised before any unit of work opens. Everything
//! else aborts the unit, which rolls it back.

use rust_decimal::Decimal;
use tally_shared::types::{AccountId, TransactionId};
use thiserror::Error;

use crate::auth::AuthError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    // ========== Lookup Errors ==========
    /// Account does not exist for this owner.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Transaction does not exist for this owner (or has another kind).
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    // ========== Access Errors ==========
    /// No caller identity.
    #[error("Authentication required")]
    Unauthenticated,

    // ========== Validation Errors ==========
    /// Description is empty or whitespace.
    #[error("Description must not be blank")]
    EmptyDescription,

    /// Amount is zero or negative.
    #[error("Amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),

    /// Amount has more than two fractional digits or is out of range.
    #[error("Amount {0} cannot be represented in minor units")]
    ExcessPrecision(Decimal),

    /// Transfer source and destination are the same account.
    #[error("Transfer source and destination must differ (account {0})")]
    SameAccountTransfer(AccountId),

    /// Account name is empty or whitespace.
    #[error("Account name must not be blank")]
    InvalidAccountName,

    /// Applying the change would push the balance outside the minor-unit range.
    #[error("Balance of account {0} would leave the representable range")]
    BalanceOutOfRange(AccountId),

    // ========== Fatal Errors ==========
    /// A storage operation broke a ledger invariant.
    #[error("Ledger invariant violated: {0}")]
    InvariantViolation(String),

    /// Storage failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Returns the snake_case error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "account_not_found",
            Self::TransactionNotFound(_) => "transaction_not_found",
            Self::Unauthenticated => "unauthenticated",
            Self::EmptyDescription => "empty_description",
            Self::NonPositiveAmount(_) => "non_positive_amount",
            Self::ExcessPrecision(_) => "excess_precision",
            Self::SameAccountTransfer(_) => "same_account_transfer",
            Self::InvalidAccountName => "invalid_account_name",
            Self::BalanceOutOfRange(_) => "balance_out_of_range",
            Self::InvariantViolation(_) => "invariant_violation",
            Self::Storage(_) => "storage_error",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::EmptyDescription
            | Self::NonPositiveAmount(_)
            | Self::ExcessPrecision(_)
            | Self::SameAccountTransfer(_)
            | Self::InvalidAccountName
            | Self::BalanceOutOfRange(_) => 400,

            Self::Unauthenticated => 401,

            Self::AccountNotFound(_) | Self::TransactionNotFound(_) => 404,

            Self::InvariantViolation(_) | Self::Storage(_) => 500,
        }
    }

    /// True for errors that indicate corrupted ledger state.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }

    /// True for caller mistakes, rejected without any effect.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        self.http_status_code() == 400
    }
}

impl From<AuthError> for LedgerError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated => Self::Unauthenticated,
        }
    }
}
