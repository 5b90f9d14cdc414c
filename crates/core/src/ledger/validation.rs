//! Business rule validation for drafts and account names.
//!
//! Runs before a unit of work opens, so a rejected draft changes nothing.

use super::error::LedgerError;
use super::types::{TransactionDetail, TransactionDraft};
use tally_shared::types::Money;

/// Validates a transaction draft.
///
/// Checks, in order: non-blank description, strictly positive amount, amount
/// representable in minor units, and distinct transfer accounts.
pub fn validate_draft(draft: &TransactionDraft) -> Result<(), LedgerError> {
    if draft.description.trim().is_empty() {
        return Err(LedgerError::EmptyDescription);
    }
    validate_amount(draft.amount)?;
    if let TransactionDetail::Transfer {
        source,
        destination,
    } = draft.detail
        && source == destination
    {
        return Err(LedgerError::SameAccountTransfer(source));
    }
    Ok(())
}

/// Validates a transaction amount.
pub fn validate_amount(amount: Money) -> Result<(), LedgerError> {
    if !amount.is_positive() {
        return Err(LedgerError::NonPositiveAmount(amount.amount()));
    }
    if amount.to_minor_units().is_none() {
        return Err(LedgerError::ExcessPrecision(amount.amount()));
    }
    Ok(())
}

/// Validates an account name and returns it trimmed.
pub fn validate_account_name(name: &str) -> Result<String, LedgerError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidAccountName);
    }
    Ok(trimmed.to_string())
}
