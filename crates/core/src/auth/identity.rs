//! Caller identity contract.

use tally_shared::types::UserId;
use thiserror::Error;

/// Errors raised while resolving the caller.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No authenticated caller.
    #[error("authentication required")]
    Unauthenticated,
}

/// Resolves the owner on whose behalf an operation runs.
///
/// The ledger trusts the returned owner and scopes every lookup by it.
pub trait Identity {
    /// Returns the authenticated owner.
    fn current_owner(&self) -> Result<UserId, AuthError>;
}

impl Identity for UserId {
    fn current_owner(&self) -> Result<UserId, AuthError> {
        Ok(*self)
    }
}

impl<T: Identity> Identity for Option<T> {
    fn current_owner(&self) -> Result<UserId, AuthError> {
        self.as_ref()
            .ok_or(AuthError::Unauthenticated)?
            .current_owner()
    }
}
