//! Authentication support for the core.
//!
//! This module provides:
//! - Password hashing and verification with Argon2id
//! - The [`Identity`] contract the ledger relies on to learn who is calling

mod identity;
mod password;

pub use identity::{AuthError, Identity};
pub use password::{PasswordError, hash_password, verify_password};
