//! Core business logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Storage is reached only through the traits in [`ledger::store`], which the
//! db crate implements.
//!
//! # Modules
//!
//! - `ledger` - Accounts, transactions and the rules that keep balances
//!   consistent with the transaction log
//! - `auth` - Password hashing and the caller identity contract

pub mod auth;
pub mod ledger;
