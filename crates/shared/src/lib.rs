//! Shared types, errors, and configuration for Tally.
//!
//! This crate provides common types used across all other crates:
//! - `Money`, a fixed-point amount with two fractional digits
//! - Typed IDs for users, accounts and transactions
//! - Application-wide error types
//! - Configuration management
//! - JWT issuance and validation

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;


pub use auth::Claims;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
