//! `SeaORM` active enums.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::ledger;

/// Stored discriminator of the `transactions` table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    #[sea_orm(string_value = "income")]
    Income,
    #[sea_orm(string_value = "expense")]
    Expense,
    #[sea_orm(string_value = "transfer")]
    Transfer,
}

impl From<ledger::TransactionKind> for TransactionKind {
    fn from(kind: ledger::TransactionKind) -> Self {
        match kind {
            ledger::TransactionKind::Income => Self::Income,
            ledger::TransactionKind::Expense => Self::Expense,
            ledger::TransactionKind::Transfer => Self::Transfer,
        }
    }
}

impl From<TransactionKind> for ledger::TransactionKind {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Income => Self::Income,
            TransactionKind::Expense => Self::Expense,
            TransactionKind::Transfer => Self::Transfer,
        }
    }
}
