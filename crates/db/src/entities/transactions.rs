//! `SeaORM` Entity for transactions table.
//!
//! One table holds every kind. Incomes and expenses use `account_id`;
//! transfers use `source_account_id` and `destination_account_id`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::TransactionKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub kind: TransactionKind,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub amount_minor: i64,
    pub transaction_date: Date,
    pub completed: bool,
    pub account_id: Option<Uuid>,
    pub source_account_id: Option<Uuid>,
    pub destination_account_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Account,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::SourceAccountId",
        to = "super::accounts::Column::Id"
    )]
    SourceAccount,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::DestinationAccountId",
        to = "super::accounts::Column::Id"
    )]
    DestinationAccount,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
