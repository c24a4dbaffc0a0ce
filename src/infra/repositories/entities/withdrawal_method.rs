//! SeaORM entity for the `seller_withdrawal_methods` table.
//!
//! Keyed by seller id: at most one record per seller, updated in place.

use sea_orm::entity::prelude::*;

use crate::domain::WithdrawalMethod;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "seller_withdrawal_methods")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    pub method_code: String,
    pub details: Json,
    pub active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for WithdrawalMethod {
    fn from(model: Model) -> Self {
        WithdrawalMethod {
            user_id: model.user_id,
            method_code: model.method_code,
            details: model.details,
            active: model.active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
