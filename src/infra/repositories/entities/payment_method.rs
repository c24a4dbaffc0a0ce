//! SeaORM entity for the `payment_methods` reference table.
//!
//! The serial primary key gives `listActive` its stable monotonic order.

use sea_orm::entity::prelude::*;

use crate::domain::PaymentMethod;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payment_methods")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub code: String,
    pub label: String,
    pub details: Json,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PaymentMethod {
    fn from(model: Model) -> Self {
        PaymentMethod {
            code: model.code,
            label: model.label,
            details: model.details,
            active: model.active,
        }
    }
}
