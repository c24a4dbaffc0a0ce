//! SeaORM entity for the `escrows` table.

use sea_orm::entity::prelude::*;

use crate::domain::{Escrow, EscrowStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "escrows")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Option<Uuid>,
    pub amount: Decimal,
    pub payment_method: String,
    pub payment_details: Option<Json>,
    pub deposit_address: Option<String>,
    pub status: String,
    pub agreement: Option<String>,
    pub seller_terms: Option<String>,
    pub seller_deliverables: Option<String>,
    pub buyer_release_note: Option<String>,
    pub seller_reject_reason: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub delivered_at: Option<DateTimeUtc>,
    pub released_at: Option<DateTimeUtc>,
    pub seller_request_time: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Escrow {
    fn from(model: Model) -> Self {
        Escrow {
            id: model.id,
            buyer_id: model.buyer_id,
            seller_id: model.seller_id,
            amount: model.amount,
            payment_method: model.payment_method,
            payment_details: model.payment_details,
            deposit_address: model.deposit_address,
            // A status outside the table would mean a corrupted row; surface
            // it as cancelled (terminal) so no transition can run on it.
            status: EscrowStatus::parse(&model.status).unwrap_or(EscrowStatus::Cancelled),
            agreement: model.agreement,
            seller_terms: model.seller_terms,
            seller_deliverables: model.seller_deliverables,
            buyer_release_note: model.buyer_release_note,
            seller_reject_reason: model.seller_reject_reason,
            created_at: model.created_at,
            updated_at: model.updated_at,
            delivered_at: model.delivered_at,
            released_at: model.released_at,
            seller_request_time: model.seller_request_time,
        }
    }
}
