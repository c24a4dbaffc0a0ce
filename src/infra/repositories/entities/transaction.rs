//! SeaORM entity for the `transactions` audit-log table. Append-only.

use sea_orm::entity::prelude::*;

use crate::domain::{AuditEntry, AuditType};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub escrow_id: Uuid,
    #[sea_orm(column_name = "type")]
    pub entry_type: String,
    pub description: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::escrow::Entity",
        from = "Column::EscrowId",
        to = "super::escrow::Column::Id"
    )]
    Escrow,
}

impl Related<super::escrow::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Escrow.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for AuditEntry {
    fn from(model: Model) -> Self {
        AuditEntry {
            id: model.id,
            escrow_id: model.escrow_id,
            entry_type: AuditType::parse(&model.entry_type).unwrap_or(AuditType::Create),
            description: model.description,
            created_at: model.created_at,
        }
    }
}
