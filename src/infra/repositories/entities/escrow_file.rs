//! SeaORM entity for the `escrow_files` metadata table. Append-only.

use sea_orm::entity::prelude::*;

use crate::domain::{FilePurpose, FileRecord};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "escrow_files")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// NULL for KYC files, which attach to a submission instead.
    pub escrow_id: Option<Uuid>,
    pub file_name: String,
    pub stored_name: String,
    pub purpose: String,
    pub uploaded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for FileRecord {
    fn from(model: Model) -> Self {
        FileRecord {
            id: model.id,
            escrow_id: model.escrow_id,
            file_name: model.file_name,
            stored_name: model.stored_name,
            purpose: FilePurpose::parse(&model.purpose).unwrap_or(FilePurpose::Delivery),
            uploaded_at: model.uploaded_at,
        }
    }
}
