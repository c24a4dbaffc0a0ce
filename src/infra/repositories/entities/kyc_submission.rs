//! SeaORM entity for the `kyc_submissions` table.

use sea_orm::entity::prelude::*;

use crate::domain::{KycStatus, KycSubmission};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "kyc_submissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub kyc_type: String,
    pub status: String,
    pub admin_note: Option<String>,
    pub submitted_at: DateTimeUtc,
    pub reviewed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for KycSubmission {
    fn from(model: Model) -> Self {
        KycSubmission {
            id: model.id,
            user_id: model.user_id,
            kyc_type: model.kyc_type,
            status: KycStatus::parse(&model.status).unwrap_or(KycStatus::Pending),
            admin_note: model.admin_note,
            submitted_at: model.submitted_at,
            reviewed_at: model.reviewed_at,
        }
    }
}
