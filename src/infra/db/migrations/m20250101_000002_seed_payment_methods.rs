//! Migration: Seed the payment-method directory.
//!
//! The runtime fallback covers unknown codes, but a fresh install still
//! gets the USDT TRC20 method as real reference data.

use sea_orm_migration::prelude::*;
use serde_json::json;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let insert = Query::insert()
            .into_table(PaymentMethods::Table)
            .columns([
                PaymentMethods::Code,
                PaymentMethods::Label,
                PaymentMethods::Details,
                PaymentMethods::Active,
            ])
            .values_panic([
                "USDT_TRC20".into(),
                "USDT (TRC20)".into(),
                json!({
                    "address": "TExampleWalletAddress12345",
                    "note": "Send only USDT TRC20"
                })
                .into(),
                true.into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(PaymentMethods::Table)
            .and_where(Expr::col(PaymentMethods::Code).eq("USDT_TRC20"))
            .to_owned();

        manager.exec_stmt(delete).await
    }
}

#[derive(Iden)]
enum PaymentMethods {
    Table,
    Code,
    Label,
    Details,
    Active,
}
