//! Migration: Create the core tables.
//!
//! Users, sessions, escrows, the append-only transactions audit log,
//! payment methods, seller withdrawal methods, KYC submissions and
//! escrow file metadata.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .col(
                        ColumnDef::new(Sessions::Token)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sessions::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(Sessions::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sessions_user_id")
                            .from(Sessions::Table, Sessions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sessions_user_id")
                    .table(Sessions::Table)
                    .col(Sessions::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Escrows::Table)
                    .col(ColumnDef::new(Escrows::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Escrows::BuyerId).uuid().not_null())
                    .col(ColumnDef::new(Escrows::SellerId).uuid().null())
                    .col(ColumnDef::new(Escrows::Amount).decimal().not_null())
                    .col(ColumnDef::new(Escrows::PaymentMethod).string().not_null())
                    .col(ColumnDef::new(Escrows::PaymentDetails).json_binary().null())
                    .col(ColumnDef::new(Escrows::DepositAddress).string().null())
                    .col(ColumnDef::new(Escrows::Status).string().not_null())
                    .col(ColumnDef::new(Escrows::Agreement).text().null())
                    .col(ColumnDef::new(Escrows::SellerTerms).text().null())
                    .col(ColumnDef::new(Escrows::SellerDeliverables).text().null())
                    .col(ColumnDef::new(Escrows::BuyerReleaseNote).text().null())
                    .col(ColumnDef::new(Escrows::SellerRejectReason).text().null())
                    .col(
                        ColumnDef::new(Escrows::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Escrows::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Escrows::DeliveredAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Escrows::ReleasedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Escrows::SellerRequestTime)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_escrows_buyer_id")
                            .from(Escrows::Table, Escrows::BuyerId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_escrows_seller_id")
                            .from(Escrows::Table, Escrows::SellerId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_escrows_buyer_id")
                    .table(Escrows::Table)
                    .col(Escrows::BuyerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_escrows_seller_id")
                    .table(Escrows::Table)
                    .col(Escrows::SellerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_escrows_status")
                    .table(Escrows::Table)
                    .col(Escrows::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::EscrowId).uuid().not_null())
                    .col(ColumnDef::new(Transactions::Type).string().not_null())
                    .col(ColumnDef::new(Transactions::Description).text().not_null())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_escrow_id")
                            .from(Transactions::Table, Transactions::EscrowId)
                            .to(Escrows::Table, Escrows::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_escrow_id")
                    .table(Transactions::Table)
                    .col(Transactions::EscrowId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PaymentMethods::Table)
                    .col(
                        ColumnDef::new(PaymentMethods::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PaymentMethods::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(PaymentMethods::Label).string().not_null())
                    .col(
                        ColumnDef::new(PaymentMethods::Details)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentMethods::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SellerWithdrawalMethods::Table)
                    .col(
                        ColumnDef::new(SellerWithdrawalMethods::UserId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SellerWithdrawalMethods::MethodCode)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SellerWithdrawalMethods::Details)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SellerWithdrawalMethods::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SellerWithdrawalMethods::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SellerWithdrawalMethods::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_withdrawal_methods_user_id")
                            .from(
                                SellerWithdrawalMethods::Table,
                                SellerWithdrawalMethods::UserId,
                            )
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(KycSubmissions::Table)
                    .col(
                        ColumnDef::new(KycSubmissions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(KycSubmissions::UserId).uuid().not_null())
                    .col(ColumnDef::new(KycSubmissions::KycType).string().not_null())
                    .col(ColumnDef::new(KycSubmissions::Status).string().not_null())
                    .col(ColumnDef::new(KycSubmissions::AdminNote).text().null())
                    .col(
                        ColumnDef::new(KycSubmissions::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(KycSubmissions::ReviewedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_kyc_submissions_user_id")
                            .from(KycSubmissions::Table, KycSubmissions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_kyc_submissions_user_id")
                    .table(KycSubmissions::Table)
                    .col(KycSubmissions::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EscrowFiles::Table)
                    .col(
                        ColumnDef::new(EscrowFiles::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EscrowFiles::EscrowId).uuid().null())
                    .col(ColumnDef::new(EscrowFiles::FileName).string().not_null())
                    .col(ColumnDef::new(EscrowFiles::StoredName).string().not_null())
                    .col(ColumnDef::new(EscrowFiles::Purpose).string().not_null())
                    .col(
                        ColumnDef::new(EscrowFiles::UploadedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_escrow_files_escrow_id")
                            .from(EscrowFiles::Table, EscrowFiles::EscrowId)
                            .to(Escrows::Table, Escrows::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_escrow_files_escrow_id")
                    .table(EscrowFiles::Table)
                    .col(EscrowFiles::EscrowId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EscrowFiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(KycSubmissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SellerWithdrawalMethods::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PaymentMethods::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Escrows::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    Role,
    CreatedAt,
}

#[derive(Iden)]
enum Sessions {
    Table,
    Token,
    UserId,
    ExpiresAt,
}

#[derive(Iden)]
enum Escrows {
    Table,
    Id,
    BuyerId,
    SellerId,
    Amount,
    PaymentMethod,
    PaymentDetails,
    DepositAddress,
    Status,
    Agreement,
    SellerTerms,
    SellerDeliverables,
    BuyerReleaseNote,
    SellerRejectReason,
    CreatedAt,
    UpdatedAt,
    DeliveredAt,
    ReleasedAt,
    SellerRequestTime,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    EscrowId,
    Type,
    Description,
    CreatedAt,
}

#[derive(Iden)]
enum PaymentMethods {
    Table,
    Id,
    Code,
    Label,
    Details,
    Active,
}

#[derive(Iden)]
enum SellerWithdrawalMethods {
    Table,
    UserId,
    MethodCode,
    Details,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum KycSubmissions {
    Table,
    Id,
    UserId,
    KycType,
    Status,
    AdminNote,
    SubmittedAt,
    ReviewedAt,
}

#[derive(Iden)]
enum EscrowFiles {
    Table,
    Id,
    EscrowId,
    FileName,
    StoredName,
    Purpose,
    UploadedAt,
}
