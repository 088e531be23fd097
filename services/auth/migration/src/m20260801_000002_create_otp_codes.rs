use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OtpCodes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(OtpCodes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(OtpCodes::Identifier).string().not_null())
                    .col(
                        ColumnDef::new(OtpCodes::Channel)
                            .small_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OtpCodes::CodeHash).string().not_null())
                    .col(ColumnDef::new(OtpCodes::UserId).uuid())
                    .col(
                        ColumnDef::new(OtpCodes::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OtpCodes::ConsumedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(OtpCodes::Attempts)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(OtpCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(OtpCodes::Table, OtpCodes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Candidate lookup is always identifier + channel scoped.
        manager
            .create_index(
                Index::create()
                    .table(OtpCodes::Table)
                    .col(OtpCodes::Identifier)
                    .col(OtpCodes::Channel)
                    .name("idx_otp_codes_identifier_channel")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OtpCodes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum OtpCodes {
    Table,
    Id,
    Identifier,
    Channel,
    CodeHash,
    UserId,
    ExpiresAt,
    ConsumedAt,
    Attempts,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
