use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Verification::Table)
                    .if_not_exists()
                    .col(string(Verification::UserId))
                    .col(string(Verification::GuildId))
                    .col(boolean(Verification::Verified).default(false))
                    .col(timestamp_null(Verification::VerifiedAt))
                    .col(timestamp(Verification::CreatedAt))
                    .primary_key(
                        Index::create()
                            .col(Verification::UserId)
                            .col(Verification::GuildId),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Verification::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Verification {
    Table,
    UserId,
    GuildId,
    Verified,
    VerifiedAt,
    CreatedAt,
}
