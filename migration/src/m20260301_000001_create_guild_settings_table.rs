use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GuildSettings::Table)
                    .if_not_exists()
                    .col(string(GuildSettings::GuildId).primary_key())
                    .col(text(GuildSettings::BanRoles).default("[]"))
                    .col(string_null(GuildSettings::AutoRoleId))
                    .col(string_null(GuildSettings::VerifyChannelId))
                    .col(string_null(GuildSettings::VerifyRoleId))
                    .col(boolean(GuildSettings::AntiRaidEnabled).default(false))
                    .col(integer(GuildSettings::AntiRaidThreshold).default(5))
                    .col(big_integer(GuildSettings::AntiRaidTimeframeMs).default(60_000))
                    .col(string_null(GuildSettings::LogChannelId))
                    .col(timestamp(GuildSettings::CreatedAt))
                    .col(timestamp(GuildSettings::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GuildSettings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum GuildSettings {
    Table,
    GuildId,
    BanRoles,
    AutoRoleId,
    VerifyChannelId,
    VerifyRoleId,
    AntiRaidEnabled,
    AntiRaidThreshold,
    AntiRaidTimeframeMs,
    LogChannelId,
    CreatedAt,
    UpdatedAt,
}
