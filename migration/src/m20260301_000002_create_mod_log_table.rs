use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ModLog::Table)
                    .if_not_exists()
                    .col(pk_auto(ModLog::Id))
                    .col(string(ModLog::UserId))
                    .col(string(ModLog::ModeratorId))
                    .col(string(ModLog::Action))
                    .col(text_null(ModLog::Reason))
                    .col(big_integer_null(ModLog::DurationMs))
                    .col(string(ModLog::GuildId))
                    .col(timestamp(ModLog::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Lookups are always by subject within a guild
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_mod_log_guild_user")
                    .table(ModLog::Table)
                    .col(ModLog::GuildId)
                    .col(ModLog::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_mod_log_guild_user")
                    .table(ModLog::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ModLog::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ModLog {
    Table,
    Id,
    UserId,
    ModeratorId,
    Action,
    Reason,
    DurationMs,
    GuildId,
    CreatedAt,
}
