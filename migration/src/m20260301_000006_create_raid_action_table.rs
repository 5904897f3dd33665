use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RaidAction::Table)
                    .if_not_exists()
                    .col(pk_auto(RaidAction::Id))
                    .col(string(RaidAction::GuildId))
                    .col(string(RaidAction::UserId))
                    .col(string(RaidAction::Action))
                    .col(timestamp(RaidAction::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Window counts filter on guild then time
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_raid_action_guild_created_at")
                    .table(RaidAction::Table)
                    .col(RaidAction::GuildId)
                    .col(RaidAction::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_raid_action_guild_created_at")
                    .table(RaidAction::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(RaidAction::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum RaidAction {
    Table,
    Id,
    GuildId,
    UserId,
    Action,
    CreatedAt,
}
