use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Giveaway::Table)
                    .if_not_exists()
                    .col(pk_auto(Giveaway::Id))
                    .col(string_uniq(Giveaway::MessageId))
                    .col(string(Giveaway::ChannelId))
                    .col(string(Giveaway::GuildId))
                    .col(text(Giveaway::Prize))
                    .col(integer(Giveaway::WinnerCount).default(1))
                    .col(timestamp(Giveaway::EndTime))
                    .col(string(Giveaway::CreatorId))
                    .col(boolean(Giveaway::Active).default(true))
                    .col(timestamp(Giveaway::CreatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Giveaway::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Giveaway {
    Table,
    Id,
    MessageId,
    ChannelId,
    GuildId,
    Prize,
    WinnerCount,
    EndTime,
    CreatorId,
    Active,
    CreatedAt,
}
