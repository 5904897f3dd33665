use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RacingUser::Table)
                    .if_not_exists()
                    .col(string(RacingUser::UserId))
                    .col(string(RacingUser::GuildId))
                    .col(big_integer(RacingUser::Credits).default(1000))
                    .col(integer(RacingUser::TotalRaces).default(0))
                    .col(integer(RacingUser::Wins).default(0))
                    .col(integer(RacingUser::Losses).default(0))
                    .col(integer(RacingUser::DailyStreak).default(0))
                    .col(timestamp_null(RacingUser::LastDaily))
                    .col(timestamp(RacingUser::CreatedAt))
                    .col(timestamp(RacingUser::UpdatedAt))
                    .primary_key(
                        Index::create()
                            .col(RacingUser::UserId)
                            .col(RacingUser::GuildId),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RacingUser::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum RacingUser {
    Table,
    UserId,
    GuildId,
    Credits,
    TotalRaces,
    Wins,
    Losses,
    DailyStreak,
    LastDaily,
    CreatedAt,
    UpdatedAt,
}
