use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RacingRace::Table)
                    .if_not_exists()
                    .col(pk_auto(RacingRace::Id))
                    .col(string(RacingRace::GuildId))
                    .col(string(RacingRace::Racer1Id))
                    .col(string_null(RacingRace::Racer2Id))
                    .col(string_null(RacingRace::WinnerId))
                    .col(big_integer(RacingRace::CreditsWagered))
                    .col(string(RacingRace::RaceType))
                    .col(double_null(RacingRace::DurationSecs))
                    .col(timestamp(RacingRace::CreatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RacingRace::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum RacingRace {
    Table,
    Id,
    GuildId,
    Racer1Id,
    Racer2Id,
    WinnerId,
    CreditsWagered,
    RaceType,
    DurationSecs,
    CreatedAt,
}
