use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter,
};

use crate::{
    error::AppError,
    model::racing::{CreateRaceParam, RaceWinner, RacingRace},
};

pub struct RacingRaceRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> RacingRaceRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a race as it starts, before a winner is known.
    pub async fn create(&self, param: CreateRaceParam) -> Result<RacingRace, AppError> {
        let entity = entity::racing_race::ActiveModel {
            id: ActiveValue::NotSet,
            guild_id: ActiveValue::Set(param.guild_id.to_string()),
            racer1_id: ActiveValue::Set(param.racer1_id.to_string()),
            racer2_id: ActiveValue::Set(param.racer2_id.map(|id| id.to_string())),
            winner_id: ActiveValue::Set(None),
            credits_wagered: ActiveValue::Set(param.credits_wagered),
            race_type: ActiveValue::Set(param.kind.as_str().to_string()),
            duration_secs: ActiveValue::Set(None),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await?;

        RacingRace::from_entity(entity)
    }

    /// Stores the winner and race length.
    ///
    /// # Returns
    /// - `Ok(())` - Race updated
    /// - `Err(AppError::NotFound)` - No race with this id
    pub async fn complete(
        &self,
        race_id: i32,
        winner: RaceWinner,
        duration_secs: f64,
    ) -> Result<(), AppError> {
        let result = entity::prelude::RacingRace::update_many()
            .col_expr(
                entity::racing_race::Column::WinnerId,
                Expr::value(Some(winner.stored())),
            )
            .col_expr(
                entity::racing_race::Column::DurationSecs,
                Expr::value(Some(duration_secs)),
            )
            .filter(entity::racing_race::Column::Id.eq(race_id))
            .exec(self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Race {} not found", race_id)));
        }

        Ok(())
    }

    /// Gets a race by id.
    pub async fn find(&self, race_id: i32) -> Result<Option<RacingRace>, AppError> {
        entity::prelude::RacingRace::find_by_id(race_id)
            .one(self.db)
            .await?
            .map(RacingRace::from_entity)
            .transpose()
    }
}
