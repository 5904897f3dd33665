//! Racing profile factory.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

use crate::factory::helpers::next_id;

/// Factory for creating racing profiles with customizable balances and counters.
pub struct RacingUserFactory<'a> {
    db: &'a DatabaseConnection,
    user_id: u64,
    guild_id: u64,
    credits: i64,
    total_races: i32,
    wins: i32,
    losses: i32,
    daily_streak: i32,
    last_daily: Option<DateTime<Utc>>,
}

impl<'a> RacingUserFactory<'a> {
    /// Creates a new RacingUserFactory for a guild.
    ///
    /// Defaults to a fresh profile: a unique user id, 1000 credits, no races, no
    /// daily claim.
    pub fn new(db: &'a DatabaseConnection, guild_id: u64) -> Self {
        Self {
            db,
            user_id: next_id(),
            guild_id,
            credits: 1000,
            total_races: 0,
            wins: 0,
            losses: 0,
            daily_streak: 0,
            last_daily: None,
        }
    }

    pub fn user_id(mut self, user_id: u64) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn credits(mut self, credits: i64) -> Self {
        self.credits = credits;
        self
    }

    /// Sets the race record; total races is `wins + losses`.
    pub fn record(mut self, wins: i32, losses: i32) -> Self {
        self.wins = wins;
        self.losses = losses;
        self.total_races = wins + losses;
        self
    }

    pub fn daily_streak(mut self, daily_streak: i32) -> Self {
        self.daily_streak = daily_streak;
        self
    }

    pub fn last_daily(mut self, last_daily: DateTime<Utc>) -> Self {
        self.last_daily = Some(last_daily);
        self
    }

    /// Builds and inserts the racing profile into the database.
    pub async fn build(self) -> Result<entity::racing_user::Model, DbErr> {
        let now = Utc::now();
        entity::racing_user::ActiveModel {
            user_id: ActiveValue::Set(self.user_id.to_string()),
            guild_id: ActiveValue::Set(self.guild_id.to_string()),
            credits: ActiveValue::Set(self.credits),
            total_races: ActiveValue::Set(self.total_races),
            wins: ActiveValue::Set(self.wins),
            losses: ActiveValue::Set(self.losses),
            daily_streak: ActiveValue::Set(self.daily_streak),
            last_daily: ActiveValue::Set(self.last_daily),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(self.db)
        .await
    }
}

/// Creates a racing profile with the given balance.
pub async fn create_racing_user(
    db: &DatabaseConnection,
    guild_id: u64,
    credits: i64,
) -> Result<entity::racing_user::Model, DbErr> {
    RacingUserFactory::new(db, guild_id).credits(credits).build().await
}
