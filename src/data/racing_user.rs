//! Racing economy profile repository.
//!
//! Every balance change is a single SQL statement of the form
//! `UPDATE ... SET credits = credits + ?` so concurrent commands for the same user
//! never lose an update. Operations that must not overdraw or double-claim carry
//! their precondition in the `WHERE` clause and report whether a row matched.

use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    sea_query::{Expr, ExprTrait, OnConflict},
    ActiveValue, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};

use crate::{
    error::AppError,
    model::racing::{LeaderboardSort, RacingUser, ResetKind, STARTING_CREDITS},
};

use entity::racing_user::Column;

/// Number of top balances a user's rank is computed within.
pub const RANK_WINDOW: u64 = 100;

/// Repository providing database operations for racing profiles.
pub struct RacingUserRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> RacingUserRepository<'a> {
    /// Creates a new RacingUserRepository instance.
    ///
    /// # Arguments
    /// - `db` - Reference to the database connection
    ///
    /// # Returns
    /// - `RacingUserRepository` - New repository instance
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets a user's profile without creating it.
    pub async fn get(&self, user_id: u64, guild_id: u64) -> Result<Option<RacingUser>, AppError> {
        entity::prelude::RacingUser::find_by_id((user_id.to_string(), guild_id.to_string()))
            .one(self.db)
            .await?
            .map(RacingUser::from_entity)
            .transpose()
    }

    /// Gets a user's profile, creating it with the starting balance on first use.
    ///
    /// # Returns
    /// - `Ok(RacingUser)` - Existing or newly created profile
    /// - `Err(AppError)` - Database error during insert or query
    pub async fn get_or_create(&self, user_id: u64, guild_id: u64) -> Result<RacingUser, AppError> {
        ensure_profile(self.db, user_id, guild_id).await?;

        self.get(user_id, guild_id).await?.ok_or_else(|| {
            AppError::InternalError(format!(
                "Racing profile for user {} in guild {} vanished after insert",
                user_id, guild_id
            ))
        })
    }

    /// Adds `delta` credits (negative to remove) to a user's balance.
    ///
    /// # Returns
    /// - `Ok(RacingUser)` - Profile after the adjustment
    /// - `Err(AppError)` - Database error during update
    pub async fn adjust_credits(
        &self,
        user_id: u64,
        guild_id: u64,
        delta: i64,
    ) -> Result<RacingUser, AppError> {
        ensure_profile(self.db, user_id, guild_id).await?;

        entity::prelude::RacingUser::update_many()
            .col_expr(Column::Credits, Expr::col(Column::Credits).add(delta))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(profile_filter(user_id, guild_id))
            .exec(self.db)
            .await?;

        self.get_or_create(user_id, guild_id).await
    }

    /// Records the outcome of one race for one participant.
    ///
    /// Increments the race counter and either wins or losses, and applies
    /// `credit_delta` in the same statement.
    pub async fn apply_race_result(
        &self,
        user_id: u64,
        guild_id: u64,
        won: bool,
        credit_delta: i64,
    ) -> Result<(), AppError> {
        ensure_profile(self.db, user_id, guild_id).await?;

        let outcome_column = if won { Column::Wins } else { Column::Losses };

        entity::prelude::RacingUser::update_many()
            .col_expr(Column::Credits, Expr::col(Column::Credits).add(credit_delta))
            .col_expr(Column::TotalRaces, Expr::col(Column::TotalRaces).add(1))
            .col_expr(outcome_column, Expr::col(outcome_column).add(1))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(profile_filter(user_id, guild_id))
            .exec(self.db)
            .await?;

        Ok(())
    }

    /// Moves `amount` credits between two users of the same guild.
    ///
    /// The debit is conditional on the sender holding at least `amount`; debit and
    /// credit commit together or not at all, so the guild's total is conserved.
    ///
    /// # Returns
    /// - `Ok(true)` - Transfer committed
    /// - `Ok(false)` - Sender could not afford it; nothing changed
    /// - `Err(AppError)` - Database error, the transaction is rolled back
    pub async fn transfer(
        &self,
        guild_id: u64,
        from_user_id: u64,
        to_user_id: u64,
        amount: i64,
    ) -> Result<bool, AppError> {
        let txn = self.db.begin().await?;

        ensure_profile(&txn, from_user_id, guild_id).await?;
        ensure_profile(&txn, to_user_id, guild_id).await?;

        let now = Utc::now();
        let debit = entity::prelude::RacingUser::update_many()
            .col_expr(Column::Credits, Expr::col(Column::Credits).sub(amount))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(profile_filter(from_user_id, guild_id))
            .filter(Column::Credits.gte(amount))
            .exec(&txn)
            .await?;

        if debit.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(false);
        }

        entity::prelude::RacingUser::update_many()
            .col_expr(Column::Credits, Expr::col(Column::Credits).add(amount))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(profile_filter(to_user_id, guild_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        Ok(true)
    }

    /// Claims the daily reward if the last claim is at least 24 hours old.
    ///
    /// Credits the reward, increments the streak and stamps `last_daily` in a single
    /// conditional update, so two simultaneous claims pay out once.
    ///
    /// # Arguments
    /// - `reward` - Credits to add, computed by the caller from the current streak
    /// - `now` - Claim time
    ///
    /// # Returns
    /// - `Ok(true)` - Reward paid
    /// - `Ok(false)` - Already claimed within the last 24 hours
    pub async fn claim_daily(
        &self,
        user_id: u64,
        guild_id: u64,
        reward: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        ensure_profile(self.db, user_id, guild_id).await?;

        let cutoff = now - Duration::hours(24);
        let result = entity::prelude::RacingUser::update_many()
            .col_expr(Column::Credits, Expr::col(Column::Credits).add(reward))
            .col_expr(Column::DailyStreak, Expr::col(Column::DailyStreak).add(1))
            .col_expr(Column::LastDaily, Expr::value(Some(now)))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(profile_filter(user_id, guild_id))
            .filter(
                Condition::any()
                    .add(Column::LastDaily.is_null())
                    .add(Column::LastDaily.lte(cutoff)),
            )
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Gets the top profiles of a guild ordered by `sort`, highest first.
    pub async fn leaderboard(
        &self,
        guild_id: u64,
        sort: LeaderboardSort,
        limit: u64,
    ) -> Result<Vec<RacingUser>, AppError> {
        let column = match sort {
            LeaderboardSort::Credits => Column::Credits,
            LeaderboardSort::Wins => Column::Wins,
            LeaderboardSort::TotalRaces => Column::TotalRaces,
        };

        entity::prelude::RacingUser::find()
            .filter(Column::GuildId.eq(guild_id.to_string()))
            .order_by_desc(column)
            .order_by_asc(Column::CreatedAt)
            .limit(limit)
            .all(self.db)
            .await?
            .into_iter()
            .map(RacingUser::from_entity)
            .collect()
    }

    /// 1-based position of a user among the guild's top balances.
    ///
    /// # Returns
    /// - `Ok(Some(rank))` - User is within the top `RANK_WINDOW` by credits
    /// - `Ok(None)` - User is outside the window or has no profile
    pub async fn rank_by_credits(&self, user_id: u64, guild_id: u64) -> Result<Option<usize>, AppError> {
        let top = self
            .leaderboard(guild_id, LeaderboardSort::Credits, RANK_WINDOW)
            .await?;

        Ok(top
            .iter()
            .position(|profile| profile.user_id == user_id)
            .map(|index| index + 1))
    }

    /// Resets part of a user's profile, creating it first if needed.
    pub async fn reset(
        &self,
        guild_id: u64,
        user_id: u64,
        kind: ResetKind,
    ) -> Result<RacingUser, AppError> {
        ensure_profile(self.db, user_id, guild_id).await?;

        let reset_credits = matches!(kind, ResetKind::All | ResetKind::Credits);
        let reset_races = matches!(kind, ResetKind::All | ResetKind::Wins);
        let reset_daily = matches!(kind, ResetKind::All | ResetKind::Daily);

        let mut update = entity::prelude::RacingUser::update_many()
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()));

        if reset_credits {
            update = update.col_expr(Column::Credits, Expr::value(STARTING_CREDITS));
        }
        if reset_races {
            update = update
                .col_expr(Column::TotalRaces, Expr::value(0))
                .col_expr(Column::Wins, Expr::value(0))
                .col_expr(Column::Losses, Expr::value(0));
        }
        if reset_daily {
            update = update
                .col_expr(Column::DailyStreak, Expr::value(0))
                .col_expr(Column::LastDaily, Expr::value(Option::<DateTime<Utc>>::None));
        }

        update
            .filter(profile_filter(user_id, guild_id))
            .exec(self.db)
            .await?;

        self.get_or_create(user_id, guild_id).await
    }
}

fn profile_filter(user_id: u64, guild_id: u64) -> Condition {
    Condition::all()
        .add(Column::UserId.eq(user_id.to_string()))
        .add(Column::GuildId.eq(guild_id.to_string()))
}

/// Inserts a fresh profile unless one already exists.
async fn ensure_profile<C>(db: &C, user_id: u64, guild_id: u64) -> Result<(), AppError>
where
    C: ConnectionTrait,
{
    let now = Utc::now();

    entity::prelude::RacingUser::insert(entity::racing_user::ActiveModel {
        user_id: ActiveValue::Set(user_id.to_string()),
        guild_id: ActiveValue::Set(guild_id.to_string()),
        credits: ActiveValue::Set(STARTING_CREDITS),
        total_races: ActiveValue::Set(0),
        wins: ActiveValue::Set(0),
        losses: ActiveValue::Set(0),
        daily_streak: ActiveValue::Set(0),
        last_daily: ActiveValue::Set(None),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
    })
    .on_conflict(
        OnConflict::columns([Column::UserId, Column::GuildId])
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(db)
    .await?;

    Ok(())
}
