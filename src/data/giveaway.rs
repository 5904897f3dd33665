//! Giveaway data repository.
//!
//! Giveaways are keyed externally by their announcement message id. Entries live in
//! a child table with a composite primary key, so joining is a single
//! `INSERT ... ON CONFLICT DO NOTHING` and the participant list can never hold a
//! duplicate. Ending a giveaway is a conditional update on the `active` flag, which
//! makes it safe for the timer, the minute sweep and a manual `/giveaway end` to race.

use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};

use crate::{
    error::AppError,
    model::giveaway::{CreateGiveawayParam, Giveaway},
    util::parse::parse_u64_from_string,
};

/// Repository providing database operations for giveaways and their entries.
pub struct GiveawayRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> GiveawayRepository<'a> {
    /// Creates a new GiveawayRepository instance.
    ///
    /// # Arguments
    /// - `db` - Reference to the database connection
    ///
    /// # Returns
    /// - `GiveawayRepository` - New repository instance
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a newly announced giveaway as active.
    ///
    /// # Arguments
    /// - `param` - Announcement ids, prize, winner count, end time and creator
    ///
    /// # Returns
    /// - `Ok(Giveaway)` - The created giveaway
    /// - `Err(AppError)` - Database error, e.g. the message id is already used
    pub async fn create(&self, param: CreateGiveawayParam) -> Result<Giveaway, AppError> {
        let entity = entity::giveaway::ActiveModel {
            id: ActiveValue::NotSet,
            message_id: ActiveValue::Set(param.message_id.to_string()),
            channel_id: ActiveValue::Set(param.channel_id.to_string()),
            guild_id: ActiveValue::Set(param.guild_id.to_string()),
            prize: ActiveValue::Set(param.prize),
            winner_count: ActiveValue::Set(param.winner_count as i32),
            end_time: ActiveValue::Set(param.end_time),
            creator_id: ActiveValue::Set(param.creator_id.to_string()),
            active: ActiveValue::Set(true),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await?;

        Giveaway::from_entity(entity)
    }

    /// Finds a guild's giveaway by its announcement message id.
    ///
    /// # Returns
    /// - `Ok(Some(Giveaway))` - Giveaway found, active or ended
    /// - `Ok(None)` - No giveaway was announced with that message in this guild
    /// - `Err(AppError)` - Database error during query
    pub async fn find_by_message_id(
        &self,
        guild_id: u64,
        message_id: u64,
    ) -> Result<Option<Giveaway>, AppError> {
        entity::prelude::Giveaway::find()
            .filter(entity::giveaway::Column::GuildId.eq(guild_id.to_string()))
            .filter(entity::giveaway::Column::MessageId.eq(message_id.to_string()))
            .one(self.db)
            .await?
            .map(Giveaway::from_entity)
            .transpose()
    }

    /// Adds a participant to a giveaway.
    ///
    /// # Returns
    /// - `Ok(true)` - The user was newly entered
    /// - `Ok(false)` - The user had already entered
    /// - `Err(AppError)` - Database error during insert
    pub async fn add_participant(&self, giveaway_id: i32, user_id: u64) -> Result<bool, AppError> {
        let inserted = entity::prelude::GiveawayEntry::insert(entity::giveaway_entry::ActiveModel {
            giveaway_id: ActiveValue::Set(giveaway_id),
            user_id: ActiveValue::Set(user_id.to_string()),
            created_at: ActiveValue::Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::columns([
                entity::giveaway_entry::Column::GiveawayId,
                entity::giveaway_entry::Column::UserId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(self.db)
        .await?;

        Ok(inserted > 0)
    }

    /// Gets the ids of every participant of a giveaway in join order.
    pub async fn participants(&self, giveaway_id: i32) -> Result<Vec<u64>, AppError> {
        entity::prelude::GiveawayEntry::find()
            .filter(entity::giveaway_entry::Column::GiveawayId.eq(giveaway_id))
            .order_by_asc(entity::giveaway_entry::Column::CreatedAt)
            .all(self.db)
            .await?
            .into_iter()
            .map(|entry| parse_u64_from_string(entry.user_id))
            .collect()
    }

    /// Counts the participants of a giveaway.
    pub async fn participant_count(&self, giveaway_id: i32) -> Result<u64, AppError> {
        Ok(entity::prelude::GiveawayEntry::find()
            .filter(entity::giveaway_entry::Column::GiveawayId.eq(giveaway_id))
            .count(self.db)
            .await?)
    }

    /// Marks a giveaway as ended if it is still active.
    ///
    /// The update is conditional on `active = true`, so exactly one caller can end a
    /// giveaway even when the timer and a manual end run concurrently.
    ///
    /// # Returns
    /// - `Ok(true)` - This call ended the giveaway
    /// - `Ok(false)` - The giveaway was already ended (or does not exist)
    /// - `Err(AppError)` - Database error during update
    pub async fn deactivate(&self, giveaway_id: i32) -> Result<bool, AppError> {
        let result = entity::prelude::Giveaway::update_many()
            .col_expr(entity::giveaway::Column::Active, Expr::value(false))
            .filter(entity::giveaway::Column::Id.eq(giveaway_id))
            .filter(entity::giveaway::Column::Active.eq(true))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Gets every active giveaway, soonest ending first.
    pub async fn get_active(&self) -> Result<Vec<Giveaway>, AppError> {
        entity::prelude::Giveaway::find()
            .filter(entity::giveaway::Column::Active.eq(true))
            .order_by_asc(entity::giveaway::Column::EndTime)
            .all(self.db)
            .await?
            .into_iter()
            .map(Giveaway::from_entity)
            .collect()
    }

    /// Gets active giveaways whose end time is at or before `now`.
    ///
    /// Used by the minute sweep to end giveaways whose in-process timer was lost,
    /// for example across a restart.
    pub async fn get_overdue(&self, now: DateTime<Utc>) -> Result<Vec<Giveaway>, AppError> {
        entity::prelude::Giveaway::find()
            .filter(entity::giveaway::Column::Active.eq(true))
            .filter(entity::giveaway::Column::EndTime.lte(now))
            .order_by_asc(entity::giveaway::Column::EndTime)
            .all(self.db)
            .await?
            .into_iter()
            .map(Giveaway::from_entity)
            .collect()
    }
}
