//! Moderation log data repository.
//!
//! The moderation log is an append-only audit trail: entries are written after a
//! platform-side action succeeds and are never updated or deleted.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};

use crate::{
    error::AppError,
    model::mod_log::{CreateModLogParam, ModLog},
};

/// Repository providing database operations for the moderation log.
pub struct ModLogRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ModLogRepository<'a> {
    /// Creates a new ModLogRepository instance.
    ///
    /// # Arguments
    /// - `db` - Reference to the database connection
    ///
    /// # Returns
    /// - `ModLogRepository` - New repository instance
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends an entry to the moderation log.
    ///
    /// # Arguments
    /// - `param` - Subject, moderator, action and optional reason/duration
    ///
    /// # Returns
    /// - `Ok(i32)` - Identifier of the new entry
    /// - `Err(AppError::DbErr)` - Database error during insert
    pub async fn append(&self, param: CreateModLogParam) -> Result<i32, AppError> {
        let entity = entity::mod_log::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(param.user_id.to_string()),
            moderator_id: ActiveValue::Set(param.moderator_id.to_string()),
            action: ActiveValue::Set(param.action.as_str().to_string()),
            reason: ActiveValue::Set(param.reason),
            duration_ms: ActiveValue::Set(param.duration_ms),
            guild_id: ActiveValue::Set(param.guild_id.to_string()),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await?;

        Ok(entity.id)
    }

    /// Gets every entry for a user within a guild, newest first.
    ///
    /// # Arguments
    /// - `user_id` - Subject of the moderation actions
    /// - `guild_id` - Guild the actions were taken in
    ///
    /// # Returns
    /// - `Ok(Vec<ModLog>)` - Entries ordered by creation time descending (may be empty)
    /// - `Err(AppError)` - Database error or corrupted stored id
    pub async fn query(&self, user_id: u64, guild_id: u64) -> Result<Vec<ModLog>, AppError> {
        entity::prelude::ModLog::find()
            .filter(entity::mod_log::Column::UserId.eq(user_id.to_string()))
            .filter(entity::mod_log::Column::GuildId.eq(guild_id.to_string()))
            .order_by_desc(entity::mod_log::Column::CreatedAt)
            .order_by_desc(entity::mod_log::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(ModLog::from_entity)
            .collect()
    }
}
