//! Raid action event log.
//!
//! Append-only. Events are never pruned; the anti-raid window only ever reads the
//! most recent slice through `count_since`.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter,
};

use crate::{error::AppError, model::raid_action::RaidActionKind};

pub struct RaidActionRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> RaidActionRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends an event for a guild at the given time.
    ///
    /// # Returns
    /// - `Ok(i32)` - Identifier of the new event
    /// - `Err(AppError)` - Database error during insert
    pub async fn record(
        &self,
        guild_id: u64,
        user_id: u64,
        kind: RaidActionKind,
        at: DateTime<Utc>,
    ) -> Result<i32, AppError> {
        let entity = entity::raid_action::ActiveModel {
            id: ActiveValue::NotSet,
            guild_id: ActiveValue::Set(guild_id.to_string()),
            user_id: ActiveValue::Set(user_id.to_string()),
            action: ActiveValue::Set(kind.as_str().to_string()),
            created_at: ActiveValue::Set(at),
        }
        .insert(self.db)
        .await?;

        Ok(entity.id)
    }

    /// Counts a guild's events with a timestamp at or after `since`.
    pub async fn count_since(&self, guild_id: u64, since: DateTime<Utc>) -> Result<u64, AppError> {
        Ok(entity::prelude::RaidAction::find()
            .filter(entity::raid_action::Column::GuildId.eq(guild_id.to_string()))
            .filter(entity::raid_action::Column::CreatedAt.gte(since))
            .count(self.db)
            .await?)
    }
}
