//! Giveaway factory for creating test giveaways and entries.

use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

use crate::factory::helpers::next_id;

/// Factory for creating test giveaways with customizable fields.
///
/// # Example
///
/// ```rust,ignore
/// let giveaway = GiveawayFactory::new(&db)
///     .message_id(42)
///     .end_time(Utc::now() - Duration::minutes(1))
///     .build()
///     .await?;
/// ```
pub struct GiveawayFactory<'a> {
    db: &'a DatabaseConnection,
    message_id: u64,
    channel_id: u64,
    guild_id: u64,
    prize: String,
    winner_count: i32,
    end_time: DateTime<Utc>,
    creator_id: u64,
    active: bool,
}

impl<'a> GiveawayFactory<'a> {
    /// Creates a new GiveawayFactory with default values.
    ///
    /// Defaults:
    /// - message_id, channel_id, guild_id, creator_id: unique generated ids
    /// - prize: `"Prize {id}"`
    /// - winner_count: `1`
    /// - end_time: one hour from now
    /// - active: `true`
    pub fn new(db: &'a DatabaseConnection) -> Self {
        let id = next_id();
        Self {
            db,
            message_id: id,
            channel_id: next_id(),
            guild_id: next_id(),
            prize: format!("Prize {}", id),
            winner_count: 1,
            end_time: Utc::now() + Duration::hours(1),
            creator_id: next_id(),
            active: true,
        }
    }

    pub fn message_id(mut self, message_id: u64) -> Self {
        self.message_id = message_id;
        self
    }

    pub fn guild_id(mut self, guild_id: u64) -> Self {
        self.guild_id = guild_id;
        self
    }

    pub fn prize(mut self, prize: impl Into<String>) -> Self {
        self.prize = prize.into();
        self
    }

    pub fn winner_count(mut self, winner_count: i32) -> Self {
        self.winner_count = winner_count;
        self
    }

    pub fn end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = end_time;
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Builds and inserts the giveaway entity into the database.
    ///
    /// # Returns
    /// - `Ok(entity::giveaway::Model)` - Created giveaway
    /// - `Err(DbErr)` - Database error during insert
    pub async fn build(self) -> Result<entity::giveaway::Model, DbErr> {
        entity::giveaway::ActiveModel {
            id: ActiveValue::NotSet,
            message_id: ActiveValue::Set(self.message_id.to_string()),
            channel_id: ActiveValue::Set(self.channel_id.to_string()),
            guild_id: ActiveValue::Set(self.guild_id.to_string()),
            prize: ActiveValue::Set(self.prize),
            winner_count: ActiveValue::Set(self.winner_count),
            end_time: ActiveValue::Set(self.end_time),
            creator_id: ActiveValue::Set(self.creator_id.to_string()),
            active: ActiveValue::Set(self.active),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await
    }
}

/// Creates an active giveaway ending in one hour.
///
/// Shorthand for `GiveawayFactory::new(db).build().await`.
pub async fn create_giveaway(db: &DatabaseConnection) -> Result<entity::giveaway::Model, DbErr> {
    GiveawayFactory::new(db).build().await
}

/// Enters a user into a giveaway.
///
/// # Arguments
/// - `db` - Database connection
/// - `giveaway_id` - Row id of the giveaway
/// - `user_id` - Participant id
pub async fn create_entry(
    db: &DatabaseConnection,
    giveaway_id: i32,
    user_id: u64,
) -> Result<entity::giveaway_entry::Model, DbErr> {
    entity::giveaway_entry::ActiveModel {
        giveaway_id: ActiveValue::Set(giveaway_id),
        user_id: ActiveValue::Set(user_id.to_string()),
        created_at: ActiveValue::Set(Utc::now()),
    }
    .insert(db)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TestBuilder;

    #[tokio::test]
    async fn creates_active_giveaway_with_defaults() -> Result<(), DbErr> {
        let test = TestBuilder::new()
            .with_giveaway_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let giveaway = create_giveaway(db).await?;

        assert!(giveaway.active);
        assert_eq!(giveaway.winner_count, 1);
        assert!(giveaway.end_time > Utc::now());

        Ok(())
    }

    #[tokio::test]
    async fn creates_entry_for_giveaway() -> Result<(), DbErr> {
        let test = TestBuilder::new()
            .with_giveaway_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let giveaway = create_giveaway(db).await?;
        let entry = create_entry(db, giveaway.id, 42).await?;

        assert_eq!(entry.giveaway_id, giveaway.id);
        assert_eq!(entry.user_id, "42");

        Ok(())
    }
}
