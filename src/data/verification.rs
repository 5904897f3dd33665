use chrono::Utc;
use sea_orm::{sea_query::OnConflict, ActiveValue, DatabaseConnection, EntityTrait};

use crate::{error::AppError, model::verification::Verification};

pub struct VerificationRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> VerificationRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets the verification record of a member, if one was ever created.
    pub async fn find(&self, user_id: u64, guild_id: u64) -> Result<Option<Verification>, AppError> {
        entity::prelude::Verification::find_by_id((user_id.to_string(), guild_id.to_string()))
            .one(self.db)
            .await?
            .map(Verification::from_entity)
            .transpose()
    }

    /// Whether a member has completed verification in a guild.
    pub async fn is_verified(&self, user_id: u64, guild_id: u64) -> Result<bool, AppError> {
        Ok(self
            .find(user_id, guild_id)
            .await?
            .is_some_and(|record| record.verified))
    }

    /// Marks a member as verified, creating the record on first use.
    ///
    /// Re-verifying keeps the original `created_at` and refreshes `verified_at`.
    pub async fn mark_verified(&self, user_id: u64, guild_id: u64) -> Result<Verification, AppError> {
        let now = Utc::now();

        let entity = entity::prelude::Verification::insert(entity::verification::ActiveModel {
            user_id: ActiveValue::Set(user_id.to_string()),
            guild_id: ActiveValue::Set(guild_id.to_string()),
            verified: ActiveValue::Set(true),
            verified_at: ActiveValue::Set(Some(now)),
            created_at: ActiveValue::Set(now),
        })
        .on_conflict(
            OnConflict::columns([
                entity::verification::Column::UserId,
                entity::verification::Column::GuildId,
            ])
            .update_columns([
                entity::verification::Column::Verified,
                entity::verification::Column::VerifiedAt,
            ])
            .to_owned(),
        )
        .exec_with_returning(self.db)
        .await?;

        Verification::from_entity(entity)
    }
}
