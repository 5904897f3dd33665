use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

use crate::factory::helpers::next_id;

/// Inserts a moderation log entry with an explicit timestamp.
///
/// # Arguments
/// - `db` - Database connection
/// - `user_id` - Subject of the action
/// - `guild_id` - Guild the action was taken in
/// - `action` - Stored action, e.g. `"warned"`
/// - `at` - Creation time
pub async fn create_mod_log(
    db: &DatabaseConnection,
    user_id: u64,
    guild_id: u64,
    action: &str,
    at: DateTime<Utc>,
) -> Result<entity::mod_log::Model, DbErr> {
    entity::mod_log::ActiveModel {
        id: ActiveValue::NotSet,
        user_id: ActiveValue::Set(user_id.to_string()),
        moderator_id: ActiveValue::Set(next_id().to_string()),
        action: ActiveValue::Set(action.to_string()),
        reason: ActiveValue::Set(None),
        duration_ms: ActiveValue::Set(None),
        guild_id: ActiveValue::Set(guild_id.to_string()),
        created_at: ActiveValue::Set(at),
    }
    .insert(db)
    .await
}
