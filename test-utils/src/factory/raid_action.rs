use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

use crate::factory::helpers::next_id;

/// Inserts a `JOIN` raid action for a random user at the given time.
///
/// # Arguments
/// - `db` - Database connection
/// - `guild_id` - Guild the join happened in
/// - `at` - Event timestamp, so tests can place events inside or outside a window
pub async fn create_join(
    db: &DatabaseConnection,
    guild_id: u64,
    at: DateTime<Utc>,
) -> Result<entity::raid_action::Model, DbErr> {
    entity::raid_action::ActiveModel {
        id: ActiveValue::NotSet,
        guild_id: ActiveValue::Set(guild_id.to_string()),
        user_id: ActiveValue::Set(next_id().to_string()),
        action: ActiveValue::Set("JOIN".to_string()),
        created_at: ActiveValue::Set(at),
    }
    .insert(db)
    .await
}
