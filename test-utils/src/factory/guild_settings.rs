//! Guild settings factory.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating guild settings rows.
///
/// Writes raw column values so tests can also seed rows the application itself
/// would never produce, such as a malformed ban role list.
pub struct GuildSettingsFactory<'a> {
    db: &'a DatabaseConnection,
    guild_id: u64,
    ban_roles: String,
    auto_role_id: Option<u64>,
    anti_raid_enabled: bool,
    anti_raid_threshold: i32,
    anti_raid_timeframe_ms: i64,
}

impl<'a> GuildSettingsFactory<'a> {
    /// Defaults: no ban roles, no auto role, anti-raid disabled with threshold 5 over 60 s.
    pub fn new(db: &'a DatabaseConnection, guild_id: u64) -> Self {
        Self {
            db,
            guild_id,
            ban_roles: "[]".to_string(),
            auto_role_id: None,
            anti_raid_enabled: false,
            anti_raid_threshold: 5,
            anti_raid_timeframe_ms: 60_000,
        }
    }

    /// Sets the raw JSON text stored in the `ban_roles` column.
    pub fn ban_roles_raw(mut self, ban_roles: impl Into<String>) -> Self {
        self.ban_roles = ban_roles.into();
        self
    }

    pub fn auto_role_id(mut self, role_id: u64) -> Self {
        self.auto_role_id = Some(role_id);
        self
    }

    pub fn anti_raid(mut self, threshold: i32, timeframe_ms: i64) -> Self {
        self.anti_raid_enabled = true;
        self.anti_raid_threshold = threshold;
        self.anti_raid_timeframe_ms = timeframe_ms;
        self
    }

    pub async fn build(self) -> Result<entity::guild_settings::Model, DbErr> {
        let now = Utc::now();
        entity::guild_settings::ActiveModel {
            guild_id: ActiveValue::Set(self.guild_id.to_string()),
            ban_roles: ActiveValue::Set(self.ban_roles),
            auto_role_id: ActiveValue::Set(self.auto_role_id.map(|id| id.to_string())),
            verify_channel_id: ActiveValue::Set(None),
            verify_role_id: ActiveValue::Set(None),
            anti_raid_enabled: ActiveValue::Set(self.anti_raid_enabled),
            anti_raid_threshold: ActiveValue::Set(self.anti_raid_threshold),
            anti_raid_timeframe_ms: ActiveValue::Set(self.anti_raid_timeframe_ms),
            log_channel_id: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        }
        .insert(self.db)
        .await
    }
}
