//! Guild settings data repository.
//!
//! One row per guild holds every piece of guild-level configuration. Updates are
//! merge-upserts: a single `INSERT ... ON CONFLICT DO UPDATE` statement that only
//! rewrites the columns present in the update, so two handlers changing different
//! settings at the same time never overwrite each other.

use chrono::Utc;
use sea_orm::{sea_query::OnConflict, ActiveValue, DatabaseConnection, EntityTrait};

use crate::{
    error::AppError,
    model::guild_settings::{
        GuildSettings, UpdateGuildSettingsParam, DEFAULT_ANTI_RAID_THRESHOLD,
        DEFAULT_ANTI_RAID_TIMEFRAME_MS,
    },
    util::parse::encode_id_list,
};

/// Repository providing database operations for guild settings.
pub struct GuildSettingsRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> GuildSettingsRepository<'a> {
    /// Creates a new GuildSettingsRepository instance.
    ///
    /// # Arguments
    /// - `db` - Reference to the database connection
    ///
    /// # Returns
    /// - `GuildSettingsRepository` - New repository instance
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets the settings row for a guild.
    ///
    /// Callers apply defaults when no row exists (see `AntiRaidConfig::resolve`).
    ///
    /// # Returns
    /// - `Ok(Some(GuildSettings))` - Guild has been configured before
    /// - `Ok(None)` - No settings have ever been written for this guild
    /// - `Err(AppError)` - Database error or corrupted stored value
    pub async fn get(&self, guild_id: u64) -> Result<Option<GuildSettings>, AppError> {
        entity::prelude::GuildSettings::find_by_id(guild_id.to_string())
            .one(self.db)
            .await?
            .map(GuildSettings::from_entity)
            .transpose()
    }

    /// Merges a partial update into a guild's settings, creating the row if needed.
    ///
    /// On insert, columns absent from `param` take their defaults. On conflict only
    /// the columns present in `param` (plus `updated_at`) are rewritten; `created_at`
    /// is never touched after the first write.
    ///
    /// # Arguments
    /// - `guild_id` - Guild to update
    /// - `param` - Columns to change
    ///
    /// # Returns
    /// - `Ok(GuildSettings)` - The settings row after the merge
    /// - `Err(AppError)` - Database error during upsert
    pub async fn update(
        &self,
        guild_id: u64,
        param: UpdateGuildSettingsParam,
    ) -> Result<GuildSettings, AppError> {
        use entity::guild_settings::Column;

        let mut columns = vec![Column::UpdatedAt];
        let touched = [
            (param.ban_roles.is_some(), Column::BanRoles),
            (param.auto_role_id.is_some(), Column::AutoRoleId),
            (param.verify_channel_id.is_some(), Column::VerifyChannelId),
            (param.verify_role_id.is_some(), Column::VerifyRoleId),
            (param.anti_raid_enabled.is_some(), Column::AntiRaidEnabled),
            (param.anti_raid_threshold.is_some(), Column::AntiRaidThreshold),
            (param.anti_raid_timeframe_ms.is_some(), Column::AntiRaidTimeframeMs),
            (param.log_channel_id.is_some(), Column::LogChannelId),
        ];
        columns.extend(
            touched
                .into_iter()
                .filter(|(present, _)| *present)
                .map(|(_, column)| column),
        );

        let now = Utc::now();
        let id_string = |id: Option<Option<u64>>| id.flatten().map(|id| id.to_string());

        let model = entity::guild_settings::ActiveModel {
            guild_id: ActiveValue::Set(guild_id.to_string()),
            ban_roles: ActiveValue::Set(encode_id_list(&param.ban_roles.unwrap_or_default())),
            auto_role_id: ActiveValue::Set(id_string(param.auto_role_id)),
            verify_channel_id: ActiveValue::Set(id_string(param.verify_channel_id)),
            verify_role_id: ActiveValue::Set(id_string(param.verify_role_id)),
            anti_raid_enabled: ActiveValue::Set(param.anti_raid_enabled.unwrap_or(false)),
            anti_raid_threshold: ActiveValue::Set(
                param
                    .anti_raid_threshold
                    .unwrap_or(DEFAULT_ANTI_RAID_THRESHOLD) as i32,
            ),
            anti_raid_timeframe_ms: ActiveValue::Set(
                param
                    .anti_raid_timeframe_ms
                    .unwrap_or(DEFAULT_ANTI_RAID_TIMEFRAME_MS),
            ),
            log_channel_id: ActiveValue::Set(id_string(param.log_channel_id)),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        let entity = entity::prelude::GuildSettings::insert(model)
            .on_conflict(
                OnConflict::column(Column::GuildId)
                    .update_columns(columns)
                    .to_owned(),
            )
            .exec_with_returning(self.db)
            .await?;

        GuildSettings::from_entity(entity)
    }
}
