//! Domain & parameter models for per-guild configuration.

use chrono::{DateTime, Utc};

use crate::{
    error::AppError,
    util::parse::{parse_id_list, parse_optional_u64, parse_u64_from_string},
};

/// Anti-raid threshold applied when a guild has never configured one.
pub const DEFAULT_ANTI_RAID_THRESHOLD: u32 = 5;

/// Anti-raid window applied when a guild has never configured one.
pub const DEFAULT_ANTI_RAID_TIMEFRAME_MS: i64 = 60_000;

/// Per-guild configuration row.
#[derive(Debug, Clone, PartialEq)]
pub struct GuildSettings {
    pub guild_id: u64,
    pub ban_roles: Vec<u64>,
    pub auto_role_id: Option<u64>,
    pub verify_channel_id: Option<u64>,
    pub verify_role_id: Option<u64>,
    pub anti_raid_enabled: bool,
    pub anti_raid_threshold: u32,
    pub anti_raid_timeframe_ms: i64,
    pub log_channel_id: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GuildSettings {
    /// Converts an entity model to the guild settings domain model.
    ///
    /// # Returns
    /// - `Ok(GuildSettings)` - The converted settings
    /// - `Err(AppError::InternalErr)` - A stored id or the ban role list failed to parse
    pub fn from_entity(entity: entity::guild_settings::Model) -> Result<Self, AppError> {
        Ok(Self {
            guild_id: parse_u64_from_string(entity.guild_id)?,
            ban_roles: parse_id_list("ban_roles", &entity.ban_roles)?,
            auto_role_id: parse_optional_u64(entity.auto_role_id)?,
            verify_channel_id: parse_optional_u64(entity.verify_channel_id)?,
            verify_role_id: parse_optional_u64(entity.verify_role_id)?,
            anti_raid_enabled: entity.anti_raid_enabled,
            anti_raid_threshold: entity.anti_raid_threshold.max(0) as u32,
            anti_raid_timeframe_ms: entity.anti_raid_timeframe_ms,
            log_channel_id: parse_optional_u64(entity.log_channel_id)?,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }

    /// Verification channel and role, only when both are configured.
    pub fn verification(&self) -> Option<(u64, u64)> {
        self.verify_channel_id.zip(self.verify_role_id)
    }
}

/// Effective anti-raid configuration with defaults applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AntiRaidConfig {
    pub enabled: bool,
    pub threshold: u32,
    pub timeframe_ms: i64,
}

impl AntiRaidConfig {
    /// Resolves the anti-raid configuration for a guild that may have no settings row.
    pub fn resolve(settings: Option<&GuildSettings>) -> Self {
        match settings {
            Some(settings) => Self {
                enabled: settings.anti_raid_enabled,
                threshold: settings.anti_raid_threshold,
                timeframe_ms: settings.anti_raid_timeframe_ms,
            },
            None => Self {
                enabled: false,
                threshold: DEFAULT_ANTI_RAID_THRESHOLD,
                timeframe_ms: DEFAULT_ANTI_RAID_TIMEFRAME_MS,
            },
        }
    }
}

/// Partial update merged into a guild's settings row.
///
/// `None` leaves a column untouched. For nullable columns the inner option
/// distinguishes "set to this id" (`Some(Some(id))`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct UpdateGuildSettingsParam {
    pub ban_roles: Option<Vec<u64>>,
    pub auto_role_id: Option<Option<u64>>,
    pub verify_channel_id: Option<Option<u64>>,
    pub verify_role_id: Option<Option<u64>>,
    pub anti_raid_enabled: Option<bool>,
    pub anti_raid_threshold: Option<u32>,
    pub anti_raid_timeframe_ms: Option<i64>,
    pub log_channel_id: Option<Option<u64>>,
}

impl UpdateGuildSettingsParam {
    /// Sets or clears the verification channel and role together.
    pub fn verification(pair: Option<(u64, u64)>) -> Self {
        Self {
            verify_channel_id: Some(pair.map(|(channel, _)| channel)),
            verify_role_id: Some(pair.map(|(_, role)| role)),
            ..Default::default()
        }
    }

    /// Whether the update touches no column at all.
    pub fn is_empty(&self) -> bool {
        self.ban_roles.is_none()
            && self.auto_role_id.is_none()
            && self.verify_channel_id.is_none()
            && self.verify_role_id.is_none()
            && self.anti_raid_enabled.is_none()
            && self.anti_raid_threshold.is_none()
            && self.anti_raid_timeframe_ms.is_none()
            && self.log_channel_id.is_none()
    }
}
