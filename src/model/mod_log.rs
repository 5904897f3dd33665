//! Domain models for the moderation audit log.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::{error::AppError, util::parse::parse_u64_from_string};

/// Moderation action recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModAction {
    Ban,
    Kick,
    Mute,
    Warn,
}

impl ModAction {
    /// Stored form of the action, also used in log cards ("banned", "kicked", ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ban => "banned",
            Self::Kick => "kicked",
            Self::Mute => "muted",
            Self::Warn => "warned",
        }
    }

    /// Imperative verb used in refusals, e.g. "You cannot ban yourself!".
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Ban => "ban",
            Self::Kick => "kick",
            Self::Mute => "mute",
            Self::Warn => "warn",
        }
    }

    /// Capitalised past tense used in card titles and notices, e.g. "Banned".
    pub fn title(&self) -> &'static str {
        match self {
            Self::Ban => "Banned",
            Self::Kick => "Kicked",
            Self::Mute => "Muted",
            Self::Warn => "Warned",
        }
    }
}

impl fmt::Display for ModAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable moderation log entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ModLog {
    pub id: i32,
    /// User the action was taken against.
    pub user_id: u64,
    pub moderator_id: u64,
    /// Stored action kind. Kept as text so unknown historical values still display.
    pub action: String,
    pub reason: Option<String>,
    /// Length of time-boxed actions (mutes) in milliseconds.
    pub duration_ms: Option<i64>,
    pub guild_id: u64,
    pub created_at: DateTime<Utc>,
}

impl ModLog {
    /// Converts an entity model to the moderation log domain model.
    ///
    /// # Returns
    /// - `Ok(ModLog)` - The converted entry
    /// - `Err(AppError::InternalErr(ParseStringId))` - A stored id failed to parse
    pub fn from_entity(entity: entity::mod_log::Model) -> Result<Self, AppError> {
        Ok(Self {
            id: entity.id,
            user_id: parse_u64_from_string(entity.user_id)?,
            moderator_id: parse_u64_from_string(entity.moderator_id)?,
            action: entity.action,
            reason: entity.reason,
            duration_ms: entity.duration_ms,
            guild_id: parse_u64_from_string(entity.guild_id)?,
            created_at: entity.created_at,
        })
    }
}

/// Parameters for appending a moderation log entry.
#[derive(Debug, Clone)]
pub struct CreateModLogParam {
    pub user_id: u64,
    pub moderator_id: u64,
    pub action: ModAction,
    pub reason: Option<String>,
    pub duration_ms: Option<i64>,
    pub guild_id: u64,
}
