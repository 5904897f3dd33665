use chrono::{DateTime, Utc};

use crate::{error::AppError, util::parse::parse_u64_from_string};

/// Verification state of one member in one guild.
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    pub user_id: u64,
    pub guild_id: u64,
    pub verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Verification {
    pub fn from_entity(entity: entity::verification::Model) -> Result<Self, AppError> {
        Ok(Self {
            user_id: parse_u64_from_string(entity.user_id)?,
            guild_id: parse_u64_from_string(entity.guild_id)?,
            verified: entity.verified,
            verified_at: entity.verified_at,
            created_at: entity.created_at,
        })
    }
}
