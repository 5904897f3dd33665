//! Domain & parameter models for giveaways.

use chrono::{DateTime, Utc};

use crate::{error::AppError, util::parse::parse_u64_from_string};

/// A giveaway announced in a channel.
///
/// The announcement message id is the external correlation key used by the join
/// button and the `/giveaway end|reroll` commands. Participants are stored
/// separately and loaded with `GiveawayRepository::participants`.
#[derive(Debug, Clone, PartialEq)]
pub struct Giveaway {
    pub id: i32,
    pub message_id: u64,
    pub channel_id: u64,
    pub guild_id: u64,
    pub prize: String,
    pub winner_count: u32,
    pub end_time: DateTime<Utc>,
    pub creator_id: u64,
    /// Flips to false exactly once, when the giveaway is ended.
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Giveaway {
    /// Converts an entity model to the giveaway domain model.
    ///
    /// # Returns
    /// - `Ok(Giveaway)` - The converted giveaway
    /// - `Err(AppError::InternalErr(ParseStringId))` - A stored id failed to parse
    pub fn from_entity(entity: entity::giveaway::Model) -> Result<Self, AppError> {
        Ok(Self {
            id: entity.id,
            message_id: parse_u64_from_string(entity.message_id)?,
            channel_id: parse_u64_from_string(entity.channel_id)?,
            guild_id: parse_u64_from_string(entity.guild_id)?,
            prize: entity.prize,
            winner_count: entity.winner_count.max(1) as u32,
            end_time: entity.end_time,
            creator_id: parse_u64_from_string(entity.creator_id)?,
            active: entity.active,
            created_at: entity.created_at,
        })
    }

    /// Whether the giveaway is accepting entries at `now`.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.active && self.end_time > now
    }
}

/// Parameters for recording a freshly announced giveaway.
#[derive(Debug, Clone)]
pub struct CreateGiveawayParam {
    pub message_id: u64,
    pub channel_id: u64,
    pub guild_id: u64,
    pub prize: String,
    pub winner_count: u32,
    pub end_time: DateTime<Utc>,
    pub creator_id: u64,
}
