//! Database repository layer for all domain entities.
//!
//! This module contains repository structs that handle database operations for each
//! record kind the bot persists. Repositories use SeaORM entity models internally and
//! return domain models so the entity types stay inside this layer. Multi-column
//! changes are expressed as single statements (upserts, conditional updates) rather
//! than read-modify-write sequences, so concurrent interactions cannot lose updates.

pub mod giveaway;
pub mod guild_settings;
pub mod mod_log;
pub mod racing_race;
pub mod racing_user;
pub mod raid_action;
pub mod verification;

#[cfg(test)]
mod test;
