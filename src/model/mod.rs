//! Domain models and operation-specific parameter types.
//!
//! Models are converted from entity models at the repository boundary so entity
//! types never leak into services or command handlers. Stored snowflake strings
//! are parsed back into `u64` during that conversion.

pub mod giveaway;
pub mod guild_settings;
pub mod mod_log;
pub mod racing;
pub mod raid_action;
pub mod verification;
