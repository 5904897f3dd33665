pub mod prelude;

pub mod giveaway;
pub mod giveaway_entry;
pub mod guild_settings;
pub mod mod_log;
pub mod racing_race;
pub mod racing_user;
pub mod raid_action;
pub mod verification;
