mod giveaway;
mod guild_settings;
mod mod_log;
mod racing_race;
mod racing_user;
mod raid_action;
mod verification;
