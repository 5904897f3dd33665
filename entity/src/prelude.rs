pub use super::giveaway::Entity as Giveaway;
pub use super::giveaway_entry::Entity as GiveawayEntry;
pub use super::guild_settings::Entity as GuildSettings;
pub use super::mod_log::Entity as ModLog;
pub use super::racing_race::Entity as RacingRace;
pub use super::racing_user::Entity as RacingUser;
pub use super::raid_action::Entity as RaidAction;
pub use super::verification::Entity as Verification;
