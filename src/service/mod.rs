pub mod anti_raid;
pub mod economy;
pub mod embed;
pub mod giveaway;
pub mod moderation;
pub mod music;
pub mod report;
pub mod settings;
pub mod ticket;
pub mod verification;
