pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_guild_settings_table;
mod m20260301_000002_create_mod_log_table;
mod m20260301_000003_create_giveaway_table;
mod m20260301_000004_create_giveaway_entry_table;
mod m20260301_000005_create_verification_table;
mod m20260301_000006_create_raid_action_table;
mod m20260302_000007_create_racing_user_table;
mod m20260302_000008_create_racing_race_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_guild_settings_table::Migration),
            Box::new(m20260301_000002_create_mod_log_table::Migration),
            Box::new(m20260301_000003_create_giveaway_table::Migration),
            Box::new(m20260301_000004_create_giveaway_entry_table::Migration),
            Box::new(m20260301_000005_create_verification_table::Migration),
            Box::new(m20260301_000006_create_raid_action_table::Migration),
            Box::new(m20260302_000007_create_racing_user_table::Migration),
            Box::new(m20260302_000008_create_racing_race_table::Migration),
        ]
    }
}
