use crate::{
    data::guild_settings::GuildSettingsRepository,
    error::AppError,
    model::guild_settings::{AntiRaidConfig, UpdateGuildSettingsParam},
};
use test_utils::{builder::TestBuilder, factory::guild_settings::GuildSettingsFactory};

mod get;
mod update;
