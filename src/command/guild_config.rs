//! Per-guild configuration commands: anti-raid, auto-role, verification and settings.
//!
//! All of them require `ADMINISTRATOR` and write straight to the guild's
//! settings row.

use async_trait::async_trait;
use serenity::all::{
    ChannelType, CommandOptionType, CreateCommand, CreateCommandOption,
    CreateInteractionResponseMessage, GuildId, Permissions, Role,
};

use crate::{
    error::AppError,
    middleware::permission::highest_role_position,
    model::guild_settings::{DEFAULT_ANTI_RAID_THRESHOLD, DEFAULT_ANTI_RAID_TIMEFRAME_MS},
    service::{
        embed,
        settings::{self, SettingsService},
        verification::VerificationService,
    },
};

use super::{
    options::{bounded, unknown_subcommand},
    CommandContext, SlashCommand,
};

fn subcommand(name: &str, description: &str) -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::SubCommand, name, description)
}

/// Refuses roles the bot cannot grant because they sit at or above its own top role.
async fn ensure_assignable(
    cmd: &CommandContext<'_>,
    guild_id: GuildId,
    role: &Role,
) -> Result<(), AppError> {
    let guild = guild_id.to_partial_guild(&cmd.ctx.http).await?;
    let bot_id = cmd.ctx.cache.current_user().id;
    let bot = guild_id.member(&cmd.ctx.http, bot_id).await?;

    if role.position >= highest_role_position(&bot.roles, &guild.roles) {
        return Err(AppError::BadRequest(
            "I cannot assign this role as it is higher than or equal to my highest role."
                .to_string(),
        ));
    }

    Ok(())
}

pub struct AntiRaid;

#[async_trait]
impl SlashCommand for AntiRaid {
    fn name(&self) -> &'static str {
        "antiraid"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("Configure anti-raid protection settings")
            .default_member_permissions(Permissions::ADMINISTRATOR)
            .add_option(
                subcommand("enable", "Enable anti-raid protection")
                    .add_sub_option(
                        CreateCommandOption::new(
                            CommandOptionType::Integer,
                            "threshold",
                            "Number of actions before triggering (default: 5)",
                        )
                        .min_int_value(3)
                        .max_int_value(20),
                    )
                    .add_sub_option(
                        CreateCommandOption::new(
                            CommandOptionType::Integer,
                            "timeframe",
                            "Timeframe in seconds (default: 60)",
                        )
                        .min_int_value(10)
                        .max_int_value(300),
                    ),
            )
            .add_option(subcommand("disable", "Disable anti-raid protection"))
            .add_option(subcommand("status", "Check current anti-raid status"))
    }

    fn permissions(&self) -> Permissions {
        Permissions::ADMINISTRATOR
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let guild_id = cmd.guild_id()?;
        let service = SettingsService::new(cmd.db());
        let (name, options) = cmd.options().subcommand()?;

        match name {
            "enable" => {
                let threshold = bounded(
                    "threshold",
                    options
                        .integer("threshold")
                        .unwrap_or(i64::from(DEFAULT_ANTI_RAID_THRESHOLD)),
                    3,
                    20,
                )?;
                let timeframe = bounded(
                    "timeframe",
                    options
                        .integer("timeframe")
                        .unwrap_or(DEFAULT_ANTI_RAID_TIMEFRAME_MS / 1000),
                    10,
                    300,
                )?;

                service
                    .enable_anti_raid(guild_id, threshold as u32, timeframe)
                    .await?;

                let card = embed::success("Anti-Raid Enabled", "Anti-raid protection enabled!")
                    .field("Threshold", format!("{} actions", threshold), true)
                    .field("Timeframe", format!("{} seconds", timeframe), true);
                cmd.reply(card).await
            }
            "disable" => {
                service.disable_anti_raid(guild_id).await?;
                cmd.reply(embed::success(
                    "Anti-Raid Disabled",
                    "Anti-raid protection disabled!",
                ))
                .await
            }
            "status" => {
                let current = service.get(guild_id).await?;
                cmd.reply(settings::anti_raid_status(current.as_ref())).await
            }
            other => Err(unknown_subcommand(other)),
        }
    }
}

pub struct AutoRole;

#[async_trait]
impl SlashCommand for AutoRole {
    fn name(&self) -> &'static str {
        "autorole"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("Configure automatic role assignment")
            .default_member_permissions(Permissions::ADMINISTRATOR)
            .add_option(
                subcommand("set", "Set the role to automatically assign to new members")
                    .add_sub_option(
                        CreateCommandOption::new(
                            CommandOptionType::Role,
                            "role",
                            "The role to assign automatically",
                        )
                        .required(true),
                    ),
            )
            .add_option(subcommand("remove", "Remove automatic role assignment"))
            .add_option(subcommand("status", "Check current auto-role settings"))
    }

    fn permissions(&self) -> Permissions {
        Permissions::ADMINISTRATOR
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let guild_id = cmd.guild_id()?;
        let service = SettingsService::new(cmd.db());
        let (name, options) = cmd.options().subcommand()?;

        match name {
            "set" => {
                let role = options.required_role("role")?;
                ensure_assignable(cmd, guild_id, role).await?;

                service.set_auto_role(guild_id, Some(role.id)).await?;

                cmd.reply(embed::success(
                    &format!("Auto-role set to {}!", role.name),
                    format!(
                        "New members will automatically receive <@&{}> when they join the server.",
                        role.id
                    ),
                ))
                .await
            }
            "remove" => {
                service.set_auto_role(guild_id, None).await?;
                cmd.reply(embed::success(
                    "Auto-role removed!",
                    "New members will no longer receive a role automatically.",
                ))
                .await
            }
            "status" => {
                let current = service.get(guild_id).await?;
                cmd.reply(settings::auto_role_status(current.as_ref())).await
            }
            other => Err(unknown_subcommand(other)),
        }
    }
}

pub struct Verify;

#[async_trait]
impl SlashCommand for Verify {
    fn name(&self) -> &'static str {
        "verify"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("Configure verification system")
            .default_member_permissions(Permissions::ADMINISTRATOR)
            .add_option(
                subcommand("setup", "Set up verification system")
                    .add_sub_option(
                        CreateCommandOption::new(
                            CommandOptionType::Channel,
                            "channel",
                            "Channel to send verification message",
                        )
                        .channel_types(vec![ChannelType::Text])
                        .required(true),
                    )
                    .add_sub_option(
                        CreateCommandOption::new(
                            CommandOptionType::Role,
                            "role",
                            "Role to give after verification",
                        )
                        .required(true),
                    ),
            )
            .add_option(subcommand("remove", "Remove verification system"))
            .add_option(subcommand("status", "Check verification system status"))
    }

    fn permissions(&self) -> Permissions {
        Permissions::ADMINISTRATOR
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let guild_id = cmd.guild_id()?;
        let (name, options) = cmd.options().subcommand()?;

        match name {
            "setup" => {
                let channel = options.required_channel("channel")?;
                let role = options.required_role("role")?;
                ensure_assignable(cmd, guild_id, role).await?;

                VerificationService::new(cmd.db(), cmd.http())
                    .setup(guild_id, channel.id, role.id)
                    .await?;

                let card = embed::success(
                    "Verification Enabled",
                    "Verification system set up!",
                )
                .field("Channel", format!("<#{}>", channel.id), true)
                .field("Role", format!("<@&{}>", role.id), true);
                cmd.reply(card).await
            }
            "remove" => {
                SettingsService::new(cmd.db())
                    .set_verification(guild_id, None)
                    .await?;
                cmd.reply(embed::success(
                    "Verification Disabled",
                    "Verification system removed!",
                ))
                .await
            }
            "status" => {
                let current = SettingsService::new(cmd.db()).get(guild_id).await?;
                cmd.reply(settings::verification_status(current.as_ref()))
                    .await
            }
            other => Err(unknown_subcommand(other)),
        }
    }
}

pub struct Settings;

#[async_trait]
impl SlashCommand for Settings {
    fn name(&self) -> &'static str {
        "settings"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("Configure bot settings for your server")
            .default_member_permissions(Permissions::ADMINISTRATOR)
    }

    fn permissions(&self) -> Permissions {
        Permissions::ADMINISTRATOR
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let guild_id = cmd.guild_id()?;
        let current = SettingsService::new(cmd.db()).get(guild_id).await?;
        let (card, menu) = settings::overview(current.as_ref());

        cmd.respond(
            CreateInteractionResponseMessage::new()
                .embed(card)
                .components(vec![menu])
                .ephemeral(true),
        )
        .await
    }
}
