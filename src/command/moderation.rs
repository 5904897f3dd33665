//! Moderation commands: ban, kick, mute, warn, modlogs, purge and nuke.

use std::time::Duration;

use async_trait::async_trait;
use serenity::all::{
    ButtonStyle, CommandOptionType, CreateActionRow, CreateButton, CreateCommand,
    CreateCommandOption, CreateEmbed, CreateEmbedFooter, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, GuildId, Member, PartialGuild, Permissions, User,
};

use crate::{
    error::AppError,
    middleware::permission::{may_ban, MemberAccess},
    model::mod_log::ModAction,
    service::{
        embed,
        moderation::{
            summarize, validate_target, ModerationRequest, ModerationService, NO_REASON,
        },
        settings::SettingsService,
    },
    util::{
        duration::{format_compact, parse_bounded_duration},
        time::full_time,
    },
};

use super::{
    options::{bounded, Options},
    CommandContext, SlashCommand,
};

const NUKE_CONFIRM_ID: &str = "nuke_confirm";
const NUKE_CANCEL_ID: &str = "nuke_cancel";
const NUKE_TIMEOUT: Duration = Duration::from_secs(30);
const NUKE_DEFAULT_REASON: &str = "Emergency server protection";

fn user_option(name: &str, description: &str) -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::User, name, description).required(true)
}

fn reason_option(description: &str) -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::String, "reason", description)
}

/// Everything a moderation command needs about the guild, the moderator and the target.
struct Target<'c> {
    guild_id: GuildId,
    guild: PartialGuild,
    access: MemberAccess,
    user: &'c User,
    reason: Option<String>,
}

impl<'c> Target<'c> {
    async fn resolve(
        cmd: &CommandContext<'c>,
        options: &Options<'c>,
        action: ModAction,
    ) -> Result<Self, AppError> {
        let guild_id = cmd.guild_id()?;
        let access = cmd.access()?;
        let user = options.required_user("user")?;
        let guild = guild_id.to_partial_guild(&cmd.ctx.http).await?;
        let bot_id = cmd.ctx.cache.current_user().id.get();

        validate_target(action, access.user_id, bot_id, guild.owner_id.get(), user.id.get())?;

        Ok(Self {
            guild_id,
            guild,
            access,
            user,
            reason: options.str("reason").map(str::to_string),
        })
    }

    async fn member(&self, cmd: &CommandContext<'_>) -> Result<Member, AppError> {
        self.guild_id
            .member(&cmd.ctx.http, self.user.id)
            .await
            .map_err(|_| AppError::BadRequest("This user is not in the server.".to_string()))
    }

    fn request<'r>(&'r self, moderator: &'r User) -> ModerationRequest<'r> {
        ModerationRequest {
            guild_id: self.guild_id,
            moderator,
            target: self.user,
            reason: self.reason.clone(),
        }
    }
}

/// Success card shown to the moderator after an action.
fn action_card(
    title: &str,
    description: String,
    request: &ModerationRequest<'_>,
    dm_sent: bool,
) -> CreateEmbed {
    embed::success(title, description)
        .field(
            "👤 User",
            format!("{} ({})", request.target.tag(), request.target.id),
            true,
        )
        .field("👮 Moderator", request.moderator.tag(), true)
        .field("📝 Reason", request.reason_text(), false)
        .field("📨 DM Sent", embed::yes_no(dm_sent), true)
}

pub struct Ban;

#[async_trait]
impl SlashCommand for Ban {
    fn name(&self) -> &'static str {
        "ban"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("Ban a user from the server")
            .add_option(user_option("user", "The user to ban"))
            .add_option(reason_option("Reason for the ban"))
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "delete_messages",
                    "Number of days of messages to delete (0-7)",
                )
                .min_int_value(0)
                .max_int_value(7),
            )
    }

    fn cooldown(&self) -> Duration {
        Duration::from_secs(5)
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let options = cmd.options();
        let target = Target::resolve(cmd, &options, ModAction::Ban).await?;
        let delete_days = bounded(
            "delete_messages",
            options.integer("delete_messages").unwrap_or(0),
            0,
            7,
        )? as u8;

        let ban_roles = SettingsService::new(cmd.db())
            .get(target.guild_id)
            .await?
            .map(|settings| settings.ban_roles)
            .unwrap_or_default();
        if !may_ban(&target.access, &ban_roles) {
            return Err(AppError::PermissionDenied(
                "You do not have the required permissions to use this command.".to_string(),
            ));
        }

        let service = ModerationService::new(cmd.db(), cmd.http(), cmd.config());
        let request = target.request(cmd.user());

        if service.is_banned(&request).await? {
            return Err(AppError::BadRequest(
                "This user is already banned from the server.".to_string(),
            ));
        }

        // Users who already left can still be banned; hierarchy only applies to members.
        if let Ok(member) = target.guild_id.member(&cmd.ctx.http, target.user.id).await {
            service.check_hierarchy(ModAction::Ban, &target.guild, &target.access, &member, false)?;
        }

        let outcome = service.ban(&request, delete_days).await?;

        let card = action_card(
            "User Banned",
            format!("Successfully banned {} from the server.", target.user.tag()),
            &request,
            outcome.dm_sent,
        )
        .field("🗑️ Messages Deleted", format!("{} days", delete_days), true);
        cmd.reply(card).await
    }
}

pub struct Kick;

#[async_trait]
impl SlashCommand for Kick {
    fn name(&self) -> &'static str {
        "kick"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("Kick a user from the server")
            .add_option(user_option("user", "The user to kick"))
            .add_option(reason_option("Reason for the kick"))
    }

    fn permissions(&self) -> Permissions {
        Permissions::KICK_MEMBERS
    }

    fn cooldown(&self) -> Duration {
        Duration::from_secs(5)
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let options = cmd.options();
        let target = Target::resolve(cmd, &options, ModAction::Kick).await?;
        let member = target.member(cmd).await?;

        let service = ModerationService::new(cmd.db(), cmd.http(), cmd.config());
        service.check_hierarchy(ModAction::Kick, &target.guild, &target.access, &member, true)?;

        let request = target.request(cmd.user());
        let outcome = service.kick(&request).await?;

        cmd.reply(action_card(
            "User Kicked",
            format!("Successfully kicked {} from the server.", target.user.tag()),
            &request,
            outcome.dm_sent,
        ))
        .await
    }
}

pub struct Mute;

#[async_trait]
impl SlashCommand for Mute {
    fn name(&self) -> &'static str {
        "mute"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("Timeout a user")
            .add_option(user_option("user", "The user to mute"))
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "duration",
                    "Duration of the mute (e.g. 1h, 30m, 1d, 2h30m)",
                )
                .required(true),
            )
            .add_option(reason_option("Reason for the mute"))
    }

    fn permissions(&self) -> Permissions {
        Permissions::MODERATE_MEMBERS
    }

    fn cooldown(&self) -> Duration {
        Duration::from_secs(5)
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let options = cmd.options();
        let target = Target::resolve(cmd, &options, ModAction::Mute).await?;
        let member = target.member(cmd).await?;

        let service = ModerationService::new(cmd.db(), cmd.http(), cmd.config());
        service.check_hierarchy(ModAction::Mute, &target.guild, &target.access, &member, true)?;

        let duration = parse_bounded_duration(options.required_str("duration")?)?;

        let request = target.request(cmd.user());
        let outcome = service.mute(&request, duration).await?;

        let mut card = action_card(
            "User Muted",
            format!("Successfully muted {}.", target.user.tag()),
            &request,
            outcome.dm_sent,
        )
        .field("⏱️ Duration", format_compact(duration), true);
        if let Some(until) = outcome.until {
            card = card.field("🕐 Until", full_time(until), true);
        }
        cmd.reply(card).await
    }
}

pub struct Warn;

#[async_trait]
impl SlashCommand for Warn {
    fn name(&self) -> &'static str {
        "warn"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("Warn a user")
            .add_option(user_option("user", "The user to warn"))
            .add_option(reason_option("Reason for the warning").required(true))
    }

    fn permissions(&self) -> Permissions {
        Permissions::MODERATE_MEMBERS
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let options = cmd.options();
        let target = Target::resolve(cmd, &options, ModAction::Warn).await?;
        let member = target.member(cmd).await?;

        let service = ModerationService::new(cmd.db(), cmd.http(), cmd.config());
        service.check_hierarchy(ModAction::Warn, &target.guild, &target.access, &member, true)?;

        let request = target.request(cmd.user());
        let outcome = service.warn(&request).await?;

        cmd.reply(action_card(
            "User Warned",
            format!("Successfully warned {}.", target.user.tag()),
            &request,
            outcome.dm_sent,
        ))
        .await
    }
}

pub struct ModLogs;

#[async_trait]
impl SlashCommand for ModLogs {
    fn name(&self) -> &'static str {
        "modlogs"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("View moderation logs for a user")
            .add_option(user_option("user", "The user to check"))
    }

    fn permissions(&self) -> Permissions {
        Permissions::MODERATE_MEMBERS
    }

    fn cooldown(&self) -> Duration {
        Duration::from_secs(5)
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let guild_id = cmd.guild_id()?;
        let user = cmd.options().required_user("user")?;
        let service = ModerationService::new(cmd.db(), cmd.http(), cmd.config());
        let logs = service.history(user.id.get(), guild_id.get()).await?;
        let user_field = format!("{} ({})", user.tag(), user.id);

        let Some(summary) = summarize(&logs) else {
            let card = embed::info(
                "No Moderation Logs",
                format!("No moderation actions found for {}.", user.tag()),
            )
            .field("👤 User", user_field, true)
            .field("📊 Total Actions", "0", true);
            return cmd.reply(card).await;
        };

        let mut card = embed::info(
            "Moderation Logs",
            format!("Moderation history for {}", user.tag()),
        )
        .field("👤 User", user_field, true)
        .field("📊 Total Actions", summary.total.to_string(), true)
        .field("📅 First Action", full_time(summary.first), true)
        .field("📅 Latest Action", full_time(summary.latest), true);

        for (action, count) in &summary.counts {
            card = card.field(format!("🔨 {}s", capitalize(action)), count.to_string(), true);
        }

        let recent = summary
            .recent
            .iter()
            .map(|log| {
                let duration = log
                    .duration_ms
                    .map(|ms| {
                        let length = Duration::from_millis(ms.max(0) as u64);
                        format!(" ({})", format_compact(length))
                    })
                    .unwrap_or_default();
                format!(
                    "**{}**{} - <@{}>\n*{}*",
                    capitalize(&log.action),
                    duration,
                    log.moderator_id,
                    log.reason.as_deref().unwrap_or("No reason provided")
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");
        card = card.field("📋 Recent Actions", recent, false);

        cmd.reply(card).await
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub struct Purge;

#[async_trait]
impl SlashCommand for Purge {
    fn name(&self) -> &'static str {
        "purge"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("Delete multiple messages")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "amount",
                    "Number of messages to delete (1-100)",
                )
                .min_int_value(1)
                .max_int_value(100)
                .required(true),
            )
            .add_option(CreateCommandOption::new(
                CommandOptionType::User,
                "user",
                "Only delete messages from this user",
            ))
            .add_option(reason_option("Reason for the purge"))
    }

    fn permissions(&self) -> Permissions {
        Permissions::MANAGE_MESSAGES
    }

    fn cooldown(&self) -> Duration {
        Duration::from_secs(10)
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let guild_id = cmd.guild_id()?;
        let options = cmd.options();
        let amount = bounded("amount", options.required_integer("amount")?, 1, 100)? as u8;
        let author = options.user("user");
        let reason = options.str("reason").unwrap_or(NO_REASON);

        let service = ModerationService::new(cmd.db(), cmd.http(), cmd.config());
        let outcome = service
            .purge(
                guild_id,
                cmd.interaction.channel_id,
                cmd.user(),
                amount,
                author,
                reason,
            )
            .await?;

        let mut card = embed::success(
            "Messages Purged",
            format!("Successfully deleted {} message(s).", outcome.deleted),
        )
        .field("📊 Messages Deleted", outcome.deleted.to_string(), true)
        .field("👮 Moderator", cmd.user().tag(), true)
        .field("📝 Reason", reason, false);
        if let Some(user) = author {
            card = card.field("👤 Filtered By", user.tag(), true);
        }
        if outcome.too_old > 0 {
            card = card.field(
                "⚠️ Skipped",
                format!("{} message(s) older than 14 days", outcome.too_old),
                true,
            );
        }

        // Ephemeral so the reply is not caught by the next purge.
        cmd.reply_ephemeral(card).await
    }
}

pub struct Nuke;

#[async_trait]
impl SlashCommand for Nuke {
    fn name(&self) -> &'static str {
        "nuke"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("Emergency server protection - removes all channels and bans all members")
            .default_member_permissions(Permissions::ADMINISTRATOR)
            .add_option(reason_option("Reason for nuking the server"))
    }

    fn permissions(&self) -> Permissions {
        Permissions::ADMINISTRATOR
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let guild_id = cmd.guild_id()?;
        let reason = cmd
            .options()
            .str("reason")
            .unwrap_or(NUKE_DEFAULT_REASON)
            .to_string();

        let prompt = CreateEmbed::new()
            .color(embed::ERROR_COLOR)
            .title("⚠️ EMERGENCY NUKE CONFIRMATION")
            .description(
                "**WARNING: This action will:**\n• Delete ALL channels\n• Ban ALL members\n\
                 • Remove ALL roles\n• This action is IRREVERSIBLE!\n\nAre you sure you want to proceed?",
            )
            .footer(CreateEmbedFooter::new("This action cannot be undone!"));
        let buttons = vec![
            CreateButton::new(NUKE_CONFIRM_ID)
                .label("CONFIRM NUKE")
                .emoji('💥')
                .style(ButtonStyle::Danger),
            CreateButton::new(NUKE_CANCEL_ID)
                .label("Cancel")
                .emoji('❌')
                .style(ButtonStyle::Secondary),
        ];
        cmd.respond(
            CreateInteractionResponseMessage::new()
                .embed(prompt)
                .components(vec![CreateActionRow::Buttons(buttons)])
                .ephemeral(true),
        )
        .await?;

        let message = cmd.interaction.get_response(&cmd.ctx.http).await?;
        let choice = message
            .await_component_interaction(&cmd.ctx.shard)
            .author_id(cmd.user().id)
            .timeout(NUKE_TIMEOUT)
            .await;

        let Some(choice) = choice else {
            cmd.follow_up(
                CreateInteractionResponseFollowup::new()
                    .embed(embed::error("Error", "Nuke confirmation timed out."))
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        };
        choice.defer(&cmd.ctx.http).await?;

        if choice.data.custom_id != NUKE_CONFIRM_ID {
            cmd.follow_up(
                CreateInteractionResponseFollowup::new()
                    .embed(embed::success("Success", "Nuke operation cancelled."))
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        }

        let service = ModerationService::new(cmd.db(), cmd.http(), cmd.config());
        let bot_id = cmd.ctx.cache.current_user().id;
        if let Err(e) = service.nuke(guild_id, cmd.user(), bot_id, &reason).await {
            tracing::error!("Nuke of guild {} failed: {:?}", guild_id, e);
            // The invoking channel is usually gone by now; the follow-up is best effort.
            let _ = cmd
                .follow_up(
                    CreateInteractionResponseFollowup::new()
                        .embed(embed::error(
                            "Error",
                            "Failed to complete nuke operation. Some actions may have been performed.",
                        ))
                        .ephemeral(true),
                )
                .await;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalizes_stored_actions() {
        assert_eq!(capitalize("banned"), "Banned");
        assert_eq!(capitalize(""), "");
    }
}
