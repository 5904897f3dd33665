//! `/ping`, `/profile` and `/announce`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serenity::all::{
    ChannelType, CommandOptionType, CreateCommand, CreateCommandOption, CreateEmbed,
    CreateInteractionResponseMessage, CreateMessage, EditInteractionResponse, Mentionable,
    Permissions, Timestamp,
};
use tokio::time::Instant;

use crate::{
    error::AppError,
    middleware::permission::{Permission, PermissionGuard},
    service::embed::{self, INFO_COLOR},
};

use super::{CommandContext, SlashCommand};

/// Roles listed on the profile card.
const PROFILE_ROLES: usize = 10;
const PROFILE_PERMISSIONS: usize = 10;

/// Formats an uptime as `Xd Xh Xm Xs`, dropping leading zero units.
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let (days, hours, minutes, seconds) = (
        total / 86_400,
        (total % 86_400) / 3_600,
        (total % 3_600) / 60,
        total % 60,
    );

    if days > 0 {
        format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Announcement colour for a `color` choice; unknown values fall back to blue.
pub fn announcement_color(name: &str) -> u32 {
    match name {
        "red" => 0xff0000,
        "green" => 0x00ff00,
        "yellow" => 0xffaa00,
        "purple" => 0x9932cc,
        _ => 0x0099ff,
    }
}

pub struct Ping;

#[async_trait]
impl SlashCommand for Ping {
    fn name(&self) -> &'static str {
        "ping"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name()).description("Check the bot's latency and status")
    }

    fn guild_only(&self) -> bool {
        false
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let sent_at = Instant::now();
        cmd.respond(CreateInteractionResponseMessage::new().content("🏓 Pinging..."))
            .await?;
        let roundtrip = sent_at.elapsed();

        let card = embed::info("🏓 Pong!", "Here are the bot's current statistics:")
            .field(
                "🔄 Roundtrip Latency",
                format!("{}ms", roundtrip.as_millis()),
                true,
            )
            .field(
                "⏱️ Uptime",
                format_uptime(cmd.state.started_at.elapsed()),
                true,
            )
            .field("📊 Servers", cmd.ctx.cache.guild_count().to_string(), true)
            .field("👥 Users", cmd.ctx.cache.user_count().to_string(), true);

        cmd.edit_reply(EditInteractionResponse::new().content("").embed(card))
            .await?;

        Ok(())
    }
}

pub struct Profile;

#[async_trait]
impl SlashCommand for Profile {
    fn name(&self) -> &'static str {
        "profile"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("Show user profile information")
            .add_option(CreateCommandOption::new(
                CommandOptionType::User,
                "user",
                "User to show profile for (default: yourself)",
            ))
    }

    fn cooldown(&self) -> Duration {
        Duration::from_secs(5)
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let guild_id = cmd.guild_id()?;
        let options = cmd.options();
        let target = options.user("user").unwrap_or_else(|| cmd.user());

        let mut card = CreateEmbed::new()
            .color(INFO_COLOR)
            .title(format!("👤 {}'s Profile", target.tag()))
            .thumbnail(target.face())
            .field("🆔 User ID", target.id.to_string(), true)
            .field(
                "📅 Account Created",
                format!("<t:{}:F>", target.id.created_at().unix_timestamp()),
                true,
            )
            .field("🤖 Bot", if target.bot { "Yes" } else { "No" }, true)
            .timestamp(Timestamp::now());

        // Not being a member is expected for users picked from outside the guild.
        if let Ok(member) = guild_id.member(&cmd.ctx.http, target.id).await {
            if let Some(joined) = member.joined_at {
                card = card.field(
                    "📅 Joined Server",
                    format!("<t:{}:F>", joined.unix_timestamp()),
                    true,
                );
            }
            card = card
                .field("🎭 Nickname", member.nick.as_deref().unwrap_or("None"), true)
                .field("🎨 Display Name", member.display_name(), true);

            if !member.roles.is_empty() {
                let mut roles = member
                    .roles
                    .iter()
                    .take(PROFILE_ROLES)
                    .map(|role| role.mention().to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                if member.roles.len() > PROFILE_ROLES {
                    roles.push_str(&format!(" (+{} more)", member.roles.len() - PROFILE_ROLES));
                }
                card = card.field("🎭 Roles", roles, false);
            }
        }

        let permissions = cmd
            .interaction
            .data
            .resolved
            .members
            .get(&target.id)
            .and_then(|member| member.permissions)
            .unwrap_or_else(Permissions::empty);
        if !permissions.is_empty() {
            let names = permissions
                .get_permission_names()
                .into_iter()
                .take(PROFILE_PERMISSIONS)
                .map(|name| format!("`{}`", name))
                .collect::<Vec<_>>()
                .join(", ");
            card = card.field("🔑 Key Permissions", names, false);
        }

        cmd.reply(card).await
    }
}

pub struct Announce;

#[async_trait]
impl SlashCommand for Announce {
    fn name(&self) -> &'static str {
        "announce"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("Send an announcement to the server")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "title",
                    "Title of the announcement",
                )
                .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "message",
                    "Content of the announcement",
                )
                .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "color",
                    "Color of the announcement (red, green, blue, yellow, purple)",
                )
                .add_string_choice("Red", "red")
                .add_string_choice("Green", "green")
                .add_string_choice("Blue", "blue")
                .add_string_choice("Yellow", "yellow")
                .add_string_choice("Purple", "purple"),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Channel,
                    "channel",
                    "Channel to send the announcement to (default: current channel)",
                )
                .channel_types(vec![ChannelType::Text, ChannelType::News]),
            )
    }

    fn permissions(&self) -> Permissions {
        Permissions::MANAGE_MESSAGES
    }

    fn cooldown(&self) -> Duration {
        Duration::from_secs(10)
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let access = cmd.access()?;
        PermissionGuard::new(cmd.config(), &access).require(&[Permission::Admin])?;

        let options = cmd.options();
        let title = options.required_str("title")?;
        let message = options.required_str("message")?;
        let color = announcement_color(options.str("color").unwrap_or("blue"));
        let channel_id = options
            .channel("channel")
            .map(|channel| channel.id)
            .unwrap_or(cmd.interaction.channel_id);

        let announcement = CreateEmbed::new()
            .color(color)
            .title(format!("📢 {}", title))
            .description(message)
            .field("👤 Announced By", cmd.user().tag(), true)
            .field("📅 Date", format!("<t:{}:F>", Utc::now().timestamp()), true)
            .timestamp(Timestamp::now());

        channel_id
            .send_message(&cmd.ctx.http, CreateMessage::new().embed(announcement))
            .await?;

        tracing::info!(
            "{} sent announcement \"{}\" to channel {}",
            cmd.user().tag(),
            title,
            channel_id
        );

        cmd.reply_ephemeral(
            embed::success(
                "Announcement Sent",
                format!("Your announcement has been sent to {}.", channel_id.mention()),
            )
            .field("📢 Title", title, true)
            .field("📍 Channel", channel_id.mention().to_string(), true),
        )
        .await
    }
}
