//! Support tickets: one private text channel per member.
//!
//! A ticket is identified by its channel name, `ticket-<username>`, so no state
//! is persisted; closing a ticket posts a transcript to the log channel and
//! deletes the channel.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use sea_orm::DatabaseConnection;
use serenity::{
    all::{
        ButtonStyle, ChannelId, ChannelType, CreateActionRow, CreateButton, CreateChannel,
        CreateEmbed, CreateMessage, GetMessages, GuildChannel, GuildId, Message,
        PermissionOverwrite, PermissionOverwriteType, Permissions, RoleId, User, UserId,
    },
    http::Http,
};

use crate::{
    config::Config,
    error::AppError,
    middleware::permission::MemberAccess,
    service::{embed, settings::SettingsService},
    util::time::full_time,
};

pub const CREATE_TICKET_ID: &str = "create_ticket";
pub const CLOSE_TICKET_ID: &str = "close_ticket";
pub const CONFIRM_CLOSE_ID: &str = "confirm_close";
pub const CANCEL_CLOSE_ID: &str = "cancel_close";
pub const CLAIM_TICKET_ID: &str = "claim_ticket";
pub const ADD_USER_ID: &str = "add_user_ticket";
pub const REMOVE_USER_ID: &str = "remove_user_ticket";

const CHANNEL_PREFIX: &str = "ticket-";

/// Transcripts at or above this length are left out of the log card.
const TRANSCRIPT_LIMIT: usize = 2000;
const TRANSCRIPT_PREVIEW: usize = 1000;

/// Delay between confirming a close and deleting the channel.
pub const DELETE_DELAY: Duration = Duration::from_secs(5);

/// Channel name of a member's ticket.
pub fn channel_name(username: &str) -> String {
    format!("{}{}", CHANNEL_PREFIX, username.to_lowercase())
}

pub fn is_ticket_channel(name: &str) -> bool {
    name.starts_with(CHANNEL_PREFIX)
}

/// Short ticket id shown on cards: the last six digits of the channel id.
pub fn short_id(channel_id: ChannelId) -> String {
    let id = channel_id.to_string();
    format!("#{}", &id[id.len().saturating_sub(6)..])
}

/// Whether the member may manage tickets: the moderator role or `MANAGE_CHANNELS`.
pub fn is_staff(config: &Config, access: &MemberAccess) -> bool {
    access.has_role(config.moderator_role_id)
        || access.permissions.contains(Permissions::MANAGE_CHANNELS)
        || access.permissions.contains(Permissions::ADMINISTRATOR)
}

/// Whether `user` opened the ticket in `channel`.
///
/// The opener's id is stored as the channel topic; the channel name is the fallback
/// for channels whose topic was edited.
pub fn is_opener(channel: &GuildChannel, user: &User) -> bool {
    match channel.topic.as_deref() {
        Some(topic) if !topic.is_empty() => topic == user.id.to_string(),
        _ => channel.name == channel_name(&user.name),
    }
}

/// Plain-text transcript of `messages`, oldest first.
///
/// Discord returns history newest first, which is the order expected here.
pub fn build_transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .rev()
        .map(|message| {
            format!(
                "[{}] {}: {}",
                message.timestamp.to_utc().to_rfc3339(),
                message.author.tag(),
                message.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Transcript field value for the log card, when short enough to include.
pub fn transcript_preview(transcript: &str) -> Option<String> {
    if transcript.len() >= TRANSCRIPT_LIMIT {
        return None;
    }

    let preview: String = transcript.chars().take(TRANSCRIPT_PREVIEW).collect();
    Some(format!("```\n{}...\n```", preview))
}

/// Panel posted by `/ticket setup`.
pub fn panel() -> (CreateEmbed, CreateActionRow) {
    let card = embed::info(
        "🎫 Support Tickets",
        "Need help? Create a support ticket and our staff will assist you!",
    )
    .field(
        "📋 How to create a ticket",
        "Click the button below to create a private support channel",
        false,
    )
    .field("⏱️ Response time", "Our staff typically respond within 24 hours", true)
    .field("🔒 Privacy", "Only you and staff can see your ticket", true);

    let button = CreateButton::new(CREATE_TICKET_ID)
        .label("🎫 Create Ticket")
        .style(ButtonStyle::Primary);

    (card, CreateActionRow::Buttons(vec![button]))
}

/// Confirmation prompt shown before a ticket is closed.
pub fn close_prompt(channel_id: ChannelId, closer: &User) -> (CreateEmbed, CreateActionRow) {
    let card = embed::warning(
        "Close Ticket",
        "Are you sure you want to close this ticket? This action cannot be undone.",
    )
    .field("📋 Ticket ID", short_id(channel_id), true)
    .field("👤 Closed By", closer.tag(), true);

    let buttons = vec![
        CreateButton::new(CONFIRM_CLOSE_ID)
            .label("Yes, Close Ticket")
            .emoji('🔒')
            .style(ButtonStyle::Danger),
        CreateButton::new(CANCEL_CLOSE_ID)
            .label("Cancel")
            .emoji('❌')
            .style(ButtonStyle::Secondary),
    ];

    (card, CreateActionRow::Buttons(buttons))
}

fn opening_card(channel_id: ChannelId, opener: &User, title: &str, status: &str) -> CreateEmbed {
    embed::ticket(
        title,
        "Thanks for contacting support! A staff member will be with you soon.",
        opener,
    )
    .field("📋 Ticket ID", short_id(channel_id), true)
    .field("👮 Status", status, true)
}

/// Opening card updated to show who claimed the ticket.
pub fn claimed_card(channel_id: ChannelId, opener: &User, claimer: &User) -> CreateEmbed {
    opening_card(channel_id, opener, "Support Ticket - Claimed", "🟢 Claimed")
        .field("👮 Claimed By", claimer.tag(), true)
}

fn viewer_permissions() -> Permissions {
    Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES | Permissions::READ_MESSAGE_HISTORY
}

pub struct TicketService<'a> {
    db: &'a DatabaseConnection,
    http: Arc<Http>,
    config: &'a Config,
}

impl<'a> TicketService<'a> {
    pub fn new(db: &'a DatabaseConnection, http: Arc<Http>, config: &'a Config) -> Self {
        Self { db, http, config }
    }

    /// Opens a private ticket channel for `opener`.
    ///
    /// # Returns
    /// - `Ok(GuildChannel)` - The new ticket channel
    /// - `Err(AppError::BadRequest)` - The member already has an open ticket
    pub async fn open(&self, guild_id: GuildId, opener: &User) -> Result<GuildChannel, AppError> {
        let name = channel_name(&opener.name);

        let channels = guild_id.channels(&self.http).await?;
        if let Some(existing) = channels
            .values()
            .find(|channel| channel.kind == ChannelType::Text && channel.name == name)
        {
            return Err(AppError::BadRequest(format!(
                "You already have an open ticket: <#{}>",
                existing.id
            )));
        }

        let moderator_role = RoleId::new(self.config.moderator_role_id);
        let overwrites = vec![
            PermissionOverwrite {
                allow: Permissions::empty(),
                deny: Permissions::VIEW_CHANNEL,
                kind: PermissionOverwriteType::Role(guild_id.everyone_role()),
            },
            PermissionOverwrite {
                allow: viewer_permissions(),
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Member(opener.id),
            },
            PermissionOverwrite {
                allow: viewer_permissions(),
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Role(moderator_role),
            },
        ];

        let channel = guild_id
            .create_channel(
                &self.http,
                CreateChannel::new(&name)
                    .kind(ChannelType::Text)
                    .category(ChannelId::new(self.config.tickets_channel_id))
                    .topic(opener.id.to_string())
                    .permissions(overwrites),
            )
            .await?;

        let buttons = vec![
            CreateButton::new(CLAIM_TICKET_ID)
                .label("Claim Ticket")
                .emoji('🙋')
                .style(ButtonStyle::Success),
            CreateButton::new(ADD_USER_ID)
                .label("Add User")
                .emoji('➕')
                .style(ButtonStyle::Primary),
            CreateButton::new(REMOVE_USER_ID)
                .label("Remove User")
                .emoji('➖')
                .style(ButtonStyle::Secondary),
            CreateButton::new(CLOSE_TICKET_ID)
                .label("Close Ticket")
                .emoji('🔒')
                .style(ButtonStyle::Danger),
        ];

        channel
            .id
            .send_message(
                &self.http,
                CreateMessage::new()
                    .content(format!("<@{}> | <@&{}>", opener.id, moderator_role))
                    .embed(opening_card(channel.id, opener, "Support Ticket Created", "🟡 Unclaimed"))
                    .components(vec![CreateActionRow::Buttons(buttons)]),
            )
            .await?;

        tracing::info!("Opened ticket {} for {} in guild {}", channel.id, opener.tag(), guild_id);

        Ok(channel)
    }

    /// Gives a member access to a ticket channel.
    pub async fn add_member(&self, channel_id: ChannelId, user_id: UserId) -> Result<(), AppError> {
        channel_id
            .create_permission(
                &self.http,
                PermissionOverwrite {
                    allow: viewer_permissions(),
                    deny: Permissions::empty(),
                    kind: PermissionOverwriteType::Member(user_id),
                },
            )
            .await?;
        Ok(())
    }

    /// Revokes a member's access to a ticket channel.
    pub async fn remove_member(&self, channel_id: ChannelId, user_id: UserId) -> Result<(), AppError> {
        channel_id
            .delete_permission(&self.http, PermissionOverwriteType::Member(user_id))
            .await?;
        Ok(())
    }

    /// Closes a ticket: announces it, logs the transcript and schedules deletion.
    pub async fn close(&self, channel: &GuildChannel, closer: &User) -> Result<(), AppError> {
        let messages = channel
            .id
            .messages(&self.http, GetMessages::new().limit(100))
            .await?;
        let transcript = build_transcript(&messages);
        let closed_at = full_time(Utc::now());

        let closed_card = embed::info(
            "Ticket Closed",
            format!("This ticket has been closed by {}", closer.tag()),
        )
        .field("📋 Ticket ID", short_id(channel.id), true)
        .field("👤 Closed By", closer.tag(), true)
        .field("📅 Closed At", &closed_at, true);
        channel
            .id
            .send_message(&self.http, CreateMessage::new().embed(closed_card))
            .await?;

        let mut log_card = embed::info(
            "Ticket Closed",
            format!("Ticket <#{}> has been closed", channel.id),
        )
        .field("📋 Ticket ID", short_id(channel.id), true)
        .field("👤 Closed By", closer.tag(), true)
        .field("📅 Closed At", closed_at, true);
        if let Some(preview) = transcript_preview(&transcript) {
            log_card = log_card.field("📄 Transcript", preview, false);
        }

        let log_channel = SettingsService::new(self.db)
            .log_channel(channel.guild_id, self.config)
            .await?;
        if let Err(e) = log_channel
            .send_message(&self.http, CreateMessage::new().embed(log_card))
            .await
        {
            tracing::error!("Failed to log ticket close to {}: {}", log_channel, e);
        }

        let http = self.http.clone();
        let channel_id = channel.id;
        tokio::spawn(async move {
            tokio::time::sleep(DELETE_DELAY).await;
            if let Err(e) = channel_id.delete(&http).await {
                tracing::error!("Failed to delete ticket channel {}: {}", channel_id, e);
            }
        });

        tracing::info!("Closed ticket {} by {}", channel.id, closer.tag());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_names_are_lowercase() {
        assert_eq!(channel_name("Alice"), "ticket-alice");
        assert!(is_ticket_channel("ticket-alice"));
        assert!(!is_ticket_channel("general"));
    }

    #[test]
    fn short_id_keeps_last_six_digits() {
        assert_eq!(short_id(ChannelId::new(1234567890123)), "#890123");
        assert_eq!(short_id(ChannelId::new(42)), "#42");
    }

    #[test]
    fn long_transcripts_are_left_out() {
        assert_eq!(
            transcript_preview("hello").as_deref(),
            Some("```\nhello...\n```")
        );
        assert_eq!(transcript_preview(&"x".repeat(2000)), None);
    }
}
