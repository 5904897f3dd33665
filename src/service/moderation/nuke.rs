//! Emergency server wipe.
//!
//! Every step is best effort: a failure is logged and counted, then the wipe
//! moves on to the next channel, member or role.

use chrono::Utc;
use serenity::all::{
    ChannelType, CreateChannel, CreateEmbed, CreateMessage, GuildId, Role, RoleId, Timestamp,
    User, UserId,
};

use crate::{
    data::raid_action::RaidActionRepository,
    error::AppError,
    middleware::permission::highest_role_position,
    model::raid_action::RaidActionKind,
    service::embed,
};

use super::ModerationService;

const MEMBER_PAGE_SIZE: u64 = 1000;

/// Channel created once the wipe completes.
pub const EMERGENCY_CHANNEL: &str = "emergency-protection";

/// Per-step success and failure counts of a wipe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NukeReport {
    pub channels_deleted: usize,
    pub channels_failed: usize,
    pub members_banned: usize,
    pub bans_failed: usize,
    pub roles_deleted: usize,
    pub roles_failed: usize,
}

/// Roles the bot is able to delete: not `@everyone`, not managed by an
/// integration and strictly below the bot's highest role.
pub fn deletable_roles<'r>(
    roles: impl IntoIterator<Item = &'r Role>,
    guild_id: GuildId,
    bot_top_position: u16,
) -> Vec<RoleId> {
    roles
        .into_iter()
        .filter(|role| role.id.get() != guild_id.get())
        .filter(|role| !role.managed)
        .filter(|role| role.position < bot_top_position)
        .map(|role| role.id)
        .collect()
}

impl<'a> ModerationService<'a> {
    /// Wipes a guild: channels, members and roles, then opens an emergency channel.
    ///
    /// # Arguments
    /// - `guild_id` - Guild to wipe
    /// - `invoker` - Administrator who confirmed; never banned
    /// - `bot_id` - The bot's own account; never banned
    /// - `reason` - Shown in ban reasons and the final card
    ///
    /// # Returns
    /// - `Ok(NukeReport)` - Counts of what succeeded and failed
    /// - `Err(AppError)` - The guild could not be read at all
    pub async fn nuke(
        &self,
        guild_id: GuildId,
        invoker: &User,
        bot_id: UserId,
        reason: &str,
    ) -> Result<NukeReport, AppError> {
        let mut report = NukeReport::default();

        RaidActionRepository::new(self.db)
            .record(guild_id.get(), invoker.id.get(), RaidActionKind::Nuke, Utc::now())
            .await?;

        tracing::warn!("{} started a nuke of guild {}", invoker.tag(), guild_id);

        let channels = guild_id.channels(&self.http).await?;
        for channel in channels
            .values()
            .filter(|channel| channel.kind != ChannelType::Category)
        {
            match channel.delete(&self.http).await {
                Ok(_) => report.channels_deleted += 1,
                Err(e) => {
                    tracing::error!("Failed to delete channel {}: {}", channel.name, e);
                    report.channels_failed += 1;
                }
            }
        }

        let ban_reason = format!("Emergency nuke: {}", reason);
        let mut after: Option<UserId> = None;
        loop {
            let page = guild_id
                .members(&self.http, Some(MEMBER_PAGE_SIZE), after)
                .await?;
            let page_len = page.len() as u64;
            after = page.last().map(|member| member.user.id);

            for member in page
                .iter()
                .filter(|member| member.user.id != invoker.id && member.user.id != bot_id)
            {
                match guild_id
                    .ban_with_reason(&self.http, member.user.id, 0, &ban_reason)
                    .await
                {
                    Ok(()) => report.members_banned += 1,
                    Err(e) => {
                        tracing::error!("Failed to ban member {}: {}", member.user.tag(), e);
                        report.bans_failed += 1;
                    }
                }
            }

            if page_len < MEMBER_PAGE_SIZE {
                break;
            }
        }

        let guild = guild_id.to_partial_guild(&self.http).await?;
        let bot_member = guild_id.member(&self.http, bot_id).await?;
        let bot_top = highest_role_position(&bot_member.roles, &guild.roles);

        for role_id in deletable_roles(guild.roles.values(), guild_id, bot_top) {
            match guild_id.delete_role(&self.http, role_id).await {
                Ok(()) => report.roles_deleted += 1,
                Err(e) => {
                    tracing::error!("Failed to delete role {}: {}", role_id, e);
                    report.roles_failed += 1;
                }
            }
        }

        let channel = guild_id
            .create_channel(
                &self.http,
                CreateChannel::new(EMERGENCY_CHANNEL)
                    .kind(ChannelType::Text)
                    .audit_log_reason("Emergency nuke protection"),
            )
            .await?;

        let card = CreateEmbed::new()
            .color(embed::ERROR_COLOR)
            .title("💥 Server Nuked Successfully")
            .description(format!("Server has been nuked for: {}", reason))
            .timestamp(Timestamp::now());
        channel
            .id
            .send_message(&self.http, CreateMessage::new().embed(card))
            .await?;

        tracing::warn!("Nuke of guild {} finished: {:?}", guild_id, report);

        Ok(report)
    }
}
