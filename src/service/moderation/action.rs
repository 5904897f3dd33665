//! Ban, kick, mute and warn.

use std::time::Duration;

use chrono::Utc;
use serenity::all::{EditMember, UserId};

use crate::{
    error::AppError,
    model::mod_log::ModAction,
    service::embed,
    util::{
        duration::format_compact,
        time::{full_time, to_discord_timestamp},
    },
};

use super::{ModerationOutcome, ModerationRequest, ModerationService};

impl<'a> ModerationService<'a> {
    /// Whether a user is on the guild's ban list.
    pub async fn is_banned(&self, request: &ModerationRequest<'_>) -> Result<bool, AppError> {
        let target: UserId = request.target.id;
        let bans = request.guild_id.bans(&self.http, None, None).await?;

        Ok(bans.iter().any(|ban| ban.user.id == target))
    }

    /// Bans a user, deleting their recent messages.
    ///
    /// # Arguments
    /// - `request` - Guild, moderator, target and reason
    /// - `delete_message_days` - Days of message history to delete (0-7)
    ///
    /// # Returns
    /// - `Ok(ModerationOutcome)` - Ban applied and recorded
    /// - `Err(AppError::DiscordErr)` - Platform refused the ban; nothing was recorded
    /// - `Err(AppError::DbErr)` - Ban applied but the log entry could not be written
    pub async fn ban(
        &self,
        request: &ModerationRequest<'_>,
        delete_message_days: u8,
    ) -> Result<ModerationOutcome, AppError> {
        let dm_sent = self
            .notify(request, ModAction::Ban, request.reason_text())
            .await;

        request
            .guild_id
            .ban_with_reason(
                &self.http,
                request.target.id,
                delete_message_days,
                request.audit_reason(),
            )
            .await?;

        tracing::info!(
            "{} banned {} in guild {}",
            request.moderator.tag(),
            request.target.tag(),
            request.guild_id
        );

        let card = embed::moderation(
            "User Banned",
            request.target,
            request.moderator,
            Some(request.reason_text()),
            None,
        )
        .field(
            "🗑️ Messages Deleted",
            format!("{} days", delete_message_days),
            true,
        );
        self.record(request, ModAction::Ban, None, card, dm_sent)
            .await?;

        Ok(ModerationOutcome {
            dm_sent,
            until: None,
        })
    }

    /// Kicks a member.
    pub async fn kick(&self, request: &ModerationRequest<'_>) -> Result<ModerationOutcome, AppError> {
        let dm_sent = self
            .notify(request, ModAction::Kick, request.reason_text())
            .await;

        request
            .guild_id
            .kick_with_reason(&self.http, request.target.id, &request.audit_reason())
            .await?;

        tracing::info!(
            "{} kicked {} in guild {}",
            request.moderator.tag(),
            request.target.tag(),
            request.guild_id
        );

        let card = embed::moderation(
            "User Kicked",
            request.target,
            request.moderator,
            Some(request.reason_text()),
            None,
        );
        self.record(request, ModAction::Kick, None, card, dm_sent)
            .await?;

        Ok(ModerationOutcome {
            dm_sent,
            until: None,
        })
    }

    /// Times a member out.
    ///
    /// # Arguments
    /// - `request` - Guild, moderator, target and reason
    /// - `duration` - Timeout length, already validated to 1 minute - 28 days
    pub async fn mute(
        &self,
        request: &ModerationRequest<'_>,
        duration: Duration,
    ) -> Result<ModerationOutcome, AppError> {
        let length = format_compact(duration);
        let until = Utc::now()
            + chrono::Duration::from_std(duration)
                .map_err(|e| AppError::InternalError(format!("Timeout out of range: {}", e)))?;

        let dm_sent = self
            .notify(
                request,
                ModAction::Mute,
                &format!("{} (Duration: {})", request.reason_text(), length),
            )
            .await;

        let audit_reason = request.audit_reason();
        request
            .guild_id
            .edit_member(
                &self.http,
                request.target.id,
                EditMember::new()
                    .disable_communication_until_datetime(to_discord_timestamp(until)?)
                    .audit_log_reason(&audit_reason),
            )
            .await?;

        tracing::info!(
            "{} muted {} in guild {} for {}",
            request.moderator.tag(),
            request.target.tag(),
            request.guild_id,
            length
        );

        let card = embed::moderation(
            "User Muted",
            request.target,
            request.moderator,
            Some(request.reason_text()),
            Some(&length),
        )
        .field("🕐 Until", full_time(until), true);
        self.record(
            request,
            ModAction::Mute,
            Some(duration.as_millis() as i64),
            card,
            dm_sent,
        )
        .await?;

        Ok(ModerationOutcome {
            dm_sent,
            until: Some(until),
        })
    }

    /// Warns a member. Only the notice and the log entry are produced.
    pub async fn warn(&self, request: &ModerationRequest<'_>) -> Result<ModerationOutcome, AppError> {
        let dm_sent = self
            .notify(request, ModAction::Warn, request.reason_text())
            .await;

        let card = embed::moderation(
            "User Warned",
            request.target,
            request.moderator,
            Some(request.reason_text()),
            None,
        );
        self.record(request, ModAction::Warn, None, card, dm_sent)
            .await?;

        Ok(ModerationOutcome {
            dm_sent,
            until: None,
        })
    }
}
