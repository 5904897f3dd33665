//! Moderation actions and their audit trail.
//!
//! Every action follows the same order: notify the target by DM, perform the
//! platform action, append to the moderation log, then post a card to the guild's
//! log channel. A failed DM never aborts the action; it is reported to the log
//! channel instead.
//!
//! - `action` - Ban, kick, mute and warn
//! - `purge` - Bulk message deletion
//! - `nuke` - Emergency server wipe

pub mod action;
pub mod nuke;
pub mod purge;

use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serenity::{
    all::{ChannelId, CreateEmbed, CreateMessage, GuildId, Member, PartialGuild, User},
    http::Http,
};

use crate::{
    config::Config,
    data::mod_log::ModLogRepository,
    error::AppError,
    middleware::permission::{
        can_moderate, highest_role_position, outranks, HierarchyPosition, MemberAccess,
    },
    model::mod_log::{CreateModLogParam, ModAction, ModLog},
    service::{embed, settings::SettingsService},
};

pub const NO_REASON: &str = "No reason provided";

/// Refuses targets no moderation action may be applied to.
///
/// Runs before any platform call.
///
/// # Returns
/// - `Ok(())` - Target is acceptable
/// - `Err(AppError::BadRequest)` - Target is the moderator, the bot or the guild owner
pub fn validate_target(
    action: ModAction,
    moderator_id: u64,
    bot_id: u64,
    guild_owner_id: u64,
    target_id: u64,
) -> Result<(), AppError> {
    let verb = action.verb();

    if target_id == moderator_id {
        return Err(AppError::BadRequest(format!("You cannot {} yourself!", verb)));
    }
    if target_id == bot_id {
        return Err(AppError::BadRequest(format!("I cannot {} myself!", verb)));
    }
    if target_id == guild_owner_id {
        return Err(AppError::BadRequest(format!(
            "You cannot {} the server owner!",
            verb
        )));
    }

    Ok(())
}

/// One moderation action requested by a moderator.
pub struct ModerationRequest<'r> {
    pub guild_id: GuildId,
    pub moderator: &'r User,
    pub target: &'r User,
    pub reason: Option<String>,
}

impl ModerationRequest<'_> {
    pub fn reason_text(&self) -> &str {
        self.reason.as_deref().unwrap_or(NO_REASON)
    }

    /// Reason recorded in the guild's audit log.
    pub fn audit_reason(&self) -> String {
        format!("{} | Moderator: {}", self.reason_text(), self.moderator.tag())
    }
}

/// What happened besides the action itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModerationOutcome {
    pub dm_sent: bool,
    /// End of a timeout, for mutes.
    pub until: Option<DateTime<Utc>>,
}

/// Aggregated moderation history of one user.
#[derive(Debug, Clone, PartialEq)]
pub struct ModLogSummary<'l> {
    pub total: usize,
    pub first: DateTime<Utc>,
    pub latest: DateTime<Utc>,
    /// Entry count per stored action, in alphabetical order.
    pub counts: BTreeMap<&'l str, usize>,
    /// Up to five newest entries.
    pub recent: Vec<&'l ModLog>,
}

/// Summarises log entries ordered newest first.
///
/// # Returns
/// - `Some(ModLogSummary)` - At least one entry
/// - `None` - The user has a clean record
pub fn summarize(logs: &[ModLog]) -> Option<ModLogSummary<'_>> {
    let latest = logs.first()?.created_at;
    let first = logs.last()?.created_at;

    let mut counts = BTreeMap::new();
    for log in logs {
        *counts.entry(log.action.as_str()).or_insert(0) += 1;
    }

    Some(ModLogSummary {
        total: logs.len(),
        first,
        latest,
        counts,
        recent: logs.iter().take(5).collect(),
    })
}

pub struct ModerationService<'a> {
    db: &'a DatabaseConnection,
    http: Arc<Http>,
    config: &'a Config,
}

impl<'a> ModerationService<'a> {
    pub fn new(db: &'a DatabaseConnection, http: Arc<Http>, config: &'a Config) -> Self {
        Self { db, http, config }
    }

    /// Channel moderation cards are posted to.
    pub async fn log_channel(&self, guild_id: GuildId) -> Result<ChannelId, AppError> {
        SettingsService::new(self.db)
            .log_channel(guild_id, self.config)
            .await
    }

    /// Moderation log of a user in a guild, newest first.
    pub async fn history(&self, user_id: u64, guild_id: u64) -> Result<Vec<ModLog>, AppError> {
        ModLogRepository::new(self.db).query(user_id, guild_id).await
    }

    /// Posts a card to the guild's log channel, logging instead of failing.
    pub async fn post_log(&self, guild_id: GuildId, card: CreateEmbed) {
        let channel_id = match self.log_channel(guild_id).await {
            Ok(channel_id) => channel_id,
            Err(e) => {
                tracing::error!("Failed to resolve log channel for guild {}: {:?}", guild_id, e);
                return;
            }
        };

        if let Err(e) = channel_id
            .send_message(&self.http, CreateMessage::new().embed(card))
            .await
        {
            tracing::error!("Failed to post to log channel {}: {}", channel_id, e);
        }
    }

    /// Checks the role hierarchy between moderator and target.
    ///
    /// # Arguments
    /// - `require_moderator` - Also require the moderator role or `MODERATE_MEMBERS`
    ///
    /// # Returns
    /// - `Ok(())` - Moderator may act on the target
    /// - `Err(AppError::PermissionDenied)` - Target is at or above the moderator
    pub fn check_hierarchy(
        &self,
        action: ModAction,
        guild: &PartialGuild,
        access: &MemberAccess,
        target: &Member,
        require_moderator: bool,
    ) -> Result<(), AppError> {
        let actor = HierarchyPosition {
            user_id: access.user_id,
            top_role_position: highest_role_position(&access.roles, &guild.roles),
        };
        let subject = HierarchyPosition {
            user_id: target.user.id.get(),
            top_role_position: highest_role_position(&target.roles, &guild.roles),
        };
        let owner = guild.owner_id.get();

        let allowed = if require_moderator {
            can_moderate(self.config, access, actor, subject, owner)
        } else {
            outranks(actor, subject, owner)
        };

        if allowed {
            Ok(())
        } else {
            Err(AppError::PermissionDenied(format!(
                "You cannot {} this user due to role hierarchy.",
                action.verb()
            )))
        }
    }

    /// Sends the moderation notice to the target.
    ///
    /// # Returns
    /// - `true` - Notice delivered
    /// - `false` - The target does not accept DMs from the bot
    async fn notify(&self, request: &ModerationRequest<'_>, action: ModAction, reason: &str) -> bool {
        let notice = embed::moderation_notice(action.title(), Some(reason), request.moderator);

        match request
            .target
            .direct_message(&self.http, CreateMessage::new().embed(notice))
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Failed to send DM to {}: {}", request.target.tag(), e);
                false
            }
        }
    }

    /// Appends the action to the moderation log and posts the log cards.
    async fn record(
        &self,
        request: &ModerationRequest<'_>,
        action: ModAction,
        duration_ms: Option<i64>,
        log_card: CreateEmbed,
        dm_sent: bool,
    ) -> Result<(), AppError> {
        ModLogRepository::new(self.db)
            .append(CreateModLogParam {
                user_id: request.target.id.get(),
                moderator_id: request.moderator.id.get(),
                action,
                reason: request.reason.clone(),
                duration_ms,
                guild_id: request.guild_id.get(),
            })
            .await?;

        self.post_log(
            request.guild_id,
            log_card.field("📨 DM Sent", embed::yes_no(dm_sent), true),
        )
        .await;

        if !dm_sent {
            self.post_log(
                request.guild_id,
                embed::dm_failure(request.target, action.title(), request.moderator),
            )
            .await;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn log(id: i32, action: &str, minutes_ago: i64) -> ModLog {
        ModLog {
            id,
            user_id: 1,
            moderator_id: 2,
            action: action.to_string(),
            reason: None,
            duration_ms: None,
            guild_id: 3,
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn refuses_self_bot_and_owner() {
        let refuse = |target| validate_target(ModAction::Kick, 1, 2, 3, target);

        assert!(matches!(refuse(1), Err(AppError::BadRequest(msg)) if msg == "You cannot kick yourself!"));
        assert!(matches!(refuse(2), Err(AppError::BadRequest(msg)) if msg == "I cannot kick myself!"));
        assert!(matches!(refuse(3), Err(AppError::BadRequest(msg)) if msg == "You cannot kick the server owner!"));
        assert!(refuse(4).is_ok());
    }

    #[test]
    fn summary_counts_actions_and_keeps_five_newest() {
        let logs: Vec<ModLog> = (0..7)
            .map(|i| log(i, if i % 2 == 0 { "warned" } else { "muted" }, i as i64))
            .collect();

        let summary = summarize(&logs).unwrap();

        assert_eq!(summary.total, 7);
        assert_eq!(summary.counts.get("warned"), Some(&4));
        assert_eq!(summary.counts.get("muted"), Some(&3));
        assert_eq!(summary.recent.len(), 5);
        assert_eq!(summary.recent[0].id, 0);
        assert_eq!(summary.latest, logs[0].created_at);
        assert_eq!(summary.first, logs[6].created_at);
    }

    #[test]
    fn empty_history_has_no_summary() {
        assert!(summarize(&[]).is_none());
    }
}
