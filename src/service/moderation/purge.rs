//! Bulk message deletion.

use chrono::{Duration, Utc};
use serenity::all::{ChannelId, GetMessages, GuildId, Message, MessageId, User};

use crate::{error::AppError, service::embed};

use super::ModerationService;

/// Discord refuses to bulk delete messages older than this.
const BULK_DELETE_MAX_AGE_DAYS: i64 = 14;

/// Result of a purge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeOutcome {
    pub deleted: usize,
    /// Matching messages left alone because they are too old to bulk delete.
    pub too_old: usize,
}

/// Picks the messages a purge deletes, split into deletable and too old.
///
/// Pinned messages are always kept; with `author` set only that user's
/// messages are selected.
pub fn select_for_purge(messages: &[Message], author: Option<u64>) -> (Vec<MessageId>, usize) {
    let cutoff = Utc::now() - Duration::days(BULK_DELETE_MAX_AGE_DAYS);
    let mut deletable = Vec::new();
    let mut too_old = 0;

    for message in messages
        .iter()
        .filter(|message| !message.pinned)
        .filter(|message| author.is_none_or(|id| message.author.id.get() == id))
    {
        if message.timestamp.to_utc() > cutoff {
            deletable.push(message.id);
        } else {
            too_old += 1;
        }
    }

    (deletable, too_old)
}

impl<'a> ModerationService<'a> {
    /// Deletes up to `amount` recent messages from a channel.
    ///
    /// # Arguments
    /// - `amount` - How many of the newest messages to inspect (1-100)
    /// - `author` - Only delete this user's messages
    ///
    /// # Returns
    /// - `Ok(PurgeOutcome)` - Messages deleted
    /// - `Err(AppError::BadRequest)` - Nothing matched, or everything is too old
    pub async fn purge(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        moderator: &User,
        amount: u8,
        author: Option<&User>,
        reason: &str,
    ) -> Result<PurgeOutcome, AppError> {
        let messages = channel_id
            .messages(&self.http, GetMessages::new().limit(amount))
            .await?;

        let (deletable, too_old) = select_for_purge(&messages, author.map(|user| user.id.get()));

        if deletable.is_empty() {
            let message = match (author, too_old) {
                (_, n) if n > 0 => {
                    "Some messages are older than 14 days and cannot be deleted.".to_string()
                }
                (Some(user), _) => format!(
                    "No messages found from {} in the last {} messages.",
                    user.tag(),
                    amount
                ),
                (None, _) => "No messages found to delete.".to_string(),
            };
            return Err(AppError::BadRequest(message));
        }

        match deletable.as_slice() {
            [single] => channel_id.delete_message(&self.http, *single).await?,
            many => channel_id.delete_messages(&self.http, many).await?,
        }

        let outcome = PurgeOutcome {
            deleted: deletable.len(),
            too_old,
        };

        tracing::info!(
            "{} purged {} messages in channel {}",
            moderator.tag(),
            outcome.deleted,
            channel_id
        );

        let mut card = embed::info(
            "Messages Purged",
            format!("Messages were purged in <#{}>", channel_id),
        )
        .field("📊 Messages Deleted", outcome.deleted.to_string(), true)
        .field("👮 Moderator", moderator.tag(), true)
        .field("📝 Reason", reason, false)
        .field("📍 Channel", format!("<#{}>", channel_id), true);
        if let Some(user) = author {
            card = card.field("👤 Filtered By", user.tag(), true);
        }
        self.post_log(guild_id, card).await;

        Ok(outcome)
    }
}
