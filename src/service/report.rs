//! Cards shown when a command fails and the report forwarded to the developer.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serenity::all::{CreateEmbed, Timestamp};

use crate::{
    error::AppError,
    service::embed,
    util::time::{full_time, relative_time},
};

const DETAILS_LIMIT: usize = 1000;

/// Card shown to the invoker when a command fails.
///
/// Input and permission errors are shown verbatim; anything else gets the generic
/// failure card.
pub fn user_facing_card(err: &AppError, now: DateTime<Utc>) -> CreateEmbed {
    match err {
        AppError::PermissionDenied(msg) => embed::error("Insufficient Permissions", msg.as_str()),
        AppError::BadRequest(msg) | AppError::NotFound(msg) => embed::error("Error", msg.as_str()),
        _ => embed::error(
            "An Error Occurred",
            "Something went wrong while processing your request.",
        )
        .field("Error", format!("```{}```", truncate(&err.to_string())), false)
        .field("Time", full_time(now), true),
    }
}

/// Card shown when the invoker lacks every permission a command accepts.
pub fn permission_denied_card() -> CreateEmbed {
    embed::error(
        "Insufficient Permissions",
        "You do not have the required permissions to use this command.",
    )
}

fn truncate(text: &str) -> String {
    text.chars().take(DETAILS_LIMIT).collect()
}

/// Whether `err` should be forwarded to the developer.
pub fn should_report(err: &AppError) -> bool {
    err.user_message().is_none()
}

/// Context of a failed command invocation.
#[derive(Debug, Clone)]
pub struct FailureContext {
    pub command: String,
    pub user_tag: String,
    pub user_id: u64,
    pub guild: Option<String>,
    pub channel_id: u64,
}

/// DM sent to the developer for an unexpected command failure.
pub fn developer_report(failure: &FailureContext, err: &AppError) -> CreateEmbed {
    CreateEmbed::new()
        .color(embed::ERROR_COLOR)
        .title("🚨 Bot Error Report")
        .description("An error occurred in the bot")
        .field("📋 Command", format!("/{}", failure.command), true)
        .field(
            "👤 User",
            format!("{} ({})", failure.user_tag, failure.user_id),
            true,
        )
        .field(
            "🏠 Guild",
            failure.guild.as_deref().unwrap_or("Direct Message"),
            true,
        )
        .field("📍 Channel", format!("<#{}>", failure.channel_id), true)
        .field("❌ Error", format!("```\n{}\n```", truncate(&err.to_string())), false)
        .timestamp(Timestamp::now())
}

/// Card shown when the invoker is still cooling down for a command.
pub fn cooldown_card(command: &str, remaining: Duration, now: DateTime<Utc>) -> CreateEmbed {
    let release = now
        + chrono::Duration::from_std(remaining).unwrap_or_else(|_| chrono::Duration::zero());

    CreateEmbed::new()
        .color(embed::WARNING_COLOR)
        .title("⏰ Cooldown Active")
        .description(format!(
            "Please wait {} before using `/{}` again.",
            relative_time(release),
            command
        ))
        .timestamp(Timestamp::now())
}
