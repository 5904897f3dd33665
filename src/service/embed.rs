//! Card (embed) builders shared by every command.
//!
//! Each kind of card has a fixed colour and title prefix so users can tell a
//! success from a warning at a glance.

use serenity::all::{CreateEmbed, Timestamp, User};

use crate::util::time::full_time;

pub const SUCCESS_COLOR: u32 = 0x00ff00;
pub const ERROR_COLOR: u32 = 0xff0000;
pub const WARNING_COLOR: u32 = 0xffaa00;
pub const INFO_COLOR: u32 = 0x0099ff;
pub const MODERATION_COLOR: u32 = 0xff6b6b;
pub const MUSIC_COLOR: u32 = 0x1db954;
pub const TICKET_COLOR: u32 = 0x5865f2;

const NO_REASON: &str = "No reason provided";

fn card(color: u32, title: String, description: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new()
        .color(color)
        .title(title)
        .description(description)
        .timestamp(Timestamp::now())
}

pub fn success(title: &str, description: impl Into<String>) -> CreateEmbed {
    card(SUCCESS_COLOR, format!("✅ {}", title), description)
}

pub fn error(title: &str, description: impl Into<String>) -> CreateEmbed {
    card(ERROR_COLOR, format!("❌ {}", title), description)
}

pub fn warning(title: &str, description: impl Into<String>) -> CreateEmbed {
    card(WARNING_COLOR, format!("⚠️ {}", title), description)
}

pub fn info(title: &str, description: impl Into<String>) -> CreateEmbed {
    card(INFO_COLOR, format!("ℹ️ {}", title), description)
}

pub fn music(title: &str, description: impl Into<String>) -> CreateEmbed {
    card(MUSIC_COLOR, format!("🎵 {}", title), description)
}

/// Ticket card naming the user it concerns and when it was created.
pub fn ticket(title: &str, description: impl Into<String>, user: &User) -> CreateEmbed {
    card(TICKET_COLOR, format!("🎫 {}", title), description)
        .field("👤 User", format!("{} ({})", user.tag(), user.id), true)
        .field("📅 Created", full_time(chrono::Utc::now()), true)
}

/// Log channel card for a moderation action.
pub fn moderation(
    action: &str,
    user: &User,
    moderator: &User,
    reason: Option<&str>,
    duration: Option<&str>,
) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .color(MODERATION_COLOR)
        .title(format!("🔨 {}", action))
        .field("👤 User", format!("{} ({})", user.tag(), user.id), true)
        .field("👮 Moderator", moderator.tag(), true)
        .field("📝 Reason", reason.unwrap_or(NO_REASON), false)
        .timestamp(Timestamp::now());

    if let Some(duration) = duration {
        embed = embed.field("⏱️ Duration", duration, true);
    }

    embed
}

/// Direct message sent to the target of a moderation action.
///
/// # Arguments
/// - `action` - Past tense action shown in the title, e.g. "Banned"
pub fn moderation_notice(action: &str, reason: Option<&str>, moderator: &User) -> CreateEmbed {
    CreateEmbed::new()
        .color(MODERATION_COLOR)
        .title(format!("🔨 {}", action))
        .description(format!(
            "You have been {} from the server.",
            action.to_lowercase()
        ))
        .field("📝 Reason", reason.unwrap_or(NO_REASON), false)
        .field("👮 Moderator", moderator.tag(), true)
        .field("📅 Time", full_time(chrono::Utc::now()), true)
        .timestamp(Timestamp::now())
}

/// Log channel card reporting that a moderation notice could not be delivered.
pub fn dm_failure(user: &User, action: &str, moderator: &User) -> CreateEmbed {
    warning(
        "DM Delivery Failed",
        format!("Could not deliver {} notification to user.", action),
    )
    .field("👤 User", format!("{} ({})", user.tag(), user.id), true)
    .field("🔨 Action", action, true)
    .field("👮 Moderator", moderator.tag(), true)
}

/// Formats a yes/no flag the way moderation cards show it.
pub fn yes_no(value: bool) -> &'static str {
    if value {
        "✅ Yes"
    } else {
        "❌ No"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::serenity::create_test_user;

    #[test]
    fn cards_use_their_kind_colour_and_prefix() {
        let value = serde_json::to_value(warning("Cooldown Active", "wait")).unwrap();

        assert_eq!(value["color"], WARNING_COLOR);
        assert_eq!(value["title"], "⚠️ Cooldown Active");
        assert_eq!(value["description"], "wait");
    }

    #[test]
    fn moderation_card_defaults_missing_reason() {
        let user = create_test_user(1, "target", false);
        let moderator = create_test_user(2, "mod", false);

        let value = serde_json::to_value(moderation("User Kicked", &user, &moderator, None, None))
            .unwrap();

        assert_eq!(value["color"], MODERATION_COLOR);
        let fields = value["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[2]["value"], NO_REASON);
    }

    #[test]
    fn moderation_card_lists_duration_when_given() {
        let user = create_test_user(1, "target", false);
        let moderator = create_test_user(2, "mod", false);

        let value = serde_json::to_value(moderation(
            "User Muted",
            &user,
            &moderator,
            Some("spam"),
            Some("1h"),
        ))
        .unwrap();

        let fields = value["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[3]["value"], "1h");
    }
}
