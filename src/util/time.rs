use chrono::{DateTime, Utc};
use serenity::all::Timestamp;

use crate::error::{internal::InternalError, AppError};

/// Converts a UTC time into a Discord embed timestamp.
///
/// # Returns
/// - `Ok(Timestamp)` - Converted timestamp
/// - `Err(AppError::InternalErr(InvalidDiscordTimestamp))` - Time is outside Discord's range
pub fn to_discord_timestamp(time: DateTime<Utc>) -> Result<Timestamp, AppError> {
    let unix = time.timestamp();
    Timestamp::from_unix_timestamp(unix).map_err(|e| {
        InternalError::InvalidDiscordTimestamp {
            timestamp: unix,
            reason: e.to_string(),
        }
        .into()
    })
}

/// Discord markdown rendering `time` relative to the reader, e.g. "in 5 minutes".
pub fn relative_time(time: DateTime<Utc>) -> String {
    format!("<t:{}:R>", time.timestamp())
}

/// Discord markdown rendering `time` as a full date in the reader's locale.
pub fn full_time(time: DateTime<Utc>) -> String {
    format!("<t:{}:F>", time.timestamp())
}
