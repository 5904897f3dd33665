//! Seam between the queue sequencing and the voice/audio collaborator.

use std::time::Duration;

use async_trait::async_trait;
use serenity::all::{ChannelId, GuildId};
use tokio::sync::mpsc::UnboundedSender;

use crate::error::AppError;

/// A resolved, playable track.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub title: String,
    pub url: String,
    pub duration: Option<Duration>,
    pub thumbnail: Option<String>,
    /// Tag of the member who queued it.
    pub requested_by: String,
}

/// Sent by the backend when a track stops playing on its own.
///
/// Carries the queue generation the track was started under so the player can
/// ignore ends caused by skips and stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackEnded {
    pub guild_id: GuildId,
    pub generation: u64,
}

/// Where the backend reports [`TrackEnded`].
pub type TrackEndSender = UnboundedSender<TrackEnded>;

/// Voice connection, audio source and now-playing notifications.
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Resolves a URL or a search phrase to a track.
    ///
    /// # Returns
    /// - `Ok(Some(track))` - Best match, with `requested_by` left empty
    /// - `Ok(None)` - Nothing matched
    async fn resolve(&self, query: &str) -> Result<Option<Track>, AppError>;

    /// Joins `channel_id`, moving the bot if it is already connected elsewhere.
    async fn connect(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), AppError>;

    /// Replaces whatever is playing with `track`, reporting its natural end with `ended`.
    async fn play(&self, track: &Track, ended: TrackEnded, notify: TrackEndSender)
        -> Result<(), AppError>;

    /// Stops the playing track but stays connected; a no-op when not connected.
    async fn stop_current(&self, guild_id: GuildId) -> Result<(), AppError>;

    /// Leaves the voice channel; a no-op when not connected.
    async fn disconnect(&self, guild_id: GuildId) -> Result<(), AppError>;

    /// Posts the "Now Playing" card.
    async fn announce(&self, channel_id: ChannelId, track: &Track) -> Result<(), AppError>;
}
