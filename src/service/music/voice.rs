//! Songbird-backed [`AudioBackend`] streaming through yt-dlp.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::{
    all::{ChannelId, CreateEmbed, CreateMessage, GuildId},
    http::Http,
};
use songbird::{
    error::JoinError,
    input::{Compose, Input, YoutubeDl},
    Event, EventContext, EventHandler as VoiceEventHandler, Songbird, TrackEvent,
};

use crate::{error::AppError, service::embed, util::duration::format_track_length};

use super::backend::{AudioBackend, Track, TrackEndSender, TrackEnded};

/// Builds the "Now Playing" card.
pub fn now_playing_card(track: &Track) -> CreateEmbed {
    let mut card = embed::music("Now Playing", format!("**{}**", track.title))
        .field("⏱️ Duration", track_length(track), true)
        .field("👤 Requested By", &track.requested_by, true);

    if let Some(thumbnail) = &track.thumbnail {
        card = card.thumbnail(thumbnail);
    }

    card
}

/// Track length for display; streams without a known length show as live.
pub fn track_length(track: &Track) -> String {
    track
        .duration
        .map(format_track_length)
        .unwrap_or_else(|| "Live".to_string())
}

fn is_url(query: &str) -> bool {
    query.starts_with("https://") || query.starts_with("http://")
}

pub struct SongbirdBackend {
    manager: Arc<Songbird>,
    http: Arc<Http>,
    client: reqwest::Client,
    volume: f32,
}

impl SongbirdBackend {
    pub fn new(manager: Arc<Songbird>, http: Arc<Http>, volume: f32) -> Self {
        Self {
            manager,
            http,
            client: reqwest::Client::new(),
            volume,
        }
    }
}

#[async_trait]
impl AudioBackend for SongbirdBackend {
    async fn resolve(&self, query: &str) -> Result<Option<Track>, AppError> {
        let mut source = if is_url(query) {
            YoutubeDl::new(self.client.clone(), query.to_string())
        } else {
            YoutubeDl::new_search(self.client.clone(), query.to_string())
        };

        let metadata = match source.aux_metadata().await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::debug!("No track found for '{}': {:?}", query, e);
                return Ok(None);
            }
        };

        let Some(url) = metadata.source_url else {
            return Ok(None);
        };

        Ok(Some(Track {
            title: metadata.title.unwrap_or_else(|| url.clone()),
            url,
            duration: metadata.duration,
            thumbnail: metadata.thumbnail,
            requested_by: String::new(),
        }))
    }

    async fn connect(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), AppError> {
        self.manager.join(guild_id, channel_id).await?;
        Ok(())
    }

    async fn play(
        &self,
        track: &Track,
        ended: TrackEnded,
        notify: TrackEndSender,
    ) -> Result<(), AppError> {
        let call = self.manager.get(ended.guild_id).ok_or_else(|| {
            AppError::InternalError(format!("No voice call in guild {}", ended.guild_id))
        })?;

        let input: Input = YoutubeDl::new(self.client.clone(), track.url.clone()).into();
        let handle = call.lock().await.play_only_input(input);

        let control = |e: songbird::tracks::ControlError| {
            AppError::InternalError(format!("Failed to control track: {}", e))
        };
        handle.set_volume(self.volume).map_err(control)?;
        handle
            .add_event(
                Event::Track(TrackEvent::End),
                TrackEndNotifier {
                    ended,
                    notify: notify.clone(),
                },
            )
            .map_err(control)?;
        handle
            .add_event(
                Event::Track(TrackEvent::Error),
                TrackEndNotifier { ended, notify },
            )
            .map_err(control)?;

        Ok(())
    }

    async fn stop_current(&self, guild_id: GuildId) -> Result<(), AppError> {
        if let Some(call) = self.manager.get(guild_id) {
            call.lock().await.stop();
        }
        Ok(())
    }

    async fn disconnect(&self, guild_id: GuildId) -> Result<(), AppError> {
        match self.manager.remove(guild_id).await {
            Ok(()) | Err(JoinError::NoCall) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn announce(&self, channel_id: ChannelId, track: &Track) -> Result<(), AppError> {
        channel_id
            .send_message(&self.http, CreateMessage::new().embed(now_playing_card(track)))
            .await?;
        Ok(())
    }
}

/// Forwards a track's end (or playback error) to the player.
struct TrackEndNotifier {
    ended: TrackEnded,
    notify: TrackEndSender,
}

#[async_trait]
impl VoiceEventHandler for TrackEndNotifier {
    async fn act(&self, _ctx: &EventContext<'_>) -> Option<Event> {
        if self.notify.send(self.ended).is_err() {
            tracing::debug!("Music player gone; dropping track end for {}", self.ended.guild_id);
        }
        None
    }
}
