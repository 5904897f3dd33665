//! Music commands over the per-guild [`MusicPlayer`](crate::service::music::MusicPlayer).

use async_trait::async_trait;
use serenity::all::{
    ChannelId, CommandOptionType, CreateCommand, CreateCommandOption, EditInteractionResponse,
    GuildId, UserId,
};

use crate::{
    error::AppError,
    service::{
        embed,
        music::{voice::track_length, QueueSnapshot},
    },
};

use super::{CommandContext, SlashCommand};

/// Upcoming tracks listed on the queue card.
const QUEUE_PAGE: usize = 10;

fn member_voice_channel(cmd: &CommandContext<'_>, guild_id: GuildId, user_id: UserId) -> Option<ChannelId> {
    let guild = cmd.ctx.cache.guild(guild_id)?;
    guild
        .voice_states
        .get(&user_id)
        .and_then(|state| state.channel_id)
}

/// Replies with a refusal card and reports whether the invoker may control playback.
///
/// Playback controls require the invoker to share the bot's voice channel.
async fn require_same_channel(cmd: &CommandContext<'_>, guild_id: GuildId) -> Result<bool, AppError> {
    let Some(channel) = member_voice_channel(cmd, guild_id, cmd.user().id) else {
        cmd.reply_ephemeral(embed::error(
            "Not in Voice Channel",
            "You need to be in a voice channel to use music commands!",
        ))
        .await?;
        return Ok(false);
    };

    if cmd.state.music.voice_channel(guild_id).await != Some(channel) {
        cmd.reply_ephemeral(embed::error(
            "Not in Same Channel",
            "You need to be in the same voice channel as the bot!",
        ))
        .await?;
        return Ok(false);
    }

    Ok(true)
}

/// Fields of the queue card.
pub fn queue_fields(snapshot: &QueueSnapshot) -> Vec<(String, String, bool)> {
    let mut fields = Vec::new();

    if let Some(current) = &snapshot.current {
        fields.push((
            "🎵 Now Playing".to_string(),
            format!("**{}**\nRequested by: {}", current.title, current.requested_by),
            false,
        ));
    }

    if !snapshot.upcoming.is_empty() {
        let upcoming = snapshot
            .upcoming
            .iter()
            .take(QUEUE_PAGE)
            .enumerate()
            .map(|(i, track)| format!("{}. **{}** - {}", i + 1, track.title, track.requested_by))
            .collect::<Vec<_>>()
            .join("\n");
        fields.push(("📋 Upcoming".to_string(), upcoming, false));

        if snapshot.upcoming.len() > QUEUE_PAGE {
            fields.push((
                "📊 Total Songs".to_string(),
                format!("{} songs in queue", snapshot.upcoming.len()),
                true,
            ));
        }
    }

    fields
}

pub struct Play;

#[async_trait]
impl SlashCommand for Play {
    fn name(&self) -> &'static str {
        "play"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("Play music from YouTube")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "song",
                    "Song name or YouTube URL to play",
                )
                .required(true),
            )
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let guild_id = cmd.guild_id()?;
        let query = cmd.options().required_str("song")?;

        let Some(voice_channel) = member_voice_channel(cmd, guild_id, cmd.user().id) else {
            return cmd
                .reply_ephemeral(embed::error(
                    "Not in Voice Channel",
                    "You need to be in a voice channel to play music!",
                ))
                .await;
        };

        // Resolving through yt-dlp regularly outlasts the acknowledgement window.
        cmd.defer(false).await?;

        let Some(mut track) = cmd.state.music.backend().resolve(query).await? else {
            cmd.edit_reply(EditInteractionResponse::new().embed(embed::error(
                "Song Not Found",
                "Could not find the requested song. Please try a different search term.",
            )))
            .await?;
            return Ok(());
        };
        track.requested_by = cmd.user().tag();

        let queued = cmd
            .state
            .music
            .enqueue(guild_id, voice_channel, cmd.interaction.channel_id, track.clone())
            .await?;

        let mut card = embed::music(
            "Song Added to Queue",
            format!("**{}** has been added to the queue.", track.title),
        )
        .field("🎵 Song", &track.title, false)
        .field("⏱️ Duration", track_length(&track), true)
        .field("👤 Requested By", cmd.user().tag(), true)
        .field("📊 Position in Queue", queued.position.to_string(), true);

        if let Some(thumbnail) = &track.thumbnail {
            card = card.thumbnail(thumbnail);
        }

        cmd.edit_reply(EditInteractionResponse::new().embed(card))
            .await?;

        Ok(())
    }
}

pub struct Queue;

#[async_trait]
impl SlashCommand for Queue {
    fn name(&self) -> &'static str {
        "queue"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name()).description("Show the current music queue")
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let guild_id = cmd.guild_id()?;

        let snapshot = match cmd.state.music.snapshot(guild_id).await {
            Some(snapshot) if snapshot.playing || !snapshot.upcoming.is_empty() => snapshot,
            _ => {
                return cmd
                    .reply_ephemeral(embed::error("Empty Queue", "There is no music in the queue!"))
                    .await
            }
        };

        let state = if snapshot.playing { "playing" } else { "paused" };
        let card = embed::music("Music Queue", format!("Currently {}", state))
            .fields(queue_fields(&snapshot));

        cmd.reply(card).await
    }
}

pub struct Skip;

#[async_trait]
impl SlashCommand for Skip {
    fn name(&self) -> &'static str {
        "skip"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name()).description("Skip the current song")
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let guild_id = cmd.guild_id()?;

        if !require_same_channel(cmd, guild_id).await? {
            return Ok(());
        }

        let playing = cmd
            .state
            .music
            .snapshot(guild_id)
            .await
            .is_some_and(|snapshot| snapshot.playing);
        if !playing {
            return cmd
                .reply_ephemeral(embed::error(
                    "Nothing Playing",
                    "There is no music currently playing!",
                ))
                .await;
        }

        let skipped = cmd.state.music.skip(guild_id).await?;
        let description = match skipped {
            Some(track) => format!("Skipped **{}**", track.title),
            None => "Skipped current song".to_string(),
        };

        cmd.reply(
            embed::success("Song Skipped", description)
                .field("👤 Skipped By", cmd.user().tag(), true),
        )
        .await
    }
}

pub struct Stop;

#[async_trait]
impl SlashCommand for Stop {
    fn name(&self) -> &'static str {
        "stop"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name()).description("Stop music and clear the queue")
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let guild_id = cmd.guild_id()?;

        if !require_same_channel(cmd, guild_id).await? {
            return Ok(());
        }

        if !cmd.state.music.stop(guild_id).await? {
            return cmd
                .reply_ephemeral(embed::error(
                    "Nothing Playing",
                    "There is no music currently playing!",
                ))
                .await;
        }

        cmd.reply(
            embed::success(
                "Music Stopped",
                "Music has been stopped and the queue has been cleared.",
            )
            .field("👤 Stopped By", cmd.user().tag(), true),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::service::music::Track;

    fn track(title: &str) -> Track {
        Track {
            title: title.to_string(),
            url: format!("https://example.com/{}", title),
            duration: Some(Duration::from_secs(200)),
            thumbnail: None,
            requested_by: "listener".to_string(),
        }
    }

    /// Tests the queue card layout.
    ///
    /// Verifies only the first ten upcoming tracks are listed and a total is added
    /// once the queue is longer than that.
    ///
    /// Expected: now playing, upcoming (10 lines) and total fields
    #[test]
    fn queue_fields_truncate_long_queues() {
        let snapshot = QueueSnapshot {
            current: Some(track("current")),
            upcoming: (0..12).map(|i| track(&format!("song{}", i))).collect(),
            playing: true,
        };

        let fields = queue_fields(&snapshot);

        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].1, "**current**\nRequested by: listener");
        assert_eq!(fields[1].1.lines().count(), 10);
        assert!(fields[1].1.starts_with("1. **song0** - listener"));
        assert_eq!(fields[2].1, "12 songs in queue");
    }

    #[test]
    fn queue_fields_omit_empty_upcoming() {
        let snapshot = QueueSnapshot {
            current: Some(track("current")),
            upcoming: Vec::new(),
            playing: true,
        };

        assert_eq!(queue_fields(&snapshot).len(), 1);
    }
}
