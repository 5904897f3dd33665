//! Per-guild music queue.
//!
//! `MusicPlayer` only decides which track plays next and when the voice
//! connection is released; resolving, streaming and the connection itself are
//! delegated to an [`AudioBackend`].
//!
//! Every state transition bumps the guild's `generation`. Track-end signals and
//! idle teardown timers carry the generation they were created under and are
//! dropped when it no longer matches, so a skip never advances twice and a stale
//! idle timer never disconnects a session that has resumed.

pub mod backend;
pub mod voice;

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Weak},
    time::Duration,
};

use serenity::all::{ChannelId, GuildId};
use tokio::sync::{mpsc, Mutex};

use crate::error::AppError;

pub use backend::{AudioBackend, Track, TrackEndSender, TrackEnded};

/// How long an idle connection is kept before the bot leaves the channel.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Default)]
struct GuildQueue {
    upcoming: VecDeque<Track>,
    current: Option<Track>,
    playing: bool,
    generation: u64,
    voice_channel: Option<ChannelId>,
    text_channel: Option<ChannelId>,
}

impl GuildQueue {
    fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

/// Read-only view of a guild's queue.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueSnapshot {
    pub current: Option<Track>,
    pub upcoming: Vec<Track>,
    pub playing: bool,
}

/// Result of queueing a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enqueued {
    /// 1-based position among the pending tracks at the time it was added.
    pub position: usize,
    /// Whether queueing it started playback.
    pub started: bool,
}

pub struct MusicPlayer {
    this: Weak<MusicPlayer>,
    backend: Arc<dyn AudioBackend>,
    queues: Mutex<HashMap<GuildId, GuildQueue>>,
    max_queue_size: usize,
    idle_timeout: Duration,
    ended_tx: TrackEndSender,
}

impl MusicPlayer {
    /// Creates the player and starts the task that advances queues on track end.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        backend: Arc<dyn AudioBackend>,
        max_queue_size: usize,
        idle_timeout: Duration,
    ) -> Arc<Self> {
        let (ended_tx, mut ended_rx) = mpsc::unbounded_channel::<TrackEnded>();

        let player = Arc::new_cyclic(|this| Self {
            this: this.clone(),
            backend,
            queues: Mutex::new(HashMap::new()),
            max_queue_size,
            idle_timeout,
            ended_tx,
        });

        let weak = player.this.clone();
        tokio::spawn(async move {
            while let Some(ended) = ended_rx.recv().await {
                let Some(player) = weak.upgrade() else {
                    break;
                };
                player.on_track_end(ended).await;
            }
        });

        player
    }

    pub fn backend(&self) -> &Arc<dyn AudioBackend> {
        &self.backend
    }

    /// Voice channel the guild's session is bound to, if any.
    pub async fn voice_channel(&self, guild_id: GuildId) -> Option<ChannelId> {
        self.queues
            .lock()
            .await
            .get(&guild_id)
            .and_then(|queue| queue.voice_channel)
    }

    pub async fn snapshot(&self, guild_id: GuildId) -> Option<QueueSnapshot> {
        self.queues.lock().await.get(&guild_id).map(|queue| QueueSnapshot {
            current: queue.current.clone(),
            upcoming: queue.upcoming.iter().cloned().collect(),
            playing: queue.playing,
        })
    }

    /// Appends a track, starting playback when the guild is idle.
    ///
    /// # Returns
    /// - `Ok(Enqueued)` - Track queued
    /// - `Err(AppError::BadRequest)` - The queue already holds `max_queue_size` tracks
    /// - `Err(AppError)` - Joining the voice channel failed; the track is not kept
    pub async fn enqueue(
        &self,
        guild_id: GuildId,
        voice_channel: ChannelId,
        text_channel: ChannelId,
        track: Track,
    ) -> Result<Enqueued, AppError> {
        let (position, start) = {
            let mut queues = self.queues.lock().await;
            let queue = queues.entry(guild_id).or_default();

            if queue.upcoming.len() >= self.max_queue_size {
                return Err(AppError::BadRequest(format!(
                    "The queue is full! (max {} songs)",
                    self.max_queue_size
                )));
            }

            queue.upcoming.push_back(track);
            queue.text_channel = Some(text_channel);
            let start = !queue.playing;
            if start {
                queue.voice_channel = Some(voice_channel);
                queue.playing = true;
                queue.bump();
            }

            (queue.upcoming.len(), start)
        };

        if start {
            if let Err(e) = self.backend.connect(guild_id, voice_channel).await {
                let mut queues = self.queues.lock().await;
                if let Some(queue) = queues.get_mut(&guild_id) {
                    queue.upcoming.clear();
                    queue.playing = false;
                    queue.voice_channel = None;
                    queue.bump();
                }
                return Err(e);
            }

            self.play_next(guild_id).await;
        }

        Ok(Enqueued {
            position,
            started: start,
        })
    }

    /// Skips the current track.
    ///
    /// Skipping the last track silences it and leaves the session idle.
    ///
    /// # Returns
    /// - `Ok(Some(track))` - The track that was skipped
    /// - `Ok(None)` - Nothing was playing
    pub async fn skip(&self, guild_id: GuildId) -> Result<Option<Track>, AppError> {
        let (skipped, last) = {
            let queues = self.queues.lock().await;
            match queues.get(&guild_id) {
                Some(queue) if queue.playing => {
                    (queue.current.clone(), queue.upcoming.is_empty())
                }
                _ => return Ok(None),
            }
        };

        self.play_next(guild_id).await;

        // The generation was bumped above, so the stopped track's end is ignored.
        if last {
            self.backend.stop_current(guild_id).await?;
        }

        Ok(skipped)
    }

    /// Clears the queue and leaves the voice channel immediately.
    ///
    /// # Returns
    /// - `Ok(true)` - A session was stopped
    /// - `Ok(false)` - The guild had no session
    pub async fn stop(&self, guild_id: GuildId) -> Result<bool, AppError> {
        let existed = self.queues.lock().await.remove(&guild_id).is_some();

        if existed {
            self.backend.disconnect(guild_id).await?;
            tracing::debug!("Stopped music session in guild {}", guild_id);
        }

        Ok(existed)
    }

    async fn on_track_end(&self, ended: TrackEnded) {
        let current = {
            let queues = self.queues.lock().await;
            queues
                .get(&ended.guild_id)
                .is_some_and(|queue| queue.playing && queue.generation == ended.generation)
        };

        if current {
            self.play_next(ended.guild_id).await;
        }
    }

    /// Starts the next pending track, or goes idle when there is none.
    ///
    /// A track the backend fails to play is logged and skipped.
    async fn play_next(&self, guild_id: GuildId) {
        loop {
            let next = {
                let mut queues = self.queues.lock().await;
                let Some(queue) = queues.get_mut(&guild_id) else {
                    return;
                };

                match queue.upcoming.pop_front() {
                    Some(track) => {
                        queue.current = Some(track.clone());
                        queue.playing = true;
                        let generation = queue.bump();
                        Some((track, generation, queue.text_channel))
                    }
                    None => {
                        queue.current = None;
                        queue.playing = false;
                        let generation = queue.bump();
                        self.arm_idle_teardown(guild_id, generation);
                        None
                    }
                }
            };

            let Some((track, generation, text_channel)) = next else {
                return;
            };

            let ended = TrackEnded {
                guild_id,
                generation,
            };
            match self.backend.play(&track, ended, self.ended_tx.clone()).await {
                Ok(()) => {
                    tracing::info!("Now playing '{}' in guild {}", track.title, guild_id);
                    if let Some(channel_id) = text_channel {
                        if let Err(e) = self.backend.announce(channel_id, &track).await {
                            tracing::warn!("Failed to announce track in {}: {:?}", channel_id, e);
                        }
                    }
                    return;
                }
                Err(e) => {
                    tracing::error!("Failed to play '{}' in guild {}: {:?}", track.title, guild_id, e);
                }
            }
        }
    }

    fn arm_idle_teardown(&self, guild_id: GuildId, generation: u64) {
        let player = self.this.clone();
        let timeout = self.idle_timeout;

        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;

            let Some(player) = player.upgrade() else {
                return;
            };

            let expired = {
                let mut queues = player.queues.lock().await;
                let idle = queues
                    .get(&guild_id)
                    .is_some_and(|queue| !queue.playing && queue.generation == generation);
                if idle {
                    queues.remove(&guild_id);
                }
                idle
            };

            if expired {
                tracing::info!("Leaving voice in guild {} after inactivity", guild_id);
                if let Err(e) = player.backend.disconnect(guild_id).await {
                    tracing::error!("Failed to leave voice in guild {}: {:?}", guild_id, e);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;

    use super::*;

    const GUILD: GuildId = GuildId::new(1);
    const VOICE: ChannelId = ChannelId::new(10);
    const TEXT: ChannelId = ChannelId::new(20);

    #[derive(Default)]
    struct FakeBackend {
        calls: StdMutex<Vec<String>>,
        last_played: StdMutex<Option<(TrackEnded, TrackEndSender)>>,
    }

    impl FakeBackend {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        /// Simulates the currently playing track finishing on its own.
        fn finish_current(&self) {
            let (ended, tx) = self.last_played.lock().unwrap().clone().unwrap();
            tx.send(ended).unwrap();
        }
    }

    #[async_trait]
    impl AudioBackend for FakeBackend {
        async fn resolve(&self, query: &str) -> Result<Option<Track>, AppError> {
            Ok(Some(track(query)))
        }

        async fn connect(&self, _: GuildId, channel_id: ChannelId) -> Result<(), AppError> {
            self.calls.lock().unwrap().push(format!("connect {}", channel_id));
            Ok(())
        }

        async fn play(
            &self,
            track: &Track,
            ended: TrackEnded,
            notify: TrackEndSender,
        ) -> Result<(), AppError> {
            self.calls.lock().unwrap().push(format!("play {}", track.title));
            *self.last_played.lock().unwrap() = Some((ended, notify));
            Ok(())
        }

        async fn stop_current(&self, _: GuildId) -> Result<(), AppError> {
            self.calls.lock().unwrap().push("stop".to_string());
            Ok(())
        }

        async fn disconnect(&self, _: GuildId) -> Result<(), AppError> {
            self.calls.lock().unwrap().push("disconnect".to_string());
            Ok(())
        }

        async fn announce(&self, _: ChannelId, _: &Track) -> Result<(), AppError> {
            Ok(())
        }
    }

    fn track(title: &str) -> Track {
        Track {
            title: title.to_string(),
            url: format!("https://example.invalid/{}", title),
            duration: None,
            thumbnail: None,
            requested_by: "tester".to_string(),
        }
    }

    fn player(max_queue_size: usize) -> (Arc<MusicPlayer>, Arc<FakeBackend>) {
        let backend = Arc::new(FakeBackend::default());
        let player = MusicPlayer::new(backend.clone(), max_queue_size, IDLE_TIMEOUT);
        (player, backend)
    }

    /// Lets spawned tasks run; time is paused so this returns immediately.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    async fn current_title(player: &MusicPlayer) -> Option<String> {
        player
            .snapshot(GUILD)
            .await
            .and_then(|snapshot| snapshot.current)
            .map(|track| track.title)
    }

    /// Tests queueing into an idle guild and then a busy one.
    ///
    /// Expected: first track connects and plays, second waits at position 1
    #[tokio::test(start_paused = true)]
    async fn first_track_starts_playback() -> Result<(), AppError> {
        let (player, backend) = player(10);

        let first = player.enqueue(GUILD, VOICE, TEXT, track("a")).await?;
        let second = player.enqueue(GUILD, VOICE, TEXT, track("b")).await?;

        assert!(first.started);
        assert_eq!(second, Enqueued { position: 1, started: false });
        assert_eq!(backend.calls(), vec!["connect 10", "play a"]);

        let snapshot = player.snapshot(GUILD).await.unwrap();
        assert_eq!(snapshot.current.unwrap().title, "a");
        assert_eq!(snapshot.upcoming.len(), 1);

        Ok(())
    }

    /// Tests the queue size limit.
    ///
    /// Expected: Err(BadRequest) once the pending list is full
    #[tokio::test(start_paused = true)]
    async fn full_queue_is_refused() -> Result<(), AppError> {
        let (player, _) = player(1);

        player.enqueue(GUILD, VOICE, TEXT, track("a")).await?;
        player.enqueue(GUILD, VOICE, TEXT, track("b")).await?;
        let result = player.enqueue(GUILD, VOICE, TEXT, track("c")).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));

        Ok(())
    }

    /// Tests natural track end.
    ///
    /// Expected: the next pending track plays
    #[tokio::test(start_paused = true)]
    async fn track_end_advances_queue() -> Result<(), AppError> {
        let (player, backend) = player(10);

        player.enqueue(GUILD, VOICE, TEXT, track("a")).await?;
        player.enqueue(GUILD, VOICE, TEXT, track("b")).await?;

        backend.finish_current();
        settle().await;

        assert_eq!(current_title(&player).await.as_deref(), Some("b"));

        Ok(())
    }

    /// Tests that the end signal of a skipped track is ignored.
    ///
    /// Verifies that skipping, then receiving the skipped track's end, does not
    /// advance a second time.
    ///
    /// Expected: "b" is still playing and "c" still pending
    #[tokio::test(start_paused = true)]
    async fn skipped_track_end_does_not_advance_twice() -> Result<(), AppError> {
        let (player, backend) = player(10);

        player.enqueue(GUILD, VOICE, TEXT, track("a")).await?;
        let (stale_end, tx) = backend.last_played.lock().unwrap().clone().unwrap();
        player.enqueue(GUILD, VOICE, TEXT, track("b")).await?;
        player.enqueue(GUILD, VOICE, TEXT, track("c")).await?;

        let skipped = player.skip(GUILD).await?;
        assert_eq!(skipped.unwrap().title, "a");

        tx.send(stale_end).unwrap();
        settle().await;

        assert_eq!(current_title(&player).await.as_deref(), Some("b"));
        assert_eq!(player.snapshot(GUILD).await.unwrap().upcoming.len(), 1);

        Ok(())
    }

    /// Tests skipping the only track.
    ///
    /// Verifies that the backend is told to stop the skipped track and the
    /// session goes idle without leaving the channel.
    ///
    /// Expected: "stop" recorded, nothing current, no disconnect
    #[tokio::test(start_paused = true)]
    async fn skipping_last_track_stops_playback() -> Result<(), AppError> {
        let (player, backend) = player(10);

        player.enqueue(GUILD, VOICE, TEXT, track("a")).await?;
        let skipped = player.skip(GUILD).await?;
        assert_eq!(skipped.unwrap().title, "a");

        assert_eq!(backend.calls(), vec!["connect 10", "play a", "stop"]);
        let snapshot = player.snapshot(GUILD).await.unwrap();
        assert!(!snapshot.playing);
        assert!(snapshot.current.is_none());

        Ok(())
    }

    /// Tests skipping with nothing playing.
    ///
    /// Expected: Ok(None)
    #[tokio::test(start_paused = true)]
    async fn skip_without_session_is_none() -> Result<(), AppError> {
        let (player, _) = player(10);

        assert_eq!(player.skip(GUILD).await?, None);

        Ok(())
    }

    /// Tests the idle teardown.
    ///
    /// Expected: disconnect once the idle timeout passes after the last track
    #[tokio::test(start_paused = true)]
    async fn idle_session_disconnects_after_timeout() -> Result<(), AppError> {
        let (player, backend) = player(10);

        player.enqueue(GUILD, VOICE, TEXT, track("a")).await?;
        backend.finish_current();
        settle().await;

        assert!(!player.snapshot(GUILD).await.unwrap().playing);
        assert!(!backend.calls().contains(&"disconnect".to_string()));

        tokio::time::sleep(IDLE_TIMEOUT + Duration::from_secs(1)).await;

        assert_eq!(backend.calls().last().map(String::as_str), Some("disconnect"));
        assert!(player.snapshot(GUILD).await.is_none());

        Ok(())
    }

    /// Tests that new activity cancels a pending idle teardown.
    ///
    /// Verifies that a track queued while idle survives the old timer firing.
    ///
    /// Expected: no disconnect, "b" playing
    #[tokio::test(start_paused = true)]
    async fn stale_idle_timer_keeps_active_session() -> Result<(), AppError> {
        let (player, backend) = player(10);

        player.enqueue(GUILD, VOICE, TEXT, track("a")).await?;
        backend.finish_current();
        settle().await;

        tokio::time::sleep(IDLE_TIMEOUT / 2).await;
        player.enqueue(GUILD, VOICE, TEXT, track("b")).await?;
        tokio::time::sleep(IDLE_TIMEOUT).await;

        assert!(!backend.calls().contains(&"disconnect".to_string()));
        assert_eq!(current_title(&player).await.as_deref(), Some("b"));

        Ok(())
    }

    /// Tests stopping a session.
    ///
    /// Expected: queue cleared and voice left immediately; a second stop is a no-op
    #[tokio::test(start_paused = true)]
    async fn stop_clears_queue_and_disconnects() -> Result<(), AppError> {
        let (player, backend) = player(10);

        player.enqueue(GUILD, VOICE, TEXT, track("a")).await?;
        player.enqueue(GUILD, VOICE, TEXT, track("b")).await?;

        assert!(player.stop(GUILD).await?);
        assert!(player.snapshot(GUILD).await.is_none());
        assert_eq!(backend.calls().last().map(String::as_str), Some("disconnect"));

        assert!(!player.stop(GUILD).await?);

        Ok(())
    }
}
