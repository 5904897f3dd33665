//! Shared state handed to every event handler and command.
//!
//! Built once at startup after the database is connected and the voice manager
//! exists. All fields are cheap to clone: `DatabaseConnection` is a pool and the
//! rest are reference counted.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tokio::time::Instant;

use crate::{config::Config, service::music::MusicPlayer};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    /// Process-wide music queues, one per guild.
    pub music: Arc<MusicPlayer>,
    /// Used by `/ping` to report uptime.
    pub started_at: Instant,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Arc<Config>, music: Arc<MusicPlayer>) -> Self {
        Self {
            db,
            config,
            music,
            started_at: Instant::now(),
        }
    }
}
