use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serenity::{
    all::{Client, GatewayIntents},
    http::Http,
};
use songbird::{SerenityInit, Songbird};

use crate::{
    config::Config,
    error::AppError,
    router::CommandRouter,
    service::music::{voice::SongbirdBackend, MusicPlayer, IDLE_TIMEOUT},
    state::AppState,
};

use super::handler::Handler;

/// Builds the Discord client with the voice manager and music player attached.
///
/// The music backend gets its own REST client so the player can exist before the
/// gateway client does.
///
/// # Arguments
/// - `config` - Application configuration
/// - `db` - Database connection shared with every handler
///
/// # Returns
/// - `Ok(Client)` - Client ready to be started
/// - `Err(AppError)` - Client construction failed
pub async fn init_bot(config: Arc<Config>, db: DatabaseConnection) -> Result<Client, AppError> {
    // GUILD_MEMBERS and MESSAGE_CONTENT are privileged intents - must be enabled in
    // the Discord Developer Portal
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_VOICE_STATES
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::DIRECT_MESSAGES;

    let voice = Songbird::serenity();
    let backend = SongbirdBackend::new(
        voice.clone(),
        Arc::new(Http::new(&config.discord_token)),
        config.default_volume,
    );
    let music = MusicPlayer::new(Arc::new(backend), config.max_queue_size, IDLE_TIMEOUT);

    let state = AppState::new(db, config.clone(), music);
    let handler = Handler::new(state, Arc::new(CommandRouter::with_all_commands()));

    let client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .register_songbird_with(voice)
        .await?;

    Ok(client)
}

/// Runs the gateway connection until shutdown.
pub async fn start_bot(mut client: Client) -> Result<(), AppError> {
    tracing::info!("Starting Discord bot...");

    client.start().await?;

    Ok(())
}
