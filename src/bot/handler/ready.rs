//! Ready event handler for bot initialization.
//!
//! Registers the slash commands, sets the activity and, on the first ready of
//! the process, re-arms the timers of giveaways that were running before a
//! restart. Later ready events (gateway reconnects) only re-register commands.

use std::sync::atomic::{AtomicBool, Ordering};

use serenity::all::{ActivityData, Command, Context, GuildId, Ready};

use crate::{router::CommandRouter, service::giveaway, state::AppState};

/// Handles the ready event when the bot connects to Discord.
///
/// # Arguments
/// - `state` - Shared application state
/// - `router` - Source of the command definitions to register
/// - `started` - Guard for the one-time startup work
/// - `ctx` - Discord context for registering commands and setting activity
/// - `ready` - Ready event data containing bot user information
pub async fn handle_ready(
    state: &AppState,
    router: &CommandRouter,
    started: &AtomicBool,
    ctx: Context,
    ready: Ready,
) {
    tracing::info!(
        "{} is connected to Discord, serving {} guilds",
        ready.user.tag(),
        ready.guilds.len()
    );

    ctx.set_activity(Some(ActivityData::watching("for commands")));

    let definitions = router.definitions();

    match Command::set_global_commands(&ctx.http, definitions.clone()).await {
        Ok(commands) => tracing::info!("Registered {} global commands", commands.len()),
        Err(e) => tracing::error!("Failed to register global commands: {:?}", e),
    }

    if let Some(guild_id) = state.config.guild_id {
        match GuildId::new(guild_id)
            .set_commands(&ctx.http, definitions)
            .await
        {
            Ok(commands) => tracing::info!(
                "Registered {} commands on guild {}",
                commands.len(),
                guild_id
            ),
            Err(e) => tracing::error!("Failed to register commands on guild {}: {:?}", guild_id, e),
        }
    }

    if started.swap(true, Ordering::SeqCst) {
        return;
    }

    match giveaway::resume_timers(&state.db, ctx.http.clone()).await {
        Ok(count) => tracing::info!("Resumed {} active giveaway timers", count),
        Err(e) => tracing::error!("Failed to resume giveaway timers: {:?}", e),
    }
}
