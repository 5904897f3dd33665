use serenity::all::{Context, Message};

use crate::{service::ticket, state::AppState};

/// Handle message creation in a channel
///
/// Messages are not persisted; activity in the logs channel and in ticket
/// channels is traced for auditing.
pub async fn handle_message(state: &AppState, ctx: Context, message: Message) {
    if message.author.bot {
        return;
    }

    if message.channel_id.get() == state.config.logs_channel_id {
        tracing::debug!("Log channel message from {}", message.author.tag());
        return;
    }

    let in_ticket = message
        .guild_id
        .and_then(|guild_id| {
            let guild = ctx.cache.guild(guild_id)?;
            let channel = guild.channels.get(&message.channel_id)?;
            Some(ticket::is_ticket_channel(&channel.name))
        })
        .unwrap_or(false);

    if in_ticket {
        tracing::debug!(
            "Ticket message in {} from {}",
            message.channel_id,
            message.author.tag()
        );
    }
}
