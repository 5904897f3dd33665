use std::sync::{atomic::AtomicBool, Arc};

use serenity::all::{Context, EventHandler, Interaction, Member, Message, Ready};
use serenity::async_trait;

use crate::{router::CommandRouter, state::AppState};

pub mod component;
pub mod interaction;
pub mod member;
pub mod message;
pub mod ready;

/// Discord bot event handler
pub struct Handler {
    pub state: AppState,
    pub router: Arc<CommandRouter>,
    /// Set once the first `ready` has run its one-time startup work.
    pub started: AtomicBool,
}

impl Handler {
    pub fn new(state: AppState, router: Arc<CommandRouter>) -> Self {
        Self {
            state,
            router,
            started: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    /// Called when the bot is ready and connected to Discord
    async fn ready(&self, ctx: Context, ready: Ready) {
        ready::handle_ready(&self.state, &self.router, &self.started, ctx, ready).await;
    }

    /// Called when a member joins a guild
    async fn guild_member_addition(&self, ctx: Context, new_member: Member) {
        member::handle_guild_member_addition(&self.state, ctx, new_member).await;
    }

    /// Called for slash commands, buttons and select menus
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        interaction::handle_interaction(&self.state, &self.router, ctx, interaction).await;
    }

    /// Called when a message is sent in a channel
    async fn message(&self, ctx: Context, message: Message) {
        message::handle_message(&self.state, ctx, message).await;
    }
}
