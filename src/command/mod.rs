//! Slash commands.
//!
//! Each command is a unit struct implementing [`SlashCommand`]. Commands parse
//! their options, call into the service layer and reply; the router owns the
//! permission and cooldown gates and the error reply, so a command only returns
//! `Err` and never reports its own failures.

pub mod economy;
pub mod giveaway;
pub mod guild_config;
pub mod moderation;
pub mod music;
pub mod options;
pub mod ticket;
pub mod utility;

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use serenity::{
    all::{
        CommandInteraction, Context, CreateCommand, CreateEmbed, CreateInteractionResponse,
        CreateInteractionResponseFollowup, CreateInteractionResponseMessage,
        EditInteractionResponse, GuildId, Member, Message, Permissions, User,
    },
    http::Http,
};

use crate::{
    config::Config, error::AppError, middleware::cooldown::DEFAULT_COOLDOWN,
    middleware::permission::MemberAccess, state::AppState,
};

use self::options::Options;

#[async_trait]
pub trait SlashCommand: Send + Sync {
    fn name(&self) -> &'static str;

    /// Definition registered with Discord.
    fn register(&self) -> CreateCommand;

    /// Permissions of which the invoker must hold at least one. Empty means none.
    fn permissions(&self) -> Permissions {
        Permissions::empty()
    }

    fn cooldown(&self) -> Duration {
        DEFAULT_COOLDOWN
    }

    /// Whether the command refuses to run outside a guild.
    ///
    /// Commands that declare permissions are always guild only.
    fn guild_only(&self) -> bool {
        true
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError>;
}

/// Every command the bot registers.
pub fn all() -> Vec<Box<dyn SlashCommand>> {
    vec![
        Box::new(moderation::Ban),
        Box::new(moderation::Kick),
        Box::new(moderation::Mute),
        Box::new(moderation::Warn),
        Box::new(moderation::ModLogs),
        Box::new(moderation::Purge),
        Box::new(moderation::Nuke),
        Box::new(guild_config::AntiRaid),
        Box::new(guild_config::AutoRole),
        Box::new(guild_config::Verify),
        Box::new(guild_config::Settings),
        Box::new(giveaway::GiveawayCommand),
        Box::new(economy::Race),
        Box::new(economy::Daily),
        Box::new(economy::Balance),
        Box::new(economy::Stats),
        Box::new(economy::Leaderboard),
        Box::new(economy::Transfer),
        Box::new(economy::GiveCredits),
        Box::new(economy::ResetStats),
        Box::new(music::Play),
        Box::new(music::Queue),
        Box::new(music::Skip),
        Box::new(music::Stop),
        Box::new(ticket::TicketCommand),
        Box::new(utility::Ping),
        Box::new(utility::Profile),
        Box::new(utility::Announce),
    ]
}

/// One command invocation.
pub struct CommandContext<'a> {
    pub ctx: &'a Context,
    pub interaction: &'a CommandInteraction,
    pub state: &'a AppState,
    responded: AtomicBool,
}

impl<'a> CommandContext<'a> {
    pub fn new(ctx: &'a Context, interaction: &'a CommandInteraction, state: &'a AppState) -> Self {
        Self {
            ctx,
            interaction,
            state,
            responded: AtomicBool::new(false),
        }
    }

    pub fn http(&self) -> Arc<Http> {
        self.ctx.http.clone()
    }

    pub fn db(&self) -> &'a DatabaseConnection {
        &self.state.db
    }

    pub fn config(&self) -> &'a Config {
        &self.state.config
    }

    pub fn user(&self) -> &'a User {
        &self.interaction.user
    }

    pub fn options(&self) -> Options<'a> {
        Options::new(self.interaction.data.options())
    }

    pub fn guild_id(&self) -> Result<GuildId, AppError> {
        self.interaction.guild_id.ok_or_else(|| {
            AppError::BadRequest("This command can only be used in a server!".to_string())
        })
    }

    pub fn member(&self) -> Result<&'a Member, AppError> {
        self.interaction.member.as_deref().ok_or_else(|| {
            AppError::BadRequest("This command can only be used in a server!".to_string())
        })
    }

    pub fn access(&self) -> Result<MemberAccess, AppError> {
        self.member().map(MemberAccess::from_member)
    }

    /// Whether the interaction was already acknowledged.
    pub fn has_responded(&self) -> bool {
        self.responded.load(Ordering::SeqCst)
    }

    pub async fn respond(&self, message: CreateInteractionResponseMessage) -> Result<(), AppError> {
        self.interaction
            .create_response(&self.ctx.http, CreateInteractionResponse::Message(message))
            .await?;
        self.responded.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub async fn reply(&self, embed: CreateEmbed) -> Result<(), AppError> {
        self.respond(CreateInteractionResponseMessage::new().embed(embed))
            .await
    }

    pub async fn reply_ephemeral(&self, embed: CreateEmbed) -> Result<(), AppError> {
        self.respond(
            CreateInteractionResponseMessage::new()
                .embed(embed)
                .ephemeral(true),
        )
        .await
    }

    /// Acknowledges the interaction for commands that take longer than three seconds.
    pub async fn defer(&self, ephemeral: bool) -> Result<(), AppError> {
        self.interaction
            .create_response(
                &self.ctx.http,
                CreateInteractionResponse::Defer(
                    CreateInteractionResponseMessage::new().ephemeral(ephemeral),
                ),
            )
            .await?;
        self.responded.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Replaces the original (possibly deferred) response.
    pub async fn edit_reply(&self, edit: EditInteractionResponse) -> Result<Message, AppError> {
        Ok(self.interaction.edit_response(&self.ctx.http, edit).await?)
    }

    pub async fn follow_up(
        &self,
        followup: CreateInteractionResponseFollowup,
    ) -> Result<Message, AppError> {
        Ok(self
            .interaction
            .create_followup(&self.ctx.http, followup)
            .await?)
    }

    /// Sends `embed` as the reply, or as an ephemeral follow-up when the
    /// interaction was already acknowledged.
    pub async fn reply_or_follow_up(&self, embed: CreateEmbed) -> Result<(), AppError> {
        if self.has_responded() {
            self.follow_up(
                CreateInteractionResponseFollowup::new()
                    .embed(embed)
                    .ephemeral(true),
            )
            .await?;
            Ok(())
        } else {
            self.reply_ephemeral(embed).await
        }
    }
}
