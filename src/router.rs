//! Slash command dispatch.
//!
//! The router looks a command up by name, applies the guild-only, permission and
//! cooldown gates in that order, runs it and turns any error into a reply. Only
//! unexpected failures are forwarded to the developer.

use std::{collections::HashMap, time::Duration};

use chrono::Utc;
use serenity::all::{
    CommandInteraction, Context, CreateCommand, CreateInteractionResponse,
    CreateInteractionResponseMessage, CreateMessage, Permissions, UserId,
};

use crate::{
    command::{self, CommandContext, SlashCommand},
    middleware::{cooldown::CooldownRegistry, permission::has_any_permission},
    service::report::{self, FailureContext},
    state::AppState,
};

/// Why a command invocation was refused before it ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    GuildOnly,
    MissingPermissions,
    Cooldown(Duration),
}

pub struct CommandRouter {
    commands: HashMap<&'static str, Box<dyn SlashCommand>>,
    cooldowns: CooldownRegistry,
}

impl CommandRouter {
    pub fn new(commands: Vec<Box<dyn SlashCommand>>, cooldowns: CooldownRegistry) -> Self {
        Self {
            commands: commands
                .into_iter()
                .map(|command| (command.name(), command))
                .collect(),
            cooldowns,
        }
    }

    /// Router over every command the bot ships.
    pub fn with_all_commands() -> Self {
        Self::new(command::all(), CooldownRegistry::new())
    }

    /// Definitions to register with Discord, sorted by name.
    pub fn definitions(&self) -> Vec<CreateCommand> {
        let mut names: Vec<_> = self.commands.keys().copied().collect();
        names.sort_unstable();

        names
            .into_iter()
            .filter_map(|name| self.commands.get(name))
            .map(|command| command.register())
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn SlashCommand> {
        self.commands.get(name).map(|command| command.as_ref())
    }

    /// Applies the gates to one invocation.
    ///
    /// # Arguments
    /// - `member_permissions` - Resolved permissions of the invoker, `None` outside a guild
    ///
    /// The cooldown is only consumed once the other gates pass.
    pub async fn admit(
        &self,
        command: &dyn SlashCommand,
        member_permissions: Option<Permissions>,
        user_id: UserId,
    ) -> Result<(), Rejection> {
        let required = command.permissions();

        match member_permissions {
            None if command.guild_only() || !required.is_empty() => {
                return Err(Rejection::GuildOnly)
            }
            Some(held) if !has_any_permission(held, required) => {
                return Err(Rejection::MissingPermissions)
            }
            _ => {}
        }

        self.cooldowns
            .try_acquire(command.name(), user_id.get(), command.cooldown())
            .await
            .map_err(Rejection::Cooldown)
    }

    /// Runs a slash command interaction end to end.
    pub async fn dispatch(&self, ctx: &Context, interaction: &CommandInteraction, state: &AppState) {
        let name = interaction.data.name.as_str();
        let Some(command) = self.get(name) else {
            tracing::warn!("Received unknown command /{}", name);
            return;
        };

        let member_permissions = interaction
            .member
            .as_ref()
            .map(|member| member.permissions.unwrap_or_else(Permissions::empty));

        if let Err(rejection) = self
            .admit(command, member_permissions, interaction.user.id)
            .await
        {
            let reply = match rejection {
                Rejection::GuildOnly => CreateInteractionResponseMessage::new()
                    .content("❌ This command can only be used in a server!"),
                Rejection::MissingPermissions => {
                    CreateInteractionResponseMessage::new().embed(report::permission_denied_card())
                }
                Rejection::Cooldown(remaining) => CreateInteractionResponseMessage::new()
                    .embed(report::cooldown_card(name, remaining, Utc::now())),
            };

            if let Err(e) = interaction
                .create_response(
                    &ctx.http,
                    CreateInteractionResponse::Message(reply.ephemeral(true)),
                )
                .await
            {
                tracing::error!("Failed to send rejection for /{}: {:?}", name, e);
            }
            return;
        }

        tracing::debug!("{} invoked /{}", interaction.user.tag(), name);

        let cmd = CommandContext::new(ctx, interaction, state);
        let Err(err) = command.execute(&cmd).await else {
            return;
        };

        if report::should_report(&err) {
            tracing::error!("Command /{} failed: {:?}", name, err);
        } else {
            tracing::debug!("Command /{} refused: {}", name, err);
        }

        if let Err(e) = cmd
            .reply_or_follow_up(report::user_facing_card(&err, Utc::now()))
            .await
        {
            tracing::error!("Failed to send error reply for /{}: {:?}", name, e);
        }

        if report::should_report(&err) {
            let failure = FailureContext {
                command: name.to_string(),
                user_tag: interaction.user.tag(),
                user_id: interaction.user.id.get(),
                guild: interaction.guild_id.map(|guild_id| {
                    ctx.cache
                        .guild(guild_id)
                        .map(|guild| format!("{} ({})", guild.name, guild_id))
                        .unwrap_or_else(|| guild_id.to_string())
                }),
                channel_id: interaction.channel_id.get(),
            };

            let developer = UserId::new(state.config.developer_user_id);
            let report = CreateMessage::new().embed(report::developer_report(&failure, &err));
            if let Err(e) = developer.direct_message(&ctx.http, report).await {
                tracing::error!("Failed to forward error report to developer: {:?}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::AppError;

    struct Fake {
        permissions: Permissions,
        guild_only: bool,
    }

    #[async_trait]
    impl SlashCommand for Fake {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn register(&self) -> CreateCommand {
            CreateCommand::new("fake").description("test command")
        }

        fn permissions(&self) -> Permissions {
            self.permissions
        }

        fn cooldown(&self) -> Duration {
            Duration::from_secs(30)
        }

        fn guild_only(&self) -> bool {
            self.guild_only
        }

        async fn execute(&self, _cmd: &CommandContext<'_>) -> Result<(), AppError> {
            Ok(())
        }
    }

    fn router() -> CommandRouter {
        CommandRouter::new(Vec::new(), CooldownRegistry::new())
    }

    /// Tests the guild-only gate.
    ///
    /// Verifies a command declaring permissions is refused in a DM even when it is
    /// not marked guild only, while a plain command is admitted.
    ///
    /// Expected: GuildOnly for the permissioned command, Ok for the plain one
    #[tokio::test]
    async fn refuses_permissioned_commands_outside_guilds() {
        let router = router();
        let moderated = Fake {
            permissions: Permissions::KICK_MEMBERS,
            guild_only: false,
        };
        let open = Fake {
            permissions: Permissions::empty(),
            guild_only: false,
        };

        assert_eq!(
            router.admit(&moderated, None, UserId::new(1)).await,
            Err(Rejection::GuildOnly)
        );
        assert_eq!(router.admit(&open, None, UserId::new(1)).await, Ok(()));
    }

    /// Tests the permission gate.
    ///
    /// Verifies a member lacking the permission is refused without consuming the
    /// cooldown, so the same member may run it once granted.
    ///
    /// Expected: MissingPermissions, then Ok after the permission is held
    #[tokio::test]
    async fn missing_permissions_do_not_start_cooldown() {
        let router = router();
        let command = Fake {
            permissions: Permissions::BAN_MEMBERS,
            guild_only: true,
        };

        assert_eq!(
            router
                .admit(&command, Some(Permissions::SEND_MESSAGES), UserId::new(7))
                .await,
            Err(Rejection::MissingPermissions)
        );
        assert_eq!(
            router
                .admit(&command, Some(Permissions::BAN_MEMBERS), UserId::new(7))
                .await,
            Ok(())
        );
    }

    /// Tests the cooldown gate.
    ///
    /// Verifies a second run inside the cooldown is refused with the remaining time
    /// and that other users are unaffected.
    ///
    /// Expected: Cooldown for the repeat, Ok for a different user
    #[tokio::test]
    async fn repeat_invocation_hits_cooldown() {
        let router = router();
        let command = Fake {
            permissions: Permissions::empty(),
            guild_only: true,
        };
        let held = Some(Permissions::empty());

        assert_eq!(router.admit(&command, held, UserId::new(3)).await, Ok(()));

        match router.admit(&command, held, UserId::new(3)).await {
            Err(Rejection::Cooldown(remaining)) => {
                assert!(remaining <= Duration::from_secs(30));
                assert!(remaining > Duration::from_secs(25));
            }
            other => panic!("expected cooldown, got {:?}", other),
        }

        assert_eq!(router.admit(&command, held, UserId::new(4)).await, Ok(()));
    }

    #[test]
    fn registers_every_command_once() {
        let router = CommandRouter::with_all_commands();

        assert_eq!(router.definitions().len(), command::all().len());
        assert!(router.get("ban").is_some());
        assert!(router.get("giveaway").is_some());
        assert!(router.get("missing").is_none());
    }
}
