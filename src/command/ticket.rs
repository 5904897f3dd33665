//! `/ticket setup|create|close|add|remove`.

use async_trait::async_trait;
use serenity::all::{
    CommandOptionType, CreateCommand, CreateCommandOption, CreateInteractionResponseMessage,
    GuildChannel, Mentionable, Permissions,
};

use crate::{
    error::AppError,
    middleware::permission::has_any_permission,
    service::{
        embed,
        ticket::{self, TicketService},
    },
};

use super::{options::unknown_subcommand, CommandContext, SlashCommand};

/// Channel the command was used in, when it is a ticket channel.
async fn current_ticket(cmd: &CommandContext<'_>) -> Result<GuildChannel, AppError> {
    let channel = cmd
        .interaction
        .channel_id
        .to_channel(&cmd.ctx.http)
        .await?
        .guild()
        .filter(|channel| ticket::is_ticket_channel(&channel.name));

    channel.ok_or_else(|| {
        AppError::BadRequest("This command can only be used in ticket channels.".to_string())
    })
}

fn user_option(description: &str) -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::User, "user", description).required(true)
}

pub struct TicketCommand;

impl TicketCommand {
    async fn setup(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let access = cmd.access()?;
        if !has_any_permission(access.permissions, Permissions::MANAGE_CHANNELS) {
            return Err(AppError::PermissionDenied(
                "You need the \"Manage Channels\" permission to setup the ticket system."
                    .to_string(),
            ));
        }

        let (card, row) = ticket::panel();
        cmd.respond(
            CreateInteractionResponseMessage::new()
                .embed(card)
                .components(vec![row]),
        )
        .await
    }

    async fn create(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let guild_id = cmd.guild_id()?;

        let channel = TicketService::new(cmd.db(), cmd.http(), cmd.config())
            .open(guild_id, cmd.user())
            .await?;

        cmd.reply_ephemeral(
            embed::success(
                "Ticket Created",
                format!("Your support ticket has been created: {}", channel.mention()),
            )
            .field("📋 Ticket ID", ticket::short_id(channel.id), true)
            .field("📍 Channel", channel.mention().to_string(), true),
        )
        .await
    }

    async fn close(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let channel = current_ticket(cmd).await?;

        let may_close =
            ticket::is_opener(&channel, cmd.user()) || ticket::is_staff(cmd.config(), &cmd.access()?);
        if !may_close {
            return Err(AppError::PermissionDenied(
                "Only the ticket owner or staff can close this ticket.".to_string(),
            ));
        }

        let (card, row) = ticket::close_prompt(channel.id, cmd.user());
        cmd.respond(
            CreateInteractionResponseMessage::new()
                .embed(card)
                .components(vec![row])
                .ephemeral(true),
        )
        .await
    }

    async fn change_members(&self, cmd: &CommandContext<'_>, adding: bool) -> Result<(), AppError> {
        let channel = current_ticket(cmd).await?;

        if !ticket::is_staff(cmd.config(), &cmd.access()?) {
            return Err(AppError::PermissionDenied(
                "Only staff can change who can see this ticket.".to_string(),
            ));
        }

        let (_, options) = cmd.options().subcommand()?;
        let user = options.required_user("user")?;
        let service = TicketService::new(cmd.db(), cmd.http(), cmd.config());

        let card = if adding {
            service.add_member(channel.id, user.id).await?;
            embed::success(
                "User Added",
                format!("{} has been added to this ticket.", user.mention()),
            )
        } else {
            if ticket::is_opener(&channel, user) {
                return Err(AppError::BadRequest(
                    "The ticket owner cannot be removed from their own ticket.".to_string(),
                ));
            }
            service.remove_member(channel.id, user.id).await?;
            embed::success(
                "User Removed",
                format!("{} has been removed from this ticket.", user.mention()),
            )
        };

        cmd.reply(card.field("👮 Changed By", cmd.user().tag(), true))
            .await
    }
}

#[async_trait]
impl SlashCommand for TicketCommand {
    fn name(&self) -> &'static str {
        "ticket"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("Ticket system commands")
            .add_option(CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "setup",
                "Setup ticket system in current channel",
            ))
            .add_option(CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "create",
                "Create a new support ticket",
            ))
            .add_option(CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "close",
                "Close the current ticket",
            ))
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::SubCommand,
                    "add",
                    "Add a user to the current ticket",
                )
                .add_sub_option(user_option("User to add")),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::SubCommand,
                    "remove",
                    "Remove a user from the current ticket",
                )
                .add_sub_option(user_option("User to remove")),
            )
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let (name, _) = cmd.options().subcommand()?;

        match name {
            "setup" => self.setup(cmd).await,
            "create" => self.create(cmd).await,
            "close" => self.close(cmd).await,
            "add" => self.change_members(cmd, true).await,
            "remove" => self.change_members(cmd, false).await,
            other => Err(unknown_subcommand(other)),
        }
    }
}
