//! `/giveaway start|end|reroll`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serenity::all::{
    CommandOptionType, CreateCommand, CreateCommandOption, CreateInteractionResponseMessage,
    Permissions,
};

use crate::{
    error::AppError,
    model::giveaway::CreateGiveawayParam,
    service::{
        embed,
        giveaway::{self, GiveawayService},
    },
    util::{duration::parse_bounded_duration, parse::parse_u64_from_string},
};

use super::{
    options::{bounded, unknown_subcommand, Options},
    CommandContext, SlashCommand,
};

fn message_id_option() -> CreateCommandOption {
    CreateCommandOption::new(
        CommandOptionType::String,
        "message_id",
        "Message ID of the giveaway",
    )
    .required(true)
}

fn message_id(options: &Options<'_>) -> Result<u64, AppError> {
    parse_u64_from_string(options.required_str("message_id")?.trim().to_string()).map_err(|_| {
        AppError::BadRequest("Please provide a valid message ID.".to_string())
    })
}

pub struct GiveawayCommand;

impl GiveawayCommand {
    async fn start(&self, cmd: &CommandContext<'_>, options: Options<'_>) -> Result<(), AppError> {
        let guild_id = cmd.guild_id()?;
        let duration_text = options.required_str("duration")?;
        let prize = options.required_str("prize")?;
        let winners = bounded("winners", options.integer("winners").unwrap_or(1), 1, 10)? as u32;

        let duration = parse_bounded_duration(duration_text)?;
        let end_time = Utc::now()
            + chrono::Duration::from_std(duration)
                .map_err(|e| AppError::InternalError(format!("Duration out of range: {}", e)))?;

        let (card, row) = giveaway::announcement(prize, winners, duration_text, cmd.user(), end_time);
        cmd.respond(
            CreateInteractionResponseMessage::new()
                .embed(card)
                .components(vec![row]),
        )
        .await?;

        let message = cmd.interaction.get_response(&cmd.ctx.http).await?;
        let created = GiveawayService::new(cmd.db(), cmd.http())
            .register(CreateGiveawayParam {
                message_id: message.id.get(),
                channel_id: message.channel_id.get(),
                guild_id: guild_id.get(),
                prize: prize.to_string(),
                winner_count: winners,
                end_time,
                creator_id: cmd.user().id.get(),
            })
            .await?;

        giveaway::arm_timer(cmd.db().clone(), cmd.http(), &created);

        tracing::info!(
            "{} started giveaway {} for {} in guild {}",
            cmd.user().tag(),
            created.id,
            created.prize,
            guild_id
        );

        Ok(())
    }
}

#[async_trait]
impl SlashCommand for GiveawayCommand {
    fn name(&self) -> &'static str {
        "giveaway"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("Manage giveaways")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::SubCommand,
                    "start",
                    "Start a new giveaway",
                )
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::String,
                        "duration",
                        "Duration of the giveaway (e.g. 1h, 30m, 1d)",
                    )
                    .required(true),
                )
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::String,
                        "prize",
                        "What the winner will receive",
                    )
                    .required(true),
                )
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::Integer,
                        "winners",
                        "Number of winners (default: 1)",
                    )
                    .min_int_value(1)
                    .max_int_value(10),
                ),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::SubCommand,
                    "end",
                    "End a giveaway early",
                )
                .add_sub_option(message_id_option()),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::SubCommand,
                    "reroll",
                    "Reroll a giveaway winner",
                )
                .add_sub_option(message_id_option()),
            )
    }

    fn permissions(&self) -> Permissions {
        Permissions::MANAGE_MESSAGES
    }

    fn cooldown(&self) -> Duration {
        Duration::from_secs(5)
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let (name, options) = cmd.options().subcommand()?;

        match name {
            "start" => self.start(cmd, options).await,
            "end" => {
                GiveawayService::new(cmd.db(), cmd.http())
                    .end_early(cmd.guild_id()?.get(), message_id(&options)?)
                    .await?;
                cmd.reply_ephemeral(embed::success(
                    "Giveaway Ended",
                    "The giveaway has been ended early.",
                ))
                .await
            }
            "reroll" => {
                GiveawayService::new(cmd.db(), cmd.http())
                    .reroll(cmd.guild_id()?.get(), message_id(&options)?)
                    .await?;
                cmd.reply_ephemeral(embed::success(
                    "Giveaway Rerolled",
                    "New winners have been selected for the giveaway.",
                ))
                .await
            }
            other => Err(unknown_subcommand(other)),
        }
    }
}
