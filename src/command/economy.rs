//! Racing economy commands.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serenity::all::{
    CommandOptionType, CreateCommand, CreateCommandOption, CreateEmbed, CreateEmbedFooter,
    CreateInteractionResponseFollowup, Mentionable, Permissions, Timestamp, User,
};

use crate::{
    error::AppError,
    model::racing::{LeaderboardSort, RaceWinner, RacingUser, ResetKind},
    service::{
        economy::{self, DailyOutcome, EconomyService},
        embed,
    },
};

use super::{
    options::{bounded, unknown_subcommand, Options},
    CommandContext, SlashCommand,
};

const RACE_COLOR: u32 = 0xff6b6b;
const WIN_COLOR: u32 = 0x51cf66;
const STATS_COLOR: u32 = 0x5865f2;
const LEADERBOARD_COLOR: u32 = 0xffd700;

/// Pause between the start card and the result.
const RACE_COUNTDOWN: Duration = Duration::from_secs(3);

/// Formats a credit amount with thousands separators, e.g. `12,500`.
pub fn with_separators(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    if value < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

fn medal(position: usize) -> String {
    match position {
        1 => "🥇".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        n => format!("{}.", n),
    }
}

/// Ranking lines for the leaderboard card.
pub fn leaderboard_lines(entries: &[RacingUser], sort: LeaderboardSort) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(i, racer)| {
            let value = match sort {
                LeaderboardSort::Credits => format!("{} credits", racer.credits),
                LeaderboardSort::Wins => format!("{} wins", racer.wins),
                LeaderboardSort::TotalRaces => format!("{} races", racer.total_races),
            };
            format!("{} <@{}> • **{}**", medal(i + 1), racer.user_id, value)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn sort_heading(sort: LeaderboardSort) -> &'static str {
    match sort {
        LeaderboardSort::Credits => "💰 Credits",
        LeaderboardSort::Wins => "🏆 Wins",
        LeaderboardSort::TotalRaces => "🏎️ Total Races",
    }
}

fn target_user<'a>(cmd: &CommandContext<'a>, options: &Options<'a>) -> &'a User {
    options.user("user").unwrap_or_else(|| cmd.user())
}

fn race_time(duration_secs: f64) -> String {
    format!("{:.2}s", duration_secs)
}

pub struct Race;

impl Race {
    async fn against_player(
        &self,
        cmd: &CommandContext<'_>,
        options: Options<'_>,
    ) -> Result<(), AppError> {
        let guild_id = cmd.guild_id()?.get();
        let racer = cmd.user();
        let opponent = options.required_user("opponent")?;
        let wager = match options.integer("wager") {
            Some(value) => bounded("wager", value, 10, 1000)?,
            None => 0,
        };

        if opponent.id == racer.id {
            return Err(AppError::BadRequest("You cannot race yourself!".to_string()));
        }
        if opponent.bot {
            return Err(AppError::BadRequest(
                "You cannot race bots! Use `/race ai` instead.".to_string(),
            ));
        }

        let service = EconomyService::new(cmd.db());
        let race = service
            .start_player_race(
                guild_id,
                racer.id.get(),
                opponent.id.get(),
                &opponent.tag(),
                wager,
            )
            .await?;

        cmd.reply(
            CreateEmbed::new()
                .color(RACE_COLOR)
                .title("🏎️ Race Starting!")
                .description("Get ready to race! The race is starting in 3 seconds...")
                .field("🏁 Racer 1", racer.mention().to_string(), true)
                .field("🏁 Racer 2", opponent.mention().to_string(), true)
                .field("💰 Wager", format!("{} credits", wager), true),
        )
        .await?;

        tokio::time::sleep(RACE_COUNTDOWN).await;

        let settlement = service.finish_race(&race).await?;
        let winner = if settlement.winner == RaceWinner::User(racer.id.get()) {
            racer
        } else {
            opponent
        };

        cmd.follow_up(
            CreateInteractionResponseFollowup::new().embed(
                CreateEmbed::new()
                    .color(WIN_COLOR)
                    .title("🏁 Race Finished!")
                    .description(format!("**{}** wins the race!", winner.tag()))
                    .field("🏆 Winner", winner.mention().to_string(), true)
                    .field(
                        "💰 Credits Won",
                        format!("{} credits", settlement.credits_won),
                        true,
                    )
                    .field("⏱️ Race Time", race_time(settlement.duration_secs), true),
            ),
        )
        .await?;

        Ok(())
    }

    async fn against_ai(&self, cmd: &CommandContext<'_>, options: Options<'_>) -> Result<(), AppError> {
        let guild_id = cmd.guild_id()?.get();
        let racer = cmd.user();
        let wager = match options.integer("wager") {
            Some(value) => bounded("wager", value, 10, 500)?,
            None => 0,
        };

        let service = EconomyService::new(cmd.db());
        let race = service.start_ai_race(guild_id, racer.id.get(), wager).await?;

        cmd.reply(
            CreateEmbed::new()
                .color(RACE_COLOR)
                .title("🏎️ AI Race Starting!")
                .description("Get ready to race against the AI! The race is starting in 3 seconds...")
                .field("🏁 Racer", racer.mention().to_string(), true)
                .field("🤖 AI Opponent", "Racing Bot", true)
                .field("💰 Wager", format!("{} credits", wager), true),
        )
        .await?;

        tokio::time::sleep(RACE_COUNTDOWN).await;

        let settlement = service.finish_race(&race).await?;
        let won = settlement.winner == RaceWinner::User(racer.id.get());

        let result = if won {
            CreateEmbed::new()
                .color(WIN_COLOR)
                .description(format!("**{}** wins against the AI!", racer.tag()))
                .field("🏆 Winner", racer.mention().to_string(), true)
                .field(
                    "💰 Credits",
                    format!("+{} credits", settlement.credits_won),
                    true,
                )
        } else {
            CreateEmbed::new()
                .color(RACE_COLOR)
                .description("**Racing Bot** wins! Better luck next time!")
                .field("🏆 Winner", "Racing Bot", true)
                .field("💰 Credits", format!("-{} credits", wager), true)
        };

        cmd.follow_up(
            CreateInteractionResponseFollowup::new().embed(
                result
                    .title("🏁 AI Race Finished!")
                    .field("⏱️ Race Time", race_time(settlement.duration_secs), true),
            ),
        )
        .await?;

        Ok(())
    }
}

#[async_trait]
impl SlashCommand for Race {
    fn name(&self) -> &'static str {
        "race"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("🏎️ Race against another player or AI to earn credits!")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::SubCommand,
                    "player",
                    "Race against another player",
                )
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::User,
                        "opponent",
                        "The player you want to race against",
                    )
                    .required(true),
                )
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::Integer,
                        "wager",
                        "Credits to wager (optional)",
                    )
                    .min_int_value(10)
                    .max_int_value(1000),
                ),
            )
            .add_option(
                CreateCommandOption::new(CommandOptionType::SubCommand, "ai", "Race against the AI")
                    .add_sub_option(
                        CreateCommandOption::new(
                            CommandOptionType::Integer,
                            "wager",
                            "Credits to wager (optional)",
                        )
                        .min_int_value(10)
                        .max_int_value(500),
                    ),
            )
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let (name, options) = cmd.options().subcommand()?;

        match name {
            "player" => self.against_player(cmd, options).await,
            "ai" => self.against_ai(cmd, options).await,
            other => Err(unknown_subcommand(other)),
        }
    }
}

pub struct Daily;

#[async_trait]
impl SlashCommand for Daily {
    fn name(&self) -> &'static str {
        "daily"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name()).description("💰 Claim your daily credit reward!")
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let guild_id = cmd.guild_id()?.get();

        let outcome = EconomyService::new(cmd.db())
            .claim_daily(cmd.user().id.get(), guild_id, Utc::now())
            .await?;

        match outcome {
            DailyOutcome::AlreadyClaimed { hours_left } => {
                cmd.reply_ephemeral(embed::error(
                    "Daily Already Claimed!",
                    format!(
                        "You've already claimed your daily reward today!\n\nNext daily available in **{} hours**.",
                        hours_left
                    ),
                ))
                .await
            }
            DailyOutcome::Claimed {
                reward,
                streak_bonus,
                streak,
                balance,
            } => {
                let mut card = embed::success(
                    "Daily Reward Claimed!",
                    "You've claimed your daily reward!",
                )
                .field("💰 Credits Earned", format!("{} credits", reward), true)
                .field("🔥 Streak", format!("{} days", streak), true)
                .field("💎 New Balance", format!("{} credits", balance), true)
                .footer(CreateEmbedFooter::new(
                    "Come back tomorrow for your next daily reward!",
                ));

                if streak_bonus > 0 {
                    card = card.field(
                        "🎉 Streak Bonus",
                        format!("+{} credits ({} day streak!)", streak_bonus, streak),
                        false,
                    );
                }

                cmd.reply(card).await
            }
        }
    }
}

fn user_option(description: &str, required: bool) -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::User, "user", description).required(required)
}

pub struct Balance;

#[async_trait]
impl SlashCommand for Balance {
    fn name(&self) -> &'static str {
        "balance"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("💰 Check your credit balance")
            .add_option(user_option(
                "User to check balance for (defaults to yourself)",
                false,
            ))
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let guild_id = cmd.guild_id()?.get();
        let options = cmd.options();
        let target = target_user(cmd, &options);

        let profile = EconomyService::new(cmd.db())
            .profile(target.id.get(), guild_id)
            .await?;

        let mut card = CreateEmbed::new()
            .color(WIN_COLOR)
            .title("💰 Credit Balance")
            .thumbnail(target.face())
            .field("👤 User", target.mention().to_string(), true)
            .field("💰 Credits", with_separators(profile.credits), true)
            .field("🏎️ Total Races", profile.total_races.to_string(), true)
            .field("🏆 Wins", profile.wins.to_string(), true)
            .field("❌ Losses", profile.losses.to_string(), true)
            .field("📈 Win Rate", format!("{:.1}%", profile.win_rate()), true)
            .footer(CreateEmbedFooter::new(
                "Use /transfer to send credits to other users",
            ))
            .timestamp(Timestamp::now());

        let tips = economy::earning_tips(&profile);
        if !tips.is_empty() {
            card = card.field("💡 Earning Tips", tips.join("\n"), false);
        }

        cmd.reply(card).await
    }
}

pub struct Stats;

#[async_trait]
impl SlashCommand for Stats {
    fn name(&self) -> &'static str {
        "stats"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("📊 View your racing statistics")
            .add_option(user_option(
                "User to view stats for (defaults to yourself)",
                false,
            ))
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let guild_id = cmd.guild_id()?.get();
        let options = cmd.options();
        let target = target_user(cmd, &options);

        let (profile, rank) = EconomyService::new(cmd.db())
            .stats(target.id.get(), guild_id)
            .await?;

        let mut card = CreateEmbed::new()
            .color(STATS_COLOR)
            .title(format!("📊 Racing Stats - {}", target.tag()))
            .thumbnail(target.face())
            .field("💰 Credits", with_separators(profile.credits), true)
            .field("🏆 Wins", profile.wins.to_string(), true)
            .field("❌ Losses", profile.losses.to_string(), true)
            .field("🏎️ Total Races", profile.total_races.to_string(), true)
            .field("📈 Win Rate", format!("{:.1}%", profile.win_rate()), true)
            .field("🔥 Daily Streak", format!("{} days", profile.daily_streak), true)
            .footer(CreateEmbedFooter::new(
                "Stats last updated • Use /daily to claim your daily reward!",
            ))
            .timestamp(Timestamp::now());

        let unlocked = economy::achievements(&profile);
        if !unlocked.is_empty() {
            let shown: Vec<_> = unlocked.into_iter().take(5).collect();
            card = card.field("🏅 Achievements", shown.join("\n"), false);
        }

        if let Some(last_daily) = profile.last_daily {
            let days = (Utc::now() - last_daily).num_days();
            card = card.field("📅 Last Daily", format!("{} days ago", days), true);
        }

        if let Some(rank) = rank {
            card = card.field("🏆 Server Rank", format!("#{} by credits", rank), true);
        }

        cmd.reply(card).await
    }
}

pub struct Leaderboard;

#[async_trait]
impl SlashCommand for Leaderboard {
    fn name(&self) -> &'static str {
        "leaderboard"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("🏆 View the racing leaderboard")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "type",
                    "Type of leaderboard to display",
                )
                .add_string_choice("💰 Credits", "credits")
                .add_string_choice("🏆 Wins", "wins")
                .add_string_choice("🏎️ Total Races", "total_races"),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "limit",
                    "Number of players to show (1-20)",
                )
                .min_int_value(1)
                .max_int_value(20),
            )
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let guild_id = cmd.guild_id()?.get();
        let options = cmd.options();

        let sort_value = options.str("type").unwrap_or("credits");
        let sort = LeaderboardSort::parse(sort_value)
            .ok_or_else(|| AppError::BadRequest("Unknown leaderboard type.".to_string()))?;
        let limit = bounded("limit", options.integer("limit").unwrap_or(10), 1, 20)?;

        let entries = EconomyService::new(cmd.db())
            .leaderboard(guild_id, sort, limit as u64)
            .await?;

        if entries.is_empty() {
            return Err(AppError::NotFound(
                "No racing data found! Start racing to appear on the leaderboard.".to_string(),
            ));
        }

        let total_credits: i64 = entries.iter().map(|racer| racer.credits).sum();
        let total_races: i64 = entries.iter().map(|racer| i64::from(racer.total_races)).sum();

        let card = CreateEmbed::new()
            .color(LEADERBOARD_COLOR)
            .title("🏆 Racing Leaderboard")
            .description(format!("**{}** • Top {} racers", sort_heading(sort), limit))
            .field("Rankings", leaderboard_lines(&entries, sort), false)
            .field(
                "📊 Server Stats",
                format!(
                    "**{}** active racers\n**{}** total credits\n**{}** total races",
                    entries.len(),
                    with_separators(total_credits),
                    total_races
                ),
                true,
            )
            .footer(CreateEmbedFooter::new(format!(
                "Use /leaderboard type:{} limit:{} to customize this view",
                sort_value, limit
            )))
            .timestamp(Timestamp::now());

        cmd.reply(card).await
    }
}

pub struct Transfer;

#[async_trait]
impl SlashCommand for Transfer {
    fn name(&self) -> &'static str {
        "transfer"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("💸 Transfer credits to another user")
            .add_option(user_option("User to transfer credits to", true))
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "amount",
                    "Amount of credits to transfer",
                )
                .min_int_value(1)
                .max_int_value(10000)
                .required(true),
            )
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let guild_id = cmd.guild_id()?.get();
        let options = cmd.options();
        let sender = cmd.user();
        let recipient = options.required_user("user")?;
        let amount = bounded("amount", options.required_integer("amount")?, 1, 10000)?;

        if recipient.id == sender.id {
            return Err(AppError::BadRequest(
                "You cannot transfer credits to yourself!".to_string(),
            ));
        }
        if recipient.bot {
            return Err(AppError::BadRequest(
                "You cannot transfer credits to bots!".to_string(),
            ));
        }

        let (sender_profile, recipient_profile) = EconomyService::new(cmd.db())
            .transfer(guild_id, sender.id.get(), recipient.id.get(), amount)
            .await?;

        cmd.reply(
            embed::success("Transfer Successful!", "Successfully transferred credits!")
                .field("👤 From", sender.mention().to_string(), true)
                .field("👤 To", recipient.mention().to_string(), true)
                .field("💰 Amount", format!("{} credits", with_separators(amount)), true)
                .field(
                    "💳 Your New Balance",
                    format!("{} credits", with_separators(sender_profile.credits)),
                    true,
                )
                .field(
                    "💳 Their New Balance",
                    format!("{} credits", with_separators(recipient_profile.credits)),
                    true,
                ),
        )
        .await
    }
}

pub struct GiveCredits;

#[async_trait]
impl SlashCommand for GiveCredits {
    fn name(&self) -> &'static str {
        "givecredits"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("🎁 Give credits to a user (Admin only)")
            .add_option(user_option("User to give credits to", true))
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "amount",
                    "Amount of credits to give",
                )
                .min_int_value(1)
                .max_int_value(100000)
                .required(true),
            )
            .add_option(CreateCommandOption::new(
                CommandOptionType::String,
                "reason",
                "Reason for giving credits",
            ))
            .default_member_permissions(Permissions::ADMINISTRATOR)
    }

    fn permissions(&self) -> Permissions {
        Permissions::ADMINISTRATOR
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let guild_id = cmd.guild_id()?.get();
        let options = cmd.options();
        let target = options.required_user("user")?;
        let amount = bounded("amount", options.required_integer("amount")?, 1, 100000)?;
        let reason = options.str("reason").unwrap_or("Admin reward");

        if target.bot {
            return Err(AppError::BadRequest(
                "You cannot give credits to bots!".to_string(),
            ));
        }

        let profile = EconomyService::new(cmd.db())
            .give_credits(guild_id, target.id.get(), amount)
            .await?;

        tracing::info!(
            "{} gave {} credits to {} in guild {}: {}",
            cmd.user().tag(),
            amount,
            target.tag(),
            guild_id,
            reason
        );

        cmd.reply(
            embed::success(
                "Credits Given Successfully!",
                format!("Successfully gave credits to {}!", target.tag()),
            )
            .field("👤 Recipient", target.mention().to_string(), true)
            .field("💰 Amount", format!("{} credits", with_separators(amount)), true)
            .field("📝 Reason", reason, true)
            .field(
                "💳 Their New Balance",
                format!("{} credits", with_separators(profile.credits)),
                true,
            )
            .field("👮 Given By", cmd.user().mention().to_string(), true),
        )
        .await
    }
}

pub struct ResetStats;

fn reset_description(kind: ResetKind) -> &'static str {
    match kind {
        ResetKind::All => "All racing statistics have been reset to default values.",
        ResetKind::Credits => "Credits have been reset to 1,000.",
        ResetKind::Wins => "Win/loss statistics have been reset.",
        ResetKind::Daily => "Daily streak has been reset.",
    }
}

#[async_trait]
impl SlashCommand for ResetStats {
    fn name(&self) -> &'static str {
        "resetstats"
    }

    fn register(&self) -> CreateCommand {
        CreateCommand::new(self.name())
            .description("🔄 Reset a user's racing statistics (Admin only)")
            .add_option(user_option("User to reset stats for", true))
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "type",
                    "Type of reset to perform",
                )
                .add_string_choice("🔄 All Stats", "all")
                .add_string_choice("💰 Credits Only", "credits")
                .add_string_choice("🏆 Wins/Losses Only", "wins")
                .add_string_choice("📅 Daily Streak Only", "daily")
                .required(true),
            )
            .default_member_permissions(Permissions::ADMINISTRATOR)
    }

    fn permissions(&self) -> Permissions {
        Permissions::ADMINISTRATOR
    }

    async fn execute(&self, cmd: &CommandContext<'_>) -> Result<(), AppError> {
        let guild_id = cmd.guild_id()?.get();
        let options = cmd.options();
        let target = options.required_user("user")?;
        let kind_value = options.required_str("type")?;
        let kind = ResetKind::parse(kind_value)
            .ok_or_else(|| AppError::BadRequest("Unknown reset type.".to_string()))?;

        EconomyService::new(cmd.db())
            .reset(guild_id, target.id.get(), kind)
            .await?;

        cmd.reply(
            embed::success("Stats Reset Successful!", reset_description(kind))
                .field("👤 User", target.mention().to_string(), true)
                .field("🔄 Reset Type", capitalize(kind_value), true)
                .field("👮 Reset By", cmd.user().mention().to_string(), true),
        )
        .await
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
