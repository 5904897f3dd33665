//! Racing economy: races, daily rewards, transfers and admin adjustments.
//!
//! Outcomes are drawn from an injected `Rng` in pure functions so the odds and
//! reward ranges can be tested with a seeded generator; the service only applies
//! the drawn settlement to the store.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sea_orm::DatabaseConnection;

use crate::{
    data::{racing_race::RacingRaceRepository, racing_user::RacingUserRepository},
    error::AppError,
    model::racing::{
        CreateRaceParam, LeaderboardSort, RaceKind, RaceWinner, RacingRace, RacingUser, ResetKind,
    },
};

pub const DAILY_BASE_REWARD: i64 = 200;
pub const DAILY_MAX_STREAK_BONUS: i64 = 200;
const DAILY_STREAK_STEP: i64 = 10;

/// Chance the player beats the computer opponent.
pub const AI_WIN_CHANCE: f64 = 0.6;

/// Streak bonus on top of the base daily reward for a racer with `streak` prior claims.
pub fn daily_streak_bonus(streak: i32) -> i64 {
    (i64::from(streak.max(0)) * DAILY_STREAK_STEP).min(DAILY_MAX_STREAK_BONUS)
}

/// Daily reward for a racer with `streak` prior claims.
pub fn daily_reward(streak: i32) -> i64 {
    DAILY_BASE_REWARD + daily_streak_bonus(streak)
}

/// Whole hours, rounded up, until the next daily claim; `None` when claimable now.
pub fn hours_until_daily(last_daily: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<i64> {
    let next = last_daily? + Duration::hours(24);
    let remaining = (next - now).num_seconds();

    (remaining > 0).then(|| (remaining + 3599) / 3600)
}

/// Drawn result of a race, before it is written to the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaceSettlement {
    pub winner: RaceWinner,
    /// Credits paid to the winner. Zero when the computer wins.
    pub credits_won: i64,
    pub duration_secs: f64,
}

fn race_duration<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random_range(5.0..15.0)
}

/// Settles a race between two players with a fair coin.
///
/// The winner gains 100-499 credits plus the wager; the loser pays the wager.
pub fn settle_player_race<R: Rng + ?Sized>(
    rng: &mut R,
    racer1_id: u64,
    racer2_id: u64,
    wager: i64,
) -> RaceSettlement {
    let winner = if rng.random_bool(0.5) { racer1_id } else { racer2_id };

    RaceSettlement {
        winner: RaceWinner::User(winner),
        credits_won: rng.random_range(100..500) + wager,
        duration_secs: race_duration(rng),
    }
}

/// Settles a race against the computer, won by the player with [`AI_WIN_CHANCE`].
///
/// A win gains 50-249 credits plus the wager; a loss pays the wager.
pub fn settle_ai_race<R: Rng + ?Sized>(rng: &mut R, racer_id: u64, wager: i64) -> RaceSettlement {
    let player_wins = rng.random_bool(AI_WIN_CHANCE);
    let reward = rng.random_range(50..250) + wager;

    RaceSettlement {
        winner: if player_wins {
            RaceWinner::User(racer_id)
        } else {
            RaceWinner::Ai
        },
        credits_won: if player_wins { reward } else { 0 },
        duration_secs: race_duration(rng),
    }
}

/// Achievements a racer has unlocked, most common first.
pub fn achievements(profile: &RacingUser) -> Vec<&'static str> {
    let mut unlocked = Vec::new();

    if profile.wins >= 10 {
        unlocked.push("🏆 **Racing Veteran** - 10+ wins");
    }
    if profile.wins >= 50 {
        unlocked.push("👑 **Racing Champion** - 50+ wins");
    }
    if profile.wins >= 100 {
        unlocked.push("💎 **Racing Legend** - 100+ wins");
    }
    if profile.credits >= 10_000 {
        unlocked.push("💰 **High Roller** - 10,000+ credits");
    }
    if profile.credits >= 50_000 {
        unlocked.push("💎 **Credit King** - 50,000+ credits");
    }
    if profile.daily_streak >= 7 {
        unlocked.push("🔥 **Streak Master** - 7+ day streak");
    }
    if profile.daily_streak >= 30 {
        unlocked.push("📅 **Daily Devotee** - 30+ day streak");
    }
    if profile.total_races >= 10 && profile.win_rate() >= 80.0 {
        unlocked.push("🎯 **Precision Driver** - 80%+ win rate");
    }

    unlocked
}

/// Suggestions shown on the balance card.
pub fn earning_tips(profile: &RacingUser) -> Vec<&'static str> {
    let mut tips = Vec::new();

    if profile.credits < 1000 {
        tips.push("💡 **Tip:** Use `/daily` to claim free credits!");
    }
    if profile.total_races < 5 {
        tips.push("🏎️ **Tip:** Try `/race ai` to earn credits safely!");
    }
    if profile.credits >= 1000 {
        tips.push("🎯 **Tip:** Try `/race player` with wagers for bigger rewards!");
    }

    tips
}

/// Result of a daily claim.
#[derive(Debug, Clone, PartialEq)]
pub enum DailyOutcome {
    Claimed {
        reward: i64,
        streak_bonus: i64,
        /// Streak including this claim.
        streak: i32,
        balance: i64,
    },
    AlreadyClaimed {
        hours_left: i64,
    },
}

pub struct EconomyService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> EconomyService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn profile(&self, user_id: u64, guild_id: u64) -> Result<RacingUser, AppError> {
        RacingUserRepository::new(self.db)
            .get_or_create(user_id, guild_id)
            .await
    }

    /// Profile plus its rank within the guild's top balances.
    pub async fn stats(
        &self,
        user_id: u64,
        guild_id: u64,
    ) -> Result<(RacingUser, Option<usize>), AppError> {
        let repo = RacingUserRepository::new(self.db);
        let profile = repo.get_or_create(user_id, guild_id).await?;
        let rank = repo.rank_by_credits(user_id, guild_id).await?;

        Ok((profile, rank))
    }

    pub async fn leaderboard(
        &self,
        guild_id: u64,
        sort: LeaderboardSort,
        limit: u64,
    ) -> Result<Vec<RacingUser>, AppError> {
        RacingUserRepository::new(self.db)
            .leaderboard(guild_id, sort, limit)
            .await
    }

    /// Claims the daily reward.
    ///
    /// The claim itself is a single conditional update, so a concurrent second
    /// claim reports `AlreadyClaimed` instead of paying twice.
    pub async fn claim_daily(
        &self,
        user_id: u64,
        guild_id: u64,
        now: DateTime<Utc>,
    ) -> Result<DailyOutcome, AppError> {
        let repo = RacingUserRepository::new(self.db);
        let profile = repo.get_or_create(user_id, guild_id).await?;

        if let Some(hours_left) = hours_until_daily(profile.last_daily, now) {
            return Ok(DailyOutcome::AlreadyClaimed { hours_left });
        }

        let reward = daily_reward(profile.daily_streak);
        if !repo.claim_daily(user_id, guild_id, reward, now).await? {
            let current = repo.get_or_create(user_id, guild_id).await?;
            return Ok(DailyOutcome::AlreadyClaimed {
                hours_left: hours_until_daily(current.last_daily, now).unwrap_or(24),
            });
        }

        let updated = repo.get_or_create(user_id, guild_id).await?;
        tracing::debug!(
            "User {} claimed {} daily credits in guild {}",
            user_id,
            reward,
            guild_id
        );

        Ok(DailyOutcome::Claimed {
            reward,
            streak_bonus: daily_streak_bonus(profile.daily_streak),
            streak: updated.daily_streak,
            balance: updated.credits,
        })
    }

    /// Checks both racers can cover the wager and records the race.
    ///
    /// # Returns
    /// - `Ok(RacingRace)` - Race recorded, no winner yet
    /// - `Err(AppError::BadRequest)` - One of the racers cannot afford the wager
    pub async fn start_player_race(
        &self,
        guild_id: u64,
        racer_id: u64,
        opponent_id: u64,
        opponent_tag: &str,
        wager: i64,
    ) -> Result<RacingRace, AppError> {
        let repo = RacingUserRepository::new(self.db);

        let racer = repo.get_or_create(racer_id, guild_id).await?;
        if wager > racer.credits {
            return Err(AppError::BadRequest(format!(
                "You don't have enough credits! You have {} credits.",
                racer.credits
            )));
        }

        let opponent = repo.get_or_create(opponent_id, guild_id).await?;
        if wager > opponent.credits {
            return Err(AppError::BadRequest(format!(
                "{} doesn't have enough credits! They have {} credits.",
                opponent_tag, opponent.credits
            )));
        }

        RacingRaceRepository::new(self.db)
            .create(CreateRaceParam {
                guild_id,
                racer1_id: racer_id,
                racer2_id: Some(opponent_id),
                credits_wagered: wager,
                kind: RaceKind::Player,
            })
            .await
    }

    /// Checks the racer can cover the wager and records a race against the computer.
    pub async fn start_ai_race(
        &self,
        guild_id: u64,
        racer_id: u64,
        wager: i64,
    ) -> Result<RacingRace, AppError> {
        let racer = RacingUserRepository::new(self.db)
            .get_or_create(racer_id, guild_id)
            .await?;

        if wager > racer.credits {
            return Err(AppError::BadRequest(format!(
                "You don't have enough credits! You have {} credits.",
                racer.credits
            )));
        }

        RacingRaceRepository::new(self.db)
            .create(CreateRaceParam {
                guild_id,
                racer1_id: racer_id,
                racer2_id: None,
                credits_wagered: wager,
                kind: RaceKind::Ai,
            })
            .await
    }

    /// Draws the winner of a recorded race and applies it to both profiles.
    pub async fn finish_race(&self, race: &RacingRace) -> Result<RaceSettlement, AppError> {
        let wager = race.credits_wagered;
        let settlement = {
            let mut rng = rand::rng();
            match race.racer2_id {
                Some(opponent_id) => {
                    settle_player_race(&mut rng, race.racer1_id, opponent_id, wager)
                }
                None => settle_ai_race(&mut rng, race.racer1_id, wager),
            }
        };

        let repo = RacingUserRepository::new(self.db);
        let racers = std::iter::once(race.racer1_id).chain(race.racer2_id);

        for racer_id in racers {
            let won = settlement.winner == RaceWinner::User(racer_id);
            let delta = if won { settlement.credits_won } else { -wager };

            repo.apply_race_result(racer_id, race.guild_id, won, delta)
                .await?;
        }

        RacingRaceRepository::new(self.db)
            .complete(race.id, settlement.winner, settlement.duration_secs)
            .await?;

        tracing::debug!(
            "Race {} in guild {} won by {}",
            race.id,
            race.guild_id,
            settlement.winner.stored()
        );

        Ok(settlement)
    }

    /// Moves credits between two racers.
    ///
    /// # Returns
    /// - `Ok((sender, recipient))` - Both profiles after the transfer
    /// - `Err(AppError::BadRequest)` - Sender cannot afford the amount
    pub async fn transfer(
        &self,
        guild_id: u64,
        sender_id: u64,
        recipient_id: u64,
        amount: i64,
    ) -> Result<(RacingUser, RacingUser), AppError> {
        let repo = RacingUserRepository::new(self.db);

        if !repo
            .transfer(guild_id, sender_id, recipient_id, amount)
            .await?
        {
            let sender = repo.get_or_create(sender_id, guild_id).await?;
            return Err(AppError::BadRequest(format!(
                "You don't have enough credits! You have {} credits.",
                sender.credits
            )));
        }

        Ok((
            repo.get_or_create(sender_id, guild_id).await?,
            repo.get_or_create(recipient_id, guild_id).await?,
        ))
    }

    pub async fn give_credits(
        &self,
        guild_id: u64,
        user_id: u64,
        amount: i64,
    ) -> Result<RacingUser, AppError> {
        RacingUserRepository::new(self.db)
            .adjust_credits(user_id, guild_id, amount)
            .await
    }

    /// Resets part of an existing racer's profile.
    ///
    /// # Returns
    /// - `Ok(RacingUser)` - Profile after the reset
    /// - `Err(AppError::BadRequest)` - The user has never raced in this guild
    pub async fn reset(
        &self,
        guild_id: u64,
        user_id: u64,
        kind: ResetKind,
    ) -> Result<RacingUser, AppError> {
        let repo = RacingUserRepository::new(self.db);

        if repo.get(user_id, guild_id).await?.is_none() {
            return Err(AppError::BadRequest(
                "User has no racing data to reset!".to_string(),
            ));
        }

        repo.reset(guild_id, user_id, kind).await
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};
    use test_utils::{builder::TestBuilder, factory::racing_user::RacingUserFactory};

    use super::*;

    #[test]
    fn daily_reward_grows_with_streak_up_to_cap() {
        assert_eq!(daily_reward(0), 200);
        assert_eq!(daily_reward(1), 210);
        assert_eq!(daily_reward(20), 400);
        assert_eq!(daily_reward(90), 400);
    }

    #[test]
    fn hours_until_daily_rounds_up() {
        let now = Utc::now();

        assert_eq!(hours_until_daily(None, now), None);
        assert_eq!(hours_until_daily(Some(now - Duration::hours(25)), now), None);
        assert_eq!(hours_until_daily(Some(now), now), Some(24));
        assert_eq!(
            hours_until_daily(Some(now - Duration::minutes(23 * 60 + 30)), now),
            Some(1)
        );
    }

    #[test]
    fn player_race_rewards_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..500 {
            let settlement = settle_player_race(&mut rng, 1, 2, 50);

            assert!((150..550).contains(&settlement.credits_won));
            assert!((5.0..15.0).contains(&settlement.duration_secs));
            assert!(matches!(settlement.winner, RaceWinner::User(1 | 2)));
        }
    }

    #[test]
    fn ai_race_favours_the_player() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut player_wins = 0;

        for _ in 0..5_000 {
            let settlement = settle_ai_race(&mut rng, 1, 20);
            match settlement.winner {
                RaceWinner::User(_) => {
                    player_wins += 1;
                    assert!((70..270).contains(&settlement.credits_won));
                }
                RaceWinner::Ai => assert_eq!(settlement.credits_won, 0),
            }
        }

        assert!((2_800..=3_200).contains(&player_wins), "{player_wins}");
    }

    /// Tests the first daily claim.
    ///
    /// Verifies that a racer with no prior claim receives the base reward and that a
    /// second claim within 24 hours is refused.
    ///
    /// Expected: Claimed(200, streak 1) then AlreadyClaimed with positive hours
    #[tokio::test]
    async fn first_daily_claim_pays_base_reward() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_racing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let service = EconomyService::new(db);
        let now = Utc::now();

        match service.claim_daily(1, 100, now).await? {
            DailyOutcome::Claimed {
                reward,
                streak,
                balance,
                ..
            } => {
                assert_eq!(reward, 200);
                assert_eq!(streak, 1);
                assert_eq!(balance, 1200);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        match service.claim_daily(1, 100, now).await? {
            DailyOutcome::AlreadyClaimed { hours_left } => assert!(hours_left > 0),
            other => panic!("unexpected outcome: {other:?}"),
        }

        Ok(())
    }

    /// Tests a race whose wager exceeds the opponent's balance.
    ///
    /// Expected: Err(BadRequest) naming the opponent
    #[tokio::test]
    async fn race_refuses_wager_opponent_cannot_cover() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_racing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        RacingUserFactory::new(db, 100)
            .user_id(2)
            .credits(5)
            .build()
            .await?;

        let result = EconomyService::new(db)
            .start_player_race(100, 1, 2, "rival", 50)
            .await;

        match result {
            Err(AppError::BadRequest(message)) => assert!(message.starts_with("rival")),
            other => panic!("unexpected result: {other:?}"),
        }

        Ok(())
    }

    /// Tests finishing a player race.
    ///
    /// Verifies that both racers' counters move and the winner is stored.
    ///
    /// Expected: one win, one loss, loser pays the wager
    #[tokio::test]
    async fn finishing_player_race_updates_both_racers() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_racing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let service = EconomyService::new(db);

        let race = service.start_player_race(100, 1, 2, "rival", 100).await?;
        let settlement = service.finish_race(&race).await?;

        let RaceWinner::User(winner_id) = settlement.winner else {
            panic!("player race won by the computer");
        };
        let loser_id = if winner_id == 1 { 2 } else { 1 };

        let winner = service.profile(winner_id, 100).await?;
        let loser = service.profile(loser_id, 100).await?;

        assert_eq!((winner.wins, winner.total_races), (1, 1));
        assert_eq!((loser.losses, loser.total_races), (1, 1));
        assert_eq!(winner.credits, 1000 + settlement.credits_won);
        assert_eq!(loser.credits, 900);

        let stored = RacingRaceRepository::new(db).find(race.id).await?.unwrap();
        assert_eq!(stored.winner, Some(settlement.winner));

        Ok(())
    }

    /// Tests resetting a user who has never raced.
    ///
    /// Expected: Err(BadRequest)
    #[tokio::test]
    async fn reset_requires_existing_profile() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_racing_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let result = EconomyService::new(db).reset(100, 9, ResetKind::All).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        Ok(())
    }
}
