//! Domain & parameter models for the racing economy minigame.

use chrono::{DateTime, Utc};

use crate::{
    error::AppError,
    util::parse::{parse_optional_u64, parse_u64_from_string},
};

/// Balance every new racer starts with, and the value credits reset to.
pub const STARTING_CREDITS: i64 = 1000;

/// Economy profile of a user within one guild.
#[derive(Debug, Clone, PartialEq)]
pub struct RacingUser {
    pub user_id: u64,
    pub guild_id: u64,
    pub credits: i64,
    pub total_races: i32,
    pub wins: i32,
    pub losses: i32,
    pub daily_streak: i32,
    pub last_daily: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RacingUser {
    pub fn from_entity(entity: entity::racing_user::Model) -> Result<Self, AppError> {
        Ok(Self {
            user_id: parse_u64_from_string(entity.user_id)?,
            guild_id: parse_u64_from_string(entity.guild_id)?,
            credits: entity.credits,
            total_races: entity.total_races,
            wins: entity.wins,
            losses: entity.losses,
            daily_streak: entity.daily_streak,
            last_daily: entity.last_daily,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }

    /// Win rate as a percentage, `0.0` before the first race.
    pub fn win_rate(&self) -> f64 {
        if self.total_races == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(self.total_races) * 100.0
        }
    }
}

/// Opponent type of a race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceKind {
    Player,
    Ai,
}

impl RaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Ai => "ai",
        }
    }
}

/// Winner id stored for races won by the computer opponent.
pub const AI_WINNER_ID: &str = "ai";

/// Who won a recorded race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceWinner {
    User(u64),
    Ai,
}

impl RaceWinner {
    pub fn stored(&self) -> String {
        match self {
            Self::User(id) => id.to_string(),
            Self::Ai => AI_WINNER_ID.to_string(),
        }
    }
}

/// A recorded race.
#[derive(Debug, Clone, PartialEq)]
pub struct RacingRace {
    pub id: i32,
    pub guild_id: u64,
    pub racer1_id: u64,
    /// Absent for races against the computer.
    pub racer2_id: Option<u64>,
    pub winner: Option<RaceWinner>,
    pub credits_wagered: i64,
    pub race_type: String,
    pub duration_secs: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl RacingRace {
    pub fn from_entity(entity: entity::racing_race::Model) -> Result<Self, AppError> {
        let winner = match entity.winner_id {
            None => None,
            Some(id) if id == AI_WINNER_ID => Some(RaceWinner::Ai),
            Some(id) => Some(RaceWinner::User(parse_u64_from_string(id)?)),
        };

        Ok(Self {
            id: entity.id,
            guild_id: parse_u64_from_string(entity.guild_id)?,
            racer1_id: parse_u64_from_string(entity.racer1_id)?,
            racer2_id: parse_optional_u64(entity.racer2_id)?,
            winner,
            credits_wagered: entity.credits_wagered,
            race_type: entity.race_type,
            duration_secs: entity.duration_secs,
            created_at: entity.created_at,
        })
    }
}

/// Parameters for recording a race at its start.
#[derive(Debug, Clone)]
pub struct CreateRaceParam {
    pub guild_id: u64,
    pub racer1_id: u64,
    pub racer2_id: Option<u64>,
    pub credits_wagered: i64,
    pub kind: RaceKind,
}

/// Column the leaderboard is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardSort {
    Credits,
    Wins,
    TotalRaces,
}

impl LeaderboardSort {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "credits" => Some(Self::Credits),
            "wins" => Some(Self::Wins),
            "total_races" => Some(Self::TotalRaces),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Credits => "Credits",
            Self::Wins => "Wins",
            Self::TotalRaces => "Total Races",
        }
    }
}

/// Which part of a racer's profile `/resetstats` clears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetKind {
    /// Credits, race counters and the daily streak.
    All,
    /// Credits back to the starting balance.
    Credits,
    /// Race counters.
    Wins,
    /// Daily streak and last claim time.
    Daily,
}

impl ResetKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "credits" => Some(Self::Credits),
            "wins" => Some(Self::Wins),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }
}
