use crate::{
    data::racing_user::RacingUserRepository,
    error::AppError,
    model::racing::{LeaderboardSort, ResetKind, STARTING_CREDITS},
};
use chrono::{Duration, Utc};
use test_utils::{
    builder::TestBuilder,
    factory::{self, racing_user::RacingUserFactory},
};

mod adjust_credits;
mod claim_daily;
mod get_or_create;
mod leaderboard;
mod reset;
mod transfer;
