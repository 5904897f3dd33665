use crate::{
    data::racing_race::RacingRaceRepository,
    error::AppError,
    model::racing::{CreateRaceParam, RaceKind, RaceWinner},
};
use test_utils::builder::TestBuilder;

mod complete;
