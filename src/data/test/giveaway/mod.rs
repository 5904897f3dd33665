use crate::{
    data::giveaway::GiveawayRepository, error::AppError, model::giveaway::CreateGiveawayParam,
};
use chrono::{Duration, Utc};
use sea_orm::EntityTrait;
use test_utils::{builder::TestBuilder, factory};

mod add_participant;
mod create;
mod deactivate;
mod get_overdue;
