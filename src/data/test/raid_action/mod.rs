use crate::{data::raid_action::RaidActionRepository, error::AppError, model::raid_action::RaidActionKind};
use chrono::{Duration, Utc};
use test_utils::{builder::TestBuilder, factory::raid_action::create_join};

mod count_since;
