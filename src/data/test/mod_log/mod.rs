use crate::{
    data::mod_log::ModLogRepository,
    error::AppError,
    model::mod_log::{CreateModLogParam, ModAction},
};
use chrono::{Duration, Utc};
use test_utils::{builder::TestBuilder, factory::mod_log::create_mod_log};

mod append;
mod query;
