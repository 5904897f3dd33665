use crate::{data::verification::VerificationRepository, error::AppError};
use test_utils::builder::TestBuilder;

mod mark_verified;
