//! Error types and user-facing error classification.
//!
//! This module provides the application's error hierarchy. The `AppError` enum serves
//! as the top-level error type that wraps domain-specific errors. The command router
//! decides what the invoker sees based on the variant: user input errors are shown
//! verbatim, everything else is reported as a generic failure and forwarded to the
//! configured developer.

pub mod config;
pub mod internal;

use thiserror::Error;

use crate::error::{config::ConfigError, internal::InternalError};

/// Top-level application error type.
///
/// Aggregates all possible error types that can occur in the application. Most variants
/// use `#[from]` for automatic error conversion so `?` can be used freely in command
/// handlers and services.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error during startup or environment variable loading.
    ///
    /// Fatal at startup; the process prints the offending keys and exits.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Unexpected internal state such as unparsable stored ids.
    #[error(transparent)]
    InternalErr(#[from] InternalError),

    /// Database operation error from SeaORM.
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),

    /// Discord API error from Serenity.
    ///
    /// Boxed due to large size.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// Voice gateway error while joining or leaving a channel.
    #[error(transparent)]
    VoiceErr(#[from] songbird::error::JoinError),

    /// Cron scheduler error.
    #[error(transparent)]
    SchedulerErr(#[from] tokio_cron_scheduler::JobSchedulerError),

    /// Requested resource does not exist (giveaway, ticket, economy profile).
    ///
    /// # Fields
    /// - Message describing what resource was not found
    #[error("{0}")]
    NotFound(String),

    /// The invoker lacks a role or permission required by the command.
    ///
    /// Shown on the "Insufficient Permissions" card.
    #[error("{0}")]
    PermissionDenied(String),

    /// Invalid input from the invoking user.
    ///
    /// The message is shown to the invoker as-is on an error card.
    ///
    /// # Fields
    /// - Message describing what was invalid about the request
    #[error("{0}")]
    BadRequest(String),

    /// Internal error with custom message.
    ///
    /// # Fields
    /// - Detailed error message for logging
    #[error("{0}")]
    InternalError(String),
}

/// Manual conversion from serenity::Error to AppError.
///
/// Boxes the error to reduce the size of the AppError enum, as serenity::Error
/// is very large and would make all AppError variants larger if not boxed.
impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}

impl AppError {
    /// Message safe to show the invoking user, if this error is the user's fault.
    ///
    /// # Returns
    /// - `Some(&str)` - For `BadRequest`, `NotFound` and `PermissionDenied`
    /// - `None` - For every other variant, which is reported generically
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::BadRequest(msg) | Self::NotFound(msg) | Self::PermissionDenied(msg) => Some(msg),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_user_errors_expose_their_message() {
        assert_eq!(
            AppError::BadRequest("bad wager".to_string()).user_message(),
            Some("bad wager")
        );
        assert_eq!(
            AppError::NotFound("no giveaway".to_string()).user_message(),
            Some("no giveaway")
        );
        assert_eq!(
            AppError::PermissionDenied("admins only".to_string()).user_message(),
            Some("admins only")
        );
        assert_eq!(
            AppError::InternalError("boom".to_string()).user_message(),
            None
        );
        assert_eq!(
            AppError::DbErr(sea_orm::DbErr::Custom("locked".to_string())).user_message(),
            None
        );
    }
}
