//! Typed access to resolved slash command options.

use serenity::all::{PartialChannel, ResolvedOption, ResolvedValue, Role, User};

use crate::error::AppError;

/// Options of one command or subcommand invocation.
pub struct Options<'a> {
    values: Vec<ResolvedOption<'a>>,
}

impl<'a> Options<'a> {
    pub fn new(values: Vec<ResolvedOption<'a>>) -> Self {
        Self { values }
    }

    /// Splits off the invoked subcommand and its options.
    ///
    /// # Returns
    /// - `Ok((name, options))` - The subcommand that was invoked
    /// - `Err(AppError::BadRequest)` - The invocation carried no subcommand
    pub fn subcommand(self) -> Result<(&'a str, Options<'a>), AppError> {
        self.values
            .into_iter()
            .find_map(|option| match option.value {
                ResolvedValue::SubCommand(values) => Some((option.name, Options::new(values))),
                _ => None,
            })
            .ok_or_else(|| AppError::BadRequest("Please choose a subcommand.".to_string()))
    }

    fn find(&self, name: &str) -> Option<&ResolvedValue<'a>> {
        self.values
            .iter()
            .find(|option| option.name == name)
            .map(|option| &option.value)
    }

    pub fn str(&self, name: &str) -> Option<&'a str> {
        match self.find(name) {
            Some(ResolvedValue::String(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.find(name) {
            Some(ResolvedValue::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn user(&self, name: &str) -> Option<&'a User> {
        match self.find(name) {
            Some(ResolvedValue::User(user, _)) => Some(*user),
            _ => None,
        }
    }

    pub fn role(&self, name: &str) -> Option<&'a Role> {
        match self.find(name) {
            Some(ResolvedValue::Role(role)) => Some(*role),
            _ => None,
        }
    }

    pub fn channel(&self, name: &str) -> Option<&'a PartialChannel> {
        match self.find(name) {
            Some(ResolvedValue::Channel(channel)) => Some(*channel),
            _ => None,
        }
    }

    pub fn required_str(&self, name: &str) -> Result<&'a str, AppError> {
        self.str(name).ok_or_else(|| missing(name))
    }

    pub fn required_integer(&self, name: &str) -> Result<i64, AppError> {
        self.integer(name).ok_or_else(|| missing(name))
    }

    pub fn required_user(&self, name: &str) -> Result<&'a User, AppError> {
        self.user(name).ok_or_else(|| missing(name))
    }

    pub fn required_role(&self, name: &str) -> Result<&'a Role, AppError> {
        self.role(name).ok_or_else(|| missing(name))
    }

    pub fn required_channel(&self, name: &str) -> Result<&'a PartialChannel, AppError> {
        self.channel(name).ok_or_else(|| missing(name))
    }
}

fn missing(name: &str) -> AppError {
    AppError::BadRequest(format!("Missing required option `{}`.", name))
}

/// Error for a subcommand the command does not handle.
///
/// Only reachable when the registered command definition and its handler disagree.
pub fn unknown_subcommand(name: &str) -> AppError {
    AppError::InternalError(format!("Unhandled subcommand `{}`", name))
}

/// Checks an integer option against its registered bounds.
///
/// Discord enforces registered bounds client side; this guards against stale
/// command registrations.
pub fn bounded(name: &str, value: i64, min: i64, max: i64) -> Result<i64, AppError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(AppError::BadRequest(format!(
            "`{}` must be between {} and {}.",
            name, min, max
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(bounded("wager", 10, 10, 1000).ok(), Some(10));
        assert_eq!(bounded("wager", 1000, 10, 1000).ok(), Some(1000));
        assert!(matches!(
            bounded("wager", 9, 10, 1000),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn unknown_subcommand_is_internal() {
        assert!(matches!(
            unknown_subcommand("archive"),
            AppError::InternalError(message) if message.contains("archive")
        ));
    }
}
