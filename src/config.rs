//! Process configuration resolved once at startup.
//!
//! Values come from the environment (a `.env` file is loaded first by `main`).
//! Every missing required key is reported at once so a misconfigured deployment
//! can be fixed in one pass.

use crate::error::config::ConfigError;

const DEFAULT_DATABASE_URL: &str = "sqlite://warden.db?mode=rwc";
const DEFAULT_MAX_QUEUE_SIZE: usize = 50;
const DEFAULT_VOLUME: f32 = 0.5;

/// Environment variables that must be present for the bot to start.
pub const REQUIRED_VARS: [&str; 7] = [
    "DISCORD_TOKEN",
    "LOGS_CHANNEL_ID",
    "TICKETS_CHANNEL_ID",
    "MODERATOR_ROLE_ID",
    "ADMIN_ROLE_ID",
    "OWNER_ROLE_ID",
    "DEVELOPER_USER_ID",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub discord_token: String,

    /// Guild to additionally register commands on for instant availability.
    pub guild_id: Option<u64>,

    pub logs_channel_id: u64,
    pub tickets_channel_id: u64,

    pub moderator_role_id: u64,
    pub admin_role_id: u64,
    pub owner_role_id: u64,

    /// Receives forwarded command failures by DM.
    pub developer_user_id: u64,

    pub max_queue_size: usize,
    pub default_volume: f32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as missing.
    ///
    /// # Returns
    /// - `Ok(Config)` - All required keys present and parsable
    /// - `Err(ConfigError::MissingEnvVars)` - Lists every missing required key
    /// - `Err(ConfigError::InvalidEnvVar)` - First key whose value failed to parse
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvLookup(lookup);

        let missing: Vec<String> = REQUIRED_VARS
            .iter()
            .filter(|name| env.get(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingEnvVars(missing));
        }

        let default_volume: Option<f32> = env.optional("DEFAULT_VOLUME")?;

        Ok(Self {
            database_url: env
                .get("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            discord_token: env.required("DISCORD_TOKEN")?,
            guild_id: env.optional("GUILD_ID")?,
            logs_channel_id: env.required_parsed("LOGS_CHANNEL_ID")?,
            tickets_channel_id: env.required_parsed("TICKETS_CHANNEL_ID")?,
            moderator_role_id: env.required_parsed("MODERATOR_ROLE_ID")?,
            admin_role_id: env.required_parsed("ADMIN_ROLE_ID")?,
            owner_role_id: env.required_parsed("OWNER_ROLE_ID")?,
            developer_user_id: env.required_parsed("DEVELOPER_USER_ID")?,
            max_queue_size: env
                .optional("MAX_QUEUE_SIZE")?
                .unwrap_or(DEFAULT_MAX_QUEUE_SIZE),
            default_volume: default_volume.unwrap_or(DEFAULT_VOLUME).clamp(0.0, 1.0),
        })
    }
}

struct EnvLookup<F>(F);

impl<F> EnvLookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, name: &str) -> Result<String, ConfigError> {
        self.get(name)
            .ok_or_else(|| ConfigError::MissingEnvVars(vec![name.to_string()]))
    }

    fn required_parsed<T: std::str::FromStr>(&self, name: &str) -> Result<T, ConfigError> {
        parse_var(name, self.required(name)?)
    }

    fn optional<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>, ConfigError> {
        self.get(name).map(|value| parse_var(name, value)).transpose()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvVar {
        name: name.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn complete_env() -> HashMap<&'static str, String> {
        HashMap::from([
            ("DISCORD_TOKEN", "token".to_string()),
            ("LOGS_CHANNEL_ID", "100".to_string()),
            ("TICKETS_CHANNEL_ID", "101".to_string()),
            ("MODERATOR_ROLE_ID", "200".to_string()),
            ("ADMIN_ROLE_ID", "201".to_string()),
            ("OWNER_ROLE_ID", "202".to_string()),
            ("DEVELOPER_USER_ID", "300".to_string()),
        ])
    }

    #[test]
    fn applies_defaults_for_optional_values() {
        let env = complete_env();
        let config = Config::from_lookup(|name| env.get(name).cloned()).unwrap();

        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.guild_id, None);
        assert_eq!(config.logs_channel_id, 100);
        assert_eq!(config.developer_user_id, 300);
        assert_eq!(config.max_queue_size, 50);
        assert_eq!(config.default_volume, 0.5);
    }

    #[test]
    fn reports_every_missing_key() {
        let mut env = complete_env();
        env.remove("DISCORD_TOKEN");
        env.insert("OWNER_ROLE_ID", "   ".to_string());

        let err = Config::from_lookup(|name| env.get(name).cloned()).unwrap_err();

        match err {
            ConfigError::MissingEnvVars(keys) => {
                assert_eq!(keys, vec!["DISCORD_TOKEN", "OWNER_ROLE_ID"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_non_numeric_ids() {
        let mut env = complete_env();
        env.insert("LOGS_CHANNEL_ID", "general".to_string());

        let err = Config::from_lookup(|name| env.get(name).cloned()).unwrap_err();

        assert!(matches!(err, ConfigError::InvalidEnvVar { ref name, .. } if name == "LOGS_CHANNEL_ID"));
    }

    #[test]
    fn clamps_volume() {
        let mut env = complete_env();
        env.insert("DEFAULT_VOLUME", "3.5".to_string());
        env.insert("GUILD_ID", "555".to_string());

        let config = Config::from_lookup(|name| env.get(name).cloned()).unwrap();

        assert_eq!(config.default_volume, 1.0);
        assert_eq!(config.guild_id, Some(555));
    }
}
