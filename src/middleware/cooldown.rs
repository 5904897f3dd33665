//! Per-user, per-command cooldowns.
//!
//! The registry records when a user last ran a command and refuses another run
//! until the command's cooldown has elapsed. Entries remove themselves once they
//! expire, so the map only holds users who are currently cooling down.

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::{sync::Mutex, time::Instant};

/// Cooldown applied to commands that do not declare their own.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(3);

type CooldownKey = (String, u64);

#[derive(Clone, Default)]
pub struct CooldownRegistry {
    entries: Arc<Mutex<HashMap<CooldownKey, Instant>>>,
}

impl CooldownRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an invocation if the user is not cooling down for this command.
    ///
    /// On success an expiry task is scheduled that removes the entry after
    /// `cooldown`, unless a newer invocation replaced it in the meantime.
    ///
    /// # Returns
    /// - `Ok(())` - Invocation allowed and recorded
    /// - `Err(Duration)` - Time left until the user may run the command again
    pub async fn try_acquire(
        &self,
        command: &str,
        user_id: u64,
        cooldown: Duration,
    ) -> Result<(), Duration> {
        if cooldown.is_zero() {
            return Ok(());
        }

        let key = (command.to_string(), user_id);
        let now = Instant::now();

        {
            let mut entries = self.entries.lock().await;

            if let Some(last) = entries.get(&key) {
                let elapsed = now.saturating_duration_since(*last);
                if elapsed < cooldown {
                    return Err(cooldown - elapsed);
                }
            }

            entries.insert(key.clone(), now);
        }

        let entries = Arc::clone(&self.entries);
        tokio::spawn(async move {
            tokio::time::sleep(cooldown).await;

            let mut entries = entries.lock().await;
            if entries.get(&key) == Some(&now) {
                entries.remove(&key);
            }
        });

        Ok(())
    }

    /// Number of users currently cooling down across all commands.
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn rejects_repeat_within_cooldown() {
        let registry = CooldownRegistry::new();
        let cooldown = Duration::from_secs(5);

        assert!(registry.try_acquire("ban", 1, cooldown).await.is_ok());

        tokio::time::advance(Duration::from_secs(2)).await;
        let remaining = registry.try_acquire("ban", 1, cooldown).await.unwrap_err();
        assert_eq!(remaining, Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn allows_again_after_cooldown() {
        let registry = CooldownRegistry::new();
        let cooldown = Duration::from_secs(5);

        assert!(registry.try_acquire("ban", 1, cooldown).await.is_ok());

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(registry.len().await, 0);
        assert!(registry.try_acquire("ban", 1, cooldown).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn cooldowns_are_per_command_and_user() {
        let registry = CooldownRegistry::new();
        let cooldown = Duration::from_secs(5);

        assert!(registry.try_acquire("ban", 1, cooldown).await.is_ok());
        assert!(registry.try_acquire("kick", 1, cooldown).await.is_ok());
        assert!(registry.try_acquire("ban", 2, cooldown).await.is_ok());
        assert!(registry.try_acquire("ban", 1, cooldown).await.is_err());
        assert_eq!(registry.len().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_cooldown_is_never_recorded() {
        let registry = CooldownRegistry::new();

        assert!(registry.try_acquire("ping", 1, Duration::ZERO).await.is_ok());
        assert!(registry.try_acquire("ping", 1, Duration::ZERO).await.is_ok());
        assert_eq!(registry.len().await, 0);
    }
}
