//! Anti-raid join counter.
//!
//! Every join in a protected guild is appended to the raid action log. A join is
//! refused when it would be the `threshold`-th event inside the guild's rolling
//! window, counting itself. The window check and the append are separate
//! statements, so two joins landing at the same instant can both be admitted
//! just under the threshold.

use chrono::{DateTime, Duration, Utc};
use sea_orm::DatabaseConnection;
use serenity::all::{CreateEmbed, User};

use crate::{
    data::{guild_settings::GuildSettingsRepository, raid_action::RaidActionRepository},
    error::AppError,
    model::{guild_settings::AntiRaidConfig, raid_action::RaidActionKind},
    service::embed,
};

/// Audit log reason attached to anti-raid bans.
pub const BAN_REASON: &str = "Anti-raid protection triggered";

/// Decision for one join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaidVerdict {
    Admit,
    Ban,
}

/// Decides a join given the events already inside the window.
///
/// The joining member counts towards the threshold.
pub fn evaluate(recent_actions: u64, threshold: u32) -> RaidVerdict {
    if recent_actions + 1 >= u64::from(threshold) {
        RaidVerdict::Ban
    } else {
        RaidVerdict::Admit
    }
}

/// Card posted to the log channel after a join was refused.
pub fn protection_card(user: &User) -> CreateEmbed {
    CreateEmbed::new()
        .color(embed::MODERATION_COLOR)
        .title("🛡️ Anti-Raid Protection")
        .description(format!(
            "User {} was banned due to anti-raid protection",
            user.tag()
        ))
        .timestamp(serenity::all::Timestamp::now())
}

pub struct AntiRaidService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AntiRaidService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Counts a join against the guild's anti-raid window and records it.
    ///
    /// A refused join is recorded as a `BAN` event before the ban is attempted, so
    /// the attempt stays on record even if the platform call later fails.
    ///
    /// # Arguments
    /// - `guild_id` - Guild the member joined
    /// - `user_id` - Joining member
    /// - `now` - Time of the join
    ///
    /// # Returns
    /// - `Ok(None)` - Anti-raid is disabled for the guild, nothing recorded
    /// - `Ok(Some(RaidVerdict))` - Whether the caller should ban the member
    /// - `Err(AppError)` - Database error reading settings or writing the event
    pub async fn register_join(
        &self,
        guild_id: u64,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<Option<RaidVerdict>, AppError> {
        let Some(verdict) = self.check_window(guild_id, now).await? else {
            return Ok(None);
        };

        self.record_verdict(guild_id, user_id, verdict, now).await?;

        Ok(Some(verdict))
    }

    /// Reads the guild's window and decides the next join without recording it.
    async fn check_window(
        &self,
        guild_id: u64,
        now: DateTime<Utc>,
    ) -> Result<Option<RaidVerdict>, AppError> {
        let settings = GuildSettingsRepository::new(self.db).get(guild_id).await?;
        let config = AntiRaidConfig::resolve(settings.as_ref());

        if !config.enabled {
            return Ok(None);
        }

        let since = now - Duration::milliseconds(config.timeframe_ms);
        let recent = RaidActionRepository::new(self.db)
            .count_since(guild_id, since)
            .await?;
        let verdict = evaluate(recent, config.threshold);

        tracing::debug!(
            "Anti-raid counted {} recent events in guild {} (threshold {}): {:?}",
            recent,
            guild_id,
            config.threshold,
            verdict
        );

        Ok(Some(verdict))
    }

    async fn record_verdict(
        &self,
        guild_id: u64,
        user_id: u64,
        verdict: RaidVerdict,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let kind = match verdict {
            RaidVerdict::Admit => RaidActionKind::Join,
            RaidVerdict::Ban => RaidActionKind::Ban,
        };
        RaidActionRepository::new(self.db)
            .record(guild_id, user_id, kind, now)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
    use test_utils::{builder::TestBuilder, factory::guild_settings::GuildSettingsFactory};

    #[test]
    fn threshold_th_join_is_banned() {
        assert_eq!(evaluate(0, 5), RaidVerdict::Admit);
        assert_eq!(evaluate(3, 5), RaidVerdict::Admit);
        assert_eq!(evaluate(4, 5), RaidVerdict::Ban);
        assert_eq!(evaluate(12, 5), RaidVerdict::Ban);
    }

    /// Tests a burst of joins against a threshold of 5 over 60 seconds.
    ///
    /// Verifies that the first four joins are admitted and the fifth, arriving
    /// inside the same window, is refused.
    ///
    /// Expected: four `Admit` verdicts followed by `Ban`
    #[tokio::test]
    async fn fifth_join_in_window_is_refused() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildSettings)
            .with_table(entity::prelude::RaidAction)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        GuildSettingsFactory::new(db, 1)
            .anti_raid(5, 60_000)
            .build()
            .await?;

        let service = AntiRaidService::new(db);
        let start = Utc::now();

        for i in 0..4 {
            let verdict = service
                .register_join(1, 100 + i, start + Duration::seconds(i as i64 * 2))
                .await?;
            assert_eq!(verdict, Some(RaidVerdict::Admit));
        }

        let verdict = service
            .register_join(1, 200, start + Duration::seconds(10))
            .await?;
        assert_eq!(verdict, Some(RaidVerdict::Ban));

        // The refusal is on record before any ban call is made.
        let refused = entity::prelude::RaidAction::find()
            .filter(entity::raid_action::Column::GuildId.eq("1"))
            .filter(entity::raid_action::Column::Action.eq(RaidActionKind::Ban.as_str()))
            .all(db)
            .await?;
        assert_eq!(refused.len(), 1);
        assert_eq!(refused[0].user_id, "200");

        Ok(())
    }

    /// Tests two joins decided from the same window snapshot.
    ///
    /// The window check and the append are separate statements, so two joins
    /// that both read before either records are judged against the same count.
    /// With a threshold of 3 and one earlier join, each sees one event and is
    /// admitted, leaving three joins in the window and nobody refused. This is a
    /// known race and is accepted.
    ///
    /// Expected: both `Admit`, three `JOIN` events, no `BAN`
    #[tokio::test]
    async fn joins_sharing_a_snapshot_are_both_admitted() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildSettings)
            .with_table(entity::prelude::RaidAction)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        GuildSettingsFactory::new(db, 1)
            .anti_raid(3, 60_000)
            .build()
            .await?;

        let service = AntiRaidService::new(db);
        let now = Utc::now();
        service.register_join(1, 1, now).await?;

        let first = service.check_window(1, now).await?.unwrap();
        let second = service.check_window(1, now).await?.unwrap();
        assert_eq!(first, RaidVerdict::Admit);
        assert_eq!(second, RaidVerdict::Admit);

        service.record_verdict(1, 2, first, now).await?;
        service.record_verdict(1, 3, second, now).await?;

        let joins = entity::prelude::RaidAction::find()
            .filter(entity::raid_action::Column::Action.eq(RaidActionKind::Join.as_str()))
            .count(db)
            .await?;
        assert_eq!(joins, 3);

        // A sequential join now sees the full window and is refused.
        let next = service.register_join(1, 4, now).await?;
        assert_eq!(next, Some(RaidVerdict::Ban));

        Ok(())
    }

    /// Tests a join after earlier joins have left the window.
    ///
    /// Expected: `Admit`
    #[tokio::test]
    async fn stale_joins_do_not_count() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildSettings)
            .with_table(entity::prelude::RaidAction)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        GuildSettingsFactory::new(db, 1)
            .anti_raid(3, 10_000)
            .build()
            .await?;

        let service = AntiRaidService::new(db);
        let start = Utc::now() - Duration::minutes(10);
        service.register_join(1, 1, start).await?;
        service.register_join(1, 2, start).await?;

        let verdict = service.register_join(1, 3, Utc::now()).await?;
        assert_eq!(verdict, Some(RaidVerdict::Admit));

        Ok(())
    }

    /// Tests a guild that never enabled protection.
    ///
    /// Expected: Ok(None) and no events recorded
    #[tokio::test]
    async fn disabled_guild_records_nothing() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildSettings)
            .with_table(entity::prelude::RaidAction)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let now = Utc::now();
        let verdict = AntiRaidService::new(db).register_join(1, 1, now).await?;
        assert_eq!(verdict, None);

        let recorded = RaidActionRepository::new(db)
            .count_since(1, now - Duration::minutes(1))
            .await?;
        assert_eq!(recorded, 0);

        Ok(())
    }
}
