use super::*;

/// Tests the first write for a guild.
///
/// Verifies that untouched columns take their defaults when the row is created.
///
/// Expected: Ok with auto role set and everything else defaulted
#[tokio::test]
async fn creates_row_with_defaults() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildSettings)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = GuildSettingsRepository::new(db);
    let settings = repo
        .update(
            10,
            UpdateGuildSettingsParam {
                auto_role_id: Some(Some(55)),
                ..Default::default()
            },
        )
        .await?;

    assert_eq!(settings.guild_id, 10);
    assert_eq!(settings.auto_role_id, Some(55));
    assert!(settings.ban_roles.is_empty());
    assert!(!settings.anti_raid_enabled);
    assert_eq!(settings.anti_raid_threshold, 5);
    assert_eq!(settings.verification(), None);

    Ok(())
}

/// Tests that an update leaves columns it does not mention untouched.
///
/// Verifies that enabling anti-raid after setting an auto role keeps the auto
/// role, so settings changed by different commands never overwrite each other.
///
/// Expected: Ok with both the auto role and the anti-raid values present
#[tokio::test]
async fn merges_partial_updates() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildSettings)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    GuildSettingsFactory::new(db, 10)
        .auto_role_id(55)
        .build()
        .await?;

    let repo = GuildSettingsRepository::new(db);
    let settings = repo
        .update(
            10,
            UpdateGuildSettingsParam {
                anti_raid_enabled: Some(true),
                anti_raid_threshold: Some(8),
                anti_raid_timeframe_ms: Some(30_000),
                ..Default::default()
            },
        )
        .await?;

    assert_eq!(settings.auto_role_id, Some(55));
    assert!(settings.anti_raid_enabled);
    assert_eq!(settings.anti_raid_threshold, 8);
    assert_eq!(settings.anti_raid_timeframe_ms, 30_000);

    Ok(())
}

/// Tests clearing nullable columns.
///
/// Verifies that `Some(None)` clears verification while other settings survive.
///
/// Expected: Ok with verification cleared and auto role kept
#[tokio::test]
async fn clears_verification_pair() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildSettings)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = GuildSettingsRepository::new(db);
    repo.update(
        3,
        UpdateGuildSettingsParam {
            auto_role_id: Some(Some(9)),
            ..UpdateGuildSettingsParam::verification(Some((100, 200)))
        },
    )
    .await?;
    assert_eq!(repo.get(3).await?.unwrap().verification(), Some((100, 200)));

    let settings = repo
        .update(3, UpdateGuildSettingsParam::verification(None))
        .await?;

    assert_eq!(settings.verify_channel_id, None);
    assert_eq!(settings.verify_role_id, None);
    assert_eq!(settings.auto_role_id, Some(9));

    Ok(())
}

/// Tests storing the ban role list.
///
/// Expected: Ok with the ids read back in order
#[tokio::test]
async fn stores_ban_roles() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildSettings)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = GuildSettingsRepository::new(db);
    let settings = repo
        .update(
            4,
            UpdateGuildSettingsParam {
                ban_roles: Some(vec![u64::MAX, 12]),
                ..Default::default()
            },
        )
        .await?;

    assert_eq!(settings.ban_roles, vec![u64::MAX, 12]);

    Ok(())
}
