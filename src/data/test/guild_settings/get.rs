use super::*;

/// Tests reading settings for a guild that never configured anything.
///
/// Verifies that no row is returned and the anti-raid defaults apply.
///
/// Expected: Ok(None), anti-raid disabled with threshold 5 over 60 seconds
#[tokio::test]
async fn returns_none_for_unconfigured_guild() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildSettings)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = GuildSettingsRepository::new(db);
    let settings = repo.get(1).await?;

    assert!(settings.is_none());
    let anti_raid = AntiRaidConfig::resolve(settings.as_ref());
    assert!(!anti_raid.enabled);
    assert_eq!(anti_raid.threshold, 5);
    assert_eq!(anti_raid.timeframe_ms, 60_000);

    Ok(())
}

/// Tests reading a row whose ban role list is not valid JSON.
///
/// Expected: Err(AppError::InternalErr)
#[tokio::test]
async fn fails_on_corrupted_ban_roles() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::GuildSettings)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    GuildSettingsFactory::new(db, 7)
        .ban_roles_raw("not json")
        .build()
        .await?;

    let repo = GuildSettingsRepository::new(db);
    let result = repo.get(7).await;

    assert!(matches!(result, Err(AppError::InternalErr(_))));

    Ok(())
}
