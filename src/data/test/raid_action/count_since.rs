use super::*;

/// Tests counting events inside the anti-raid window.
///
/// Verifies that events older than the window and events in other guilds are
/// not counted, and that every kind of event (joins and bans) is.
///
/// Expected: Ok(3)
#[tokio::test]
async fn counts_recent_events_for_guild() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::RaidAction)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let now = Utc::now();
    create_join(db, 1, now - Duration::seconds(10)).await?;
    create_join(db, 1, now - Duration::seconds(20)).await?;
    create_join(db, 1, now - Duration::minutes(5)).await?;
    create_join(db, 2, now).await?;

    let repo = RaidActionRepository::new(db);
    repo.record(1, 99, RaidActionKind::Ban, now).await?;

    let count = repo.count_since(1, now - Duration::seconds(60)).await?;
    assert_eq!(count, 3);

    Ok(())
}

/// Tests a guild without any events.
///
/// Expected: Ok(0)
#[tokio::test]
async fn counts_zero_without_events() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::RaidAction)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = RaidActionRepository::new(db);
    assert_eq!(repo.count_since(1, Utc::now() - Duration::minutes(1)).await?, 0);

    Ok(())
}
