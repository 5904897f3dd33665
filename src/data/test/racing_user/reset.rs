use super::*;

/// Tests resetting only the race record.
///
/// Expected: Ok with counters zeroed and credits and streak kept
#[tokio::test]
async fn resets_race_record_only() -> Result<(), AppError> {
    let test = TestBuilder::new().with_racing_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    RacingUserFactory::new(db, 1)
        .user_id(5)
        .credits(4000)
        .record(7, 3)
        .daily_streak(6)
        .build()
        .await?;

    let repo = RacingUserRepository::new(db);
    let profile = repo.reset(1, 5, ResetKind::Wins).await?;

    assert_eq!((profile.total_races, profile.wins, profile.losses), (0, 0, 0));
    assert_eq!(profile.credits, 4000);
    assert_eq!(profile.daily_streak, 6);

    Ok(())
}

/// Tests a full reset.
///
/// Expected: Ok with the profile back to its starting state
#[tokio::test]
async fn resets_everything() -> Result<(), AppError> {
    let test = TestBuilder::new().with_racing_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    RacingUserFactory::new(db, 1)
        .user_id(5)
        .credits(4000)
        .record(7, 3)
        .daily_streak(6)
        .last_daily(Utc::now())
        .build()
        .await?;

    let repo = RacingUserRepository::new(db);
    let profile = repo.reset(1, 5, ResetKind::All).await?;

    assert_eq!(profile.credits, STARTING_CREDITS);
    assert_eq!(profile.total_races, 0);
    assert_eq!(profile.daily_streak, 0);
    assert!(profile.last_daily.is_none());

    Ok(())
}
