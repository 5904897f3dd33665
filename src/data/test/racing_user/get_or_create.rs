use super::*;

/// Tests that a first lookup creates the profile with the starting balance.
///
/// Expected: Ok with 1000 credits and an empty record
#[tokio::test]
async fn creates_profile_with_starting_credits() -> Result<(), AppError> {
    let test = TestBuilder::new().with_racing_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = RacingUserRepository::new(db);
    assert!(repo.get(1, 2).await?.is_none());

    let profile = repo.get_or_create(1, 2).await?;

    assert_eq!(profile.credits, STARTING_CREDITS);
    assert_eq!(profile.total_races, 0);
    assert_eq!(profile.daily_streak, 0);
    assert!(profile.last_daily.is_none());

    Ok(())
}

/// Tests that an existing profile is returned unchanged.
///
/// Expected: Ok with the stored balance
#[tokio::test]
async fn returns_existing_profile() -> Result<(), AppError> {
    let test = TestBuilder::new().with_racing_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let stored = factory::create_racing_user(db, 2, 40).await?;
    let user_id: u64 = stored.user_id.parse().unwrap();

    let repo = RacingUserRepository::new(db);
    let profile = repo.get_or_create(user_id, 2).await?;

    assert_eq!(profile.credits, 40);

    Ok(())
}
