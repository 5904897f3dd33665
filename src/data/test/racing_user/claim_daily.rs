use super::*;

/// Tests the first ever daily claim.
///
/// Expected: Ok(true) with reward credited, streak 1 and claim time stamped
#[tokio::test]
async fn pays_first_claim() -> Result<(), AppError> {
    let test = TestBuilder::new().with_racing_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let now = Utc::now();
    let repo = RacingUserRepository::new(db);
    assert!(repo.claim_daily(1, 2, 200, now).await?);

    let profile = repo.get(1, 2).await?.unwrap();
    assert_eq!(profile.credits, STARTING_CREDITS + 200);
    assert_eq!(profile.daily_streak, 1);
    assert!(profile.last_daily.is_some());

    Ok(())
}

/// Tests claiming again within 24 hours.
///
/// Expected: Ok(false) with nothing changed
#[tokio::test]
async fn rejects_claim_within_a_day() -> Result<(), AppError> {
    let test = TestBuilder::new().with_racing_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let now = Utc::now();
    RacingUserFactory::new(db, 2)
        .user_id(1)
        .daily_streak(3)
        .last_daily(now - Duration::hours(23))
        .build()
        .await?;

    let repo = RacingUserRepository::new(db);
    assert!(!repo.claim_daily(1, 2, 230, now).await?);

    let profile = repo.get(1, 2).await?.unwrap();
    assert_eq!(profile.credits, STARTING_CREDITS);
    assert_eq!(profile.daily_streak, 3);

    Ok(())
}

/// Tests claiming after the 24 hour cooldown has passed.
///
/// Verifies that the streak keeps counting up from its previous value.
///
/// Expected: Ok(true) with streak incremented
#[tokio::test]
async fn pays_claim_after_a_day() -> Result<(), AppError> {
    let test = TestBuilder::new().with_racing_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let now = Utc::now();
    RacingUserFactory::new(db, 2)
        .user_id(1)
        .daily_streak(3)
        .last_daily(now - Duration::hours(25))
        .build()
        .await?;

    let repo = RacingUserRepository::new(db);
    assert!(repo.claim_daily(1, 2, 230, now).await?);

    let profile = repo.get(1, 2).await?.unwrap();
    assert_eq!(profile.credits, STARTING_CREDITS + 230);
    assert_eq!(profile.daily_streak, 4);

    Ok(())
}
