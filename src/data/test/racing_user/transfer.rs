use super::*;

/// Tests a transfer the sender can afford.
///
/// Verifies that the recipient profile is created on demand and that the sum of
/// both balances is unchanged.
///
/// Expected: Ok(true) with balances moved
#[tokio::test]
async fn moves_credits_and_conserves_total() -> Result<(), AppError> {
    let test = TestBuilder::new().with_racing_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    RacingUserFactory::new(db, 5).user_id(1).credits(300).build().await?;

    let repo = RacingUserRepository::new(db);
    assert!(repo.transfer(5, 1, 2, 120).await?);

    let sender = repo.get(1, 5).await?.unwrap();
    let recipient = repo.get(2, 5).await?.unwrap();
    assert_eq!(sender.credits, 180);
    assert_eq!(recipient.credits, STARTING_CREDITS + 120);
    assert_eq!(sender.credits + recipient.credits, 300 + STARTING_CREDITS);

    Ok(())
}

/// Tests a transfer larger than the sender's balance.
///
/// Expected: Ok(false) with both balances untouched
#[tokio::test]
async fn rejects_overdraft() -> Result<(), AppError> {
    let test = TestBuilder::new().with_racing_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    RacingUserFactory::new(db, 5).user_id(1).credits(50).build().await?;
    RacingUserFactory::new(db, 5).user_id(2).credits(10).build().await?;

    let repo = RacingUserRepository::new(db);
    assert!(!repo.transfer(5, 1, 2, 51).await?);

    assert_eq!(repo.get(1, 5).await?.unwrap().credits, 50);
    assert_eq!(repo.get(2, 5).await?.unwrap().credits, 10);

    Ok(())
}

/// Tests transferring an entire balance.
///
/// Expected: Ok(true) leaving the sender at zero
#[tokio::test]
async fn allows_transferring_full_balance() -> Result<(), AppError> {
    let test = TestBuilder::new().with_racing_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    RacingUserFactory::new(db, 5).user_id(1).credits(75).build().await?;

    let repo = RacingUserRepository::new(db);
    assert!(repo.transfer(5, 1, 2, 75).await?);
    assert_eq!(repo.get(1, 5).await?.unwrap().credits, 0);

    Ok(())
}
