use super::*;

/// Tests granting and removing credits.
///
/// Expected: Ok with the balance moved by each delta
#[tokio::test]
async fn applies_signed_delta() -> Result<(), AppError> {
    let test = TestBuilder::new().with_racing_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = RacingUserRepository::new(db);
    let profile = repo.adjust_credits(1, 2, 500).await?;
    assert_eq!(profile.credits, STARTING_CREDITS + 500);

    let profile = repo.adjust_credits(1, 2, -200).await?;
    assert_eq!(profile.credits, STARTING_CREDITS + 300);

    Ok(())
}

/// Tests recording a race outcome for both participants.
///
/// Verifies that race counters and balances change in the same update.
///
/// Expected: Ok with winner and loser records updated
#[tokio::test]
async fn records_race_result() -> Result<(), AppError> {
    let test = TestBuilder::new().with_racing_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = RacingUserRepository::new(db);
    repo.apply_race_result(1, 9, true, 250).await?;
    repo.apply_race_result(2, 9, false, -50).await?;

    let winner = repo.get(1, 9).await?.unwrap();
    assert_eq!(winner.credits, STARTING_CREDITS + 250);
    assert_eq!((winner.total_races, winner.wins, winner.losses), (1, 1, 0));

    let loser = repo.get(2, 9).await?.unwrap();
    assert_eq!(loser.credits, STARTING_CREDITS - 50);
    assert_eq!((loser.total_races, loser.wins, loser.losses), (1, 0, 1));

    Ok(())
}
