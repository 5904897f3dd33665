use super::*;

/// Tests ordering the leaderboard by credits and by wins.
///
/// Verifies that profiles from other guilds are excluded and the limit applies.
///
/// Expected: Ok with profiles ordered by the requested column
#[tokio::test]
async fn orders_by_requested_column() -> Result<(), AppError> {
    let test = TestBuilder::new().with_racing_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    RacingUserFactory::new(db, 1).user_id(10).credits(500).record(9, 1).build().await?;
    RacingUserFactory::new(db, 1).user_id(11).credits(2500).record(2, 5).build().await?;
    RacingUserFactory::new(db, 1).user_id(12).credits(1500).record(4, 0).build().await?;
    RacingUserFactory::new(db, 2).user_id(13).credits(9999).build().await?;

    let repo = RacingUserRepository::new(db);

    let by_credits: Vec<u64> = repo
        .leaderboard(1, LeaderboardSort::Credits, 10)
        .await?
        .iter()
        .map(|profile| profile.user_id)
        .collect();
    assert_eq!(by_credits, vec![11, 12, 10]);

    let by_wins: Vec<u64> = repo
        .leaderboard(1, LeaderboardSort::Wins, 2)
        .await?
        .iter()
        .map(|profile| profile.user_id)
        .collect();
    assert_eq!(by_wins, vec![10, 12]);

    Ok(())
}

/// Tests rank lookups by credits.
///
/// Expected: Ok(Some(2)) for the second richest, Ok(None) without a profile
#[tokio::test]
async fn ranks_by_credits() -> Result<(), AppError> {
    let test = TestBuilder::new().with_racing_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    RacingUserFactory::new(db, 1).user_id(10).credits(500).build().await?;
    RacingUserFactory::new(db, 1).user_id(11).credits(2500).build().await?;
    RacingUserFactory::new(db, 1).user_id(12).credits(1500).build().await?;

    let repo = RacingUserRepository::new(db);
    assert_eq!(repo.rank_by_credits(12, 1).await?, Some(2));
    assert_eq!(repo.rank_by_credits(99, 1).await?, None);

    Ok(())
}
