use super::*;

/// Tests completing a race against the computer.
///
/// Verifies that the winner is stored as the computer marker and read back as
/// `RaceWinner::Ai`.
///
/// Expected: Ok with winner and duration set
#[tokio::test]
async fn stores_ai_winner() -> Result<(), AppError> {
    let test = TestBuilder::new().with_racing_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = RacingRaceRepository::new(db);
    let race = repo
        .create(CreateRaceParam {
            guild_id: 1,
            racer1_id: 2,
            racer2_id: None,
            credits_wagered: 50,
            kind: RaceKind::Ai,
        })
        .await?;
    assert_eq!(race.winner, None);

    repo.complete(race.id, RaceWinner::Ai, 7.5).await?;

    let stored = repo.find(race.id).await?.unwrap();
    assert_eq!(stored.winner, Some(RaceWinner::Ai));
    assert_eq!(stored.duration_secs, Some(7.5));
    assert_eq!(stored.race_type, "ai");

    Ok(())
}

/// Tests completing a player race.
///
/// Expected: Ok with the winning user stored
#[tokio::test]
async fn stores_player_winner() -> Result<(), AppError> {
    let test = TestBuilder::new().with_racing_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = RacingRaceRepository::new(db);
    let race = repo
        .create(CreateRaceParam {
            guild_id: 1,
            racer1_id: 2,
            racer2_id: Some(3),
            credits_wagered: 0,
            kind: RaceKind::Player,
        })
        .await?;

    repo.complete(race.id, RaceWinner::User(3), 12.0).await?;

    let stored = repo.find(race.id).await?.unwrap();
    assert_eq!(stored.winner, Some(RaceWinner::User(3)));
    assert_eq!(stored.racer2_id, Some(3));

    Ok(())
}

/// Tests completing a race that was never recorded.
///
/// Expected: Err(AppError::NotFound)
#[tokio::test]
async fn fails_for_unknown_race() -> Result<(), AppError> {
    let test = TestBuilder::new().with_racing_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = RacingRaceRepository::new(db);
    let result = repo.complete(404, RaceWinner::User(1), 5.0).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));

    Ok(())
}
