use super::*;

/// Tests that joining twice records the participant once.
///
/// Verifies that the first join reports a new entry, the second reports a
/// duplicate, and the participant list contains the user exactly once.
///
/// Expected: Ok(true) then Ok(false), one participant
#[tokio::test]
async fn ignores_duplicate_join() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_giveaway_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let giveaway = factory::create_giveaway(db).await?;

    let repo = GiveawayRepository::new(db);
    assert!(repo.add_participant(giveaway.id, 42).await?);
    assert!(!repo.add_participant(giveaway.id, 42).await?);

    assert_eq!(repo.participants(giveaway.id).await?, vec![42]);
    assert_eq!(repo.participant_count(giveaway.id).await?, 1);

    Ok(())
}

/// Tests that participants are kept per giveaway.
///
/// Verifies that the same user can enter two different giveaways and that each
/// giveaway only lists its own participants.
///
/// Expected: Ok with disjoint participant lists
#[tokio::test]
async fn keeps_entries_per_giveaway() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_giveaway_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let first = factory::create_giveaway(db).await?;
    let second = factory::create_giveaway(db).await?;

    let repo = GiveawayRepository::new(db);
    repo.add_participant(first.id, 1).await?;
    repo.add_participant(first.id, 2).await?;
    repo.add_participant(second.id, 2).await?;

    let mut first_participants = repo.participants(first.id).await?;
    first_participants.sort_unstable();
    assert_eq!(first_participants, vec![1, 2]);
    assert_eq!(repo.participants(second.id).await?, vec![2]);

    Ok(())
}
