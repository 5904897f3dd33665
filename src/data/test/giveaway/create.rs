use super::*;

/// Tests creating a giveaway.
///
/// Verifies that the repository stores the announcement ids, prize and winner
/// count, marks the giveaway active, and that it can be found by message id.
///
/// Expected: Ok with active giveaway found by its message id
#[tokio::test]
async fn creates_active_giveaway() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_giveaway_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let end_time = Utc::now() + Duration::hours(2);
    let repo = GiveawayRepository::new(db);
    let created = repo
        .create(CreateGiveawayParam {
            message_id: 900,
            channel_id: 800,
            guild_id: 700,
            prize: "Nitro".to_string(),
            winner_count: 3,
            end_time,
            creator_id: 600,
        })
        .await?;

    assert!(created.active);
    assert_eq!(created.winner_count, 3);

    let found = repo.find_by_message_id(700, 900).await?.unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.prize, "Nitro");
    assert_eq!(found.channel_id, 800);
    assert!(found.is_open(Utc::now()));

    Ok(())
}

/// Tests looking up a message that never hosted a giveaway.
///
/// Expected: Ok(None)
#[tokio::test]
async fn returns_none_for_unknown_message() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_giveaway_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let giveaway = factory::create_giveaway(db).await?;
    let guild_id = giveaway.guild_id.parse::<u64>().unwrap();

    let repo = GiveawayRepository::new(db);
    assert!(repo.find_by_message_id(guild_id, 1).await?.is_none());

    Ok(())
}

/// Tests looking up another guild's giveaway by its message id.
///
/// Verifies that a message id from guild 1 does not resolve when the lookup
/// comes from guild 2, so one guild cannot end or reroll another's giveaway.
///
/// Expected: Ok(None) from guild 2, Ok(Some) from guild 1
#[tokio::test]
async fn scopes_lookup_to_guild() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_giveaway_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::giveaway::GiveawayFactory::new(db)
        .message_id(555)
        .guild_id(1)
        .build()
        .await?;

    let repo = GiveawayRepository::new(db);
    assert!(repo.find_by_message_id(2, 555).await?.is_none());
    assert!(repo.find_by_message_id(1, 555).await?.is_some());

    Ok(())
}
