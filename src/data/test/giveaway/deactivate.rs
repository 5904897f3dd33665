use super::*;

/// Tests that a giveaway can only be ended once.
///
/// Verifies that the first deactivation reports that it ended the giveaway and
/// every later call is a no-op, so the timer, the sweep and a manual end cannot
/// announce winners twice.
///
/// Expected: Ok(true) then Ok(false), giveaway inactive
#[tokio::test]
async fn ends_giveaway_exactly_once() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_giveaway_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let giveaway = factory::create_giveaway(db).await?;

    let repo = GiveawayRepository::new(db);
    assert!(repo.deactivate(giveaway.id).await?);
    assert!(!repo.deactivate(giveaway.id).await?);

    let stored = entity::prelude::Giveaway::find_by_id(giveaway.id)
        .one(db)
        .await?
        .unwrap();
    assert!(!stored.active);

    Ok(())
}

/// Tests deactivating a giveaway id that does not exist.
///
/// Expected: Ok(false)
#[tokio::test]
async fn reports_false_for_missing_giveaway() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_giveaway_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = GiveawayRepository::new(db);
    assert!(!repo.deactivate(999).await?);

    Ok(())
}
