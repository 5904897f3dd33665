use super::*;

use test_utils::factory::giveaway::GiveawayFactory;

/// Tests that the sweep query only returns active giveaways past their end time.
///
/// Verifies that future giveaways and already ended giveaways are excluded.
///
/// Expected: Ok with only the overdue active giveaway
#[tokio::test]
async fn returns_only_overdue_active_giveaways() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_giveaway_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let now = Utc::now();
    let overdue = GiveawayFactory::new(db)
        .end_time(now - Duration::minutes(5))
        .build()
        .await?;
    GiveawayFactory::new(db)
        .end_time(now + Duration::minutes(5))
        .build()
        .await?;
    GiveawayFactory::new(db)
        .end_time(now - Duration::minutes(10))
        .active(false)
        .build()
        .await?;

    let repo = GiveawayRepository::new(db);
    let result = repo.get_overdue(now).await?;

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id, overdue.id);

    Ok(())
}

/// Tests that active giveaways are listed soonest ending first.
///
/// Expected: Ok with both active giveaways ordered by end time
#[tokio::test]
async fn lists_active_giveaways_by_end_time() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_giveaway_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let now = Utc::now();
    let later = GiveawayFactory::new(db)
        .end_time(now + Duration::hours(3))
        .build()
        .await?;
    let sooner = GiveawayFactory::new(db)
        .end_time(now + Duration::hours(1))
        .build()
        .await?;
    GiveawayFactory::new(db).active(false).build().await?;

    let repo = GiveawayRepository::new(db);
    let ids: Vec<i32> = repo.get_active().await?.iter().map(|g| g.id).collect();

    assert_eq!(ids, vec![sooner.id, later.id]);

    Ok(())
}
