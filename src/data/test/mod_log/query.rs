use super::*;

/// Tests that history is returned newest first and scoped to user and guild.
///
/// Verifies that entries for another user or another guild are excluded.
///
/// Expected: Ok with the two matching entries, newest first
#[tokio::test]
async fn returns_newest_first_for_user_in_guild() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::ModLog)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let now = Utc::now();
    let older = create_mod_log(db, 1, 10, "warned", now - Duration::days(2)).await?;
    let newer = create_mod_log(db, 1, 10, "kicked", now - Duration::hours(1)).await?;
    create_mod_log(db, 2, 10, "banned", now).await?;
    create_mod_log(db, 1, 11, "banned", now).await?;

    let repo = ModLogRepository::new(db);
    let entries = repo.query(1, 10).await?;

    let ids: Vec<i32> = entries.iter().map(|entry| entry.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);

    Ok(())
}

/// Tests querying a user without history.
///
/// Expected: Ok with an empty list
#[tokio::test]
async fn returns_empty_history() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::ModLog)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = ModLogRepository::new(db);
    assert!(repo.query(1, 10).await?.is_empty());

    Ok(())
}
