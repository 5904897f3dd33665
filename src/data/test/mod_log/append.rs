use super::*;

/// Tests appending a mute with its duration and reason.
///
/// Expected: Ok with the entry readable through `query`
#[tokio::test]
async fn appends_entry_with_duration() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::ModLog)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = ModLogRepository::new(db);
    let id = repo
        .append(CreateModLogParam {
            user_id: 1,
            moderator_id: 2,
            action: ModAction::Mute,
            reason: Some("spam".to_string()),
            duration_ms: Some(600_000),
            guild_id: 3,
        })
        .await?;

    let entries = repo.query(1, 3).await?;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, id);
    assert_eq!(entries[0].action, "muted");
    assert_eq!(entries[0].moderator_id, 2);
    assert_eq!(entries[0].reason.as_deref(), Some("spam"));
    assert_eq!(entries[0].duration_ms, Some(600_000));

    Ok(())
}
