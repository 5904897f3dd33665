use super::*;

/// Tests verifying a member for the first time.
///
/// Expected: Ok with the member verified and a verification time set
#[tokio::test]
async fn verifies_new_member() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::Verification)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = VerificationRepository::new(db);
    assert!(!repo.is_verified(1, 2).await?);

    let record = repo.mark_verified(1, 2).await?;

    assert!(record.verified);
    assert!(record.verified_at.is_some());
    assert!(repo.is_verified(1, 2).await?);
    assert!(!repo.is_verified(1, 3).await?);

    Ok(())
}

/// Tests verifying the same member twice.
///
/// Verifies that the upsert keeps a single record and preserves its creation time.
///
/// Expected: Ok with the original created_at
#[tokio::test]
async fn reverifying_keeps_original_record() -> Result<(), AppError> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::Verification)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = VerificationRepository::new(db);
    let first = repo.mark_verified(1, 2).await?;
    let second = repo.mark_verified(1, 2).await?;

    assert_eq!(second.created_at, first.created_at);
    assert!(second.verified);

    Ok(())
}
