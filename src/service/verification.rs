//! Button-driven member verification.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serenity::{
    all::{
        ButtonStyle, ChannelId, CreateActionRow, CreateButton, CreateEmbed, CreateEmbedFooter,
        CreateMessage, GuildId, RoleId, UserId,
    },
    http::Http,
};

use crate::{
    data::{guild_settings::GuildSettingsRepository, verification::VerificationRepository},
    error::AppError,
    service::settings::SettingsService,
};

pub const VERIFY_BUTTON_ID: &str = "verify_button";

/// Verification card and button posted by `/verify setup`.
pub fn panel() -> (CreateEmbed, CreateActionRow) {
    let card = CreateEmbed::new()
        .title("✅ Server Verification")
        .description("Click the button below to verify yourself and gain access to the server!")
        .color(0x51cf66)
        .footer(CreateEmbedFooter::new(
            "This server requires verification to participate",
        ));

    let button = CreateButton::new(VERIFY_BUTTON_ID)
        .label("Verify")
        .emoji('✅')
        .style(ButtonStyle::Success);

    (card, CreateActionRow::Buttons(vec![button]))
}

/// Result of pressing the verify button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified { role_id: RoleId },
    AlreadyVerified,
    NotConfigured,
}

pub struct VerificationService<'a> {
    db: &'a DatabaseConnection,
    http: Arc<Http>,
}

impl<'a> VerificationService<'a> {
    pub fn new(db: &'a DatabaseConnection, http: Arc<Http>) -> Self {
        Self { db, http }
    }

    /// Posts the verification panel and stores the channel and role.
    pub async fn setup(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        role_id: RoleId,
    ) -> Result<(), AppError> {
        let (card, row) = panel();
        channel_id
            .send_message(
                &self.http,
                CreateMessage::new().embed(card).components(vec![row]),
            )
            .await?;

        SettingsService::new(self.db)
            .set_verification(guild_id, Some((channel_id, role_id)))
            .await?;

        Ok(())
    }

    /// Checks whether a member still needs verifying.
    ///
    /// # Returns
    /// - `Ok(Ok(role_id))` - Role to grant
    /// - `Ok(Err(outcome))` - Nothing to do: not configured or already verified
    pub async fn pending_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> Result<Result<RoleId, VerifyOutcome>, AppError> {
        let settings = GuildSettingsRepository::new(self.db)
            .get(guild_id.get())
            .await?;
        let Some(role_id) = settings.and_then(|settings| settings.verify_role_id) else {
            return Ok(Err(VerifyOutcome::NotConfigured));
        };

        if VerificationRepository::new(self.db)
            .is_verified(user_id.get(), guild_id.get())
            .await?
        {
            return Ok(Err(VerifyOutcome::AlreadyVerified));
        }

        Ok(Ok(RoleId::new(role_id)))
    }

    /// Grants the verification role and records the member as verified.
    ///
    /// # Returns
    /// - `Ok(VerifyOutcome)` - What happened
    /// - `Err(AppError::BadRequest)` - The role could not be granted
    pub async fn verify(&self, guild_id: GuildId, user_id: UserId) -> Result<VerifyOutcome, AppError> {
        let role_id = match self.pending_role(guild_id, user_id).await? {
            Ok(role_id) => role_id,
            Err(outcome) => return Ok(outcome),
        };

        if let Err(e) = self
            .http
            .add_member_role(guild_id, user_id, role_id, Some("User verification"))
            .await
        {
            tracing::error!(
                "Failed to assign verification role {} in guild {}: {}",
                role_id,
                guild_id,
                e
            );
            return Err(AppError::BadRequest(
                "Failed to assign the verification role. Please contact an administrator."
                    .to_string(),
            ));
        }

        VerificationRepository::new(self.db)
            .mark_verified(user_id.get(), guild_id.get())
            .await?;

        tracing::info!("Verified user {} in guild {}", user_id, guild_id);

        Ok(VerifyOutcome::Verified { role_id })
    }
}

#[cfg(test)]
mod tests {
    use test_utils::builder::TestBuilder;

    use super::*;

    fn service(db: &DatabaseConnection) -> VerificationService<'_> {
        VerificationService::new(db, Arc::new(Http::new("test-token")))
    }

    /// Tests pressing verify in a guild without verification.
    ///
    /// Expected: NotConfigured, no Discord call
    #[tokio::test]
    async fn unconfigured_guild_is_reported() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildSettings)
            .with_table(entity::prelude::Verification)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let outcome = service(db).verify(GuildId::new(1), UserId::new(2)).await?;

        assert_eq!(outcome, VerifyOutcome::NotConfigured);

        Ok(())
    }

    /// Tests pressing verify a second time.
    ///
    /// Expected: AlreadyVerified, no Discord call
    #[tokio::test]
    async fn verified_member_is_not_verified_again() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::GuildSettings)
            .with_table(entity::prelude::Verification)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let guild_id = GuildId::new(1);

        SettingsService::new(db)
            .set_verification(guild_id, Some((ChannelId::new(10), RoleId::new(20))))
            .await?;
        VerificationRepository::new(db).mark_verified(2, 1).await?;

        let outcome = service(db).verify(guild_id, UserId::new(2)).await?;
        assert_eq!(outcome, VerifyOutcome::AlreadyVerified);

        assert_eq!(
            service(db).pending_role(guild_id, UserId::new(3)).await?,
            Ok(RoleId::new(20))
        );

        Ok(())
    }
}
