//! Member join handling: auto-role first, then the anti-raid counter.

use chrono::Utc;
use serenity::all::{Context, CreateMessage, Member, RoleId};

use crate::{
    service::{
        anti_raid::{self, AntiRaidService, RaidVerdict},
        settings::SettingsService,
    },
    state::AppState,
};

/// Handles a member joining a guild.
///
/// Each step logs its own failure and the next step still runs.
pub async fn handle_guild_member_addition(state: &AppState, ctx: Context, member: Member) {
    let guild_id = member.guild_id;
    let settings = SettingsService::new(&state.db);

    match settings.get(guild_id).await {
        Ok(Some(guild_settings)) => {
            if let Some(role_id) = guild_settings.auto_role_id {
                match member
                    .add_role(&ctx.http, RoleId::new(role_id))
                    .await
                {
                    Ok(()) => tracing::info!(
                        "Auto-role assigned to {} in guild {}",
                        member.user.tag(),
                        guild_id
                    ),
                    Err(e) => tracing::error!(
                        "Failed to assign auto-role to {}: {:?}",
                        member.user.tag(),
                        e
                    ),
                }
            }
        }
        Ok(None) => {}
        Err(e) => tracing::error!("Failed to load settings for guild {}: {:?}", guild_id, e),
    }

    let verdict = match AntiRaidService::new(&state.db)
        .register_join(guild_id.get(), member.user.id.get(), Utc::now())
        .await
    {
        Ok(Some(verdict)) => verdict,
        Ok(None) => return,
        Err(e) => {
            tracing::error!("Failed to count join for anti-raid in guild {}: {:?}", guild_id, e);
            return;
        }
    };

    if verdict == RaidVerdict::Admit {
        return;
    }

    if let Err(e) = member
        .ban_with_reason(&ctx.http, 0, anti_raid::BAN_REASON)
        .await
    {
        tracing::error!(
            "Failed to ban member {} due to anti-raid: {:?}",
            member.user.tag(),
            e
        );
        return;
    }

    tracing::warn!(
        "Anti-raid banned {} from guild {}",
        member.user.tag(),
        guild_id
    );

    let log_channel = match settings.log_channel(guild_id, &state.config).await {
        Ok(channel) => channel,
        Err(e) => {
            tracing::error!("Failed to resolve log channel for guild {}: {:?}", guild_id, e);
            return;
        }
    };

    if let Err(e) = log_channel
        .send_message(
            &ctx.http,
            CreateMessage::new().embed(anti_raid::protection_card(&member.user)),
        )
        .await
    {
        tracing::error!("Failed to post anti-raid notice: {:?}", e);
    }
}
