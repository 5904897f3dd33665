//! Button and select menu dispatch.
//!
//! Components are matched on their custom id. As with commands, a handler only
//! returns `Err`; the dispatcher turns it into an ephemeral card.

use chrono::Utc;
use serenity::all::{
    ComponentInteraction, ComponentInteractionDataKind, Context, CreateEmbed,
    CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, GuildChannel, GuildId, Mentionable, Permissions, User,
    UserId,
};

use crate::{
    error::AppError,
    middleware::permission::{has_any_permission, MemberAccess},
    service::{
        embed,
        giveaway::{GiveawayService, JoinOutcome, JOIN_BUTTON_ID},
        report,
        settings::{self, SettingsSection, SettingsService},
        ticket::{self, TicketService},
        verification::{VerificationService, VerifyOutcome, VERIFY_BUTTON_ID},
    },
    state::AppState,
    util::time::relative_time,
};

/// Handles a button press or select menu choice.
pub async fn handle_component(state: &AppState, ctx: &Context, component: &ComponentInteraction) {
    let custom_id = component.data.custom_id.as_str();

    let result = match custom_id {
        JOIN_BUTTON_ID => join_giveaway(state, ctx, component).await,
        VERIFY_BUTTON_ID => verify(state, ctx, component).await,
        ticket::CREATE_TICKET_ID => create_ticket(state, ctx, component).await,
        ticket::CLOSE_TICKET_ID => prompt_close(state, ctx, component).await,
        ticket::CONFIRM_CLOSE_ID => confirm_close(state, ctx, component).await,
        ticket::CANCEL_CLOSE_ID => {
            reply(
                ctx,
                component,
                embed::info("Ticket Close Cancelled", "The ticket will remain open."),
            )
            .await
        }
        ticket::CLAIM_TICKET_ID => claim_ticket(state, ctx, component).await,
        ticket::ADD_USER_ID => explain_member_change(state, ctx, component, true).await,
        ticket::REMOVE_USER_ID => explain_member_change(state, ctx, component, false).await,
        settings::SETTINGS_MENU_ID => show_settings_section(state, ctx, component).await,
        settings::BAN_ROLES_SELECT_ID => save_ban_roles(state, ctx, component).await,
        settings::LOG_CHANNEL_SELECT_ID => save_log_channel(state, ctx, component).await,
        // Nuke confirmations are consumed by the command's own collector.
        _ => return,
    };

    let Err(err) = result else {
        return;
    };

    if report::should_report(&err) {
        tracing::error!("Failed to handle component {}: {:?}", custom_id, err);
    }

    if let Err(e) = reply(ctx, component, report::user_facing_card(&err, Utc::now())).await {
        // The interaction was already answered; fall back to a follow-up.
        let followup = CreateInteractionResponseFollowup::new()
            .embed(report::user_facing_card(&err, Utc::now()))
            .ephemeral(true);
        if let Err(e2) = component.create_followup(&ctx.http, followup).await {
            tracing::error!(
                "Failed to report component error for {}: {:?} / {:?}",
                custom_id,
                e,
                e2
            );
        }
    }
}

async fn reply(
    ctx: &Context,
    component: &ComponentInteraction,
    card: CreateEmbed,
) -> Result<(), AppError> {
    component
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .embed(card)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

fn guild_id(component: &ComponentInteraction) -> Result<GuildId, AppError> {
    component.guild_id.ok_or_else(|| {
        AppError::BadRequest("This button can only be used in a server!".to_string())
    })
}

fn access(component: &ComponentInteraction) -> Result<MemberAccess, AppError> {
    component
        .member
        .as_ref()
        .map(MemberAccess::from_member)
        .ok_or_else(|| {
            AppError::BadRequest("This button can only be used in a server!".to_string())
        })
}

async fn current_ticket(
    ctx: &Context,
    component: &ComponentInteraction,
) -> Result<GuildChannel, AppError> {
    component
        .channel_id
        .to_channel(&ctx.http)
        .await?
        .guild()
        .filter(|channel| ticket::is_ticket_channel(&channel.name))
        .ok_or_else(|| {
            AppError::BadRequest("This button can only be used in ticket channels.".to_string())
        })
}

fn require_staff(state: &AppState, component: &ComponentInteraction, action: &str) -> Result<(), AppError> {
    if ticket::is_staff(&state.config, &access(component)?) {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(format!(
            "Only staff members can {}.",
            action
        )))
    }
}

fn require_admin(component: &ComponentInteraction) -> Result<(), AppError> {
    if has_any_permission(access(component)?.permissions, Permissions::ADMINISTRATOR) {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(
            "You do not have the required permissions to use this command.".to_string(),
        ))
    }
}

async fn join_giveaway(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
) -> Result<(), AppError> {
    let outcome = GiveawayService::new(&state.db, ctx.http.clone())
        .join(
            guild_id(component)?.get(),
            component.message.id.get(),
            component.user.id.get(),
            Utc::now(),
        )
        .await?;

    let card = match outcome {
        JoinOutcome::Joined {
            prize,
            end_time,
            participants,
        } => embed::success(
            "Joined Giveaway",
            format!(
                "You have successfully joined the giveaway for **{}**!",
                prize
            ),
        )
        .field("🎁 Prize", prize, true)
        .field("👥 Participants", participants.to_string(), true)
        .field("⏱️ Ends", relative_time(end_time), true),
        JoinOutcome::AlreadyJoined => {
            embed::warning("Already Joined", "You have already joined this giveaway!")
        }
        JoinOutcome::Ended => embed::error("Giveaway Ended", "This giveaway has already ended."),
        JoinOutcome::NotActive => embed::error(
            "Giveaway Not Found",
            "This giveaway is not active or has ended.",
        ),
    };

    reply(ctx, component, card).await
}

async fn verify(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
) -> Result<(), AppError> {
    let outcome = VerificationService::new(&state.db, ctx.http.clone())
        .verify(guild_id(component)?, component.user.id)
        .await?;

    let card = match outcome {
        VerifyOutcome::Verified { role_id } => embed::success(
            "Verification Successful",
            "You have been successfully verified! Welcome to the server!",
        )
        .field("🎭 Role Assigned", role_id.mention().to_string(), true)
        .field("✅ Status", "Verified", true),
        VerifyOutcome::AlreadyVerified => {
            embed::warning("Already Verified", "You are already verified on this server!")
        }
        VerifyOutcome::NotConfigured => embed::error(
            "Verification Not Set Up",
            "The verification system is not configured for this server.",
        ),
    };

    reply(ctx, component, card).await
}

async fn create_ticket(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
) -> Result<(), AppError> {
    let channel = TicketService::new(&state.db, ctx.http.clone(), &state.config)
        .open(guild_id(component)?, &component.user)
        .await?;

    reply(
        ctx,
        component,
        embed::success(
            "Ticket Created",
            format!("Your support ticket has been created: {}", channel.mention()),
        )
        .field("📋 Ticket ID", ticket::short_id(channel.id), true)
        .field("📍 Channel", channel.mention().to_string(), true),
    )
    .await
}

async fn prompt_close(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
) -> Result<(), AppError> {
    let channel = current_ticket(ctx, component).await?;

    if !ticket::is_opener(&channel, &component.user)
        && !ticket::is_staff(&state.config, &access(component)?)
    {
        return Err(AppError::PermissionDenied(
            "Only the ticket owner or staff can close this ticket.".to_string(),
        ));
    }

    let (card, row) = ticket::close_prompt(channel.id, &component.user);
    component
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .embed(card)
                    .components(vec![row])
                    .ephemeral(true),
            ),
        )
        .await?;

    Ok(())
}

async fn confirm_close(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
) -> Result<(), AppError> {
    let channel = current_ticket(ctx, component).await?;

    component
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content("✅ Ticket closed successfully! This channel will be deleted in 5 seconds.")
                    .ephemeral(true),
            ),
        )
        .await?;

    TicketService::new(&state.db, ctx.http.clone(), &state.config)
        .close(&channel, &component.user)
        .await
}

/// Opener of the ticket whose intro message carries the pressed button.
///
/// The intro message mentions the opener first; the channel topic holds their id
/// as a fallback.
async fn ticket_opener(
    ctx: &Context,
    component: &ComponentInteraction,
    channel: &GuildChannel,
) -> Result<User, AppError> {
    if let Some(opener) = component.message.mentions.first() {
        return Ok(opener.clone());
    }

    let opener_id = channel
        .topic
        .as_deref()
        .and_then(|topic| topic.parse::<u64>().ok())
        .ok_or_else(|| AppError::NotFound("Could not find who opened this ticket.".to_string()))?;

    Ok(UserId::new(opener_id).to_user(&ctx.http).await?)
}

async fn claim_ticket(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
) -> Result<(), AppError> {
    let channel = current_ticket(ctx, component).await?;
    require_staff(state, component, "claim tickets")?;

    let opener = ticket_opener(ctx, component, &channel).await?;

    component
        .create_response(
            &ctx.http,
            CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new().embed(ticket::claimed_card(
                    channel.id,
                    &opener,
                    &component.user,
                )),
            ),
        )
        .await?;

    component
        .create_followup(
            &ctx.http,
            CreateInteractionResponseFollowup::new().embed(embed::success(
                "Ticket Claimed",
                format!("{} has claimed this ticket.", component.user.tag()),
            )),
        )
        .await?;

    tracing::info!("Ticket {} claimed by {}", channel.id, component.user.tag());

    Ok(())
}

async fn explain_member_change(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
    adding: bool,
) -> Result<(), AppError> {
    current_ticket(ctx, component).await?;

    let card = if adding {
        require_staff(state, component, "add users to tickets")?;
        embed::info(
            "Add User to Ticket",
            "Please mention the user you want to add to this ticket.\nExample: `/ticket add @username`",
        )
    } else {
        require_staff(state, component, "remove users from tickets")?;
        embed::info(
            "Remove User from Ticket",
            "Please mention the user you want to remove from this ticket.\nExample: `/ticket remove @username`",
        )
    };

    reply(ctx, component, card).await
}

async fn show_settings_section(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
) -> Result<(), AppError> {
    require_admin(component)?;

    let ComponentInteractionDataKind::StringSelect { values } = &component.data.kind else {
        return Ok(());
    };
    let section = values
        .first()
        .and_then(|value| SettingsSection::parse(value))
        .ok_or_else(|| AppError::BadRequest("Unknown settings section.".to_string()))?;

    let current = SettingsService::new(&state.db)
        .get(guild_id(component)?)
        .await?;
    let (card, rows) = settings::section_detail(section, current.as_ref());

    component
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .embed(card)
                    .components(rows)
                    .ephemeral(true),
            ),
        )
        .await?;

    Ok(())
}

async fn save_ban_roles(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
) -> Result<(), AppError> {
    require_admin(component)?;

    let ComponentInteractionDataKind::RoleSelect { values } = &component.data.kind else {
        return Ok(());
    };

    let updated = SettingsService::new(&state.db)
        .set_ban_roles(guild_id(component)?, values)
        .await?;

    let roles = if updated.ban_roles.is_empty() {
        "None set".to_string()
    } else {
        updated
            .ban_roles
            .iter()
            .map(|id| format!("<@&{}>", id))
            .collect::<Vec<_>>()
            .join(", ")
    };

    reply(
        ctx,
        component,
        embed::success("Ban Roles Updated", "Members with these roles may use `/ban`.")
            .field("Current Ban Roles", roles, false),
    )
    .await
}

async fn save_log_channel(
    state: &AppState,
    ctx: &Context,
    component: &ComponentInteraction,
) -> Result<(), AppError> {
    require_admin(component)?;

    let ComponentInteractionDataKind::ChannelSelect { values } = &component.data.kind else {
        return Ok(());
    };
    let channel = values.first().copied();

    SettingsService::new(&state.db)
        .set_log_channel(guild_id(component)?, channel)
        .await?;

    let current = channel
        .map(|id| id.mention().to_string())
        .unwrap_or_else(|| "Not set".to_string());

    reply(
        ctx,
        component,
        embed::success("Log Channel Updated", "Bot logs will be posted here.")
            .field("Current Log Channel", current, false),
    )
    .await
}
