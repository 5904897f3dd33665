use serenity::all::{Context, Interaction};

use crate::{router::CommandRouter, state::AppState};

use super::component;

/// Routes an interaction to the command router or the component dispatcher.
pub async fn handle_interaction(
    state: &AppState,
    router: &CommandRouter,
    ctx: Context,
    interaction: Interaction,
) {
    match interaction {
        Interaction::Command(command) => router.dispatch(&ctx, &command, state).await,
        Interaction::Component(component) => {
            component::handle_component(state, &ctx, &component).await
        }
        _ => {}
    }
}
