//! Gateway event routing.
//!
//! Every event poise forwards ends up here. Ready events are handled directly,
//! component presses go to the persistent component registry and everything else is
//! fanned out to the listeners registered for the event's kind. A failing listener is
//! reported on its own and never stops the others.

use crate::bot::components::PersistentView;
use crate::bot::{BotData, boundary};
use crate::core::registry::EventKind;
use crate::core::response::ResponseSlot;
use crate::errors::{Error, Result};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use tracing::{debug, error, info, trace};

/// A listener subscribed to one or more event kinds.
#[async_trait]
pub trait EventListener: Send + Sync {
    async fn handle(
        &self,
        ctx: &serenity::Context,
        event: &serenity::FullEvent,
        data: &BotData,
    ) -> Result<()>;
}

/// The listener kind an event is delivered to, if any.
#[must_use]
pub fn event_kind(event: &serenity::FullEvent) -> Option<EventKind> {
    match event {
        serenity::FullEvent::Ready { .. } => Some(EventKind::Ready),
        serenity::FullEvent::GuildMemberAddition { .. } => Some(EventKind::MemberJoin),
        serenity::FullEvent::GuildMemberRemoval { .. } => Some(EventKind::MemberLeave),
        serenity::FullEvent::Message { .. } => Some(EventKind::Message),
        serenity::FullEvent::MessageUpdate { .. } => Some(EventKind::MessageEdit),
        serenity::FullEvent::MessageDelete { .. } => Some(EventKind::MessageDelete),
        _ => None,
    }
}

/// poise event handler.
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, BotData, Error>,
    data: &BotData,
) -> Result<()> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => on_ready(data, data_about_bot),
        serenity::FullEvent::InteractionCreate {
            interaction: serenity::Interaction::Component(press),
        } => route_component(ctx, data, press).await,
        _ => {}
    }

    let Some(kind) = event_kind(event) else {
        return Ok(());
    };
    for (extension, listener) in data.listeners.for_kind(kind) {
        trace!(%kind, extension, "Dispatching event to listener");
        if let Err(e) = listener.handle(ctx, event, data).await {
            boundary::report_listener_error(ctx, data, event.snake_case_name(), Some(extension), &e)
                .await;
        }
    }
    Ok(())
}

fn on_ready(data: &BotData, ready: &serenity::Ready) {
    if data.mark_ready() {
        info!("Bot logged in as {}", ready.user.tag());
    } else {
        error!(critical = true, "Bot reconnected to Discord gateway");
    }
}

/// Routes a component press by custom id; unknown ids are ignored.
async fn route_component(
    ctx: &serenity::Context,
    data: &BotData,
    press: &serenity::ComponentInteraction,
) {
    let custom_id = press.data.custom_id.as_str();
    let Some(view) = data.components.resolve(custom_id) else {
        debug!(custom_id, "No persistent component registered");
        return;
    };

    let slot = ResponseSlot::new();
    if let Err(e) = run_view(view.as_ref(), ctx, data, press, &slot).await {
        boundary::component_error(ctx, press, &slot, &e).await;
    }
}

async fn run_view(
    view: &dyn PersistentView,
    ctx: &serenity::Context,
    data: &BotData,
    press: &serenity::ComponentInteraction,
    slot: &ResponseSlot,
) -> Result<()> {
    if view.interaction_check(ctx, data, press, slot).await? {
        view.callback(ctx, data, press, slot).await?;
    }
    Ok(())
}
