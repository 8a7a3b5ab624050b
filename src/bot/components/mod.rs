//! Persistent interactive components.
//!
//! Components are registered by extensions as recipes keyed by a stable custom id.
//! The event router builds a fresh view for every press, so presses on messages sent
//! before a restart keep working.

/// The rules "I Accept" button
pub mod rules;

use crate::bot::BotData;
use crate::core::response::ResponseSlot;
use crate::errors::Result;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;

/// A view handling presses for one custom id.
#[async_trait]
pub trait PersistentView: Send + Sync {
    /// Runs before [`PersistentView::callback`]; returning `false` stops the press.
    async fn interaction_check(
        &self,
        _ctx: &serenity::Context,
        _data: &BotData,
        _press: &serenity::ComponentInteraction,
        _slot: &ResponseSlot,
    ) -> Result<bool> {
        Ok(true)
    }

    /// Handles an accepted press.
    async fn callback(
        &self,
        ctx: &serenity::Context,
        data: &BotData,
        press: &serenity::ComponentInteraction,
        slot: &ResponseSlot,
    ) -> Result<()>;
}
