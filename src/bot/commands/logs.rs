//! Logs extension - audit entries for member and message events.
//!
//! Delete and edit events carry no message body, so every guild message is recorded
//! in the bounded recent-message cache and looked up from there.

use crate::bot::events::EventListener;
use crate::bot::{BotData, Discord, resources};
use crate::core::logs::{self, LogEntry};
use crate::core::message_cache::CachedMessage;
use crate::core::registry::{EventKind, Extension, ExtensionContext};
use crate::errors::Result;
use async_trait::async_trait;
use chrono::Utc;
use poise::serenity_prelude as serenity;
use tracing::debug;

/// Audit logging.
pub struct Logs;

impl Extension<Discord> for Logs {
    fn name(&self) -> &'static str {
        "logs"
    }

    fn setup(&self, ext: &mut ExtensionContext<'_, Discord>) -> Result<()> {
        ext.listen(EventKind::Message, Box::new(RecordMessage));
        ext.listen(EventKind::MemberJoin, Box::new(LogJoin));
        ext.listen(EventKind::MemberLeave, Box::new(LogLeave));
        ext.listen(EventKind::MessageDelete, Box::new(LogDelete));
        ext.listen(EventKind::MessageEdit, Box::new(LogEdit));
        Ok(())
    }
}

fn now() -> i64 {
    Utc::now().timestamp()
}

/// Keeps guild messages in the recent-message cache.
pub struct RecordMessage;

#[async_trait]
impl EventListener for RecordMessage {
    async fn handle(
        &self,
        _ctx: &serenity::Context,
        event: &serenity::FullEvent,
        data: &BotData,
    ) -> Result<()> {
        if let serenity::FullEvent::Message { new_message } = event
            && let Some(cached) = resources::cached_message(new_message)
        {
            data.recent_messages.insert(cached);
        }
        Ok(())
    }
}

pub struct LogJoin;

#[async_trait]
impl EventListener for LogJoin {
    async fn handle(
        &self,
        ctx: &serenity::Context,
        event: &serenity::FullEvent,
        data: &BotData,
    ) -> Result<()> {
        let serenity::FullEvent::GuildMemberAddition { new_member } = event else {
            return Ok(());
        };
        let member = resources::member_event(&new_member.user, Some(new_member));
        resources::post_log(ctx, data, &logs::member_joined(&member, now())).await
    }
}

pub struct LogLeave;

#[async_trait]
impl EventListener for LogLeave {
    async fn handle(
        &self,
        ctx: &serenity::Context,
        event: &serenity::FullEvent,
        data: &BotData,
    ) -> Result<()> {
        let serenity::FullEvent::GuildMemberRemoval {
            user,
            member_data_if_available,
            ..
        } = event
        else {
            return Ok(());
        };
        let member = resources::member_event(user, member_data_if_available.as_ref());
        resources::post_log(ctx, data, &logs::member_left(&member, now())).await
    }
}

pub struct LogDelete;

#[async_trait]
impl EventListener for LogDelete {
    async fn handle(
        &self,
        ctx: &serenity::Context,
        event: &serenity::FullEvent,
        data: &BotData,
    ) -> Result<()> {
        let serenity::FullEvent::MessageDelete {
            deleted_message_id, ..
        } = event
        else {
            return Ok(());
        };
        let Some(message) = data.recent_messages.remove(deleted_message_id.get()) else {
            debug!(message = %deleted_message_id, "Deleted message was not cached");
            return Ok(());
        };
        resources::post_log(ctx, data, &logs::message_changed(&message, None, now())).await
    }
}

pub struct LogEdit;

impl LogEdit {
    /// Before/after snapshots for an edit, `None` when nothing worth logging changed.
    fn snapshots(
        data: &BotData,
        old: Option<&serenity::Message>,
        update: &serenity::MessageUpdateEvent,
    ) -> Option<(CachedMessage, CachedMessage)> {
        let content = update.content.as_deref()?;
        let before = data
            .recent_messages
            .update_content(update.id.get(), content)
            .or_else(|| old.and_then(resources::cached_message))?;
        if before.content == content {
            return None;
        }
        let after = CachedMessage {
            content: content.to_string(),
            ..before.clone()
        };
        Some((before, after))
    }
}

#[async_trait]
impl EventListener for LogEdit {
    async fn handle(
        &self,
        ctx: &serenity::Context,
        event: &serenity::FullEvent,
        data: &BotData,
    ) -> Result<()> {
        let serenity::FullEvent::MessageUpdate {
            old_if_available,
            event: update,
            ..
        } = event
        else {
            return Ok(());
        };
        let Some((before, after)) = Self::snapshots(data, old_if_available.as_ref(), update) else {
            debug!(message = %update.id, "Ignoring edit without a content change");
            return Ok(());
        };
        let entry: LogEntry = logs::message_changed(&after, Some(&before), now());
        resources::post_log(ctx, data, &entry).await
    }
}
