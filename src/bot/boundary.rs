//! Error boundary: the last stop for every error raised by a command, a component
//! or a listener.
//!
//! Errors are classified by [`crate::core::boundary::classify`]; this module only
//! carries out the resulting [`Resolution`]. Nothing in here propagates: if sending a
//! response fails, the failure is logged and dropped.

use crate::bot::{BotData, Context, resources};
use crate::core::boundary::{EventCategory, LogLine, Resolution, Severity, classify};
use crate::core::command::CommandPath;
use crate::core::logs;
use crate::core::response::{ReplyKind, ResponseSlot};
use crate::errors::Error;
use chrono::Utc;
use poise::serenity_prelude as serenity;
use poise::{CreateReply, FrameworkError};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Framework-level error hook.
pub async fn on_error(error: FrameworkError<'_, BotData, Error>) {
    handle(error, true).await;
}

/// Handles one framework error.
///
/// `respect_hooks` is false when called from a command's own error hook, so the
/// error is not handed straight back to it.
pub async fn handle(error: FrameworkError<'_, BotData, Error>, respect_hooks: bool) {
    match error {
        FrameworkError::Setup { error, framework, .. } => {
            error!(critical = true, "Failed to start bot: {:?}", error);
            framework.shard_manager().shutdown_all().await;
        }
        FrameworkError::Command { error, ctx, .. } => {
            resolve_command(ctx, &error, respect_hooks).await;
        }
        FrameworkError::CommandCheckFailed { error, ctx, .. } => {
            let error = error.unwrap_or_else(|| Error::CheckFailed {
                reason: "command check returned false".to_string(),
            });
            resolve_command(ctx, &error, respect_hooks).await;
        }
        FrameworkError::CooldownHit {
            remaining_cooldown,
            ctx,
            ..
        } => {
            let error = Error::CommandOnCooldown {
                retry_after: remaining_cooldown,
            };
            resolve_command(ctx, &error, respect_hooks).await;
        }
        FrameworkError::MissingUserPermissions {
            missing_permissions,
            ctx,
            ..
        } => {
            let missing = missing_permissions
                .map(|permissions| {
                    permissions
                        .get_permission_names()
                        .into_iter()
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            resolve_command(ctx, &Error::MissingPermissions { missing }, respect_hooks).await;
        }
        FrameworkError::GuildOnly { ctx, .. } => {
            resolve_command(ctx, &Error::GuildOnly, respect_hooks).await;
        }
        FrameworkError::ArgumentParse {
            error, input, ctx, ..
        } => {
            let error = Error::InvalidArgument {
                name: input.unwrap_or_else(|| "input".to_string()),
                message: error.to_string(),
            };
            resolve_command(ctx, &error, respect_hooks).await;
        }
        FrameworkError::EventHandler {
            error,
            ctx,
            event,
            framework,
            ..
        } => {
            report_listener_error(ctx, framework.user_data, event.snake_case_name(), None, &error)
                .await;
        }
        FrameworkError::UnknownCommand { msg_content, .. } => {
            let error = Error::CommandNotFound {
                name: msg_content.to_string(),
            };
            execute_log_only(classify(
                EventCategory::LegacyCommand,
                None,
                false,
                &error,
                Utc::now(),
            ));
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

fn category(ctx: Context<'_>) -> EventCategory {
    match ctx {
        poise::Context::Application(_) => EventCategory::SlashCommand,
        poise::Context::Prefix(_) => EventCategory::LegacyCommand,
    }
}

async fn resolve_command(ctx: Context<'_>, error: &Error, respect_hooks: bool) {
    let path = CommandPath::parse(&ctx.command().qualified_name);
    let has_hook = respect_hooks
        && ctx
            .data()
            .dispatcher
            .resolve(&path)
            .is_ok_and(|descriptor| descriptor.has_error_hook);
    let name = path.to_string();
    let resolution = classify(category(ctx), Some(&name), has_hook, error, Utc::now());

    match resolution {
        Resolution::Delegated => debug!(command = %name, "Error handled by the command's own hook"),
        Resolution::Log(line) => emit(&line),
        Resolution::Reply(content) => send_ephemeral(ctx, content).await,
        Resolution::ReplyAndLog(content, line) => {
            emit(&line);
            send_ephemeral(ctx, content).await;
        }
    }
}

/// Sends an ephemeral reply to a command, logging instead of failing.
pub async fn send_ephemeral(ctx: Context<'_>, content: String) {
    let reply = CreateReply::default().content(content).ephemeral(true);
    if let Err(e) = ctx.send(reply).await {
        error!(command = %ctx.command().qualified_name, "Failed to send error response: {}", e);
    }
}

/// Sends the cooldown reply used by commands that handle their own cooldowns.
pub async fn send_cooldown(ctx: Context<'_>, retry_after: Duration) {
    let content = crate::core::boundary::cooldown_message(retry_after, Utc::now());
    send_ephemeral(ctx, content).await;
}

fn emit(line: &LogLine) {
    match line.severity {
        Severity::Warn => warn!("{}", line.message),
        Severity::Error => error!("{}", line.message),
        Severity::Critical => error!(critical = true, "{}", line.message),
    }
}

fn execute_log_only(resolution: Resolution) {
    match resolution {
        Resolution::Log(line) | Resolution::ReplyAndLog(_, line) => emit(&line),
        Resolution::Reply(_) | Resolution::Delegated => {}
    }
}

/// Replies to a component interaction through its response slot.
pub async fn reply_to_component(
    ctx: &serenity::Context,
    press: &serenity::ComponentInteraction,
    slot: &ResponseSlot,
    content: &str,
) -> crate::errors::Result<()> {
    match slot.claim() {
        ReplyKind::Initial => {
            let message = serenity::CreateInteractionResponseMessage::new()
                .content(content)
                .ephemeral(true);
            let response = serenity::CreateInteractionResponse::Message(message);
            if let Err(e) = press.create_response(ctx, response).await {
                slot.release();
                return Err(e.into());
            }
        }
        ReplyKind::FollowUp => {
            let followup = serenity::CreateInteractionResponseFollowup::new()
                .content(content)
                .ephemeral(true);
            press.create_followup(ctx, followup).await?;
        }
    }
    Ok(())
}

/// Handles an error raised by a persistent component.
pub async fn component_error(
    ctx: &serenity::Context,
    press: &serenity::ComponentInteraction,
    slot: &ResponseSlot,
    error: &Error,
) {
    let resolution = classify(
        EventCategory::Component,
        Some(&press.data.custom_id),
        false,
        error,
        Utc::now(),
    );
    let content = match resolution {
        Resolution::Delegated => return,
        Resolution::Log(line) => {
            emit(&line);
            return;
        }
        Resolution::Reply(content) => content,
        Resolution::ReplyAndLog(content, line) => {
            emit(&line);
            content
        }
    };
    if let Err(e) = reply_to_component(ctx, press, slot, &content).await {
        error!(custom_id = %press.data.custom_id, "Failed to send component error response: {}", e);
    }
}

/// Logs a listener failure and posts it to the bot-logs channel.
pub async fn report_listener_error(
    ctx: &serenity::Context,
    data: &BotData,
    event: &str,
    extension: Option<&str>,
    error: &Error,
) {
    error!(
        event,
        extension = extension.unwrap_or("-"),
        "Ignoring exception in listener: {:?}",
        error
    );
    let entry = logs::listener_error(event, &error.to_string());
    if let Err(e) = resources::post_log(ctx, data, &entry).await {
        error!(critical = true, "Failed to post listener error to bot logs: {}", e);
    }
}
