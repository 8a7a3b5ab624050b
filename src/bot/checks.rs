//! Framework-wide command check.
//!
//! poise calls this before every command body. It converts the poise context into an
//! [`Invocation`] and lets the dispatcher evaluate the descriptor's guards, so
//! guild-only, permission and cooldown rules are owned by the crate and not by poise.

use crate::bot::Context;
use crate::core::command::{CommandPath, Invocation, OptionValue};
use crate::errors::Result;
use poise::serenity_prelude as serenity;
use tracing::trace;

/// Runs the dispatcher guards for the invoked command.
///
/// Returns `Ok(true)` when the command may run; guard failures are returned as
/// errors and reach the error boundary as `CommandCheckFailed`.
pub async fn command_check(ctx: Context<'_>) -> Result<bool> {
    let invocation = invocation(ctx).await;
    trace!(command = %invocation.command, user = invocation.user_id, "Checking invocation");
    ctx.data().dispatcher.authorize(&invocation)?;
    Ok(true)
}

/// Builds the framework-independent view of an invocation.
pub async fn invocation(ctx: Context<'_>) -> Invocation {
    let command = CommandPath::parse(&ctx.command().qualified_name);
    let mut invocation = Invocation::new(command, ctx.author().id.get(), ctx.channel_id().get());
    if let Some(guild_id) = ctx.guild_id() {
        invocation = invocation.in_guild(guild_id.get());
    }

    match ctx {
        poise::Context::Application(actx) => {
            if let Some(permissions) = actx
                .interaction
                .member
                .as_ref()
                .and_then(|member| member.permissions)
            {
                invocation = invocation.with_permissions(permissions);
            }
            for option in actx.args {
                if let Some(value) = option_value(&option.value) {
                    invocation = invocation.with_option(option.name, value);
                }
            }
        }
        poise::Context::Prefix(_) => {
            if let Some(permissions) = prefix_permissions(ctx).await {
                invocation = invocation.with_permissions(permissions);
            }
        }
    }

    invocation
}

fn option_value(value: &serenity::ResolvedValue<'_>) -> Option<OptionValue> {
    use serenity::ResolvedValue;

    let value = match value {
        ResolvedValue::String(text) => OptionValue::String((*text).to_string()),
        ResolvedValue::Integer(number) => OptionValue::Integer(*number),
        ResolvedValue::Number(number) => OptionValue::Number(*number),
        ResolvedValue::Boolean(flag) => OptionValue::Boolean(*flag),
        ResolvedValue::User(user, _) => OptionValue::Id(user.id.get()),
        ResolvedValue::Role(role) => OptionValue::Id(role.id.get()),
        ResolvedValue::Channel(channel) => OptionValue::Id(channel.id.get()),
        ResolvedValue::Attachment(attachment) => OptionValue::Id(attachment.id.get()),
        _ => return None,
    };
    Some(value)
}

/// Channel permissions of the author of a legacy command, from the cache.
async fn prefix_permissions(ctx: Context<'_>) -> Option<serenity::Permissions> {
    let member = ctx.author_member().await?;
    let guild = ctx.guild()?;
    let channel = guild.channels.get(&ctx.channel_id())?;
    Some(guild.user_permissions_in(channel, &member))
}
