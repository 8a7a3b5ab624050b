//! Configured role/channel lookups and conversions from serenity models.
//!
//! A placeholder id or an id that no longer exists on the server becomes
//! [`Error::ResourceNotFound`], which the boundary reports as admin-actionable.

use crate::bot::BotData;
use crate::config::Snowflake;
use crate::core::logs::{LogEntry, MemberEvent};
use crate::core::members::{MemberInfo, MemberSummary, Subject, UserInfo};
use crate::core::message_cache::{CachedAttachment, CachedMessage, CachedReply};
use crate::errors::{Error, Result};
use poise::serenity_prelude as serenity;
use tracing::error;

/// Brand colour used by informational embeds.
pub const YELLOW: u32 = 0xF1_C4_0F;

/// A configured role id, without checking the server.
pub fn role_id(id: Snowflake, name: &str) -> Result<serenity::RoleId> {
    id.get()
        .map(|id| serenity::RoleId::new(id.get()))
        .ok_or_else(|| Error::missing_role(name))
}

/// A configured channel id, without checking the server.
pub fn channel_id(id: Snowflake, name: &str) -> Result<serenity::ChannelId> {
    id.get()
        .map(|id| serenity::ChannelId::new(id.get()))
        .ok_or_else(|| Error::missing_channel(name))
}

/// A configured role that also exists in the cached guild.
pub fn guild_role(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
    id: Snowflake,
    name: &str,
) -> Result<serenity::RoleId> {
    let role = role_id(id, name)?;
    let exists = ctx
        .cache
        .guild(guild_id)
        .is_some_and(|guild| guild.roles.contains_key(&role));
    if exists {
        Ok(role)
    } else {
        Err(Error::missing_role(name))
    }
}

/// A configured channel that also exists in the cached guild.
pub fn guild_channel(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
    id: Snowflake,
    name: &str,
) -> Result<serenity::ChannelId> {
    let channel = channel_id(id, name)?;
    let exists = ctx
        .cache
        .guild(guild_id)
        .is_some_and(|guild| guild.channels.contains_key(&channel));
    if exists {
        Ok(channel)
    } else {
        Err(Error::missing_channel(name))
    }
}

#[must_use]
pub fn to_embed(entry: &LogEntry) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title(&entry.title)
        .description(&entry.description)
        .colour(entry.colour)
        .fields(entry.fields.clone());
    if let Some(thumbnail) = &entry.thumbnail {
        embed = embed.thumbnail(thumbnail);
    }
    if let Some(image) = &entry.image {
        embed = embed.image(image);
    }
    if let Some(footer) = &entry.footer {
        embed = embed.footer(serenity::CreateEmbedFooter::new(footer));
    }
    embed
}

/// Posts an entry to the bot-logs channel.
pub async fn post_log(ctx: &serenity::Context, data: &BotData, entry: &LogEntry) -> Result<()> {
    let channel = channel_id(data.settings.channels.bot_logs, "bot-logs")
        .inspect_err(|_| error!(critical = true, "Failed to get bot logs channel for logging"))?;
    channel
        .send_message(ctx, serenity::CreateMessage::new().embed(to_embed(entry)))
        .await?;
    Ok(())
}

#[must_use]
pub fn member_summary(member: &serenity::Member) -> MemberSummary {
    MemberSummary {
        id: member.user.id.get(),
        username: member.user.name.clone(),
        display_name: member.display_name().to_string(),
        nick: member.nick.clone(),
        roles: member.roles.iter().map(|role| role.get()).collect(),
    }
}

/// Every member of a guild, from the cache when it is populated, otherwise paged over HTTP.
pub async fn guild_members(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
) -> Result<Vec<MemberSummary>> {
    let cached: Option<Vec<MemberSummary>> = ctx.cache.guild(guild_id).and_then(|guild| {
        let complete = u64::try_from(guild.members.len()).ok() == Some(guild.member_count);
        complete.then(|| guild.members.values().map(member_summary).collect())
    });
    if let Some(members) = cached {
        return Ok(members);
    }

    let mut members = Vec::new();
    let mut after = None;
    loop {
        let page = guild_id.members(ctx, Some(1000), after).await?;
        let last = page.last().map(|member| member.user.id);
        members.extend(page.iter().map(member_summary));
        match last {
            Some(id) if page.len() == 1000 => after = Some(id),
            _ => break,
        }
    }
    Ok(members)
}

#[must_use]
pub fn user_info(user: &serenity::User) -> UserInfo {
    UserInfo {
        id: user.id.get(),
        tag: user.tag(),
        avatar_url: user.face(),
        created_at: user.id.created_at().unix_timestamp(),
    }
}

/// Resolves a `/whois` target: a member when they are in the guild, otherwise a plain user.
pub async fn subject(
    ctx: &serenity::Context,
    guild_id: Option<serenity::GuildId>,
    user: &serenity::User,
) -> Subject {
    let Some(guild_id) = guild_id else {
        return Subject::User(user_info(user));
    };
    let Ok(member) = guild_id.member(ctx, user.id).await else {
        return Subject::User(user_info(user));
    };
    let status = ctx.cache.guild(guild_id).and_then(|guild| {
        guild
            .presences
            .get(&user.id)
            .map(|presence| presence.status.name().to_string())
    });
    Subject::Member(MemberInfo {
        user: user_info(user),
        nick: member.nick.clone(),
        status,
        joined_at: member.joined_at.map(|joined| joined.unix_timestamp()),
        role_mentions: member
            .roles
            .iter()
            .map(|role| format!("<@&{}>", role.get()))
            .collect(),
    })
}

#[must_use]
pub fn member_event(user: &serenity::User, member: Option<&serenity::Member>) -> MemberEvent {
    MemberEvent {
        id: user.id.get(),
        username: user.name.clone(),
        display_name: member.map_or_else(
            || user.display_name().to_string(),
            |member| member.display_name().to_string(),
        ),
        avatar_url: member.map_or_else(|| user.face(), serenity::Member::face),
        created_at: user.id.created_at().unix_timestamp(),
        joined_at: member
            .and_then(|member| member.joined_at)
            .map(|joined| joined.unix_timestamp()),
    }
}

/// Snapshot of a guild message for the recent-message cache.
#[must_use]
pub fn cached_message(message: &serenity::Message) -> Option<CachedMessage> {
    let guild_id = message.guild_id?;
    Some(CachedMessage {
        id: message.id.get(),
        guild_id: guild_id.get(),
        channel_id: message.channel_id.get(),
        author_id: message.author.id.get(),
        author_tag: message.author.tag(),
        content: message.content.clone(),
        embeds: message.embeds.len(),
        attachments: message
            .attachments
            .iter()
            .map(|attachment| CachedAttachment {
                filename: attachment.filename.clone(),
                url: attachment.url.clone(),
            })
            .collect(),
        reply_to: message.referenced_message.as_ref().map(|reply| CachedReply {
            author_tag: reply.author.tag(),
            content: reply.content.clone(),
        }),
    })
}
