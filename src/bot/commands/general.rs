//! General Discord commands - help, profiles, links and member statistics.
//! This module also owns the welcome listener that greets new members.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, resources},
        config::settings::NamedRole,
        core::members::{self, RoleCount},
        errors::{Error, Result},
    };
    use poise::{CreateReply, serenity_prelude as serenity};

    const LOGO_URL: &str = "https://i.imgur.com/NhVjX8S.png";

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: Context<'_>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Lists every general command with its description.
    #[poise::command(slash_command)]
    pub async fn help(ctx: Context<'_>) -> Result<()> {
        let fields = ctx
            .data()
            .dispatcher
            .descriptors()
            .filter(|descriptor| descriptor.extension == super::EXTENSION)
            .map(|descriptor| {
                (
                    format!("/{}", descriptor.path),
                    format!("```{}```", descriptor.description),
                    false,
                )
            })
            .collect::<Vec<_>>();

        let embed = serenity::CreateEmbed::new()
            .title("General Commands")
            .description("*This dialog gives you all the general commands for DevBot.*")
            .colour(resources::YELLOW)
            .fields(fields);
        ctx.send(CreateReply::default().embed(embed).ephemeral(true))
            .await?;
        Ok(())
    }

    /// Shows a profile of a user or member.
    #[poise::command(slash_command)]
    pub async fn whois(
        ctx: Context<'_>,
        #[description = "User to look up, yourself by default"] user: Option<serenity::User>,
    ) -> Result<()> {
        ctx.defer().await?;
        let user = user.unwrap_or_else(|| ctx.author().clone());
        let subject = resources::subject(ctx.serenity_context(), ctx.guild_id(), &user).await;
        let info = subject.user();

        let embed = serenity::CreateEmbed::new()
            .colour(resources::YELLOW)
            .author(
                serenity::CreateEmbedAuthor::new(&info.tag)
                    .icon_url(&info.avatar_url)
                    .url(format!("https://discord.com/users/{}", info.id)),
            )
            .thumbnail(&info.avatar_url)
            .fields(
                subject
                    .fields()
                    .into_iter()
                    .map(|field| (field.name, field.value, field.inline)),
            )
            .footer(serenity::CreateEmbedFooter::new(format!("ID: {}", info.id)));

        ctx.send(CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Links the bot's source code.
    #[poise::command(slash_command)]
    pub async fn source(ctx: Context<'_>) -> Result<()> {
        let embed = serenity::CreateEmbed::new()
            .title("Here is a link to the bot's source code")
            .url("https://github.com/NTUDevSoc/Discord-Bot")
            .colour(resources::YELLOW)
            .author(
                serenity::CreateEmbedAuthor::new("Discord Bot Source Code")
                    .icon_url(LOGO_URL)
                    .url("https://github.com/NTUDevSoc"),
            );
        ctx.send(CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Links the society's social media pages.
    #[poise::command(slash_command)]
    pub async fn socials(ctx: Context<'_>) -> Result<()> {
        let embed = serenity::CreateEmbed::new()
            .title("DevSoc Social Links")
            .description("Here are all the links to official DevSoc Social Media pages")
            .colour(resources::YELLOW)
            .thumbnail(LOGO_URL)
            .field("Twitter", "https://twitter.com/devsoc", false)
            .field("Facebook", "https://facebook.com/devsoc", false)
            .field("Instagram", "https://instagram.com/ntudevsoc", false);
        ctx.send(CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Member counts for groups of roles.
    #[poise::command(slash_command, subcommands("year_groups", "courses"), subcommand_required)]
    pub async fn members(_ctx: Context<'_>) -> Result<()> {
        Ok(())
    }

    fn count_roles(ctx: Context<'_>, roles: &[NamedRole]) -> Result<Vec<RoleCount>> {
        let guild_id = ctx.guild_id().ok_or(Error::GuildOnly)?;
        let guild = ctx.serenity_context().cache.guild(guild_id);
        Ok(roles
            .iter()
            .map(|named| {
                let count = named.id.get().and_then(|id| {
                    let role = serenity::RoleId::new(id.get());
                    let guild = guild.as_ref()?;
                    guild.roles.contains_key(&role).then(|| {
                        guild
                            .members
                            .values()
                            .filter(|member| member.roles.contains(&role))
                            .count()
                    })
                });
                RoleCount {
                    name: named.name.clone(),
                    count,
                }
            })
            .collect())
    }

    fn counts_embed(title: &str, description: &str, counts: &[RoleCount]) -> serenity::CreateEmbed {
        serenity::CreateEmbed::new()
            .title(title)
            .description(description)
            .colour(resources::YELLOW)
            .fields(
                counts
                    .iter()
                    .map(|count| (count.name.clone(), count.value(), true)),
            )
    }

    /// Get the number of members in each year group in the server.
    #[poise::command(slash_command, rename = "year-groups")]
    pub async fn year_groups(ctx: Context<'_>) -> Result<()> {
        ctx.defer().await?;
        let counts = count_roles(ctx, &ctx.data().settings.roles.year_groups)?;
        let embed = counts_embed(
            "DevSoc Members | Year Groups",
            "*Here are the members of each year group within this server.*",
            &counts,
        )
        .field(
            "Third/Final Year",
            format!("{} members", members::total_members(&counts)),
            true,
        );
        ctx.send(CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Get the number of members in each course in the server.
    #[poise::command(slash_command)]
    pub async fn courses(ctx: Context<'_>) -> Result<()> {
        ctx.defer().await?;
        let counts = count_roles(ctx, &ctx.data().settings.roles.courses)?;
        let embed = counts_embed(
            "DevSoc Members | Courses",
            "*Here are the members of each course within this server.*",
            &counts,
        );
        ctx.send(CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

pub use inner::*;

use crate::bot::events::EventListener;
use crate::bot::{BotData, Discord, resources};
use crate::core::command::{CommandDescriptor, ParamSpec};
use crate::core::registry::{EventKind, Extension, ExtensionContext};
use crate::core::welcome::{self, WelcomeChannels};
use crate::errors::Result;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use tracing::{debug, error};

const EXTENSION: &str = "general";

/// General commands available to every member.
pub struct General;

impl Extension<Discord> for General {
    fn name(&self) -> &'static str {
        EXTENSION
    }

    fn setup(&self, ext: &mut ExtensionContext<'_, Discord>) -> Result<()> {
        ext.command(
            CommandDescriptor::builder("help")
                .description("Show the General help menu")
                .guild_only()
                .build(),
            help(),
        )?;
        ext.command(
            CommandDescriptor::builder("whois")
                .description("Get information about a user.")
                .guild_only()
                .param(ParamSpec::user("user").optional())
                .build(),
            whois(),
        )?;
        ext.command(
            CommandDescriptor::builder("source")
                .description("Get the source code for the bot.")
                .guild_only()
                .build(),
            source(),
        )?;
        ext.command(
            CommandDescriptor::builder("socials")
                .description("Get the social media links for DevSoc.")
                .guild_only()
                .build(),
            socials(),
        )?;
        ext.command(
            CommandDescriptor::builder("ping")
                .description("Check that the bot is responsive")
                .build(),
            ping(),
        )?;
        ext.group(
            "members",
            members(),
            vec![
                CommandDescriptor::builder("year-groups")
                    .description("Get the number of members in each year group in the server.")
                    .guild_only()
                    .build(),
                CommandDescriptor::builder("courses")
                    .description("Get the number of members in each course in the server.")
                    .guild_only()
                    .build(),
            ],
        )?;
        ext.listen(EventKind::MemberJoin, Box::new(Welcome));
        Ok(())
    }
}

/// Gives new members the announcement role and points them at the rules.
pub struct Welcome;

#[async_trait]
impl EventListener for Welcome {
    async fn handle(
        &self,
        ctx: &serenity::Context,
        event: &serenity::FullEvent,
        data: &BotData,
    ) -> Result<()> {
        let serenity::FullEvent::GuildMemberAddition { new_member } = event else {
            return Ok(());
        };
        let guild_id = new_member.guild_id;
        let settings = &data.settings;

        let announcement = settings.roles.announcement;
        let Ok(role) = resources::guild_role(ctx, guild_id, announcement, "Announcement") else {
            error!(critical = true, "[General.on_member_join] Failed to find announcement role!");
            return Ok(());
        };
        if let Err(e) = new_member.add_role(ctx, role).await {
            let e = crate::errors::Error::from(e);
            if e.is_forbidden() {
                error!(
                    critical = true,
                    "[General.on_member_join] I don't have permission to add the announcement role!"
                );
                return Ok(());
            }
            return Err(e);
        }

        let channel = |id, name| resources::guild_channel(ctx, guild_id, id, name);
        let (Ok(arrivals), Ok(roles), Ok(rules)) = (
            channel(settings.channels.arrivals, "arrivals"),
            channel(settings.channels.role_channel, "roles"),
            channel(settings.channels.rules_channel, "rules"),
        ) else {
            error!(critical = true, "[General.on_member_join] Failed to find welcome channels!");
            return Ok(());
        };

        let channels = WelcomeChannels {
            guild_id: guild_id.get(),
            rules: rules.get(),
            roles: roles.get(),
        };
        arrivals
            .say(ctx, welcome::arrival_message(new_member.user.id.get(), &channels))
            .await?;

        let embed = serenity::CreateEmbed::new()
            .title(welcome::WELCOME_TITLE)
            .description(welcome::direct_message(&channels))
            .colour(resources::YELLOW);
        if let Err(e) = new_member
            .user
            .direct_message(ctx, serenity::CreateMessage::new().embed(embed))
            .await
        {
            debug!(
                "[General.on_member_join] Failed to DM {} with welcome message! ({})",
                new_member.user.name, e
            );
        }
        Ok(())
    }
}
