//! Moderation Discord commands - muting members and clearing messages.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, resources},
        core::moderation::{self, ClearSummary, MutePlan},
        errors::{Error, Result},
    };
    use poise::{CreateReply, serenity_prelude as serenity};
    use tracing::{error, info};

    /// Toggles the server mute role on a member.
    ///
    /// Muting strips every role except the booster role; unmuting only removes the
    /// mute role.
    #[poise::command(slash_command)]
    pub async fn mute(
        ctx: Context<'_>,
        #[description = "Member to mute or unmute"] member: serenity::Member,
    ) -> Result<()> {
        let guild_id = ctx.guild_id().ok_or(Error::GuildOnly)?;
        let roles = &ctx.data().settings.roles;
        let mute_role = resources::guild_role(
            ctx.serenity_context(),
            guild_id,
            roles.server_mute,
            "Server Mute",
        )?;
        let booster =
            resources::guild_role(ctx.serenity_context(), guild_id, roles.booster, "Booster");

        let current: Vec<u64> = member.roles.iter().map(|role| role.get()).collect();
        let plan = MutePlan::for_member(
            &current,
            mute_role.get(),
            booster.as_ref().ok().map(|role| role.get()),
        );
        if let (true, Err(e)) = (plan.strips_unprotected(), &booster) {
            error!(
                critical = true,
                "[Moderation.mute] {}; muting {} strips every role",
                e,
                member.user.name
            );
        }

        match &plan {
            MutePlan::Mute { roles, .. } => {
                let roles = roles.iter().map(|role| serenity::RoleId::new(*role));
                let edit = serenity::EditMember::new().roles(roles);
                guild_id
                    .edit_member(ctx.serenity_context(), member.user.id, edit)
                    .await?;
            }
            MutePlan::Unmute { remove } => {
                member
                    .remove_role(ctx.serenity_context(), serenity::RoleId::new(*remove))
                    .await?;
            }
        }

        info!(
            moderator = %ctx.author().name,
            member = %member.user.name,
            muted = plan.is_mute(),
            "Mute toggled"
        );
        ctx.send(
            CreateReply::default()
                .content(plan.confirmation(&member.user.name))
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Deletes the most recent messages in this channel.
    #[poise::command(slash_command)]
    pub async fn clear(
        ctx: Context<'_>,
        #[description = "How many messages to delete"]
        #[min = 1]
        #[max = 24]
        amount: i64,
    ) -> Result<()> {
        let amount = moderation::clear_amount(amount)?;
        ctx.defer_ephemeral().await?;

        let channel_id = ctx.channel_id();
        let messages = channel_id
            .messages(
                ctx.serenity_context(),
                serenity::GetMessages::new().limit(amount),
            )
            .await?;

        match messages.as_slice() {
            [] => {}
            [single] => channel_id.delete_message(ctx.serenity_context(), single.id).await?,
            many => {
                channel_id
                    .delete_messages(ctx.serenity_context(), many.iter())
                    .await?;
            }
        }

        let summary =
            ClearSummary::from_authors(messages.iter().map(|message| message.author.name.as_str()));
        info!(channel = %channel_id, deleted = summary.total, "Cleared messages");

        let embed = serenity::CreateEmbed::new()
            .title("Messages Cleared")
            .description(summary.description())
            .colour(resources::YELLOW)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "Deleted {} messages",
                summary.total
            )));
        ctx.send(CreateReply::default().embed(embed).ephemeral(true))
            .await?;
        Ok(())
    }
}

pub use inner::*;

use crate::bot::Discord;
use crate::core::command::{CommandDescriptor, ParamSpec};
use crate::core::moderation::{MAX_CLEAR, MIN_CLEAR};
use crate::core::registry::{Extension, ExtensionContext};
use crate::errors::Result;
use poise::serenity_prelude::Permissions;

/// Member moderation.
pub struct Moderation;

impl Extension<Discord> for Moderation {
    fn name(&self) -> &'static str {
        "moderation"
    }

    fn setup(&self, ext: &mut ExtensionContext<'_, Discord>) -> Result<()> {
        ext.command(
            CommandDescriptor::builder("mute")
                .description("Mute or unmute a member")
                .guild_only()
                .permissions(Permissions::MODERATE_MEMBERS)
                .param(ParamSpec::member("member"))
                .build(),
            mute(),
        )?;
        ext.command(
            CommandDescriptor::builder("clear")
                .description("Delete the most recent messages in this channel")
                .guild_only()
                .permissions(Permissions::MANAGE_MESSAGES)
                .param(ParamSpec::integer("amount").range(MIN_CLEAR, MAX_CLEAR))
                .build(),
            clear(),
        )
    }
}
