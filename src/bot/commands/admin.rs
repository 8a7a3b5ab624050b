//! Admin Discord commands - server housekeeping for committee members.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, resources},
        core::members::UnassignedReport,
        errors::{Error, Result},
    };
    use poise::{CreateReply, serenity_prelude as serenity};
    use tracing::info;

    /// Checks for members that do not have a required role.
    ///
    /// Members holding no role, or only the announcement role, are listed in an attached
    /// `results.txt`.
    #[poise::command(slash_command)]
    pub async fn unassigned(ctx: Context<'_>) -> Result<()> {
        let guild_id = ctx.guild_id().ok_or(Error::GuildOnly)?;
        let announcement = resources::guild_role(
            ctx.serenity_context(),
            guild_id,
            ctx.data().settings.roles.announcement,
            "Announcement",
        )?;

        // Walking the member list can take longer than the initial response window.
        ctx.defer().await?;

        let members = resources::guild_members(ctx.serenity_context(), guild_id).await?;
        let report = UnassignedReport::build(&members, announcement.get());
        info!(guild = %guild_id, ?report, "Unassigned member check");

        let reply = match &report {
            UnassignedReport::AllAssigned => CreateReply::default()
                .content(report.message())
                .ephemeral(true),
            UnassignedReport::Found { listing, .. } => CreateReply::default()
                .content(report.message())
                .attachment(serenity::CreateAttachment::bytes(
                    listing.as_bytes().to_vec(),
                    "results.txt",
                )),
        };
        ctx.send(reply).await?;
        Ok(())
    }
}

pub use inner::*;

use crate::bot::Discord;
use crate::core::command::CommandDescriptor;
use crate::core::registry::{Extension, ExtensionContext};
use crate::errors::Result;
use poise::serenity_prelude::Permissions;

/// Server administration.
pub struct Admin;

impl Extension<Discord> for Admin {
    fn name(&self) -> &'static str {
        "admin"
    }

    fn setup(&self, ext: &mut ExtensionContext<'_, Discord>) -> Result<()> {
        ext.command(
            CommandDescriptor::builder("unassigned")
                .description("Checks for members that do not have a required role")
                .guild_only()
                .permissions(Permissions::MANAGE_ROLES)
                .build(),
            unassigned(),
        )
    }
}
