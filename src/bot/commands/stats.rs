//! Stats Discord commands - the DevSoc room status.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, Context, boundary, handlers::autocomplete, resources},
        core::room::RoomStatus,
        errors::{Error, Result},
    };
    use poise::{FrameworkError, serenity_prelude as serenity};
    use tracing::info;

    /// Update the DevSoc room status.
    ///
    /// Renames the room channel to `DevSoc Room: Open` or `DevSoc Room: Closed`.
    #[poise::command(slash_command, on_error = "room_error")]
    pub async fn room(
        ctx: Context<'_>,
        #[description = "Whether the room is open or closed"]
        #[autocomplete = "autocomplete::autocomplete_room_status"]
        status: String,
    ) -> Result<()> {
        let status: RoomStatus = status.parse()?;
        let guild_id = ctx.guild_id().ok_or(Error::GuildOnly)?;
        let channel = resources::guild_channel(
            ctx.serenity_context(),
            guild_id,
            ctx.data().settings.channels.devsoc_room,
            "DevSoc Room",
        )?;

        ctx.defer().await?;
        channel
            .edit(
                ctx.serenity_context(),
                serenity::EditChannel::new().name(status.channel_name()),
            )
            .await?;
        info!(%status, "Updated DevSoc room status");

        ctx.say(format!("Updated DevSoc Room status to: {status}!"))
            .await?;
        Ok(())
    }

    /// `/room` answers its own cooldown; everything else goes to the shared boundary.
    async fn room_error(error: FrameworkError<'_, BotData, Error>) {
        if let FrameworkError::CommandCheckFailed {
            error: Some(Error::CommandOnCooldown { retry_after }),
            ctx,
            ..
        } = &error
        {
            boundary::send_cooldown(*ctx, *retry_after).await;
            return;
        }
        boundary::handle(error, false).await;
    }
}

pub use inner::*;

use crate::bot::Discord;
use crate::core::command::{CommandDescriptor, Cooldown, ParamSpec};
use crate::core::registry::{Extension, ExtensionContext};
use crate::core::room::RoomStatus;
use crate::errors::Result;
use poise::serenity_prelude::Permissions;
use std::time::Duration;

/// One room update per guild every five minutes.
const ROOM_COOLDOWN: Duration = Duration::from_secs(300);

/// Society statistics.
pub struct Stats;

impl Extension<Discord> for Stats {
    fn name(&self) -> &'static str {
        "stats"
    }

    fn setup(&self, ext: &mut ExtensionContext<'_, Discord>) -> Result<()> {
        ext.command(
            CommandDescriptor::builder("room")
                .description("Update the DevSoc room status")
                .guild_only()
                .permissions(Permissions::ADMINISTRATOR)
                .cooldown(Cooldown::per_guild(ROOM_COOLDOWN))
                .param(
                    ParamSpec::string("status")
                        .choices(RoomStatus::ALL.map(RoomStatus::value))
                        .autocomplete(),
                )
                .error_hook()
                .build(),
            room(),
        )
    }
}
