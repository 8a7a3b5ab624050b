//! Rules Discord command - posts the server rules with the persistent accept button.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{Context, components},
        core::rules::{self, RULES_FOOTER, RULES_MESSAGE_KEY},
        errors::{Error, ResourceKind, Result},
    };
    use poise::{CreateReply, serenity_prelude as serenity};
    use tracing::{info, warn};

    async fn reply(ctx: Context<'_>, content: String) -> Result<()> {
        ctx.send(CreateReply::default().content(content).ephemeral(true))
            .await?;
        Ok(())
    }

    /// Sends the rules of the server.
    ///
    /// Posts the rules image, the numbered rules ten per message and a final message
    /// carrying the "I Accept" button. That message's id is stored under `rules`.
    #[poise::command(slash_command)]
    pub async fn rules(
        ctx: Context<'_>,
        #[description = "Channel to post the rules in, this channel by default"]
        #[channel_types("Text")]
        channel: Option<serenity::GuildChannel>,
    ) -> Result<()> {
        ctx.defer_ephemeral().await?;
        let data = ctx.data();
        let channel_id = channel.map_or_else(|| ctx.channel_id(), |channel| channel.id);
        let http = ctx.serenity_context();

        match &data.settings.rules_image {
            Some(path) => {
                let image = serenity::CreateAttachment::path(path).await.map_err(|e| {
                    warn!("Failed to read rules image {}: {}", path.display(), e);
                    Error::ResourceNotFound {
                        kind: ResourceKind::File,
                        name: path.display().to_string(),
                    }
                })?;
                if let Err(e) = channel_id
                    .send_message(http, serenity::CreateMessage::new().add_file(image))
                    .await
                {
                    let e = Error::from(e);
                    let message = if e.is_forbidden() {
                        format!("I don't have permission to send messages in <#{channel_id}>")
                    } else {
                        "Failed to send rules image".to_string()
                    };
                    warn!(channel = %channel_id, "Failed to send rules image: {}", e);
                    return reply(ctx, message).await;
                }
            }
            None => warn!("No rules image configured, posting the rules text only"),
        }

        let rules = data.store.get_rules().await?;
        for body in rules::rule_messages(&rules) {
            channel_id.say(http, body).await?;
        }

        let message = channel_id
            .send_message(
                http,
                serenity::CreateMessage::new()
                    .content(RULES_FOOTER)
                    .components(vec![components::rules::accept_row()]),
            )
            .await?;
        data.store
            .set_message_data(RULES_MESSAGE_KEY, message.id.get())
            .await?;
        info!(channel = %channel_id, message = %message.id, rules = rules.len(), "Posted rules");

        reply(ctx, format!("Rules posted in <#{channel_id}>")).await
    }
}

pub use inner::*;

use crate::bot::Discord;
use crate::bot::components::PersistentView;
use crate::bot::components::rules::AcceptRules;
use crate::core::command::{CommandDescriptor, ParamSpec};
use crate::core::registry::{Extension, ExtensionContext};
use crate::core::rules::ACCEPT_RULES_ID;
use crate::errors::Result;
use poise::serenity_prelude::Permissions;

/// Rules posting and acceptance.
pub struct Rules;

impl Extension<Discord> for Rules {
    fn name(&self) -> &'static str {
        "rules"
    }

    fn setup(&self, ext: &mut ExtensionContext<'_, Discord>) -> Result<()> {
        ext.command(
            CommandDescriptor::builder("rules")
                .description("Sends the rules of the server")
                .guild_only()
                .permissions(Permissions::ADMINISTRATOR)
                .param(ParamSpec::channel("channel").optional())
                .build(),
            rules(),
        )?;
        ext.persistent(ACCEPT_RULES_ID, || {
            Box::new(AcceptRules) as Box<dyn PersistentView>
        })
    }
}
