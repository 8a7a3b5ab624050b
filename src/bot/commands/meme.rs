//! Meme extension - direct-message replies to a few trigger phrases.

use crate::bot::events::EventListener;
use crate::bot::{BotData, Discord, resources};
use crate::core::meme::{self, Trigger};
use crate::core::registry::{EventKind, Extension, ExtensionContext};
use crate::errors::Result;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use tracing::debug;

/// Phrase-triggered memes.
pub struct Meme;

impl Extension<Discord> for Meme {
    fn name(&self) -> &'static str {
        "meme"
    }

    fn setup(&self, ext: &mut ExtensionContext<'_, Discord>) -> Result<()> {
        ext.listen(EventKind::Message, Box::new(MemeListener));
        Ok(())
    }
}

pub struct MemeListener;

#[async_trait]
impl EventListener for MemeListener {
    async fn handle(
        &self,
        ctx: &serenity::Context,
        event: &serenity::FullEvent,
        _data: &BotData,
    ) -> Result<()> {
        let serenity::FullEvent::Message { new_message } = event else {
            return Ok(());
        };
        if new_message.author.bot
            || new_message.guild_id.is_none()
            || !new_message.embeds.is_empty()
        {
            return Ok(());
        }
        let Some(trigger) = Trigger::find(&new_message.content) else {
            return Ok(());
        };

        let reply = match trigger {
            Trigger::RatFact => serenity::CreateMessage::new().content(meme::rat_fact()),
            Trigger::HelloThere => serenity::CreateMessage::new().content(meme::HELLO_THERE_GIF),
            Trigger::Beans => serenity::CreateMessage::new().embed(
                serenity::CreateEmbed::new()
                    .colour(resources::YELLOW)
                    .image(meme::BEANS_IMAGE)
                    .footer(serenity::CreateEmbedFooter::new(meme::BEANS_FOOTER)),
            ),
        };
        debug!(?trigger, user = %new_message.author.name, "Sending meme");
        new_message.author.direct_message(ctx, reply).await?;
        Ok(())
    }
}
