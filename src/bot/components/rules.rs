//! The persistent accept-rules button.

use crate::bot::boundary::reply_to_component;
use crate::bot::components::PersistentView;
use crate::bot::{BotData, resources};
use crate::core::response::ResponseSlot;
use crate::core::rules::{ACCEPT_RULES_ID, AcceptDecision};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use tracing::{info, warn};

const ACCEPT_EMOJI_ID: u64 = 785_695_013_525_782_578;

/// Action row carrying the "I Accept" button.
#[must_use]
pub fn accept_row() -> serenity::CreateActionRow {
    let button = serenity::CreateButton::new(ACCEPT_RULES_ID)
        .style(serenity::ButtonStyle::Primary)
        .label("I Accept")
        .emoji(serenity::ReactionType::Custom {
            animated: false,
            id: serenity::EmojiId::new(ACCEPT_EMOJI_ID),
            name: Some("placement_yes".to_string()),
        });
    serenity::CreateActionRow::Buttons(vec![button])
}

/// Grants the DevSoc role to members accepting the rules.
#[derive(Debug, Default)]
pub struct AcceptRules;

impl AcceptRules {
    fn devsoc_role(
        ctx: &serenity::Context,
        data: &BotData,
        press: &serenity::ComponentInteraction,
    ) -> Option<serenity::RoleId> {
        let guild_id = press.guild_id?;
        resources::guild_role(ctx, guild_id, data.settings.roles.devsoc, "DevSoc")
            .inspect_err(|e| warn!("Accept rules pressed but {}", e))
            .ok()
    }
}

#[async_trait]
impl PersistentView for AcceptRules {
    async fn interaction_check(
        &self,
        ctx: &serenity::Context,
        data: &BotData,
        press: &serenity::ComponentInteraction,
        slot: &ResponseSlot,
    ) -> Result<bool> {
        let Some(member) = press.member.as_ref() else {
            return Err(Error::GuildOnly);
        };
        let role = Self::devsoc_role(ctx, data, press);
        let roles: Vec<u64> = member.roles.iter().map(|role| role.get()).collect();
        let decision = AcceptDecision::decide(role.map(serenity::RoleId::get), &roles);
        if decision == AcceptDecision::Grant {
            return Ok(true);
        }
        reply_to_component(ctx, press, slot, decision.message()).await?;
        Ok(false)
    }

    async fn callback(
        &self,
        ctx: &serenity::Context,
        data: &BotData,
        press: &serenity::ComponentInteraction,
        slot: &ResponseSlot,
    ) -> Result<()> {
        let role = Self::devsoc_role(ctx, data, press);
        let (Some(member), Some(role)) = (press.member.as_ref(), role) else {
            reply_to_component(ctx, press, slot, AcceptDecision::RoleMissing.message()).await?;
            return Ok(());
        };
        member.add_role(ctx, role).await?;
        info!(user = %member.user.name, "Member accepted the rules");
        reply_to_component(ctx, press, slot, AcceptDecision::Grant.message()).await
    }
}
