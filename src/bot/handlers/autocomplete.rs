//! Autocomplete handlers for Discord slash command parameters.

use crate::bot::Context;
use crate::core::room;
use poise::serenity_prelude as serenity;

/// Suggests room statuses whose value contains what the user typed.
pub async fn autocomplete_room_status(
    _ctx: Context<'_>,
    partial: &str,
) -> Vec<serenity::AutocompleteChoice> {
    room::status_choices(partial)
        .into_iter()
        .map(|(label, value)| serenity::AutocompleteChoice::new(label, value))
        .collect()
}
