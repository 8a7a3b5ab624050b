//! Extensions and their Discord commands, organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Server administration commands
pub mod admin;

/// General utility commands and the welcome listener
pub mod general;

/// Audit logging listeners
pub mod logs;

/// Phrase-triggered memes
pub mod meme;

/// Moderation commands
pub mod moderation;

/// Rules posting
pub mod rules;

/// Society statistics and room status
pub mod stats;

use crate::bot::Discord;
use crate::core::registry::Extension;

/// Every extension, in load order.
#[must_use]
pub fn extensions() -> Vec<Box<dyn Extension<Discord>>> {
    vec![
        Box::new(general::General),
        Box::new(admin::Admin),
        Box::new(moderation::Moderation),
        Box::new(stats::Stats),
        Box::new(rules::Rules),
        Box::new(logs::Logs),
        Box::new(meme::Meme),
    ]
}

// Export commands
pub use admin::*;
pub use general::*;
pub use moderation::*;
pub use rules::*;
pub use stats::*;
