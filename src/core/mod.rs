//! Framework-agnostic bot logic.
//!
//! Nothing in here talks to Discord directly: the gateway layer in [`crate::bot`]
//! converts framework types into these and executes what comes back.

pub mod boundary;
pub mod command;
pub mod component;
pub mod cooldown;
pub mod dispatch;
pub mod logs;
pub mod meme;
pub mod members;
pub mod message_cache;
pub mod moderation;
pub mod registry;
pub mod response;
pub mod room;
pub mod rules;
pub mod store;
pub mod welcome;
