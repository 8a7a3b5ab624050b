//! Unified error type for the bot.
//!
//! Guard failures, missing server resources and transport failures are all
//! recoverable and end up in the error boundary (`core::boundary`), which decides
//! what the invoking user and the operators get to see.

use std::time::Duration;
use thiserror::Error;

/// The kind of server resource a command or listener expected to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// A guild role
    Role,
    /// A guild channel
    Channel,
    /// A previously sent message
    Message,
    /// A file shipped with the bot (rules image, rules text)
    File,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Role => "Role",
            Self::Channel => "Channel",
            Self::Message => "Message",
            Self::File => "File",
        };
        f.write_str(name)
    }
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A guild-only command was invoked outside a guild.
    #[error("This command can only be used inside a server")]
    GuildOnly,

    /// The invoking member lacks one or more required permissions.
    #[error("Missing permissions: {}", missing.join(", "))]
    MissingPermissions {
        /// Every unmet permission, by display name
        missing: Vec<String>,
    },

    /// The command's cooldown bucket for this invocation has not elapsed yet.
    #[error("Command is on cooldown, retry after {retry_after:?}")]
    CommandOnCooldown {
        /// Time left until the bucket accepts again
        retry_after: Duration,
    },

    /// A generic check refused the invocation.
    #[error("Check failed: {reason}")]
    CheckFailed { reason: String },

    /// No descriptor is registered under the invoked name.
    #[error("Unknown command: {name}")]
    CommandNotFound { name: String },

    /// Two registrations collided in the same namespace.
    #[error("Duplicate command: {name}")]
    DuplicateCommand { name: String },

    /// Two persistent components claimed the same custom id.
    #[error("Duplicate persistent component: {custom_id}")]
    DuplicateComponent { custom_id: String },

    /// An option value does not satisfy the command's parameter schema.
    #[error("Invalid value for `{name}`: {message}")]
    InvalidArgument { name: String, message: String },

    /// A configured role/channel/message could not be found.
    #[error("{kind} not found: {name}")]
    ResourceNotFound { kind: ResourceKind, name: String },

    /// An extension failed during setup.
    #[error("Extension `{name}` failed to load: {message}")]
    Extension { name: String, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// An outbound call to the chat platform failed.
    #[error("Discord API error: {0}")]
    Transport(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Transport(Box::new(value))
    }
}

impl Error {
    /// Shorthand for a missing role.
    pub fn missing_role(name: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            kind: ResourceKind::Role,
            name: name.into(),
        }
    }

    /// Shorthand for a missing channel.
    pub fn missing_channel(name: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            kind: ResourceKind::Channel,
            name: name.into(),
        }
    }

    /// Whether this error is one of the guard failures raised before a handler runs.
    #[must_use]
    pub const fn is_guard_failure(&self) -> bool {
        matches!(
            self,
            Self::GuildOnly
                | Self::MissingPermissions { .. }
                | Self::CommandOnCooldown { .. }
                | Self::CheckFailed { .. }
        )
    }

    /// Whether the platform refused the call (HTTP 403).
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        self.http_status() == Some(403)
    }

    /// Whether the platform rate limited the call (HTTP 429).
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        self.http_status() == Some(429)
    }

    fn http_status(&self) -> Option<u16> {
        use poise::serenity_prelude as serenity;

        match self {
            Self::Transport(inner) => match inner.as_ref() {
                serenity::Error::Http(http) => http.status_code().map(|code| code.as_u16()),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_permissions_lists_all() {
        let error = Error::MissingPermissions {
            missing: vec!["Manage Roles".to_string(), "Kick Members".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "Missing permissions: Manage Roles, Kick Members"
        );
        assert!(error.is_guard_failure());
    }

    #[test]
    fn test_resource_not_found_display() {
        let error = Error::missing_role("DevSoc");
        assert_eq!(error.to_string(), "Role not found: DevSoc");
        assert!(!error.is_guard_failure());
        assert!(!error.is_forbidden());
    }
}
