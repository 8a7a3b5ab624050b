//! Server layout configuration loaded from config.toml
//!
//! Channel and role ids differ between the production server and test servers, so
//! they live in a TOML file rather than in code. An id of `0` marks a placeholder
//! that has not been filled in yet; lookups treat it as "not configured" and the
//! caller degrades with an operator-visible error instead of guessing.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};

/// A platform id taken from configuration. `0` means "not configured".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Snowflake(u64);

impl Snowflake {
    /// Wraps a raw id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The id, or `None` for a placeholder.
    #[must_use]
    pub const fn get(self) -> Option<NonZeroU64> {
        NonZeroU64::new(self.0)
    }

    /// Whether a real id was configured.
    #[must_use]
    pub const fn is_configured(self) -> bool {
        self.0 != 0
    }
}

/// A role that is reported on by name (year groups, courses).
#[derive(Debug, Clone, Deserialize)]
pub struct NamedRole {
    /// Label shown in embeds
    pub name: String,
    /// Role id
    pub id: Snowflake,
}

/// Channels the bot posts to or edits.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Channels {
    /// Operator log channel (member joins, message edits, listener errors)
    pub bot_logs: Snowflake,
    /// Channel where members are expected to use bot commands
    pub bot_commands: Snowflake,
    /// Voice/text channel renamed by `/room`
    pub devsoc_room: Snowflake,
    /// Welcome messages for new members
    pub arrivals: Snowflake,
    /// Self-role menu channel, linked from the welcome message
    pub role_channel: Snowflake,
    /// Channel holding the rules and the accept button
    pub rules_channel: Snowflake,
}

/// Roles the bot grants, removes or inspects.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Roles {
    /// Role given by `/mute`
    pub server_mute: Snowflake,
    /// Role granted when the rules are accepted
    pub devsoc: Snowflake,
    /// Role that `/mute` never strips
    pub booster: Snowflake,
    /// Role given to every new member
    pub announcement: Snowflake,
    /// Roles counted by `/members year-groups`
    pub year_groups: Vec<NamedRole>,
    /// Roles counted by `/members courses`
    pub courses: Vec<NamedRole>,
}

/// Complete bot settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding `messages.json` and `rules.txt`
    pub data_dir: PathBuf,
    /// Image posted above the rules text, if any
    pub rules_image: Option<PathBuf>,
    /// Prefix for legacy (message) commands
    pub command_prefix: String,
    /// Users allowed to run owner-only commands
    pub owner_ids: Vec<u64>,
    /// Upper bound on worker threads used for blocking file I/O
    pub blocking_threads: usize,
    /// How many recent guild messages are kept for the delete/edit logs
    pub message_cache_size: usize,
    pub channels: Channels,
    pub roles: Roles,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            rules_image: None,
            command_prefix: ".".to_string(),
            owner_ids: Vec::new(),
            blocking_threads: 4,
            message_cache_size: 1000,
            channels: Channels::default(),
            roles: Roles::default(),
        }
    }
}

impl Settings {
    fn validate(self) -> Result<Self> {
        if self.blocking_threads == 0 {
            return Err(Error::Config {
                message: "blocking_threads must be at least 1".to_string(),
            });
        }
        if self.command_prefix.trim().is_empty() {
            return Err(Error::Config {
                message: "command_prefix cannot be empty".to_string(),
            });
        }
        Ok(self)
    }
}

/// Parses settings from TOML text.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse settings: {e}"),
    })?;
    settings.validate()
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read, the TOML is invalid, or a value is out
/// of range.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load settings from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_settings(&contents)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_settings() {
        let toml_str = r#"
            data_dir = "state"
            owner_ids = [957437570546012240]

            [channels]
            bot_logs = 814152479100633128
            devsoc_room = 0

            [roles]
            devsoc = 42

            [[roles.year_groups]]
            name = "First Year"
            id = 7
        "#;

        let settings = parse_settings(toml_str).unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("state"));
        assert_eq!(settings.command_prefix, ".");
        assert!(settings.channels.bot_logs.is_configured());
        assert!(settings.channels.devsoc_room.get().is_none());
        assert_eq!(settings.roles.devsoc.get().map(NonZeroU64::get), Some(42));
        assert!(!settings.roles.booster.is_configured());
        assert_eq!(settings.roles.year_groups[0].name, "First Year");
    }

    #[test]
    fn test_zero_blocking_threads_rejected() {
        let result = parse_settings("blocking_threads = 0");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let settings = parse_settings("").unwrap();
        assert_eq!(settings.blocking_threads, 4);
        assert_eq!(settings.message_cache_size, 1000);
    }
}
