//! Error classification for the top-level error boundary.
//!
//! [`classify`] is pure: it turns an error raised for one event into a [`Resolution`]
//! saying what the user sees and what the operators get. The gateway layer only
//! executes the resolution, and a failure while doing so degrades to a log line.

use crate::errors::Error;
use chrono::{DateTime, Utc};
use std::fmt;

/// Where the error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCategory {
    SlashCommand,
    LegacyCommand,
    Component,
    Listener,
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SlashCommand => "slash command",
            Self::LegacyCommand => "legacy command",
            Self::Component => "component",
            Self::Listener => "listener",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warn,
    Error,
    Critical,
}

/// A line for the operators' log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub severity: Severity,
    pub message: String,
}

impl LogLine {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// What the boundary does with one error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The command owns an error hook that already handled it
    Delegated,
    /// Ephemeral reply to the invoking user only
    Reply(String),
    /// Log only, the user sees nothing
    Log(LogLine),
    /// Ephemeral reply plus an operator log line
    ReplyAndLog(String, LogLine),
}

/// Generic reply used whenever the details must stay internal.
pub const UNEXPECTED_ERROR: &str =
    "**ERROR:** An unexpected error occurred while running this command. The incident has been logged.";

/// Reply for a rejected cooldown, with a relative timestamp of when the bucket reopens.
#[must_use]
pub fn cooldown_message(retry_after: std::time::Duration, now: DateTime<Utc>) -> String {
    let retry_at = now + chrono::Duration::from_std(retry_after).unwrap_or_default();
    format!(
        "**This command is on cooldown, you can run this command again <t:{}:R>**",
        retry_at.timestamp()
    )
}

/// Reply listing every missing permission.
#[must_use]
pub fn missing_permissions_message(missing: &[String]) -> String {
    let listed: Vec<String> = missing.iter().map(|perm| format!("- {perm}")).collect();
    format!(
        "**ERROR:** You are missing the required permissions to run this command.\n{}",
        listed.join("\n")
    )
}

/// Classifies `error` raised while handling an event, first match wins.
#[must_use]
pub fn classify(
    category: EventCategory,
    command: Option<&str>,
    has_error_hook: bool,
    error: &Error,
    now: DateTime<Utc>,
) -> Resolution {
    if has_error_hook {
        return Resolution::Delegated;
    }

    let source = command.unwrap_or("<unknown>");

    match error {
        Error::CommandOnCooldown { retry_after } => {
            Resolution::Reply(cooldown_message(*retry_after, now))
        }
        Error::MissingPermissions { missing } => {
            Resolution::Reply(missing_permissions_message(missing))
        }
        Error::GuildOnly => match category {
            EventCategory::LegacyCommand => {
                Resolution::Reply(format!("`{source}` can not be used in Private Messages."))
            }
            _ => Resolution::Reply(
                "**ERROR:** This command can only be used inside a server.".to_string(),
            ),
        },
        Error::CheckFailed { .. } => {
            Resolution::Reply("**ERROR:** You failed the checks to run this command.".to_string())
        }
        Error::InvalidArgument { name, message } => {
            Resolution::Reply(format!("**ERROR:** Invalid value for `{name}`: {message}"))
        }
        Error::ResourceNotFound { kind, name } => Resolution::ReplyAndLog(
            format!(
                "**ERROR:** The {} `{name}` was not found. Please contact an administrator.",
                kind.to_string().to_lowercase()
            ),
            LogLine::new(
                Severity::Warn,
                format!("{category} `{source}` could not find {kind} {name}"),
            ),
        ),
        Error::Transport(_) if error.is_forbidden() => Resolution::ReplyAndLog(
            "**ERROR:** I don't have permission to do that.".to_string(),
            LogLine::new(Severity::Error, format!("{category} `{source}` was forbidden: {error}")),
        ),
        Error::Transport(_) if error.is_rate_limited() => Resolution::ReplyAndLog(
            "**ERROR:** I am being rate limited, please try again later.".to_string(),
            LogLine::new(
                Severity::Error,
                format!("{category} `{source}` was rate limited: {error}"),
            ),
        ),
        Error::Transport(_) => Resolution::ReplyAndLog(
            "**ERROR:** Failed to reach Discord, please try again later.".to_string(),
            LogLine::new(Severity::Error, format!("{category} `{source}` failed: {error}")),
        ),
        // Unknown legacy commands are silently ignored.
        Error::CommandNotFound { name } => Resolution::Log(LogLine::new(
            Severity::Warn,
            format!("Ignoring unknown command `{name}`"),
        )),
        Error::Config { .. } => Resolution::ReplyAndLog(
            UNEXPECTED_ERROR.to_string(),
            LogLine::new(
                Severity::Critical,
                format!("Ignoring exception in {category} `{source}`: {error:?}"),
            ),
        ),
        _ => Resolution::ReplyAndLog(
            UNEXPECTED_ERROR.to_string(),
            LogLine::new(
                Severity::Error,
                format!("Ignoring exception in {category} `{source}`: {error:?}"),
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default()
    }

    #[test]
    fn test_error_hook_delegates() {
        let error = Error::CommandOnCooldown {
            retry_after: Duration::from_secs(10),
        };
        assert_eq!(
            classify(EventCategory::SlashCommand, Some("room"), true, &error, now()),
            Resolution::Delegated
        );
    }

    #[test]
    fn test_cooldown_formats_retry_time() {
        let error = Error::CommandOnCooldown {
            retry_after: Duration::from_secs(180),
        };
        assert_eq!(
            classify(EventCategory::SlashCommand, Some("room"), false, &error, now()),
            Resolution::Reply(
                "**This command is on cooldown, you can run this command again <t:1700000180:R>**"
                    .to_string()
            )
        );
    }

    #[test]
    fn test_missing_permissions_enumerated() {
        let error = Error::MissingPermissions {
            missing: vec!["Manage Roles".to_string(), "Kick Members".to_string()],
        };
        let Resolution::Reply(reply) =
            classify(EventCategory::SlashCommand, Some("unassigned"), false, &error, now())
        else {
            panic!("expected a reply");
        };
        assert!(reply.contains("- Manage Roles\n- Kick Members"));
    }

    #[test]
    fn test_legacy_guild_only_message() {
        assert_eq!(
            classify(EventCategory::LegacyCommand, Some("ping"), false, &Error::GuildOnly, now()),
            Resolution::Reply("`ping` can not be used in Private Messages.".to_string())
        );
    }

    #[test]
    fn test_internal_error_is_not_leaked() {
        let error = Error::Internal {
            message: "secret path /srv/bot".to_string(),
        };
        match classify(EventCategory::Component, Some("accept_rules"), false, &error, now()) {
            Resolution::ReplyAndLog(reply, log) => {
                assert_eq!(reply, UNEXPECTED_ERROR);
                assert_eq!(log.severity, Severity::Error);
                assert!(log.message.contains("secret path"));
            }
            other => panic!("unexpected resolution {other:?}"),
        }
    }

    #[test]
    fn test_unknown_command_is_log_only() {
        let error = Error::CommandNotFound {
            name: "nope".to_string(),
        };
        assert!(matches!(
            classify(EventCategory::LegacyCommand, None, false, &error, now()),
            Resolution::Log(_)
        ));
    }

    #[test]
    fn test_missing_resource_is_admin_actionable() {
        let error = Error::missing_role("DevSoc");
        match classify(EventCategory::Component, Some("accept_rules"), false, &error, now()) {
            Resolution::ReplyAndLog(reply, log) => {
                assert!(reply.contains("contact an administrator"));
                assert_eq!(log.severity, Severity::Warn);
            }
            other => panic!("unexpected resolution {other:?}"),
        }
    }
}
