//! Process environment: the bot token and the settings file location.

use crate::errors::{Error, Result};

/// Environment variable holding the bot credential.
pub const TOKEN_VAR: &str = "BOT_TOKEN";

/// Environment variable overriding the settings file path.
pub const CONFIG_PATH_VAR: &str = "CONFIG_PATH";

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Reads the bot token. A missing or blank token is fatal at startup.
pub fn bot_token() -> Result<String> {
    let token = std::env::var(TOKEN_VAR)?;
    validate_token(token)
}

fn validate_token(token: String) -> Result<String> {
    if token.trim().is_empty() {
        return Err(Error::Config {
            message: format!("No {TOKEN_VAR} found in environment variables."),
        });
    }
    Ok(token)
}

/// Path of the settings file, falling back to `./config.toml`.
#[must_use]
pub fn config_path() -> String {
    std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_token_rejected() {
        assert!(matches!(
            validate_token("   ".to_string()),
            Err(Error::Config { .. })
        ));
        assert_eq!(validate_token("abc".to_string()).ok().as_deref(), Some("abc"));
    }
}
