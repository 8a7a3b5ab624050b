/// Token and settings path from the process environment
pub mod env;

/// Server layout (channels, roles, data paths) from config.toml
pub mod settings;

pub use settings::{Settings, Snowflake, load_settings};
