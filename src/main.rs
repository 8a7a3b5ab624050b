use devsoc_bot::{
    bot,
    config::{self, env},
    errors::Result,
};
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the server layout settings
    let config_path = env::config_path();
    let settings = config::load_settings(&config_path)
        .inspect(|_| info!("Loaded settings from {}", config_path))
        .inspect_err(|e| error!(critical = true, "Failed to load settings: {}", e))?;

    // 4. The bot token is read directly before use and never stored in settings
    let token = env::bot_token()
        .inspect_err(|e| error!(critical = true, "{} not usable: {}", env::TOKEN_VAR, e))?;

    // 5. Single event loop; blocking file I/O goes to a bounded worker pool
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .max_blocking_threads(settings.blocking_threads)
        .build()?;

    runtime.block_on(bot::run_bot(token, Arc::new(settings)))
}
