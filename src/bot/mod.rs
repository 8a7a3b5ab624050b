//! Bot layer - Discord-specific interface, extensions and shared bot context
//!
//! This module wires the framework-agnostic [`crate::core`] logic into poise/serenity:
//! extensions are loaded into a registry before the framework is built, every command
//! passes through the dispatcher in [`checks::command_check`], and every failure ends
//! up in [`boundary`].

/// Error boundary entry points for commands, components and listeners
pub mod boundary;
/// Framework command check backed by the interaction dispatcher
pub mod checks;
/// Extensions and their slash/legacy commands
pub mod commands;
/// Persistent interactive components
pub mod components;
/// Gateway event routing to listeners and components
pub mod events;
/// Interaction handlers (autocomplete)
pub mod handlers;
/// Lookups of configured roles and channels, and conversions from serenity models
pub mod resources;

use crate::config::Settings;
use crate::core::command::CommandPath;
use crate::core::component::PersistentRegistry;
use crate::core::dispatch::Dispatcher;
use crate::core::message_cache::RecentMessages;
use crate::core::registry::{ListenerTable, Platform, Registry};
use crate::core::store::FlatStore;
use crate::errors::{Error, Result};
use components::PersistentView;
use events::EventListener;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, instrument};

/// Framework context passed to every command.
pub type Context<'a> = poise::Context<'a, BotData, Error>;

/// Binds the registry to poise commands, serenity listeners and component views.
pub struct Discord;

impl Platform for Discord {
    type Command = poise::Command<BotData, Error>;
    type Listener = Box<dyn EventListener>;
    type Component = Box<dyn PersistentView>;
}

/// Shared data available to all commands, listeners and components.
pub struct BotData {
    /// Server layout and runtime settings
    pub settings: Arc<Settings>,
    /// `messages.json` / `rules.txt`
    pub store: FlatStore,
    /// Descriptor lookup and guard evaluation
    pub dispatcher: Dispatcher,
    /// Listeners registered by the loaded extensions
    pub listeners: ListenerTable<Box<dyn EventListener>>,
    /// Persistent component recipes by custom id
    pub components: PersistentRegistry<Box<dyn PersistentView>>,
    /// Recent guild messages for the delete/edit logs
    pub recent_messages: RecentMessages,
    ready: AtomicBool,
}

impl BotData {
    /// Creates the shared context from loaded extensions.
    #[must_use]
    pub fn new(
        settings: Arc<Settings>,
        dispatcher: Dispatcher,
        listeners: ListenerTable<Box<dyn EventListener>>,
        components: PersistentRegistry<Box<dyn PersistentView>>,
    ) -> Self {
        Self {
            store: FlatStore::new(settings.data_dir.clone()),
            recent_messages: RecentMessages::new(settings.message_cache_size),
            settings,
            dispatcher,
            listeners,
            components,
            ready: AtomicBool::new(false),
        }
    }

    /// Records a gateway ready event; `true` only for the first one.
    pub fn mark_ready(&self) -> bool {
        !self.ready.swap(true, Ordering::AcqRel)
    }
}

/// Copies descriptor metadata onto the poise command tree.
///
/// Guards stay with the dispatcher; only what Discord displays is applied here.
fn apply_descriptors(
    command: &mut poise::Command<BotData, Error>,
    group: Option<&str>,
    dispatcher: &Dispatcher,
) {
    let path = match group {
        Some(group) => CommandPath::grouped(group, command.name.clone()),
        None => CommandPath::top_level(command.name.clone()),
    };
    if let Ok(descriptor) = dispatcher.resolve(&path) {
        if !descriptor.description.is_empty() {
            command.description = Some(descriptor.description.clone());
        }
        command.default_member_permissions = descriptor.guards.permissions;
    }
    let name = command.name.clone();
    for subcommand in &mut command.subcommands {
        apply_descriptors(subcommand, Some(&name), dispatcher);
    }
}

/// Loads every extension, connects to the gateway and runs until the client stops.
#[instrument(skip(token, settings))]
pub async fn run_bot(token: String, settings: Arc<Settings>) -> Result<()> {
    info!("Starting bot...");

    let loaded = Registry::<Discord>::new().load_all(&commands::extensions());
    let mut poise_commands = loaded.commands;
    for command in &mut poise_commands {
        apply_descriptors(command, None, &loaded.dispatcher);
    }

    let data = BotData::new(
        Arc::clone(&settings),
        loaded.dispatcher,
        loaded.listeners,
        loaded.components,
    );

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: poise_commands,
            on_error: |error| Box::pin(boundary::on_error(error)),
            command_check: Some(|ctx| Box::pin(checks::command_check(ctx))),
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::event_handler(ctx, event, framework, data))
            },
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(settings.command_prefix.clone()),
                ..Default::default()
            },
            owners: settings
                .owner_ids
                .iter()
                .filter(|id| **id != 0)
                .map(|id| serenity::UserId::new(*id))
                .collect(),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::GUILD_PRESENCES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!(critical = true, "Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    let result = client.start().await;
    if let Err(why) = &result {
        error!(critical = true, "Client error: {:?}", why);
        client.shard_manager.shutdown_all().await;
    }
    info!("Shutdown bot.");
    result.map_err(Error::from)
}
