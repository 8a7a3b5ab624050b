//! Extension loading and the command registry.
//!
//! Every extension registers its commands, listeners and persistent components
//! through an [`ExtensionContext`]. Registrations are staged and only committed when
//! the extension's setup returns `Ok`, so a failing extension never leaves half of
//! its commands behind. A failing extension is reported and skipped; the remaining
//! extensions still load.

use crate::core::command::{CommandDescriptor, CommandPath};
use crate::core::component::PersistentRegistry;
use crate::core::dispatch::Dispatcher;
use crate::errors::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

/// The framework-specific payloads carried next to each registration.
pub trait Platform {
    /// What the gateway framework needs to expose a command (e.g. a `poise::Command`)
    type Command;
    /// An event listener callback
    type Listener;
    /// A persistent interactive component built by a factory
    type Component;
}

/// Gateway events an extension can listen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    Ready,
    MemberJoin,
    MemberLeave,
    Message,
    MessageEdit,
    MessageDelete,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ready => "ready",
            Self::MemberJoin => "member_join",
            Self::MemberLeave => "member_remove",
            Self::Message => "message",
            Self::MessageEdit => "message_edit",
            Self::MessageDelete => "message_delete",
        };
        f.write_str(name)
    }
}

/// A unit of functionality loaded at startup.
pub trait Extension<P: Platform> {
    /// Name used in load reports and command listings
    fn name(&self) -> &'static str;

    /// Registers everything the extension provides.
    fn setup(&self, ext: &mut ExtensionContext<'_, P>) -> Result<()>;
}

/// Listeners grouped by the event kind they handle.
pub struct ListenerTable<L> {
    listeners: BTreeMap<EventKind, Vec<(&'static str, L)>>,
}

impl<L> Default for ListenerTable<L> {
    fn default() -> Self {
        Self {
            listeners: BTreeMap::new(),
        }
    }
}

impl<L> ListenerTable<L> {
    /// Listeners for `kind` with the name of the extension that registered them.
    pub fn for_kind(&self, kind: EventKind) -> impl Iterator<Item = (&'static str, &L)> {
        self.listeners
            .get(&kind)
            .into_iter()
            .flatten()
            .map(|(extension, listener)| (*extension, listener))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct StagedCommand<C> {
    command: C,
    descriptors: Vec<CommandDescriptor>,
}

type Factory<V> = Box<dyn Fn() -> V + Send + Sync>;

/// Staging area handed to [`Extension::setup`].
pub struct ExtensionContext<'r, P: Platform> {
    extension: &'static str,
    registry: &'r Registry<P>,
    commands: Vec<StagedCommand<P::Command>>,
    listeners: Vec<(EventKind, P::Listener)>,
    components: Vec<(String, Factory<P::Component>)>,
}

impl<P: Platform> ExtensionContext<'_, P> {
    /// Registers a top-level command.
    pub fn command(&mut self, descriptor: CommandDescriptor, command: P::Command) -> Result<()> {
        self.stage(command, vec![descriptor])
    }

    /// Registers a command group; every descriptor becomes a sub-command of `group`.
    pub fn group(
        &mut self,
        group: &str,
        command: P::Command,
        descriptors: Vec<CommandDescriptor>,
    ) -> Result<()> {
        let descriptors = descriptors
            .into_iter()
            .map(|mut descriptor| {
                descriptor.path = CommandPath::grouped(group, descriptor.path.name());
                descriptor
            })
            .collect();
        self.stage(command, descriptors)
    }

    /// Subscribes a listener to one event kind.
    pub fn listen(&mut self, kind: EventKind, listener: P::Listener) {
        self.listeners.push((kind, listener));
    }

    /// Registers a persistent component recipe under a stable custom id.
    pub fn persistent<F>(&mut self, custom_id: &str, factory: F) -> Result<()>
    where
        F: Fn() -> P::Component + Send + Sync + 'static,
    {
        let taken = self.registry.components.contains(custom_id)
            || self.components.iter().any(|(id, _)| id == custom_id);
        if taken {
            return Err(Error::DuplicateComponent {
                custom_id: custom_id.to_string(),
            });
        }
        self.components
            .push((custom_id.to_string(), Box::new(factory)));
        Ok(())
    }

    fn stage(&mut self, command: P::Command, descriptors: Vec<CommandDescriptor>) -> Result<()> {
        let mut roots = BTreeSet::new();
        for descriptor in &descriptors {
            roots.insert(descriptor.path.root().to_string());
        }
        for root in &roots {
            let staged_root = self
                .commands
                .iter()
                .flat_map(|staged| &staged.descriptors)
                .any(|descriptor| descriptor.path.root() == root);
            if self.registry.roots.contains(root) || staged_root {
                return Err(Error::DuplicateCommand { name: root.clone() });
            }
        }

        let mut seen = BTreeSet::new();
        let mut descriptors = descriptors;
        for descriptor in &mut descriptors {
            if !seen.insert(descriptor.path.clone()) {
                return Err(Error::DuplicateCommand {
                    name: descriptor.path.to_string(),
                });
            }
            descriptor.extension = self.extension.to_string();
        }

        self.commands.push(StagedCommand {
            command,
            descriptors,
        });
        Ok(())
    }
}

/// Result of loading a list of extensions.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub attempted: usize,
    pub succeeded: usize,
    /// Extension name and the error that stopped it
    pub failures: Vec<(String, Error)>,
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.succeeded, self.attempted)
    }
}

/// Committed registrations from every successfully loaded extension.
pub struct Registry<P: Platform> {
    roots: BTreeSet<String>,
    descriptors: BTreeMap<CommandPath, Arc<CommandDescriptor>>,
    commands: Vec<P::Command>,
    listeners: ListenerTable<P::Listener>,
    components: PersistentRegistry<P::Component>,
}

impl<P: Platform> Default for Registry<P> {
    fn default() -> Self {
        Self {
            roots: BTreeSet::new(),
            descriptors: BTreeMap::new(),
            commands: Vec::new(),
            listeners: ListenerTable::default(),
            components: PersistentRegistry::default(),
        }
    }
}

/// Everything the runtime needs once loading is finished.
pub struct Loaded<P: Platform> {
    pub dispatcher: Dispatcher,
    pub commands: Vec<P::Command>,
    pub listeners: ListenerTable<P::Listener>,
    pub components: PersistentRegistry<P::Component>,
    pub report: LoadReport,
}

impl<P: Platform> Registry<P> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a single extension, all-or-nothing.
    pub fn load(&mut self, extension: &dyn Extension<P>) -> Result<()> {
        let name = extension.name();
        let mut ext = ExtensionContext {
            extension: name,
            registry: self,
            commands: Vec::new(),
            listeners: Vec::new(),
            components: Vec::new(),
        };

        extension.setup(&mut ext).map_err(|e| Error::Extension {
            name: name.to_string(),
            message: e.to_string(),
        })?;

        let ExtensionContext {
            commands,
            listeners,
            components,
            ..
        } = ext;

        for staged in commands {
            for descriptor in staged.descriptors {
                self.roots.insert(descriptor.path.root().to_string());
                self.descriptors
                    .insert(descriptor.path.clone(), Arc::new(descriptor));
            }
            self.commands.push(staged.command);
        }
        for (kind, listener) in listeners {
            self.listeners
                .listeners
                .entry(kind)
                .or_default()
                .push((name, listener));
        }
        for (custom_id, factory) in components {
            self.components.install(custom_id, factory);
        }
        Ok(())
    }

    /// Loads every extension in order, skipping and reporting the ones that fail.
    pub fn load_all(mut self, extensions: &[Box<dyn Extension<P>>]) -> Loaded<P> {
        let mut report = LoadReport {
            attempted: extensions.len(),
            ..LoadReport::default()
        };

        for extension in extensions {
            match self.load(extension.as_ref()) {
                Ok(()) => {
                    report.succeeded += 1;
                    info!("Loaded {} extension successfully!", extension.name());
                }
                Err(e) => {
                    error!("Exception in loading {}: {}", extension.name(), e);
                    report.failures.push((extension.name().to_string(), e));
                }
            }
        }

        info!("Successfully loaded {report} extensions!");

        Loaded {
            dispatcher: Dispatcher::new(self.descriptors),
            commands: self.commands,
            listeners: self.listeners,
            components: self.components,
            report,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::command::CommandPath;

    struct TestPlatform;

    impl Platform for TestPlatform {
        type Command = &'static str;
        type Listener = &'static str;
        type Component = &'static str;
    }

    struct Fixed {
        name: &'static str,
        commands: Vec<&'static str>,
        fail: bool,
    }

    impl Extension<TestPlatform> for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        fn setup(&self, ext: &mut ExtensionContext<'_, TestPlatform>) -> Result<()> {
            for command in &self.commands {
                ext.command(CommandDescriptor::builder(*command).build(), *command)?;
            }
            ext.listen(EventKind::Message, self.name);
            if self.fail {
                return Err(Error::Internal {
                    message: "boom".to_string(),
                });
            }
            Ok(())
        }
    }

    fn fixed(
        name: &'static str,
        commands: &[&'static str],
        fail: bool,
    ) -> Box<dyn Extension<TestPlatform>> {
        Box::new(Fixed {
            name,
            commands: commands.to_vec(),
            fail,
        })
    }

    #[test]
    fn test_failed_extension_registers_nothing() {
        let loaded = Registry::<TestPlatform>::new().load_all(&[
            fixed("admin", &["unassigned"], false),
            fixed("broken", &["mute", "clear"], true),
            fixed("stats", &["room"], false),
        ]);

        assert_eq!(loaded.report.attempted, 3);
        assert_eq!(loaded.report.succeeded, 2);
        assert_eq!(loaded.report.to_string(), "2/3");
        assert_eq!(loaded.report.failures[0].0, "broken");
        assert_eq!(loaded.commands, vec!["unassigned", "room"]);
        assert!(
            loaded
                .dispatcher
                .resolve(&CommandPath::top_level("mute"))
                .is_err()
        );
        assert_eq!(loaded.listeners.for_kind(EventKind::Message).count(), 2);
    }

    #[test]
    fn test_duplicate_command_fails_second_extension() {
        let loaded = Registry::<TestPlatform>::new().load_all(&[
            fixed("first", &["room"], false),
            fixed("second", &["whois", "room"], false),
        ]);

        assert_eq!(loaded.report.succeeded, 1);
        assert!(matches!(
            loaded.report.failures[0].1,
            Error::Extension { .. }
        ));
        assert!(
            loaded
                .dispatcher
                .resolve(&CommandPath::top_level("whois"))
                .is_err()
        );
    }

    #[test]
    fn test_group_namespace() {
        struct Grouped;
        impl Extension<TestPlatform> for Grouped {
            fn name(&self) -> &'static str {
                "general"
            }
            fn setup(&self, ext: &mut ExtensionContext<'_, TestPlatform>) -> Result<()> {
                ext.group(
                    "members",
                    "members",
                    vec![
                        CommandDescriptor::builder("courses").build(),
                        CommandDescriptor::builder("year-groups").build(),
                    ],
                )?;
                // A top-level command may share a sub-command's name.
                ext.command(CommandDescriptor::builder("courses").build(), "courses")?;
                let clash = ext.command(CommandDescriptor::builder("members").build(), "members");
                assert!(matches!(clash, Err(Error::DuplicateCommand { .. })));
                Ok(())
            }
        }

        let extensions: Vec<Box<dyn Extension<TestPlatform>>> = vec![Box::new(Grouped)];
        let loaded = Registry::<TestPlatform>::new().load_all(&extensions);
        assert_eq!(loaded.report.succeeded, 1);
        let descriptor = loaded
            .dispatcher
            .resolve(&CommandPath::grouped("members", "courses"))
            .unwrap();
        assert_eq!(descriptor.extension, "general");
        assert!(
            loaded
                .dispatcher
                .resolve(&CommandPath::top_level("courses"))
                .is_ok()
        );
    }

    #[test]
    fn test_duplicate_subcommand_in_group() {
        let mut registry = Registry::<TestPlatform>::new();
        struct Twice;
        impl Extension<TestPlatform> for Twice {
            fn name(&self) -> &'static str {
                "twice"
            }
            fn setup(&self, ext: &mut ExtensionContext<'_, TestPlatform>) -> Result<()> {
                ext.group(
                    "members",
                    "members",
                    vec![
                        CommandDescriptor::builder("courses").build(),
                        CommandDescriptor::builder("courses").build(),
                    ],
                )
            }
        }
        assert!(registry.load(&Twice).is_err());
    }
}
