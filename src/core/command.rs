//! Command descriptors and the invocation they are matched against.
//!
//! A [`CommandDescriptor`] is the immutable, framework-independent description of one
//! invocable command: its path, guards and parameter schema. Descriptors are built once
//! per command at startup through [`CommandDescriptor::builder`] and are never mutated
//! afterwards.

use poise::serenity_prelude::Permissions;
use std::fmt;
use std::time::Duration;

/// Fully qualified command path: `room`, or `members courses` for a grouped sub-command.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommandPath {
    group: Option<String>,
    name: String,
}

impl CommandPath {
    /// A top-level command.
    pub fn top_level(name: impl Into<String>) -> Self {
        Self {
            group: None,
            name: name.into(),
        }
    }

    /// A sub-command inside `group`.
    pub fn grouped(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: Some(group.into()),
            name: name.into(),
        }
    }

    /// Parses a space separated qualified name as produced by the gateway framework.
    #[must_use]
    pub fn parse(qualified: &str) -> Self {
        let mut parts = qualified.split_whitespace();
        let first = parts.next().unwrap_or_default().to_string();
        // Nested groups are flattened into the group segment.
        let rest: Vec<&str> = parts.collect();
        match rest.split_last() {
            None => Self::top_level(first),
            Some((last, middle)) => {
                let mut group = first;
                for segment in middle {
                    group.push(' ');
                    group.push_str(segment);
                }
                Self::grouped(group, *last)
            }
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// The name this path occupies in the top-level namespace.
    #[must_use]
    pub fn root(&self) -> &str {
        self.group.as_deref().unwrap_or(&self.name)
    }
}

impl fmt::Display for CommandPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.group {
            Some(group) => write!(f, "{group} {}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A single typed option value as received with an invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    /// User, member, role, channel or attachment reference
    Id(u64),
}

/// An inbound command invocation, already stripped of transport details.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub command: CommandPath,
    pub user_id: u64,
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    /// Effective permissions of the invoking member in the target channel
    pub permissions: Permissions,
    pub options: Vec<(String, OptionValue)>,
}

impl Invocation {
    /// A bare invocation with no guild, no permissions and no options.
    pub fn new(command: CommandPath, user_id: u64, channel_id: u64) -> Self {
        Self {
            command,
            user_id,
            guild_id: None,
            channel_id,
            permissions: Permissions::empty(),
            options: Vec::new(),
        }
    }

    #[must_use]
    pub fn in_guild(mut self, guild_id: u64) -> Self {
        self.guild_id = Some(guild_id);
        self
    }

    #[must_use]
    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }

    #[must_use]
    pub fn with_option(mut self, name: impl Into<String>, value: OptionValue) -> Self {
        self.options.push((name.into(), value));
        self
    }

    /// Looks up an option by name.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&OptionValue> {
        self.options
            .iter()
            .find(|(option, _)| option == name)
            .map(|(_, value)| value)
    }
}

/// Identifies one cooldown bucket for a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketKey {
    Global,
    Guild(Option<u64>),
    User(u64),
    Channel(u64),
    Member(Option<u64>, u64),
    Custom(u64),
}

/// Maps an invocation to the bucket it is charged against.
pub type KeyFn = fn(&Invocation) -> BucketKey;

/// Rate limit declared by a command: one invocation per `window` per bucket.
#[derive(Debug, Clone, Copy)]
pub struct Cooldown {
    pub window: Duration,
    pub key: KeyFn,
}

impl Cooldown {
    /// Buckets selected by an arbitrary key function.
    #[must_use]
    pub fn keyed(window: Duration, key: KeyFn) -> Self {
        Self { window, key }
    }

    #[must_use]
    pub fn global(window: Duration) -> Self {
        Self::keyed(window, |_| BucketKey::Global)
    }

    #[must_use]
    pub fn per_guild(window: Duration) -> Self {
        Self::keyed(window, |invocation| BucketKey::Guild(invocation.guild_id))
    }

    #[must_use]
    pub fn per_user(window: Duration) -> Self {
        Self::keyed(window, |invocation| BucketKey::User(invocation.user_id))
    }

    #[must_use]
    pub fn per_channel(window: Duration) -> Self {
        Self::keyed(window, |invocation| BucketKey::Channel(invocation.channel_id))
    }

    #[must_use]
    pub fn per_member(window: Duration) -> Self {
        Self::keyed(window, |invocation| {
            BucketKey::Member(invocation.guild_id, invocation.user_id)
        })
    }
}

/// Preconditions evaluated before a handler runs, in declaration order.
#[derive(Debug, Clone)]
pub struct Guards {
    pub guild_only: bool,
    pub permissions: Permissions,
    pub cooldown: Option<Cooldown>,
}

impl Default for Guards {
    fn default() -> Self {
        Self {
            guild_only: false,
            permissions: Permissions::empty(),
            cooldown: None,
        }
    }
}

/// Parameter value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
    User,
    Member,
    Channel,
    Role,
}

/// One parameter of a command's schema.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub required: bool,
    /// Inclusive bounds for numeric parameters
    pub range: Option<(i64, i64)>,
    /// Allowed values for string parameters, compared case-insensitively
    pub choices: Vec<String>,
    pub autocomplete: bool,
}

impl ParamSpec {
    fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            range: None,
            choices: Vec::new(),
            autocomplete: false,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Integer)
    }

    pub fn user(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::User)
    }

    pub fn member(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Member)
    }

    pub fn channel(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Channel)
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    #[must_use]
    pub fn range(mut self, min: i64, max: i64) -> Self {
        self.range = Some((min, max));
        self
    }

    #[must_use]
    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn autocomplete(mut self) -> Self {
        self.autocomplete = true;
        self
    }
}

/// Immutable description of one invocable command.
#[derive(Debug, Clone)]
pub struct CommandDescriptor {
    pub path: CommandPath,
    pub description: String,
    pub guards: Guards,
    pub params: Vec<ParamSpec>,
    /// The command handles its own errors; the boundary must not handle them again
    pub has_error_hook: bool,
    /// Name of the extension that registered the command
    pub extension: String,
}

impl CommandDescriptor {
    /// Starts building a descriptor for a top-level command.
    pub fn builder(name: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder {
            descriptor: Self {
                path: CommandPath::top_level(name),
                description: String::new(),
                guards: Guards::default(),
                params: Vec::new(),
                has_error_hook: false,
                extension: String::new(),
            },
        }
    }
}

/// Builder for [`CommandDescriptor`].
#[derive(Debug)]
pub struct DescriptorBuilder {
    descriptor: CommandDescriptor,
}

impl DescriptorBuilder {
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.descriptor.description = description.into();
        self
    }

    #[must_use]
    pub fn guild_only(mut self) -> Self {
        self.descriptor.guards.guild_only = true;
        self
    }

    #[must_use]
    pub fn permissions(mut self, permissions: Permissions) -> Self {
        self.descriptor.guards.permissions |= permissions;
        self
    }

    #[must_use]
    pub fn cooldown(mut self, cooldown: Cooldown) -> Self {
        self.descriptor.guards.cooldown = Some(cooldown);
        self
    }

    #[must_use]
    pub fn param(mut self, param: ParamSpec) -> Self {
        self.descriptor.params.push(param);
        self
    }

    #[must_use]
    pub fn error_hook(mut self) -> Self {
        self.descriptor.has_error_hook = true;
        self
    }

    #[must_use]
    pub fn build(self) -> CommandDescriptor {
        self.descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_path_parse() {
        assert_eq!(CommandPath::parse("room"), CommandPath::top_level("room"));
        let grouped = CommandPath::parse("members year-groups");
        assert_eq!(grouped, CommandPath::grouped("members", "year-groups"));
        assert_eq!(grouped.root(), "members");
        assert_eq!(grouped.to_string(), "members year-groups");
    }

    #[test]
    fn test_builder_accumulates_guards() {
        let descriptor = CommandDescriptor::builder("clear")
            .description("Clear messages")
            .guild_only()
            .permissions(Permissions::MANAGE_MESSAGES)
            .param(ParamSpec::integer("amount").range(1, 24))
            .build();

        assert!(descriptor.guards.guild_only);
        assert!(
            descriptor
                .guards
                .permissions
                .contains(Permissions::MANAGE_MESSAGES)
        );
        assert!(descriptor.guards.cooldown.is_none());
        assert_eq!(descriptor.params[0].range, Some((1, 24)));
        assert!(descriptor.params[0].required);
    }

    #[test]
    fn test_cooldown_keys() {
        let invocation = Invocation::new(CommandPath::top_level("room"), 1, 2).in_guild(3);
        assert_eq!(
            (Cooldown::per_guild(Duration::from_secs(1)).key)(&invocation),
            BucketKey::Guild(Some(3))
        );
        assert_eq!(
            (Cooldown::per_member(Duration::from_secs(1)).key)(&invocation),
            BucketKey::Member(Some(3), 1)
        );
        assert_eq!(
            (Cooldown::per_channel(Duration::from_secs(1)).key)(&invocation),
            BucketKey::Channel(2)
        );
    }
}
