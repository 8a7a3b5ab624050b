//! Interaction dispatch: descriptor lookup, option validation and guard evaluation.
//!
//! The dispatcher never talks to the user. Every refusal is returned as a structured
//! [`Error`] for the error boundary to turn into a response.

use crate::core::command::{CommandDescriptor, CommandPath, Invocation, OptionValue, ParamKind};
use crate::core::cooldown::{CooldownCheck, CooldownTracker};
use crate::errors::{Error, Result};
use poise::serenity_prelude::Permissions;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Lookup table of registered descriptors plus the cooldown state they share.
#[derive(Debug, Default)]
pub struct Dispatcher {
    commands: BTreeMap<CommandPath, Arc<CommandDescriptor>>,
    cooldowns: CooldownTracker,
}

impl Dispatcher {
    /// Builds a dispatcher over an already validated set of descriptors.
    pub(crate) fn new(commands: BTreeMap<CommandPath, Arc<CommandDescriptor>>) -> Self {
        Self {
            commands,
            cooldowns: CooldownTracker::new(),
        }
    }

    /// Resolves a command path to its descriptor.
    pub fn resolve(&self, path: &CommandPath) -> Result<Arc<CommandDescriptor>> {
        self.commands
            .get(path)
            .cloned()
            .ok_or_else(|| Error::CommandNotFound {
                name: path.to_string(),
            })
    }

    /// All registered descriptors in path order.
    pub fn descriptors(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.values().map(AsRef::as_ref)
    }

    #[must_use]
    pub fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    /// Resolves and authorizes an invocation at the current instant.
    pub fn authorize(&self, invocation: &Invocation) -> Result<Arc<CommandDescriptor>> {
        self.authorize_at(invocation, Instant::now())
    }

    /// Resolves the descriptor and evaluates, in order: guild-only, permissions,
    /// option values, cooldown. The first failure wins, and the cooldown bucket only
    /// advances when everything before it has passed.
    pub fn authorize_at(
        &self,
        invocation: &Invocation,
        now: Instant,
    ) -> Result<Arc<CommandDescriptor>> {
        let descriptor = self.resolve(&invocation.command).inspect_err(|_| {
            warn!(command = %invocation.command, "Dispatch for unregistered command");
        })?;

        let guards = &descriptor.guards;
        if guards.guild_only && invocation.guild_id.is_none() {
            return Err(Error::GuildOnly);
        }

        let missing = missing_permissions(guards.permissions, invocation.permissions);
        if !missing.is_empty() {
            return Err(Error::MissingPermissions { missing });
        }

        validate_options(&descriptor, invocation)?;

        if let Some(cooldown) = &guards.cooldown
            && let CooldownCheck::Rejected { retry_after } =
                self.cooldowns.check(cooldown, invocation, now)
        {
            debug!(command = %invocation.command, ?retry_after, "Cooldown rejected invocation");
            return Err(Error::CommandOnCooldown { retry_after });
        }

        Ok(descriptor)
    }
}

/// Every permission in `required` that `granted` does not cover, by display name.
#[must_use]
pub fn missing_permissions(required: Permissions, granted: Permissions) -> Vec<String> {
    if granted.contains(Permissions::ADMINISTRATOR) {
        return Vec::new();
    }
    (required & !granted)
        .get_permission_names()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn validate_options(descriptor: &CommandDescriptor, invocation: &Invocation) -> Result<()> {
    for param in &descriptor.params {
        let Some(value) = invocation.option(&param.name) else {
            if param.required {
                return Err(Error::InvalidArgument {
                    name: param.name.clone(),
                    message: "a value is required".to_string(),
                });
            }
            continue;
        };

        let invalid = |message: String| Error::InvalidArgument {
            name: param.name.clone(),
            message,
        };

        match (param.kind, value) {
            (ParamKind::Integer, OptionValue::Integer(number)) => {
                if let Some((min, max)) = param.range
                    && !(min..=max).contains(number)
                {
                    return Err(invalid(format!("must be between {min} and {max}")));
                }
            }
            (ParamKind::String, OptionValue::String(text)) => {
                if !param.choices.is_empty()
                    && !param
                        .choices
                        .iter()
                        .any(|choice| choice.eq_ignore_ascii_case(text))
                {
                    return Err(invalid(format!(
                        "must be one of {}",
                        param.choices.join(", ")
                    )));
                }
            }
            (ParamKind::Number, OptionValue::Number(_) | OptionValue::Integer(_))
            | (ParamKind::Boolean, OptionValue::Boolean(_))
            | (
                ParamKind::User
                | ParamKind::Member
                | ParamKind::Channel
                | ParamKind::Role,
                OptionValue::Id(_),
            ) => {}
            (kind, _) => return Err(invalid(format!("expected a {kind:?} value"))),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::command::{Cooldown, ParamSpec};
    use std::time::Duration;

    fn dispatcher(descriptors: Vec<CommandDescriptor>) -> Dispatcher {
        Dispatcher::new(
            descriptors
                .into_iter()
                .map(|descriptor| (descriptor.path.clone(), Arc::new(descriptor)))
                .collect(),
        )
    }

    fn unassigned() -> CommandDescriptor {
        CommandDescriptor::builder("unassigned")
            .guild_only()
            .permissions(Permissions::MANAGE_ROLES | Permissions::KICK_MEMBERS)
            .build()
    }

    fn room() -> CommandDescriptor {
        CommandDescriptor::builder("room")
            .guild_only()
            .permissions(Permissions::ADMINISTRATOR)
            .cooldown(Cooldown::per_guild(Duration::from_secs(300)))
            .param(ParamSpec::string("status").choices(["open", "closed"]))
            .build()
    }

    fn room_invocation(status: &str) -> Invocation {
        Invocation::new(CommandPath::top_level("room"), 1, 2)
            .in_guild(3)
            .with_permissions(Permissions::ADMINISTRATOR)
            .with_option("status", OptionValue::String(status.to_string()))
    }

    #[test]
    fn test_guild_only_outside_guild() {
        let dispatcher = dispatcher(vec![unassigned()]);
        let invocation = Invocation::new(CommandPath::top_level("unassigned"), 1, 2)
            .with_permissions(Permissions::all());

        assert!(matches!(
            dispatcher.authorize(&invocation),
            Err(Error::GuildOnly)
        ));
    }

    #[test]
    fn test_missing_permissions_lists_every_permission() {
        let dispatcher = dispatcher(vec![unassigned()]);
        let invocation = Invocation::new(CommandPath::top_level("unassigned"), 1, 2)
            .in_guild(3)
            .with_permissions(Permissions::SEND_MESSAGES);

        match dispatcher.authorize(&invocation) {
            Err(Error::MissingPermissions { missing }) => assert_eq!(missing.len(), 2),
            other => panic!("expected missing permissions, got {other:?}"),
        }
    }

    #[test]
    fn test_authorized_invocation_resolves_descriptor() {
        let dispatcher = dispatcher(vec![unassigned()]);
        let invocation = Invocation::new(CommandPath::top_level("unassigned"), 1, 2)
            .in_guild(3)
            .with_permissions(Permissions::MANAGE_ROLES | Permissions::KICK_MEMBERS);

        let descriptor = dispatcher.authorize(&invocation).unwrap();
        assert_eq!(descriptor.path.to_string(), "unassigned");
    }

    #[test]
    fn test_permissions_checked_before_option_values() {
        let dispatcher = dispatcher(vec![room()]);
        let invocation = room_invocation("ajar").with_permissions(Permissions::empty());

        assert!(matches!(
            dispatcher.authorize(&invocation),
            Err(Error::MissingPermissions { .. })
        ));
    }

    #[test]
    fn test_guild_only_checked_before_missing_option() {
        let dispatcher = dispatcher(vec![room()]);
        let invocation = Invocation::new(CommandPath::top_level("room"), 1, 2)
            .with_permissions(Permissions::all());

        assert!(matches!(
            dispatcher.authorize(&invocation),
            Err(Error::GuildOnly)
        ));
    }

    #[test]
    fn test_administrator_satisfies_all_permissions() {
        let missing = missing_permissions(Permissions::MANAGE_ROLES, Permissions::ADMINISTRATOR);
        assert!(missing.is_empty());
    }

    #[test]
    fn test_unknown_command_is_not_found() {
        let dispatcher = dispatcher(vec![room()]);
        let invocation = Invocation::new(CommandPath::top_level("nope"), 1, 2);
        assert!(matches!(
            dispatcher.authorize(&invocation),
            Err(Error::CommandNotFound { .. })
        ));
    }

    #[test]
    fn test_cooldown_accept_reject_accept() {
        let dispatcher = dispatcher(vec![room()]);
        let start = Instant::now();

        assert!(dispatcher.authorize_at(&room_invocation("open"), start).is_ok());

        let later = start + Duration::from_secs(120);
        match dispatcher.authorize_at(&room_invocation("open"), later) {
            Err(Error::CommandOnCooldown { retry_after }) => {
                assert_eq!(retry_after, Duration::from_secs(180));
            }
            other => panic!("expected cooldown, got {other:?}"),
        }

        assert!(
            dispatcher
                .authorize_at(&room_invocation("closed"), start + Duration::from_secs(300))
                .is_ok()
        );
    }

    #[test]
    fn test_earlier_guard_rejection_does_not_consume_cooldown() {
        let dispatcher = dispatcher(vec![room()]);
        let now = Instant::now();

        let unprivileged = room_invocation("open").with_permissions(Permissions::empty());
        assert!(matches!(
            dispatcher.authorize_at(&unprivileged, now),
            Err(Error::MissingPermissions { .. })
        ));
        assert!(dispatcher.cooldowns().is_empty());

        assert!(dispatcher.authorize_at(&room_invocation("open"), now).is_ok());
    }

    #[test]
    fn test_invalid_choice_rejected_before_cooldown() {
        let dispatcher = dispatcher(vec![room()]);
        let result = dispatcher.authorize(&room_invocation("ajar"));
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));
        assert!(dispatcher.cooldowns().is_empty());
    }

    #[test]
    fn test_integer_range_enforced() {
        let clear = CommandDescriptor::builder("clear")
            .param(ParamSpec::integer("amount").range(1, 24))
            .build();
        let dispatcher = dispatcher(vec![clear]);
        let invocation = |amount| {
            Invocation::new(CommandPath::top_level("clear"), 1, 2)
                .with_option("amount", OptionValue::Integer(amount))
        };

        assert!(dispatcher.authorize(&invocation(24)).is_ok());
        assert!(matches!(
            dispatcher.authorize(&invocation(25)),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            dispatcher.authorize(&invocation(0)),
            Err(Error::InvalidArgument { .. })
        ));
    }
}
