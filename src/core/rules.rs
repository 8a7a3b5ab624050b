//! Rules posting and the accept-rules decision.

/// Rules per posted message.
pub const RULES_PER_MESSAGE: usize = 10;

/// Stable custom id of the persistent "I Accept" button.
pub const ACCEPT_RULES_ID: &str = "accept_rules";

/// Store key holding the id of the message carrying the accept button.
pub const RULES_MESSAGE_KEY: &str = "rules";

/// Closing message sent with the accept button.
pub const RULES_FOOTER: &str = "**Do not attempt to circumvent or find loopholes in these rules \
    or use the \"well, it's not technically breaking the rules\" excuse. It's the spirit of your \
    actions that matters. No-one likes a rules lawyer.**\n\nIf you see something, say something. \
    If you notice someone breaking rules, or if you have an issue with anyone or anything, feel \
    free to DM a committee member about it!\n\n**Please press the \"I Accept\" button below to \
    accept these rules.**";

pub const ROLE_MISSING_MESSAGE: &str =
    "Failed to retrieve the DevSoc role. Please contact an administrator";
pub const ALREADY_MEMBER_MESSAGE: &str = "You are already a member of the DevSoc server";
pub const WELCOME_MESSAGE: &str = "Welcome! You have been granted access to the DevSoc server!";

/// Numbers every rule (`**1 -** rule`) and groups them into message bodies.
#[must_use]
pub fn rule_messages(rules: &[String]) -> Vec<String> {
    let numbered: Vec<String> = rules
        .iter()
        .enumerate()
        .map(|(index, rule)| format!("**{} -** {rule}", index + 1))
        .collect();

    numbered
        .chunks(RULES_PER_MESSAGE)
        .map(|chunk| chunk.join("\n\n"))
        .collect()
}

/// What pressing the accept button does for a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptDecision {
    /// The DevSoc role is not configured or no longer exists
    RoleMissing,
    /// The member already has the role
    AlreadyMember,
    /// Grant the role
    Grant,
}

impl AcceptDecision {
    /// Decides the outcome of a press given the resolved role and the member's roles.
    #[must_use]
    pub fn decide(devsoc_role: Option<u64>, member_roles: &[u64]) -> Self {
        match devsoc_role {
            None => Self::RoleMissing,
            Some(role) if member_roles.contains(&role) => Self::AlreadyMember,
            Some(_) => Self::Grant,
        }
    }

    /// Ephemeral reply for the member.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::RoleMissing => ROLE_MISSING_MESSAGE,
            Self::AlreadyMember => ALREADY_MEMBER_MESSAGE,
            Self::Grant => WELCOME_MESSAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twenty_three_rules_make_three_messages() {
        let rules: Vec<String> = (1..=23).map(|i| format!("Rule {i}")).collect();
        let messages = rule_messages(&rules);

        let counts: Vec<usize> = messages
            .iter()
            .map(|message| message.split("\n\n").count())
            .collect();
        assert_eq!(counts, vec![10, 10, 3]);
        assert!(messages[0].starts_with("**1 -** Rule 1\n\n**2 -** Rule 2"));
        assert!(messages[2].ends_with("**23 -** Rule 23"));
    }

    #[test]
    fn test_no_rules_no_messages() {
        assert!(rule_messages(&[]).is_empty());
    }

    #[test]
    fn test_accept_decision() {
        assert_eq!(AcceptDecision::decide(None, &[1, 2]), AcceptDecision::RoleMissing);
        assert_eq!(AcceptDecision::decide(Some(2), &[1, 2]), AcceptDecision::AlreadyMember);
        assert_eq!(AcceptDecision::decide(Some(3), &[1, 2]), AcceptDecision::Grant);
        assert_eq!(AcceptDecision::Grant.message(), WELCOME_MESSAGE);
    }
}
