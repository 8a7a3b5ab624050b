//! Mute toggling and bulk message clearing.

use crate::errors::{Error, Result};
use std::collections::BTreeMap;

/// Smallest number of messages `/clear` deletes.
pub const MIN_CLEAR: i64 = 1;
/// Largest number of messages `/clear` deletes.
pub const MAX_CLEAR: i64 = 24;

/// Role change applied by `/mute`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutePlan {
    /// Replace the member's roles with exactly these. `booster_protected` is false
    /// when the booster role could not be resolved and nothing is kept.
    Mute {
        roles: Vec<u64>,
        booster_protected: bool,
    },
    /// Take the mute role away and leave the rest alone
    Unmute { remove: u64 },
}

impl MutePlan {
    /// Decides whether `/mute` mutes or unmutes a member holding `current_roles`.
    ///
    /// Muting strips every role except the protected booster role.
    #[must_use]
    pub fn for_member(current_roles: &[u64], mute_role: u64, booster_role: Option<u64>) -> Self {
        if current_roles.contains(&mute_role) {
            return Self::Unmute { remove: mute_role };
        }

        let mut roles: Vec<u64> = current_roles
            .iter()
            .copied()
            .filter(|role| Some(*role) == booster_role)
            .collect();
        roles.push(mute_role);
        Self::Mute {
            roles,
            booster_protected: booster_role.is_some(),
        }
    }

    #[must_use]
    pub const fn is_mute(&self) -> bool {
        matches!(self, Self::Mute { .. })
    }

    /// True when muting would strip a booster role the bot could not identify.
    #[must_use]
    pub const fn strips_unprotected(&self) -> bool {
        matches!(
            self,
            Self::Mute {
                booster_protected: false,
                ..
            }
        )
    }

    /// Confirmation shown to the moderator.
    #[must_use]
    pub fn confirmation(&self, member: &str) -> String {
        match self {
            Self::Mute { .. } => format!("{member} has been muted."),
            Self::Unmute { .. } => format!("{member} has been unmuted."),
        }
    }
}

/// Validates the `/clear` amount.
pub fn clear_amount(amount: i64) -> Result<u8> {
    if !(MIN_CLEAR..=MAX_CLEAR).contains(&amount) {
        return Err(Error::InvalidArgument {
            name: "amount".to_string(),
            message: format!("must be between {MIN_CLEAR} and {MAX_CLEAR}"),
        });
    }
    u8::try_from(amount).map_err(|_| Error::InvalidArgument {
        name: "amount".to_string(),
        message: format!("must be between {MIN_CLEAR} and {MAX_CLEAR}"),
    })
}

/// Per-author breakdown of a bulk delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearSummary {
    pub total: usize,
    pub by_author: BTreeMap<String, usize>,
}

impl ClearSummary {
    /// Counts deleted messages per author display name.
    pub fn from_authors<'a, I>(authors: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut summary = Self::default();
        for author in authors {
            summary.total += 1;
            *summary.by_author.entry(author.to_string()).or_default() += 1;
        }
        summary
    }

    /// Embed body: one `**author:** n` line per author, busiest first.
    #[must_use]
    pub fn description(&self) -> String {
        if self.total == 0 {
            return "No messages were deleted.".to_string();
        }
        let mut authors: Vec<(&String, &usize)> = self.by_author.iter().collect();
        authors.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        authors
            .into_iter()
            .map(|(author, count)| format!("**{author}:** {count}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MUTE: u64 = 10;
    const BOOSTER: u64 = 20;

    #[test]
    fn test_mute_keeps_only_booster() {
        let plan = MutePlan::for_member(&[1, BOOSTER, 3], MUTE, Some(BOOSTER));
        assert_eq!(
            plan,
            MutePlan::Mute {
                roles: vec![BOOSTER, MUTE],
                booster_protected: true,
            }
        );
        assert!(plan.is_mute());
        assert!(!plan.strips_unprotected());
    }

    #[test]
    fn test_mute_member_without_booster_role() {
        let plan = MutePlan::for_member(&[1, 2], MUTE, Some(BOOSTER));
        assert_eq!(
            plan,
            MutePlan::Mute {
                roles: vec![MUTE],
                booster_protected: true,
            }
        );
    }

    #[test]
    fn test_unresolved_booster_role_is_flagged() {
        let plan = MutePlan::for_member(&[1, BOOSTER], MUTE, None);
        assert_eq!(
            plan,
            MutePlan::Mute {
                roles: vec![MUTE],
                booster_protected: false,
            }
        );
        assert!(plan.strips_unprotected());
    }

    #[test]
    fn test_unmute_ignores_unresolved_booster_role() {
        let plan = MutePlan::for_member(&[MUTE], MUTE, None);
        assert!(!plan.strips_unprotected());
    }

    #[test]
    fn test_muted_member_is_unmuted() {
        let plan = MutePlan::for_member(&[MUTE, BOOSTER], MUTE, Some(BOOSTER));
        assert_eq!(plan, MutePlan::Unmute { remove: MUTE });
        assert_eq!(plan.confirmation("andeh"), "andeh has been unmuted.");
    }

    #[test]
    fn test_clear_amount_bounds() {
        assert_eq!(clear_amount(1).ok(), Some(1));
        assert_eq!(clear_amount(24).ok(), Some(24));
        assert!(clear_amount(0).is_err());
        assert!(clear_amount(25).is_err());
    }

    #[test]
    fn test_clear_summary() {
        let summary = ClearSummary::from_authors(["bob", "alice", "bob"]);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.description(), "**bob:** 2\n**alice:** 1");
        assert_eq!(
            ClearSummary::default().description(),
            "No messages were deleted."
        );
    }
}
