//! Member queries: unassigned members, role counts and `/whois` profiles.

/// What the bot needs to know about one guild member.
///
/// `roles` never contains the implicit `@everyone` role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSummary {
    pub id: u64,
    pub username: String,
    pub display_name: String,
    pub nick: Option<String>,
    pub roles: Vec<u64>,
}

impl MemberSummary {
    /// `nick (username)`, falling back to the display name.
    #[must_use]
    pub fn listing_name(&self) -> String {
        let shown = self.nick.as_deref().unwrap_or(&self.display_name);
        format!("{shown} ({})", self.username)
    }

    /// A member is unassigned when they hold no role besides the announcement role.
    #[must_use]
    pub fn is_unassigned(&self, announcement_role: u64) -> bool {
        match self.roles.as_slice() {
            [] => true,
            [only] => *only == announcement_role,
            _ => false,
        }
    }
}

/// Result of `/unassigned`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnassignedReport {
    AllAssigned,
    Found {
        count: usize,
        /// `results.txt` body, one member per line
        listing: String,
    },
}

impl UnassignedReport {
    pub fn build<'a, I>(members: I, announcement_role: u64) -> Self
    where
        I: IntoIterator<Item = &'a MemberSummary>,
    {
        let names: Vec<String> = members
            .into_iter()
            .filter(|member| member.is_unassigned(announcement_role))
            .map(MemberSummary::listing_name)
            .collect();

        if names.is_empty() {
            return Self::AllAssigned;
        }
        Self::Found {
            count: names.len(),
            listing: names.join("\n"),
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::AllAssigned => "All members have a role on the server.".to_string(),
            Self::Found { count, .. } => format!(
                "There are {count} members without a role on the server. \
                 Here are the members without roles:"
            ),
        }
    }
}

/// Member count for one configured role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleCount {
    pub name: String,
    /// `None` when the role could not be resolved
    pub count: Option<usize>,
}

impl RoleCount {
    /// Embed field value.
    #[must_use]
    pub fn value(&self) -> String {
        match self.count {
            Some(count) => format!("{count} members"),
            None => format!("Failed to retrieve {} role members", self.name),
        }
    }
}

/// Sum of every count that was resolved.
#[must_use]
pub fn total_members(counts: &[RoleCount]) -> usize {
    counts.iter().filter_map(|count| count.count).sum()
}

/// Public part of any user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub id: u64,
    pub tag: String,
    pub avatar_url: String,
    /// Account creation, unix seconds
    pub created_at: i64,
}

/// Guild-specific part of a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub user: UserInfo,
    pub nick: Option<String>,
    /// Presence status as reported by the gateway (`online`, `dnd`, ...)
    pub status: Option<String>,
    pub joined_at: Option<i64>,
    pub role_mentions: Vec<String>,
}

/// The target of `/whois`, decided once when the option is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    Member(MemberInfo),
    User(UserInfo),
}

/// One embed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileField {
    pub name: &'static str,
    pub value: String,
    pub inline: bool,
}

const NOT_IN_SERVER: &str = "User not in Server";

fn status_label(status: &str) -> &'static str {
    match status {
        "online" => "Online",
        "offline" => "Offline",
        "idle" => "Idle",
        "dnd" => "Do Not Disturb",
        "invisible" => "Invisible",
        _ => "Unknown",
    }
}

fn timestamp(unix: i64) -> String {
    format!("<t:{unix}:f>")
}

impl Subject {
    #[must_use]
    pub const fn user(&self) -> &UserInfo {
        match self {
            Self::Member(member) => &member.user,
            Self::User(user) => user,
        }
    }

    /// Profile fields in display order.
    #[must_use]
    pub fn fields(&self) -> Vec<ProfileField> {
        let (nickname, status, joined, roles) = match self {
            Self::Member(member) => (
                member.nick.clone().unwrap_or_else(|| "None".to_string()),
                member
                    .status
                    .as_deref()
                    .map_or("Unknown", status_label)
                    .to_string(),
                member
                    .joined_at
                    .map_or_else(|| "Unknown".to_string(), timestamp),
                if member.role_mentions.is_empty() {
                    "None".to_string()
                } else {
                    member.role_mentions.join(", ")
                },
            ),
            Self::User(_) => (
                "None".to_string(),
                "Unknown".to_string(),
                NOT_IN_SERVER.to_string(),
                NOT_IN_SERVER.to_string(),
            ),
        };

        let field = |name, value, inline| ProfileField { name, value, inline };
        vec![
            field("Nickname", nickname, true),
            field("Status", status, true),
            field("Joined Server", joined, true),
            field("Joined Discord", timestamp(self.user().created_at), true),
            field("Roles", roles, false),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANNOUNCEMENT: u64 = 668_158_580_716_732_456;

    fn member(id: u64, nick: Option<&str>, roles: &[u64]) -> MemberSummary {
        MemberSummary {
            id,
            username: format!("user{id}"),
            display_name: format!("User {id}"),
            nick: nick.map(str::to_string),
            roles: roles.to_vec(),
        }
    }

    #[test]
    fn test_unassigned_members() {
        let members = vec![
            member(1, None, &[]),
            member(2, Some("Two"), &[ANNOUNCEMENT]),
            member(3, None, &[ANNOUNCEMENT, 5]),
            member(4, None, &[5]),
        ];

        let report = UnassignedReport::build(&members, ANNOUNCEMENT);
        assert_eq!(
            report,
            UnassignedReport::Found {
                count: 2,
                listing: "User 1 (user1)\nTwo (user2)".to_string(),
            }
        );
        assert!(report.message().starts_with("There are 2 members"));
    }

    #[test]
    fn test_everyone_assigned() {
        let members = vec![member(1, None, &[5])];
        assert_eq!(
            UnassignedReport::build(&members, ANNOUNCEMENT),
            UnassignedReport::AllAssigned
        );
    }

    #[test]
    fn test_role_counts_total_skips_unresolved() {
        let counts = vec![
            RoleCount {
                name: "First Year".to_string(),
                count: Some(12),
            },
            RoleCount {
                name: "Alumni".to_string(),
                count: None,
            },
            RoleCount {
                name: "Third Year".to_string(),
                count: Some(3),
            },
        ];
        assert_eq!(total_members(&counts), 15);
        assert_eq!(counts[1].value(), "Failed to retrieve Alumni role members");
        assert_eq!(counts[0].value(), "12 members");
    }

    #[test]
    fn test_whois_non_member() {
        let subject = Subject::User(UserInfo {
            id: 7,
            tag: "someone".to_string(),
            avatar_url: String::new(),
            created_at: 1_600_000_000,
        });
        let fields = subject.fields();
        assert_eq!(fields[2].value, "User not in Server");
        assert_eq!(fields[3].value, "<t:1600000000:f>");
        assert_eq!(fields[4].value, "User not in Server");
    }

    #[test]
    fn test_whois_member() {
        let subject = Subject::Member(MemberInfo {
            user: UserInfo {
                id: 7,
                tag: "someone".to_string(),
                avatar_url: String::new(),
                created_at: 1_600_000_000,
            },
            nick: Some("Andeh".to_string()),
            status: Some("dnd".to_string()),
            joined_at: None,
            role_mentions: vec!["<@&1>".to_string(), "<@&2>".to_string()],
        });
        let fields = subject.fields();
        assert_eq!(fields[0].value, "Andeh");
        assert_eq!(fields[1].value, "Do Not Disturb");
        assert_eq!(fields[2].value, "Unknown");
        assert_eq!(fields[4].value, "<@&1>, <@&2>");
    }
}
