//! Audit log entries posted to the bot-logs channel.

use crate::core::message_cache::CachedMessage;

pub const JOIN_COLOUR: u32 = 0xF4_A7_01;
pub const DELETE_COLOUR: u32 = 0xE8_02_02;
pub const EDIT_COLOUR: u32 = 0xE7_EC_11;
pub const ERROR_COLOUR: u32 = 0xED_42_45;

const IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".png", ".jpeg", ".gif"];

/// Framework-independent embed contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogEntry {
    pub title: String,
    pub description: String,
    pub colour: u32,
    pub fields: Vec<(String, String, bool)>,
    pub thumbnail: Option<String>,
    pub image: Option<String>,
    pub footer: Option<String>,
}

impl LogEntry {
    fn field(&mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) {
        self.fields.push((name.into(), value.into(), inline));
    }
}

/// Member details needed for join/leave entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberEvent {
    pub id: u64,
    pub username: String,
    pub display_name: String,
    pub avatar_url: String,
    pub created_at: i64,
    pub joined_at: Option<i64>,
}

fn relative(unix: i64) -> String {
    format!("<t:{unix}:R>")
}

fn member_description(member: &MemberEvent) -> String {
    format!(
        "### Member: {} ({})\n### Mention: <@{}>",
        member.display_name, member.username, member.id
    )
}

fn content_or_placeholder(content: &str) -> String {
    if content.is_empty() {
        "No Content".to_string()
    } else {
        content.to_string()
    }
}

#[must_use]
pub fn member_joined(member: &MemberEvent, now: i64) -> LogEntry {
    let mut entry = LogEntry {
        title: "Member Joined".to_string(),
        description: member_description(member),
        colour: JOIN_COLOUR,
        thumbnail: Some(member.avatar_url.clone()),
        footer: Some(format!("ID: {}", member.id)),
        ..LogEntry::default()
    };
    entry.field("Joined Server", relative(member.joined_at.unwrap_or(now)), true);
    entry.field("Joined Discord", relative(member.created_at), true);
    entry
}

#[must_use]
pub fn member_left(member: &MemberEvent, now: i64) -> LogEntry {
    let mut entry = LogEntry {
        title: "Member Left".to_string(),
        description: member_description(member),
        colour: JOIN_COLOUR,
        thumbnail: Some(member.avatar_url.clone()),
        footer: Some(format!("ID: {}", member.id)),
        ..LogEntry::default()
    };
    entry.field("Left at", relative(now), true);
    entry
}

/// Entry for a deleted message, or an edited one when `before` is given.
#[must_use]
pub fn message_changed(
    message: &CachedMessage,
    before: Option<&CachedMessage>,
    now: i64,
) -> LogEntry {
    let action = if before.is_some() { "Edited" } else { "Deleted" };
    let mut description = format!(
        "**Message Author:** <@{}> ({})\n**{action}:** {}\n**Channel:** <#{}>",
        message.author_id,
        message.author_tag,
        relative(now),
        message.channel_id
    );
    if before.is_some() {
        description.push_str(&format!("\n\n[`Go to message`]({})", message.jump_url()));
    }

    let mut entry = LogEntry {
        title: format!("Message {action}"),
        description,
        colour: if before.is_some() { EDIT_COLOUR } else { DELETE_COLOUR },
        ..LogEntry::default()
    };

    if !message.content.is_empty()
        && let Some(reply) = &message.reply_to
    {
        entry.field(
            format!("Replying to: {}'s message", reply.author_tag),
            content_or_placeholder(&reply.content),
            false,
        );
    }

    match before {
        Some(before) => {
            entry.field("Message Before", content_or_placeholder(&before.content), false);
            entry.field("Message After", content_or_placeholder(&message.content), false);
        }
        None => entry.field("Message Content", content_or_placeholder(&message.content), false),
    }

    if message.embeds > 0 {
        entry.field("Total Embeds", message.embeds.to_string(), true);
    }

    if !message.attachments.is_empty() {
        let files: Vec<String> = message
            .attachments
            .iter()
            .map(|attachment| format!("[{}]({})", attachment.filename, attachment.url))
            .collect();
        entry.field(
            format!("Total Attachments ({})", message.attachments.len()),
            files.join("\n"),
            true,
        );
        entry.image = message
            .attachments
            .iter()
            .find(|attachment| {
                let name = attachment.filename.to_lowercase();
                IMAGE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
            })
            .map(|attachment| attachment.url.clone());
    }

    entry
}

/// Entry for an error raised inside an event listener.
#[must_use]
pub fn listener_error(event: &str, error: &str) -> LogEntry {
    LogEntry {
        title: "An error occurred!".to_string(),
        description: format!("## Event\n`{event}`\n```\n{error}\n```"),
        colour: ERROR_COLOUR,
        ..LogEntry::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message_cache::{CachedAttachment, CachedReply};
    use crate::test_utils::cached_message;

    #[test]
    fn test_deleted_message_entry() {
        let mut message = cached_message(5, "");
        message.attachments = vec![
            CachedAttachment {
                filename: "notes.txt".to_string(),
                url: "https://cdn/notes.txt".to_string(),
            },
            CachedAttachment {
                filename: "cat.PNG".to_string(),
                url: "https://cdn/cat.PNG".to_string(),
            },
        ];

        let entry = message_changed(&message, None, 100);
        assert_eq!(entry.title, "Message Deleted");
        assert_eq!(entry.colour, DELETE_COLOUR);
        assert!(!entry.description.contains("Go to message"));
        assert_eq!(entry.fields[0].1, "No Content");
        assert_eq!(entry.fields[1].0, "Total Attachments (2)");
        assert_eq!(entry.image.as_deref(), Some("https://cdn/cat.PNG"));
    }

    #[test]
    fn test_edited_message_entry() {
        let before = cached_message(5, "old");
        let mut after = cached_message(5, "new");
        after.reply_to = Some(CachedReply {
            author_tag: "bob".to_string(),
            content: "question?".to_string(),
        });

        let entry = message_changed(&after, Some(&before), 100);
        assert_eq!(entry.title, "Message Edited");
        assert!(entry.description.contains("Go to message"));
        let names: Vec<&str> = entry.fields.iter().map(|(name, _, _)| name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Replying to: bob's message", "Message Before", "Message After"]
        );
    }

    #[test]
    fn test_member_joined_falls_back_to_now() {
        let member = MemberEvent {
            id: 1,
            username: "andeh".to_string(),
            display_name: "Andeh".to_string(),
            avatar_url: String::new(),
            created_at: 10,
            joined_at: None,
        };
        let entry = member_joined(&member, 99);
        assert_eq!(entry.fields[0].1, "<t:99:R>");
        assert_eq!(entry.footer.as_deref(), Some("ID: 1"));
    }
}
