//! Messages sent when a member joins.

/// Channels mentioned in the welcome messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WelcomeChannels {
    pub guild_id: u64,
    pub rules: u64,
    pub roles: u64,
}

impl WelcomeChannels {
    fn jump_url(&self, channel: u64) -> String {
        format!("https://discord.com/channels/{}/{channel}", self.guild_id)
    }
}

pub const WELCOME_TITLE: &str = "Welcome to DevSoc!";

/// Public greeting for the arrivals channel.
#[must_use]
pub fn arrival_message(member_id: u64, channels: &WelcomeChannels) -> String {
    format!(
        "Welcome <@{member_id}>! Head to <#{}> to accept our server rules, then head to <#{}> \
         to set your roles using the Role Menu and access the rest of the server.",
        channels.rules, channels.roles
    )
}

/// Body of the welcome DM.
#[must_use]
pub fn direct_message(channels: &WelcomeChannels) -> String {
    format!(
        "**Make sure to read and accept the [rules]({}) then head to [self-roles]({}) to set your roles!**",
        channels.jump_url(channels.rules),
        channels.jump_url(channels.roles)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_mentions_channels() {
        let channels = WelcomeChannels {
            guild_id: 1,
            rules: 2,
            roles: 3,
        };
        let message = arrival_message(9, &channels);
        assert!(message.starts_with("Welcome <@9>! Head to <#2>"));
        assert!(message.contains("<#3>"));
        assert!(direct_message(&channels).contains("(https://discord.com/channels/1/3)"));
    }
}
