//! DevSoc room status.

use crate::errors::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Whether the society room is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    Open,
    Closed,
}

impl RoomStatus {
    pub const ALL: [Self; 2] = [Self::Open, Self::Closed];

    /// Lowercase value submitted by the status option.
    #[must_use]
    pub const fn value(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    /// Title-cased label shown to users.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Closed => "Closed",
        }
    }

    /// New name for the room channel.
    #[must_use]
    pub fn channel_name(self) -> String {
        format!("DevSoc Room: {}", self.label())
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RoomStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.value().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidArgument {
                name: "status".to_string(),
                message: "The status must be either `open` or `closed`. \
                          Please use the autocomplete menu provided with this command."
                    .to_string(),
            })
    }
}

/// Autocomplete choices `(label, value)` whose value contains the typed text.
#[must_use]
pub fn status_choices(partial: &str) -> Vec<(&'static str, &'static str)> {
    let partial = partial.to_lowercase();
    RoomStatus::ALL
        .into_iter()
        .filter(|status| status.value().contains(&partial))
        .map(|status| (status.label(), status.value()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("open".parse::<RoomStatus>().ok(), Some(RoomStatus::Open));
        assert_eq!("CLOSED".parse::<RoomStatus>().ok(), Some(RoomStatus::Closed));
        assert!(matches!(
            "ajar".parse::<RoomStatus>(),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_open_channel_name() {
        let name = RoomStatus::Open.channel_name();
        assert_eq!(name, "DevSoc Room: Open");
        assert!(name.contains("Open"));
    }

    #[test]
    fn test_status_choices() {
        assert_eq!(status_choices(""), vec![("Open", "open"), ("Closed", "closed")]);
        assert_eq!(status_choices("O"), vec![("Open", "open"), ("Closed", "closed")]);
        assert_eq!(status_choices("cl"), vec![("Closed", "closed")]);
        assert!(status_choices("x").is_empty());
    }
}
