//! Flat file store: `messages.json` (key/value) and `rules.txt` (one rule per line).
//!
//! Every call does its file I/O on the blocking worker pool and awaits the result.
//! The store assumes a single writer: updates are a full read-modify-write of the
//! JSON file without locking.

use crate::errors::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Key/value file name inside the data directory.
pub const MESSAGES_FILE: &str = "messages.json";
/// Rules file name inside the data directory.
pub const RULES_FILE: &str = "rules.txt";

/// A value stored in `messages.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoreValue {
    Integer(i64),
    Text(String),
}

impl StoreValue {
    /// The value as a message/channel id, if it is one.
    #[must_use]
    pub fn as_id(&self) -> Option<u64> {
        match self {
            Self::Integer(value) => u64::try_from(*value).ok(),
            Self::Text(value) => value.parse().ok(),
        }
    }
}

impl From<i64> for StoreValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u64> for StoreValue {
    fn from(value: u64) -> Self {
        // Snowflakes fit comfortably in an i64 for the next few decades.
        i64::try_from(value).map_or_else(|_| Self::Text(value.to_string()), Self::Integer)
    }
}

impl From<&str> for StoreValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for StoreValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

type MessageData = BTreeMap<String, StoreValue>;

/// Handle to the data directory.
#[derive(Debug, Clone)]
pub struct FlatStore {
    data_dir: PathBuf,
}

impl FlatStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Non-blank lines of `rules.txt`, trailing whitespace removed.
    #[instrument(skip(self))]
    pub async fn get_rules(&self) -> Result<Vec<String>> {
        let path = self.data_dir.join(RULES_FILE);
        let rules = tokio::task::spawn_blocking(move || read_rules(&path)).await??;
        debug!("Read {} rules", rules.len());
        Ok(rules)
    }

    /// The value stored under `key`, if any.
    #[instrument(skip(self))]
    pub async fn get_message_data(&self, key: &str) -> Result<Option<StoreValue>> {
        let mut data = self.get_all_message_data().await?;
        Ok(data.remove(key))
    }

    /// The whole key/value map.
    pub async fn get_all_message_data(&self) -> Result<BTreeMap<String, StoreValue>> {
        let path = self.messages_path();
        tokio::task::spawn_blocking(move || read_messages(&path)).await?
    }

    /// Sets `key` to `value`, preserving every other key.
    #[instrument(skip(self, value))]
    pub async fn set_message_data(&self, key: &str, value: impl Into<StoreValue>) -> Result<()> {
        let path = self.messages_path();
        let key = key.to_string();
        let value = value.into();
        tokio::task::spawn_blocking(move || {
            let mut data = read_messages(&path)?;
            data.insert(key, value);
            write_messages(&path, &data)
        })
        .await?
    }

    fn messages_path(&self) -> PathBuf {
        self.data_dir.join(MESSAGES_FILE)
    }
}

fn read_rules(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)?;
    Ok(parse_rules(&contents))
}

/// Splits rule text into rules, skipping blank lines.
#[must_use]
pub fn parse_rules(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.trim_end().to_string())
        .collect()
}

fn read_messages(path: &Path) -> Result<MessageData> {
    match fs::read_to_string(path) {
        Ok(contents) if contents.trim().is_empty() => Ok(MessageData::new()),
        Ok(contents) => Ok(serde_json::from_str(&contents)?),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(MessageData::new()),
        Err(e) => Err(e.into()),
    }
}

fn write_messages(path: &Path, data: &MessageData) -> Result<()> {
    let mut contents = serde_json::to_string_pretty(data)?;
    contents.push('\n');
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::Error;
    use crate::test_utils::temp_store;

    #[tokio::test]
    async fn test_set_then_get() -> Result<()> {
        let (_dir, store) = temp_store()?;
        store.set_message_data("rules", 42_i64).await?;
        assert_eq!(
            store.get_message_data("rules").await?,
            Some(StoreValue::Integer(42))
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_set_preserves_other_keys() -> Result<()> {
        let (_dir, store) = temp_store()?;
        store.set_message_data("rules", 42_i64).await?;
        store.set_message_data("x", "value").await?;

        let all = store.get_all_message_data().await?;
        assert_eq!(all.len(), 2);
        assert_eq!(all["rules"], StoreValue::Integer(42));
        assert_eq!(all["x"], StoreValue::Text("value".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_key_and_missing_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = FlatStore::new(dir.path());
        assert_eq!(store.get_message_data("rules").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_file_is_pretty_printed() -> Result<()> {
        let (dir, store) = temp_store()?;
        store.set_message_data("rules", 7_u64).await?;
        let raw = fs::read_to_string(dir.path().join(MESSAGES_FILE))?;
        assert_eq!(raw, "{\n  \"rules\": 7\n}\n");
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_json_is_an_error() -> Result<()> {
        let (dir, store) = temp_store()?;
        fs::write(dir.path().join(MESSAGES_FILE), "{not json")?;
        assert!(matches!(
            store.get_message_data("rules").await,
            Err(Error::Json(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_rules_skip_blank_lines() -> Result<()> {
        let (dir, store) = temp_store()?;
        fs::write(
            dir.path().join(RULES_FILE),
            "Be respectful.\n\n   \nNo spam.  \r\nKeep it on topic.",
        )?;
        assert_eq!(
            store.get_rules().await?,
            vec!["Be respectful.", "No spam.", "Keep it on topic."]
        );
        Ok(())
    }

    #[test]
    fn test_store_value_ids() {
        assert_eq!(
            StoreValue::from(1_228_116_411_172_393_022_u64).as_id(),
            Some(1_228_116_411_172_393_022)
        );
        assert_eq!(
            StoreValue::from("814152479100633128").as_id(),
            Some(814_152_479_100_633_128)
        );
        assert_eq!(StoreValue::from("hello").as_id(), None);
    }
}
