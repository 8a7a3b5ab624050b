//! Shared test utilities.
//!
//! Helpers for creating throwaway data directories and cached messages with
//! sensible defaults.

use crate::{core::message_cache::CachedMessage, core::store::FlatStore, errors::Result};
use tempfile::TempDir;

/// Creates a store over a fresh temporary data directory.
///
/// The directory is removed when the returned `TempDir` is dropped, so keep it alive
/// for the duration of the test.
pub fn temp_store() -> Result<(TempDir, FlatStore)> {
    let dir = tempfile::tempdir()?;
    let store = FlatStore::new(dir.path());
    Ok((dir, store))
}

/// Creates a cached guild message with the given id and content.
///
/// # Defaults
/// * guild 1, channel 2, author 3 (`tester`)
/// * no embeds, attachments or reply
#[must_use]
pub fn cached_message(id: u64, content: &str) -> CachedMessage {
    CachedMessage {
        id,
        guild_id: 1,
        channel_id: 2,
        author_id: 3,
        author_tag: "tester".to_string(),
        content: content.to_string(),
        embeds: 0,
        attachments: Vec::new(),
        reply_to: None,
    }
}
