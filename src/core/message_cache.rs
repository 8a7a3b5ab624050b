//! Bounded cache of recently seen guild messages.
//!
//! Delete and edit events only carry ids, so the log listeners look the original
//! message up here. The oldest message is evicted once the cache is full.

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

/// An attachment of a cached message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedAttachment {
    pub filename: String,
    pub url: String,
}

/// The message a cached message replied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedReply {
    pub author_tag: String,
    pub content: String,
}

/// Snapshot of a guild message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedMessage {
    pub id: u64,
    pub guild_id: u64,
    pub channel_id: u64,
    pub author_id: u64,
    pub author_tag: String,
    pub content: String,
    pub embeds: usize,
    pub attachments: Vec<CachedAttachment>,
    pub reply_to: Option<CachedReply>,
}

impl CachedMessage {
    /// Link to the message in the client.
    #[must_use]
    pub fn jump_url(&self) -> String {
        format!(
            "https://discord.com/channels/{}/{}/{}",
            self.guild_id, self.channel_id, self.id
        )
    }
}

#[derive(Debug, Default)]
struct Inner {
    order: VecDeque<u64>,
    messages: HashMap<u64, CachedMessage>,
}

/// Thread-safe FIFO cache keyed by message id.
#[derive(Debug)]
pub struct RecentMessages {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl RecentMessages {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Stores or replaces a message, evicting the oldest when full.
    pub fn insert(&self, message: CachedMessage) {
        if self.capacity == 0 {
            return;
        }
        let mut inner = self.inner.lock();
        let id = message.id;
        if inner.messages.insert(id, message).is_some() {
            return;
        }
        inner.order.push_back(id);
        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.messages.remove(&oldest);
            }
        }
    }

    #[must_use]
    pub fn get(&self, id: u64) -> Option<CachedMessage> {
        self.inner.lock().messages.get(&id).cloned()
    }

    /// Removes and returns a message, e.g. after it was deleted.
    pub fn remove(&self, id: u64) -> Option<CachedMessage> {
        let mut inner = self.inner.lock();
        let removed = inner.messages.remove(&id);
        if removed.is_some() {
            inner.order.retain(|cached| *cached != id);
        }
        removed
    }

    /// Replaces the content of a cached message and returns the previous snapshot.
    pub fn update_content(&self, id: u64, content: &str) -> Option<CachedMessage> {
        let mut inner = self.inner.lock();
        let cached = inner.messages.get_mut(&id)?;
        let before = cached.clone();
        cached.content = content.to_string();
        Some(before)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::cached_message;

    #[test]
    fn test_evicts_oldest() {
        let cache = RecentMessages::new(2);
        cache.insert(cached_message(1, "one"));
        cache.insert(cached_message(2, "two"));
        cache.insert(cached_message(3, "three"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(1).is_none());
        assert_eq!(cache.get(3).unwrap().content, "three");
    }

    #[test]
    fn test_update_returns_previous() {
        let cache = RecentMessages::new(10);
        cache.insert(cached_message(1, "before"));

        let before = cache.update_content(1, "after").unwrap();
        assert_eq!(before.content, "before");
        assert_eq!(cache.get(1).unwrap().content, "after");
        assert!(cache.update_content(2, "x").is_none());
    }

    #[test]
    fn test_remove() {
        let cache = RecentMessages::new(10);
        cache.insert(cached_message(1, "gone"));
        assert_eq!(cache.remove(1).unwrap().content, "gone");
        assert!(cache.is_empty());
        assert!(cache.remove(1).is_none());
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let cache = RecentMessages::new(0);
        cache.insert(cached_message(1, "x"));
        assert!(cache.is_empty());
    }
}
