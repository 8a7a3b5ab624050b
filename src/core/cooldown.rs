//! Per-command cooldown buckets.
//!
//! A bucket is identified by the command path and the result of the command's key
//! function. Buckets are created on first use and kept for the life of the process.

use crate::core::command::{BucketKey, CommandPath, Cooldown, Invocation};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::time::{Duration, Instant};

/// Outcome of a cooldown check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownCheck {
    /// The invocation is allowed and the bucket now starts at the check time
    Accepted,
    /// The bucket is still cooling down; nothing was recorded
    Rejected { retry_after: Duration },
}

/// Thread-safe store of last-accepted timestamps, one per bucket.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    buckets: DashMap<(CommandPath, BucketKey), Instant>,
}

impl CooldownTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks the bucket for `invocation` and records `now` only when accepting.
    ///
    /// The check and the update happen under the same map entry lock, so two
    /// concurrent invocations of the same bucket cannot both be accepted.
    pub fn check(
        &self,
        cooldown: &Cooldown,
        invocation: &Invocation,
        now: Instant,
    ) -> CooldownCheck {
        let key = (invocation.command.clone(), (cooldown.key)(invocation));
        match self.buckets.entry(key) {
            Entry::Occupied(mut entry) => {
                let elapsed = now.saturating_duration_since(*entry.get());
                if elapsed < cooldown.window {
                    CooldownCheck::Rejected {
                        retry_after: cooldown.window - elapsed,
                    }
                } else {
                    entry.insert(now);
                    CooldownCheck::Accepted
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                CooldownCheck::Accepted
            }
        }
    }

    /// When the bucket last accepted an invocation, if ever.
    #[must_use]
    pub fn last_invoked(&self, cooldown: &Cooldown, invocation: &Invocation) -> Option<Instant> {
        let key = (invocation.command.clone(), (cooldown.key)(invocation));
        self.buckets.get(&key).map(|entry| *entry.value())
    }

    /// Number of buckets created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(guild: u64) -> Invocation {
        Invocation::new(CommandPath::top_level("room"), 10, 20).in_guild(guild)
    }

    #[test]
    fn test_accept_reject_accept() {
        let tracker = CooldownTracker::new();
        let cooldown = Cooldown::per_guild(Duration::from_secs(300));
        let start = Instant::now();

        assert_eq!(tracker.check(&cooldown, &room(1), start), CooldownCheck::Accepted);

        let second = tracker.check(&cooldown, &room(1), start + Duration::from_secs(100));
        assert_eq!(
            second,
            CooldownCheck::Rejected {
                retry_after: Duration::from_secs(200)
            }
        );

        let third = tracker.check(&cooldown, &room(1), start + Duration::from_secs(300));
        assert_eq!(third, CooldownCheck::Accepted);
    }

    #[test]
    fn test_rejection_does_not_reset_last_invoked() {
        let tracker = CooldownTracker::new();
        let cooldown = Cooldown::per_guild(Duration::from_secs(60));
        let start = Instant::now();

        tracker.check(&cooldown, &room(1), start);
        tracker.check(&cooldown, &room(1), start + Duration::from_secs(30));
        assert_eq!(tracker.last_invoked(&cooldown, &room(1)), Some(start));

        // Still measured from the first acceptance, not from the rejected attempt.
        assert_eq!(
            tracker.check(&cooldown, &room(1), start + Duration::from_secs(60)),
            CooldownCheck::Accepted
        );
    }

    #[test]
    fn test_buckets_are_independent_per_key() {
        let tracker = CooldownTracker::new();
        let cooldown = Cooldown::per_guild(Duration::from_secs(60));
        let now = Instant::now();

        assert_eq!(tracker.check(&cooldown, &room(1), now), CooldownCheck::Accepted);
        assert_eq!(tracker.check(&cooldown, &room(2), now), CooldownCheck::Accepted);
        assert_eq!(tracker.len(), 2);
    }
}
