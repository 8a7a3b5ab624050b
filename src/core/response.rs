//! Tracks whether an interaction's initial response has been used.

use std::sync::atomic::{AtomicBool, Ordering};

/// How the next reply to an interaction has to be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// Fill the interaction's initial response
    Initial,
    /// The initial response is taken; send a follow-up
    FollowUp,
}

/// One interaction may be answered once; everything after that is a follow-up.
#[derive(Debug, Default)]
pub struct ResponseSlot {
    taken: AtomicBool,
}

impl ResponseSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slot for the next reply.
    pub fn claim(&self) -> ReplyKind {
        if self.taken.swap(true, Ordering::AcqRel) {
            ReplyKind::FollowUp
        } else {
            ReplyKind::Initial
        }
    }

    /// Hands an initial claim back after its send failed, so the next reply
    /// retries the initial response instead of following up on nothing.
    pub fn release(&self) {
        self.taken.store(false, Ordering::Release);
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.taken.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_claim_is_initial() {
        let slot = ResponseSlot::new();
        assert!(!slot.is_done());
        assert_eq!(slot.claim(), ReplyKind::Initial);
        assert_eq!(slot.claim(), ReplyKind::FollowUp);
        assert!(slot.is_done());
    }

    #[test]
    fn test_released_slot_is_initial_again() {
        let slot = ResponseSlot::new();
        assert_eq!(slot.claim(), ReplyKind::Initial);
        slot.release();
        assert!(!slot.is_done());
        assert_eq!(slot.claim(), ReplyKind::Initial);
    }
}
