//! Message id allocation.
//!
//! Ids are `now_millis * 1000`, floored to one past the largest id already
//! stored. The low three digits absorb appends landing in the same
//! millisecond, and the floor keeps ids unique across restarts and clock
//! steps backwards.

use crate::error::{Error, Result};
use crate::message::{Message, MessageId};

const SUB_MILLIS: u64 = 1000;

/// Hands out strictly increasing ids above everything in a message list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    /// `None` once the id space above the stored messages is used up.
    next: Option<u64>,
}

impl IdAllocator {
    /// Allocator for appends to `existing`, at wall-clock time `now_millis`.
    pub fn after(existing: &[Message], now_millis: i64) -> Self {
        let clock = u64::try_from(now_millis)
            .unwrap_or(0)
            .checked_mul(SUB_MILLIS);
        let floor = match existing.iter().filter_map(|m| m.id.as_number()).max() {
            Some(max) => max.checked_add(1),
            None => Some(0),
        };

        // A clock too large to scale is ignored; the floor alone keeps ids unique.
        let next = match clock {
            Some(clock) => floor.map(|floor| floor.max(clock)),
            None => floor,
        };

        Self { next }
    }

    /// Next id, or [`Error::IdsExhausted`] when none is left above the
    /// largest stored id.
    pub fn allocate(&mut self) -> Result<MessageId> {
        let id = self.next.ok_or(Error::IdsExhausted)?;
        self.next = id.checked_add(1);
        Ok(MessageId::from(id))
    }
}
