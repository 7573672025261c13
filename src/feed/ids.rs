//! Post identifier generators injected into the buffer loader.

use super::types::PostId;
use std::sync::atomic::{AtomicU64, Ordering};

/// Produces a fresh, never-repeating [`PostId`] on every call.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> PostId;
}

/// Random v4 UUIDs. Used by the application.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> PostId {
        PostId::new(uuid::Uuid::new_v4().to_string())
    }
}

/// Monotonic `prefix-N` identifiers, deterministic across runs.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("post")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> PostId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        PostId::new(format!("{}-{}", self.prefix, n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sequential_ids_are_ordered() {
        let ids = SequentialIds::new("p");
        assert_eq!(ids.next_id().as_str(), "p-1");
        assert_eq!(ids.next_id().as_str(), "p-2");
        assert_eq!(ids.next_id().as_str(), "p-3");
    }

    #[test]
    fn test_uuid_ids_do_not_collide() {
        let ids = UuidGenerator;
        let seen: HashSet<PostId> = (0..256).map(|_| ids.next_id()).collect();
        assert_eq!(seen.len(), 256);
    }
}
