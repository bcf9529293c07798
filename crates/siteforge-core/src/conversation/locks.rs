//! Per-sender turn serialization.
//!
//! The persisted records use last-writer-wins semantics with no version
//! token, so two concurrent deliveries for the same sender (e.g. a duplicate
//! webhook) would race on `state`. Serializing turns per sender address
//! closes that race without coordinating across senders.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-sender async mutexes. Entries are created on first use
/// and kept for the process lifetime; one entry per distinct sender address.
#[derive(Default)]
pub struct TurnLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl TurnLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the turn lock for one sender. The guard is held for the whole
    /// turn; a second turn for the same sender waits here.
    pub async fn acquire(&self, sender: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let entry = self.locks.entry(sender.to_string()).or_default();
            Arc::clone(entry.value())
        };
        lock.lock_owned().await
    }
}
