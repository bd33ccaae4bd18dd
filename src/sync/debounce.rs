//! Per-key table of pending debounced tasks.
//!
//! Each key holds at most one pending task. Scheduling a new task for a key
//! aborts the one it replaces. A task that has woken up must `claim` its
//! entry before doing any work; once claimed it is no longer in the table
//! and can no longer be aborted from here.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tokio::task::JoinHandle;

/// Identifies one cart line across owners.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DebounceKey {
    pub owner_id: String,
    pub sku_id: String,
}

impl DebounceKey {
    pub fn new(owner_id: &str, sku_id: &str) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            sku_id: sku_id.to_string(),
        }
    }
}

struct Pending {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Entries {
    next_generation: u64,
    pending: HashMap<DebounceKey, Pending>,
}

#[derive(Default)]
pub(super) struct DebounceTable {
    entries: Mutex<Entries>,
}

impl DebounceTable {
    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register the task produced by `spawn` as the pending task for `key`.
    ///
    /// `spawn` receives the generation the task must later pass to
    /// [`claim`](Self::claim). It runs under the table lock, so the task
    /// cannot claim before it is registered. Returns true if a pending task
    /// was replaced.
    pub(super) fn schedule(
        &self,
        key: DebounceKey,
        spawn: impl FnOnce(u64) -> JoinHandle<()>,
    ) -> bool {
        let mut entries = self.lock();
        let generation = entries.next_generation;
        entries.next_generation += 1;

        let handle = spawn(generation);
        match entries.pending.insert(key, Pending { generation, handle }) {
            Some(previous) => {
                previous.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Remove the entry for `key` if it still belongs to `generation`.
    pub(super) fn claim(&self, key: &DebounceKey, generation: u64) -> bool {
        let mut entries = self.lock();
        match entries.pending.get(key) {
            Some(p) if p.generation == generation => {
                entries.pending.remove(key);
                true
            }
            _ => false,
        }
    }

    pub(super) fn len(&self) -> usize {
        self.lock().pending.len()
    }

    /// Abort every pending task. Returns how many were dropped.
    pub(super) fn cancel_all(&self) -> usize {
        let mut entries = self.lock();
        let count = entries.pending.len();
        for (_, p) in entries.pending.drain() {
            p.handle.abort();
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::pending;

    #[tokio::test]
    async fn test_replacing_aborts_previous() {
        let table = DebounceTable::default();
        let key = DebounceKey::new("1", "a");

        let mut first = None;
        assert!(!table.schedule(key.clone(), |g| {
            first = Some(g);
            tokio::spawn(pending())
        }));
        let mut second = None;
        assert!(table.schedule(key.clone(), |g| {
            second = Some(g);
            tokio::spawn(pending())
        }));

        assert_eq!(table.len(), 1);
        assert!(!table.claim(&key, first.unwrap()));
        assert!(table.claim(&key, second.unwrap()));
        assert_eq!(table.len(), 0);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let table = DebounceTable::default();
        table.schedule(DebounceKey::new("1", "a"), |_| tokio::spawn(pending()));
        table.schedule(DebounceKey::new("1", "b"), |_| tokio::spawn(pending()));
        table.schedule(DebounceKey::new("2", "a"), |_| tokio::spawn(pending()));

        assert_eq!(table.len(), 3);
        assert_eq!(table.cancel_all(), 3);
        assert_eq!(table.len(), 0);
    }
}
