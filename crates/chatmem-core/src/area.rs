//! Per-name serialization of memory area resolution.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Table of async locks keyed by area name.
///
/// Holding the guard for a name keeps other resolutions of the same name in
/// this process waiting; different names never contend.
#[derive(Debug, Default)]
pub struct AreaLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

/// Guard for one area name. Dropping it releases the name and prunes the
/// table entry when no other task is waiting on it.
#[derive(Debug)]
pub struct AreaGuard<'a> {
    table: &'a AreaLocks,
    name: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl AreaLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until `name` is free and take it.
    pub async fn acquire(&self, name: &str) -> AreaGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock();
            // Entries held only by the table belong to waiters that were
            // cancelled after the last release.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        let guard = lock.lock_owned().await;
        AreaGuard {
            table: self,
            name: name.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of names currently tracked.
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for AreaGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = self.table.locks.lock();
        if locks
            .get(&self.name)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.name);
        }
    }
}
