//! Per-key async mutual exclusion.
//!
//! Operations that touch several keys acquire them through
//! [`KeyedLocks::acquire_many`], which locks in sorted order so two callers
//! with overlapping key sets cannot deadlock.

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug)]
pub struct KeyedLocks<K> {
    inner: Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
}

impl<K> Default for KeyedLocks<K>
where
    K: Eq + Hash + Ord + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Ord + Copy,
{
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, key: K) -> Arc<AsyncMutex<()>> {
        // The map only holds Arc handles; a poisoned guard still has a consistent map.
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if map.len() >= PRUNE_THRESHOLD {
            map.retain(|_, slot| Arc::strong_count(slot) > 1);
        }
        map.entry(key)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    pub async fn acquire(&self, key: K) -> OwnedMutexGuard<()> {
        self.slot(key).lock_owned().await
    }

    /// Lock every distinct key in `keys`, in ascending key order.
    pub async fn acquire_many<I>(&self, keys: I) -> Vec<OwnedMutexGuard<()>>
    where
        I: IntoIterator<Item = K>,
    {
        let ordered: BTreeSet<K> = keys.into_iter().collect();
        let mut guards = Vec::with_capacity(ordered.len());
        for key in ordered {
            guards.push(self.acquire(key).await);
        }
        guards
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.inner.lock().map(|m| m.len()).unwrap_or(0)
    }
}
