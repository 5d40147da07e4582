//! In-process mutual exclusion keyed by entity.
//!
//! The database transaction makes each balance write atomic, but two
//! handlers in this process could still interleave a read-modify-write on the
//! same wallet. `KeyedLocks` hands out one async mutex per key so such writers
//! queue up instead.

use std::{
    collections::HashMap,
    hash::Hash,
    sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Debug)]
pub(crate) struct KeyedLocks<K> {
    slots: Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Ord + Clone,
{
    fn slot(&self, key: &K) -> Arc<AsyncMutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // Drop slots nobody holds or waits on.
        slots.retain(|_, slot| Arc::strong_count(slot) > 1);
        slots.entry(key.clone()).or_default().clone()
    }

    /// Waits until `key` is free and holds it until the guard is dropped.
    pub(crate) async fn lock(&self, key: K) -> OwnedMutexGuard<()> {
        self.slot(&key).lock_owned().await
    }

    /// Locks several keys at once.
    ///
    /// Keys are acquired in sorted order so two callers locking overlapping
    /// sets cannot deadlock each other.
    pub(crate) async fn lock_all(&self, mut keys: Vec<K>) -> Vec<OwnedMutexGuard<()>> {
        keys.sort();
        keys.dedup();
        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            guards.push(self.lock(key).await);
        }
        guards
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn same_key_is_exclusive() {
        let locks = Arc::new(KeyedLocks::<u32>::default());
        let guard = locks.lock(7).await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.lock(7).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn different_keys_do_not_block() {
        let locks = KeyedLocks::<u32>::default();
        let _a = locks.lock(1).await;
        let _b = locks.lock(2).await;
    }

    #[tokio::test]
    async fn lock_all_dedups_keys() {
        let locks = KeyedLocks::<u32>::default();
        let guards = locks.lock_all(vec![3, 1, 3]).await;
        assert_eq!(guards.len(), 2);
    }
}
