//  Copyright 2026 EBEE Authors
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

use std::hash::BuildHasher;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ebee_core::host::Host;
use hashbrown::HashMap;
use parking_lot::{ArcMutexGuard, Mutex, RawMutex};

use crate::item::Item;

type Bucket = HashMap<Box<[u8]>, Item, ahash::RandomState>;

/// A sharded key/value table standing in for `spec.md`'s "Host cache"
/// collaborator: a hash table over keys, one lock per bucket, and the
/// refcount/unlink primitives `ebee-core` downcalls into.
///
/// Sharding here plays the same role `EMB_LOCK_SHARD`-indexed spinlocks play
/// in `original_source/embeddings.c`: `item_trylock(hv)` never blocks, it
/// either gets the one lock that covers `hv`'s bucket or reports contention.
pub struct Store {
    shards: Vec<Arc<Mutex<Bucket>>>,
    hasher: ahash::RandomState,
    capacity: usize,
    len: AtomicUsize,
}

impl Store {
    pub fn new(shard_count: usize, capacity: usize) -> Self {
        assert!(shard_count > 0, "shard count must be positive");
        let shards = (0..shard_count)
            .map(|_| Arc::new(Mutex::new(Bucket::default())))
            .collect();
        Self {
            shards,
            hasher: ahash::RandomState::new(),
            capacity,
            len: AtomicUsize::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The host's `hash(key, nkey)` downcall: a stable hash over key bytes,
    /// independent of item identity.
    pub fn hash_key(&self, key: &[u8]) -> u64 {
        self.hasher.hash_one(key)
    }

    fn shard_index(&self, hv: u64) -> usize {
        (hv as usize) % self.shards.len()
    }

    /// GET: returns the live item, if any, without touching EBEE.
    pub fn get(&self, key: &[u8]) -> Option<Item> {
        let hv = self.hash_key(key);
        let shard = self.shards[self.shard_index(hv)].lock();
        shard.get(key).cloned()
    }

    /// SET: always installs `value` under `key`, replacing whatever was
    /// there. Does not itself call into EBEE; the caller (`HostCache`) does
    /// that, mirroring the split between the host's command path and its
    /// `emb_update_object` upcall in `original_source/embeddings.c`.
    ///
    /// Returns the item that previously lived under `key`, if any, so the
    /// caller can unlink it from EBEE's bookkeeping — a SET that overwrites
    /// a tracked key must retire the old identity, or it would linger in
    /// the sample pool as a phantom entry that `find_and_evict` could later
    /// select and unlink against a bucket slot a different, newer item now
    /// occupies.
    pub fn insert(&self, key: &[u8], value: Box<[u8]>) -> (Item, Option<Item>) {
        let hv = self.hash_key(key);
        let idx = self.shard_index(hv);
        let mut shard = self.shards[idx].lock();
        let item = Item::new(key.to_vec().into_boxed_slice(), value, hv);
        let replaced = shard.insert(key.to_vec().into_boxed_slice(), item.clone());
        if replaced.is_none() {
            self.len.fetch_add(1, Ordering::Relaxed);
        }
        (item, replaced)
    }
}

impl Host for Arc<Store> {
    type Item = Item;
    type LockToken = ArcMutexGuard<RawMutex, Bucket>;

    fn hash(&self, item: &Item) -> u64 {
        item.hv()
    }

    fn is_linked(&self, item: &Item) -> bool {
        item.is_linked()
    }

    fn ref_incr(&self, item: &Item) {
        item.ebee_ref_incr();
    }

    fn ref_decr(&self, item: &Item) {
        item.ebee_ref_decr();
    }

    fn item_trylock(&self, hv: u64) -> Option<Self::LockToken> {
        let idx = self.shard_index(hv);
        self.shards[idx].clone().try_lock_arc()
    }

    fn item_trylock_unlock(&self, _token: Self::LockToken) {}

    fn item_unlink(
        &self,
        item: &Item,
        hv: u64,
        token: &mut Self::LockToken,
        on_remove: &dyn Fn(&Item, u64),
    ) {
        // The bucket's current occupant for this key may already be a
        // different, newer identity (a SET raced ahead of us and
        // overwrote the key) — only remove the bucket entry if it's
        // still `item` itself, identified by pointer equality, not key
        // bytes. Either way `item`'s own bookkeeping is retired.
        if token.get(item.key()) == Some(item) {
            token.remove(item.key());
            self.len.fetch_sub(1, Ordering::Relaxed);
        }
        item.unlink();
        on_remove(item, hv);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get_round_trips_the_value() {
        let store = Store::new(4, 1024);
        let _ = store.insert(b"k", b"v".to_vec().into_boxed_slice());
        let item = store.get(b"k").unwrap();
        assert_eq!(item.value(), b"v");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn insert_of_an_existing_key_replaces_without_growing_len() {
        let store = Store::new(4, 1024);
        let (first, replaced) = store.insert(b"k", b"v1".to_vec().into_boxed_slice());
        assert!(replaced.is_none());
        let (_second, replaced) = store.insert(b"k", b"v2".to_vec().into_boxed_slice());
        assert_eq!(replaced.as_ref(), Some(&first));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(b"k").unwrap().value(), b"v2");
    }

    #[test]
    fn get_of_a_missing_key_is_none() {
        let store = Store::new(4, 1024);
        assert!(store.get(b"nope").is_none());
    }

    #[test]
    fn item_unlink_removes_from_the_bucket_and_decrements_len() {
        let store = Arc::new(Store::new(4, 1024));
        let (item, _replaced) = store.insert(b"k", b"v".to_vec().into_boxed_slice());
        let hv = store.hash_key(b"k");
        let mut token = store.item_trylock(hv).unwrap();
        let mut called = false;
        store.item_unlink(&item, hv, &mut token, &|_it, _hv| {
            called = true;
        });
        store.item_trylock_unlock(token);
        assert!(called);
        assert_eq!(store.len(), 0);
        assert!(store.get(b"k").is_none());
        assert!(!item.is_linked());
    }
}
