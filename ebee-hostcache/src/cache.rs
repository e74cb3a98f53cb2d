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

use std::sync::Arc;

use ebee_common::config::EbeeConfig;
use ebee_core::host::Host;
use ebee_core::Engine;

use crate::store::Store;

/// A minimal memcached-shaped cache: a GET/SET/DELETE command surface over
/// [`Store`], wired to an [`Engine`] exactly the way `spec.md` §6 describes
/// the host driving EBEE ("on every GET hit and on successful SET", "from
/// the allocator path when reclaim needed", "from the host's unlink path,
/// unconditionally").
///
/// This plays the role of `spec.md`'s "Host cache" external collaborator —
/// it exists so the engine can be exercised and benchmarked end to end, not
/// as a subject of the specification in its own right.
pub struct HostCache {
    store: Arc<Store>,
    engine: Engine<Arc<Store>>,
}

impl HostCache {
    pub fn new(shard_count: usize, capacity: usize, config: EbeeConfig) -> Self {
        let store = Arc::new(Store::new(shard_count, capacity));
        let engine = Engine::new(store.clone(), config);
        Self { store, engine }
    }

    pub fn engine(&self) -> &Engine<Arc<Store>> {
        &self.engine
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// GET. Returns the cached value, or `None` on a miss. A hit feeds the
    /// item into `on_access`, exactly like the real command path would.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.store.get(key) {
            Some(item) => {
                self.engine.on_access(&item);
                Some(item.value().to_vec())
            }
            None => {
                tracing::trace!(target: "ebee::hostcache", key = ?key, "miss");
                None
            }
        }
    }

    /// SET. Frees space via `find_and_evict` first if the store is at
    /// capacity, matching "from the allocator path when reclaim needed",
    /// then installs the value and runs `on_access` for the new/updated
    /// item, matching "on ... successful SET".
    ///
    /// A SET that overwrites an already-tracked key hands `Store` a fresh
    /// `Item` identity (`spec.md` §4.1 keys the map on identity, not key
    /// bytes), so the old identity is retired via `on_remove` the same way
    /// the host's own unlink path would — otherwise it would linger in the
    /// sample pool, occupying a slot and a bucket hash that now belongs to
    /// a different item.
    pub fn set(&self, key: &[u8], value: Vec<u8>) {
        let mut evict_attempts = 0;
        while self.store.len() >= self.store.capacity() {
            if !self.engine.find_and_evict() {
                evict_attempts += 1;
                if evict_attempts > 64 {
                    tracing::warn!(
                        target: "ebee::hostcache",
                        "gave up reclaiming space after {evict_attempts} attempts"
                    );
                    break;
                }
                std::thread::yield_now();
                continue;
            }
            break;
        }
        let (item, replaced) = self.store.insert(key, value.into_boxed_slice());
        if let Some(old) = replaced {
            old.unlink();
            self.engine.on_remove(&old, old.hv());
        }
        self.engine.on_access(&item);
    }

    /// DELETE, the direct-unlink path the spec's "racing direct `delete`
    /// commands" Open Question discusses (`spec.md` §9). Tries the host's
    /// own per-bucket lock the same way `find_and_evict` does; gives up
    /// after bounded contention rather than blocking, since `spec.md` §5
    /// specifies no internal deadlines but also forbids this path from ever
    /// blocking indefinitely on a badly-timed eviction.
    pub fn delete(&self, key: &[u8]) -> bool {
        let hv = self.store.hash_key(key);
        for _ in 0..64 {
            let Some(mut token) = self.store.item_trylock(hv) else {
                std::thread::yield_now();
                continue;
            };
            let Some(item) = token.get(key).cloned() else {
                self.store.item_trylock_unlock(token);
                return false;
            };
            self.store
                .item_unlink(&item, hv, &mut token, &|it, hv| self.engine.on_remove(it, hv));
            self.store.item_trylock_unlock(token);
            return true;
        }
        false
    }

    pub fn find_and_evict(&self) -> bool {
        self.engine.find_and_evict()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize) -> HostCache {
        let mut config = EbeeConfig::for_tests();
        config.pool_capacity = capacity;
        HostCache::new(4, capacity, config)
    }

    #[test]
    fn set_then_get_round_trips() {
        let cache = cache(16);
        cache.set(b"k", b"v".to_vec());
        assert_eq!(cache.get(b"k"), Some(b"v".to_vec()));
    }

    #[test]
    fn get_of_missing_key_is_none() {
        let cache = cache(16);
        assert_eq!(cache.get(b"missing"), None);
    }

    #[test]
    fn delete_makes_a_subsequent_get_miss() {
        let cache = cache(16);
        cache.set(b"k", b"v".to_vec());
        assert!(cache.delete(b"k"));
        assert_eq!(cache.get(b"k"), None);
    }

    #[test]
    fn delete_of_a_missing_key_returns_false() {
        let cache = cache(16);
        assert!(!cache.delete(b"nope"));
    }

    #[test]
    fn set_past_capacity_triggers_eviction_and_keeps_len_bounded() {
        let cache = cache(4);
        for i in 0..32u32 {
            cache.set(&i.to_le_bytes(), vec![0u8; 8]);
        }
        assert!(cache.len() <= 4);
        cache.engine().check_invariants().unwrap();
    }

    #[test]
    fn repeated_sets_of_the_same_key_do_not_leak_pool_entries() {
        let cache = cache(16);
        for i in 0..64u32 {
            cache.set(b"k", i.to_le_bytes().to_vec());
        }
        // Every SET retires the previous identity via on_remove, so only
        // the current value's item should still be tracked.
        assert_eq!(cache.engine().tracked_len(), 1);
        assert_eq!(cache.get(b"k"), Some(63u32.to_le_bytes().to_vec()));
        cache.engine().check_invariants().unwrap();
    }

    #[test]
    fn evicting_a_retired_overwritten_item_never_touches_the_current_value() {
        let cache = cache(4);
        for i in 0..4u32 {
            cache.set(&i.to_le_bytes(), vec![0u8; 8]);
        }
        // Overwrite key 0 repeatedly; each overwrite retires the previous
        // item but key 0's *current* value must survive any number of
        // `find_and_evict` calls landing on one of its retired ancestors.
        for i in 0..16u32 {
            cache.set(&0u32.to_le_bytes(), i.to_le_bytes().to_vec());
        }
        for _ in 0..32 {
            cache.find_and_evict();
        }
        if let Some(v) = cache.get(&0u32.to_le_bytes()) {
            assert_eq!(v, 15u32.to_le_bytes().to_vec());
        }
        cache.engine().check_invariants().unwrap();
    }
}
