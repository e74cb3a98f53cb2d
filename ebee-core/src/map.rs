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

use ebee_common::shard::Sharded;
use hashbrown::HashMap;
use parking_lot::MutexGuard;

use crate::embedding::Embedding;
use crate::item::Item;

/// Everything the map tracks about a single item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapEntry {
    pub embedding: Embedding,
    pub pool_idx: u32,
}

/// One shard's worth of the embedding map: a plain hash map guarded by a
/// single mutex, covering both an item's embedding and its `pool_idx`
/// together so the two can never be observed out of sync with each other.
pub type MapShard<I> = HashMap<I, MapEntry, ahash::RandomState>;

/// A sharded `Item -> MapEntry` table.
///
/// Unlike the teacher's intrusive, pointer-chasing handle architecture,
/// this stores owned `MapEntry` values directly in safe hash maps: an
/// `Embedding` is 64 bytes and `Copy`, and EBEE never owns the item's
/// payload, so there is nothing here that benefits from an intrusive
/// layout.
pub struct EmbeddingMap<I: Item> {
    shards: Sharded<MapShard<I>>,
}

impl<I: Item> EmbeddingMap<I> {
    pub fn new(shard_count: usize) -> Self {
        Self {
            shards: Sharded::new(shard_count, HashMap::default),
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    pub fn shard_index(&self, hv: u64) -> usize {
        self.shards.index_of(hv)
    }

    pub fn lock_shard(&self, hv: u64) -> MutexGuard<'_, MapShard<I>> {
        self.shards.shard_for(hv).lock()
    }

    pub fn lock_shard_by_index(&self, idx: usize) -> MutexGuard<'_, MapShard<I>> {
        self.shards.shard(idx).lock()
    }

    /// Total tracked entries. Acquires every shard lock in ascending
    /// order; for diagnostics only, never on a hot path.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|m| m.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
