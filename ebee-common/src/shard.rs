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

use parking_lot::Mutex;

/// A fixed number of independently-locked slices of `T`, indexed by hash
/// value modulo shard count.
///
/// This is the concurrency substrate shared by the embedding map: one
/// lock acquisition protects everything that lives in a single shard,
/// never more, never less.
pub struct Sharded<T> {
    shards: Box<[Mutex<T>]>,
}

impl<T> Sharded<T> {
    pub fn new(count: usize, mut make: impl FnMut() -> T) -> Self {
        assert!(count > 0, "shard count must be positive");
        let shards = (0..count).map(|_| Mutex::new(make())).collect();
        Self { shards }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.shards.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    #[inline]
    pub fn index_of(&self, hv: u64) -> usize {
        (hv as usize) % self.shards.len()
    }

    #[inline]
    pub fn shard(&self, idx: usize) -> &Mutex<T> {
        &self.shards[idx]
    }

    #[inline]
    pub fn shard_for(&self, hv: u64) -> &Mutex<T> {
        self.shard(self.index_of(hv))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mutex<T>> {
        self.shards.iter()
    }
}
