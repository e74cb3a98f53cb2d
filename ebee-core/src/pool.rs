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

use crate::item::Item;
use crate::rng;

/// The dense array half of the map/pool bijection, guarded by the
/// pool-size lock described in the concurrency model.
///
/// `swap_remove` and `peek_tail` are the two operations the eviction path
/// and the removal path build on; both run under the pool-size lock held
/// by the caller (this type has no locking of its own — that's the
/// caller's job, so the same lock can also cover the size check it's
/// named after).
pub struct SamplePool<I: Item> {
    items: Vec<I>,
    capacity: usize,
}

impl<I: Item> SamplePool<I> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Appends `item`, returning its new index. Caller must have already
    /// verified `!is_full()`.
    pub fn append(&mut self, item: I) -> u32 {
        debug_assert!(!self.is_full());
        self.items.push(item);
        (self.items.len() - 1) as u32
    }

    /// Picks a uniformly random occupied index. `None` iff empty.
    pub fn sample_random(&self) -> Option<u32> {
        if self.items.is_empty() {
            return None;
        }
        Some(rng::gen_range(self.items.len()) as u32)
    }

    pub fn get(&self, idx: u32) -> Option<&I> {
        self.items.get(idx as usize)
    }

    /// The identity currently occupying the last slot, without mutating
    /// anything. Lets a caller learn which item a `swap_remove` would move
    /// *before* deciding what other locks it needs to take.
    pub fn peek_tail(&self) -> Option<&I> {
        self.items.last()
    }

    pub fn tail_index(&self) -> Option<u32> {
        if self.items.is_empty() {
            None
        } else {
            Some((self.items.len() - 1) as u32)
        }
    }

    /// Removes the item at `idx` by swapping the tail into its place.
    /// Returns the identity that was moved into `idx`, or `None` if `idx`
    /// was already the tail (nothing needed moving).
    pub fn swap_remove(&mut self, idx: u32) -> Option<I> {
        let idx = idx as usize;
        let last = self.items.len() - 1;
        if idx == last {
            self.items.pop();
            None
        } else {
            self.items.swap(idx, last);
            let moved = self.items.pop().expect("checked non-empty above");
            Some(moved)
        }
    }
}
