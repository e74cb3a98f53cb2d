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

use ebee_common::config::EbeeConfig;
use ebee_common::metrics::Metrics;
use parking_lot::Mutex;

use crate::embedding::Embedding;
use crate::host::Host;
use crate::map::{EmbeddingMap, MapEntry};
use crate::pool::SamplePool;

/// The engine: owns the embedding map, sample pool, and rolling-average
/// ring, and drives them from the host's upcalls.
///
/// Lock acquisition always follows one order: pool-size lock, then
/// item-embedding lock(s) (ascending shard id when two are needed), then
/// (implicitly, inside the host) the ring-buffer lock is never held
/// alongside either, since `ring.push` is always called after every map
/// and pool guard above it has already dropped.
pub struct Engine<H: Host> {
    host: H,
    map: EmbeddingMap<H::Item>,
    pool: Mutex<SamplePool<H::Item>>,
    ring: crate::ring::RollingAverageRing,
    metrics: Metrics,
    config: EbeeConfig,
}

impl<H: Host> Engine<H> {
    pub fn new(host: H, config: EbeeConfig) -> Self {
        Self {
            host,
            map: EmbeddingMap::new(config.lock_shards),
            pool: Mutex::new(SamplePool::new(config.pool_capacity)),
            ring: crate::ring::RollingAverageRing::new(config.ring_len),
            metrics: Metrics::default(),
            config,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn config(&self) -> &EbeeConfig {
        &self.config
    }

    /// Number of items currently tracked. Diagnostic only.
    pub fn tracked_len(&self) -> usize {
        self.pool.lock().len()
    }

    /// Called on every cache hit (and every successful insert). Ensures
    /// `item` is tracked, nudges its embedding toward the current
    /// rolling-average centroid, and folds the updated embedding back
    /// into that rolling average.
    pub fn on_access(&self, item: &H::Item) {
        if !self.host.is_linked(item) {
            return;
        }
        let hv = self.host.hash(item);
        self.metrics.record_access();

        // pool-size lock, then item-embedding shard: always in that
        // order, even when the item already exists and the pool guard
        // ends up unused, so a concurrent on_remove can never observe the
        // two locks taken the other way around.
        let mut pool = self.pool.lock();
        let mut shard = self.map.lock_shard(hv);

        if !shard.contains_key(item) {
            if pool.is_full() {
                drop(shard);
                drop(pool);
                ebee_common::error::fatal(format!(
                    "sample pool exhausted its configured capacity ({})",
                    self.config.pool_capacity
                ));
            }
            let pool_idx = pool.append(item.clone());
            shard.insert(
                item.clone(),
                MapEntry {
                    embedding: Embedding::random(),
                    pool_idx,
                },
            );
            self.host.ref_incr(item);
            self.metrics.record_new_entry();
        }
        drop(pool);

        let rolling_avg = self.ring.average();
        let updated;
        let reinit;
        {
            let entry = shard
                .get_mut(item)
                .expect("item was just looked up or inserted above");
            if self.config.additive_update {
                entry.embedding.scaled_add(self.config.alpha, &rolling_avg);
            } else {
                entry.embedding.convex_update(self.config.alpha, &rolling_avg);
            }
            reinit = entry.embedding.normalize_or_reinit();
            updated = entry.embedding;
        }
        drop(shard);

        if reinit {
            self.metrics.record_degenerate_reinit();
        }
        self.ring.push(updated);
    }

    /// Samples up to `sample_count` candidates and evicts whichever is
    /// least similar to the current rolling-average centroid. Returns
    /// whether an item was actually evicted.
    pub fn find_and_evict(&self) -> bool {
        if self.pool.lock().is_empty() {
            return false;
        }
        let rolling_avg = self.ring.average();
        let mut best: Option<(H::Item, u64, f32)> = None;

        for _ in 0..self.config.sample_count {
            let candidate = {
                let pool = self.pool.lock();
                match pool.sample_random() {
                    Some(idx) => pool.get(idx).cloned(),
                    None => None,
                }
            };
            let Some(candidate) = candidate else {
                break;
            };

            let hv = self.host.hash(&candidate);
            self.host.ref_incr(&candidate);

            let sim = {
                let shard = self.map.lock_shard(hv);
                shard
                    .get(&candidate)
                    .map(|e| e.embedding.cosine_similarity(&rolling_avg))
            };

            let Some(sim) = sim else {
                // The entry vanished between sampling and lookup: benign,
                // counted as a contention miss, not an error.
                self.host.ref_decr(&candidate);
                self.metrics.record_contention_miss();
                continue;
            };

            let replace = match &best {
                Some((_, _, best_sim)) => sim < *best_sim,
                None => true,
            };
            if replace {
                if let Some((old_item, _, _)) = best.take() {
                    self.host.ref_decr(&old_item);
                }
                best = Some((candidate, hv, sim));
            } else {
                self.host.ref_decr(&candidate);
            }
        }

        let Some((victim, hv, _)) = best else {
            return false;
        };

        let mut token = match self.host.item_trylock(hv) {
            Some(token) => token,
            None => {
                self.host.ref_decr(&victim);
                self.metrics.record_contention_miss();
                return false;
            }
        };

        self.host
            .item_unlink(&victim, hv, &mut token, &|it, hv| self.on_remove(it, hv));
        self.host.item_trylock_unlock(token);
        self.host.ref_decr(&victim);
        self.metrics.record_eviction();
        true
    }

    /// Called by the host (from within `item_unlink`, with that item's
    /// host-side lock still held) once `item` has been unlinked from the
    /// host's own structures. Removes `item` from the sample pool and
    /// embedding map, maintaining the bijection between the two.
    pub fn on_remove(&self, item: &H::Item, hv: u64) {
        let mut pool = self.pool.lock();
        let tail = match pool.peek_tail() {
            Some(t) => t.clone(),
            None => return,
        };
        let tail_hv = self.host.hash(&tail);
        let item_shard_idx = self.map.shard_index(hv);
        let tail_shard_idx = self.map.shard_index(tail_hv);

        if item_shard_idx == tail_shard_idx {
            let mut shard = self.map.lock_shard_by_index(item_shard_idx);
            let idx = match shard.get(item) {
                Some(entry) => entry.pool_idx,
                None => return,
            };
            let moved = pool.swap_remove(idx);
            Self::verify_moved_matches_tail(&moved, &tail);
            if let Some(moved_item) = moved {
                match shard.get_mut(&moved_item) {
                    Some(e) => e.pool_idx = idx,
                    None => ebee_common::error::fatal(
                        "swap-removed item has no entry in its own map shard",
                    ),
                }
            }
            shard.remove(item);
        } else {
            let (lo_idx, hi_idx) = if item_shard_idx < tail_shard_idx {
                (item_shard_idx, tail_shard_idx)
            } else {
                (tail_shard_idx, item_shard_idx)
            };
            let mut lo = self.map.lock_shard_by_index(lo_idx);
            let mut hi = self.map.lock_shard_by_index(hi_idx);

            let pool_idx = if item_shard_idx == lo_idx {
                lo.get(item).map(|e| e.pool_idx)
            } else {
                hi.get(item).map(|e| e.pool_idx)
            };
            let idx = match pool_idx {
                Some(idx) => idx,
                None => return,
            };

            let moved = pool.swap_remove(idx);
            Self::verify_moved_matches_tail(&moved, &tail);
            if let Some(moved_item) = moved {
                let target = if tail_shard_idx == lo_idx { &mut lo } else { &mut hi };
                match target.get_mut(&moved_item) {
                    Some(e) => e.pool_idx = idx,
                    None => ebee_common::error::fatal(
                        "swap-removed item has no entry in its own map shard",
                    ),
                }
            }
            let own = if item_shard_idx == lo_idx { &mut lo } else { &mut hi };
            own.remove(item);
        }

        self.metrics.record_remove();
        self.host.ref_decr(item);
    }

    fn verify_moved_matches_tail(moved: &Option<H::Item>, tail: &H::Item) {
        if let Some(m) = moved {
            if m != tail {
                ebee_common::error::fatal(
                    "sample pool swap-remove moved an unexpected item: bijection invariant violated",
                );
            }
        }
    }

    /// Re-derives the bijection and unit-norm invariants from scratch.
    /// Locks every shard plus the pool in ascending order; for tests and
    /// out-of-band soak checks only, never a hot path.
    pub fn check_invariants(&self) -> ebee_common::Result<()> {
        if let Some(msg) = self.ring.consistency_error(1e-3) {
            return Err(ebee_common::EbeeError::InvariantViolation(msg));
        }
        let pool = self.pool.lock();
        if pool.len() != self.map.len() {
            return Err(ebee_common::EbeeError::InvariantViolation(format!(
                "pool has {} items but map tracks {}",
                pool.len(),
                self.map.len()
            )));
        }
        for idx in 0..pool.len() as u32 {
            let item = pool.get(idx).expect("idx within bounds");
            let hv = self.host.hash(item);
            let shard = self.map.lock_shard(hv);
            let entry = shard.get(item).ok_or_else(|| {
                ebee_common::EbeeError::InvariantViolation(format!(
                    "pool slot {idx} has no corresponding map entry"
                ))
            })?;
            if entry.pool_idx != idx {
                return Err(ebee_common::EbeeError::InvariantViolation(format!(
                    "map entry's pool_idx ({}) does not match its actual slot ({idx})",
                    entry.pool_idx
                )));
            }
            let norm = entry.embedding.norm();
            if (norm - 1.0).abs() > 1e-3 {
                return Err(ebee_common::EbeeError::InvariantViolation(format!(
                    "embedding at pool slot {idx} has norm {norm}, expected ~1.0"
                )));
            }
        }
        Ok(())
    }
}
