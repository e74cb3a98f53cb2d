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

use crate::embedding::Embedding;

struct RingState {
    slots: Vec<Embedding>,
    running_sum: Embedding,
    cursor: usize,
}

/// A fixed-size ring of the last `H` accessed embeddings, maintained as a
/// running sum so the rolling average is an O(1) read.
///
/// `push` subtracts the slot about to be overwritten out of the running
/// sum (scaled by `1/H`), writes the new embedding into that slot, and
/// adds it back in at the same scale — so `running_sum` is always exactly
/// the average of whatever's currently in `slots`, never a value that
/// needs a division at read time.
pub struct RollingAverageRing {
    state: Mutex<RingState>,
    len: usize,
}

impl RollingAverageRing {
    pub fn new(len: usize) -> Self {
        assert!(len > 0, "ring length must be positive");
        Self {
            state: Mutex::new(RingState {
                slots: vec![Embedding::ZERO; len],
                running_sum: Embedding::ZERO,
                cursor: 0,
            }),
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Folds `embedding` into the ring, evicting the oldest slot.
    pub fn push(&self, embedding: Embedding) {
        let scale = 1.0 / self.len as f32;
        let mut state = self.state.lock();
        let cursor = state.cursor;
        let old = state.slots[cursor];
        state.running_sum.sub_scaled_into(&old, scale);
        state.running_sum.add_scaled_into(&embedding, scale);
        state.slots[cursor] = embedding;
        state.cursor = (cursor + 1) % self.len;
    }

    /// The current rolling average (workload centroid).
    pub fn average(&self) -> Embedding {
        self.state.lock().running_sum
    }

    /// Recomputes the sum directly from the ring slots and compares it
    /// against the incrementally-maintained running sum, catching drift
    /// between the two without exposing the slots themselves. `Some`
    /// describes the mismatch if any component disagrees by more than
    /// `eps`; `None` means the two agree.
    pub fn consistency_error(&self, eps: f32) -> Option<String> {
        let state = self.state.lock();
        let scale = 1.0 / self.len as f32;
        let mut recomputed = Embedding::ZERO;
        for slot in &state.slots {
            recomputed.add_scaled_into(slot, scale);
        }
        for (recomputed_c, running_c) in recomputed.0.iter().zip(state.running_sum.0.iter()) {
            if (recomputed_c - running_c).abs() > eps {
                return Some(format!(
                    "running sum component {running_c} disagrees with the sum recomputed from \
                     ring slots ({recomputed_c}) by more than {eps}"
                ));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_of_a_single_push_into_an_empty_ring() {
        let ring = RollingAverageRing::new(4);
        let e = Embedding([1.0; 16]);
        ring.push(e);
        let avg = ring.average();
        for c in avg.0 {
            assert!((c - 0.25).abs() < 1e-6, "{c}");
        }
    }

    #[test]
    fn average_after_filling_the_ring_with_the_same_vector_matches_it_scaled() {
        let ring = RollingAverageRing::new(4);
        let e = Embedding([2.0; 16]);
        for _ in 0..4 {
            ring.push(e);
        }
        let avg = ring.average();
        for c in avg.0 {
            assert!((c - 2.0).abs() < 1e-5, "{c}");
        }
    }

    #[test]
    fn oldest_entry_is_evicted_once_the_ring_wraps() {
        let ring = RollingAverageRing::new(2);
        ring.push(Embedding([10.0; 16]));
        ring.push(Embedding([0.0; 16]));
        ring.push(Embedding([0.0; 16]));
        let avg = ring.average();
        for c in avg.0 {
            assert!(c.abs() < 1e-5, "{c}");
        }
    }

    #[test]
    fn running_sum_stays_consistent_with_ring_slots_after_many_pushes() {
        let ring = RollingAverageRing::new(8);
        for i in 0..50 {
            let v = (i % 7) as f32 - 3.0;
            ring.push(Embedding([v; 16]));
        }
        assert_eq!(ring.consistency_error(1e-3), None);
    }
}
