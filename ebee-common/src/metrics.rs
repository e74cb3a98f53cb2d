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

use std::sync::atomic::{AtomicU64, Ordering};

use metrics::counter;

/// Process-wide counters for the engine's hot paths.
///
/// Every field is mirrored into the global `metrics` registry under
/// `ebee_*` so the numbers show up next to whatever else the process
/// exports, while the atomics stay the cheap, always-available source of
/// truth tests read directly.
#[derive(Debug, Default)]
pub struct Metrics {
    pub accesses: AtomicU64,
    pub new_entries: AtomicU64,
    pub evictions: AtomicU64,
    pub removes: AtomicU64,
    pub contention_misses: AtomicU64,
    pub degenerate_reinits: AtomicU64,
}

impl Metrics {
    pub fn record_access(&self) {
        self.accesses.fetch_add(1, Ordering::Relaxed);
        counter!("ebee_accesses_total").increment(1);
    }

    pub fn record_new_entry(&self) {
        self.new_entries.fetch_add(1, Ordering::Relaxed);
        counter!("ebee_new_entries_total").increment(1);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
        counter!("ebee_evictions_total").increment(1);
    }

    pub fn record_remove(&self) {
        self.removes.fetch_add(1, Ordering::Relaxed);
        counter!("ebee_removes_total").increment(1);
    }

    pub fn record_contention_miss(&self) {
        self.contention_misses.fetch_add(1, Ordering::Relaxed);
        counter!("ebee_contention_misses_total").increment(1);
    }

    pub fn record_degenerate_reinit(&self) {
        self.degenerate_reinits.fetch_add(1, Ordering::Relaxed);
        counter!("ebee_degenerate_reinits_total").increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero_and_accumulate() {
        let m = Metrics::default();
        assert_eq!(m.accesses.load(Ordering::Relaxed), 0);
        m.record_access();
        m.record_access();
        m.record_eviction();
        assert_eq!(m.accesses.load(Ordering::Relaxed), 2);
        assert_eq!(m.evictions.load(Ordering::Relaxed), 1);
    }
}
