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

use std::cell::RefCell;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

thread_local! {
    static RNG: RefCell<SmallRng> = RefCell::new(SmallRng::seed_from_u64(seed()));
}

fn seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let tid = {
        use std::hash::{Hash, Hasher};
        let mut hasher = ahash::AHasher::default();
        std::thread::current().id().hash(&mut hasher);
        hasher.finish()
    };
    nanos ^ tid
}

/// Returns a uniformly random index in `[0, n)`. Panics if `n == 0`.
pub fn gen_range(n: usize) -> usize {
    RNG.with(|rng| rng.borrow_mut().gen_range(0..n))
}

/// Returns a uniformly random `f32` in `[-1.0, 1.0)`.
pub fn gen_component() -> f32 {
    RNG.with(|rng| rng.borrow_mut().gen_range(-1.0f32..1.0f32))
}
