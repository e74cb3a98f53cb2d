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

use serde::{Deserialize, Serialize};

/// Embedding dimensionality. Fixed by the design, not a runtime tunable.
pub const EMBEDDING_DIM: usize = 16;

/// Runtime-tunable knobs for the engine.
///
/// `alpha` and `additive_update` are both exposed, rather than hard-coding
/// the additive `e += alpha * rolling_avg` learning rule, so a caller that
/// wants the convex-combination variant (`e = (1 - alpha) * e + alpha *
/// rolling_avg`) can opt into it without touching `ebee-core`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EbeeConfig {
    /// Number of rolling-average ring slots (H).
    pub ring_len: usize,
    /// Embedding learning rate (alpha).
    pub alpha: f32,
    /// Use the convex-combination update rule instead of the literal
    /// additive one.
    pub additive_update: bool,
    /// Number of candidates sampled per eviction attempt (K).
    pub sample_count: usize,
    /// Maximum number of items tracked at once, bounding both the sample
    /// pool and the embedding map.
    pub pool_capacity: usize,
    /// Number of independent lock shards (S) for the embedding map.
    pub lock_shards: usize,
}

impl Default for EbeeConfig {
    fn default() -> Self {
        Self {
            ring_len: 50,
            alpha: 0.1,
            additive_update: true,
            sample_count: 32,
            pool_capacity: 1 << 20,
            lock_shards: 128,
        }
    }
}

impl EbeeConfig {
    /// A config scaled down for fast-running tests.
    pub fn for_tests() -> Self {
        Self {
            ring_len: 8,
            alpha: 0.1,
            additive_update: true,
            sample_count: 4,
            pool_capacity: 256,
            lock_shards: 8,
        }
    }
}
