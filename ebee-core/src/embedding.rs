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

use ebee_common::config::EMBEDDING_DIM;

use crate::rng;

/// A single point in the embedding space. Always kept unit-norm outside of
/// the brief window between an additive update and its renormalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Embedding(pub [f32; EMBEDDING_DIM]);

impl Embedding {
    pub const ZERO: Embedding = Embedding([0.0; EMBEDDING_DIM]);

    /// A fresh random unit vector, used to seed a newly-tracked item and
    /// to recover from degenerate (near-zero-norm) renormalization.
    pub fn random() -> Self {
        let mut v = [0.0f32; EMBEDDING_DIM];
        for c in v.iter_mut() {
            *c = rng::gen_component();
        }
        let mut e = Embedding(v);
        if e.normalize().is_err() {
            // vanishingly unlikely, but a row of exact zeros is possible
            e = Embedding::axis(0);
        }
        e
    }

    fn axis(i: usize) -> Self {
        let mut v = [0.0f32; EMBEDDING_DIM];
        v[i] = 1.0;
        Embedding(v)
    }

    pub fn norm(&self) -> f32 {
        self.0.iter().map(|c| c * c).sum::<f32>().sqrt()
    }

    /// Normalizes in place. Returns `Err(())` if the vector's norm is too
    /// small to normalize meaningfully, leaving `self` untouched.
    pub fn normalize(&mut self) -> Result<(), ()> {
        let n = self.norm();
        if n <= f32::EPSILON {
            return Err(());
        }
        for c in self.0.iter_mut() {
            *c /= n;
        }
        Ok(())
    }

    /// Normalizes, falling back to a fresh random unit vector if the norm
    /// has collapsed to (near) zero. Returns whether a reinit happened.
    pub fn normalize_or_reinit(&mut self) -> bool {
        if self.normalize().is_err() {
            *self = Embedding::random();
            true
        } else {
            false
        }
    }

    /// `self += alpha * other`, the literal update rule from the design
    /// (deliberately not a convex combination — see `EbeeConfig::additive_update`).
    pub fn scaled_add(&mut self, alpha: f32, other: &Embedding) {
        for (c, o) in self.0.iter_mut().zip(other.0.iter()) {
            *c += alpha * o;
        }
    }

    /// `self = (1 - alpha) * self + alpha * other`, the convex-combination
    /// variant some callers prefer over the literal additive rule.
    pub fn convex_update(&mut self, alpha: f32, other: &Embedding) {
        for (c, o) in self.0.iter_mut().zip(other.0.iter()) {
            *c = (1.0 - alpha) * *c + alpha * o;
        }
    }

    pub fn dot(&self, other: &Embedding) -> f32 {
        self.0.iter().zip(other.0.iter()).map(|(a, b)| a * b).sum()
    }

    /// True cosine similarity: `dot(a, b) / (|a| * |b|)`. Guards against
    /// floating-point norm drift rather than assuming both operands are
    /// already unit vectors.
    pub fn cosine_similarity(&self, other: &Embedding) -> f32 {
        let denom = self.norm() * other.norm();
        if denom <= f32::EPSILON {
            return 0.0;
        }
        self.dot(other) / denom
    }

    pub fn add_scaled_into(&mut self, other: &Embedding, scale: f32) {
        for (c, o) in self.0.iter_mut().zip(other.0.iter()) {
            *c += scale * o;
        }
    }

    pub fn sub_scaled_into(&mut self, other: &Embedding, scale: f32) {
        for (c, o) in self.0.iter_mut().zip(other.0.iter()) {
            *c -= scale * o;
        }
    }
}

impl Default for Embedding {
    fn default() -> Self {
        Embedding::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_is_unit_norm() {
        for _ in 0..256 {
            let e = Embedding::random();
            assert!((e.norm() - 1.0).abs() < 1e-4, "norm = {}", e.norm());
        }
    }

    #[test]
    fn cosine_similarity_of_identical_vectors_is_one() {
        let e = Embedding::random();
        assert!((e.cosine_similarity(&e) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn cosine_similarity_is_scale_invariant() {
        let e = Embedding::random();
        let mut scaled = e;
        for c in scaled.0.iter_mut() {
            *c *= 3.0;
        }
        assert!((e.cosine_similarity(&scaled) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn normalize_or_reinit_recovers_from_zero_vector() {
        let mut e = Embedding::ZERO;
        let reinit = e.normalize_or_reinit();
        assert!(reinit);
        assert!((e.norm() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn scaled_add_matches_manual_formula() {
        let mut e = Embedding([1.0; EMBEDDING_DIM]);
        let other = Embedding([2.0; EMBEDDING_DIM]);
        e.scaled_add(0.5, &other);
        assert_eq!(e.0[0], 2.0);
    }
}
