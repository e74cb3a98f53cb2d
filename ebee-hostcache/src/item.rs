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

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// The payload and bookkeeping the host keeps for one cached key.
///
/// `hv` is computed once, at construction, from the key bytes, matching the
/// host's `hash(key, nkey)` downcall: EBEE never recomputes it, it just asks
/// for it via [`Item::hv`].
struct ItemInner {
    key: Box<[u8]>,
    value: Box<[u8]>,
    hv: u64,
    linked: AtomicBool,
    /// The refcount EBEE itself drives via `ref_incr`/`ref_decr`, tracked
    /// separately from `Arc`'s own strong count so tests can assert the
    /// "refcount balance" property from the spec without that assertion
    /// depending on how many `Item` clones happen to be alive for other
    /// reasons (e.g. a GET response still in flight).
    ebee_refs: AtomicUsize,
}

/// A cheaply-cloneable handle to one cached item.
///
/// Identity, not key bytes, is what the embedding map and sample pool key
/// on — two `Item`s are equal iff they're handles to the same allocation,
/// exactly as `spec.md` §4.1 requires ("entries compare by item identity,
/// pointer equality, not key bytes").
#[derive(Clone)]
pub struct Item(Arc<ItemInner>);

impl Item {
    pub(crate) fn new(key: Box<[u8]>, value: Box<[u8]>, hv: u64) -> Self {
        Item(Arc::new(ItemInner {
            key,
            value,
            hv,
            linked: AtomicBool::new(true),
            ebee_refs: AtomicUsize::new(0),
        }))
    }

    pub fn key(&self) -> &[u8] {
        &self.0.key
    }

    pub fn value(&self) -> &[u8] {
        &self.0.value
    }

    pub fn hv(&self) -> u64 {
        self.0.hv
    }

    pub fn is_linked(&self) -> bool {
        self.0.linked.load(Ordering::Acquire)
    }

    pub(crate) fn unlink(&self) {
        self.0.linked.store(false, Ordering::Release);
    }

    pub(crate) fn ebee_ref_incr(&self) {
        self.0.ebee_refs.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn ebee_ref_decr(&self) {
        let prev = self.0.ebee_refs.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(prev > 0, "ebee ref_decr underflow");
    }

    /// EBEE-driven refcount. Zero once an item is untracked, per the
    /// "refcount balance" testable property.
    pub fn ebee_refs(&self) -> usize {
        self.0.ebee_refs.load(Ordering::Acquire)
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_are_equal_and_distinct_items_are_not() {
        let a = Item::new(b"k".to_vec().into_boxed_slice(), b"v".to_vec().into_boxed_slice(), 1);
        let b = a.clone();
        let c = Item::new(b"k".to_vec().into_boxed_slice(), b"v".to_vec().into_boxed_slice(), 1);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn ebee_refcount_round_trips() {
        let a = Item::new(b"k".to_vec().into_boxed_slice(), b"v".to_vec().into_boxed_slice(), 1);
        a.ebee_ref_incr();
        a.ebee_ref_incr();
        assert_eq!(a.ebee_refs(), 2);
        a.ebee_ref_decr();
        assert_eq!(a.ebee_refs(), 1);
    }

    #[test]
    fn unlink_flips_is_linked() {
        let a = Item::new(b"k".to_vec().into_boxed_slice(), b"v".to_vec().into_boxed_slice(), 1);
        assert!(a.is_linked());
        a.unlink();
        assert!(!a.is_linked());
    }
}
