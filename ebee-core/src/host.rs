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

/// The downcalls EBEE makes into the host cache it's embedded in.
///
/// `item_trylock` returns an owned, lifetime-erased token (the host's
/// answer to "give me something I can hold across a function call without
/// borrowing from you") rather than a borrowed guard — a concrete host
/// typically backs this with `parking_lot`'s `ArcMutexGuard`
/// (`arc_lock` feature).
///
/// `item_unlink` takes that same token by mutable reference instead of
/// re-acquiring anything, and takes an `on_remove` callback instead of
/// holding a stored reference back to the engine: the host never needs to
/// know about `Engine<Self>`, which would otherwise make `Host` and
/// `Engine` circularly dependent on each other. This is also what keeps
/// the forbidden pattern — calling back into `on_remove` while a second,
/// independent EBEE lock is held — structurally impossible: the only lock
/// `item_unlink` can touch is the one already named by `token`.
pub trait Host: Send + Sync + 'static {
    type Item: Item;
    type LockToken;

    /// A stable hash of `item`, used to pick lock shards and pool slots.
    /// Must be consistent for the lifetime of `item`.
    fn hash(&self, item: &Self::Item) -> u64;

    /// Whether the host still considers `item` live. `on_access` is a
    /// no-op when this is false.
    fn is_linked(&self, item: &Self::Item) -> bool;

    fn ref_incr(&self, item: &Self::Item);
    fn ref_decr(&self, item: &Self::Item);

    /// Attempts to acquire the host's own per-bucket lock for `hv`
    /// without blocking. `None` means contention — the caller treats this
    /// as a transient miss, never an error.
    fn item_trylock(&self, hv: u64) -> Option<Self::LockToken>;

    fn item_trylock_unlock(&self, token: Self::LockToken);

    /// Unlinks `item` from the host's own structures using the
    /// already-held `token`, then invokes `on_remove(item, hv)` while that
    /// lock is still held (never while any EBEE lock is held).
    fn item_unlink(
        &self,
        item: &Self::Item,
        hv: u64,
        token: &mut Self::LockToken,
        on_remove: &dyn Fn(&Self::Item, u64),
    );
}
