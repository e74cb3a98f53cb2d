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

use std::hash::Hash;

/// An identity EBEE can track.
///
/// The engine never looks inside an item — it only ever clones, hashes,
/// and compares identities, and hands them back to the host. Anything
/// cheaply cloneable that identifies a cached entry (an `Arc<Inner>`, an
/// interned key, a small key type) satisfies this.
pub trait Item: Clone + Eq + Hash + Send + Sync + 'static {}

impl<T> Item for T where T: Clone + Eq + Hash + Send + Sync + 'static {}
