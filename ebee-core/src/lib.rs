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

//! The embedding-based eviction engine.
//!
//! An [`Engine`] is generic over a [`Host`]: the cache it's embedded in.
//! The host drives it through four upcalls (`on_access`, `find_and_evict`,
//! `on_remove`, plus construction) and the engine drives the host back
//! through the handful of downcalls [`Host`] declares.

pub mod embedding;
pub mod engine;
pub mod host;
pub mod item;
pub mod map;
pub mod pool;
pub mod ring;
pub mod rng;

pub use embedding::Embedding;
pub use engine::Engine;
pub use host::Host;
pub use item::Item;
