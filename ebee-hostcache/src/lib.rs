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

//! A minimal host cache implementing `ebee_core::Host`, standing in for
//! `spec.md`'s "Host cache" external collaborator so `ebee-core` can be
//! exercised, benchmarked, and tested end to end.

pub mod cache;
pub mod item;
pub mod store;

pub use cache::HostCache;
pub use item::Item;
pub use store::Store;
