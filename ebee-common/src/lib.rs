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

//! Ambient infrastructure shared by the `ebee-*` crates: errors, metrics,
//! configuration, and the sharded-lock primitive the embedding map is
//! built on.

pub mod config;
pub mod error;
pub mod metrics;
pub mod shard;

pub use config::EbeeConfig;
pub use error::{EbeeError, Result};
pub use metrics::Metrics;
pub use shard::Sharded;
