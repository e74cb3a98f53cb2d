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

use std::fmt;

/// Errors surfaced across crate boundaries.
///
/// Transient conditions (contention misses, benign races on already-removed
/// items) are never represented here — callers just retry or move on. Only
/// the two fatal classes make it into this enum.
#[derive(Debug, thiserror::Error)]
pub enum EbeeError {
    #[error("sample pool exhausted its configured capacity ({capacity})")]
    CapacityExceeded { capacity: usize },
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, EbeeError>;

/// Logs a structured fatal event and aborts the process.
///
/// Invariant violations mean the bijection between the sample pool and the
/// embedding map (or some other internal guarantee) has already broken, so
/// nothing downstream of this call can be trusted. In test builds this
/// panics instead of aborting so a single property-test failure doesn't
/// take the whole test binary down with it.
pub fn fatal(msg: impl fmt::Display) -> ! {
    let msg = msg.to_string();
    tracing::error!(target: "ebee::invariant", "{msg}");
    #[cfg(not(test))]
    {
        std::process::abort();
    }
    #[cfg(test)]
    {
        panic!("{msg}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "bijection broken")]
    fn fatal_panics_under_test() {
        fatal("bijection broken");
    }

    #[test]
    fn capacity_exceeded_message() {
        let err = EbeeError::CapacityExceeded { capacity: 1024 };
        assert_eq!(err.to_string(), "sample pool exhausted its configured capacity (1024)");
    }
}
