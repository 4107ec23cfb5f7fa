/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Session identifier generation.

use std::fmt::Debug;
use std::sync::Arc;

/// Produces fresh session identifiers.
///
/// Identifiers must be unique, non-empty, and safe to embed in a URL path segment
/// without escaping. They are only requested when a policy enables sessions and the
/// caller did not supply one.
pub trait IdGenerator: Debug + Send + Sync {
    /// Returns a new session identifier.
    fn new_session_id(&self) -> String;
}

/// Generates time-ordered session identifiers (UUID version 7, simple form).
///
/// Identifiers created later sort after identifiers created earlier, and consist of 32
/// lowercase hex characters.
#[non_exhaustive]
#[derive(Debug, Default)]
pub struct TimeOrderedIdGenerator;

impl TimeOrderedIdGenerator {
    /// Creates a new `TimeOrderedIdGenerator`.
    pub fn new() -> Self {
        TimeOrderedIdGenerator
    }
}

impl IdGenerator for TimeOrderedIdGenerator {
    fn new_session_id(&self) -> String {
        uuid::Uuid::now_v7().simple().to_string()
    }
}

/// Id generator that can be shared across threads
#[derive(Debug, Clone)]
pub struct SharedIdGenerator(Arc<dyn IdGenerator>);

impl SharedIdGenerator {
    /// Creates a new shared id generator
    pub fn new(generator: impl IdGenerator + 'static) -> Self {
        Self(Arc::new(generator))
    }
}

impl Default for SharedIdGenerator {
    fn default() -> Self {
        Self::new(TimeOrderedIdGenerator)
    }
}

impl IdGenerator for SharedIdGenerator {
    fn new_session_id(&self) -> String {
        self.0.new_session_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique_and_url_safe() {
        let generator = SharedIdGenerator::default();
        let first = generator.new_session_id();
        let second = generator.new_session_id();

        assert_ne!(first, second);
        for id in [&first, &second] {
            assert_eq!(id.len(), 32);
            assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn generated_ids_sort_by_creation_time() {
        let generator = TimeOrderedIdGenerator::new();
        let first = generator.new_session_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = generator.new_session_id();
        assert!(first < second);
    }
}
