// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Atomic monotonic id generator

use super::traits::IdGenerator;
use super::types::CatalogId;
use std::sync::atomic::{AtomicI64, Ordering};

/// Hands out strictly increasing ids from an atomic counter
#[derive(Debug)]
pub struct MonotonicIdGenerator {
    next: AtomicI64,
}

impl MonotonicIdGenerator {
    /// Start allocating at `first`
    pub fn starting_at(first: CatalogId) -> Self {
        Self {
            next: AtomicI64::new(first),
        }
    }

    /// The id the next call to `next_id` will return
    pub fn peek(&self) -> CatalogId {
        self.next.load(Ordering::SeqCst)
    }
}

impl IdGenerator for MonotonicIdGenerator {
    fn next_id(&self) -> CatalogId {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_increase() {
        let ids = MonotonicIdGenerator::starting_at(1000);
        assert_eq!(ids.next_id(), 1000);
        assert_eq!(ids.next_id(), 1001);
    }

    #[test]
    fn test_peek_does_not_allocate() {
        let ids = MonotonicIdGenerator::starting_at(1000);
        assert_eq!(ids.peek(), 1000);
        assert_eq!(ids.peek(), 1000);
        assert_eq!(ids.next_id(), 1000);
        assert_eq!(ids.peek(), 1001);
    }
}
