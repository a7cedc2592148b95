// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory edit log for testing and replica simulation

use super::{EditLog, EditLogEntry, EditLogError};
use crate::catalog::operations::{CatalogLog, CatalogOpCode};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory edit log
#[derive(Debug, Default)]
pub struct MemoryEditLog {
    entries: Mutex<Vec<EditLogEntry>>,
    fail_appends: AtomicBool,
}

impl MemoryEditLog {
    /// Create a new empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent appends fail with an IO error until reset
    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of the entries appended so far
    pub fn entries(&self) -> Vec<EditLogEntry> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl EditLog for MemoryEditLog {
    fn append(&self, op: CatalogOpCode, payload: &CatalogLog) -> Result<u64, EditLogError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(EditLogError::Io("injected append failure".to_string()));
        }
        let mut entries = self.entries.lock();
        let sequence = entries.last().map(|e| e.sequence).unwrap_or(0) + 1;
        entries.push(EditLogEntry {
            sequence,
            op,
            logged_at: chrono::Utc::now(),
            payload: payload.clone(),
        });
        Ok(sequence)
    }

    fn read_all(&self) -> Result<Vec<EditLogEntry>, EditLogError> {
        Ok(self.entries())
    }

    fn last_sequence(&self) -> u64 {
        self.entries.lock().last().map(|e| e.sequence).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequences_increase() {
        let log = MemoryEditLog::new();
        assert_eq!(log.append(CatalogOpCode::Drop, &CatalogLog::drop(1)).unwrap(), 1);
        assert_eq!(log.append(CatalogOpCode::Drop, &CatalogLog::drop(2)).unwrap(), 2);
        assert_eq!(log.last_sequence(), 2);
        assert_eq!(log.read_all().unwrap().len(), 2);
    }

    #[test]
    fn test_injected_failure_appends_nothing() {
        let log = MemoryEditLog::new();
        log.set_fail_appends(true);
        assert!(log.append(CatalogOpCode::Drop, &CatalogLog::drop(1)).is_err());
        assert!(log.is_empty());

        log.set_fail_appends(false);
        assert!(log.append(CatalogOpCode::Drop, &CatalogLog::drop(1)).is_ok());
        assert_eq!(log.len(), 1);
    }
}
