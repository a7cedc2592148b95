// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Durable edit log
//!
//! Every applied catalog mutation is appended here as one entry. Replicas and
//! restarting nodes read the entries back and hand them to the replay engine.
//!
//! Two implementations ship with the crate:
//! - `FileEditLog`: checksummed, segment-rotated files on local disk
//! - `MemoryEditLog`: an in-process vector, used by tests and replica simulations

pub mod file;
pub mod memory;

pub use file::FileEditLog;
pub use memory::MemoryEditLog;

use crate::catalog::operations::{CatalogLog, CatalogOpCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One durable record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditLogEntry {
    /// Position in the log, starting at 1 and increasing by one per append
    pub sequence: u64,
    pub op: CatalogOpCode,
    pub logged_at: DateTime<Utc>,
    pub payload: CatalogLog,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditLogError {
    #[error("Edit log IO error: {0}")]
    Io(String),

    #[error("Edit log corrupted entry: {0}")]
    CorruptedEntry(String),

    #[error("Edit log encode error: {0}")]
    Encode(String),
}

impl From<std::io::Error> for EditLogError {
    fn from(err: std::io::Error) -> Self {
        EditLogError::Io(err.to_string())
    }
}

/// Synchronous, append-only log of catalog mutations
pub trait EditLog: Send + Sync {
    /// Durably append one entry
    ///
    /// # Returns
    /// * `Ok(u64)` with the sequence number assigned to the entry
    /// * `Err(EditLogError)` if the entry was not made durable
    fn append(&self, op: CatalogOpCode, payload: &CatalogLog) -> Result<u64, EditLogError>;

    /// Read every readable entry, oldest first
    fn read_all(&self) -> Result<Vec<EditLogEntry>, EditLogError>;

    /// Sequence number of the last appended entry, 0 if none
    fn last_sequence(&self) -> u64;
}
