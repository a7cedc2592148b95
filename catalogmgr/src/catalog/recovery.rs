// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Snapshot images, crash recovery and checkpoints
//!
//! State on disk is the newest snapshot image `image.<sequence>` plus the edit
//! log. Recovery loads the image and replays every log entry whose sequence is
//! greater than the image's. A checkpoint writes a new image and lets the log
//! segments it covers be purged.

use super::connectors::ConnectorRegistry;
use super::error::{CatalogError, CatalogResult};
use super::idgen::MonotonicIdGenerator;
use super::manager::{CatalogManager, Collaborators};
use super::operations::CatalogOpCode;
use super::persistence;
use super::registry::CatalogRegistry;
use super::replay;
use super::traits::PrivilegeChecker;
use super::types::CatalogId;
use crate::config::CatalogConfig;
use crate::editlog::{EditLog, FileEditLog};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Magic number at the start of every image file
const IMAGE_MAGIC: u32 = 0x4354_494D;
/// Current image format version
const IMAGE_VERSION: u32 = 1;
/// magic + version + sequence + next catalog id + body checksum
const IMAGE_HEADER_SIZE: usize = 4 + 4 + 8 + 8 + 4;
const IMAGE_PREFIX: &str = "image.";

/// A decoded snapshot image
#[derive(Debug)]
pub struct CatalogImage {
    /// Last edit log sequence reflected in the image
    pub sequence: u64,
    /// Id the generator must not go below, so ids of catalogs created and
    /// dropped before the image are never reused
    pub next_catalog_id: CatalogId,
    pub registry: CatalogRegistry,
}

/// Snapshot images in one directory
///
/// Image layout:
/// - Magic (4 bytes)
/// - Version (4 bytes)
/// - Sequence (8 bytes)
/// - Next catalog id (8 bytes)
/// - Checksum (4 bytes, CRC32 of the body)
/// - Body (snapshot codec output)
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn image_path(&self, sequence: u64) -> PathBuf {
        self.dir.join(format!("{}{}", IMAGE_PREFIX, sequence))
    }

    /// Sequences of the images present, ascending
    pub fn sequences(&self) -> CatalogResult<Vec<u64>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut sequences = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if let Some(sequence) = name
                .strip_prefix(IMAGE_PREFIX)
                .and_then(|s| s.parse::<u64>().ok())
            {
                sequences.push(sequence);
            }
        }
        sequences.sort_unstable();
        Ok(sequences)
    }

    /// Load the newest image, if any
    pub fn load_latest(&self) -> CatalogResult<Option<CatalogImage>> {
        let Some(sequence) = self.sequences()?.last().copied() else {
            return Ok(None);
        };
        self.load(sequence).map(Some)
    }

    pub fn load(&self, sequence: u64) -> CatalogResult<CatalogImage> {
        let path = self.image_path(sequence);
        let data = fs::read(&path).map_err(|e| {
            CatalogError::Io(format!("Failed to read image {}: {}", path.display(), e))
        })?;
        if data.len() < IMAGE_HEADER_SIZE {
            return Err(CatalogError::Deserialization(format!(
                "image {} is truncated",
                path.display()
            )));
        }
        if read_u32(&data, 0) != IMAGE_MAGIC {
            return Err(CatalogError::Deserialization(format!(
                "image {} has an invalid magic number",
                path.display()
            )));
        }
        let version = read_u32(&data, 4);
        if version != IMAGE_VERSION {
            return Err(CatalogError::Deserialization(format!(
                "image {} has unsupported version {}",
                path.display(),
                version
            )));
        }
        let stored_sequence = read_u64(&data, 8);
        if stored_sequence != sequence {
            return Err(CatalogError::Deserialization(format!(
                "image {} records sequence {}",
                path.display(),
                stored_sequence
            )));
        }
        let next_catalog_id = read_u64(&data, 16) as CatalogId;
        let body = &data[IMAGE_HEADER_SIZE..];
        if read_u32(&data, 24) != crc32fast::hash(body) {
            return Err(CatalogError::Deserialization(format!(
                "image {} checksum mismatch",
                path.display()
            )));
        }

        Ok(CatalogImage {
            sequence,
            next_catalog_id,
            registry: persistence::deserialize(body)?,
        })
    }

    /// Durably write an image, then remove every older one
    pub fn write(
        &self,
        sequence: u64,
        next_catalog_id: CatalogId,
        snapshot: &[u8],
    ) -> CatalogResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let mut data = Vec::with_capacity(IMAGE_HEADER_SIZE + snapshot.len());
        data.extend_from_slice(&IMAGE_MAGIC.to_le_bytes());
        data.extend_from_slice(&IMAGE_VERSION.to_le_bytes());
        data.extend_from_slice(&sequence.to_le_bytes());
        data.extend_from_slice(&next_catalog_id.to_le_bytes());
        data.extend_from_slice(&crc32fast::hash(snapshot).to_le_bytes());
        data.extend_from_slice(snapshot);

        let path = self.image_path(sequence);
        let temp_path = self.dir.join(format!("{}{}.tmp", IMAGE_PREFIX, sequence));
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&data)?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &path)?;

        let pruned = self.prune_before(sequence)?;
        log::debug!(
            "Wrote image {} ({} bytes), pruned {} older images",
            path.display(),
            data.len(),
            pruned
        );
        Ok(path)
    }

    fn prune_before(&self, sequence: u64) -> CatalogResult<usize> {
        let mut removed = 0;
        for older in self.sequences()?.into_iter().filter(|s| *s < sequence) {
            fs::remove_file(self.image_path(older))?;
            removed += 1;
        }
        Ok(removed)
    }
}

/// Report of a recovery run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Sequence of the image recovery started from
    pub image_sequence: Option<u64>,
    /// Log entries applied on top of the image
    pub replayed: usize,
    /// Log entries already covered by the image
    pub skipped: usize,
    /// Lowest id the generator may hand out next
    pub next_catalog_id: CatalogId,
    pub recovery_time_ms: u64,
}

impl std::fmt::Display for RecoveryReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.image_sequence {
            Some(sequence) => write!(f, "image {}", sequence)?,
            None => write!(f, "no image")?,
        }
        write!(
            f,
            ", {} entries replayed, {} skipped, next catalog id {} ({} ms)",
            self.replayed, self.skipped, self.next_catalog_id, self.recovery_time_ms
        )
    }
}

/// Rebuild the registry from the newest image and the edit log tail
///
/// # Arguments
/// * `images` - Where snapshot images live
/// * `edit_log` - Log to replay
/// * `internal_name` - Internal catalog name used when no image exists
/// * `first_catalog_id` - Floor for the next catalog id
///
/// # Returns
/// * `Err(CatalogError::ReplayInvariant)` if a logged entry does not apply;
///   the log and image have diverged and the state must not be served
pub fn recover(
    images: &ImageStore,
    edit_log: &dyn EditLog,
    internal_name: &str,
    first_catalog_id: CatalogId,
) -> CatalogResult<(CatalogRegistry, RecoveryReport)> {
    let started = Instant::now();

    let (mut registry, image_sequence, mut next_catalog_id) = match images.load_latest()? {
        Some(image) => (
            image.registry,
            Some(image.sequence),
            image.next_catalog_id.max(first_catalog_id),
        ),
        None => (CatalogRegistry::new(internal_name), None, first_catalog_id),
    };
    let floor = image_sequence.unwrap_or(0);

    let mut replayed = 0;
    let mut skipped = 0;
    for entry in edit_log.read_all()? {
        if entry.sequence <= floor {
            skipped += 1;
            continue;
        }
        log::debug!("Replaying {} for id {}", entry.op, entry.payload.catalog_id);
        replay::apply(&mut registry, &entry.payload)?;
        if entry.op == CatalogOpCode::Create {
            next_catalog_id = next_catalog_id.max(entry.payload.catalog_id.saturating_add(1));
        }
        replayed += 1;
    }
    next_catalog_id = next_catalog_id.max(registry.max_id().saturating_add(1));

    let report = RecoveryReport {
        image_sequence,
        replayed,
        skipped,
        next_catalog_id,
        recovery_time_ms: started.elapsed().as_millis() as u64,
    };
    log::info!("Catalog recovery finished: {}", report);
    Ok((registry, report))
}

/// Report of a checkpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointReport {
    pub sequence: u64,
    pub image_path: PathBuf,
    pub purged_segments: usize,
}

/// A catalog manager backed by a metadata directory
pub struct CatalogStore {
    manager: CatalogManager,
    edit_log: Arc<FileEditLog>,
    ids: Arc<MonotonicIdGenerator>,
    images: ImageStore,
}

impl CatalogStore {
    /// Recover state from `config.meta_dir` and wire up a manager over it
    pub fn open(
        config: &CatalogConfig,
        connectors: ConnectorRegistry,
        privileges: Arc<dyn PrivilegeChecker>,
    ) -> CatalogResult<(Self, RecoveryReport)> {
        config.validate()?;
        let images = ImageStore::new(&config.meta_dir);
        let edit_log = Arc::new(
            FileEditLog::open(
                config.edit_log_dir(),
                config.max_log_file_bytes,
                config.sync_on_append,
            )
            .map_err(|e| CatalogError::Io(e.to_string()))?,
        );

        let (registry, report) = recover(
            &images,
            edit_log.as_ref(),
            &config.internal_catalog_name,
            config.first_catalog_id,
        )?;
        if let Some(sequence) = report.image_sequence {
            edit_log.advance_sequence(sequence);
        }

        let ids = Arc::new(MonotonicIdGenerator::starting_at(report.next_catalog_id));
        let collaborators = Collaborators::new(ids.clone(), edit_log.clone())
            .with_privileges(privileges)
            .with_connectors(connectors);
        let manager = CatalogManager::with_registry(collaborators, registry);

        Ok((
            Self {
                manager,
                edit_log,
                ids,
                images,
            },
            report,
        ))
    }

    pub fn manager(&self) -> &CatalogManager {
        &self.manager
    }

    pub fn edit_log(&self) -> &FileEditLog {
        &self.edit_log
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    /// Write an image of the current state and purge the log segments it covers
    pub fn checkpoint(&self) -> CatalogResult<CheckpointReport> {
        let (snapshot, sequence) = self.manager.snapshot_with_sequence()?;
        // Read after the snapshot so it covers every id the snapshot holds
        let next_catalog_id = self.ids.peek();
        let image_path = self.images.write(sequence, next_catalog_id, &snapshot)?;
        let purged_segments = self
            .edit_log
            .purge_through(sequence)
            .map_err(|e| CatalogError::Io(e.to_string()))?;

        log::info!(
            "Checkpoint at sequence {} written to {}",
            sequence,
            image_path.display()
        );
        Ok(CheckpointReport {
            sequence,
            image_path,
            purged_segments,
        })
    }
}

impl std::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStore")
            .field("manager", &self.manager)
            .field("edit_log", &self.edit_log)
            .field("images", &self.images)
            .finish()
    }
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

fn read_u64(data: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(bytes)
}
