// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! File-backed edit log
//!
//! Entries are appended to segment files `edit_NNNNNN.log` in a compact binary
//! frame and made durable before `append` returns. A new segment is started on
//! every open and whenever the current one would grow past the size limit.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use parking_lot::Mutex;

use super::{EditLog, EditLogEntry, EditLogError};
use crate::catalog::operations::{CatalogLog, CatalogOpCode};

/// Magic number at the start of every segment and every record
const EDIT_LOG_MAGIC: u32 = 0x4354_4C47;
/// Current segment format version
const EDIT_LOG_VERSION: u16 = 1;
/// Segment header size in bytes
const SEGMENT_HEADER_SIZE: usize = 32;
/// magic + op + sequence + timestamp + payload length
const RECORD_HEADER_SIZE: usize = 4 + 1 + 8 + 8 + 4;
/// Smallest possible record: header, empty payload, checksum
const MIN_RECORD_SIZE: usize = RECORD_HEADER_SIZE + 4;
/// Default segment size limit (64MB)
pub const DEFAULT_MAX_SEGMENT_BYTES: u64 = 64 * 1024 * 1024;

struct WriterState {
    writer: Option<BufWriter<File>>,
    file_number: u64,
    file_size: u64,
    sequence: u64,
    /// Set when a failed append could not be rolled back; refuses all appends
    poisoned: bool,
}

/// Points inside `append` where tests inject IO failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailPoint {
    Flush,
    Sync,
}

/// Edit log stored in checksummed segment files
pub struct FileEditLog {
    /// Directory holding the segment files
    log_dir: PathBuf,
    /// Rotate once a segment would exceed this many bytes
    max_segment_bytes: u64,
    /// fsync after every append
    sync_on_append: bool,
    state: Mutex<WriterState>,
    #[cfg(test)]
    fail_point: Mutex<Option<FailPoint>>,
}

impl FileEditLog {
    /// Open (or create) an edit log in `log_dir`
    ///
    /// Existing segments are scanned so sequence numbering resumes after the
    /// highest sequence on disk. Appends go to a fresh segment.
    pub fn open(
        log_dir: impl AsRef<Path>,
        max_segment_bytes: u64,
        sync_on_append: bool,
    ) -> Result<Self, EditLogError> {
        let log_dir = log_dir.as_ref().to_path_buf();
        fs::create_dir_all(&log_dir).map_err(|e| {
            EditLogError::Io(format!(
                "Failed to create edit log directory {}: {}",
                log_dir.display(),
                e
            ))
        })?;

        let mut max_file_number = 0u64;
        let mut max_sequence = 0u64;
        for file_number in segment_numbers(&log_dir)? {
            max_file_number = max_file_number.max(file_number);
            for entry in read_segment(&segment_path(&log_dir, file_number))? {
                max_sequence = max_sequence.max(entry.sequence);
            }
        }

        let log = Self {
            log_dir,
            max_segment_bytes,
            sync_on_append,
            state: Mutex::new(WriterState {
                writer: None,
                file_number: max_file_number,
                file_size: 0,
                sequence: max_sequence,
                poisoned: false,
            }),
            #[cfg(test)]
            fail_point: Mutex::new(None),
        };
        log.rotate(&mut log.state.lock())?;

        log::debug!(
            "Opened edit log at {} (last sequence {})",
            log.log_dir.display(),
            max_sequence
        );
        Ok(log)
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Number of the segment currently being appended to
    pub fn current_segment(&self) -> u64 {
        self.state.lock().file_number
    }

    /// Never hand out a sequence at or below `sequence`. Needed after the
    /// segments covering a snapshot image have been purged.
    pub fn advance_sequence(&self, sequence: u64) {
        let mut state = self.state.lock();
        state.sequence = state.sequence.max(sequence);
    }

    /// Delete closed segments whose entries are all at or below `sequence`
    ///
    /// # Returns
    /// * `Ok(usize)` with the number of segments removed
    pub fn purge_through(&self, sequence: u64) -> Result<usize, EditLogError> {
        let current = self.state.lock().file_number;
        let mut removed = 0;
        for file_number in segment_numbers(&self.log_dir)? {
            if file_number >= current {
                continue;
            }
            let path = segment_path(&self.log_dir, file_number);
            let covered = read_segment(&path)?
                .iter()
                .all(|entry| entry.sequence <= sequence);
            if covered {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        if removed > 0 {
            log::debug!("Purged {} edit log segments through sequence {}", removed, sequence);
        }
        Ok(removed)
    }

    /// Write, flush and (optionally) sync one record to the active segment
    fn write_record(&self, state: &mut WriterState, record: &[u8]) -> Result<(), EditLogError> {
        let writer = state
            .writer
            .as_mut()
            .ok_or_else(|| EditLogError::Io("No active edit log segment".to_string()))?;
        writer
            .write_all(record)
            .map_err(|e| EditLogError::Io(format!("Failed to write edit log entry: {}", e)))?;
        self.fail_at(FailPoint::Flush)
            .and_then(|_| writer.flush())
            .map_err(|e| EditLogError::Io(format!("Failed to flush edit log: {}", e)))?;
        if self.sync_on_append {
            self.fail_at(FailPoint::Sync)
                .and_then(|_| writer.get_mut().sync_data())
                .map_err(|e| EditLogError::Io(format!("Failed to sync edit log: {}", e)))?;
        }
        Ok(())
    }

    /// Discard every byte of a failed record, buffered or already in the
    /// segment, so it can never be read back. If the segment cannot be cut
    /// back to `size` the log is poisoned.
    fn roll_back(&self, state: &mut WriterState, size: u64) {
        let Some(writer) = state.writer.take() else {
            return;
        };
        let (file, _unwritten) = writer.into_parts();
        match file.set_len(size).and_then(|_| file.sync_data()) {
            Ok(()) => {
                log::warn!("Rolled back failed edit log append at offset {}", size);
                state.writer = Some(BufWriter::new(file));
                state.file_size = size;
            }
            Err(e) => {
                log::error!("Failed to roll back edit log segment: {}", e);
                state.poisoned = true;
            }
        }
    }

    #[cfg(test)]
    fn fail_next(&self, point: FailPoint) {
        *self.fail_point.lock() = Some(point);
    }

    #[cfg(test)]
    fn fail_at(&self, point: FailPoint) -> std::io::Result<()> {
        let mut armed = self.fail_point.lock();
        if *armed == Some(point) {
            *armed = None;
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "injected failure",
            ));
        }
        Ok(())
    }

    #[cfg(not(test))]
    fn fail_at(&self, _point: FailPoint) -> std::io::Result<()> {
        Ok(())
    }

    /// Close the current segment and start the next one
    fn rotate(&self, state: &mut WriterState) -> Result<(), EditLogError> {
        if let Some(mut old_writer) = state.writer.take() {
            old_writer
                .flush()
                .map_err(|e| EditLogError::Io(format!("Failed to flush old segment: {}", e)))?;
            old_writer
                .get_mut()
                .sync_all()
                .map_err(|e| EditLogError::Io(format!("Failed to sync old segment: {}", e)))?;
        }

        state.file_number += 1;
        let file_path = segment_path(&self.log_dir, state.file_number);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .append(true)
            .open(&file_path)
            .map_err(|e| EditLogError::Io(format!("Failed to create segment: {}", e)))?;

        let mut writer = BufWriter::new(file);
        let header = segment_header();
        writer
            .write_all(&header)
            .map_err(|e| EditLogError::Io(format!("Failed to write segment header: {}", e)))?;
        writer
            .flush()
            .map_err(|e| EditLogError::Io(format!("Failed to flush segment header: {}", e)))?;

        state.writer = Some(writer);
        state.file_size = header.len() as u64;
        log::debug!("Edit log rotated to {}", file_path.display());
        Ok(())
    }
}

impl EditLog for FileEditLog {
    fn append(&self, op: CatalogOpCode, payload: &CatalogLog) -> Result<u64, EditLogError> {
        let mut state = self.state.lock();
        if state.poisoned {
            return Err(EditLogError::Io(
                "Edit log refuses appends after a failed rollback".to_string(),
            ));
        }
        let entry = EditLogEntry {
            sequence: state.sequence + 1,
            op,
            logged_at: Utc::now(),
            payload: payload.clone(),
        };
        let record = encode_record(&entry)?;

        if state.file_size + record.len() as u64 > self.max_segment_bytes {
            self.rotate(&mut state)?;
        }

        let start_size = state.file_size;
        if let Err(e) = self.write_record(&mut state, &record) {
            self.roll_back(&mut state, start_size);
            return Err(e);
        }

        state.file_size += record.len() as u64;
        state.sequence = entry.sequence;
        Ok(entry.sequence)
    }

    fn read_all(&self) -> Result<Vec<EditLogEntry>, EditLogError> {
        // Hold the writer lock so no append lands mid-read.
        let _state = self.state.lock();
        let mut entries = Vec::new();
        for file_number in segment_numbers(&self.log_dir)? {
            entries.extend(read_segment(&segment_path(&self.log_dir, file_number))?);
        }
        entries.sort_by_key(|entry| entry.sequence);
        Ok(entries)
    }

    fn last_sequence(&self) -> u64 {
        self.state.lock().sequence
    }
}

impl std::fmt::Debug for FileEditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileEditLog")
            .field("log_dir", &self.log_dir)
            .field("max_segment_bytes", &self.max_segment_bytes)
            .field("sync_on_append", &self.sync_on_append)
            .finish()
    }
}

fn segment_path(log_dir: &Path, file_number: u64) -> PathBuf {
    log_dir.join(format!("edit_{:06}.log", file_number))
}

/// Segment numbers present in `log_dir`, ascending
fn segment_numbers(log_dir: &Path) -> Result<Vec<u64>, EditLogError> {
    let mut numbers = Vec::new();
    for entry in fs::read_dir(log_dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if let Some(number) = name
            .strip_prefix("edit_")
            .and_then(|s| s.strip_suffix(".log"))
            .and_then(|s| s.parse::<u64>().ok())
        {
            numbers.push(number);
        }
    }
    numbers.sort_unstable();
    Ok(numbers)
}

/// Segment header:
/// - Magic (4 bytes)
/// - Version (2 bytes)
/// - Creation timestamp (8 bytes, millis since UNIX epoch)
/// - Reserved (18 bytes)
fn segment_header() -> Vec<u8> {
    let mut header = Vec::with_capacity(SEGMENT_HEADER_SIZE);
    header.extend_from_slice(&EDIT_LOG_MAGIC.to_le_bytes());
    header.extend_from_slice(&EDIT_LOG_VERSION.to_le_bytes());
    header.extend_from_slice(&Utc::now().timestamp_millis().to_le_bytes());
    header.resize(SEGMENT_HEADER_SIZE, 0);
    header
}

/// Record frame:
/// - Magic (4 bytes)
/// - Op code (1 byte)
/// - Sequence (8 bytes)
/// - Timestamp (8 bytes, millis since UNIX epoch)
/// - Payload length (4 bytes)
/// - Payload (bincode `CatalogLog`)
/// - Checksum (4 bytes, CRC32 of everything before it)
fn encode_record(entry: &EditLogEntry) -> Result<Vec<u8>, EditLogError> {
    let payload =
        bincode::serialize(&entry.payload).map_err(|e| EditLogError::Encode(e.to_string()))?;
    let payload_len = u32::try_from(payload.len())
        .map_err(|_| EditLogError::Encode("payload larger than 4GiB".to_string()))?;

    let mut buffer = Vec::with_capacity(MIN_RECORD_SIZE + payload.len());
    buffer.extend_from_slice(&EDIT_LOG_MAGIC.to_le_bytes());
    buffer.push(entry.op.as_u8());
    buffer.extend_from_slice(&entry.sequence.to_le_bytes());
    buffer.extend_from_slice(&entry.logged_at.timestamp_millis().to_le_bytes());
    buffer.extend_from_slice(&payload_len.to_le_bytes());
    buffer.extend_from_slice(&payload);

    let checksum = crc32fast::hash(&buffer);
    buffer.extend_from_slice(&checksum.to_le_bytes());
    Ok(buffer)
}

/// Decode one record at the start of `data`
///
/// # Returns
/// * `Ok(Some((entry, size)))` for a valid record of `size` bytes
/// * `Ok(None)` if `data` ends before the record does
/// * `Err(EditLogError::CorruptedEntry)` if the record is malformed
fn decode_record(data: &[u8]) -> Result<Option<(EditLogEntry, usize)>, EditLogError> {
    if data.len() < MIN_RECORD_SIZE {
        return Ok(None);
    }
    if read_u32(data, 0) != EDIT_LOG_MAGIC {
        return Err(EditLogError::CorruptedEntry("Invalid magic number".to_string()));
    }

    let payload_len = read_u32(data, 21) as usize;
    let total = RECORD_HEADER_SIZE + payload_len + 4;
    if data.len() < total {
        return Ok(None);
    }

    let body_end = RECORD_HEADER_SIZE + payload_len;
    if read_u32(data, body_end) != crc32fast::hash(&data[..body_end]) {
        return Err(EditLogError::CorruptedEntry("Checksum mismatch".to_string()));
    }

    let op = CatalogOpCode::from_u8(data[4])
        .ok_or_else(|| EditLogError::CorruptedEntry(format!("Invalid op code {}", data[4])))?;
    let sequence = read_u64(data, 5);
    let millis = read_u64(data, 13) as i64;
    let logged_at = Utc
        .timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| EditLogError::CorruptedEntry("Invalid timestamp".to_string()))?;
    let payload: CatalogLog = bincode::deserialize(&data[RECORD_HEADER_SIZE..body_end])
        .map_err(|e| EditLogError::CorruptedEntry(format!("Invalid payload: {}", e)))?;
    if payload.op != op {
        return Err(EditLogError::CorruptedEntry(format!(
            "Frame op {} disagrees with payload op {}",
            op, payload.op
        )));
    }

    Ok(Some((
        EditLogEntry {
            sequence,
            op,
            logged_at,
            payload,
        },
        total,
    )))
}

/// Read every valid record of one segment. Corrupt records are skipped by
/// scanning forward to the next magic number; a torn tail ends the segment.
fn read_segment(path: &Path) -> Result<Vec<EditLogEntry>, EditLogError> {
    let buffer = fs::read(path)
        .map_err(|e| EditLogError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    if buffer.len() < SEGMENT_HEADER_SIZE {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    let mut offset = SEGMENT_HEADER_SIZE;
    let mut skipped = 0usize;
    while offset + 4 <= buffer.len() {
        if read_u32(&buffer, offset) != EDIT_LOG_MAGIC {
            offset += 1;
            continue;
        }
        match decode_record(&buffer[offset..]) {
            Ok(Some((entry, size))) => {
                entries.push(entry);
                offset += size;
            }
            Ok(None) => break,
            Err(_) => {
                skipped += 1;
                offset += 1;
            }
        }
    }

    if skipped > 0 {
        log::warn!(
            "Skipped {} corrupted records in edit log segment {}",
            skipped,
            path.display()
        );
    }
    Ok(entries)
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
