//! File backend
//!
//! An append-only sequence of fixed-size slots with no header and no
//! persisted index. Opening the file scans every slot and rebuilds the
//! index set; a location is the byte offset of a slot.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::codec::{DecodedSlot, SlotCodec, STATUS_OFFSET, STATUS_TOMBSTONED};
use crate::error::{CabinetError, Result};
use crate::index::{IndexSet, Location};
use crate::record::{Field, FieldValue, Record};
use crate::validation::ValidationRules;

use super::{advance_id, delete_targets, resolve_new_id, RecordStore, StoreStats};

/// Persistent record store over a single slot file
///
/// ## Concurrency:
/// - `file`: Mutex so reads (`&self`) can seek without exclusive access
/// - Every mutation syncs the file before returning
pub struct FileStore {
    /// Path of the slot file
    path: PathBuf,

    /// File handle shared by reads and writes
    file: Mutex<File>,

    /// Slot encoder/decoder
    codec: SlotCodec,

    /// Indexes over the active slots
    index: IndexSet,

    /// Active validator
    rules: ValidationRules,

    /// Next id to hand out (never reused; None once the id space is used up)
    next_id: Option<i32>,

    /// Total whole slots in the file, active or not
    slot_count: u64,
}

/// One whole slot read during a scan
struct ScannedSlot {
    offset: u64,
    bytes: Vec<u8>,
}

impl FileStore {
    /// Open or create the slot file at `path`
    ///
    /// On startup:
    /// 1. Create the file if it doesn't exist
    /// 2. Scan every whole slot (a trailing partial slot is ignored)
    /// 3. Index active slots; skip corrupt ones with a warning
    /// 4. Resume id allocation after the highest id ever written
    pub fn open(path: &Path, max_name_len: usize, rules: ValidationRules) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let codec = SlotCodec::new(max_name_len);
        let slots = Self::scan(&mut file, &codec)?;

        let mut index = IndexSet::new();
        let mut max_id = 0;
        let mut corrupted = 0usize;
        let mut superseded = Vec::new();

        for slot in &slots {
            if let Some(id) = codec.peek_id(&slot.bytes) {
                max_id = max_id.max(id);
            }
            match codec.decode(&slot.bytes) {
                Ok(DecodedSlot::Active(record)) => {
                    if let Some(earlier) = index.lookup_id(record.id) {
                        warn!(
                            id = record.id,
                            earlier = %earlier,
                            offset = slot.offset,
                            "duplicate id in slot file, keeping the later slot"
                        );
                        let previous = slots
                            .get((earlier.0 / codec.slot_size() as u64) as usize)
                            .and_then(|s| codec.decode(&s.bytes).ok())
                            .and_then(DecodedSlot::into_record);
                        if let Some(previous) = previous {
                            index.remove(&previous, earlier);
                        }
                        superseded.push(earlier);
                    }
                    index.add(&record, Location(slot.offset));
                }
                Ok(DecodedSlot::Tombstoned) => {}
                Err(e) => {
                    corrupted += 1;
                    warn!(offset = slot.offset, error = %e, "skipping corrupt slot");
                }
            }
        }

        // Superseded duplicates are tombstoned so they stay dead on reopen
        if !superseded.is_empty() {
            for location in &superseded {
                file.seek(SeekFrom::Start(location.0 + STATUS_OFFSET))?;
                file.write_all(&[STATUS_TOMBSTONED])?;
            }
            file.sync_data()?;
        }

        let slot_count = slots.len() as u64;
        info!(
            path = %path.display(),
            slots = slot_count,
            active = index.len(),
            corrupted,
            "opened record file"
        );

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            codec,
            index,
            rules,
            next_id: max_id.checked_add(1),
            slot_count,
        })
    }

    /// Path of the slot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Codec used for this file
    pub fn codec(&self) -> &SlotCodec {
        &self.codec
    }

    /// Id the next assigned record will get
    pub fn next_id(&self) -> Option<i32> {
        self.next_id
    }

    /// Total slots in the file, tombstoned ones included
    pub fn slot_count(&self) -> u64 {
        self.slot_count
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Read every whole slot from the start of `file`
    fn scan(file: &mut File, codec: &SlotCodec) -> Result<Vec<ScannedSlot>> {
        let slot_size = codec.slot_size();
        let file_len = file.metadata()?.len();
        let whole = file_len / slot_size as u64;
        let tail = file_len % slot_size as u64;
        if tail != 0 {
            warn!(
                bytes = tail,
                "ignoring partial slot at end of record file"
            );
        }

        file.seek(SeekFrom::Start(0))?;
        let mut reader = BufReader::new(&mut *file);
        let mut slots = Vec::with_capacity(whole as usize);

        for i in 0..whole {
            let mut bytes = vec![0u8; slot_size];
            match reader.read_exact(&mut bytes) {
                Ok(()) => slots.push(ScannedSlot {
                    offset: i * slot_size as u64,
                    bytes,
                }),
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(slots)
    }

    fn offset_of(&self, slot: u64) -> u64 {
        slot * self.codec.slot_size() as u64
    }

    /// Write `bytes` at `offset` and sync
    fn write_at(&self, offset: u64, bytes: &[u8]) -> Result<()> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(bytes)?;
        file.sync_data()?;
        Ok(())
    }

    fn read_slot(&self, offset: u64) -> Result<Vec<u8>> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        let mut bytes = vec![0u8; self.codec.slot_size()];
        file.read_exact(&mut bytes).map_err(|e| {
            if e.kind() == ErrorKind::UnexpectedEof {
                CabinetError::corrupt(format!("slot at offset {} is truncated", offset))
            } else {
                CabinetError::Io(e)
            }
        })?;
        Ok(bytes)
    }
}

impl RecordStore for FileStore {
    fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    fn index(&self) -> &IndexSet {
        &self.index
    }

    fn create(&mut self, mut record: Record, assign_id: bool) -> Result<i32> {
        let id = resolve_new_id(&self.index, self.next_id, &record, assign_id)?;
        record.id = id;
        self.rules.validate(&record)?;
        let bytes = self.codec.encode(&record)?;

        let location = Location(self.offset_of(self.slot_count));
        self.write_at(location.0, &bytes)?;
        self.slot_count += 1;
        self.index.add(&record, location);
        self.next_id = advance_id(self.next_id, id);

        debug!(id, %location, "created record");
        Ok(id)
    }

    fn edit(&mut self, id: i32, mut record: Record) -> Result<()> {
        let location = self.index.lookup_id(id).ok_or(CabinetError::NotFound(id))?;
        record.id = id;
        self.rules.validate(&record)?;
        let bytes = self.codec.encode(&record)?;
        let previous = self.read(location)?.ok_or(CabinetError::NotFound(id))?;

        self.write_at(location.0, &bytes)?;
        self.index.remove(&previous, location);
        self.index.add(&record, location);

        debug!(id, %location, "edited record");
        Ok(())
    }

    fn delete(&mut self, field: Field, value: &FieldValue) -> Result<Vec<i32>> {
        let locations = delete_targets(&self.index, field, value)?;

        let mut targets = Vec::with_capacity(locations.len());
        for location in locations {
            if let Some(record) = self.read(location)? {
                targets.push((record, location));
            }
        }

        let mut removed = Vec::with_capacity(targets.len());
        {
            let mut file = self.file.lock();
            for (record, location) in &targets {
                file.seek(SeekFrom::Start(location.0 + STATUS_OFFSET))?;
                file.write_all(&[STATUS_TOMBSTONED])?;
                removed.push(record.id);
            }
            file.sync_data()?;
        }
        for (record, location) in &targets {
            self.index.remove(record, *location);
        }

        debug!(count = removed.len(), "tombstoned records");
        Ok(removed)
    }

    /// Rewrite the file with only active slots, then rebuild the indexes
    fn compact(&mut self) -> Result<usize> {
        let mut file = self.file.lock();
        let slots = Self::scan(&mut file, &self.codec)?;
        let total = slots.len();

        let mut kept: Vec<(Record, Vec<u8>)> = Vec::with_capacity(self.index.len());
        for slot in slots {
            match self.codec.decode(&slot.bytes) {
                Ok(DecodedSlot::Active(record)) => kept.push((record, slot.bytes)),
                Ok(DecodedSlot::Tombstoned) => {}
                Err(e) => warn!(offset = slot.offset, error = %e, "dropping corrupt slot"),
            }
        }

        let slot_size = self.codec.slot_size() as u64;
        file.seek(SeekFrom::Start(0))?;
        for (_, bytes) in &kept {
            file.write_all(bytes)?;
        }
        file.set_len(kept.len() as u64 * slot_size)?;
        file.sync_all()?;
        drop(file);

        self.slot_count = kept.len() as u64;
        self.index.rebuild(
            kept.iter()
                .enumerate()
                .map(|(i, (record, _))| (record, Location(i as u64 * slot_size))),
        );

        let dropped = total - kept.len();
        info!(kept = kept.len(), dropped, "compacted record file");
        Ok(dropped)
    }

    fn read(&self, location: Location) -> Result<Option<Record>> {
        if location.0 >= self.offset_of(self.slot_count) {
            return Ok(None);
        }
        let bytes = self.read_slot(location.0)?;
        Ok(self.codec.decode(&bytes)?.into_record())
    }

    fn stat(&self) -> StoreStats {
        let active = self.index.len();
        StoreStats {
            active,
            removed: (self.slot_count as usize).saturating_sub(active),
        }
    }
}
