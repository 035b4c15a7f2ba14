//! Snapshot Module
//!
//! Immutable point-in-time copies of every active record.
//!
//! A snapshot shares nothing with the store it came from; later mutations
//! never show through. Export writers consume it as an ordered list of
//! field tuples, and [`crate::storage::RecordStore::restore`] absorbs one back.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{CabinetError, Result};
use crate::record::{Decimal, Record};

/// Magic bytes leading a binary snapshot image
const IMAGE_MAGIC: &[u8; 4] = b"CBSN";

/// Current snapshot image version
const IMAGE_VERSION: u16 = 1;

/// Ordered field tuple of one record, the export shape
pub type RecordTuple = (i32, String, String, chrono::NaiveDate, Decimal, char, i16);

/// Point-in-time copy of all active records, in storage order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    records: Arc<[Record]>,
}

#[derive(Serialize, Deserialize)]
struct SnapshotImage {
    magic: [u8; 4],
    version: u16,
    records: Vec<RecordTuple>,
}

impl Snapshot {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: records.into(),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The record with `id`, if captured
    pub fn find(&self, id: i32) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Records as ordered field tuples
    pub fn tuples(&self) -> Vec<RecordTuple> {
        self.records
            .iter()
            .map(|r| {
                (
                    r.id,
                    r.first_name.clone(),
                    r.last_name.clone(),
                    r.date_of_birth,
                    r.balance,
                    r.marital_status,
                    r.height,
                )
            })
            .collect()
    }

    /// Build a snapshot from ordered field tuples
    pub fn from_tuples(tuples: impl IntoIterator<Item = RecordTuple>) -> Self {
        let records = tuples
            .into_iter()
            .map(
                |(id, first_name, last_name, date_of_birth, balance, marital_status, height)| {
                    Record {
                        id,
                        first_name,
                        last_name,
                        date_of_birth,
                        balance,
                        marital_status,
                        height,
                    }
                },
            )
            .collect();
        Self::new(records)
    }

    /// Serialize to a bincode image of the field tuples
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let image = SnapshotImage {
            magic: *IMAGE_MAGIC,
            version: IMAGE_VERSION,
            records: self.tuples(),
        };
        Ok(bincode::serialize(&image)?)
    }

    /// Deserialize a bincode image
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let image: SnapshotImage = bincode::deserialize(bytes)?;
        if &image.magic != IMAGE_MAGIC {
            return Err(CabinetError::Serialization(format!(
                "Invalid snapshot magic: expected CBSN, got {:?}",
                image.magic
            )));
        }
        if image.version != IMAGE_VERSION {
            return Err(CabinetError::Serialization(format!(
                "Unsupported snapshot version: {}",
                image.version
            )));
        }
        Ok(Self::from_tuples(image.records))
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
