//! Slot codec
//!
//! Encodes a record into a fixed-size slot and decodes it back.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use chrono::{Datelike, NaiveDate};

use crate::error::{CabinetError, Result};
use crate::record::{Decimal, Field, Record};

use super::{FIXED_FIELDS_SIZE, STATUS_ACTIVE, STATUS_TOMBSTONED};

/// Outcome of decoding one slot
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedSlot {
    Active(Record),
    Tombstoned,
}

impl DecodedSlot {
    pub fn is_active(&self) -> bool {
        matches!(self, DecodedSlot::Active(_))
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            DecodedSlot::Active(record) => Some(record),
            DecodedSlot::Tombstoned => None,
        }
    }
}

/// Encoder/decoder for fixed-size record slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotCodec {
    max_name_len: usize,
    slot_size: usize,
}

impl SlotCodec {
    /// Create a codec whose name fields are `max_name_len` bytes wide
    pub fn new(max_name_len: usize) -> Self {
        Self {
            max_name_len,
            slot_size: FIXED_FIELDS_SIZE + 2 * max_name_len,
        }
    }

    /// Total size of one slot in bytes
    pub fn slot_size(&self) -> usize {
        self.slot_size
    }

    pub fn max_name_len(&self) -> usize {
        self.max_name_len
    }

    /// Encode an active record
    pub fn encode(&self, record: &Record) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.slot_size);
        buf.put_u8(STATUS_ACTIVE);

        buf.put_i32_le(record.id);
        self.put_name(&mut buf, Field::FirstName, &record.first_name)?;
        self.put_name(&mut buf, Field::LastName, &record.last_name)?;

        let date = record.date_of_birth;
        buf.put_i32_le(date.year());
        buf.put_i32_le(date.month() as i32);
        buf.put_i32_le(date.day() as i32);

        buf.put_i128_le(record.balance.digits());
        buf.put_u8(record.balance.scale());
        buf.put_u32_le(record.marital_status as u32);
        buf.put_i16_le(record.height);

        let crc = crc32fast::hash(&buf[1..]);
        buf.put_u32_le(crc);

        debug_assert_eq!(buf.len(), self.slot_size);
        Ok(buf.freeze())
    }

    /// Decode a slot
    ///
    /// A tombstoned slot is reported as such without looking at its payload.
    pub fn decode(&self, slot: &[u8]) -> Result<DecodedSlot> {
        if slot.len() < self.slot_size {
            return Err(CabinetError::corrupt(format!(
                "slot is {} bytes, expected {}",
                slot.len(),
                self.slot_size
            )));
        }
        let slot = &slot[..self.slot_size];

        match slot[0] {
            STATUS_ACTIVE => {}
            STATUS_TOMBSTONED => return Ok(DecodedSlot::Tombstoned),
            other => {
                return Err(CabinetError::corrupt(format!(
                    "unknown status byte 0x{:02x}",
                    other
                )))
            }
        }

        let body_end = self.slot_size - 4;
        let stored_crc = u32::from_le_bytes([
            slot[body_end],
            slot[body_end + 1],
            slot[body_end + 2],
            slot[body_end + 3],
        ]);
        let computed_crc = crc32fast::hash(&slot[1..body_end]);
        if stored_crc != computed_crc {
            return Err(CabinetError::corrupt(format!(
                "checksum mismatch: stored {:08x}, computed {:08x}",
                stored_crc, computed_crc
            )));
        }

        let mut body = &slot[1..body_end];
        let id = body.get_i32_le();
        let first_name = self.get_name(&mut body)?;
        let last_name = self.get_name(&mut body)?;

        let year = body.get_i32_le();
        let month = body.get_i32_le();
        let day = body.get_i32_le();
        let date_of_birth = u32::try_from(month)
            .ok()
            .zip(u32::try_from(day).ok())
            .and_then(|(m, d)| NaiveDate::from_ymd_opt(year, m, d))
            .ok_or_else(|| {
                CabinetError::corrupt(format!("invalid date {}-{}-{}", year, month, day))
            })?;

        let digits = body.get_i128_le();
        let scale = body.get_u8();
        let balance = Decimal::new(digits, scale)
            .map_err(|e| CabinetError::corrupt(format!("invalid balance: {}", e)))?;

        let code = body.get_u32_le();
        let marital_status = char::from_u32(code).ok_or_else(|| {
            CabinetError::corrupt(format!("invalid marital status code {}", code))
        })?;
        let height = body.get_i16_le();

        Ok(DecodedSlot::Active(Record {
            id,
            first_name,
            last_name,
            date_of_birth,
            balance,
            marital_status,
            height,
        }))
    }

    /// Read the id of a slot regardless of its status
    pub fn peek_id(&self, slot: &[u8]) -> Option<i32> {
        let bytes = slot.get(1..5)?;
        Some(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn put_name(&self, buf: &mut BytesMut, field: Field, name: &str) -> Result<()> {
        let bytes = name.as_bytes();
        if bytes.len() > self.max_name_len {
            return Err(CabinetError::validation(
                field,
                format!(
                    "{} bytes exceeds the slot width of {}",
                    bytes.len(),
                    self.max_name_len
                ),
            ));
        }
        buf.put_slice(bytes);
        buf.put_bytes(0, self.max_name_len - bytes.len());
        Ok(())
    }

    fn get_name(&self, body: &mut &[u8]) -> Result<String> {
        let raw = &body[..self.max_name_len];
        let end = raw.iter().rposition(|b| *b != 0).map_or(0, |p| p + 1);
        let name = std::str::from_utf8(&raw[..end])
            .map_err(|e| CabinetError::corrupt(format!("name is not UTF-8: {}", e)))?
            .to_string();
        body.advance(self.max_name_len);
        Ok(name)
    }
}
