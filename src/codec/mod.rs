//! Codec Module
//!
//! Fixed-size binary slots for the file backend.
//!
//! ## Slot Format (little-endian)
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Status: u8 (1)          0 = active, 1 = tombstoned           │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Id: i32 (4)                                                  │
//! │ FirstName: [u8; max_name_len]   UTF-8, zero padded           │
//! │ LastName:  [u8; max_name_len]   UTF-8, zero padded           │
//! │ Year: i32 (4) | Month: i32 (4) | Day: i32 (4)                │
//! │ Balance digits: i128 (16) | Balance scale: u8 (1)            │
//! │ MaritalStatus: u32 (4)          char code point              │
//! │ Height: i16 (2)                                              │
//! ├──────────────────────────────────────────────────────────────┤
//! │ CRC32: u32 (4)          over every byte after Status         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The checksum skips the status byte, so tombstoning a slot is a one-byte
//! in-place write that leaves the payload intact.

mod slot;

pub use slot::{DecodedSlot, SlotCodec};

// =============================================================================
// Shared Constants
// =============================================================================

/// Status byte of a live slot
pub const STATUS_ACTIVE: u8 = 0;

/// Status byte of a deleted slot
pub const STATUS_TOMBSTONED: u8 = 1;

/// Offset of the status byte within a slot
pub const STATUS_OFFSET: u64 = 0;

/// Default fixed width of each name field in bytes
pub const DEFAULT_MAX_NAME_LEN: usize = 60;

/// Bytes taken by everything except the two name fields:
/// status (1) + id (4) + date (12) + balance (17) + marital (4) + height (2) + crc (4)
pub(crate) const FIXED_FIELDS_SIZE: usize = 1 + 4 + 12 + 17 + 4 + 2 + 4;
