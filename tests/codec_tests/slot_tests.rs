//! Tests for the slot codec
//!
//! These tests verify:
//! - Encoding produces exactly one fixed-size slot
//! - Decoding restores the record (names trimmed of padding)
//! - Tombstoned slots decode as inactive without reading the payload
//! - Short, tampered or malformed slots fail with CorruptRecord

use cabinet::codec::{DecodedSlot, SlotCodec, DEFAULT_MAX_NAME_LEN, STATUS_TOMBSTONED};
use cabinet::record::{Decimal, Field, Record};
use cabinet::CabinetError;
use chrono::NaiveDate;

// =============================================================================
// Helper Functions
// =============================================================================

fn sample() -> Record {
    Record::new(
        "John",
        "Doe",
        NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        "100.25".parse::<Decimal>().unwrap(),
        'U',
        180,
    )
    .with_id(7)
}

fn codec() -> SlotCodec {
    SlotCodec::new(DEFAULT_MAX_NAME_LEN)
}

// =============================================================================
// Size Tests
// =============================================================================

#[test]
fn test_slot_size_from_name_width() {
    // status 1 + id 4 + names 2*w + date 12 + balance 17 + marital 4 + height 2 + crc 4
    assert_eq!(SlotCodec::new(10).slot_size(), 1 + 4 + 20 + 12 + 17 + 4 + 2 + 4);
    assert_eq!(codec().slot_size(), 44 + 2 * DEFAULT_MAX_NAME_LEN);
}

#[test]
fn test_encode_is_fixed_size() {
    let codec = codec();
    let short = codec.encode(&sample()).unwrap();

    let mut long = sample();
    long.first_name = "A".repeat(DEFAULT_MAX_NAME_LEN);
    let long = codec.encode(&long).unwrap();

    assert_eq!(short.len(), codec.slot_size());
    assert_eq!(long.len(), codec.slot_size());
}

// =============================================================================
// Round-Trip Tests
// =============================================================================

#[test]
fn test_encode_decode_round_trip() {
    let codec = codec();
    let record = sample();

    let bytes = codec.encode(&record).unwrap();
    let decoded = codec.decode(&bytes).unwrap();

    assert!(decoded.is_active());
    assert_eq!(decoded, DecodedSlot::Active(record));
}

#[test]
fn test_round_trip_unicode_and_negative_balance() {
    let codec = codec();
    let mut record = sample();
    record.first_name = "Zoë".to_string();
    record.last_name = "Ørsted".to_string();
    record.balance = "-12.5".parse().unwrap();
    record.marital_status = 'm';

    let bytes = codec.encode(&record).unwrap();
    assert_eq!(codec.decode(&bytes).unwrap().into_record(), Some(record));
}

#[test]
fn test_name_at_full_width_round_trips() {
    let codec = SlotCodec::new(4);
    let mut record = sample();
    record.first_name = "Anna".to_string();
    record.last_name = "Li".to_string();

    let bytes = codec.encode(&record).unwrap();
    let decoded = codec.decode(&bytes).unwrap().into_record().unwrap();

    assert_eq!(decoded.first_name, "Anna");
    assert_eq!(decoded.last_name, "Li");
}

#[test]
fn test_name_wider_than_slot_is_rejected() {
    let codec = SlotCodec::new(4);
    let mut record = sample();
    record.last_name = "Jackson".to_string();

    let err = codec.encode(&record).unwrap_err();
    assert!(matches!(
        err,
        CabinetError::ValidationFailed {
            field: Field::LastName,
            ..
        }
    ));
}

// =============================================================================
// Tombstone Tests
// =============================================================================

#[test]
fn test_tombstoned_slot_is_inactive() {
    let codec = codec();
    let mut bytes = codec.encode(&sample()).unwrap().to_vec();
    bytes[0] = STATUS_TOMBSTONED;

    let decoded = codec.decode(&bytes).unwrap();
    assert!(!decoded.is_active());
    assert_eq!(decoded, DecodedSlot::Tombstoned);
}

#[test]
fn test_tombstoned_slot_payload_is_not_checked() {
    let codec = codec();
    let mut bytes = codec.encode(&sample()).unwrap().to_vec();
    bytes[0] = STATUS_TOMBSTONED;
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;

    assert_eq!(codec.decode(&bytes).unwrap(), DecodedSlot::Tombstoned);
}

#[test]
fn test_peek_id_reads_tombstoned_slot() {
    let codec = codec();
    let mut bytes = codec.encode(&sample()).unwrap().to_vec();
    bytes[0] = STATUS_TOMBSTONED;

    assert_eq!(codec.peek_id(&bytes), Some(7));
    assert_eq!(codec.peek_id(&bytes[..3]), None);
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_short_slot_is_corrupt() {
    let codec = codec();
    let bytes = codec.encode(&sample()).unwrap();

    let err = codec.decode(&bytes[..bytes.len() - 1]).unwrap_err();
    assert!(matches!(err, CabinetError::CorruptRecord(_)));

    let err = codec.decode(&[]).unwrap_err();
    assert!(matches!(err, CabinetError::CorruptRecord(_)));
}

#[test]
fn test_flipped_payload_byte_is_corrupt() {
    let codec = codec();
    let mut bytes = codec.encode(&sample()).unwrap().to_vec();
    bytes[6] ^= 0x01;

    let err = codec.decode(&bytes).unwrap_err();
    assert!(matches!(err, CabinetError::CorruptRecord(_)));
}

#[test]
fn test_unknown_status_is_corrupt() {
    let codec = codec();
    let mut bytes = codec.encode(&sample()).unwrap().to_vec();
    bytes[0] = 7;

    let err = codec.decode(&bytes).unwrap_err();
    assert!(matches!(err, CabinetError::CorruptRecord(_)));
}

#[test]
fn test_longer_input_decodes_first_slot() {
    let codec = codec();
    let mut bytes = codec.encode(&sample()).unwrap().to_vec();
    bytes.extend_from_slice(&[0xAB; 10]);

    assert_eq!(
        codec.decode(&bytes).unwrap(),
        DecodedSlot::Active(sample())
    );
}
