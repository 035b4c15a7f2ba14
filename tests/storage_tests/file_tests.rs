//! Tests for FileStore
//!
//! These tests verify:
//! - Records persist across reopen (indexes rebuilt from a scan)
//! - Edits rewrite the slot in place at the same offset
//! - Deletes tombstone slots in place; stat reports them as removed
//! - Compaction drops tombstones, truncates, reissues offsets
//! - Corrupt and partial slots are skipped on open
//! - Ids stay monotonic across restarts
//! - A duplicate id on disk keeps only the later slot

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use cabinet::codec::{SlotCodec, DEFAULT_MAX_NAME_LEN};
use cabinet::index::Location;
use cabinet::record::{Decimal, Field, FieldValue, Record};
use cabinet::storage::{FileStore, RecordStore, StoreStats};
use cabinet::{CabinetError, Criteria, ValidationRules};
use chrono::NaiveDate;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_file() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cabinet.db");
    (temp_dir, path)
}

fn open(path: &PathBuf) -> FileStore {
    FileStore::open(path, DEFAULT_MAX_NAME_LEN, ValidationRules::default()).unwrap()
}

fn slot_size() -> u64 {
    SlotCodec::new(DEFAULT_MAX_NAME_LEN).slot_size() as u64
}

fn by_height(store: &FileStore, height: i16) -> Vec<Record> {
    store
        .select(&Criteria::field(Field::Height, height))
        .unwrap()
        .collect(store)
        .unwrap()
}

fn person(first: &str, last: &str) -> Record {
    Record::new(
        first,
        last,
        NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        "100.00".parse::<Decimal>().unwrap(),
        'U',
        180,
    )
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_open_creates_file() {
    let (_temp, path) = setup_temp_file();
    assert!(!path.exists());

    let store = open(&path);

    assert!(path.exists());
    assert_eq!(store.stat(), StoreStats::default());
    assert_eq!(store.next_id(), Some(1));
}

#[test]
fn test_open_creates_parent_directories() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("dir").join("cabinet.db");

    let _store = open(&path);

    assert!(path.exists());
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_records_survive_reopen() {
    let (_temp, path) = setup_temp_file();
    {
        let mut store = open(&path);
        store.create(person("John", "Doe"), false).unwrap();
        store.create(person("Ann", "Lee"), false).unwrap();
    }

    let store = open(&path);
    assert_eq!(store.stat().active, 2);
    assert_eq!(store.get(2).unwrap().first_name, "Ann");
    let found = store
        .select(&Criteria::field(Field::LastName, "doe"))
        .unwrap()
        .collect(&store)
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, 1);
}

#[test]
fn test_file_grows_by_one_slot_per_create() {
    let (_temp, path) = setup_temp_file();
    let mut store = open(&path);

    store.create(person("John", "Doe"), false).unwrap();
    assert_eq!(fs::metadata(&path).unwrap().len(), slot_size());

    store.create(person("Ann", "Lee"), false).unwrap();
    assert_eq!(fs::metadata(&path).unwrap().len(), 2 * slot_size());
    assert_eq!(store.index().lookup_id(2), Some(Location(slot_size())));
}

#[test]
fn test_codec_width_follows_open_argument() {
    let (_temp, path) = setup_temp_file();
    let store = FileStore::open(&path, 8, ValidationRules::default()).unwrap();

    assert_eq!(store.codec().max_name_len(), 8);
    assert_eq!(store.codec().slot_size(), SlotCodec::new(8).slot_size());
    assert!(store.codec().slot_size() < slot_size() as usize);
}

// =============================================================================
// Edit Tests
// =============================================================================

#[test]
fn test_edit_rewrites_in_place() {
    let (_temp, path) = setup_temp_file();
    let mut store = open(&path);
    store.create(person("John", "Doe"), false).unwrap();
    store.create(person("Ann", "Lee"), false).unwrap();

    let mut changed = person("John", "Doe");
    changed.balance = "150.00".parse().unwrap();
    store.edit(1, changed).unwrap();

    assert_eq!(fs::metadata(&path).unwrap().len(), 2 * slot_size());
    assert_eq!(store.index().lookup_id(1), Some(Location(0)));
    drop(store);

    let store = open(&path);
    assert_eq!(store.get(1).unwrap().balance, Decimal::from_int(150));
}

#[test]
fn test_edit_missing_id() {
    let (_temp, path) = setup_temp_file();
    let mut store = open(&path);
    let err = store.edit(3, person("John", "Doe")).unwrap_err();
    assert!(matches!(err, CabinetError::NotFound(3)));
}

#[test]
fn test_name_too_wide_for_slot_is_rejected() {
    let (_temp, path) = setup_temp_file();
    let mut store = FileStore::open(&path, 4, ValidationRules::default()).unwrap();

    let err = store.create(person("Johnathan", "Doe"), false).unwrap_err();
    assert!(matches!(err, CabinetError::ValidationFailed { field: Field::FirstName, .. }));
    assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    assert_eq!(store.stat().active, 0);
}

// =============================================================================
// Delete / Tombstone Tests
// =============================================================================

#[test]
fn test_delete_tombstones_in_place() {
    let (_temp, path) = setup_temp_file();
    let mut store = open(&path);
    store.create(person("John", "Doe"), false).unwrap();
    store.create(person("Ann", "Lee"), false).unwrap();

    let removed = store.delete(Field::FirstName, &"john".into()).unwrap();

    assert_eq!(removed, vec![1]);
    assert_eq!(fs::metadata(&path).unwrap().len(), 2 * slot_size());
    assert_eq!(store.stat(), StoreStats { active: 1, removed: 1 });
    assert!(matches!(store.get(1), Err(CabinetError::NotFound(1))));
    assert_eq!(store.read(Location(0)).unwrap(), None);

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes[0], 1);
}

#[test]
fn test_delete_then_select_is_empty() {
    let (_temp, path) = setup_temp_file();
    let mut store = open(&path);
    store.create(person("John", "Doe"), false).unwrap();

    store.delete(Field::LastName, &"Doe".into()).unwrap();

    let selection = store.select(&Criteria::field(Field::LastName, "Doe")).unwrap();
    assert_eq!(selection.iter(&store).count(), 0);
}

#[test]
fn test_tombstones_survive_reopen() {
    let (_temp, path) = setup_temp_file();
    {
        let mut store = open(&path);
        store.create(person("John", "Doe"), false).unwrap();
        store.create(person("Ann", "Lee"), false).unwrap();
        store.delete(Field::Id, &FieldValue::Id(2)).unwrap();
    }

    let mut store = open(&path);
    assert_eq!(store.stat(), StoreStats { active: 1, removed: 1 });
    // Id 2 was tombstoned but is still never reused
    assert_eq!(store.next_id(), Some(3));
    assert_eq!(store.create(person("Bob", "Ray"), false).unwrap(), 3);
}

#[test]
fn test_highest_id_is_storable_and_survives_reopen() {
    let (_temp, path) = setup_temp_file();
    {
        let mut store = open(&path);
        assert_eq!(store.insert(person("Max", "Id").with_id(i32::MAX)).unwrap(), i32::MAX);
        assert_eq!(store.next_id(), None);
    }

    let mut store = open(&path);
    assert_eq!(store.get(i32::MAX).unwrap().first_name, "Max");
    assert_eq!(store.next_id(), None);

    let err = store.create(person("John", "Doe"), false).unwrap_err();
    assert!(matches!(err, CabinetError::ValidationFailed { field: Field::Id, .. }));
    assert_eq!(store.insert(person("John", "Doe").with_id(5)).unwrap(), 5);
}

// =============================================================================
// Duplicate Id Tests
// =============================================================================

#[test]
fn test_duplicate_id_keeps_later_slot() {
    let (_temp, path) = setup_temp_file();
    let codec = SlotCodec::new(DEFAULT_MAX_NAME_LEN);
    let mut bytes = codec.encode(&person("Ann", "Doe").with_id(1)).unwrap().to_vec();
    bytes.extend_from_slice(&codec.encode(&person("Bob", "Doe").with_id(1)).unwrap());
    fs::write(&path, &bytes).unwrap();

    let store = open(&path);
    assert_eq!(store.stat(), StoreStats { active: 1, removed: 1 });
    assert_eq!(store.get(1).unwrap().first_name, "Bob");
    let found = by_height(&store, 180);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].first_name, "Bob");
    drop(store);

    // The earlier slot was tombstoned on disk
    assert_eq!(fs::read(&path).unwrap()[0], 1);

    let store = open(&path);
    assert_eq!(store.stat(), StoreStats { active: 1, removed: 1 });
    assert_eq!(by_height(&store, 180).len(), 1);
}

#[test]
fn test_duplicate_id_then_delete_removes_everything() {
    let (_temp, path) = setup_temp_file();
    let codec = SlotCodec::new(DEFAULT_MAX_NAME_LEN);
    let mut bytes = codec.encode(&person("Ann", "Doe").with_id(1)).unwrap().to_vec();
    bytes.extend_from_slice(&codec.encode(&person("Bob", "Doe").with_id(1)).unwrap());
    fs::write(&path, &bytes).unwrap();

    let mut store = open(&path);
    assert_eq!(store.delete(Field::Id, &FieldValue::Id(1)).unwrap(), vec![1]);
    assert!(by_height(&store, 180).is_empty());
    assert!(store.index().all_locations().is_empty());
}

// =============================================================================
// Compaction Tests
// =============================================================================

#[test]
fn test_compact_drops_tombstones() {
    let (_temp, path) = setup_temp_file();
    let mut store = open(&path);
    for name in ["Aaron", "Bella", "Chris"] {
        store.create(person(name, "Doe"), false).unwrap();
    }
    store.delete(Field::FirstName, &"Aaron".into()).unwrap();

    let dropped = store.compact().unwrap();

    assert_eq!(dropped, 1);
    assert_eq!(store.stat(), StoreStats { active: 2, removed: 0 });
    assert_eq!(fs::metadata(&path).unwrap().len(), 2 * slot_size());
    assert_eq!(store.index().lookup_id(2), Some(Location(0)));
    assert_eq!(store.index().lookup_id(3), Some(Location(slot_size())));
    assert_eq!(store.get(2).unwrap().first_name, "Bella");
    assert_eq!(store.get(3).unwrap().first_name, "Chris");
}

#[test]
fn test_compact_is_idempotent() {
    let (_temp, path) = setup_temp_file();
    let mut store = open(&path);
    store.create(person("John", "Doe"), false).unwrap();
    store.create(person("Ann", "Lee"), false).unwrap();
    store.delete(Field::Id, &FieldValue::Id(1)).unwrap();

    store.compact().unwrap();
    let first_pass = fs::read(&path).unwrap();

    assert_eq!(store.compact().unwrap(), 0);
    assert_eq!(fs::read(&path).unwrap(), first_pass);
    assert_eq!(store.stat(), StoreStats { active: 1, removed: 0 });
}

#[test]
fn test_compact_keeps_allocating_after_highest_id() {
    let (_temp, path) = setup_temp_file();
    let mut store = open(&path);
    store.create(person("John", "Doe"), false).unwrap();
    store.create(person("Ann", "Lee"), false).unwrap();
    store.delete(Field::Id, &FieldValue::Id(2)).unwrap();
    store.compact().unwrap();

    assert_eq!(store.create(person("Bob", "Ray"), false).unwrap(), 3);
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_corrupt_slot_is_skipped_on_open() {
    let (_temp, path) = setup_temp_file();
    {
        let mut store = open(&path);
        store.create(person("John", "Doe"), false).unwrap();
        store.create(person("Ann", "Lee"), false).unwrap();
    }

    // Damage the first slot's payload
    let mut bytes = fs::read(&path).unwrap();
    bytes[8] ^= 0xFF;
    fs::write(&path, &bytes).unwrap();

    let store = open(&path);
    assert_eq!(store.stat(), StoreStats { active: 1, removed: 1 });
    assert!(store.get(1).is_err());
    assert_eq!(store.get(2).unwrap().first_name, "Ann");
}

#[test]
fn test_partial_trailing_slot_is_ignored() {
    let (_temp, path) = setup_temp_file();
    {
        let mut store = open(&path);
        store.create(person("John", "Doe"), false).unwrap();
    }
    {
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&[0u8; 7]).unwrap();
    }

    let store = open(&path);
    assert_eq!(store.stat(), StoreStats { active: 1, removed: 0 });
    assert_eq!(store.slot_count(), 1);
}

#[test]
fn test_compact_drops_corrupt_slots() {
    let (_temp, path) = setup_temp_file();
    {
        let mut store = open(&path);
        store.create(person("John", "Doe"), false).unwrap();
        store.create(person("Ann", "Lee"), false).unwrap();
    }
    let mut bytes = fs::read(&path).unwrap();
    bytes[8] ^= 0xFF;
    fs::write(&path, &bytes).unwrap();

    let mut store = open(&path);
    assert_eq!(store.compact().unwrap(), 1);
    assert_eq!(store.stat(), StoreStats { active: 1, removed: 0 });
    assert_eq!(store.get(2).unwrap().last_name, "Lee");
}
