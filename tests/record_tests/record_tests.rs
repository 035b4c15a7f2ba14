//! Tests for Record, Decimal and field values
//!
//! These tests verify:
//! - Decimal parsing, normalization, ordering and display
//! - Field name parsing (case, aliases, unknown names)
//! - Typed value parsing per field
//! - Typed field access on records

use cabinet::record::{Decimal, Field, FieldValue, IndexKey, Record};
use cabinet::CabinetError;
use chrono::NaiveDate;

// =============================================================================
// Helper Functions
// =============================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn john() -> Record {
    Record::new("John", "Doe", date(1990, 1, 1), dec("100.00"), 'U', 180).with_id(1)
}

// =============================================================================
// Decimal Tests
// =============================================================================

#[test]
fn test_decimal_trailing_zeros_are_equal() {
    assert_eq!(dec("150.00"), dec("150"));
    assert_eq!(dec("150.0"), dec("150.000"));
    assert_eq!(dec("0.00"), Decimal::ZERO);
}

#[test]
fn test_decimal_keeps_fraction() {
    let value = dec("12.345");
    assert_eq!(value.digits(), 12345);
    assert_eq!(value.scale(), 3);
    assert_eq!(value.to_string(), "12.345");
}

#[test]
fn test_decimal_negative() {
    let value = dec("-0.5");
    assert!(value.is_negative());
    assert_eq!(value.to_string(), "-0.5");
    assert!(value < Decimal::ZERO);
}

#[test]
fn test_decimal_ordering_across_scales() {
    assert!(dec("1.5") < dec("2"));
    assert!(dec("10") > dec("9.99"));
    assert!(dec("-3") < dec("-2.5"));
}

#[test]
fn test_decimal_ordering_with_extreme_magnitudes() {
    let huge = Decimal::new(10i128.pow(37), 0).unwrap();
    let tiny = Decimal::new(1, 28).unwrap();

    assert!(huge > tiny);
    assert!(tiny < huge);
    assert!(Decimal::new(-(10i128.pow(37)), 0).unwrap() < Decimal::new(-1, 28).unwrap());
    assert!(Decimal::new(-1, 28).unwrap() < tiny);
    assert!(Decimal::new(-5, 1).unwrap() < Decimal::new(3, 28).unwrap());
    assert!(Decimal::new(12, 1).unwrap() > Decimal::new(11_999_999, 7).unwrap());
}

#[test]
fn test_decimal_rejects_garbage() {
    assert!("".parse::<Decimal>().is_err());
    assert!("-".parse::<Decimal>().is_err());
    assert!("1.2.3".parse::<Decimal>().is_err());
    assert!("12a".parse::<Decimal>().is_err());
    assert!("1e5".parse::<Decimal>().is_err());
}

#[test]
fn test_decimal_new_rejects_large_scale() {
    assert!(Decimal::new(1, 29).is_err());
    assert_eq!(Decimal::new(15000, 2).unwrap(), Decimal::from_int(150));
}

// =============================================================================
// Field Tests
// =============================================================================

#[test]
fn test_field_parse_case_insensitive() {
    assert_eq!("FIRSTNAME".parse::<Field>().unwrap(), Field::FirstName);
    assert_eq!("LastName".parse::<Field>().unwrap(), Field::LastName);
    assert_eq!("id".parse::<Field>().unwrap(), Field::Id);
}

#[test]
fn test_field_parse_aliases() {
    assert_eq!("wallet".parse::<Field>().unwrap(), Field::Balance);
    assert_eq!("date_of_birth".parse::<Field>().unwrap(), Field::DateOfBirth);
    assert_eq!("dob".parse::<Field>().unwrap(), Field::DateOfBirth);
    assert_eq!("marital-status".parse::<Field>().unwrap(), Field::MaritalStatus);
}

#[test]
fn test_field_parse_unknown() {
    let err = "salary".parse::<Field>().unwrap_err();
    assert!(matches!(err, CabinetError::InvalidCriteria(_)));
}

// =============================================================================
// FieldValue Tests
// =============================================================================

#[test]
fn test_parse_values_per_field() {
    assert_eq!(FieldValue::parse(Field::Id, "5").unwrap(), FieldValue::Id(5));
    assert_eq!(
        FieldValue::parse(Field::FirstName, "'Ann'").unwrap(),
        FieldValue::Text("Ann".to_string())
    );
    assert_eq!(
        FieldValue::parse(Field::Balance, "150.00").unwrap(),
        FieldValue::Decimal(dec("150"))
    );
    assert_eq!(
        FieldValue::parse(Field::MaritalStatus, "m").unwrap(),
        FieldValue::Char('m')
    );
    assert_eq!(
        FieldValue::parse(Field::Height, "180").unwrap(),
        FieldValue::Short(180)
    );
}

#[test]
fn test_parse_date_formats() {
    assert_eq!(
        FieldValue::parse(Field::DateOfBirth, "1990-01-15").unwrap(),
        FieldValue::Date(date(1990, 1, 15))
    );
    assert_eq!(
        FieldValue::parse(Field::DateOfBirth, "01/15/1990").unwrap(),
        FieldValue::Date(date(1990, 1, 15))
    );
}

#[test]
fn test_parse_invalid_values() {
    assert!(FieldValue::parse(Field::Id, "abc").is_err());
    assert!(FieldValue::parse(Field::Height, "40000").is_err());
    assert!(FieldValue::parse(Field::MaritalStatus, "MU").is_err());
    assert!(FieldValue::parse(Field::DateOfBirth, "1990-13-01").is_err());
}

#[test]
fn test_value_fits_field() {
    assert!(FieldValue::Text("x".into()).fits(Field::LastName));
    assert!(!FieldValue::Text("x".into()).fits(Field::Height));
    assert!(!FieldValue::Short(1).fits(Field::Id));
}

#[test]
fn test_index_key_uppercases_text_and_status() {
    assert_eq!(
        FieldValue::from("ann").index_key(),
        IndexKey::Text("ANN".to_string())
    );
    assert_eq!(FieldValue::Char('u').index_key(), IndexKey::Char('U'));
}

// =============================================================================
// Record Tests
// =============================================================================

#[test]
fn test_record_value_access() {
    let record = john();
    assert_eq!(record.value(Field::Id), FieldValue::Id(1));
    assert_eq!(record.value(Field::LastName), FieldValue::Text("Doe".into()));
    assert_eq!(record.value(Field::Height), FieldValue::Short(180));
}

#[test]
fn test_record_index_key_matches_value_key() {
    let record = john();
    for field in Field::ALL {
        assert_eq!(record.index_key(field), record.value(field).index_key());
    }
}

#[test]
fn test_record_set_value() {
    let mut record = john();
    record
        .set_value(Field::Balance, FieldValue::Decimal(dec("150.00")))
        .unwrap();
    assert_eq!(record.balance, dec("150"));
}

#[test]
fn test_record_set_value_wrong_type() {
    let mut record = john();
    let err = record
        .set_value(Field::Height, FieldValue::Text("tall".into()))
        .unwrap_err();
    assert!(matches!(err, CabinetError::InvalidValue { field: Field::Height, .. }));
    assert_eq!(record, john());
}

#[test]
fn test_record_display_is_field_tuple() {
    assert_eq!(john().to_string(), "#1, John, Doe, 1990-01-01, 100, U, 180");
}
