//! Field identifiers and typed field values
//!
//! Every lookup, predicate and update names a field through the closed
//! [`Field`] enum and carries its value as a [`FieldValue`], so index and
//! criteria code dispatch with a `match` instead of string comparisons.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Decimal;
use crate::error::{CabinetError, Result};

/// Date formats accepted by [`FieldValue::parse`]
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Record fields, in tuple order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Id,
    FirstName,
    LastName,
    DateOfBirth,
    Balance,
    MaritalStatus,
    Height,
}

impl Field {
    /// All fields in tuple order
    pub const ALL: [Field; 7] = [
        Field::Id,
        Field::FirstName,
        Field::LastName,
        Field::DateOfBirth,
        Field::Balance,
        Field::MaritalStatus,
        Field::Height,
    ];

    /// The six fields with a secondary index
    pub const SECONDARY: [Field; 6] = [
        Field::FirstName,
        Field::LastName,
        Field::DateOfBirth,
        Field::Balance,
        Field::MaritalStatus,
        Field::Height,
    ];

    /// Canonical lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::FirstName => "firstname",
            Field::LastName => "lastname",
            Field::DateOfBirth => "dateofbirth",
            Field::Balance => "balance",
            Field::MaritalStatus => "maritalstatus",
            Field::Height => "height",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = CabinetError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "id" => Ok(Field::Id),
            "firstname" | "first" => Ok(Field::FirstName),
            "lastname" | "last" => Ok(Field::LastName),
            "dateofbirth" | "birthdate" | "dob" => Ok(Field::DateOfBirth),
            "balance" | "wallet" => Ok(Field::Balance),
            "maritalstatus" | "status" => Ok(Field::MaritalStatus),
            "height" => Ok(Field::Height),
            _ => Err(CabinetError::InvalidCriteria(format!(
                "unknown field '{}'",
                s.trim()
            ))),
        }
    }
}

/// A typed value for one field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldValue {
    Id(i32),
    Text(String),
    Date(NaiveDate),
    Decimal(Decimal),
    Char(char),
    Short(i16),
}

impl FieldValue {
    /// Parse raw text into the value type `field` expects
    ///
    /// Surrounding single or double quotes are stripped first, so the text of
    /// a `firstname = 'Ann'` predicate can be handed over as-is.
    pub fn parse(field: Field, raw: &str) -> Result<Self> {
        let text = unquote(raw.trim());
        let invalid = |what: &str| {
            CabinetError::InvalidCriteria(format!("'{}' is not a valid {} for {}", text, what, field))
        };

        match field {
            Field::Id => text.parse().map(FieldValue::Id).map_err(|_| invalid("id")),
            Field::FirstName | Field::LastName => Ok(FieldValue::Text(text.to_string())),
            Field::DateOfBirth => DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .map(FieldValue::Date)
                .ok_or_else(|| invalid("date")),
            Field::Balance => text
                .parse::<Decimal>()
                .map(FieldValue::Decimal)
                .map_err(|_| invalid("decimal")),
            Field::MaritalStatus => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(FieldValue::Char(c)),
                    _ => Err(invalid("character")),
                }
            }
            Field::Height => text
                .parse()
                .map(FieldValue::Short)
                .map_err(|_| invalid("height")),
        }
    }

    /// Whether this value has the variant `field` expects
    pub fn fits(&self, field: Field) -> bool {
        matches!(
            (field, self),
            (Field::Id, FieldValue::Id(_))
                | (Field::FirstName | Field::LastName, FieldValue::Text(_))
                | (Field::DateOfBirth, FieldValue::Date(_))
                | (Field::Balance, FieldValue::Decimal(_))
                | (Field::MaritalStatus, FieldValue::Char(_))
                | (Field::Height, FieldValue::Short(_))
        )
    }

    /// Normalized key used by the secondary indexes
    pub fn index_key(&self) -> IndexKey {
        match self {
            FieldValue::Id(id) => IndexKey::Id(*id),
            FieldValue::Text(s) => IndexKey::Text(s.to_uppercase()),
            FieldValue::Date(d) => IndexKey::Date(*d),
            FieldValue::Decimal(d) => IndexKey::Decimal(*d),
            FieldValue::Char(c) => IndexKey::Char(c.to_ascii_uppercase()),
            FieldValue::Short(h) => IndexKey::Short(*h),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Id(id) => write!(f, "{}", id),
            FieldValue::Text(s) => write!(f, "'{}'", s),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Decimal(d) => write!(f, "{}", d),
            FieldValue::Char(c) => write!(f, "'{}'", c),
            FieldValue::Short(h) => write!(f, "{}", h),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Decimal(value)
    }
}

impl From<char> for FieldValue {
    fn from(value: char) -> Self {
        FieldValue::Char(value)
    }
}

impl From<i16> for FieldValue {
    fn from(value: i16) -> Self {
        FieldValue::Short(value)
    }
}

/// Normalized, hashable form of a field value
///
/// Text is uppercased so lookups are case-insensitive; everything else
/// compares by exact value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexKey {
    Id(i32),
    Text(String),
    Date(NaiveDate),
    Decimal(Decimal),
    Char(char),
    Short(i16),
}

fn unquote(text: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}
