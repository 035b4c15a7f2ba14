//! Record Module
//!
//! The fixed-schema personal record and its typed field access.
//!
//! ## Responsibilities
//! - Define the record entity (identity, names, birth date, balance,
//!   marital status, height)
//! - Typed field identifiers and values shared by the indexes, criteria and
//!   update paths
//! - Lossless fixed-point balances

mod decimal;
mod field;

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use decimal::{Decimal, DecimalError, MAX_SCALE};
pub use field::{Field, FieldValue, IndexKey};

use crate::error::{CabinetError, Result};

/// A personal record
///
/// Field order here is the export tuple order:
/// `(id, first name, last name, birth date, balance, marital status, height)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Identifier; 0 means "not assigned yet"
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub balance: Decimal,
    pub marital_status: char,
    pub height: i16,
}

impl Record {
    /// Create a record without an id (the store assigns one)
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        date_of_birth: NaiveDate,
        balance: Decimal,
        marital_status: char,
        height: i16,
    ) -> Self {
        Self {
            id: 0,
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth,
            balance,
            marital_status,
            height,
        }
    }

    /// Same record carrying `id`
    pub fn with_id(mut self, id: i32) -> Self {
        self.id = id;
        self
    }

    /// Current value of `field`
    pub fn value(&self, field: Field) -> FieldValue {
        match field {
            Field::Id => FieldValue::Id(self.id),
            Field::FirstName => FieldValue::Text(self.first_name.clone()),
            Field::LastName => FieldValue::Text(self.last_name.clone()),
            Field::DateOfBirth => FieldValue::Date(self.date_of_birth),
            Field::Balance => FieldValue::Decimal(self.balance),
            Field::MaritalStatus => FieldValue::Char(self.marital_status),
            Field::Height => FieldValue::Short(self.height),
        }
    }

    /// Index key of `field` (text uppercased)
    pub fn index_key(&self, field: Field) -> IndexKey {
        match field {
            Field::Id => IndexKey::Id(self.id),
            Field::FirstName => IndexKey::Text(self.first_name.to_uppercase()),
            Field::LastName => IndexKey::Text(self.last_name.to_uppercase()),
            Field::DateOfBirth => IndexKey::Date(self.date_of_birth),
            Field::Balance => IndexKey::Decimal(self.balance),
            Field::MaritalStatus => IndexKey::Char(self.marital_status.to_ascii_uppercase()),
            Field::Height => IndexKey::Short(self.height),
        }
    }

    /// Overwrite one field, rejecting a value of the wrong type
    pub fn set_value(&mut self, field: Field, value: FieldValue) -> Result<()> {
        match (field, value) {
            (Field::Id, FieldValue::Id(id)) => self.id = id,
            (Field::FirstName, FieldValue::Text(s)) => self.first_name = s,
            (Field::LastName, FieldValue::Text(s)) => self.last_name = s,
            (Field::DateOfBirth, FieldValue::Date(d)) => self.date_of_birth = d,
            (Field::Balance, FieldValue::Decimal(d)) => self.balance = d,
            (Field::MaritalStatus, FieldValue::Char(c)) => self.marital_status = c,
            (Field::Height, FieldValue::Short(h)) => self.height = h,
            (field, value) => {
                return Err(CabinetError::InvalidValue {
                    field,
                    reason: format!("{} has the wrong type", value),
                })
            }
        }
        Ok(())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{}, {}, {}, {}, {}, {}, {}",
            self.id,
            self.first_name,
            self.last_name,
            self.date_of_birth.format("%Y-%m-%d"),
            self.balance,
            self.marital_status,
            self.height
        )
    }
}
