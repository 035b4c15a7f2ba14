//! Validation Module
//!
//! The active rule set every store checks records against before any
//! mutation.
//!
//! ## Presets
//! - [`ValidationRules::default`]: names 2-60 characters, born 1950-01-01 or
//!   later, non-negative balance, marital status M/U, height 0-300
//! - [`ValidationRules::custom`]: names 3-40 characters, born 1900-01-01 or
//!   later, balance up to 1 000 000, height 50-250
//!
//! Rule sets are plain serde data so a loader can build them from any
//! configuration source.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CabinetError, Result};
use crate::record::{Decimal, Field, FieldValue, Record};

/// Length bounds for a name, in characters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRule {
    pub min_len: usize,
    pub max_len: usize,
}

/// Inclusive birth-date bounds; a missing upper bound means "today"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRule {
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
}

/// Inclusive balance bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalRule {
    pub min: Decimal,
    pub max: Option<Decimal>,
}

/// Inclusive height bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortRule {
    pub min: i16,
    pub max: i16,
}

/// A complete rule set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRules {
    pub first_name: TextRule,
    pub last_name: TextRule,
    pub date_of_birth: DateRule,
    pub balance: DecimalRule,
    /// Allowed marital statuses, compared case-insensitively
    pub marital_statuses: Vec<char>,
    pub height: ShortRule,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            first_name: TextRule {
                min_len: 2,
                max_len: 60,
            },
            last_name: TextRule {
                min_len: 2,
                max_len: 60,
            },
            date_of_birth: DateRule {
                from: ymd(1950, 1, 1),
                to: None,
            },
            balance: DecimalRule {
                min: Decimal::ZERO,
                max: None,
            },
            marital_statuses: vec!['M', 'U'],
            height: ShortRule { min: 0, max: 300 },
        }
    }
}

impl ValidationRules {
    /// The stricter alternative preset
    pub fn custom() -> Self {
        Self {
            first_name: TextRule {
                min_len: 3,
                max_len: 40,
            },
            last_name: TextRule {
                min_len: 3,
                max_len: 40,
            },
            date_of_birth: DateRule {
                from: ymd(1900, 1, 1),
                to: None,
            },
            balance: DecimalRule {
                min: Decimal::ZERO,
                max: Some(Decimal::from_int(1_000_000)),
            },
            marital_statuses: vec!['M', 'U'],
            height: ShortRule { min: 50, max: 250 },
        }
    }

    /// Validate every field of a record, stopping at the first failure
    ///
    /// An id of 0 means "unassigned" and passes; negative ids never do.
    pub fn validate(&self, record: &Record) -> Result<()> {
        if record.id < 0 {
            return Err(CabinetError::validation(Field::Id, "must be positive"));
        }
        for field in Field::SECONDARY {
            self.validate_field(field, &record.value(field))?;
        }
        Ok(())
    }

    /// Validate a single field value
    pub fn validate_field(&self, field: Field, value: &FieldValue) -> Result<()> {
        match (field, value) {
            (Field::Id, FieldValue::Id(id)) => {
                if *id <= 0 {
                    return Err(CabinetError::validation(field, "must be positive"));
                }
            }
            (Field::FirstName, FieldValue::Text(name)) => {
                check_text(field, &self.first_name, name)?
            }
            (Field::LastName, FieldValue::Text(name)) => {
                check_text(field, &self.last_name, name)?
            }
            (Field::DateOfBirth, FieldValue::Date(date)) => {
                let to = self
                    .date_of_birth
                    .to
                    .unwrap_or_else(|| Utc::now().date_naive());
                if *date < self.date_of_birth.from || *date > to {
                    return Err(CabinetError::validation(
                        field,
                        format!(
                            "{} is outside {} ..= {}",
                            date.format("%Y-%m-%d"),
                            self.date_of_birth.from.format("%Y-%m-%d"),
                            to.format("%Y-%m-%d")
                        ),
                    ));
                }
            }
            (Field::Balance, FieldValue::Decimal(balance)) => {
                if *balance < self.balance.min {
                    return Err(CabinetError::validation(
                        field,
                        format!("{} is below {}", balance, self.balance.min),
                    ));
                }
                if let Some(max) = self.balance.max {
                    if *balance > max {
                        return Err(CabinetError::validation(
                            field,
                            format!("{} is above {}", balance, max),
                        ));
                    }
                }
            }
            (Field::MaritalStatus, FieldValue::Char(status)) => {
                let upper = status.to_ascii_uppercase();
                if !self
                    .marital_statuses
                    .iter()
                    .any(|allowed| allowed.to_ascii_uppercase() == upper)
                {
                    return Err(CabinetError::validation(
                        field,
                        format!(
                            "'{}' is not one of {:?}",
                            status, self.marital_statuses
                        ),
                    ));
                }
            }
            (Field::Height, FieldValue::Short(height)) => {
                if *height < self.height.min || *height > self.height.max {
                    return Err(CabinetError::validation(
                        field,
                        format!(
                            "{} is outside {}..={}",
                            height, self.height.min, self.height.max
                        ),
                    ));
                }
            }
            (field, value) => {
                return Err(CabinetError::validation(
                    field,
                    format!("{} has the wrong type", value),
                ))
            }
        }
        Ok(())
    }
}

fn check_text(field: Field, rule: &TextRule, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CabinetError::validation(field, "must not be blank"));
    }
    // Slots pad names with NUL, so a stored control character would not read back
    if value.chars().any(char::is_control) {
        return Err(CabinetError::validation(
            field,
            "must not contain control characters",
        ));
    }
    let len = value.chars().count();
    if len < rule.min_len || len > rule.max_len {
        return Err(CabinetError::validation(
            field,
            format!(
                "length {} is outside {}..={}",
                len, rule.min_len, rule.max_len
            ),
        ));
    }
    Ok(())
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}
