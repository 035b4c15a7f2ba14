//! Fixed-point decimal
//!
//! Balances are stored as an integer digit count plus a decimal scale, so
//! `150.00` is `{ digits: 15000, scale: 2 }` before normalization. Values are
//! normalized on construction (trailing fractional zeros dropped), which makes
//! the derived `Eq`/`Hash` agree with numeric equality.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Largest scale a decimal can carry
pub const MAX_SCALE: u8 = 28;

/// Signed fixed-point decimal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(i128, u8)", into = "(i128, u8)")]
pub struct Decimal {
    digits: i128,
    scale: u8,
}

/// Error returned when a decimal cannot be built or parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalError(pub String);

impl fmt::Display for DecimalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for DecimalError {}

impl Decimal {
    pub const ZERO: Decimal = Decimal { digits: 0, scale: 0 };

    /// Build a decimal from raw digits and a scale (`new(15000, 2)` is 150.00)
    pub fn new(digits: i128, scale: u8) -> Result<Self, DecimalError> {
        if scale > MAX_SCALE {
            return Err(DecimalError(format!(
                "scale {} exceeds maximum of {}",
                scale, MAX_SCALE
            )));
        }
        Ok(Self::normalized(digits, scale))
    }

    /// A whole-number decimal
    pub fn from_int(value: i64) -> Self {
        Self {
            digits: value as i128,
            scale: 0,
        }
    }

    fn normalized(mut digits: i128, mut scale: u8) -> Self {
        while scale > 0 && digits % 10 == 0 {
            digits /= 10;
            scale -= 1;
        }
        if digits == 0 {
            scale = 0;
        }
        Self { digits, scale }
    }

    pub fn digits(&self) -> i128 {
        self.digits
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    pub fn is_negative(&self) -> bool {
        self.digits < 0
    }

    /// Whole part and fraction digits, both truncated toward zero
    fn split(&self) -> (i128, i128) {
        let divisor = 10i128.pow(self.scale as u32);
        (self.digits / divisor, self.digits % divisor)
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.scale == other.scale {
            return self.digits.cmp(&other.digits);
        }
        let (self_int, self_frac) = self.split();
        let (other_int, other_frac) = other.split();
        // Fractions stay below 10^MAX_SCALE once rescaled, so this cannot overflow
        let scale = self.scale.max(other.scale);
        let self_frac = self_frac * 10i128.pow((scale - self.scale) as u32);
        let other_frac = other_frac * 10i128.pow((scale - other.scale) as u32);
        self_int
            .cmp(&other_int)
            .then(self_frac.cmp(&other_frac))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.digits);
        }
        let divisor = 10i128.pow(self.scale as u32);
        let int_part = (self.digits / divisor).abs();
        let frac_part = (self.digits % divisor).abs();
        let sign = if self.digits < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}.{:0>width$}",
            sign,
            int_part,
            frac_part,
            width = self.scale as usize
        )
    }
}

impl FromStr for Decimal {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((i, f)) => (i, f),
            None => (unsigned, ""),
        };

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty())
            || !all_digits(int_part)
            || !all_digits(frac_part)
        {
            return Err(DecimalError(format!("'{}' is not a decimal number", s)));
        }
        if frac_part.len() > MAX_SCALE as usize {
            return Err(DecimalError(format!(
                "'{}' has more than {} fractional digits",
                s, MAX_SCALE
            )));
        }

        let overflow = || DecimalError(format!("'{}' is out of range", s));
        let combined = format!("{}{}", int_part, frac_part);
        let mut digits: i128 = if combined.is_empty() {
            0
        } else {
            combined.parse().map_err(|_| overflow())?
        };
        if negative {
            digits = -digits;
        }

        Decimal::new(digits, frac_part.len() as u8)
    }
}

impl TryFrom<(i128, u8)> for Decimal {
    type Error = DecimalError;

    fn try_from((digits, scale): (i128, u8)) -> Result<Self, Self::Error> {
        Decimal::new(digits, scale)
    }
}

impl From<Decimal> for (i128, u8) {
    fn from(value: Decimal) -> Self {
        (value.digits, value.scale)
    }
}
