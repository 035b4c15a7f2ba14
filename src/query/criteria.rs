//! Criteria definitions
//!
//! A criteria expression is an ordered list of `field = value` predicates
//! joined by connectors. All connectors in one expression must be the same.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CabinetError, Result};
use crate::record::{Field, FieldValue};

/// Joins two predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Connector {
    And,
    Or,
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connector::And => f.write_str("and"),
            Connector::Or => f.write_str("or"),
        }
    }
}

/// An equality test on one field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Predicate {
    pub field: Field,
    pub value: FieldValue,
}

impl Predicate {
    pub fn new(field: Field, value: impl Into<FieldValue>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.field, self.value)
    }
}

/// Predicates plus the connectors between them
///
/// `connectors.len()` is always `predicates.len() - 1` for a well-formed
/// expression; [`Criteria::check`] enforces that and rejects mixed
/// connectors. An empty expression selects every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Criteria {
    predicates: Vec<Predicate>,
    connectors: Vec<Connector>,
}

impl Criteria {
    /// The empty expression (matches every active record)
    pub fn all() -> Self {
        Self::default()
    }

    /// An expression with a single predicate
    pub fn field(field: Field, value: impl Into<FieldValue>) -> Self {
        Self {
            predicates: vec![Predicate::new(field, value)],
            connectors: Vec::new(),
        }
    }

    /// Build from raw parts, checking their shape
    pub fn from_parts(predicates: Vec<Predicate>, connectors: Vec<Connector>) -> Result<Self> {
        let criteria = Self {
            predicates,
            connectors,
        };
        criteria.check()?;
        Ok(criteria)
    }

    /// Append `predicate` with `and`
    pub fn and(self, field: Field, value: impl Into<FieldValue>) -> Self {
        self.push(Connector::And, Predicate::new(field, value))
    }

    /// Append `predicate` with `or`
    pub fn or(self, field: Field, value: impl Into<FieldValue>) -> Self {
        self.push(Connector::Or, Predicate::new(field, value))
    }

    fn push(mut self, connector: Connector, predicate: Predicate) -> Self {
        if !self.predicates.is_empty() {
            self.connectors.push(connector);
        }
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// The single connector used throughout, if any
    pub fn connector(&self) -> Option<Connector> {
        self.connectors.first().copied()
    }

    /// Reject malformed expressions
    pub fn check(&self) -> Result<()> {
        if self.predicates.is_empty() {
            if self.connectors.is_empty() {
                return Ok(());
            }
            return Err(CabinetError::InvalidCriteria(
                "connectors without predicates".to_string(),
            ));
        }
        if self.connectors.len() != self.predicates.len() - 1 {
            return Err(CabinetError::InvalidCriteria(format!(
                "{} predicates need {} connectors, got {}",
                self.predicates.len(),
                self.predicates.len() - 1,
                self.connectors.len()
            )));
        }
        if let Some(first) = self.connector() {
            if self.connectors.iter().any(|c| *c != first) {
                return Err(CabinetError::InvalidCriteria(
                    "mixing 'and' with 'or' is not supported".to_string(),
                ));
            }
        }
        for predicate in &self.predicates {
            if !predicate.value.fits(predicate.field) {
                return Err(CabinetError::InvalidCriteria(format!(
                    "{} is not a valid value for {}",
                    predicate.value, predicate.field
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.predicates.is_empty() {
            return f.write_str("<all>");
        }
        for (i, predicate) in self.predicates.iter().enumerate() {
            if i > 0 {
                let connector = self.connectors.get(i - 1).copied().unwrap_or(Connector::And);
                write!(f, " {} ", connector)?;
            }
            write!(f, "{}", predicate)?;
        }
        Ok(())
    }
}

// =============================================================================
// Text Form
// =============================================================================

#[derive(Debug, PartialEq)]
enum Token {
    Word(String),
    Quoted(String),
    Equals,
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '=' {
            chars.next();
            tokens.push(Token::Equals);
        } else if c == '\'' || c == '"' {
            chars.next();
            let mut text = String::new();
            loop {
                match chars.next() {
                    Some(ch) if ch == c => break,
                    Some(ch) => text.push(ch),
                    None => {
                        return Err(CabinetError::InvalidCriteria(format!(
                            "unterminated quote in '{}'",
                            input
                        )))
                    }
                }
            }
            tokens.push(Token::Quoted(text));
        } else {
            let mut word = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() || ch == '=' || ch == '\'' || ch == '"' {
                    break;
                }
                word.push(ch);
                chars.next();
            }
            tokens.push(Token::Word(word));
        }
    }
    Ok(tokens)
}

impl FromStr for Criteria {
    type Err = CabinetError;

    /// Parse `firstname = 'Ann' and lastname = 'Lee'`
    ///
    /// Keywords are case-insensitive; values may be quoted. An empty or
    /// blank string parses to [`Criteria::all`].
    fn from_str(s: &str) -> Result<Self> {
        let tokens = tokenize(s)?;
        let mut predicates = Vec::new();
        let mut connectors = Vec::new();
        let mut iter = tokens.into_iter();

        let unexpected = |what: &str| {
            CabinetError::InvalidCriteria(format!("expected {} in '{}'", what, s.trim()))
        };

        loop {
            let field = match iter.next() {
                None if predicates.is_empty() && connectors.is_empty() => break,
                Some(Token::Word(name)) => name.parse::<Field>()?,
                _ => return Err(unexpected("a field name")),
            };
            if iter.next() != Some(Token::Equals) {
                return Err(unexpected("'='"));
            }
            let raw = match iter.next() {
                Some(Token::Word(text)) | Some(Token::Quoted(text)) => text,
                _ => return Err(unexpected("a value")),
            };
            predicates.push(Predicate {
                field,
                value: FieldValue::parse(field, &raw)?,
            });

            match iter.next() {
                None => break,
                Some(Token::Word(word)) if word.eq_ignore_ascii_case("and") => {
                    connectors.push(Connector::And)
                }
                Some(Token::Word(word)) if word.eq_ignore_ascii_case("or") => {
                    connectors.push(Connector::Or)
                }
                _ => return Err(unexpected("'and' or 'or'")),
            }
        }

        Criteria::from_parts(predicates, connectors)
    }
}
