//! Error types for Cabinet
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::record::Field;

/// Result type alias using CabinetError
pub type Result<T> = std::result::Result<T, CabinetError>;

/// Unified error type for Cabinet operations
#[derive(Debug, Error)]
pub enum CabinetError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("Validation failed for {field}: {reason}")]
    ValidationFailed { field: Field, reason: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: Field, reason: String },

    #[error("Record #{0} already exists")]
    DuplicateId(i32),

    #[error("Record #{0} not found")]
    NotFound(i32),

    // -------------------------------------------------------------------------
    // Query Errors
    // -------------------------------------------------------------------------
    #[error("No records match {0}")]
    NoMatch(String),

    #[error("Invalid criteria: {0}")]
    InvalidCriteria(String),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CabinetError {
    pub(crate) fn validation(field: Field, reason: impl Into<String>) -> Self {
        CabinetError::ValidationFailed {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        CabinetError::CorruptRecord(reason.into())
    }
}

impl From<bincode::Error> for CabinetError {
    fn from(err: bincode::Error) -> Self {
        CabinetError::Serialization(err.to_string())
    }
}
