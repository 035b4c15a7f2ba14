//! Command definitions
//!
//! Requests a front end hands to [`crate::Cabinet::execute`], and what comes
//! back.

use std::fmt;

use crate::query::{Criteria, Selection};
use crate::record::{Field, FieldValue, Record};
use crate::storage::{StoreStats, UpdateSpec};

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Create,
    Insert,
    Edit,
    Update,
    Delete,
    Select,
    Stat,
    Compact,
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandType::Create => "create",
            CommandType::Insert => "insert",
            CommandType::Edit => "edit",
            CommandType::Update => "update",
            CommandType::Delete => "delete",
            CommandType::Select => "select",
            CommandType::Stat => "stat",
            CommandType::Compact => "compact",
        };
        f.write_str(name)
    }
}

/// A parsed command
#[derive(Debug, Clone)]
pub enum Command {
    /// Store a new record under the next free id
    Create { record: Record },

    /// Store a record, keeping its id if it has one
    Insert { record: Record },

    /// Overwrite an existing record
    Edit { id: i32, record: Record },

    /// Change fields of every record matching `search`
    Update { values: UpdateSpec, search: Criteria },

    /// Remove every record with `field = value`
    Delete { field: Field, value: FieldValue },

    /// Find records
    Select { criteria: Criteria },

    /// Count records
    Stat,

    /// Reclaim deleted space
    Compact,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Create { .. } => CommandType::Create,
            Command::Insert { .. } => CommandType::Insert,
            Command::Edit { .. } => CommandType::Edit,
            Command::Update { .. } => CommandType::Update,
            Command::Delete { .. } => CommandType::Delete,
            Command::Select { .. } => CommandType::Select,
            Command::Stat => CommandType::Stat,
            Command::Compact => CommandType::Compact,
        }
    }

    /// Whether running this command can change stored records
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Command::Select { .. } | Command::Stat)
    }
}

/// Result of a successful command
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Id of the created or inserted record
    Created(i32),

    /// Record edited
    Edited,

    /// Ids of updated records
    Updated(Vec<i32>),

    /// Ids of removed records
    Deleted(Vec<i32>),

    /// Matching records, ready to iterate
    Selected(Selection),

    /// Record counters
    Stats(StoreStats),

    /// Number of slots dropped by compaction
    Compacted(usize),
}
