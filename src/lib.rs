//! # Cabinet
//!
//! A single-user personal record store with:
//! - Fixed-schema records (id, names, birth date, balance, marital status, height)
//! - Two interchangeable backends: in-memory list or fixed-slot binary file
//! - Primary and per-field secondary indexes rebuilt from storage at open
//! - Soft delete with tombstones and explicit compaction
//! - AND/OR criteria queries over the indexes
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Front ends (CLI, import/export)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  Command / Snapshot
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Cabinet (engine)                          │
//! │              query cache, backend selection                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  RecordStore
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ MemoryStore │          │  FileStore  │──► SlotCodec ──► slot file
//!   └──────┬──────┘          └──────┬──────┘
//!          └────────────┬───────────┘
//!                       ▼
//!          ┌─────────────────────────┐
//!          │ IndexSet  ◄── evaluate  │
//!          │ (primary + 6 secondary) │
//!          └─────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod codec;
pub mod validation;
pub mod index;
pub mod query;
pub mod storage;
pub mod snapshot;
pub mod command;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CabinetError, Result};
pub use config::{Config, StorageKind};
pub use engine::Cabinet;
pub use record::{Decimal, Field, FieldValue, Record};
pub use query::{Connector, Criteria, Selection};
pub use snapshot::Snapshot;
pub use storage::{FileStore, MemoryStore, RecordStore, StoreStats, UpdateSpec};
pub use validation::ValidationRules;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of Cabinet
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
