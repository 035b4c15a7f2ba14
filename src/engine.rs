//! Engine Module
//!
//! The facade that front ends talk to.
//!
//! ## Responsibilities
//! - Pick the storage backend once, at open
//! - Route commands to the backend
//! - Cache select results and drop the cache on every mutation
//! - Log each operation

use std::path::Path;

use tracing::{debug, info};

use crate::command::{Command, Outcome};
use crate::config::{Config, StorageKind};
use crate::error::Result;
use crate::query::{CacheStats, Criteria, QueryCache, RecordIter, Selection};
use crate::record::{Field, FieldValue, Record};
use crate::snapshot::Snapshot;
use crate::storage::{FileStore, MemoryStore, RecordStore, RestoreReport, StoreStats, UpdateSpec};

/// Backend trait object held by the engine
pub type DynStore = dyn RecordStore + Send;

/// The record store facade
///
/// ## Concurrency Model
/// Single caller: mutations take `&mut self` and run to completion,
/// including the index update and the file sync, before returning. Reads
/// take `&self`; the query cache has its own lock.
pub struct Cabinet {
    /// Engine configuration
    config: Config,

    /// The selected backend
    store: Box<DynStore>,

    /// Recent select results, cleared on every mutation
    cache: QueryCache,
}

impl Cabinet {
    /// Open a cabinet with the given config
    ///
    /// The backend is chosen here from `config.storage` and never changes.
    pub fn open(config: Config) -> Result<Self> {
        config.check()?;

        let store: Box<DynStore> = match &config.storage {
            StorageKind::Memory => {
                info!("Opening in-memory record store");
                Box::new(MemoryStore::new(config.rules.clone()))
            }
            StorageKind::File { path } => {
                info!(path = %path.display(), "Opening file record store");
                Box::new(FileStore::open(
                    path,
                    config.max_name_len,
                    config.rules.clone(),
                )?)
            }
        };

        let cache = QueryCache::new(config.query_cache_capacity);

        Ok(Self {
            config,
            store,
            cache,
        })
    }

    /// Open a file-backed cabinet at `path` (convenience method)
    ///
    /// Uses the default config otherwise
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().file(path).build();
        Self::open(config)
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers
    pub fn execute(&mut self, command: Command) -> Result<Outcome> {
        debug!(command = %command.command_type(), "executing command");
        match command {
            Command::Create { record } => self.create(record).map(Outcome::Created),
            Command::Insert { record } => self.insert(record).map(Outcome::Created),
            Command::Edit { id, record } => self.edit(id, record).map(|_| Outcome::Edited),
            Command::Update { values, search } => {
                self.update(&values, &search).map(Outcome::Updated)
            }
            Command::Delete { field, value } => self.delete(field, &value).map(Outcome::Deleted),
            Command::Select { criteria } => self.select(&criteria).map(Outcome::Selected),
            Command::Stat => Ok(Outcome::Stats(self.stat())),
            Command::Compact => self.compact().map(Outcome::Compacted),
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Store a new record under the next free id
    pub fn create(&mut self, record: Record) -> Result<i32> {
        let id = self.store.create(record, false)?;
        self.cache.invalidate();
        Ok(id)
    }

    /// Store a record, keeping its id if it carries one
    pub fn insert(&mut self, record: Record) -> Result<i32> {
        let id = self.store.insert(record)?;
        self.cache.invalidate();
        Ok(id)
    }

    /// Overwrite record `id`
    pub fn edit(&mut self, id: i32, record: Record) -> Result<()> {
        self.store.edit(id, record)?;
        self.cache.invalidate();
        Ok(())
    }

    /// Change fields of every record matching `search`
    pub fn update(&mut self, values: &UpdateSpec, search: &Criteria) -> Result<Vec<i32>> {
        let result = self.store.update(values, search);
        // Earlier records may already be rewritten when a later one fails
        self.cache.invalidate();
        result
    }

    /// Remove every record with `field = value`
    pub fn delete(&mut self, field: Field, value: &FieldValue) -> Result<Vec<i32>> {
        let removed = self.store.delete(field, value)?;
        self.cache.invalidate();
        Ok(removed)
    }

    /// Reclaim deleted space (no-op in memory)
    pub fn compact(&mut self) -> Result<usize> {
        let dropped = self.store.compact()?;
        self.cache.invalidate();
        Ok(dropped)
    }

    /// Absorb a snapshot
    pub fn restore(&mut self, snapshot: &Snapshot) -> RestoreReport {
        let report = self.store.restore(snapshot);
        self.cache.invalidate();
        info!(
            applied = report.applied,
            rejected = report.rejected.len(),
            "Restored snapshot"
        );
        report
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Find records matching `criteria`
    pub fn select(&self, criteria: &Criteria) -> Result<Selection> {
        if let Some(selection) = self.cache.get(criteria) {
            return Ok(selection);
        }
        let selection = self.store.select(criteria)?;
        self.cache.put(criteria.clone(), selection.clone());
        Ok(selection)
    }

    /// Lazily resolve the records of a selection
    pub fn records<'a>(&'a self, selection: &Selection) -> RecordIter<'a, DynStore> {
        selection.iter(self.store.as_ref())
    }

    /// Select and resolve in one step
    pub fn find(&self, criteria: &Criteria) -> Result<Vec<Record>> {
        let selection = self.select(criteria)?;
        self.records(&selection).collect()
    }

    /// Fetch record `id`
    pub fn get(&self, id: i32) -> Result<Record> {
        self.store.get(id)
    }

    /// Copy every active record
    pub fn snapshot(&self) -> Result<Snapshot> {
        self.store.snapshot()
    }

    /// Active and removed counts
    pub fn stat(&self) -> StoreStats {
        self.store.stat()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// The backend, read-only
    pub fn store(&self) -> &DynStore {
        self.store.as_ref()
    }

    /// Query cache counters
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
