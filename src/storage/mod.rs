//! Storage Module
//!
//! The authoritative record set and its two interchangeable backends.
//!
//! ## Responsibilities
//! - Own the canonical copy of every record; callers only get clones
//! - Validate before any mutation (a failed call changes nothing)
//! - Keep the index set consistent with storage after every mutation
//! - Allocate ids: max seen + 1, never reused
//!
//! ## Backends
//! ```text
//! ┌────────────────────┐        ┌─────────────────────────────────┐
//! │    MemoryStore     │        │           FileStore             │
//! │  Vec<Record>       │        │  [slot][slot][slot(tomb)]...    │
//! │  Location = index  │        │  Location = byte offset         │
//! │  delete = remove   │        │  delete = status byte flip      │
//! │  compact = no-op   │        │  compact = rewrite + truncate   │
//! └─────────┬──────────┘        └───────────────┬─────────────────┘
//!           └──────────── RecordStore ──────────┘
//! ```

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use tracing::{debug, warn};

use crate::error::{CabinetError, Result};
use crate::index::{IndexSet, Location};
use crate::query::{self, Connector, Criteria, Selection};
use crate::record::{Field, FieldValue, Record};
use crate::snapshot::Snapshot;
use crate::validation::ValidationRules;

// =============================================================================
// Shared Types
// =============================================================================

/// Record counters of a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreStats {
    /// Records currently live
    pub active: usize,
    /// Tombstoned slots awaiting compaction (always 0 in memory)
    pub removed: usize,
}

/// Outcome of [`RecordStore::restore`]
#[derive(Debug, Default)]
pub struct RestoreReport {
    /// Records edited in place or inserted
    pub applied: usize,
    /// Records skipped, with the reason
    pub rejected: Vec<(i32, CabinetError)>,
}

/// New field values for [`RecordStore::update`]
///
/// Setting the same field twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSpec {
    values: Vec<(Field, FieldValue)>,
}

impl UpdateSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `field` to `value`
    pub fn set(mut self, field: Field, value: impl Into<FieldValue>) -> Self {
        let value = value.into();
        match self.values.iter_mut().find(|(f, _)| *f == field) {
            Some(slot) => slot.1 = value,
            None => self.values.push((field, value)),
        }
        self
    }

    /// Build from raw `(field name, value text)` pairs
    pub fn parse<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut spec = Self::new();
        for (name, raw) in pairs {
            let field: Field = name.parse()?;
            let value = FieldValue::parse(field, raw).map_err(|e| CabinetError::InvalidValue {
                field,
                reason: e.to_string(),
            })?;
            spec = spec.set(field, value);
        }
        Ok(spec)
    }

    pub fn values(&self) -> &[(Field, FieldValue)] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check every value against `rules` without touching any record
    pub fn validate(&self, rules: &ValidationRules) -> Result<()> {
        if self.values.is_empty() {
            return Err(CabinetError::InvalidCriteria(
                "update needs at least one new value".to_string(),
            ));
        }
        for (field, value) in &self.values {
            if *field == Field::Id {
                return Err(CabinetError::InvalidValue {
                    field: Field::Id,
                    reason: "ids cannot be reassigned".to_string(),
                });
            }
            rules.validate_field(*field, value).map_err(|e| match e {
                CabinetError::ValidationFailed { field, reason } => {
                    CabinetError::InvalidValue { field, reason }
                }
                other => other,
            })?;
        }
        Ok(())
    }

    /// `record` with every new value applied
    pub fn apply_to(&self, record: &Record) -> Result<Record> {
        let mut merged = record.clone();
        for (field, value) in &self.values {
            merged.set_value(*field, value.clone())?;
        }
        Ok(merged)
    }
}

// =============================================================================
// Backend Contract
// =============================================================================

/// Operations every storage backend provides
///
/// Backends implement the primitive mutations; `insert`, `update`,
/// `select`, `snapshot` and `restore` are built on top of them.
pub trait RecordStore {
    /// The active rule set
    fn rules(&self) -> &ValidationRules;

    /// The current index set
    fn index(&self) -> &IndexSet;

    /// Store a new record
    ///
    /// With `assign_id == false` the store picks the next unused id. With
    /// `assign_id == true` the record's own id is kept; it must be positive
    /// and unused.
    fn create(&mut self, record: Record, assign_id: bool) -> Result<i32>;

    /// Overwrite record `id` in place (the id itself never changes)
    fn edit(&mut self, id: i32, record: Record) -> Result<()>;

    /// Remove every record whose `field` equals `value`
    fn delete(&mut self, field: Field, value: &FieldValue) -> Result<Vec<i32>>;

    /// Reclaim space held by deleted records, returning how many slots
    /// were dropped
    fn compact(&mut self) -> Result<usize>;

    /// Resolve a location to its record (None if nothing active lives there)
    fn read(&self, location: Location) -> Result<Option<Record>>;

    /// Active and removed counts
    fn stat(&self) -> StoreStats;

    /// Store a record, keeping its id when it carries one
    fn insert(&mut self, record: Record) -> Result<i32> {
        if record.id > 0 {
            if self.index().contains_id(record.id) {
                return Err(CabinetError::DuplicateId(record.id));
            }
            self.create(record, true)
        } else {
            self.create(record, false)
        }
    }

    /// Fetch record `id`
    fn get(&self, id: i32) -> Result<Record> {
        let location = self.index().lookup_id(id).ok_or(CabinetError::NotFound(id))?;
        self.read(location)?.ok_or(CabinetError::NotFound(id))
    }

    /// Locations matching `criteria`
    fn select(&self, criteria: &Criteria) -> Result<Selection> {
        query::evaluate(self.index(), criteria).map(Selection::new)
    }

    /// Apply `new_values` to every record matching `search`
    ///
    /// `search` may only join its predicates with `and`. All new values
    /// are validated before the first record is rewritten, and each match
    /// gets one merged rewrite.
    fn update(&mut self, new_values: &UpdateSpec, search: &Criteria) -> Result<Vec<i32>> {
        if search.is_empty() {
            return Err(CabinetError::InvalidCriteria(
                "update needs at least one search predicate".to_string(),
            ));
        }
        if search.connector() == Some(Connector::Or) {
            return Err(CabinetError::InvalidCriteria(
                "update predicates can only be joined with 'and'".to_string(),
            ));
        }
        new_values.validate(self.rules())?;

        let targets = self.select(search)?.collect(&*self)?;
        if targets.is_empty() {
            return Err(CabinetError::NoMatch(search.to_string()));
        }

        let mut merged = Vec::with_capacity(targets.len());
        for record in &targets {
            merged.push(new_values.apply_to(record)?);
        }

        let mut updated = Vec::with_capacity(merged.len());
        for record in merged {
            let id = record.id;
            self.edit(id, record)?;
            updated.push(id);
        }
        debug!(count = updated.len(), criteria = %search, "updated records");
        Ok(updated)
    }

    /// Copy every active record, in storage order
    fn snapshot(&self) -> Result<Snapshot> {
        let records = self.select(&Criteria::all())?.collect(self)?;
        Ok(Snapshot::new(records))
    }

    /// Absorb a snapshot: edit records that exist, insert the rest
    ///
    /// Every record is handled on its own; one bad record never stops the
    /// others.
    fn restore(&mut self, snapshot: &Snapshot) -> RestoreReport {
        let mut report = RestoreReport::default();

        for record in snapshot.iter() {
            if let Err(e) = self.rules().validate(record) {
                warn!(id = record.id, error = %e, "skipping invalid record during restore");
                report.rejected.push((record.id, e));
                continue;
            }

            let outcome = match self.edit(record.id, record.clone()) {
                Err(CabinetError::NotFound(_)) => self.insert(record.clone()).map(|_| ()),
                other => other,
            };

            match outcome {
                Ok(()) => report.applied += 1,
                Err(e) => {
                    warn!(id = record.id, error = %e, "failed to restore record");
                    report.rejected.push((record.id, e));
                }
            }
        }

        debug!(
            applied = report.applied,
            rejected = report.rejected.len(),
            "restore finished"
        );
        report
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Next id to hand out once `used` is taken
///
/// `None` means every id up to `i32::MAX` has been seen; records can still
/// be stored under an explicit unused id, only auto-assignment stops.
pub(crate) fn advance_id(next_id: Option<i32>, used: i32) -> Option<i32> {
    let next_id = next_id?;
    if used < next_id {
        return Some(next_id);
    }
    used.checked_add(1)
}

/// Pick the id a new record gets and check it is free
pub(crate) fn resolve_new_id(
    index: &IndexSet,
    next_id: Option<i32>,
    record: &Record,
    assign_id: bool,
) -> Result<i32> {
    if !assign_id {
        return next_id.ok_or_else(|| CabinetError::validation(Field::Id, "id space exhausted"));
    }
    if record.id <= 0 {
        return Err(CabinetError::validation(Field::Id, "must be positive"));
    }
    if index.contains_id(record.id) {
        return Err(CabinetError::DuplicateId(record.id));
    }
    Ok(record.id)
}

/// Locations targeted by a single-predicate delete
pub(crate) fn delete_targets(
    index: &IndexSet,
    field: Field,
    value: &FieldValue,
) -> Result<Vec<Location>> {
    if !value.fits(field) {
        return Err(CabinetError::InvalidCriteria(format!(
            "{} is not a valid value for {}",
            value, field
        )));
    }
    let locations = index.lookup(field, value);
    if locations.is_empty() {
        return Err(CabinetError::NoMatch(format!("{} = {}", field, value)));
    }
    Ok(locations)
}
