//! In-memory backend
//!
//! Records live in a `Vec`; a location is the list index.

use tracing::debug;

use crate::error::{CabinetError, Result};
use crate::index::{IndexSet, Location};
use crate::record::{Field, FieldValue, Record};
use crate::validation::ValidationRules;

use super::{advance_id, delete_targets, resolve_new_id, RecordStore, StoreStats};

/// Volatile record store
///
/// Deleting removes records from the list outright, which shifts every
/// later list index, so the index set is rebuilt after each delete.
pub struct MemoryStore {
    records: Vec<Record>,
    index: IndexSet,
    rules: ValidationRules,
    /// Next id to hand out (None once the id space is used up)
    next_id: Option<i32>,
}

impl MemoryStore {
    pub fn new(rules: ValidationRules) -> Self {
        Self {
            records: Vec::new(),
            index: IndexSet::new(),
            rules,
            next_id: Some(1),
        }
    }

    /// Id the next assigned record will get
    pub fn next_id(&self) -> Option<i32> {
        self.next_id
    }

    fn rebuild_index(&mut self) {
        let entries = self
            .records
            .iter()
            .enumerate()
            .map(|(i, record)| (record, Location(i as u64)));
        self.index.rebuild(entries);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(ValidationRules::default())
    }
}

impl RecordStore for MemoryStore {
    fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    fn index(&self) -> &IndexSet {
        &self.index
    }

    fn create(&mut self, mut record: Record, assign_id: bool) -> Result<i32> {
        let id = resolve_new_id(&self.index, self.next_id, &record, assign_id)?;
        record.id = id;
        self.rules.validate(&record)?;

        let location = Location(self.records.len() as u64);
        self.index.add(&record, location);
        self.records.push(record);
        self.next_id = advance_id(self.next_id, id);

        debug!(id, %location, "created record");
        Ok(id)
    }

    fn edit(&mut self, id: i32, mut record: Record) -> Result<()> {
        let location = self.index.lookup_id(id).ok_or(CabinetError::NotFound(id))?;
        record.id = id;
        self.rules.validate(&record)?;

        let slot = self
            .records
            .get_mut(location.0 as usize)
            .ok_or(CabinetError::NotFound(id))?;
        let previous = std::mem::replace(slot, record);
        self.index.remove(&previous, location);
        self.index.add(&self.records[location.0 as usize], location);

        debug!(id, %location, "edited record");
        Ok(())
    }

    fn delete(&mut self, field: Field, value: &FieldValue) -> Result<Vec<i32>> {
        let mut locations = delete_targets(&self.index, field, value)?;

        let removed: Vec<i32> = locations
            .iter()
            .filter_map(|l| self.records.get(l.0 as usize).map(|r| r.id))
            .collect();

        // Highest first so earlier indexes stay valid while removing
        locations.sort_unstable_by(|a, b| b.cmp(a));
        for location in locations {
            let position = location.0 as usize;
            if position < self.records.len() {
                self.records.remove(position);
            }
        }
        self.rebuild_index();

        debug!(count = removed.len(), "deleted records");
        Ok(removed)
    }

    fn compact(&mut self) -> Result<usize> {
        Ok(0)
    }

    fn read(&self, location: Location) -> Result<Option<Record>> {
        Ok(self.records.get(location.0 as usize).cloned())
    }

    fn stat(&self) -> StoreStats {
        StoreStats {
            active: self.records.len(),
            removed: 0,
        }
    }
}
