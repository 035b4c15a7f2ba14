//! Index Module
//!
//! In-memory indexes over the authoritative record set.
//!
//! ## Structure
//! ```text
//! primary:    id ─────────────────────► Location
//! secondary:  FirstName    ─┐
//!             LastName      │
//!             DateOfBirth   ├─ IndexKey ─► [Location, ...]  (insertion order)
//!             Balance       │
//!             MaritalStatus │
//!             Height       ─┘
//! ```
//!
//! Indexes are never persisted; stores rebuild them from a full scan.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::record::{Field, FieldValue, IndexKey, Record};

/// Opaque position of a record inside a store
///
/// A list index for the memory store, a byte offset for the file store.
/// Handles are only meaningful to the store that issued them and are
/// reissued wholesale whenever the store rebuilds its indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location(pub u64);

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Locations sharing one key, in insertion order
#[derive(Debug, Default, Clone, PartialEq)]
struct Postings {
    order: Vec<Location>,
    members: HashSet<Location>,
}

impl Postings {
    fn insert(&mut self, location: Location) {
        if self.members.insert(location) {
            self.order.push(location);
        }
    }

    fn remove(&mut self, location: Location) {
        if self.members.remove(&location) {
            self.order.retain(|l| *l != location);
        }
    }

    fn contains(&self, location: Location) -> bool {
        self.members.contains(&location)
    }

    fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

type SecondaryMap = HashMap<IndexKey, Postings>;

/// Primary and secondary indexes of one store
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IndexSet {
    primary: HashMap<i32, Location>,
    first_name: SecondaryMap,
    last_name: SecondaryMap,
    date_of_birth: SecondaryMap,
    balance: SecondaryMap,
    marital_status: SecondaryMap,
    height: SecondaryMap,
}

impl IndexSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `record` at `location`
    pub fn add(&mut self, record: &Record, location: Location) {
        self.primary.insert(record.id, location);
        for field in Field::SECONDARY {
            self.secondary_mut(field)
                .entry(record.index_key(field))
                .or_default()
                .insert(location);
        }
    }

    /// Drop every membership of `record` at `location`
    ///
    /// Does nothing unless all six secondary postings hold the location, so a
    /// record that was never fully indexed is left alone.
    pub fn remove(&mut self, record: &Record, location: Location) {
        let fully_indexed = Field::SECONDARY.iter().all(|field| {
            self.secondary(*field)
                .get(&record.index_key(*field))
                .is_some_and(|postings| postings.contains(location))
        });
        if !fully_indexed {
            return;
        }

        if self.primary.get(&record.id) == Some(&location) {
            self.primary.remove(&record.id);
        }
        for field in Field::SECONDARY {
            let key = record.index_key(field);
            let map = self.secondary_mut(field);
            if let Some(postings) = map.get_mut(&key) {
                postings.remove(location);
                if postings.is_empty() {
                    map.remove(&key);
                }
            }
        }
    }

    /// Locations whose `field` equals `value`, in insertion order
    ///
    /// `Field::Id` resolves through the primary map. A value of the wrong
    /// type for the field simply matches nothing.
    pub fn lookup(&self, field: Field, value: &FieldValue) -> Vec<Location> {
        if !value.fits(field) {
            return Vec::new();
        }
        match (field, value) {
            (Field::Id, FieldValue::Id(id)) => self.lookup_id(*id).into_iter().collect(),
            _ => self
                .secondary(field)
                .get(&value.index_key())
                .map(|postings| postings.order.clone())
                .unwrap_or_default(),
        }
    }

    pub fn lookup_id(&self, id: i32) -> Option<Location> {
        self.primary.get(&id).copied()
    }

    pub fn contains_id(&self, id: i32) -> bool {
        self.primary.contains_key(&id)
    }

    /// Highest indexed id, if any
    pub fn max_id(&self) -> Option<i32> {
        self.primary.keys().copied().max()
    }

    /// Every indexed location in storage order
    pub fn all_locations(&self) -> Vec<Location> {
        let mut locations: Vec<Location> = self.primary.values().copied().collect();
        locations.sort_unstable();
        locations
    }

    /// Number of indexed records
    pub fn len(&self) -> usize {
        self.primary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }

    /// Number of distinct values indexed for `field`
    pub fn distinct_values(&self, field: Field) -> usize {
        match field {
            Field::Id => self.primary.len(),
            _ => self.secondary(field).len(),
        }
    }

    pub fn clear(&mut self) {
        self.primary.clear();
        for field in Field::SECONDARY {
            self.secondary_mut(field).clear();
        }
    }

    /// Clear and re-index `records` in the order given
    pub fn rebuild<'a, I>(&mut self, records: I)
    where
        I: IntoIterator<Item = (&'a Record, Location)>,
    {
        self.clear();
        for (record, location) in records {
            self.add(record, location);
        }
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn secondary(&self, field: Field) -> &SecondaryMap {
        match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::DateOfBirth => &self.date_of_birth,
            Field::Balance => &self.balance,
            Field::MaritalStatus => &self.marital_status,
            Field::Height => &self.height,
            Field::Id => unreachable!("id lives in the primary map"),
        }
    }

    fn secondary_mut(&mut self, field: Field) -> &mut SecondaryMap {
        match field {
            Field::FirstName => &mut self.first_name,
            Field::LastName => &mut self.last_name,
            Field::DateOfBirth => &mut self.date_of_birth,
            Field::Balance => &mut self.balance,
            Field::MaritalStatus => &mut self.marital_status,
            Field::Height => &mut self.height,
            Field::Id => unreachable!("id lives in the primary map"),
        }
    }
}
