//! Query results
//!
//! A [`Selection`] is the frozen outcome of one evaluation. Each call to
//! [`Selection::iter`] hands out a fresh, lazy [`RecordIter`] that resolves
//! locations to records only as it is advanced.

use std::sync::Arc;

use crate::error::Result;
use crate::index::Location;
use crate::record::Record;
use crate::storage::RecordStore;

/// Locations matched by a criteria expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    locations: Arc<[Location]>,
}

impl Selection {
    pub fn new(locations: Vec<Location>) -> Self {
        Self {
            locations: locations.into(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// A new lazy pass over the matched records
    pub fn iter<'a, S>(&self, store: &'a S) -> RecordIter<'a, S>
    where
        S: RecordStore + ?Sized,
    {
        RecordIter {
            store,
            locations: Arc::clone(&self.locations),
            position: 0,
        }
    }

    /// Resolve every location eagerly
    pub fn collect<S>(&self, store: &S) -> Result<Vec<Record>>
    where
        S: RecordStore + ?Sized,
    {
        self.iter(store).collect()
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::empty()
    }
}

/// Forward-only iterator resolving locations on demand
///
/// Locations that no longer hold an active record are skipped.
pub struct RecordIter<'a, S: RecordStore + ?Sized> {
    store: &'a S,
    locations: Arc<[Location]>,
    position: usize,
}

impl<'a, S: RecordStore + ?Sized> Iterator for RecordIter<'a, S> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(location) = self.locations.get(self.position).copied() {
            self.position += 1;
            match self.store.read(location) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.locations.len() - self.position))
    }
}
