//! Query Module
//!
//! Turns a criteria expression into the set of matching locations.
//!
//! ## Evaluation
//! 1. Resolve each predicate to a candidate set through the index set
//!    (`id` goes straight to the primary map)
//! 2. Fold the candidate sets left to right, one pair at a time:
//!    - `A and B` keeps the members of B that are also in A, in B's order
//!    - `A or B` is B followed by the members of A not already in B
//! 3. Wrap the result in a [`Selection`] that can be iterated any number of
//!    times without re-running the fold
//!
//! The running result never holds duplicates, so overlapping `or`
//! predicates produce each record once no matter how far apart they are.

mod cache;
mod criteria;
mod selection;

use std::collections::HashSet;

pub use cache::{CacheStats, QueryCache};
pub use criteria::{Connector, Criteria, Predicate};
pub use selection::{RecordIter, Selection};

use crate::error::Result;
use crate::index::{IndexSet, Location};

/// Evaluate `criteria` against `index`
pub fn evaluate(index: &IndexSet, criteria: &Criteria) -> Result<Vec<Location>> {
    criteria.check()?;

    let mut predicates = criteria.predicates().iter();
    let mut result = match predicates.next() {
        None => return Ok(index.all_locations()),
        Some(first) => dedup(index.lookup(first.field, &first.value)),
    };

    for (predicate, connector) in predicates.zip(criteria.connectors()) {
        let candidates = index.lookup(predicate.field, &predicate.value);
        result = match connector {
            Connector::And => intersect(&result, candidates),
            Connector::Or => union(&result, candidates),
        };
    }

    Ok(result)
}

/// Members of `right` present in `left`, in `right`'s order
fn intersect(left: &[Location], right: Vec<Location>) -> Vec<Location> {
    let keep: HashSet<Location> = left.iter().copied().collect();
    dedup(right.into_iter().filter(|l| keep.contains(l)).collect())
}

/// `right` followed by the members of `left` it lacks
fn union(left: &[Location], right: Vec<Location>) -> Vec<Location> {
    let mut merged = dedup(right);
    let mut seen: HashSet<Location> = merged.iter().copied().collect();
    for location in left {
        if seen.insert(*location) {
            merged.push(*location);
        }
    }
    merged
}

fn dedup(locations: Vec<Location>) -> Vec<Location> {
    let mut seen = HashSet::with_capacity(locations.len());
    locations.into_iter().filter(|l| seen.insert(*l)).collect()
}
