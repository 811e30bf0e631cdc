//! Known-video bookkeeping and new-ID calculation.
//!
//! Tracks the IDs already seen or announced per category and computes the
//! fresh delta of a fetch against them. The set grows monotonically and is
//! never persisted; a cold start re-baselines from the current listing.

use std::collections::{HashMap, HashSet};

use crate::models::Category;

/// Per-category record of already-seen video IDs.
///
/// Owned by the watch loop; an ID enters the set only through the baseline
/// fetch or after a successful announcement.
#[derive(Debug, Default)]
pub struct KnownVideos {
    seen: HashMap<Category, HashSet<String>>,
}

impl KnownVideos {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a single ID as known. Returns `false` if it was already known.
    pub fn record(&mut self, category: Category, id: impl Into<String>) -> bool {
        self.seen.entry(category).or_default().insert(id.into())
    }

    /// Record a batch of IDs as known.
    pub fn record_all(&mut self, category: Category, ids: impl IntoIterator<Item = String>) {
        self.seen.entry(category).or_default().extend(ids);
    }

    /// Whether an ID is already known for a category.
    pub fn contains(&self, category: Category, id: &str) -> bool {
        self.seen
            .get(&category)
            .is_some_and(|ids| ids.contains(id))
    }

    /// Number of known IDs for a category.
    pub fn count(&self, category: Category) -> usize {
        self.seen.get(&category).map_or(0, HashSet::len)
    }

    /// IDs present in `fetched` but not yet known, in fetch order.
    pub fn fresh(&self, category: Category, fetched: &[String]) -> Vec<String> {
        fetched
            .iter()
            .filter(|id| !self.contains(category, id.as_str()))
            .cloned()
            .collect()
    }
}
