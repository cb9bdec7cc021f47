//! Eviction policies for the volatile cache.
//!
//! A policy only tracks ids; the cache owns the entries. The cache reports
//! every insert, read, and removal, and asks the policy for a victim once it
//! holds more entries than its capacity.

use std::collections::VecDeque;
use std::fmt;

use pantry_core::RecipeId;

/// Decides which entry leaves the volatile cache when it overflows.
pub trait EvictionPolicy: Send + Sync + fmt::Debug {
    /// An entry was stored. `is_new` is false when an id already held was
    /// overwritten.
    fn on_insert(&mut self, id: &RecipeId, is_new: bool);

    /// A fresh entry was served.
    fn on_access(&mut self, _id: &RecipeId) {}

    /// An entry left the cache for a reason other than eviction (expiry).
    fn on_remove(&mut self, id: &RecipeId);

    /// Pick the next entry to evict and stop tracking it.
    fn victim(&mut self) -> Option<RecipeId>;

    /// Number of ids being tracked.
    fn tracked(&self) -> usize;
}

/// FIFO by first insertion.
///
/// Reads never reorder anything, and overwriting an id already held keeps its
/// original slot. This is not LRU: an entry read a moment ago is still the
/// victim if it was inserted first.
#[derive(Debug, Default, Clone)]
pub struct InsertionOrder {
    order: VecDeque<RecipeId>,
}

impl InsertionOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids from oldest to newest insertion.
    pub fn iter(&self) -> impl Iterator<Item = &RecipeId> {
        self.order.iter()
    }
}

impl EvictionPolicy for InsertionOrder {
    fn on_insert(&mut self, id: &RecipeId, is_new: bool) {
        if is_new {
            self.order.push_back(id.clone());
        }
    }

    fn on_remove(&mut self, id: &RecipeId) {
        if let Some(pos) = self.order.iter().position(|held| held == id) {
            self.order.remove(pos);
        }
    }

    fn victim(&mut self) -> Option<RecipeId> {
        self.order.pop_front()
    }

    fn tracked(&self) -> usize {
        self.order.len()
    }
}
