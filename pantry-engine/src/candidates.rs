//! Insertion-ordered candidate sets.

use std::collections::HashSet;

use pantry_core::RecipeId;

/// Recipe ids in discovery order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    order: Vec<RecipeId>,
    seen: HashSet<RecipeId>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an id unless already present. Returns true if it was added.
    pub fn insert(&mut self, id: &RecipeId) -> bool {
        if self.seen.insert(id.clone()) {
            self.order.push(id.clone());
            true
        } else {
            false
        }
    }

    /// Union in `ids`, keeping the first-seen position of each.
    pub fn extend<'a, I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = &'a RecipeId>,
    {
        for id in ids {
            self.insert(id);
        }
    }

    /// Keep only the ids also present in `other`, preserving this set's order.
    pub fn retain_in(&mut self, other: &[RecipeId]) {
        let keep: HashSet<&RecipeId> = other.iter().collect();
        self.order.retain(|id| keep.contains(id));
        self.seen.retain(|id| keep.contains(id));
    }

    pub fn remove(&mut self, id: &RecipeId) {
        if self.seen.remove(id) {
            self.order.retain(|held| held != id);
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The first `limit` ids in discovery order.
    pub fn take(self, limit: usize) -> Vec<RecipeId> {
        let mut order = self.order;
        order.truncate(limit);
        order
    }

    pub fn into_vec(self) -> Vec<RecipeId> {
        self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<RecipeId> {
        names.iter().map(|n| RecipeId::from(*n)).collect()
    }

    #[test]
    fn test_union_keeps_first_position() {
        let mut set = CandidateSet::new();
        set.extend(&ids(&["b", "a"]));
        set.extend(&ids(&["c", "b"]));
        assert_eq!(set.into_vec(), ids(&["b", "a", "c"]));
    }

    #[test]
    fn test_retain_in_keeps_own_order() {
        let mut set = CandidateSet::new();
        set.extend(&ids(&["a", "b", "c", "d"]));
        set.retain_in(&ids(&["d", "b"]));
        assert_eq!(set.clone().into_vec(), ids(&["b", "d"]));

        set.insert(&RecipeId::from("a"));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_remove_and_take() {
        let mut set = CandidateSet::new();
        set.extend(&ids(&["a", "b", "c"]));
        set.remove(&RecipeId::from("a"));
        assert_eq!(set.take(1), ids(&["b"]));
    }
}
