use fxhash::FxBuildHasher;
use indexmap::IndexSet;
use itertools::Itertools;
use std::cmp::Ordering;

pub(crate) type FxIndexSet<K> = IndexSet<K, FxBuildHasher>;

/// Priority of an open cell. Orders by estimated total cost first, then by heuristic, favouring
/// cells that are closer to the goal when the estimates are equal.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CostKey {
    pub estimated_cost: i32,
    pub heuristic: i32,
}

impl Eq for CostKey {}

impl PartialEq for CostKey {
    fn eq(&self, other: &Self) -> bool {
        self.estimated_cost == other.estimated_cost && self.heuristic == other.heuristic
    }
}

impl PartialOrd for CostKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CostKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.estimated_cost.cmp(&other.estimated_cost) {
            Ordering::Equal => self.heuristic.cmp(&other.heuristic),
            s => s,
        }
    }
}

/// Frontier of discovered but unexpanded cells, stored as dense grid indices in insertion order.
///
/// Selection is a linear scan rather than a heap: costs of open cells change in place when a
/// cheaper route is found, and among equal [CostKey]s the cell inserted first wins.
#[derive(Clone, Debug, Default)]
pub(crate) struct OpenSet {
    members: FxIndexSet<usize>,
}

impl OpenSet {
    pub fn new() -> OpenSet {
        OpenSet::default()
    }
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
    pub fn contains(&self, ix: usize) -> bool {
        self.members.contains(&ix)
    }
    /// Returns false if the index was already present, in which case its position is kept.
    pub fn insert(&mut self, ix: usize) -> bool {
        self.members.insert(ix)
    }
    pub fn clear(&mut self) {
        self.members.clear();
    }
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().copied()
    }

    /// Removes and returns the member with the smallest key.
    pub(crate) fn pop_best<F>(&mut self, mut key: F) -> Option<usize>
    where
        F: FnMut(usize) -> CostKey,
    {
        // position_min_by_key reports the first of several equal minima
        let position = self.members.iter().position_min_by_key(|&&ix| key(ix))?;
        self.members.shift_remove_index(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(estimated_cost: i32, heuristic: i32) -> CostKey {
        CostKey {
            estimated_cost,
            heuristic,
        }
    }

    #[test]
    fn lower_heuristic_breaks_ties() {
        assert!(key(50, 10) < key(50, 20));
        assert!(key(40, 30) < key(50, 0));
    }

    #[test]
    fn pops_in_priority_order() {
        let keys = [key(62, 52), key(56, 42), key(62, 52), key(56, 40)];
        let mut open = OpenSet::new();
        for ix in 0..keys.len() {
            assert!(open.insert(ix));
        }
        assert!(!open.insert(2));
        let order = std::iter::from_fn(|| open.pop_best(|ix| keys[ix])).collect::<Vec<_>>();
        assert_eq!(order, vec![3, 1, 0, 2]);
        assert!(open.is_empty());
    }

    #[test]
    fn keeps_insertion_order_after_removal() {
        let mut open = OpenSet::new();
        for ix in [7, 3, 9, 1] {
            open.insert(ix);
        }
        assert_eq!(open.pop_best(|ix| key(if ix == 3 { 0 } else { 10 }, 0)), Some(3));
        assert_eq!(open.iter().collect::<Vec<_>>(), vec![7, 9, 1]);
        assert_eq!(open.pop_best(|_| key(10, 0)), Some(7));
    }
}
