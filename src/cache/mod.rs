//! Operation caches (computed tables).
//!
//! Binary operations on a quasi-reduced diagram always combine two nodes of
//! the same level, so the computed table is split by level:
//!
//! | Level | Key                    | Value  |
//! |-------|------------------------|--------|
//! | `i`   | `(op, u, v)`, both at `i` | result at `i` |
//!
//! Entries are only valid while nodes are never freed, which holds for the
//! whole lifetime of a [`Manager`][crate::manager::Manager]. The manager
//! still clears the table at the start of every top-level operation so that
//! memory stays bounded by the work of a single operation.

use std::collections::HashMap;

use crate::reference::Ref;

/// Kind of a memoized binary operation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum OpKind {
    And,
    Or,
    Minus,
    Not,
}

pub type OpKey = (OpKind, Ref, Ref);

/// Per-level memo of binary operation results.
///
/// Lookups are counted per table, not per level; the counters survive
/// [`clear`][ComputedTable::clear] so that [`stats`][ComputedTable::stats]
/// reports the whole life of a manager.
pub struct ComputedTable {
    levels: Vec<HashMap<OpKey, Ref>>,
    hits: usize,
    misses: usize,
}

impl ComputedTable {
    /// Creates one map per level `0..num_levels`, each with room for
    /// `2^bits` results.
    pub fn new(num_levels: usize, bits: usize) -> Self {
        Self {
            levels: (0..num_levels).map(|_| HashMap::with_capacity(1 << bits)).collect(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// Result of `op(u, v)` where both operands live at `level`.
    pub fn get(&mut self, level: usize, key: &OpKey) -> Option<Ref> {
        let res = self.levels[level].get(key).copied();
        if res.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        res
    }

    pub fn insert(&mut self, level: usize, key: OpKey, value: Ref) {
        debug_assert!(level < self.levels.len(), "level {} out of range", level);
        self.levels[level].insert(key, value);
    }

    /// Drops every result but keeps the per-level allocations.
    pub fn clear(&mut self) {
        for level in self.levels.iter_mut() {
            level.clear();
        }
    }

    /// Number of results cached at `level`.
    pub fn level_len(&self, level: usize) -> usize {
        self.levels[level].len()
    }

    /// Total number of entries over all levels.
    pub fn len(&self) -> usize {
        self.levels.iter().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(HashMap::is_empty)
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_computed_table_levels_are_separate() {
        let mut table = ComputedTable::new(3, 4);
        assert_eq!(table.num_levels(), 3);
        let key = (OpKind::And, Ref::new(5), Ref::new(6));

        table.insert(1, key, Ref::new(9));
        assert_eq!(table.get(1, &key), Some(Ref::new(9)));
        assert_eq!(table.get(0, &key), None);
        assert_eq!(table.get(2, &key), None);
        assert_eq!(table.len(), 1);
        assert_eq!(table.level_len(1), 1);
        assert_eq!(table.level_len(0), 0);
        assert_eq!(table.stats(), (1, 2));
    }

    #[test]
    fn test_computed_table_op_is_part_of_key() {
        let mut table = ComputedTable::new(1, 4);
        table.insert(0, (OpKind::And, Ref::new(2), Ref::new(3)), Ref::new(2));
        assert_eq!(table.get(0, &(OpKind::Or, Ref::new(2), Ref::new(3))), None);
        assert_eq!(table.get(0, &(OpKind::And, Ref::new(3), Ref::new(2))), None);
    }

    #[test]
    fn test_computed_table_clear_keeps_stats() {
        let mut table = ComputedTable::new(2, 4);
        let key = (OpKind::Minus, Ref::new(2), Ref::new(3));
        table.insert(0, key, Ref::ZERO);
        table.insert(1, key, Ref::ONE);
        assert_eq!(table.get(1, &key), Some(Ref::ONE));

        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.get(0, &key), None);
        assert_eq!(table.stats(), (1, 1));
    }
}
