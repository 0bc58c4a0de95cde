//! Per-level unique table for diagram nodes.
//!
//! The manager keeps node storage and lookup apart:
//!
//! 1. A plain `Vec<Node>` holds every node, indexed by its id.
//! 2. One subtable per level maps the children of a node to its id:
//!
//! ```text
//! subtables[0] → Subtable for level 0 (player 0)
//! subtables[1] → Subtable for level 1 (player 1)
//! subtables[2] → Subtable for level 2 (player 2)
//! ...
//! ```
//!
//! Since all nodes in a subtable share the level, the key is just the pair
//! `(high, low)`. Looking a pair up before allocating is what keeps the
//! diagram canonical: two nodes with the same level and children are always
//! the same node.

use std::collections::HashMap;

use crate::reference::Ref;

/// A subtable storing the nodes of a single level.
#[derive(Debug, Clone)]
pub struct Subtable {
    /// The level of all nodes in this subtable.
    pub level: usize,

    /// Map from (high, low) to node id.
    nodes: HashMap<(Ref, Ref), Ref>,
}

impl Subtable {
    /// Create a new empty subtable for the given level.
    pub fn new(level: usize) -> Self {
        Self {
            level,
            nodes: HashMap::new(),
        }
    }

    /// Look up a node by its children.
    pub fn find(&self, high: Ref, low: Ref) -> Option<Ref> {
        self.nodes.get(&(high, low)).copied()
    }

    /// Insert a node into the subtable.
    ///
    /// The caller guarantees that no node with the same children exists yet.
    pub fn insert(&mut self, high: Ref, low: Ref, node: Ref) {
        let prev = self.nodes.insert((high, low), node);
        assert!(prev.is_none(), "Duplicate node ({}, {}) at level {}", high, low, self.level);
    }

    /// Get the number of nodes in this subtable.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the subtable is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all node ids in this subtable.
    pub fn nodes(&self) -> impl Iterator<Item = Ref> + '_ {
        self.nodes.values().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtable_basic() {
        let mut st = Subtable::new(3);

        let high = Ref::ONE;
        let low = Ref::ZERO;

        assert!(st.find(high, low).is_none());

        st.insert(high, low, Ref::new(42));
        assert_eq!(st.find(high, low), Some(Ref::new(42)));
        assert_eq!(st.len(), 1);
        assert!(st.find(low, high).is_none());
    }

    #[test]
    fn test_subtable_multiple_nodes() {
        let mut st = Subtable::new(1);

        st.insert(Ref::ONE, Ref::ZERO, Ref::new(10));
        st.insert(Ref::new(2), Ref::new(3), Ref::new(20));
        st.insert(Ref::ZERO, Ref::new(3), Ref::new(30));

        assert_eq!(st.len(), 3);
        assert_eq!(st.find(Ref::ONE, Ref::ZERO), Some(Ref::new(10)));
        assert_eq!(st.find(Ref::new(2), Ref::new(3)), Some(Ref::new(20)));
        assert_eq!(st.find(Ref::ZERO, Ref::new(3)), Some(Ref::new(30)));

        let mut ids: Vec<_> = st.nodes().collect();
        ids.sort();
        assert_eq!(ids, vec![Ref::new(10), Ref::new(20), Ref::new(30)]);
    }

    #[test]
    #[should_panic(expected = "Duplicate node")]
    fn test_subtable_duplicate_panics() {
        let mut st = Subtable::new(0);
        st.insert(Ref::ONE, Ref::ZERO, Ref::new(2));
        st.insert(Ref::ONE, Ref::ZERO, Ref::new(3));
    }
}
