//! Enumeration of the coalitions of a family.
//!
//! # Example
//!
//! ```
//! use simple_games::manager::Manager;
//!
//! let mgr = Manager::new(2);
//!
//! // Coalitions containing player 0.
//! let f = mgr.mk_node(0, mgr.one(1), mgr.zero(1));
//!
//! let sets: Vec<_> = mgr.enumerate_sets(f).collect();
//! assert_eq!(sets, vec![vec![0, 1], vec![0]]);
//! ```
//!
//! The number of coalitions can be exponential in the number of players, so
//! use with caution on large families. Empty sub-families are pruned, hence
//! every step of the iterator does work proportional to the number of
//! players only.

use crate::manager::Manager;
use crate::reference::Ref;

impl Manager {
    /// Returns an iterator over all coalitions of the family rooted at `root`.
    ///
    /// Each coalition is a sorted vector of players. Coalitions are produced
    /// in decreasing lexicographic order of their characteristic vectors.
    pub fn enumerate_sets(&self, root: Ref) -> Coalitions<'_> {
        Coalitions::new(self, root)
    }

    /// Returns the players taken on some path from `root` down to `target`.
    ///
    /// The result only mentions players above the level of `target`.
    pub fn path_to(&self, root: Ref, target: Ref) -> Option<Vec<usize>> {
        let target_level = self.level(target);
        let mut path = Vec::new();
        if self._path_to(root, target, target_level, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    fn _path_to(&self, node: Ref, target: Ref, target_level: usize, path: &mut Vec<usize>) -> bool {
        if node == target {
            return true;
        }
        let level = self.level(node);
        if level >= target_level {
            return false;
        }
        path.push(level);
        if self._path_to(self.high(node), target, target_level, path) {
            return true;
        }
        path.pop();
        self._path_to(self.low(node), target, target_level, path)
    }
}

/// Iterator state for exploring a single node.
#[derive(Debug, Clone, Copy)]
enum Branch {
    /// About to explore the high (then) branch
    High,
    /// About to explore the low (else) branch
    Low,
}

/// Frame on the exploration stack.
#[derive(Debug)]
struct StackFrame {
    node: Ref,
    /// Which branch to explore next (None if both explored)
    next_branch: Option<Branch>,
    /// Whether this node was entered through a then-edge
    via_high: bool,
}

/// An iterator over the coalitions of a family.
///
/// Created by [`Manager::enumerate_sets()`]. The current coalition is kept in
/// a single vector that grows and shrinks with the traversal.
pub struct Coalitions<'a> {
    mgr: &'a Manager,
    stack: Vec<StackFrame>,
    current: Vec<usize>,
}

impl<'a> Coalitions<'a> {
    pub fn new(mgr: &'a Manager, root: Ref) -> Self {
        let stack = if mgr.is_empty_family(root) {
            Vec::new()
        } else {
            vec![StackFrame {
                node: root,
                next_branch: Some(Branch::High),
                via_high: false,
            }]
        };
        Coalitions {
            mgr,
            stack,
            current: Vec::new(),
        }
    }

    fn backtrack(&mut self) {
        if let Some(frame) = self.stack.pop() {
            if frame.via_high {
                self.current.pop();
            }
        }
    }

    fn descend(&mut self, node: Ref, via_high: bool) {
        if self.mgr.is_empty_family(node) {
            return;
        }
        self.stack.push(StackFrame {
            node,
            next_branch: Some(Branch::High),
            via_high,
        });
    }
}

impl Iterator for Coalitions<'_> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            let node = frame.node;

            if self.mgr.is_one(node) {
                let result = self.current.clone();
                self.backtrack();
                return Some(result);
            }

            match frame.next_branch {
                Some(Branch::High) => {
                    frame.next_branch = Some(Branch::Low);
                    let high = self.mgr.high(node);
                    if !self.mgr.is_empty_family(high) {
                        self.current.push(self.mgr.level(node));
                        self.descend(high, true);
                    }
                }
                Some(Branch::Low) => {
                    frame.next_branch = None;
                    let low = self.mgr.low(node);
                    self.descend(low, false);
                }
                None => self.backtrack(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    fn majority(mgr: &Manager) -> Ref {
        // At least two of three players.
        let one = mgr.mk_node(2, Ref::ONE, Ref::ZERO);
        let a = mgr.mk_node(1, mgr.one(2), one);
        let b = mgr.mk_node(1, one, mgr.zero(2));
        mgr.mk_node(0, a, b)
    }

    #[test]
    fn test_enumerate_majority() {
        let mgr = Manager::new(3);
        let f = majority(&mgr);

        let sets: Vec<_> = mgr.enumerate_sets(f).collect();
        for s in &sets {
            println!("  {:?}", s);
        }
        assert_eq!(sets, vec![vec![0, 1, 2], vec![0, 1], vec![0, 2], vec![1, 2]]);
    }

    #[test]
    fn test_enumerate_constants() {
        let mgr = Manager::new(2);
        assert_eq!(mgr.enumerate_sets(mgr.zero(0)).count(), 0);

        let all: Vec<_> = mgr.enumerate_sets(mgr.one(0)).collect();
        assert_eq!(all, vec![vec![0, 1], vec![0], vec![1], vec![]]);
    }

    #[test]
    fn test_enumerate_count_matches() {
        let mgr = Manager::new(3);
        let f = majority(&mgr);
        let count = mgr.enumerate_sets(f).count();
        assert_eq!(num_bigint::BigUint::from(count), mgr.count_minterms(f));
    }

    #[test]
    fn test_path_to() {
        let mgr = Manager::new(3);
        let f = majority(&mgr);
        let b = mgr.low(f);
        assert_eq!(mgr.path_to(f, b), Some(vec![]));

        let one = mgr.high(b);
        let path = mgr.path_to(f, one).unwrap();
        assert_eq!(path, vec![0]);

        assert_eq!(mgr.path_to(b, mgr.one(2)), None);
    }
}
