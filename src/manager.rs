//! The quasi-reduced decision-diagram manager.
//!
//! A [`Manager`] owns every node of every diagram over a fixed number of
//! players `n`. Player `i` is decided at level `i`, the two terminals sit at
//! level `n`, and every path from a root at level 0 visits every level
//! exactly once. Redundant nodes (both edges to the same child) are kept, so
//! the constant families are chains: [`zero(i)`][Manager::zero] is the
//! empty family over players `i..n` and [`one(i)`][Manager::one] is the
//! family of all subsets of players `i..n`.
//!
//! Nodes are hash-consed through per-level [`Subtable`]s and never freed.
//! Binary operations always combine nodes of the same level and memoize
//! their results in a per-level [`ComputedTable`].

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::fmt::Debug;

use log::debug;

use crate::cache::{ComputedTable, OpKind};
use crate::node::Node;
use crate::reference::Ref;
use crate::subtable::Subtable;

pub struct Manager {
    num_vars: usize,
    nodes: RefCell<Vec<Node>>,
    subtables: RefCell<Vec<Subtable>>,
    computed: RefCell<ComputedTable>,
    zeros: Vec<Ref>,
    ones: Vec<Ref>,
}

impl Manager {
    /// Creates a manager for diagrams over `num_vars` players.
    pub fn new(num_vars: usize) -> Self {
        assert!(num_vars < u32::MAX as usize, "Too many players: {}", num_vars);

        let bottom = num_vars as u32;
        let nodes = vec![Node::terminal(bottom, Ref::ZERO), Node::terminal(bottom, Ref::ONE)];

        let mut manager = Self {
            num_vars,
            nodes: RefCell::new(nodes),
            subtables: RefCell::new((0..num_vars).map(Subtable::new).collect()),
            computed: RefCell::new(ComputedTable::new(num_vars, 10)),
            zeros: Vec::new(),
            ones: Vec::new(),
        };

        // Constant chains, built bottom-up from the terminals.
        let mut zeros = vec![Ref::ZERO; num_vars + 1];
        let mut ones = vec![Ref::ONE; num_vars + 1];
        for level in (0..num_vars).rev() {
            zeros[level] = manager.mk_node(level, zeros[level + 1], zeros[level + 1]);
            ones[level] = manager.mk_node(level, ones[level + 1], ones[level + 1]);
        }
        manager.zeros = zeros;
        manager.ones = ones;

        manager
    }
}

impl Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("num_vars", &self.num_vars)
            .field("num_nodes", &self.num_nodes())
            .field("computed", &self.computed.borrow().len())
            .finish()
    }
}

impl Manager {
    /// Number of players, which is also the level of the terminals.
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Number of nodes ever created, terminals included.
    pub fn num_nodes(&self) -> usize {
        self.nodes.borrow().len()
    }

    /// Number of nodes in the unique table of `level`.
    pub fn level_size(&self, level: usize) -> usize {
        self.subtables.borrow()[level].len()
    }

    /// `(hits, misses)` of the computed table since creation.
    pub fn cache_stats(&self) -> (usize, usize) {
        self.computed.borrow().stats()
    }

    pub fn node(&self, node: Ref) -> Node {
        self.nodes.borrow()[node.index()]
    }
    pub fn level(&self, node: Ref) -> usize {
        self.node(node).level as usize
    }
    /// Then-child: the player at this level is in the coalition.
    pub fn high(&self, node: Ref) -> Ref {
        self.node(node).high
    }
    /// Else-child: the player at this level is not in the coalition.
    pub fn low(&self, node: Ref) -> Ref {
        self.node(node).low
    }

    pub fn is_zero(&self, node: Ref) -> bool {
        node == Ref::ZERO
    }
    pub fn is_one(&self, node: Ref) -> bool {
        node == Ref::ONE
    }
    pub fn is_terminal(&self, node: Ref) -> bool {
        node.is_terminal()
    }

    /// Inner node whose two edges point to the same child.
    pub fn is_redundant(&self, node: Ref) -> bool {
        !node.is_terminal() && self.node(node).is_redundant()
    }

    /// Empty family over the players `level..n`.
    pub fn zero(&self, level: usize) -> Ref {
        self.zeros[level]
    }

    /// Family of all subsets of the players `level..n`.
    pub fn one(&self, level: usize) -> Ref {
        self.ones[level]
    }

    /// Whether `node` is the empty family of its level.
    pub fn is_empty_family(&self, node: Ref) -> bool {
        node == self.zero(self.level(node))
    }

    /// Whether `node` contains every subset below its level.
    pub fn is_full_family(&self, node: Ref) -> bool {
        node == self.one(self.level(node))
    }

    /// Returns the canonical node `(level, high, low)`, creating it if absent.
    ///
    /// This is the `ite` constructor of the diagram. Both children must live
    /// at `level + 1`. Redundant nodes are interned like any other node, so
    /// calling this twice with `high == low` yields the same node.
    pub fn mk_node(&self, level: usize, high: Ref, low: Ref) -> Ref {
        debug!("mk_node(level = {}, high = {}, low = {})", level, high, low);

        assert!(level < self.num_vars, "Level {} is out of range 0..{}", level, self.num_vars);
        assert_eq!(self.level(high), level + 1, "High child {} is not at level {}", high, level + 1);
        assert_eq!(self.level(low), level + 1, "Low child {} is not at level {}", low, level + 1);

        if let Some(node) = self.subtables.borrow()[level].find(high, low) {
            debug!("mk_node: found {}", node);
            return node;
        }

        let mut nodes = self.nodes.borrow_mut();
        let node = Ref::new(nodes.len() as u32);
        nodes.push(Node::new(level as u32, high, low));
        self.subtables.borrow_mut()[level].insert(high, low, node);
        node
    }

    /// Family containing exactly one coalition below `level`, namely the
    /// players of `members` that are `>= level`.
    pub fn mk_coalition(&self, level: usize, members: &[bool]) -> Ref {
        let mut current = Ref::ONE;
        for i in (level..self.num_vars).rev() {
            let zero = self.zero(i + 1);
            current = if members.get(i).copied().unwrap_or(false) {
                self.mk_node(i, current, zero)
            } else {
                self.mk_node(i, zero, current)
            };
        }
        current
    }

    fn check_same_level(&self, u: Ref, v: Ref) -> usize {
        let i = self.level(u);
        let j = self.level(v);
        assert_eq!(i, j, "Level mismatch: {} at level {}, {} at level {}", u, i, v, j);
        i
    }
}

// ============================================================================
// Boolean combinators
// ============================================================================

impl Manager {
    /// Intersection of two families (conjunction of their functions).
    pub fn apply_and(&self, u: Ref, v: Ref) -> Ref {
        debug!("apply_and(u = {}, v = {})", u, v);
        self.computed.borrow_mut().clear();
        self.and_rec(u, v)
    }

    /// Union of two families (disjunction of their functions).
    pub fn apply_or(&self, u: Ref, v: Ref) -> Ref {
        debug!("apply_or(u = {}, v = {})", u, v);
        self.computed.borrow_mut().clear();
        self.or_rec(u, v)
    }

    /// Difference `u \ v` of two families.
    pub fn apply_minus(&self, u: Ref, v: Ref) -> Ref {
        debug!("apply_minus(u = {}, v = {})", u, v);
        self.computed.borrow_mut().clear();
        self.minus_rec(u, v)
    }

    /// Complement of a family relative to all subsets below its level.
    pub fn apply_not(&self, u: Ref) -> Ref {
        debug!("apply_not(u = {})", u);
        self.computed.borrow_mut().clear();
        self.not_rec(u)
    }

    fn lookup(&self, level: usize, op: OpKind, u: Ref, v: Ref) -> Option<Ref> {
        self.computed.borrow_mut().get(level, &(op, u, v))
    }

    fn store(&self, level: usize, op: OpKind, u: Ref, v: Ref, res: Ref) -> Ref {
        self.computed.borrow_mut().insert(level, (op, u, v), res);
        res
    }

    fn and_rec(&self, u: Ref, v: Ref) -> Ref {
        let level = self.check_same_level(u, v);

        // Base cases:
        //   and(F,F) => F
        //   and(0,G) => 0, and(F,0) => 0
        //   and(1,G) => G, and(F,1) => F
        if u == v {
            return u;
        }
        if u == self.zero(level) || v == self.zero(level) {
            return self.zero(level);
        }
        if u == self.one(level) {
            return v;
        }
        if v == self.one(level) {
            return u;
        }

        // Commutative: normalize the key.
        let (u, v) = if u < v { (u, v) } else { (v, u) };
        if let Some(res) = self.lookup(level, OpKind::And, u, v) {
            return res;
        }

        let high = self.and_rec(self.high(u), self.high(v));
        let low = self.and_rec(self.low(u), self.low(v));
        let res = self.mk_node(level, high, low);
        self.store(level, OpKind::And, u, v, res)
    }

    fn or_rec(&self, u: Ref, v: Ref) -> Ref {
        let level = self.check_same_level(u, v);

        if u == v {
            return u;
        }
        if u == self.one(level) || v == self.one(level) {
            return self.one(level);
        }
        if u == self.zero(level) {
            return v;
        }
        if v == self.zero(level) {
            return u;
        }

        let (u, v) = if u < v { (u, v) } else { (v, u) };
        if let Some(res) = self.lookup(level, OpKind::Or, u, v) {
            return res;
        }

        let high = self.or_rec(self.high(u), self.high(v));
        let low = self.or_rec(self.low(u), self.low(v));
        let res = self.mk_node(level, high, low);
        self.store(level, OpKind::Or, u, v, res)
    }

    fn minus_rec(&self, u: Ref, v: Ref) -> Ref {
        let level = self.check_same_level(u, v);

        if u == v || u == self.zero(level) || v == self.one(level) {
            return self.zero(level);
        }
        if v == self.zero(level) {
            return u;
        }
        if u == self.one(level) {
            return self.not_rec(v);
        }

        if let Some(res) = self.lookup(level, OpKind::Minus, u, v) {
            return res;
        }

        let high = self.minus_rec(self.high(u), self.high(v));
        let low = self.minus_rec(self.low(u), self.low(v));
        let res = self.mk_node(level, high, low);
        self.store(level, OpKind::Minus, u, v, res)
    }

    fn not_rec(&self, u: Ref) -> Ref {
        let level = self.level(u);

        if u == self.zero(level) {
            return self.one(level);
        }
        if u == self.one(level) {
            return self.zero(level);
        }

        if let Some(res) = self.lookup(level, OpKind::Not, u, u) {
            return res;
        }

        let high = self.not_rec(self.high(u));
        let low = self.not_rec(self.low(u));
        let res = self.mk_node(level, high, low);
        self.store(level, OpKind::Not, u, u, res)
    }
}

// ============================================================================
// Structure
// ============================================================================

impl Manager {
    /// All nodes reachable from `root`, terminals included.
    pub fn descendants(&self, root: Ref) -> HashSet<Ref> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([root]);
        visited.insert(root);

        while let Some(node) = queue.pop_front() {
            if node.is_terminal() {
                continue;
            }
            for child in [self.high(node), self.low(node)] {
                if visited.insert(child) {
                    queue.push_back(child);
                }
            }
        }

        visited
    }

    /// Number of inner nodes reachable from `root`.
    pub fn size(&self, root: Ref) -> usize {
        self.descendants(root).iter().filter(|node| !node.is_terminal()).count()
    }

    /// Nodes reachable from `root`, grouped by level.
    ///
    /// The result has `n + 1` entries; entry `n` holds the reachable
    /// terminals. Within a level, nodes are sorted by id.
    pub fn collect_nodes(&self, root: Ref) -> Vec<Vec<Ref>> {
        let mut levels = vec![Vec::new(); self.num_vars + 1];
        for node in self.descendants(root) {
            levels[self.level(node)].push(node);
        }
        for level in levels.iter_mut() {
            level.sort();
        }
        levels
    }

    /// Players the family depends on, in increasing order.
    pub fn support(&self, root: Ref) -> Vec<usize> {
        self.collect_nodes(root)
            .iter()
            .enumerate()
            .take(self.num_vars)
            .filter(|(_, nodes)| nodes.iter().any(|&v| !self.is_redundant(v)))
            .map(|(level, _)| level)
            .collect()
    }

    /// Whether `u` and the node `v` of another manager represent the same
    /// family. Diagrams are canonical, so this is a walk over both graphs.
    pub fn same_family(&self, u: Ref, other: &Manager, v: Ref) -> bool {
        if self.num_vars != other.num_vars {
            return false;
        }
        let mut seen: HashSet<(Ref, Ref)> = HashSet::new();
        let mut stack = vec![(u, v)];
        while let Some((a, b)) = stack.pop() {
            if a.is_terminal() || b.is_terminal() {
                if a != b {
                    return false;
                }
                continue;
            }
            if self.level(a) != other.level(b) {
                return false;
            }
            if seen.insert((a, b)) {
                stack.push((self.high(a), other.high(b)));
                stack.push((self.low(a), other.low(b)));
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    /// Family of all coalitions with at least `k` of the players `level..n`.
    fn at_least(mgr: &Manager, level: usize, k: usize) -> Ref {
        if k == 0 {
            return mgr.one(level);
        }
        if level == mgr.num_vars() {
            return Ref::ZERO;
        }
        let high = at_least(mgr, level + 1, k - 1);
        let low = at_least(mgr, level + 1, k);
        mgr.mk_node(level, high, low)
    }

    #[test]
    fn test_constant_chains() {
        let mgr = Manager::new(3);
        assert_eq!(mgr.zero(3), Ref::ZERO);
        assert_eq!(mgr.one(3), Ref::ONE);
        for level in 0..3 {
            assert!(mgr.is_redundant(mgr.zero(level)));
            assert!(mgr.is_redundant(mgr.one(level)));
            assert_eq!(mgr.level(mgr.zero(level)), level);
            assert_eq!(mgr.high(mgr.one(level)), mgr.one(level + 1));
        }
        // Two terminals and two chains of three nodes each.
        assert_eq!(mgr.num_nodes(), 8);
    }

    #[test]
    fn test_mk_node_is_canonical() {
        let mgr = Manager::new(2);
        let a = mgr.mk_node(1, Ref::ONE, Ref::ZERO);
        let b = mgr.mk_node(1, Ref::ONE, Ref::ZERO);
        assert_eq!(a, b);

        let before = mgr.num_nodes();
        let r1 = mgr.mk_node(0, a, a);
        let r2 = mgr.mk_node(0, a, a);
        assert_eq!(r1, r2);
        assert_eq!(mgr.num_nodes(), before + 1);
        assert!(mgr.is_redundant(r1));

        // Constant chains are found, not re-created.
        let before = mgr.num_nodes();
        assert_eq!(mgr.mk_node(1, Ref::ZERO, Ref::ZERO), mgr.zero(1));
        assert_eq!(mgr.num_nodes(), before);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_mk_node_level_out_of_range() {
        let mgr = Manager::new(2);
        mgr.mk_node(2, Ref::ONE, Ref::ZERO);
    }

    #[test]
    #[should_panic(expected = "Level mismatch")]
    fn test_apply_and_level_mismatch() {
        let mgr = Manager::new(3);
        let u = at_least(&mgr, 0, 2);
        let v = at_least(&mgr, 1, 1);
        mgr.apply_and(u, v);
    }

    #[test]
    fn test_complement_laws() {
        let mgr = Manager::new(4);
        let f = at_least(&mgr, 0, 2);
        let not_f = mgr.apply_not(f);

        assert_eq!(mgr.apply_and(not_f, f), mgr.zero(0));
        assert_eq!(mgr.apply_or(f, not_f), mgr.one(0));
        assert_eq!(mgr.apply_not(not_f), f);
        assert_eq!(mgr.apply_minus(mgr.one(0), f), not_f);
    }

    #[test]
    fn test_thresholds_nest() {
        let mgr = Manager::new(4);
        let f2 = at_least(&mgr, 0, 2);
        let f3 = at_least(&mgr, 0, 3);

        assert_eq!(mgr.apply_and(f2, f3), f3);
        assert_eq!(mgr.apply_or(f2, f3), f2);
        assert_eq!(mgr.apply_minus(f3, f2), mgr.zero(0));

        let exactly2 = mgr.apply_minus(f2, f3);
        assert_ne!(exactly2, mgr.zero(0));
        assert_eq!(mgr.apply_or(exactly2, f3), f2);
    }

    #[test]
    fn test_size_and_collect_nodes() {
        let mgr = Manager::new(3);
        let majority = at_least(&mgr, 0, 2);

        // Level 0: root; level 1: two nodes; level 2: one(2), {2}, zero(2).
        assert_eq!(mgr.size(majority), 6);

        let levels = mgr.collect_nodes(majority);
        assert_eq!(levels.len(), 4);
        assert_eq!(levels[0], vec![majority]);
        assert_eq!(levels[1].len(), 2);
        assert_eq!(levels[2].len(), 3);
        assert_eq!(levels[3], vec![Ref::ZERO, Ref::ONE]);
    }

    #[test]
    fn test_same_family_across_managers() {
        let a = Manager::new(3);
        let b = Manager::new(3);
        // Pollute the second manager so that ids differ.
        at_least(&b, 0, 3);
        let fa = at_least(&a, 0, 2);
        let fb = at_least(&b, 0, 2);
        assert!(a.same_family(fa, &b, fb));
        assert!(!a.same_family(fa, &b, at_least(&b, 0, 1)));
        assert!(!a.same_family(fa, &Manager::new(4), Ref::ONE));
    }

    #[test]
    fn test_support() {
        let mgr = Manager::new(3);
        // Player 1 decides alone.
        let mid = mgr.mk_node(1, mgr.one(2), mgr.zero(2));
        let f = mgr.mk_node(0, mid, mid);
        assert_eq!(mgr.support(f), vec![1]);
        assert_eq!(mgr.support(at_least(&mgr, 0, 2)), vec![0, 1, 2]);
        assert!(mgr.support(mgr.one(0)).is_empty());
    }

    #[test]
    fn test_mk_coalition() {
        let mgr = Manager::new(3);
        let f = mgr.mk_coalition(0, &[true, false, true]);
        // The coalition path plus the zero chains hanging off it.
        assert_eq!(mgr.size(f), 5);
        assert!(!mgr.is_empty_family(f));
        assert_eq!(mgr.high(f), mgr.mk_coalition(1, &[true, false, true]));
        assert_eq!(mgr.low(f), mgr.zero(1));
    }
}
