//! Membership, witnesses and model counting.

use std::collections::HashMap;

use num_bigint::BigUint;

use crate::manager::Manager;
use crate::reference::Ref;

impl Manager {
    /// Whether the coalition `players` belongs to the family rooted at `root`.
    ///
    /// `root` must be at level 0. Players outside `0..n` are ignored.
    pub fn is_in(&self, root: Ref, players: &[usize]) -> bool {
        let mut members = vec![false; self.num_vars()];
        for &p in players {
            if p < members.len() {
                members[p] = true;
            }
        }

        let mut current = root;
        while !current.is_terminal() {
            current = if members[self.level(current)] {
                self.high(current)
            } else {
                self.low(current)
            };
        }
        self.is_one(current)
    }

    /// Returns one coalition of the family, if the family is not empty.
    ///
    /// Then-edges are preferred, so the result is the lexicographically
    /// largest coalition in the player order.
    pub fn any_set(&self, root: Ref) -> Option<Vec<usize>> {
        if self.is_empty_family(root) {
            return None;
        }

        let mut coalition = Vec::new();
        let mut current = root;

        // Walk down, always picking a non-empty branch
        while !current.is_terminal() {
            let level = self.level(current);
            let high = self.high(current);
            if !self.is_empty_family(high) {
                coalition.push(level);
                current = high;
            } else {
                current = self.low(current);
            }
        }

        debug_assert!(self.is_one(current));
        Some(coalition)
    }

    /// Number of coalitions in the family.
    pub fn count_minterms(&self, root: Ref) -> BigUint {
        let mut cache = HashMap::new();
        self._count_minterms(root, &mut cache)
    }

    fn _count_minterms(&self, node: Ref, cache: &mut HashMap<Ref, BigUint>) -> BigUint {
        if self.is_zero(node) {
            return BigUint::ZERO;
        } else if self.is_one(node) {
            return BigUint::from(1u32);
        }

        if let Some(count) = cache.get(&node) {
            return count.clone();
        }

        let count_high = self._count_minterms(self.high(node), cache);
        let count_low = self._count_minterms(self.low(node), cache);
        let count = count_high + count_low;

        cache.insert(node, count.clone());
        count
    }

    /// Number of paths from `root` to every node reachable from it.
    pub fn count_paths(&self, root: Ref) -> HashMap<Ref, BigUint> {
        let levels = self.collect_nodes(root);
        let mut paths: HashMap<Ref, BigUint> = HashMap::new();
        paths.insert(root, BigUint::from(1u32));

        for nodes in levels.iter().take(self.num_vars()) {
            for &v in nodes {
                let count = paths.get(&v).cloned().unwrap_or_default();
                *paths.entry(self.high(v)).or_default() += &count;
                *paths.entry(self.low(v)).or_default() += count;
            }
        }

        paths
    }

    /// For every player, the number of coalitions of the family containing it.
    pub fn count_minterms_containing(&self, root: Ref) -> Vec<BigUint> {
        let paths = self.count_paths(root);
        let mut cache = HashMap::new();
        let mut res = vec![BigUint::ZERO; self.num_vars()];

        for (level, nodes) in self.collect_nodes(root).iter().enumerate().take(self.num_vars()) {
            for v in nodes {
                let below = self._count_minterms(self.high(*v), &mut cache);
                res[level] += &paths[v] * below;
            }
        }

        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    /// Coalitions of players `level..n` whose weight reaches `quota`.
    fn threshold(mgr: &Manager, level: usize, weights: &[u64], quota: i64) -> Ref {
        if level == mgr.num_vars() {
            return if quota <= 0 { Ref::ONE } else { Ref::ZERO };
        }
        let high = threshold(mgr, level + 1, weights, quota - weights[level] as i64);
        let low = threshold(mgr, level + 1, weights, quota);
        mgr.mk_node(level, high, low)
    }

    #[test]
    fn test_is_in() {
        let mgr = Manager::new(3);
        let f = threshold(&mgr, 0, &[2, 1, 1], 3);

        assert!(mgr.is_in(f, &[0, 1]));
        assert!(mgr.is_in(f, &[0, 2]));
        assert!(mgr.is_in(f, &[0, 1, 2]));
        assert!(!mgr.is_in(f, &[1, 2]));
        assert!(!mgr.is_in(f, &[0]));
        assert!(!mgr.is_in(f, &[]));
    }

    #[test]
    fn test_any_set() {
        let mgr = Manager::new(3);
        let f = threshold(&mgr, 0, &[2, 1, 1], 3);
        let s = mgr.any_set(f).unwrap();
        assert!(mgr.is_in(f, &s));
        assert_eq!(s, vec![0, 1, 2]);

        assert_eq!(mgr.any_set(mgr.zero(0)), None);
        assert_eq!(mgr.any_set(mgr.one(0)), Some(vec![0, 1, 2]));
    }

    #[test]
    fn test_count_minterms() {
        let mgr = Manager::new(4);
        assert_eq!(mgr.count_minterms(mgr.one(0)), BigUint::from(16u32));
        assert_eq!(mgr.count_minterms(mgr.zero(0)), BigUint::ZERO);

        // At least 3 of 4 players: C(4,3) + C(4,4) = 5.
        let f = threshold(&mgr, 0, &[1, 1, 1, 1], 3);
        assert_eq!(mgr.count_minterms(f), BigUint::from(5u32));
    }

    #[test]
    fn test_count_minterms_containing() {
        let mgr = Manager::new(3);
        // Winning: {0,1}, {0,2}, {0,1,2}.
        let f = threshold(&mgr, 0, &[2, 1, 1], 3);
        let counts = mgr.count_minterms_containing(f);
        assert_eq!(
            counts,
            vec![BigUint::from(3u32), BigUint::from(2u32), BigUint::from(2u32)]
        );
    }

    #[test]
    fn test_count_paths() {
        let mgr = Manager::new(2);
        let paths = mgr.count_paths(mgr.one(0));
        assert_eq!(paths[&mgr.one(1)], BigUint::from(2u32));
        assert_eq!(paths[&Ref::ONE], BigUint::from(4u32));
    }
}
