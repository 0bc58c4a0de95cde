//! Families of coalitions derived from the winning coalitions.
//!
//! All of them are recursive descents over the winning diagram, memoized per
//! node for the duration of one call. The `_directed` variants are only
//! correct for directed games (players ordered by non-increasing
//! desirability) and avoid one set operation per node.

use std::collections::HashMap;

use log::debug;

use crate::desirability::Desirability;
use crate::manager::Manager;
use crate::manip::View;
use crate::reference::Ref;

impl Manager {
    /// Minimal winning coalitions of the game `win`.
    pub fn min_win(&self, win: Ref) -> Ref {
        let mut cache = HashMap::new();
        let res = self._min_win(win, &mut cache);
        debug!("min_win({}) = {}", win, res);
        res
    }

    fn _min_win(&self, v: Ref, cache: &mut HashMap<Ref, Ref>) -> Ref {
        if v.is_terminal() {
            return v;
        }
        if let Some(&res) = cache.get(&v) {
            return res;
        }
        let (t, e) = (self.high(v), self.low(v));
        let min_t = self._min_win(t, cache);
        let high = self.apply_minus(min_t, e);
        let low = self._min_win(e, cache);
        let res = self.mk_node(self.level(v), high, low);
        cache.insert(v, res);
        res
    }

    /// Minimal winning coalitions of a directed game.
    ///
    /// In a directed game, a minimal winning coalition of the then-branch is
    /// winning in the else-branch only if the else-branch contains every
    /// coalition.
    pub fn min_win_directed(&self, win: Ref) -> Ref {
        let mut cache = HashMap::new();
        let res = self._min_win_directed(win, &mut cache);
        debug!("min_win_directed({}) = {}", win, res);
        res
    }

    fn _min_win_directed(&self, v: Ref, cache: &mut HashMap<Ref, Ref>) -> Ref {
        if v.is_terminal() {
            return v;
        }
        if let Some(&res) = cache.get(&v) {
            return res;
        }
        let level = self.level(v);
        let (t, e) = (self.high(v), self.low(v));
        let high = if e == self.one(level + 1) {
            self.zero(level + 1)
        } else {
            self._min_win_directed(t, cache)
        };
        let low = self._min_win_directed(e, cache);
        let res = self.mk_node(level, high, low);
        cache.insert(v, res);
        res
    }

    /// Maximal losing coalitions of the game `win`.
    pub fn max_losing(&self, win: Ref) -> Ref {
        let mut cache = HashMap::new();
        let res = self._max_losing(win, &mut cache);
        debug!("max_losing({}) = {}", win, res);
        res
    }

    fn _max_losing(&self, v: Ref, cache: &mut HashMap<Ref, Ref>) -> Ref {
        match v {
            // Below the last level the empty remainder is maximal iff it loses.
            Ref::ONE => return Ref::ZERO,
            Ref::ZERO => return Ref::ONE,
            _ => {}
        }
        if let Some(&res) = cache.get(&v) {
            return res;
        }
        let (t, e) = (self.high(v), self.low(v));
        let high = self._max_losing(t, cache);
        let max_e = self._max_losing(e, cache);
        let low = self.apply_and(max_e, t);
        let res = self.mk_node(self.level(v), high, low);
        cache.insert(v, res);
        res
    }

    /// Maximal losing coalitions of a directed game.
    ///
    /// A maximal losing coalition of the else-branch that misses some player
    /// wins together with the player of this level, since that player is at
    /// least as desirable as the missing one.
    pub fn max_losing_directed(&self, win: Ref) -> Ref {
        let mut cache = HashMap::new();
        let res = self._max_losing_directed(win, &mut cache);
        debug!("max_losing_directed({}) = {}", win, res);
        res
    }

    fn _max_losing_directed(&self, v: Ref, cache: &mut HashMap<Ref, Ref>) -> Ref {
        match v {
            Ref::ONE => return Ref::ZERO,
            Ref::ZERO => return Ref::ONE,
            _ => {}
        }
        if let Some(&res) = cache.get(&v) {
            return res;
        }
        let level = self.level(v);
        let (t, e) = (self.high(v), self.low(v));
        let high = self._max_losing_directed(t, cache);
        let max_e = self._max_losing_directed(e, cache);
        let low = if e == self.zero(level + 1) {
            self.apply_and(max_e, t)
        } else {
            max_e
        };
        let res = self.mk_node(level, high, low);
        cache.insert(v, res);
        res
    }

    /// Blocking coalitions: those whose complement is losing.
    pub fn blocking(&self, win: Ref) -> Ref {
        self.materialize(win, &View::ident().not().compl())
    }

    /// Losing coalitions.
    pub fn losing(&self, win: Ref) -> Ref {
        self.apply_not(win)
    }

    /// Shift-minimal winning coalitions.
    ///
    /// A minimal winning coalition `S` is shift-minimal if replacing any
    /// member `i` by a player `j ∉ S` directly below `i` in the desirability
    /// order makes it losing. Equivalently, `S` is not of the form `T - j + i`
    /// for a winning `T` containing `j` but not `i`.
    pub fn shift_min_win(&self, win: Ref, min_win: Ref, alad: &Desirability) -> Ref {
        let n = self.num_vars();
        let mut shifted = self.zero(0);
        for i in 0..n {
            for j in alad.direct_successors(i) {
                let family = self.materialize(win, &View::ident().remove(j).add(i));
                shifted = self.apply_or(shifted, family);
            }
        }
        let res = self.apply_minus(min_win, shifted);
        debug!("shift_min_win({}) = {}", win, res);
        res
    }

    /// Shift-maximal losing coalitions.
    ///
    /// A maximal losing coalition `S` is shift-maximal if replacing any
    /// member `j` by a player `i ∉ S` directly above `j` makes it winning.
    pub fn shift_max_losing(&self, win: Ref, max_losing: Ref, alad: &Desirability) -> Ref {
        let n = self.num_vars();
        let losing = self.losing(win);
        let mut shifted = self.zero(0);
        for i in 0..n {
            for j in alad.direct_successors(i) {
                let family = self.materialize(losing, &View::ident().remove(i).add(j));
                shifted = self.apply_or(shifted, family);
            }
        }
        let res = self.apply_minus(max_losing, shifted);
        debug!("shift_max_losing({}) = {}", win, res);
        res
    }

    /// Two nodes of the same level neither of which includes the other.
    ///
    /// In a weighted game the nodes of every level form a chain under
    /// inclusion, since each is the family of coalitions reaching some
    /// residual quota. Returns `None` if every level is a chain.
    pub fn incomparable_pair(&self, win: Ref) -> Option<(Ref, Ref)> {
        let ident = View::ident();
        for nodes in self.collect_nodes(win).iter().take(self.num_vars()) {
            let mut chain = nodes.clone();
            // Larger families first; a level is a chain iff neighbours nest.
            chain.sort_by_cached_key(|&v| std::cmp::Reverse(self.count_minterms(v)));
            for pair in chain.windows(2) {
                let (u, v) = (pair[0], pair[1]);
                if !self.view_leq(v, &ident, u, &ident) {
                    debug!("incomparable_pair: {} and {} at level {}", u, v, self.level(u));
                    return Some((u, v));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::rc::Rc;

    use test_log::test;

    use crate::desirability::NoHints;
    use crate::wvg::Wvg;

    fn sets(mgr: &Manager, root: Ref) -> Vec<Vec<usize>> {
        let mut res: Vec<_> = mgr.enumerate_sets(root).collect();
        res.sort();
        res
    }

    #[test]
    fn test_min_win_and_max_losing() {
        let mgr = Manager::new(3);
        let win = Wvg::new(3, vec![2, 1, 1]).to_qobdd(&mgr);

        assert_eq!(sets(&mgr, mgr.min_win(win)), vec![vec![0, 1], vec![0, 2]]);
        assert_eq!(mgr.min_win_directed(win), mgr.min_win(win));

        assert_eq!(sets(&mgr, mgr.max_losing(win)), vec![vec![0], vec![1, 2]]);
        assert_eq!(mgr.max_losing_directed(win), mgr.max_losing(win));
    }

    #[test]
    fn test_directed_variants_agree() {
        let mgr = Manager::new(6);
        for (quota, weights) in [
            (7, vec![4, 3, 3, 2, 1, 1]),
            (5, vec![3, 3, 2, 1, 1, 0]),
            (1, vec![1, 1, 1, 1, 1, 1]),
            (6, vec![1, 1, 1, 1, 1, 1]),
        ] {
            let win = Wvg::new(quota, weights).to_qobdd(&mgr);
            assert_eq!(mgr.min_win_directed(win), mgr.min_win(win));
            assert_eq!(mgr.max_losing_directed(win), mgr.max_losing(win));
        }
    }

    #[test]
    fn test_min_win_is_minimal() {
        let mgr = Manager::new(5);
        let win = Wvg::new(6, vec![4, 3, 2, 2, 1]).to_qobdd(&mgr);
        let min = mgr.min_win(win);

        for s in mgr.enumerate_sets(min) {
            assert!(mgr.is_in(win, &s));
            for &p in &s {
                let smaller: Vec<usize> = s.iter().copied().filter(|&q| q != p).collect();
                assert!(!mgr.is_in(win, &smaller), "{:?} is not minimal", s);
            }
        }
        for s in mgr.enumerate_sets(mgr.max_losing(win)) {
            assert!(!mgr.is_in(win, &s));
            for p in (0..5).filter(|p| !s.contains(p)) {
                let mut larger = s.clone();
                larger.push(p);
                assert!(mgr.is_in(win, &larger), "{:?} is not maximal", s);
            }
        }
    }

    #[test]
    fn test_blocking_and_losing() {
        let mgr = Manager::new(3);
        let win = Wvg::new(3, vec![2, 1, 1]).to_qobdd(&mgr);

        let losing = mgr.losing(win);
        assert_eq!(mgr.apply_or(losing, win), mgr.one(0));
        assert!(mgr.is_in(losing, &[1, 2]));

        // Blocking: the complement does not reach the quota.
        let blocking = mgr.blocking(win);
        assert_eq!(sets(&mgr, blocking), vec![vec![0], vec![0, 1], vec![0, 1, 2], vec![0, 2], vec![1, 2]]);
    }

    #[test]
    fn test_incomparable_pair() {
        let mgr = Manager::new(4);
        let weighted = Wvg::new(4, vec![3, 2, 2, 1]).to_qobdd(&mgr);
        assert_eq!(mgr.incomparable_pair(weighted), None);

        // A complete game that is not weighted.
        let mgr = Manager::new(6);
        let win = mgr.apply_and(
            Wvg::new(5, vec![4, 2, 1, 1, 1, 1]).to_qobdd(&mgr),
            Wvg::new(6, vec![4, 4, 4, 3, 0, 0]).to_qobdd(&mgr),
        );
        let (u, v) = mgr.incomparable_pair(win).unwrap();
        assert_eq!(mgr.level(u), 3);
        assert_eq!(mgr.level(u), mgr.level(v));
        assert_ne!(mgr.apply_minus(u, v), mgr.zero(mgr.level(u)));
        assert_ne!(mgr.apply_minus(v, u), mgr.zero(mgr.level(u)));
    }

    #[test]
    fn test_shift_min_win() {
        // [5; 3, 2, 2, 1]: no minimal winning coalition stays winning when a
        // member is replaced by a directly less desirable player.
        let mgr = Rc::new(Manager::new(4));
        let win = Wvg::new(5, vec![3, 2, 2, 1]).to_qobdd(&mgr);
        let min = mgr.min_win(win);
        assert_eq!(sets(&mgr, min), vec![vec![0, 1], vec![0, 2], vec![1, 2, 3]]);

        let alad = Desirability::new(Rc::clone(&mgr), win, Rc::new(NoHints));
        let shift = mgr.shift_min_win(win, min, &alad);
        assert_eq!(sets(&mgr, shift), vec![vec![0, 1], vec![0, 2], vec![1, 2, 3]]);

        let max = mgr.max_losing(win);
        let shift_max = mgr.shift_max_losing(win, max, &alad);
        for s in mgr.enumerate_sets(shift_max) {
            assert!(mgr.is_in(max, &s));
        }
    }

    #[test]
    fn test_shift_min_win_drops_shifted() {
        // [4; 3, 2, 2, 1]: in {0,1} and {0,2} the weaker member can be
        // shifted down to 3 and the coalition still wins.
        let mgr = Rc::new(Manager::new(4));
        let win = Wvg::new(4, vec![3, 2, 2, 1]).to_qobdd(&mgr);
        let min = mgr.min_win(win);
        assert_eq!(sets(&mgr, min), vec![vec![0, 1], vec![0, 2], vec![0, 3], vec![1, 2]]);

        let alad = Desirability::new(Rc::clone(&mgr), win, Rc::new(NoHints));
        let shift = mgr.shift_min_win(win, min, &alad);
        assert_eq!(sets(&mgr, shift), vec![vec![0, 3], vec![1, 2]]);
    }
}
