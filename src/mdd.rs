//! Multi-valued view of a diagram over player types.
//!
//! If the players of a game fall into consecutive blocks of mutually
//! symmetric players (types), only the number of players taken from each
//! block matters. An [`MddView`] merges the levels of a block into a single
//! multi-way node: the `j`-th successor of a node is the node reached after
//! taking exactly `j` players of its type. A *model* is then a vector with
//! one count per type.
//!
//! No node is created; the successors are references into the underlying
//! diagram, computed once when the view is built.

use std::collections::HashMap;

use log::debug;
use num_bigint::BigUint;

use crate::manager::Manager;
use crate::reference::Ref;

pub struct MddView<'a> {
    mgr: &'a Manager,
    root: Ref,
    multiplicities: Vec<usize>,
    /// Successors of every inner node of the view, indexed by count.
    succs: HashMap<Ref, Vec<Ref>>,
}

impl<'a> MddView<'a> {
    /// Builds the view of `root` for blocks of `multiplicities[k]` players,
    /// starting at level 0.
    pub fn new(mgr: &'a Manager, root: Ref, multiplicities: &[usize]) -> Self {
        assert_eq!(
            multiplicities.iter().sum::<usize>(),
            mgr.num_vars(),
            "Multiplicities {:?} do not cover {} players",
            multiplicities,
            mgr.num_vars()
        );
        assert!(multiplicities.iter().all(|&m| m > 0), "Empty type in {:?}", multiplicities);
        assert_eq!(mgr.level(root), 0, "Root {} is not at level 0", root);

        let mut view = Self {
            mgr,
            root,
            multiplicities: multiplicities.to_vec(),
            succs: HashMap::new(),
        };

        let mut chains: HashMap<Ref, Vec<Ref>> = HashMap::new();
        let mut stack = vec![(root, 0)];
        while let Some((v, k)) = stack.pop() {
            if v.is_terminal() || view.succs.contains_key(&v) {
                continue;
            }
            let succs = view.descend(v, view.multiplicities[k], &mut chains);
            for &s in &succs {
                stack.push((s, k + 1));
            }
            view.succs.insert(v, succs);
        }

        debug!("mdd view of {}: {} nodes over {} types", root, view.succs.len(), multiplicities.len());
        view
    }

    /// Nodes reached from `v` after the next `left` levels, by the number
    /// of then-edges taken.
    fn descend(&self, v: Ref, left: usize, chains: &mut HashMap<Ref, Vec<Ref>>) -> Vec<Ref> {
        if left == 0 {
            return vec![v];
        }
        if let Some(res) = chains.get(&v) {
            return res.clone();
        }
        let mut res = self.descend(self.mgr.low(v), left - 1, chains);
        let high = self.descend(self.mgr.high(v), left - 1, chains);
        res.push(high[left - 1]);
        chains.insert(v, res.clone());
        res
    }

    pub fn root(&self) -> Ref {
        self.root
    }

    pub fn num_types(&self) -> usize {
        self.multiplicities.len()
    }

    /// Successors of an inner node of the view.
    pub fn succs(&self, v: Ref) -> Option<&[Ref]> {
        self.succs.get(&v).map(|s| s.as_slice())
    }

    /// Number of inner nodes of the view.
    pub fn size(&self) -> usize {
        self.succs.len()
    }

    /// Number of models.
    pub fn count_models(&self) -> BigUint {
        let mut cache = HashMap::new();
        self._count_models(self.root, &mut cache)
    }

    fn _count_models(&self, v: Ref, cache: &mut HashMap<Ref, BigUint>) -> BigUint {
        match v {
            Ref::ZERO => return BigUint::ZERO,
            Ref::ONE => return BigUint::from(1u32),
            _ => {}
        }
        if let Some(count) = cache.get(&v) {
            return count.clone();
        }
        let mut count = BigUint::ZERO;
        for &s in &self.succs[&v] {
            count += self._count_models(s, cache);
        }
        cache.insert(v, count.clone());
        count
    }

    /// Calls `f` for every model. The slice passed to `f` is reused between
    /// calls; copy it to keep it.
    pub fn enumerate_models(&self, mut f: impl FnMut(&[usize])) {
        let mut model = vec![0; self.num_types()];
        self._enumerate(0, self.root, &mut model, &mut f);
    }

    fn _enumerate(&self, k: usize, v: Ref, model: &mut Vec<usize>, f: &mut impl FnMut(&[usize])) {
        if v == Ref::ONE {
            f(model);
            return;
        }
        if self.mgr.is_empty_family(v) {
            return;
        }
        for (j, &s) in self.succs[&v].iter().enumerate() {
            model[k] = j;
            self._enumerate(k + 1, s, model, f);
        }
    }

    /// All models, collected.
    pub fn models(&self) -> Vec<Vec<usize>> {
        let mut res = Vec::new();
        self.enumerate_models(|m| res.push(m.to_vec()));
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::wvg::Wvg;

    #[test]
    fn test_majority_single_type() {
        let mgr = Manager::new(3);
        let win = Wvg::new(2, vec![1, 1, 1]).to_qobdd(&mgr);
        let view = MddView::new(&mgr, win, &[3]);

        assert_eq!(view.size(), 1);
        assert_eq!(view.succs(win).unwrap(), &[Ref::ZERO, Ref::ZERO, Ref::ONE, Ref::ONE]);
        assert_eq!(view.count_models(), BigUint::from(2u32));
        assert_eq!(view.models(), vec![vec![2], vec![3]]);
    }

    #[test]
    fn test_two_types() {
        // [4; 2, 2, 1, 1, 1]: types {0, 1} and {2, 3, 4}.
        let mgr = Manager::new(5);
        let win = Wvg::new(4, vec![2, 2, 1, 1, 1]).to_qobdd(&mgr);
        let view = MddView::new(&mgr, win, &[2, 3]);

        let mut models = view.models();
        models.sort();
        let expected: Vec<Vec<usize>> = {
            let mut res = Vec::new();
            for a in 0..=2 {
                for b in 0..=3 {
                    if 2 * a + b >= 4 {
                        res.push(vec![a, b]);
                    }
                }
            }
            res
        };
        assert_eq!(models, expected);
        assert_eq!(view.count_models(), BigUint::from(expected.len()));
        assert_eq!(view.num_types(), 2);
    }

    #[test]
    fn test_singleton_types_match_coalitions() {
        let mgr = Manager::new(3);
        let win = Wvg::new(3, vec![2, 1, 1]).to_qobdd(&mgr);
        let view = MddView::new(&mgr, win, &[1, 1, 1]);
        assert_eq!(view.count_models(), mgr.count_minterms(win));
        assert_eq!(view.size(), mgr.size(win));
    }

    #[test]
    #[should_panic(expected = "do not cover")]
    fn test_multiplicities_must_cover_players() {
        let mgr = Manager::new(3);
        MddView::new(&mgr, mgr.one(0), &[1, 1]);
    }
}
