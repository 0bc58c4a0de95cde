//! Homogeneity test for directed games.
//!
//! A weighted game is homogeneous if it has a representation in which every
//! minimal winning coalition has weight exactly the quota. Following
//! Sudhölter (1989), a directed game is homogeneous iff a sequence of
//! coalitions `S_0, .., S_{n0}` built from the lexicographically largest
//! minimal winning coalition yields, through a linear recurrence, weights
//! that represent the game. Each step of the sequence replaces player `k`
//! either by a range of weaker players that keeps the coalition minimal
//! winning (`k` is a *sum*) or, if no such range exists, by the whole tail
//! of non-dummy players (`k` is a *step*).
//!
//! The diagram is used directly in place of the list of minimal winning
//! coalitions. The players are levels, ordered by non-increasing
//! desirability, and the dummy players are the last levels.

use std::fmt;

use log::debug;

use crate::coalition::Coalition;
use crate::manager::Manager;
use crate::reference::Ref;
use crate::wvg::Wvg;

/// The player cannot be replaced by a range of weaker players.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotASum;

/// The game has no homogeneous representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotHomogeneous;

impl fmt::Display for NotHomogeneous {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "the simple game is not homogeneous")
    }
}

/// A homogeneous representation together with its construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaturalRepresentation {
    pub wvg: Wvg,
    /// Players that could be replaced by a range of weaker players.
    pub sums: Vec<usize>,
    /// Players that could not.
    pub steps: Vec<usize>,
}

impl Manager {
    /// The lexicographically largest minimal winning coalition of a
    /// directed game: take then-edges until the rest does not matter.
    pub fn first_s(&self, win: Ref) -> Coalition {
        let mut s = Coalition::empty(self.num_vars() + 1);
        let mut v = win;
        while !v.is_terminal() && !self.is_redundant(v) {
            s.add(self.level(v));
            v = self.high(v);
        }
        s
    }

    /// Replaces player `k` of the minimal winning coalition `s` by a range
    /// of weaker players, if the result is again minimal winning.
    ///
    /// `last` is the weakest player of `s`; every player of `k..=last` must
    /// be in `s`. The walk follows `s` above `k`, drops `k`, and then takes
    /// every remaining player; the last level that mattered on the way
    /// bounds the range that has to be added.
    pub fn rho(&self, win: Ref, s: &Coalition, last: usize, k: usize) -> Result<Coalition, NotASum> {
        let n = self.num_vars();
        let mut v = win;
        for i in 0..k {
            v = if s.contains(i) { self.high(v) } else { self.low(v) };
        }
        v = self.low(v);

        let mut bound = None;
        for i in (k + 1)..n {
            if !self.is_redundant(v) {
                bound = Some(i);
            }
            v = self.high(v);
        }

        if !self.is_one(v) {
            return Err(NotASum);
        }

        let mut t = s.clone();
        t.remove(k);
        if let Some(bound) = bound {
            if last < bound {
                t.add_range(last + 1, bound);
            }
        }
        Ok(t)
    }

    /// Computes the natural representation of a directed game with
    /// `num_dummies` dummy players, or fails if the game is not homogeneous.
    pub fn homogeneous_measure(&self, win: Ref, num_dummies: usize) -> Result<NaturalRepresentation, NotHomogeneous> {
        let n = self.num_vars();
        let n0 = n.saturating_sub(num_dummies);
        if n0 < 1 {
            debug!("homogeneous_measure: no non-dummy player");
            return Err(NotHomogeneous);
        }

        let mut sums = Vec::new();
        let mut steps = Vec::new();

        let first = self.first_s(win);
        let mut lens = vec![first.max()];
        let mut coalitions = vec![first];
        let mut omega = vec![0];

        for k in 0..n0 {
            let i0 = omega[k];
            let last = lens[i0].ok_or(NotHomogeneous)?;

            let next = match self.rho(win, &coalitions[i0], last, k) {
                Ok(t) => {
                    sums.push(k);
                    t
                }
                Err(NotASum) => {
                    let mut t = coalitions[i0].clone();
                    t.remove(k);
                    if last < n0 {
                        t.add_range(last + 1, n0);
                    }
                    steps.push(k);
                    t
                }
            };

            lens.push(next.max());
            coalitions.push(next);
            omega.push(compute_omega(&lens, k + 1).ok_or(NotHomogeneous)?);
        }

        // Weights from the recurrence, with an auxiliary step player n0.
        let mut m = vec![0i64; n0 + 1];
        m[n0] = 1;
        for k in (0..n0).rev() {
            let mut w = 0;
            for i in (k + 1)..=n0 {
                if coalitions[k + 1].contains(i) {
                    w += m[i];
                }
                if coalitions[omega[k]].contains(i) {
                    w -= m[i];
                }
            }
            m[k] = w;
        }

        let quota = coalitions[0].weight(&m);
        let mut weights = m[..n0].to_vec();
        weights.resize(n, 0);

        if weights.iter().any(|&w| w < 0) {
            debug!("homogeneous_measure: negative weight in {:?}", weights);
            return Err(NotHomogeneous);
        }

        let wvg = Wvg::new(quota, weights);
        if wvg.to_qobdd(self) != win {
            debug!("homogeneous_measure: {} does not represent the game", wvg);
            return Err(NotHomogeneous);
        }

        debug!("homogeneous_measure: {} (sums = {:?}, steps = {:?})", wvg, sums, steps);
        Ok(NaturalRepresentation { wvg, sums, steps })
    }
}

/// Among `lens[0..=k]`, the index of the shortest coalition that still
/// reaches player `k`.
fn compute_omega(lens: &[Option<usize>], k: usize) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (j, len) in lens.iter().enumerate().take(k + 1) {
        if let Some(len) = *len {
            if k <= len && best.map_or(true, |(_, b)| len < b) {
                best = Some((j, len));
            }
        }
    }
    best.map(|(j, _)| j)
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    fn game(quota: i64, weights: &[i64]) -> (Manager, Ref) {
        let mgr = Manager::new(weights.len());
        let win = Wvg::new(quota, weights.to_vec()).to_qobdd(&mgr);
        (mgr, win)
    }

    #[test]
    fn test_first_s() {
        let (mgr, win) = game(4, &[3, 2, 1, 1]);
        let s = mgr.first_s(win);
        assert_eq!(s.players().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(s.len(), 5);
    }

    #[test]
    fn test_rho() {
        // [3; 2, 1, 1]: in {0, 1}, player 1 can be replaced by 2.
        let (mgr, win) = game(3, &[2, 1, 1]);
        let s = Coalition::from_players(4, [0, 1]);

        let t = mgr.rho(win, &s, 1, 1).unwrap();
        assert_eq!(t.players().collect::<Vec<_>>(), vec![0, 2]);

        // Without 0 the best left is {1, 2}, which does not reach the quota.
        assert_eq!(mgr.rho(win, &s, 1, 0), Err(NotASum));
    }

    #[test]
    fn test_compute_omega() {
        let lens = [Some(3), Some(2), Some(4), None];
        assert_eq!(compute_omega(&lens, 0), Some(0));
        assert_eq!(compute_omega(&lens, 1), Some(1));
        assert_eq!(compute_omega(&lens, 2), Some(1));
        assert_eq!(compute_omega(&lens, 3), Some(0));
        assert_eq!(compute_omega(&[Some(1), None], 1), Some(0));
        assert_eq!(compute_omega(&[Some(1), None], 2), None);
    }

    #[test]
    fn test_majority_is_homogeneous() {
        let (mgr, win) = game(2, &[1, 1, 1]);
        let nat = mgr.homogeneous_measure(win, 0).unwrap();
        assert_eq!(nat.wvg, Wvg::new(2, vec![1, 1, 1]));
        assert_eq!(nat.wvg.to_qobdd(&mgr), win);
        assert_eq!(nat.sums.len() + nat.steps.len(), 3);
    }

    #[test]
    fn test_homogeneous_with_dummy() {
        // [4; 2, 2, 1, 1, 0]: every minimal winning coalition weighs 4.
        let (mgr, win) = game(4, &[2, 2, 1, 1, 0]);
        let nat = mgr.homogeneous_measure(win, 1).unwrap();
        assert_eq!(nat.wvg.to_qobdd(&mgr), win);
        assert_eq!(nat.wvg.weights[4], 0);
    }

    #[test]
    fn test_not_homogeneous() {
        // [4; 3, 2, 2, 1]: {0,1} and {0,3} are minimal winning, so a
        // homogeneous representation would give 1 and 3 the same weight,
        // but 1 is strictly more desirable than 3.
        let (mgr, win) = game(4, &[3, 2, 2, 1]);
        assert_eq!(mgr.homogeneous_measure(win, 0), Err(NotHomogeneous));
    }

    #[test]
    fn test_only_dummies() {
        let mgr = Manager::new(2);
        assert_eq!(mgr.homogeneous_measure(mgr.one(0), 2), Err(NotHomogeneous));
    }
}
