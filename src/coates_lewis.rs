//! The weight-finding heuristic of Coates and Lewis (1961).
//!
//! Every node of the diagram of a weighted game corresponds to an interval
//! of residual quotas, its *gap*. Going bottom-up, the weight of a level is
//! chosen so that it fits every node of the level: a node with children
//! gaps `gT` and `gE` admits the weights in `(lE - uT, uE - lT)`. If the
//! intersection of these ranges over a level is empty, the heuristic is
//! stuck and reports the level. It is exact on some classes of games and a
//! heuristic on others, so its results are always verified by the caller.

use std::collections::HashMap;

use log::debug;

use crate::manager::Manager;
use crate::reference::Ref;
use crate::wvg::Wvg;

/// A fractional weighted representation: the game is `{S : w(S) >= q}`
/// for every `q` with `quota.0 < q <= quota.1`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoatesLewis {
    pub weights: Vec<f64>,
    pub quota: (f64, f64),
}

/// No weight fits every node of `level`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoatesLewisFailure {
    pub level: usize,
    /// Weights found for the levels below `level`.
    pub weights: Vec<f64>,
}

#[derive(Debug, Clone, Copy)]
struct Gap {
    l: f64,
    u: f64,
}

impl Gap {
    fn len(&self) -> f64 {
        self.u - self.l
    }
}

impl Manager {
    /// Runs the heuristic on the winning coalitions of a directed game.
    pub fn coates_lewis(&self, win: Ref) -> Result<CoatesLewis, CoatesLewisFailure> {
        let n = self.num_vars();
        let levels = self.collect_nodes(win);

        let mut gaps: HashMap<Ref, Gap> = HashMap::new();
        gaps.insert(Ref::ONE, Gap { l: f64::NEG_INFINITY, u: 0.0 });
        gaps.insert(Ref::ZERO, Gap { l: 0.0, u: f64::INFINITY });

        let mut weights = vec![0.0; n];
        let mut first_non_dummy = true;

        for k in (0..n).rev() {
            let nodes = &levels[k];
            let children = |v: Ref| (gaps[&self.high(v)], gaps[&self.low(v)]);

            if nodes.iter().all(|&v| self.is_redundant(v)) {
                weights[k] = 0.0;
            } else {
                let mut lower = f64::NEG_INFINITY;
                let mut upper = f64::INFINITY;
                let mut gap_len = f64::INFINITY;

                for &v in nodes {
                    let (t, e) = children(v);
                    lower = lower.max(e.l - t.u);
                    upper = upper.min(e.u - t.l);
                    gap_len = gap_len.min(t.len().min(e.len()));
                }

                if upper <= lower {
                    debug!("coates_lewis: stuck at level {} (range ({}, {}))", k, lower, upper);
                    return Err(CoatesLewisFailure {
                        level: k,
                        weights: weights[k + 1..].to_vec(),
                    });
                }

                weights[k] = if first_non_dummy {
                    first_non_dummy = false;
                    1.0
                } else {
                    (lower + gap_len).min(0.5 * (upper + lower))
                };

                if !weights[k].is_finite() {
                    debug!("coates_lewis: unbounded weight at level {}", k);
                    return Err(CoatesLewisFailure {
                        level: k,
                        weights: weights[k + 1..].to_vec(),
                    });
                }
            }

            let w = weights[k];
            let level_gaps: Vec<(Ref, Gap)> = nodes
                .iter()
                .map(|&v| {
                    let (t, e) = children(v);
                    (
                        v,
                        Gap {
                            l: (t.l + w).max(e.l),
                            u: (t.u + w).min(e.u),
                        },
                    )
                })
                .collect();
            gaps.extend(level_gaps);
        }

        let root = gaps[&win];
        debug!("coates_lewis: weights = {:?}, quota in ({}, {}]", weights, root.l, root.u);
        Ok(CoatesLewis {
            weights,
            quota: (root.l, root.u),
        })
    }
}

impl CoatesLewis {
    /// Picks a quota and scales everything to integers.
    ///
    /// All numbers produced by the heuristic are dyadic, so a power of two
    /// suffices. Returns `None` if no such scaling fits into `i64`.
    pub fn to_wvg(&self) -> Option<Wvg> {
        let (l, u) = self.quota;
        let quota = if u.is_finite() {
            u
        } else if l.is_finite() {
            l + 1.0
        } else {
            return None;
        };

        let values: Vec<f64> = std::iter::once(quota).chain(self.weights.iter().copied()).collect();
        let mut scale = 1.0;
        while values.iter().any(|x| (x * scale).fract() != 0.0) {
            scale *= 2.0;
            if scale > 2f64.powi(52) {
                return None;
            }
        }

        let to_int = |x: f64| {
            let y = x * scale;
            if y.abs() < 2f64.powi(62) {
                Some(y as i64)
            } else {
                None
            }
        };

        let quota = to_int(quota)?;
        let weights = self.weights.iter().map(|&w| to_int(w)).collect::<Option<Vec<i64>>>()?;
        Some(Wvg::new(quota, weights))
    }
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
    fn test_majority() {
        let (mgr, win) = game(2, &[1, 1, 1]);
        let cl = mgr.coates_lewis(win).unwrap();
        assert_eq!(cl.weights, vec![1.0, 1.0, 1.0]);
        assert_eq!(cl.quota, (1.0, 2.0));
        assert_eq!(cl.to_wvg(), Some(Wvg::new(2, vec![1, 1, 1])));
    }

    #[test]
    fn test_representation_is_equivalent() {
        for (quota, weights) in [
            (4, vec![3, 2, 1, 1, 1]),
            (7, vec![5, 3, 3, 2, 1]),
            (5, vec![3, 2, 2, 1]),
            (3, vec![2, 1, 1, 0]),
        ] {
            let (mgr, win) = game(quota, &weights);
            let wvg = mgr.coates_lewis(win).unwrap().to_wvg().unwrap();
            assert_eq!(wvg.to_qobdd(&mgr), win, "{} for [{}; {:?}]", wvg, quota, weights);
        }
    }

    #[test]
    fn test_dummy_gets_zero_weight() {
        let (mgr, win) = game(3, &[2, 1, 1, 0]);
        let cl = mgr.coates_lewis(win).unwrap();
        assert_eq!(cl.weights[3], 0.0);
    }

    #[test]
    fn test_fails_on_non_weighted_game() {
        // Minimal winning coalitions {0,1} and {2,3}.
        let mgr = Manager::new(4);
        let win = mgr.apply_or(
            Wvg::new(2, vec![1, 1, 0, 0]).to_qobdd(&mgr),
            Wvg::new(2, vec![0, 0, 1, 1]).to_qobdd(&mgr),
        );
        let failure = mgr.coates_lewis(win).unwrap_err();
        assert!(failure.level < 4);
        assert_eq!(failure.weights.len(), 3 - failure.level);
    }
}
