//! Weighted voting games and their diagrams.
//!
//! A weighted voting game `[q; w_0, .., w_{n-1}]` has the winning
//! coalitions `{S : w(S) >= q}`. Its diagram is built top-down from the
//! residual quota: the node at level `i` for a residual quota `x` is the
//! family of coalitions of players `i..n` with weight at least `x`. Many
//! residual quotas lead to the same node, and the set of such quotas is
//! always an interval `(lb, ub]`. The [`ThresholdCache`] remembers these
//! intervals per level, so the construction visits every node once.

use std::collections::BTreeMap;
use std::fmt;

use log::debug;

use crate::coalition::Coalition;
use crate::manager::Manager;
use crate::reference::Ref;

/// A weighted voting game `[quota; weights]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wvg {
    pub quota: i64,
    pub weights: Vec<i64>,
}

impl Wvg {
    pub fn new(quota: i64, weights: Vec<i64>) -> Self {
        Self { quota, weights }
    }

    pub fn num_players(&self) -> usize {
        self.weights.len()
    }

    pub fn total_weight(&self) -> i64 {
        self.weights.iter().sum()
    }

    pub fn is_winning(&self, coalition: &Coalition) -> bool {
        coalition.weight(&self.weights) >= self.quota
    }

    /// Builds the diagram of the winning coalitions.
    ///
    /// The number of players must match the manager. Weights must not be
    /// negative.
    pub fn to_qobdd(&self, mgr: &Manager) -> Ref {
        assert_eq!(
            self.weights.len(),
            mgr.num_vars(),
            "Game has {} players, manager has {}",
            self.weights.len(),
            mgr.num_vars()
        );
        assert!(self.weights.iter().all(|&w| w >= 0), "Negative weight in {}", self);

        let mut builder = ThresholdBuilder::new(mgr, &self.weights);
        let (root, _, _) = builder.build(0, self.quota);
        debug!("to_qobdd({}) = {} with {} cached intervals", self, root, builder.cache.len());
        root
    }
}

impl fmt::Display for Wvg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{};", self.quota)?;
        for (i, w) in self.weights.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, " {}", w)?;
        }
        write!(f, "]")
    }
}

/// Per-level map from residual-quota intervals `(lb, ub]` to nodes.
///
/// Intervals of one level are disjoint, so they are keyed by their upper
/// bound and a lookup for `x` inspects the first interval with `ub >= x`.
#[derive(Debug, Default)]
pub struct ThresholdCache {
    levels: Vec<BTreeMap<i64, (i64, Ref)>>,
}

impl ThresholdCache {
    pub fn new(num_levels: usize) -> Self {
        Self {
            levels: vec![BTreeMap::new(); num_levels],
        }
    }

    /// The node for residual quota `x` at `level`, with its interval.
    pub fn lookup(&self, level: usize, x: i64) -> Option<(Ref, i64, i64)> {
        let (&ub, &(lb, node)) = self.levels[level].range(x..).next()?;
        if lb < x {
            Some((node, lb, ub))
        } else {
            None
        }
    }

    /// Records that every residual quota in `(lb, ub]` yields `node`.
    pub fn insert(&mut self, level: usize, lb: i64, ub: i64, node: Ref) {
        debug_assert!(lb < ub, "Empty interval ({}, {}]", lb, ub);
        self.levels[level].insert(ub, (lb, node));
    }

    /// Total number of intervals over all levels.
    pub fn len(&self) -> usize {
        self.levels.iter().map(|m| m.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct ThresholdBuilder<'a> {
    mgr: &'a Manager,
    weights: &'a [i64],
    /// `rest[i]` is the total weight of players `i..n`.
    rest: Vec<i64>,
    cache: ThresholdCache,
}

impl<'a> ThresholdBuilder<'a> {
    fn new(mgr: &'a Manager, weights: &'a [i64]) -> Self {
        let n = weights.len();
        let mut rest = vec![0i64; n + 1];
        for i in (0..n).rev() {
            rest[i] = rest[i + 1].saturating_add(weights[i]);
        }
        Self {
            mgr,
            weights,
            rest,
            cache: ThresholdCache::new(n),
        }
    }

    /// Returns the node for residual quota `x` at `level` together with the
    /// interval `(lb, ub]` of residual quotas that yield the same node.
    fn build(&mut self, level: usize, x: i64) -> (Ref, i64, i64) {
        // Everything wins.
        if x <= 0 {
            return (self.mgr.one(level), i64::MIN, 0);
        }
        // Nothing wins.
        if x > self.rest[level] {
            return (self.mgr.zero(level), self.rest[level], i64::MAX);
        }
        if let Some(hit) = self.cache.lookup(level, x) {
            return hit;
        }

        let w = self.weights[level];
        let (t, lt, ut) = self.build(level + 1, x - w);
        let (e, le, ue) = self.build(level + 1, x);
        let node = self.mgr.mk_node(level, t, e);

        let lb = lt.saturating_add(w).max(le);
        let ub = ut.saturating_add(w).min(ue);
        self.cache.insert(level, lb, ub, node);
        (node, lb, ub)
    }
}
