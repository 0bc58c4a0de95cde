//! Power indices.
//!
//! Shapley-Shubik and Deegan-Packel need, for every player `i`, the number
//! of coalitions of each size in which `i` matters. Both are obtained from
//! two passes over the diagram:
//!
//! - top-down, the number of paths from the root to every node, split by
//!   the number of then-edges taken (the players above that are in);
//! - bottom-up, the number of coalitions below every node, split by size.
//!
//! A node `v` of level `i` then contributes `paths(v)[a] * below(t)[b]` to
//! the coalitions of size `a + b + 1` containing `i`, where `t` is the
//! then-child. For swings, `below(t)` is replaced by `below(t) - below(e)`.
//!
//! All counts are exact. Indices are returned as `f64`, one per level.

use std::collections::HashMap;

use num_bigint::{BigInt, BigUint};
use num_traits::{One, ToPrimitive, Zero};

use crate::error::{Error, Result};
use crate::manager::Manager;
use crate::reference::Ref;

/// Converts `num / den` to the nearest `f64` without overflowing on huge
/// operands.
pub(crate) fn ratio_to_f64(num: &BigInt, den: &BigInt) -> f64 {
    if den.is_zero() {
        return 0.0;
    }
    let shift = num.bits().max(den.bits()).saturating_sub(62);
    let n = (num >> shift).to_f64().unwrap_or(0.0);
    let d = (den >> shift).to_f64().unwrap_or(1.0);
    if d == 0.0 {
        0.0
    } else {
        n / d
    }
}

fn factorial(k: usize) -> BigInt {
    (1..=k).fold(BigInt::one(), |acc, x| acc * x)
}

/// Path and coalition counts by size for every node of a diagram.
struct SizeProfiles {
    n: usize,
    levels: Vec<Vec<Ref>>,
    /// `paths[v][a]`: paths from the root to `v` taking `a` then-edges.
    paths: HashMap<Ref, Vec<BigInt>>,
    /// `below[v][b]`: coalitions of size `b` in the family of `v`.
    below: HashMap<Ref, Vec<BigInt>>,
}

impl SizeProfiles {
    fn new(mgr: &Manager, root: Ref) -> Self {
        let n = mgr.num_vars();
        let levels = mgr.collect_nodes(root);

        let mut paths: HashMap<Ref, Vec<BigInt>> = HashMap::new();
        paths.insert(root, vec![BigInt::one()]);
        for (level, nodes) in levels.iter().enumerate().take(n) {
            for &v in nodes {
                let p = paths.get(&v).cloned().unwrap_or_else(|| vec![BigInt::zero(); level + 1]);
                let t = paths.entry(mgr.high(v)).or_insert_with(|| vec![BigInt::zero(); level + 2]);
                for (a, c) in p.iter().enumerate() {
                    t[a + 1] += c;
                }
                let e = paths.entry(mgr.low(v)).or_insert_with(|| vec![BigInt::zero(); level + 2]);
                for (a, c) in p.iter().enumerate() {
                    e[a] += c;
                }
            }
        }

        let mut below: HashMap<Ref, Vec<BigInt>> = HashMap::new();
        below.insert(Ref::ZERO, vec![BigInt::zero()]);
        below.insert(Ref::ONE, vec![BigInt::one()]);
        for level in (0..n).rev() {
            let m = n - level;
            for &v in &levels[level] {
                let t = &below[&mgr.high(v)];
                let e = &below[&mgr.low(v)];
                let mut res = vec![BigInt::zero(); m + 1];
                for k in 0..m {
                    res[k] += &e[k];
                    res[k + 1] += &t[k];
                }
                below.insert(v, res);
            }
        }

        Self {
            n,
            levels,
            paths,
            below,
        }
    }

    /// Number of coalitions of the root family.
    fn total(&self, root: Ref) -> BigInt {
        self.below[&root].iter().sum()
    }

    /// For the player at `level`, combines the paths into every node of the
    /// level with the vector `edge(v)` over the coalitions below.
    fn by_size(&self, level: usize, edge: impl Fn(Ref) -> Vec<BigInt>) -> Vec<BigInt> {
        let mut res = vec![BigInt::zero(); self.n + 1];
        for &v in &self.levels[level] {
            let Some(paths) = self.paths.get(&v) else {
                continue;
            };
            let below = edge(v);
            for (a, p) in paths.iter().enumerate() {
                if p.is_zero() {
                    continue;
                }
                for (b, c) in below.iter().enumerate() {
                    if !c.is_zero() {
                        res[a + b + 1] += p * c;
                    }
                }
            }
        }
        res
    }

    /// `d[s]`: coalitions of size `s` in which the player at `level` is a
    /// swing.
    fn swings(&self, mgr: &Manager, level: usize) -> Vec<BigInt> {
        self.by_size(level, |v| {
            let t = &self.below[&mgr.high(v)];
            let e = &self.below[&mgr.low(v)];
            t.iter().zip(e).map(|(x, y)| x - y).collect()
        })
    }

    /// Coalitions of each size containing the player at `level`.
    fn containing(&self, mgr: &Manager, level: usize) -> Vec<BigInt> {
        self.by_size(level, |v| self.below[&mgr.high(v)].clone())
    }
}

fn normalize(values: Vec<f64>) -> Vec<f64> {
    let sum: f64 = values.iter().sum();
    if sum == 0.0 {
        return vec![0.0; values.len()];
    }
    values.into_iter().map(|x| x / sum).collect()
}

fn normalize_counts(counts: &[BigInt]) -> Vec<f64> {
    let sum: BigInt = counts.iter().sum();
    counts.iter().map(|c| ratio_to_f64(c, &sum)).collect()
}

/// Shapley-Shubik index of every player of the game `win`.
///
/// `ss_i = sum_s d_i[s] (s-1)! (n-s)! / n!`. Fails if the empty coalition
/// is winning.
pub fn shapley_shubik(mgr: &Manager, win: Ref) -> Result<Vec<f64>> {
    if mgr.is_in(win, &[]) {
        return Err(Error::EmptyCoalitionWinning);
    }
    let n = mgr.num_vars();
    let profiles = SizeProfiles::new(mgr, win);
    let n_fact = factorial(n);
    let coefficients: Vec<BigInt> = (0..=n)
        .map(|s| if s == 0 { BigInt::zero() } else { factorial(s - 1) * factorial(n - s) })
        .collect();

    Ok((0..n)
        .map(|i| {
            let d = profiles.swings(mgr, i);
            let num: BigInt = d.iter().zip(&coefficients).map(|(x, c)| x * c).sum();
            ratio_to_f64(&num, &n_fact)
        })
        .collect())
}

/// Number of swings of every player: winning coalitions that lose when the
/// player leaves.
pub fn swing_counts(mgr: &Manager, win: Ref) -> Vec<BigUint> {
    let profiles = SizeProfiles::new(mgr, win);
    (0..mgr.num_vars())
        .map(|i| {
            let total: BigInt = profiles.swings(mgr, i).iter().sum();
            total.to_biguint().unwrap_or_default()
        })
        .collect()
}

/// Absolute Banzhaf index: `swings_i / 2^(n-1)`.
pub fn banzhaf_absolute(mgr: &Manager, win: Ref) -> Vec<f64> {
    let n = mgr.num_vars();
    let den = BigInt::one() << n.saturating_sub(1);
    swing_counts(mgr, win)
        .into_iter()
        .map(|s| ratio_to_f64(&BigInt::from(s), &den))
        .collect()
}

/// Normalized Banzhaf index: swings divided by the total number of swings.
pub fn banzhaf_normalized(mgr: &Manager, win: Ref) -> Vec<f64> {
    let counts: Vec<BigInt> = swing_counts(mgr, win).into_iter().map(BigInt::from).collect();
    normalize_counts(&counts)
}

/// Deegan-Packel index from the minimal winning coalitions `min_win`.
///
/// Every minimal winning coalition is equally likely and shares its power
/// equally among its members.
pub fn deegan_packel(mgr: &Manager, min_win: Ref) -> Result<Vec<f64>> {
    if mgr.is_in(min_win, &[]) {
        return Err(Error::EmptyCoalitionWinning);
    }
    let profiles = SizeProfiles::new(mgr, min_win);
    let total = profiles.total(min_win);
    if total.is_zero() {
        return Ok(vec![0.0; mgr.num_vars()]);
    }

    Ok((0..mgr.num_vars())
        .map(|i| {
            profiles
                .containing(mgr, i)
                .iter()
                .enumerate()
                .skip(1)
                .map(|(s, c)| ratio_to_f64(c, &(&total * s)))
                .sum()
        })
        .collect())
}

/// Absolute Holler-Packel index: the share of minimal winning coalitions
/// containing the player.
pub fn holler_packel_absolute(mgr: &Manager, min_win: Ref) -> Vec<f64> {
    let total = BigInt::from(mgr.count_minterms(min_win));
    mgr.count_minterms_containing(min_win)
        .into_iter()
        .map(|c| ratio_to_f64(&BigInt::from(c), &total))
        .collect()
}

/// Normalized Holler-Packel index.
pub fn holler_packel_normalized(mgr: &Manager, min_win: Ref) -> Vec<f64> {
    normalize(holler_packel_absolute(mgr, min_win))
}

/// Shift power index from the shift-minimal winning coalitions.
pub fn shift_power(mgr: &Manager, shift_min_win: Ref) -> Vec<f64> {
    let counts: Vec<BigInt> = mgr
        .count_minterms_containing(shift_min_win)
        .into_iter()
        .map(BigInt::from)
        .collect();
    normalize_counts(&counts)
}
