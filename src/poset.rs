//! Lazily completed strict partial orders.
//!
//! A [`Poset`] asks its predicate about a pair only the first time the pair
//! is queried. Every answer is recorded in a ternary matrix together with
//! its transitive consequences, so later queries may be answered without
//! calling the predicate at all.

use std::cell::{OnceCell, RefCell};

use log::debug;

use crate::error::{Error, Result};

/// Outcome of the totality check.
#[derive(Debug, Clone)]
struct Totality {
    order: Vec<usize>,
    witness: Option<(usize, usize)>,
}

/// A strict partial order over `0..n`.
pub struct Poset<'a> {
    n: usize,
    greater: Box<dyn Fn(usize, usize) -> bool + 'a>,
    /// `matrix[i * n + j]` is `Some(true)` if `i > j` is known.
    matrix: RefCell<Vec<Option<bool>>>,
    totality: OnceCell<Totality>,
}

impl<'a> Poset<'a> {
    /// `greater(i, j)` decides whether `i` is strictly greater than `j`.
    pub fn new(n: usize, greater: impl Fn(usize, usize) -> bool + 'a) -> Self {
        let mut matrix = vec![None; n * n];
        for i in 0..n {
            matrix[i * n + i] = Some(false);
        }
        Self {
            n,
            greater: Box::new(greater),
            matrix: RefCell::new(matrix),
            totality: OnceCell::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Whether `i > j`. The predicate is consulted at most once per pair.
    pub fn is_greater(&self, i: usize, j: usize) -> bool {
        if let Some(known) = self.matrix.borrow()[i * self.n + j] {
            return known;
        }
        let res = (self.greater)(i, j);
        self.set_greater(i, j, res);
        res
    }

    /// Records the fact `i > j` (or its negation) and closes the matrix
    /// under transitivity.
    fn set_greater(&self, i: usize, j: usize, res: bool) {
        let n = self.n;
        let mut m = self.matrix.borrow_mut();

        if !res {
            m[i * n + j] = Some(false);
            return;
        }

        // Everything above i (and i itself) is above everything below j.
        let above: Vec<usize> = (0..n).filter(|&x| x == i || m[x * n + i] == Some(true)).collect();
        let below: Vec<usize> = (0..n).filter(|&y| y == j || m[j * n + y] == Some(true)).collect();
        for &x in &above {
            for &y in &below {
                m[x * n + y] = Some(true);
                m[y * n + x] = Some(false);
            }
        }
    }

    fn totality(&self) -> &Totality {
        self.totality.get_or_init(|| {
            let mut order: Vec<usize> = (0..self.n).collect();
            merge_sort(&mut order, &|a, b| self.is_greater(a, b));

            let gap = order
                .windows(2)
                .find(|w| !self.is_greater(w[0], w[1]))
                .map(|w| (w[0], w[1]));

            let witness = gap.map(|(a, b)| {
                if !self.is_greater(b, a) {
                    (a, b)
                } else {
                    // The sort can leave comparable elements adjacent when
                    // the order is not total; find a truly incomparable pair.
                    self.find_incomparable().unwrap_or((a, b))
                }
            });

            debug!("poset: order = {:?}, witness = {:?}", order, witness);
            Totality { order, witness }
        })
    }

    fn find_incomparable(&self) -> Option<(usize, usize)> {
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                if !self.is_greater(i, j) && !self.is_greater(j, i) {
                    return Some((i, j));
                }
            }
        }
        None
    }

    /// Whether every two distinct elements are comparable.
    pub fn is_total(&self) -> bool {
        self.totality().witness.is_none()
    }

    /// Two incomparable elements, if the order is not total.
    pub fn not_total_witness(&self) -> Option<(usize, usize)> {
        self.totality().witness
    }

    /// All elements from greatest to smallest.
    pub fn decreasing_order(&self) -> Result<Vec<usize>> {
        let t = self.totality();
        if t.witness.is_some() {
            return Err(Error::NotTotal);
        }
        Ok(t.order.clone())
    }

    /// Elements directly below `i`: `i > j` with nothing strictly between.
    pub fn direct_successors(&self, i: usize) -> Vec<usize> {
        let below: Vec<usize> = (0..self.n).filter(|&j| self.is_greater(i, j)).collect();
        below
            .iter()
            .copied()
            .filter(|&j| !below.iter().any(|&k| k != j && self.is_greater(k, j)))
            .collect()
    }
}

/// Stable merge sort into decreasing order under a partial order.
///
/// The right element is taken first only if it is strictly greater than the
/// left one.
fn merge_sort(items: &mut [usize], greater: &dyn Fn(usize, usize) -> bool) {
    if items.len() <= 1 {
        return;
    }
    let mid = items.len() / 2;
    merge_sort(&mut items[..mid], greater);
    merge_sort(&mut items[mid..], greater);

    let left = items[..mid].to_vec();
    let right = items[mid..].to_vec();
    let (mut l, mut r) = (0, 0);
    for slot in items.iter_mut() {
        let take_right = l == left.len() || (r < right.len() && greater(right[r], left[l]));
        if take_right {
            *slot = right[r];
            r += 1;
        } else {
            *slot = left[l];
            l += 1;
        }
    }
}
