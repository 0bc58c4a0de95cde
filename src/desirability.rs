//! The desirability relation of Isbell (1958).
//!
//! Player `i` is at least as desirable as player `j` if, for every coalition
//! `T` without both of them, `T + j` winning implies `T + i` winning. With
//! the view combinators this is a single inclusion test between
//! `{T : T + j ∈ W, i ∉ T}` and `{T : T + i ∈ W, j ∉ T}`, so no coalition is
//! ever enumerated.
//!
//! The relation is a preorder over the players (levels of the diagram).
//! [`Desirability`] evaluates it lazily through a [`Preorder`], after
//! consulting caller-supplied [`DesirabilityHints`] that may settle a pair
//! without touching the diagram.

use std::rc::Rc;

use log::debug;

use crate::error::Result;
use crate::manager::Manager;
use crate::manip::View;
use crate::preorder::Preorder;
use crate::reference::Ref;

/// Shortcuts known in advance, e.g. from the weights of a rule.
///
/// Every method answers "known" (`true`) or "don't know" (`false`). A wrong
/// `true` makes the relation wrong, so only sound facts may be reported.
pub trait DesirabilityHints {
    /// `i` is known not to be strictly more desirable than `j`.
    fn not_greater(&self, _i: usize, _j: usize) -> bool {
        false
    }

    /// `i` and `j` are known not to be equally desirable.
    fn not_equal(&self, _i: usize, _j: usize) -> bool {
        false
    }

    /// `i` and `j` are known to be equally desirable.
    fn equal(&self, _i: usize, _j: usize) -> bool {
        false
    }
}

/// No hints; every question goes to the diagram.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHints;

impl DesirabilityHints for NoHints {}

/// `{T : T + i ∈ W, j ∉ T}` as a view of `W`.
fn with_instead_of(i: usize, j: usize) -> View {
    View::ident().remove(i).without(j)
}

impl Manager {
    /// Whether player `i` is strictly less desirable than player `j` in the
    /// game with winning coalitions `win`.
    pub fn is_less_desirable(&self, win: Ref, i: usize, j: usize) -> bool {
        self.view_less(win, &with_instead_of(i, j), win, &with_instead_of(j, i))
    }

    /// Whether players `i` and `j` are equally desirable (symmetric).
    pub fn are_equally_desirable(&self, win: Ref, i: usize, j: usize) -> bool {
        i == j || self.view_equal(win, &with_instead_of(i, j), win, &with_instead_of(j, i))
    }
}

/// The "at least as desirable as" preorder of a game.
pub struct Desirability {
    preorder: Preorder<'static>,
}

impl Desirability {
    /// Builds the relation for the game with winning coalitions `win`.
    ///
    /// The classes of equally desirable players are computed right away;
    /// the strict order between classes is evaluated on demand.
    pub fn new(mgr: Rc<Manager>, win: Ref, hints: Rc<dyn DesirabilityHints>) -> Self {
        let n = mgr.num_vars();

        let equal = {
            let mgr = Rc::clone(&mgr);
            let hints = Rc::clone(&hints);
            move |i: usize, j: usize| {
                !hints.not_equal(i, j) && (hints.equal(i, j) || mgr.are_equally_desirable(win, i, j))
            }
        };
        let greater = move |i: usize, j: usize| !hints.not_greater(i, j) && mgr.is_less_desirable(win, j, i);

        let preorder = Preorder::new(n, greater, equal);
        debug!("desirability: {} players in {} classes", n, preorder.class_count());
        Self { preorder }
    }

    pub fn num_players(&self) -> usize {
        self.preorder.len()
    }

    /// Whether `i` is strictly more desirable than `j`.
    pub fn is_greater(&self, i: usize, j: usize) -> bool {
        self.preorder.is_greater(i, j)
    }

    pub fn is_greater_equal(&self, i: usize, j: usize) -> bool {
        self.preorder.is_greater_equal(i, j)
    }

    pub fn are_equal(&self, i: usize, j: usize) -> bool {
        self.preorder.are_equal(i, j)
    }

    /// Whether every two players are comparable, i.e. the game is complete.
    pub fn is_total(&self) -> bool {
        self.preorder.is_total()
    }

    /// Two incomparable players, if any.
    pub fn not_total_witness(&self) -> Option<(usize, usize)> {
        self.preorder.not_total_witness()
    }

    /// Players from most to least desirable.
    pub fn non_increasing_order(&self) -> Result<Vec<usize>> {
        self.preorder.non_increasing_order()
    }

    /// Players of the classes directly below the class of `i`.
    pub fn direct_successors(&self, i: usize) -> Vec<usize> {
        self.preorder.direct_successors(i)
    }

    /// Number of classes of equally desirable players (types).
    pub fn type_count(&self) -> usize {
        self.preorder.class_count()
    }

    /// The classes of equally desirable players, ordered by their smallest
    /// member.
    pub fn types(&self) -> &[Vec<usize>] {
        self.preorder.classes()
    }

    /// Number of players of every type, in the order of [`types`][Self::types].
    pub fn type_sizes(&self) -> Vec<usize> {
        self.types().iter().map(|c| c.len()).collect()
    }

    /// Index of the type of player `i`.
    pub fn type_of(&self, i: usize) -> usize {
        self.preorder.partition().class_index_of(i)
    }

    pub fn preorder(&self) -> &Preorder<'static> {
        &self.preorder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;

    use test_log::test;

    use crate::wvg::Wvg;

    fn game(quota: i64, weights: &[i64]) -> (Rc<Manager>, Ref) {
        let mgr = Rc::new(Manager::new(weights.len()));
        let win = Wvg::new(quota, weights.to_vec()).to_qobdd(&mgr);
        (mgr, win)
    }

    #[test]
    fn test_weighted_game_follows_weights() {
        let (mgr, win) = game(4, &[3, 2, 2, 1]);
        assert!(mgr.is_less_desirable(win, 1, 0));
        assert!(!mgr.is_less_desirable(win, 0, 1));
        assert!(mgr.are_equally_desirable(win, 1, 2));
        assert!(!mgr.are_equally_desirable(win, 0, 3));

        let d = Desirability::new(Rc::clone(&mgr), win, Rc::new(NoHints));
        assert!(d.is_total());
        assert_eq!(d.type_count(), 3);
        assert_eq!(d.types().to_vec(), vec![vec![0], vec![1, 2], vec![3]]);
        assert_eq!(d.type_sizes(), vec![1, 2, 1]);
        assert_eq!(d.non_increasing_order().unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(d.direct_successors(0), vec![1, 2]);
        assert!(d.is_greater(1, 3));
        assert!(d.is_greater_equal(2, 1));
    }

    #[test]
    fn test_dummy_is_least_desirable() {
        // Player 2 never matters.
        let (mgr, win) = game(2, &[1, 1, 0]);
        let d = Desirability::new(mgr, win, Rc::new(NoHints));
        assert!(d.is_greater(0, 2));
        assert!(d.are_equal(0, 1));
        assert_eq!(d.type_of(2), 1);
    }

    #[test]
    fn test_incomparable_players() {
        // Minimal winning coalitions {0,1} and {2,3}: 0 and 2 are incomparable.
        let mgr = Rc::new(Manager::new(4));
        let win = mgr.apply_or(
            Wvg::new(2, vec![1, 1, 0, 0]).to_qobdd(&mgr),
            Wvg::new(2, vec![0, 0, 1, 1]).to_qobdd(&mgr),
        );
        assert!(mgr.is_in(win, &[0, 1]) && mgr.is_in(win, &[2, 3]));
        assert!(!mgr.is_in(win, &[0, 2]));

        let d = Desirability::new(Rc::clone(&mgr), win, Rc::new(NoHints));
        assert!(!d.is_total());
        let (i, j) = d.not_total_witness().unwrap();
        assert!(!d.is_greater(i, j) && !d.is_greater(j, i));
        assert!(d.non_increasing_order().is_err());
        assert!(d.are_equal(0, 1));
    }

    struct CountingHints {
        calls: Cell<usize>,
    }

    impl DesirabilityHints for CountingHints {
        fn equal(&self, _i: usize, _j: usize) -> bool {
            self.calls.set(self.calls.get() + 1);
            true
        }
    }

    #[test]
    fn test_hints_short_circuit() {
        let (mgr, win) = game(2, &[1, 1, 1]);
        let hints = Rc::new(CountingHints { calls: Cell::new(0) });
        let d = Desirability::new(mgr, win, hints.clone());
        assert_eq!(d.type_count(), 1);
        assert!(hints.calls.get() > 0);
    }
}
