//! View combinators over diagrams.
//!
//! A [`View`] changes what the then- and else-edges of a node look like
//! during a traversal, without creating any node. Each combinator is tied to
//! a single player and only fires on nodes at that player's level; every
//! other node is passed on to the wrapped view. Since every path of a
//! quasi-reduced diagram visits every level, a chain of combinators is
//! correct whatever the order in which it was composed.
//!
//! | Combinator  | then-edge at level `i`     | else-edge at level `i` | Family            |
//! |-------------|----------------------------|------------------------|-------------------|
//! | `Without(i)`| `zero(i+1)`                | unchanged              | `{S : i ∉ S}`     |
//! | `With(i)`   | unchanged                  | `zero(i+1)`            | `{S : i ∈ S}`     |
//! | `Remove(i)` | `zero(i+1)`                | then-child             | `{S−i : i ∈ S}`   |
//! | `Add(i)`    | else-child                 | `zero(i+1)`            | `{S+i : i ∉ S}`   |
//! | `Not`       | terminals exchanged        | terminals exchanged    | complement        |
//! | `Compl`     | else-child                 | then-child             | `{N−S}`           |
//!
//! Views are consumed by synchronized traversals over pairs of nodes
//! ([`Manager::view_leq`], [`Manager::view_equal`]) or materialized into real
//! diagrams ([`Manager::view_and`], [`Manager::view_minus`],
//! [`Manager::materialize`]).

use std::collections::HashMap;

use log::debug;

use crate::manager::Manager;
use crate::reference::Ref;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Ident,
    Without(usize, Box<View>),
    With(usize, Box<View>),
    Remove(usize, Box<View>),
    Add(usize, Box<View>),
    Not(Box<View>),
    Compl(Box<View>),
}

impl View {
    pub fn ident() -> Self {
        View::Ident
    }

    pub fn without(self, player: usize) -> Self {
        self.check_fresh(player);
        View::Without(player, Box::new(self))
    }

    pub fn with(self, player: usize) -> Self {
        self.check_fresh(player);
        View::With(player, Box::new(self))
    }

    pub fn remove(self, player: usize) -> Self {
        self.check_fresh(player);
        View::Remove(player, Box::new(self))
    }

    pub fn add(self, player: usize) -> Self {
        self.check_fresh(player);
        View::Add(player, Box::new(self))
    }

    pub fn not(self) -> Self {
        View::Not(Box::new(self))
    }

    pub fn compl(self) -> Self {
        View::Compl(Box::new(self))
    }

    fn check_fresh(&self, player: usize) {
        assert!(
            !self.names(player),
            "Player {} is already intercepted by this view",
            player
        );
    }

    /// Whether some combinator of the chain is tied to `player`.
    pub fn names(&self, player: usize) -> bool {
        match self {
            View::Ident => false,
            View::Without(i, next) | View::With(i, next) | View::Remove(i, next) | View::Add(i, next) => {
                *i == player || next.names(player)
            }
            View::Not(next) | View::Compl(next) => next.names(player),
        }
    }

    /// Whether the view complements the family, i.e. contains an odd number
    /// of `Not` combinators.
    pub fn is_negated(&self) -> bool {
        match self {
            View::Ident => false,
            View::Not(next) => !next.is_negated(),
            View::Without(_, next)
            | View::With(_, next)
            | View::Remove(_, next)
            | View::Add(_, next)
            | View::Compl(next) => next.is_negated(),
        }
    }

    /// The view of a terminal root, for diagrams over zero players.
    pub fn terminal(&self, node: Ref) -> Ref {
        if self.is_negated() {
            exchange(node)
        } else {
            node
        }
    }

    /// Then-edge of `node` as seen through the view.
    pub fn high(&self, mgr: &Manager, node: Ref) -> Ref {
        match self {
            View::Ident => mgr.high(node),
            View::Without(i, next) => {
                let level = mgr.level(node);
                if level == *i {
                    mgr.zero(level + 1)
                } else {
                    next.high(mgr, node)
                }
            }
            View::With(_, next) => next.high(mgr, node),
            View::Remove(i, next) => {
                let level = mgr.level(node);
                if level == *i {
                    mgr.zero(level + 1)
                } else {
                    next.high(mgr, node)
                }
            }
            View::Add(i, next) => {
                if mgr.level(node) == *i {
                    next.low(mgr, node)
                } else {
                    next.high(mgr, node)
                }
            }
            View::Not(next) => exchange(next.high(mgr, node)),
            View::Compl(next) => next.low(mgr, node),
        }
    }

    /// Else-edge of `node` as seen through the view.
    pub fn low(&self, mgr: &Manager, node: Ref) -> Ref {
        match self {
            View::Ident => mgr.low(node),
            View::Without(_, next) => next.low(mgr, node),
            View::With(i, next) => {
                let level = mgr.level(node);
                if level == *i {
                    mgr.zero(level + 1)
                } else {
                    next.low(mgr, node)
                }
            }
            View::Remove(i, next) => {
                if mgr.level(node) == *i {
                    next.high(mgr, node)
                } else {
                    next.low(mgr, node)
                }
            }
            View::Add(i, next) => {
                let level = mgr.level(node);
                if level == *i {
                    mgr.zero(level + 1)
                } else {
                    next.low(mgr, node)
                }
            }
            View::Not(next) => exchange(next.low(mgr, node)),
            View::Compl(next) => next.high(mgr, node),
        }
    }
}

fn exchange(node: Ref) -> Ref {
    match node {
        Ref::ZERO => Ref::ONE,
        Ref::ONE => Ref::ZERO,
        other => other,
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Relation {
    Leq,
    Equal,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum SetOp {
    And,
    Minus,
}

impl Manager {
    /// Whether the family of `u` seen through `a` is a subset of the family
    /// of `v` seen through `b`. Both roots must be at the same level.
    pub fn view_leq(&self, u: Ref, a: &View, v: Ref, b: &View) -> bool {
        debug!("view_leq(u = {}, v = {})", u, v);
        self.compare(u, a, v, b, Relation::Leq)
    }

    /// Whether the two viewed families are equal.
    pub fn view_equal(&self, u: Ref, a: &View, v: Ref, b: &View) -> bool {
        debug!("view_equal(u = {}, v = {})", u, v);
        self.compare(u, a, v, b, Relation::Equal)
    }

    /// Whether the first viewed family is a proper subset of the second.
    pub fn view_less(&self, u: Ref, a: &View, v: Ref, b: &View) -> bool {
        self.view_leq(u, a, v, b) && !self.view_equal(u, a, v, b)
    }

    /// Materializes the intersection of two viewed families.
    pub fn view_and(&self, u: Ref, a: &View, v: Ref, b: &View) -> Ref {
        debug!("view_and(u = {}, v = {})", u, v);
        self.combine(u, a, v, b, SetOp::And)
    }

    /// Materializes the difference of two viewed families.
    pub fn view_minus(&self, u: Ref, a: &View, v: Ref, b: &View) -> Ref {
        debug!("view_minus(u = {}, v = {})", u, v);
        self.combine(u, a, v, b, SetOp::Minus)
    }

    /// Builds the diagram of the family of `root` seen through `view`.
    pub fn materialize(&self, root: Ref, view: &View) -> Ref {
        debug!("materialize(root = {}, view = {:?})", root, view);
        if root.is_terminal() {
            return view.terminal(root);
        }
        let mut cache = HashMap::new();
        self._materialize(root, view, &mut cache)
    }

    fn _materialize(&self, node: Ref, view: &View, cache: &mut HashMap<Ref, Ref>) -> Ref {
        if node.is_terminal() {
            return node;
        }
        if let Some(&res) = cache.get(&node) {
            return res;
        }
        let level = self.level(node);
        let high = self._materialize(view.high(self, node), view, cache);
        let low = self._materialize(view.low(self, node), view, cache);
        let res = self.mk_node(level, high, low);
        cache.insert(node, res);
        res
    }

    fn compare(&self, u: Ref, a: &View, v: Ref, b: &View, rel: Relation) -> bool {
        assert_eq!(self.level(u), self.level(v), "Level mismatch in view comparison");
        if u.is_terminal() {
            return terminal_relation(a.terminal(u), b.terminal(v), rel);
        }
        let mut cache = HashMap::new();
        self._compare(u, a, v, b, rel, &mut cache)
    }

    fn _compare(
        &self,
        u: Ref,
        a: &View,
        v: Ref,
        b: &View,
        rel: Relation,
        cache: &mut HashMap<(Ref, Ref), bool>,
    ) -> bool {
        if u.is_terminal() {
            return terminal_relation(u, v, rel);
        }
        if let Some(&res) = cache.get(&(u, v)) {
            return res;
        }
        let res = self._compare(a.high(self, u), a, b.high(self, v), b, rel, cache)
            && self._compare(a.low(self, u), a, b.low(self, v), b, rel, cache);
        cache.insert((u, v), res);
        res
    }

    fn combine(&self, u: Ref, a: &View, v: Ref, b: &View, op: SetOp) -> Ref {
        assert_eq!(self.level(u), self.level(v), "Level mismatch in view combination");
        if u.is_terminal() {
            return terminal_op(a.terminal(u), b.terminal(v), op);
        }
        let mut cache = HashMap::new();
        self._combine(u, a, v, b, op, &mut cache)
    }

    fn _combine(
        &self,
        u: Ref,
        a: &View,
        v: Ref,
        b: &View,
        op: SetOp,
        cache: &mut HashMap<(Ref, Ref), Ref>,
    ) -> Ref {
        if u.is_terminal() {
            return terminal_op(u, v, op);
        }
        if let Some(&res) = cache.get(&(u, v)) {
            return res;
        }
        let level = self.level(u);
        let high = self._combine(a.high(self, u), a, b.high(self, v), b, op, cache);
        let low = self._combine(a.low(self, u), a, b.low(self, v), b, op, cache);
        let res = self.mk_node(level, high, low);
        cache.insert((u, v), res);
        res
    }
}

fn terminal_relation(u: Ref, v: Ref, rel: Relation) -> bool {
    match rel {
        Relation::Leq => u == Ref::ZERO || v == Ref::ONE,
        Relation::Equal => u == v,
    }
}

fn terminal_op(u: Ref, v: Ref, op: SetOp) -> Ref {
    let res = match op {
        SetOp::And => u == Ref::ONE && v == Ref::ONE,
        SetOp::Minus => u == Ref::ONE && v == Ref::ZERO,
    };
    if res {
        Ref::ONE
    } else {
        Ref::ZERO
    }
}
