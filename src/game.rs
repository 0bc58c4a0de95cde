//! Simple games: players, rules, and everything derived from them.
//!
//! A [`SimpleGame`] is configured first (player classes, rules, join formula,
//! player order) and analyzed afterwards. The first query creates the
//! [`Manager`] and freezes the configuration. Every derived diagram, verdict
//! and index is computed at most once and cached for the lifetime of the
//! game; registered [observers][GameObserver] hear about each of them the
//! first time it becomes available.
//!
//! Players are addressed by level, i.e. by their position in the player
//! order. Level `i` holds the player `pi[i]` of the declaration order.
//!
//! # Example
//!
//! ```
//! use simple_games::game::SimpleGame;
//!
//! let game = SimpleGame::weighted(2, &[1, 1, 1]).unwrap();
//! assert_eq!(game.is_weighted().unwrap(), Some(true));
//! assert_eq!(game.is_homogeneous().unwrap(), Some(true));
//! assert_eq!(game.count(simple_games::game::Family::MinimalWinning).unwrap(), 3u32.into());
//! ```

use std::borrow::Cow;
use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::rc::Rc;

use log::debug;
use num_bigint::BigUint;

use crate::coalition::Coalition;
use crate::desirability::Desirability;
use crate::error::{Error, Result};
use crate::formula::Formula;
use crate::homogeneous::{NaturalRepresentation, NotHomogeneous};
use crate::manager::Manager;
use crate::manip::View;
use crate::mdd::MddView;
use crate::partition::is_consecutive;
use crate::paths::Coalitions;
use crate::power;
use crate::reference::Ref;
use crate::rule::{PlayerClass, RuleWvg, WeightHints};
use crate::trade::Trade;
use crate::wvg::Wvg;

/// Families of coalitions derived from the winning coalitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Winning,
    MinimalWinning,
    ShiftMinimalWinning,
    Blocking,
    Losing,
    MaximalLosing,
    ShiftMaximalLosing,
}

impl Family {
    pub const ALL: [Family; 7] = [
        Family::Winning,
        Family::MinimalWinning,
        Family::ShiftMinimalWinning,
        Family::Blocking,
        Family::Losing,
        Family::MaximalLosing,
        Family::ShiftMaximalLosing,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Family::Winning => "winning",
            Family::MinimalWinning => "minimal winning",
            Family::ShiftMinimalWinning => "shift-minimal winning",
            Family::Blocking => "blocking",
            Family::Losing => "losing",
            Family::MaximalLosing => "maximal losing",
            Family::ShiftMaximalLosing => "shift-maximal losing",
        };
        write!(f, "{}", name)
    }
}

/// Everything a [`SimpleGame`] computes and caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Diagram(Family),
    Count(Family),
    Models(Family),
    ModelCount(Family),
    Desirability,
    Complete,
    Directed,
    Consecutive,
    Homogeneous,
    Weighted,
    Proper,
    Strong,
    Decisive,
    Dummies,
    Vetoers,
    Banzhaf,
    ShapleyShubik,
    HollerPackel,
    DeeganPackel,
    ShiftPower,
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Diagram(family) => write!(f, "{} coalitions", family),
            Property::Count(family) => write!(f, "number of {} coalitions", family),
            Property::Models(family) => write!(f, "{} models", family),
            Property::ModelCount(family) => write!(f, "number of {} models", family),
            Property::Desirability => write!(f, "desirability relation"),
            Property::Complete => write!(f, "completeness"),
            Property::Directed => write!(f, "directedness"),
            Property::Consecutive => write!(f, "consecutiveness"),
            Property::Homogeneous => write!(f, "homogeneity"),
            Property::Weighted => write!(f, "weightedness"),
            Property::Proper => write!(f, "properness"),
            Property::Strong => write!(f, "strongness"),
            Property::Decisive => write!(f, "decisiveness"),
            Property::Dummies => write!(f, "dummy players"),
            Property::Vetoers => write!(f, "veto players"),
            Property::Banzhaf => write!(f, "Banzhaf index"),
            Property::ShapleyShubik => write!(f, "Shapley-Shubik index"),
            Property::HollerPackel => write!(f, "Holler-Packel index"),
            Property::DeeganPackel => write!(f, "Deegan-Packel index"),
            Property::ShiftPower => write!(f, "shift power index"),
        }
    }
}

/// Callback for properties as they become available.
pub trait GameObserver {
    fn on_property(&mut self, property: Property);
}

impl<F: FnMut(Property)> GameObserver for F {
    fn on_property(&mut self, property: Property) {
        self(property)
    }
}

/// Players `i` and `j` are incomparable: `s` wins and contains `i` but not
/// `j`, `t` wins and contains `j` but not `i`, and both `s - i + j` and
/// `t - j + i` lose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotCompleteWitness {
    pub i: usize,
    pub j: usize,
    pub s: Vec<usize>,
    pub t: Vec<usize>,
}

enum Slot<T> {
    Unknown,
    Computing,
    Cached(T),
}

struct Lazy<T> {
    slot: RefCell<Slot<T>>,
}

impl<T> Default for Lazy<T> {
    fn default() -> Self {
        Self {
            slot: RefCell::new(Slot::Unknown),
        }
    }
}

impl<T> Lazy<T> {
    fn is_cached(&self) -> bool {
        matches!(*self.slot.borrow(), Slot::Cached(_))
    }
}

#[derive(Clone)]
enum Homogeneity {
    /// The game is not directed, so the test does not apply.
    Unknown,
    Homogeneous(Rc<NaturalRepresentation>),
    NotHomogeneous,
}

#[derive(Clone)]
enum Weightedness {
    Unknown,
    Weighted(Rc<Wvg>),
    NotWeighted(Rc<Trade>),
}

#[derive(Default)]
struct Memo {
    diagrams: [Lazy<Ref>; 7],
    counts: [Lazy<BigUint>; 7],
    models: [Lazy<Rc<Vec<Vec<usize>>>>; 7],
    model_counts: [Lazy<BigUint>; 7],
    alad: Lazy<Rc<Desirability>>,
    complete: Lazy<bool>,
    directed: Lazy<bool>,
    consecutive: Lazy<bool>,
    homogeneous: Lazy<Homogeneity>,
    weighted: Lazy<Weightedness>,
    proper: Lazy<bool>,
    strong: Lazy<bool>,
    decisive: Lazy<bool>,
    dummies: Lazy<Rc<Vec<usize>>>,
    vetoers: Lazy<Rc<Vec<usize>>>,
    banzhaf: Lazy<Rc<(Vec<f64>, Vec<f64>)>>,
    shapley_shubik: Lazy<Rc<Vec<f64>>>,
    holler_packel: Lazy<Rc<(Vec<f64>, Vec<f64>)>>,
    deegan_packel: Lazy<Rc<Vec<f64>>>,
    shift_power: Lazy<Rc<Vec<f64>>>,
}

#[derive(Default)]
struct Witnesses {
    not_complete: OnceCell<NotCompleteWitness>,
    not_proper: OnceCell<Vec<usize>>,
    not_strong: OnceCell<Vec<usize>>,
}

pub struct SimpleGame {
    classes: Vec<PlayerClass>,
    num_players: usize,
    rules: Vec<RuleWvg>,
    join: Option<Formula>,
    pi: Option<Vec<usize>>,
    max_nodes: Option<usize>,
    mgr: OnceCell<Rc<Manager>>,
    observers: RefCell<Vec<Box<dyn GameObserver>>>,
    memo: Memo,
    witnesses: Witnesses,
}

impl Default for SimpleGame {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Configuration
// ============================================================================

impl SimpleGame {
    pub fn new() -> Self {
        Self {
            classes: Vec::new(),
            num_players: 0,
            rules: Vec::new(),
            join: None,
            pi: None,
            max_nodes: None,
            mgr: OnceCell::new(),
            observers: RefCell::new(Vec::new()),
            memo: Memo::default(),
            witnesses: Witnesses::default(),
        }
    }

    /// The weighted voting game `[quota; weights]`, one class per player.
    pub fn weighted(quota: i64, weights: &[i64]) -> Result<Self> {
        let mut game = Self::new();
        let classes = weights
            .iter()
            .map(|_| game.add_player_class(1, None))
            .collect::<Result<Vec<_>>>()?;
        let rule = game.create_rule(None)?;
        rule.set_quota(quota)?;
        for (class, &w) in classes.iter().zip(weights) {
            rule.set_weight_for_class(class, w)?;
        }
        Ok(game)
    }

    fn is_analyzed(&self) -> bool {
        self.mgr.get().is_some()
    }

    /// Adds `size` interchangeable players.
    pub fn add_player_class(&mut self, size: usize, name: Option<&str>) -> Result<PlayerClass> {
        if !self.rules.is_empty() || self.pi.is_some() || self.is_analyzed() {
            return Err(Error::PlayersFrozen);
        }
        let class = PlayerClass {
            id: self.classes.len(),
            name: name.map(str::to_string),
            size,
        };
        self.num_players += size;
        self.classes.push(class.clone());
        Ok(class)
    }

    /// Creates a weighted rule with all weights and the quota set to zero.
    /// Unnamed rules are named by their 1-based position.
    pub fn create_rule(&mut self, name: Option<&str>) -> Result<&mut RuleWvg> {
        if self.join.is_some() || self.is_analyzed() {
            return Err(Error::RulesFrozen);
        }
        let name = match name {
            Some(name) => name.to_string(),
            None => (self.rules.len() + 1).to_string(),
        };
        let rule = RuleWvg::new(name, self.classes.len());
        let index = match self.rules.iter().position(|r| r.name() == rule.name()) {
            Some(index) => {
                self.rules[index] = rule;
                index
            }
            None => {
                self.rules.push(rule);
                self.rules.len() - 1
            }
        };
        Ok(&mut self.rules[index])
    }

    pub fn rule(&self, name: &str) -> Result<&RuleWvg> {
        self.rules
            .iter()
            .find(|r| r.name() == name)
            .ok_or_else(|| Error::UnknownRule { name: name.to_string() })
    }

    pub fn rule_mut(&mut self, name: &str) -> Result<&mut RuleWvg> {
        self.rules
            .iter_mut()
            .find(|r| r.name() == name)
            .ok_or_else(|| Error::UnknownRule { name: name.to_string() })
    }

    pub fn rules(&self) -> &[RuleWvg] {
        &self.rules
    }

    /// Sets the formula combining the rules. No rule can be added afterwards.
    pub fn set_join(&mut self, formula: Formula) -> Result<()> {
        if self.is_analyzed() {
            return Err(Error::RulesFrozen);
        }
        for name in formula.vars() {
            self.rule(name)?;
        }
        self.join = Some(formula);
        Ok(())
    }

    /// The join formula; by default the conjunction of all rules in creation
    /// order.
    pub fn join(&self) -> Result<Formula> {
        match &self.join {
            Some(formula) => Ok(formula.clone()),
            None => Formula::and_all(self.rules.iter().map(|r| r.name().to_string())).ok_or(Error::EmptyJoin),
        }
    }

    /// Places player `pi[i]` of the declaration order at level `i`.
    pub fn set_player_order(&mut self, pi: Vec<usize>) -> Result<()> {
        if self.is_analyzed() {
            return Err(Error::PlayersFrozen);
        }
        let n = self.num_players;
        let mut seen = vec![false; n];
        for &p in &pi {
            if p >= n || seen[p] {
                return Err(Error::InvalidPlayerOrder { num_players: n });
            }
            seen[p] = true;
        }
        if pi.len() != n {
            return Err(Error::InvalidPlayerOrder { num_players: n });
        }
        self.pi = Some(pi);
        Ok(())
    }

    pub fn player_order(&self) -> Cow<'_, [usize]> {
        match &self.pi {
            Some(pi) => Cow::Borrowed(pi),
            None => Cow::Owned((0..self.num_players).collect()),
        }
    }

    /// Soft limit on the number of nodes, reported when exceeded while
    /// building the diagrams of the rules.
    pub fn set_max_nodes(&mut self, limit: usize) {
        self.max_nodes = Some(limit);
    }

    pub fn register_observer(&self, observer: Box<dyn GameObserver>) {
        self.observers.borrow_mut().push(observer);
    }

    pub fn num_players(&self) -> usize {
        self.num_players
    }

    pub fn player_classes(&self) -> &[PlayerClass] {
        &self.classes
    }

    /// The class of the player at `level`.
    pub fn class_of_player(&self, level: usize) -> Result<&PlayerClass> {
        self.check_player(level)?;
        let p = self.player_order()[level];
        let mut first = 0;
        for class in &self.classes {
            if p < first + class.size {
                return Ok(class);
            }
            first += class.size;
        }
        Err(Error::PlayerOutOfRange {
            player: level,
            num_players: self.num_players,
        })
    }

    /// Class name of every player, by level.
    pub fn player_names(&self) -> Result<Vec<String>> {
        (0..self.num_players)
            .map(|i| self.class_of_player(i).map(PlayerClass::display_name))
            .collect()
    }

    fn check_player(&self, player: usize) -> Result<()> {
        if player >= self.num_players {
            return Err(Error::PlayerOutOfRange {
                player,
                num_players: self.num_players,
            });
        }
        Ok(())
    }

    /// The manager of the game. Creating it freezes the configuration.
    pub fn manager(&self) -> &Rc<Manager> {
        self.mgr.get_or_init(|| {
            debug!("creating manager for {} players", self.num_players);
            Rc::new(Manager::new(self.num_players))
        })
    }
}

// ============================================================================
// Memoization
// ============================================================================

impl SimpleGame {
    fn memoize<T: Clone>(&self, lazy: &Lazy<T>, property: Property, compute: impl FnOnce() -> Result<T>) -> Result<T> {
        match &*lazy.slot.borrow() {
            Slot::Cached(value) => return Ok(value.clone()),
            Slot::Computing => return Err(Error::ReentrantComputation { property }),
            Slot::Unknown => {}
        }

        *lazy.slot.borrow_mut() = Slot::Computing;
        match compute() {
            Ok(value) => {
                *lazy.slot.borrow_mut() = Slot::Cached(value.clone());
                debug!("computed {}", property);
                self.notify(property);
                Ok(value)
            }
            Err(e) => {
                *lazy.slot.borrow_mut() = Slot::Unknown;
                Err(e)
            }
        }
    }

    fn notify(&self, property: Property) {
        for observer in self.observers.borrow_mut().iter_mut() {
            observer.on_property(property);
        }
    }

    fn weight_hints(&self) -> WeightHints {
        let pi = self.player_order();
        let weights = self
            .rules
            .iter()
            .map(|rule| rule.to_wvg(&self.classes, &pi).weights)
            .collect();
        let class_of = (0..self.num_players)
            .map(|i| self.class_of_player(i).map(|c| c.id).unwrap_or(usize::MAX))
            .collect();
        WeightHints::new(weights, class_of)
    }
}

// ============================================================================
// Families of coalitions
// ============================================================================

impl SimpleGame {
    /// The diagram of a family, computed on first request.
    pub fn diagram(&self, family: Family) -> Result<Ref> {
        self.memoize(&self.memo.diagrams[family.index()], Property::Diagram(family), || {
            self.compute_diagram(family)
        })
    }

    pub fn winning(&self) -> Result<Ref> {
        self.diagram(Family::Winning)
    }

    pub fn minimal_winning(&self) -> Result<Ref> {
        self.diagram(Family::MinimalWinning)
    }

    pub fn shift_minimal_winning(&self) -> Result<Ref> {
        self.diagram(Family::ShiftMinimalWinning)
    }

    pub fn blocking(&self) -> Result<Ref> {
        self.diagram(Family::Blocking)
    }

    pub fn losing(&self) -> Result<Ref> {
        self.diagram(Family::Losing)
    }

    pub fn maximal_losing(&self) -> Result<Ref> {
        self.diagram(Family::MaximalLosing)
    }

    pub fn shift_maximal_losing(&self) -> Result<Ref> {
        self.diagram(Family::ShiftMaximalLosing)
    }

    /// Whether the cheaper algorithms for directed games apply. Completeness
    /// is not computed just for this.
    fn use_directed(&self) -> Result<bool> {
        Ok(self.memo.complete.is_cached() && self.is_directed()?)
    }

    fn compute_diagram(&self, family: Family) -> Result<Ref> {
        if family == Family::Winning {
            return self.compute_winning();
        }
        let win = self.winning()?;
        let mgr = self.manager();
        let res = match family {
            Family::Winning => win,
            Family::MinimalWinning => {
                if self.use_directed()? {
                    mgr.min_win_directed(win)
                } else {
                    mgr.min_win(win)
                }
            }
            Family::ShiftMinimalWinning => {
                let min_win = self.minimal_winning()?;
                // Every minimal winning coalition of a homogeneous game is
                // shift-minimal.
                if self.is_homogeneous()? == Some(true) {
                    min_win
                } else {
                    mgr.shift_min_win(win, min_win, &*self.alad()?)
                }
            }
            Family::Blocking => mgr.blocking(win),
            Family::Losing => mgr.losing(win),
            Family::MaximalLosing => {
                if self.use_directed()? {
                    mgr.max_losing_directed(win)
                } else {
                    mgr.max_losing(win)
                }
            }
            Family::ShiftMaximalLosing => {
                let max_losing = self.maximal_losing()?;
                mgr.shift_max_losing(win, max_losing, &*self.alad()?)
            }
        };
        Ok(res)
    }

    fn compute_winning(&self) -> Result<Ref> {
        let join = self.join()?;
        let mgr = self.manager();
        let pi = self.player_order();
        join.fold(
            &mut |name| {
                let rule = self.rule(name)?;
                Ok(rule.qobdd(mgr, &self.classes, &pi, self.max_nodes))
            },
            &mut |a, b| mgr.apply_and(a, b),
            &mut |a, b| mgr.apply_or(a, b),
        )
    }

    /// Number of coalitions of a family.
    pub fn count(&self, family: Family) -> Result<BigUint> {
        self.memoize(&self.memo.counts[family.index()], Property::Count(family), || {
            Ok(self.manager().count_minterms(self.diagram(family)?))
        })
    }

    /// Iterator over the coalitions of a family, as sorted levels.
    pub fn coalitions(&self, family: Family) -> Result<Coalitions<'_>> {
        let root = self.diagram(family)?;
        Ok(self.manager().enumerate_sets(root))
    }

    fn type_view(&self, family: Family) -> Result<MddView<'_>> {
        if !self.is_consecutive()? {
            return Err(Error::NotConsecutive);
        }
        let root = self.diagram(family)?;
        let sizes = self.alad()?.type_sizes();
        Ok(MddView::new(self.manager(), root, &sizes))
    }

    /// Models of a family: per type of players, how many of them are in.
    /// Requires every type to occupy consecutive levels.
    pub fn models(&self, family: Family) -> Result<Rc<Vec<Vec<usize>>>> {
        self.memoize(&self.memo.models[family.index()], Property::Models(family), || {
            Ok(Rc::new(self.type_view(family)?.models()))
        })
    }

    pub fn model_count(&self, family: Family) -> Result<BigUint> {
        self.memoize(&self.memo.model_counts[family.index()], Property::ModelCount(family), || {
            Ok(self.type_view(family)?.count_models())
        })
    }

    /// Calls `f` for every model of a family without storing them.
    pub fn enumerate_models(&self, family: Family, f: impl FnMut(&[usize])) -> Result<()> {
        self.type_view(family)?.enumerate_models(f);
        Ok(())
    }
}

// ============================================================================
// Properties
// ============================================================================

impl SimpleGame {
    /// The "at least as desirable as" relation.
    pub fn alad(&self) -> Result<Rc<Desirability>> {
        self.memoize(&self.memo.alad, Property::Desirability, || {
            let win = self.winning()?;
            let hints = self.weight_hints();
            Ok(Rc::new(Desirability::new(Rc::clone(self.manager()), win, Rc::new(hints))))
        })
    }

    /// Whether the desirability relation is total.
    pub fn is_complete(&self) -> Result<bool> {
        self.memoize(&self.memo.complete, Property::Complete, || {
            let res = self.alad()?.is_total();
            debug!("complete: {}", res);
            Ok(res)
        })
    }

    /// Same as [`is_complete`][Self::is_complete].
    pub fn is_swap_robust(&self) -> Result<bool> {
        self.is_complete()
    }

    pub fn not_complete_witness(&self) -> Result<NotCompleteWitness> {
        let no_witness = Error::NoWitness {
            property: Property::Complete,
        };
        if self.is_complete()? {
            return Err(no_witness);
        }
        if let Some(w) = self.witnesses.not_complete.get() {
            return Ok(w.clone());
        }

        let mgr = self.manager();
        let win = self.winning()?;
        let (i, j) = self.alad()?.not_total_witness().ok_or(no_witness.clone())?;

        let x = View::ident().remove(i).without(j);
        let y = View::ident().remove(j).without(i);

        // j ∉ S - i, S wins, S - i + j loses.
        let mut s = mgr.any_set(mgr.view_minus(win, &x, win, &y)).ok_or(no_witness.clone())?;
        s.push(i);
        s.sort_unstable();
        // i ∉ T - j, T wins, T - j + i loses.
        let mut t = mgr.any_set(mgr.view_minus(win, &y, win, &x)).ok_or(no_witness)?;
        t.push(j);
        t.sort_unstable();

        let w = NotCompleteWitness { i, j, s, t };
        debug!("not complete: {:?}", w);
        Ok(self.witnesses.not_complete.get_or_init(|| w).clone())
    }

    /// Whether the game is complete and the levels are already ordered by
    /// non-increasing desirability.
    pub fn is_directed(&self) -> Result<bool> {
        self.memoize(&self.memo.directed, Property::Directed, || {
            if !self.is_complete()? {
                return Ok(false);
            }
            let order = self.alad()?.non_increasing_order()?;
            let res = order.windows(2).all(|w| w[0] < w[1]);
            debug!("directed: {} (order {:?})", res, order);
            Ok(res)
        })
    }

    /// Whether every class of equally desirable players occupies
    /// consecutive levels.
    pub fn is_consecutive(&self) -> Result<bool> {
        self.memoize(&self.memo.consecutive, Property::Consecutive, || {
            Ok(is_consecutive(self.alad()?.types()))
        })
    }

    fn homogeneity(&self) -> Result<Homogeneity> {
        self.memoize(&self.memo.homogeneous, Property::Homogeneous, || {
            if !self.is_directed()? {
                return Ok(Homogeneity::Unknown);
            }
            let mgr = self.manager();
            let win = self.winning()?;
            let n = self.num_players;

            // A directed homogeneous game has at most (n^2 + 5n) / 2 nodes.
            if mgr.size(win) > (n * n + 5 * n) / 2 {
                debug!("homogeneous: false ({} nodes)", mgr.size(win));
                return Ok(Homogeneity::NotHomogeneous);
            }
            let num_dummies = self.dummies()?.len();
            match mgr.homogeneous_measure(win, num_dummies) {
                Ok(nat) => Ok(Homogeneity::Homogeneous(Rc::new(nat))),
                Err(NotHomogeneous) => {
                    debug!("homogeneous: false");
                    Ok(Homogeneity::NotHomogeneous)
                }
            }
        })
    }

    /// Whether the game has a weighted representation in which every
    /// minimal winning coalition weighs exactly the quota. `None` if the
    /// game is not directed.
    pub fn is_homogeneous(&self) -> Result<Option<bool>> {
        Ok(match self.homogeneity()? {
            Homogeneity::Unknown => None,
            Homogeneity::Homogeneous(_) => Some(true),
            Homogeneity::NotHomogeneous => Some(false),
        })
    }

    /// The natural representation of a homogeneous game.
    pub fn natural_representation(&self) -> Result<Option<Rc<NaturalRepresentation>>> {
        Ok(match self.homogeneity()? {
            Homogeneity::Homogeneous(nat) => Some(nat),
            _ => None,
        })
    }

    pub fn sums(&self) -> Result<Option<Vec<usize>>> {
        Ok(self.natural_representation()?.map(|nat| nat.sums.clone()))
    }

    pub fn steps(&self) -> Result<Option<Vec<usize>>> {
        Ok(self.natural_representation()?.map(|nat| nat.steps.clone()))
    }

    fn weightedness(&self) -> Result<Weightedness> {
        self.memoize(&self.memo.weighted, Property::Weighted, || self.compute_weightedness())
    }

    fn compute_weightedness(&self) -> Result<Weightedness> {
        if let [rule] = self.rules.as_slice() {
            let wvg = rule.to_wvg(&self.classes, &self.player_order());
            debug!("weighted: single rule {}", wvg);
            return Ok(Weightedness::Weighted(Rc::new(wvg)));
        }

        if let Some(nat) = self.natural_representation()? {
            debug!("weighted: homogeneous {}", nat.wvg);
            return Ok(Weightedness::Weighted(Rc::new(nat.wvg.clone())));
        }

        let n = self.num_players;
        let coalition = |players: &[usize]| Coalition::from_players(n, players.iter().copied());

        if !self.is_complete()? {
            let w = self.not_complete_witness()?;
            let mut trade = Trade::new(vec![coalition(&w.s), coalition(&w.t)]);
            trade.exchange(&[w.i], 0, &[w.j], 1);
            debug!("weighted: false (not complete)");
            return Ok(Weightedness::NotWeighted(Rc::new(trade)));
        }

        let mgr = self.manager();
        let win = self.winning()?;

        if let Some(trade) = self.incomparable_levels_trade(win) {
            debug!("weighted: false (levels not totally ordered)");
            return Ok(Weightedness::NotWeighted(Rc::new(trade)));
        }

        if self.is_directed()? {
            match mgr.coates_lewis(win) {
                Ok(cl) => {
                    if let Some(wvg) = cl.to_wvg() {
                        if wvg.weights.iter().all(|&w| w >= 0) && wvg.to_qobdd(mgr) == win {
                            debug!("weighted: Coates-Lewis found {}", wvg);
                            return Ok(Weightedness::Weighted(Rc::new(wvg)));
                        }
                    }
                }
                Err(failure) => debug!("weighted: Coates-Lewis stuck at level {}", failure.level),
            }
        }

        debug!("weighted: unknown");
        Ok(Weightedness::Unknown)
    }

    /// Two nodes `u`, `v` of a level that do not include each other give a
    /// trade: the prefixes to `u` and `v` swap their remainders.
    fn incomparable_levels_trade(&self, win: Ref) -> Option<Trade> {
        let mgr = self.manager();
        let (u, v) = mgr.incomparable_pair(win)?;

        let up = mgr.any_set(mgr.apply_minus(u, v))?;
        let vp = mgr.any_set(mgr.apply_minus(v, u))?;

        let mut s = mgr.path_to(win, u)?;
        s.extend(&up);
        let mut t = mgr.path_to(win, v)?;
        t.extend(&vp);

        let diff1: Vec<usize> = up.iter().copied().filter(|p| !vp.contains(p)).collect();
        let diff2: Vec<usize> = vp.iter().copied().filter(|p| !up.contains(p)).collect();

        let n = self.num_players;
        let mut trade = Trade::new(vec![
            Coalition::from_players(n, s),
            Coalition::from_players(n, t),
        ]);
        trade.exchange(&diff1, 0, &diff2, 1);
        Some(trade)
    }

    /// `Some(true)` if a weighted representation is known, `Some(false)` if
    /// a trade proves that there is none, `None` if neither was found.
    pub fn is_weighted(&self) -> Result<Option<bool>> {
        Ok(match self.weightedness()? {
            Weightedness::Unknown => None,
            Weightedness::Weighted(_) => Some(true),
            Weightedness::NotWeighted(_) => Some(false),
        })
    }

    /// A weighted representation over the levels, if one is known.
    pub fn weighted_representation(&self) -> Result<Option<Rc<Wvg>>> {
        Ok(match self.weightedness()? {
            Weightedness::Weighted(wvg) => Some(wvg),
            _ => None,
        })
    }

    pub fn weights(&self) -> Result<Option<Vec<i64>>> {
        Ok(self.weighted_representation()?.map(|wvg| wvg.weights.clone()))
    }

    pub fn not_weighted_witness(&self) -> Result<Rc<Trade>> {
        match self.weightedness()? {
            Weightedness::NotWeighted(trade) => Ok(trade),
            _ => Err(Error::NoWitness {
                property: Property::Weighted,
            }),
        }
    }

    /// Whether the complement of every winning coalition loses.
    pub fn is_proper(&self) -> Result<bool> {
        self.memoize(&self.memo.proper, Property::Proper, || {
            let win = self.winning()?;
            // W ⊆ blocking
            let res = self
                .manager()
                .view_leq(win, &View::ident(), win, &View::ident().not().compl());
            debug!("proper: {}", res);
            Ok(res)
        })
    }

    /// A winning coalition whose complement wins as well.
    pub fn not_proper_witness(&self) -> Result<Vec<usize>> {
        let no_witness = Error::NoWitness {
            property: Property::Proper,
        };
        if self.is_proper()? {
            return Err(no_witness);
        }
        if let Some(w) = self.witnesses.not_proper.get() {
            return Ok(w.clone());
        }
        let mgr = self.manager();
        let win = self.winning()?;
        let w = mgr
            .any_set(mgr.view_and(win, &View::ident(), win, &View::ident().compl()))
            .ok_or(no_witness)?;
        Ok(self.witnesses.not_proper.get_or_init(|| w).clone())
    }

    /// Whether the complement of every losing coalition wins.
    pub fn is_strong(&self) -> Result<bool> {
        self.memoize(&self.memo.strong, Property::Strong, || {
            let win = self.winning()?;
            // blocking ⊆ W
            let res = self
                .manager()
                .view_leq(win, &View::ident().not().compl(), win, &View::ident());
            debug!("strong: {}", res);
            Ok(res)
        })
    }

    /// A losing coalition whose complement loses as well.
    pub fn not_strong_witness(&self) -> Result<Vec<usize>> {
        let no_witness = Error::NoWitness {
            property: Property::Strong,
        };
        if self.is_strong()? {
            return Err(no_witness);
        }
        if let Some(w) = self.witnesses.not_strong.get() {
            return Ok(w.clone());
        }
        let mgr = self.manager();
        let win = self.winning()?;
        let w = mgr
            .any_set(mgr.view_and(win, &View::ident().not().compl(), win, &View::ident().not()))
            .ok_or(no_witness)?;
        Ok(self.witnesses.not_strong.get_or_init(|| w).clone())
    }

    /// Proper and strong.
    pub fn is_decisive(&self) -> Result<bool> {
        self.memoize(&self.memo.decisive, Property::Decisive, || {
            Ok(self.is_proper()? && self.is_strong()?)
        })
    }

    /// Players in no minimal winning coalition, by level.
    pub fn dummies(&self) -> Result<Rc<Vec<usize>>> {
        self.memoize(&self.memo.dummies, Property::Dummies, || {
            let support = self.manager().support(self.winning()?);
            Ok(Rc::new(self.complement_coalition(&support)))
        })
    }

    pub fn is_dummy(&self, player: usize) -> Result<bool> {
        self.check_player(player)?;
        Ok(self.dummies()?.contains(&player))
    }

    /// Players in every winning coalition, by level.
    pub fn vetoers(&self) -> Result<Rc<Vec<usize>>> {
        self.memoize(&self.memo.vetoers, Property::Vetoers, || {
            let mgr = self.manager();
            let levels = mgr.collect_nodes(self.winning()?);
            // Without player i nothing wins: every else-edge of level i
            // leads to the empty family.
            let res = (0..self.num_players)
                .filter(|&i| levels[i].iter().all(|&v| mgr.low(v) == mgr.zero(i + 1)))
                .collect();
            Ok(Rc::new(res))
        })
    }

    pub fn is_vetoer(&self, player: usize) -> Result<bool> {
        self.check_player(player)?;
        Ok(self.vetoers()?.contains(&player))
    }

    /// The only non-dummy player, if all others are dummies.
    pub fn dictator(&self) -> Result<Option<usize>> {
        let dummies = self.dummies()?;
        if dummies.len() + 1 != self.num_players {
            return Ok(None);
        }
        Ok((0..self.num_players).find(|p| !dummies.contains(p)))
    }

    pub fn is_winning_coalition(&self, players: &[usize]) -> Result<bool> {
        for &p in players {
            self.check_player(p)?;
        }
        Ok(self.manager().is_in(self.winning()?, players))
    }

    /// The players not in `players`.
    pub fn complement_coalition(&self, players: &[usize]) -> Vec<usize> {
        (0..self.num_players).filter(|p| !players.contains(p)).collect()
    }

    /// Whether both games have the same winning coalitions.
    pub fn equals(&self, other: &SimpleGame) -> Result<bool> {
        let (u, v) = (self.winning()?, other.winning()?);
        Ok(self.manager().same_family(u, other.manager(), v))
    }
}

// ============================================================================
// Power indices
// ============================================================================

impl SimpleGame {
    fn banzhaf(&self) -> Result<Rc<(Vec<f64>, Vec<f64>)>> {
        self.memoize(&self.memo.banzhaf, Property::Banzhaf, || {
            let mgr = self.manager();
            let win = self.winning()?;
            Ok(Rc::new((
                power::banzhaf_absolute(mgr, win),
                power::banzhaf_normalized(mgr, win),
            )))
        })
    }

    pub fn banzhaf_absolute(&self) -> Result<Vec<f64>> {
        Ok(self.banzhaf()?.0.clone())
    }

    pub fn banzhaf_normalized(&self) -> Result<Vec<f64>> {
        Ok(self.banzhaf()?.1.clone())
    }

    pub fn shapley_shubik(&self) -> Result<Vec<f64>> {
        let res = self.memoize(&self.memo.shapley_shubik, Property::ShapleyShubik, || {
            Ok(Rc::new(power::shapley_shubik(self.manager(), self.winning()?)?))
        })?;
        Ok(res.to_vec())
    }

    fn holler_packel(&self) -> Result<Rc<(Vec<f64>, Vec<f64>)>> {
        self.memoize(&self.memo.holler_packel, Property::HollerPackel, || {
            let mgr = self.manager();
            let min_win = self.minimal_winning()?;
            Ok(Rc::new((
                power::holler_packel_absolute(mgr, min_win),
                power::holler_packel_normalized(mgr, min_win),
            )))
        })
    }

    pub fn holler_packel_absolute(&self) -> Result<Vec<f64>> {
        Ok(self.holler_packel()?.0.clone())
    }

    pub fn holler_packel_normalized(&self) -> Result<Vec<f64>> {
        Ok(self.holler_packel()?.1.clone())
    }

    pub fn deegan_packel(&self) -> Result<Vec<f64>> {
        let res = self.memoize(&self.memo.deegan_packel, Property::DeeganPackel, || {
            Ok(Rc::new(power::deegan_packel(self.manager(), self.minimal_winning()?)?))
        })?;
        Ok(res.to_vec())
    }

    pub fn shift_power(&self) -> Result<Vec<f64>> {
        let res = self.memoize(&self.memo.shift_power, Property::ShiftPower, || {
            Ok(Rc::new(power::shift_power(self.manager(), self.shift_minimal_winning()?)))
        })?;
        Ok(res.to_vec())
    }
}

impl fmt::Display for SimpleGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simple game with {} players", self.num_players)?;
        writeln!(f, "  classes:")?;
        for class in &self.classes {
            writeln!(f, "    {}", class)?;
        }
        writeln!(f, "  rules:")?;
        for rule in &self.rules {
            let weights: Vec<String> = self.classes.iter().map(|c| rule.weight_for_class(c).to_string()).collect();
            writeln!(f, "    {}: [{}; {}]", rule.name(), rule.quota(), weights.join(", "))?;
        }
        match self.join() {
            Ok(join) => writeln!(f, "  join: {}", join)?,
            Err(_) => writeln!(f, "  join: (none)")?,
        }
        let moved: Vec<String> = self
            .player_order()
            .iter()
            .enumerate()
            .filter(|(i, p)| i != *p)
            .map(|(i, p)| format!("{}->{}", i, p))
            .collect();
        if moved.is_empty() {
            write!(f, "  order: canonical")
        } else {
            write!(f, "  order: {}", moved.join(", "))
        }
    }
}
