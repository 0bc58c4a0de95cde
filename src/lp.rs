//! Linear programs, and the one deciding whether a game is weighted.
//!
//! [`LinearProgram`] is a plain container: variables with bounds and
//! objective coefficients, and linear constraints. Solving it, or writing
//! it out in some solver's input format, is up to the caller.
//!
//! [`WeightednessModel`] builds the program that is feasible exactly if the
//! game is weighted. Every node `v` of the diagram of the winning coalitions
//! gets an interval `(lb(v), ub(v)]` of admissible quotas for the subgame it
//! represents: `lb(v)` bounds the weight of the heaviest losing coalition,
//! `ub(v)` the weight of the lightest winning one.

use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::error::{Error, Result};
use crate::game::SimpleGame;
use crate::reference::Ref;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VarId(usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VarType {
    Continuous,
    Integer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Var {
    pub name: String,
    pub ty: VarType,
    /// Coefficient in the objective function.
    pub objective: f64,
    pub lower: f64,
    pub upper: f64,
}

/// `sum(coeff * var) + constant`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinExpr {
    terms: BTreeMap<VarId, f64>,
    constant: f64,
}

impl LinExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `coeff * var`, merging with an existing term of `var`.
    pub fn add(&mut self, coeff: f64, var: VarId) -> &mut Self {
        *self.terms.entry(var).or_insert(0.0) += coeff;
        self
    }

    pub fn add_constant(&mut self, value: f64) -> &mut Self {
        self.constant += value;
        self
    }

    /// Builder form of [`add`][Self::add].
    pub fn term(mut self, coeff: f64, var: VarId) -> Self {
        self.add(coeff, var);
        self
    }

    pub fn coeff(&self, var: VarId) -> f64 {
        self.terms.get(&var).copied().unwrap_or(0.0)
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Non-zero terms, ordered by variable.
    pub fn terms(&self) -> impl Iterator<Item = (VarId, f64)> + '_ {
        self.terms.iter().filter(|(_, &c)| c != 0.0).map(|(&v, &c)| (v, c))
    }

    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms().map(|(v, c)| c * values[v.0]).sum::<f64>() + self.constant
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ConstraintSense {
    LessEqual,
    GreaterEqual,
    Equal,
}

/// `expr <sense> rhs`. The expression has no constant part.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub expr: LinExpr,
    pub sense: ConstraintSense,
    pub rhs: f64,
}

impl Constraint {
    pub fn is_satisfied_by(&self, values: &[f64], eps: f64) -> bool {
        let lhs = self.expr.evaluate(values);
        match self.sense {
            ConstraintSense::LessEqual => lhs <= self.rhs + eps,
            ConstraintSense::GreaterEqual => lhs >= self.rhs - eps,
            ConstraintSense::Equal => (lhs - self.rhs).abs() <= eps,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ModelSense {
    Minimize,
    Maximize,
}

#[derive(Debug, Clone)]
pub struct LinearProgram {
    sense: ModelSense,
    vars: Vec<Var>,
    constraints: Vec<Constraint>,
}

impl LinearProgram {
    pub fn new(sense: ModelSense) -> Self {
        Self {
            sense,
            vars: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn sense(&self) -> ModelSense {
        self.sense
    }

    /// Adds a variable in `[0, inf)` with no objective coefficient.
    pub fn add_var(&mut self, name: impl Into<String>, ty: VarType) -> VarId {
        self.vars.push(Var {
            name: name.into(),
            ty,
            objective: 0.0,
            lower: 0.0,
            upper: f64::INFINITY,
        });
        VarId(self.vars.len() - 1)
    }

    pub fn var(&self, id: VarId) -> &Var {
        &self.vars[id.0]
    }

    pub fn var_mut(&mut self, id: VarId) -> &mut Var {
        &mut self.vars[id.0]
    }

    pub fn vars(&self) -> &[Var] {
        &self.vars
    }

    pub fn find_var(&self, name: &str) -> Option<VarId> {
        self.vars.iter().position(|v| v.name == name).map(VarId)
    }

    /// Adds `expr <sense> rhs`. The constant part of `expr` moves to the
    /// right-hand side.
    pub fn add_constraint(&mut self, mut expr: LinExpr, sense: ConstraintSense, rhs: f64) -> usize {
        let rhs = rhs - expr.constant;
        expr.constant = 0.0;
        self.constraints.push(Constraint { expr, sense, rhs });
        self.constraints.len() - 1
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.vars.iter().zip(values).map(|(v, x)| v.objective * x).sum()
    }

    /// Whether `values` (one per variable) respects every bound, integrality
    /// and constraint, up to `eps`.
    pub fn is_feasible(&self, values: &[f64], eps: f64) -> bool {
        if values.len() != self.vars.len() {
            return false;
        }
        let bounds = self.vars.iter().zip(values).all(|(v, &x)| {
            x >= v.lower - eps && x <= v.upper + eps && (v.ty == VarType::Continuous || (x - x.round()).abs() <= eps)
        });
        bounds && self.constraints.iter().all(|c| c.is_satisfied_by(values, eps))
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Objective {
    /// Minimize `lb(root)`, i.e. the quota.
    MinQuota,
    /// Minimize the sum of all weights.
    MinWeights,
}

/// Builder for the linear program of weightedness.
#[derive(Debug, Clone)]
pub struct WeightednessModel {
    /// Equally desirable players get the same weight.
    pub preserve_types: bool,
    pub integer_vars: bool,
    pub objective: Objective,
    /// Reject games already known not to be weighted.
    pub presolve: bool,
}

impl Default for WeightednessModel {
    fn default() -> Self {
        Self {
            preserve_types: true,
            integer_vars: true,
            objective: Objective::MinQuota,
            presolve: true,
        }
    }
}

/// Variables of a node.
#[derive(Debug, Copy, Clone)]
pub struct NodeBounds {
    pub lb: VarId,
    pub ub: VarId,
}

/// A built model, with access to its variables.
#[derive(Debug, Clone)]
pub struct WeightednessProgram {
    pub lp: LinearProgram,
    /// Weight variable per level.
    pub weights: Vec<VarId>,
    pub bounds: HashMap<Ref, NodeBounds>,
    pub root: Ref,
}

impl WeightednessModel {
    /// Builds the program for `game`. The game must be complete.
    pub fn build(&self, game: &SimpleGame) -> Result<WeightednessProgram> {
        if self.presolve && game.is_weighted()? == Some(false) {
            return Err(Error::NotWeighted {
                trade: game.not_weighted_witness()?,
            });
        }

        let alad = game.alad()?;
        let order = alad.non_increasing_order()?;
        let mgr = game.manager();
        let win = game.winning()?;
        let n = game.num_players();

        let mut lp = LinearProgram::new(ModelSense::Minimize);
        let ty = if self.integer_vars {
            VarType::Integer
        } else {
            VarType::Continuous
        };

        let weights: Vec<VarId> = (0..n).map(|i| lp.add_var(format!("w_{}", i), ty)).collect();
        let rep = |i: usize| -> usize {
            if self.preserve_types {
                alad.types()[alad.type_of(i)][0]
            } else {
                i
            }
        };
        let w = |i: usize| weights[rep(i)];

        let mut bounds = HashMap::new();

        // ZERO has no winning coalition, ONE has no losing one.
        let lb_one = lp.add_var("lb_ONE", VarType::Continuous);
        lp.var_mut(lb_one).lower = f64::NEG_INFINITY;
        let ub_one = lp.add_var("ub_ONE", VarType::Continuous);
        lp.var_mut(ub_one).upper = 0.0;
        bounds.insert(Ref::ONE, NodeBounds { lb: lb_one, ub: ub_one });

        let lb_zero = lp.add_var("lb_ZERO", VarType::Continuous);
        lp.var_mut(lb_zero).upper = 0.0;
        let ub_zero = lp.add_var("ub_ZERO", VarType::Continuous);
        bounds.insert(Ref::ZERO, NodeBounds { lb: lb_zero, ub: ub_zero });

        let levels = mgr.collect_nodes(win);
        for nodes in &levels[..n] {
            for &v in nodes {
                let lb = lp.add_var(format!("lb_{}", v.id()), VarType::Continuous);
                let ub = lp.add_var(format!("ub_{}", v.id()), VarType::Continuous);
                // Only full families admit a negative quota.
                if mgr.is_full_family(v) {
                    lp.var_mut(lb).lower = f64::NEG_INFINITY;
                }
                bounds.insert(v, NodeBounds { lb, ub });
            }
        }

        match self.objective {
            Objective::MinQuota => lp.var_mut(bounds[&win].lb).objective = 1.0,
            Objective::MinWeights => {
                for class in alad.types() {
                    if self.preserve_types {
                        lp.var_mut(w(class[0])).objective = class.len() as f64;
                    } else {
                        for &i in class {
                            lp.var_mut(w(i)).objective = 1.0;
                        }
                    }
                }
            }
        }

        // Strictly more desirable classes weigh at least one more.
        if let Some((&first, rest)) = order.split_first() {
            let mut stronger = first;
            for &i in rest {
                if !alad.are_equal(stronger, i) {
                    let expr = LinExpr::new().term(-1.0, w(stronger)).term(1.0, w(i));
                    lp.add_constraint(expr, ConstraintSense::LessEqual, -1.0);
                    stronger = i;
                }
            }
        }

        let root = bounds[&win];
        let expr = LinExpr::new().term(1.0, root.lb).term(-1.0, root.ub);
        lp.add_constraint(expr, ConstraintSense::LessEqual, -1.0);

        for (level, nodes) in levels[..n].iter().enumerate() {
            for &v in nodes {
                let b = bounds[&v];
                let t = bounds[&mgr.high(v)];
                let e = bounds[&mgr.low(v)];
                let wl = w(level);

                // lb(t) + w <= lb(v)
                let expr = LinExpr::new().term(1.0, t.lb).term(1.0, wl).term(-1.0, b.lb);
                lp.add_constraint(expr, ConstraintSense::LessEqual, 0.0);
                // lb(e) <= lb(v)
                let expr = LinExpr::new().term(1.0, e.lb).term(-1.0, b.lb);
                lp.add_constraint(expr, ConstraintSense::LessEqual, 0.0);
                // ub(v) <= ub(t) + w
                let expr = LinExpr::new().term(1.0, b.ub).term(-1.0, t.ub).term(-1.0, wl);
                lp.add_constraint(expr, ConstraintSense::LessEqual, 0.0);
                // ub(v) <= ub(e)
                let expr = LinExpr::new().term(1.0, b.ub).term(-1.0, e.ub);
                lp.add_constraint(expr, ConstraintSense::LessEqual, 0.0);
            }
        }

        if self.preserve_types {
            for class in alad.types() {
                for &i in &class[1..] {
                    let expr = LinExpr::new().term(1.0, weights[class[0]]).term(-1.0, weights[i]);
                    lp.add_constraint(expr, ConstraintSense::Equal, 0.0);
                }
            }
        }

        debug!(
            "weightedness model: {} variables, {} constraints",
            lp.vars().len(),
            lp.constraints().len()
        );

        Ok(WeightednessProgram {
            lp,
            weights,
            bounds,
            root: win,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::formula::Formula;
    use crate::manager::Manager;

    /// Heaviest losing and lightest winning weight per node. Families without
    /// losing (winning) coalitions get `-big + remaining weight` (`big`).
    fn assignment(prog: &WeightednessProgram, mgr: &Manager, weights: &[i64]) -> Vec<f64> {
        let n = weights.len();
        let big = weights.iter().sum::<i64>() as f64 + 1.0;
        let mut values = vec![0.0; prog.lp.vars().len()];
        for (i, &w) in prog.weights.iter().enumerate() {
            values[w.index()] = weights[i] as f64;
        }

        let mut lb: HashMap<Ref, f64> = HashMap::from([(Ref::ZERO, 0.0), (Ref::ONE, -big)]);
        let mut ub: HashMap<Ref, f64> = HashMap::from([(Ref::ZERO, big), (Ref::ONE, 0.0)]);
        let levels = mgr.collect_nodes(prog.root);
        for level in (0..n).rev() {
            for &v in &levels[level] {
                let (t, e) = (mgr.high(v), mgr.low(v));
                let w = weights[level] as f64;
                lb.insert(v, f64::max(lb[&t] + w, lb[&e]));
                ub.insert(v, f64::min(ub[&t] + w, ub[&e]));
            }
        }
        for (v, b) in &prog.bounds {
            if let (Some(&l), Some(&u)) = (lb.get(v), ub.get(v)) {
                values[b.lb.index()] = l;
                values[b.ub.index()] = u;
            }
        }
        values
    }

    #[test]
    fn test_lin_expr() {
        let mut lp = LinearProgram::new(ModelSense::Minimize);
        let x = lp.add_var("x", VarType::Continuous);
        let y = lp.add_var("y", VarType::Integer);

        let mut expr = LinExpr::new().term(2.0, x).term(1.0, y).term(-1.0, x);
        expr.add_constant(3.0);
        assert_eq!(expr.coeff(x), 1.0);
        assert_eq!(expr.evaluate(&[1.0, 2.0]), 6.0);

        lp.add_constraint(expr, ConstraintSense::LessEqual, 5.0);
        assert_eq!(lp.constraints()[0].rhs, 2.0);
        assert_eq!(lp.constraints()[0].expr.constant(), 0.0);

        assert!(lp.is_feasible(&[1.0, 1.0], 1e-9));
        assert!(!lp.is_feasible(&[1.0, 2.0], 1e-9));
        assert!(!lp.is_feasible(&[0.5, 0.5], 1e-9));
        assert!(!lp.is_feasible(&[-1.0, 0.0], 1e-9));
        assert_eq!(lp.find_var("y"), Some(y));
    }

    #[test]
    fn test_weighted_game_is_feasible() {
        let game = SimpleGame::weighted(5, &[3, 2, 2, 1]).unwrap();
        let prog = WeightednessModel::default().build(&game).unwrap();

        // 4 weights, 4 terminal bounds, 2 per inner node.
        let inner = game.manager().size(game.winning().unwrap());
        assert_eq!(prog.lp.vars().len(), 4 + 4 + 2 * inner);

        let values = assignment(&prog, game.manager(), &[3, 2, 2, 1]);
        assert!(prog.lp.is_feasible(&values, 1e-9));
        assert_eq!(prog.lp.objective_value(&values), 4.0);

        // Equal weights for the two middle players are required.
        let values = assignment(&prog, game.manager(), &[4, 3, 2, 1]);
        assert!(!prog.lp.is_feasible(&values, 1e-9));
    }

    #[test]
    fn test_wrong_weights_are_infeasible() {
        let game = SimpleGame::weighted(2, &[1, 1, 1]).unwrap();
        let model = WeightednessModel {
            preserve_types: false,
            integer_vars: false,
            objective: Objective::MinWeights,
            presolve: false,
        };
        let prog = model.build(&game).unwrap();
        assert_eq!(prog.lp.var(prog.weights[0]).ty, VarType::Continuous);

        let values = assignment(&prog, game.manager(), &[1, 1, 1]);
        assert!(prog.lp.is_feasible(&values, 1e-9));
        assert_eq!(prog.lp.objective_value(&values), 3.0);

        // [x; 2, 1, 1] is not majority for any quota: {1, 2} and {0} tie.
        let values = assignment(&prog, game.manager(), &[2, 1, 1]);
        assert!(!prog.lp.is_feasible(&values, 1e-9));
    }

    #[test]
    fn test_presolve_rejects_non_weighted_game() {
        let mut game = SimpleGame::new();
        let classes: Vec<_> = (0..4).map(|_| game.add_player_class(1, None).unwrap()).collect();
        for (name, weights) in [("a", [1, 1, 0, 0]), ("b", [0, 0, 1, 1])] {
            let rule = game.create_rule(Some(name)).unwrap();
            rule.set_quota(2).unwrap();
            for (c, w) in classes.iter().zip(weights) {
                rule.set_weight_for_class(c, w).unwrap();
            }
        }
        game.set_join(Formula::or(Formula::var("a"), Formula::var("b"))).unwrap();

        match WeightednessModel::default().build(&game) {
            Err(Error::NotWeighted { trade }) => {
                assert!(trade.is_valid_against(game.manager(), game.winning().unwrap()));
                assert_eq!(trade, game.not_weighted_witness().unwrap());
            }
            other => panic!("expected a trade, got {:?}", other.map(|p| p.weights.len())),
        }

        let model = WeightednessModel {
            presolve: false,
            ..WeightednessModel::default()
        };
        assert!(matches!(model.build(&game), Err(Error::NotTotal)));
    }
}
