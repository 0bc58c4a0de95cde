//! Player classes and weighted rules.
//!
//! Players are declared in classes of interchangeable players; a class of
//! size 1 is a single named player. A rule assigns one weight per class and
//! a quota. Once the diagram of a rule has been built, the rule is frozen.

use std::cell::OnceCell;
use std::fmt;

use log::{debug, warn};

use crate::desirability::DesirabilityHints;
use crate::error::{Error, Result};
use crate::manager::Manager;
use crate::reference::Ref;
use crate::wvg::Wvg;

/// A group of `size` players with identical weights in every rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerClass {
    pub id: usize,
    pub name: Option<String>,
    pub size: usize,
}

impl PlayerClass {
    /// The name, or a generated one based on the position of the class.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("Class {}", self.id + 1),
        }
    }
}

impl fmt::Display for PlayerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x {} (id={})", self.size, self.display_name(), self.id)
    }
}

/// A weighted rule over player classes.
#[derive(Debug, Clone)]
pub struct RuleWvg {
    name: String,
    quota: i64,
    /// Weight per class id.
    weights: Vec<i64>,
    diagram: OnceCell<Ref>,
}

impl RuleWvg {
    pub(crate) fn new(name: String, num_classes: usize) -> Self {
        Self {
            name,
            quota: 0,
            weights: vec![0; num_classes],
            diagram: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quota(&self) -> i64 {
        self.quota
    }

    pub fn is_frozen(&self) -> bool {
        self.diagram.get().is_some()
    }

    fn check_mutable(&self) -> Result<()> {
        if self.is_frozen() {
            return Err(Error::RuleImmutable { rule: self.name.clone() });
        }
        Ok(())
    }

    pub fn set_quota(&mut self, quota: i64) -> Result<()> {
        self.check_mutable()?;
        self.quota = quota;
        Ok(())
    }

    /// Weights must be non-negative; the rule is a monotone weighted game.
    pub fn set_weight_for_class(&mut self, class: &PlayerClass, weight: i64) -> Result<()> {
        self.check_mutable()?;
        if weight < 0 {
            return Err(Error::NegativeWeight {
                rule: self.name.clone(),
                class: class.id,
                weight,
            });
        }
        self.weights[class.id] = weight;
        Ok(())
    }

    /// Sets the quota and the weights of all classes at once.
    pub fn set(&mut self, quota: i64, weights: &[(&PlayerClass, i64)]) -> Result<()> {
        self.set_quota(quota)?;
        for &(class, weight) in weights {
            self.set_weight_for_class(class, weight)?;
        }
        Ok(())
    }

    pub fn weight_for_class(&self, class: &PlayerClass) -> i64 {
        self.weights[class.id]
    }

    /// Weights per player in the order of `classes`, before permutation.
    fn player_weights(&self, classes: &[PlayerClass]) -> Vec<i64> {
        classes
            .iter()
            .flat_map(|c| std::iter::repeat(self.weights[c.id]).take(c.size))
            .collect()
    }

    /// The rule as a weighted game over levels: level `i` holds the player
    /// `pi[i]` of the declaration order.
    pub fn to_wvg(&self, classes: &[PlayerClass], pi: &[usize]) -> Wvg {
        let unordered = self.player_weights(classes);
        Wvg::new(self.quota, pi.iter().map(|&p| unordered[p]).collect())
    }

    /// The diagram of the rule. Freezes the rule.
    ///
    /// `max_nodes` is a soft limit on the size of the manager; exceeding it
    /// is only reported.
    pub fn qobdd(&self, mgr: &Manager, classes: &[PlayerClass], pi: &[usize], max_nodes: Option<usize>) -> Ref {
        *self.diagram.get_or_init(|| {
            let wvg = self.to_wvg(classes, pi);
            let root = wvg.to_qobdd(mgr);
            debug!("rule '{}' = {} has diagram {}", self.name, wvg, root);
            if let Some(limit) = max_nodes {
                if mgr.num_nodes() > limit {
                    warn!(
                        "rule '{}': manager holds {} nodes, more than the limit of {}",
                        self.name,
                        mgr.num_nodes(),
                        limit
                    );
                }
            }
            root
        })
    }
}

/// Desirability shortcuts derived from the weights of the rules.
///
/// With a single rule, a strictly larger weight rules out being less
/// desirable. With several rules this no longer holds: in the intersection
/// of `[2; 1, 1, 1, 0]` and `[3; 2, 1, 1, 2]`, player 1 is more desirable than
/// player 3 despite the smaller weight in the second rule. Players with
/// equal weights in every rule are always equally desirable.
#[derive(Debug, Clone)]
pub struct WeightHints {
    /// Weights per level, one vector per rule.
    weights: Vec<Vec<i64>>,
    /// Class id per level.
    class_of: Vec<usize>,
}

impl WeightHints {
    pub fn new(weights: Vec<Vec<i64>>, class_of: Vec<usize>) -> Self {
        Self { weights, class_of }
    }
}

impl DesirabilityHints for WeightHints {
    fn not_greater(&self, i: usize, j: usize) -> bool {
        match self.weights.as_slice() {
            [w] => w[j] > w[i],
            _ => false,
        }
    }

    fn equal(&self, i: usize, j: usize) -> bool {
        self.class_of[i] == self.class_of[j] || (!self.weights.is_empty() && self.weights.iter().all(|w| w[i] == w[j]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    fn classes() -> Vec<PlayerClass> {
        vec![
            PlayerClass {
                id: 0,
                name: Some("A".to_string()),
                size: 1,
            },
            PlayerClass { id: 1, name: None, size: 2 },
        ]
    }

    #[test]
    fn test_to_wvg_applies_order() {
        let classes = classes();
        let mut rule = RuleWvg::new("r".to_string(), 2);
        rule.set(3, &[(&classes[0], 2), (&classes[1], 1)]).unwrap();

        assert_eq!(rule.to_wvg(&classes, &[0, 1, 2]), Wvg::new(3, vec![2, 1, 1]));
        assert_eq!(rule.to_wvg(&classes, &[1, 0, 2]), Wvg::new(3, vec![1, 2, 1]));
    }

    #[test]
    fn test_frozen_after_qobdd() {
        let classes = classes();
        let mgr = Manager::new(3);
        let mut rule = RuleWvg::new("r".to_string(), 2);
        rule.set(2, &[(&classes[0], 1), (&classes[1], 1)]).unwrap();
        assert!(!rule.is_frozen());

        let root = rule.qobdd(&mgr, &classes, &[0, 1, 2], None);
        assert_eq!(root, Wvg::new(2, vec![1, 1, 1]).to_qobdd(&mgr));
        assert!(rule.is_frozen());

        assert_eq!(rule.set_quota(1), Err(Error::RuleImmutable { rule: "r".to_string() }));
        assert!(rule.set_weight_for_class(&classes[0], 5).is_err());
        assert_eq!(rule.quota(), 2);
    }

    #[test]
    fn test_negative_weight() {
        let classes = classes();
        let mut rule = RuleWvg::new("r".to_string(), 2);
        assert_eq!(
            rule.set_weight_for_class(&classes[1], -2),
            Err(Error::NegativeWeight {
                rule: "r".to_string(),
                class: 1,
                weight: -2,
            })
        );
        assert_eq!(rule.weight_for_class(&classes[1]), 0);
        assert!(rule.set_weight_for_class(&classes[1], 0).is_ok());
    }

    #[test]
    fn test_names() {
        let classes = classes();
        assert_eq!(classes[0].display_name(), "A");
        assert_eq!(classes[1].display_name(), "Class 2");
        assert_eq!(classes[1].to_string(), "2x Class 2 (id=1)");
    }

    #[test]
    fn test_weight_hints() {
        let single = WeightHints::new(vec![vec![3, 2, 2, 1]], vec![0, 1, 1, 2]);
        assert!(single.not_greater(3, 0));
        assert!(!single.not_greater(0, 3));
        assert!(single.equal(1, 2));
        assert!(!single.equal(0, 1));

        let two = WeightHints::new(vec![vec![1, 1, 1, 0], vec![2, 1, 1, 2]], vec![0, 1, 2, 3]);
        assert!(!two.not_greater(1, 3));
        assert!(two.equal(1, 2));
        assert!(!two.equal(0, 3));
    }
}
