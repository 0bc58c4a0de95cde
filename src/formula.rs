//! Join formulas over rule names.
//!
//! A game with several rules wins if the formula over its rules is
//! satisfied, e.g. `R1 & (R2 | R3)`. Parsing the textual form is left to the
//! caller; this module only holds the tree.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    Var(String),
    And(Box<Formula>, Box<Formula>),
    Or(Box<Formula>, Box<Formula>),
}

impl Formula {
    pub fn var(name: impl Into<String>) -> Self {
        Formula::Var(name.into())
    }

    pub fn and(lhs: Self, rhs: Self) -> Self {
        Formula::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: Self, rhs: Self) -> Self {
        Formula::Or(Box::new(lhs), Box::new(rhs))
    }

    /// Left-leaning conjunction of the given rules, `None` if there are none.
    pub fn and_all<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Option<Self> {
        names.into_iter().map(Formula::var).reduce(Formula::and)
    }

    /// Evaluates the tree bottom-up.
    pub fn fold<T, E>(
        &self,
        var: &mut impl FnMut(&str) -> Result<T, E>,
        and: &mut impl FnMut(T, T) -> T,
        or: &mut impl FnMut(T, T) -> T,
    ) -> Result<T, E> {
        match self {
            Formula::Var(name) => var(name),
            Formula::And(lhs, rhs) => {
                let l = lhs.fold(var, and, or)?;
                let r = rhs.fold(var, and, or)?;
                Ok(and(l, r))
            }
            Formula::Or(lhs, rhs) => {
                let l = lhs.fold(var, and, or)?;
                let r = rhs.fold(var, and, or)?;
                Ok(or(l, r))
            }
        }
    }

    /// Rule names in order of first appearance.
    pub fn vars(&self) -> Vec<&str> {
        let mut res = Vec::new();
        let mut stack = vec![self];
        while let Some(f) = stack.pop() {
            match f {
                Formula::Var(name) => {
                    if !res.contains(&name.as_str()) {
                        res.push(name.as_str());
                    }
                }
                Formula::And(lhs, rhs) | Formula::Or(lhs, rhs) => {
                    stack.push(rhs);
                    stack.push(lhs);
                }
            }
        }
        res
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Var(name) => write!(f, "{}", name),
            Formula::And(lhs, rhs) => write!(f, "({} & {})", lhs, rhs),
            Formula::Or(lhs, rhs) => write!(f, "({} | {})", lhs, rhs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_and_all() {
        assert_eq!(Formula::and_all(Vec::<String>::new()), None);
        assert_eq!(Formula::and_all(["a"]), Some(Formula::var("a")));
        let f = Formula::and_all(["a", "b", "c"]).unwrap();
        assert_eq!(f.to_string(), "((a & b) & c)");
    }

    #[test]
    fn test_fold() {
        let f = Formula::and(Formula::var("x"), Formula::or(Formula::var("y"), Formula::var("z")));
        let eval = |x: bool, y: bool, z: bool| {
            f.fold(
                &mut |name| match name {
                    "x" => Ok(x),
                    "y" => Ok(y),
                    "z" => Ok(z),
                    _ => Err(name.to_string()),
                },
                &mut |a, b| a && b,
                &mut |a, b| a || b,
            )
        };
        assert_eq!(eval(true, false, true), Ok(true));
        assert_eq!(eval(true, false, false), Ok(false));
        assert_eq!(eval(false, true, true), Ok(false));

        let g = Formula::var("w");
        let res: Result<bool, String> = g.fold(&mut |name| Err(name.to_string()), &mut |a, b| a && b, &mut |a, b| a || b);
        assert_eq!(res, Err("w".to_string()));
    }

    #[test]
    fn test_vars() {
        let f = Formula::or(
            Formula::and(Formula::var("b"), Formula::var("a")),
            Formula::var("b"),
        );
        assert_eq!(f.vars(), vec!["b", "a"]);
    }
}
