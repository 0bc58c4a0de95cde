//! Error types.
//!
//! [`Error`] covers misuse of the API: asking for a witness before the
//! corresponding verdict is known to be negative, mutating a frozen rule,
//! passing an invalid player order, and so on. Outcomes where an algorithm
//! simply finds no solution (a game that is not homogeneous, a Coates-Lewis
//! run that gets stuck) are not errors; they are typed results owned by the
//! algorithm modules and consumed by [`SimpleGame`][crate::game::SimpleGame].

use std::rc::Rc;

use thiserror::Error;

use crate::game::Property;
use crate::trade::Trade;

/// Convenient alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("rule '{rule}' is immutable once its diagram has been built")]
    RuleImmutable { rule: String },

    #[error("there is no rule named '{name}'")]
    UnknownRule { name: String },

    #[error("no witness available: {property} does not have a negative verdict")]
    NoWitness { property: Property },

    #[error("re-entrant computation of {property}")]
    ReentrantComputation { property: Property },

    #[error("player order is not a permutation of 0..{num_players}")]
    InvalidPlayerOrder { num_players: usize },

    #[error("player {player} is out of range for a game with {num_players} players")]
    PlayerOutOfRange { player: usize, num_players: usize },

    #[error("player classes are not consecutive in the player order")]
    NotConsecutive,

    #[error("the order is not total")]
    NotTotal,

    #[error("the empty coalition is winning")]
    EmptyCoalitionWinning,

    #[error("player classes must be added before the first rule")]
    PlayersFrozen,

    #[error("rules and join can no longer change once the game has been analyzed")]
    RulesFrozen,

    #[error("the game has no rules to join")]
    EmptyJoin,

    #[error("rule '{rule}' gives class {class} the negative weight {weight}")]
    NegativeWeight { rule: String, class: usize, weight: i64 },

    /// The trade certifies the verdict and can be re-checked with
    /// [`Trade::is_valid_against`].
    #[error("the game is not weighted:\n{trade}")]
    NotWeighted { trade: Rc<Trade> },
}
