//! # simple-games: Simple games on decision diagrams
//!
//! **`simple-games`** analyzes *simple games*: a set of players and the
//! monotone family of their winning coalitions, as found in voting bodies.
//! Questions such as "is the game weighted?", "is it homogeneous?" or "how
//! much power does each player have?" are answered without listing the
//! exponentially many coalitions.
//!
//! ## How it works
//!
//! The winning coalitions are stored in a **quasi-reduced ordered binary
//! decision diagram** (QOBDD): every level of the diagram is one player,
//! and every path visits every level. Diagrams are hash-consed by a
//! [`Manager`][crate::manager::Manager], so equal subfamilies are shared and
//! equality of families is equality of [`Ref`][crate::reference::Ref]s.
//!
//! On top of the diagrams sit:
//!
//! - **Views** ([`manip`]): set transformations such as "remove player `i`"
//!   or "take complements" applied during a traversal, without building a
//!   new diagram.
//! - **Order theory** ([`union_find`], [`partition`], [`poset`],
//!   [`preorder`]): used for the desirability relation of players
//!   ([`desirability`]).
//! - **Algorithms**: derived families ([`families`]), power indices
//!   ([`power`]), homogeneity ([`homogeneous`]), the weighting heuristic of
//!   Coates and Lewis ([`coates_lewis`]), and multi-valued views over player
//!   types ([`mdd`]).
//! - **The game** ([`game`]): player classes, weighted rules joined by a
//!   [`Formula`][crate::formula::Formula], and every property computed
//!   lazily and at most once.
//!
//! ## Basic Usage
//!
//! ```rust
//! use simple_games::game::{Family, SimpleGame};
//!
//! // [5; 3, 2, 2, 1]
//! let game = SimpleGame::weighted(5, &[3, 2, 2, 1])?;
//!
//! assert_eq!(game.count(Family::MinimalWinning)?, 3u32.into());
//! assert_eq!(game.is_homogeneous()?, Some(true));
//! assert!(game.is_proper()?);
//!
//! let ss = game.shapley_shubik()?;
//! assert!(ss[0] > ss[1] && ss[1] > ss[3]);
//! # Ok::<(), simple_games::error::Error>(())
//! ```
//!
//! Games with several rules:
//!
//! ```rust
//! use simple_games::formula::Formula;
//! use simple_games::game::SimpleGame;
//!
//! let mut game = SimpleGame::new();
//! let parties = game.add_player_class(2, Some("party"))?;
//! let states = game.add_player_class(3, Some("state"))?;
//!
//! game.create_rule(Some("seats"))?.set(3, &[(&parties, 2), (&states, 1)])?;
//! game.create_rule(Some("states"))?.set(2, &[(&parties, 0), (&states, 1)])?;
//! game.set_join(Formula::and(Formula::var("seats"), Formula::var("states")))?;
//!
//! assert!(game.is_winning_coalition(&[0, 2, 3])?);
//! assert!(!game.is_winning_coalition(&[0, 1])?);
//! # Ok::<(), simple_games::error::Error>(())
//! ```

pub mod cache;
pub mod coalition;
pub mod coates_lewis;
pub mod desirability;
pub mod error;
pub mod families;
pub mod formula;
pub mod game;
pub mod homogeneous;
pub mod lp;
pub mod manager;
pub mod manip;
pub mod mdd;
pub mod node;
pub mod partition;
pub mod paths;
pub mod poset;
pub mod power;
pub mod preorder;
pub mod reference;
pub mod rule;
pub mod sat;
pub mod subtable;
pub mod trade;
pub mod union_find;
pub mod wvg;
