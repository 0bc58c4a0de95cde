//! Trades: certificates that a game is not weighted.
//!
//! A trade starts from a list of coalitions and moves players between them.
//! If every coalition is winning before the trade and every coalition is
//! losing afterwards, no weighting can exist: the total weight of the
//! coalitions is unchanged by the moves, yet it would have to drop below
//! the quota for all of them.

use std::fmt;

use thiserror::Error;

use crate::coalition::Coalition;
use crate::manager::Manager;
use crate::reference::Ref;

/// Move `players` from coalition `from` to coalition `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub players: Vec<usize>,
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidMove {
    #[error("players {players:?} are not all in coalition [{from}]")]
    NotInSource { players: Vec<usize>, from: usize },

    #[error("players {players:?} are already in coalition [{to}]")]
    AlreadyInTarget { players: Vec<usize>, to: usize },

    #[error("move refers to coalition [{index}], but there are only {count}")]
    NoSuchCoalition { index: usize, count: usize },
}

/// Coalitions and the moves to apply to them, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trade {
    coalitions: Vec<Coalition>,
    moves: Vec<Move>,
}

impl Trade {
    pub fn new(coalitions: Vec<Coalition>) -> Self {
        Self {
            coalitions,
            moves: Vec::new(),
        }
    }

    pub fn coalitions(&self) -> &[Coalition] {
        &self.coalitions
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn move_players(&mut self, players: &[usize], from: usize, to: usize) {
        self.moves.push(Move {
            players: players.to_vec(),
            from,
            to,
        });
    }

    /// Swaps `s` in coalition `from` for `t` in coalition `to`.
    pub fn exchange(&mut self, s: &[usize], from: usize, t: &[usize], to: usize) {
        self.move_players(s, from, to);
        self.move_players(t, to, from);
    }

    /// The coalitions after all moves.
    pub fn apply(&self) -> Result<Vec<Coalition>, InvalidMove> {
        let mut res = self.coalitions.clone();
        let count = res.len();
        for m in &self.moves {
            for index in [m.from, m.to] {
                if index >= count {
                    return Err(InvalidMove::NoSuchCoalition { index, count });
                }
            }
            if !m.players.iter().all(|&p| res[m.from].contains(p)) {
                return Err(InvalidMove::NotInSource {
                    players: m.players.clone(),
                    from: m.from,
                });
            }
            if m.players.iter().any(|&p| res[m.to].contains(p)) {
                return Err(InvalidMove::AlreadyInTarget {
                    players: m.players.clone(),
                    to: m.to,
                });
            }
            for &p in &m.players {
                res[m.from].remove(p);
                res[m.to].add(p);
            }
        }
        Ok(res)
    }

    /// Whether the trade proves that `win` is not weighted: every coalition
    /// wins before the moves and loses after them.
    pub fn is_valid_against(&self, mgr: &Manager, win: Ref) -> bool {
        let wins = |c: &Coalition| mgr.is_in(win, &c.players().collect::<Vec<_>>());
        match self.apply() {
            Ok(after) => self.coalitions.iter().all(wins) && !after.iter().any(wins),
            Err(_) => false,
        }
    }
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Trade:")?;
        for (i, c) in self.coalitions.iter().enumerate() {
            writeln!(f, "  [{}] {}", i, c)?;
        }
        for m in &self.moves {
            writeln!(f, "  move {:?} from [{}] to [{}]", m.players, m.from, m.to)?;
        }
        match self.apply() {
            Ok(after) => {
                for (i, c) in after.iter().enumerate() {
                    writeln!(f, "  [{}] => {}", i, c)?;
                }
            }
            Err(e) => writeln!(f, "  invalid: {}", e)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::wvg::Wvg;

    fn coal(players: &[usize]) -> Coalition {
        Coalition::from_players(4, players.iter().copied())
    }

    #[test]
    fn test_exchange() {
        let mut trade = Trade::new(vec![coal(&[0, 1]), coal(&[2, 3])]);
        trade.exchange(&[1], 0, &[3], 1);
        let after = trade.apply().unwrap();
        assert_eq!(after, vec![coal(&[0, 3]), coal(&[1, 2])]);
        assert_eq!(trade.moves().len(), 2);
    }

    #[test]
    fn test_invalid_moves() {
        let mut trade = Trade::new(vec![coal(&[0, 1]), coal(&[1, 2])]);
        trade.move_players(&[1], 0, 1);
        assert_eq!(
            trade.apply(),
            Err(InvalidMove::AlreadyInTarget { players: vec![1], to: 1 })
        );

        let mut trade = Trade::new(vec![coal(&[0]), coal(&[2])]);
        trade.move_players(&[3], 0, 1);
        assert_eq!(trade.apply(), Err(InvalidMove::NotInSource { players: vec![3], from: 0 }));

        let mut trade = Trade::new(vec![coal(&[0])]);
        trade.move_players(&[0], 0, 2);
        assert_eq!(trade.apply(), Err(InvalidMove::NoSuchCoalition { index: 2, count: 1 }));
    }

    #[test]
    fn test_valid_against_non_weighted_game() {
        // Minimal winning coalitions {0,1} and {2,3}.
        let mgr = Manager::new(4);
        let win = mgr.apply_or(
            Wvg::new(2, vec![1, 1, 0, 0]).to_qobdd(&mgr),
            Wvg::new(2, vec![0, 0, 1, 1]).to_qobdd(&mgr),
        );
        let mut trade = Trade::new(vec![coal(&[0, 1]), coal(&[2, 3])]);
        trade.exchange(&[1], 0, &[3], 1);
        assert!(trade.is_valid_against(&mgr, win));

        // No trade works against a weighted game.
        let weighted = Wvg::new(2, vec![1, 1, 1, 1]).to_qobdd(&mgr);
        assert!(!trade.is_valid_against(&mgr, weighted));
    }

    #[test]
    fn test_display() {
        let mut trade = Trade::new(vec![coal(&[0, 1]), coal(&[2, 3])]);
        trade.exchange(&[1], 0, &[3], 1);
        let s = trade.to_string();
        assert!(s.contains("[0] {0,1}"));
        assert!(s.contains("move [1] from [0] to [1]"));
        assert!(s.contains("[1] => {1,2}"));
    }
}
