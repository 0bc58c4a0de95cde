//! Fixed-width coalitions as bit vectors.

use std::fmt;

const BITS: usize = u64::BITS as usize;

/// A subset of the players `0..len`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coalition {
    len: usize,
    blocks: Vec<u64>,
}

impl Coalition {
    /// The empty coalition over `len` players.
    pub fn empty(len: usize) -> Self {
        Self {
            len,
            blocks: vec![0; len.div_ceil(BITS)],
        }
    }

    pub fn from_players(len: usize, players: impl IntoIterator<Item = usize>) -> Self {
        let mut c = Self::empty(len);
        for p in players {
            c.add(p);
        }
        c
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|&b| b == 0)
    }

    /// Number of players in the coalition.
    pub fn count(&self) -> usize {
        self.blocks.iter().map(|b| b.count_ones() as usize).sum()
    }

    pub fn contains(&self, player: usize) -> bool {
        player < self.len && self.blocks[player / BITS] & (1 << (player % BITS)) != 0
    }

    pub fn add(&mut self, player: usize) {
        assert!(player < self.len, "Player {} out of range 0..{}", player, self.len);
        self.blocks[player / BITS] |= 1 << (player % BITS);
    }

    /// Adds all players of the inclusive range `from..=to`.
    pub fn add_range(&mut self, from: usize, to: usize) {
        for p in from..=to {
            self.add(p);
        }
    }

    pub fn remove(&mut self, player: usize) {
        if player < self.len {
            self.blocks[player / BITS] &= !(1 << (player % BITS));
        }
    }

    /// The largest player in the coalition.
    pub fn max(&self) -> Option<usize> {
        (0..self.len).rev().find(|&p| self.contains(p))
    }

    /// Grows or shrinks the universe to `len` players. Players beyond the
    /// new length are dropped.
    pub fn resize(&mut self, len: usize) {
        for p in len..self.len {
            self.remove(p);
        }
        self.len = len;
        self.blocks.resize(len.div_ceil(BITS), 0);
    }

    /// Total weight of the members.
    pub fn weight(&self, weights: &[i64]) -> i64 {
        self.players().map(|p| weights[p]).sum()
    }

    /// Members in increasing order.
    pub fn players(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |&p| self.contains(p))
    }

    /// Membership vector of length `len`.
    pub fn to_bools(&self) -> Vec<bool> {
        (0..self.len).map(|p| self.contains(p)).collect()
    }

    pub fn is_subset(&self, other: &Coalition) -> bool {
        self.players().all(|p| other.contains(p))
    }

    pub fn is_disjoint(&self, other: &Coalition) -> bool {
        self.players().all(|p| !other.contains(p))
    }
}

impl fmt::Display for Coalition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, p) in self.players().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, "}}")
    }
}
