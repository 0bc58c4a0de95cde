use crate::reference::Ref;

/// An inner or terminal node of a quasi-reduced diagram.
///
/// `high` is the then-edge (the player at `level` belongs to the coalition),
/// `low` is the else-edge. Terminals sit at level `n` and have both edges
/// pointing at themselves.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Node {
    pub level: u32,
    pub high: Ref,
    pub low: Ref,
}

impl Node {
    pub const fn new(level: u32, high: Ref, low: Ref) -> Self {
        Self { level, high, low }
    }

    pub(crate) const fn terminal(level: u32, this: Ref) -> Self {
        Self { level, high: this, low: this }
    }

    /// A node is redundant when the player at its level does not influence
    /// membership below it.
    pub fn is_redundant(&self) -> bool {
        self.high == self.low
    }
}
