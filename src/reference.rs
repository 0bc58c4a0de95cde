use std::fmt::{Display, Formatter};

/// Handle to a node owned by a [`Manager`][crate::manager::Manager].
///
/// Ids are dense and assigned in creation order. Id 0 is the ZERO terminal
/// and id 1 is the ONE terminal; every inner node gets the next free id.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Ref(u32);

impl Ref {
    pub const ZERO: Ref = Ref(0);
    pub const ONE: Ref = Ref(1);

    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Return the internal representation of the reference.
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Return the index of the referenced node in the manager's storage.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn is_terminal(self) -> bool {
        self.0 <= 1
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            Ref::ZERO => write!(f, "@0"),
            Ref::ONE => write!(f, "@1"),
            Ref(id) => write!(f, "#{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminals() {
        assert!(Ref::ZERO.is_terminal());
        assert!(Ref::ONE.is_terminal());
        assert!(!Ref::new(2).is_terminal());
        assert_eq!(Ref::new(7).index(), 7);
    }

    #[test]
    fn test_display() {
        assert_eq!(Ref::ZERO.to_string(), "@0");
        assert_eq!(Ref::ONE.to_string(), "@1");
        assert_eq!(Ref::new(42).to_string(), "#42");
    }
}
