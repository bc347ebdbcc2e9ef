//! Type-safe wrapper for BDD variables.

use std::fmt;

/// A variable identifier (1-indexed).
///
/// Variables are decision points in the diagram; smaller ids sit closer to
/// the root. Id 0 is reserved for the terminal nodes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var(u32);

impl Var {
    /// Marker for terminal nodes, which decide on no variable.
    pub(crate) const TERMINAL: Var = Var(0);

    /// Creates a new variable with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id == 0`. Variables are 1-indexed.
    pub fn new(id: u32) -> Self {
        assert_ne!(id, 0, "Variable ids must be >= 1");
        Var(id)
    }

    /// Returns the raw variable id as a `u32`.
    pub fn id(self) -> u32 {
        self.0
    }

    /// Whether this is the terminal marker rather than a real variable.
    pub fn is_terminal(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl From<Var> for u32 {
    fn from(var: Var) -> Self {
        var.0
    }
}
