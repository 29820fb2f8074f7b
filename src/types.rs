//! Type-safe wrappers for binary variables and parities.
//!
//! Variables are plain ids handed out by a [`SymbolTable`][crate::symbols::SymbolTable];
//! all value information about a variable lives in the [`System`][crate::system::System].
use std::fmt;

/// A binary variable identifier (1-indexed).
///
/// # Invariants
///
/// - Variable IDs must be >= 1 (0 is reserved for "no variable")
/// - The ordering of variables is the ordering of their IDs, which is the order in
///   which the symbol table first saw their names
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var(u32);

impl Var {
    /// Creates a new variable with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if `id == 0`. Variables must be 1-indexed.
    pub fn new(id: u32) -> Self {
        assert_ne!(id, 0, "Variable IDs must be >= 1");
        Var(id)
    }

    /// Returns the raw variable ID as a `u32`.
    pub fn id(self) -> u32 {
        self.0
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

/// Definite parity of an integer-valued expression.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    pub fn from_bit(odd: bool) -> Self {
        if odd {
            Parity::Odd
        } else {
            Parity::Even
        }
    }

    pub fn is_odd(self) -> bool {
        self == Parity::Odd
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parity::Even => write!(f, "even"),
            Parity::Odd => write!(f, "odd"),
        }
    }
}
