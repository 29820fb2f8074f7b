//! Equations between binary polynomials and their canonical form.
//!
//! An [`Equation`] is a pair `lhs = rhs`. Two equations stating the same fact with the
//! sides swapped (or multiplied through by a constant) normalize to the same value, which is
//! what the engine stores and deduplicates on.
//!
//! The canonical form of `lhs = rhs` is computed from `e = lhs - rhs`:
//!
//! 1. divide `e` by the gcd of its coefficients,
//! 2. flip the sign of `e` so that its leading term is positive,
//! 3. put positive non-constant terms on the left, and the negated negative terms plus the
//!    negated constant on the right.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::error::{Error, Result};
use crate::poly::Poly;
use crate::types::Var;

#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Equation {
    pub lhs: Poly,
    pub rhs: Poly,
}

/// How an equation is squared for the squaring escalation tier.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Square {
    /// `lhs^2 = rhs^2`.
    Sides,
    /// `(lhs - rhs)^2 = 0`.
    Difference,
}

impl Equation {
    pub fn new(lhs: impl Into<Poly>, rhs: impl Into<Poly>) -> Self {
        Self {
            lhs: lhs.into(),
            rhs: rhs.into(),
        }
    }

    /// `lhs - rhs`.
    pub fn expr(&self) -> Poly {
        &self.lhs - &self.rhs
    }

    pub fn swapped(&self) -> Equation {
        Equation::new(self.rhs.clone(), self.lhs.clone())
    }

    pub fn atoms(&self) -> BTreeSet<Var> {
        let mut atoms = self.lhs.atoms();
        atoms.extend(self.rhs.atoms());
        atoms
    }

    /// Total number of additive terms on both sides.
    pub fn num_terms(&self) -> usize {
        self.lhs.len() + self.rhs.len()
    }

    /// Splits `expr = 0` into positive and negative sides, with a positive leading term.
    pub fn balance_terms(&self) -> Equation {
        let mut expr = self.expr();
        if matches!(expr.leading(), Some((_, c)) if c.is_negative()) {
            expr = -expr;
        }
        let mut lhs = Poly::zero();
        let mut rhs = Poly::zero();
        for (m, c) in expr.terms() {
            if !m.is_one() && c.is_positive() {
                lhs.add_term(m.clone(), c.clone());
            } else {
                rhs.add_term(m.clone(), -c);
            }
        }
        Equation::new(lhs, rhs)
    }

    /// Divides `lhs - rhs` by the gcd of its coefficients; the result is one-sided.
    pub fn cancel_constant_factor(&self) -> Equation {
        let expr = self.expr();
        let content = expr.content();
        if content.is_zero() || content == BigInt::from(1) {
            return self.clone();
        }
        Equation::new(expr.div_exact(&content), Poly::zero())
    }

    /// Canonical form. `Ok(None)` for `0 = 0`, a contradiction for a numeric falsehood.
    pub fn normalize(&self) -> Result<Option<Equation>> {
        let expr = self.expr();
        if expr.is_zero() {
            return Ok(None);
        }
        if expr.is_constant() {
            return Err(Error::contradiction(&self.lhs, &self.rhs, "not an equation"));
        }
        Ok(Some(self.cancel_constant_factor().balance_terms()))
    }

    /// Squares the equation; the result is implied by the equation but need not imply it.
    pub fn square(&self, method: Square) -> Equation {
        match method {
            Square::Sides => Equation::new(self.lhs.square(), self.rhs.square()),
            Square::Difference => Equation::new(self.expr().square(), Poly::zero()),
        }
    }

    pub fn substitute(&self, values: &HashMap<Var, Poly>) -> Equation {
        Equation::new(self.lhs.substitute(values), self.rhs.substitute(values))
    }

    pub fn is_satisfied_by<F>(&self, value: F) -> bool
    where
        F: Fn(Var) -> bool,
    {
        self.lhs.eval(&value) == self.rhs.eval(&value)
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::parse::parse_equation;
    use crate::symbols::SymbolTable;

    fn canon(table: &mut SymbolTable, s: &str) -> Option<Equation> {
        parse_equation(s, table).unwrap().normalize().unwrap()
    }

    #[test]
    fn test_orientation_insensitive() {
        let mut table = SymbolTable::new();
        let a = canon(&mut table, "x + y = 2*z").unwrap();
        let b = canon(&mut table, "2*z = y + x").unwrap();
        let c = canon(&mut table, "-2*x - 2*y + 4*z = 0").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(table.show_equation(&a), "x + y = 2*z");
    }

    #[test]
    fn test_constant_moves_right() {
        let mut table = SymbolTable::new();
        let e = canon(&mut table, "1 - x = y").unwrap();
        assert_eq!(table.show_equation(&e), "x + y = 1");
        let e = canon(&mut table, "x*y*z - 2 = 0").unwrap();
        assert_eq!(table.show_equation(&e), "x*y*z = 2");
    }

    #[test]
    fn test_degenerate() {
        let mut table = SymbolTable::new();
        assert_eq!(canon(&mut table, "x + 1 = 1 + x"), None);
        let err = parse_equation("2 = 3", &mut table).unwrap().normalize().unwrap_err();
        assert!(err.is_contradiction());
    }

    #[test]
    fn test_square() {
        let mut table = SymbolTable::new();
        let e = parse_equation("x + y = 1", &mut table).unwrap();
        let sq = e.square(Square::Sides).normalize().unwrap().unwrap();
        assert_eq!(table.show_equation(&sq), "2*x*y + x + y = 1");
        let sq = e.square(Square::Difference).normalize().unwrap().unwrap();
        assert_eq!(table.show_equation(&sq), "2*x*y = x + y - 1");
    }

    #[test]
    fn test_satisfied_by() {
        let mut table = SymbolTable::new();
        let e = parse_equation("x + y = 2*z", &mut table).unwrap();
        assert!(e.is_satisfied_by(|_| true));
        assert!(!e.is_satisfied_by(|v| v.id() == 1));
    }
}
