//! Binary polynomials with exact integer coefficients.
//!
//! A [`Poly`] is a sparse map from square-free [`Monomial`]s to non-zero [`BigInt`]
//! coefficients. Products are expanded eagerly and `v^n` collapses to `v`, so every value
//! is already in the fully expanded, binary-square-free normal form and structural
//! equality coincides with polynomial equality over {0,1}.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::monomial::Monomial;
use crate::types::{Parity, Var};

#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Default)]
pub struct Poly {
    terms: BTreeMap<Monomial, BigInt>,
}

impl Poly {
    pub fn zero() -> Self {
        Poly::default()
    }

    pub fn one() -> Self {
        Poly::constant(1)
    }

    pub fn constant(value: impl Into<BigInt>) -> Self {
        Poly::term(value, Monomial::one())
    }

    pub fn var(var: Var) -> Self {
        Poly::term(1, Monomial::var(var))
    }

    pub fn monomial(monomial: Monomial) -> Self {
        Poly::term(1, monomial)
    }

    pub fn term(coef: impl Into<BigInt>, monomial: Monomial) -> Self {
        let mut poly = Poly::zero();
        poly.add_term(monomial, coef.into());
        poly
    }

    pub fn from_terms(terms: impl IntoIterator<Item = (Monomial, BigInt)>) -> Self {
        let mut poly = Poly::zero();
        for (m, c) in terms {
            poly.add_term(m, c);
        }
        poly
    }

    /// Accumulates `coef * monomial`, dropping the entry if it cancels.
    pub fn add_term(&mut self, monomial: Monomial, coef: BigInt) {
        if coef.is_zero() {
            return;
        }
        match self.terms.entry(monomial) {
            Entry::Vacant(e) => {
                e.insert(coef);
            }
            Entry::Occupied(mut e) => {
                *e.get_mut() += coef;
                if e.get().is_zero() {
                    e.remove();
                }
            }
        }
    }

    /// Terms in graded order, constant last.
    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, &BigInt)> {
        self.terms.iter()
    }

    pub fn non_constant_terms(&self) -> impl Iterator<Item = (&Monomial, &BigInt)> {
        self.terms.iter().filter(|(m, _)| !m.is_one())
    }

    /// Number of additive terms, including the constant.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn is_constant(&self) -> bool {
        self.terms.keys().all(|m| m.is_one())
    }

    pub fn as_constant(&self) -> Option<BigInt> {
        if self.is_constant() {
            Some(self.constant_term())
        } else {
            None
        }
    }

    /// Whether this is one of the ground states 0 or 1.
    pub fn is_ground(&self) -> bool {
        match self.as_constant() {
            Some(c) => c.is_zero() || c.is_one(),
            None => false,
        }
    }

    pub fn constant_term(&self) -> BigInt {
        self.coefficient_of(&Monomial::one())
    }

    pub fn has_constant(&self) -> bool {
        self.terms.contains_key(&Monomial::one())
    }

    pub fn coefficient_of(&self, monomial: &Monomial) -> BigInt {
        self.terms.get(monomial).cloned().unwrap_or_else(BigInt::zero)
    }

    /// Returns the variable if the polynomial is exactly `1*x`.
    pub fn as_var(&self) -> Option<Var> {
        match self.as_term() {
            Some((m, c)) if c.is_one() => m.as_var(),
            _ => None,
        }
    }

    /// Returns the single non-constant term, if the polynomial is exactly `c*m`.
    pub fn as_term(&self) -> Option<(&Monomial, &BigInt)> {
        if self.terms.len() != 1 {
            return None;
        }
        self.terms.iter().next().filter(|(m, _)| !m.is_one())
    }

    /// Returns the monomial if the polynomial is exactly `1*m` with `m` non-constant.
    pub fn as_monomial(&self) -> Option<&Monomial> {
        match self.as_term() {
            Some((m, c)) if c.is_one() => Some(m),
            _ => None,
        }
    }

    /// Whether the polynomial is one of `0`, `1`, `x` or `1 - x`.
    pub fn is_simple_binary(&self) -> bool {
        if self.is_ground() || self.as_var().is_some() {
            return true;
        }
        let complement = self.complement();
        complement.as_var().is_some()
    }

    /// The leading (highest graded) term.
    pub fn leading(&self) -> Option<(&Monomial, &BigInt)> {
        self.terms.iter().next()
    }

    pub fn atoms(&self) -> BTreeSet<Var> {
        self.terms.keys().flat_map(|m| m.vars().iter().copied()).collect()
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms().len()
    }

    pub fn contains_var(&self, var: Var) -> bool {
        self.terms.keys().any(|m| m.contains(var))
    }

    /// Term-by-term lower bound over all {0,1} assignments.
    pub fn min_value(&self) -> BigInt {
        self.terms
            .iter()
            .map(|(m, c)| if m.is_one() || c.is_negative() { c.clone() } else { BigInt::zero() })
            .sum()
    }

    /// Term-by-term upper bound over all {0,1} assignments.
    pub fn max_value(&self) -> BigInt {
        self.terms
            .iter()
            .map(|(m, c)| if m.is_one() || c.is_positive() { c.clone() } else { BigInt::zero() })
            .sum()
    }

    /// Definite parity, if every non-constant coefficient is even.
    pub fn parity(&self) -> Option<Parity> {
        if self.non_constant_terms().any(|(_, c)| c.is_odd()) {
            return None;
        }
        Some(Parity::from_bit(self.constant_term().is_odd()))
    }

    /// Gcd of all coefficients (non-negative), zero for the zero polynomial.
    pub fn content(&self) -> BigInt {
        self.terms.values().fold(BigInt::zero(), |acc, c| acc.gcd(c))
    }

    pub fn scale(&self, factor: &BigInt) -> Poly {
        if factor.is_zero() {
            return Poly::zero();
        }
        Poly {
            terms: self.terms.iter().map(|(m, c)| (m.clone(), c * factor)).collect(),
        }
    }

    /// Divides every coefficient by `divisor`, which must divide them all.
    pub fn div_exact(&self, divisor: &BigInt) -> Poly {
        debug_assert!(self.terms.values().all(|c| (c % divisor).is_zero()));
        Poly {
            terms: self.terms.iter().map(|(m, c)| (m.clone(), c / divisor)).collect(),
        }
    }

    /// `1 - self`.
    pub fn complement(&self) -> Poly {
        Poly::one() - self
    }

    pub fn square(&self) -> Poly {
        self * self
    }

    /// Square-and-multiply power; `x^0` is `1`.
    pub fn pow(&self, mut exp: u32) -> Poly {
        let mut res = Poly::one();
        let mut base = self.clone();
        while exp > 0 {
            if exp & 1 == 1 {
                res = &res * &base;
            }
            exp >>= 1;
            if exp > 0 {
                base = base.square();
            }
        }
        res
    }

    /// Simultaneous substitution of variables.
    pub fn substitute(&self, values: &HashMap<Var, Poly>) -> Poly {
        if values.is_empty() || !self.atoms().iter().any(|v| values.contains_key(v)) {
            return self.clone();
        }
        let mut res = Poly::zero();
        for (m, c) in &self.terms {
            let mut kept = Vec::new();
            let mut product = Poly::constant(c.clone());
            for &v in m.vars() {
                match values.get(&v) {
                    Some(value) => product = &product * value,
                    None => kept.push(v),
                }
                if product.is_zero() {
                    break;
                }
            }
            res = res + product * Poly::monomial(Monomial::from_vars(kept));
        }
        res
    }

    /// Replaces every term divisible by `key` with `value` times the cofactor.
    pub fn substitute_monomial(&self, key: &Monomial, value: &Poly) -> Poly {
        let mut res = Poly::zero();
        for (m, c) in &self.terms {
            if !key.is_one() && key.divides(m) {
                let rest = Poly::term(c.clone(), m.without(key));
                res = res + rest * value;
            } else {
                res.add_term(m.clone(), c.clone());
            }
        }
        res
    }

    /// Partial evaluation under a (possibly partial) assignment.
    pub fn assign(&self, values: &BTreeMap<Var, bool>) -> Poly {
        let mut res = Poly::zero();
        'terms: for (m, c) in &self.terms {
            let mut kept = Vec::new();
            for &v in m.vars() {
                match values.get(&v) {
                    Some(false) => continue 'terms,
                    Some(true) => {}
                    None => kept.push(v),
                }
            }
            res.add_term(Monomial::from_vars(kept), c.clone());
        }
        res
    }

    /// Full evaluation under a total assignment.
    pub fn eval<F>(&self, value: F) -> BigInt
    where
        F: Fn(Var) -> bool,
    {
        self.terms
            .iter()
            .filter(|(m, _)| m.vars().iter().all(|&v| value(v)))
            .map(|(_, c)| c.clone())
            .sum()
    }

    /// Renders the polynomial with a custom variable formatter.
    pub fn to_string_with<F>(&self, name: F) -> String
    where
        F: Fn(Var) -> String,
    {
        if self.terms.is_empty() {
            return "0".to_string();
        }
        let mut out = String::new();
        for (i, (m, c)) in self.terms.iter().enumerate() {
            let abs = c.abs();
            if i == 0 {
                if c.is_negative() {
                    out.push('-');
                }
            } else if c.is_negative() {
                out.push_str(" - ");
            } else {
                out.push_str(" + ");
            }
            if m.is_one() {
                out.push_str(&abs.to_string());
            } else if abs.is_one() {
                out.push_str(&m.to_string_with(&name));
            } else {
                out.push_str(&format!("{}*{}", abs, m.to_string_with(&name)));
            }
        }
        out
    }
}

impl fmt::Display for Poly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with(|v| v.to_string()))
    }
}

impl From<Var> for Poly {
    fn from(var: Var) -> Self {
        Poly::var(var)
    }
}

impl From<i32> for Poly {
    fn from(value: i32) -> Self {
        Poly::constant(value)
    }
}

impl From<i64> for Poly {
    fn from(value: i64) -> Self {
        Poly::constant(value)
    }
}

impl From<BigInt> for Poly {
    fn from(value: BigInt) -> Self {
        Poly::constant(value)
    }
}

impl<'a> Add<&'a Poly> for &'a Poly {
    type Output = Poly;

    fn add(self, rhs: &'a Poly) -> Poly {
        let mut res = self.clone();
        for (m, c) in &rhs.terms {
            res.add_term(m.clone(), c.clone());
        }
        res
    }
}

impl Add for Poly {
    type Output = Poly;

    fn add(mut self, rhs: Poly) -> Poly {
        for (m, c) in rhs.terms {
            self.add_term(m, c);
        }
        self
    }
}

impl<'a> Add<&'a Poly> for Poly {
    type Output = Poly;

    fn add(mut self, rhs: &'a Poly) -> Poly {
        for (m, c) in &rhs.terms {
            self.add_term(m.clone(), c.clone());
        }
        self
    }
}

impl<'a> Sub<&'a Poly> for &'a Poly {
    type Output = Poly;

    fn sub(self, rhs: &'a Poly) -> Poly {
        let mut res = self.clone();
        for (m, c) in &rhs.terms {
            res.add_term(m.clone(), -c);
        }
        res
    }
}

impl Sub for Poly {
    type Output = Poly;

    fn sub(mut self, rhs: Poly) -> Poly {
        for (m, c) in rhs.terms {
            self.add_term(m, -c);
        }
        self
    }
}

impl<'a> Sub<&'a Poly> for Poly {
    type Output = Poly;

    fn sub(mut self, rhs: &'a Poly) -> Poly {
        for (m, c) in &rhs.terms {
            self.add_term(m.clone(), -c);
        }
        self
    }
}

impl<'a> Mul<&'a Poly> for &'a Poly {
    type Output = Poly;

    fn mul(self, rhs: &'a Poly) -> Poly {
        let mut res = Poly::zero();
        for (m1, c1) in &self.terms {
            for (m2, c2) in &rhs.terms {
                res.add_term(m1.mul(m2), c1 * c2);
            }
        }
        res
    }
}

impl Mul for Poly {
    type Output = Poly;

    fn mul(self, rhs: Poly) -> Poly {
        &self * &rhs
    }
}

impl<'a> Mul<&'a Poly> for Poly {
    type Output = Poly;

    fn mul(self, rhs: &'a Poly) -> Poly {
        &self * rhs
    }
}

impl Neg for &Poly {
    type Output = Poly;

    fn neg(self) -> Poly {
        Poly {
            terms: self.terms.iter().map(|(m, c)| (m.clone(), -c)).collect(),
        }
    }
}

impl Neg for Poly {
    type Output = Poly;

    fn neg(self) -> Poly {
        -&self
    }
}
