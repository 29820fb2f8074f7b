//! Local inference rules ("judgements").
//!
//! Every rule is a pure function from one equation to the equalities it forces, each of
//! which holds in every {0,1} assignment satisfying the equation. Rules never touch the
//! [`System`][crate::system::System]; the caller feeds the returned [`Deduction`]s into
//! [`System::apply_rule`][crate::system::System::apply_rule], which tags them with the
//! producing [`Rule`].
//!
//! Bounds are the term-by-term ones of [`Poly::min_value`] and [`Poly::max_value`]: a term
//! `c*m` ranges over `[min(0, c), max(0, c)]`, so a side sitting at its bound pins every
//! one of its terms.

use std::fmt;

use log::trace;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::config::SolverConfig;
use crate::equation::Equation;
use crate::error::{Error, Result};
use crate::monomial::Monomial;
use crate::poly::Poly;

/// A forced equality `lhs == rhs`, produced by a rule.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Deduction {
    pub lhs: Poly,
    pub rhs: Poly,
}

impl Deduction {
    pub fn new(lhs: impl Into<Poly>, rhs: impl Into<Poly>) -> Self {
        Self {
            lhs: lhs.into(),
            rhs: rhs.into(),
        }
    }
}

impl fmt::Display for Deduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}

/// Identifies where an update to the store came from.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Rule {
    /// Both sides are single terms.
    SingleTerm,
    /// `c*m = c` forces every factor of `m` to 1.
    ProductOne,
    /// Solve a monic variable of a side with at most `n` terms.
    NTerm { n: usize, allow_products: bool },
    /// `min(lhs) == max(rhs)` pins both sides.
    MinMax,
    /// `lhs - rhs` has a bound equal to zero.
    Boundary,
    /// Positive terms summing to a small constant are mutually exclusive.
    SumToOne,
    /// A term at its maximum would push `lhs - rhs` out of reach of zero.
    RangeExclusion,
    /// A single-term side whose other side cannot take one of its two values.
    StrictMin,
    /// One or two odd terms in `lhs - rhs`.
    Parity,
    /// `a + b = 2*c`.
    DoubledSum,
    /// Enumeration of a few variables of one equation.
    MiniAssumption,
    /// Enumeration of a few variables over a combination of equations.
    MultiAssumption,
    /// Re-insertion while rebuilding the deductions.
    CleanDeductions,
    /// Re-insertion while cleaning the solutions.
    CleanSolutions,
    /// Supplied from outside via [`System::update_value`][crate::system::System::update_value].
    External,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::SingleTerm => write!(f, "single_term"),
            Rule::ProductOne => write!(f, "product_one"),
            Rule::NTerm { n, allow_products } => {
                if *allow_products {
                    write!(f, "n_term({}, products)", n)
                } else {
                    write!(f, "n_term({})", n)
                }
            }
            Rule::MinMax => write!(f, "min_max"),
            Rule::Boundary => write!(f, "boundary"),
            Rule::SumToOne => write!(f, "sum_to_one"),
            Rule::RangeExclusion => write!(f, "range_exclusion"),
            Rule::StrictMin => write!(f, "strict_min"),
            Rule::Parity => write!(f, "parity"),
            Rule::DoubledSum => write!(f, "doubled_sum"),
            Rule::MiniAssumption => write!(f, "mini_assumption"),
            Rule::MultiAssumption => write!(f, "mini_assumption_multi"),
            Rule::CleanDeductions => write!(f, "clean_deductions"),
            Rule::CleanSolutions => write!(f, "clean_solutions"),
            Rule::External => write!(f, "external"),
        }
    }
}

impl Rule {
    /// Applies a single-equation rule. The searches and bookkeeping tags are not local rules
    /// and are rejected with [`Error::InternalFault`].
    pub fn apply(self, eqn: &Equation) -> Result<Vec<Deduction>> {
        let deductions = match self {
            Rule::SingleTerm => single_term(eqn),
            Rule::ProductOne => product_one(eqn)?,
            Rule::NTerm { n, allow_products } => n_term(eqn, n, allow_products),
            Rule::MinMax => min_max(eqn),
            Rule::Boundary => boundary(eqn),
            Rule::SumToOne => sum_to_one(eqn),
            Rule::RangeExclusion => range_exclusion(eqn),
            Rule::StrictMin => strict_min(eqn),
            Rule::Parity => parity(eqn),
            Rule::DoubledSum => doubled_sum(eqn),
            Rule::MiniAssumption
            | Rule::MultiAssumption
            | Rule::CleanDeductions
            | Rule::CleanSolutions
            | Rule::External => {
                return Err(Error::InternalFault(format!("{} is not a local rule", self)));
            }
        };
        if !deductions.is_empty() {
            trace!("{} fired on {}: {} deductions", self, eqn, deductions.len());
        }
        Ok(deductions)
    }
}

/// The rules run on every equation in every round.
pub fn base_rules(config: &SolverConfig) -> Vec<Rule> {
    vec![
        Rule::SingleTerm,
        Rule::ProductOne,
        Rule::MinMax,
        Rule::Boundary,
        Rule::SumToOne,
        Rule::RangeExclusion,
        Rule::StrictMin,
        Rule::Parity,
        Rule::DoubledSum,
        Rule::NTerm {
            n: 2,
            allow_products: !config.invariant_interactions_on_substitution,
        },
    ]
}

/// Both orientations of an equation, as `(side, other)` pairs.
fn orientations(eqn: &Equation) -> [(&Poly, &Poly); 2] {
    [(&eqn.lhs, &eqn.rhs), (&eqn.rhs, &eqn.lhs)]
}

/// `m = 1`, spelled out one variable at a time.
fn monomial_is_one(m: &Monomial) -> Vec<Deduction> {
    m.vars().iter().map(|&v| Deduction::new(v, 1)).collect()
}

/// Pins the term `c*m` at its maximum (`maximal`) or minimum over {0,1}.
fn pin_term(m: &Monomial, c: &BigInt, maximal: bool) -> Vec<Deduction> {
    if m.is_one() {
        return Vec::new();
    }
    if c.is_positive() == maximal {
        monomial_is_one(m)
    } else {
        vec![Deduction::new(Poly::monomial(m.clone()), 0)]
    }
}

fn pin_side(side: &Poly, maximal: bool) -> Vec<Deduction> {
    side.non_constant_terms().flat_map(|(m, c)| pin_term(m, c, maximal)).collect()
}

fn single_term(eqn: &Equation) -> Vec<Deduction> {
    if eqn.lhs.len() <= 1 && eqn.rhs.len() <= 1 && !eqn.expr().is_constant() {
        vec![Deduction::new(eqn.lhs.clone(), eqn.rhs.clone())]
    } else {
        Vec::new()
    }
}

fn product_one(eqn: &Equation) -> Result<Vec<Deduction>> {
    for (side, other) in orientations(eqn) {
        let (Some((m, c)), Some(k)) = (side.as_term(), other.as_constant()) else {
            continue;
        };
        if k.is_zero() {
            continue;
        }
        if &k != c {
            return Err(Error::contradiction(side, other, "product cannot reach constant"));
        }
        return Ok(monomial_is_one(m));
    }
    Ok(Vec::new())
}

fn n_term(eqn: &Equation, n: usize, allow_products: bool) -> Vec<Deduction> {
    let mut res = Vec::new();
    for (side, other) in orientations(eqn) {
        if side.len() > n {
            continue;
        }
        for (m, c) in side.non_constant_terms() {
            let Some(var) = m.as_var() else {
                continue;
            };
            if !c.is_one() {
                continue;
            }
            let rest = side - &Poly::var(var);
            if rest.contains_var(var) || other.contains_var(var) {
                continue;
            }
            let value = other - &rest;
            if !allow_products && value.terms().any(|(m, _)| m.degree() > 1) {
                continue;
            }
            res.push(Deduction::new(var, value));
            break;
        }
    }
    res
}

fn min_max(eqn: &Equation) -> Vec<Deduction> {
    let mut res = Vec::new();
    for (side, other) in orientations(eqn) {
        if side.min_value() == other.max_value() {
            res.extend(pin_side(side, false));
            res.extend(pin_side(other, true));
        }
    }
    res
}

fn boundary(eqn: &Equation) -> Vec<Deduction> {
    let expr = eqn.expr();
    if expr.max_value().is_zero() {
        pin_side(&expr, true)
    } else if expr.min_value().is_zero() {
        pin_side(&expr, false)
    } else {
        Vec::new()
    }
}

fn sum_to_one(eqn: &Equation) -> Vec<Deduction> {
    let mut res = Vec::new();
    for (side, other) in orientations(eqn) {
        let Some(k) = other.as_constant() else {
            continue;
        };
        if !k.is_positive() || side.len() < 2 || side.has_constant() {
            continue;
        }
        if side.terms().any(|(_, c)| !c.is_positive()) {
            continue;
        }
        let terms: Vec<_> = side.terms().collect();
        for (i, (mi, ci)) in terms.iter().enumerate() {
            for (mj, cj) in &terms[i + 1..] {
                if *ci + *cj > k {
                    res.push(Deduction::new(Poly::monomial(mi.mul(mj)), 0));
                }
            }
        }
    }
    res
}

fn range_exclusion(eqn: &Equation) -> Vec<Deduction> {
    let expr = eqn.expr();
    let (lo, hi) = (expr.min_value(), expr.max_value());
    let mut res = Vec::new();
    for (m, c) in expr.non_constant_terms() {
        let width = c.abs();
        if &lo + &width > BigInt::zero() {
            res.extend(pin_term(m, c, false));
        } else if &hi - &width < BigInt::zero() {
            res.extend(pin_term(m, c, true));
        }
    }
    res
}

fn strict_min(eqn: &Equation) -> Vec<Deduction> {
    let mut res = Vec::new();
    for (side, other) in orientations(eqn) {
        let Some((m, c)) = other.as_term() else {
            continue;
        };
        let (lo, hi) = (side.min_value(), side.max_value());
        let reachable = |v: &BigInt| &lo <= v && v <= &hi;
        if !reachable(&BigInt::zero()) {
            res.extend(monomial_is_one(m));
        } else if !reachable(c) {
            res.push(Deduction::new(Poly::monomial(m.clone()), 0));
        }
    }
    res
}

fn parity(eqn: &Equation) -> Vec<Deduction> {
    let expr = eqn.expr();
    let odd: Vec<&Monomial> = expr.non_constant_terms().filter(|(_, c)| c.is_odd()).map(|(m, _)| m).collect();
    let constant_odd = expr.constant_term().is_odd();
    match odd.as_slice() {
        [m] => {
            let value = if constant_odd { 1 } else { 0 };
            vec![Deduction::new(Poly::monomial((*m).clone()), value)]
        }
        [m1, m2] => {
            let rhs = Poly::monomial((*m2).clone());
            let rhs = if constant_odd { rhs.complement() } else { rhs };
            vec![Deduction::new(Poly::monomial((*m1).clone()), rhs)]
        }
        _ => Vec::new(),
    }
}

fn doubled_sum(eqn: &Equation) -> Vec<Deduction> {
    let expr = eqn.expr();
    if expr.has_constant() || expr.len() != 3 {
        return Vec::new();
    }
    // Normalise so that the doubled term is negative
    let expr = if expr.terms().any(|(_, c)| *c == BigInt::from(2)) { -expr } else { expr };
    let singles: Vec<&Monomial> = expr.terms().filter(|(_, c)| c.is_one()).map(|(m, _)| m).collect();
    let doubled: Vec<&Monomial> = expr.terms().filter(|(_, c)| **c == BigInt::from(-2)).map(|(m, _)| m).collect();
    match (singles.as_slice(), doubled.as_slice()) {
        ([a, b], [c]) => {
            let c = Poly::monomial((*c).clone());
            vec![
                Deduction::new(Poly::monomial((*a).clone()), c.clone()),
                Deduction::new(Poly::monomial((*b).clone()), c),
            ]
        }
        _ => Vec::new(),
    }
}
