//! Square-free monomials over binary variables.
//!
//! Because every variable takes values in {0,1}, `v^n = v` for all `n >= 1`, so a
//! monomial is fully described by the *set* of variables it mentions. The variables are
//! kept sorted and deduplicated, which makes multiplication a sorted merge.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use crate::types::Var;

/// A product of distinct binary variables. The empty product is the constant 1.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Default)]
pub struct Monomial(Vec<Var>);

impl Monomial {
    /// The empty product.
    pub fn one() -> Self {
        Monomial(Vec::new())
    }

    pub fn var(var: Var) -> Self {
        Monomial(vec![var])
    }

    /// Builds a monomial from arbitrary variables, collapsing repeats.
    pub fn from_vars(vars: impl IntoIterator<Item = Var>) -> Self {
        let mut vars: Vec<Var> = vars.into_iter().collect();
        vars.sort_unstable();
        vars.dedup();
        Monomial(vars)
    }

    pub fn vars(&self) -> &[Var] {
        &self.0
    }

    pub fn degree(&self) -> usize {
        self.0.len()
    }

    pub fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the variable if this monomial is a single variable.
    pub fn as_var(&self) -> Option<Var> {
        match self.0.as_slice() {
            [v] => Some(*v),
            _ => None,
        }
    }

    pub fn contains(&self, var: Var) -> bool {
        self.0.binary_search(&var).is_ok()
    }

    /// Product of two monomials (sorted union).
    pub fn mul(&self, other: &Monomial) -> Monomial {
        let mut res = Vec::with_capacity(self.0.len() + other.0.len());
        let (mut i, mut j) = (0, 0);
        while i < self.0.len() && j < other.0.len() {
            match self.0[i].cmp(&other.0[j]) {
                Ordering::Less => {
                    res.push(self.0[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    res.push(other.0[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    res.push(self.0[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        res.extend_from_slice(&self.0[i..]);
        res.extend_from_slice(&other.0[j..]);
        Monomial(res)
    }

    /// Whether every variable of `self` occurs in `other`.
    pub fn divides(&self, other: &Monomial) -> bool {
        self.0.iter().all(|v| other.contains(*v))
    }

    /// Removes the variables of `divisor`. Only meaningful when `divisor.divides(self)`.
    pub fn without(&self, divisor: &Monomial) -> Monomial {
        Monomial(self.0.iter().copied().filter(|v| !divisor.contains(*v)).collect())
    }

    pub fn atoms(&self) -> BTreeSet<Var> {
        self.0.iter().copied().collect()
    }

    /// Renders the monomial with a custom variable formatter, e.g. `x*y*z`.
    pub fn to_string_with<F>(&self, name: &F) -> String
    where
        F: Fn(Var) -> String,
    {
        if self.0.is_empty() {
            return "1".to_string();
        }
        self.0.iter().map(|&v| name(v)).collect::<Vec<_>>().join("*")
    }
}

/// Graded order: higher degree first, then lexicographic on variable ids.
///
/// The constant monomial therefore sorts last, which is also the printing order.
impl Ord for Monomial {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.len().cmp(&self.0.len()).then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Monomial {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with(&|v: Var| v.to_string()))
    }
}
