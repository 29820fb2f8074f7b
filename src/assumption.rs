//! Mini-assumption search.
//!
//! Picks a handful of variables, enumerates all `2^m` assignments of them, and keeps the
//! assignments ("worlds") under which no equation of the group is contradicted by the
//! range or parity checks. Facts that hold in every surviving world hold in every real
//! solution, since the feasibility test only ever over-approximates:
//!
//! - a variable that is constant across all worlds is fixed,
//! - two variables that always agree (or always disagree) are bound equal (or complementary),
//! - two variables that are never both 1 have a zero product.
//!
//! No surviving world at all means the group is infeasible.

use std::collections::BTreeMap;

use log::debug;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::contradiction::check_equation;
use crate::equation::Equation;
use crate::error::{Error, Result};
use crate::judgement::Deduction;
use crate::monomial::Monomial;
use crate::poly::Poly;
use crate::types::Var;

/// Order in which variables enter the enumeration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RankBy {
    /// Number of terms mentioning the variable.
    Frequency,
    /// Sum of the absolute coefficients of the terms mentioning the variable.
    Coefficient,
}

/// Variables of `eqns`, highest rank first; ties go to the lower variable.
pub fn rank_vars(eqns: &[&Equation], rank: RankBy) -> Vec<Var> {
    let mut scores: BTreeMap<Var, BigInt> = BTreeMap::new();
    for eqn in eqns {
        for side in [&eqn.lhs, &eqn.rhs] {
            for (m, c) in side.non_constant_terms() {
                let weight = match rank {
                    RankBy::Frequency => BigInt::from(1),
                    RankBy::Coefficient => c.abs(),
                };
                for &v in m.vars() {
                    *scores.entry(v).or_insert_with(BigInt::zero) += &weight;
                }
            }
        }
    }
    let mut vars: Vec<(Var, BigInt)> = scores.into_iter().collect();
    vars.sort_by(|(v1, s1), (v2, s2)| s2.cmp(s1).then(v1.cmp(v2)));
    vars.into_iter().map(|(v, _)| v).collect()
}

/// Whether every equation of the group in turn shares a variable with another one.
pub fn shares_variables(eqns: &[&Equation]) -> bool {
    if eqns.len() < 2 {
        return true;
    }
    let atoms: Vec<_> = eqns.iter().map(|e| e.atoms()).collect();
    atoms
        .iter()
        .enumerate()
        .all(|(i, a)| atoms.iter().enumerate().any(|(j, b)| i != j && !a.is_disjoint(b)))
}

fn is_feasible(eqns: &[&Equation], world: &BTreeMap<Var, bool>) -> bool {
    eqns.iter().all(|eqn| {
        let partial = Equation::new(eqn.lhs.assign(world), eqn.rhs.assign(world));
        check_equation(&partial).is_ok()
    })
}

fn bit(world: u64, i: usize) -> bool {
    (world >> i) & 1 == 1
}

/// Facts common to all `worlds` over `vars`.
fn common_facts(vars: &[Var], worlds: &[u64]) -> Vec<Deduction> {
    let mut res = Vec::new();
    let mut fixed = vec![false; vars.len()];

    for (i, &v) in vars.iter().enumerate() {
        let first = bit(worlds[0], i);
        if worlds.iter().all(|&w| bit(w, i) == first) {
            fixed[i] = true;
            res.push(Deduction::new(v, if first { 1 } else { 0 }));
        }
    }

    for i in 0..vars.len() {
        for j in i + 1..vars.len() {
            if fixed[i] || fixed[j] {
                continue;
            }
            let (vi, vj) = (Poly::var(vars[i]), Poly::var(vars[j]));
            if worlds.iter().all(|&w| bit(w, i) == bit(w, j)) {
                res.push(Deduction::new(vi, vj));
            } else if worlds.iter().all(|&w| bit(w, i) != bit(w, j)) {
                res.push(Deduction::new(vi, vj.complement()));
            } else if worlds.iter().all(|&w| !(bit(w, i) && bit(w, j))) {
                let product = Monomial::from_vars([vars[i], vars[j]]);
                res.push(Deduction::new(Poly::monomial(product), 0));
            }
        }
    }
    res
}

/// Enumerates the top `num_vars` variables of the group under `rank`.
pub fn mini_assumption_multi(eqns: &[&Equation], num_vars: usize, rank: RankBy) -> Result<Vec<Deduction>> {
    let vars: Vec<Var> = rank_vars(eqns, rank).into_iter().take(num_vars.min(63)).collect();
    if vars.is_empty() {
        return Ok(Vec::new());
    }

    let mut worlds = Vec::new();
    let mut world = BTreeMap::new();
    for bits in 0..(1u64 << vars.len()) {
        for (i, &v) in vars.iter().enumerate() {
            world.insert(v, bit(bits, i));
        }
        if is_feasible(eqns, &world) {
            worlds.push(bits);
        }
    }

    if worlds.is_empty() {
        debug!("no feasible assignment of {} variables", vars.len());
        let eqn = eqns[0];
        return Err(Error::contradiction(&eqn.lhs, &eqn.rhs, "no feasible assignment"));
    }
    Ok(common_facts(&vars, &worlds))
}

/// Single-equation version of [`mini_assumption_multi`].
pub fn mini_assumption(eqn: &Equation, num_vars: usize, rank: RankBy) -> Result<Vec<Deduction>> {
    mini_assumption_multi(&[eqn], num_vars, rank)
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::parse::parse_equation;
    use crate::symbols::SymbolTable;

    fn run(eqns: &[&str], num_vars: usize) -> Result<Vec<String>> {
        let mut table = SymbolTable::new();
        let eqns: Vec<Equation> = eqns.iter().map(|s| parse_equation(s, &mut table).unwrap()).collect();
        let refs: Vec<&Equation> = eqns.iter().collect();
        let deds = mini_assumption_multi(&refs, num_vars, RankBy::Frequency)?;
        let mut res: Vec<String> = deds
            .iter()
            .map(|d| format!("{} = {}", table.show(&d.lhs), table.show(&d.rhs)))
            .collect();
        res.sort();
        Ok(res)
    }

    #[test]
    fn test_exclusive_terms() {
        assert_eq!(run(&["x + y + z = 1"], 3).unwrap(), vec!["x*y = 0", "x*z = 0", "y*z = 0"]);
    }

    #[test]
    fn test_equal_and_fixed() {
        assert_eq!(run(&["x + y = 2*z"], 3).unwrap(), vec!["x = y", "x = z", "y = z"]);
        assert_eq!(run(&["x*y*z = 1"], 3).unwrap(), vec!["x = 1", "y = 1", "z = 1"]);
        assert_eq!(run(&["x + y = 1"], 2).unwrap(), vec!["x = -y + 1"]);
    }

    #[test]
    fn test_combination_of_equations() {
        // Neither equation alone fixes a variable
        assert_eq!(run(&["x + y = 1", "x = y*z"], 3).unwrap(), vec!["x = 0", "y = 1", "z = 0"]);
    }

    #[test]
    fn test_infeasible_group() {
        assert!(run(&["x*y = 2"], 2).unwrap_err().is_contradiction());
        assert!(run(&["x + y = 1", "x = y"], 2).unwrap_err().is_contradiction());
    }

    #[test]
    fn test_rank() {
        let mut table = SymbolTable::new();
        let e = parse_equation("x*y + 4*z + y = 1", &mut table).unwrap();
        let (x, y, z) = (table.get("x").unwrap(), table.get("y").unwrap(), table.get("z").unwrap());
        assert_eq!(rank_vars(&[&e], RankBy::Frequency), vec![y, x, z]);
        assert_eq!(rank_vars(&[&e], RankBy::Coefficient), vec![z, y, x]);
    }

    #[test]
    fn test_shares_variables() {
        let mut table = SymbolTable::new();
        let a = parse_equation("x + y = 1", &mut table).unwrap();
        let b = parse_equation("y = z", &mut table).unwrap();
        let c = parse_equation("u = w", &mut table).unwrap();
        assert!(shares_variables(&[&a, &b]));
        assert!(!shares_variables(&[&a, &b, &c]));
    }
}
