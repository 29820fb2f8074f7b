//! Brute-force soundness checks for the judgements and contradiction checks.
//!
//! Every equation of a small family is enumerated over all {0,1} assignments. A deduction
//! must hold in every model of its source equation, and an equation with models must never
//! be reported as a contradiction.

use binpoly::assumption::{mini_assumption, mini_assumption_multi, RankBy};
use binpoly::contradiction::check_equation;
use binpoly::equation::{Equation, Square};
use binpoly::judgement::{Deduction, Rule};
use binpoly::monomial::Monomial;
use binpoly::poly::Poly;
use binpoly::types::Var;
use num_bigint::BigInt;

const NUM_VARS: u32 = 4;

fn bit(bits: u64, var: Var) -> bool {
    (bits >> (var.id() - 1)) & 1 == 1
}

fn models(eqns: &[&Equation]) -> Vec<u64> {
    (0..1u64 << NUM_VARS)
        .filter(|&bits| eqns.iter().all(|e| e.is_satisfied_by(|v| bit(bits, v))))
        .collect()
}

fn holds(ded: &Deduction, bits: u64) -> bool {
    ded.lhs.eval(|v| bit(bits, v)) == ded.rhs.eval(|v| bit(bits, v))
}

fn local_rules() -> Vec<Rule> {
    let mut rules = vec![
        Rule::SingleTerm,
        Rule::ProductOne,
        Rule::MinMax,
        Rule::Boundary,
        Rule::SumToOne,
        Rule::RangeExclusion,
        Rule::StrictMin,
        Rule::Parity,
        Rule::DoubledSum,
    ];
    for n in 2..=5 {
        for allow_products in [false, true] {
            rules.push(Rule::NTerm { n, allow_products });
        }
    }
    rules
}

/// `a*x + b*y + c*x*y + d*z*w + e*w = k` for small coefficients, normalized.
fn family() -> Vec<Equation> {
    let v = |i: u32| Var::new(i);
    let monomials = [
        Monomial::var(v(1)),
        Monomial::var(v(2)),
        Monomial::from_vars([v(1), v(2)]),
        Monomial::from_vars([v(3), v(4)]),
        Monomial::var(v(4)),
    ];
    let coefficients = [-2, -1, 0, 1, 2];

    let mut res = Vec::new();
    let mut choice = [0usize; 5];
    loop {
        let lhs = Poly::from_terms(
            monomials
                .iter()
                .zip(choice.iter())
                .map(|(m, &i)| (m.clone(), BigInt::from(coefficients[i]))),
        );
        for k in -1..=3 {
            if let Ok(Some(eqn)) = Equation::new(lhs.clone(), Poly::constant(k)).normalize() {
                res.push(eqn);
            }
        }

        // Odometer over the coefficient choices
        let mut i = 0;
        while i < choice.len() && choice[i] == coefficients.len() - 1 {
            choice[i] = 0;
            i += 1;
        }
        if i == choice.len() {
            break;
        }
        choice[i] += 1;
    }
    res.sort();
    res.dedup();
    res
}

#[test]
fn judgements_are_sound() {
    let rules = local_rules();
    for eqn in family() {
        let sat = models(&[&eqn]);
        for &rule in &rules {
            match rule.apply(&eqn) {
                Ok(deductions) => {
                    for ded in &deductions {
                        for &bits in &sat {
                            assert!(holds(ded, bits), "{} on {} gave {} (model {:b})", rule, eqn, ded, bits);
                        }
                    }
                }
                Err(e) => {
                    assert!(e.is_contradiction());
                    assert!(sat.is_empty(), "{} rejected satisfiable {}", rule, eqn);
                }
            }
        }
    }
}

#[test]
fn contradiction_checks_have_no_false_positives() {
    for eqn in family() {
        if check_equation(&eqn).is_err() {
            assert!(models(&[&eqn]).is_empty(), "{} rejected but satisfiable", eqn);
        }
    }
}

#[test]
fn squaring_is_implied() {
    for eqn in family() {
        let sat = models(&[&eqn]);
        for method in [Square::Sides, Square::Difference] {
            let squared = eqn.square(method);
            for &bits in &sat {
                assert!(squared.is_satisfied_by(|v| bit(bits, v)), "{:?} of {}", method, eqn);
            }
        }
    }
}

#[test]
fn mini_assumption_is_sound() {
    for eqn in family() {
        let sat = models(&[&eqn]);
        for rank in [RankBy::Frequency, RankBy::Coefficient] {
            for num_vars in [2, 4] {
                match mini_assumption(&eqn, num_vars, rank) {
                    Ok(deductions) => {
                        for ded in &deductions {
                            for &bits in &sat {
                                assert!(holds(ded, bits), "search on {} gave {}", eqn, ded);
                            }
                        }
                    }
                    Err(e) => {
                        assert!(e.is_contradiction());
                        assert!(sat.is_empty(), "search rejected satisfiable {}", eqn);
                    }
                }
            }
        }
    }
}

#[test]
fn multi_assumption_is_sound() {
    let family = family();
    // Pair every equation with a few fixed partners
    let partners: Vec<&Equation> = family.iter().step_by(1499).collect();
    for eqn in &family {
        for &other in &partners {
            let group = [eqn, other];
            let sat = models(&group);
            match mini_assumption_multi(&group, 4, RankBy::Frequency) {
                Ok(deductions) => {
                    for ded in &deductions {
                        for &bits in &sat {
                            assert!(holds(ded, bits), "search on {} and {} gave {}", eqn, other, ded);
                        }
                    }
                }
                Err(e) => {
                    assert!(e.is_contradiction());
                    assert!(sat.is_empty(), "search rejected satisfiable {} and {}", eqn, other);
                }
            }
        }
    }
}
