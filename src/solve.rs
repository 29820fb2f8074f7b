//! The fixed-point solve loop.
//!
//! Every round cleans the equations, checks them for contradictions, runs the base
//! judgements over equations and non-trivial solutions, and reconciles the store. When a
//! round changes nothing, progressively more expensive judgements are tried before giving up.

use std::collections::VecDeque;

use itertools::Itertools;
use log::{debug, info};

use crate::assumption::{mini_assumption, mini_assumption_multi, shares_variables, RankBy};
use crate::contradiction::apply_contradictions;
use crate::equation::{Equation, Square};
use crate::error::Result;
use crate::judgement::{base_rules, Rule};
use crate::system::System;

/// Why [`System::solve`] stopped.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Termination {
    /// Nothing is left to deduce: no equations and no deductions.
    Exhausted,
    /// No progress even after every escalation tier.
    Stuck,
    /// The number of solutions kept bouncing within a narrow band.
    Oscillating,
    /// The round cap was reached.
    MaxIterations,
}

impl System {
    /// Runs judgements to a fixed point. Contradictions propagate to the caller.
    pub fn solve(&mut self) -> Result<Termination> {
        let rules = base_rules(&self.config);
        let mut stuck = 0;
        let mut last = None;
        let mut window: VecDeque<usize> = VecDeque::with_capacity(self.config.oscillation_window + 1);
        let mut termination = Termination::MaxIterations;

        info!("round\tequations\tdeductions\tsolutions");
        for round in 0..self.config.max_iter {
            self.log_state(round);

            self.clean_equations()?;
            let all = self.working_set()?;
            apply_contradictions(&all)?;
            for eqn in &all {
                for &rule in &rules {
                    self.apply_rule(rule, eqn)?;
                }
            }
            self.clean_deductions()?;

            let state = self.length_tuple();
            if last == Some(state) {
                stuck += 1;
            } else {
                stuck = 0;
            }

            if state.0 == 0 && state.1 == 0 {
                termination = Termination::Exhausted;
                break;
            }
            if stuck > self.config.max_stuck {
                termination = Termination::Stuck;
                break;
            }
            if stuck > 0 {
                debug!("stuck for {} rounds, escalating", stuck);
                self.escalate(stuck, &all)?;
                self.clean_deductions()?;
            }
            last = Some(self.length_tuple());

            window.push_back(self.solutions.len());
            if window.len() > self.config.oscillation_window {
                if let Some(oldest) = window.pop_front() {
                    let band = self.config.oscillation_band;
                    if window.iter().all(|&n| n.abs_diff(oldest) <= band) {
                        termination = Termination::Oscillating;
                        break;
                    }
                }
            }
        }

        self.clean_equations()?;
        let (e, d, s) = self.length_tuple();
        info!("solve finished ({:?}): {} equations, {} deductions, {} solutions", termination, e, d, s);
        Ok(termination)
    }

    /// Equations plus non-trivial solutions, the input of every judgement.
    fn working_set(&self) -> Result<Vec<Equation>> {
        let mut all = self.final_equations()?;
        all.extend(self.non_trivial_solutions()?);
        Ok(all)
    }

    fn escalate(&mut self, stuck: usize, eqns: &[Equation]) -> Result<()> {
        let num_vars = self.config.search_vars(stuck);
        self.single_search(eqns, num_vars)?;

        match stuck {
            1 => {
                self.squaring_tier(eqns)?;
                self.complex_tier(eqns)?;
            }
            2 => {
                let before = self.length_tuple();
                let squared = self.squaring_tier(eqns)?;
                if self.length_tuple() == before {
                    self.complex_tier(&squared)?;
                }
            }
            _ => {
                let size = (stuck / 2).max(2);
                self.multi_search(eqns, size, num_vars)?;
                let mut rules = vec![Rule::NTerm {
                    n: stuck + 2,
                    allow_products: false,
                }];
                if stuck > 3 {
                    rules.push(Rule::NTerm {
                        n: stuck + 2,
                        allow_products: true,
                    });
                }
                for eqn in eqns {
                    for &rule in &rules {
                        self.apply_rule(rule, eqn)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn single_search(&mut self, eqns: &[Equation], num_vars: usize) -> Result<()> {
        for eqn in eqns {
            for rank in [RankBy::Frequency, RankBy::Coefficient] {
                let deductions = mini_assumption(eqn, num_vars, rank)?;
                self.apply_deductions(Rule::MiniAssumption, Some(eqn), &deductions)?;
            }
        }
        Ok(())
    }

    /// Mini-assumption over every `size`-combination of equations that share variables.
    fn multi_search(&mut self, eqns: &[Equation], size: usize, num_vars: usize) -> Result<()> {
        for group in eqns.iter().combinations(size) {
            if !shares_variables(&group) {
                continue;
            }
            for rank in [RankBy::Frequency, RankBy::Coefficient] {
                let deductions = mini_assumption_multi(&group, num_vars, rank)?;
                self.apply_deductions(Rule::MultiAssumption, None, &deductions)?;
            }
        }
        Ok(())
    }

    /// Runs the base judgements on squared forms of short equations; returns the squares.
    fn squaring_tier(&mut self, eqns: &[Equation]) -> Result<Vec<Equation>> {
        let rules = base_rules(&self.config);
        let mut squared = Vec::new();
        for eqn in eqns {
            if eqn.num_terms() > self.config.square_term_limit {
                continue;
            }
            for method in [Square::Sides, Square::Difference] {
                if let Some(sq) = eqn.square(method).normalize()? {
                    squared.push(sq);
                }
            }
        }
        for sq in &squared {
            for &rule in &rules {
                self.apply_rule(rule, sq)?;
            }
        }
        Ok(squared)
    }

    fn complex_tier(&mut self, eqns: &[Equation]) -> Result<()> {
        let short: Vec<Equation> = eqns
            .iter()
            .filter(|e| e.num_terms() < self.config.short_equation_terms)
            .cloned()
            .collect();
        for size in 2..=self.config.short_combination_size {
            self.multi_search(&short, size, self.config.short_search_vars)?;
        }
        let rule = Rule::NTerm {
            n: 3,
            allow_products: !self.config.invariant_interactions_on_substitution,
        };
        for eqn in eqns {
            self.apply_rule(rule, eqn)?;
        }
        Ok(())
    }
}
