//! The deduction/solution manager.
//!
//! A [`System`] owns the working equations, the [`EquivalenceStore`] whose edges are the
//! raw deductions, and the map of solved variables. Judgements only ever reach it through
//! [`System::apply_rule`] and [`System::update_value`]; everything else is reconciliation:
//!
//! - [`System::clean_deductions`] promotes store entries about a lone variable into
//!   solutions and re-expresses what remains in terms of unsolved variables,
//! - [`System::clean_solutions`] resolves chains and cycles so that every solution value
//!   mentions only unsolved variables,
//! - [`System::clean_equations`] substitutes everything known back into the equations.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write as _;

use itertools::Itertools;
use log::{debug, info};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use rayon::prelude::*;

use crate::config::SolverConfig;
use crate::equation::Equation;
use crate::equivalence::{simplest, EquivalenceStore};
use crate::error::{Error, Result};
use crate::judgement::{Deduction, Rule};
use crate::monomial::Monomial;
use crate::poly::Poly;
use crate::record::DeductionLog;
use crate::symbols::SymbolTable;
use crate::types::Var;

/// Passes of combined solution and monomial substitution per equation.
const MAX_SUBSTITUTION_PASSES: usize = 8;

#[derive(Debug, Clone)]
pub struct System {
    pub(crate) equations: Vec<Equation>,
    pub(crate) store: EquivalenceStore,
    pub(crate) solutions: BTreeMap<Var, Poly>,
    pub(crate) symbols: SymbolTable,
    pub(crate) config: SolverConfig,
    pub(crate) log: DeductionLog,
    pub(crate) num_variables_start: usize,
}

impl System {
    pub fn new(equations: Vec<Equation>, symbols: SymbolTable) -> Self {
        System::with_config(equations, symbols, SolverConfig::default())
    }

    pub fn with_config(equations: Vec<Equation>, symbols: SymbolTable, config: SolverConfig) -> Self {
        let num_variables_start = symbols.len();
        System {
            equations,
            store: EquivalenceStore::new(config.pruning, config.strict),
            solutions: BTreeMap::new(),
            symbols,
            config,
            log: DeductionLog::new(),
            num_variables_start,
        }
    }

    pub fn equations(&self) -> &[Equation] {
        &self.equations
    }

    pub fn store(&self) -> &EquivalenceStore {
        &self.store
    }

    pub fn solutions(&self) -> &BTreeMap<Var, Poly> {
        &self.solutions
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn deduction_log(&self) -> &DeductionLog {
        &self.log
    }

    pub fn num_variables_start(&self) -> usize {
        self.num_variables_start
    }

    /// Sizes of the equations, deductions and solutions.
    pub fn length_tuple(&self) -> (usize, usize, usize) {
        (self.equations.len(), self.store.len(), self.solutions.len())
    }

    /// Records `expr == value`, coming from outside the rule catalogue.
    pub fn update_value(&mut self, expr: &Poly, value: &Poly) -> Result<()> {
        self.update_value_from(expr, value, Rule::External, None)
    }

    /// Binds a variable; identical to [`System::update_value`] with a lone variable.
    pub fn add_solution(&mut self, var: Var, value: &Poly) -> Result<()> {
        self.update_value(&Poly::var(var), value)
    }

    /// Runs a local rule on `eqn` and stores everything it deduces.
    pub fn apply_rule(&mut self, rule: Rule, eqn: &Equation) -> Result<()> {
        let deductions = rule.apply(eqn)?;
        self.apply_deductions(rule, Some(eqn), &deductions)
    }

    pub fn apply_deductions(&mut self, rule: Rule, source: Option<&Equation>, deductions: &[Deduction]) -> Result<()> {
        for ded in deductions {
            self.update_value_from(&ded.lhs, &ded.rhs, rule, source)?;
        }
        Ok(())
    }

    fn update_value_from(&mut self, expr: &Poly, value: &Poly, rule: Rule, source: Option<&Equation>) -> Result<()> {
        let mut expr = expr.clone();
        let mut value = value.clone();

        // 2*x*y = 0 is x*y = 0
        if value.is_zero() {
            let content = expr.content();
            if content > BigInt::one() {
                expr = expr.div_exact(&content);
            }
        }

        if matches!(expr.leading(), Some((_, c)) if c.is_negative()) {
            expr = -expr;
            value = -value;
        }

        // c*m = k becomes m = k/c
        let scaled = match (expr.as_term(), value.as_constant()) {
            (Some((m, c)), Some(k)) if !c.is_one() => Some((m.clone(), c.clone(), k)),
            _ => None,
        };
        if let Some((m, c, k)) = scaled {
            let (q, r) = k.div_rem(&c);
            if !r.is_zero() {
                return Err(Error::contradiction(&expr, &value, "not divisible"));
            }
            expr = Poly::monomial(m);
            value = Poly::constant(q);
        }

        if expr == value {
            return Ok(());
        }
        let stored = self.store.union(&expr, &value)?;
        if stored && self.config.log_deductions {
            self.log.push(rule, source, &expr, &value);
        }
        Ok(())
    }

    /// Root-resolved store entries, sides stated as `(key, root)`.
    fn resolved_edges(&mut self) -> Result<Vec<(Poly, Poly)>> {
        let keys: Vec<Poly> = self.store.iter().map(|(k, _)| k.clone()).collect();
        let mut pairs = Vec::with_capacity(keys.len());
        for key in keys {
            let root = self.store.find(&key)?;
            if root != key {
                pairs.push((key, root));
            }
        }
        pairs.sort();
        Ok(pairs)
    }

    /// Whether `var = value` only restates a solution, as `y = 1 - x` does for `x = 1 - y`.
    fn restates(&self, var: Var, value: &Poly) -> bool {
        value
            .atoms()
            .iter()
            .any(|w| self.solutions.get(w).map_or(false, |s| s.contains_var(var)))
    }

    /// Records `var = value` as a solution, reconciling it with a previous one.
    ///
    /// Returns an equality that still has to go back into the store, if any.
    fn promote(&mut self, var: Var, value: Poly) -> Result<Option<(Poly, Poly)>> {
        let Some(current) = self.solutions.get(&var).cloned() else {
            debug!("solution: {} = {}", var, value);
            self.solutions.insert(var, value);
            return Ok(None);
        };
        if current == value {
            return Ok(None);
        }
        match (current.is_constant(), value.is_constant()) {
            (true, true) => Err(Error::contradiction(&Poly::var(var), &value, "conflicting solutions")),
            (true, false) => Ok(Some((value, current))),
            (false, true) => {
                self.solutions.insert(var, value.clone());
                Ok(Some((current, value)))
            }
            (false, false) => {
                let keep = simplest(&current, &value).clone();
                self.solutions.insert(var, keep);
                Ok(Some((current, value)))
            }
        }
    }

    /// Splits `key = root` into `var = value` if one side is a lone (possibly negated) variable.
    fn as_assignment(key: &Poly, root: &Poly) -> Option<(Var, Poly)> {
        if !key.atoms().is_disjoint(&root.atoms()) {
            return None;
        }
        if let Some(v) = key.as_var() {
            return Some((v, root.clone()));
        }
        if let Some(v) = root.as_var() {
            return Some((v, key.clone()));
        }
        if let Some(v) = key.complement().as_var() {
            return Some((v, root.complement()));
        }
        if let Some(v) = root.complement().as_var() {
            return Some((v, key.complement()));
        }
        None
    }

    /// Promotes store entries into solutions and rebuilds the store from the rest.
    pub fn clean_deductions(&mut self) -> Result<()> {
        for _ in 0..self.config.max_clean_depth {
            let pairs = self.resolved_edges()?;
            let before = self.solutions.clone();

            let mut remaining = Vec::new();
            let mut promoted = false;
            for (key, root) in pairs {
                match Self::as_assignment(&key, &root) {
                    Some((var, value)) if !self.restates(var, &value) => {
                        promoted = true;
                        if let Some(pending) = self.promote(var, value)? {
                            remaining.push(pending);
                        }
                    }
                    _ => remaining.push((key, root)),
                }
            }
            if !promoted {
                return Ok(());
            }

            self.clean_solutions()?;

            self.store.clear();
            let values: HashMap<Var, Poly> = self.solutions.iter().map(|(v, p)| (*v, p.clone())).collect();
            for (key, root) in remaining {
                let eqn = Equation::new(key.substitute(&values), root.substitute(&values));
                let Some(eqn) = eqn.normalize()? else {
                    continue;
                };
                self.update_value_from(&eqn.lhs, &eqn.rhs, Rule::CleanDeductions, None)?;
            }

            if self.solutions == before {
                return Ok(());
            }
        }
        Ok(())
    }

    fn evict(&mut self, var: Var) -> Result<()> {
        if let Some(value) = self.solutions.remove(&var) {
            debug!("evicting {} = {} to equations", var, value);
            if let Some(eqn) = Equation::new(var, value).normalize()? {
                self.equations.push(eqn);
            }
        }
        Ok(())
    }

    /// Makes every solution value mention only unsolved variables.
    pub fn clean_solutions(&mut self) -> Result<()> {
        let mut prev_changed: Option<BTreeSet<Var>> = None;
        for _ in 0..=self.config.max_clean_depth {
            self.check_solutions()?;
            self.break_cycles()?;
            let changed = self.resolve_chains()?;
            if changed.is_empty() {
                return Ok(());
            }
            if prev_changed.as_ref() == Some(&changed) {
                if let Some(&var) = changed.iter().next() {
                    self.evict(var)?;
                }
            }
            prev_changed = Some(changed);
        }
        Err(Error::InternalFault(format!(
            "solutions still changing after {} passes",
            self.config.max_clean_depth
        )))
    }

    fn check_solutions(&mut self) -> Result<()> {
        let long: Vec<Var> = self
            .solutions
            .iter()
            .filter(|(_, value)| value.len() > self.config.max_solution_terms)
            .map(|(var, _)| *var)
            .collect();
        for var in long {
            self.evict(var)?;
        }

        for (var, value) in &self.solutions {
            let binary = value.max_value() >= BigInt::zero() && value.min_value() <= BigInt::one();
            let ground = value.as_constant().map_or(true, |c| c.is_zero() || c.is_one());
            if !binary || !ground {
                return Err(Error::contradiction(&Poly::var(*var), value, "solution cannot be binary"));
            }
        }
        Ok(())
    }

    /// Solved variables that a solution value depends on.
    fn dependencies(&self, value: &Poly) -> Vec<Var> {
        value.atoms().into_iter().filter(|v| self.solutions.contains_key(v)).collect()
    }

    /// Strongly connected components of the dependency graph with more than one member.
    fn cycles(&self) -> Vec<Vec<Var>> {
        // Iterative Tarjan
        let mut index: HashMap<Var, usize> = HashMap::new();
        let mut low: HashMap<Var, usize> = HashMap::new();
        let mut on_stack: BTreeSet<Var> = BTreeSet::new();
        let mut stack: Vec<Var> = Vec::new();
        let mut res = Vec::new();
        let mut counter = 0;

        for &start in self.solutions.keys() {
            if index.contains_key(&start) {
                continue;
            }
            let mut work: Vec<(Var, Vec<Var>)> = vec![(start, self.dependencies(&self.solutions[&start]))];
            index.insert(start, counter);
            low.insert(start, counter);
            counter += 1;
            stack.push(start);
            on_stack.insert(start);

            while let Some((node, deps)) = work.last_mut() {
                let node = *node;
                if let Some(next) = deps.pop() {
                    if !index.contains_key(&next) {
                        index.insert(next, counter);
                        low.insert(next, counter);
                        counter += 1;
                        stack.push(next);
                        on_stack.insert(next);
                        let next_deps = self.dependencies(&self.solutions[&next]);
                        work.push((next, next_deps));
                    } else if on_stack.contains(&next) {
                        let l = low[&node].min(index[&next]);
                        low.insert(node, l);
                    }
                    continue;
                }

                work.pop();
                if let Some((parent, _)) = work.last() {
                    let l = low[parent].min(low[&node]);
                    low.insert(*parent, l);
                }
                if low[&node] == index[&node] {
                    let mut component = Vec::new();
                    while let Some(v) = stack.pop() {
                        on_stack.remove(&v);
                        component.push(v);
                        if v == node {
                            break;
                        }
                    }
                    if component.len() > 1 {
                        component.sort();
                        res.push(component);
                    }
                }
            }
        }
        res
    }

    fn break_cycles(&mut self) -> Result<()> {
        for cycle in self.cycles() {
            let renaming = cycle.iter().all(|v| self.solutions[v].as_var().is_some());
            if renaming {
                // Every member equals every other: keep the smallest one unsolved
                let rep = cycle[0];
                debug!("collapsing renaming cycle onto {}", rep);
                self.solutions.remove(&rep);
                for &v in &cycle[1..] {
                    self.solutions.insert(v, Poly::var(rep));
                }
            } else {
                debug!("breaking cycle of {} solutions", cycle.len());
                for &v in &cycle {
                    self.evict(v)?;
                }
            }
        }
        Ok(())
    }

    /// Substitutes solutions into solutions in dependency order. Returns the changed keys.
    fn resolve_chains(&mut self) -> Result<BTreeSet<Var>> {
        let mut resolved: BTreeMap<Var, Poly> = BTreeMap::new();
        let mut changed = BTreeSet::new();
        let keys: Vec<Var> = self.solutions.keys().copied().collect();

        for start in keys {
            if resolved.contains_key(&start) {
                continue;
            }
            // Post-order walk over the (acyclic) dependency graph
            let mut stack = vec![(start, false)];
            let mut visited = BTreeSet::new();
            let mut steps = 0;
            while let Some((var, expanded)) = stack.pop() {
                steps += 1;
                if steps > self.config.max_chain {
                    return Err(Error::InternalFault(format!("solution chain from {} too long", start)));
                }
                if resolved.contains_key(&var) {
                    continue;
                }
                let Some(value) = self.solutions.get(&var) else {
                    continue;
                };
                if expanded {
                    let subs: HashMap<Var, Poly> = self
                        .dependencies(value)
                        .into_iter()
                        .filter(|d| *d != var)
                        .filter_map(|d| resolved.get(&d).map(|p| (d, p.clone())))
                        .collect();
                    resolved.insert(var, value.substitute(&subs));
                    continue;
                }
                if !visited.insert(var) {
                    continue;
                }
                stack.push((var, true));
                for dep in self.dependencies(value) {
                    if dep != var && !resolved.contains_key(&dep) {
                        stack.push((dep, false));
                    }
                }
            }
        }

        let mut new_solutions = BTreeMap::new();
        for (var, value) in resolved {
            if value.contains_var(var) {
                // x = x*y is not a solution, it is a deduction
                self.update_value_from(&Poly::var(var), &value, Rule::CleanSolutions, None)?;
                changed.insert(var);
                continue;
            }
            if self.solutions.get(&var) != Some(&value) {
                changed.insert(var);
            }
            new_solutions.insert(var, value);
        }
        self.solutions = new_solutions;
        Ok(changed)
    }

    /// Monomial store keys of degree two or more, mapped to their roots.
    fn monomial_substitutions(&mut self) -> Result<Vec<(Monomial, Poly)>> {
        let mut subs = Vec::new();
        for (key, root) in self.resolved_edges()? {
            if let Some(m) = key.as_monomial() {
                if m.degree() >= 2 {
                    subs.push((m.clone(), root));
                }
            }
        }
        Ok(subs)
    }

    /// Substitutes solutions and monomial deductions into the working equations, then
    /// normalizes, deduplicates and augments them.
    pub fn clean_equations(&mut self) -> Result<()> {
        self.clean_deductions()?;
        self.clean_solutions()?;

        let values: HashMap<Var, Poly> = self.solutions.iter().map(|(v, p)| (*v, p.clone())).collect();
        let monomials = self.monomial_substitutions()?;
        let substitute = |eqn: &Equation| substitute_equation(eqn, &values, &monomials);

        let substituted: Vec<Equation> = if self.config.parallel {
            self.equations.par_iter().map(substitute).collect()
        } else {
            self.equations.iter().map(substitute).collect()
        };

        let mut cleaned = Vec::with_capacity(substituted.len());
        for eqn in substituted {
            if let Some(eqn) = eqn.normalize()? {
                cleaned.push(eqn);
            }
        }

        if cleaned.len() < self.config.quadratic_limit {
            let mut all = cleaned.clone();
            all.extend(self.deductions_as_equations()?);
            cleaned.extend(augment(&all)?);
        }

        self.equations = cleaned.into_iter().unique().collect();
        Ok(())
    }

    /// The store entries, as normalized equations.
    pub fn deductions_as_equations(&self) -> Result<Vec<Equation>> {
        let mut res = Vec::new();
        for (key, value) in self.store.iter() {
            if let Some(eqn) = Equation::new(key.clone(), value.clone()).normalize()? {
                res.push(eqn);
            }
        }
        res.sort();
        Ok(res.into_iter().unique().collect())
    }

    /// Working equations plus deductions, deduplicated and sorted by their rendering.
    pub fn final_equations(&self) -> Result<Vec<Equation>> {
        let mut all = self.equations.clone();
        all.extend(self.deductions_as_equations()?);
        let mut all: Vec<Equation> = all.into_iter().unique().collect();
        all.sort_by_cached_key(|e| e.to_string());
        Ok(all)
    }

    /// Solutions whose value is not just `0`, `1`, `y` or `1 - y`, as equations.
    pub fn non_trivial_solutions(&self) -> Result<Vec<Equation>> {
        let mut res = Vec::new();
        for (var, value) in &self.solutions {
            if value.is_simple_binary() {
                continue;
            }
            if let Some(eqn) = Equation::new(*var, value.clone()).normalize()? {
                res.push(eqn);
            }
        }
        Ok(res)
    }

    /// Variables with no solution.
    pub fn unsolved_variables(&self) -> Vec<Var> {
        self.symbols.vars().filter(|v| !self.solutions.contains_key(v)).collect()
    }

    /// Human-readable summary of the state.
    pub fn summary(&self) -> Result<String> {
        let mut out = String::new();
        let final_equations = self.final_equations()?;
        writeln!(out, "Num variables: {}", self.num_variables_start).unwrap();
        writeln!(out, "Num remaining variables: {}", self.unsolved_variables().len()).unwrap();
        writeln!(out, "Num equations: {}", final_equations.len()).unwrap();
        writeln!(out, "Equations:").unwrap();
        for eqn in &final_equations {
            writeln!(out, "  {}", self.symbols.show_equation(eqn)).unwrap();
        }
        writeln!(out, "Solutions:").unwrap();
        for (var, value) in &self.solutions {
            let name = self.symbols.name(*var).map(str::to_string).unwrap_or_else(|| var.to_string());
            writeln!(out, "  {} = {}", name, self.symbols.show(value)).unwrap();
        }
        if self.config.log_deductions {
            out.push_str(&self.log.render(&self.symbols));
        }
        Ok(out)
    }

    pub(crate) fn log_state(&self, round: usize) {
        let (e, d, s) = self.length_tuple();
        info!("{}\t{}\t{}\t{}", round, e, d, s);
    }
}

fn substitute_equation(eqn: &Equation, values: &HashMap<Var, Poly>, monomials: &[(Monomial, Poly)]) -> Equation {
    let mut current = eqn.clone();
    for _ in 0..MAX_SUBSTITUTION_PASSES {
        let mut next = current.substitute(values);
        for (m, root) in monomials {
            next = Equation::new(next.lhs.substitute_monomial(m, root), next.rhs.substitute_monomial(m, root));
        }
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// From `a = b` and `a = c` with `a` non-constant, derive `b = c`.
fn augment(equations: &[Equation]) -> Result<Vec<Equation>> {
    let mut res = Vec::new();
    for (i, e1) in equations.iter().enumerate() {
        for e2 in &equations[i + 1..] {
            for a in [e1.clone(), e1.swapped()] {
                for b in [e2.clone(), e2.swapped()] {
                    if a.lhs != b.lhs || a.rhs == b.rhs || a.lhs.is_constant() {
                        continue;
                    }
                    let new = Equation::new(a.rhs.clone(), b.rhs.clone()).balance_terms();
                    if new.lhs.len() == 1 && new.rhs.len() == 1 {
                        continue;
                    }
                    if let Some(eqn) = new.normalize()? {
                        res.push(eqn);
                    }
                }
            }
        }
    }
    Ok(res)
}
