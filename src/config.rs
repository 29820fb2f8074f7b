//! Tunable thresholds of the solver.
//!
//! The escalation thresholds and search caps were tuned empirically on factorization
//! systems; they are plain configuration rather than algorithmic constants.

use crate::error::{Error, Result};

/// Solver configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Maximum number of rounds of the solve loop.
    pub max_iter: usize,
    /// Stop once the state has been unchanged for more than this many rounds.
    pub max_stuck: usize,
    /// Equation augmentation (pairwise comparison) is skipped at this many equations.
    pub quadratic_limit: usize,
    /// Length of the trailing window of solution counts used to detect oscillation.
    pub oscillation_window: usize,
    /// Solution counts within `+-oscillation_band` of the oldest one count as settled.
    pub oscillation_band: usize,
    /// Cap on steps when following a chain of solutions.
    pub max_chain: usize,
    /// Cap on repeated passes of solution cleaning.
    pub max_clean_depth: usize,
    /// Solutions with more additive terms than this are turned back into equations.
    pub max_solution_terms: usize,
    /// Only equations with at most this many terms are squared.
    pub square_term_limit: usize,
    /// An equation is "short" for the multi-equation search below this many terms.
    pub short_equation_terms: usize,
    /// Number of short equations combined in the first multi-equation search.
    pub short_combination_size: usize,
    /// Variables enumerated by the first multi-equation search.
    pub short_search_vars: usize,
    /// Absolute cap on variables enumerated by any mini-assumption search.
    pub max_search_vars: usize,
    /// Restrict n-term substitution to linear values (`x = 1 - y + z`).
    pub invariant_interactions_on_substitution: bool,
    /// Compress paths in the equivalence store on lookup.
    pub pruning: bool,
    /// Reject non simple-binary nodes in the equivalence store.
    pub strict: bool,
    /// Record which rule produced every deduction.
    pub log_deductions: bool,
    /// Run batch substitution on the rayon thread pool.
    pub parallel: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iter: 250,
            max_stuck: 4,
            quadratic_limit: 350,
            oscillation_window: 10,
            oscillation_band: 1,
            max_chain: 1000,
            max_clean_depth: 50,
            max_solution_terms: 10,
            square_term_limit: 20,
            short_equation_terms: 5,
            short_combination_size: 3,
            short_search_vars: 5,
            max_search_vars: 6,
            invariant_interactions_on_substitution: true,
            pruning: true,
            strict: false,
            log_deductions: false,
            parallel: false,
        }
    }
}

impl SolverConfig {
    /// Number of variables enumerated by the single-equation search after `stuck` rounds.
    pub fn search_vars(&self, stuck: usize) -> usize {
        (3 * stuck + 2).min(self.max_search_vars)
    }

    /// Every option as a `(name, value)` pair, in declaration order.
    pub fn options(&self) -> Vec<(&'static str, String)> {
        vec![
            ("max_iter", self.max_iter.to_string()),
            ("max_stuck", self.max_stuck.to_string()),
            ("quadratic_limit", self.quadratic_limit.to_string()),
            ("oscillation_window", self.oscillation_window.to_string()),
            ("oscillation_band", self.oscillation_band.to_string()),
            ("max_chain", self.max_chain.to_string()),
            ("max_clean_depth", self.max_clean_depth.to_string()),
            ("max_solution_terms", self.max_solution_terms.to_string()),
            ("square_term_limit", self.square_term_limit.to_string()),
            ("short_equation_terms", self.short_equation_terms.to_string()),
            ("short_combination_size", self.short_combination_size.to_string()),
            ("short_search_vars", self.short_search_vars.to_string()),
            ("max_search_vars", self.max_search_vars.to_string()),
            (
                "invariant_interactions_on_substitution",
                self.invariant_interactions_on_substitution.to_string(),
            ),
            ("pruning", self.pruning.to_string()),
            ("strict", self.strict.to_string()),
            ("log_deductions", self.log_deductions.to_string()),
            ("parallel", self.parallel.to_string()),
        ]
    }

    /// Sets the option `name` from its textual value.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<()> {
        fn num(name: &str, value: &str) -> Result<usize> {
            value
                .parse()
                .map_err(|_| Error::Parse(format!("invalid value '{}' for {}", value, name)))
        }
        fn flag(name: &str, value: &str) -> Result<bool> {
            value
                .parse()
                .map_err(|_| Error::Parse(format!("invalid value '{}' for {}", value, name)))
        }

        match name {
            "max_iter" => self.max_iter = num(name, value)?,
            "max_stuck" => self.max_stuck = num(name, value)?,
            "quadratic_limit" => self.quadratic_limit = num(name, value)?,
            "oscillation_window" => self.oscillation_window = num(name, value)?,
            "oscillation_band" => self.oscillation_band = num(name, value)?,
            "max_chain" => self.max_chain = num(name, value)?,
            "max_clean_depth" => self.max_clean_depth = num(name, value)?,
            "max_solution_terms" => self.max_solution_terms = num(name, value)?,
            "square_term_limit" => self.square_term_limit = num(name, value)?,
            "short_equation_terms" => self.short_equation_terms = num(name, value)?,
            "short_combination_size" => self.short_combination_size = num(name, value)?,
            "short_search_vars" => self.short_search_vars = num(name, value)?,
            "max_search_vars" => self.max_search_vars = num(name, value)?,
            "invariant_interactions_on_substitution" => {
                self.invariant_interactions_on_substitution = flag(name, value)?
            }
            "pruning" => self.pruning = flag(name, value)?,
            "strict" => self.strict = flag(name, value)?,
            "log_deductions" => self.log_deductions = flag(name, value)?,
            "parallel" => self.parallel = flag(name, value)?,
            _ => return Err(Error::Parse(format!("unknown option '{}'", name))),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_vars_capped() {
        let config = SolverConfig::default();
        assert_eq!(config.search_vars(1), 5);
        assert_eq!(config.search_vars(2), 6);
        assert_eq!(config.search_vars(10), 6);
    }

    #[test]
    fn test_options_round_trip() {
        let mut config = SolverConfig {
            max_iter: 7,
            strict: true,
            ..SolverConfig::default()
        };
        config.set_option("quadratic_limit", "12").unwrap();

        let mut restored = SolverConfig::default();
        for (name, value) in config.options() {
            restored.set_option(name, &value).unwrap();
        }
        assert_eq!(restored, config);
        assert_eq!(restored.quadratic_limit, 12);
    }

    #[test]
    fn test_bad_options() {
        let mut config = SolverConfig::default();
        assert!(config.set_option("max_iter", "many").is_err());
        assert!(config.set_option("strict", "1").is_err());
        assert!(config.set_option("colour", "blue").is_err());
    }
}
