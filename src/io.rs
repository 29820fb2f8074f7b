//! Saving and restoring the state of a [`System`].
//!
//! # State File Format
//!
//! ```text
//! state <num_variables_start>
//! v <name>                 # variable, in id order
//! o <option> <value>       # solver option
//! e <lhs> = <rhs>          # working equation
//! d <key> = <value>        # raw deduction (store edge)
//! s <name> = <value>       # solution
//! ```
//!
//! Lines starting with `c` are comments. Polynomials are written with variable names, in
//! the syntax accepted by [`parse`][crate::parse].

use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::Path;

use log::debug;

use crate::config::SolverConfig;
use crate::equation::Equation;
use crate::error::{Error, Result};
use crate::parse::parse_equation;
use crate::symbols::SymbolTable;
use crate::system::System;

impl System {
    /// Saves the state to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_state_string())?;
        Ok(())
    }

    /// Converts the state to its textual form.
    pub fn to_state_string(&self) -> String {
        let mut output = String::new();

        writeln!(output, "c binpoly state").unwrap();
        writeln!(output, "c v name | o option value | e equation | d deduction | s solution").unwrap();
        writeln!(output, "state {}", self.num_variables_start).unwrap();

        for var in self.symbols.vars() {
            writeln!(output, "v {}", self.symbols.name(var).unwrap_or_default()).unwrap();
        }
        for (name, value) in self.config.options() {
            writeln!(output, "o {} {}", name, value).unwrap();
        }
        for eqn in &self.equations {
            writeln!(output, "e {}", self.symbols.show_equation(eqn)).unwrap();
        }
        let mut edges: Vec<_> = self.store.iter().collect();
        edges.sort();
        for (key, value) in edges {
            writeln!(output, "d {} = {}", self.symbols.show(key), self.symbols.show(value)).unwrap();
        }
        for (var, value) in &self.solutions {
            let name = self.symbols.name(*var).unwrap_or_default();
            writeln!(output, "s {} = {}", name, self.symbols.show(value)).unwrap();
        }

        output
    }

    /// Reads a state from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_state_str(&content)
    }

    /// Parses a state from its textual form.
    pub fn from_state_str(content: &str) -> Result<Self> {
        let mut lines = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.starts_with('c') && !line.is_empty());

        let header = lines.next().ok_or_else(|| Error::Parse("Missing header".into()))?;
        let parts: Vec<&str> = header.split_whitespace().collect();
        if parts.len() != 2 || parts[0] != "state" {
            return Err(Error::Parse(format!("Invalid header: {}", header)));
        }
        let num_variables_start: usize = parts[1]
            .parse()
            .map_err(|_| Error::Parse("Invalid variable count".into()))?;

        let mut symbols = SymbolTable::new();
        let mut config = SolverConfig::default();
        let mut equations = Vec::new();
        let mut edges: Vec<Equation> = Vec::new();
        let mut solutions: Vec<Equation> = Vec::new();

        for line in lines {
            let (kind, rest) = line
                .split_once(' ')
                .ok_or_else(|| Error::Parse(format!("Invalid line: {}", line)))?;
            let rest = rest.trim();
            match kind {
                "v" => {
                    let expected = symbols.len() + 1;
                    let var = symbols.intern(rest);
                    if var.id() as usize != expected {
                        return Err(Error::Parse(format!("Duplicate variable: {}", rest)));
                    }
                }
                "o" => {
                    let (name, value) = rest
                        .split_once(' ')
                        .ok_or_else(|| Error::Parse(format!("Invalid option: {}", line)))?;
                    config.set_option(name, value.trim())?;
                }
                "e" => equations.push(parse_equation(rest, &mut symbols)?),
                "d" => edges.push(parse_equation(rest, &mut symbols)?),
                "s" => solutions.push(parse_equation(rest, &mut symbols)?),
                _ => return Err(Error::Parse(format!("Unknown line type: {}", kind))),
            }
        }

        let mut system = System::with_config(equations, symbols, config);
        system.num_variables_start = num_variables_start;
        for edge in edges {
            system.store.insert_edge(edge.lhs, edge.rhs)?;
        }
        for sol in solutions {
            let var = sol
                .lhs
                .as_var()
                .ok_or_else(|| Error::Parse(format!("Solution for a non-variable: {}", sol.lhs)))?;
            system.solutions.insert(var, sol.rhs);
        }
        debug!("loaded state: {:?}", system.length_tuple());
        Ok(system)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::parse::{parse_equations, parse_poly};
    use crate::poly::Poly;

    fn system(text: &str) -> System {
        let mut table = SymbolTable::new();
        let eqns = parse_equations(text, &mut table).unwrap();
        System::new(eqns, table)
    }

    #[test]
    fn test_state_round_trip() {
        let mut sys = system("x + y + z = 1\na*b + c = 1");
        let xy = parse_poly("x*y", &mut sys.symbols).unwrap();
        sys.update_value(&xy, &Poly::zero()).unwrap();
        let a = sys.symbols().get("a").unwrap();
        sys.add_solution(a, &Poly::one()).unwrap();
        sys.clean_equations().unwrap();

        let text = sys.to_state_string();
        let restored = System::from_state_str(&text).unwrap();
        assert_eq!(restored.to_state_string(), text);
        assert_eq!(restored.length_tuple(), sys.length_tuple());
        assert_eq!(restored.solutions(), sys.solutions());
        assert_eq!(restored.final_equations().unwrap(), sys.final_equations().unwrap());
    }

    #[test]
    fn test_state_keeps_options() {
        let mut table = SymbolTable::new();
        let eqns = parse_equations("x = y", &mut table).unwrap();
        let config = SolverConfig {
            max_iter: 3,
            parallel: true,
            ..SolverConfig::default()
        };
        let sys = System::with_config(eqns, table, config.clone());
        let restored = System::from_state_str(&sys.to_state_string()).unwrap();
        assert_eq!(restored.config(), &config);
    }

    #[test]
    fn test_hand_written_state() {
        let text = "c two mutually complementary solutions\nstate 2\nv x\nv y\ns x = 1 - y\ns y = 1 - x\n";
        let sys = System::from_state_str(text).unwrap();
        assert_eq!(sys.solutions().len(), 2);
        assert!(sys.equations().is_empty());
        assert_eq!(sys.num_variables_start(), 2);
    }

    #[test]
    fn test_invalid_states() {
        assert!(System::from_state_str("").is_err());
        assert!(System::from_state_str("vtree 3").is_err());
        assert!(System::from_state_str("state 1\nv x\nv x").is_err());
        assert!(System::from_state_str("state 1\nq x").is_err());
        assert!(System::from_state_str("state 1\nv x\ns x*x + 1 = 1").is_err());
        assert!(System::from_state_str("state 1\no max_iter lots").is_err());
    }
}
