use std::collections::HashMap;

use crate::equation::Equation;
use crate::poly::Poly;
use crate::types::Var;

/// Interning table mapping variable names to [`Var`] ids and back.
///
/// Ids are handed out in order of first appearance, starting from 1.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    names: Vec<String>,
    index: HashMap<String, Var>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the variable for `name`, creating it if needed.
    pub fn intern(&mut self, name: &str) -> Var {
        if let Some(&var) = self.index.get(name) {
            return var;
        }
        let var = Var::new(self.names.len() as u32 + 1);
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), var);
        var
    }

    pub fn get(&self, name: &str) -> Option<Var> {
        self.index.get(name).copied()
    }

    pub fn name(&self, var: Var) -> Option<&str> {
        self.names.get(var.id() as usize - 1).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All known variables, in id order.
    pub fn vars(&self) -> impl Iterator<Item = Var> + '_ {
        (1..=self.names.len() as u32).map(Var::new)
    }

    /// Renders a polynomial using variable names.
    pub fn show(&self, poly: &Poly) -> String {
        poly.to_string_with(|var| match self.name(var) {
            Some(name) => name.to_string(),
            None => var.to_string(),
        })
    }

    /// Renders an equation using variable names.
    pub fn show_equation(&self, eqn: &Equation) -> String {
        format!("{} = {}", self.show(&eqn.lhs), self.show(&eqn.rhs))
    }
}
