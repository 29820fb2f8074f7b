//! Log of which rule produced which deduction.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::equation::Equation;
use crate::judgement::Rule;
use crate::poly::Poly;
use crate::symbols::SymbolTable;

/// One stored update, together with its provenance.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DeductionRecord {
    pub rule: Rule,
    pub source: Option<Equation>,
    pub lhs: Poly,
    pub rhs: Poly,
}

#[derive(Debug, Clone, Default)]
pub struct DeductionLog {
    records: Vec<DeductionRecord>,
}

impl DeductionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rule: Rule, source: Option<&Equation>, lhs: &Poly, rhs: &Poly) {
        self.records.push(DeductionRecord {
            rule,
            source: source.cloned(),
            lhs: lhs.clone(),
            rhs: rhs.clone(),
        });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeductionRecord> {
        self.records.iter()
    }

    /// Records grouped by rule, in order of arrival within each group.
    pub fn by_rule(&self) -> BTreeMap<Rule, Vec<&DeductionRecord>> {
        let mut groups: BTreeMap<Rule, Vec<&DeductionRecord>> = BTreeMap::new();
        for record in &self.records {
            groups.entry(record.rule).or_default().push(record);
        }
        groups
    }

    /// Renders the log grouped by rule, then by source equation.
    ///
    /// Internal bookkeeping updates (cleaning passes) are left out.
    pub fn render(&self, symbols: &SymbolTable) -> String {
        let mut out = String::new();
        for (rule, records) in self.by_rule() {
            if matches!(rule, Rule::CleanDeductions | Rule::CleanSolutions) {
                continue;
            }
            writeln!(out, "\n{}", rule).unwrap();

            let mut sources: Vec<(String, Vec<String>)> = Vec::new();
            for record in records {
                let source = match &record.source {
                    Some(eqn) => symbols.show_equation(eqn),
                    None => "-".to_string(),
                };
                let ded = format!("{}={}", symbols.show(&record.lhs), symbols.show(&record.rhs));
                match sources.iter_mut().find(|(s, _)| *s == source) {
                    Some((_, deds)) => deds.push(ded),
                    None => sources.push((source, vec![ded])),
                }
            }
            for (source, deds) in sources {
                writeln!(out, "{:<25}\t=>\t{}", source, deds.join(", ")).unwrap();
            }
        }
        out
    }
}
