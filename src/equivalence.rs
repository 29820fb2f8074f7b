//! Union-find over binary polynomials.
//!
//! Every expression is equivalent to itself at the outset. [`EquivalenceStore::union`]
//! connects the *roots* of two expressions and [`EquivalenceStore::find`] follows edges to
//! the canonical representative. Root selection keeps the store useful for substitution:
//!
//! - constants are always roots (ground states win),
//! - an expression with an additive constant (`1 - x`) beats one without, so that single
//!   variables end up as keys and can be substituted out,
//! - otherwise the expression with fewer atoms wins, ties keeping the existing root.
//!
//! The store also understands the binary complement: once `x` is grounded at `g`, `1 - x`
//! is grounded at `1 - g`, and `x = 1 - x` is rejected as a contradiction.

use std::collections::HashMap;

use log::debug;

use crate::error::{Error, Result};
use crate::poly::Poly;

#[derive(Debug, Clone)]
pub struct EquivalenceStore {
    edges: HashMap<Poly, Poly>,
    pruning: bool,
    strict: bool,
}

impl Default for EquivalenceStore {
    fn default() -> Self {
        EquivalenceStore::new(true, false)
    }
}

/// Picks the simpler of two symbolic values: fewer atoms wins, ties go to `old`.
pub fn simplest<'a>(old: &'a Poly, new: &'a Poly) -> &'a Poly {
    if new.num_atoms() < old.num_atoms() {
        new
    } else {
        old
    }
}

impl EquivalenceStore {
    /// `pruning` compresses paths on lookup; `strict` only admits `0`, `1`, `x`, `1 - x`.
    pub fn new(pruning: bool, strict: bool) -> Self {
        Self {
            edges: HashMap::new(),
            pruning,
            strict,
        }
    }

    /// Number of stored edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Raw edges `key -> successor`.
    pub fn iter(&self) -> impl Iterator<Item = (&Poly, &Poly)> {
        self.edges.iter()
    }

    pub fn successor(&self, key: &Poly) -> Option<&Poly> {
        self.edges.get(key)
    }

    pub fn clear(&mut self) {
        self.edges.clear();
    }

    /// Restores a raw edge, bypassing root selection. Used when loading a saved state.
    pub(crate) fn insert_edge(&mut self, key: Poly, value: Poly) -> Result<()> {
        self.check_node(&key)?;
        self.check_node(&value)?;
        if key == value {
            return Err(Error::Malformed(format!("self-loop on {}", key)));
        }
        self.edges.insert(key, value);
        Ok(())
    }

    fn check_node(&self, node: &Poly) -> Result<()> {
        if self.strict && !node.is_simple_binary() {
            return Err(Error::Malformed(format!("{} not allowed in a binary system", node)));
        }
        Ok(())
    }

    /// Follows edges to the plain root, without consulting complements.
    pub fn find_raw(&mut self, node: &Poly) -> Poly {
        let mut path = Vec::new();
        let mut current = node;
        while let Some(next) = self.edges.get(current) {
            path.push(current.clone());
            current = next;
        }
        let root = current.clone();

        // Path compression
        if self.pruning && path.len() > 1 {
            for key in path {
                self.edges.insert(key, root.clone());
            }
        }

        root
    }

    /// Canonical representative of `node`, ground states taking precedence.
    pub fn find(&mut self, node: &Poly) -> Result<Poly> {
        self.check_node(node)?;
        Ok(self.find_unchecked(node))
    }

    fn find_unchecked(&mut self, node: &Poly) -> Poly {
        if node.is_constant() {
            return node.clone();
        }
        let root = self.find_raw(node);
        if root.is_constant() {
            return root;
        }

        // If we can't find a ground state for node, maybe we can for 1 - node
        let alt = self.find_raw(&node.complement());
        if alt.is_constant() {
            return alt.complement();
        }
        let alt = self.find_raw(&root.complement());
        if alt.is_constant() {
            return alt.complement();
        }

        root
    }

    /// Records `key == value`. Returns whether a new edge was stored.
    pub fn union(&mut self, key: &Poly, value: &Poly) -> Result<bool> {
        self.check_node(key)?;
        self.check_node(value)?;

        if key == value {
            return Ok(false);
        }

        let mut kr = self.find_unchecked(key);
        let mut vr = self.find_unchecked(value);
        if kr == vr {
            return Ok(false);
        }
        if kr == vr.complement() || self.find_unchecked(&kr.complement()) == vr {
            return Err(Error::contradiction(&kr, &vr, "complementary roots"));
        }

        match (kr.is_constant(), vr.is_constant()) {
            (true, true) => return Err(Error::contradiction(&kr, &vr, "distinct ground states")),
            (true, false) => std::mem::swap(&mut kr, &mut vr),
            _ => {}
        }

        if vr.is_constant() {
            self.check_range(&kr, &vr)?;
            debug!("union: {} -> {}", kr, vr);
            self.edges.insert(kr.clone(), vr.clone());
            // Now 1 - key has a definite value too
            self.ground(&kr.complement(), &vr.complement())?;
            return Ok(true);
        }

        match (kr.has_constant(), vr.has_constant()) {
            // Keep the non-monic side as the root
            (true, false) => std::mem::swap(&mut kr, &mut vr),
            (false, true) => {}
            _ => {
                if simplest(&kr, &vr) == &kr {
                    std::mem::swap(&mut kr, &mut vr);
                }
            }
        }

        debug!("union: {} -> {}", kr, vr);
        self.edges.insert(kr.clone(), vr.clone());

        // Keep the complement classes in step: 1 - x = 1 - y whenever x = y
        self.union(&kr.complement(), &vr.complement())?;

        Ok(true)
    }

    fn check_range(&self, node: &Poly, value: &Poly) -> Result<()> {
        let c = value.constant_term();
        if c < node.min_value() || c > node.max_value() {
            return Err(Error::contradiction(node, value, "ground state out of range"));
        }
        Ok(())
    }

    /// Grounds the class of `node` at the constant `value`, then its complement class.
    fn ground(&mut self, node: &Poly, value: &Poly) -> Result<()> {
        let root = self.find_raw(node);
        if root == *value {
            return Ok(());
        }
        if root.is_constant() {
            return Err(Error::contradiction(&root, value, "distinct ground states"));
        }
        self.check_range(&root, value)?;
        debug!("ground: {} -> {}", root, value);
        self.edges.insert(root.clone(), value.clone());
        self.ground(&root.complement(), &value.complement())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::parse::parse_poly;
    use crate::symbols::SymbolTable;

    struct Fixture {
        table: SymbolTable,
        store: EquivalenceStore,
    }

    impl Fixture {
        fn new(pruning: bool, strict: bool) -> Self {
            Self {
                table: SymbolTable::new(),
                store: EquivalenceStore::new(pruning, strict),
            }
        }

        fn p(&mut self, s: &str) -> Poly {
            parse_poly(s, &mut self.table).unwrap()
        }

        fn union(&mut self, a: &str, b: &str) -> Result<bool> {
            let (a, b) = (self.p(a), self.p(b));
            self.store.union(&a, &b)
        }

        fn find(&mut self, a: &str) -> String {
            let a = self.p(a);
            let root = self.store.find(&a).unwrap();
            self.table.show(&root)
        }
    }

    #[test]
    fn test_roots_merge() {
        let mut f = Fixture::new(false, false);
        f.union("x1", "x3").unwrap();
        f.union("x3", "x6").unwrap();
        f.union("x2", "x4").unwrap();
        assert_ne!(f.find("x1"), f.find("x2"));
        f.union("x4", "x6").unwrap();
        let root = f.find("x1");
        for v in ["x2", "x3", "x4", "x6"] {
            assert_eq!(f.find(v), root);
        }
        assert_eq!(f.find("x5"), "x5");
    }

    #[test]
    fn test_no_self_loops() {
        let mut f = Fixture::new(true, false);
        assert!(!f.union("x", "x").unwrap());
        f.union("x", "y").unwrap();
        assert!(!f.union("y", "x").unwrap());
        assert!(!f.union("x", "y").unwrap());
        // x = y and its complement 1 - x = 1 - y
        assert_eq!(f.store.len(), 2);
    }

    #[test]
    fn test_ground_states_are_roots() {
        let mut f = Fixture::new(false, false);
        f.union("0", "x1").unwrap();
        f.union("0", "x2").unwrap();
        assert_eq!(f.find("x1"), "0");
        assert_eq!(f.find("x2"), "0");
        assert_eq!(f.find("1 - x1"), "1");
    }

    #[test]
    fn test_non_monic_roots() {
        let mut f = Fixture::new(false, false);
        f.union("1 - x1", "x2").unwrap();
        assert_eq!(f.find("x2"), "-x1 + 1");
        f.union("0", "x2").unwrap();
        f.union("x3", "1 - x1").unwrap();
        for (expr, expected) in [("x1", "1"), ("x2", "0"), ("x3", "0"), ("1 - x1", "0")] {
            assert_eq!(f.find(expr), expected, "{}", expr);
        }
    }

    #[test]
    fn test_double_negation() {
        let mut f = Fixture::new(false, false);
        f.union("1 - x1", "1 - x2").unwrap();
        assert_eq!(f.find("x1"), f.find("x2"));
        assert_eq!(f.find("1 - x1"), f.find("1 - x2"));
    }

    #[test]
    fn test_complement_lookup() {
        let mut f = Fixture::new(false, false);
        f.union("x", "y").unwrap();
        f.union("y", "1 - z").unwrap();
        f.union("1 - x", "1").unwrap();
        assert_eq!(f.find("x"), "0");
        assert_eq!(f.find("y"), "0");
        assert_eq!(f.find("z"), "1");
        assert_eq!(f.find("1 - y"), "1");
        assert_eq!(f.find("1 - z"), "0");
    }

    #[test]
    fn test_contradictions() {
        let mut f = Fixture::new(false, false);
        assert!(f.union("0", "1").unwrap_err().is_contradiction());

        let mut f = Fixture::new(false, false);
        f.union("x1", "0").unwrap();
        f.union("x2", "1").unwrap();
        assert!(f.union("x1", "x2").unwrap_err().is_contradiction());

        let mut f = Fixture::new(false, false);
        f.union("x1", "x3").unwrap();
        f.union("x2", "1 - x3").unwrap();
        assert!(f.union("x1", "x2").unwrap_err().is_contradiction());

        let mut f = Fixture::new(false, false);
        assert!(f.union("x*y", "2").unwrap_err().is_contradiction());
    }

    #[test]
    fn test_strict_rejects_non_binary() {
        let mut f = Fixture::new(true, true);
        assert!(matches!(f.union("x2", "4"), Err(Error::Malformed(_))));
        assert!(matches!(f.union("x*y", "0"), Err(Error::Malformed(_))));
        assert!(f.union("x2", "1 - x3").unwrap());
    }

    #[test]
    fn test_fewer_atoms_become_roots() {
        let mut f = Fixture::new(false, false);
        f.union("x", "x*y").unwrap();
        let (key, x) = (f.p("x*y"), f.p("x"));
        assert_eq!(f.store.successor(&key), Some(&x));
        f.union("a*b*c", "a*b").unwrap();
        assert_eq!(f.find("a*b*c"), "a*b");
    }

    #[test]
    fn test_pruning_compresses_paths() {
        let mut f = Fixture::new(true, false);
        // Each union attaches the old root below a simpler new one
        f.union("a*b*c*d", "a*b*c").unwrap();
        f.union("a*b*c", "a*b").unwrap();
        f.union("a*b", "a").unwrap();
        let (key, a) = (f.p("a*b*c*d"), f.p("a"));
        assert_eq!(f.find("a*b*c*d"), "a");
        assert_eq!(f.store.successor(&key), Some(&a));
    }

    #[test]
    fn test_transitive_consistency() {
        let mut f = Fixture::new(true, false);
        let pairs = [("v1", "v2"), ("v3", "v4"), ("v5", "v6"), ("v2", "v4"), ("v7", "v7")];
        for (a, b) in pairs {
            f.union(a, b).unwrap();
        }
        let classes = [vec!["v1", "v2", "v3", "v4"], vec!["v5", "v6"], vec!["v7"]];
        for (i, ci) in classes.iter().enumerate() {
            for (j, cj) in classes.iter().enumerate() {
                for a in ci {
                    for b in cj {
                        assert_eq!(f.find(a) == f.find(b), i == j, "{} vs {}", a, b);
                    }
                }
            }
        }
    }
}
