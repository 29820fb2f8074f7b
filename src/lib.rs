//! # binpoly: deduction engine for binary polynomial equations
//!
//! **`binpoly`** reduces a system of multivariate polynomial equations over variables
//! constrained to {0,1} into a smaller canonical system plus a dictionary of solved
//! variables. It is not a SAT solver: it repeatedly applies sound local inference rules
//! ("judgements") and propagates what they find through a union-find store until nothing
//! changes. Its motivating use is simplifying the equations of integer-factorization
//! circuits, but any constraint system over binary polynomial equalities is in scope.
//!
//! ## Key Features
//!
//! - **Exact arithmetic**: coefficients are [`BigInt`][num_bigint::BigInt]s, and every
//!   polynomial is kept binary-square-free (`x^2 = x`) and expanded.
//! - **Canonical equations**: an equation and its mirror image, or a multiple of it, normalize
//!   to the same [`Equation`][crate::equation::Equation].
//! - **Complement-aware equivalence store**: `x = 1` implies `1 - x = 0`, and `x = 1 - x` is
//!   a contradiction.
//! - **Escalation**: when the cheap rules stop making progress, the solver squares equations
//!   and enumerates small groups of variables before giving up.
//! - **1-Based Indexing**: variables are 1-indexed, in order of first appearance.
//!
//! ## Basic Usage
//!
//! ```rust
//! use binpoly::parse::parse_equations;
//! use binpoly::symbols::SymbolTable;
//! use binpoly::system::System;
//!
//! let mut symbols = SymbolTable::new();
//! let equations = parse_equations("x*y*z = 1", &mut symbols).unwrap();
//!
//! let mut system = System::new(equations, symbols);
//! system.solve().unwrap();
//!
//! assert_eq!(system.solutions().len(), 3);
//! assert!(system.final_equations().unwrap().is_empty());
//! ```
//!
//! A system without {0,1} solutions is reported as an
//! [`Error::Contradiction`][crate::error::Error::Contradiction]:
//!
//! ```rust
//! use binpoly::parse::parse_equations;
//! use binpoly::symbols::SymbolTable;
//! use binpoly::system::System;
//!
//! let mut symbols = SymbolTable::new();
//! let equations = parse_equations("x*y*z = 2", &mut symbols).unwrap();
//! let err = System::new(equations, symbols).solve().unwrap_err();
//! assert!(err.is_contradiction());
//! ```
//!
//! ## Core Components
//!
//! - **[`system`]**: The [`System`][crate::system::System] manager holding equations,
//!   deductions and solutions, and the cleaning passes that reconcile them.
//! - **[`solve`]**: The fixed-point loop with its escalation tiers.
//! - **[`judgement`]** and **[`assumption`]**: The inference rules.
//! - **[`equivalence`]**: The union-find store behind the deductions.
//! - **[`io`]**: Saving and restoring solver state.

pub mod assumption;
pub mod config;
pub mod contradiction;
pub mod equation;
pub mod equivalence;
pub mod error;
pub mod io;
pub mod judgement;
pub mod monomial;
pub mod parse;
pub mod poly;
pub mod record;
pub mod solve;
pub mod symbols;
pub mod system;
pub mod types;
