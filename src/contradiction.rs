//! Infeasibility checks applied to every equation, independently of judgements.

use log::debug;

use crate::equation::Equation;
use crate::error::{Error, Result};
use crate::types::Parity;

/// Range check: the two sides cannot meet over {0,1}.
pub fn check_range(eqn: &Equation) -> Result<()> {
    if eqn.lhs.min_value() > eqn.rhs.max_value() || eqn.lhs.max_value() < eqn.rhs.min_value() {
        debug!("range contradiction in {}", eqn);
        return Err(Error::contradiction(&eqn.lhs, &eqn.rhs, "range contradiction"));
    }
    Ok(())
}

/// Parity check: `lhs - rhs` is odd for every assignment, so it can never vanish.
pub fn check_parity(eqn: &Equation) -> Result<()> {
    if eqn.expr().parity() == Some(Parity::Odd) {
        debug!("parity contradiction in {}", eqn);
        return Err(Error::contradiction(&eqn.lhs, &eqn.rhs, "parity contradiction"));
    }
    Ok(())
}

/// Applies every contradiction check to a single equation.
pub fn check_equation(eqn: &Equation) -> Result<()> {
    check_range(eqn)?;
    check_parity(eqn)
}

/// Applies every contradiction check to every equation.
pub fn apply_contradictions<'a>(equations: impl IntoIterator<Item = &'a Equation>) -> Result<()> {
    for eqn in equations {
        check_equation(eqn)?;
    }
    Ok(())
}
