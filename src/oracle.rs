//! Complete-solver check used to tell "the heuristic missed a solution" apart
//! from "there is no solution".

use anyhow::{Result, bail};
use varisat::ExtendFormula;

use crate::cnf::Formula;

/// Runs varisat to completion; returns a model indexed by variable id
/// (slot 0 unused) when the formula is satisfiable.
pub fn solve_exact(formula: &Formula) -> Result<Option<Vec<bool>>> {
    let mut solver = varisat::Solver::new();
    let vars = (0..formula.num_vars())
        .map(|_| solver.new_var())
        .collect::<Vec<_>>();

    for clause in formula.clauses() {
        let lits = clause
            .iter()
            .map(|lit| varisat::Lit::from_var(vars[lit.var as usize - 1], lit.sign))
            .collect::<Vec<_>>();
        solver.add_clause(&lits);
    }

    match solver.solve() {
        Ok(true) => {}
        Ok(false) => return Ok(None),
        Err(_) => bail!("varisat stopped before deciding the formula"),
    }

    let mut assignment = vec![false; formula.num_vars() as usize + 1];
    for lit in solver.model().unwrap_or_default() {
        assignment[lit.var().index() + 1] = lit.is_positive();
    }
    Ok(Some(assignment))
}

pub fn is_satisfiable(formula: &Formula) -> Result<bool> {
    Ok(solve_exact(formula)?.is_some())
}
