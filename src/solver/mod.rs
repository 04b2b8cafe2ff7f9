//! The solver core: simplification, backtracking search, parallel
//! coordination and solution validation.

pub mod coordinator;
pub mod engine;
pub mod progress;
pub mod simplify;
pub mod stats;
pub mod validate;

use std::sync::Arc;

use crate::error::Result;
use crate::problem::Problem;
use crate::solver::coordinator::{Outcome, SolverPool};
use crate::solver::engine::SearchStats;
use crate::solver::simplify::{simplify, Simplified};

/// Simplifies `problem` and races the search across a pool sized to the
/// available hardware parallelism.
pub fn solve(problem: &Problem) -> Result<Outcome> {
    let pool = SolverPool::with_default_workers();
    solve_with(problem, &pool).map(|(outcome, _)| outcome)
}

/// As [`solve`], with an explicit pool, also returning per-task search
/// statistics.
pub fn solve_with(problem: &Problem, pool: &SolverPool) -> Result<(Outcome, Vec<SearchStats>)> {
    match simplify(problem) {
        Simplified::Unsatisfiable => Ok((Outcome::Unsatisfiable, Vec::new())),
        Simplified::Reduced(reduced) => pool.solve_with_stats(Arc::new(reduced)),
    }
}
