//! Pre-search reduction of a problem instance.
//!
//! Everything here is pure data reduction: nothing the simplifier removes can
//! participate in a solution, so searching the reduced problem is equivalent
//! to searching the original. The one terminal outcome it can produce on its
//! own is definitive unsatisfiability, when a referenced variable's domain
//! empties.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

use im::Vector;
use tracing::{debug, info};

use crate::problem::{Clause, Domains, Problem, Variable};

/// Result of a simplification pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Simplified {
    /// The reduced, deterministically ordered problem, ready for search.
    Reduced(Problem),
    /// A referenced variable's domain emptied; no search is needed.
    Unsatisfiable,
}

/// Longest first, then lexicographic. The search enumerates branches in
/// this order, so it also determines which solution a task finds first.
fn clause_order(a: &Clause, b: &Clause) -> Ordering {
    b.len().cmp(&a.len()).then_with(|| {
        a.symbols()
            .iter()
            .map(|s| s.as_char())
            .cmp(b.symbols().iter().map(|s| s.as_char()))
    })
}

fn candidate_order(a: &Arc<str>, b: &Arc<str>) -> Ordering {
    b.len().cmp(&a.len()).then_with(|| a.cmp(b))
}

/// Reduces `problem` before search starts.
///
/// - deduplicates structurally equal clauses;
/// - drops domain entries no clause references;
/// - drops candidates that occur nowhere in the master string;
/// - imposes the deterministic total order on clauses and candidates.
///
/// Applying it twice yields the same result as applying it once.
pub fn simplify(problem: &Problem) -> Simplified {
    let mut clauses = problem.clauses.clone();
    clauses.sort_by(clause_order);
    clauses.dedup();

    let referenced: BTreeSet<Variable> = clauses.iter().flat_map(Clause::variables).collect();

    let mut domains = Domains::new();
    for variable in referenced {
        let candidates = problem.domains.get(&variable).cloned().unwrap_or_default();
        let mut kept: Vec<Arc<str>> = candidates
            .iter()
            .filter(|candidate| problem.s.contains(&***candidate))
            .cloned()
            .collect();
        kept.sort_by(candidate_order);
        kept.dedup();

        if kept.is_empty() {
            debug!(%variable, "domain emptied by pruning");
            return Simplified::Unsatisfiable;
        }
        domains.insert(variable, kept.into_iter().collect::<Vector<_>>());
    }

    let reduced = Problem::new(problem.s.clone(), clauses, domains);
    info!(
        clauses = reduced.clauses.len(),
        variables = reduced.domains.len(),
        difficulty = reduced.difficulty(),
        "simplified problem"
    );
    Simplified::Reduced(reduced)
}
