//! Post-hoc verification of a claimed solution.

use tracing::{debug, error};

use crate::error::{Result, SolverError};
use crate::problem::{Assignment, Problem};

/// Re-derives every clause's expansion under `assignment` and confirms it is
/// a literal substring of the master string.
///
/// A mismatch means the search engine claimed a solution that does not hold.
/// That is a defect in the engine or the simplifier, never a property of the
/// input, so it surfaces as a fatal [`SolverError`] rather than a "no
/// solution" outcome.
pub fn validate(problem: &Problem, assignment: &Assignment) -> Result<()> {
    for clause in &problem.clauses {
        let expansion = clause
            .substitute(assignment)
            .map_err(|variable| SolverError::UnboundVariable { variable })?;
        if problem.s.contains(&expansion) {
            debug!(clause = %clause, %expansion, "substring confirmed");
        } else {
            error!(clause = %clause, %expansion, "claimed solution does not embed clause");
            return Err(SolverError::SolutionMismatch {
                clause: clause.to_string(),
                expansion,
            }
            .into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::problem::{Domains, Problem};
    use std::sync::Arc;

    fn problem(s: &str, clauses: &[&str]) -> Problem {
        let clauses = clauses.iter().map(|c| c.parse().unwrap()).collect();
        Problem::new(s, clauses, Domains::new())
    }

    fn assignment(bindings: &[(char, &str)]) -> Assignment {
        bindings
            .iter()
            .map(|(v, c)| (*v, Arc::from(*c)))
            .collect()
    }

    #[test]
    fn accepts_a_sound_assignment() {
        let p = problem("abcde", &["aA", "Bc"]);
        assert!(validate(&p, &assignment(&[('A', "b"), ('B', "b")])).is_ok());
    }

    #[test]
    fn a_mismatch_is_a_fault_not_a_failure() {
        let p = problem("abcde", &["aA"]);
        let err = validate(&p, &assignment(&[('A', "z")])).unwrap_err();
        let Error::Inner { inner, .. } = err;
        assert!(matches!(
            *inner,
            SolverError::SolutionMismatch { ref clause, ref expansion }
                if clause == "aA" && expansion == "az"
        ));
    }

    #[test]
    fn an_unbound_variable_is_a_fault() {
        let p = problem("abcde", &["aA"]);
        let err = validate(&p, &Assignment::new()).unwrap_err();
        let Error::Inner { inner, .. } = err;
        assert!(matches!(*inner, SolverError::UnboundVariable { variable: 'A' }));
    }
}
