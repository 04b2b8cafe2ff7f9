//! The recursive backtracking search at the heart of the solver.
//!
//! One [`SearchEngine`] explores one branch of the top-level candidate
//! fan-out, single-threaded and fully deterministic given the orderings the
//! simplifier fixed. The only cross-task communication is the cancellation
//! flag it polls at branch points and the advisory progress tracker.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::problem::{Assignment, Positions, Problem, Symbol};
use crate::solver::progress::ProgressTracker;

/// What one search subtree reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A total assignment under which every clause embeds into the master
    /// string. Propagated straight up the call chain; no sibling branches
    /// are explored once it appears.
    Found(Assignment),
    /// Every branch below this state was a dead end.
    Exhausted,
}

/// Per-task search counters, collected by the coordinator for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes_visited: u64,
    pub backtracks: u64,
    /// The largest number of clauses any explored state had satisfied.
    pub deepest_clause: usize,
}

/// All overlapping occurrences of `needle` in `haystack`, left to right.
pub fn occurrences<'a>(haystack: &'a str, needle: &'a str) -> impl Iterator<Item = usize> + 'a {
    let mut from = 0usize;
    std::iter::from_fn(move || {
        if needle.is_empty() || from + needle.len() > haystack.len() {
            return None;
        }
        match haystack[from..].find(needle) {
            Some(i) => {
                let at = from + i;
                from = at + 1;
                Some(at)
            }
            None => {
                from = haystack.len();
                None
            }
        }
    })
}

pub struct SearchEngine<'a> {
    problem: &'a Problem,
    cancel: &'a AtomicBool,
    progress: &'a ProgressTracker,
    stats: SearchStats,
}

impl<'a> SearchEngine<'a> {
    pub fn new(problem: &'a Problem, cancel: &'a AtomicBool, progress: &'a ProgressTracker) -> Self {
        Self {
            problem,
            cancel,
            progress,
            stats: SearchStats::default(),
        }
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn into_stats(self) -> SearchStats {
        self.stats
    }

    /// Explores every state reachable from `assignment` with all clauses
    /// unanchored.
    pub fn search(&mut self, assignment: Assignment) -> SearchOutcome {
        let positions = self.problem.initial_positions();
        self.solve_clause(0, positions, assignment)
    }

    /// Entry point for one clause: `clause_idx` clauses are already
    /// satisfied, the rest are untouched.
    fn solve_clause(
        &mut self,
        clause_idx: usize,
        positions: Positions,
        assignment: Assignment,
    ) -> SearchOutcome {
        if self.cancel.load(Ordering::Relaxed) {
            return SearchOutcome::Exhausted;
        }
        if clause_idx > self.stats.deepest_clause {
            self.stats.deepest_clause = clause_idx;
        }
        self.progress.observe(clause_idx);

        if clause_idx == self.problem.clauses.len() {
            return SearchOutcome::Found(assignment);
        }
        self.match_symbols(clause_idx, 0, positions, assignment)
    }

    /// Matches the current clause from `symbol_idx` onward, branching where
    /// the next symbol is an unbound variable or the clause is unanchored.
    fn match_symbols(
        &mut self,
        clause_idx: usize,
        mut symbol_idx: usize,
        positions: Positions,
        assignment: Assignment,
    ) -> SearchOutcome {
        self.stats.nodes_visited += 1;

        let problem = self.problem;
        let clause = &problem.clauses[clause_idx];
        let mut offset = positions.get(clause_idx).copied().flatten();

        while symbol_idx < clause.len() {
            let mut buf = [0u8; 4];
            let text: &str = match clause.symbols()[symbol_idx] {
                Symbol::Literal(c) => c.encode_utf8(&mut buf),
                Symbol::Var(v) => match assignment.get(&v) {
                    Some(expansion) => expansion,
                    None => {
                        // Branch once per candidate, preserving the offset
                        // reached so far in this clause.
                        let positions = positions.update(clause_idx, offset);
                        let Some(candidates) = problem.domains.get(&v) else {
                            return SearchOutcome::Exhausted;
                        };
                        for candidate in candidates {
                            if self.cancel.load(Ordering::Relaxed) {
                                return SearchOutcome::Exhausted;
                            }
                            let extended = assignment.update(v, candidate.clone());
                            match self.match_symbols(
                                clause_idx,
                                symbol_idx,
                                positions.clone(),
                                extended,
                            ) {
                                found @ SearchOutcome::Found(_) => return found,
                                SearchOutcome::Exhausted => self.stats.backtracks += 1,
                            }
                        }
                        return SearchOutcome::Exhausted;
                    }
                },
            };

            match offset {
                Some(at) => {
                    // Anchored: the resolved text must sit exactly here.
                    if !problem.s[at..].starts_with(text) {
                        return SearchOutcome::Exhausted;
                    }
                    offset = Some(at + text.len());
                    symbol_idx += 1;
                }
                None => {
                    // Unanchored: branch once per occurrence of the resolved
                    // text, fixing the clause's anchor to that offset.
                    for at in occurrences(&problem.s, text) {
                        if self.cancel.load(Ordering::Relaxed) {
                            return SearchOutcome::Exhausted;
                        }
                        let anchored = positions.update(clause_idx, Some(at));
                        match self.match_symbols(clause_idx, symbol_idx, anchored, assignment.clone())
                        {
                            found @ SearchOutcome::Found(_) => return found,
                            SearchOutcome::Exhausted => self.stats.backtracks += 1,
                        }
                    }
                    return SearchOutcome::Exhausted;
                }
            }
        }

        // Clause fully matched; the next clause starts unanchored.
        self.solve_clause(clause_idx + 1, positions, assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use im::OrdMap;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    use crate::problem::{Domains, Problem};
    use crate::solver::simplify::{simplify, Simplified};

    fn problem(s: &str, clauses: &[&str], domains: &[(char, &[&str])]) -> Problem {
        let clauses = clauses.iter().map(|c| c.parse().unwrap()).collect();
        let domains: Domains = domains
            .iter()
            .map(|(v, cands)| {
                (
                    *v,
                    cands
                        .iter()
                        .map(|c| Arc::from(*c))
                        .collect::<im::Vector<Arc<str>>>(),
                )
            })
            .collect::<OrdMap<_, _>>();
        Problem::new(s, clauses, domains)
    }

    fn search(p: &Problem) -> SearchOutcome {
        let reduced = match simplify(p) {
            Simplified::Reduced(r) => r,
            Simplified::Unsatisfiable => return SearchOutcome::Exhausted,
        };
        let cancel = AtomicBool::new(false);
        let progress = ProgressTracker::new();
        let mut engine = SearchEngine::new(&reduced, &cancel, &progress);
        engine.search(Assignment::new())
    }

    fn bindings(outcome: SearchOutcome) -> Vec<(char, String)> {
        match outcome {
            SearchOutcome::Found(assignment) => assignment
                .iter()
                .map(|(v, c)| (*v, c.to_string()))
                .collect(),
            SearchOutcome::Exhausted => panic!("expected a solution"),
        }
    }

    #[test]
    fn occurrences_are_overlapping_and_left_to_right() {
        assert_eq!(occurrences("aaa", "aa").collect::<Vec<_>>(), [0, 1]);
        assert_eq!(occurrences("cabca", "ca").collect::<Vec<_>>(), [0, 3]);
        assert_eq!(occurrences("abc", "x").count(), 0);
    }

    #[test]
    fn finds_the_unique_assignment() {
        let p = problem(
            "abcde",
            &["aA", "Bc"],
            &[('A', &["b", "x"]), ('B', &["b", "z"])],
        );
        assert_eq!(
            bindings(search(&p)),
            [('A', "b".to_string()), ('B', "b".to_string())]
        );
    }

    #[test]
    fn literal_only_clauses_need_no_bindings() {
        let p = problem("aba", &["ab", "ba"], &[]);
        assert_eq!(bindings(search(&p)), []);
    }

    #[test]
    fn prunes_on_literal_mismatch_at_a_fixed_anchor() {
        // 'a' anchors at offset 0 only, where the following 'x' cannot match.
        let p = problem("abc", &["ax"], &[]);
        assert_eq!(search(&p), SearchOutcome::Exhausted);
    }

    #[test]
    fn a_bound_expansion_must_fit_at_the_anchor() {
        let p = problem("abcab", &["Aca"], &[('A', &["ab"])]);
        assert_eq!(bindings(search(&p)), [('A', "ab".to_string())]);
    }

    #[test]
    fn one_variable_spanning_two_clauses_must_agree() {
        // A = "b" satisfies both clauses; A = "d" only the first.
        let p = problem("abcda", &["aA", "Ac"], &[('A', &["d", "b"])]);
        assert_eq!(bindings(search(&p)), [('A', "b".to_string())]);
    }

    #[test]
    fn exhausts_when_no_candidate_combination_embeds() {
        let p = problem("ab", &["AA"], &[('A', &["a", "b"])]);
        assert_eq!(search(&p), SearchOutcome::Exhausted);
    }

    #[test]
    fn a_cancelled_engine_reports_exhausted_immediately() {
        let p = problem("abcde", &["aA"], &[('A', &["b"])]);
        let reduced = match simplify(&p) {
            Simplified::Reduced(r) => r,
            Simplified::Unsatisfiable => unreachable!(),
        };
        let cancel = AtomicBool::new(true);
        let progress = ProgressTracker::new();
        let mut engine = SearchEngine::new(&reduced, &cancel, &progress);
        assert_eq!(engine.search(Assignment::new()), SearchOutcome::Exhausted);
        assert_eq!(engine.stats().nodes_visited, 0);
    }

    #[test]
    fn stats_track_the_deepest_satisfied_clause() {
        let p = problem("abcde", &["ab", "cd"], &[]);
        let reduced = match simplify(&p) {
            Simplified::Reduced(r) => r,
            Simplified::Unsatisfiable => unreachable!(),
        };
        let cancel = AtomicBool::new(false);
        let progress = ProgressTracker::new();
        let mut engine = SearchEngine::new(&reduced, &cancel, &progress);
        let outcome = engine.search(Assignment::new());
        assert!(matches!(outcome, SearchOutcome::Found(_)));
        assert_eq!(engine.stats().deepest_clause, 2);
        assert!(engine.stats().nodes_visited > 0);
    }
}
