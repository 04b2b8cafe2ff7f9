//! A parallel backtracking solver for the substring-with-expansions (SWE)
//! decision problem.
//!
//! Given a master string `s` over lowercase letters, a list of clause
//! templates mixing literal letters and uppercase variables, and a domain of
//! candidate strings per variable, the solver looks for one assignment of
//! variables to candidates under which every clause, after substitution,
//! occurs as a literal substring of `s`.
//!
//! # Architecture
//!
//! - **[`solver::simplify`]** prunes the problem before search starts:
//!   duplicate clauses, candidates that occur nowhere in `s`, variables no
//!   clause references. It also fixes the deterministic branch order.
//! - **[`solver::engine`]** is the recursive branch-and-prune core: it
//!   anchors each clause lazily, branches over candidates and occurrence
//!   offsets, and propagates the first `Found` straight up the call chain.
//! - **[`solver::coordinator`]** fans the top-level candidate choice out
//!   across a worker pool and races the copies to a first result,
//!   cancelling the rest cooperatively.
//! - **[`solver::validate`]** re-derives every clause's expansion from a
//!   claimed solution and confirms it against `s`; a mismatch aborts the
//!   run loudly.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use swe_solver::problem::{Clause, Domains, Problem};
//! use swe_solver::solver::{self, coordinator::Outcome};
//!
//! let clauses: Vec<Clause> = vec!["aA".parse().unwrap(), "Bc".parse().unwrap()];
//! let mut domains = Domains::new();
//! domains.insert('A', ["b", "x"].into_iter().map(Arc::from).collect());
//! domains.insert('B', ["b", "z"].into_iter().map(Arc::from).collect());
//! let problem = Problem::new("abcde", clauses, domains);
//!
//! match solver::solve(&problem).unwrap() {
//!     Outcome::Found(assignment) => {
//!         assert_eq!(assignment.get(&'A').map(|c| &**c), Some("b"));
//!         assert_eq!(assignment.get(&'B').map(|c| &**c), Some("b"));
//!     }
//!     Outcome::Unsatisfiable => unreachable!(),
//! }
//! ```

pub mod error;
pub mod parser;
pub mod problem;
pub mod solver;
