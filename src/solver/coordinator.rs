//! Top-level parallel fan-out.
//!
//! The coordinator picks the first variable encountered scanning clauses
//! left to right, creates one independent search task per candidate in that
//! variable's domain, and races the tasks across a bounded worker pool. The
//! first task to find a solution wins; the rest are cancelled cooperatively
//! through a shared flag the engines poll at branch points.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, available_parallelism};

use im::Vector;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::problem::{Assignment, Problem, Variable};
use crate::solver::engine::{SearchEngine, SearchOutcome, SearchStats};
use crate::solver::progress::ProgressTracker;
use crate::solver::validate::validate;

/// Terminal outcome of a run.
///
/// When several assignments satisfy the problem, which one is reported
/// depends on which task finishes first. Branch order within one task is
/// fully deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Found(Assignment),
    Unsatisfiable,
}

/// A bounded pool of worker threads that race independent search tasks.
pub struct SolverPool {
    job_sender: Option<crossbeam_channel::Sender<Job>>,
    workers: Vec<thread::JoinHandle<()>>,
    pub num_workers: usize,
}

struct Job {
    problem: Arc<Problem>,
    seed: Assignment,
    cancel: Arc<AtomicBool>,
    progress: Arc<ProgressTracker>,
    sender: mpsc::Sender<JobResult>,
}

enum JobResult {
    Found(Assignment, SearchStats),
    Exhausted(SearchStats),
}

fn run_job(job: &Job) -> JobResult {
    if job.cancel.load(Ordering::Relaxed) {
        // A sibling already won while this job sat in the queue.
        return JobResult::Exhausted(SearchStats::default());
    }
    let mut engine = SearchEngine::new(&job.problem, &job.cancel, &job.progress);
    let outcome = engine.search(job.seed.clone());
    let stats = engine.into_stats();
    match outcome {
        SearchOutcome::Found(assignment) => {
            job.cancel.store(true, Ordering::Relaxed);
            JobResult::Found(assignment, stats)
        }
        SearchOutcome::Exhausted => JobResult::Exhausted(stats),
    }
}

impl SolverPool {
    /// Creates a pool with up to `num_workers` threads, capped at the
    /// available hardware parallelism. A pool of one runs tasks inline on
    /// the calling thread.
    pub fn new(num_workers: usize) -> Self {
        if num_workers <= 1 {
            return Self {
                job_sender: None,
                workers: Vec::new(),
                num_workers: 1,
            };
        }
        let num_workers = num_workers.min(available_parallelism().map(|n| n.get()).unwrap_or(1));

        let (tx, rx) = crossbeam_channel::unbounded::<Job>();
        let mut workers = Vec::with_capacity(num_workers);
        for _ in 0..num_workers {
            let rx = rx.clone();
            workers.push(thread::spawn(move || {
                while let Ok(job) = rx.recv() {
                    let result = run_job(&job);
                    let _ = job.sender.send(result);
                }
            }));
        }

        Self {
            job_sender: Some(tx),
            workers,
            num_workers,
        }
    }

    pub fn with_default_workers() -> Self {
        Self::new(available_parallelism().map(|n| n.get()).unwrap_or(1))
    }

    /// Races one search task per seed candidate and returns the first
    /// verified solution, or `Unsatisfiable` once every task exhausts.
    pub fn solve(&self, problem: Arc<Problem>) -> Result<Outcome> {
        self.solve_with_stats(problem).map(|(outcome, _)| outcome)
    }

    /// As [`solve`](Self::solve), additionally returning the per-task search
    /// statistics collected so far. Diagnostic only.
    pub fn solve_with_stats(&self, problem: Arc<Problem>) -> Result<(Outcome, Vec<SearchStats>)> {
        let Some(seed_variable) = problem.seed_variable() else {
            // Literal-only problem: nothing to fan out over.
            return self.run_inline(&problem, Assignment::new());
        };
        let candidates = problem
            .domains
            .get(&seed_variable)
            .cloned()
            .unwrap_or_default();
        if candidates.is_empty() {
            return Ok((Outcome::Unsatisfiable, Vec::new()));
        }

        let Some(job_sender) = &self.job_sender else {
            return self.run_sequential(&problem, seed_variable, &candidates);
        };

        let cancel = Arc::new(AtomicBool::new(false));
        let progress = Arc::new(ProgressTracker::new());
        let (tx, rx) = mpsc::channel();
        let num_jobs = candidates.len();
        info!(
            workers = self.num_workers,
            jobs = num_jobs,
            variable = %seed_variable,
            "racing seed candidates"
        );

        for candidate in &candidates {
            let job = Job {
                problem: Arc::clone(&problem),
                seed: Assignment::new().update(seed_variable, candidate.clone()),
                cancel: Arc::clone(&cancel),
                progress: Arc::clone(&progress),
                sender: tx.clone(),
            };
            if job_sender.send(job).is_err() {
                break;
            }
        }
        drop(tx);

        let mut completed = 0usize;
        let mut task_stats = Vec::with_capacity(num_jobs);
        while let Ok(result) = rx.recv() {
            match result {
                JobResult::Found(assignment, stats) => {
                    cancel.store(true, Ordering::Relaxed);
                    task_stats.push(stats);
                    info!("solution candidate found, verifying");
                    validate(&problem, &assignment)?;
                    return Ok((Outcome::Found(assignment), task_stats));
                }
                JobResult::Exhausted(stats) => {
                    completed += 1;
                    task_stats.push(stats);
                    debug!(completed, total = num_jobs, "starting point exhausted");
                    if completed == num_jobs {
                        break;
                    }
                }
            }
        }
        Ok((Outcome::Unsatisfiable, task_stats))
    }

    fn run_inline(
        &self,
        problem: &Problem,
        seed: Assignment,
    ) -> Result<(Outcome, Vec<SearchStats>)> {
        let cancel = AtomicBool::new(false);
        let progress = ProgressTracker::new();
        let mut engine = SearchEngine::new(problem, &cancel, &progress);
        let outcome = engine.search(seed);
        let stats = vec![engine.into_stats()];
        match outcome {
            SearchOutcome::Found(assignment) => {
                validate(problem, &assignment)?;
                Ok((Outcome::Found(assignment), stats))
            }
            SearchOutcome::Exhausted => Ok((Outcome::Unsatisfiable, stats)),
        }
    }

    fn run_sequential(
        &self,
        problem: &Problem,
        seed_variable: Variable,
        candidates: &Vector<Arc<str>>,
    ) -> Result<(Outcome, Vec<SearchStats>)> {
        let cancel = AtomicBool::new(false);
        let progress = ProgressTracker::new();
        let mut task_stats = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let mut engine = SearchEngine::new(problem, &cancel, &progress);
            let seed = Assignment::new().update(seed_variable, candidate.clone());
            let outcome = engine.search(seed);
            task_stats.push(engine.into_stats());
            match outcome {
                SearchOutcome::Found(assignment) => {
                    validate(problem, &assignment)?;
                    return Ok((Outcome::Found(assignment), task_stats));
                }
                SearchOutcome::Exhausted => {
                    debug!(candidate = %candidate, "starting point exhausted");
                }
            }
        }
        Ok((Outcome::Unsatisfiable, task_stats))
    }
}

impl Drop for SolverPool {
    fn drop(&mut self) {
        // Closing the job channel lets every worker drain and exit; engines
        // on abandoned jobs unwind at their next cancellation check.
        self.job_sender.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use im::OrdMap;
    use pretty_assertions::assert_eq;

    use crate::problem::Domains;
    use crate::solver::simplify::{simplify, Simplified};

    fn reduced(s: &str, clauses: &[&str], domains: &[(char, &[&str])]) -> Arc<Problem> {
        let clauses = clauses.iter().map(|c| c.parse().unwrap()).collect();
        let domains: Domains = domains
            .iter()
            .map(|(v, cands)| {
                (
                    *v,
                    cands
                        .iter()
                        .map(|c| Arc::from(*c))
                        .collect::<Vector<Arc<str>>>(),
                )
            })
            .collect::<OrdMap<_, _>>();
        match simplify(&Problem::new(s, clauses, domains)) {
            Simplified::Reduced(p) => Arc::new(p),
            Simplified::Unsatisfiable => panic!("test problem simplified to unsatisfiable"),
        }
    }

    fn bindings(outcome: Outcome) -> Vec<(char, String)> {
        match outcome {
            Outcome::Found(assignment) => assignment
                .iter()
                .map(|(v, c)| (*v, c.to_string()))
                .collect(),
            Outcome::Unsatisfiable => panic!("expected a solution"),
        }
    }

    #[test]
    fn finds_the_unique_assignment_through_the_pool() {
        let _ = tracing_subscriber::fmt::try_init();

        let problem = reduced(
            "abcde",
            &["aA", "Bc"],
            &[('A', &["b", "x"]), ('B', &["b", "z"])],
        );
        let pool = SolverPool::new(4);
        let outcome = pool.solve(problem).unwrap();
        assert_eq!(
            bindings(outcome),
            [('A', "b".to_string()), ('B', "b".to_string())]
        );
    }

    #[test]
    fn repeated_races_agree_on_a_unique_solution() {
        // Race tolerance: scheduling must not change which (unique)
        // assignment is reported.
        let problem = reduced(
            "abcde",
            &["aA", "Bc"],
            &[('A', &["b", "x"]), ('B', &["b", "z"])],
        );
        for _ in 0..20 {
            let pool = SolverPool::new(4);
            let outcome = pool.solve(Arc::clone(&problem)).unwrap();
            assert_eq!(
                bindings(outcome),
                [('A', "b".to_string()), ('B', "b".to_string())]
            );
        }
    }

    #[test]
    fn unsatisfiable_when_every_task_exhausts() {
        let problem = reduced("ab", &["AA"], &[('A', &["a", "b"])]);
        let pool = SolverPool::new(2);
        let (outcome, task_stats) = pool.solve_with_stats(problem).unwrap();
        assert_eq!(outcome, Outcome::Unsatisfiable);
        assert_eq!(task_stats.len(), 2);
    }

    #[test]
    fn literal_only_problems_run_inline() {
        let problem = reduced("aba", &["ab", "ba"], &[]);
        let pool = SolverPool::new(4);
        let outcome = pool.solve(problem).unwrap();
        assert_eq!(bindings(outcome), []);
    }

    #[test]
    fn a_single_worker_pool_runs_sequentially() {
        let problem = reduced(
            "abcde",
            &["aA", "Bc"],
            &[('A', &["b", "x"]), ('B', &["b", "z"])],
        );
        let pool = SolverPool::new(1);
        assert!(pool.job_sender.is_none());
        let outcome = pool.solve(problem).unwrap();
        assert_eq!(
            bindings(outcome),
            [('A', "b".to_string()), ('B', "b".to_string())]
        );
    }

    #[test]
    fn an_empty_seed_domain_is_unsatisfiable_without_searching() {
        let problem = Arc::new(Problem::new(
            "abc",
            vec!["Ax".parse().unwrap()],
            Domains::new(),
        ));
        let pool = SolverPool::new(2);
        let (outcome, task_stats) = pool.solve_with_stats(problem).unwrap();
        assert_eq!(outcome, Outcome::Unsatisfiable);
        assert!(task_stats.is_empty());
    }
}
