use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use swe_solver::parser::parse_swe;
use swe_solver::solver::{
    self,
    coordinator::{Outcome, SolverPool},
    stats::render_stats_table,
};

/// Decide a substring-with-expansions (SWE) problem file.
#[derive(Parser, Debug)]
#[command(name = "swe", version, about)]
struct Args {
    /// Path to the .SWE problem file.
    input: PathBuf,

    /// Number of worker threads; defaults to the available parallelism.
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Write the solution here instead of next to the input as .SOL.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the outcome as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Print per-task search statistics.
    #[arg(long)]
    stats: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!("{e}");
            ExitCode::from(2)
        }
    }
}

fn run(args: &Args) -> Result<bool, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(&args.input)?;
    let problem = parse_swe(text.lines())?;

    let pool = match args.jobs {
        Some(jobs) => SolverPool::new(jobs),
        None => SolverPool::with_default_workers(),
    };

    let started = Instant::now();
    let (outcome, task_stats) = solver::solve_with(&problem, &pool)?;
    info!(elapsed = ?started.elapsed(), "search finished");

    if args.stats {
        println!("{}", render_stats_table(&task_stats));
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    match &outcome {
        Outcome::Found(assignment) => {
            let mut rendered = String::new();
            for (variable, candidate) in assignment {
                info!("  {} -> {}", variable, candidate);
                rendered.push_str(&format!("{}: {}\n", variable, candidate));
            }
            let path = args
                .output
                .clone()
                .unwrap_or_else(|| solution_path(&args.input));
            fs::write(&path, rendered)?;
            info!(path = %path.display(), "solution written");
            Ok(true)
        }
        Outcome::Unsatisfiable => {
            info!("no solution found");
            Ok(false)
        }
    }
}

fn solution_path(input: &Path) -> PathBuf {
    input.with_extension("SOL")
}
