//! Demo driver
//!
//! Runs budgeted random search over a synthetic two-dimensional objective,
//! with either the simulated pool (return-value capital) or the tokio task
//! pool (cpu/realtime capital).

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use anyhow::Result;
use blackbird::{
    CapitalType, DesignerOptions, Domain, ExperimentDesigner, FunctionCaller,
    OptimisationProblem, QueryVal, RandomSearchPolicy, SyntheticWorkerManager,
    TaskWorkerManager, WorkerManager,
};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "blackbird")]
#[command(about = "Run a budgeted random-search experiment over a synthetic objective")]
#[command(version)]
struct Cli {
    /// Number of workers in the pool
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Capital budget for the run
    #[arg(long, default_value_t = 50.0)]
    capital: f64,

    /// Scheduling mode (asy or syn)
    #[arg(long, default_value = "asy")]
    mode: String,

    /// Capital accounting (return_value, cputime, realtime)
    #[arg(long, default_value = "return_value")]
    capital_type: String,

    /// Number of initial random evaluations
    #[arg(long, default_value_t = 8)]
    init_evals: i64,

    /// Hard cap on dispatched queries
    #[arg(long, default_value_t = 200)]
    max_steps: u64,

    /// Seed for the random-search policy
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let options = DesignerOptions {
        mode: cli.mode.parse()?,
        capital_type: cli.capital_type.parse()?,
        num_init_evals: cli.init_evals,
        max_num_steps: cli.max_steps,
        ..DesignerOptions::default()
    }
    .apply_env_overrides()?;

    // Concave objective peaking at (0.7, -0.3).
    let domain = Domain::euclidean(vec![(-2.0, 2.0), (-2.0, 2.0)])?;
    let caller = Arc::new(FunctionCaller::new(domain, |point, _| {
        let x = point[0].as_f64().unwrap_or(f64::NAN);
        let y = point[1].as_f64().unwrap_or(f64::NAN);
        QueryVal::Val(-((x - 0.7).powi(2) + (y + 0.3).powi(2)))
    }));

    let worker_manager: Box<dyn WorkerManager> = match options.capital_type {
        CapitalType::ReturnValue => Box::new(SyntheticWorkerManager::new(cli.workers)),
        CapitalType::CpuTime | CapitalType::RealTime => {
            Box::new(TaskWorkerManager::new(cli.workers, Duration::from_millis(5)))
        }
    };

    let mut designer = ExperimentDesigner::new(
        caller,
        worker_manager,
        Box::new(OptimisationProblem::new()),
        Box::new(RandomSearchPolicy::new(cli.seed)),
        options,
        None,
    )?;
    let history = designer.run_experiments(cli.capital).await?;

    tracing::info!(
        policy = %history.full_policy_name,
        completed = history.num_completed_evals(),
        "run finished"
    );
    let best = history
        .query_vals
        .iter()
        .zip(&history.query_points)
        .filter_map(|(val, point)| val.as_f64().map(|v| (v, point)))
        .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    match best {
        Some((val, point)) => println!("best value {val:.6} at {point}"),
        None => println!("no successful evaluations"),
    }
    Ok(())
}
