use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use argminmax_par::{planted, DataGen, Dims, Harness, ReduceConfig, Report, Strategy};
use clap::{ArgAction, Parser};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Runs the min/max reduction strategies over one generated grid and checks
/// that they agree.
#[derive(Parser, Debug)]
#[command(name = "perf_test")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Strategies to run (repeatable); all of them when omitted
    #[arg(short, long = "strategy", value_name = "NAME")]
    strategies: Vec<Strategy>,

    /// Grid extents M N P
    #[arg(
        long,
        num_args = 3,
        action = ArgAction::Set,
        value_names = ["M", "N", "P"],
        default_values_t = [500, 500, 500]
    )]
    dims: Vec<usize>,

    /// Execution units; defaults to every available core
    #[arg(short, long, env = "ARGMINMAX_THREADS")]
    threads: Option<usize>,

    /// Comma-separated unit counts to sweep, e.g. 1,2,4,8
    #[arg(long, value_delimiter = ',')]
    sweep: Vec<usize>,

    /// Leaf size for the task strategy
    #[arg(long, env = "ARGMINMAX_TASK_THRESHOLD", default_value_t = 65_536)]
    task_threshold: usize,

    #[arg(long, env = "ARGMINMAX_SEED", default_value_t = DataGen::DEFAULT_SEED)]
    seed: u64,

    /// Timed runs per strategy
    #[arg(long, default_value_t = 3)]
    iterations: usize,

    /// Write strategy,threads,seconds,speedup,efficiency rows here
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn print_report(report: &Report) {
    for run in &report.runs {
        println!("\n{run}");
    }

    if report.baseline_seconds().is_some() {
        println!("\n--- Speedups vs Sequential ---");
        for run in report.runs.iter().filter(|r| r.strategy.is_parallel()) {
            if let Some(speedup) = report.speedup(run) {
                let label = format!("{} x{}:", run.strategy, run.threads);
                println!(
                    "{:<20} {:>6.2}x   efficiency {:>5.1}%",
                    label,
                    speedup,
                    100.0 * speedup / run.threads as f64
                );
            }
        }
    }
}

fn grid_dims(extents: &[usize]) -> anyhow::Result<Dims> {
    let &[m, n, p] = extents else {
        bail!("--dims takes exactly three extents, got {}", extents.len());
    };
    Ok(Dims::new(m, n, p)?)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let dims = grid_dims(&args.dims)?;
    let strategies = if args.strategies.is_empty() {
        Strategy::ALL.to_vec()
    } else {
        args.strategies.clone()
    };

    let mut config = ReduceConfig::default().with_task_threshold(args.task_threshold);
    if let Some(threads) = args.threads {
        config = config.with_threads(threads);
    }
    config.validate()?;

    println!("=== argminmax-par Performance Analysis ===\n");
    println!("System: {} cores available", config.resolved_threads());
    println!(
        "Grid {} ({} elements, {:.2} MB), seed {}",
        dims,
        dims.len(),
        dims.len() as f64 * 4.0 / 1e6,
        args.seed
    );

    let dataset = DataGen::new(args.seed).generate(dims)?;
    let harness = Harness::new(config)
        .expect(planted(dims))
        .with_repeats(args.iterations);

    let report = if args.sweep.is_empty() {
        harness.run(&dataset, &strategies)?
    } else {
        harness.sweep(&dataset, &strategies, &args.sweep)?
    };

    print_report(&report);

    if let Some(path) = &args.csv {
        fs::write(path, report.to_csv())
            .with_context(|| format!("writing {}", path.display()))?;
        println!("\nWrote {}", path.display());
    }

    report.verify()?;
    println!("\nAll {} run(s) agree.", report.runs.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dims_default_and_explicit() {
        let args = Args::try_parse_from(["perf_test"]).unwrap();
        assert_eq!(args.dims, [500, 500, 500]);
        let args = Args::try_parse_from(["perf_test", "--dims", "2", "3", "4"]).unwrap();
        assert_eq!(grid_dims(&args.dims).unwrap(), Dims::new(2, 3, 4).unwrap());
    }

    #[test]
    fn test_repeated_dims_rejected() {
        let parsed =
            Args::try_parse_from(["perf_test", "--dims", "2", "3", "4", "--dims", "5", "6", "7"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_grid_dims_needs_three_extents() {
        assert!(grid_dims(&[2, 3]).is_err());
        assert!(grid_dims(&[2, 3, 4, 5]).is_err());
        assert!(grid_dims(&[0, 3, 4]).is_err());
    }
}
