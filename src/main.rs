use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use stencil1d::{RemainderPolicy, RunContext, RunOptions, RunStats, Strategy};

/// Benchmark the sequential, global-barrier and fuzzy-barrier averaging engines.
#[derive(Parser, Debug)]
#[command(name = "stencil1d", version, about)]
struct Cli {
    /// Number of interior points
    #[arg(short, long, env = "STENCIL1D_N", default_value_t = RunOptions::default().n)]
    n: usize,

    /// Sweeps per run
    #[arg(short, long, env = "STENCIL1D_ITERATIONS", default_value_t = RunOptions::default().iterations)]
    iterations: usize,

    /// Worker threads for the parallel strategies [default: number of CPUs]
    #[arg(short, long, env = "STENCIL1D_TASKS")]
    tasks: Option<usize>,

    /// Strategies to run (sequential, barrier, fuzzy); repeat or comma-separate
    #[arg(short, long, value_delimiter = ',', value_parser = parse_strategy)]
    strategy: Vec<Strategy>,

    /// What to do when n is not a multiple of tasks (reject, spread)
    #[arg(long, default_value = "reject", value_parser = parse_remainder)]
    remainder: RemainderPolicy,

    /// Timed runs per strategy
    #[arg(long, default_value_t = 10)]
    runs: usize,

    /// Untimed warmup runs per strategy
    #[arg(long, default_value_t = 2)]
    warmup: usize,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress logging
    #[arg(short, long)]
    quiet: bool,
}

fn parse_strategy(s: &str) -> Result<Strategy, String> {
    s.parse().map_err(|e: stencil1d::StencilError| e.to_string())
}

fn parse_remainder(s: &str) -> Result<RemainderPolicy, String> {
    s.parse().map_err(|e: stencil1d::StencilError| e.to_string())
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => tracing_subscriber::EnvFilter::new("warn"),
        1 => tracing_subscriber::EnvFilter::new("info"),
        2 => tracing_subscriber::EnvFilter::new("debug"),
        _ => tracing_subscriber::EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .init();
}

/// Deterministic initial state: a sawtooth interior between sentinels 1.0 and 0.0.
fn seed(n: usize) -> Vec<f64> {
    let mut v: Vec<f64> = (0..n + 2).map(|j| ((j * 7919) % 1000) as f64 / 1000.0).collect();
    v[0] = 1.0;
    v[n + 1] = 0.0;
    v
}

/// Runs once from the seed and returns the final buffer with its stats.
fn run_once(ctx: &RunContext) -> Result<(Vec<f64>, RunStats)> {
    let mut current = seed(ctx.options.n);
    let mut next = current.clone();
    let stats = ctx
        .run(&mut next, &mut current)
        .with_context(|| format!("{} run failed", ctx.options.strategy))?;
    let out = stats.final_buffer.select(&next, &current).to_vec();
    Ok((out, stats))
}

fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f64::max)
}

fn report(name: &str, mut times: Vec<Duration>, skew: u64) {
    times.sort();
    let runs = times.len();
    let mean = times.iter().sum::<Duration>() / runs as u32;
    println!("{name}:");
    println!("  min:    {:?}", times[0]);
    println!("  median: {:?}", times[runs / 2]);
    println!("  mean:   {:?}", mean);
    println!("  max:    {:?}", times[runs - 1]);
    if skew > 0 {
        println!("  max neighbour skew: {skew}");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    if cli.runs == 0 {
        bail!("--runs must be at least 1");
    }
    let strategies = if cli.strategy.is_empty() { Strategy::ALL.to_vec() } else { cli.strategy.clone() };
    let tasks = cli.tasks.unwrap_or_else(num_cpus::get);

    println!("=== stencil1d: n = {}, iterations = {}, tasks = {} ===\n", cli.n, cli.iterations, tasks);

    let reference_opts = RunOptions::new(cli.iterations, cli.n, 1, Strategy::Sequential);
    let (reference, _) = run_once(&RunContext::new(reference_opts))?;

    for strategy in strategies {
        let opts = RunOptions::new(cli.iterations, cli.n, tasks, strategy).with_remainder(cli.remainder);
        opts.validate().with_context(|| format!("invalid options for {strategy}"))?;
        let ctx = RunContext::new(opts);

        for _ in 0..cli.warmup {
            run_once(&ctx)?;
        }

        let mut times = Vec::with_capacity(cli.runs);
        let mut worst_skew = 0;
        for i in 0..cli.runs {
            let (out, stats) = run_once(&ctx)?;
            let diff = max_abs_diff(&out, &reference);
            if diff > 1e-9 {
                bail!("{strategy} diverged from the sequential result on run {} (max diff {diff:e})", i + 1);
            }
            tracing::info!(%strategy, run = i + 1, elapsed = ?stats.elapsed, "timed run");
            worst_skew = worst_skew.max(stats.max_neighbor_skew);
            times.push(stats.elapsed);
        }
        report(strategy.name(), times, worst_skew);
    }

    println!("\n=== done ===");
    Ok(())
}
