//! Check every rewritten circuit in an "after" directory against its
//! original in a "before" directory.
//!
//! Exit status:
//!   0 – the run completed
//!   1 – `--strict` was given and at least one pair failed
//!   2 – configuration / I/O / parse error

use std::path::PathBuf;
use std::process::exit;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use qcheq::batch::{BatchDriver, BatchResult};
use qcheq::config::Config;
use qcheq::contractor::OrderOptimizer;
use qcheq::logging::init_tracing;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// JSON config file; command-line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory of original circuits
    #[arg(long)]
    before: Option<PathBuf>,
    /// Directory of rewritten circuits
    #[arg(long)]
    after: Option<PathBuf>,
    /// CSV report path
    #[arg(long)]
    report: Option<PathBuf>,
    /// Skip pairs with more qubits than this
    #[arg(long)]
    max_qubits: Option<usize>,
    /// Accepted distance of the overlap from 1
    #[arg(long)]
    tolerance: Option<f64>,
    /// Largest intermediate tensor, log2 of its element count
    #[arg(long)]
    max_log2_size: Option<f64>,
    /// Contraction order search: greedy, treesa or auto
    #[arg(long)]
    optimizer: Option<OrderOptimizer>,
    /// Exit with status 1 if any pair is not equivalent
    #[arg(long)]
    strict: bool,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(dir) = &cli.before {
        config.before_dir = dir.clone();
    }
    if let Some(dir) = &cli.after {
        config.after_dir = dir.clone();
    }
    if let Some(path) = &cli.report {
        config.report_path = path.clone();
    }
    if let Some(n) = cli.max_qubits {
        config.max_qubits = n;
    }
    if let Some(tol) = cli.tolerance {
        config.tolerance = tol;
    }
    if let Some(size) = cli.max_log2_size {
        config.max_log2_size = size;
    }
    if let Some(optimizer) = cli.optimizer {
        config.optimizer = optimizer;
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: &Cli) -> anyhow::Result<BatchResult> {
    let config = resolve_config(cli)?;
    info!(?config, "starting");
    println!("Starting");
    let report_path = config.report_path.clone();
    BatchDriver::new(config)
        .run()
        .with_context(|| format!("batch run failed (report: {})", report_path.display()))
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(result) => {
            if cli.strict && result.n_fail > 0 {
                exit(1);
            }
        }
        Err(e) => {
            eprintln!("[check-eq] error: {:#}", e);
            exit(2);
        }
    }
}
