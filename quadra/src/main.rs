//! quadra - solve randomly generated quadratic equations on a worker pool
//!
//! Without `--workload` the program asks interactively for the small (30)
//! or large (3000) preset.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, Level};

use quadra::logging::{self, LogConfig};
use quadra::pool::config::{FeedMode, ReportDetail, ShutdownStrategy, SolverSystemConfig, Workload};
use quadra::pool::Coordinator;
use quadra::prompt::{self, MenuStream};
use quadra::report::{ConsoleReporter, JsonReporter, Reporter};

#[derive(Parser, Debug)]
#[command(name = "quadra")]
#[command(about = "Solve randomly generated quadratic equations on a bounded worker pool")]
#[command(version)]
struct Cli {
    /// Workload: small (30), large (3000) or an equation count. Prompts when omitted
    #[arg(short, long)]
    workload: Option<Workload>,

    /// Number of worker threads
    #[arg(long, default_value_t = quadra::pool::config::DEFAULT_WORKER_COUNT, conflicts_with = "all_cores")]
    workers: usize,

    /// One worker per logical CPU
    #[arg(long)]
    all_cores: bool,

    /// Capacity of the equation and result channels
    #[arg(short, long, default_value_t = quadra::pool::config::DEFAULT_CHANNEL_CAPACITY)]
    capacity: usize,

    /// Seed for reproducible coefficients
    #[arg(short, long)]
    seed: Option<u64>,

    /// Submit equations from a feeder thread instead of one at a time
    #[arg(long)]
    pipelined: bool,

    /// Stop workers with one stop job each instead of closing the channel
    #[arg(long)]
    poison_pill: bool,

    /// Give up if no solution arrives within this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: Level,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn to_config(&self, workload: Workload) -> SolverSystemConfig {
        let mut config = SolverSystemConfig::for_workload(workload);
        config.worker_count = self.workers;
        if self.all_cores {
            config = config.with_available_parallelism();
        }
        config.channel_capacity = self.capacity;
        config.seed = self.seed;
        if self.pipelined {
            config.feed_mode = FeedMode::Pipelined;
        }
        if self.poison_pill {
            config.shutdown_strategy = ShutdownStrategy::PoisonPill;
        }
        config.drain_timeout = self.timeout_ms.map(Duration::from_millis);
        config
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(LogConfig {
        level: cli.log_level,
        json_format: cli.log_json,
        ..Default::default()
    });

    let workload = match cli.workload {
        Some(workload) => workload,
        None => prompt::read_workload_interactive(MenuStream::for_report(cli.json))
            .context("failed to read workload choice")?,
    };

    let mut config = cli.to_config(workload);
    // Console runs print roots while draining instead of from the report.
    let stream_roots = !cli.json && config.report_detail() == ReportDetail::Roots;
    if stream_roots {
        config.collect_solutions = false;
    }
    info!(%workload, workers = config.worker_count, "configured");

    let mut coordinator = Coordinator::new(config).context("invalid configuration")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut write_error = None;
    let report = coordinator
        .run_observed(|solution| {
            if stream_roots && write_error.is_none() {
                if let Err(e) = writeln!(out, "Root: {}", solution.roots) {
                    write_error = Some(e);
                }
            }
        })
        .context("solver run failed")?;
    if let Some(e) = write_error {
        return Err(e).context("failed to print roots");
    }

    if cli.json {
        JsonReporter.report(&report, &mut out)?;
    } else {
        ConsoleReporter.report(&report, &mut out)?;
    }
    out.flush()?;
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}
