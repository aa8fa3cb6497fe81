//! Run reports and the reporters that render them.
//!
//! A [`RunReport`] is produced by the coordinator after every worker has been
//! joined. [`ConsoleReporter`] prints it for people; [`JsonReporter`] emits it
//! as a single JSON document.

use std::io::{self, Write};
use std::time::Duration;

use serde::{Serialize, Serializer};

use quadra_api::{Solution, WorkerId};

use crate::pool::config::ReportDetail;
use crate::pool::counter::WorkerStats;
use crate::pool::worker::WorkerExit;

const SEPARATOR: &str = "----------------------------------";

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_nanos() as f64 / 1_000_000.0)
}

/// One worker's share of a run.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerReport {
    pub worker: WorkerId,
    pub processed: u64,
    #[serde(rename = "busy_ms", serialize_with = "as_millis")]
    pub busy: Duration,
    #[serde(rename = "average_ms", serialize_with = "as_millis")]
    pub average: Duration,
    pub exit: WorkerExit,
}

impl WorkerReport {
    pub fn from_stats(worker: WorkerId, stats: &WorkerStats, exit: WorkerExit) -> Self {
        Self {
            worker,
            processed: stats.processed(),
            busy: stats.busy(),
            average: stats.average(),
            exit,
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub total_equations: u64,
    /// Final value of the completion counter.
    pub total_solved: u64,
    /// Wall-clock time from launching the pool until the last equation was
    /// solved. Worker shutdown and joining are not included.
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
    pub detail: ReportDetail,
    /// Highest occupancy each channel reached during the run.
    pub equation_channel_peak: usize,
    pub result_channel_peak: usize,
    pub workers: Vec<WorkerReport>,
    /// Drained solutions in drain order; empty unless collection was enabled.
    pub solutions: Vec<Solution>,
}

impl RunReport {
    /// Sum of the per-worker counts. Equals `total_solved` for every
    /// successful run.
    pub fn processed_by_workers(&self) -> u64 {
        self.workers.iter().map(|w| w.processed).sum()
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }
}

/// Renders a [`RunReport`].
pub trait Reporter {
    fn report(&self, report: &RunReport, out: &mut dyn Write) -> io::Result<()>;
}

/// Plain-text output: every root for small runs, worker statistics for
/// large ones.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, report: &RunReport, out: &mut dyn Write) -> io::Result<()> {
        if report.detail == ReportDetail::Roots {
            for solution in &report.solutions {
                writeln!(out, "Root: {}", solution.roots)?;
            }
        }

        writeln!(out, "{}", SEPARATOR)?;
        writeln!(
            out,
            "All equations have been solved. Total solved: {}",
            report.total_solved
        )?;

        if report.detail == ReportDetail::WorkerStats {
            for worker in &report.workers {
                writeln!(
                    out,
                    "Worker {} processed {} equations",
                    worker.worker, worker.processed
                )?;
                writeln!(
                    out,
                    "Avg Time: {:.6} milliseconds",
                    worker.average.as_secs_f64() * 1000.0
                )?;
                writeln!(out, "{}", SEPARATOR)?;
            }
            writeln!(out, "Total time taken: {} milliseconds", report.elapsed_ms())?;
        }
        Ok(())
    }
}

/// One pretty-printed JSON document per run.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn report(&self, report: &RunReport, out: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)
    }
}
