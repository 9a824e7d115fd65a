//! Runs strategies over one dataset, times them, and checks that they agree.
//!
//! Disagreements are collected rather than raised on the spot, so one
//! broken strategy never hides the results of the others.

use std::fmt;
use std::fmt::Write as _;
use std::time::{Duration, Instant};

use crate::combine::{Located, MinMax};
use crate::config::ReduceConfig;
use crate::dataset::{Dataset, Dims, PLANTED_MAX, PLANTED_MIN};
use crate::error::{ReduceError, Result};
use crate::strategy::{Reducer, Strategy};

/// What [`crate::DataGen`] plants in a grid of `dims`.
pub fn planted(dims: Dims) -> MinMax {
    let last = dims.flat(dims.last());
    let center = dims.flat(dims.center());
    // the max overwrites the min when both land on the same cell
    let min = if last == center {
        Located::new(PLANTED_MAX, last)
    } else {
        Located::new(PLANTED_MIN, last)
    };
    MinMax {
        min,
        max: Located::new(PLANTED_MAX, center),
    }
}

#[derive(Debug, Clone)]
pub struct RunRecord {
    pub strategy: Strategy,
    pub threads: usize,
    pub dims: Dims,
    pub result: MinMax,
    /// Mean wall-clock time over the repeats.
    pub elapsed: Duration,
}

impl fmt::Display for RunRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{} x{}]", self.strategy, self.threads)?;
        writeln!(f, "{}", self.result.report(self.dims))?;
        write!(f, "Time: {:.6} seconds", self.elapsed.as_secs_f64())
    }
}

#[derive(Debug, Clone)]
pub struct Mismatch {
    pub strategy: Strategy,
    pub threads: usize,
    /// Where the expected pair came from.
    pub reference: String,
    pub expected: MinMax,
    pub actual: MinMax,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x{}: min {} / max {}, {} has min {} / max {}",
            self.strategy,
            self.threads,
            self.actual.min,
            self.actual.max,
            self.reference,
            self.expected.min,
            self.expected.max
        )
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    pub dims: Dims,
    pub runs: Vec<RunRecord>,
    pub mismatches: Vec<Mismatch>,
}

impl Report {
    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn verify(&self) -> Result<()> {
        if self.is_consistent() {
            return Ok(());
        }
        let detail = self
            .mismatches
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(ReduceError::Inconsistent {
            count: self.mismatches.len(),
            detail,
        })
    }

    /// Elapsed seconds of the first sequential run, if one was made.
    pub fn baseline_seconds(&self) -> Option<f64> {
        self.runs
            .iter()
            .find(|run| run.strategy == Strategy::Sequential)
            .map(|run| run.elapsed.as_secs_f64())
    }

    pub fn speedup(&self, run: &RunRecord) -> Option<f64> {
        let secs = run.elapsed.as_secs_f64();
        self.baseline_seconds()
            .filter(|_| secs > 0.0)
            .map(|base| base / secs)
    }

    /// `strategy,threads,seconds,speedup,efficiency`; the last two columns
    /// are empty without a sequential baseline.
    pub fn to_csv(&self) -> String {
        let mut out = String::from("strategy,threads,seconds,speedup,efficiency\n");
        for run in &self.runs {
            let _ = write!(
                out,
                "{},{},{:.6},",
                run.strategy,
                run.threads,
                run.elapsed.as_secs_f64()
            );
            match self.speedup(run) {
                Some(speedup) => {
                    let units = if run.strategy.is_parallel() { run.threads } else { 1 };
                    let _ = writeln!(out, "{:.3},{:.3}", speedup, speedup / units as f64);
                }
                None => out.push_str(",\n"),
            }
        }
        out
    }
}

/// Runs strategies and compares every result against a reference: the
/// expected pair when one was given, else the first run.
#[derive(Debug, Clone)]
pub struct Harness {
    config: ReduceConfig,
    expected: Option<MinMax>,
    repeats: usize,
}

impl Harness {
    pub fn new(config: ReduceConfig) -> Self {
        Self {
            config,
            expected: None,
            repeats: 1,
        }
    }

    pub fn expect(mut self, expected: MinMax) -> Self {
        self.expected = Some(expected);
        self
    }

    /// Runs each strategy `repeats` times; every repeat must agree.
    /// Clamped to `1..=u32::MAX`.
    pub fn with_repeats(mut self, repeats: usize) -> Self {
        self.repeats = repeats.clamp(1, u32::MAX as usize);
        self
    }

    pub fn run(&self, dataset: &Dataset, strategies: &[Strategy]) -> Result<Report> {
        let reducer = Reducer::new(self.config.clone())?;
        let mut session = Session::new(dataset.dims(), self.expected);
        session.run_all(&reducer, dataset, strategies, self.repeats);
        Ok(session.finish())
    }

    /// Repeats the selection at each thread count; results must match
    /// across counts as well as across strategies.
    pub fn sweep(
        &self,
        dataset: &Dataset,
        strategies: &[Strategy],
        thread_counts: &[usize],
    ) -> Result<Report> {
        let mut session = Session::new(dataset.dims(), self.expected);
        for &threads in thread_counts {
            let reducer = Reducer::new(self.config.clone().with_threads(threads))?;
            session.run_all(&reducer, dataset, strategies, self.repeats);
        }
        Ok(session.finish())
    }
}

struct Session {
    dims: Dims,
    reference: Option<(String, MinMax)>,
    runs: Vec<RunRecord>,
    mismatches: Vec<Mismatch>,
}

impl Session {
    fn new(dims: Dims, expected: Option<MinMax>) -> Self {
        Self {
            dims,
            reference: expected.map(|mm| ("expected".to_string(), mm)),
            runs: Vec::new(),
            mismatches: Vec::new(),
        }
    }

    fn run_all(
        &mut self,
        reducer: &Reducer,
        dataset: &Dataset,
        strategies: &[Strategy],
        repeats: usize,
    ) {
        let threads = reducer.units();
        for &strategy in strategies {
            let mut total = Duration::ZERO;
            let mut first: Option<MinMax> = None;
            for _ in 0..repeats {
                let start = Instant::now();
                let result = reducer.run(strategy, dataset);
                total += start.elapsed();
                if let Some(prev) = first {
                    if prev != result {
                        let label = format!("earlier {strategy} repeat");
                        self.flag(strategy, threads, label, prev, result);
                    }
                } else {
                    first = Some(result);
                    self.check(strategy, threads, result);
                }
            }
            let Some(result) = first else { continue };
            let record = RunRecord {
                strategy,
                threads,
                dims: self.dims,
                result,
                elapsed: total.div_f64(repeats as f64),
            };
            tracing::info!(
                strategy = %strategy,
                threads,
                elapsed_s = record.elapsed.as_secs_f64(),
                min = %result.min,
                max = %result.max,
                "strategy finished"
            );
            self.runs.push(record);
        }
    }

    fn check(&mut self, strategy: Strategy, threads: usize, result: MinMax) {
        match self.reference.clone() {
            None => self.reference = Some((format!("{strategy} x{threads}"), result)),
            Some((label, expected)) if expected != result => {
                self.flag(strategy, threads, label, expected, result);
            }
            Some(_) => {}
        }
    }

    fn flag(
        &mut self,
        strategy: Strategy,
        threads: usize,
        reference: String,
        expected: MinMax,
        actual: MinMax,
    ) {
        let mismatch = Mismatch {
            strategy,
            threads,
            reference,
            expected,
            actual,
        };
        tracing::warn!(%mismatch, "strategy disagrees");
        self.mismatches.push(mismatch);
    }

    fn finish(self) -> Report {
        Report {
            dims: self.dims,
            runs: self.runs,
            mismatches: self.mismatches,
        }
    }
}
