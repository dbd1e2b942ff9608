//! Benchmark harness: input generation, timing, and validation.
//!
//! Owns the input vector and the two-slot output pair, computes the golden
//! reference on the host, runs each offload strategy in its own profiled
//! submission, and judges each result against the golden value
//! independently. A validation mismatch is a reported outcome, not an error;
//! a device fault is fatal and propagates out of [`run`].

use std::fmt;
use std::sync::Arc;

use rand::Rng;

use crate::device::DeviceQueue;
use crate::error::{Error, Result};
use crate::kernel::product_fold;
use crate::orchestrate;

/// Default element count when none is supplied.
pub const DEFAULT_COUNT: usize = 16384;

/// Absolute tolerance for golden-value comparison.
pub const TOLERANCE: f32 = 0.001;

/// Run configuration for the benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchConfig {
    /// Number of input elements to generate.
    pub count: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
        }
    }
}

impl BenchConfig {
    /// Build a configuration from command-line arguments (program name
    /// already stripped). One optional positional argument: the element
    /// count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCount`] unless the argument parses as a
    /// positive integer. Rejection happens here, before any device work is
    /// scheduled.
    pub fn from_args<I>(mut args: I) -> Result<Self>
    where
        I: Iterator<Item = String>,
    {
        match args.next() {
            None => Ok(Self::default()),
            Some(raw) => match raw.parse::<usize>() {
                Ok(count) if count > 0 => Ok(Self { count }),
                _ => Err(Error::InvalidCount(raw)),
            },
        }
    }
}

/// Judgement of one strategy's output against the golden value.
#[derive(Debug, Clone, Copy)]
pub struct Verdict {
    /// Scalar the strategy produced.
    pub value: f32,
    /// Whether the value is within [`TOLERANCE`] of the golden value.
    pub passed: bool,
    /// Profiled execution window of the submission, in milliseconds.
    pub millis: f64,
}

impl Verdict {
    fn judge(value: f32, golden: f32, millis: f64) -> Self {
        Self {
            value,
            passed: (value - golden).abs() < TOLERANCE,
            millis,
        }
    }
}

/// Outcome of one full benchmark run.
///
/// Rendering with `Display` produces the four user-facing lines: one
/// PASSED/FAILED line per strategy, then both timings. Timings are printed
/// regardless of pass/fail.
#[derive(Debug, Clone, Copy)]
pub struct Report {
    /// Host-computed reference value.
    pub golden: f32,
    /// Judgement of the sequential strategy (output slot 0).
    pub sequential: Verdict,
    /// Judgement of the partitioned strategy (output slot 1).
    pub partitioned: Verdict,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sequential.passed {
            writeln!(f, "PASSED sequential test")?;
        } else {
            writeln!(f, "FAILED")?;
        }
        if self.partitioned.passed {
            writeln!(f, "PASSED parallel test")?;
        } else {
            writeln!(f, "FAILED")?;
        }
        writeln!(f, "Sequential time: {} ms", self.sequential.millis)?;
        writeln!(f, "Parallel time: {} ms", self.partitioned.millis)
    }
}

/// Generate `count` uniformly-distributed values in `[0, 1)`.
#[must_use]
pub fn generate_input(count: usize) -> Arc<[f32]> {
    let mut rng = rand::rng();
    (0..count).map(|_| rng.random::<f32>()).collect()
}

/// Generate the input, then run both strategies per [`run_with_input`].
pub fn run(config: &BenchConfig) -> Result<Report> {
    run_with_input(generate_input(config.count))
}

/// Run both offload strategies over `input` and judge them.
///
/// The golden value is computed on the host with the kernel's exact fold
/// semantics before anything is submitted. Each strategy runs in its own
/// independently profiled submission; slot 0 receives the sequential result
/// and slot 1 the partitioned result.
///
/// # Errors
///
/// Propagates [`Error::DeviceFault`] from either submission. There is no
/// retry and no partial-result salvage.
pub fn run_with_input(input: Arc<[f32]>) -> Result<Report> {
    let golden = product_fold(&input, 0, input.len());
    let queue = DeviceQueue::new();
    let mut out = [0.0f32; 2];

    let seq = orchestrate::sequential(&queue, input.clone()).wait()?;
    out[0] = seq.value;

    let par = orchestrate::partitioned(&queue, input).wait()?;
    out[1] = par.value;

    Ok(Report {
        golden,
        sequential: Verdict::judge(out[0], golden, seq.profiling.duration_ms()),
        partitioned: Verdict::judge(out[1], golden, par.profiling.duration_ms()),
    })
}
