//! # Taskseq
//!
//! Asynchronous accelerator task-offload model with a partitioned-reduction
//! latency benchmark.
//!
//! Taskseq models the classic offload question: is it faster to hand an
//! accelerator one large unit of work, or several independent smaller units
//! issued back-to-back? The crate provides a non-blocking-issue /
//! blocking-collect task handle ([`task::TaskSequence`]), an emulated compute
//! queue with per-submission profiling ([`device::DeviceQueue`]), and two
//! orchestration strategies over a product-reduction kernel:
//!
//! - **Sequential**: one task over the full input.
//! - **Partitioned**: four concurrently-issued tasks over disjoint quarters,
//!   whose partial results are summed on return.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use taskseq::prelude::*;
//!
//! let config = BenchConfig::default();
//! let report = taskseq::harness::run(&config)?;
//! print!("{report}");
//! ```
//!
//! ## Execution model
//!
//! The host control flow is single-threaded; all concurrency lives inside the
//! device queue. `issue` never blocks, `collect` is the only suspension
//! point, and the partitioned strategy issues all four task descriptors
//! before awaiting any result, so the queue sees the full work set up front.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]

// ============================================================================
// Core Modules
// ============================================================================

/// Reduction kernels executed on the device.
pub mod kernel;

/// Emulated compute queue, submission events, and profiling.
pub mod device;

/// Task handles: non-blocking issue, blocking collect.
pub mod task;

// ============================================================================
// Orchestration Modules
// ============================================================================

/// Sequential and partitioned offload strategies.
pub mod orchestrate;

/// Benchmark harness: input generation, timing, and validation.
pub mod harness;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for taskseq operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust,ignore
/// use taskseq::prelude::*;
/// ```
pub mod prelude {
    pub use crate::device::{Completion, DeviceQueue, ProfilingInfo, TaskId};
    pub use crate::error::{Error, Result};
    pub use crate::harness::{BenchConfig, Report, Verdict};
    pub use crate::kernel::{product_fold, Kernel};
    pub use crate::task::TaskSequence;
}
