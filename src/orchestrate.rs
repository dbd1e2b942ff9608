//! Sequential and partitioned offload strategies.
//!
//! Both strategies submit exactly one command group; the difference is how
//! many kernels the group launches. Sequential is the baseline (one task,
//! full latency of one round trip). Partitioned issues four independent
//! quarter-range tasks back-to-back before awaiting any of them, which is the
//! minimal structure that shows whether concurrent independent tasks beat one
//! large task on end-to-end latency.

use std::sync::Arc;

use crate::device::{DeviceQueue, Event, TaskId};
use crate::kernel::product_fold;
use crate::task::TaskSequence;

/// Offload the whole input as one task.
///
/// Submits a command group that issues a single [`TaskSequence`] over
/// `[0, N)` and collects its result.
pub fn sequential(queue: &DeviceQueue, input: Arc<[f32]>) -> Event {
    let count = input.len();
    queue.submit(TaskId::Sequential, move |scope| {
        let mut whole = TaskSequence::new(product_fold);
        whole.issue(scope, input, 0, count)?;
        whole.collect()
    })
}

/// Offload the input as four concurrent quarter-range tasks.
///
/// Submits a command group that computes `q = N / 4` (floor), issues four
/// independent tasks over `[0,q)`, `[q,2q)`, `[2q,3q)`, `[3q,4q)` with no
/// suspension between issues, then collects first-through-fourth and sums
/// the partial results.
///
/// The four ranges cover `4q <= N` elements; when `N` is not divisible by 4
/// the trailing `N - 4q` elements are not processed, so the partitioned sum
/// may legitimately differ from the sequential result by the truncated
/// remainder. With `N < 4` every range is empty and each task returns the
/// fold seed.
pub fn partitioned(queue: &DeviceQueue, input: Arc<[f32]>) -> Event {
    let quarter = input.len() / 4;
    queue.submit(TaskId::Partitioned, move |scope| {
        let mut first = TaskSequence::new(product_fold);
        let mut second = TaskSequence::new(product_fold);
        let mut third = TaskSequence::new(product_fold);
        let mut fourth = TaskSequence::new(product_fold);

        first.issue(scope, input.clone(), 0, quarter)?;
        second.issue(scope, input.clone(), quarter, quarter)?;
        third.issue(scope, input.clone(), 2 * quarter, quarter)?;
        fourth.issue(scope, input, 3 * quarter, quarter)?;

        Ok(first.collect()? + second.collect()? + third.collect()? + fourth.collect()?)
    })
}
