//! Task handles: non-blocking issue, blocking collect.
//!
//! A [`TaskSequence`] binds one kernel and walks an explicit state machine:
//! `Unbound -> Issued` on [`issue`](TaskSequence::issue), back to `Unbound`
//! on [`collect`](TaskSequence::collect). The handle is reusable across
//! issue/collect cycles, but never holds more than one invocation in flight;
//! violations are reported as errors rather than left undefined.

use std::sync::mpsc::Receiver;
use std::sync::Arc;

use crate::device::{TaskId, TaskScope};
use crate::error::{Error, Result};
use crate::kernel::Kernel;

enum State {
    Unbound,
    Issued {
        rx: Receiver<f32>,
        task: TaskId,
    },
}

/// Handle to one asynchronous kernel invocation.
///
/// Independent handles carry no ordering constraint relative to one another:
/// a later-issued handle's result may become ready before an earlier one's
/// `collect` is reached, and `collect` simply waits.
pub struct TaskSequence {
    kernel: Kernel,
    state: State,
}

impl TaskSequence {
    /// Bind a handle to a kernel.
    #[must_use]
    pub fn new(kernel: Kernel) -> Self {
        Self {
            kernel,
            state: State::Unbound,
        }
    }

    /// True while an invocation is in flight.
    #[must_use]
    pub fn is_issued(&self) -> bool {
        matches!(self.state, State::Issued { .. })
    }

    /// Begin executing the kernel over `input[start..start + len]`.
    ///
    /// Returns as soon as the work is launched; the device consumes an
    /// execution slot until the matching [`collect`](Self::collect). Callers
    /// supply an in-range `(start, len)` by construction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyIssued`] if an invocation is already in
    /// flight.
    pub fn issue(
        &mut self,
        scope: &TaskScope,
        input: Arc<[f32]>,
        start: usize,
        len: usize,
    ) -> Result<()> {
        if self.is_issued() {
            return Err(Error::AlreadyIssued);
        }
        let rx = scope.launch(self.kernel, input, start, len);
        self.state = State::Issued {
            rx,
            task: scope.task_id(),
        };
        Ok(())
    }

    /// Block until the in-flight invocation completes and return its result.
    ///
    /// Resets the handle to unbound, releasing its execution slot; the handle
    /// may then be issued again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotIssued`] if nothing is in flight, or
    /// [`Error::DeviceFault`] if the kernel died before producing a result.
    pub fn collect(&mut self) -> Result<f32> {
        match std::mem::replace(&mut self.state, State::Unbound) {
            State::Unbound => Err(Error::NotIssued),
            State::Issued { rx, task } => rx.recv().map_err(|_| Error::DeviceFault { task }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceQueue, TaskId};
    use crate::kernel::product_fold;

    fn run_on_device<F>(group: F) -> Result<f32>
    where
        F: FnOnce(&TaskScope) -> Result<f32> + Send + 'static,
    {
        let queue = DeviceQueue::new();
        Ok(queue.submit(TaskId::Sequential, group).wait()?.value)
    }

    #[test]
    fn test_issue_then_collect_round_trip() {
        let input: Arc<[f32]> = Arc::from(vec![2.0f32, 3.0, 4.0]);
        let value = run_on_device(move |scope| {
            let mut handle = TaskSequence::new(product_fold);
            handle.issue(scope, input, 0, 3)?;
            handle.collect()
        })
        .unwrap();
        assert_eq!(value, 24.0);
    }

    #[test]
    fn test_double_issue_rejected() {
        let input: Arc<[f32]> = Arc::from(vec![1.0f32; 8]);
        let err = run_on_device(move |scope| {
            let mut handle = TaskSequence::new(product_fold);
            handle.issue(scope, input.clone(), 0, 4)?;
            handle.issue(scope, input, 4, 4)?;
            handle.collect()
        })
        .unwrap_err();
        assert_eq!(err, Error::AlreadyIssued);
    }

    #[test]
    fn test_collect_before_issue_rejected() {
        let err = run_on_device(|_scope| TaskSequence::new(product_fold).collect()).unwrap_err();
        assert_eq!(err, Error::NotIssued);
    }

    #[test]
    fn test_collect_resets_state_machine() {
        let input: Arc<[f32]> = Arc::from(vec![0.5f32; 4]);
        let value = run_on_device(move |scope| {
            let mut handle = TaskSequence::new(product_fold);
            handle.issue(scope, input.clone(), 0, 2)?;
            let first = handle.collect()?;
            assert!(!handle.is_issued());
            // Reusable after collect: second cycle on the same handle.
            handle.issue(scope, input, 2, 2)?;
            Ok(first + handle.collect()?)
        })
        .unwrap();
        assert_eq!(value, 0.5);
    }

    #[test]
    fn test_second_collect_without_reissue_rejected() {
        let input: Arc<[f32]> = Arc::from(vec![1.5f32, 2.0]);
        let err = run_on_device(move |scope| {
            let mut handle = TaskSequence::new(product_fold);
            handle.issue(scope, input, 0, 2)?;
            let _ = handle.collect()?;
            handle.collect()
        })
        .unwrap_err();
        assert_eq!(err, Error::NotIssued);
    }

    #[test]
    fn test_out_of_order_readiness_tolerated() {
        // The short task finishes first; collecting the long one first must
        // still return both results correctly.
        let input: Arc<[f32]> = Arc::from((1..=1024).map(|i| (i as f32).sin().abs()).collect::<Vec<_>>());
        let value = run_on_device(move |scope| {
            let mut long = TaskSequence::new(product_fold);
            let mut short = TaskSequence::new(product_fold);
            long.issue(scope, input.clone(), 0, 1024)?;
            short.issue(scope, input, 0, 1)?;
            let a = long.collect()?;
            let b = short.collect()?;
            Ok(a + b)
        })
        .unwrap();
        assert!(value.is_finite());
    }
}
