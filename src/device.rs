//! Emulated compute queue, submission events, and profiling.
//!
//! Models a pre-selected accelerator queue atop OS worker threads: a command
//! group is submitted without blocking the host, executes on a device control
//! thread, and reports start/end timestamps for the whole submission. The
//! timestamps come from the host's monotonic clock bracketing command
//! execution; resolution is therefore host-clock precision, not a device-side
//! counter.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::kernel::Kernel;

/// Identifier correlating a submission with its offload strategy.
///
/// Carries no behavior; used for diagnostics and profiling correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskId {
    /// One task over the full input.
    Sequential,
    /// Four concurrent tasks over disjoint quarters.
    Partitioned,
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Partitioned => write!(f, "partitioned"),
        }
    }
}

/// Start/end timestamps for one submitted command group.
///
/// Timestamps are nanoseconds since the owning queue was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfilingInfo {
    start_ns: u64,
    end_ns: u64,
}

impl ProfilingInfo {
    /// Timestamp at which the command group began executing.
    #[must_use]
    pub const fn start_ns(&self) -> u64 {
        self.start_ns
    }

    /// Timestamp at which the command group finished executing.
    #[must_use]
    pub const fn end_ns(&self) -> u64 {
        self.end_ns
    }

    /// Execution window in nanoseconds.
    #[must_use]
    pub const fn duration_ns(&self) -> u64 {
        self.end_ns.saturating_sub(self.start_ns)
    }

    /// Execution window converted to milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        self.duration_ns() as f64 * 1e-6
    }
}

/// State shared between the queue, its control threads, and task scopes.
struct QueueShared {
    /// Zero point of the queue clock.
    epoch: Instant,
    /// Kernels currently occupying an execution slot.
    in_flight: AtomicUsize,
}

impl QueueShared {
    fn now_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }
}

/// An emulated accelerator queue.
///
/// Submissions run concurrently with the host and with each other; the queue
/// itself holds no work ordering beyond what callers impose by waiting on
/// events.
pub struct DeviceQueue {
    shared: Arc<QueueShared>,
}

impl Default for DeviceQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceQueue {
    /// Create a queue; its profiling clock starts at zero here.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(QueueShared {
                epoch: Instant::now(),
                in_flight: AtomicUsize::new(0),
            }),
        }
    }

    /// Number of kernels currently holding an execution slot.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.shared.in_flight.load(Ordering::SeqCst)
    }

    /// Submit a command group for execution; returns immediately.
    ///
    /// The group runs on a device control thread and receives a [`TaskScope`]
    /// through which it launches kernels. The returned [`Event`] resolves to
    /// the group's scalar result plus its profiling window. A panic inside
    /// the group surfaces as [`Error::DeviceFault`] when the event is waited
    /// on.
    pub fn submit<F>(&self, id: TaskId, work: F) -> Event
    where
        F: FnOnce(&TaskScope) -> Result<f32> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let shared = Arc::clone(&self.shared);

        thread::spawn(move || {
            let scope = TaskScope {
                shared: Arc::clone(&shared),
                id,
            };
            let start_ns = shared.now_ns();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| work(&scope)));
            let end_ns = shared.now_ns();

            let value = match outcome {
                Ok(result) => result,
                Err(_) => Err(Error::DeviceFault { task: id }),
            };
            let profiling = ProfilingInfo { start_ns, end_ns };
            // Receiver may be gone if the host dropped the event; nothing to do.
            let _ = tx.send((value, profiling));
        });

        Event { id, rx }
    }
}

/// Capability handed to a command group for launching kernels.
///
/// Kernels launched through a scope occupy an execution slot on the owning
/// queue until they complete.
pub struct TaskScope {
    shared: Arc<QueueShared>,
    id: TaskId,
}

impl TaskScope {
    /// Identifier of the submission this scope belongs to.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.id
    }

    /// Launch one kernel invocation on a device worker; returns immediately.
    ///
    /// The receiver yields the kernel's result; if the kernel dies the
    /// channel disconnects instead.
    pub(crate) fn launch(
        &self,
        kernel: Kernel,
        input: Arc<[f32]>,
        start: usize,
        len: usize,
    ) -> Receiver<f32> {
        let (tx, rx) = mpsc::channel();
        let shared = Arc::clone(&self.shared);
        shared.in_flight.fetch_add(1, Ordering::SeqCst);

        thread::spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| kernel(&input, start, len)));
            shared.in_flight.fetch_sub(1, Ordering::SeqCst);
            if let Ok(value) = result {
                let _ = tx.send(value);
            }
            // On panic the sender drops unsent and the collector observes a
            // disconnected channel.
        });

        rx
    }
}

/// Handle to one in-flight submission.
#[must_use = "an unwaited event discards the submission's result and timing"]
pub struct Event {
    id: TaskId,
    rx: Receiver<(Result<f32>, ProfilingInfo)>,
}

/// A finished submission: its scalar result and profiling window.
#[derive(Debug, Clone, Copy)]
pub struct Completion {
    /// Identifier of the submission.
    pub id: TaskId,
    /// Scalar produced by the command group.
    pub value: f32,
    /// Start/end timestamps of the command group.
    pub profiling: ProfilingInfo,
}

impl Event {
    /// Identifier of the submission this event tracks.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Block until the submission completes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceFault`] if the command group panicked or its
    /// control thread died, and propagates any error the group itself
    /// returned.
    pub fn wait(self) -> Result<Completion> {
        let (value, profiling) = self
            .rx
            .recv()
            .map_err(|_| Error::DeviceFault { task: self.id })?;
        Ok(Completion {
            id: self.id,
            value: value?,
            profiling,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_returns_group_value() {
        let queue = DeviceQueue::new();
        let event = queue.submit(TaskId::Sequential, |_scope| Ok(42.0));
        let done = event.wait().unwrap();
        assert_eq!(done.value, 42.0);
        assert_eq!(done.id, TaskId::Sequential);
    }

    #[test]
    fn test_profiling_window_is_ordered() {
        let queue = DeviceQueue::new();
        let event = queue.submit(TaskId::Sequential, |_scope| {
            std::thread::sleep(std::time::Duration::from_millis(2));
            Ok(1.0)
        });
        let done = event.wait().unwrap();
        assert!(done.profiling.end_ns() >= done.profiling.start_ns());
        assert!(done.profiling.duration_ms() >= 0.0);
    }

    #[test]
    fn test_group_panic_surfaces_as_device_fault() {
        let queue = DeviceQueue::new();
        let event = queue.submit(TaskId::Partitioned, |_scope| panic!("injected fault"));
        let err = event.wait().unwrap_err();
        assert_eq!(
            err,
            Error::DeviceFault {
                task: TaskId::Partitioned
            }
        );
    }

    #[test]
    fn test_group_error_propagates() {
        let queue = DeviceQueue::new();
        let event = queue.submit(TaskId::Sequential, |_scope| Err(Error::NotIssued));
        assert_eq!(event.wait().unwrap_err(), Error::NotIssued);
    }

    #[test]
    fn test_execution_slots_released_after_wait() {
        let queue = DeviceQueue::new();
        let input: Arc<[f32]> = Arc::from(vec![0.5f32; 64]);
        let event = queue.submit(TaskId::Sequential, move |scope| {
            let rx = scope.launch(crate::kernel::product_fold, input, 0, 64);
            rx.recv().map_err(|_| Error::DeviceFault {
                task: scope.task_id(),
            })
        });
        event.wait().unwrap();
        assert_eq!(queue.in_flight(), 0);
    }

    #[test]
    fn test_submissions_overlap() {
        let queue = DeviceQueue::new();
        let first = queue.submit(TaskId::Sequential, |_scope| {
            std::thread::sleep(std::time::Duration::from_millis(5));
            Ok(1.0)
        });
        let second = queue.submit(TaskId::Partitioned, |_scope| Ok(2.0));
        // The later submission must be able to finish while the first sleeps.
        assert_eq!(second.wait().unwrap().value, 2.0);
        assert_eq!(first.wait().unwrap().value, 1.0);
    }

    #[test]
    fn test_task_id_display() {
        assert_eq!(TaskId::Sequential.to_string(), "sequential");
        assert_eq!(TaskId::Partitioned.to_string(), "partitioned");
    }
}
