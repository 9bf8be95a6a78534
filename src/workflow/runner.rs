//! Background task runner
//!
//! Runs one long-running scan or mutation batch on a worker thread while
//! the calling thread stays free to render progress and react to Ctrl-C.
//! The worker reports through an event channel; the caller polls or drains
//! the channel and finally joins for the task's value.

use crate::core::error::{CleanupError, Result};
use crate::workflow::events::{EventSink, TaskEvent};
use crossbeam_channel::{unbounded, Receiver};
use log::debug;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Handle to a task running on a worker thread.
pub struct TaskHandle<T> {
    events: Receiver<TaskEvent>,
    cancel: Arc<AtomicBool>,
    thread: JoinHandle<Result<T>>,
}

impl<T> TaskHandle<T> {
    /// The event stream. Iteration ends when the task is done and the
    /// sending side is dropped.
    pub fn events(&self) -> &Receiver<TaskEvent> {
        &self.events
    }

    /// Request cooperative cancellation.
    pub fn cancel(&self) {
        self.cancel
            .store(true, std::sync::atomic::Ordering::SeqCst);
    }

    /// The shared cancellation flag (e.g. to wire into a Ctrl-C handler).
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Wait for the task and take its result.
    pub fn join(self) -> Result<T> {
        match self.thread.join() {
            Ok(result) => result,
            Err(_) => Err(CleanupError::IoError("Worker thread panicked".to_string())),
        }
    }
}

/// Spawn `body` on a worker thread with an event sink and a cancellation
/// flag.
///
/// Terminal events (`Finished` / `Failed` / `Cancelled`) are emitted here
/// from the body's result, so task bodies only report progress.
pub fn spawn_task<T, F>(label: &str, cancel: Arc<AtomicBool>, body: F) -> TaskHandle<T>
where
    T: Send + 'static,
    F: FnOnce(&AtomicBool, &EventSink) -> Result<T> + Send + 'static,
{
    let (sender, events) = unbounded();
    let sink = EventSink::new(sender);
    let flag = Arc::clone(&cancel);
    let label = label.to_string();

    let thread = thread::spawn(move || {
        debug!("Task '{}' started", label);
        sink.send(TaskEvent::Started {
            label: label.clone(),
        });

        let result = body(&flag, &sink);
        match &result {
            Ok(_) => sink.send(TaskEvent::Finished),
            Err(CleanupError::Cancelled) => sink.send(TaskEvent::Cancelled),
            Err(e) => sink.send(TaskEvent::Failed {
                error: e.to_string(),
            }),
        }
        debug!("Task '{}' ended", label);
        result
    });

    TaskHandle {
        events,
        cancel,
        thread,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_task_reports_and_returns() {
        let cancel = Arc::new(AtomicBool::new(false));
        let handle = spawn_task("adding", cancel, |_, sink| {
            sink.progress("add", 1, Some(2));
            sink.progress("add", 2, Some(2));
            Ok(40 + 2)
        });

        let events: Vec<TaskEvent> = handle.events().iter().collect();
        assert!(matches!(events.first(), Some(TaskEvent::Started { .. })));
        assert!(matches!(events.last(), Some(TaskEvent::Finished)));
        let progress = events
            .iter()
            .filter(|e| matches!(e, TaskEvent::Progress { .. }))
            .count();
        assert_eq!(progress, 2);

        assert_eq!(handle.join().unwrap(), 42);
    }

    #[test]
    fn test_cancelled_task_emits_cancelled() {
        let cancel = Arc::new(AtomicBool::new(false));
        let handle = spawn_task::<(), _>("spin", Arc::clone(&cancel), |flag, _| {
            while !flag.load(Ordering::Relaxed) {
                thread::yield_now();
            }
            Err(CleanupError::Cancelled)
        });

        handle.cancel();
        let events: Vec<TaskEvent> = handle.events().iter().collect();
        assert!(matches!(events.last(), Some(TaskEvent::Cancelled)));
        assert!(matches!(handle.join(), Err(CleanupError::Cancelled)));
    }

    #[test]
    fn test_failure_is_reported() {
        let cancel = Arc::new(AtomicBool::new(false));
        let handle = spawn_task::<(), _>("boom", cancel, |_, _| {
            Err(CleanupError::InvalidInput("bad".to_string()))
        });

        let events: Vec<TaskEvent> = handle.events().iter().collect();
        assert!(matches!(events.last(), Some(TaskEvent::Failed { .. })));
        assert!(handle.join().is_err());
    }
}
