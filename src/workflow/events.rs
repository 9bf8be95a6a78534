//! Progress events for long-running work
//!
//! Thread-safe event types sent from a background task to whatever front
//! end is watching: the CLI's progress bars here, but nothing in the shape
//! of the events assumes a terminal. Events travel over a channel and carry
//! counts and the current item rather than rendered text.

use crossbeam_channel::Sender;
use std::path::PathBuf;

/// Events emitted by a running task.
#[derive(Debug, Clone)]
pub enum TaskEvent {
    /// The task has started
    Started {
        /// Human-readable task label
        label: String,
    },

    /// Periodic progress update
    Progress {
        /// Short phase name, e.g. "collect" or "full hash"
        phase: String,
        /// Items processed so far in this phase
        processed: usize,
        /// Total items in this phase, if known yet
        total: Option<usize>,
        /// Item currently being worked on
        current: Option<PathBuf>,
    },

    /// A log-style line worth surfacing to the user
    Message { text: String },

    /// The task finished; its value is returned through the join handle
    Finished,

    /// The task failed with an error
    Failed { error: String },

    /// The task observed the cancellation flag and stopped
    Cancelled,
}

/// Sending side of the event stream, handed to the task body.
///
/// Sends are best-effort: once the receiver is gone there is nobody left to
/// update, and the task keeps running regardless.
#[derive(Clone)]
pub struct EventSink {
    sender: Sender<TaskEvent>,
}

impl EventSink {
    pub fn new(sender: Sender<TaskEvent>) -> Self {
        Self { sender }
    }

    pub fn send(&self, event: TaskEvent) {
        let _ = self.sender.send(event);
    }

    pub fn progress(&self, phase: &str, processed: usize, total: Option<usize>) {
        self.send(TaskEvent::Progress {
            phase: phase.to_string(),
            processed,
            total,
            current: None,
        });
    }

    pub fn message(&self, text: impl Into<String>) {
        self.send(TaskEvent::Message { text: text.into() });
    }
}
