use std::fmt;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerEvent {
    TaskAdded { description: String },
    TaskCompleted { description: String },
    TaskReopened { description: String },
    TaskNotFound { description: String },
    TaskDeleted { description: String, removed: usize },
    UndoApplied,
    UndoUnavailable,
    RedoApplied,
    RedoUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
}

impl ManagerEvent {
    pub fn severity(&self) -> Severity {
        match self {
            Self::TaskNotFound { .. } | Self::UndoUnavailable | Self::RedoUnavailable => {
                Severity::Warning
            }
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for ManagerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TaskAdded { description } => write!(f, "Task '{description}' added."),
            Self::TaskCompleted { description } => {
                write!(f, "Task '{description}' marked as completed.")
            }
            Self::TaskReopened { description } => {
                write!(f, "Task '{description}' marked as pending.")
            }
            Self::TaskNotFound { description } => write!(f, "Task '{description}' not found."),
            Self::TaskDeleted { description, .. } => write!(f, "Task '{description}' deleted."),
            Self::UndoApplied => f.write_str("Undo completed."),
            Self::UndoUnavailable => f.write_str("Undo not possible."),
            Self::RedoApplied => f.write_str("Redo completed."),
            Self::RedoUnavailable => f.write_str("Redo not possible."),
        }
    }
}

/// Receives every outcome a [`crate::manager::TaskManager`] produces.
pub trait EventSink: Send {
    fn record(&self, event: &ManagerEvent);
}

impl<S: EventSink + Sync + ?Sized> EventSink for Arc<S> {
    fn record(&self, event: &ManagerEvent) {
        (**self).record(event);
    }
}

/// Forwards events to the `tracing` subscriber installed by the host process.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &ManagerEvent) {
        match event.severity() {
            Severity::Info => tracing::info!("{event}"),
            Severity::Warning => tracing::warn!("{event}"),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn record(&self, _event: &ManagerEvent) {}
}

/// Keeps events in memory. Share it through an `Arc` to read them back after
/// handing a clone to the manager.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ManagerEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<ManagerEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: &ManagerEvent) {
        let mut events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push(event.clone());
    }
}
