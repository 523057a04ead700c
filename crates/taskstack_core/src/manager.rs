use crate::collection::{TaskCollection, ViewFilter};
use crate::config::Config;
use crate::error::AppError;
use crate::history::HistoryStore;
use crate::model::Task;
use crate::sink::{EventSink, ManagerEvent, TracingSink};

/// Live task collection paired with its undo/redo history.
///
/// Every successful mutation applies to the live collection first and then
/// records a snapshot of the result, so the top of the undo stack always
/// equals the live collection. The two must be mutated together; wrap the
/// whole manager in one lock if it is ever shared between threads.
pub struct TaskManager {
    tasks: TaskCollection,
    history: HistoryStore,
    sink: Box<dyn EventSink>,
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new(TracingSink)
    }
}

impl TaskManager {
    pub fn new<S: EventSink + 'static>(sink: S) -> Self {
        Self::with_config(&Config::default(), sink)
    }

    pub fn with_config<S: EventSink + 'static>(config: &Config, sink: S) -> Self {
        let tasks = TaskCollection::new();
        let history = HistoryStore::with_policy(tasks.snapshot(), config.redo_policy);
        Self {
            tasks,
            history,
            sink: Box::new(sink),
        }
    }

    pub fn add_task(&mut self, task: Task) {
        let description = task.description().to_string();
        self.tasks.add(task);
        self.commit();
        self.emit(ManagerEvent::TaskAdded { description });
    }

    /// Marks the first task with `description` as completed. A miss is
    /// reported to the sink and leaves both the collection and the history
    /// untouched.
    pub fn mark_completed(&mut self, description: &str) -> Result<(), AppError> {
        let description = description.trim();
        let Some(task) = self.tasks.find_mut(description) else {
            return Err(self.not_found(description));
        };
        task.mark_completed();
        self.commit();
        self.emit(ManagerEvent::TaskCompleted {
            description: description.to_string(),
        });
        Ok(())
    }

    pub fn mark_pending(&mut self, description: &str) -> Result<(), AppError> {
        let description = description.trim();
        let Some(task) = self.tasks.find_mut(description) else {
            return Err(self.not_found(description));
        };
        task.mark_pending();
        self.commit();
        self.emit(ManagerEvent::TaskReopened {
            description: description.to_string(),
        });
        Ok(())
    }

    /// Removes every task with `description` and returns how many went.
    /// A history entry is recorded even when nothing matched.
    pub fn delete_task(&mut self, description: &str) -> usize {
        let description = description.trim();
        let removed = self.tasks.remove(description);
        self.commit();
        self.emit(ManagerEvent::TaskDeleted {
            description: description.to_string(),
            removed,
        });
        removed
    }

    pub fn view_tasks(&self, filter: ViewFilter) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.filter(filter)
    }

    pub fn undo(&mut self) -> Result<(), AppError> {
        match self.history.undo() {
            Ok(snapshot) => {
                self.tasks = TaskCollection::from_snapshot(&snapshot);
                self.emit(ManagerEvent::UndoApplied);
                Ok(())
            }
            Err(err) => {
                self.emit(ManagerEvent::UndoUnavailable);
                Err(err)
            }
        }
    }

    pub fn redo(&mut self) -> Result<(), AppError> {
        match self.history.redo() {
            Ok(snapshot) => {
                self.tasks = TaskCollection::from_snapshot(&snapshot);
                self.emit(ManagerEvent::RedoApplied);
                Ok(())
            }
            Err(err) => {
                self.emit(ManagerEvent::RedoUnavailable);
                Err(err)
            }
        }
    }

    pub fn tasks(&self) -> &TaskCollection {
        &self.tasks
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    fn commit(&mut self) {
        self.history.record(self.tasks.snapshot());
    }

    fn not_found(&self, description: &str) -> AppError {
        self.emit(ManagerEvent::TaskNotFound {
            description: description.to_string(),
        });
        AppError::task_not_found(description)
    }

    fn emit(&self, event: ManagerEvent) {
        self.sink.record(&event);
    }
}
