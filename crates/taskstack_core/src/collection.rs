use crate::error::AppError;
use crate::model::Task;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;

/// Frozen task sequence captured at one point in history.
///
/// Snapshots share storage with the [`TaskCollection`] they were taken from.
/// The collection copies its storage before the first write that follows, so
/// a snapshot never observes later mutations. Cloning is O(1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    tasks: Arc<Vec<Task>>,
}

impl Snapshot {
    pub fn shares_storage_with(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.tasks, &other.tasks)
    }
}

impl Deref for Snapshot {
    type Target = [Task];

    fn deref(&self) -> &Self::Target {
        &self.tasks
    }
}

/// The live, mutable task sequence. Tasks are keyed by description and kept
/// in insertion order; duplicate descriptions are allowed and lookups
/// address the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCollection {
    tasks: Arc<Vec<Task>>,
}

impl TaskCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            tasks: Arc::clone(&snapshot.tasks),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tasks: Arc::clone(&self.tasks),
        }
    }

    pub fn add(&mut self, task: Task) {
        Arc::make_mut(&mut self.tasks).push(task);
    }

    pub fn find(&self, description: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.description() == description)
    }

    pub fn find_mut(&mut self, description: &str) -> Option<&mut Task> {
        // Only detach from shared storage when there is something to change.
        let index = self
            .tasks
            .iter()
            .position(|task| task.description() == description)?;
        Arc::make_mut(&mut self.tasks).get_mut(index)
    }

    /// Removes every task with a matching description and returns how many
    /// were dropped.
    pub fn remove(&mut self, description: &str) -> usize {
        let matched = self
            .tasks
            .iter()
            .filter(|task| task.description() == description)
            .count();
        if matched == 0 {
            return 0;
        }

        let remaining = self
            .tasks
            .iter()
            .filter(|task| task.description() != description)
            .cloned()
            .collect();
        self.tasks = Arc::new(remaining);
        matched
    }

    pub fn filter(&self, filter: ViewFilter) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.iter().filter(move |task| filter.matches(task))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl ViewFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Completed => task.is_completed(),
            Self::Pending => !task.is_completed(),
        }
    }
}

impl FromStr for ViewFilter {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "completed" | "done" => Ok(Self::Completed),
            "pending" | "open" => Ok(Self::Pending),
            other => Err(AppError::invalid_input(format!(
                "unknown filter '{other}' (expected completed or pending)"
            ))),
        }
    }
}
