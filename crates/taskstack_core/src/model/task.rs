use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fields are private so every task goes through [`Task::new`]: the
/// description is always trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    description: String,
    status: TaskStatus,
    due_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl Task {
    /// Builds a pending task. The description is trimmed and must not be blank;
    /// a blank due date counts as no due date.
    pub fn new(description: &str, due_date: Option<&str>) -> Result<Self, AppError> {
        let trimmed = description.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("description is required"));
        }

        let due_date = due_date
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        Ok(Self {
            description: trimmed.to_string(),
            status: TaskStatus::Pending,
            due_date,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn due_date(&self) -> Option<&str> {
        self.due_date.as_deref()
    }

    pub fn mark_completed(&mut self) {
        self.status = TaskStatus::Completed;
    }

    pub fn mark_pending(&mut self) {
        self.status = TaskStatus::Pending;
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.description, self.status.label())?;
        if let Some(due_date) = self.due_date.as_deref() {
            write!(f, ", Due: {due_date}")?;
        }
        Ok(())
    }
}
