use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("task_not_found - task '{0}' not found")]
    TaskNotFound(String),
    #[error("no_history - nothing to undo")]
    NoHistory,
    #[error("no_redo - nothing to redo")]
    NoRedo,
    #[error("malformed_command - {0}")]
    MalformedCommand(String),
    #[error("invalid_input - {0}")]
    InvalidInput(String),
    #[error("io_error - {0}")]
    Io(String),
}

impl AppError {
    pub fn task_not_found<D: Into<String>>(description: D) -> Self {
        Self::TaskNotFound(description.into())
    }

    pub fn malformed_command<M: Into<String>>(message: M) -> Self {
        Self::MalformedCommand(message.into())
    }

    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::TaskNotFound(_) => "task_not_found",
            Self::NoHistory => "no_history",
            Self::NoRedo => "no_redo",
            Self::MalformedCommand(_) => "malformed_command",
            Self::InvalidInput(_) => "invalid_input",
            Self::Io(_) => "io_error",
        }
    }
}
