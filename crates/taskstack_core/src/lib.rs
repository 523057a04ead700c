pub mod collection;
pub mod config;
pub mod error;
pub mod history;
pub mod manager;
pub mod model;
pub mod sink;

pub use collection::{Snapshot, TaskCollection, ViewFilter};
pub use error::AppError;
pub use history::{HistoryStore, RedoPolicy};
pub use manager::TaskManager;
pub use model::{Task, TaskStatus};
