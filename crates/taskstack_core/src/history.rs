use crate::collection::Snapshot;
use crate::error::AppError;

/// What happens to replayable states when a new snapshot is recorded after
/// an undo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RedoPolicy {
    /// Recording leaves the redo stack alone, so a later redo can bring back
    /// a state that predates the newer mutation.
    #[default]
    Retain,
    /// Recording discards the redo stack.
    ClearOnRecord,
}

impl RedoPolicy {
    pub fn name(self) -> &'static str {
        match self {
            Self::Retain => "retain",
            Self::ClearOnRecord => "clear",
        }
    }
}

/// Linear undo/redo history of collection snapshots.
///
/// The undo stack is `below` with `current` on top, so it can never be empty.
/// Its bottom entry is the floor that undo never pops.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    current: Snapshot,
    below: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    policy: RedoPolicy,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(Snapshot::default())
    }
}

impl HistoryStore {
    pub fn new(initial: Snapshot) -> Self {
        Self::with_policy(initial, RedoPolicy::default())
    }

    pub fn with_policy(initial: Snapshot, policy: RedoPolicy) -> Self {
        Self {
            current: initial,
            below: Vec::new(),
            redo_stack: Vec::new(),
            policy,
        }
    }

    pub fn record(&mut self, snapshot: Snapshot) {
        if self.policy == RedoPolicy::ClearOnRecord {
            self.redo_stack.clear();
        }
        let previous = std::mem::replace(&mut self.current, snapshot);
        self.below.push(previous);
    }

    /// Steps back one snapshot and returns the state that is now current.
    pub fn undo(&mut self) -> Result<Snapshot, AppError> {
        let previous = self.below.pop().ok_or(AppError::NoHistory)?;
        let undone = std::mem::replace(&mut self.current, previous);
        self.redo_stack.push(undone);
        Ok(self.current.clone())
    }

    /// Replays the most recently undone snapshot and returns it.
    pub fn redo(&mut self) -> Result<Snapshot, AppError> {
        let snapshot = self.redo_stack.pop().ok_or(AppError::NoRedo)?;
        let previous = std::mem::replace(&mut self.current, snapshot);
        self.below.push(previous);
        Ok(self.current.clone())
    }

    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    /// Number of snapshots on the undo stack, current state included.
    pub fn undo_depth(&self) -> usize {
        self.below.len() + 1
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.below.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn policy(&self) -> RedoPolicy {
        self.policy
    }
}
