//! Error types for the nested action queue.

use thiserror::Error;

/// Boxed error returned by a failing action.
pub type ActionError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// Errors that can occur while navigating or advancing a queue.
#[derive(Error, Debug)]
pub enum QueueError {
    /// The traversal wrapped around to the root twice without meeting an action.
    #[error("No reachable action: the queue is empty or only holds empty branches")]
    NoReachableAction,

    /// A descent was requested on a slot that is not a branch.
    #[error("Slot {index} of list {path:?} is not a branch")]
    NotABranch { path: Vec<usize>, index: usize },

    /// A saved frame no longer addresses a branch after the tree was mutated.
    #[error("Cursor path {path:?} no longer leads to a list")]
    BrokenCursor { path: Vec<usize> },

    /// The invoked action failed.
    #[error(transparent)]
    Action(ActionError),
}

impl QueueError {
    /// Creates a NotABranch error.
    pub fn not_a_branch(path: impl Into<Vec<usize>>, index: usize) -> Self {
        Self::NotABranch {
            path: path.into(),
            index,
        }
    }

    /// Creates a BrokenCursor error.
    pub fn broken_cursor(path: impl Into<Vec<usize>>) -> Self {
        Self::BrokenCursor { path: path.into() }
    }

    /// Wraps an action failure.
    pub fn action(err: impl Into<ActionError>) -> Self {
        Self::Action(err.into())
    }
}
