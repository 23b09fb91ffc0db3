use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures of the host runtime and of the async tasks it runs.
///
/// A task that fails hands one of these to its slice, where it becomes the failure
/// reason; store methods return it when the update queue is gone.
#[derive(Error, Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AsyncError {
    /// A general error with a message describing what went wrong.
    #[error("{0}")]
    Error(String),

    /// A task returned no value.
    #[error("Operation returned None!")]
    None,

    /// The task was cancelled before completion.
    #[error("Task was cancelled!")]
    Cancelled,

    /// The task did not finish within its deadline.
    #[error("deadline has elapsed!")]
    Timeout,
}

impl AsyncError {
    /// Builds a general error from a message.
    pub fn error(message: impl Into<String>) -> Self {
        AsyncError::Error(message.into())
    }

    /// Returns true if a task returned no value.
    pub fn is_none(&self) -> bool {
        matches!(self, AsyncError::None)
    }

    /// Returns true if this is a general error with a message.
    pub fn is_error(&self) -> bool {
        matches!(self, AsyncError::Error { .. })
    }

    /// Returns true if the task was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AsyncError::Cancelled)
    }

    /// Returns true if the task ran past its deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, AsyncError::Timeout)
    }
}
