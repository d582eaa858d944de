//! Queue error types.

/// Result type for queue operations.
pub type Result<T> = std::result::Result<T, QueueError>;

/// Errors surfaced by queue operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum QueueError {
    /// Dequeue attempted while another consumer holds the read lock.
    #[error("queue '{queue}' read is locked")]
    ReadLocked { queue: String },
}

impl QueueError {
    /// Create a read locked error.
    pub fn read_locked(queue: impl Into<String>) -> Self {
        Self::ReadLocked {
            queue: queue.into(),
        }
    }

    /// Get the appropriate HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ReadLocked { .. } => 423,
        }
    }
}
