//! In-memory queue engine.
//!
//! Named FIFO queues of typed [`Element`]s with long-poll dequeue, a type
//! filter, TTL expiry and a cooperative read lock.
//!
//! # Examples
//!
//! ```rust
//! use qws::queue::{Element, QueueContainer, TypeFilter};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let container = QueueContainer::new();
//!
//! container.enqueue("jobs", Element::new(1, serde_json::Map::new()));
//! container.enqueue("jobs", Element::new(2, serde_json::Map::new()));
//!
//! // Only type 2, waiting at most one second
//! let taken = container
//!     .dequeue("jobs", Duration::from_secs(1), TypeFilter::Only(2), 1, false)
//!     .await?;
//! assert_eq!(taken[0].element_type, 2);
//! assert_eq!(container.get_by_name("jobs").unwrap().len(), 1);
//! # Ok(())
//! # }
//! ```

mod container;
mod error;
#[allow(clippy::module_inception)]
mod queue;
mod types;

// Re-export public API
pub use container::QueueContainer;
pub use error::{QueueError, Result};
pub use queue::Queue;
pub use types::{Element, ElementType, MATCH_ANY_LEGACY, QueueSnapshot, TypeFilter};

#[cfg(test)]
mod property_tests;
