//! Registry of named queues.
//!
//! The registry lock only guards the key set. Every queue carries its own
//! lock and wake signal inside one `Arc<Queue>`, so the queue, lock and
//! signal are created and replaced together, and scans or waits on one
//! queue never serialize unrelated queues.

use super::error::Result;
use super::queue::Queue;
use super::types::{Element, TypeFilter};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Internal state for the container.
#[derive(Default)]
struct ContainerInner {
    /// All queues indexed by name.
    queues: Mutex<HashMap<String, Arc<Queue>>>,
}

/// Process-wide queue registry.
///
/// Cheap to clone; clones share the same registry. Referencing an unknown
/// name through `enqueue`, `dequeue` or `unlock_read` creates the queue.
#[derive(Clone, Default)]
pub struct QueueContainer {
    inner: Arc<ContainerInner>,
}

impl QueueContainer {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the named queue, creating it if absent.
    pub fn ensure_exists(&self, name: &str) -> Arc<Queue> {
        let mut queues = self.inner.queues.lock();
        if let Some(queue) = queues.get(name) {
            return Arc::clone(queue);
        }

        let queue = Arc::new(Queue::new(name));
        queues.insert(name.to_string(), Arc::clone(&queue));
        info!(queue = %name, "Queue created");
        queue
    }

    /// Append an element to the named queue.
    pub fn enqueue(&self, name: &str, element: Element) {
        self.ensure_exists(name).enqueue(element);
    }

    /// Long-poll dequeue on the named queue.
    ///
    /// The registry lock is released before the queue scans or waits.
    ///
    /// # Errors
    ///
    /// Returns [`super::QueueError::ReadLocked`] if the queue's read lock is set.
    pub async fn dequeue(
        &self,
        name: &str,
        timeout: Duration,
        filter: TypeFilter,
        max_count: usize,
        request_read_lock: bool,
    ) -> Result<Vec<Element>> {
        let queue = self.ensure_exists(name);
        queue
            .dequeue(filter, max_count, timeout, request_read_lock)
            .await
    }

    /// Reset one queue, or the whole registry when `name` is empty.
    ///
    /// Callers still waiting on a replaced queue finish against the old,
    /// now unreachable instance.
    pub fn clear(&self, name: &str) {
        let mut queues = self.inner.queues.lock();
        if name.is_empty() {
            let count = queues.len();
            *queues = HashMap::new();
            info!(count, "All queues cleared");
            return;
        }

        if let Some(slot) = queues.get_mut(name) {
            *slot = Arc::new(Queue::new(name));
            info!(queue = %name, "Queue cleared");
        }
    }

    /// Clear the named queue's read lock.
    pub fn unlock_read(&self, name: &str) {
        self.ensure_exists(name).unlock_read();
    }

    /// Live handle to the named queue, without creating it.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<Queue>> {
        self.inner.queues.lock().get(name).cloned()
    }

    /// Live handles to every queue.
    pub fn get_all(&self) -> HashMap<String, Arc<Queue>> {
        self.inner.queues.lock().clone()
    }

    /// Number of registered queues.
    pub fn queue_count(&self) -> usize {
        self.inner.queues.lock().len()
    }

    /// Remove expired elements from every queue.
    ///
    /// Sweeps a snapshot of the registry so no per-queue scan runs under
    /// the registry lock. Returns the total number of removed elements.
    pub fn cleanup(&self, now: DateTime<Utc>) -> usize {
        let queues: Vec<Arc<Queue>> = self.inner.queues.lock().values().cloned().collect();
        queues.iter().map(|queue| queue.cleanup(now)).sum()
    }
}
