//! A single named FIFO buffer with its own lock and wake signal.

use super::error::{QueueError, Result};
use super::types::{Element, QueueSnapshot, TypeFilter};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, info};

/// State guarded by the per-queue lock.
#[derive(Debug, Default)]
struct QueueState {
    elements: VecDeque<Element>,
    read_locked: bool,
    /// Bumped on every read-lock acquisition and release.
    lock_generation: u64,
}

/// One named queue.
///
/// The buffer and the read-lock flag share a single `parking_lot::Mutex`
/// so the read-lock check is atomic with the buffer scan. The mutex is
/// never held across an `.await`.
///
/// The wake signal broadcasts to every current waiter. Each waiter
/// registers interest before it scans, so an enqueue landing between an
/// empty scan and the wait still wakes it.
#[derive(Debug)]
pub struct Queue {
    id: String,
    state: Mutex<QueueState>,
    signal: Notify,
}

impl Queue {
    /// Create an empty, unlocked queue.
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: Mutex::new(QueueState::default()),
            signal: Notify::new(),
        }
    }

    /// Queue name.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of buffered elements.
    pub fn len(&self) -> usize {
        self.state.lock().elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_read_locked(&self) -> bool {
        self.state.lock().read_locked
    }

    /// Copy the current contents. Not transactional with later mutations.
    pub fn snapshot(&self) -> QueueSnapshot {
        let state = self.state.lock();
        QueueSnapshot {
            id: self.id.clone(),
            elements: state.elements.iter().cloned().collect(),
            read_locked: state.read_locked,
        }
    }

    /// Append an element and wake every waiting consumer.
    pub fn enqueue(&self, element: Element) {
        let element_type = element.element_type;
        self.state.lock().elements.push_back(element);
        self.signal.notify_waiters();
        debug!(queue = %self.id, element_type, "Element enqueued");
    }

    /// Take up to `max_count` matching elements, waiting up to `timeout`.
    ///
    /// `max_count == 0` takes every match. A pass that finds at least one
    /// match returns immediately even if it found fewer than `max_count`.
    /// Timing out is not an error and yields an empty result.
    ///
    /// With `request_read_lock` the read lock is set on the scanning pass
    /// whether or not anything matched.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::ReadLocked`] when the read lock is already set,
    /// without waiting.
    pub async fn dequeue(
        &self,
        filter: TypeFilter,
        max_count: usize,
        timeout: Duration,
        request_read_lock: bool,
    ) -> Result<Vec<Element>> {
        // `None` when the timeout overflows: wait for a signal only
        let deadline = Instant::now().checked_add(timeout);
        let mut lock = ReadLockClaim::new(request_read_lock);

        loop {
            let notified = self.signal.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let matched = self.take_matching(filter, max_count, &mut lock)?;
            if !matched.is_empty() {
                return Ok(matched);
            }

            debug!(queue = %self.id, "Waiting for an element to be added");
            tokio::select! {
                () = &mut notified => {},
                () = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    debug!(queue = %self.id, "Waiting for an element timed out");
                    return Ok(Vec::new());
                },
            }
        }
    }

    /// One locked scan from the head, removing what it collects.
    fn take_matching(
        &self,
        filter: TypeFilter,
        max_count: usize,
        lock: &mut ReadLockClaim,
    ) -> Result<Vec<Element>> {
        let mut state = self.state.lock();
        if state.read_locked && lock.held != Some(state.lock_generation) {
            return Err(QueueError::read_locked(&self.id));
        }
        if lock.requested && lock.held.is_none() {
            state.read_locked = true;
            state.lock_generation = state.lock_generation.wrapping_add(1);
            lock.held = Some(state.lock_generation);
            info!(queue = %self.id, "Read lock set");
        }

        let limit = if max_count == 0 {
            usize::MAX
        } else {
            max_count
        };
        let mut matched = Vec::new();
        let buffered = std::mem::take(&mut state.elements);
        for element in buffered {
            if matched.len() < limit && filter.matches(&element) {
                debug!(queue = %self.id, element_type = element.element_type, "Element dequeued");
                matched.push(element);
            } else {
                state.elements.push_back(element);
            }
        }

        Ok(matched)
    }

    /// Drop every element whose expiry is at or before `now`.
    ///
    /// Returns the number of removed elements.
    pub fn cleanup(&self, now: DateTime<Utc>) -> usize {
        let removed = {
            let mut state = self.state.lock();
            let before = state.elements.len();
            state.elements.retain(|e| !e.is_expired(now));
            before - state.elements.len()
        };

        if removed > 0 {
            info!(queue = %self.id, removed, "Expired elements removed");
        } else {
            debug!(queue = %self.id, "No expired elements");
        }
        removed
    }

    /// Clear the read lock.
    pub fn unlock_read(&self) {
        let was_locked = {
            let mut state = self.state.lock();
            state.lock_generation = state.lock_generation.wrapping_add(1);
            std::mem::replace(&mut state.read_locked, false)
        };
        if was_locked {
            info!(queue = %self.id, "Read lock cleared");
        }
    }
}

/// Read-lock bookkeeping for one dequeue call.
///
/// A call acquires the lock at most once. It counts as the holder only
/// while the generation it acquired is still current, so an unlock or a
/// later acquisition by another consumer revokes it.
#[derive(Debug)]
struct ReadLockClaim {
    requested: bool,
    held: Option<u64>,
}

impl ReadLockClaim {
    fn new(requested: bool) -> Self {
        Self {
            requested,
            held: None,
        }
    }
}
