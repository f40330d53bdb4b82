//! Shared crawl frontier
//!
//! This module handles:
//! - The FIFO queue of URLs waiting for a fetch attempt
//! - The visited set that guarantees each URL is enqueued at most once
//! - The in-flight count that tells "queue empty" apart from "crawl drained"
//!
//! All three live behind one mutex so check-and-insert and pop-and-claim are
//! single atomic steps. The lock is never held across an `.await`.

use crate::url::strip_fragment;
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;
use url::Url;

/// Point-in-time view of the frontier counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrontierStats {
    /// URLs ever admitted (size of the visited set)
    pub discovered: u64,

    /// URLs waiting in the queue
    pub pending: u64,

    /// URLs dequeued and not yet marked done
    pub in_flight: u64,

    /// URLs whose fetch attempt has finished, successfully or not
    pub checked: u64,
}

#[derive(Debug, Default)]
struct FrontierState {
    queue: VecDeque<Url>,
    visited: HashSet<Url>,
    in_flight: u64,
    checked: u64,
}

/// Thread-safe work queue with a deduplicating visited set
///
/// Workers call [`dequeue`](Frontier::dequeue) to claim work and
/// [`mark_done`](Frontier::mark_done) once an item is finished. `dequeue`
/// returns `None` only when the queue is empty and no item is in flight, i.e.
/// when no worker could still discover more URLs.
#[derive(Debug, Default)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    changed: Notify,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a URL unless it has been seen before
    ///
    /// The fragment is stripped first, so `/a#sec1` and `/a#sec2` are the same
    /// entry. Membership check, visited insert and queue append happen under a
    /// single lock acquisition.
    ///
    /// # Returns
    ///
    /// * `true` - The URL was new and is now pending
    /// * `false` - The URL was already known; nothing changed
    pub fn enqueue(&self, url: Url) -> bool {
        let url = strip_fragment(url);
        {
            let mut state = self.lock();
            if state.visited.contains(&url) {
                return false;
            }
            state.visited.insert(url.clone());
            state.queue.push_back(url);
        }

        self.changed.notify_waiters();
        true
    }

    /// Claims the next pending URL, waiting while other workers are still busy
    ///
    /// # Returns
    ///
    /// * `Some(Url)` - A URL to fetch; the caller must later call `mark_done`
    /// * `None` - The frontier is drained: nothing pending, nothing in flight
    pub async fn dequeue(&self) -> Option<Url> {
        loop {
            // Register for wakeups before inspecting state so a notify_waiters
            // between the check and the await is not lost.
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if let Some(url) = state.queue.pop_front() {
                    state.in_flight += 1;
                    return Some(url);
                }
                if state.in_flight == 0 {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Signals that one previously dequeued URL is finished
    ///
    /// Any URLs discovered while processing it must be enqueued before this
    /// call, otherwise another worker could observe a false drain.
    pub fn mark_done(&self) {
        let drained = {
            let mut state = self.lock();
            debug_assert!(state.in_flight > 0, "mark_done without dequeue");
            state.in_flight = state.in_flight.saturating_sub(1);
            state.checked += 1;
            state.in_flight == 0 && state.queue.is_empty()
        };

        if drained {
            self.changed.notify_waiters();
        }
    }

    /// Returns true once nothing is pending and nothing is in flight
    pub fn is_drained(&self) -> bool {
        let state = self.lock();
        state.queue.is_empty() && state.in_flight == 0
    }

    /// Returns true if the URL (fragment ignored) has been admitted
    pub fn contains(&self, url: &Url) -> bool {
        let url = strip_fragment(url.clone());
        self.lock().visited.contains(&url)
    }

    /// Returns a snapshot of the counters for progress reporting
    pub fn stats(&self) -> FrontierStats {
        let state = self.lock();
        FrontierStats {
            discovered: state.visited.len() as u64,
            pending: state.queue.len() as u64,
            in_flight: state.in_flight,
            checked: state.checked,
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        // The state stays consistent even if a holder panicked: every critical
        // section is a handful of infallible collection operations.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
