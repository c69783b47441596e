// crates/client/src/state.rs
//! Shared caller-visible state for one watcher.
//!
//! [`WatcherState`] uses atomics for the boolean flags (plus a `RwLock` for
//! the cached job and error text) so the poll-session task can publish
//! updates while the owning view reads snapshots without contention.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use packwatch_types::PackJob;
use tokio::sync::broadcast;

/// Point-in-time view of the watcher, as exposed to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct WatcherSnapshot {
    /// Last known job, kept even while `error` is set. A transient poll
    /// failure never blanks a cached ready result.
    pub job: Option<PackJob>,
    /// True while a foreground fetch (load/generate) is in flight.
    pub is_loading: bool,
    /// True while a poll session is active.
    pub is_generating: bool,
    pub error: Option<String>,
}

pub(crate) struct WatcherState {
    job: RwLock<Option<PackJob>>,
    is_loading: AtomicBool,
    is_generating: AtomicBool,
    error: RwLock<Option<String>>,
    tx: broadcast::Sender<WatcherSnapshot>,
}

impl WatcherState {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            job: RwLock::new(None),
            is_loading: AtomicBool::new(false),
            is_generating: AtomicBool::new(false),
            error: RwLock::new(None),
            tx,
        }
    }

    pub fn set_job(&self, job: Option<PackJob>) {
        match self.job.write() {
            Ok(mut guard) => *guard = job,
            Err(e) => tracing::error!("RwLock poisoned writing job: {e}"),
        }
        self.publish();
    }

    pub fn set_loading(&self, loading: bool) {
        self.is_loading.store(loading, Ordering::Relaxed);
        self.publish();
    }

    pub fn set_generating(&self, generating: bool) {
        self.is_generating.store(generating, Ordering::Relaxed);
        self.publish();
    }

    pub fn is_generating(&self) -> bool {
        self.is_generating.load(Ordering::Relaxed)
    }

    pub fn set_error(&self, error: Option<String>) {
        match self.error.write() {
            Ok(mut guard) => *guard = error,
            Err(e) => tracing::error!("RwLock poisoned writing error: {e}"),
        }
        self.publish();
    }

    /// Subscribe to snapshot updates (one message per state mutation).
    pub fn subscribe(&self) -> broadcast::Receiver<WatcherSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> WatcherSnapshot {
        WatcherSnapshot {
            job: match self.job.read() {
                Ok(guard) => guard.clone(),
                Err(e) => {
                    tracing::error!("RwLock poisoned reading job: {e}");
                    None
                }
            },
            is_loading: self.is_loading.load(Ordering::Relaxed),
            is_generating: self.is_generating.load(Ordering::Relaxed),
            error: match self.error.read() {
                Ok(guard) => guard.clone(),
                Err(e) => {
                    tracing::error!("RwLock poisoned reading error: {e}");
                    None
                }
            },
        }
    }

    fn publish(&self) {
        // Ignore send errors (no subscribers is fine).
        let _ = self.tx.send(self.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use packwatch_types::{PackStatus, PackStatusResponse, Subject};

    use super::*;

    fn job(status: PackStatus) -> PackJob {
        PackJob::from_response(
            Subject::new("biz-1", 2025),
            PackStatusResponse {
                status,
                payload: None,
                error_detail: None,
                requested_at: None,
            },
        )
    }

    #[test]
    fn initial_snapshot_is_empty() {
        let state = WatcherState::new();
        let snap = state.snapshot();
        assert!(snap.job.is_none());
        assert!(!snap.is_loading);
        assert!(!snap.is_generating);
        assert!(snap.error.is_none());
    }

    #[test]
    fn error_does_not_blank_cached_job() {
        let state = WatcherState::new();
        state.set_job(Some(job(PackStatus::Ready)));
        state.set_error(Some("store unreachable: timeout".to_string()));

        let snap = state.snapshot();
        assert_eq!(snap.job.unwrap().status, PackStatus::Ready);
        assert!(snap.error.is_some());
    }

    #[tokio::test]
    async fn mutations_are_broadcast_in_order() {
        let state = WatcherState::new();
        let mut rx = state.subscribe();

        state.set_loading(true);
        state.set_job(Some(job(PackStatus::Generating)));
        state.set_loading(false);

        assert!(rx.recv().await.unwrap().is_loading);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.job.unwrap().status, PackStatus::Generating);
        assert!(!rx.recv().await.unwrap().is_loading);
    }
}
