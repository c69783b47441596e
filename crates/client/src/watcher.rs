// crates/client/src/watcher.rs
//! The caller-facing facade: load status, request generation, cancel.

use std::sync::{Arc, Mutex};

use packwatch_types::{PackJob, Subject};
use tokio::sync::broadcast;

use crate::config::PollConfig;
use crate::error::{WatchError, NO_WORKSPACE_MESSAGE};
use crate::session::{spawn_poll_session, SessionHandle};
use crate::state::{WatcherSnapshot, WatcherState};
use crate::store::JobStore;

/// Watches one subject's filing-pack job at a time.
///
/// Holds at most one active poll session; starting again for the same
/// subject is a no-op, switching subjects stops the old session first, and
/// dropping the watcher stops whatever is running. Multiple independent
/// watchers may observe the same store without coordination.
pub struct PackWatcher {
    store: Arc<dyn JobStore>,
    state: Arc<WatcherState>,
    config: PollConfig,
    session: Mutex<Option<SessionHandle>>,
}

impl PackWatcher {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self::with_config(store, PollConfig::default())
    }

    pub fn with_config(store: Arc<dyn JobStore>, config: PollConfig) -> Self {
        Self {
            store,
            state: Arc::new(WatcherState::new()),
            config,
            session: Mutex::new(None),
        }
    }

    /// Current caller-visible state.
    pub fn snapshot(&self) -> WatcherSnapshot {
        self.state.snapshot()
    }

    /// Stream of snapshot updates (one per state change).
    pub fn subscribe(&self) -> broadcast::Receiver<WatcherSnapshot> {
        self.state.subscribe()
    }

    /// Fetch the subject's status once; if it is non-terminal, make sure a
    /// poll session is watching it.
    ///
    /// `None` means no workspace is selected: cached state is cleared and
    /// no request is issued. A fetch failure is surfaced to the caller and
    /// leaves any existing session untouched.
    pub async fn load_status(&self, subject: Option<&Subject>) -> Result<PackJob, WatchError> {
        let Some(subject) = subject else {
            self.state.set_job(None);
            self.state.set_error(Some(NO_WORKSPACE_MESSAGE.to_string()));
            return Err(WatchError::NoSubject);
        };

        self.state.set_loading(true);
        let result = self.store.fetch_status(subject).await;
        self.state.set_loading(false);

        match result {
            Ok(job) => {
                self.state.set_error(None);
                self.state.set_job(Some(job.clone()));
                if !job.status.is_terminal() {
                    self.ensure_session(subject);
                }
                Ok(job)
            }
            Err(e) => {
                let err = WatchError::from(e);
                self.state.set_error(Some(err.user_message()));
                Err(err)
            }
        }
    }

    /// Ask the store to begin (or restart) producing the pack, then watch it.
    ///
    /// On acceptance a session starts (idempotent with [`load_status`]) and
    /// one reconcile fetch runs; a reconcile failure is reported via the
    /// `error` field but neither fails the operation nor stops the session.
    /// On rejection the session is stopped and the error surfaced, with the
    /// plan-upgrade code remapped to its fixed user-facing message.
    pub async fn generate(&self, subject: Option<&Subject>) -> Result<(), WatchError> {
        let Some(subject) = subject else {
            self.state.set_error(Some(NO_WORKSPACE_MESSAGE.to_string()));
            return Err(WatchError::NoSubject);
        };

        self.state.set_loading(true);
        let result = self.store.request_generation(subject).await;
        self.state.set_loading(false);

        match result {
            Ok(()) => {
                self.state.set_error(None);
                self.ensure_session(subject);
                // Reconcile immediately visible state (the store may already
                // report `queued`). The session keeps polling either way.
                match self.store.fetch_status(subject).await {
                    Ok(job) => self.state.set_job(Some(job)),
                    Err(e) => {
                        let err = WatchError::from(e);
                        tracing::warn!(%subject, error = %err, "reconcile fetch after generate failed");
                        self.state.set_error(Some(err.user_message()));
                    }
                }
                Ok(())
            }
            Err(e) => {
                self.cancel();
                let err = WatchError::Store(e);
                self.state.set_error(Some(err.user_message()));
                Err(err)
            }
        }
    }

    /// Stop the active poll session, if any. Idempotent.
    pub fn cancel(&self) {
        match self.session.lock() {
            Ok(mut slot) => {
                if let Some(handle) = slot.take() {
                    handle.stop();
                }
            }
            Err(e) => tracing::error!("session lock poisoned on cancel: {e}"),
        }
        self.state.set_generating(false);
    }

    /// Start a session for `subject` unless one is already watching it.
    /// A session for a different subject is stopped before the new one
    /// starts; the two never run concurrently.
    fn ensure_session(&self, subject: &Subject) {
        let mut slot = match self.session.lock() {
            Ok(slot) => slot,
            Err(e) => {
                tracing::error!("session lock poisoned starting session: {e}");
                return;
            }
        };

        if let Some(handle) = slot.as_ref() {
            if handle.subject() == subject && handle.is_active() {
                return;
            }
        }
        if let Some(old) = slot.take() {
            old.stop();
        }

        *slot = Some(spawn_poll_session(
            Arc::clone(&self.store),
            Arc::clone(&self.state),
            subject.clone(),
            self.config.clone(),
        ));
    }
}

impl Drop for PackWatcher {
    fn drop(&mut self) {
        if let Ok(slot) = self.session.get_mut() {
            if let Some(handle) = slot.take() {
                handle.stop();
            }
        }
    }
}
