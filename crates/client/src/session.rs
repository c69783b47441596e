// crates/client/src/session.rs
//! The poll session: one spawned task per watched subject.
//!
//! A session owns both of its timers (the tick interval and the wall-clock
//! ceiling) inside a single `select!` loop, so cancelling the task releases
//! everything at once. Only one poll is in flight per tick; responses are
//! applied in arrival order.

use std::sync::Arc;

use packwatch_types::Subject;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::PollConfig;
use crate::state::WatcherState;
use crate::store::JobStore;

/// Handle to a running poll session.
///
/// Dropping the handle does not stop the task; call [`stop`](Self::stop).
pub(crate) struct SessionHandle {
    subject: Subject,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// False once the session reached a terminal status, hit the ceiling,
    /// or was cancelled and unwound.
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    /// Signal the session to stop. Idempotent; a poll already in flight
    /// becomes a no-op when it lands.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

/// Start polling `subject`. Sets `is_generating` before the task is spawned
/// so callers observe the session synchronously.
pub(crate) fn spawn_poll_session(
    store: Arc<dyn JobStore>,
    state: Arc<WatcherState>,
    subject: Subject,
    config: PollConfig,
) -> SessionHandle {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    state.set_generating(true);

    let task_subject = subject.clone();
    let task = tokio::spawn(async move {
        run_poll_loop(store, state, task_subject, config, token).await;
    });

    SessionHandle {
        subject,
        cancel,
        task,
    }
}

async fn run_poll_loop(
    store: Arc<dyn JobStore>,
    state: Arc<WatcherState>,
    subject: Subject,
    config: PollConfig,
    cancel: CancellationToken,
) {
    let started = Instant::now();
    let ceiling = time::sleep_until(started + config.ceiling);
    tokio::pin!(ceiling);

    // First tick one interval after start; the caller already did a
    // foreground fetch when it created the session.
    let mut interval = time::interval_at(started + config.fast_interval, config.fast_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut polls: u32 = 0;
    tracing::debug!(%subject, "poll session started");

    loop {
        tokio::select! {
            // Cancellation wins over a simultaneously-due timer.
            biased;

            _ = cancel.cancelled() => {
                tracing::debug!(%subject, polls, "poll session cancelled");
                return;
            }

            _ = &mut ceiling => {
                tracing::warn!(
                    %subject,
                    polls,
                    ceiling_secs = config.ceiling.as_secs(),
                    "gave up waiting for filing pack; job may still complete server-side"
                );
                state.set_generating(false);
                return;
            }

            _ = interval.tick() => {
                polls += 1;
                match store.fetch_status(&subject).await {
                    Ok(job) => {
                        // The watcher may have been cancelled or retargeted
                        // while this poll was in flight.
                        if cancel.is_cancelled() {
                            return;
                        }
                        let terminal = job.status.is_terminal();
                        tracing::debug!(%subject, status = %job.status, polls, "poll observed status");
                        state.set_job(Some(job));
                        state.set_error(None);
                        if terminal {
                            state.set_generating(false);
                            return;
                        }
                    }
                    Err(e) => {
                        if cancel.is_cancelled() {
                            return;
                        }
                        // Transient: keep the cached job and retry next tick.
                        tracing::warn!(%subject, attempt = polls, error = %e, "status poll failed, will retry");
                    }
                }

                if polls == config.fast_phase_polls {
                    // tokio intervals have no reschedule primitive; recreate
                    // the timer to change cadence.
                    interval = time::interval_at(
                        Instant::now() + config.slow_interval,
                        config.slow_interval,
                    );
                    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    tracing::debug!(
                        %subject,
                        slow_secs = config.slow_interval.as_secs(),
                        "switching to slow poll cadence"
                    );
                }
            }
        }
    }
}
