// crates/client/src/config.rs
//! Polling cadence configuration.

use std::time::Duration;

/// Cadence and bounds for a poll session.
///
/// Defaults match the product behavior: poll every 2s while the pack is
/// fresh, drop to every 5s after 30 fast polls (60s), and give up entirely
/// 5 minutes after the session started. The phase switch is poll-count
/// based; the ceiling is wall-clock from session start.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Tick interval during the fast phase.
    pub fast_interval: Duration,
    /// Number of fast-phase polls before switching to the slow interval.
    pub fast_phase_polls: u32,
    /// Tick interval during the slow phase (runs indefinitely).
    pub slow_interval: Duration,
    /// Hard wall-clock bound on a session, measured from session start.
    pub ceiling: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            fast_interval: Duration::from_secs(2),
            fast_phase_polls: 30,
            slow_interval: Duration::from_secs(5),
            ceiling: Duration::from_secs(300),
        }
    }
}
