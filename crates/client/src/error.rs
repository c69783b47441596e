// crates/client/src/error.rs
use packwatch_types::PLAN_UPGRADE_REQUIRED;
use thiserror::Error;

/// Caller-visible message when no business/year is selected.
pub const NO_WORKSPACE_MESSAGE: &str = "No workspace selected.";

/// Fixed user-facing remap of the store's `PLAN_UPGRADE_REQUIRED` code.
pub const PLAN_UPGRADE_MESSAGE: &str = "Upgrade your plan to generate filing packs.";

/// Errors from talking to the Job Store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network-level failure (connect, timeout, TLS). Transient from the
    /// poller's perspective.
    #[error("store unreachable: {0}")]
    Transport(String),

    /// The store answered with a non-2xx status.
    #[error("store rejected request: {message}")]
    Rejected {
        code: Option<String>,
        message: String,
    },

    /// 2xx response whose body did not parse.
    #[error("malformed store response: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn is_plan_upgrade_required(&self) -> bool {
        matches!(
            self,
            Self::Rejected { code: Some(code), .. } if code == PLAN_UPGRADE_REQUIRED
        )
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Errors surfaced by [`PackWatcher`](crate::PackWatcher) foreground
/// operations. Transient poll-tick failures never appear here; they are
/// logged and retried inside the session.
#[derive(Debug, Error)]
pub enum WatchError {
    /// No owning business resolved; the operation was not attempted.
    #[error("No workspace selected.")]
    NoSubject,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WatchError {
    /// Message shown to the user, with the one special-cased remap.
    pub fn user_message(&self) -> String {
        match self {
            Self::NoSubject => NO_WORKSPACE_MESSAGE.to_string(),
            Self::Store(e) if e.is_plan_upgrade_required() => PLAN_UPGRADE_MESSAGE.to_string(),
            Self::Store(e) => e.to_string(),
        }
    }
}
