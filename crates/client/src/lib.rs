// crates/client/src/lib.rs
//! Client-side orchestration for asynchronously generated filing packs.
//!
//! The server-side Job Store owns pack construction; this crate requests
//! generation, polls status at an adaptive cadence until the job becomes
//! terminal (or a wall-clock ceiling is reached), and publishes every
//! observed state to the caller via [`WatcherSnapshot`] updates.

pub mod config;
pub mod error;
pub mod session;
pub mod state;
pub mod store;
pub mod watcher;

pub use config::PollConfig;
pub use error::{StoreError, WatchError, NO_WORKSPACE_MESSAGE, PLAN_UPGRADE_MESSAGE};
pub use state::WatcherSnapshot;
pub use store::{HttpJobStore, JobStore};
pub use watcher::PackWatcher;
