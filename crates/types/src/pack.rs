// crates/types/src/pack.rs
//! Wire types for filing-pack jobs as reported by the Job Store.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::subject::Subject;

/// Error code the Job Store returns when the business's subscription plan
/// does not include filing-pack generation.
pub const PLAN_UPGRADE_REQUIRED: &str = "PLAN_UPGRADE_REQUIRED";

/// Server-reported status of a filing-pack job.
///
/// Transitions are monotonic except for re-generation, which may reset a
/// terminal job back to `Queued`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackStatus {
    Queued,
    Generating,
    Ready,
    Failed,
}

impl PackStatus {
    /// `Ready` and `Failed` expect no further transitions without an
    /// explicit new generation request.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

impl fmt::Display for PackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Queued => "queued",
            Self::Generating => "generating",
            Self::Ready => "ready",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Body of `GET /api/businesses/{id}/filing-packs/{year}`.
///
/// The subject is carried in the URL, not the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackStatusResponse {
    pub status: PackStatus,
    /// Present only when `status == ready`. Opaque to the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// Present only when `status == failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_at: Option<DateTime<Utc>>,
}

/// A filing-pack job as cached by the client: the wire status paired with
/// the subject it was fetched for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackJob {
    pub subject: Subject,
    pub status: PackStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_at: Option<DateTime<Utc>>,
}

impl PackJob {
    pub fn from_response(subject: Subject, response: PackStatusResponse) -> Self {
        Self {
            subject,
            status: response.status,
            payload: response.payload,
            error_detail: response.error_detail,
            requested_at: response.requested_at,
        }
    }
}

/// Body of a successful `POST .../generate` (HTTP 202).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub accepted: bool,
}

/// Error body the Job Store attaches to non-2xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
