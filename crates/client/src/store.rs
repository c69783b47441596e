// crates/client/src/store.rs
//! Job Store access: the trait the watcher polls through, and the HTTP
//! implementation against the product API.

use std::time::Duration;

use async_trait::async_trait;
use packwatch_types::{GenerateResponse, PackJob, PackStatusResponse, StoreErrorBody, Subject};

use crate::error::StoreError;

/// Request timeout for a single store call. Well under the fast poll
/// interval budget so a hung request cannot stack ticks.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The Job Store contract the watcher depends on.
///
/// The store is the sole source of truth for job status and may be polled
/// by any number of independent watchers; the only write is
/// [`request_generation`](JobStore::request_generation).
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Fetch the current status of the subject's filing-pack job.
    async fn fetch_status(&self, subject: &Subject) -> Result<PackJob, StoreError>;

    /// Ask the store to begin (or restart) producing the pack.
    async fn request_generation(&self, subject: &Subject) -> Result<(), StoreError>;
}

/// REST client for the Job Store.
///
/// - `GET  {base}/api/businesses/{id}/filing-packs/{year}`
/// - `POST {base}/api/businesses/{id}/filing-packs/{year}/generate`
pub struct HttpJobStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpJobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        // Builder failure means the TLS backend could not initialize; no
        // store call can succeed after that.
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to construct HTTP client for the Job Store");
        Self::with_client(client, base_url)
    }

    /// Use a caller-provided client (custom TLS, proxies, test setups).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }

    fn status_url(&self, subject: &Subject) -> String {
        format!(
            "{}/api/businesses/{}/filing-packs/{}",
            self.base_url, subject.business_id, subject.tax_year
        )
    }

    /// Map a non-2xx response to [`StoreError::Rejected`], preserving the
    /// store's error code when the body carries one.
    async fn rejection(response: reqwest::Response) -> StoreError {
        let status = response.status();
        let body = response.json::<StoreErrorBody>().await.unwrap_or_default();
        StoreError::Rejected {
            code: body.code,
            message: body
                .message
                .unwrap_or_else(|| format!("store returned {status}")),
        }
    }
}

#[async_trait]
impl JobStore for HttpJobStore {
    async fn fetch_status(&self, subject: &Subject) -> Result<PackJob, StoreError> {
        let response = self.client.get(self.status_url(subject)).send().await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        let body: PackStatusResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(PackJob::from_response(subject.clone(), body))
    }

    async fn request_generation(&self, subject: &Subject) -> Result<(), StoreError> {
        let url = format!("{}/generate", self.status_url(subject));
        let response = self.client.post(url).send().await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        if !body.accepted {
            return Err(StoreError::Rejected {
                code: None,
                message: "generation request not accepted".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use packwatch_types::{PackStatus, PLAN_UPGRADE_REQUIRED};
    use pretty_assertions::assert_eq;

    use super::*;

    fn subject() -> Subject {
        Subject::new("biz-1", 2025)
    }

    #[tokio::test]
    async fn fetch_status_parses_job() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/businesses/biz-1/filing-packs/2025")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"generating","requestedAt":"2025-11-02T09:30:00Z"}"#)
            .create_async()
            .await;

        let store = HttpJobStore::new(server.url());
        let job = store.fetch_status(&subject()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(job.subject, subject());
        assert_eq!(job.status, PackStatus::Generating);
        assert!(job.payload.is_none());
    }

    #[tokio::test]
    async fn fetch_status_maps_rejection_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/businesses/biz-1/filing-packs/2025")
            .with_status(404)
            .with_body(r#"{"code":"NOT_FOUND","message":"no pack for that year"}"#)
            .create_async()
            .await;

        let store = HttpJobStore::new(server.url());
        let err = store.fetch_status(&subject()).await.unwrap_err();

        match err {
            StoreError::Rejected { code, message } => {
                assert_eq!(code.as_deref(), Some("NOT_FOUND"));
                assert_eq!(message, "no pack for that year");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_status_rejection_without_body_keeps_http_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/businesses/biz-1/filing-packs/2025")
            .with_status(503)
            .with_body("upstream down")
            .create_async()
            .await;

        let store = HttpJobStore::new(server.url());
        let err = store.fetch_status(&subject()).await.unwrap_err();

        match err {
            StoreError::Rejected { code, message } => {
                assert!(code.is_none());
                assert!(message.contains("503"));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_status_decode_error_on_garbage_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/businesses/biz-1/filing-packs/2025")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let store = HttpJobStore::new(server.url());
        let err = store.fetch_status(&subject()).await.unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[tokio::test]
    async fn request_generation_accepted() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/businesses/biz-1/filing-packs/2025/generate")
            .with_status(202)
            .with_body(r#"{"accepted":true}"#)
            .create_async()
            .await;

        let store = HttpJobStore::new(server.url());
        store.request_generation(&subject()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn request_generation_plan_upgrade_code_preserved() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/businesses/biz-1/filing-packs/2025/generate")
            .with_status(402)
            .with_body(
                r#"{"code":"PLAN_UPGRADE_REQUIRED","message":"plan does not include filing packs"}"#,
            )
            .create_async()
            .await;

        let store = HttpJobStore::new(server.url());
        let err = store.request_generation(&subject()).await.unwrap_err();

        assert!(err.is_plan_upgrade_required());
        match err {
            StoreError::Rejected { code, .. } => {
                assert_eq!(code.as_deref(), Some(PLAN_UPGRADE_REQUIRED));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_error_when_store_unreachable() {
        // Nothing listens on this port.
        let store = HttpJobStore::new("http://127.0.0.1:1");
        let err = store.fetch_status(&subject()).await.unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let store = HttpJobStore::new("http://localhost:8787///");
        assert_eq!(
            store.status_url(&subject()),
            "http://localhost:8787/api/businesses/biz-1/filing-packs/2025"
        );
    }
}
