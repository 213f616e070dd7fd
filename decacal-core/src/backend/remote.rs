//! HTTP client for the decacal REST API (see `decacal-server`).

use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::backend::{Backend, MonthFetch};
use crate::date::CustomDate;
use crate::error::{DecacalError, DecacalResult};
use crate::event::{Event, EventPatch, NewEvent};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Error body returned by the server.
#[derive(Deserialize)]
struct ErrorResponse {
    detail: String,
}

/// Body of `GET /api/calendar/current-date`. Extra fields such as an id
/// or timestamp are ignored.
#[derive(Deserialize)]
struct CurrentDateResponse {
    year: i32,
    month: u32,
    day: u32,
}

pub struct RemoteBackend {
    http: reqwest::Client,
    base_url: String,
}

impl RemoteBackend {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:8001`.
    pub fn new(base_url: &str, timeout: Duration) -> DecacalResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DecacalError::Config(format!("Could not build HTTP client: {e}")))?;

        Ok(RemoteBackend {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// GET /api/ - succeeds if the server answers at all.
    pub async fn health_check(&self) -> DecacalResult<()> {
        let _: serde_json::Value = self
            .send(self.http.get(self.url("/")).timeout(Duration::from_secs(2)))
            .await?;
        Ok(())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> DecacalResult<T> {
        let resp = request.send().await.map_err(request_error)?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.detail)
                .unwrap_or_else(|_| {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                });
            return Err(status_error(status, detail));
        }

        resp.json().await.map_err(|e| {
            if e.is_timeout() {
                DecacalError::Transient(format!("Timed out reading response: {e}"))
            } else {
                DecacalError::Backend(format!("Failed to parse response: {e}"))
            }
        })
    }
}

/// Failures before a status code arrived are worth retrying.
fn request_error(err: reqwest::Error) -> DecacalError {
    if err.is_builder() {
        DecacalError::Config(format!("Invalid request: {err}"))
    } else {
        DecacalError::Transient(format!("Network error - please check your connection ({err})"))
    }
}

fn status_error(status: StatusCode, detail: String) -> DecacalError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            DecacalError::Validation(detail)
        }
        StatusCode::NOT_FOUND => DecacalError::NotFound(detail),
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            DecacalError::Transient(format!("{status}: {detail}"))
        }
        s if s.is_server_error() => DecacalError::Transient(format!("{status}: {detail}")),
        _ => DecacalError::Backend(format!("{status}: {detail}")),
    }
}

impl Backend for RemoteBackend {
    async fn fetch_month(&self, year: i32, month: u32) -> DecacalResult<MonthFetch> {
        debug!(year, month, "fetching month from remote");
        let events: Vec<Event> = self
            .send(self.http.get(self.url(&format!("/events/{year}/{month}"))))
            .await?;
        Ok(MonthFetch::fresh(events))
    }

    async fn get_event(&self, id: &str) -> DecacalResult<Event> {
        self.send(self.http.get(self.url(&format!("/events/single/{id}"))))
            .await
    }

    async fn create_event(&self, event: &NewEvent) -> DecacalResult<Event> {
        self.send(self.http.post(self.url("/events")).json(event))
            .await
    }

    async fn update_event(&self, id: &str, patch: &EventPatch) -> DecacalResult<Event> {
        self.send(self.http.put(self.url(&format!("/events/{id}"))).json(patch))
            .await
    }

    async fn delete_event(&self, id: &str) -> DecacalResult<()> {
        let _: serde_json::Value = self
            .send(self.http.delete(self.url(&format!("/events/{id}"))))
            .await?;
        Ok(())
    }

    async fn get_today(&self) -> DecacalResult<Option<CustomDate>> {
        let resp: CurrentDateResponse = self
            .send(self.http.get(self.url("/calendar/current-date")))
            .await?;
        Ok(Some(CustomDate {
            year: resp.year,
            month: resp.month,
            day: resp.day,
        }))
    }

    async fn set_today(&self, date: &CustomDate) -> DecacalResult<()> {
        let _: CurrentDateResponse = self
            .send(self.http.put(self.url("/calendar/current-date")).json(date))
            .await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(status_error(StatusCode::BAD_REQUEST, "x".into()).is_validation());
        assert!(status_error(StatusCode::UNPROCESSABLE_ENTITY, "x".into()).is_validation());
        assert!(status_error(StatusCode::NOT_FOUND, "x".into()).is_not_found());
        assert!(status_error(StatusCode::SERVICE_UNAVAILABLE, "x".into()).is_transient());
        assert!(status_error(StatusCode::INTERNAL_SERVER_ERROR, "x".into()).is_transient());
        assert!(status_error(StatusCode::TOO_MANY_REQUESTS, "x".into()).is_transient());
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "x".into()),
            DecacalError::Backend(_)
        ));
    }

    #[test]
    fn test_base_url_is_normalized() {
        let backend = RemoteBackend::new("http://127.0.0.1:8001/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(backend.url("/events"), "http://127.0.0.1:8001/api/events");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transient() {
        // Port 9 (discard) is closed on any sane test machine.
        let backend =
            RemoteBackend::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = backend.fetch_month(2025, 2).await.unwrap_err();
        assert!(err.is_transient(), "{err:?}");
    }
}
