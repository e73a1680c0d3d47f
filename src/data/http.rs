//! Remote session API data source
//!
//! Endpoints, relative to the configured base URL:
//! - `GET /sessions/userId/{userId}`
//! - `GET /session/sessionId/{sessionId}`
//! - `GET /scenario/{label}`
//!
//! Ids and labels are percent-encoded as single path segments.

use super::SessionDataSource;
use crate::error::{DashboardError, RecordKind, Result};
use crate::types::{ScenarioRates, SessionDetail, SessionId, SessionSummary};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP-backed data source
pub struct HttpDataSource {
    client: Client,
    base: Url,
}

impl HttpDataSource {
    /// Create a source for `base_url` with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = base_url.into();
        let base = Url::parse(&base_url)
            .map_err(|e| DashboardError::ConfigError(format!("Invalid API URL {}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(DashboardError::ConfigError(format!(
                "Invalid API URL {}: cannot hold a path",
                base_url
            )));
        }
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// `segments` appended to the base URL's path, each percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| DashboardError::ConfigError(format!("Invalid API URL {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, kind: RecordKind, key: &str) -> Result<T> {
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await
            .map_err(|e| DashboardError::Transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DashboardError::NotFound {
                kind,
                key: key.to_string(),
            });
        }
        if !status.is_success() {
            return Err(DashboardError::Transport(format!(
                "API request failed: {} for {}",
                status, url
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| DashboardError::InvalidData(format!("Failed to decode {}: {}", url, e)))
    }
}

impl SessionDataSource for HttpDataSource {
    async fn fetch_user_sessions(&self, user_id: &str) -> Result<Vec<SessionSummary>> {
        let url = self.endpoint(&["sessions", "userId", user_id])?;
        match self.get_json(url, RecordKind::User, user_id).await {
            Err(DashboardError::NotFound { .. }) => Ok(Vec::new()),
            other => other,
        }
    }

    async fn fetch_session_detail(&self, session_id: SessionId) -> Result<SessionDetail> {
        let key = session_id.to_string();
        let url = self.endpoint(&["session", "sessionId", &key])?;
        self.get_json(url, RecordKind::Session, &key).await
    }

    async fn fetch_scenario_data(&self, scenario: &str) -> Result<ScenarioRates> {
        let url = self.endpoint(&["scenario", scenario])?;
        self.get_json(url, RecordKind::Scenario, scenario).await
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let source = HttpDataSource::new("http://localhost:8080/", Duration::from_secs(5)).unwrap();
        assert_eq!(source.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let source = HttpDataSource::new("http://localhost:8080/api/", Duration::from_secs(5)).unwrap();
        let url = source.endpoint(&["sessions", "userId", "a/b?c#d"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/sessions/userId/a%2Fb%3Fc%23d");

        let root = HttpDataSource::new("http://localhost:8080", Duration::from_secs(5)).unwrap();
        assert_eq!(
            root.endpoint(&["scenario", "TEST0"]).unwrap().as_str(),
            "http://localhost:8080/scenario/TEST0"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let err = HttpDataSource::new("not a url", Duration::from_secs(5)).err().unwrap();
        assert!(matches!(err, DashboardError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_failure() {
        let source = HttpDataSource::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = source.fetch_session_detail(9490).await.unwrap_err();
        assert!(err.is_transport());
    }
}
