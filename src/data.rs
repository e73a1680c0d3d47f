//! Session data sources
//!
//! The dashboard reads everything through [`SessionDataSource`]:
//! - [`FixtureDataSource`]: in-memory tables, including the bundled sample user
//! - [`HttpDataSource`]: the remote session API (feature `http`)
//! - [`FallbackDataSource`]: primary source with a secondary used on transport failure

pub mod fallback;
pub mod fixtures;
#[cfg(feature = "http")]
pub mod http;

pub use fallback::FallbackDataSource;
pub use fixtures::FixtureDataSource;
#[cfg(feature = "http")]
pub use http::HttpDataSource;

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::types::{ScenarioRates, SessionDetail, SessionId, SessionSummary};
use std::future::Future;
use std::time::Duration;

/// Read-only access to sessions and scenario rate tables
pub trait SessionDataSource: Send + Sync {
    /// Sessions belonging to a user. An unknown user yields an empty list.
    fn fetch_user_sessions(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<SessionSummary>>> + Send;

    /// Full detail of one session; `NotFound` for an unknown id
    fn fetch_session_detail(
        &self,
        session_id: SessionId,
    ) -> impl Future<Output = Result<SessionDetail>> + Send;

    /// FX rate table of a scenario; `NotFound` for an unknown label
    fn fetch_scenario_data(
        &self,
        scenario: &str,
    ) -> impl Future<Output = Result<ScenarioRates>> + Send;

    /// Get the source name
    fn name(&self) -> &str;
}

/// Source selected by configuration
pub enum ConfiguredSource {
    Fixtures(FixtureDataSource),
    #[cfg(feature = "http")]
    Http(HttpDataSource),
    #[cfg(feature = "http")]
    HttpWithFallback(FallbackDataSource<HttpDataSource, FixtureDataSource>),
}

impl ConfiguredSource {
    /// Build the source described by `config`.
    ///
    /// Without an API URL the fixtures are served directly. With one, the HTTP
    /// source is used, backed by the fixtures when `fallback_to_fixtures` is set.
    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        let fixtures = || -> Result<FixtureDataSource> {
            let source = match &config.fixtures_path {
                Some(path) => FixtureDataSource::load_json_file(path)?,
                None => FixtureDataSource::sample()?,
            };
            Ok(source.with_latency(Duration::from_millis(config.fixture_latency_ms)))
        };

        match &config.api_base_url {
            None => Ok(ConfiguredSource::Fixtures(fixtures()?)),
            #[cfg(feature = "http")]
            Some(url) => {
                let http = HttpDataSource::new(
                    url.clone(),
                    Duration::from_secs(config.request_timeout_secs),
                )?;
                if config.fallback_to_fixtures {
                    Ok(ConfiguredSource::HttpWithFallback(FallbackDataSource::new(
                        http,
                        fixtures()?,
                    )))
                } else {
                    Ok(ConfiguredSource::Http(http))
                }
            }
            #[cfg(not(feature = "http"))]
            Some(url) => {
                log::warn!(
                    "api_base_url {} ignored: built without the `http` feature",
                    url
                );
                Ok(ConfiguredSource::Fixtures(fixtures()?))
            }
        }
    }
}

impl SessionDataSource for ConfiguredSource {
    async fn fetch_user_sessions(&self, user_id: &str) -> Result<Vec<SessionSummary>> {
        match self {
            ConfiguredSource::Fixtures(s) => s.fetch_user_sessions(user_id).await,
            #[cfg(feature = "http")]
            ConfiguredSource::Http(s) => s.fetch_user_sessions(user_id).await,
            #[cfg(feature = "http")]
            ConfiguredSource::HttpWithFallback(s) => s.fetch_user_sessions(user_id).await,
        }
    }

    async fn fetch_session_detail(&self, session_id: SessionId) -> Result<SessionDetail> {
        match self {
            ConfiguredSource::Fixtures(s) => s.fetch_session_detail(session_id).await,
            #[cfg(feature = "http")]
            ConfiguredSource::Http(s) => s.fetch_session_detail(session_id).await,
            #[cfg(feature = "http")]
            ConfiguredSource::HttpWithFallback(s) => s.fetch_session_detail(session_id).await,
        }
    }

    async fn fetch_scenario_data(&self, scenario: &str) -> Result<ScenarioRates> {
        match self {
            ConfiguredSource::Fixtures(s) => s.fetch_scenario_data(scenario).await,
            #[cfg(feature = "http")]
            ConfiguredSource::Http(s) => s.fetch_scenario_data(scenario).await,
            #[cfg(feature = "http")]
            ConfiguredSource::HttpWithFallback(s) => s.fetch_scenario_data(scenario).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            ConfiguredSource::Fixtures(s) => s.name(),
            #[cfg(feature = "http")]
            ConfiguredSource::Http(s) => s.name(),
            #[cfg(feature = "http")]
            ConfiguredSource::HttpWithFallback(s) => s.name(),
        }
    }
}
