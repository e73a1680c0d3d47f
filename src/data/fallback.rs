//! Primary/secondary data source composition

use super::SessionDataSource;
use crate::error::Result;
use crate::types::{ScenarioRates, SessionDetail, SessionId, SessionSummary};

/// Serves from `primary`, switching to `secondary` when the primary's fetch
/// could not complete. `NotFound` and decode errors from the primary are
/// returned unchanged.
pub struct FallbackDataSource<P, S> {
    primary: P,
    secondary: S,
    name: String,
}

impl<P: SessionDataSource, S: SessionDataSource> FallbackDataSource<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        let name = format!("{}+fallback", primary.name());
        Self {
            primary,
            secondary,
            name,
        }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn secondary(&self) -> &S {
        &self.secondary
    }
}

impl<P: SessionDataSource, S: SessionDataSource> SessionDataSource for FallbackDataSource<P, S> {
    async fn fetch_user_sessions(&self, user_id: &str) -> Result<Vec<SessionSummary>> {
        match self.primary.fetch_user_sessions(user_id).await {
            Err(e) if e.is_transport() => {
                log::warn!(
                    "{} failed for user {}, using {}: {}",
                    self.primary.name(),
                    user_id,
                    self.secondary.name(),
                    e
                );
                self.secondary.fetch_user_sessions(user_id).await
            }
            other => other,
        }
    }

    async fn fetch_session_detail(&self, session_id: SessionId) -> Result<SessionDetail> {
        match self.primary.fetch_session_detail(session_id).await {
            Err(e) if e.is_transport() => {
                log::warn!(
                    "{} failed for session {}, using {}: {}",
                    self.primary.name(),
                    session_id,
                    self.secondary.name(),
                    e
                );
                self.secondary.fetch_session_detail(session_id).await
            }
            other => other,
        }
    }

    async fn fetch_scenario_data(&self, scenario: &str) -> Result<ScenarioRates> {
        match self.primary.fetch_scenario_data(scenario).await {
            Err(e) if e.is_transport() => {
                log::warn!(
                    "{} failed for scenario {}, using {}: {}",
                    self.primary.name(),
                    scenario,
                    self.secondary.name(),
                    e
                );
                self.secondary.fetch_scenario_data(scenario).await
            }
            other => other,
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
