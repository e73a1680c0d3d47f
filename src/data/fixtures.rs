//! In-memory session data source
//!
//! Serves sessions and scenario rate tables from memory. Used for the bundled
//! sample user, for offline runs, and as the fallback behind the HTTP source.

use super::SessionDataSource;
use crate::error::{DashboardError, Result};
use crate::types::{ScenarioRates, SessionDetail, SessionId, SessionSummary};
use hashbrown::HashMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

const SAMPLE_FIXTURES: &str = include_str!("../../fixtures/sample.json");

/// On-disk fixture format
#[derive(Debug, Default, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    users: BTreeMap<String, Vec<SessionSummary>>,
    #[serde(default)]
    sessions: Vec<SessionDetail>,
    #[serde(default)]
    scenarios: BTreeMap<String, ScenarioRates>,
}

/// Fixture-backed data source
///
/// # Example
/// ```
/// use session_dashboard::data::{FixtureDataSource, SessionDataSource};
///
/// let source = FixtureDataSource::sample().unwrap();
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// let sessions = rt.block_on(source.fetch_user_sessions("user123")).unwrap();
/// assert_eq!(sessions.len(), 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FixtureDataSource {
    /// user id -> session list
    users: HashMap<String, Vec<SessionSummary>>,
    /// session id -> detail
    sessions: HashMap<SessionId, SessionDetail>,
    /// scenario label -> rate table
    scenarios: HashMap<String, ScenarioRates>,
    /// Simulated latency applied before every answer
    latency: Option<Duration>,
}

impl FixtureDataSource {
    /// Create an empty fixture source
    pub fn new() -> Self {
        Self::default()
    }

    /// The bundled sample data: user `user123`, scenarios TEST0 and TEST1
    pub fn sample() -> Result<Self> {
        Self::from_json(SAMPLE_FIXTURES)
    }

    /// Parse fixtures from a JSON document of the form
    /// `{"users": {...}, "sessions": [...], "scenarios": {...}}`
    pub fn from_json(json: &str) -> Result<Self> {
        let file: FixtureFile = serde_json::from_str(json)?;
        let mut source = Self::new();

        for (user_id, sessions) in file.users {
            source.add_user_sessions(user_id, sessions);
        }
        for detail in file.sessions {
            source.add_session(detail);
        }
        for (label, rates) in file.scenarios {
            source.add_scenario(label, rates);
        }

        log::debug!(
            "Loaded fixtures: {} users, {} sessions, {} scenarios",
            source.users.len(),
            source.sessions.len(),
            source.scenarios.len()
        );
        Ok(source)
    }

    /// Load fixtures from a JSON file
    pub fn load_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    /// Delay every answer by `latency` (zero disables the delay)
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = (!latency.is_zero()).then_some(latency);
        self
    }

    /// Register a user's session list
    pub fn add_user_sessions(&mut self, user_id: impl Into<String>, sessions: Vec<SessionSummary>) {
        self.users.insert(user_id.into(), sessions);
    }

    /// Register a session detail, replacing any detail with the same id
    pub fn add_session(&mut self, detail: SessionDetail) {
        let out_of_range = detail.out_of_range_dates();
        if !out_of_range.is_empty() {
            log::warn!(
                "Session {} has {} balance dates outside {}..={}",
                detail.session_id(),
                out_of_range.len(),
                detail.summary.start_date,
                detail.summary.end_date
            );
        }
        self.sessions.insert(detail.session_id(), detail);
    }

    /// Register a scenario's rate table
    pub fn add_scenario(&mut self, label: impl Into<String>, rates: ScenarioRates) {
        self.scenarios.insert(label.into(), rates);
    }

    /// Number of stored session details
    pub fn num_sessions(&self) -> usize {
        self.sessions.len()
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl SessionDataSource for FixtureDataSource {
    async fn fetch_user_sessions(&self, user_id: &str) -> Result<Vec<SessionSummary>> {
        self.simulate_latency().await;
        Ok(self.users.get(user_id).cloned().unwrap_or_default())
    }

    async fn fetch_session_detail(&self, session_id: SessionId) -> Result<SessionDetail> {
        self.simulate_latency().await;
        self.sessions
            .get(&session_id)
            .cloned()
            .ok_or_else(|| DashboardError::session_not_found(session_id))
    }

    async fn fetch_scenario_data(&self, scenario: &str) -> Result<ScenarioRates> {
        self.simulate_latency().await;
        self.scenarios
            .get(scenario)
            .cloned()
            .ok_or_else(|| DashboardError::scenario_not_found(scenario))
    }

    fn name(&self) -> &str {
        "fixtures"
    }
}
