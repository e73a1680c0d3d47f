//! Dashboard selection state and fetch orchestration
//!
//! The controller owns what the user has chosen (a scenario and a set of
//! sessions) and everything fetched for that choice. Fetches run as tokio
//! tasks; their outcomes are applied one at a time, in completion order, by
//! [`DashboardController::next_outcome`]. State is only mutated through
//! `&mut self`, so there is nothing to lock.
//!
//! Each outcome carries the subject it was requested for. An outcome whose
//! subject no longer matches the current state is dropped: the scenario
//! changed, the session was deselected or re-requested, or a newer
//! session-list fetch was issued.
//!
//! Spawning requires a tokio runtime: call the transition methods from inside
//! one.
//!
//! ```rust
//! use session_dashboard::controller::{DashboardController, DashboardPhase};
//! use session_dashboard::config::DashboardConfig;
//! use session_dashboard::data::FixtureDataSource;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let source = FixtureDataSource::sample().unwrap();
//! let mut dashboard = DashboardController::new(source, "user123", DashboardConfig::default());
//!
//! dashboard.load();
//! dashboard.select_scenario("TEST0");
//! dashboard.toggle_session(9490).unwrap();
//! dashboard.settle().await;
//!
//! assert_eq!(dashboard.phase(), DashboardPhase::SessionsSelected);
//! assert_eq!(dashboard.view().jpy_chart.dates.len(), 6);
//! # }
//! ```

use crate::chart::{BalanceTables, FxRatesChart, JpyBalanceChart};
use crate::config::DashboardConfig;
use crate::currency::CurrencyPair;
use crate::data::SessionDataSource;
use crate::error::{DashboardError, Result};
use crate::types::{
    group_by_scenario, ScenarioGroup, ScenarioRates, SessionDetail, SessionId, SessionSummary,
};
use hashbrown::HashMap;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::task::{self, JoinSet};

/// Where the dashboard is in its selection flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DashboardPhase {
    /// No scenario chosen
    Idle,
    /// Scenario chosen, no session selected
    ScenarioSelected,
    /// One or more sessions selected
    SessionsSelected,
}

/// What a fetch was issued for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FetchSubject {
    SessionList,
    Scenario(String),
    Session(SessionId),
}

impl fmt::Display for FetchSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchSubject::SessionList => write!(f, "sessions"),
            FetchSubject::Scenario(label) => write!(f, "scenario {}", label),
            FetchSubject::Session(id) => write!(f, "session {}", id),
        }
    }
}

/// User-visible error left by a failed fetch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBanner {
    pub subject: FetchSubject,
    pub message: String,
}

/// Result of applying one fetch outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    /// The result landed in controller state
    Applied(FetchSubject),
    /// The fetch failed and raised the error banner
    Failed(FetchSubject),
    /// The subject no longer matched current state; the result was dropped
    Stale(FetchSubject),
}

/// A fetch as issued: its subject plus the state tag it must still match
#[derive(Debug)]
enum FetchRequest {
    Sessions { generation: u64 },
    Scenario { epoch: u64, scenario: String },
    Detail { epoch: u64, session_id: SessionId, seq: u64 },
}

impl FetchRequest {
    /// Outcome standing in for a task that never returned one
    fn failed(self, error: DashboardError) -> FetchOutcome {
        match self {
            FetchRequest::Sessions { generation } => FetchOutcome::Sessions {
                generation,
                result: Err(error),
            },
            FetchRequest::Scenario { epoch, scenario } => FetchOutcome::Scenario {
                epoch,
                scenario,
                result: Err(error),
            },
            FetchRequest::Detail {
                epoch,
                session_id,
                seq,
            } => FetchOutcome::Detail {
                epoch,
                session_id,
                seq,
                result: Err(error),
            },
        }
    }
}

enum FetchOutcome {
    Sessions {
        generation: u64,
        result: Result<Vec<SessionSummary>>,
    },
    Scenario {
        epoch: u64,
        scenario: String,
        result: Result<ScenarioRates>,
    },
    Detail {
        epoch: u64,
        session_id: SessionId,
        seq: u64,
        result: Result<SessionDetail>,
    },
}

/// Everything presentation needs, already computed
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub user_id: String,
    pub phase: DashboardPhase,
    pub scenario: Option<String>,
    pub groups: Vec<ScenarioGroup>,
    pub selected: Vec<SessionId>,
    pub jpy_chart: JpyBalanceChart,
    pub fx_chart: FxRatesChart,
    pub balance_tables: BalanceTables,
    pub error: Option<ErrorBanner>,
    pub sessions_loading: bool,
    pub scenario_loading: bool,
    pub details_loading: bool,
}

/// Selection state machine over a [`SessionDataSource`]
pub struct DashboardController<S> {
    source: Arc<S>,
    config: DashboardConfig,
    user_id: String,

    sessions: Vec<SessionSummary>,
    scenario: Option<String>,
    scenario_rates: Option<ScenarioRates>,
    /// Selected ids in selection order
    selected: Vec<SessionId>,
    details: HashMap<SessionId, SessionDetail>,
    fx_pairs: Vec<String>,
    error: Option<ErrorBanner>,

    /// Bumped on every scenario selection; detail and scenario outcomes from
    /// an older epoch are stale
    epoch: u64,
    /// Bumped on every session-list fetch
    sessions_generation: u64,
    sessions_loading: bool,
    scenario_loading: bool,
    /// Selected ids awaiting a detail, mapped to the sequence number of the
    /// one request whose outcome may still land
    pending_details: HashMap<SessionId, u64>,
    detail_seq: u64,

    tasks: JoinSet<FetchOutcome>,
    /// Request behind each running task, so a task that dies still fails
    /// its subject
    in_flight: HashMap<task::Id, FetchRequest>,
}

impl<S: SessionDataSource + 'static> DashboardController<S> {
    pub fn new(source: S, user_id: impl Into<String>, config: DashboardConfig) -> Self {
        let fx_pairs = config.default_fx_pairs.clone();
        Self {
            source: Arc::new(source),
            config,
            user_id: user_id.into(),
            sessions: Vec::new(),
            scenario: None,
            scenario_rates: None,
            selected: Vec::new(),
            details: HashMap::new(),
            fx_pairs,
            error: None,
            epoch: 0,
            sessions_generation: 0,
            sessions_loading: false,
            scenario_loading: false,
            pending_details: HashMap::new(),
            detail_seq: 0,
            tasks: JoinSet::new(),
            in_flight: HashMap::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn phase(&self) -> DashboardPhase {
        match (&self.scenario, self.selected.is_empty()) {
            (None, _) => DashboardPhase::Idle,
            (Some(_), true) => DashboardPhase::ScenarioSelected,
            (Some(_), false) => DashboardPhase::SessionsSelected,
        }
    }

    pub fn sessions(&self) -> &[SessionSummary] {
        &self.sessions
    }

    /// Scenario labels in the order they first appear in the session list
    pub fn scenarios(&self) -> Vec<String> {
        group_by_scenario(&self.sessions)
            .into_iter()
            .map(|group| group.scenario)
            .collect()
    }

    pub fn scenario(&self) -> Option<&str> {
        self.scenario.as_deref()
    }

    pub fn scenario_rates(&self) -> Option<&ScenarioRates> {
        self.scenario_rates.as_ref()
    }

    /// Selected session ids in selection order
    pub fn selected(&self) -> &[SessionId] {
        &self.selected
    }

    pub fn is_selected(&self, session_id: SessionId) -> bool {
        self.selected.contains(&session_id)
    }

    /// Loaded details of the selected sessions, in selection order
    pub fn selected_details(&self) -> Vec<&SessionDetail> {
        self.selected
            .iter()
            .filter_map(|id| self.details.get(id))
            .collect()
    }

    pub fn fx_pairs(&self) -> &[String] {
        &self.fx_pairs
    }

    pub fn error(&self) -> Option<&ErrorBanner> {
        self.error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Whether any fetch is still outstanding
    pub fn is_busy(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Issue the initial session-list fetch
    pub fn load(&mut self) {
        self.spawn_sessions();
    }

    /// Re-issue the session-list fetch, keeping the current selection
    pub fn refresh(&mut self) {
        self.error = None;
        self.spawn_sessions();
    }

    /// Choose a scenario: clears the session selection and fetches its rates
    pub fn select_scenario(&mut self, scenario: impl Into<String>) {
        let scenario = scenario.into();
        log::debug!("Selecting scenario {}", scenario);

        self.epoch += 1;
        self.selected.clear();
        self.details.clear();
        self.pending_details.clear();
        self.scenario_rates = None;
        self.scenario = Some(scenario.clone());
        self.spawn_scenario(scenario);
    }

    /// Add `session_id` to the selection, or remove it if already selected
    pub fn toggle_session(&mut self, session_id: SessionId) -> Result<()> {
        if self.scenario.is_none() {
            return Err(DashboardError::InvalidState(format!(
                "cannot select session {} before a scenario",
                session_id
            )));
        }

        if let Some(pos) = self.selected.iter().position(|id| *id == session_id) {
            self.selected.remove(pos);
            self.details.remove(&session_id);
            self.pending_details.remove(&session_id);
        } else {
            self.selected.push(session_id);
            self.spawn_detail(session_id);
        }
        Ok(())
    }

    /// Add or remove a currency pair from the FX chart
    pub fn toggle_fx_pair(&mut self, pair: &str) -> Result<()> {
        CurrencyPair::parse(pair)?;
        if let Some(pos) = self.fx_pairs.iter().position(|p| p == pair) {
            self.fx_pairs.remove(pos);
        } else {
            self.fx_pairs.push(pair.to_string());
        }
        Ok(())
    }

    /// Wait for the next fetch to complete and apply it.
    ///
    /// A task that panics counts as a failed fetch of its subject. Returns
    /// `None` when nothing is in flight.
    pub async fn next_outcome(&mut self) -> Option<FetchEvent> {
        loop {
            let outcome = match self.tasks.join_next_with_id().await? {
                Ok((id, outcome)) => {
                    self.in_flight.remove(&id);
                    outcome
                }
                Err(e) => match self.in_flight.remove(&e.id()) {
                    Some(request) => request.failed(DashboardError::TaskFailed(e.to_string())),
                    None => {
                        log::error!("Untracked fetch task did not complete: {}", e);
                        continue;
                    }
                },
            };
            return Some(self.apply(outcome));
        }
    }

    /// Apply outcomes until no fetch is in flight
    pub async fn settle(&mut self) -> Vec<FetchEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_outcome().await {
            events.push(event);
        }
        events
    }

    /// Compose the current state into presentation data.
    ///
    /// Renders whatever subset of details has arrived.
    pub fn view(&self) -> DashboardView {
        let details = self.selected_details();
        let rates = self.scenario_rates.as_ref();

        let fx_chart = match (rates, &self.scenario) {
            (Some(rates), Some(scenario)) if !self.config.hides_rates_for(scenario) => {
                FxRatesChart::build(rates, &self.fx_pairs)
            }
            _ => FxRatesChart::default(),
        };

        DashboardView {
            user_id: self.user_id.clone(),
            phase: self.phase(),
            scenario: self.scenario.clone(),
            groups: group_by_scenario(&self.sessions),
            selected: self.selected.clone(),
            jpy_chart: JpyBalanceChart::build(&details, rates),
            fx_chart,
            balance_tables: BalanceTables::build(&details, self.config.balance_table_sessions),
            error: self.error.clone(),
            sessions_loading: self.sessions_loading,
            scenario_loading: self.scenario_loading,
            details_loading: !self.pending_details.is_empty(),
        }
    }

    fn spawn_sessions(&mut self) {
        self.sessions_generation += 1;
        self.sessions_loading = true;

        let generation = self.sessions_generation;
        let user_id = self.user_id.clone();
        let source = Arc::clone(&self.source);
        log::debug!("Fetching sessions for {} (generation {})", user_id, generation);

        let handle = self.tasks.spawn(async move {
            let result = source.fetch_user_sessions(&user_id).await;
            FetchOutcome::Sessions { generation, result }
        });
        self.in_flight
            .insert(handle.id(), FetchRequest::Sessions { generation });
    }

    fn spawn_scenario(&mut self, scenario: String) {
        self.scenario_loading = true;

        let epoch = self.epoch;
        let source = Arc::clone(&self.source);
        log::debug!("Fetching rates for scenario {}", scenario);

        let request = FetchRequest::Scenario {
            epoch,
            scenario: scenario.clone(),
        };
        let handle = self.tasks.spawn(async move {
            let result = source.fetch_scenario_data(&scenario).await;
            FetchOutcome::Scenario {
                epoch,
                scenario,
                result,
            }
        });
        self.in_flight.insert(handle.id(), request);
    }

    fn spawn_detail(&mut self, session_id: SessionId) {
        self.detail_seq += 1;
        let seq = self.detail_seq;
        self.pending_details.insert(session_id, seq);

        let epoch = self.epoch;
        let source = Arc::clone(&self.source);
        log::debug!("Fetching detail for session {} (request {})", session_id, seq);

        let handle = self.tasks.spawn(async move {
            let result = source.fetch_session_detail(session_id).await;
            FetchOutcome::Detail {
                epoch,
                session_id,
                seq,
                result,
            }
        });
        self.in_flight.insert(
            handle.id(),
            FetchRequest::Detail {
                epoch,
                session_id,
                seq,
            },
        );
    }

    fn apply(&mut self, outcome: FetchOutcome) -> FetchEvent {
        match outcome {
            FetchOutcome::Sessions { generation, result } => {
                let subject = FetchSubject::SessionList;
                if generation != self.sessions_generation {
                    log::debug!("Dropping session list from generation {}", generation);
                    return FetchEvent::Stale(subject);
                }
                self.sessions_loading = false;

                match result {
                    Ok(sessions) => {
                        log::debug!("Loaded {} sessions for {}", sessions.len(), self.user_id);
                        self.sessions = sessions;
                        FetchEvent::Applied(subject)
                    }
                    Err(e) if e.is_not_found() => {
                        self.sessions.clear();
                        FetchEvent::Applied(subject)
                    }
                    Err(e) => self.fail(subject, "Failed to load sessions", e),
                }
            }

            FetchOutcome::Scenario {
                epoch,
                scenario,
                result,
            } => {
                let subject = FetchSubject::Scenario(scenario);
                if epoch != self.epoch {
                    log::debug!("Dropping stale rates for {}", subject);
                    return FetchEvent::Stale(subject);
                }
                self.scenario_loading = false;

                match result {
                    Ok(rates) => {
                        self.scenario_rates = Some(rates);
                        FetchEvent::Applied(subject)
                    }
                    Err(e) => self.fail(subject, "Failed to load scenario data", e),
                }
            }

            FetchOutcome::Detail {
                epoch,
                session_id,
                seq,
                result,
            } => {
                let subject = FetchSubject::Session(session_id);
                // only the latest request for a still-selected id may land
                if epoch != self.epoch || self.pending_details.get(&session_id) != Some(&seq) {
                    log::debug!("Dropping stale detail for {} (request {})", subject, seq);
                    return FetchEvent::Stale(subject);
                }
                self.pending_details.remove(&session_id);

                match result {
                    Ok(detail) => {
                        self.details.insert(session_id, detail);
                        FetchEvent::Applied(subject)
                    }
                    Err(e) => self.fail(subject, "Failed to load session details", e),
                }
            }
        }
    }

    fn fail(&mut self, subject: FetchSubject, context: &str, error: DashboardError) -> FetchEvent {
        log::error!("{} ({}): {}", context, subject, error);
        self.error = Some(ErrorBanner {
            subject: subject.clone(),
            message: format!("{}: {}", context, error),
        });
        FetchEvent::Failed(subject)
    }
}
