//! Core types: session summaries, session details and scenario rate tables

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Calendar date used as the key of every per-day map
pub type TradeDate = NaiveDate;

/// Unique identifier for trading sessions
pub type SessionId = u64;

/// Money amount in a single currency
pub type Amount = f64;

/// FX rate: quote units per base unit
pub type Rate = f64;

/// One day's balances: currency code -> amount.
///
/// Absent codes mean "no balance recorded", not zero.
pub type BalanceSnapshot = BTreeMap<String, Amount>;

/// One day's rates: pair key ("USD/JPY") -> rate
pub type RateSnapshot = BTreeMap<String, Rate>;

/// Values keyed by date; dates without a value are gaps
pub type SparseSeries = BTreeMap<TradeDate, f64>;

/// Session list entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub start_date: TradeDate,
    pub end_date: TradeDate,
    pub jpy_balance: Amount,
    pub scenario: String,
    pub complete: bool,
}

/// Session summary plus its daily multi-currency balances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetail {
    #[serde(flatten)]
    pub summary: SessionSummary,
    #[serde(default)]
    pub date_to_balances: BTreeMap<TradeDate, BalanceSnapshot>,
}

impl SessionDetail {
    pub fn session_id(&self) -> SessionId {
        self.summary.session_id
    }

    /// Balance dates that fall outside `[start_date, end_date]`
    pub fn out_of_range_dates(&self) -> Vec<TradeDate> {
        let range = self.summary.start_date..=self.summary.end_date;
        self.date_to_balances
            .keys()
            .filter(|date| !range.contains(date))
            .copied()
            .collect()
    }
}

/// FX rate table for one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioRates {
    pub start_date: TradeDate,
    pub end_date: TradeDate,
    #[serde(default)]
    pub date_to_currency_pair_to_rate: BTreeMap<TradeDate, RateSnapshot>,
}

impl ScenarioRates {
    /// Rate snapshot for a single date
    pub fn rates_on(&self, date: TradeDate) -> Option<&RateSnapshot> {
        self.date_to_currency_pair_to_rate.get(&date)
    }
}

/// Sessions sharing one scenario label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioGroup {
    pub scenario: String,
    pub sessions: Vec<SessionSummary>,
}

/// Group sessions by scenario.
///
/// Groups appear in the order their scenario is first seen; sessions keep
/// their list order within a group.
pub fn group_by_scenario(sessions: &[SessionSummary]) -> Vec<ScenarioGroup> {
    let mut groups: Vec<ScenarioGroup> = Vec::new();

    for session in sessions {
        match groups.iter_mut().find(|g| g.scenario == session.scenario) {
            Some(group) => group.sessions.push(session.clone()),
            None => groups.push(ScenarioGroup {
                scenario: session.scenario.clone(),
                sessions: vec![session.clone()],
            }),
        }
    }

    groups
}
