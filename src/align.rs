//! Date-axis alignment of session balances and scenario rates
//!
//! Dates are `NaiveDate`, so `BTreeSet`/`BTreeMap` ordering is chronological.
//! Nothing here interpolates or carries values forward: a date without a
//! record is a gap.

use crate::types::{BalanceSnapshot, ScenarioRates, SessionDetail, SparseSeries, TradeDate};
use std::collections::BTreeSet;

/// Sorted union of every balance date across `sessions`, without duplicates
pub fn aligned_dates(sessions: &[SessionDetail]) -> Vec<TradeDate> {
    aligned_dates_of(sessions.iter())
}

/// Same as [`aligned_dates`] over borrowed details
pub fn aligned_dates_of<'a, I>(sessions: I) -> Vec<TradeDate>
where
    I: IntoIterator<Item = &'a SessionDetail>,
{
    let dates: BTreeSet<TradeDate> = sessions
        .into_iter()
        .flat_map(|session| session.date_to_balances.keys().copied())
        .collect();
    dates.into_iter().collect()
}

/// A session's balances on `date`, or `None` if nothing was recorded that day
pub fn balance_on(session: &SessionDetail, date: TradeDate) -> Option<&BalanceSnapshot> {
    session.date_to_balances.get(&date)
}

/// Sorted, distinct currency-pair keys across every date of the rate table
pub fn currency_pairs(rates: &ScenarioRates) -> Vec<String> {
    let pairs: BTreeSet<&String> = rates
        .date_to_currency_pair_to_rate
        .values()
        .flat_map(|snapshot| snapshot.keys())
        .collect();
    pairs.into_iter().cloned().collect()
}

/// Sorted dates of the rate table
pub fn rate_dates(rates: &ScenarioRates) -> Vec<TradeDate> {
    rates.date_to_currency_pair_to_rate.keys().copied().collect()
}

/// One pair's rate by date; dates where the pair is absent are left out
pub fn rate_series(rates: &ScenarioRates, pair: &str) -> SparseSeries {
    rates
        .date_to_currency_pair_to_rate
        .iter()
        .filter_map(|(date, snapshot)| snapshot.get(pair).map(|rate| (*date, *rate)))
        .collect()
}
