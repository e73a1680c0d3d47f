//! Chart and table payloads handed to presentation
//!
//! Everything here is computed data: sorted date axes and sparse series.
//! Formatting (symbols, locale dates) is left to the renderer.

use crate::align::{aligned_dates_of, balance_on, currency_pairs, rate_dates, rate_series};
use crate::convert::{convert_to_jpy, unconverted_currencies};
use crate::currency::Currency;
use crate::types::{Amount, BalanceSnapshot, ScenarioRates, SessionDetail, SessionId, SparseSeries, TradeDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Axis rounding step for the JPY chart
const AXIS_STEP: f64 = 1000.0;

/// Fraction of the value range added above and below the JPY chart data
const AXIS_MARGIN: f64 = 0.1;

/// JPY-equivalent values of one session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSeries {
    pub session_id: SessionId,
    pub points: SparseSeries,
    /// Dates whose point leaves out a held currency that had no rate
    pub unconverted: BTreeSet<TradeDate>,
}

/// JPY-equivalent balance over time, one series per selected session
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JpyBalanceChart {
    pub dates: Vec<TradeDate>,
    pub series: Vec<SessionSeries>,
}

impl JpyBalanceChart {
    /// Build from details in selection order and the scenario's rate table.
    ///
    /// A point exists only where the session has balances and the rate table
    /// has a snapshot for that date. Without a rate table the chart is empty.
    /// Points missing a non-zero currency's rate are listed in `unconverted`.
    pub fn build(sessions: &[&SessionDetail], rates: Option<&ScenarioRates>) -> Self {
        let Some(rates) = rates else {
            return Self::default();
        };
        if sessions.is_empty() {
            return Self::default();
        }

        let dates = aligned_dates_of(sessions.iter().copied());
        let series = sessions
            .iter()
            .map(|session| {
                let mut points = SparseSeries::new();
                let mut unconverted = BTreeSet::new();

                for date in &dates {
                    let (Some(balances), Some(snapshot)) =
                        (balance_on(session, *date), rates.rates_on(*date))
                    else {
                        continue;
                    };

                    let missing = unconverted_currencies(balances, snapshot);
                    if !missing.is_empty() {
                        log::debug!(
                            "Session {} on {}: no JPY rate for {:?}",
                            session.session_id(),
                            date,
                            missing
                        );
                        unconverted.insert(*date);
                    }
                    points.insert(*date, convert_to_jpy(balances, snapshot));
                }

                SessionSeries {
                    session_id: session.session_id(),
                    points,
                    unconverted,
                }
            })
            .collect();

        Self { dates, series }
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }

    /// Series for one session
    pub fn series_for(&self, session_id: SessionId) -> Option<&SessionSeries> {
        self.series.iter().find(|s| s.session_id == session_id)
    }

    /// Smallest and largest value over all points
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.series
            .iter()
            .flat_map(|s| s.points.values().copied())
            .fold(None, |range, value| match range {
                None => Some((value, value)),
                Some((lo, hi)) => Some((lo.min(value), hi.max(value))),
            })
    }

    /// Y-axis bounds: value range widened by 10% and rounded outward to 1000
    pub fn axis_domain(&self) -> Option<(f64, f64)> {
        let (min, max) = self.value_range()?;
        let margin = (max - min) * AXIS_MARGIN;
        let lower = ((min - margin) / AXIS_STEP).floor() * AXIS_STEP;
        let upper = ((max + margin) / AXIS_STEP).ceil() * AXIS_STEP;
        Some((lower, upper))
    }
}

/// Rates of one currency pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairSeries {
    pub pair: String,
    pub points: SparseSeries,
}

/// FX rate trends for the selected pairs of a scenario
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FxRatesChart {
    pub dates: Vec<TradeDate>,
    pub available_pairs: Vec<String>,
    pub series: Vec<PairSeries>,
}

impl FxRatesChart {
    pub fn build(rates: &ScenarioRates, selected_pairs: &[String]) -> Self {
        let series = selected_pairs
            .iter()
            .map(|pair| PairSeries {
                pair: pair.clone(),
                points: rate_series(rates, pair),
            })
            .collect();

        Self {
            dates: rate_dates(rates),
            available_pairs: currency_pairs(rates),
            series,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Daily balances of one session keyed by date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceTable {
    pub session_id: SessionId,
    pub rows: BTreeMap<TradeDate, BalanceSnapshot>,
}

impl BalanceTable {
    /// Amount held in `currency` on `date`, if recorded
    pub fn amount(&self, date: TradeDate, currency: Currency) -> Option<Amount> {
        self.rows.get(&date)?.get(currency.code()).copied()
    }
}

/// Balance tables for the most recently selected sessions, on a shared date axis
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BalanceTables {
    pub dates: Vec<TradeDate>,
    pub tables: Vec<BalanceTable>,
}

impl BalanceTables {
    /// Tables for the last `limit` sessions of `sessions` (selection order)
    pub fn build(sessions: &[&SessionDetail], limit: usize) -> Self {
        let recent = &sessions[sessions.len().saturating_sub(limit)..];

        let tables = recent
            .iter()
            .map(|session| BalanceTable {
                session_id: session.session_id(),
                rows: session.date_to_balances.clone(),
            })
            .collect();

        Self {
            dates: aligned_dates_of(recent.iter().copied()),
            tables,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RateSnapshot, SessionSummary};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn date(s: &str) -> TradeDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn detail(id: SessionId, days: Vec<(&str, f64, f64)>) -> SessionDetail {
        let date_to_balances = days
            .into_iter()
            .map(|(d, jpy, usd)| {
                (
                    date(d),
                    BalanceSnapshot::from([("JPY".to_string(), jpy), ("USD".to_string(), usd)]),
                )
            })
            .collect();
        SessionDetail {
            summary: SessionSummary {
                session_id: id,
                start_date: date("2016-01-04"),
                end_date: date("2016-01-11"),
                jpy_balance: 0.0,
                scenario: "TEST0".to_string(),
                complete: true,
            },
            date_to_balances,
        }
    }

    fn usd_rates(days: Vec<(&str, f64)>) -> ScenarioRates {
        ScenarioRates {
            start_date: date("2016-01-04"),
            end_date: date("2016-01-11"),
            date_to_currency_pair_to_rate: days
                .into_iter()
                .map(|(d, r)| (date(d), RateSnapshot::from([("USD/JPY".to_string(), r)])))
                .collect(),
        }
    }

    #[test]
    fn test_jpy_chart_points_and_gaps() {
        let a = detail(1, vec![("2016-01-04", 1000.0, 1.0), ("2016-01-05", 900.0, 2.0)]);
        let b = detail(2, vec![("2016-01-05", 500.0, 0.0), ("2016-01-06", 400.0, 0.0)]);
        let rates = usd_rates(vec![("2016-01-04", 120.0), ("2016-01-05", 110.0)]);

        let chart = JpyBalanceChart::build(&[&a, &b], Some(&rates));

        assert_eq!(
            chart.dates,
            vec![date("2016-01-04"), date("2016-01-05"), date("2016-01-06")]
        );
        let first = chart.series_for(1).unwrap();
        assert_eq!(first.points[&date("2016-01-04")], 1120.0);
        assert_eq!(first.points[&date("2016-01-05")], 1120.0);

        // no rates on the 6th, no balance for session 2 on the 4th
        let second = chart.series_for(2).unwrap();
        assert_eq!(second.points.len(), 1);
        assert_eq!(second.points[&date("2016-01-05")], 500.0);
    }

    #[test]
    fn test_jpy_chart_marks_unconverted_dates() {
        let a = detail(1, vec![("2016-01-04", 1000.0, 1.0), ("2016-01-05", 1000.0, 1.0)]);
        let mut rates = usd_rates(vec![("2016-01-04", 120.0)]);
        rates
            .date_to_currency_pair_to_rate
            .insert(date("2016-01-05"), RateSnapshot::from([("EUR/JPY".to_string(), 130.0)]));

        let chart = JpyBalanceChart::build(&[&a], Some(&rates));
        let series = chart.series_for(1).unwrap();

        assert_eq!(series.points[&date("2016-01-05")], 1000.0);
        assert_eq!(series.unconverted.iter().copied().collect::<Vec<_>>(), vec![date("2016-01-05")]);
    }

    #[test]
    fn test_jpy_chart_without_rates_is_empty() {
        let a = detail(1, vec![("2016-01-04", 1000.0, 0.0)]);
        let chart = JpyBalanceChart::build(&[&a], None);
        assert!(chart.dates.is_empty());
        assert!(chart.is_empty());
        assert_eq!(chart.axis_domain(), None);
    }

    #[test]
    fn test_axis_domain_rounds_outward() {
        let a = detail(1, vec![("2016-01-04", 990_000.0, 0.0), ("2016-01-05", 1_000_000.0, 0.0)]);
        let rates = usd_rates(vec![("2016-01-04", 120.0), ("2016-01-05", 120.0)]);
        let chart = JpyBalanceChart::build(&[&a], Some(&rates));

        assert_eq!(chart.value_range(), Some((990_000.0, 1_000_000.0)));
        let (lower, upper) = chart.axis_domain().unwrap();
        assert_relative_eq!(lower, 989_000.0);
        assert_relative_eq!(upper, 1_001_000.0);
    }

    #[test]
    fn test_fx_chart_selected_pairs() {
        let rates = usd_rates(vec![("2016-01-04", 120.0), ("2016-01-05", 119.27)]);
        let chart = FxRatesChart::build(&rates, &["USD/JPY".to_string(), "EUR/JPY".to_string()]);

        assert_eq!(chart.dates.len(), 2);
        assert_eq!(chart.available_pairs, vec!["USD/JPY"]);
        assert_eq!(chart.series[0].points.len(), 2);
        assert!(chart.series[1].points.is_empty());
    }

    #[test]
    fn test_balance_tables_keep_most_recent() {
        let a = detail(1, vec![("2016-01-04", 1.0, 0.0)]);
        let b = detail(2, vec![("2016-01-05", 2.0, 0.0)]);
        let c = detail(3, vec![("2016-01-06", 3.0, 4.5)]);

        let tables = BalanceTables::build(&[&a, &b, &c], 2);
        let ids: Vec<_> = tables.tables.iter().map(|t| t.session_id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(tables.dates, vec![date("2016-01-05"), date("2016-01-06")]);
        assert_eq!(tables.tables[1].amount(date("2016-01-06"), Currency::USD), Some(4.5));
        assert_eq!(tables.tables[0].amount(date("2016-01-06"), Currency::USD), None);
    }
}
