//! # session_dashboard
//!
//! Core of a trading-session dashboard. Given a user, it lists their historical
//! trading sessions grouped by scenario. For the sessions the user selects, it
//! builds:
//!
//! - the JPY-equivalent balance over time,
//! - FX rate trends for the scenario,
//! - per-session balance tables by currency.
//!
//! Data comes from a [`data::SessionDataSource`]. The sources are the remote API,
//! the bundled fixtures, or the API with fixture fallback.
//!
//! ## Example
//!
//! ```rust,no_run
//! use session_dashboard::prelude::*;
//!
//! # async fn run() -> session_dashboard::error::Result<()> {
//! let config = DashboardConfig::load(None);
//! let source = ConfiguredSource::from_config(&config)?;
//! let mut dashboard = DashboardController::new(source, "user123", config);
//!
//! dashboard.load();
//! dashboard.select_scenario("TEST0");
//! dashboard.toggle_session(9490)?;
//! dashboard.settle().await;
//!
//! let view = dashboard.view();
//! for series in &view.jpy_chart.series {
//!     println!("session {}: {} points", series.session_id, series.points.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod align;
pub mod chart;
pub mod config;
pub mod controller;
pub mod convert;
pub mod currency;
pub mod data;
pub mod error;
pub mod types;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::chart::{BalanceTables, FxRatesChart, JpyBalanceChart};
    pub use crate::config::DashboardConfig;
    pub use crate::controller::{DashboardController, DashboardPhase, DashboardView, FetchEvent};
    pub use crate::convert::convert_to_jpy;
    pub use crate::currency::{Currency, CurrencyPair};
    pub use crate::data::{ConfiguredSource, FixtureDataSource, SessionDataSource};
    pub use crate::error::{DashboardError, Result};
    pub use crate::types::*;
}
