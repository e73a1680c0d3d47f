//! session-dashboard CLI - terminal view of trading sessions
//!
//! ## Example Usage
//!
//! ```bash
//! # List a user's sessions grouped by scenario
//! session-dashboard sessions user123
//!
//! # Charts and balance tables for selected sessions
//! session-dashboard show user123 --scenario TEST0 --session 9490 --session 9822
//!
//! # Export the JPY-equivalent series
//! session-dashboard show user123 -s TEST0 --session 9490 -o balances.csv
//!
//! # Currency pairs available in a scenario
//! session-dashboard pairs TEST1
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use session_dashboard::align::currency_pairs;
use session_dashboard::chart::{BalanceTables, FxRatesChart, JpyBalanceChart};
use session_dashboard::config::DashboardConfig;
use session_dashboard::controller::{DashboardController, DashboardView, FetchEvent};
use session_dashboard::currency::Currency;
use session_dashboard::data::{ConfiguredSource, SessionDataSource};
use session_dashboard::types::{SessionId, TradeDate};
use std::fs;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

/// session-dashboard: JPY-equivalent balances and FX rates of trading sessions
#[derive(Parser)]
#[command(name = "session-dashboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Trading session dashboard", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List a user's sessions grouped by scenario
    Sessions {
        /// User identifier
        #[arg(value_name = "USER")]
        user: String,
    },

    /// Show charts and balance tables for selected sessions
    Show {
        /// User identifier
        #[arg(value_name = "USER")]
        user: String,

        /// Scenario to open
        #[arg(short = 's', long)]
        scenario: String,

        /// Session to select (repeatable)
        #[arg(long = "session", value_name = "ID")]
        sessions: Vec<SessionId>,

        /// Currency pair for the FX chart (repeatable, replaces the defaults)
        #[arg(short = 'p', long = "pair", value_name = "PAIR")]
        pairs: Vec<String>,

        /// Output file for the JPY series (JSON/CSV)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// List currency pairs available in a scenario
    Pairs {
        /// Scenario label
        #[arg(value_name = "SCENARIO")]
        scenario: String,
    },

    /// Show version and effective configuration
    Info,
}

#[derive(Serialize)]
struct JpyRow {
    date: TradeDate,
    session_id: SessionId,
    jpy_equivalent: f64,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = DashboardConfig::load(cli.config.as_deref());
    if let Err(e) = config.validate() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }

    if cli.verbose {
        println!(
            "{} v{}",
            "session-dashboard".cyan().bold(),
            env!("CARGO_PKG_VERSION")
        );
        println!(
            "Source: {}",
            config
                .api_base_url
                .as_deref()
                .unwrap_or("bundled fixtures")
                .dimmed()
        );
    }

    let result = match cli.command {
        Commands::Sessions { user } => list_sessions(&user, config).await,
        Commands::Show {
            user,
            scenario,
            sessions,
            pairs,
            output,
        } => {
            show_dashboard(ShowConfig {
                user,
                scenario,
                sessions,
                pairs,
                output,
                verbose: cli.verbose,
                config,
            })
            .await
        }
        Commands::Pairs { scenario } => list_pairs(&scenario, &config).await,
        Commands::Info => show_info(&config),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

struct ShowConfig {
    user: String,
    scenario: String,
    sessions: Vec<SessionId>,
    pairs: Vec<String>,
    output: Option<PathBuf>,
    verbose: bool,
    config: DashboardConfig,
}

async fn list_sessions(user: &str, config: DashboardConfig) -> Result<(), Box<dyn std::error::Error>> {
    let source = ConfiguredSource::from_config(&config)?;
    let mut dashboard = DashboardController::new(source, user, config);
    dashboard.load();
    settle_with_spinner(&mut dashboard, "Loading sessions...").await;

    let view = dashboard.view();
    print_error_banner(&view);

    println!("{}", format!("Sessions for {}", user).cyan().bold());
    println!("{}", "========================================".cyan());

    if view.groups.is_empty() {
        println!("{}", "  No sessions found for this user.".dimmed());
        return Ok(());
    }

    for group in &view.groups {
        println!();
        println!(
            "{} {}",
            group.scenario.bright_green().bold(),
            format!("({} sessions)", group.sessions.len()).dimmed()
        );
        for session in &group.sessions {
            let status = if session.complete {
                "complete".green()
            } else {
                "in progress".yellow()
            };
            println!(
                "  #{:<6} {} - {}  {:>14}  {}",
                session.session_id,
                format_long_date(session.start_date),
                format_long_date(session.end_date),
                format_amount(session.jpy_balance, Currency::JPY),
                status
            );
        }
    }
    println!();

    Ok(())
}

async fn show_dashboard(cfg: ShowConfig) -> Result<(), Box<dyn std::error::Error>> {
    let source = ConfiguredSource::from_config(&cfg.config)?;
    let mut dashboard = DashboardController::new(source, cfg.user.as_str(), cfg.config);

    dashboard.load();
    dashboard.select_scenario(cfg.scenario.as_str());
    // each id is toggled once
    for id in distinct(&cfg.sessions) {
        dashboard.toggle_session(id)?;
    }
    if !cfg.pairs.is_empty() {
        for pair in dashboard.fx_pairs().to_vec() {
            dashboard.toggle_fx_pair(&pair)?;
        }
        for pair in distinct(&cfg.pairs) {
            dashboard.toggle_fx_pair(&pair)?;
        }
    }

    settle_with_spinner(&mut dashboard, "Fetching session data...").await;
    let view = dashboard.view();
    print_error_banner(&view);

    if cfg.verbose {
        println!("  {} {}", "User:".bold(), view.user_id);
        println!("  {} {}", "Scenario:".bold(), cfg.scenario);
        println!("  {} {:?}", "Selected:".bold(), view.selected);
        println!();
    }

    if view.selected.is_empty() {
        print_scenario_sessions(&view, &cfg.scenario);
    }

    print_jpy_chart(&view.jpy_chart);
    print_fx_chart(&view.fx_chart);
    print_balance_tables(&view.balance_tables);

    if let Some(output_path) = cfg.output {
        let rows: Vec<JpyRow> = view
            .jpy_chart
            .series
            .iter()
            .flat_map(|series| {
                series.points.iter().map(|(date, value)| JpyRow {
                    date: *date,
                    session_id: series.session_id,
                    jpy_equivalent: *value,
                })
            })
            .collect();

        let extension = output_path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("json");

        match extension {
            "csv" => {
                let mut wtr = csv::Writer::from_path(&output_path)?;
                for row in &rows {
                    wtr.serialize(row)?;
                }
                wtr.flush()?;
            }
            "json" => {
                fs::write(&output_path, serde_json::to_string_pretty(&view.jpy_chart)?)?;
            }
            _ => {
                println!("{} Unknown output format. Using JSON.", "Warning:".yellow());
                fs::write(&output_path, serde_json::to_string_pretty(&view.jpy_chart)?)?;
            }
        }
        println!(
            "{} {} points saved to: {}",
            "✓".green().bold(),
            rows.len(),
            output_path.display()
        );
    }

    Ok(())
}

async fn list_pairs(scenario: &str, config: &DashboardConfig) -> Result<(), Box<dyn std::error::Error>> {
    let source = ConfiguredSource::from_config(config)?;
    let rates = source.fetch_scenario_data(scenario).await?;

    println!("{}", format!("Currency pairs in {}", scenario).cyan().bold());
    println!(
        "{}",
        format!("{} - {}", format_long_date(rates.start_date), format_long_date(rates.end_date)).dimmed()
    );
    for pair in currency_pairs(&rates) {
        let marker = if config.default_fx_pairs.contains(&pair) {
            "(default)".dimmed().to_string()
        } else {
            String::new()
        };
        println!("  {} {}", pair, marker);
    }

    Ok(())
}

fn show_info(config: &DashboardConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "session-dashboard".cyan().bold());
    println!("{}", "=================".cyan());
    println!("  Version:          {}", env!("CARGO_PKG_VERSION"));
    println!(
        "  HTTP support:     {}",
        if cfg!(feature = "http") { "yes".green() } else { "no".yellow() }
    );
    if let Some(path) = DashboardConfig::default_path() {
        println!("  Default config:   {}", path.display().to_string().dimmed());
    }
    println!();
    println!("{}", "Effective configuration".bold());
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn settle_with_spinner<S: SessionDataSource + 'static>(
    dashboard: &mut DashboardController<S>,
    message: &'static str,
) {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));

    while let Some(event) = dashboard.next_outcome().await {
        if let FetchEvent::Applied(subject) = event {
            pb.set_message(format!("Loaded {}", subject));
        }
    }
    pb.finish_and_clear();
}

fn print_error_banner(view: &DashboardView) {
    if let Some(banner) = &view.error {
        eprintln!("{} {}", "Error:".red().bold(), banner.message.red());
        eprintln!();
    }
}

fn print_scenario_sessions(view: &DashboardView, scenario: &str) {
    let Some(group) = view.groups.iter().find(|g| g.scenario == scenario) else {
        println!("{}", format!("  No sessions in scenario {}", scenario).dimmed());
        return;
    };
    println!("{}", format!("Sessions in {} (select with --session)", scenario).bold());
    for session in &group.sessions {
        println!(
            "  #{:<6} {} - {}",
            session.session_id,
            format_long_date(session.start_date),
            format_long_date(session.end_date)
        );
    }
    println!();
}

fn print_jpy_chart(chart: &JpyBalanceChart) {
    println!("{}", "JPY Equivalent Balance Over Time".green().bold());
    println!("{}", "================================".green());

    if chart.is_empty() {
        println!("{}", "  No data to display. Select sessions to view chart.".dimmed());
        println!();
        return;
    }

    print!("  {:<8}", "Date");
    for series in &chart.series {
        print!(" {:>16}", format!("Session {}", series.session_id));
    }
    println!();

    for date in &chart.dates {
        print!("  {:<8}", format_short_date(*date));
        for series in &chart.series {
            let cell = match series.points.get(date) {
                Some(v) if series.unconverted.contains(date) => {
                    format!("{}*", format_amount(*v, Currency::JPY))
                }
                Some(v) => format_amount(*v, Currency::JPY),
                None => "-".to_string(),
            };
            print!(" {:>16}", cell);
        }
        println!();
    }

    if chart.series.iter().any(|s| !s.unconverted.is_empty()) {
        println!("{}", "  * some holdings had no JPY rate that day".dimmed());
    }

    if let Some((lower, upper)) = chart.axis_domain() {
        println!(
            "{}",
            format!("  axis: ¥{:.0}K - ¥{:.0}K", lower / 1000.0, upper / 1000.0).dimmed()
        );
    }
    println!();
}

fn print_fx_chart(chart: &FxRatesChart) {
    println!("{}", "FX Rates Over Time".green().bold());
    println!("{}", "==================".green());

    if chart.is_empty() || chart.series.is_empty() {
        println!("{}", "  No FX rates to display.".dimmed());
        println!();
        return;
    }

    print!("  {:<8}", "Date");
    for series in &chart.series {
        print!(" {:>10}", series.pair);
    }
    println!();

    for date in &chart.dates {
        print!("  {:<8}", format_short_date(*date));
        for series in &chart.series {
            let cell = series
                .points
                .get(date)
                .map(|rate| format!("{:.4}", rate))
                .unwrap_or_else(|| "-".to_string());
            print!(" {:>10}", cell);
        }
        println!();
    }
    println!();
}

fn print_balance_tables(tables: &BalanceTables) {
    println!("{}", "Asset Balances by Currency".green().bold());
    println!("{}", "==========================".green());

    if tables.is_empty() {
        println!("{}", "  No sessions selected.".dimmed());
        println!();
        return;
    }

    for table in &tables.tables {
        println!();
        println!("  {}", format!("Session {}", table.session_id).bold());
        print!("  {:<14}", "Date");
        for currency in Currency::ALL {
            print!(" {:>14}", currency.code());
        }
        println!();

        for date in &tables.dates {
            print!("  {:<14}", date.format("%a, %b %-d").to_string());
            for currency in Currency::ALL {
                let cell = table
                    .amount(*date, currency)
                    .map(|amount| format_amount(amount, currency))
                    .unwrap_or_else(|| "-".to_string());
                print!(" {:>14}", cell);
            }
            println!();
        }
    }
    println!();
}

/// Yen without decimals and with thousands separators; others with 2 decimals
fn format_amount(amount: f64, currency: Currency) -> String {
    match currency {
        Currency::JPY => {
            let rounded = amount.round() as i64;
            let digits = rounded.unsigned_abs().to_string();
            let mut grouped = String::new();
            for (i, ch) in digits.chars().enumerate() {
                if i > 0 && (digits.len() - i) % 3 == 0 {
                    grouped.push(',');
                }
                grouped.push(ch);
            }
            let sign = if rounded < 0 { "-" } else { "" };
            format!("{}{}{}", sign, currency.symbol(), grouped)
        }
        _ => format!("{}{:.2}", currency.symbol(), amount),
    }
}

/// Items in first-seen order with repeats removed
fn distinct<T: PartialEq + Clone>(items: &[T]) -> Vec<T> {
    let mut seen: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !seen.contains(item) {
            seen.push(item.clone());
        }
    }
    seen
}

fn format_short_date(date: TradeDate) -> String {
    date.format("%b %-d").to_string()
}

fn format_long_date(date: TradeDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(999_814.7663, Currency::JPY), "¥999,815");
        assert_eq!(format_amount(1_000_000.0, Currency::JPY), "¥1,000,000");
        assert_eq!(format_amount(-1500.0, Currency::JPY), "-¥1,500");
        assert_eq!(format_amount(8.30564, Currency::USD), "$8.31");
        assert_eq!(format_amount(12.5, Currency::HKD), "HK$12.50");
    }

    #[test]
    fn test_repeated_arguments_collapse() {
        assert_eq!(distinct(&[9490u64, 9822, 9490]), vec![9490, 9822]);
        let pairs = vec!["USD/JPY".to_string(), "USD/JPY".to_string()];
        assert_eq!(distinct(&pairs), vec!["USD/JPY".to_string()]);
    }

    #[tokio::test]
    async fn test_repeated_session_stays_selected() {
        use session_dashboard::data::FixtureDataSource;

        let source = FixtureDataSource::sample().unwrap();
        let mut dashboard = DashboardController::new(source, "user123", DashboardConfig::default());
        dashboard.select_scenario("TEST0");
        for id in distinct(&[9490u64, 9490]) {
            dashboard.toggle_session(id).unwrap();
        }
        dashboard.settle().await;
        assert_eq!(dashboard.selected(), [9490]);
    }

    #[test]
    fn test_format_dates() {
        let date = TradeDate::from_ymd_opt(2016, 1, 4).unwrap();
        assert_eq!(format_short_date(date), "Jan 4");
        assert_eq!(format_long_date(date), "Jan 4, 2016");
    }
}
