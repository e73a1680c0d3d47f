//! HTTP data source against a mock session API
#![cfg(feature = "http")]

use mockito::{Matcher, Server};
use session_dashboard::data::{
    FallbackDataSource, FixtureDataSource, HttpDataSource, SessionDataSource,
};
use session_dashboard::error::{DashboardError, RecordKind};
use std::time::Duration;

const SESSIONS_JSON: &str = r#"[
    {"sessionId": 7, "startDate": "2016-01-04", "endDate": "2016-01-11",
     "jpyBalance": 1000000, "scenario": "TEST0", "complete": true}
]"#;

const DETAIL_JSON: &str = r#"{
    "sessionId": 7, "startDate": "2016-01-04", "endDate": "2016-01-11",
    "jpyBalance": 1000000, "scenario": "TEST0", "complete": true,
    "dateToBalances": {
        "2016-01-04": {"JPY": 1000000, "USD": 0},
        "2016-01-05": {"JPY": 880000, "USD": 1000}
    }
}"#;

const SCENARIO_JSON: &str = r#"{
    "startDate": "2016-01-04", "endDate": "2016-01-05",
    "dateToCurrencyPairToRate": {
        "2016-01-04": {"USD/JPY": 120.0},
        "2016-01-05": {"USD/JPY": 119.5}
    }
}"#;

fn source(server: &Server) -> HttpDataSource {
    HttpDataSource::new(server.url(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_fetch_user_sessions() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/sessions/userId/user7")
        .match_header("x-requested-with", "XMLHttpRequest")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(SESSIONS_JSON)
        .create_async()
        .await;

    let sessions = source(&server).fetch_user_sessions("user7").await.unwrap();
    mock.assert_async().await;

    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].session_id, 7);
    assert_eq!(sessions[0].scenario, "TEST0");
}

#[tokio::test]
async fn test_unknown_user_is_empty_list() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/sessions/userId/ghost")
        .with_status(404)
        .create_async()
        .await;

    let sessions = source(&server).fetch_user_sessions("ghost").await.unwrap();
    assert!(sessions.is_empty());
}

#[tokio::test]
async fn test_fetch_session_detail() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/session/sessionId/7")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(DETAIL_JSON)
        .create_async()
        .await;

    let detail = source(&server).fetch_session_detail(7).await.unwrap();
    assert_eq!(detail.session_id(), 7);
    assert_eq!(detail.date_to_balances.len(), 2);
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/session/sessionId/404")
        .with_status(404)
        .create_async()
        .await;

    let err = source(&server).fetch_session_detail(404).await.unwrap_err();
    match err {
        DashboardError::NotFound { kind, key } => {
            assert_eq!(kind, RecordKind::Session);
            assert_eq!(key, "404");
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_scenario_data() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/scenario/TEST0")
        .with_status(200)
        .with_body(SCENARIO_JSON)
        .create_async()
        .await;

    let rates = source(&server).fetch_scenario_data("TEST0").await.unwrap();
    assert_eq!(rates.date_to_currency_pair_to_rate.len(), 2);
}

#[tokio::test]
async fn test_server_error_is_transport_failure() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let err = source(&server).fetch_scenario_data("TEST0").await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_malformed_body_is_invalid_data() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/session/sessionId/7")
        .with_status(200)
        .with_body("{\"sessionId\": \"seven\"}")
        .create_async()
        .await;

    let err = source(&server).fetch_session_detail(7).await.unwrap_err();
    assert!(matches!(err, DashboardError::InvalidData(_)));
}

#[tokio::test]
async fn test_fallback_serves_fixtures_on_server_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", Matcher::Any)
        .with_status(503)
        .expect_at_least(1)
        .create_async()
        .await;

    let fallback = FallbackDataSource::new(source(&server), FixtureDataSource::sample().unwrap());
    let sessions = fallback.fetch_user_sessions("user123").await.unwrap();
    assert_eq!(sessions.len(), 4);
}
