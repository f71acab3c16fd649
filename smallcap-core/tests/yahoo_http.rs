//! Yahoo provider against a local mock HTTP server.

use mockito::{Matcher, Server, ServerGuard};
use std::sync::Arc;
use std::time::Duration;

use smallcap_core::data::{
    CircuitBreaker, FetchOrchestrator, FundamentalsProvider, LogProgress, ProviderError, TableCache,
    YahooConfig, YahooProvider,
};
use smallcap_core::domain::Lookback;

const SUMMARY_BODY: &str = r#"{"quoteSummary":{"result":[{
    "assetProfile":{"sector":"Healthcare","industry":"Biotechnology","longBusinessSummary":"Develops cortisol modulators."},
    "price":{"longName":"Corcept Therapeutics Incorporated","marketCap":{"raw":1500000000,"fmt":"1.5B"}},
    "financialData":{
        "totalRevenue":{"raw":482000000},
        "revenueGrowth":{"raw":0.2},
        "debtToEquity":{"raw":0.5},
        "currentRatio":{"raw":6.1},
        "grossMargins":{"raw":0.98},
        "freeCashflow":{"raw":110000000}
    },
    "defaultKeyStatistics":{"heldPercentInsiders":{"raw":0.11},"pegRatio":{}}
}],"error":null}}"#;

const CHART_BODY: &str = r#"{"chart":{"result":[{
    "timestamp":[1704205800,1704292200,1704378600,1704465000],
    "indicators":{"quote":[{"close":[24.1,null,24.9,25.3]}]}
}],"error":null}}"#;

fn config(server: &ServerGuard) -> YahooConfig {
    YahooConfig {
        base_url: server.url(),
        cookie_url: format!("{}/consent", server.url()),
        timeout: Duration::from_secs(5),
        max_retries: 2,
        base_delay: Duration::ZERO,
    }
}

fn provider(server: &ServerGuard) -> (YahooProvider, Arc<CircuitBreaker>) {
    let breaker = Arc::new(CircuitBreaker::new(Duration::from_secs(600)).with_failure_threshold(10));
    (YahooProvider::with_config(config(server), breaker.clone()), breaker)
}

/// Cookie page plus crumb endpoint; the crumb mock expects `crumb_hits` lookups.
fn mock_session(server: &mut ServerGuard, crumb_hits: usize) -> (mockito::Mock, mockito::Mock) {
    let cookie = server
        .mock("GET", "/consent")
        .with_status(404)
        .with_header("set-cookie", "A3=d=session; Path=/")
        .create();
    let crumb = server
        .mock("GET", "/v1/test/getcrumb")
        .with_status(200)
        .with_body("crumb123")
        .expect(crumb_hits)
        .create();
    (cookie, crumb)
}

#[test]
fn fundamentals_flow_through_normalization() {
    let mut server = Server::new();
    let (_cookie, crumb) = mock_session(&mut server, 1);
    let summary = server
        .mock("GET", "/v10/finance/quoteSummary/CORT")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("crumb".into(), "crumb123".into()),
            Matcher::Regex("modules=".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(SUMMARY_BODY)
        .expect(1)
        .create();

    let (yahoo, _) = provider(&server);
    let mut orch = FetchOrchestrator::new(Arc::new(yahoo), TableCache::new(chrono::Duration::hours(1)));
    let report = orch.fetch(&["CORT".to_string()], &LogProgress);

    summary.assert();
    crumb.assert();
    assert!(report.all_succeeded());
    let record = report.table.get("CORT").unwrap();
    assert_eq!(record.name.as_deref(), Some("Corcept Therapeutics Incorporated"));
    assert_eq!(record.sector.as_deref(), Some("Healthcare"));
    assert_eq!(record.market_cap, Some(1.5e9));
    assert_eq!(record.yoy_growth, Some(0.2));
    assert_eq!(record.free_cash_flow, Some(1.1e8));
    assert_eq!(record.insider_ownership, Some(0.11));
    assert_eq!(record.peg_ratio, None);
}

#[test]
fn crumb_is_reused_across_symbols() {
    let mut server = Server::new();
    let (_cookie, crumb) = mock_session(&mut server, 1);
    let summary = server
        .mock("GET", Matcher::Regex(r"^/v10/finance/quoteSummary/[A-Z]+$".into()))
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(SUMMARY_BODY)
        .expect(2)
        .create();

    let (yahoo, _) = provider(&server);
    assert!(yahoo.fundamentals("CORT").is_ok());
    assert!(yahoo.fundamentals("ENSG").is_ok());

    summary.assert();
    crumb.assert();
}

#[test]
fn rejected_crumb_is_refreshed_once() {
    let mut server = Server::new();
    let (_cookie, crumb) = mock_session(&mut server, 2);
    let summary = server
        .mock("GET", "/v10/finance/quoteSummary/CORT")
        .match_query(Matcher::Any)
        .with_status(401)
        .expect(2)
        .create();

    let (yahoo, _) = provider(&server);
    let err = yahoo.fundamentals("CORT").unwrap_err();

    assert!(matches!(err, ProviderError::AuthenticationRequired(_)), "{err:?}");
    summary.assert();
    crumb.assert();
}

#[test]
fn forbidden_trips_breaker_and_short_circuits() {
    let mut server = Server::new();
    let chart = server
        .mock("GET", "/v8/finance/chart/HZO")
        .match_query(Matcher::Any)
        .with_status(403)
        .expect(1)
        .create();

    let (yahoo, breaker) = provider(&server);
    let first = yahoo.price_history("HZO", Lookback::OneMonth).unwrap_err();
    let second = yahoo.price_history("HZO", Lookback::OneMonth).unwrap_err();

    assert!(matches!(first, ProviderError::CircuitBreakerTripped));
    assert!(matches!(second, ProviderError::CircuitBreakerTripped));
    assert!(!breaker.is_allowed());
    assert!(!yahoo.is_available());
    chart.assert();
}

#[test]
fn not_found_is_not_retried() {
    let mut server = Server::new();
    let chart = server
        .mock("GET", "/v8/finance/chart/ZZZZ")
        .match_query(Matcher::Any)
        .with_status(404)
        .expect(1)
        .create();

    let (yahoo, _) = provider(&server);
    match yahoo.price_history("ZZZZ", Lookback::OneMonth) {
        Err(ProviderError::SymbolNotFound { symbol }) => assert_eq!(symbol, "ZZZZ"),
        other => panic!("expected SymbolNotFound, got {other:?}"),
    }
    chart.assert();
}

#[test]
fn rate_limit_is_retried_then_reported() {
    let mut server = Server::new();
    let chart = server
        .mock("GET", "/v8/finance/chart/MTH")
        .match_query(Matcher::Any)
        .with_status(429)
        .with_header("retry-after", "7")
        .expect(3)
        .create();

    let (yahoo, _) = provider(&server);
    let err = yahoo.price_history("MTH", Lookback::OneMonth).unwrap_err();

    assert!(matches!(err, ProviderError::RateLimited { retry_after_secs: 7 }), "{err:?}");
    chart.assert();
}

#[test]
fn repeated_server_errors_open_the_breaker() {
    let mut server = Server::new();
    let _chart = server
        .mock("GET", "/v8/finance/chart/GIII")
        .match_query(Matcher::Any)
        .with_status(503)
        .create();

    let breaker = Arc::new(CircuitBreaker::new(Duration::from_secs(600)).with_failure_threshold(2));
    let yahoo = YahooProvider::with_config(config(&server), breaker.clone());

    let err = yahoo.price_history("GIII", Lookback::OneMonth).unwrap_err();
    assert!(matches!(err, ProviderError::CircuitBreakerTripped), "{err:?}");
    assert!(!breaker.is_allowed());
}

#[test]
fn chart_returns_sorted_closes() {
    let mut server = Server::new();
    let chart = server
        .mock("GET", "/v8/finance/chart/BOOT")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("range".into(), "3mo".into()),
            Matcher::UrlEncoded("interval".into(), "1d".into()),
        ]))
        .with_status(200)
        .with_body(CHART_BODY)
        .create();

    let (yahoo, _) = provider(&server);
    let history = yahoo.price_history("BOOT", Lookback::ThreeMonths).unwrap();

    chart.assert();
    assert_eq!(history.symbol, "BOOT");
    assert_eq!(history.lookback, Lookback::ThreeMonths);
    assert_eq!(history.points.len(), 3);
    assert_eq!(history.points[0].close, 24.1);
    assert_eq!(history.points[2].close, 25.3);
}

#[test]
fn malformed_body_is_format_change() {
    let mut server = Server::new();
    let _chart = server
        .mock("GET", "/v8/finance/chart/COLM")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>we moved</html>")
        .create();

    let (yahoo, _) = provider(&server);
    let err = yahoo.price_history("COLM", Lookback::OneMonth).unwrap_err();
    assert!(matches!(err, ProviderError::ResponseFormatChanged(_)), "{err:?}");
}

#[test]
fn unreachable_host_is_network_error() {
    let breaker = Arc::new(CircuitBreaker::new(Duration::from_secs(600)));
    let yahoo = YahooProvider::with_config(
        YahooConfig {
            base_url: "http://127.0.0.1:1".into(),
            cookie_url: "http://127.0.0.1:1/consent".into(),
            timeout: Duration::from_secs(2),
            max_retries: 1,
            base_delay: Duration::ZERO,
        },
        breaker,
    );

    let err = yahoo.price_history("BLMN", Lookback::OneMonth).unwrap_err();
    assert!(matches!(err, ProviderError::NetworkUnreachable(_)), "{err:?}");
}

#[test]
fn long_retry_budget_exhausts_without_overflow() {
    let breaker = Arc::new(CircuitBreaker::new(Duration::from_secs(600)));
    let yahoo = YahooProvider::with_config(
        YahooConfig {
            base_url: "http://127.0.0.1:1".into(),
            cookie_url: "http://127.0.0.1:1/consent".into(),
            timeout: Duration::from_secs(2),
            max_retries: 40,
            base_delay: Duration::ZERO,
        },
        breaker,
    );

    let err = yahoo.price_history("BLMN", Lookback::OneMonth).unwrap_err();
    assert!(matches!(err, ProviderError::NetworkUnreachable(_)), "{err:?}");
}
