//! Startup sequence against the simulated venue

use relay_clock::FixedClock;
use relay_core::OrderTicket;
use relay_runner::{Bootstrap, RunnerConfig, RunnerError, Session};
use relay_venue::requests::names;
use relay_venue::{Market, Response};
use rust_decimal_macros::dec;
use std::time::Duration;

/// 15:30 in the venue's local time
fn clock() -> std::sync::Arc<FixedClock> {
    FixedClock::at_ymd_hms(2023, 1, 2, 6, 30, 0)
}

fn session(config: RunnerConfig) -> Session {
    let _ = env_logger::try_init();
    let bootstrap = Bootstrap::simulated(&config, clock()).unwrap();
    Session::new(bootstrap, config)
}

#[tokio::test(start_paused = true)]
async fn test_startup_loads_account_and_watchlist() {
    let mut session = session(RunnerConfig::default());
    let report = session.run_startup().await.unwrap();

    // 4 account requests, the chained condition search, quote and chart per code
    assert_eq!(report.completed, 9);
    assert!(report.failures.is_empty());

    // Both charts span the whole sample: 1200 bars over two pages
    assert_eq!(report.charts.len(), 2);
    for candles in report.charts.values() {
        assert_eq!(candles.len(), 1_200);
        assert_eq!(candles[0].time, 20230102153000);
    }

    let mirror = &session.bootstrap().mirror;
    assert_eq!(mirror.monitored(), vec!["005930", "035420"]);
    assert_eq!(mirror.orderable_cash(), Some(2_500_000));
    assert_eq!(mirror.holding("000660").unwrap().quantity, 4);
    assert_eq!(mirror.stock("000660").unwrap().price, dec!(120000));

    let chart_calls = session
        .bootstrap()
        .venue
        .invocations()
        .iter()
        .filter(|invocation| invocation.call.name.as_str() == names::MINUTE_CHART)
        .count();
    assert_eq!(chart_calls, 4);
    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_chart_window_follows_calendar() {
    let mut config = RunnerConfig::default();
    config.chart.lookback_days = 0;
    config.chart.page_cap = Some(100);
    let session = session(config);

    let window = session.chart_window();
    assert_eq!(window.window_start, Some(20230102000000));
    assert_eq!(window.window_end, Some(20230102153000));
    assert_eq!(window.page_cap, Some(100));
    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_failed_login_is_reported_not_fatal() {
    let _ = env_logger::try_init();
    let config = RunnerConfig {
        watchlist: Vec::new(),
        ..Default::default()
    };
    let bootstrap =
        Bootstrap::with_market(&config, clock(), Market::new().with_login_code(102)).unwrap();
    let mut session = Session::new(bootstrap, config);

    let report = session.run_startup().await.unwrap();
    assert_eq!(report.completed, 3);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, names::CONNECT);
    assert!(report.failures[0].2.contains("version check failed"));
    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_startup_times_out_on_silent_venue() {
    let config = RunnerConfig {
        watchlist: Vec::new(),
        startup_timeout_ms: 10_000,
        ..Default::default()
    };
    let mut session = session(config);
    session
        .bootstrap()
        .venue
        .script("opw00001", [Response::Drop, Response::Drop]);

    // connect, load_conditions and account_profit arrive; deposit_detail and
    // the chained search behind it do not
    let err = session.run_startup().await.unwrap_err();
    assert!(matches!(err, RunnerError::StartupTimeout(2)));
    session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_order_updates_mirror() {
    let mut session = session(RunnerConfig::default());
    session.run_startup().await.unwrap();

    let ticket = OrderTicket::limit_buy("8000000011", "005930", 5, dec!(70000));
    session.place_order(&ticket).unwrap();
    assert!(session.bootstrap().mirror.is_ordered("005930"));

    let ack = session.next_completion(names::SEND_ORDER).await.unwrap();
    assert!(ack.is_ok());
    tokio::time::sleep(Duration::from_millis(10)).await;

    let mirror = &session.bootstrap().mirror;
    assert!(!mirror.is_ordered("005930"));
    assert_eq!(mirror.holding("005930").unwrap().quantity, 5);

    let bad = OrderTicket::limit_buy("8000000011", "005930", 0, dec!(70000));
    assert!(matches!(session.place_order(&bad), Err(RunnerError::Venue(_))));
    session.shutdown().await;
}
