//! Startup session
//!
//! Logs in, then loads everything the account mirror and the watchlist need:
//! saved conditions (chaining a real-time search), holdings, orderable cash,
//! and a quote plus a minute chart per watched code.

use relay_core::values::parse_series_time;
use relay_core::{Candle, CorrelationToken, FetchParams, OrderTicket, Outcome};
use relay_engine::Completion;
use relay_venue::requests::{self, names};
use std::collections::BTreeMap;
use tokio::sync::mpsc;

use crate::bootstrap::Bootstrap;
use crate::config::RunnerConfig;
use crate::error::{Result, RunnerError};

const HANDLED: [&str; 8] = [
    names::CONNECT,
    names::LOAD_CONDITIONS,
    names::SEND_CONDITION,
    names::ACCOUNT_PROFIT,
    names::DEPOSIT_DETAIL,
    names::STOCK_INFO,
    names::MINUTE_CHART,
    names::SEND_ORDER,
];

/// What the startup sequence produced
#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    /// Requests that completed successfully
    pub completed: usize,
    /// `(request name, entity, error)` for requests that failed
    pub failures: Vec<(String, String, String)>,
    /// Minute candles per watched code, newest first
    pub charts: BTreeMap<String, Vec<Candle>>,
}

pub struct Session {
    bootstrap: Bootstrap,
    config: RunnerConfig,
    completions: mpsc::UnboundedReceiver<Completion>,
}

impl Session {
    /// Take over the bootstrap's broker; every catalogue reply feeds the mirror
    pub fn new(bootstrap: Bootstrap, config: RunnerConfig) -> Self {
        let (tx, completions) = mpsc::unbounded_channel();
        for name in HANDLED {
            let mirror = bootstrap.mirror.clone();
            let tx = tx.clone();
            bootstrap.broker.set_callback(name, move |completion: Completion| {
                mirror.apply(&completion);
                // Receiver gone means the session is shutting down
                let _ = tx.send(completion);
            });
        }
        Self {
            bootstrap,
            config,
            completions,
        }
    }

    pub fn bootstrap(&self) -> &Bootstrap {
        &self.bootstrap
    }

    /// `[lookback start 00:00:00, now]` in the venue's local time
    pub fn chart_window(&self) -> FetchParams {
        let calendar = &self.bootstrap.calendar;
        let start = format!("{}000000", calendar.days_ago(self.config.chart.lookback_days));
        let mut params = FetchParams {
            window_start: parse_series_time(&start),
            window_end: parse_series_time(&calendar.now_key()),
            page_cap: None,
        };
        if let Some(cap) = self.config.chart.page_cap {
            params = params.with_page_cap(cap);
        }
        params
    }

    /// Submit the startup sequence and wait for all of it, chained requests
    /// included
    pub async fn run_startup(&mut self) -> Result<SessionReport> {
        let broker = &self.bootstrap.broker;
        let account = self.config.account.as_str();

        broker.submit(requests::connect())?;
        broker.submit(requests::load_conditions())?;
        broker.submit(requests::account_profit(account))?;
        broker.submit(requests::deposit_detail(account))?;
        let mut expected = 4;

        broker.set_params(names::MINUTE_CHART, self.chart_window());
        for code in &self.config.watchlist {
            broker.submit(requests::stock_info(code))?;
            broker.submit(requests::minute_chart(
                code,
                self.config.chart.tick,
                self.config.chart.adjusted,
            )?)?;
            expected += 2;
        }
        log::info!("Startup: {expected} request(s) submitted");

        let mut report = SessionReport::default();
        let mut received = 0;
        let deadline = tokio::time::Instant::now() + self.config.startup_timeout();
        while received < expected {
            let completion = match tokio::time::timeout_at(deadline, self.completions.recv()).await {
                Ok(Some(completion)) => completion,
                Ok(None) => break,
                Err(_) => return Err(RunnerError::StartupTimeout(expected - received)),
            };
            received += 1;

            match &completion.result {
                Ok(outcome) => {
                    report.completed += 1;
                    if chains_search(&completion, outcome) {
                        expected += 1;
                    }
                    if let Outcome::Series(series) = outcome {
                        report
                            .charts
                            .insert(completion.entity.clone(), Candle::from_series(series));
                    }
                }
                Err(err) => {
                    log::error!("{} [{}] failed: {err}", completion.name, completion.entity);
                    report.failures.push((
                        completion.name.to_string(),
                        completion.entity.clone(),
                        err.to_string(),
                    ));
                }
            }
        }

        log::info!(
            "Startup done: {} ok, {} failed, {} holding(s), {} monitored code(s)",
            report.completed,
            report.failures.len(),
            self.bootstrap.mirror.holdings().len(),
            self.bootstrap.mirror.monitored().len()
        );
        Ok(report)
    }

    /// Send an order and track it in the mirror until its execution notice
    pub fn place_order(&self, ticket: &OrderTicket) -> Result<CorrelationToken> {
        let submission = requests::send_order(ticket)?;
        self.bootstrap.mirror.record_order(ticket);
        Ok(self.bootstrap.broker.submit(submission)?)
    }

    /// Wait for the next completion of `name`, skipping others
    pub async fn next_completion(&mut self, name: &str) -> Option<Completion> {
        while let Some(completion) = self.completions.recv().await {
            if completion.name.as_str() == name {
                return Some(completion);
            }
        }
        None
    }

    pub async fn shutdown(self) {
        self.bootstrap.broker.shutdown().await;
    }
}

/// A non-empty condition list triggers one follow-up search
fn chains_search(completion: &Completion, outcome: &Outcome) -> bool {
    completion.name.as_str() == names::LOAD_CONDITIONS
        && outcome.as_rows().is_some_and(|rows| !rows.is_empty())
}
