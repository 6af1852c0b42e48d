#![allow(dead_code)]

use parking_lot::Mutex;
use relay_clock::FixedClock;
use relay_core::Page;
use relay_engine::{Broker, BrokerConfig, Completion};
use relay_ports::{Notification, NotificationSink, Venue, VenueCall, VenueError, VenueResult};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// What the venue does with one invoke
pub enum Step {
    Reply { more: bool, page: Page },
    Drop,
    Fail(VenueError),
}

impl Step {
    pub fn ok() -> Self {
        Step::Reply {
            more: false,
            page: Page::empty(),
        }
    }
}

/// Venue that follows a script, one step per invoke
pub struct ScriptedVenue {
    sink: Arc<dyn NotificationSink>,
    latency: Duration,
    script: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<(Instant, VenueCall)>>,
    outstanding: Arc<AtomicUsize>,
    max_outstanding: Arc<AtomicUsize>,
}

impl ScriptedVenue {
    pub fn new(sink: Arc<dyn NotificationSink>, latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            sink,
            latency,
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            outstanding: Arc::new(AtomicUsize::new(0)),
            max_outstanding: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn script(&self, steps: impl IntoIterator<Item = Step>) {
        self.script.lock().extend(steps);
    }

    pub fn calls(&self) -> Vec<(Instant, VenueCall)> {
        self.calls.lock().clone()
    }

    pub fn call_names(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .map(|(_, call)| call.name.to_string())
            .collect()
    }

    pub fn max_outstanding(&self) -> usize {
        self.max_outstanding.load(Ordering::SeqCst)
    }
}

impl Venue for ScriptedVenue {
    fn invoke(&self, call: &VenueCall) -> VenueResult<()> {
        self.calls.lock().push((Instant::now(), call.clone()));
        let step = self.script.lock().pop_front().unwrap_or_else(Step::ok);

        match step {
            Step::Fail(err) => Err(err),
            Step::Drop => Ok(()),
            Step::Reply { more, page } => {
                let now = self.outstanding.fetch_add(1, Ordering::SeqCst) + 1;
                self.max_outstanding.fetch_max(now, Ordering::SeqCst);

                let sink = self.sink.clone();
                let outstanding = self.outstanding.clone();
                let latency = self.latency;
                let name = call.name.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(latency).await;
                    outstanding.fetch_sub(1, Ordering::SeqCst);
                    sink.deliver(Notification::reply(name, more, page));
                });
                Ok(())
            }
        }
    }

    fn name(&self) -> &str {
        "ScriptedVenue"
    }
}

pub type Completions = Arc<Mutex<Vec<Completion>>>;

pub fn broker(config: BrokerConfig) -> Broker {
    let _ = env_logger::try_init();
    Broker::new(config, FixedClock::at_ymd_hms(2023, 1, 2, 0, 30, 0))
}

/// Register a handler for `name` that records every completion
pub fn record(broker: &Broker, name: &str) -> Completions {
    let store: Completions = Arc::new(Mutex::new(Vec::new()));
    let sink = store.clone();
    broker.set_callback(name, move |completion| sink.lock().push(completion));
    store
}

/// Wait (in paused time) until `store` holds `count` completions
pub async fn wait_for(store: &Completions, count: usize) {
    let wait = async {
        while store.lock().len() < count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(600), wait)
        .await
        .expect("completions did not arrive");
}
