//! The service object owning all engine state

use parking_lot::Mutex;
use relay_core::{CorrelationToken, FetchParams, RequestName, ResultAccumulator, SeriesKey};
use relay_ports::{Clock, NotificationSink, Push, Reply, Venue};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::config::BrokerConfig;
use crate::dispatcher::DispatchLoop;
use crate::error::{EngineError, Result};
use crate::events::EngineEvent;
use crate::request::{Completion, Request, Submission};
use crate::router::CallbackRouter;
use crate::shared::Shared;

/// Serializes calls to a single-slot venue and correlates its replies
///
/// ```ignore
/// let broker = Broker::new(BrokerConfig::default(), Arc::new(SystemClock::new()));
/// let venue = SimulatedVenue::new(broker.sink(), Duration::from_millis(50), Market::new());
/// broker.set_callback("stock_info", |completion| println!("{completion:?}"));
/// broker.start(venue)?;
/// broker.submit(requests::stock_info("005930"))?;
/// ```
pub struct Broker {
    shared: Arc<Shared>,
    router: CallbackRouter,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Broker {
    pub fn new(config: BrokerConfig, clock: Arc<dyn Clock>) -> Self {
        let shared = Arc::new(Shared::new(config, clock));
        let (shutdown, _) = watch::channel(false);
        Self {
            router: CallbackRouter::new(shared.clone()),
            shared,
            shutdown,
            task: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.shared.config
    }

    /// Where the venue delivers its notifications
    pub fn sink(&self) -> Arc<dyn NotificationSink> {
        Arc::new(self.router.clone())
    }

    /// Spawn the dispatch loop on the current tokio runtime
    pub fn start(&self, venue: Arc<dyn Venue>) -> Result<()> {
        if *self.shutdown.borrow() {
            return Err(EngineError::ShutDown);
        }
        let mut task = self.task.lock();
        if task.is_some() {
            return Err(EngineError::AlreadyRunning);
        }

        log::info!(
            "Starting broker: spacing {:?}, timeout {:?}, {} attempt(s) per request",
            self.shared.config.min_interval(),
            self.shared.config.request_timeout(),
            self.shared.retry.max_attempts()
        );
        let dispatch = DispatchLoop::new(self.shared.clone(), venue, self.shutdown.subscribe());
        *task = Some(tokio::spawn(dispatch.run()));
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Stop the dispatch loop and wait for it to exit
    ///
    /// Queued requests stay queued; see [`Broker::drain_pending`].
    pub async fn shutdown(&self) {
        self.shutdown.send_replace(true);
        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(err) = task.await {
                log::error!("Dispatch loop ended abnormally: {err}");
            }
        }
        log::info!("Broker shut down");
    }

    /// Queue a request. Returns immediately.
    pub fn submit(&self, submission: Submission) -> Result<CorrelationToken> {
        if *self.shutdown.borrow() {
            return Err(EngineError::ShutDown);
        }
        self.shared.submit(submission)
    }

    /// Register the completion handler of `name`, replacing any previous one.
    ///
    /// Completions buffered while no handler was registered are delivered now.
    pub fn set_callback<F>(&self, name: impl Into<RequestName>, handler: F)
    where
        F: Fn(Completion) + Send + Sync + 'static,
    {
        let name = name.into();
        self.shared.callbacks.set(name.clone(), Arc::new(handler));
        self.shared.replay_unclaimed(&name);
    }

    /// Register the handler for push notifications on `topic`
    pub fn on_push<F>(&self, topic: impl Into<String>, handler: F)
    where
        F: Fn(&Push) + Send + Sync + 'static,
    {
        self.shared.push_handlers.insert(topic.into(), Arc::new(handler));
    }

    /// Set fetch parameters for requests submitted from now on
    pub fn set_params(&self, name: impl Into<RequestName>, params: FetchParams) -> u64 {
        self.shared.params.set(name.into(), params)
    }

    pub fn params(&self, name: &RequestName) -> Option<FetchParams> {
        self.shared.params.get(name).map(|(_, params)| params)
    }

    /// Current accumulator of a paged fetch, complete or not
    pub fn series(&self, name: impl Into<RequestName>, entity: impl Into<String>) -> Option<ResultAccumulator> {
        self.shared.paginator.snapshot(&SeriesKey::new(name, entity))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.shared.events.subscribe()
    }

    pub fn pending(&self) -> usize {
        self.shared.queue.len()
    }

    /// Remove everything still queued
    pub fn drain_pending(&self) -> Vec<Request> {
        self.shared.queue.drain()
    }

    pub fn in_flight(&self) -> Option<CorrelationToken> {
        self.shared.in_flight_token()
    }

    /// Replies that matched no request in flight, oldest first
    pub fn stray_replies(&self) -> Vec<Reply> {
        self.shared.stray.snapshot()
    }

    /// Number of completions waiting for a handler
    pub fn unclaimed(&self) -> usize {
        self.shared.unclaimed.len()
    }
}

impl Drop for Broker {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
    }
}
