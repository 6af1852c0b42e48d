use dashmap::DashMap;
use parking_lot::Mutex;
use relay_core::Page;
use relay_ports::{Notification, NotificationSink, Venue, VenueCall, VenueError, VenueResult};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;

use super::market::{Market, Response};

/// Computes the response to a call in place of the market fixture
pub type Responder = Arc<dyn Fn(&VenueCall) -> Response + Send + Sync>;

/// One call the simulator received
#[derive(Debug, Clone)]
pub struct Invocation {
    pub at: Instant,
    pub call: VenueCall,
}

/// Simulated venue
///
/// For each call, in order of precedence: a scripted response queued for the
/// action, a responder registered for the action, or the [`Market`] fixture.
/// Replies and the pushes that follow them are delivered from a spawned task,
/// so `invoke` must run inside a tokio runtime.
pub struct SimulatedVenue {
    sink: Arc<dyn NotificationSink>,
    latency: Duration,
    market: Mutex<Market>,
    scripts: DashMap<String, VecDeque<Response>>,
    responders: DashMap<String, Responder>,
    connected: AtomicBool,
    log: Mutex<Vec<Invocation>>,
}

impl SimulatedVenue {
    pub fn new(sink: Arc<dyn NotificationSink>, latency: Duration, market: Market) -> Arc<Self> {
        Arc::new(Self {
            sink,
            latency,
            market: Mutex::new(market),
            scripts: DashMap::new(),
            responders: DashMap::new(),
            connected: AtomicBool::new(true),
            log: Mutex::new(Vec::new()),
        })
    }

    /// Queue one-shot responses for `action`, used before the fixture
    pub fn script(&self, action: &str, responses: impl IntoIterator<Item = Response>) {
        self.scripts
            .entry(action.to_string())
            .or_default()
            .extend(responses);
    }

    pub fn set_responder<F>(&self, action: &str, responder: F)
    where
        F: Fn(&VenueCall) -> Response + Send + Sync + 'static,
    {
        self.responders.insert(action.to_string(), Arc::new(responder));
    }

    /// While disconnected every call fails with [`VenueError::Disconnected`]
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Send a push notification right away
    pub fn push(&self, topic: &str, page: Page) {
        self.sink.deliver(Notification::push(topic, page));
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.log.lock().clone()
    }

    /// Request names in call order
    pub fn call_names(&self) -> Vec<String> {
        self.log
            .lock()
            .iter()
            .map(|invocation| invocation.call.name.to_string())
            .collect()
    }

    pub fn with_market<R>(&self, f: impl FnOnce(&mut Market) -> R) -> R {
        f(&mut self.market.lock())
    }

    fn respond(&self, call: &VenueCall) -> (Response, Vec<(&'static str, Page)>) {
        let scripted = self
            .scripts
            .get_mut(&call.action)
            .and_then(|mut queue| queue.pop_front());
        if let Some(response) = scripted {
            return (response, Vec::new());
        }
        if let Some(responder) = self.responders.get(&call.action).map(|r| r.value().clone()) {
            return (responder(call), Vec::new());
        }
        self.market.lock().respond(call)
    }
}

impl Venue for SimulatedVenue {
    fn invoke(&self, call: &VenueCall) -> VenueResult<()> {
        self.log.lock().push(Invocation {
            at: Instant::now(),
            call: call.clone(),
        });
        if !self.is_connected() {
            return Err(VenueError::Disconnected("simulated link down".to_string()));
        }

        let (response, pushes) = self.respond(call);
        log::debug!("{} {} -> {}", call.name, call.action, response_kind(&response));
        match response {
            Response::Fail(err) => Err(err),
            Response::Drop => Ok(()),
            Response::Reply { more, page } => {
                let sink = self.sink.clone();
                let latency = self.latency;
                let name = call.name.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(latency).await;
                    sink.deliver(Notification::reply(name, more, page));
                    for (topic, page) in pushes {
                        sink.deliver(Notification::push(topic, page));
                    }
                });
                Ok(())
            }
        }
    }

    fn name(&self) -> &str {
        "SimulatedVenue"
    }
}

fn response_kind(response: &Response) -> &'static str {
    match response {
        Response::Reply { more: true, .. } => "reply (more)",
        Response::Reply { .. } => "reply",
        Response::Drop => "dropped",
        Response::Fail(_) => "failed",
    }
}
