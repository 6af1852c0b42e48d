use dashmap::DashMap;
use parking_lot::Mutex;
use relay_core::{CorrelationToken, Outcome, RequestName};
use relay_ports::{Clock, Push, Reply};
use std::sync::Arc;

use crate::config::{BrokerConfig, UnhandledPolicy};
use crate::correlation::CorrelationLock;
use crate::error::{EngineError, Result};
use crate::events::{EngineEvent, EventBus};
use crate::pagination::Paginator;
use crate::queue::RequestQueue;
use crate::rate_gate::RateGate;
use crate::registry::{BoundedBuffer, CallbackRegistry, ParameterRegistry};
use crate::request::{Completion, Decoding, Request, Submission};
use crate::retry::RetryPolicy;

pub type PushHandler = Arc<dyn Fn(&Push) + Send + Sync>;

/// State shared by the dispatch loop and the callback router
pub(crate) struct Shared {
    pub config: BrokerConfig,
    pub retry: RetryPolicy,
    pub gate: RateGate,
    pub lock: CorrelationLock,
    pub queue: RequestQueue<Request>,
    /// The request whose reply is awaited; taken by exactly one of router or loop
    pub in_flight: Mutex<Option<Request>>,
    pub callbacks: CallbackRegistry,
    pub params: ParameterRegistry,
    pub paginator: Paginator,
    pub push_handlers: DashMap<String, PushHandler>,
    /// Completions for names without a handler yet
    pub unclaimed: BoundedBuffer<Completion>,
    /// Replies that matched nothing in flight
    pub stray: BoundedBuffer<Reply>,
    pub events: EventBus,
    pub clock: Arc<dyn Clock>,
}

impl Shared {
    pub fn new(config: BrokerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            retry: RetryPolicy::from_config(&config.retry),
            gate: RateGate::new(config.min_interval()),
            lock: CorrelationLock::new(),
            queue: RequestQueue::new(),
            in_flight: Mutex::new(None),
            callbacks: CallbackRegistry::new(),
            params: ParameterRegistry::new(),
            paginator: Paginator::new(),
            push_handlers: DashMap::new(),
            unclaimed: BoundedBuffer::new(config.unhandled.capacity),
            stray: BoundedBuffer::new(config.unhandled.capacity),
            events: EventBus::new(config.event_capacity),
            clock,
            config,
        }
    }

    /// Validate, snapshot params and queue at the back
    pub fn submit(&self, submission: Submission) -> Result<CorrelationToken> {
        let name = submission.name().clone();
        if self.config.unhandled.policy == UnhandledPolicy::Reject && !self.callbacks.contains(&name)
        {
            log::warn!("Rejecting {name}: no completion handler registered");
            return Err(EngineError::NoHandler(name));
        }

        let request = Request::new(submission, self.params.get(&name));
        let token = request.token;
        log::debug!("Queued {name} ({token}), {} ahead", self.queue.len());
        self.queue.enqueue_back(request);
        self.events.publish(EngineEvent::Submitted { token, name });
        Ok(token)
    }

    /// Take the in-flight request if the reply's name matches it
    pub fn claim_reply(&self, name: &RequestName) -> Option<Request> {
        let mut slot = self.in_flight.lock();
        match slot.as_ref() {
            Some(request) if request.name() == name => slot.take(),
            Some(request) => {
                log::warn!(
                    "Reply for {name} while {} ({}) is in flight",
                    request.name(),
                    request.token
                );
                None
            }
            None => None,
        }
    }

    /// Take the in-flight request if it is still `token`
    pub fn take_in_flight(&self, token: CorrelationToken) -> Option<Request> {
        let mut slot = self.in_flight.lock();
        if slot.as_ref().is_some_and(|request| request.token == token) {
            slot.take()
        } else {
            None
        }
    }

    pub fn in_flight_token(&self) -> Option<CorrelationToken> {
        self.in_flight.lock().as_ref().map(|request| request.token)
    }

    /// Report the final result of `request` to its handler
    ///
    /// Events and the completion carry the origin token, not the page token.
    pub fn finish(&self, request: &Request, result: Result<Outcome>) {
        let name = request.name().clone();
        let token = request.origin;

        match &result {
            Ok(_) => {
                log::info!("{name} ({token}) completed after {} attempt(s)", request.attempts);
                self.events.publish(EngineEvent::Completed {
                    token,
                    name: name.clone(),
                });
            }
            Err(error) => {
                log::error!("{name} ({token}) failed: {error}");
                self.events.publish(EngineEvent::Failed {
                    token,
                    name: name.clone(),
                    error: error.clone(),
                });
            }
        }

        let superseded = matches!(result, Err(EngineError::Superseded { .. }));
        if matches!(request.decoding, Decoding::Series(_)) && !superseded {
            if let Some(generation) = request.params_generation {
                if self.params.clear_if_current(&name, generation) {
                    log::debug!("Cleared fetch params of {name}");
                }
            }
        }

        let completion = Completion {
            token,
            name: name.clone(),
            entity: request.entity.clone(),
            attempts: request.attempts,
            result,
            completed_at: self.clock.now(),
        };

        if let Some(handler) = self.callbacks.get(&name) {
            handler(completion);
            return;
        }

        match self.config.unhandled.policy {
            UnhandledPolicy::Buffer => {
                log::debug!("No handler for {name}; buffering completion");
                if let Some(evicted) = self.unclaimed.push(completion) {
                    log::warn!("Dropped buffered completion of {} ({})", evicted.name, evicted.token);
                }
                // A handler registered while we were buffering must still see it
                if self.callbacks.contains(&name) {
                    self.replay_unclaimed(&name);
                }
            }
            UnhandledPolicy::Reject => {
                log::warn!("Dropping completion of {name} ({token}): no handler");
            }
        }
    }

    /// Hand buffered completions for `name` to its handler
    pub fn replay_unclaimed(&self, name: &RequestName) -> usize {
        let Some(handler) = self.callbacks.get(name) else {
            return 0;
        };
        let completions = self.unclaimed.take_where(|completion| &completion.name == name);
        let replayed = completions.len();
        for completion in completions {
            handler(completion);
        }
        if replayed > 0 {
            log::info!("Replayed {replayed} buffered completion(s) for {name}");
        }
        replayed
    }
}
