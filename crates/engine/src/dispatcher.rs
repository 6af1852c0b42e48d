//! The single worker that feeds the venue

use relay_core::CorrelationToken;
use relay_ports::Venue;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::EngineError;
use crate::events::EngineEvent;
use crate::request::Request;
use crate::shared::Shared;

/// Pops one request at a time, dispatches it and waits for its reply
///
/// Idle -> Acquiring (backoff, rate gate, permit) -> Locked (venue invoked)
/// -> Idle on release, or -> Retrying on timeout.
pub(crate) struct DispatchLoop {
    shared: Arc<Shared>,
    venue: Arc<dyn Venue>,
    shutdown: watch::Receiver<bool>,
}

impl DispatchLoop {
    pub fn new(shared: Arc<Shared>, venue: Arc<dyn Venue>, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            shared,
            venue,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        log::info!("Dispatch loop started against {}", self.venue.name());
        let poll = self.shared.config.idle_poll();

        while !*self.shutdown.borrow() {
            let next = tokio::select! {
                _ = self.shutdown.changed() => break,
                next = self.shared.queue.dequeue(poll) => next,
            };
            let Some(request) = next else {
                continue;
            };
            if !self.dispatch(request).await {
                break;
            }
        }

        log::info!(
            "Dispatch loop stopped with {} request(s) queued",
            self.shared.queue.len()
        );
    }

    /// Returns `false` when shutdown interrupted the dispatch
    async fn dispatch(&mut self, mut request: Request) -> bool {
        if let Some(not_before) = request.not_before.take() {
            if !self.pause_until(not_before).await {
                self.shared.queue.enqueue_front(request);
                return false;
            }
        }
        if let Some(allowed) = self.shared.gate.next_allowed() {
            if !self.pause_until(allowed).await {
                self.shared.queue.enqueue_front(request);
                return false;
            }
        }

        let timeout = self.shared.config.request_timeout();
        let token = request.token;
        let acquired = tokio::select! {
            acquired = self.shared.lock.try_acquire(token, timeout) => acquired,
            _ = self.shutdown.changed() => {
                self.shared.queue.enqueue_front(request);
                return false;
            }
        };
        if !acquired {
            log::error!(
                "Permit still held by {:?}; putting {} back",
                self.shared.lock.holder().map(|t| t.to_string()),
                request.name()
            );
            self.shared.queue.enqueue_front(request);
            return true;
        }

        request.attempts += 1;
        let name = request.name().clone();
        let attempt = request.attempts;
        *self.shared.in_flight.lock() = Some(request.clone());
        self.shared.gate.record_dispatch();
        self.shared.events.publish(EngineEvent::Dispatched {
            token,
            name: name.clone(),
            attempt,
            at: Instant::now(),
        });
        log::debug!("Dispatching {name} ({token}) attempt {attempt}");

        if let Err(err) = self.venue.invoke(&request.call) {
            let Some(request) = self.shared.take_in_flight(token) else {
                return true;
            };
            self.shared.lock.release(token);
            if err.is_connectivity() {
                log::warn!("{name} ({token}) hit a connectivity fault: {err}");
                self.shared.events.publish(EngineEvent::ConnectivityFault {
                    token,
                    name,
                    reason: err.to_string(),
                });
                self.retry(request);
            } else {
                self.shared.finish(&request, Err(EngineError::Venue(err)));
            }
            return true;
        }

        let Some(released) = self.await_release(token).await else {
            self.abandon(token);
            return false;
        };
        if released {
            return true;
        }

        match self.shared.take_in_flight(token) {
            Some(request) => {
                self.shared.lock.expire(token);
                log::warn!("{name} ({token}) got no reply within {timeout:?} (attempt {attempt})");
                self.shared.events.publish(EngineEvent::TimedOut {
                    token,
                    name,
                    attempt,
                });
                self.retry(request);
            }
            None => {
                // The router claimed the reply at the deadline; let it release
                if self.await_release(token).await != Some(true) {
                    self.shared.lock.expire(token);
                }
            }
        }
        true
    }

    /// Back off and re-queue at the front, or fail once the attempt budget is spent
    fn retry(&self, mut request: Request) {
        let attempts = request.attempts;
        if !self.shared.retry.allows_another(attempts) {
            let error = EngineError::RetriesExhausted {
                name: request.name().clone(),
                attempts,
            };
            self.shared.finish(&request, Err(error));
            return;
        }

        let delay = self.shared.retry.delay(attempts);
        request.not_before = Some(Instant::now() + delay);
        log::info!("Retrying {} in {delay:?}", request.name());
        self.shared.events.publish(EngineEvent::Retrying {
            token: request.token,
            name: request.name().clone(),
            attempt: attempts,
            delay,
        });
        self.shared.queue.enqueue_front(request);
    }

    /// `None` when shutdown arrived first
    async fn await_release(&mut self, token: CorrelationToken) -> Option<bool> {
        let timeout = self.shared.config.request_timeout();
        tokio::select! {
            released = self.shared.lock.wait_released(token, timeout) => Some(released),
            _ = self.shutdown.changed() => None,
        }
    }

    /// Put the in-flight request back on shutdown so it is not lost
    fn abandon(&self, token: CorrelationToken) {
        if let Some(mut request) = self.shared.take_in_flight(token) {
            self.shared.lock.expire(token);
            request.attempts = request.attempts.saturating_sub(1);
            self.shared.queue.enqueue_front(request);
        }
    }

    /// `false` when shutdown arrived first
    async fn pause_until(&mut self, deadline: Instant) -> bool {
        if Instant::now() >= deadline {
            return true;
        }
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => true,
            _ = self.shutdown.changed() => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BrokerConfig;
    use crate::request::Submission;
    use parking_lot::Mutex;
    use relay_clock::FixedClock;
    use relay_ports::{VenueCall, VenueResult};
    use std::time::Duration;

    #[derive(Default)]
    struct SilentVenue {
        calls: Mutex<Vec<VenueCall>>,
    }

    impl Venue for SilentVenue {
        fn invoke(&self, call: &VenueCall) -> VenueResult<()> {
            self.calls.lock().push(call.clone());
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_permit_wait() {
        let clock = FixedClock::at_ymd_hms(2023, 1, 2, 0, 30, 0);
        let shared = Arc::new(Shared::new(BrokerConfig::default(), clock));
        // Permit still owed to an earlier request
        let earlier = CorrelationToken::new();
        assert!(shared.lock.try_acquire(earlier, Duration::from_secs(1)).await);

        let venue = Arc::new(SilentVenue::default());
        let (stop, shutdown) = watch::channel(false);
        let task = tokio::spawn(DispatchLoop::new(shared.clone(), venue.clone(), shutdown).run());

        shared
            .submit(Submission::ack(VenueCall::new("stock_info", "opt10001")))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;

        let stopped_at = Instant::now();
        stop.send_replace(true);
        task.await.unwrap();

        assert!(stopped_at.elapsed() < shared.config.request_timeout());
        assert!(venue.calls.lock().is_empty());
        assert_eq!(shared.queue.len(), 1);
        assert_eq!(shared.lock.holder(), Some(earlier));
    }
}
